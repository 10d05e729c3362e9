use serde::{Serialize, Serializer};

/// A raw cell, resolved once at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => CellValue::Number(number),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}

/// The seven fixed per-student metrics tracked by the course export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Participation,
    Views,
    MinutesOnPlatform,
    CourseProgress,
    Completed,
    MissingActivities,
    FinalGrade,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::Participation,
        Indicator::Views,
        Indicator::MinutesOnPlatform,
        Indicator::CourseProgress,
        Indicator::Completed,
        Indicator::MissingActivities,
        Indicator::FinalGrade,
    ];

    /// Indicators grouped under "Actividad en plataforma" on the dashboard.
    pub const PLATFORM: [Indicator; 2] = [Indicator::Views, Indicator::MinutesOnPlatform];

    /// Indicators grouped under "Desempeño académico" on the dashboard.
    pub const ACADEMIC: [Indicator; 4] = [
        Indicator::Participation,
        Indicator::Completed,
        Indicator::MissingActivities,
        Indicator::FinalGrade,
    ];

    /// Header of the CSV column this indicator is read from. Minutes are
    /// derived from the raw `Horas` column rather than read directly.
    pub fn source_column(self) -> &'static str {
        match self {
            Indicator::Participation => "Participaciones",
            Indicator::Views => "Vistas",
            Indicator::MinutesOnPlatform => "Horas",
            Indicator::CourseProgress => "%Avance del curso",
            Indicator::Completed => "Completadas",
            Indicator::MissingActivities => "Faltantes",
            Indicator::FinalGrade => "Final",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::Participation => "Participaciones",
            Indicator::Views => "Vistas",
            Indicator::MinutesOnPlatform => "Minutos en plataforma",
            Indicator::CourseProgress => "%Avance del curso",
            Indicator::Completed => "Completadas",
            Indicator::MissingActivities => "Faltantes",
            Indicator::FinalGrade => "Final",
        }
    }
}

impl Serialize for Indicator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub full_name: Option<String>,
    pub participation: Option<f64>,
    pub views: Option<f64>,
    pub minutes_on_platform: Option<f64>,
    pub course_progress: Option<f64>,
    pub completed: Option<f64>,
    pub missing_activities: Option<f64>,
    pub final_grade: Option<f64>,
    /// Activity-score cells in source column order, left as loaded.
    pub activities: Vec<(String, CellValue)>,
}

impl StudentRecord {
    pub fn indicator(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Participation => self.participation,
            Indicator::Views => self.views,
            Indicator::MinutesOnPlatform => self.minutes_on_platform,
            Indicator::CourseProgress => self.course_progress,
            Indicator::Completed => self.completed,
            Indicator::MissingActivities => self.missing_activities,
            Indicator::FinalGrade => self.final_grade,
        }
    }
}

/// One normalized load of the tracking export, immutable after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<StudentRecord>,
    pub activity_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub indicator: Indicator,
    pub student: Option<f64>,
    /// `None` when no record has a present value for the indicator.
    pub group_mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityScore {
    pub activity: String,
    pub score: f64,
}

/// Where the student's final grade sits relative to the group mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedbackTier {
    NoScore,
    BelowAverage,
    AtAverage,
    AboveAverage,
}

impl FeedbackTier {
    /// The one message used both on screen and in the exported report.
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::NoScore => "Este estudiante no tiene una nota final registrada aún.",
            FeedbackTier::BelowAverage => {
                "Tu nota está por debajo del promedio del grupo. Revisa actividades pendientes y solicita retroalimentación."
            }
            FeedbackTier::AtAverage => {
                "Estás en el promedio del grupo. ¡Sigue así y busca pequeñas mejoras!"
            }
            FeedbackTier::AboveAverage => {
                "¡Vas por encima del promedio del grupo! Excelente desempeño."
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedbackTier::NoScore => "Sin nota",
            FeedbackTier::BelowAverage => "Bajo el promedio",
            FeedbackTier::AtAverage => "En el promedio",
            FeedbackTier::AboveAverage => "Sobre el promedio",
        }
    }
}

/// The engine's full output for one student, consumed by the terminal
/// renderer, the JSON boundary and the report exporter alike.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub student: StudentRecord,
    pub comparison: Vec<ComparisonRow>,
    pub platform_comparison: Vec<ComparisonRow>,
    pub academic_comparison: Vec<ComparisonRow>,
    pub activity_scores: Vec<ActivityScore>,
    pub feedback: FeedbackTier,
}
