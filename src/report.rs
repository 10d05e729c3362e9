use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::StudentDashboard;

/// Letter page with one-inch margins and a 0.2-inch line pitch, as in the
/// exported document layout: (11 - 2) / 0.2 content lines per page.
pub const LINES_PER_PAGE: usize = 45;

/// Accumulates report lines and starts a new page (form feed) when the
/// current one is full.
struct PageWriter {
    output: String,
    lines_on_page: usize,
}

impl PageWriter {
    fn new() -> Self {
        PageWriter {
            output: String::new(),
            lines_on_page: 0,
        }
    }

    fn line(&mut self, text: &str) {
        if self.lines_on_page == LINES_PER_PAGE {
            self.output.push('\u{c}');
            self.lines_on_page = 0;
        }
        let _ = writeln!(self.output, "{text}");
        self.lines_on_page += 1;
    }

    fn blank(&mut self) {
        self.line("");
    }
}

/// Renders the downloadable report for one student: header, the seven
/// indicators, the per-activity grades and the feedback comment.
pub fn build_report(dashboard: &StudentDashboard, generated_on: NaiveDate) -> String {
    let student = &dashboard.student;
    let mut page = PageWriter::new();

    page.line(&format!("Reporte académico – {}", student.student_id));
    page.line(&format!("Generado el {generated_on}"));
    page.blank();

    page.line(&format!(
        "Participaciones: {}",
        format_value(student.participation)
    ));
    page.line(&format!("Vistas: {}", format_value(student.views)));
    page.line(&format!(
        "Minutos activos: {}",
        student
            .minutes_on_platform
            .map(|minutes| format!("{minutes:.1}"))
            .unwrap_or_else(|| "N/D".to_string())
    ));
    page.line(&format!(
        "% Avance del curso: {}%",
        format_value(student.course_progress)
    ));
    page.line(&format!("Completadas: {}", format_value(student.completed)));
    page.line(&format!(
        "Faltantes: {}",
        format_value(student.missing_activities)
    ));
    page.line(&format!(
        "Nota final: {}",
        student
            .final_grade
            .map(|grade| format!("{grade:.2}"))
            .unwrap_or_else(|| "N/D".to_string())
    ));
    page.blank();

    page.line("Calificaciones por actividad:");
    for score in &dashboard.activity_scores {
        page.line(&format!("  {}: {}", score.activity, format_number(score.score)));
    }
    page.blank();

    page.line("Comentario del sistema:");
    for line in dashboard.feedback.message().lines() {
        page.line(&format!("  {line}"));
    }

    page.output
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_value(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "N/D".to_string())
}
