use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::Context;

use crate::models::{CellValue, Dataset, Indicator, StudentRecord};

pub const ID_COLUMN: &str = "Matricula";
pub const NAME_COLUMN: &str = "Nombre alumno";

/// Substrings marking a column as a graded activity. Matching is
/// case-sensitive on the literal header.
pub const ACTIVITY_PATTERNS: [&str; 7] = [
    "Actividad",
    "Activity",
    "Quiz",
    "Fase",
    "Phase",
    "Evidencia",
    "Evidence",
];

pub fn is_activity_column(name: &str) -> bool {
    ACTIVITY_PATTERNS.iter().any(|pattern| name.contains(pattern))
}

pub fn load_csv(path: &Path) -> anyhow::Result<Dataset> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let dataset = read_csv(file)
        .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::info!(
        "Loaded {} students and {} activity columns from {}",
        dataset.records.len(),
        dataset.activity_columns.len(),
        path.display()
    );
    Ok(dataset)
}

pub fn read_csv<R: std::io::Read>(input: R) -> anyhow::Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<String>>());
    }

    Ok(normalize(&headers, &rows))
}

/// Builds the normalized dataset. Per-cell parse failures degrade to
/// missing and never fail the load.
pub fn normalize(headers: &[String], rows: &[Vec<String>]) -> Dataset {
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(position, header)| (header.as_str(), position))
        .collect();

    let activity_columns: Vec<String> = headers
        .iter()
        .filter(|header| is_activity_column(header))
        .cloned()
        .collect();

    let records = rows
        .iter()
        .map(|row| normalize_row(row, &index, &activity_columns))
        .collect();

    Dataset {
        records,
        activity_columns,
    }
}

fn normalize_row(
    row: &[String],
    index: &HashMap<&str, usize>,
    activity_columns: &[String],
) -> StudentRecord {
    let student_id = raw_cell(row, index, ID_COLUMN)
        .map(|cell| cell.trim().to_string())
        .unwrap_or_default();
    let full_name = raw_cell(row, index, NAME_COLUMN)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let horas = cell(row, index, Indicator::MinutesOnPlatform.source_column());

    StudentRecord {
        participation: coerce(&student_id, row, index, Indicator::Participation),
        views: coerce(&student_id, row, index, Indicator::Views),
        minutes_on_platform: time_to_minutes(&horas),
        course_progress: coerce(&student_id, row, index, Indicator::CourseProgress),
        completed: coerce(&student_id, row, index, Indicator::Completed),
        missing_activities: coerce(&student_id, row, index, Indicator::MissingActivities),
        final_grade: coerce(&student_id, row, index, Indicator::FinalGrade),
        activities: activity_columns
            .iter()
            .map(|column| (column.clone(), cell(row, index, column)))
            .collect(),
        student_id,
        full_name,
    }
}

fn raw_cell<'a>(row: &'a [String], index: &HashMap<&str, usize>, column: &str) -> Option<&'a str> {
    index
        .get(column)
        .and_then(|&position| row.get(position))
        .map(String::as_str)
}

fn cell(row: &[String], index: &HashMap<&str, usize>, column: &str) -> CellValue {
    raw_cell(row, index, column)
        .map(CellValue::parse)
        .unwrap_or(CellValue::Missing)
}

fn coerce(
    student_id: &str,
    row: &[String],
    index: &HashMap<&str, usize>,
    indicator: Indicator,
) -> Option<f64> {
    let value = cell(row, index, indicator.source_column());
    let number = value.as_number();
    if number.is_none() {
        if let CellValue::Text(raw) = &value {
            tracing::debug!(
                "{} for {student_id}: unparseable value {raw:?} treated as missing",
                indicator.source_column()
            );
        }
    }
    number
}

/// Converts the raw time-on-platform cell to minutes. Accepts a colon
/// separated `H:M:S` string or a spreadsheet fractional-day number; anything
/// else is missing. Total function, never errors.
pub fn time_to_minutes(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Text(text) if text.contains(':') => {
            let parts: Vec<i64> = text
                .split(':')
                .map(|part| part.trim().parse::<i64>())
                .collect::<Result<_, _>>()
                .ok()?;
            if parts.len() != 3 {
                return None;
            }
            let (hours, minutes, seconds) = (parts[0], parts[1], parts[2]);
            Some(hours as f64 * 60.0 + minutes as f64 + seconds as f64 / 60.0)
        }
        CellValue::Number(fraction_of_day) => Some(fraction_of_day * 24.0 * 60.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        [
            "Matricula",
            "Nombre alumno",
            "Participaciones",
            "Vistas",
            "Horas",
            "%Avance del curso",
            "Completadas",
            "Faltantes",
            "Final",
            "Actividad 1",
            "Quiz_2",
        ]
        .iter()
        .map(|header| header.to_string())
        .collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn clock_strings_convert_exactly() {
        assert_eq!(
            time_to_minutes(&CellValue::parse("2:30:30")),
            Some(2.0 * 60.0 + 30.0 + 30.0 / 60.0)
        );
        assert_eq!(time_to_minutes(&CellValue::parse("0:05:00")), Some(5.0));
        assert_eq!(time_to_minutes(&CellValue::parse("10:00:00")), Some(600.0));
    }

    #[test]
    fn fractional_days_convert_exactly() {
        assert_eq!(time_to_minutes(&CellValue::Number(0.25)), Some(360.0));
        assert_eq!(time_to_minutes(&CellValue::Number(1.0)), Some(1440.0));
    }

    #[test]
    fn malformed_time_values_degrade_to_missing() {
        assert_eq!(time_to_minutes(&CellValue::parse("abc")), None);
        assert_eq!(time_to_minutes(&CellValue::parse("1:2")), None);
        assert_eq!(time_to_minutes(&CellValue::parse("1:2:3:4")), None);
        assert_eq!(time_to_minutes(&CellValue::parse("1:xx:3")), None);
        assert_eq!(time_to_minutes(&CellValue::parse("1:2.5:3")), None);
        assert_eq!(time_to_minutes(&CellValue::Missing), None);
    }

    #[test]
    fn normalize_trims_identifiers_and_coerces_indicators() {
        let rows = vec![row(&[
            "  A00012345  ",
            " Ana Torres ",
            "12",
            "48",
            "2:00:00",
            "80",
            "10",
            "x",
            "88.5",
            "8",
            "",
        ])];
        let dataset = normalize(&headers(), &rows);
        let record = &dataset.records[0];

        assert_eq!(record.student_id, "A00012345");
        assert_eq!(record.full_name.as_deref(), Some("Ana Torres"));
        assert_eq!(record.participation, Some(12.0));
        assert_eq!(record.views, Some(48.0));
        assert_eq!(record.minutes_on_platform, Some(120.0));
        assert_eq!(record.course_progress, Some(80.0));
        assert_eq!(record.completed, Some(10.0));
        // "x" must become missing, never a silent 0.
        assert_eq!(record.missing_activities, None);
        assert_eq!(record.final_grade, Some(88.5));
    }

    #[test]
    fn activity_columns_follow_name_patterns() {
        let dataset = normalize(&headers(), &[]);
        assert_eq!(dataset.activity_columns, vec!["Actividad 1", "Quiz_2"]);
    }

    #[test]
    fn activity_cells_are_kept_as_loaded() {
        let rows = vec![row(&[
            "A1", "", "1", "1", "0:10:00", "50", "1", "1", "70", "9.5", "pendiente",
        ])];
        let dataset = normalize(&headers(), &rows);
        let record = &dataset.records[0];
        assert_eq!(
            record.activities,
            vec![
                ("Actividad 1".to_string(), CellValue::Number(9.5)),
                ("Quiz_2".to_string(), CellValue::Text("pendiente".to_string())),
            ]
        );
    }

    #[test]
    fn missing_identifier_is_preserved_as_empty() {
        let headers = vec!["Participaciones".to_string(), "Final".to_string()];
        let dataset = normalize(&headers, &[row(&["3", "90"])]);
        assert_eq!(dataset.records[0].student_id, "");
        assert_eq!(dataset.records[0].full_name, None);
        assert_eq!(dataset.records[0].final_grade, Some(90.0));
    }

    #[test]
    fn read_csv_handles_in_memory_input() {
        let csv = "\
Matricula,Nombre alumno,Participaciones,Vistas,Horas,%Avance del curso,Completadas,Faltantes,Final,Actividad 1
A001,Ana,3,20,1:30:00,75,8,2,85,9
A002,Luis,5,31,0.5,90,10,0,92,10
";
        let dataset = read_csv(csv.as_bytes()).expect("csv loads");
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.records[0].minutes_on_platform, Some(90.0));
        // 0.5 of a day, as spreadsheets serialize durations.
        assert_eq!(dataset.records[1].minutes_on_platform, Some(720.0));
    }
}
