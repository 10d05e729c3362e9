use crate::models::{
    ActivityScore, ComparisonRow, Dataset, FeedbackTier, Indicator, StudentDashboard,
    StudentRecord,
};

/// Width of the band around the group mean classified as "at average".
pub const FEEDBACK_BAND: f64 = 1.0;

/// Mean of an indicator over every record with a present value. Missing
/// values are excluded, never counted as zero.
pub fn group_mean(dataset: &Dataset, indicator: Indicator) -> Option<f64> {
    let values: Vec<f64> = dataset
        .records
        .iter()
        .filter_map(|record| record.indicator(indicator))
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// First record matching the exact (trimmed) identifier.
pub fn find_student<'a>(dataset: &'a Dataset, student_id: &str) -> Option<&'a StudentRecord> {
    let wanted = student_id.trim();
    dataset
        .records
        .iter()
        .find(|record| record.student_id == wanted)
}

/// Computes the full dashboard payload for one student. `None` means no
/// record carries that identifier, the normal outcome for a mistyped lookup.
pub fn build_dashboard(dataset: &Dataset, student_id: &str) -> Option<StudentDashboard> {
    let student = find_student(dataset, student_id)?.clone();

    let comparison: Vec<ComparisonRow> = Indicator::ALL
        .iter()
        .map(|&indicator| ComparisonRow {
            indicator,
            student: student.indicator(indicator),
            group_mean: group_mean(dataset, indicator),
        })
        .collect();

    let platform_comparison = partition(&comparison, &Indicator::PLATFORM);
    let academic_comparison = partition(&comparison, &Indicator::ACADEMIC);
    let activity_scores = activity_scores(&student);
    let feedback =
        classify_final_grade(student.final_grade, group_mean(dataset, Indicator::FinalGrade));

    Some(StudentDashboard {
        student,
        comparison,
        platform_comparison,
        academic_comparison,
        activity_scores,
        feedback,
    })
}

// Display partition of the already computed rows.
fn partition(rows: &[ComparisonRow], subset: &[Indicator]) -> Vec<ComparisonRow> {
    subset
        .iter()
        .filter_map(|indicator| rows.iter().find(|row| row.indicator == *indicator))
        .cloned()
        .collect()
}

/// One `(activity, score)` pair per activity column where the student's
/// score is a present number.
pub fn activity_scores(student: &StudentRecord) -> Vec<ActivityScore> {
    student
        .activities
        .iter()
        .filter_map(|(activity, value)| {
            value.as_number().map(|score| ActivityScore {
                activity: activity.clone(),
                score,
            })
        })
        .collect()
}

/// Classifies a final grade against the group mean. Ties at exactly one
/// point from the mean count as at average.
pub fn classify_final_grade(
    final_grade: Option<f64>,
    group_mean: Option<f64>,
) -> FeedbackTier {
    match (final_grade, group_mean) {
        (Some(grade), Some(mean)) => {
            if grade < mean - FEEDBACK_BAND {
                FeedbackTier::BelowAverage
            } else if grade <= mean + FEEDBACK_BAND {
                FeedbackTier::AtAverage
            } else {
                FeedbackTier::AboveAverage
            }
        }
        _ => FeedbackTier::NoScore,
    }
}
