use crate::dataset::{FeedbackDataset, STUDENT_COLUMN};

/// The eleven skill rating columns in the feedback form, in form order.
pub const SKILL_COLUMNS: [&str; 11] = [
    "i) Communication & Presentation Skills",
    "ii) Confidence level",
    "iii) Creativity",
    "iv) Planning & Organizational skills",
    "v) Adaptability",
    "vi) Knowledge",
    "vii) Attitude & Behaviour at work",
    "viii) Analytical Skills",
    "ix) Societal Understanding",
    "x) Ethics",
    "xi) Team Work",
];

pub const HIRE_COLUMN: &str = "4. Will you consider the student to be \
absorbed in your organization (if chance given)?";

pub const REHIRE_COLUMN: &str =
    "Would you like to take VIIT students again in next year?";

fn parse_rating(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Average rating per skill column over all rows of the dataset.
///
/// Columns absent from the dataset are skipped, as are cells that do not
/// parse as numbers, so a column only shows up with at least one usable
/// rating.
pub fn skill_averages(dataset: &FeedbackDataset) -> Vec<(&'static str, f64)> {
    let mut averages = Vec::new();
    for skill in SKILL_COLUMNS {
        let Some(cells) = dataset.column(skill) else {
            continue;
        };
        let ratings: Vec<f64> =
            cells.iter().filter_map(|c| parse_rating(c)).collect();
        if let Some(average) = mean(&ratings) {
            averages.push((skill, average));
        }
    }
    averages
}

/// Number of rows answering "yes" in the given column, ignoring case and
/// surrounding whitespace. None when the column is absent, so callers can
/// tell "no column" apart from "zero yes answers".
///
/// Unlike the row filter used for summaries, this count folds case and
/// trims, matching how the hiring insight has always been computed.
pub fn yes_count(dataset: &FeedbackDataset, column: &str) -> Option<usize> {
    let cells = dataset.column(column)?;
    Some(
        cells
            .iter()
            .filter(|c| c.trim().eq_ignore_ascii_case("yes"))
            .count(),
    )
}

/// Overall performance per student: each row is averaged across the skill
/// columns, then the row scores are averaged per student. Students keep
/// first-appearance order; rows without a single numeric rating are left
/// out.
pub fn student_performance(dataset: &FeedbackDataset) -> Vec<(String, f64)> {
    let Some(students) = dataset.column(STUDENT_COLUMN) else {
        return Vec::new();
    };

    let skill_cells: Vec<&[String]> = SKILL_COLUMNS
        .iter()
        .filter_map(|skill| dataset.column(skill))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut scores: std::collections::HashMap<String, Vec<f64>> =
        std::collections::HashMap::new();

    for (idx, student) in students.iter().enumerate() {
        let ratings: Vec<f64> = skill_cells
            .iter()
            .filter_map(|cells| parse_rating(&cells[idx]))
            .collect();
        let Some(row_score) = mean(&ratings) else {
            continue;
        };
        if !scores.contains_key(student) {
            order.push(student.clone());
        }
        scores.entry(student.clone()).or_default().push(row_score);
    }

    order
        .into_iter()
        .filter_map(|student| {
            let per_row = &scores[&student];
            mean(per_row).map(|avg| (student, avg))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeedbackDataset;
    use pretty_assertions::assert_eq;

    fn sample() -> FeedbackDataset {
        let csv = "\
Name of The Company,Name of The Student,i) Communication & Presentation Skills,ii) Confidence level,4. Will you consider the student to be absorbed in your organization (if chance given)?,Would you like to take VIIT students again in next year?
Acme,Alice,4,5,Yes,yes
Acme,Bob,3,3, YES ,No
Acme,Alice,2,4,no,Yes
";
        FeedbackDataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn skill_averages_skip_absent_columns() {
        let dataset = sample();
        let averages = skill_averages(&dataset);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].0, "i) Communication & Presentation Skills");
        assert!((averages[0].1 - 3.0).abs() < 1e-9);
        assert!((averages[1].1 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn skill_averages_ignore_non_numeric_cells() {
        let csv = "\
Name of The Student,i) Communication & Presentation Skills
Alice,4
Bob,N/A
Carol,2
";
        let dataset = FeedbackDataset::from_reader(csv.as_bytes()).unwrap();
        let averages = skill_averages(&dataset);
        assert_eq!(averages.len(), 1);
        assert!((averages[0].1 - 3.0).abs() < 1e-9);
    }

    #[test]
    fn yes_count_trims_and_folds_case() {
        let dataset = sample();
        assert_eq!(yes_count(&dataset, HIRE_COLUMN), Some(2));
        assert_eq!(yes_count(&dataset, REHIRE_COLUMN), Some(2));
    }

    #[test]
    fn yes_count_of_absent_column_is_none() {
        let dataset = sample();
        assert_eq!(yes_count(&dataset, "No Such Column"), None);
    }

    #[test]
    fn student_performance_averages_rows_per_student() {
        let dataset = sample();
        let performance = student_performance(&dataset);
        assert_eq!(performance.len(), 2);

        // Alice: rows (4,5)->4.5 and (2,4)->3.0, averaged to 3.75.
        assert_eq!(performance[0].0, "Alice");
        assert!((performance[0].1 - 3.75).abs() < 1e-9);

        // Bob: single row (3,3)->3.0.
        assert_eq!(performance[1].0, "Bob");
        assert!((performance[1].1 - 3.0).abs() < 1e-9);
    }

    #[test]
    fn student_performance_without_skill_columns_is_empty() {
        let dataset = FeedbackDataset::from_reader(
            "Name of The Company,Name of The Student\nAcme,Alice\n".as_bytes(),
        )
        .unwrap();
        assert!(student_performance(&dataset).is_empty());
    }
}
