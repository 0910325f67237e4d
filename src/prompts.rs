use crate::dataset::{
    FeedbackDataset, COMPANY_COLUMN, MENTOR_COLUMN_CANDIDATES, STUDENT_COLUMN,
};
use anyhow::Result;

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that \
summarizes feedback data for university internship programs.";

pub const SUMMARY_DATA_PROMPT: &str = "Here is the feedback data: \
{feedback_data}. Provide a structured summary based on this data.";

const CONTEXT_ONLY_INSTRUCTION: &str = "You must not use or generate any data \
or text based on information outside of this provided context. Only refer to \
the data provided in this input.";

/// The four summary groupings a user can ask for.
///
/// Each variant has its own prompt template; the keyed variants filter the
/// dataset down to the rows matching the chosen company, student or mentor
/// before serializing it into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Overall,
    ByCompany,
    ByStudent,
    ByMentor,
}

impl SummaryKind {
    pub const ALL: [SummaryKind; 4] = [
        SummaryKind::Overall,
        SummaryKind::ByCompany,
        SummaryKind::ByStudent,
        SummaryKind::ByMentor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SummaryKind::Overall => "Overall Summary",
            SummaryKind::ByCompany => "Company-wise Summary",
            SummaryKind::ByStudent => "Student-wise Summary",
            SummaryKind::ByMentor => "VIIT-Mentor-wise Summary",
        }
    }

    pub fn requires_key(&self) -> bool {
        !matches!(self, SummaryKind::Overall)
    }
}

impl std::fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the prompt for the chosen grouping. Keyed groupings need the
/// selected key value; the menu layer guarantees one is present, so a
/// missing key here is a caller bug and reported as an error.
pub fn build_prompt(
    kind: SummaryKind,
    dataset: &FeedbackDataset,
    key: Option<&str>,
) -> Result<String> {
    match kind {
        SummaryKind::Overall => Ok(overall_prompt(dataset)),
        SummaryKind::ByCompany => {
            let company = required_key(kind, key)?;
            company_prompt(dataset, company)
        }
        SummaryKind::ByStudent => {
            let student = required_key(kind, key)?;
            student_prompt(dataset, student)
        }
        SummaryKind::ByMentor => {
            let mentor = required_key(kind, key)?;
            mentor_prompt(dataset, mentor)
        }
    }
}

fn required_key<'a>(
    kind: SummaryKind,
    key: Option<&'a str>,
) -> Result<&'a str> {
    key.ok_or_else(|| {
        anyhow::anyhow!("{} requires a selected value", kind.label())
    })
}

fn overall_prompt(dataset: &FeedbackDataset) -> String {
    let company_count = dataset.distinct_values(COMPANY_COLUMN).len();
    // Row count of the student column, not a distinct count: a student
    // with two internships is counted twice. That is how the totals have
    // always been reported, so it stays that way.
    let student_count =
        dataset.column(STUDENT_COLUMN).map(|c| c.len()).unwrap_or(0);

    format!(
        r#"Provide a comprehensive overall summary based on the following internship feedback data:
{data}
{context_only}

Ensure the output is structured and covers the following aspects:
# Output format:
1. **Number of Students (Total Count)**: {student_count}
2. **Number of Companies (Total Count)**: {company_count}
3. **Overall Strengths of the Students:**
4. **Overall Weaknesses of the Students:**
    - Summarize weaknesses or areas for improvement. Look for common trends in feedback.
5. **Additional Observations/Insights**:
    - Mention any standout observations or trends in the feedback, if applicable.
"#,
        data = dataset.prompt_block(),
        context_only = CONTEXT_ONLY_INSTRUCTION,
        student_count = student_count,
        company_count = company_count,
    )
}

fn company_prompt(
    dataset: &FeedbackDataset,
    company_name: &str,
) -> Result<String> {
    let subset = dataset.filter(COMPANY_COLUMN, company_name)?;
    let student_count =
        subset.column(STUDENT_COLUMN).map(|c| c.len()).unwrap_or(0);
    let student_names = subset
        .column(STUDENT_COLUMN)
        .map(|c| c.join(", "))
        .unwrap_or_default();

    Ok(format!(
        r#"Provide a summary for the company '{company_name}' based on the following internship feedback data:
{data}
{context_only}

Summarize strengths and weaknesses of interns working for this company.

Output format:
1. **Number of students (count of students working for the selected company)**: {student_count}
2. **Names of students (students working for the selected company)**: {student_names}
3. **Faculty Mentor from this company:**
4. **Faculty Mentor from this company from VIIT:**
5. **Email-id of Faculty Mentor from this company from VIIT:**
6. **Overall strengths:**
7. **Overall weaknesses:**
8. **Overall Summary:**
"#,
        company_name = company_name,
        data = subset.prompt_block(),
        context_only = CONTEXT_ONLY_INSTRUCTION,
        student_count = student_count,
        student_names = student_names,
    ))
}

fn student_prompt(
    dataset: &FeedbackDataset,
    student_name: &str,
) -> Result<String> {
    let subset = dataset.filter(STUDENT_COLUMN, student_name)?;

    // Unlike the overall and company templates, this one carries no
    // context-only instruction.
    Ok(format!(
        r#"Provide a summary for the student '{student_name}' based on the following internship feedback data:
{data}
Summarize the student's performance, strengths, and areas for improvement.
"#,
        student_name = student_name,
        data = subset.prompt_block(),
    ))
}

fn mentor_prompt(
    dataset: &FeedbackDataset,
    mentor_name: &str,
) -> Result<String> {
    // The mentor header varies between exports; resolve before filtering
    // so a dataset without any mentor column fails here instead of
    // filtering against an unrelated column.
    let mentor_column = dataset.resolve_column(&MENTOR_COLUMN_CANDIDATES)?;
    let subset = dataset.filter(mentor_column, mentor_name)?;

    Ok(format!(
        r#"Provide a summary for the VIIT Mentor '{mentor_name}' based on the following internship feedback data:
{data}
Summarize the mentor's involvement, feedback, and performance trends across students they supervised.
"#,
        mentor_name = mentor_name,
        data = subset.prompt_block(),
    ))
}
