use crate::analytics;
use crate::cli::Args;
use crate::dataset::{
    FeedbackDataset, COMPANY_COLUMN, MENTOR_COLUMN_CANDIDATES, STUDENT_COLUMN,
};
use crate::prompts::SummaryKind;
use crate::summary;
use crate::AppState;
use anyhow::Result;
use clap::Parser;
use dialoguer::{Input, Select};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn check_file_is_writable(path: &str, file_type: &str) -> Result<()> {
    let file_path = std::path::Path::new(path);
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(anyhow::anyhow!(
                "Directory for {} at '{}' does not exist. Please create it manually.",
                file_type,
                parent.display()
            ));
        }
    }
    Ok(())
}

pub async fn run() -> Result<()> {
    // Initialize logging with tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting feedback summarization session");

    info!("Checking if feedback database is writable");
    check_file_is_writable(&args.feedback_db, "feedback database")?;

    let feedback_manager = SqliteConnectionManager::file(&args.feedback_db);
    let feedback_pool = Pool::new(feedback_manager)?;

    {
        let mut conn = feedback_pool.get()?;
        crate::init_feedback_db(&mut conn)?;
    }

    let state = crate::create_app_state(crate::AppConfig {
        feedback_pool,
        groq_api_key: args.groq_api_key.clone(),
        groq_api_base: args.groq_api_base.clone(),
        summary_model: args.summary_model.clone(),
    });

    // Summarization is the whole point of the session; refuse to start
    // without a usable credential instead of failing on the first request.
    if state.chat_client.is_none() {
        return Err(anyhow::anyhow!(
            "GROQ_API_KEY is not set; provide it via the environment, a .env file or --groq-api-key"
        ));
    }

    let mut dataset = load_dataset(args.csv.clone())?;
    println!("File loaded successfully!");

    loop {
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .items(&[
                "Generate summary",
                "Performance analysis",
                "Show stored summaries",
                "Load another CSV",
                "Quit",
            ])
            .default(0)
            .interact()?;

        // Every action is scoped to one pass of the loop: errors are shown
        // and the session continues.
        let outcome = match choice {
            0 => summarize(&state, &dataset).await,
            1 => analyze(&dataset),
            2 => show_stored(&state).await,
            3 => match load_dataset(None) {
                Ok(loaded) => {
                    dataset = loaded;
                    println!("File loaded successfully!");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            _ => break,
        };

        if let Err(e) = outcome {
            error!("{}", e);
            println!("Error: {}", e);
        }
    }

    Ok(())
}

fn load_dataset(csv: Option<PathBuf>) -> Result<FeedbackDataset> {
    let path = match csv {
        Some(path) => path,
        None => {
            let entered: String = Input::new()
                .with_prompt("Path to the feedback CSV file")
                .interact_text()?;
            PathBuf::from(entered)
        }
    };
    FeedbackDataset::from_path(path)
}

/// Walks the user through kind and key selection, generates the summary
/// and appends it to the store.
async fn summarize(state: &Arc<AppState>, dataset: &FeedbackDataset) -> Result<()> {
    let labels: Vec<&str> = SummaryKind::ALL.iter().map(|k| k.label()).collect();
    let selected = Select::new()
        .with_prompt("Select a summary type")
        .items(&labels)
        .default(0)
        .interact()?;
    let kind = SummaryKind::ALL[selected];

    let key = match kind {
        SummaryKind::Overall => None,
        SummaryKind::ByCompany => {
            pick_key(dataset, COMPANY_COLUMN, "Select a company for the summary")?
        }
        SummaryKind::ByStudent => {
            pick_key(dataset, STUDENT_COLUMN, "Select a student for the summary")?
        }
        SummaryKind::ByMentor => {
            // Surface the missing-column error here so the user sees it
            // before any prompt is built.
            let mentor_column = match dataset
                .resolve_column(&MENTOR_COLUMN_CANDIDATES)
            {
                Ok(column) => column,
                Err(e) => {
                    println!(
                        "The column 'Faculty Mentor from VIIT' is missing in the uploaded CSV."
                    );
                    return Err(e.into());
                }
            };
            pick_key(dataset, mentor_column, "Select a VIIT mentor for the summary")?
        }
    };

    if kind.requires_key() && key.is_none() {
        println!("No values available to choose from for {}.", kind.label());
        return Ok(());
    }

    println!("Summarizing feedback data...");
    let text =
        summary::generate_summary(state, kind, dataset, key.as_deref()).await?;

    println!("Summary:");
    println!("{}", text);

    let record_id = summary::save_summary(
        state,
        kind.label(),
        key.as_deref().unwrap_or("All"),
        "N/A",
        &text,
    )
    .await?;
    println!("Summary saved to the database (id {}).", record_id);

    Ok(())
}

fn pick_key(
    dataset: &FeedbackDataset,
    column: &str,
    prompt: &str,
) -> Result<Option<String>> {
    let choices = dataset.distinct_values(column);
    if choices.is_empty() {
        return Ok(None);
    }
    let selected = Select::new()
        .with_prompt(prompt)
        .items(&choices)
        .default(0)
        .interact()?;
    Ok(Some(choices[selected].clone()))
}

/// Prints the per-company analysis: skill averages, hiring insights and
/// per-student performance, with an optional student drill-down.
fn analyze(dataset: &FeedbackDataset) -> Result<()> {
    let companies = dataset.distinct_values(COMPANY_COLUMN);
    if companies.is_empty() {
        println!(
            "The column '{}' is missing or empty in the uploaded CSV.",
            COMPANY_COLUMN
        );
        return Ok(());
    }

    let selected = Select::new()
        .with_prompt("Select a Company")
        .items(&companies)
        .default(0)
        .interact()?;
    let company = &companies[selected];

    let filtered = dataset.filter(COMPANY_COLUMN, company)?;
    println!("Analysis for {}", company);

    if filtered.is_empty() {
        println!("No records for this company.");
        return Ok(());
    }

    let averages = analytics::skill_averages(&filtered);
    if averages.is_empty() {
        println!("No skill rating columns found in the uploaded CSV.");
    } else {
        println!("Skill averages of students in the company:");
        for (skill, average) in &averages {
            println!("  {:<45} {:.2}", skill, average);
        }
    }

    match analytics::yes_count(&filtered, analytics::HIRE_COLUMN) {
        Some(count) => println!("Students considered for hiring: {}", count),
        None => println!("Hiring column not present; skipping hiring insight."),
    }
    match analytics::yes_count(&filtered, analytics::REHIRE_COLUMN) {
        Some(count) => println!("Positive rehire responses (Yes): {}", count),
        None => {
            println!("Rehire column not present; skipping rehire insight.")
        }
    }

    let performance = analytics::student_performance(&filtered);
    if !performance.is_empty() {
        let total: f64 = performance.iter().map(|(_, score)| score).sum();
        println!("Overall performance of students:");
        for (student, score) in &performance {
            println!("{}", performance_line(student, *score, total));
        }
    }

    // Optional per-student drill-down, 'All' skips it.
    let students = filtered.distinct_values(STUDENT_COLUMN);
    let mut student_choices = vec!["All".to_string()];
    student_choices.extend(students);
    let selected = Select::new()
        .with_prompt("Select a Student (Optional)")
        .items(&student_choices)
        .default(0)
        .interact()?;

    if selected > 0 {
        let student = &student_choices[selected];
        let student_rows = filtered.filter(STUDENT_COLUMN, student)?;
        let ratings = analytics::skill_averages(&student_rows);
        if ratings.is_empty() {
            println!("No ratings found for {}.", student);
        } else {
            println!("Performance of {}:", student);
            for (skill, rating) in &ratings {
                println!("  {:<45} {:.2}", skill, rating);
            }
        }
    }

    Ok(())
}

// Share of the total only makes sense with a positive total; all-zero
// scores fall back to a plain listing.
fn performance_line(student: &str, score: f64, total: f64) -> String {
    if total > 0.0 {
        format!(
            "  {:<30} {:.2} ({:.1}%)",
            student,
            score,
            100.0 * score / total
        )
    } else {
        format!("  {:<30} {:.2}", student, score)
    }
}

async fn show_stored(state: &Arc<AppState>) -> Result<()> {
    let records = summary::list_summaries(state).await?;
    if records.is_empty() {
        println!("No data found in the database.");
        return Ok(());
    }

    println!("Stored feedback summaries:");
    for record in records {
        println!(
            "ID: {}, Summary type: {}, Key: {}, Mentor: {}",
            record.id.unwrap_or_default(),
            record.company_name,
            record.student_name,
            record.viit_mentor_name
        );
        println!("Summary: {}", record.feedback_data);
        println!("---");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_file_is_writable, performance_line};

    #[test]
    fn performance_line_includes_share_of_total() {
        let line = performance_line("Alice", 3.0, 6.0);
        assert!(line.contains("3.00"));
        assert!(line.contains("(50.0%)"));
    }

    #[test]
    fn performance_line_with_zero_total_omits_share() {
        // All-zero scores must not render as NaN%.
        let line = performance_line("Alice", 0.0, 0.0);
        assert!(line.contains("0.00"));
        assert!(!line.contains('%'));
        assert!(!line.contains("NaN"));
    }

    #[test]
    fn writable_check_accepts_bare_filename() {
        assert!(check_file_is_writable("feedback_data.db", "feedback database")
            .is_ok());
    }

    #[test]
    fn writable_check_rejects_missing_directory() {
        let result = check_file_is_writable(
            "/no/such/directory/feedback_data.db",
            "feedback database",
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }
}
