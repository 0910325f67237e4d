use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the interactive feedback summarizer
#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// CSV file with the internship feedback records; prompted for when
    /// not given
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Path to the feedback summary database
    #[arg(long, default_value = "feedback_data.db", env = "FEEDBACK_DB")]
    pub feedback_db: String,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY")]
    pub groq_api_key: Option<String>,

    /// Groq API base URL (OpenAI-compatible)
    #[arg(long, env = "GROQ_API_BASE")]
    pub groq_api_base: Option<String>,

    /// Model used for summaries
    #[arg(long, default_value = "llama3-8b-8192")]
    pub summary_model: String,
}
