use crate::dataset::FeedbackDataset;
use crate::openai::ChatClientTrait;
use crate::prompts::{
    self, SummaryKind, SUMMARY_DATA_PROMPT, SUMMARY_SYSTEM_PROMPT,
};
use crate::AppState;
use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// One stored summary. The column naming follows the feedback store:
/// `company_name` holds the grouping label, `student_name` the chosen key
/// (or "All" for an overall summary) and `viit_mentor_name` a placeholder.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub id: Option<i64>,
    pub company_name: String,
    pub student_name: String,
    pub viit_mentor_name: String,
    pub feedback_data: String,
}

/// Generates a summary for the chosen grouping using the state's chat
/// client and model.
pub async fn generate_summary(
    state: &AppState,
    kind: SummaryKind,
    dataset: &FeedbackDataset,
    key: Option<&str>,
) -> Result<String> {
    let client = state.chat_client.as_ref().cloned().ok_or_else(|| {
        anyhow::anyhow!("Chat client not configured; set GROQ_API_KEY")
    })?;
    generate_summary_with_client(
        client,
        &state.summary_model,
        kind,
        dataset,
        key,
    )
    .await
}

/// Sends the three-message summarization exchange: a system role, the user
/// request for the chosen grouping, and a second system message carrying
/// the serialized feedback data.
#[instrument(skip(client, dataset), err)]
pub async fn generate_summary_with_client(
    client: Arc<dyn ChatClientTrait>,
    model: &str,
    kind: SummaryKind,
    dataset: &FeedbackDataset,
    key: Option<&str>,
) -> Result<String> {
    let prompt_text = prompts::build_prompt(kind, dataset, key)?;

    info!("Building messages for {}", kind.label());
    let system_message = ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(SUMMARY_SYSTEM_PROMPT)
            .build()
            .map_err(|e| {
                anyhow::anyhow!("Failed to build system message: {}", e)
            })?,
    );

    let user_message = ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(format!(
                "Summarize the feedback data for {}.",
                kind.label()
            ))
            .build()
            .map_err(|e| {
                anyhow::anyhow!("Failed to build user message: {}", e)
            })?,
    );

    let data_message = ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(SUMMARY_DATA_PROMPT.replace("{feedback_data}", &prompt_text))
            .build()
            .map_err(|e| {
                anyhow::anyhow!("Failed to build data message: {}", e)
            })?,
    );

    let response = client
        .chat_completion(
            model.to_string(),
            vec![system_message, user_message, data_message],
        )
        .await
        .map_err(|e| {
            anyhow::anyhow!("Failed to create chat completion: {}", e)
        })?;

    let summary = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_ref())
        .map(String::from)
        .unwrap_or_else(|| "No summary generated".to_string());

    info!("{} received", kind.label());

    Ok(clean_response(&summary))
}

/// Normalizes the newline spacing of a model response: collapses doubled
/// newlines, then reinserts blank lines between every remaining line.
pub fn clean_response(content: &str) -> String {
    content.replace("\n\n", "\n").replace('\n', "\n\n")
}

// Append one summary record; single insert, id comes back from SQLite.
#[instrument(skip(state, feedback_data), err)]
pub async fn save_summary(
    state: &AppState,
    company_name: &str,
    student_name: &str,
    viit_mentor_name: &str,
    feedback_data: &str,
) -> Result<i64> {
    info!("Saving summary for '{}'", company_name);
    let conn = state.feedback_db.get()?;

    let id = conn.query_row(
        "INSERT INTO feedback (
            company_name, student_name, viit_mentor_name, feedback_data
        ) VALUES (?, ?, ?, ?)
        RETURNING id",
        params![company_name, student_name, viit_mentor_name, feedback_data],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// All stored summaries, oldest first.
#[instrument(skip(state), err)]
pub async fn list_summaries(state: &AppState) -> Result<Vec<SummaryRecord>> {
    let conn = state.feedback_db.get()?;

    let mut stmt = conn.prepare(
        "SELECT id, company_name, student_name, viit_mentor_name, feedback_data
         FROM feedback
         ORDER BY id",
    )?;

    let records = stmt.query_map([], |row| {
        Ok(SummaryRecord {
            id: Some(row.get(0)?),
            company_name: row.get(1)?,
            student_name: row.get(2)?,
            viit_mentor_name: row.get(3)?,
            feedback_data: row.get(4)?,
        })
    })?;

    let records: Result<Vec<_>, _> = records.collect();
    Ok(records?)
}
