//! Analysis Job: turns a whole conversation into a skill/career summary.
//!
//! Flow: load session → render transcript → write transcript file → one completion call
//!       → write raw output file → validate → store `AnalysisResult`.
//!
//! The raw output file is written before validation so malformed responses can
//! still be inspected; nothing reaches the store unless validation passes.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::validation::parse_analysis;
use crate::errors::AppError;
use crate::llm_client::{ChatTurn, CompletionParams};
use crate::models::analysis::AnalysisResult;
use crate::models::session::{Message, Role};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Transcript file under the chat log directory.
    pub filename: String,
    /// Raw provider output under the analysis directory.
    pub formatted_response_filename: String,
    pub result: AnalysisResult,
}

/// Renders non-system messages as `User: …` / `Assistant: …` paragraphs.
pub fn render_conversation<'a>(messages: impl IntoIterator<Item = &'a Message>) -> String {
    messages
        .into_iter()
        .filter(|m| !m.is_system())
        .map(|m| {
            let speaker = match m.role {
                Role::User => "User",
                _ => "Assistant",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn run_analysis(
    state: &AppState,
    owner_id: Uuid,
    chat_id: Uuid,
) -> Result<AnalysisOutcome, AppError> {
    let session = state
        .sessions
        .find(owner_id, chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

    let conversation = render_conversation(&session.messages);
    if conversation.is_empty() {
        return Err(AppError::Validation(
            "Chat has no messages to analyze".to_string(),
        ));
    }

    let started_at = Utc::now();
    let filename = state
        .chat_log
        .write_record("chat", chat_id, started_at, &conversation)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let prompt = build_analysis_prompt(
        &chat_id.to_string(),
        &started_at.to_rfc3339(),
        &conversation,
    );
    let raw = state
        .completion
        .complete(
            &[ChatTurn::new(Role::User, prompt)],
            &CompletionParams::analysis(),
        )
        .await?;

    let formatted_response_filename = state
        .analysis_log
        .write_record("analysis", chat_id, started_at, &raw)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let analysis = parse_analysis(&raw).map_err(|problems| {
        warn!(
            "Analysis for chat {chat_id} failed validation ({} problems), raw output in {}",
            problems.len(),
            formatted_response_filename
        );
        AppError::MalformedAnalysis(problems)
    })?;

    let result = AnalysisResult {
        id: Uuid::new_v4(),
        session_id: chat_id,
        owner_id,
        timestamp: Utc::now(),
        analysis,
        raw_response: raw,
    };
    state.analyses.insert(&result).await?;

    info!("Analysis {} completed for chat {chat_id}", result.id);

    Ok(AnalysisOutcome {
        filename,
        formatted_response_filename,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, TestHarness, VALID_ANALYSIS};

    #[test]
    fn test_render_conversation_skips_system() {
        let messages = vec![
            Message::new(Role::System, "secret prompt"),
            Message::new(Role::User, "I like databases"),
            Message::new(Role::Assistant, "Consider data engineering"),
        ];
        assert_eq!(
            render_conversation(&messages),
            "User: I like databases\n\nAssistant: Consider data engineering"
        );
    }

    #[test]
    fn test_render_empty_conversation() {
        let messages = vec![Message::new(Role::System, "secret prompt")];
        assert_eq!(render_conversation(&messages), "");
    }

    async fn seeded_chat(state: &AppState, owner: Uuid) -> Uuid {
        let session = state.sessions.create(owner, "system").await.unwrap();
        state
            .sessions
            .append(
                owner,
                session.id,
                &[
                    Message::new(Role::User, "I enjoy building APIs in Rust"),
                    Message::new(Role::Assistant, "Backend roles would suit you"),
                ],
            )
            .await
            .unwrap();
        session.id
    }

    #[tokio::test]
    async fn test_valid_analysis_is_stored() {
        let TestHarness { state, completion, scratch: _scratch, .. } = test_state();
        completion.push_reply(VALID_ANALYSIS);
        let owner = Uuid::new_v4();
        let chat_id = seeded_chat(&state, owner).await;

        let outcome = run_analysis(&state, owner, chat_id).await.unwrap();

        let analysis = &outcome.result.analysis;
        assert_eq!(analysis.skills.len(), 5);
        assert!(analysis.skills.values().all(|s| *s <= 10));
        for career in [&analysis.career1, &analysis.career2, &analysis.career3] {
            assert!(!career.title.is_empty());
            assert!(!career.description.is_empty());
        }

        let stored = state.analyses.latest(Some(owner)).await.unwrap().unwrap();
        assert_eq!(stored.id, outcome.result.id);
        assert_eq!(stored.session_id, chat_id);

        let transcript =
            std::fs::read_to_string(state.chat_log.dir().join(&outcome.filename)).unwrap();
        assert!(!transcript.contains("system"));
        assert!(transcript.starts_with("User: I enjoy building APIs in Rust"));

        let raw = std::fs::read_to_string(
            state
                .analysis_log
                .dir()
                .join(&outcome.formatted_response_filename),
        )
        .unwrap();
        assert_eq!(raw, VALID_ANALYSIS);
    }

    #[tokio::test]
    async fn test_single_user_message_without_history_in_request() {
        let TestHarness { state, completion, scratch: _scratch, .. } = test_state();
        completion.push_reply(VALID_ANALYSIS);
        let owner = Uuid::new_v4();
        let chat_id = seeded_chat(&state, owner).await;

        run_analysis(&state, owner, chat_id).await.unwrap();

        let requests = completion.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 1);
        assert_eq!(requests[0][0].role, Role::User);
        assert!(requests[0][0]
            .content
            .contains("Assistant: Backend roles would suit you"));
    }

    #[tokio::test]
    async fn test_malformed_output_is_not_stored_but_kept_on_disk() {
        let TestHarness { state, completion, scratch: _scratch, .. } = test_state();
        completion.push_reply("Sure! The user is great at tech.");
        let owner = Uuid::new_v4();
        let chat_id = seeded_chat(&state, owner).await;

        let err = run_analysis(&state, owner, chat_id).await.unwrap_err();

        assert!(matches!(err, AppError::MalformedAnalysis(_)));
        assert!(state.analyses.latest(None).await.unwrap().is_none());
        assert_eq!(
            std::fs::read_dir(state.analysis_log.dir()).unwrap().count(),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_conversation_is_rejected_without_provider_call() {
        let TestHarness { state, completion, scratch: _scratch, .. } = test_state();
        let owner = Uuid::new_v4();
        let session = state.sessions.create(owner, "system").await.unwrap();

        let err = run_analysis(&state, owner, session.id).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(completion.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_chat_is_not_found() {
        let TestHarness { state, scratch: _scratch, .. } = test_state();
        let err = run_analysis(&state, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
