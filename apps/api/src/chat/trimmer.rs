//! Context trimming. Bounds the history sent to the completion provider.
//!
//! Policy: the first system message (if any) leads, followed by the most recent
//! `CONTEXT_WINDOW` non-system messages in their original order.

use crate::models::session::Message;

/// Non-system messages kept per request: 3 user/assistant exchanges.
pub const CONTEXT_WINDOW: usize = 6;

pub fn trim_context(messages: &[Message]) -> Vec<&Message> {
    let mut trimmed = Vec::with_capacity(CONTEXT_WINDOW + 1);

    if let Some(system) = messages.iter().find(|m| m.is_system()) {
        trimmed.push(system);
    }

    let recent: Vec<&Message> = messages.iter().filter(|m| !m.is_system()).collect();
    let start = recent.len().saturating_sub(CONTEXT_WINDOW);
    trimmed.extend_from_slice(&recent[start..]);

    trimmed
}
