// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction keeping conversational replies free of markup.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
Keep responses clear, direct, and practical. \
Avoid using special formatting, asterisks, or markdown.";

/// Instruction that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Return only valid JSON. No extra explanations, markdown, or formatting.";
