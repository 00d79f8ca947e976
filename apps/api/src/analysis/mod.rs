// Skill/career analysis of a finished conversation.
// One completion call per run, validated before anything is stored.

pub mod handlers;
pub mod job;
pub mod prompts;
pub mod store;
pub mod validation;
