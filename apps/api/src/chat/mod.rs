// Career-guidance chat: session persistence, context trimming, reply formatting.
// All completion calls go through llm_client, never to a provider directly.

pub mod formatter;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod store;
pub mod trimmer;
