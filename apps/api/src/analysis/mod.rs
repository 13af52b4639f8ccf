// Resume analysis flow.
// Prompt templates, per-session memory, orchestration and the form handlers.
// All completion calls go through llm_client, never directly from here.

pub mod controller;
pub mod handlers;
pub mod mode;
pub mod prompts;
pub mod session;
