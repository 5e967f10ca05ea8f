/// AI tutor module
///
/// A thin client for an OpenAI-compatible chat-completion endpoint.
/// Failures never escape `TutorClient::ask`; they come back as
/// `"Error: ..."` text for the UI to display.

pub mod client;
mod wire;

pub use client::{TutorClient, TUTOR_SYSTEM_PROMPT};
