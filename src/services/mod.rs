//! Service layer modules for external integrations.
//!
//! Contains the client for AI service communication.

pub mod ai_client;

pub use ai_client::AiClient;
