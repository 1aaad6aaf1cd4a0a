//! Completion gateway implementations for Askbase.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatGateway;
