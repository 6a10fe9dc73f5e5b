pub mod decider;
pub mod error;
pub mod ollama;
