//! Stages that query a local language model.

pub mod client;
pub mod consistency;
pub mod themes;

pub use client::{GenerateRequest, OllamaClient, TextGenerator};
