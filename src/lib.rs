//! Lyric segmentation and topic exploration pipeline.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod llm;
pub mod logging;
pub mod topics;
