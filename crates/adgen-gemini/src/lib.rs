//! Gemini integration for AdGen
//!
//! This crate provides the Gemini implementation of the AiGateway trait:
//! grounded market analysis, banner image generation and long-running video
//! generation with bounded polling.

mod client;
mod config;
mod wire;

#[cfg(test)]
mod tests;

pub use client::GeminiClient;
pub use config::{
    DEFAULT_ANALYSIS_MODEL, DEFAULT_API_URL, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL,
    GeminiConfig,
};

// Re-export core types for convenience
pub use adgen_core::{AiGateway, Error, GeneratedMedia, PollPolicy, Result};
