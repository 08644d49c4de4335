//! Core traits and types for AdGen
//!
//! This crate defines the shared vocabulary of the campaign generator: the
//! domain records, the error type, and the capability-facing interfaces for the
//! AI gateway, campaign persistence and generated media storage. Keeping the
//! interfaces here lets the workflow controller be tested against fakes.

pub mod error;
pub mod gateway;
pub mod poll;
pub mod store;
pub mod types;


pub use error::{Error, Result};
pub use gateway::{AiGateway, GeneratedMedia, KeySelector};
pub use poll::{Backoff, PollPolicy};
pub use store::{Artifact, ArtifactId, ArtifactStore, CampaignStore};
pub use types::*;
