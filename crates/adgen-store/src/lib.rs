//! Storage implementations for AdGen
//!
//! Campaigns and generated media live for the process lifetime only.

mod artifact;
mod campaign;

pub use artifact::InMemoryArtifactStore;
pub use campaign::InMemoryCampaignStore;

// Re-export core types for convenience
pub use adgen_core::{Artifact, ArtifactId, ArtifactStore, Campaign, CampaignStore, Error, Result};
