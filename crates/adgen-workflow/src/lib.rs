//! Workflow controller for AdGen
//!
//! Sequences the research, creative generation and save steps over the
//! capability traits from `adgen-core`, holding the transient session state.

mod controller;
mod state;


pub use controller::{WorkflowController, normalize_url};
pub use state::{
    ANALYSIS_FAILED_MESSAGE, Action, GENERATION_FAILED_MESSAGE, Notice, NoticeLevel,
    STALLED_MESSAGE, Step, VALIDATION_MESSAGE, View, WorkflowState, reduce,
};

// Re-export core types for convenience
pub use adgen_core::{Error, Result};
