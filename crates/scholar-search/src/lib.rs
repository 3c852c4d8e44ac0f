//! # scholar-search
//!
//! Academic literature search exposed as an agent tool.
//!
//! ```text
//! ┌──────────────────┐    ┌────────────────┐    ┌──────────────────────┐
//! │ ScholarSearchTool│───►│ SearchBackend  │───►│ HttpScholarBackend   │
//! │ (args, response) │    │   (Strategy)   │    │ + ResultParser       │
//! └──────────────────┘    └────────────────┘    │ StaticBackend (demo) │
//!                                               └──────────────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod model;
pub mod parse;
pub mod svckit;

pub use backend::{HttpScholarBackend, SearchBackend, StaticBackend};
pub use error::{Result, ScholarError};
pub use model::{ScholarResult, SearchQuery, SearchResponse};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{ScholarSearchTool, TOOL_NAME};
}
