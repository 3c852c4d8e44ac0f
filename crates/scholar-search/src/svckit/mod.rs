//! Agent tools backed by the search backends

mod scholar_search;

pub use scholar_search::{ScholarSearchTool, TOOL_NAME};
