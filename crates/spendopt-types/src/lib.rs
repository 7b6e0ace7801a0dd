//! spendopt-types - Shared data types for spendopt
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types.
//!
//! Used by:
//! - spendopt-core (engine, parsers, store)
//! - spendopt (CLI)
//! - any dashboard frontend that renders the optimization badge

pub mod history;
pub mod optimization;

pub use history::HistoryPoint;
pub use optimization::{AnalysisType, OptimizationResult, SpendAction};
