//! spendopt-core - Core library for spendopt
//!
//! Provides the spend optimization engine, history parsers, campaign store
//! and result export.

pub mod config;
pub mod error;
pub mod export;
pub mod optimizer;
pub mod parsers;
pub mod store;

pub use config::OptimizerConfig;
pub use error::{CoreError, ErrorSeverity, LoadError, LoadReport};
pub use export::{export_results_to_csv, export_results_to_json};
pub use optimizer::{compute_optimal_spend, FitDiagnostics, SpendOptimizer};
pub use parsers::{HistoryFile, HistoryFormat, HistoryParser};
pub use store::{HistorySource, HistoryStore};

pub use spendopt_types::{AnalysisType, HistoryPoint, OptimizationResult, SpendAction};
