pub mod client;
pub mod config;
pub mod language;
pub mod model;
pub mod patch;
pub mod report;

pub use client::ApiClient;
pub use config::Config;
pub use language::Language;
pub use model::{
    AnalysisRecord, Region, ScanResult, ScanSummary, Severity, SourceBuffer, VulnerabilityRecord,
};
pub use patch::{apply_fix, AppliedFix, PatchError};
