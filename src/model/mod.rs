//! Core data types for vulnerabilities, advisory analysis, and scan results.
//!
//! This module contains the fundamental types used throughout codats:
//!
//! - [`VulnerabilityRecord`] - A vulnerability located by the scanning service
//! - [`AnalysisRecord`] - An AI fix recommendation for one vulnerability
//! - [`ScanResult`] - The active result set for one scanned buffer
//! - [`SourceBuffer`] - The scanned source as an ordered line sequence
//! - [`Region`] - An inclusive 0-based line range inside a buffer
//!
//! # Example
//!
//! ```
//! use codats::{ScanResult, SourceBuffer};
//!
//! let buffer = SourceBuffer::from_source("let x = 1;\nlet y = 2;");
//! let result = ScanResult::new(vec![], 0);
//!
//! println!("{} lines, {} findings", buffer.len(), result.total_vulnerabilities);
//! ```

mod buffer;
mod finding;

pub use buffer::*;
pub use finding::*;
