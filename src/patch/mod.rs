//! Heuristic fix application.
//!
//! Four pure, line-based transformations, run in sequence by
//! [`apply_fix`]:
//!
//! 1. [`extract_replacement`] - pull replacement code out of unstructured
//!    advisory text
//! 2. [`locate_region`] - bound the vulnerable construct with keyword and
//!    brace-balance heuristics
//! 3. [`splice`] - swap the located region for the replacement, yielding a
//!    new buffer
//! 4. [`reconcile`] - drop the resolved vulnerability and its analysis from
//!    the result set
//!
//! None of these stages depends on a language grammar; braces inside string
//! literals or comments count like structural braces, and comment stripping
//! can clip literal content that resembles comment syntax. That bluntness is
//! intentional and covered by the stage fallbacks: heuristic shortfalls are
//! resolved locally, never raised as errors. Only structurally invalid input
//! (empty buffer, out-of-range line) reaches [`PatchError`], and then the
//! caller's buffer and result set are left untouched.

mod apply;
mod extract;
mod locate;
mod reconcile;
mod splice;

pub use apply::{apply_fix, AppliedFix};
pub use extract::extract_replacement;
pub use locate::locate_region;
pub use reconcile::reconcile;
pub use splice::splice;

use thiserror::Error;

/// Structural failures of the apply-fix operation.
///
/// Heuristic misses never surface here; every stage has an internal
/// fallback. These cover only input the stages cannot clamp into shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("advisory text is empty, nothing to apply")]
    EmptyAdvisory,

    #[error("source buffer is empty, nothing to patch")]
    EmptyBuffer,

    #[error("vulnerability line {0} is outside the source buffer")]
    LineOutOfRange(usize),

    #[error("located region {start}..={end} does not fit the buffer")]
    InvalidRegion { start: usize, end: usize },
}
