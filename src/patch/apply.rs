use crate::model::{Region, ScanResult, SourceBuffer, VulnerabilityRecord};
use crate::patch::{extract_replacement, locate_region, reconcile, splice, PatchError};
use tracing::debug;

/// Outcome of a successful apply-fix operation.
///
/// Both the buffer and the result set are fresh values; the caller's inputs
/// are still valid for diffing or undo.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedFix {
    pub buffer: SourceBuffer,
    pub result: ScanResult,
    /// The region of the original buffer that was replaced.
    pub region: Region,
    /// The replacement text that was spliced in.
    pub replacement: String,
}

/// Applies one advisory fix to the buffer and reconciles the result set.
///
/// Runs the four patch stages in their fixed order: extract, locate, splice,
/// reconcile. Each stage resolves its own heuristic shortfalls with the
/// documented fallbacks, so the only failures are structural: an empty
/// advisory, an empty buffer, a line number outside the buffer, or a region
/// that cannot be clamped into it. On any failure the operation stops
/// immediately and the caller's `buffer` and `result` are untouched.
///
/// Callers serialize apply-fix actions against the same buffer themselves;
/// the stages hold no state between invocations.
pub fn apply_fix(
    vulnerability: &VulnerabilityRecord,
    advisory_text: &str,
    buffer: &SourceBuffer,
    result: &ScanResult,
) -> Result<AppliedFix, PatchError> {
    if advisory_text.trim().is_empty() {
        return Err(PatchError::EmptyAdvisory);
    }
    if buffer.is_empty() {
        return Err(PatchError::EmptyBuffer);
    }
    if vulnerability.line == 0 || vulnerability.line > buffer.len() {
        return Err(PatchError::LineOutOfRange(vulnerability.line));
    }

    debug!(id = %vulnerability.id, category = %vulnerability.category, "extracting replacement");
    let replacement = extract_replacement(advisory_text);

    debug!(line = vulnerability.line, "locating vulnerable construct");
    let region = locate_region(buffer, vulnerability.line);
    let region = region
        .clamp_to(buffer.len())
        .ok_or(PatchError::InvalidRegion {
            start: region.start,
            end: region.end,
        })?;

    debug!(%region, replaced = region.len(), "splicing replacement");
    let patched = splice(buffer, region, &replacement);

    debug!(id = %vulnerability.id, "reconciling result set");
    let reconciled = reconcile(result, &vulnerability.id);

    Ok(AppliedFix {
        buffer: patched,
        result: reconciled,
        region,
        replacement,
    })
}
