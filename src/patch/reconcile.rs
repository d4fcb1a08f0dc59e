use crate::model::ScanResult;
use tracing::debug;

/// Drops the resolved vulnerability and its analysis from the result set.
///
/// Returns a new result with the matching [`VulnerabilityRecord`] and any
/// [`AnalysisRecord`] for `resolved_id` removed and
/// `total_vulnerabilities` recomputed. An absent id is a no-op rather than
/// an error, which also makes the operation idempotent. The scan-time risk
/// score and severity summary are carried over unchanged; they describe the
/// scan, not the remaining findings.
///
/// [`VulnerabilityRecord`]: crate::model::VulnerabilityRecord
/// [`AnalysisRecord`]: crate::model::AnalysisRecord
pub fn reconcile(result: &ScanResult, resolved_id: &str) -> ScanResult {
    let vulnerabilities: Vec<_> = result
        .vulnerabilities
        .iter()
        .filter(|v| v.id != resolved_id)
        .cloned()
        .collect();
    let analysis: Vec<_> = result
        .analysis
        .iter()
        .filter(|a| a.vulnerability_id != resolved_id)
        .cloned()
        .collect();

    debug!(
        resolved_id,
        remaining = vulnerabilities.len(),
        "reconciled result set"
    );

    let total_vulnerabilities = vulnerabilities.len();
    ScanResult {
        vulnerabilities,
        analysis,
        total_vulnerabilities,
        risk_score: result.risk_score,
        summary: result.summary,
    }
}
