//! Remote collaborators: the scanning service and the advisory service.
//!
//! Both are consumed as opaque request/response contracts; this crate never
//! implements scanning or fix generation itself. The traits exist so the
//! CLI and the patch flow can run against mocks in tests.

mod http;

pub use http::{ApiClient, HealthStatus};

use crate::language::Language;
use crate::model::{AnalysisRecord, ScanResult, VulnerabilityRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Submits code for vulnerability scanning.
#[async_trait]
pub trait ScanService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scans `code` and returns the normalized result set.
    async fn scan(&self, code: &str, language: Language) -> Result<ScanResult>;
}

/// Fetches AI fix recommendations for located vulnerabilities.
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Requests an analysis for a single vulnerability.
    async fn fix_for(
        &self,
        vulnerability: &VulnerabilityRecord,
        code: &str,
        language: Language,
    ) -> Result<AnalysisRecord>;

    /// Requests analyses for a batch of vulnerabilities.
    ///
    /// Implementations may return fewer records than requested; callers fall
    /// back to [`AnalysisRecord::fallback_for`] for the rest.
    async fn fixes_for(
        &self,
        vulnerabilities: &[VulnerabilityRecord],
        code: &str,
        language: Language,
    ) -> Result<Vec<AnalysisRecord>>;
}
