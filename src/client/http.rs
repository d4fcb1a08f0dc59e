use crate::client::{AdvisoryService, ScanService};
use crate::config::Config;
use crate::language::Language;
use crate::model::{AnalysisRecord, ScanResult, VulnerabilityRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the scan and advisory endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    scan_timeout: Duration,
    fix_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            scan_timeout: Duration::from_secs(60),
            // AI analysis is slow; the advisory endpoints get a longer leash
            fix_timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(config.api_base_url.clone());
        client.scan_timeout = Duration::from_secs(config.scan_timeout_secs);
        client.fix_timeout = Duration::from_secs(config.fix_timeout_secs);
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probes the API health endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.probe("/api/health").await
    }

    /// Probes the advisory (AI) health endpoint.
    pub async fn ai_health(&self) -> Result<HealthStatus> {
        self.probe("/api/ai-health").await
    }

    async fn probe(&self, path: &str) -> Result<HealthStatus> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .with_context(|| format!("health probe {} failed", path))?;

        let status = response.status();
        let body: HealthStatus = response.json().await.unwrap_or_else(|_| HealthStatus {
            healthy: status.is_success(),
            message: None,
        });
        Ok(body)
    }
}

#[async_trait]
impl ScanService for ApiClient {
    fn name(&self) -> &'static str {
        "codats API"
    }

    async fn scan(&self, code: &str, language: Language) -> Result<ScanResult> {
        debug!(%language, bytes = code.len(), "submitting scan request");

        let response = self
            .client
            .post(self.url("/api/scan"))
            .timeout(self.scan_timeout)
            .json(&ScanRequest { code, language })
            .send()
            .await
            .context("scan request failed")?
            .error_for_status()
            .context("scan service rejected the request")?;

        let result: ScanResult = response
            .json()
            .await
            .context("scan response was not valid JSON")?;

        debug!(
            vulnerabilities = result.vulnerabilities.len(),
            risk_score = result.risk_score,
            "scan response received"
        );
        Ok(result.normalized())
    }
}

#[async_trait]
impl AdvisoryService for ApiClient {
    fn name(&self) -> &'static str {
        "codats API"
    }

    async fn fix_for(
        &self,
        vulnerability: &VulnerabilityRecord,
        code: &str,
        language: Language,
    ) -> Result<AnalysisRecord> {
        debug!(id = %vulnerability.id, "requesting advisory fix");

        let response = self
            .client
            .post(self.url("/api/fix/single"))
            .timeout(self.fix_timeout)
            .json(&FixRequest {
                vulnerability,
                code,
                language,
            })
            .send()
            .await
            .context("fix request failed")?
            .error_for_status()
            .context("advisory service rejected the request")?;

        let body: FixResponse = response
            .json()
            .await
            .context("fix response was not valid JSON")?;

        Ok(AnalysisRecord {
            vulnerability_id: vulnerability.id.clone(),
            explanation: body.explanation,
            fix: body.fix,
            confidence: body.confidence.clamp(0.0, 1.0),
        })
    }

    async fn fixes_for(
        &self,
        vulnerabilities: &[VulnerabilityRecord],
        code: &str,
        language: Language,
    ) -> Result<Vec<AnalysisRecord>> {
        if vulnerabilities.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = vulnerabilities.len(), "requesting batch advisory fixes");

        let batch = self
            .client
            .post(self.url("/api/fix"))
            .timeout(self.fix_timeout)
            .json(&BatchFixRequest {
                vulnerabilities,
                code,
                language,
            })
            .send()
            .await;

        match batch {
            Ok(response) => {
                if let Ok(body) = response.json::<BatchFixResponse>().await {
                    if body.success && !body.analysis.is_empty() {
                        return Ok(body.analysis);
                    }
                }
                warn!("batch advisory endpoint returned no analysis, falling back to single requests");
            }
            Err(e) => {
                warn!(error = %e, "batch advisory request failed, falling back to single requests");
            }
        }

        // One request per vulnerability, in flight concurrently. Failures for
        // individual records are dropped here; the caller synthesizes
        // fallback analyses for anything missing.
        let singles = join_all(
            vulnerabilities
                .iter()
                .map(|v| self.fix_for(v, code, language)),
        )
        .await;

        Ok(singles.into_iter().filter_map(Result::ok).collect())
    }
}

/// Body of `POST /api/scan`.
#[derive(Serialize)]
struct ScanRequest<'a> {
    code: &'a str,
    language: Language,
}

/// Body of `POST /api/fix/single`.
#[derive(Serialize)]
struct FixRequest<'a> {
    vulnerability: &'a VulnerabilityRecord,
    code: &'a str,
    language: Language,
}

/// Body of `POST /api/fix`.
#[derive(Serialize)]
struct BatchFixRequest<'a> {
    vulnerabilities: &'a [VulnerabilityRecord],
    code: &'a str,
    language: Language,
}

#[derive(Deserialize)]
struct FixResponse {
    explanation: String,
    fix: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct BatchFixResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    analysis: Vec<AnalysisRecord>,
}

/// Response shape of the health endpoints.
#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub message: Option<String>,
}
