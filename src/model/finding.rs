use serde::{Deserialize, Serialize};

/// Severity assigned to a vulnerability by the scanning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Sort key, most severe first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A vulnerability located by the scanning service.
///
/// Records are read-only inputs: the patch core never edits one, it only
/// drops resolved records from the next [`ScanResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityRecord {
    /// Identifier unique within one scan result.
    pub id: String,
    /// Category label, e.g. "SQL Injection".
    #[serde(rename = "type")]
    pub category: String,
    pub severity: Severity,
    /// 1-based line in the scanned buffer.
    pub line: usize,
    /// The vulnerable text as the scanner saw it.
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rule-based remediation suggestion from the scanner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// An AI fix recommendation for one vulnerability.
///
/// `fix` is raw advisory text: it may contain prose, a tagged fenced code
/// block, or plain code. The patch extractor decides what to splice in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub vulnerability_id: String,
    pub explanation: String,
    pub fix: String,
    /// Advisory confidence in [0, 1].
    pub confidence: f64,
}

impl AnalysisRecord {
    /// Synthesizes an analysis from the vulnerability's own rule-based
    /// suggestion, for when the advisory service returned nothing for it.
    pub fn fallback_for(vulnerability: &VulnerabilityRecord) -> Self {
        Self {
            vulnerability_id: vulnerability.id.clone(),
            explanation: vulnerability
                .description
                .clone()
                .unwrap_or_else(|| "No detailed explanation available.".to_string()),
            fix: vulnerability.fix.clone().unwrap_or_else(|| {
                "Please review the vulnerable code and apply security best practices."
                    .to_string()
            }),
            confidence: 0.7,
        }
    }

    pub fn confidence_label(&self) -> &'static str {
        if self.confidence >= 0.8 {
            "High Confidence"
        } else if self.confidence >= 0.6 {
            "Medium Confidence"
        } else {
            "Low Confidence"
        }
    }
}

/// Vulnerability counts by severity, as reported with a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ScanSummary {
    pub fn tally(vulnerabilities: &[VulnerabilityRecord]) -> Self {
        let mut summary = Self::default();
        for v in vulnerabilities {
            match v.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// The active result set for one scanned buffer.
///
/// Invariant: `total_vulnerabilities` always equals `vulnerabilities.len()`.
/// Construct through [`ScanResult::new`] or normalize wire data with
/// [`ScanResult::normalized`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub vulnerabilities: Vec<VulnerabilityRecord>,
    /// Zero-or-one analysis per vulnerability id.
    #[serde(rename = "aiAnalysis", default)]
    pub analysis: Vec<AnalysisRecord>,
    #[serde(default)]
    pub total_vulnerabilities: usize,
    /// 0-100, higher is worse.
    #[serde(default)]
    pub risk_score: u8,
    #[serde(default)]
    pub summary: ScanSummary,
}

impl ScanResult {
    pub fn new(vulnerabilities: Vec<VulnerabilityRecord>, risk_score: u8) -> Self {
        let total_vulnerabilities = vulnerabilities.len();
        let summary = ScanSummary::tally(&vulnerabilities);
        Self {
            vulnerabilities,
            analysis: Vec::new(),
            total_vulnerabilities,
            risk_score,
            summary,
        }
    }

    /// Restores the count invariant after deserializing data we did not
    /// produce ourselves.
    pub fn normalized(mut self) -> Self {
        self.total_vulnerabilities = self.vulnerabilities.len();
        self
    }

    pub fn with_analysis(mut self, analysis: Vec<AnalysisRecord>) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn vulnerability(&self, id: &str) -> Option<&VulnerabilityRecord> {
        self.vulnerabilities.iter().find(|v| v.id == id)
    }

    /// The analysis for a vulnerability id, if the advisory service produced
    /// one.
    pub fn analysis_for(&self, vulnerability_id: &str) -> Option<&AnalysisRecord> {
        self.analysis
            .iter()
            .find(|a| a.vulnerability_id == vulnerability_id)
    }

    pub fn is_clean(&self) -> bool {
        self.vulnerabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vuln(id: &str, severity: Severity, line: usize) -> VulnerabilityRecord {
        VulnerabilityRecord {
            id: id.to_string(),
            category: "SQL Injection".to_string(),
            severity,
            line,
            snippet: "query(\"SELECT * FROM users WHERE id = \" + id)".to_string(),
            description: Some("User input reaches a SQL query unescaped.".to_string()),
            fix: Some("Use a parameterized query.".to_string()),
        }
    }

    #[test]
    fn test_severity_rank_order() {
        assert!(Severity::Critical.rank() < Severity::High.rank());
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn test_scan_result_new_keeps_count_invariant() {
        let result = ScanResult::new(
            vec![
                vuln("v1", Severity::High, 3),
                vuln("v2", Severity::Low, 9),
            ],
            42,
        );

        assert_eq!(result.total_vulnerabilities, 2);
        assert_eq!(result.summary.high, 1);
        assert_eq!(result.summary.low, 1);
        assert_eq!(result.summary.total(), 2);
    }

    #[test]
    fn test_normalized_repairs_wire_count() {
        let json = r#"{
            "vulnerabilities": [{
                "id": "v1",
                "type": "XSS",
                "severity": "High",
                "line": 4,
                "snippet": "el.innerHTML = input"
            }],
            "totalVulnerabilities": 7,
            "riskScore": 55
        }"#;

        let result: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_vulnerabilities, 7);

        let result = result.normalized();
        assert_eq!(result.total_vulnerabilities, 1);
        assert_eq!(result.vulnerabilities[0].category, "XSS");
        assert_eq!(result.risk_score, 55);
    }

    #[test]
    fn test_analysis_lookup() {
        let analysis = AnalysisRecord {
            vulnerability_id: "v2".to_string(),
            explanation: "Concatenated SQL allows injection.".to_string(),
            fix: "Use placeholders.".to_string(),
            confidence: 0.9,
        };
        let result = ScanResult::new(vec![vuln("v2", Severity::Critical, 1)], 80)
            .with_analysis(vec![analysis.clone()]);

        assert_eq!(result.analysis_for("v2"), Some(&analysis));
        assert_eq!(result.analysis_for("v9"), None);
    }

    #[test]
    fn test_fallback_analysis_uses_record_fields() {
        let v = vuln("v1", Severity::Medium, 5);
        let fallback = AnalysisRecord::fallback_for(&v);

        assert_eq!(fallback.vulnerability_id, "v1");
        assert_eq!(fallback.explanation, v.description.unwrap());
        assert_eq!(fallback.fix, v.fix.unwrap());
        assert_eq!(fallback.confidence, 0.7);
    }

    #[test]
    fn test_fallback_analysis_without_record_fields() {
        let mut v = vuln("v1", Severity::Medium, 5);
        v.description = None;
        v.fix = None;

        let fallback = AnalysisRecord::fallback_for(&v);
        assert!(!fallback.explanation.is_empty());
        assert!(!fallback.fix.is_empty());
    }

    #[test]
    fn test_confidence_labels() {
        let mut a = AnalysisRecord::fallback_for(&vuln("v1", Severity::Low, 1));
        a.confidence = 0.95;
        assert_eq!(a.confidence_label(), "High Confidence");
        a.confidence = 0.7;
        assert_eq!(a.confidence_label(), "Medium Confidence");
        a.confidence = 0.4;
        assert_eq!(a.confidence_label(), "Low Confidence");
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let record = AnalysisRecord {
            vulnerability_id: "v1".to_string(),
            explanation: "e".to_string(),
            fix: "f".to_string(),
            confidence: 1.0,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"vulnerabilityId\""));

        let result = ScanResult::new(vec![], 0);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"totalVulnerabilities\""));
        assert!(json.contains("\"riskScore\""));
        assert!(json.contains("\"aiAnalysis\""));
    }
}
