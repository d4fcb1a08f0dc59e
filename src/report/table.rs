use crate::model::{ScanResult, Severity};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Line")]
    line: usize,
    #[tabled(rename = "Type")]
    category: String,
    #[tabled(rename = "Snippet")]
    snippet: String,
    #[tabled(rename = "AI Confidence")]
    confidence: String,
}

pub fn print_table(result: &ScanResult) -> Result<()> {
    println!();

    if result.vulnerabilities.is_empty() {
        println!("No vulnerabilities detected.");
        print_summary(result);
        return Ok(());
    }

    println!("Found {} vulnerabilities:", result.vulnerabilities.len());
    println!();

    let mut vulns = result.vulnerabilities.clone();
    vulns.sort_by_key(|v| (v.severity.rank(), v.line));

    let rows: Vec<VulnRow> = vulns
        .iter()
        .map(|v| VulnRow {
            severity: format_severity(&v.severity),
            id: truncate(&v.id, 24),
            line: v.line,
            category: truncate(&v.category, 30),
            snippet: truncate(v.snippet.trim(), 40),
            confidence: result
                .analysis_for(&v.id)
                .map(|a| format!("{} ({}%)", a.confidence_label(), (a.confidence * 100.0).round()))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    print_summary(result);
    Ok(())
}

fn print_summary(result: &ScanResult) {
    println!();
    println!("Summary:");
    println!("  Total vulnerabilities: {}", result.total_vulnerabilities);

    if !result.vulnerabilities.is_empty() {
        println!(
            "  Severity: {} critical, {} high, {} medium, {} low",
            result.summary.critical, result.summary.high, result.summary.medium, result.summary.low
        );
    }

    println!();
    println!(
        "Risk Score: {}/100 {}",
        result.risk_score,
        risk_indicator(result.risk_score)
    );
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Medium => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
    }
}

fn risk_indicator(score: u8) -> &'static str {
    match score {
        0..=19 => "[Low Risk]",
        20..=49 => "[Moderate]",
        50..=74 => "[Elevated]",
        75..=89 => "[High Risk]",
        _ => "[Critical]",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        // counted in characters, so a cut never lands inside a multibyte
        // sequence
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-much-longer-identifier", 10), "a-much-...");
    }

    #[test]
    fn test_truncate_multibyte_snippet() {
        // scanned snippets are arbitrary source text; a cut point that lands
        // inside a multibyte character must not panic
        let snippet = "configuration réseau par défaut pour sécurité";
        let short = truncate(snippet, 19);
        assert_eq!(short, "configuration ré...");
        assert_eq!(short.chars().count(), 19);
    }

    #[test]
    fn test_risk_indicator_bands() {
        assert_eq!(risk_indicator(5), "[Low Risk]");
        assert_eq!(risk_indicator(40), "[Moderate]");
        assert_eq!(risk_indicator(60), "[Elevated]");
        assert_eq!(risk_indicator(80), "[High Risk]");
        assert_eq!(risk_indicator(95), "[Critical]");
    }
}
