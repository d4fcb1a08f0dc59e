use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codats::{
    client::{AdvisoryService, ApiClient, ScanService},
    config::Config,
    language::Language,
    model::{AnalysisRecord, ScanResult, SourceBuffer, Severity, VulnerabilityRecord},
    patch::apply_fix,
    report::{format_result_to_string, print_result, OutputFormat},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const CRITICAL_VULN: u8 = 2;
    pub const HIGH_VULN: u8 = 3;
    pub const MEDIUM_VULN: u8 = 4;
    pub const LOW_VULN: u8 = 5;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "codats")]
#[command(
    author,
    version,
    about = "Scan source code for vulnerabilities and apply AI fix recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source file for vulnerabilities
    Scan {
        /// File to scan
        file: PathBuf,

        /// Language of the file (detected from the extension by default)
        #[arg(short, long)]
        language: Option<Language>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write results to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with error if vulnerabilities at or above this severity are found
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,
    },

    /// Scan a file, fetch AI fix recommendations, and apply them
    Fix {
        /// File to fix
        file: PathBuf,

        /// Language of the file (detected from the extension by default)
        #[arg(short, long)]
        language: Option<Language>,

        /// Fix only the vulnerability with this id
        #[arg(long)]
        id: Option<String>,

        /// Fix every reported vulnerability (default: the most severe one)
        #[arg(long)]
        all: bool,

        /// Write the patched source here instead of back to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the patched source instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check API and AI service health
    Health,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Scan {
            file,
            language,
            format,
            output,
            fail_on,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            run_scan(&config, &file, language, &format_str, output, fail_on).await
        }
        Commands::Fix {
            file,
            language,
            id,
            all,
            output,
            dry_run,
        } => run_fix(&config, &file, language, id, all, output, dry_run).await,
        Commands::Health => run_health(&config).await,
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    config: &Config,
    file: &Path,
    language: Option<Language>,
    format: &str,
    output_file: Option<PathBuf>,
    fail_on: Option<FailLevel>,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let code = read_source(file)?;
    let language = language.unwrap_or_else(|| Language::detect(file));

    let client = ApiClient::from_config(config);
    let progress = spinner(is_interactive, format!("Scanning {}...", file.display()));

    let result = client.scan(&code, language).await?;

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Found {} vulnerabilities",
            result.vulnerabilities.len()
        ));
    }

    if let Some(path) = output_file {
        let rendered = format_result_to_string(&result, format)?;
        std::fs::write(&path, rendered)?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&result, format)?;
    }

    Ok(determine_exit_code(&result, fail_on))
}

async fn run_fix(
    config: &Config,
    file: &Path,
    language: Option<Language>,
    id: Option<String>,
    all: bool,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<u8> {
    let code = read_source(file)?;
    let language = language.unwrap_or_else(|| Language::detect(file));
    let client = ApiClient::from_config(config);

    let progress = spinner(true, format!("Scanning {}...", file.display()));
    let result = client.scan(&code, language).await?;
    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Found {} vulnerabilities",
            result.vulnerabilities.len()
        ));
    }

    if result.is_clean() {
        println!("No vulnerabilities detected, nothing to fix.");
        return Ok(exit_codes::SUCCESS);
    }

    let targets = select_targets(&result, id.as_deref(), all)?;

    let progress = spinner(
        true,
        format!("Requesting AI fixes for {} vulnerabilities...", targets.len()),
    );
    let analysis = client.fixes_for(&targets, &code, language).await?;
    if let Some(pb) = progress {
        pb.finish_with_message(format!("Received {} analyses", analysis.len()));
    }

    let mut result = result.with_analysis(analysis);
    let mut buffer = SourceBuffer::from_source(&code);

    // Apply bottom-up so regions above keep their scanned line numbers.
    let mut ordered = targets.clone();
    ordered.sort_by(|a, b| b.line.cmp(&a.line));

    let mut applied = 0usize;
    for vulnerability in &ordered {
        let advisory = result
            .analysis_for(&vulnerability.id)
            .cloned()
            .unwrap_or_else(|| AnalysisRecord::fallback_for(vulnerability));

        match apply_fix(vulnerability, &advisory.fix, &buffer, &result) {
            Ok(fixed) => {
                println!(
                    "Applied fix for {} ({}) at {} [{}]",
                    vulnerability.id,
                    vulnerability.category,
                    fixed.region,
                    advisory.confidence_label()
                );
                buffer = fixed.buffer;
                result = fixed.result;
                applied += 1;
            }
            Err(e) => {
                eprintln!("Skipping {}: {}", vulnerability.id, e);
            }
        }
    }

    if applied == 0 {
        return Err(anyhow!("no fixes could be applied"));
    }

    let patched = buffer.to_source();
    if dry_run {
        println!();
        println!("{}", patched);
    } else {
        let destination = output.unwrap_or_else(|| file.to_path_buf());
        std::fs::write(&destination, patched)
            .with_context(|| format!("failed to write {}", destination.display()))?;
        println!();
        println!(
            "Applied {} of {} fixes, patched source written to: {}",
            applied,
            ordered.len(),
            destination.display()
        );
    }

    if !result.is_clean() {
        println!(
            "{} vulnerabilities remain; re-run `codats scan` after reviewing the patch.",
            result.total_vulnerabilities
        );
    }

    Ok(exit_codes::SUCCESS)
}

/// Picks which vulnerabilities this fix run should address.
fn select_targets(
    result: &ScanResult,
    id: Option<&str>,
    all: bool,
) -> Result<Vec<VulnerabilityRecord>> {
    if let Some(id) = id {
        let target = result
            .vulnerability(id)
            .ok_or_else(|| anyhow!("no vulnerability with id {id} in the scan result"))?;
        return Ok(vec![target.clone()]);
    }

    if all {
        return Ok(result.vulnerabilities.clone());
    }

    let most_severe = result
        .vulnerabilities
        .iter()
        .min_by_key(|v| (v.severity.rank(), v.line))
        .cloned()
        .ok_or_else(|| anyhow!("scan result has no vulnerabilities"))?;
    Ok(vec![most_severe])
}

async fn run_health(config: &Config) -> Result<u8> {
    let client = ApiClient::from_config(config);

    match client.health().await {
        Ok(status) if status.healthy => println!("API:        healthy"),
        Ok(status) => println!(
            "API:        unhealthy{}",
            status.message.map(|m| format!(" ({m})")).unwrap_or_default()
        ),
        Err(e) => println!("API:        unreachable ({e})"),
    }

    match client.ai_health().await {
        Ok(status) if status.healthy => println!("AI service: healthy"),
        Ok(status) => println!(
            "AI service: unhealthy{}",
            status.message.map(|m| format!(" ({m})")).unwrap_or_default()
        ),
        Err(e) => println!("AI service: unreachable ({e})"),
    }

    Ok(exit_codes::SUCCESS)
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn spinner(is_interactive: bool, message: String) -> Option<ProgressBar> {
    if !is_interactive {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Some(pb)
}

/// Determine the exit code based on vulnerabilities found and --fail-on setting
fn determine_exit_code(result: &ScanResult, fail_on: Option<FailLevel>) -> u8 {
    let fail_on = match fail_on {
        Some(level) => level,
        None => return exit_codes::SUCCESS,
    };

    let has = |severity: Severity| result.vulnerabilities.iter().any(|v| v.severity == severity);
    let has_critical = has(Severity::Critical);
    let has_high = has(Severity::High);
    let has_medium = has(Severity::Medium);
    let has_low = has(Severity::Low);

    match fail_on {
        FailLevel::Critical => {
            if has_critical {
                exit_codes::CRITICAL_VULN
            } else {
                exit_codes::SUCCESS
            }
        }
        FailLevel::High => {
            if has_critical {
                exit_codes::CRITICAL_VULN
            } else if has_high {
                exit_codes::HIGH_VULN
            } else {
                exit_codes::SUCCESS
            }
        }
        FailLevel::Medium => {
            if has_critical {
                exit_codes::CRITICAL_VULN
            } else if has_high {
                exit_codes::HIGH_VULN
            } else if has_medium {
                exit_codes::MEDIUM_VULN
            } else {
                exit_codes::SUCCESS
            }
        }
        FailLevel::Low => {
            if has_critical {
                exit_codes::CRITICAL_VULN
            } else if has_high {
                exit_codes::HIGH_VULN
            } else if has_medium {
                exit_codes::MEDIUM_VULN
            } else if has_low {
                exit_codes::LOW_VULN
            } else {
                exit_codes::SUCCESS
            }
        }
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'codats config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vuln(id: &str, severity: Severity, line: usize) -> VulnerabilityRecord {
        VulnerabilityRecord {
            id: id.to_string(),
            category: "XSS".to_string(),
            severity,
            line,
            snippet: String::new(),
            description: None,
            fix: None,
        }
    }

    #[test]
    fn test_exit_code_without_fail_on() {
        let result = ScanResult::new(vec![vuln("v1", Severity::Critical, 1)], 90);
        assert_eq!(determine_exit_code(&result, None), exit_codes::SUCCESS);
    }

    #[test]
    fn test_exit_code_reports_most_severe() {
        let result = ScanResult::new(
            vec![
                vuln("v1", Severity::Medium, 4),
                vuln("v2", Severity::High, 9),
            ],
            60,
        );

        assert_eq!(
            determine_exit_code(&result, Some(FailLevel::Low)),
            exit_codes::HIGH_VULN
        );
        assert_eq!(
            determine_exit_code(&result, Some(FailLevel::Critical)),
            exit_codes::SUCCESS
        );
    }

    #[test]
    fn test_select_targets_by_id() {
        let result = ScanResult::new(
            vec![
                vuln("v1", Severity::Low, 1),
                vuln("v2", Severity::High, 5),
            ],
            40,
        );

        let targets = select_targets(&result, Some("v2"), false).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "v2");

        assert!(select_targets(&result, Some("v9"), false).is_err());
    }

    #[test]
    fn test_select_targets_defaults_to_most_severe() {
        let result = ScanResult::new(
            vec![
                vuln("v1", Severity::Low, 1),
                vuln("v2", Severity::Critical, 8),
                vuln("v3", Severity::High, 3),
            ],
            75,
        );

        let targets = select_targets(&result, None, false).unwrap();
        assert_eq!(targets[0].id, "v2");

        let all = select_targets(&result, None, true).unwrap();
        assert_eq!(all.len(), 3);
    }
}
