//! PII redaction CLI for Zentinel.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use zentinel_pii_redactor::config::parse_types;
use zentinel_pii_redactor::{batch, RedactResponse, RedactionService, RedactorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// PII redaction for Zentinel
///
/// Masks IPv4 addresses, email addresses, US SSNs, US phone numbers and
/// payment card numbers. Results are printed as JSON on stdout; logs go to
/// stderr and never contain input text.
#[derive(Parser, Debug)]
#[command(name = "zentinel-pii-redactor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Files to redact; each masked copy is written as <file>.redacted
    files: Vec<PathBuf>,

    /// Text to redact (stdin is read when neither text nor files are given)
    #[arg(long, conflicts_with = "files")]
    text: Option<String>,

    /// Treat the input as a JSON request body: {"text": "..."}
    #[arg(long, conflicts_with = "files")]
    body: bool,

    /// Print supported types and limits, then exit
    #[arg(long)]
    capabilities: bool,

    /// JSON config file
    #[arg(long, env = "REDACTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum input length in characters
    #[arg(long, env = "MAX_INPUT_LENGTH")]
    max_length: Option<usize>,

    /// Replacement token for redacted spans
    #[arg(long, env = "REDACTION_PLACEHOLDER")]
    placeholder: Option<String>,

    /// Comma-separated PII types to detect (default: all)
    #[arg(long, env = "PII_TYPES")]
    types: Option<String>,

    /// Directory for redacted copies in file mode
    #[arg(long, requires = "files")]
    output_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Enable verbose debug logging
    #[arg(long, short, env = "VERBOSE", default_value = "false")]
    verbose: bool,
}

impl Args {
    fn build_config(&self) -> Result<RedactorConfig> {
        let mut config = match &self.config {
            Some(path) => RedactorConfig::from_file(path)?,
            None => RedactorConfig::default(),
        };

        if let Some(max_length) = self.max_length {
            anyhow::ensure!(max_length > 0, "--max-length must be greater than zero");
            config.max_input_length = max_length;
        }
        if let Some(placeholder) = &self.placeholder {
            config.placeholder = placeholder.clone();
        }
        if let Some(types) = &self.types {
            config.enabled_types = parse_types(types.split(','))?;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    match args.log_format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }

    let config = args.build_config()?;
    info!("Starting PII redactor");
    info!("  Max input length: {}", config.max_input_length);
    info!("  Enabled types: {:?}", config.enabled_types);

    let service = Arc::new(RedactionService::new(config).context("invalid redactor configuration")?);

    if args.capabilities {
        println!("{}", serde_json::to_string_pretty(&service.capabilities())?);
        return Ok(ExitCode::SUCCESS);
    }

    if !args.files.is_empty() {
        let reports =
            batch::redact_files(Arc::clone(&service), args.files.clone(), args.output_dir.clone())
                .await;
        let failed = reports.iter().any(|r| !r.is_ok());
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let input = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            buf
        }
    };

    let result = if args.body {
        service.handle_body(&input)
    } else {
        service.redact(&input)
    };

    print_result(result)
}

fn print_result(
    result: Result<RedactResponse, zentinel_pii_redactor::BoundaryError>,
) -> Result<ExitCode> {
    match result {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            info!(code = e.code(), "Request rejected");
            println!("{}", serde_json::to_string_pretty(&e.to_response())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
