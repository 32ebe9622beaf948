//! Parapet CLI.
//!
//! Validates Swagger 2.0 / OpenAPI 3.0 specs through a selectable backend.

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use parapet_spec::{
    BackendRegistry, LoadError, ParseError, ParserOptions, SpecParser, UnknownBackendError,
};
use parapet_telemetry::{events, LogFormat, TelemetryConfig};

/// Exit code for configuration errors (unknown backend, bad flags).
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "parapet", about = "Swagger/OpenAPI spec validator", version)]
struct Cli {
    /// Log level.
    #[arg(long, global = true, default_value = "warn", env = "PARAPET_LOG_LEVEL")]
    log_level: String,

    /// Log format (json or pretty).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate spec(s) with the selected backend.
    Validate {
        /// Input spec file(s) (YAML or JSON).
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<String>,

        /// Validation backend (see `parapet backends`). Defaults to the registry default.
        #[arg(short, long, default_value = "", env = "PARAPET_BACKEND")]
        backend: String,

        /// Stringify integer mapping keys before validating.
        #[arg(long)]
        lenient: bool,

        /// Output format (text or json).
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print a spec with integer keys stringified.
    Normalize {
        /// Input spec file (YAML or JSON).
        #[arg(short, long)]
        spec: String,
    },

    /// List the registered validation backends.
    Backends {
        /// Output format (text or json).
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Validation result for a single spec file.
#[derive(serde::Serialize)]
struct ValidationResult {
    file: String,
    valid: bool,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    errors: Vec<ReportIssue>,
}

#[derive(serde::Serialize)]
struct ReportIssue {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

fn load_issue(err: &LoadError, spec_path: &str) -> ReportIssue {
    let code = match err {
        LoadError::Io { .. } => "E1000",
        LoadError::Syntax(_) | LoadError::NotAMapping => "E1002",
    };
    ReportIssue {
        code: code.to_string(),
        message: err.to_string(),
        location: Some(spec_path.to_string()),
    }
}

fn report_unknown_backend(err: &UnknownBackendError) -> ExitCode {
    tracing::error!(event = events::UNKNOWN_BACKEND, backend = %err.name);
    eprintln!("error: {}", err);
    ExitCode::from(EXIT_CONFIG)
}

/// Validate one spec. Parses lazily so the version is known even on failure.
fn validate_one(spec_path: &str, options: &ParserOptions) -> Result<ValidationResult, ParseError> {
    let mut parser = SpecParser::new(spec_path, options.clone().with_lazy(true))?;
    tracing::debug!(event = events::SPEC_LOADED, file = %spec_path);

    let outcome = parser.parse();
    let mut result = ValidationResult {
        file: spec_path.to_string(),
        valid: outcome.is_ok(),
        backend: parser.backend().name,
        version: parser.state().detected().map(|v| v.to_string()),
        errors: Vec::new(),
    };

    match outcome {
        Ok(()) => {
            tracing::info!(event = events::VALIDATION_PASSED, file = %spec_path);
        }
        Err(e) => {
            tracing::info!(
                event = events::VALIDATION_FAILURE,
                file = %spec_path,
                issues = e.issues.len()
            );
            result.errors = e
                .issues
                .into_iter()
                .map(|issue| ReportIssue {
                    code: issue.code.to_string(),
                    message: issue.message,
                    location: issue.location,
                })
                .collect();
        }
    }
    Ok(result)
}

/// Run the validate command.
fn run_validate(specs: &[String], backend: &str, lenient: bool, output_format: &str) -> ExitCode {
    let registry = BackendRegistry::global();
    let descriptor = match registry.resolve(backend) {
        Ok(d) => d,
        Err(e) => return report_unknown_backend(&e),
    };

    let options = ParserOptions::new()
        .with_backend(descriptor.name)
        .with_strict(!lenient);

    let mut results = Vec::new();
    for spec_path in specs {
        match validate_one(spec_path, &options) {
            Ok(result) => results.push(result),
            Err(ParseError::Load(e)) => results.push(ValidationResult {
                file: spec_path.clone(),
                valid: false,
                backend: descriptor.name,
                version: None,
                errors: vec![load_issue(&e, spec_path)],
            }),
            Err(ParseError::UnknownBackend(e)) => return report_unknown_backend(&e),
            // lazy construction never validates
            Err(ParseError::Validation(e)) => {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
        }
    }

    let valid_count = results.iter().filter(|r| r.valid).count();
    let total = results.len();

    if output_format == "json" {
        let output = serde_json::json!({
            "results": results,
            "summary": {
                "total": total,
                "valid": valid_count,
                "invalid": total - valid_count,
            }
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: failed to serialize report: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        for result in &results {
            let version = result
                .version
                .as_deref()
                .map(|v| format!(" ({})", v))
                .unwrap_or_default();
            if result.valid {
                eprintln!("✓ {}{} is valid [{}]", result.file, version, result.backend);
            } else {
                eprintln!(
                    "✗ {}{} has {} error(s) [{}]",
                    result.file,
                    version,
                    result.errors.len(),
                    result.backend
                );
            }

            for err in &result.errors {
                if let Some(loc) = &err.location {
                    eprintln!("  {} [{}]: {}", err.code, loc, err.message);
                } else {
                    eprintln!("  {}: {}", err.code, err.message);
                }
            }
        }

        eprintln!();
        eprintln!(
            "validated {} spec(s) with {}: {} valid, {} invalid",
            total,
            descriptor.name,
            valid_count,
            total - valid_count
        );
    }

    if valid_count == total {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Run the normalize command.
fn run_normalize(spec: &str) -> ExitCode {
    let options = ParserOptions::new().with_strict(false).with_lazy(true);
    let parser = match SpecParser::new(Path::new(spec), options) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    for shadowed in parser.shadowed_keys() {
        eprintln!(
            "warning: {}: dropped integer key {} (also authored as a string)",
            shadowed.location, shadowed.key
        );
    }

    match parser.specification().to_yaml() {
        Ok(yaml) => {
            print!("{}", yaml);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize spec: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Run the backends command.
fn run_backends(output_format: &str) -> ExitCode {
    let registry = BackendRegistry::global();
    let default = registry.default_backend().name;

    if output_format == "json" {
        let backends: Vec<_> = registry
            .iter()
            .map(|d| {
                serde_json::json!({
                    "name": d.name,
                    "description": d.description,
                    "strict_keys": d.strict_keys,
                    "versions": d.versions.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
                    "default": d.name == default,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&backends) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: failed to serialize backends: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        for d in registry.iter() {
            let versions: Vec<String> = d.versions.iter().map(|v| v.to_string()).collect();
            let marker = if d.name == default { " (default)" } else { "" };
            println!(
                "{}{}: {} [{}]",
                d.name,
                marker,
                d.description,
                versions.join(", ")
            );
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_format) = LogFormat::parse(&cli.log_format) else {
        eprintln!(
            "error: invalid log format '{}' (expected json or pretty)",
            cli.log_format
        );
        return ExitCode::from(EXIT_CONFIG);
    };
    let telemetry = TelemetryConfig::new()
        .with_log_level(&cli.log_level)
        .with_log_format(log_format);
    if let Err(e) = parapet_telemetry::init(&telemetry) {
        eprintln!("warning: {}", e);
    }

    match cli.command {
        Commands::Validate {
            spec,
            backend,
            lenient,
            format,
        } => run_validate(&spec, &backend, lenient, &format),
        Commands::Normalize { spec } => run_normalize(&spec),
        Commands::Backends { format } => run_backends(&format),
    }
}
