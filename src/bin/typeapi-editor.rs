//! TypeAPI Editor CLI
//!
//! Command-line interface for converting between editor documents and
//! TypeAPI specifications.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use typeapi_editor::{
    generate, is_url, lint, load_document, load_value_auto, parse, validate_specification,
    CachedSource, FileStatus, GenerateOptions, LoaderSource, OfflineSource, SchemaSource,
    Severity, ValidateError,
};

#[derive(Parser)]
#[command(name = "typeapi-editor")]
#[command(about = "Convert between TypeAPI editor documents and specifications")]
#[command(version)]
struct Cli {
    /// Log conversion details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a specification from an editor document
    Generate {
        /// Editor document file (JSON or YAML)
        document: PathBuf,

        /// Base URL used when the document doesn't declare one
        #[arg(long)]
        base_url: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Check the generated specification against the dialect schema
        #[arg(long)]
        validate: bool,
    },

    /// Parse a specification into an editor document
    Parse {
        /// Specification source: file path or URL (http:// or https://)
        spec: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Base URL TypeHub imports are fetched from
        #[arg(long, conflicts_with = "offline")]
        typehub_base: Option<String>,

        /// Fail on imports instead of fetching them
        #[arg(long)]
        offline: bool,
    },

    /// Validate a specification against the dialect schema
    Validate {
        /// Specification source: file path or URL (http:// or https://)
        spec: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint editor documents (duplicates, dangling root, unresolved references)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            document,
            base_url,
            output,
            pretty,
            validate,
        } => run_generate(&document, base_url, output, pretty, validate),

        Commands::Parse {
            spec,
            output,
            pretty,
            typehub_base,
            offline,
        } => run_parse(&spec, output, pretty, typehub_base, offline),

        Commands::Validate { spec, json } => run_validate(&spec, json),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("typeapi_editor=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typeapi_editor=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_generate(
    document_path: &Path,
    base_url: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
    validate: bool,
) -> Result<(), u8> {
    let document = load_document(document_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut options = GenerateOptions::new();
    if let Some(base_url) = base_url {
        options = options.base_url(base_url);
    }

    let spec = generate(&document, &options)
        .and_then(|spec| {
            spec.to_value()
                .map_err(|source| typeapi_editor::GenerateError::Serialize { source })
        })
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;

    if validate {
        check_specification(&spec, false)?;
    }

    write_output(&spec, output, pretty)
}

fn run_parse(
    spec_source: &str,
    output: Option<PathBuf>,
    pretty: bool,
    typehub_base: Option<String>,
    offline: bool,
) -> Result<(), u8> {
    let spec = load_value_auto(spec_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let source: Box<dyn SchemaSource> = if offline {
        Box::new(OfflineSource)
    } else {
        let mut loader = LoaderSource::new();
        if let Some(base) = typehub_base {
            loader = loader.typehub_base(base);
        }
        if !is_url(spec_source) {
            let path = Path::new(spec_source.strip_prefix("file://").unwrap_or(spec_source));
            if let Some(dir) = path.parent() {
                loader = loader.base_dir(dir);
            }
        }
        Box::new(CachedSource::new(loader))
    };

    let document = parse(&spec, source.as_ref()).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let value = document.to_value().map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    write_output(&value, output, pretty)
}

fn run_validate(spec_source: &str, json_output: bool) -> Result<(), u8> {
    let spec = load_value_auto(spec_source).map_err(|e| {
        report_error(json_output, &format!("loading specification: {}", e));
        e.exit_code() as u8
    })?;

    check_specification(&spec, json_output)?;

    if json_output {
        println!(r#"{{"valid":true}}"#);
    } else {
        println!("Valid");
    }
    Ok(())
}

/// Validate against the dialect schema, reporting failures.
fn check_specification(spec: &Value, json_output: bool) -> Result<(), u8> {
    match validate_specification(spec) {
        Ok(()) => Ok(()),
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

fn write_output(value: &Value, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({"valid": false, "error": msg}));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let json = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", json);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
