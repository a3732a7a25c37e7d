//! ldaplog - Entry Point

use clap::{Parser, Subcommand};
use ldaplog::config::{self, ConfigError, ResolvedConfig};
use ldaplog::logging::{self, LogTarget};
use ldaplog::model::error::AppError;
use ldaplog::redact::{redact_record, RedactionPolicy};
use ldaplog::source::{detect_input_source, LogKind, ParsedRecord, RecordResult};
use ldaplog::syntax::FieldRegistry;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// ldaplog - parse, render and redact LDAP server logs
#[derive(Parser, Debug)]
#[command(name = "ldaplog")]
#[command(version)]
#[command(about = "Parse, render and redact structured LDAP server log records")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum sanitized length of string values, in characters
    #[arg(long, global = true)]
    pub max_string_length: Option<usize>,

    /// Stop at the first malformed record instead of skipping it
    #[arg(long, global = true)]
    pub strict: bool,

    /// What to do with the log
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Parse each record and print it back, or as JSON
    Parse {
        /// Path to log file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Log format
        #[arg(short, long, value_enum, default_value_t = LogKind::Access)]
        kind: LogKind,

        /// Print each record as a JSON object with sanitized values
        #[arg(long)]
        json: bool,
    },

    /// Rewrite each record with selected fields redacted or tokenized
    Redact {
        /// Path to log file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Log format
        #[arg(short, long, value_enum, default_value_t = LogKind::Access)]
        kind: LogKind,

        /// Fields to redact (comma-separated)
        #[arg(long, value_delimiter = ',')]
        redact: Vec<String>,

        /// Fields to tokenize (comma-separated); needs a pepper
        #[arg(long, value_delimiter = ',')]
        tokenize: Vec<String>,

        /// Transform only the structured components of values (DN attribute values, list
        /// elements) where the field's syntax supports it
        #[arg(long)]
        components: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    run(args)?;
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    let config = resolve_config(&args)?;

    logging::init(&LogTarget::from_config(&config))?;

    info!(config = ?config, "Configuration loaded and resolved");

    let registry = FieldRegistry::standard().with_max_string_length(config.max_string_length);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::Parse { file, kind, json } => {
            let records = detect_input_source(file)?.read_records(kind)?;
            for record in accept(records, config.skip_malformed)? {
                let text = if json {
                    record.to_json(&registry)
                } else {
                    record.format()
                };
                write_record(&mut out, kind, &text)?;
            }
        }
        Command::Redact {
            file,
            kind,
            components,
            ..
        } => {
            let policy = RedactionPolicy::new()
                .redact_fields(config.redact_fields.iter().cloned(), components)
                .tokenize_fields(config.tokenize_fields.iter().cloned(), components);
            if policy.is_empty() {
                warn!("no fields selected for redaction or tokenization");
            }

            let pepper = if policy.needs_pepper() {
                Some(config::resolve_pepper(&config)?.ok_or(ConfigError::MissingPepper)?)
            } else {
                None
            };
            let pepper_bytes = pepper.as_ref().map(|p| p.as_bytes()).unwrap_or_default();

            let records = detect_input_source(file)?.read_records(kind)?;
            for record in accept(records, config.skip_malformed)? {
                let text = redact_record(&record, &policy, &registry, pepper_bytes);
                write_record(&mut out, kind, &text)?;
            }
        }
    }

    out.flush().map_err(AppError::Output)
}

/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged);

    let (redact, tokenize) = match &args.command {
        Command::Redact {
            redact, tokenize, ..
        } => (non_empty(redact), non_empty(tokenize)),
        Command::Parse { .. } => (None, None),
    };

    Ok(config::apply_cli_overrides(
        with_env,
        args.max_string_length,
        redact,
        tokenize,
        args.strict,
    ))
}

fn non_empty(fields: &[String]) -> Option<Vec<String>> {
    (!fields.is_empty()).then(|| fields.to_vec())
}

fn accept(records: Vec<RecordResult>, skip_malformed: bool) -> Result<Vec<ParsedRecord>, AppError> {
    let mut accepted = Vec::with_capacity(records.len());
    for record in records {
        match record {
            Ok(record) => accepted.push(record),
            Err(malformed) if skip_malformed => {
                warn!(
                    line_number = malformed.line_number(),
                    error = %malformed.error(),
                    "skipping malformed record"
                );
            }
            Err(malformed) => return Err(AppError::Parse(malformed.error().clone())),
        }
    }
    Ok(accepted)
}

// Audit records span several lines, so they are separated by a blank line.
fn write_record(out: &mut impl Write, kind: LogKind, text: &str) -> Result<(), AppError> {
    writeln!(out, "{text}").map_err(AppError::Output)?;
    if kind == LogKind::Audit {
        writeln!(out).map_err(AppError::Output)?;
    }
    Ok(())
}
