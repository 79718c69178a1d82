// crates/cargowhale-cli/src/main.rs
// ============================================================================
// Module: CargoWhale CLI
// Description: Command-line entry point for the container gateway and contracts.
// Purpose: Query the container runtime and inspect contract examples.
// Dependencies: clap, cargowhale-client, cargowhale-config, cargowhale-contract
// ============================================================================

//! ## Overview
//! `cargowhale` exposes the gateway client operations, the contract index,
//! and the canonical example configuration as subcommands.
//!
//! Command output is JSON written to stdout through one locked writer.
//! Gateway telemetry records are written to stderr as JSON lines when
//! `metrics.logs.enabled` is set. Errors are reported on stderr with a failing
//! exit code.
//!
//! Container filter values reach the query string unescaped, so values with
//! query delimiters are rejected while parsing arguments.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use cargowhale_client::ContainerFilters;
use cargowhale_client::ContainerGatewayClient;
use cargowhale_client::GatewayError;
use cargowhale_client::GatewayMetrics;
use cargowhale_client::HttpTransport;
use cargowhale_client::JsonLinesMetrics;
use cargowhale_client::LogFilters;
use cargowhale_client::LogTail;
use cargowhale_client::NoopMetrics;
use cargowhale_config::CargoWhaleConfig;
use cargowhale_config::ConfigError;
use cargowhale_config::config_toml_example;
use cargowhale_contract::ContractDocument;
use cargowhale_contract::ContractError;
use cargowhale_contract::ContractIndex;
use cargowhale_contract::HttpVerb;
use cargowhale_contract::IndexKey;
use cargowhale_contract::LookupError;
use cargowhale_contract::MediaType;
use cargowhale_contract::StatusCode;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "cargowhale", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Configuration file (overrides `CARGOWHALE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Container runtime queries.
    Containers {
        /// Selected containers subcommand.
        #[command(subcommand)]
        command: ContainersCommand,
    },
    /// Contract index utilities.
    Contract {
        /// Selected contract subcommand.
        #[command(subcommand)]
        command: ContractCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Container runtime subcommands.
#[derive(Subcommand, Debug)]
enum ContainersCommand {
    /// List containers, optionally filtered.
    List(ListCommand),
    /// Show the details of one container.
    Inspect(ContainerIdArg),
    /// Fetch the logs of one container.
    Logs(LogsCommand),
    /// Show the process table of one container.
    Top(ContainerIdArg),
}

/// Arguments for `containers list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Keep containers in this state (repeatable).
    #[arg(long = "status", value_name = "STATUS", value_parser = parse_filter_value)]
    status: Vec<String>,
    /// Keep containers whose name matches (repeatable).
    #[arg(long = "name", value_name = "NAME", value_parser = parse_filter_value)]
    name: Vec<String>,
    /// Keep containers carrying this label, `key` or `key=value` (repeatable).
    #[arg(long = "label", value_name = "LABEL", value_parser = parse_filter_value)]
    label: Vec<String>,
}

impl ListCommand {
    /// Builds the container filters for this invocation.
    fn filters(&self) -> ContainerFilters {
        let mut filters = ContainerFilters::new();
        for status in &self.status {
            filters = filters.status(status.as_str());
        }
        for name in &self.name {
            filters = filters.name(name.as_str());
        }
        for label in &self.label {
            filters = filters.label(label.as_str());
        }
        filters
    }
}

/// Single container id argument.
#[derive(Args, Debug)]
struct ContainerIdArg {
    /// Container id or name.
    #[arg(value_name = "ID")]
    id: String,
}

/// Arguments for `containers logs`.
#[derive(Args, Debug)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag maps to one log query parameter."
)]
struct LogsCommand {
    /// Container id or name.
    #[arg(value_name = "ID")]
    id: String,
    /// Ask the runtime to stream logs.
    #[arg(long)]
    follow: bool,
    /// Exclude standard output.
    #[arg(long)]
    no_stdout: bool,
    /// Exclude standard error.
    #[arg(long)]
    no_stderr: bool,
    /// Only lines after this UNIX timestamp.
    #[arg(long, value_name = "UNIX_SECONDS")]
    since: Option<i64>,
    /// Prefix lines with timestamps.
    #[arg(long)]
    timestamps: bool,
    /// Trailing line count, or `all`.
    #[arg(long, value_name = "N", value_parser = parse_tail)]
    tail: Option<LogTail>,
}

impl LogsCommand {
    /// Builds the log filters for this invocation.
    const fn filters(&self) -> LogFilters {
        let mut filters = LogFilters::new()
            .follow(self.follow)
            .stdout(!self.no_stdout)
            .stderr(!self.no_stderr)
            .timestamps(self.timestamps);
        if let Some(since) = self.since {
            filters = filters.since(since);
        }
        if let Some(tail) = self.tail {
            filters = filters.tail(tail);
        }
        filters
    }
}

/// Contract subcommands.
#[derive(Subcommand, Debug)]
enum ContractCommand {
    /// Print every index entry as one JSON line.
    Index(ContractSourceArgs),
    /// Print the example declared for one key.
    Lookup(LookupCommand),
}

/// Contract document selection.
#[derive(Args, Debug)]
struct ContractSourceArgs {
    /// Contract document; defaults to `contract.path` from the config.
    #[arg(long = "contract", value_name = "PATH")]
    contract: Option<PathBuf>,
}

/// Arguments for `contract lookup`.
#[derive(Args, Debug)]
struct LookupCommand {
    /// Full resource path.
    #[arg(value_name = "PATH")]
    path: String,
    /// HTTP verb.
    #[arg(value_name = "VERB")]
    verb: String,
    /// Response status code.
    #[arg(value_name = "STATUS")]
    status: u16,
    /// Response media type.
    #[arg(value_name = "MEDIA_TYPE")]
    media_type: String,
    /// Contract document selection.
    #[command(flatten)]
    source: ContractSourceArgs,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the canonical example configuration.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Gateway call failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Contract loading failure.
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// Contract lookup failure.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// No contract document was named.
    #[error("no contract document: pass --contract or set contract.path")]
    MissingContract,
    /// Output could not be serialized.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    /// Output could not be written.
    #[error("failed to write {stream}: {source}")]
    Output {
        /// Stream name.
        stream: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run<W: Write>(cli: &Cli, out: &mut W) -> CliResult<()> {
    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Containers {
            command,
        } => command_containers(command, config_path, out),
        Commands::Contract {
            command,
        } => command_contract(command, config_path, out),
        Commands::Config {
            command: ConfigCommand::Example,
        } => write_text(out, &config_toml_example()),
    }
}

// ============================================================================
// SECTION: Containers
// ============================================================================

/// Builds the gateway client from config and runs a containers subcommand.
fn command_containers<W: Write>(
    command: &ContainersCommand,
    config_path: Option<&Path>,
    out: &mut W,
) -> CliResult<()> {
    let config = CargoWhaleConfig::load(config_path)?;
    let client = ContainerGatewayClient::new(config.docker.resolver()?, config.docker.transport()?)
        .with_metrics(metrics_sink(&config, std::io::stderr()));
    run_containers(command, &client, out)
}

/// Runs a containers subcommand against `client`.
fn run_containers<T: HttpTransport, W: Write>(
    command: &ContainersCommand,
    client: &ContainerGatewayClient<T>,
    out: &mut W,
) -> CliResult<()> {
    match command {
        ContainersCommand::List(list) => {
            let filters = list.filters();
            let containers = if filters.is_empty() {
                client.list_all_containers()?
            } else {
                client.list_filtered_containers(&filters)?
            };
            write_json(out, &containers)
        }
        ContainersCommand::Inspect(arg) => write_json(out, &client.container_details(&arg.id)?),
        ContainersCommand::Logs(logs) => {
            write_json(out, &client.container_logs(&logs.id, &logs.filters())?)
        }
        ContainersCommand::Top(arg) => write_json(out, &client.container_processes(&arg.id)?),
    }
}

/// Builds the telemetry sink; metrics are discarded unless logs are enabled.
fn metrics_sink<W: Write + Send + 'static>(
    config: &CargoWhaleConfig,
    writer: W,
) -> Arc<dyn GatewayMetrics> {
    match config.metrics.logs.summary_period() {
        Some(period) => Arc::new(JsonLinesMetrics::with_summary(writer, period)),
        None => Arc::new(NoopMetrics),
    }
}

/// Characters that would split or truncate the unescaped `filters` value.
const FILTER_DELIMITERS: [char; 4] = ['&', '#', '+', '%'];

/// Parses a container filter value.
fn parse_filter_value(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("filter value must not be empty".to_string());
    }
    if let Some(found) = raw.chars().find(|ch| FILTER_DELIMITERS.contains(ch) || ch.is_control()) {
        return Err(format!("filter value must not contain `{}`", found.escape_default()));
    }
    Ok(raw.to_string())
}

/// Parses a `--tail` value.
fn parse_tail(raw: &str) -> Result<LogTail, String> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(LogTail::All);
    }
    raw.parse::<u64>()
        .map(LogTail::Lines)
        .map_err(|_| format!("expected a line count or `all`, got `{raw}`"))
}

// ============================================================================
// SECTION: Contract
// ============================================================================

/// One contract index entry as printed.
#[derive(Debug, Serialize)]
struct IndexEntryOutput<'a> {
    /// Full resource path.
    path: &'a str,
    /// HTTP verb.
    verb: &'static str,
    /// Response status code.
    status: u16,
    /// Response media type.
    media_type: &'a str,
    /// Example body.
    example: &'a str,
}

impl<'a> IndexEntryOutput<'a> {
    /// Builds the printed form of one entry.
    fn new(key: &'a IndexKey, example: &'a str) -> Self {
        Self {
            path: &key.path,
            verb: key.verb.as_str(),
            status: key.status.get(),
            media_type: key.media_type.as_str(),
            example,
        }
    }
}

/// Runs a contract subcommand.
fn command_contract<W: Write>(
    command: &ContractCommand,
    config_path: Option<&Path>,
    out: &mut W,
) -> CliResult<()> {
    match command {
        ContractCommand::Index(source) => {
            let index = load_contract(source, config_path)?;
            for (key, example) in index.iter() {
                write_json(out, &IndexEntryOutput::new(key, example))?;
            }
            Ok(())
        }
        ContractCommand::Lookup(lookup) => {
            let index = load_contract(&lookup.source, config_path)?;
            let key = lookup_key(lookup)?;
            let example = index.lookup_key(&key)?;
            write_json(out, &IndexEntryOutput::new(&key, example))
        }
    }
}

/// Normalizes the raw lookup arguments into an index key.
fn lookup_key(lookup: &LookupCommand) -> Result<IndexKey, LookupError> {
    Ok(IndexKey::new(
        &lookup.path,
        lookup.verb.parse::<HttpVerb>()?,
        StatusCode::new(lookup.status)?,
        MediaType::parse(&lookup.media_type)?,
    ))
}

/// Loads the selected contract document and builds its index.
fn load_contract(
    source: &ContractSourceArgs,
    config_path: Option<&Path>,
) -> CliResult<ContractIndex> {
    let path = match &source.contract {
        Some(path) => path.clone(),
        None => {
            let config = CargoWhaleConfig::load(config_path)?;
            config.contract.path.map(PathBuf::from).ok_or(CliError::MissingContract)?
        }
    };
    Ok(ContractDocument::load(&path)?.into_index()?)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes one JSON value followed by a newline.
fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out).map_err(|source| output_error("stdout", source))
}

/// Writes text, adding a trailing newline when missing.
fn write_text<W: Write>(out: &mut W, text: &str) -> CliResult<()> {
    let written = if text.ends_with('\n') { write!(out, "{text}") } else { writeln!(out, "{text}") };
    written.map_err(|source| output_error("stdout", source))
}

/// Wraps an output I/O error.
const fn output_error(stream: &'static str, source: std::io::Error) -> CliError {
    CliError::Output {
        stream,
        source,
    }
}

/// Writes an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = writeln!(std::io::stderr(), "error: {message}");
    ExitCode::FAILURE
}
