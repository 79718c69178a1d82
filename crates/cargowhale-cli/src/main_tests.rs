// crates/cargowhale-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Tests
// Description: Unit tests for argument parsing and command dispatch.
// Purpose: Ensure flags map to gateway filters and commands emit JSON lines.
// Dependencies: cargowhale-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Parses command lines with `Cli::try_parse_from` and runs commands against
//! in-memory writers, temp contract documents, and a canned transport.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use cargowhale_client::ContainerGatewayClient;
use cargowhale_client::EndpointResolver;
use cargowhale_client::GatewayCall;
use cargowhale_client::GatewayMetricEvent;
use cargowhale_client::GatewayOutcome;
use cargowhale_client::HttpTransport;
use cargowhale_client::LogFilters;
use cargowhale_client::LogTail;
use cargowhale_client::TransportError;
use cargowhale_config::CargoWhaleConfig;
use clap::Parser;
use serde_json::Value;

use super::Cli;
use super::CliError;
use super::Commands;
use super::ContainersCommand;
use super::metrics_sink;
use super::parse_tail;
use super::run;
use super::run_containers;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const CONTRACT_YAML: &str = r#"title: Docker Engine
version: v1.43
resources:
  - path: /containers
    resources:
      - path: /{id}
        resources:
          - path: /top
            methods:
              - verb: get
                responses:
                  - status: 200
                    bodies:
                      - media_type: Application/JSON
                        example: '{"Titles": ["PID"], "Processes": [["1"]]}'
          - path: /logs
            methods:
              - verb: get
                responses:
                  - status: 200
                    bodies:
                      - media_type: text/plain
                        example: hello
"#;

/// Transport answering every request with one body.
struct CannedTransport {
    body: String,
    urls: Mutex<Vec<String>>,
}

impl CannedTransport {
    fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            urls: Mutex::new(Vec::new()),
        }
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl HttpTransport for &CannedTransport {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(self.body.clone())
    }
}

/// Writer whose bytes stay readable after the sink takes ownership.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn list_event() -> GatewayMetricEvent {
    GatewayMetricEvent {
        call: GatewayCall::ListAll,
        outcome: GatewayOutcome::Ok,
        error_kind: None,
        duration: Duration::ZERO,
        response_bytes: 2,
    }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("parse")
}

fn containers_command(cli: Cli) -> ContainersCommand {
    match cli.command {
        Commands::Containers {
            command,
        } => command,
        other => panic!("unexpected command: {other:?}"),
    }
}

fn run_to_lines(cli: &Cli) -> Result<Vec<String>, CliError> {
    let mut out = Vec::new();
    run(cli, &mut out)?;
    let text = String::from_utf8(out).expect("utf-8 output");
    Ok(text.lines().map(str::to_string).collect())
}

fn contract_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().expect("temp file");
    file.write_all(CONTRACT_YAML.as_bytes()).expect("write contract");
    file
}

fn client(transport: &CannedTransport) -> ContainerGatewayClient<&CannedTransport> {
    let resolver = EndpointResolver::new("http://docker.local:2375/containers/").expect("base");
    ContainerGatewayClient::new(resolver, transport)
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn list_flags_build_container_filters() {
    let cli = parse(&[
        "cargowhale",
        "containers",
        "list",
        "--status",
        "running",
        "--status",
        "exited",
        "--label",
        "com.example.vendor=Acme",
    ]);
    let ContainersCommand::List(list) = containers_command(cli) else {
        panic!("expected list");
    };
    let filters: Value = serde_json::from_str(&list.filters().to_json()).unwrap();
    assert_eq!(
        filters,
        serde_json::json!({
            "status": ["running", "exited"],
            "label": ["com.example.vendor=Acme"],
        })
    );
}

#[test]
fn filter_values_with_query_delimiters_are_rejected() {
    for (flag, value) in [
        ("--label", "tier=web&all=1"),
        ("--name", "web#1"),
        ("--status", "run+ning"),
        ("--label", "key=100%"),
        ("--name", ""),
    ] {
        let result = Cli::try_parse_from(["cargowhale", "containers", "list", flag, value]);
        assert!(result.is_err(), "{flag} {value} should be rejected");
    }
    let cli = parse(&["cargowhale", "containers", "list", "--label", "com.example/tier=web"]);
    let ContainersCommand::List(list) = containers_command(cli) else {
        panic!("expected list");
    };
    assert_eq!(list.label, vec!["com.example/tier=web".to_string()]);
}

#[test]
fn logs_flags_build_log_filters() {
    let cli = parse(&[
        "cargowhale",
        "containers",
        "logs",
        "abc",
        "--no-stderr",
        "--since",
        "0",
        "--timestamps",
        "--tail",
        "265",
    ]);
    let ContainersCommand::Logs(logs) = containers_command(cli) else {
        panic!("expected logs");
    };
    assert_eq!(logs.id, "abc");
    let expected = LogFilters::new()
        .follow(false)
        .stdout(true)
        .stderr(false)
        .since(0)
        .timestamps(true)
        .tail(LogTail::Lines(265));
    assert_eq!(logs.filters(), expected);
}

#[test]
fn tail_accepts_counts_and_all() {
    assert_eq!(parse_tail("all").unwrap(), LogTail::All);
    assert_eq!(parse_tail("ALL").unwrap(), LogTail::All);
    assert_eq!(parse_tail("12").unwrap(), LogTail::Lines(12));
    assert!(parse_tail("-1").is_err());
    assert!(parse_tail("many").is_err());
}

#[test]
fn config_flag_is_global() {
    let cli = parse(&["cargowhale", "containers", "top", "abc", "--config", "custom.toml"]);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.toml")));
}

#[test]
fn lookup_rejects_non_numeric_status() {
    let result = Cli::try_parse_from([
        "cargowhale",
        "contract",
        "lookup",
        "/containers",
        "GET",
        "ok",
        "application/json",
    ]);
    assert!(result.is_err());
}

// ============================================================================
// SECTION: Config And Contract Commands
// ============================================================================

#[test]
fn config_example_prints_a_valid_config() {
    let lines = run_to_lines(&parse(&["cargowhale", "config", "example"])).unwrap();
    let config = CargoWhaleConfig::from_toml_str(&lines.join("\n")).unwrap();
    assert_eq!(config.docker.endpoint, "http://localhost:2375/containers/");
}

#[test]
fn contract_index_prints_one_line_per_entry() {
    let file = contract_file();
    let path = file.path().to_str().unwrap();
    let lines = run_to_lines(&parse(&["cargowhale", "contract", "index", "--contract", path]))
        .unwrap();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["path"], "/containers/{id}/logs");
    assert_eq!(first["verb"], "GET");
    assert_eq!(first["status"], 200);
    assert_eq!(first["media_type"], "text/plain");
    assert_eq!(first["example"], "hello");
}

#[test]
fn contract_lookup_normalizes_key_components() {
    let file = contract_file();
    let path = file.path().to_str().unwrap();
    let lines = run_to_lines(&parse(&[
        "cargowhale",
        "contract",
        "lookup",
        "containers/{id}/top",
        "get",
        "200",
        "application/json",
        "--contract",
        path,
    ]))
    .unwrap();
    assert_eq!(lines.len(), 1);
    let entry: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(entry["path"], "/containers/{id}/top");
    assert_eq!(entry["media_type"], "application/json");
    assert_eq!(entry["example"], r#"{"Titles": ["PID"], "Processes": [["1"]]}"#);
}

#[test]
fn contract_lookup_reports_missing_examples() {
    let file = contract_file();
    let path = file.path().to_str().unwrap();
    let err = run_to_lines(&parse(&[
        "cargowhale",
        "contract",
        "lookup",
        "/containers/{id}/top",
        "GET",
        "404",
        "application/json",
        "--contract",
        path,
    ]))
    .unwrap_err();
    assert!(matches!(err, CliError::Lookup(_)), "unexpected error: {err}");
}

#[test]
fn contract_without_path_requires_config_entry() {
    let mut config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    config.write_all(b"[docker]\nendpoint = \"http://localhost:2375/containers/\"\n").unwrap();
    let config_path = config.path().to_str().unwrap();
    let err = run_to_lines(&parse(&["cargowhale", "--config", config_path, "contract", "index"]))
        .unwrap_err();
    assert!(matches!(err, CliError::MissingContract), "unexpected error: {err}");
}

#[test]
fn contract_path_falls_back_to_config() {
    let contract = contract_file();
    let mut config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    let toml = format!(
        "[contract]\npath = {}\n",
        toml_string(contract.path().to_str().unwrap())
    );
    config.write_all(toml.as_bytes()).unwrap();
    let config_path = config.path().to_str().unwrap();
    let lines = run_to_lines(&parse(&["cargowhale", "--config", config_path, "contract", "index"]))
        .unwrap();
    assert_eq!(lines.len(), 2);
}

fn toml_string(raw: &str) -> String {
    format!("'{raw}'")
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

#[test]
fn disabled_metrics_logs_write_nothing() {
    let buffer = SharedBuffer::default();
    let sink = metrics_sink(&CargoWhaleConfig::default(), buffer.clone());
    sink.record_request(&list_event());
    assert!(buffer.text().is_empty());
}

#[test]
fn enabled_metrics_logs_write_request_records() {
    let config = CargoWhaleConfig::from_toml_str("[metrics.logs]\nenabled = true\n").unwrap();
    let buffer = SharedBuffer::default();
    let sink = metrics_sink(&config, buffer.clone());
    sink.record_request(&list_event());
    let text = buffer.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["type"], "request");
    assert_eq!(record["call"], "list_all");
}

// ============================================================================
// SECTION: Containers Commands
// ============================================================================

#[test]
fn list_without_filters_lists_all() {
    let transport = CannedTransport::new(r#"[{"Id": "8dfafdbc3a40", "Names": ["/boring"]}]"#);
    let command = containers_command(parse(&["cargowhale", "containers", "list"]));
    let mut out = Vec::new();
    run_containers(&command, &client(&transport), &mut out).unwrap();

    assert_eq!(transport.urls(), vec!["http://docker.local:2375/containers/?all=1"]);
    let listed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(listed[0]["Id"], "8dfafdbc3a40");
    assert_eq!(listed[0]["Names"][0], "/boring");
}

#[test]
fn list_with_filters_sends_filter_json() {
    let transport = CannedTransport::new("[]");
    let command =
        containers_command(parse(&["cargowhale", "containers", "list", "--status", "running"]));
    let mut out = Vec::new();
    run_containers(&command, &client(&transport), &mut out).unwrap();

    assert_eq!(
        transport.urls(),
        vec![r#"http://docker.local:2375/containers/?filters={"status":["running"]}"#]
    );
    assert_eq!(out, b"[]\n");
}

#[test]
fn logs_are_wrapped_in_json() {
    let transport = CannedTransport::new("line one\nline two\n");
    let command = containers_command(parse(&["cargowhale", "containers", "logs", "abc"]));
    let mut out = Vec::new();
    run_containers(&command, &client(&transport), &mut out).unwrap();

    assert_eq!(
        transport.urls(),
        vec!["http://docker.local:2375/containers/abc/logs?follow=0&stdout=1&stderr=1&timestamps=0"]
    );
    let logs: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(logs["logs"], "line one\nline two\n");
}

#[test]
fn unsafe_id_fails_before_any_request() {
    let transport = CannedTransport::new("{}");
    let command = containers_command(parse(&["cargowhale", "containers", "inspect", "../etc"]));
    let mut out = Vec::new();
    let err = run_containers(&command, &client(&transport), &mut out).unwrap_err();

    assert!(matches!(err, CliError::Gateway(_)), "unexpected error: {err}");
    assert!(transport.urls().is_empty());
    assert!(out.is_empty());
}
