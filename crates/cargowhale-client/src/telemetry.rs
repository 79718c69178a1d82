// crates/cargowhale-client/src/telemetry.rs
// ============================================================================
// Module: Gateway Telemetry
// Description: Per-request metric events and a JSON-lines sink.
// Purpose: Observe gateway calls without tying the client to a backend.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The client reports one [`GatewayMetricEvent`] per call to a
//! [`GatewayMetrics`] sink. [`NoopMetrics`] discards events.
//! [`JsonLinesMetrics`] writes one JSON record per event and, when a summary
//! period is configured, a per-call summary record at most once per period.
//! The period is checked when an event is recorded; there is no background
//! timer.
//!
//! Records never carry container ids, URLs, or response bodies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use serde_json::json;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Gateway call classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayCall {
    /// List every container.
    ListAll,
    /// List containers matching filters.
    ListFiltered,
    /// Container details.
    Details,
    /// Container logs.
    Logs,
    /// Container process table.
    Processes,
}

impl GatewayCall {
    /// Returns a stable label for the call.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListAll => "list_all",
            Self::ListFiltered => "list_filtered",
            Self::Details => "details",
            Self::Logs => "logs",
            Self::Processes => "processes",
        }
    }
}

/// Gateway call outcome.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOutcome {
    /// The call returned a decoded model.
    Ok,
    /// The call failed.
    Error,
}

impl GatewayOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Metric event for one gateway call.
///
/// # Invariants
/// - `error_kind` is `Some` exactly when `outcome` is [`GatewayOutcome::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayMetricEvent {
    /// Call classification.
    pub call: GatewayCall,
    /// Call outcome.
    pub outcome: GatewayOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Wall time spent in the call.
    pub duration: Duration,
    /// Response body size in bytes, 0 when no body was received.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for gateway calls.
pub trait GatewayMetrics: Send + Sync {
    /// Records one call.
    fn record_request(&self, event: &GatewayMetricEvent);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl GatewayMetrics for NoopMetrics {
    fn record_request(&self, _event: &GatewayMetricEvent) {}
}

// ============================================================================
// SECTION: JSON Lines Sink
// ============================================================================

/// Counters accumulated between summary records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
struct CallCounters {
    /// Successful calls.
    ok: u64,
    /// Failed calls.
    error: u64,
    /// Response bytes received.
    response_bytes: u64,
}

/// Mutable sink state guarded by one lock.
struct SinkState<W> {
    /// Output writer.
    writer: W,
    /// Counters since the last summary.
    counters: BTreeMap<GatewayCall, CallCounters>,
    /// When the last summary was written, or the sink was created.
    last_summary: Instant,
}

/// JSON-lines metrics sink.
///
/// # Invariants
/// - Each record is one JSON object followed by `\n`.
/// - Summary records are written at most once per `summary_period`.
pub struct JsonLinesMetrics<W: Write + Send> {
    /// Writer and counters.
    state: Mutex<SinkState<W>>,
    /// Summary period; `None` disables summaries.
    summary_period: Option<Duration>,
    /// Records that could not be written.
    write_failures: AtomicU64,
}

impl<W: Write + Send> JsonLinesMetrics<W> {
    /// Creates a sink that writes per-request records only.
    pub fn new(writer: W) -> Self {
        Self::build(writer, None)
    }

    /// Creates a sink that also writes a summary record at most once per
    /// `period`.
    pub fn with_summary(writer: W, period: Duration) -> Self {
        Self::build(writer, Some(period))
    }

    /// Builds the sink.
    fn build(writer: W, summary_period: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(SinkState {
                writer,
                counters: BTreeMap::new(),
                last_summary: Instant::now(),
            }),
            summary_period,
            write_failures: AtomicU64::new(0),
        }
    }

    /// Returns how many records failed to write.
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Consumes the sink and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns the poisoned-lock error when a writer panicked mid-record.
    pub fn into_inner(self) -> Result<W, std::sync::PoisonError<W>> {
        self.state
            .into_inner()
            .map(|state| state.writer)
            .map_err(|poisoned| std::sync::PoisonError::new(poisoned.into_inner().writer))
    }

    /// Writes one record followed by a newline.
    fn write_record(&self, writer: &mut W, record: &serde_json::Value) {
        let written = serde_json::to_writer(&mut *writer, record)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if written.is_err() {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl<W: Write + Send> GatewayMetrics for JsonLinesMetrics<W> {
    fn record_request(&self, event: &GatewayMetricEvent) {
        let Ok(mut guard) = self.state.lock() else {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            return;
        };
        let state = &mut *guard;
        let record = json!({
            "type": "request",
            "call": event.call,
            "outcome": event.outcome,
            "error_kind": event.error_kind,
            "duration_ms": u64::try_from(event.duration.as_millis()).unwrap_or(u64::MAX),
            "response_bytes": event.response_bytes,
        });
        self.write_record(&mut state.writer, &record);

        let Some(period) = self.summary_period else {
            return;
        };
        let counters = state.counters.entry(event.call).or_default();
        match event.outcome {
            GatewayOutcome::Ok => counters.ok += 1,
            GatewayOutcome::Error => counters.error += 1,
        }
        counters.response_bytes = counters
            .response_bytes
            .saturating_add(u64::try_from(event.response_bytes).unwrap_or(u64::MAX));

        let now = Instant::now();
        if now.duration_since(state.last_summary) < period {
            return;
        }
        let calls: BTreeMap<&'static str, CallCounters> =
            state.counters.iter().map(|(call, counters)| (call.as_str(), *counters)).collect();
        let summary = json!({
            "type": "summary",
            "period_ms": u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "calls": calls,
        });
        self.write_record(&mut state.writer, &summary);
        state.counters.clear();
        state.last_summary = now;
    }
}
