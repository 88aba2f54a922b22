//! Tracing setup.

use std::collections::HashSet;
use std::fmt::Display;

use tracing_subscriber::{Layer, filter::Targets, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the environment variable listing trace events to enable.
pub const TRACE_EVENTS_ENV_VAR: &str = "NACRE_LOG";

/// Type of event to trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceEvent {
    /// Traces command execution.
    #[clap(name = "commands")]
    Commands,
    /// Traces word expansion.
    #[clap(name = "expansion")]
    Expansion,
    /// Traces here-document capture.
    #[clap(name = "heredoc")]
    Heredoc,
    /// Traces reading of input lines.
    #[clap(name = "input")]
    Input,
    /// Traces validation and tokenizing of input lines.
    #[clap(name = "parse")]
    Parse,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commands => write!(f, "commands"),
            Self::Expansion => write!(f, "expansion"),
            Self::Heredoc => write!(f, "heredoc"),
            Self::Input => write!(f, "input"),
            Self::Parse => write!(f, "parse"),
        }
    }
}

impl TraceEvent {
    const fn target(self) -> &'static str {
        match self {
            Self::Commands => nacre_core::trace_categories::COMMANDS,
            Self::Expansion => nacre_core::trace_categories::EXPANSION,
            Self::Heredoc => nacre_core::trace_categories::HEREDOC,
            Self::Input => nacre_core::trace_categories::INPUT,
            Self::Parse => nacre_core::trace_categories::PARSE,
        }
    }
}

/// Parses a comma-separated list of trace events, as found in `NACRE_LOG`. `all`
/// enables every event; unknown names are ignored.
///
/// # Arguments
///
/// * `list` - The list to parse.
pub fn parse_event_list(list: &str) -> Vec<TraceEvent> {
    use clap::ValueEnum as _;

    let mut events = vec![];
    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if name.eq_ignore_ascii_case("all") {
            events.extend_from_slice(TraceEvent::value_variants());
        } else if let Ok(event) = TraceEvent::from_str(name, true) {
            events.push(event);
        }
    }
    events
}

/// Tracks which trace events are enabled.
#[derive(Default)]
pub struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
}

impl TraceEventConfig {
    /// Installs a global subscriber writing to standard error, with the given events
    /// enabled at debug level. Everything else is reported at warning level and above.
    ///
    /// # Arguments
    ///
    /// * `enabled_log_events` - The events to enable.
    pub fn init(enabled_log_events: &[TraceEvent]) -> Self {
        let config = Self {
            enabled_trace_events: enabled_log_events.iter().copied().collect(),
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(config.compose_filter());

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            // Something went wrong; proceed on anyway but complain audibly.
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        Targets::new()
            .with_default(tracing_subscriber::filter::LevelFilter::WARN)
            .with_targets(
                self.enabled_trace_events
                    .iter()
                    .map(|event| (event.target(), tracing::Level::DEBUG)),
            )
    }

    /// Returns the enabled events.
    pub const fn get_enabled_events(&self) -> &HashSet<TraceEvent> {
        &self.enabled_trace_events
    }
}
