use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target of events emitted by this crate.
pub const TARGET_PREFIX: &str = "searcher";

/// Every workspace crate whose events the layer renders.
pub const WORKSPACE_TARGETS: &[&str] = &[
    TARGET_PREFIX,
    "comby_client",
    "index_client",
    "api",
    "structural_searcher",
];

/// RFC3339 UTC timer via `chrono`, whole seconds, `Z` suffix.
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Formatting layer that renders only events from [`WORKSPACE_TARGETS`]. Span
/// close events carry the duration of instrumented calls.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_workspace = filter::filter_fn(|meta| {
        WORKSPACE_TARGETS
            .iter()
            .any(|t| meta.target().starts_with(t))
    });

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// `searcher=<level>`.
pub fn level_directive(level: Level) -> Directive {
    let lvl = LevelFilter::from_level(level);
    format!("{TARGET_PREFIX}={lvl}")
        .parse()
        .unwrap_or_else(|_| Directive::from(lvl))
}

/// `RUST_LOG` (or `default` when unset/invalid) plus a searcher-specific level.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    base.add_directive(level_directive(level))
}
