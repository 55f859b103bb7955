//! Opt-in tracing setup for hosts embedding `chart-markers`.
//!
//! Marker ingestion and tooltip attach/detach log at `debug`; per-event
//! tooltip transitions and skipped placements log at `trace`. Hosts with
//! their own subscriber can ignore this module.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_TRACING_FILTER: &str = "chart_markers=info";

/// Installs a compact `fmt` subscriber honoring `RUST_LOG`, falling back to
/// [`DEFAULT_TRACING_FILTER`].
///
/// Returns `false` without the `telemetry` feature or when a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_TRACING_FILTER)
}

/// Like [`init_default_tracing`] with a caller-chosen fallback filter, e.g.
/// `"chart_markers::interaction=trace"` to follow tooltip transitions.
#[must_use]
pub fn init_tracing_with_filter(fallback_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback_filter));
        let Ok(filter) = filter else {
            return false;
        };

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_filter;
        false
    }
}
