//! Warning/error tally for end-of-run summaries.
//!
//! The testbench reports how many warnings and errors were logged during a
//! run. Counting happens in a [`Layer`] so that the core crates only emit
//! ordinary `tracing` events and never track diagnostics themselves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Shared counters of `WARN` and `ERROR` events.
///
/// Cloning is cheap; every clone observes the same counters.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticTally {
    warnings: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
}

impl DiagnosticTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `WARN` events observed so far.
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Number of `ERROR` events observed so far.
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Count one event at `level`. Levels other than `WARN`/`ERROR` are ignored.
    pub fn record(&self, level: &Level) {
        if *level == Level::WARN {
            self.warnings.fetch_add(1, Ordering::Relaxed);
        } else if *level == Level::ERROR {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl<S> Layer<S> for DiagnosticTally
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.record(event.metadata().level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_subscriber, TracingConfig};

    #[test]
    fn counts_only_warnings_and_errors() {
        let tally = DiagnosticTally::new();
        tally.record(&Level::INFO);
        tally.record(&Level::WARN);
        tally.record(&Level::ERROR);
        tally.record(&Level::ERROR);
        tally.record(&Level::DEBUG);

        assert_eq!(tally.warnings(), 1);
        assert_eq!(tally.errors(), 2);
    }

    #[test]
    fn layer_observes_filtered_events() {
        let tally = DiagnosticTally::new();
        let config = TracingConfig {
            directives: Some("warn".to_string()),
            ansi: false,
            ..TracingConfig::for_local()
        };
        let subscriber = build_subscriber(&config, tally.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("filtered out");
            tracing::warn!(trial = 3, "suspicious");
            tracing::error!(mismatches = 1, "mismatch");
        });

        assert_eq!(tally.warnings(), 1);
        assert_eq!(tally.errors(), 1);
    }
}
