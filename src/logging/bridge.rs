//! Route `tracing` events into a [`LoggingContext`]
//!
//! Libraries and application code that use the `tracing` macros end up in the
//! same two sinks as direct calls. The event target becomes the class name.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::context::LoggingContext;
use super::event::{LogEvent, Severity};

/// A `tracing_subscriber` layer forwarding INFO and above to a logging context
pub struct LoggingLayer {
    context: Arc<LoggingContext>,
}

impl LoggingLayer {
    pub fn new(context: Arc<LoggingContext>) -> Self {
        Self { context }
    }
}

impl<S: Subscriber> Layer<S> for LoggingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let Some(severity) = Severity::from_tracing(*metadata.level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.context.log(&LogEvent::new(
            severity,
            metadata.target(),
            visitor.into_message(),
        ));
    }
}

/// Collects the `message` field plus any other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: &dyn std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }

    fn into_message(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field, &value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field, &value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field, &value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field, &value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field, &format_args!("{:?}", value));
        }
    }
}

/// Install a global `tracing` subscriber that feeds `context`.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn install_tracing(context: Arc<LoggingContext>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(LoggingLayer::new(context))
        .try_init()
        .context("Failed to install tracing subscriber")
}
