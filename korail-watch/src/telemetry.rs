//! Tracing setup and the in-memory log buffer behind the web log stream.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Lines kept for the web log stream.
pub const LOG_BUFFER_CAPACITY: usize = 5000;

/// One buffered log line with its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug, Default)]
struct Lines {
    lines: VecDeque<LogLine>,
    next_seq: u64,
}

/// Bounded buffer of recent log lines. Oldest lines are dropped first.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Lines>>,
    capacity: usize,
    notify: Arc<Notify>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Lines::default())),
            capacity: capacity.max(1),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn push(&self, text: impl Into<String>) {
        {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.lines.push_back(LogLine {
                seq,
                text: text.into(),
            });
            while inner.lines.len() > self.capacity {
                inner.lines.pop_front();
            }
        }
        self.notify.notify_waiters();
    }

    /// Lines with `seq >= from`, oldest first.
    pub fn since(&self, from: u64) -> Vec<LogLine> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .lines
            .iter()
            .filter(|line| line.seq >= from)
            .cloned()
            .collect()
    }

    /// Sequence number the next pushed line will get.
    pub fn next_seq(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_seq
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all buffered lines. Sequence numbers keep increasing.
    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .clear();
    }

    /// Resolve when a line is pushed after this call.
    pub async fn changed(&self) {
        self.notify.notified().await;
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(LOG_BUFFER_CAPACITY)
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Mirrors this crate's events into a [`LogBuffer`].
pub struct LogBufferLayer {
    buffer: LogBuffer,
}

impl LogBufferLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for LogBufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(format!(
            "[{}] {:<5} {}{}",
            chrono::Local::now().format("%H:%M:%S"),
            metadata.level(),
            visitor.message,
            visitor.fields
        ));
    }
}

/// Install the global subscriber: `RUST_LOG` filtering (default `info`),
/// formatted output on stderr, and optionally a buffer for the web panel.
pub fn init(buffer: Option<LogBuffer>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(buffer.map(LogBufferLayer::new))
        .init();
}
