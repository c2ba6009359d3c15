//! Tracing subscriber setup.

use std::sync::mpsc::Sender;

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Where formatted log lines go.
pub enum LogTarget {
    /// Standard error (one-shot commands).
    Stderr,
    /// Forwarded line by line, for a UI that owns the terminal.
    Channel(Sender<String>),
}

/// `io::Write` adapter that forwards each write as one string.
#[derive(Clone)]
pub struct ChannelWriter {
    sender: Sender<String>,
}

impl ChannelWriter {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf).into_owned();
        // receiver gone means the UI already exited
        let _ = self.sender.send(text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Builds the filter for this crate at `level`; `RUST_LOG` adds directives.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(
        format!("iberia_chronos={}", level)
            .parse()
            .unwrap_or_else(|_| {
                "iberia_chronos=info"
                    .parse()
                    .expect("fallback directive is valid")
            }),
    )
}

/// Installs the global subscriber. `format` is `text` or `json`.
pub fn init_logging(level: &str, format: &str, target: LogTarget) {
    let json = format.eq_ignore_ascii_case("json");

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match (target, json) {
        (LogTarget::Stderr, false) => fmt::layer().with_writer(std::io::stderr).boxed(),
        (LogTarget::Stderr, true) => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        (LogTarget::Channel(sender), false) => fmt::layer()
            .compact()
            .with_ansi(false)
            .with_writer(move || ChannelWriter::new(sender.clone()))
            .boxed(),
        (LogTarget::Channel(sender), true) => fmt::layer()
            .json()
            .with_writer(move || ChannelWriter::new(sender.clone()))
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(build_filter(level))
        .init();
}
