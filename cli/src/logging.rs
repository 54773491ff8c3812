//! Logging initialization: logs go only to file (or are dropped), never to console.
//!
//! Reads `RUST_LOG` (level) and `LOG_FILE` (path) from env (e.g. via .env or
//! `~/.config/weft/config.toml`). Without `LOG_FILE`, stdout stays clean for results.

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// - **RUST_LOG**: filter, e.g. `info`, `weft=debug`. Default: `info` with hyper/reqwest quiet.
/// - **LOG_FILE**: append plain-text logs (trace/span ids, no ANSI) to this file.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper_util=off,reqwest=warn"));

    match std::env::var("LOG_FILE") {
        Ok(path) if !path.is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let writer = std::sync::Mutex::new(StripAnsiWriter::new(file));
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(crate::log_format::TextWithSpanIds::new())
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(path = %path, "weft logging to file");
        }
        _ => {
            let sink_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(sink_layer).try_init()?;
        }
    }
    Ok(())
}

/// Drops CSI escape sequences (`ESC [ ... final`) so file logs are plain text.
struct StripAnsiWriter<W> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> StripAnsiWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(16),
        }
    }
}

const ESC: u8 = 0x1b;
const MAX_PENDING: usize = 64;

impl<W: Write> Write for StripAnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut plain = Vec::with_capacity(buf.len());
        for &b in buf {
            match self.pending.len() {
                0 if b == ESC => self.pending.push(b),
                0 => plain.push(b),
                1 if b == b'[' => self.pending.push(b),
                1 => {
                    plain.extend_from_slice(&self.pending);
                    plain.push(b);
                    self.pending.clear();
                }
                _ if (0x40..=0x7e).contains(&b) => self.pending.clear(),
                _ if self.pending.len() >= MAX_PENDING => {
                    plain.extend_from_slice(&self.pending);
                    plain.push(b);
                    self.pending.clear();
                }
                _ => self.pending.push(b),
            }
        }
        self.inner.write_all(&plain)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(&self.pending)?;
            self.pending.clear();
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(chunks: &[&[u8]]) -> String {
        let mut w = StripAnsiWriter::new(Vec::new());
        for c in chunks {
            w.write_all(c).unwrap();
        }
        w.flush().unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip(&[b"\x1b[1;32mINFO\x1b[0m weft: ok"]), "INFO weft: ok");
    }

    #[test]
    fn escape_split_across_writes() {
        assert_eq!(strip(&[b"a\x1b", b"[3", b"1mb"]), "ab");
    }

    #[test]
    fn lone_escape_kept() {
        assert_eq!(strip(&[b"x\x1bYz"]), "x\x1bYz");
    }
}
