//! Plain-text event formatter that tags each line with the root and current span ids,
//! so one graph run or CLI flow can be followed through a shared log file.

use std::fmt;

use tracing_core::Subscriber;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// `TIMESTAMP LEVEL target: [trace_id=R span_id=S span=name] fields`.
///
/// The bracketed part is present only when the event is inside a span.
#[derive(Default)]
pub struct TextWithSpanIds {
    timer: SystemTime,
    without_target: bool,
}

impl TextWithSpanIds {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn without_target(mut self) -> Self {
        self.without_target = true;
        self
    }
}

impl<S, N> FormatEvent<S, N> for TextWithSpanIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing_core::Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        self.timer.format_time(&mut writer)?;
        write!(writer, " {}", meta.level())?;
        if !self.without_target {
            write!(writer, " {}:", meta.target())?;
        }

        if let Some(span) = ctx.parent_span() {
            let span_id = span.id().into_u64();
            let trace_id = span
                .scope()
                .from_root()
                .next()
                .map(|root| root.id().into_u64())
                .unwrap_or(span_id);
            write!(
                writer,
                " [trace_id={} span_id={} span={}]",
                trace_id,
                span_id,
                span.name()
            )?;
        }

        write!(writer, " ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
