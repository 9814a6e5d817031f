//! Compact formatting helpers for log and trace output.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::engine::sim_clock;
use crate::types::Tick;

/// Format a u64 with underscore grouping (groups of 3 from the right).
pub(crate) fn fmt_grouped(v: u64) -> String {
    let digits = v.to_string();
    let len = digits.len();
    if len <= 3 {
        return digits;
    }
    let mut result = String::with_capacity(len + (len - 1) / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push('_');
        }
        result.push(ch);
    }
    result
}

/// Simulated tick, right-aligned and underscore-grouped: `t=  1_024`.
pub struct FmtTick(pub Tick);

impl fmt::Display for FmtTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:>7}", fmt_grouped(self.0))
    }
}

/// Log line layout used by the binary and the test helpers:
/// `[t=     12]  INFO DISPATCH pid=3 name=editor level=0 quantum=5`.
///
/// The tick comes from [`sim_clock`], so events logged outside a run carry
/// whatever tick the last run on this thread stopped at.
pub struct SimFormat;

fn level_color(level: Level) -> &'static str {
    if level == Level::ERROR {
        "\x1b[31m"
    } else if level == Level::WARN {
        "\x1b[33m"
    } else if level == Level::INFO {
        "\x1b[32m"
    } else {
        "\x1b[2m"
    }
}

impl<S, N> FormatEvent<S, N> for SimFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = *event.metadata().level();
        let mut line = EventLine::default();
        event.record(&mut line);

        write!(writer, "[{}] ", FmtTick(sim_clock()))?;
        if writer.has_ansi_escapes() {
            write!(writer, "{}{level:>5}\x1b[0m", level_color(level))?;
        } else {
            write!(writer, "{level:>5}")?;
        }
        writeln!(writer, " {}{}", line.message, line.fields)
    }
}

/// Event message plus its structured fields rendered as ` key=value`.
#[derive(Default)]
struct EventLine {
    message: String,
    fields: String,
}

impl EventLine {
    fn field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        use std::fmt::Write as _;

        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

impl Visit for EventLine {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.field(field, format_args!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.field(field, format_args!("{value}"));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.field(field, format_args!("{value}"));
    }
}
