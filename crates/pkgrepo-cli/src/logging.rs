use std::{fmt::Write as _, io};

use nu_ansi_term::Color::{Blue, Magenta, Red, Yellow};
use tracing::{
    field::{Field, Visit},
    Event, Level, Metadata, Subscriber,
};
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter},
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

/// Message of an event, plus its other fields rendered as `key=value`.
#[derive(Default)]
struct EventText {
    message: String,
    fields: String,
}

impl Visit for EventText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// Plain console lines: INFO is printed bare, other levels get a coloured tag.
pub struct ConsoleFormat {
    show_fields: bool,
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut text = EventText::default();
        event.record(&mut text);

        let tag = match *event.metadata().level() {
            Level::INFO => None,
            Level::TRACE => Some(Colored(Magenta, "[TRACE]")),
            Level::DEBUG => Some(Colored(Blue, "[DEBUG]")),
            Level::WARN => Some(Colored(Yellow, "[WARN]")),
            Level::ERROR => Some(Colored(Red, "[ERROR]")),
        };
        if let Some(tag) = tag {
            write!(writer, "{tag} ")?;
        }

        write!(writer, "{}", text.message)?;
        if self.show_fields {
            write!(writer, "{}", text.fields)?;
        }
        writeln!(writer)
    }
}

/// Routes INFO to stdout and everything else to stderr.
struct Console;

/// Collects one formatted event; on drop it is printed with the progress bars suspended.
struct ConsoleLine {
    buffer: Vec<u8>,
    stderr: bool,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end_matches('\n');
        if line.is_empty() {
            return;
        }

        crate::progress::suspend(|| {
            if self.stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        });
    }
}

impl<'a> MakeWriter<'a> for Console {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> ConsoleLine {
        ConsoleLine {
            buffer: Vec::new(),
            stderr: false,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> ConsoleLine {
        ConsoleLine {
            buffer: Vec::new(),
            stderr: *meta.level() != Level::INFO,
        }
    }
}

fn filter_level(args: &Args) -> Level {
    match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

pub fn setup_logging(args: &Args) {
    let level = filter_level(args);

    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("pkgrepo={level}"))
        .with_target(false)
        .with_writer(Console)
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        let format = ConsoleFormat {
            show_fields: level >= Level::DEBUG,
        };
        Box::new(builder.event_format(format).finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber is already installed");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_filter_level() {
        let level = |argv: &[&str]| filter_level(&Args::try_parse_from(argv).unwrap());

        assert_eq!(level(&["pkgrepo", "defconfig"]), Level::INFO);
        assert_eq!(level(&["pkgrepo", "-v", "defconfig"]), Level::DEBUG);
        assert_eq!(level(&["pkgrepo", "-vvv", "defconfig"]), Level::TRACE);
        assert_eq!(level(&["pkgrepo", "-q", "-v", "defconfig"]), Level::ERROR);
    }
}
