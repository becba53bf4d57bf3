//! Observation records and the sinks that consume them

use crate::config::OutputFormat;
use crate::parser::SourcePosition;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    Definition,
    Comment,
    Literal,
}

/// One reported fact: what was seen, its text, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub kind: ObservationKind,
    pub text: String,
    #[serde(flatten)]
    pub position: SourcePosition,
}

impl Observation {
    pub fn new(kind: ObservationKind, text: impl Into<String>, position: SourcePosition) -> Self {
        Observation {
            kind,
            text: text.into(),
            position,
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ObservationKind::Definition => {
                write!(f, "Found definition for {} in {}", self.text, self.position)
            }
            ObservationKind::Comment => write!(f, "Found comment: {} at {}", self.text, self.position),
            ObservationKind::Literal => write!(f, "Found literal: {} at {}", self.text, self.position),
        }
    }
}

/// Receives observations in the order they are made
pub trait ReportSink {
    fn report(&mut self, observation: Observation);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn report(&mut self, observation: Observation) {
        (**self).report(observation);
    }
}

/// Sink that keeps every observation in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub observations: Vec<Observation>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    /// Get all observations rendered in the text format
    pub fn lines(&self) -> Vec<String> {
        self.observations.iter().map(ToString::to_string).collect()
    }

    pub fn of_kind(&self, kind: ObservationKind) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl ReportSink for CollectingSink {
    fn report(&mut self, observation: Observation) {
        self.observations.push(observation);
    }
}

/// Sink writing one line per observation. The first write error stops
/// output and is returned by [`WriterSink::finish`].
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
    error: Option<io::Error>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        WriterSink {
            writer,
            format,
            error: None,
        }
    }

    fn write(&mut self, observation: &Observation) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{observation}"),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, observation)?;
                writeln!(self.writer)
            }
        }
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn report(&mut self, observation: Observation) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write(&observation) {
            self.error = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(line: usize) -> SourcePosition {
        SourcePosition::new("/p/a.c", line, 5)
    }

    #[test]
    fn test_text_format() {
        let lines: Vec<String> = [
            Observation::new(ObservationKind::Definition, "foo", position(3)),
            Observation::new(ObservationKind::Comment, "// hello", position(1)),
            Observation::new(ObservationKind::Literal, "\"hi\"", position(2)),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            lines,
            [
                "Found definition for foo in /p/a.c:3:5",
                "Found comment: // hello at /p/a.c:1:5",
                "Found literal: \"hi\" at /p/a.c:2:5",
            ]
        );
    }

    #[test]
    fn test_writer_sink_formats() {
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);
        sink.report(Observation::new(ObservationKind::Literal, "\"x\"", position(7)));
        let output = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(
            output,
            "{\"kind\":\"literal\",\"text\":\"\\\"x\\\"\",\"file\":\"/p/a.c\",\"line\":7,\"column\":5}\n"
        );

        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Text);
        sink.report(Observation::new(ObservationKind::Definition, "bar", position(1)));
        let output = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(output, "Found definition for bar in /p/a.c:1:5\n");
    }

    #[derive(Debug)]
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sink_keeps_first_error() {
        let mut sink = WriterSink::new(BrokenPipe, OutputFormat::Text);
        sink.report(Observation::new(ObservationKind::Comment, "/* a */", position(1)));
        sink.report(Observation::new(ObservationKind::Comment, "/* b */", position(2)));

        let error = sink.finish().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    fn feed<S: ReportSink>(mut sink: S) {
        sink.report(Observation::new(ObservationKind::Comment, "// c", position(4)));
    }

    #[test]
    fn test_collecting_through_reference() {
        let mut sink = CollectingSink::new();
        feed(&mut sink);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.of_kind(ObservationKind::Comment).count(), 1);
        assert_eq!(sink.of_kind(ObservationKind::Definition).count(), 0);
    }
}
