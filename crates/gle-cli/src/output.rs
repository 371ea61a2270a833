//! Output formatting for retrieved events.
//!
//! Supports text (raw messages) and JSON-lines output.

use std::io::Write;

use gle_query::model::Event;
use gle_query::{EventSink, MessageWriter, QueryError};

use crate::cli::Format;

/// Output formatter that builds the event sink for the selected format.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Wrap a writer in the sink for this format.
    #[must_use]
    pub fn sink<'w, W: Write + 'w>(&self, writer: W) -> Box<dyn EventSink + 'w> {
        match self.format {
            Format::Text => Box::new(MessageWriter::new(writer)),
            Format::Json => Box::new(JsonLinesWriter::new(writer)),
        }
    }
}

/// Writes each event as a single-line JSON object.
#[derive(Debug)]
pub struct JsonLinesWriter<W> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesWriter<W> {
    fn emit(&mut self, event: &Event) -> gle_query::Result<()> {
        serde_json::to_writer(&mut self.writer, event)
            .map_err(|e| QueryError::Encode {
                context: "event".to_string(),
                message: e.to_string(),
            })?;
        writeln!(self.writer)?;
        Ok(())
    }
}
