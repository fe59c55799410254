//! InfluxDB line protocol rendering for merged records.
//!
//! ```text
//! <prefix>[,<tagKey>=<tagValue>,...][,index=<n>] <measurement>=<value> <timestampNanoseconds>
//! ```
//!
//! Values are written in their natural text form. Nothing is quoted or
//! escaped, so tag values containing commas, spaces or `=` produce broken
//! lines.

use std::io::{self, Write};

use crate::aggregator::MergedRecord;
use crate::config::DEFAULT_PREFIX;
use crate::reading::Tag;
use crate::value::FieldValue;

/// Stateless renderer for [`MergedRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormatter {
    prefix: String,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

impl LineFormatter {
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Render a record: one line for a scalar, one per element for a sequence.
    #[must_use]
    pub fn render(&self, record: &MergedRecord) -> Vec<String> {
        let head = format!("{}{}", self.prefix, tags_text(&record.tags));
        let name = &record.measurement;
        let ts = record.timestamp;

        match &record.value {
            FieldValue::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| format!("{head},index={index} {name}={item} {ts}"))
                .collect(),
            FieldValue::Scalar(value) => vec![format!("{head} {name}={value} {ts}")],
        }
    }

    /// Write each rendered line followed by `\n`. Returns the number of lines.
    pub fn write_record<W: Write + ?Sized>(&self, out: &mut W, record: &MergedRecord) -> io::Result<usize> {
        let lines = self.render(record);
        for line in &lines {
            writeln!(out, "{line}")?;
        }
        Ok(lines.len())
    }
}

/// Render with the default `bacnet` prefix.
#[must_use]
pub fn render(record: &MergedRecord) -> Vec<String> {
    LineFormatter::default().render(record)
}

fn tags_text(tags: &[Tag]) -> String {
    tags.iter().map(|t| format!(",{}={}", t.key, t.value)).collect()
}
