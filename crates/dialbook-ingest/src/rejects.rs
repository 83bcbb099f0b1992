use crate::builder::RejectedRow;
use crate::error::Result;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Collects rejected rows from any number of files. The output header is the
/// union of every row's headers in first-seen order; cells a row lacks are
/// written blank.
#[derive(Debug, Default)]
pub struct RejectSink {
    headers: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl RejectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rejected: &RejectedRow) {
        let mut row = HashMap::with_capacity(rejected.fields.len());
        for (header, value) in &rejected.fields {
            if !self.headers.contains(header) {
                self.headers.push(header.clone());
            }
            row.insert(header.clone(), value.clone());
        }
        self.rows.push(row);
    }

    pub fn extend<'a>(&mut self, rejected: impl IntoIterator<Item = &'a RejectedRow>) {
        for row in rejected {
            self.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        if self.headers.is_empty() {
            return Ok(());
        }
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(
                self.headers
                    .iter()
                    .map(|header| row.get(header).map(String::as_str).unwrap_or("")),
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }
}
