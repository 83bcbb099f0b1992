use crate::error::{IngestError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// One CSV file held in memory. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

#[derive(Debug, Clone)]
pub struct SourceRow {
    /// 1-based line of the record in the source file.
    pub line: u64,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    headers: &'a [String],
    row: &'a SourceRow,
}

impl SourceTable {
    pub fn views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |row| RowView {
            headers: &self.headers,
            row,
        })
    }
}

impl<'a> RowView<'a> {
    pub fn line(&self) -> u64 {
        self.row.line
    }

    pub fn get(&self, header: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|candidate| candidate == header)?;
        self.row.cells.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.row.cells.iter().map(String::as_str))
    }
}

pub fn read_table(path: &Path) -> Result<SourceTable> {
    let data = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&data).map_err(|err| match err {
        IngestError::Csv(source) => IngestError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parses CSV text with a header row. Short rows are padded with blanks; cells
/// past the header width get `column_<n>` headers; repeated headers get
/// `.1`, `.2`, ... suffixes.
pub fn parse_table(data: &str) -> Result<SourceTable> {
    parse_bytes(data.as_bytes())
}

/// Like [`parse_table`], but invalid UTF-8 inside a cell is replaced with
/// U+FFFD instead of failing the whole file.
pub fn parse_bytes(data: &[u8]) -> Result<SourceTable> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut headers = lossy_cells(reader.byte_headers()?);

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        rows.push(SourceRow {
            line,
            cells: lossy_cells(&record),
        });
    }

    let width = rows
        .iter()
        .map(|row| row.cells.len())
        .max()
        .unwrap_or_default()
        .max(headers.len());
    for index in headers.len()..width {
        headers.push(format!("column_{}", index + 1));
    }
    for row in &mut rows {
        row.cells.resize(width, String::new());
    }

    Ok(SourceTable {
        headers: dedupe_headers(headers),
        rows,
    })
}

fn lossy_cells(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect()
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for (index, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("column_{}", index + 1)
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{parse_bytes, parse_table, read_table};
    use crate::error::IngestError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_table_reads_headers_and_rows() {
        let table = parse_table("Mobile,FullName,City\n9000000001,Asha,Pune\n900000000,Ravi,Mumbai\n")
            .expect("parse");
        assert_eq!(table.headers, vec!["Mobile", "FullName", "City"]);
        assert_eq!(table.rows.len(), 2);
        let first = table.views().next().expect("row");
        assert_eq!(first.get("FullName"), Some("Asha"));
        assert_eq!(first.line(), 2);
    }

    #[test]
    fn ragged_rows_are_padded_and_overflow_is_named() {
        let table = parse_table("phone,name\n9000000001\n9000000002,Ravi,extra\n").expect("parse");
        assert_eq!(table.headers, vec!["phone", "name", "column_3"]);
        let rows: Vec<_> = table.views().collect();
        assert_eq!(rows[0].get("name"), Some(""));
        assert_eq!(rows[1].get("column_3"), Some("extra"));
    }

    #[test]
    fn duplicate_and_blank_headers_are_disambiguated() {
        let table = parse_table("\u{feff}name,name,,name\na,b,c,d\n").expect("parse");
        assert_eq!(table.headers, vec!["name", "name.1", "column_3", "name.2"]);
    }

    #[test]
    fn quoted_cells_keep_commas() {
        let table = parse_table("phone,address\n9000000001,\"12 MG Road, Camp, Pune\"\n").expect("parse");
        let row = table.views().next().expect("row");
        assert_eq!(row.get("address"), Some("12 MG Road, Camp, Pune"));
    }

    #[test]
    fn invalid_utf8_is_replaced_per_cell() {
        let table = parse_bytes(b"\xef\xbb\xbfphone,name\n9000000001,Asha\n9\xff00,B\xfeb\n")
            .expect("parse");
        assert_eq!(table.headers, vec!["phone", "name"]);
        assert_eq!(table.rows.len(), 2);
        let rows: Vec<_> = table.views().collect();
        assert_eq!(rows[0].get("name"), Some("Asha"));
        assert_eq!(rows[1].get("phone"), Some("9\u{fffd}00"));
        assert_eq!(rows[1].get("name"), Some("B\u{fffd}b"));
        assert_eq!(rows[1].line(), 3);
    }

    #[test]
    fn read_table_reports_missing_file_with_path() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("missing.csv");
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, IngestError::Read { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn read_table_loads_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("contacts.csv");
        fs::write(&path, "phone\n9000000001\n").expect("write");
        let table = read_table(&path).expect("read");
        assert_eq!(table.rows.len(), 1);
    }
}
