pub mod builder;
pub mod discover;
pub mod error;
pub mod export;
pub mod mapping;
pub mod rejects;
pub mod table;

pub use builder::{build_record, build_table, fallback_phone, BuiltTable, RejectReason, RejectedRow};
pub use discover::discover_inputs;
pub use error::{IngestError, Result};
pub use mapping::{detect_mapping, CanonicalField, ColumnMapping};
pub use rejects::RejectSink;
pub use table::{parse_bytes, parse_table, read_table, RowView, SourceRow, SourceTable};
