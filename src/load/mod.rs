// src/load/mod.rs

use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::{
    fmt,
    fs::File,
    io::{self, Cursor, Read},
    path::Path,
    sync::Arc,
};
use tracing::{debug, error, info};

const BATCH_SIZE: usize = 8_192;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Why a source produced no table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The source does not exist.
    NotFound { source: String },
    /// The source exists but could not be read or parsed as delimited text.
    Unreadable { source: String, reason: String },
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::NotFound { source } => write!(f, "source `{}` not found", source),
            LoadFailure::Unreadable { source, reason } => {
                write!(f, "unexpected error while loading `{}`: {}", source, reason)
            }
        }
    }
}

/// Result of a load: a complete table, or nothing at all.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(RecordBatch),
    NoData(LoadFailure),
}

impl LoadOutcome {
    pub fn into_table(self) -> Option<RecordBatch> {
        match self {
            LoadOutcome::Loaded(batch) => Some(batch),
            LoadOutcome::NoData(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

/// Read a delimited file into a single all-`Utf8` table.
///
/// Never returns a partial table: any failure yields `NoData`, logged once
/// here so callers only have to stop.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P, delimiter: u8) -> LoadOutcome {
    let path = path.as_ref();
    let source = path.display().to_string();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!(source = %source, "source file not found");
            return LoadOutcome::NoData(LoadFailure::NotFound { source });
        }
        Err(e) => return unreadable(source, e.to_string()),
    };

    load_reader(file, &source, delimiter)
}

/// Same as [`load_table`] for an arbitrary byte stream. `source` only labels
/// diagnostics.
pub fn load_reader<R: Read>(mut reader: R, source: &str, delimiter: u8) -> LoadOutcome {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf) {
        return unreadable(source.to_string(), e.to_string());
    }
    debug!(source, bytes = buf.len(), "buffered source");

    match parse_delimited(buf, delimiter) {
        Ok(batch) => {
            info!(
                source,
                rows = batch.num_rows(),
                columns = batch.num_columns(),
                "loaded raw table"
            );
            LoadOutcome::Loaded(batch)
        }
        Err(e) => unreadable(source.to_string(), e.to_string()),
    }
}

fn unreadable(source: String, reason: String) -> LoadOutcome {
    error!(source = %source, reason = %reason, "failed to load source");
    LoadOutcome::NoData(LoadFailure::Unreadable { source, reason })
}

/// Header names come from the first line; every column is read as nullable
/// text and typed later by the normalizers.
fn parse_delimited(mut buf: Vec<u8>, delimiter: u8) -> Result<RecordBatch, ArrowError> {
    if buf.starts_with(UTF8_BOM) {
        buf.drain(..UTF8_BOM.len());
    }

    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter)
        .with_truncated_rows(true);
    let (inferred, _) = format.infer_schema(Cursor::new(&buf), Some(0))?;
    if inferred.fields().is_empty() {
        return Err(ArrowError::CsvError("missing header row".to_string()));
    }

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .with_truncated_rows(true)
        .with_batch_size(BATCH_SIZE)
        .build(Cursor::new(buf))?;

    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    concat_batches(&schema, &batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::init_test_logging;
    use anyhow::Result;
    use arrow::array::{Array, StringArray};
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const SAMPLE: &str = "nom_station,consolidated_latitude,consolidated_longitude,gratuit
Mairie,48.85,2.35,oui
Gare,,2.1,false
";

    #[test]
    fn loads_every_column_as_text() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SAMPLE.as_bytes())?;

        let batch = load_table(tmp.path(), b',')
            .into_table()
            .expect("sample should load");
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);
        for field in batch.schema().fields() {
            assert_eq!(field.data_type(), &DataType::Utf8);
        }

        let lat = batch
            .column_by_name("consolidated_latitude")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(lat.value(0), "48.85");
        assert!(lat.is_null(1), "empty field should load as null");
        Ok(())
    }

    #[test]
    fn missing_source_is_no_data() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let outcome = load_table(dir.path().join("absent.csv"), b',');
        match outcome {
            LoadOutcome::NoData(LoadFailure::NotFound { source }) => {
                assert!(source.ends_with("absent.csv"))
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_source_is_no_data_with_reason() {
        init_test_logging();
        // a directory opens fine on unix but cannot be read as a file
        let dir = tempdir().unwrap();
        let outcome = load_table(dir.path(), b',');
        assert!(matches!(
            outcome,
            LoadOutcome::NoData(LoadFailure::Unreadable { .. })
        ));
    }

    #[test]
    fn header_only_source_loads_zero_rows() {
        let outcome = load_reader(
            "nom_station,gratuit\n".as_bytes(),
            "inline",
            b',',
        );
        let batch = outcome.into_table().expect("header-only input still loads");
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 2);
    }

    #[test]
    fn empty_stream_is_unreadable() {
        let outcome = load_reader(&b""[..], "inline", b',');
        assert!(!outcome.is_loaded());
    }

    #[test]
    fn honours_delimiter_and_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("nom_station;gratuit\nA;1\n".as_bytes());
        let batch = load_reader(bytes.as_slice(), "inline", b';')
            .into_table()
            .unwrap();
        assert_eq!(batch.schema().field(0).name(), "nom_station");
        assert_eq!(batch.num_rows(), 1);
    }
}
