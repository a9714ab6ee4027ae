use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, StringArray, UInt64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
    util::pretty::pretty_format_batches,
};
use clap::Parser;
use irveprep::{clean_data, config::delimiter_byte, load::load_table};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{fmt, EnvFilter};

/// Compare column completeness before and after cleaning.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Consolidated IRVE CSV export
    source: PathBuf,
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

/// One row per column: type, row count and null count.
fn column_stats(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let types: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| f.data_type().to_string())
        .collect();
    let rows = vec![batch.num_rows() as u64; batch.num_columns()];
    let nulls: Vec<u64> = batch
        .columns()
        .iter()
        .map(|c| c.null_count() as u64)
        .collect();

    let stats = Schema::new(vec![
        Field::new("column", DataType::Utf8, false),
        Field::new("type", DataType::Utf8, false),
        Field::new("rows", DataType::UInt64, false),
        Field::new("nulls", DataType::UInt64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(names)),
        Arc::new(StringArray::from(types)),
        Arc::new(UInt64Array::from(rows)),
        Arc::new(UInt64Array::from(nulls)),
    ];
    Ok(RecordBatch::try_new(Arc::new(stats), columns)?)
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let delimiter = delimiter_byte(args.delimiter)?;

    let raw = load_table(&args.source, delimiter)
        .into_table()
        .ok_or_else(|| anyhow!("no data loaded from {}", args.source.display()))?;
    let cleaned = clean_data(&raw).context("cleaning pipeline failed")?;

    println!("=== Raw table ===");
    println!("{}", pretty_format_batches(&[column_stats(&raw)?])?);
    println!("\n=== Cleaned table ===");
    println!("{}", pretty_format_batches(&[column_stats(&cleaned)?])?);

    let dropped = raw.num_rows() - cleaned.num_rows();
    println!(
        "\n{} rows in, {} rows out, {} dropped ({:.2}%)",
        raw.num_rows(),
        cleaned.num_rows(),
        dropped,
        if raw.num_rows() == 0 {
            0.0
        } else {
            dropped as f64 * 100.0 / raw.num_rows() as f64
        }
    );
    Ok(())
}
