//! CSV loading and export.
//!
//! All file I/O flows through this module:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.tsv` → tab,
//!   anything else → comma) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Loading**: [`load_table()`] reads a whole file into a [`Table`],
//!   inferring each column as numeric or text.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{Value, parse_cell},
    table::{Column, Table},
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    /// Columns kept as raw text regardless of their contents.
    pub verbatim_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            verbatim_columns: Vec::new(),
        }
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter, has_headers))
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    let mut reader = open_csv_reader_from_path(path, options.delimiter, true)?;
    read_table(&mut reader, options).with_context(|| format!("Loading table from {path:?}"))
}

/// Reads every record of `reader` into a [`Table`]. A column is numeric when
/// each non-empty cell parses as a number; otherwise every cell stays text.
pub fn read_table<R: Read>(reader: &mut csv::Reader<R>, options: &LoadOptions) -> Result<Table> {
    let headers = reader_headers(reader, options.encoding)?;
    let verbatim: HashSet<&str> = options.verbatim_columns.iter().map(String::as_str).collect();
    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        if record.len() != headers.len() {
            bail!(
                "Row {} has {} field(s) but the header declares {}",
                row_idx + 2,
                record.len(),
                headers.len()
            );
        }
        let decoded = decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        for (column, value) in raw_columns.iter_mut().zip(decoded) {
            column.push(value);
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| {
            let cells = if verbatim.contains(name.as_str()) {
                raw.into_iter().map(text_cell).collect()
            } else {
                infer_cells(raw)
            };
            Column::new(name, cells)
        })
        .collect::<Vec<_>>();
    let table = Table::new(columns)?;
    debug!(
        "Loaded {} row(s) across {} column(s)",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn text_cell(raw: String) -> Option<Value> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(Value::Text(raw))
    }
}

fn infer_cells(raw: Vec<String>) -> Vec<Option<Value>> {
    let parsed = raw.iter().map(|value| parse_cell(value)).collect::<Vec<_>>();
    if parsed.iter().flatten().all(Value::is_number) {
        parsed
    } else {
        raw.into_iter().map(text_cell).collect()
    }
}

pub fn write_table(table: &Table, path: Option<&Path>, delimiter: u8) -> Result<()> {
    let mut writer = open_csv_writer(path, delimiter)?;
    writer
        .write_record(table.headers())
        .context("Writing header row")?;
    for (idx, row) in table.display_rows(0).into_iter().enumerate() {
        writer
            .write_record(&row)
            .with_context(|| format!("Writing row {}", idx + 2))?;
    }
    writer.flush().context("Flushing output")?;
    Ok(())
}
