//! Tabular loader: delimited text file → [`Table`].
//!
//! Bytes are decoded with `encoding_rs` (so any WHATWG encoding label works),
//! parsed by the polars CSV reader with every column read as text, and then
//! handed to [`Column::infer`] so type inference stays explicit and
//! independent of the reader's own schema guessing.

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use crate::config::LoadOptions;
use crate::error::LoadError;
use crate::table::{Column, Table};

/// Load a delimited text file with a header row.
pub fn load_table(
    path: &Path,
    options: &LoadOptions,
) -> std::result::Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let encoding = encoding_rs::Encoding::for_label(options.encoding.trim().as_bytes()).ok_or_else(
        || LoadError::UnsupportedEncoding {
            label: options.encoding.clone(),
        },
    )?;

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, used_encoding, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(LoadError::Decode {
            path: path.to_path_buf(),
            encoding: used_encoding.name().to_string(),
        });
    }
    debug!(
        "Decoded {} bytes from {} as {}",
        bytes.len(),
        path.display(),
        used_encoding.name()
    );

    let table = parse_delimited(text.into_owned(), options.delimiter).map_err(|e| {
        LoadError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    info!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

/// Parse already-decoded delimited text.
pub fn parse_delimited(content: String, delimiter: u8) -> crate::error::Result<Table> {
    // A schema length of 0 makes the reader keep every column as text.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(delimiter)
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()?;

    dataframe_to_table(&df)
}

fn dataframe_to_table(df: &DataFrame) -> crate::error::Result<Table> {
    let mut columns = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let text = col.cast(&DataType::String)?;
        let values = text.str()?;
        let column = Column::infer(col.name().as_str(), values.into_iter());
        debug!("Column '{}' inferred as {}", column.name(), column.kind());
        columns.push(column);
    }

    Table::new(columns)
}
