//! CSV source files → [`Dataset`]
//!
//! Layout: one header row, then `date, price, user_id` by position.
//! An empty `price` is a null; `date` is kept verbatim.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::dataset::{Dataset, Record};
use crate::error::ParseError;

const COLUMNS: usize = 3;

/// Read a whole source file into memory.
pub fn read_dataset(path: &Path) -> Result<Dataset, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset_from_reader(file)?;
    log::debug!("{}: {} rows", path.display(), dataset.len());
    Ok(dataset)
}

/// Read CSV from any reader. The first row is treated as the header.
pub fn read_dataset_from_reader<R: Read>(reader: R) -> Result<Dataset, ParseError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut dataset = Dataset::new();
    for result in csv.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() != COLUMNS {
            return Err(ParseError::Columns {
                line,
                found: record.len(),
            });
        }

        let price = match &record[1] {
            "" => None,
            raw => Some(parse_int(raw, line, "price")?),
        };
        let user_id = parse_int(&record[2], line, "user_id")?;
        dataset.push(Record::new(&record[0], price, user_id));
    }
    Ok(dataset)
}

fn parse_int(raw: &str, line: u64, column: &'static str) -> Result<i64, ParseError> {
    raw.parse().map_err(|_| ParseError::Field {
        line,
        column,
        value: raw.to_string(),
    })
}
