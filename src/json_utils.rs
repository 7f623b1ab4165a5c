//! Full-snapshot JSON persistence.
//!
//! A backing file holds one JSON array. Reads load the whole array, writes
//! truncate the file and serialize the whole collection again.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Reads every record of the JSON array stored at `path`.
pub fn read_json<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Overwrites `path` in place with `records` as a JSON array.
pub fn write_json<T, P>(path: P, records: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}
