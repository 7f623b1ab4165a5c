//! CSV form of the catalog, used by `keyboards export` and `keyboards import`.
//!
//! Rows have the flat [`KeyboardRow`] shape with a header line. Enum columns
//! use the same upper-case names as the JSON backing file.

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::{Keyboard, KeyboardRow};

/// Writes `keyboards` as CSV rows, header first.
pub fn export_keyboards<W: Write>(writer: W, keyboards: &[Keyboard]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for keyboard in keyboards {
        wtr.serialize(KeyboardRow::from(keyboard))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads every row of the CSV file at `path`, trimming whitespace around
/// fields. Fails on the first row that does not parse; nothing is returned
/// for a partially valid file.
pub fn import_keyboards(path: impl AsRef<Path>) -> Result<Vec<Keyboard>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut keyboards = Vec::new();
    for row in rdr.deserialize::<KeyboardRow>() {
        keyboards.push(Keyboard::from(row?));
    }
    Ok(keyboards)
}
