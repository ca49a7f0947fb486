//! A1-notation helpers for spreadsheet ranges.
//!
//! Column letters are the user-facing convention (mappings are stored as
//! `field -> "K"`); everything internal works on 0-based column indices and
//! only converts at the boundary.

use thiserror::Error;

/// Error type for A1 column-letter parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum A1Error {
    #[error("Empty column reference")]
    Empty,
    #[error("Invalid character {0:?} in column reference")]
    InvalidCharacter(char),
}

/// Converts a column letter sequence to a 0-based index.
///
/// `A=0 .. Z=25, AA=26, AB=27, ...`: base-26 with a 1-indexed digit
/// alphabet, shifted to 0-indexed output.
pub fn column_index(letters: &str) -> Result<usize, A1Error> {
    if letters.is_empty() {
        return Err(A1Error::Empty);
    }

    let mut index: usize = 0;
    for ch in letters.chars() {
        let upper = ch.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(A1Error::InvalidCharacter(ch));
        }
        index = index * 26 + (upper as usize - 'A' as usize + 1);
    }

    Ok(index - 1)
}

/// Converts a 0-based column index back to its letter sequence.
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Builds a cell reference from a 0-based column index and a 1-based row.
pub fn cell(column: usize, row: u32) -> String {
    format!("{}{}", column_letters(column), row)
}
