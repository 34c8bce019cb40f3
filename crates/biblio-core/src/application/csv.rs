//! Delimited-text model shared by the import and export pipelines.
//!
//! Byte decoding happens here; splitting text into fields is delegated to a
//! [`TableCodec`](super::ports::TableCodec) adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

const UTF8_BOM: &str = "\u{feff}";

/// Field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Tab => b'\t',
            Self::Pipe => b'|',
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Tab => "tab",
            Self::Pipe => "|",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Delimiter {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "," | "comma" => Ok(Self::Comma),
            ";" | "semicolon" => Ok(Self::Semicolon),
            "\t" | "\\t" | "tab" => Ok(Self::Tab),
            "|" | "pipe" => Ok(Self::Pipe),
            other => Err(ApplicationError::ValidationFailed(format!(
                "unsupported delimiter '{}' (use , ; tab or |)",
                other
            ))),
        }
    }
}

impl From<Delimiter> for String {
    fn from(value: Delimiter) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for Delimiter {
    type Error = ApplicationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    pub delimiter: Delimiter,
    pub has_header: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            has_header: true,
        }
    }
}

/// One data row with its 1-based line number in the file.
///
/// `cells` holds the reader's message when the row itself could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line: usize,
    pub cells: Result<Vec<String>, String>,
}

/// A parsed file: optional header plus data rows. Blank lines are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Option<Vec<String>>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of each expected column.
    ///
    /// With a header, columns are matched by name (case-insensitive);
    /// without one, `keys` gives the positional order.
    pub fn columns(&self, keys: &[&'static str]) -> Columns {
        let positions = match &self.header {
            Some(header) => keys
                .iter()
                .map(|key| {
                    header
                        .iter()
                        .position(|h| h.trim().eq_ignore_ascii_case(key))
                })
                .collect(),
            None => (0..keys.len()).map(Some).collect(),
        };
        Columns {
            keys: keys.to_vec(),
            positions,
        }
    }
}

/// Resolved column positions for a known set of keys.
#[derive(Debug, Clone)]
pub struct Columns {
    keys: Vec<&'static str>,
    positions: Vec<Option<usize>>,
}

impl Columns {
    /// Trimmed cell for `key`; empty when the column or cell is missing.
    pub fn get<'a>(&self, cells: &'a [String], key: &str) -> &'a str {
        self.keys
            .iter()
            .position(|k| *k == key)
            .and_then(|i| self.positions[i])
            .and_then(|p| cells.get(p))
            .map_or("", |cell| cell.trim())
    }
}

/// Decode file bytes to text.
///
/// A leading UTF-8 byte order mark is removed. Input that is not valid UTF-8
/// is read as Latin-1, which maps every byte to a character.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    };
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Prefix text with a UTF-8 byte order mark.
pub fn with_bom(mut body: Vec<u8>) -> Vec<u8> {
    let mut out = UTF8_BOM.as_bytes().to_vec();
    out.append(&mut body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped() {
        assert_eq!(decode_text("\u{feff}name,isbn".as_bytes()), "name,isbn");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // "Año" in Latin-1
        assert_eq!(decode_text(&[0x41, 0xF1, 0x6F]), "Año");
    }

    #[test]
    fn delimiter_parses_names_and_symbols() {
        assert_eq!("tab".parse::<Delimiter>().unwrap(), Delimiter::Tab);
        assert_eq!(";".parse::<Delimiter>().unwrap(), Delimiter::Semicolon);
        assert_eq!("|".parse::<Delimiter>().unwrap().as_byte(), b'|');
        assert!(":".parse::<Delimiter>().is_err());
    }

    #[test]
    fn columns_match_header_names_in_any_order() {
        let table = Table {
            header: Some(vec!["ISBN".into(), " name ".into()]),
            rows: vec![],
        };
        let cols = table.columns(&["name", "isbn", "autor"]);
        let cells = vec!["123".to_string(), " Rayuela ".to_string()];
        assert_eq!(cols.get(&cells, "name"), "Rayuela");
        assert_eq!(cols.get(&cells, "isbn"), "123");
        assert_eq!(cols.get(&cells, "autor"), "");
    }

    #[test]
    fn columns_are_positional_without_header() {
        let table = Table::default();
        let cols = table.columns(&["name", "isbn"]);
        let cells = vec!["Rayuela".to_string()];
        assert_eq!(cols.get(&cells, "name"), "Rayuela");
        assert_eq!(cols.get(&cells, "isbn"), "");
    }

    #[test]
    fn bom_prefix_round_trips() {
        let bytes = with_bom(b"a;b".to_vec());
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(decode_text(&bytes), "a;b");
    }
}
