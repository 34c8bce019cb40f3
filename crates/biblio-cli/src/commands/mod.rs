//! Command handlers. Each module turns parsed arguments into calls on the
//! [`Library`](biblio_core::application::Library) and writes the result
//! through the [`OutputManager`](crate::output::OutputManager).

use std::fmt::Display;
use std::path::Path;

use biblio_core::error::{ErrorCategory, LibraryError, LibraryResult};

use crate::{config::write_file, error::CliResult, output::OutputManager};

pub mod author;
pub mod book;
pub mod category;
pub mod completions;
pub mod config;
pub mod export;
pub mod import;
pub mod init;
pub mod inventory;
pub mod loan;
pub mod member;
pub mod report;
pub mod serve;

/// Write `text` to `path`, or to stdout when no path is given.
pub(crate) fn emit(output: &OutputManager, path: Option<&Path>, text: &str) -> CliResult<()> {
    match path {
        Some(path) => {
            write_file(path, text)?;
            output.success(&format!("Written to {}", path.display()))?;
        }
        None => output.data(text)?,
    }
    Ok(())
}

/// `-` for missing values.
pub(crate) fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub(crate) fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// `Ok(None)` instead of a not-found error.
pub(crate) fn optional<T>(result: LibraryResult<T>) -> LibraryResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if is_not_found(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

fn is_not_found(err: &LibraryError) -> bool {
    err.category() == ErrorCategory::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_dash_fills_missing_values() {
        assert_eq!(or_dash(None::<&str>), "-");
        assert_eq!(or_dash(Some(12)), "12");
    }

    #[test]
    fn yes_no_words() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}
