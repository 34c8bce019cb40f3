//! Delimited-text codec backed by the `csv` crate.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use biblio_core::{
    application::{
        ApplicationError, CsvFormat, Delimiter, Table, TableRow, ports::TableCodec,
    },
    error::LibraryResult,
};

/// RFC 4180 style reader and writer.
///
/// Rows may have any number of fields; missing trailing cells read as
/// empty. Records made only of blank fields are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl CsvCodec {
    pub fn new() -> Self {
        Self
    }
}

fn codec_error(err: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Codec {
        reason: err.to_string(),
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn line_of(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map_or(fallback, |pos| pos.line() as usize)
}

impl TableCodec for CsvCodec {
    fn parse(&self, text: &str, format: &CsvFormat) -> LibraryResult<Table> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(format.delimiter.as_byte())
            .from_reader(text.as_bytes());

        let mut table = Table::default();
        let mut expect_header = format.has_header;

        for (index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    if is_blank(&record) {
                        continue;
                    }
                    let cells: Vec<String> = record.iter().map(str::to_string).collect();
                    if expect_header {
                        expect_header = false;
                        table.header = Some(cells);
                        continue;
                    }
                    table.rows.push(TableRow {
                        line: line_of(&record, index + 1),
                        cells: Ok(cells),
                    });
                }
                Err(err) if expect_header => return Err(codec_error(err).into()),
                Err(err) => {
                    let line = err
                        .position()
                        .map_or(index + 1, |pos| pos.line() as usize);
                    table.rows.push(TableRow {
                        line,
                        cells: Err(err.to_string()),
                    });
                }
            }
        }

        debug!(
            rows = table.rows.len(),
            header = table.header.is_some(),
            delimiter = %format.delimiter,
            "Parsed delimited text"
        );
        Ok(table)
    }

    fn write(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        delimiter: Delimiter,
    ) -> LibraryResult<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter.as_byte())
            .flexible(false)
            .from_writer(Vec::new());

        writer.write_record(header).map_err(codec_error)?;
        for row in rows {
            writer.write_record(row).map_err(codec_error)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| codec_error(e.error()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(delimiter: Delimiter, has_header: bool) -> CsvFormat {
        CsvFormat {
            delimiter,
            has_header,
        }
    }

    #[test]
    fn rows_keep_their_file_line_numbers() {
        let text = "name,isbn\nRayuela,9788420412146\n\nFicciones,\n";
        let table = CsvCodec.parse(text, &format(Delimiter::Comma, true)).unwrap();

        assert_eq!(
            table.header,
            Some(vec!["name".to_string(), "isbn".to_string()])
        );
        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn quoted_fields_may_contain_delimiters_and_newlines() {
        let text = "name;notes\n\"Cien años; edición\";\"two\nlines\"\n";
        let table = CsvCodec
            .parse(text, &format(Delimiter::Semicolon, true))
            .unwrap();

        let cells = table.rows[0].cells.as_ref().unwrap();
        assert_eq!(cells[0], "Cien años; edición");
        assert_eq!(cells[1], "two\nlines");
    }

    #[test]
    fn without_header_every_record_is_data() {
        let text = "a|b\nc|d\n";
        let table = CsvCodec.parse(text, &format(Delimiter::Pipe, false)).unwrap();
        assert!(table.header.is_none());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].line, 2);
    }

    #[test]
    fn blank_records_are_skipped() {
        let text = "name,isbn\n , \nRayuela,\n";
        let table = CsvCodec.parse(text, &format(Delimiter::Comma, true)).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 3);
    }

    #[test]
    fn writer_quotes_fields_that_need_it() {
        let header = vec!["name".to_string(), "notes".to_string()];
        let rows = vec![vec!["A; B".to_string(), "plain".to_string()]];
        let bytes = CsvCodec.write(&header, &rows, Delimiter::Semicolon).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "name;notes\n\"A; B\";plain\n");
    }

    #[test]
    fn written_text_parses_back() {
        let header = vec!["name".to_string(), "autor".to_string()];
        let rows = vec![vec!["Rayuela".to_string(), "Cortázar, Julio".to_string()]];
        let bytes = CsvCodec.write(&header, &rows, Delimiter::Comma).unwrap();

        let text = String::from_utf8(bytes).unwrap();
        let table = CsvCodec.parse(&text, &format(Delimiter::Comma, true)).unwrap();
        assert_eq!(table.rows[0].cells, Ok(rows[0].clone()));
    }
}
