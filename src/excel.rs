//! Vocabulary sheet parsing (Excel/ODS workbooks and CSV)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;

use crate::catalog::{Catalog, WordEntry};
use crate::config::{ColumnNames, QuizConfig};
use crate::error::{QuizError, QuizResult};
use crate::fuzzy::closest_header;

/// Load the catalog from the configured vocabulary file, picking the parser by extension
pub fn load_catalog(config: &QuizConfig) -> QuizResult<Catalog> {
    let path = Path::new(&config.words_path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let entries = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => parse_workbook(path, config)?,
        "csv" => parse_csv(path, config)?,
        _ => return Err(QuizError::UnsupportedFormat(extension)),
    };

    let catalog = Catalog::new(entries)?;
    tracing::info!(path = %path.display(), words = catalog.len(), "vocabulary catalog loaded");
    Ok(catalog)
}

/// Column index mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub number: usize,
    pub word: usize,
    pub meaning: usize,
}

/// Locate the required columns by exact header name
pub fn detect_columns(headers: &[String], names: &ColumnNames) -> QuizResult<ColumnMapping> {
    let find = |name: &str| -> QuizResult<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| QuizError::MissingColumn {
                column: name.to_string(),
                suggestion: closest_header(name, headers).map(str::to_string),
            })
    };

    Ok(ColumnMapping {
        number: find(&names.number)?,
        word: find(&names.word)?,
        meaning: find(&names.meaning)?,
    })
}

/// Parse the first sheet of a workbook; the first row is the header
pub fn parse_workbook(path: &Path, config: &QuizConfig) -> QuizResult<Vec<WordEntry>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(QuizError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(QuizError::EmptyWorkbook)?;
    let headers: Vec<String> = header_row.iter().map(get_cell_string).collect();
    let mapping = detect_columns(&headers, &config.columns)?;

    let mut words = Vec::new();
    for row in rows {
        let cell = |i: usize| row.get(i).map(get_cell_string).unwrap_or_default();
        let serial = row.get(mapping.number).and_then(get_cell_number);
        push_row(&mut words, config, serial, cell(mapping.word), cell(mapping.meaning));
    }
    Ok(words)
}

/// Parse a CSV file with a header row
pub fn parse_csv(path: &Path, config: &QuizConfig) -> QuizResult<Vec<WordEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mapping = detect_columns(&headers, &config.columns)?;

    let mut words = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let serial = record.get(mapping.number).and_then(|s| s.trim().parse::<f64>().ok());
        push_row(&mut words, config, serial, cell(mapping.word), cell(mapping.meaning));
    }
    Ok(words)
}

fn push_row(
    words: &mut Vec<WordEntry>,
    config: &QuizConfig,
    serial: Option<f64>,
    word: String,
    meaning: String,
) {
    // Blank or non-numeric serials never fall in range
    let Some(serial) = serial.filter(|s| config.serial_in_range(*s)) else {
        return;
    };
    if word.is_empty() {
        tracing::warn!(serial, "skipping row without a word");
        return;
    }
    words.push(WordEntry { word, meaning });
}

/// Helper to extract string from Excel cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

fn get_cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &Path, name: &str, body: &str) -> QuizConfig {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        QuizConfig {
            words_path: path.to_string_lossy().to_string(),
            ..QuizConfig::in_dir(dir)
        }
    }

    fn rows(range: std::ops::RangeInclusive<i64>) -> String {
        let mut body = String::from("番号,英単語,意味\n");
        for i in range {
            body.push_str(&format!("{i},word{i},meaning{i}\n"));
        }
        body
    }

    #[test]
    fn loads_csv_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), "words.csv", &rows(1..=12));
        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.entries()[0], WordEntry::new("word1", "meaning1"));
        assert_eq!(catalog.entries()[11].word, "word12");
    }

    #[test]
    fn drops_rows_outside_serial_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = rows(0..=12);
        body.push_str("501,late,too late\nabc,bad,not a number\n,blank,no serial\n500,last,kept\n");
        let config = write_csv(dir.path(), "words.csv", &body);

        let catalog = load_catalog(&config).unwrap();
        let words: Vec<&str> = catalog.words().collect();
        assert!(!words.contains(&"word0"));
        assert!(!words.contains(&"late"));
        assert!(!words.contains(&"bad"));
        assert!(!words.contains(&"blank"));
        assert_eq!(words.last(), Some(&"last"));
        assert_eq!(catalog.len(), 13);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), "words.csv", "番号,英単語\n1,a\n");
        match load_catalog(&config).unwrap_err() {
            QuizError::MissingColumn { column, .. } => assert_eq!(column, "意味"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_typo_gets_a_suggestion() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), "words.csv", "番号,英単語 ,意味\n1,a,b\n");
        match load_catalog(&config).unwrap_err() {
            QuizError::MissingColumn { column, suggestion } => {
                assert_eq!(column, "英単語");
                assert_eq!(suggestion.as_deref(), Some("英単語 "));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn too_few_words_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), "words.csv", &rows(1..=9));
        assert!(matches!(
            load_catalog(&config).unwrap_err(),
            QuizError::InsufficientWords { found: 9, .. }
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_csv(dir.path(), "words.txt", &rows(1..=12));
        assert!(matches!(
            load_catalog(&config).unwrap_err(),
            QuizError::UnsupportedFormat(ext) if ext == "txt"
        ));
    }

    #[test]
    fn missing_workbook_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuizConfig::in_dir(dir.path());
        assert!(load_catalog(&config).is_err());
    }

    #[test]
    fn detect_columns_ignores_extra_headers() {
        let headers: Vec<String> = ["memo", "意味", "番号", "英単語"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = detect_columns(&headers, &ColumnNames::default()).unwrap();
        assert_eq!(mapping, ColumnMapping { number: 2, word: 3, meaning: 1 });
    }
}
