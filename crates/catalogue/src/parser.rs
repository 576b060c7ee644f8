//! Parser for the catalogue CSV file.
//!
//! Format: `id,Title,Director,Year,Description,Genre,Tags`
//!
//! Descriptions routinely contain commas, so fields may be wrapped in
//! double quotes; a doubled quote inside a quoted field is a literal quote
//! and quoted fields may span several lines. An optional header row whose
//! first field is `id` is skipped.

use crate::error::{CatalogueError, Result};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a file as UTF-8, falling back to ISO-8859-1 (Latin-1).
///
/// Hand-exported spreadsheets are often Latin-1. Every Latin-1 byte maps
/// directly to the Unicode code point of the same value.
fn read_text(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => Ok(err.into_bytes().iter().map(|&b| b as char).collect()),
    }
}

/// Parse a catalogue file from disk
pub fn parse_catalogue(path: &Path) -> Result<Vec<MovieRecord>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content = read_text(path)?;
    parse_catalogue_str(&content, &file_name)
}

/// Parse catalogue rows already held in memory.
///
/// `file_name` only appears in error messages.
pub fn parse_catalogue_str(content: &str, file_name: &str) -> Result<Vec<MovieRecord>> {
    let rows = split_rows(content, file_name)?;
    let mut movies = Vec::with_capacity(rows.len());

    for (idx, (line_no, fields)) in rows.into_iter().enumerate() {
        if idx == 0 && is_header(&fields) {
            continue;
        }
        movies.push(parse_record(fields, line_no, file_name)?);
    }

    Ok(movies)
}

fn is_header(fields: &[String]) -> bool {
    fields
        .first()
        .is_some_and(|f| f.trim().eq_ignore_ascii_case("id"))
}

fn parse_record(fields: Vec<String>, line_no: usize, file_name: &str) -> Result<MovieRecord> {
    if fields.len() != COLUMN_COUNT {
        return Err(CatalogueError::FieldCountMismatch {
            expected: COLUMN_COUNT,
            found: fields.len(),
            line: line_no,
        });
    }

    let mut fields = fields.into_iter();
    // Length checked above
    let mut next = || fields.next().unwrap_or_default();

    let id = next().trim().to_string();
    if id.is_empty() {
        return Err(CatalogueError::InvalidValue {
            field: "id".to_string(),
            value: format!("<empty> at line {}", line_no),
        });
    }
    let title = next();
    let director = next();
    let year_str = next();
    let year = year_str
        .trim()
        .parse::<i32>()
        .map_err(|e| CatalogueError::ParseError {
            file: file_name.to_string(),
            line: line_no,
            reason: format!("Invalid year '{}': {}", year_str, e),
        })?;

    Ok(MovieRecord {
        id,
        title,
        director,
        year,
        description: next(),
        genre: next(),
        tags: next(),
    })
}

/// Split CSV text into rows of fields.
///
/// Returns each row together with the line number it starts on. Blank
/// lines are skipped.
fn split_rows(content: &str, file_name: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line_no = 1;
    let mut row_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line_no += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                end_row(&mut rows, &mut fields, &mut field, row_start);
                line_no += 1;
                row_start = line_no;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CatalogueError::ParseError {
            file: file_name.to_string(),
            line: row_start,
            reason: "Unterminated quoted field".to_string(),
        });
    }
    end_row(&mut rows, &mut fields, &mut field, row_start);

    Ok(rows)
}

fn end_row(
    rows: &mut Vec<(usize, Vec<String>)>,
    fields: &mut Vec<String>,
    field: &mut String,
    row_start: usize,
) {
    if fields.is_empty() && field.trim().is_empty() {
        field.clear();
        return;
    }
    fields.push(std::mem::take(field));
    rows.push((row_start, std::mem::take(fields)));
}
