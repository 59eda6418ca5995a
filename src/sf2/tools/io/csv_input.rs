//! Reader for the attendance CSV export.
//!
//! The export starts with three metadata rows:
//!
//! ```text
//! School Name:,Sample High,School ID:,301234
//! School Year:,2025-2026,Month:,2026-02
//! Grade & Section:,Grade 10 - Agimat
//! ```
//!
//! followed by a header row starting with `Student ID` whose `YYYY-MM-DD`
//! columns hold `P`/`A` marks for each student.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::sf2::tools::calendar::{month_name, parse_iso_date};
use crate::sf2::tools::error::{Result, ToolError};
use crate::sf2::tools::model::{
    AttendanceStatus, Gender, IsoDate, ReportSource, SchoolInfo, StudentRecord,
};

const HEADER_MARKER: &str = "Student ID";

/// Reads an attendance CSV export from disk.
pub fn read_source(path: &Path) -> Result<ReportSource> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    parse_source(file)
}

/// Parses an attendance CSV export.
pub fn parse_source<R: Read>(reader: R) -> Result<ReportSource> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }

    let info = parse_metadata(&rows);

    let header_idx = rows
        .iter()
        .position(|row| row.first().map(String::as_str) == Some(HEADER_MARKER))
        .ok_or_else(|| {
            ToolError::SchemaValidation(format!("no header row starting with '{HEADER_MARKER}'"))
        })?;
    let header = &rows[header_idx];

    let date_columns: Vec<(usize, IsoDate)> = header
        .iter()
        .enumerate()
        .filter(|(_, cell)| parse_iso_date(cell).is_ok())
        .map(|(idx, cell)| (idx, cell.clone()))
        .collect();
    if date_columns.is_empty() {
        return Err(ToolError::SchemaValidation(
            "no date columns (YYYY-MM-DD) found in header".to_string(),
        ));
    }

    let last_idx = column_index(header, "Last Name").unwrap_or(1);
    let first_idx = column_index(header, "First Name").unwrap_or(2);
    let gender_idx = column_index(header, "Gender").unwrap_or(3);

    let mut students = Vec::new();
    for (offset, row) in rows.iter().enumerate().skip(header_idx + 1) {
        if row.len() < 2 {
            continue;
        }
        let name = format!("{}, {}", cell(row, last_idx), cell(row, first_idx));
        let Some(gender) = Gender::parse(cell(row, gender_idx)) else {
            warn!(
                line = offset + 1,
                name = %name,
                gender = cell(row, gender_idx),
                "skipping student with unrecognized gender"
            );
            continue;
        };

        let mut student = StudentRecord::new(name, gender);
        for (idx, date) in &date_columns {
            let status = match cell(row, *idx).to_ascii_uppercase().as_str() {
                "P" => AttendanceStatus::Present,
                "A" => AttendanceStatus::Absent,
                _ => continue,
            };
            student.attendance.insert(date.clone(), status);
        }
        students.push(student);
    }

    debug!(
        students = students.len(),
        dates = date_columns.len(),
        "parsed attendance CSV"
    );
    Ok(ReportSource {
        info,
        students,
        holidays: Default::default(),
        dates: Some(date_columns.into_iter().map(|(_, date)| date).collect()),
    })
}

fn parse_metadata(rows: &[Vec<String>]) -> SchoolInfo {
    let empty = Vec::new();
    let row = |idx: usize| rows.get(idx).unwrap_or(&empty);

    let school_name =
        labelled_value(row(0), "School Name:").unwrap_or_else(|| "Unknown".to_string());
    let school_id = labelled_value(row(0), "School ID:").unwrap_or_default();
    let school_year = labelled_value(row(1), "School Year:").unwrap_or_default();
    let month = labelled_value(row(1), "Month:")
        .map(|month| year_month_name(&month).unwrap_or(month))
        .unwrap_or_default();
    let (grade, section) = labelled_value(row(2), "Grade & Section:")
        .map(|value| split_grade_section(&value))
        .unwrap_or_default();

    SchoolInfo {
        school_name,
        school_id,
        school_year,
        month,
        grade,
        section,
    }
}

/// Value in the cell following `label`.
fn labelled_value(row: &[String], label: &str) -> Option<String> {
    let idx = row.iter().position(|cell| cell == label)?;
    Some(row.get(idx + 1).cloned().unwrap_or_default())
}

/// `2026-02` → `February`.
fn year_month_name(value: &str) -> Option<String> {
    let (year, month) = value.split_once('-')?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    month_name(month.parse().ok()?)
}

/// `Grade 10 - Agimat` → (`10`, `Agimat`).
fn split_grade_section(value: &str) -> (String, String) {
    match value.split_once('-') {
        Some((grade, section)) => (
            grade.replace("Grade", "").trim().to_string(),
            section.trim().to_string(),
        ),
        None => (value.to_string(), String::new()),
    }
}

fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|cell| cell == name)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}
