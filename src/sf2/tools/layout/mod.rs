//! Placement of header fields, school days and students onto the fixed
//! report grid.

pub mod formula;
pub mod schema;

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use tracing::debug;

use crate::sf2::tools::calendar::parse_iso_date;
use crate::sf2::tools::error::Result;
use crate::sf2::tools::model::{AttendanceStatus, IsoDate, SchoolInfo, StudentRecord};

pub use schema::{GenderBlock, GridCoordinate, HeaderCells, LayoutSchema};

/// Content assigned to a single cell of the report.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Formula source including the leading `=`.
    Formula(String),
    /// Clears whatever the template holds in the cell.
    Blank,
}

/// Cell assignments for one report part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilledDocument {
    cells: BTreeMap<GridCoordinate, CellValue>,
    date_columns: BTreeMap<IsoDate, u16>,
    total_days: u32,
}

impl FilledDocument {
    /// Value assigned to a cell, if any.
    pub fn get(&self, row: u32, column: u16) -> Option<&CellValue> {
        self.cells.get(&GridCoordinate::new(row, column))
    }

    /// Value assigned to the cell at an A1 reference, if any.
    pub fn get_a1(&self, reference: &str) -> Option<&CellValue> {
        let coordinate = GridCoordinate::parse_a1(reference).ok()?;
        self.cells.get(&coordinate)
    }

    /// All assignments ordered by row, then column.
    pub fn cells(&self) -> impl Iterator<Item = (&GridCoordinate, &CellValue)> {
        self.cells.iter()
    }

    /// Column each mapped school day was placed in.
    pub fn date_columns(&self) -> &BTreeMap<IsoDate, u16> {
        &self.date_columns
    }

    /// Number of school days shown with a day header.
    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn set(&mut self, row: u32, column: u16, value: CellValue) {
        self.cells.insert(GridCoordinate::new(row, column), value);
    }

    fn set_at(&mut self, coordinate: GridCoordinate, value: CellValue) {
        self.cells.insert(coordinate, value);
    }
}

/// Lays out one report part.
///
/// Each roster must already be sorted and within the block capacity of the
/// schema; rows past the end of a block are not written. Any malformed date
/// in `dates`, `holidays` or the attendance records aborts the mapping.
pub fn map(
    info: &SchoolInfo,
    dates: &[IsoDate],
    holidays: &BTreeSet<IsoDate>,
    male: &[StudentRecord],
    female: &[StudentRecord],
    schema: &LayoutSchema,
) -> Result<FilledDocument> {
    schema.validate()?;
    validate_dates(dates, holidays, male.iter().chain(female))?;

    let mut document = FilledDocument::default();
    write_header(&mut document, info, schema);

    let mut columns = schema.first_date_column..=schema.last_date_column;
    for date in dates {
        if document.date_columns.contains_key(date) {
            continue;
        }
        let Some(column) = columns.next() else {
            debug!(%date, "no date column left, dropping school day");
            continue;
        };
        document.date_columns.insert(date.clone(), column);

        if holidays.contains(date) {
            document.set(schema.date_header_row, column, CellValue::Blank);
        } else {
            let day = parse_iso_date(date)?.day();
            document.set(schema.date_header_row, column, CellValue::Number(f64::from(day)));
            document.total_days += 1;
        }

        document.set(
            schema.male.total_row,
            column,
            CellValue::Formula(formula::daily_block_total(schema, &schema.male, column)),
        );
        document.set(
            schema.female.total_row,
            column,
            CellValue::Formula(formula::daily_block_total(schema, &schema.female, column)),
        );
        document.set(
            schema.combined_total_row,
            column,
            CellValue::Formula(formula::daily_combined_total(schema, column)),
        );
    }

    document.set_at(
        schema.header.total_days,
        CellValue::Number(f64::from(document.total_days)),
    );

    fill_block(&mut document, male, &schema.male, holidays, schema);
    fill_block(&mut document, female, &schema.female, holidays, schema);

    debug!(
        cells = document.len(),
        total_days = document.total_days,
        male = male.len(),
        female = female.len(),
        "report part laid out"
    );
    Ok(document)
}

fn write_header(document: &mut FilledDocument, info: &SchoolInfo, schema: &LayoutSchema) {
    let header = &schema.header;
    let fields = [
        (header.school_name, &info.school_name),
        (header.school_id, &info.school_id),
        (header.school_year, &info.school_year),
        (header.month, &info.month),
        (header.grade, &info.grade),
        (header.section, &info.section),
    ];
    for (coordinate, value) in fields {
        document.set_at(coordinate, CellValue::Text(value.clone()));
    }
}

fn fill_block(
    document: &mut FilledDocument,
    students: &[StudentRecord],
    block: &GenderBlock,
    holidays: &BTreeSet<IsoDate>,
    schema: &LayoutSchema,
) {
    let date_columns = document.date_columns.clone();

    for (row, student) in (block.first_row..=block.last_row).zip(students) {
        document.set(row, schema.name_column, CellValue::Text(student.name.clone()));

        for (date, column) in &date_columns {
            let absent = !holidays.contains(date)
                && student.status_on(date) == AttendanceStatus::Absent;
            let mark = if absent {
                CellValue::Text(schema.absent_marker.clone())
            } else {
                CellValue::Blank
            };
            document.set(row, *column, mark);
        }

        document.set(
            row,
            schema.absent_column,
            CellValue::Formula(formula::row_absences(schema, row)),
        );
        document.set(
            row,
            schema.present_column,
            CellValue::Formula(formula::row_presences(schema, row)),
        );
    }
}

fn validate_dates<'a>(
    dates: &[IsoDate],
    holidays: &BTreeSet<IsoDate>,
    students: impl Iterator<Item = &'a StudentRecord>,
) -> Result<()> {
    for date in dates.iter().chain(holidays) {
        parse_iso_date(date)?;
    }
    for student in students {
        for date in student.attendance.keys() {
            parse_iso_date(date)?;
        }
    }
    Ok(())
}
