//! Spreadsheet formulas recomputed by whoever opens the report.

use super::schema::{GenderBlock, GridCoordinate, LayoutSchema, column_letters};

/// Students present in one block on one day: non-blank names minus
/// absences, with half-day marks counting 0.5. Blank while the day header
/// is blank (holiday or unused column).
pub fn daily_block_total(schema: &LayoutSchema, block: &GenderBlock, column: u16) -> String {
    let col = column_letters(column);
    let name_col = column_letters(schema.name_column);
    let marks = format!("{col}{}:{col}{}", block.first_row, block.last_row);
    format!(
        "=IF({col}{header}=\"\",\"\",COUNTA(${name_col}${first}:${name_col}${last})-({absences}))",
        header = schema.date_header_row,
        first = block.first_row,
        last = block.last_row,
        absences = absence_count(schema, &marks),
    )
}

/// Male plus female daily totals for one day.
pub fn daily_combined_total(schema: &LayoutSchema, column: u16) -> String {
    let col = column_letters(column);
    format!(
        "=IF({col}{header}=\"\",\"\",{col}{male}+{col}{female})",
        header = schema.date_header_row,
        male = schema.male.total_row,
        female = schema.female.total_row,
    )
}

/// Absences of the student on `row` across the whole date range.
pub fn row_absences(schema: &LayoutSchema, row: u32) -> String {
    let marks = format!(
        "{}{row}:{}{row}",
        column_letters(schema.first_date_column),
        column_letters(schema.last_date_column)
    );
    format!(
        "=IF({name}{row}=\"\",\"\",{absences})",
        name = column_letters(schema.name_column),
        absences = absence_count(schema, &marks),
    )
}

/// Reportable days minus the absences of the student on `row`.
pub fn row_presences(schema: &LayoutSchema, row: u32) -> String {
    let absences = GridCoordinate::new(row, schema.absent_column);
    format!(
        "=IF({name}{row}=\"\",\"\",{total}-{absences})",
        name = column_letters(schema.name_column),
        total = schema.header.total_days.to_absolute_a1(),
    )
}

fn absence_count(schema: &LayoutSchema, range: &str) -> String {
    format!(
        "COUNTIF({range},{absent}) + COUNTIF({range},{half})*0.5",
        absent = quoted(&schema.absent_marker),
        half = quoted(&schema.half_day_marker),
    )
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
