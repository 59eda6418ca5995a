use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sf2::tools::error::{Result, ToolError};

/// Largest column index accepted by spreadsheet applications (`XFD`).
const MAX_COLUMN: u16 = 16_384;
/// Largest row index accepted by spreadsheet applications.
const MAX_ROW: u32 = 1_048_576;

/// One-based `(row, column)` position in the report grid.
///
/// Serialized in A1 notation, so a layout file reads `"AQ9"` rather than
/// `{"row": 9, "column": 43}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridCoordinate {
    pub row: u32,
    pub column: u16,
}

impl GridCoordinate {
    pub fn new(row: u32, column: u16) -> Self {
        Self { row, column }
    }

    /// Parses an A1 reference such as `G6` or `$AQ$9`.
    pub fn parse_a1(reference: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidCoordinate(reference.to_string());
        let cleaned: String = reference.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cleaned.split_at(split);
        let column = column_from_letters(letters).ok_or_else(invalid)?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 || row > MAX_ROW {
            return Err(invalid());
        }
        Ok(Self { row, column })
    }

    /// Renders the coordinate in A1 notation.
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row)
    }

    /// Renders the coordinate as an absolute reference, e.g. `$AQ$9`.
    pub fn to_absolute_a1(&self) -> String {
        format!("${}${}", column_letters(self.column), self.row)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl TryFrom<String> for GridCoordinate {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self> {
        GridCoordinate::parse_a1(&value)
    }
}

impl From<GridCoordinate> for String {
    fn from(value: GridCoordinate) -> Self {
        value.to_a1()
    }
}

/// Converts a one-based column index into spreadsheet letters (1 → `A`).
pub fn column_letters(column: u16) -> String {
    let mut remaining = u32::from(column);
    let mut letters = Vec::new();
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(b'A' + rem as u8);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Converts spreadsheet letters into a one-based column index (`AE` → 31).
pub fn column_from_letters(letters: &str) -> Option<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut column: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        column = column * 26 + u32::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
    }
    u16::try_from(column)
        .ok()
        .filter(|column| *column <= MAX_COLUMN)
}

/// Cells holding the report header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderCells {
    pub school_id: GridCoordinate,
    pub school_name: GridCoordinate,
    pub school_year: GridCoordinate,
    pub month: GridCoordinate,
    pub grade: GridCoordinate,
    pub section: GridCoordinate,
    /// Count of reportable days; referenced by every presence formula.
    pub total_days: GridCoordinate,
}

/// Contiguous row range reserved for one gender, followed by its daily
/// total row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenderBlock {
    pub first_row: u32,
    pub last_row: u32,
    pub total_row: u32,
}

impl HeaderCells {
    fn labelled(&self) -> [(&'static str, GridCoordinate); 7] {
        [
            ("school id", self.school_id),
            ("school name", self.school_name),
            ("school year", self.school_year),
            ("month", self.month),
            ("grade", self.grade),
            ("section", self.section),
            ("total days", self.total_days),
        ]
    }
}

impl GenderBlock {
    /// Number of students the block can hold.
    pub fn capacity(&self) -> usize {
        (self.last_row + 1).saturating_sub(self.first_row) as usize
    }

    /// Whether `row` is one of the block's student rows.
    pub fn contains(&self, row: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
    }
}

/// Static description of the report template: where every header field,
/// student row, date column and aggregate formula lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSchema {
    pub header: HeaderCells,
    /// Row receiving the day-of-month number of each school day.
    pub date_header_row: u32,
    pub male: GenderBlock,
    pub female: GenderBlock,
    /// Row adding the male and female daily totals.
    pub combined_total_row: u32,
    #[serde(with = "column_serde")]
    pub name_column: u16,
    #[serde(with = "column_serde")]
    pub first_date_column: u16,
    #[serde(with = "column_serde")]
    pub last_date_column: u16,
    #[serde(with = "column_serde")]
    pub absent_column: u16,
    #[serde(with = "column_serde")]
    pub present_column: u16,
    pub absent_marker: String,
    /// Counted as half an absence by the formulas; never written by the
    /// mapper itself.
    pub half_day_marker: String,
}

impl Default for LayoutSchema {
    fn default() -> Self {
        let cell = |row, column| GridCoordinate::new(row, column);
        Self {
            header: HeaderCells {
                school_id: cell(6, 7),
                school_name: cell(7, 7),
                school_year: cell(6, 14),
                month: cell(6, 27),
                grade: cell(7, 27),
                section: cell(7, 32),
                total_days: cell(9, 43),
            },
            date_header_row: 10,
            male: GenderBlock {
                first_row: 13,
                last_row: 42,
                total_row: 43,
            },
            female: GenderBlock {
                first_row: 44,
                last_row: 73,
                total_row: 74,
            },
            combined_total_row: 75,
            name_column: 2,
            first_date_column: 7,
            last_date_column: 31,
            absent_column: 32,
            present_column: 33,
            absent_marker: "x".to_string(),
            half_day_marker: "h".to_string(),
        }
    }
}

impl LayoutSchema {
    /// Loads a layout from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let schema: LayoutSchema = serde_json::from_str(&source)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Students per gender a single report part can hold.
    pub fn capacity(&self) -> usize {
        self.male.capacity().min(self.female.capacity())
    }

    /// Number of date columns available in the grid.
    pub fn date_column_count(&self) -> usize {
        (self.last_date_column + 1).saturating_sub(self.first_date_column) as usize
    }

    /// Checks the ranges are well formed: every row and column is positive,
    /// the student blocks are disjoint, and no total row or fixed column
    /// falls inside the student rows or date columns.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(ToolError::InvalidWorkbook(message));

        for (label, cell) in self.header.labelled() {
            if cell.row == 0 || cell.column == 0 {
                return invalid(format!("{label} cell must have a positive row and column"));
            }
        }

        if self.first_date_column == 0 || self.first_date_column > self.last_date_column {
            return invalid(format!(
                "date columns {}..{} are empty",
                column_letters(self.first_date_column),
                column_letters(self.last_date_column)
            ));
        }
        for (label, block) in [("male", &self.male), ("female", &self.female)] {
            if block.first_row == 0 || block.first_row > block.last_row {
                return invalid(format!(
                    "{label} block rows {}..{} are empty",
                    block.first_row, block.last_row
                ));
            }
        }
        if self.male.first_row <= self.female.last_row && self.female.first_row <= self.male.last_row {
            return invalid(format!(
                "male rows {}..{} overlap female rows {}..{}",
                self.male.first_row, self.male.last_row, self.female.first_row, self.female.last_row
            ));
        }

        let rows = [
            ("date header", self.date_header_row),
            ("male total", self.male.total_row),
            ("female total", self.female.total_row),
            ("combined total", self.combined_total_row),
        ];
        for (index, (label, row)) in rows.iter().enumerate() {
            if *row == 0 {
                return invalid(format!("{label} row must be positive"));
            }
            if self.male.contains(*row) || self.female.contains(*row) {
                return invalid(format!("{label} row {row} lies inside a student block"));
            }
            if let Some((other, _)) = rows[..index].iter().find(|(_, earlier)| earlier == row) {
                return invalid(format!("{label} row {row} is also the {other} row"));
            }
        }

        let date_columns = self.first_date_column..=self.last_date_column;
        let columns = [
            ("name", self.name_column),
            ("absent", self.absent_column),
            ("present", self.present_column),
        ];
        for (index, (label, column)) in columns.iter().enumerate() {
            if *column == 0 {
                return invalid(format!("{label} column must be positive"));
            }
            if date_columns.contains(column) {
                return invalid(format!(
                    "{label} column {} lies inside the date columns",
                    column_letters(*column)
                ));
            }
            if let Some((other, _)) = columns[..index].iter().find(|(_, earlier)| earlier == column) {
                return invalid(format!(
                    "{label} column {} is also the {other} column",
                    column_letters(*column)
                ));
            }
        }

        if self.absent_marker.is_empty() {
            return invalid("absent marker must not be empty".to_string());
        }
        Ok(())
    }
}

mod column_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{column_from_letters, column_letters};

    pub fn serialize<S: Serializer>(column: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&column_letters(*column))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        let letters = String::deserialize(deserializer)?;
        column_from_letters(&letters)
            .ok_or_else(|| D::Error::custom(format!("invalid column letters '{letters}'")))
    }
}
