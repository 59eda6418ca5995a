use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::sf2::tools::error::{Result, ToolError};
use crate::sf2::tools::model::{
    AttendanceStatus, Gender, ReportSource, SchoolInfo, StudentRecord,
};

/// Root keys every attendance document must carry.
pub const REQUIRED_KEYS: [&str; 2] = ["school_info", "students"];

/// Name given to students whose entry lacks one.
const UNNAMED_STUDENT: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct RawDocument {
    school_info: RawSchoolInfo,
    students: Vec<RawStudent>,
    #[serde(default)]
    holidays: Vec<String>,
}

/// Header block. The long keys win; `name`, `id` and `year` are only used
/// when their long counterpart is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSchoolInfo {
    #[serde(deserialize_with = "scalar_text")]
    school_name: Option<String>,
    #[serde(rename = "name", deserialize_with = "scalar_text")]
    short_name: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    school_id: Option<String>,
    #[serde(rename = "id", deserialize_with = "scalar_text")]
    short_id: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    school_year: Option<String>,
    #[serde(rename = "year", deserialize_with = "scalar_text")]
    short_year: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    month: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    grade: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    section: Option<String>,
}

impl RawSchoolInfo {
    fn into_info(self) -> SchoolInfo {
        SchoolInfo {
            school_name: self.school_name.or(self.short_name).unwrap_or_default(),
            school_id: self.school_id.or(self.short_id).unwrap_or_default(),
            school_year: self.school_year.or(self.short_year).unwrap_or_default(),
            month: self.month.unwrap_or_default(),
            grade: self.grade.unwrap_or_default(),
            section: self.section.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStudent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    attendance: BTreeMap<String, String>,
}

/// Reads an attendance JSON document from disk.
pub fn read_source(path: &Path) -> Result<ReportSource> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&source)?;
    parse_document(&json)
}

/// Converts a parsed attendance document into a [`ReportSource`].
pub fn parse_document(json: &Value) -> Result<ReportSource> {
    let object = json
        .as_object()
        .ok_or_else(|| ToolError::SchemaValidation("document root must be an object".into()))?;
    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(ToolError::SchemaValidation(format!(
                "missing required key '{key}'"
            )));
        }
    }

    let raw: RawDocument = serde_json::from_value(json.clone())
        .map_err(|error| ToolError::SchemaValidation(error.to_string()))?;

    let students = raw
        .students
        .into_iter()
        .map(student_record)
        .collect::<Result<Vec<_>>>()?;

    Ok(ReportSource {
        info: raw.school_info.into_info(),
        students,
        holidays: raw.holidays.into_iter().collect(),
        dates: None,
    })
}

fn student_record(raw: RawStudent) -> Result<StudentRecord> {
    let name = raw.name.unwrap_or_else(|| UNNAMED_STUDENT.to_string());
    let gender = match raw.gender.as_deref() {
        None => Gender::Male,
        Some(value) => Gender::parse(value).ok_or_else(|| {
            ToolError::SchemaValidation(format!(
                "unrecognized gender '{value}' for student '{name}'"
            ))
        })?,
    };

    let mut student = StudentRecord::new(name, gender);
    for (date, status) in raw.attendance {
        let status = AttendanceStatus::parse(&status).ok_or_else(|| {
            ToolError::SchemaValidation(format!(
                "unrecognized status '{status}' on {date} for student '{}'",
                student.name
            ))
        })?;
        student.attendance.insert(date, status);
    }
    Ok(student)
}

/// Accepts strings, numbers and booleans, rendering them as text. `null`
/// counts as missing.
fn scalar_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        Value::Number(value) => Ok(Some(value.to_string())),
        Value::Bool(value) => Ok(Some(value.to_string())),
        other => Err(D::Error::custom(format!("expected a scalar value, found {other}"))),
    }
}
