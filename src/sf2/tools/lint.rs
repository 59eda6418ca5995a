use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::sf2::tools::calendar::parse_iso_date;
use crate::sf2::tools::io::json_input::REQUIRED_KEYS;
use crate::sf2::tools::model::{AttendanceStatus, Gender};

/// Findings of a lint pass over an attendance JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub male: usize,
    pub female: usize,
}

impl LintReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for LintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "[-] ERROR: {error}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "[!] WARNING: {warning}")?;
        }
        if self.is_valid() {
            writeln!(
                f,
                "[+] no blocking errors ({} M / {} F)",
                self.male, self.female
            )?;
        }
        Ok(())
    }
}

/// Checks syntax, root keys, student entries and roster size without
/// generating a report.
pub fn lint_json(path: &Path, capacity: usize) -> LintReport {
    let mut report = LintReport::default();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            report
                .errors
                .push(format!("failed to read {}: {error}", path.display()));
            return report;
        }
    };
    let json: Value = match serde_json::from_str(&source) {
        Ok(json) => json,
        Err(error) => {
            report.errors.push(format!("invalid JSON syntax: {error}"));
            return report;
        }
    };
    lint_value(&json, capacity, &mut report);
    report
}

fn lint_value(json: &Value, capacity: usize, report: &mut LintReport) {
    for key in REQUIRED_KEYS {
        if json.get(key).is_none() {
            report
                .errors
                .push(format!("missing required root key '{key}'"));
        }
    }
    if !report.errors.is_empty() {
        return;
    }

    let Some(students) = json["students"].as_array() else {
        report
            .errors
            .push("'students' must be an array".to_string());
        return;
    };

    for (idx, student) in students.iter().enumerate() {
        let Some(student) = student.as_object() else {
            report
                .errors
                .push(format!("student at index {idx} is not an object"));
            continue;
        };
        let name = student.get("name").and_then(Value::as_str);
        if name.is_none() {
            report
                .errors
                .push(format!("student at index {idx} is missing a 'name'"));
        }

        let gender = student.get("gender").and_then(Value::as_str).unwrap_or("M");
        match Gender::parse(gender) {
            Some(Gender::Male) => report.male += 1,
            Some(Gender::Female) => report.female += 1,
            None => report.errors.push(format!(
                "unrecognized gender '{gender}' for student '{}'",
                name.unwrap_or("Unknown")
            )),
        }

        if let Some(attendance) = student.get("attendance").and_then(Value::as_object) {
            for (date, status) in attendance {
                if parse_iso_date(date).is_err() {
                    report.errors.push(format!(
                        "invalid attendance date '{date}' for student '{}'",
                        name.unwrap_or("Unknown")
                    ));
                }
                if status.as_str().and_then(AttendanceStatus::parse).is_none() {
                    report.errors.push(format!(
                        "unrecognized status {status} on {date} for student '{}'",
                        name.unwrap_or("Unknown")
                    ));
                }
            }
        }
    }

    if let Some(holidays) = json.get("holidays").and_then(Value::as_array) {
        for holiday in holidays {
            if holiday.as_str().map(parse_iso_date).is_none_or(|parsed| parsed.is_err()) {
                report.errors.push(format!("invalid holiday date {holiday}"));
            }
        }
    }

    if report.male > capacity || report.female > capacity {
        report.warnings.push(format!(
            "student limit exceeded ({} M / {} F); the template holds {capacity} per gender, \
             use --overflow split to write multiple parts",
            report.male, report.female
        ));
    }
}
