use std::collections::{BTreeMap, BTreeSet};

/// Calendar date in `YYYY-MM-DD` form. Attendance and holiday data keep the
/// textual representation so that malformed entries can be reported
/// verbatim when a report is laid out.
pub type IsoDate = String;

/// Gender block a student is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parses the `M`/`F`/`Male`/`Female` spellings, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Gender::Male),
            "F" | "FEMALE" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Attendance mark recorded for a single school day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Parses `PRESENT`/`ABSENT`, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => Some(AttendanceStatus::Present),
            "ABSENT" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

/// A student and the attendance marks recorded for them.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub name: String,
    pub gender: Gender,
    /// Date → status mapping. Days without an entry count as present.
    pub attendance: BTreeMap<IsoDate, AttendanceStatus>,
}

impl StudentRecord {
    /// Creates a student without any recorded attendance.
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
            attendance: BTreeMap::new(),
        }
    }

    /// Records a status for the given date, replacing any previous mark.
    pub fn with_status(mut self, date: impl Into<IsoDate>, status: AttendanceStatus) -> Self {
        self.attendance.insert(date.into(), status);
        self
    }

    /// Status on the given date, defaulting to present.
    pub fn status_on(&self, date: &str) -> AttendanceStatus {
        self.attendance.get(date).copied().unwrap_or_default()
    }
}

/// Students split into the two gender blocks of the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub male: Vec<StudentRecord>,
    pub female: Vec<StudentRecord>,
}

impl Roster {
    /// Splits students by gender and orders each block alphabetically.
    pub fn from_students(students: impl IntoIterator<Item = StudentRecord>) -> Self {
        let mut roster = Roster::default();
        for student in students {
            match student.gender {
                Gender::Male => roster.male.push(student),
                Gender::Female => roster.female.push(student),
            }
        }
        roster.sort();
        roster
    }

    /// Sorts both blocks by name, ignoring case. Equal names keep their
    /// input order.
    pub fn sort(&mut self) {
        sort_by_name(&mut self.male);
        sort_by_name(&mut self.female);
    }
}

fn sort_by_name(students: &mut [StudentRecord]) {
    students.sort_by(|lhs, rhs| lhs.name.to_lowercase().cmp(&rhs.name.to_lowercase()));
}

/// Header fields printed at the top of every report part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolInfo {
    pub school_name: String,
    pub school_id: String,
    pub school_year: String,
    pub month: String,
    pub grade: String,
    pub section: String,
}

/// Everything an input adapter extracts from a source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSource {
    pub info: SchoolInfo,
    pub students: Vec<StudentRecord>,
    pub holidays: BTreeSet<IsoDate>,
    /// Explicit school days carried by the input. When absent the days are
    /// resolved from the school year and month.
    pub dates: Option<Vec<IsoDate>>,
}
