use std::fs;

use chrono::NaiveDate;
use sf2_tools::ToolError;
use sf2_tools::model::{Gender, StudentRecord};
use sf2_tools::partition::{
    DEFAULT_CAPACITY, avoid_collision, default_output_path, ensure_within_capacity, part_path,
    partition,
};
use tempfile::tempdir;

fn students(prefix: &str, count: usize, gender: Gender) -> Vec<StudentRecord> {
    (0..count)
        .map(|idx| StudentRecord::new(format!("{prefix} {idx:03}"), gender))
        .collect()
}

fn sizes(parts: &[&[StudentRecord]]) -> Vec<usize> {
    parts.iter().map(|part| part.len()).collect()
}

#[test]
fn force_split_yields_one_part_per_chunk() {
    let male = students("Male", 65, Gender::Male);
    let female = students("Female", 10, Gender::Female);

    let split = partition(&male, &female, DEFAULT_CAPACITY, true);

    let male_parts: Vec<&[StudentRecord]> = split.parts.iter().map(|part| part.male).collect();
    let female_parts: Vec<&[StudentRecord]> = split.parts.iter().map(|part| part.female).collect();
    assert_eq!(sizes(&male_parts), vec![30, 30, 5]);
    assert_eq!(sizes(&female_parts), vec![10, 0, 0]);
    assert_eq!(split.overflow, None);

    // Chunks keep the incoming order.
    assert_eq!(split.parts[1].male[0].name, "Male 030");
    assert_eq!(split.parts[2].male[4].name, "Male 064");
}

#[test]
fn without_force_split_the_roster_is_truncated() {
    let male = students("Male", 65, Gender::Male);
    let female = students("Female", 10, Gender::Female);

    let split = partition(&male, &female, DEFAULT_CAPACITY, false);

    assert_eq!(split.parts.len(), 1);
    assert_eq!(split.parts[0].male.len(), 30);
    assert_eq!(split.parts[0].female.len(), 10);
    let overflow = split.overflow.expect("overflow reported");
    assert_eq!((overflow.male, overflow.female, overflow.capacity), (65, 10, 30));
}

#[test]
fn empty_rosters_still_produce_one_part() {
    let split = partition(&[], &[], DEFAULT_CAPACITY, true);
    assert_eq!(split.parts.len(), 1);
    assert!(split.parts[0].male.is_empty());
    assert!(split.parts[0].female.is_empty());
}

#[test]
fn female_overflow_drives_the_part_count() {
    let male = students("Male", 3, Gender::Male);
    let female = students("Female", 31, Gender::Female);

    let split = partition(&male, &female, DEFAULT_CAPACITY, true);

    assert_eq!(split.parts.len(), 2);
    assert_eq!(split.parts[1].male.len(), 0);
    assert_eq!(split.parts[1].female.len(), 1);
}

#[test]
fn guardrail_rejects_oversized_rosters() {
    let male = students("Male", 30, Gender::Male);
    let female = students("Female", 31, Gender::Female);

    assert!(ensure_within_capacity(&male, &female[..30], DEFAULT_CAPACITY).is_ok());
    assert!(matches!(
        ensure_within_capacity(&male, &female, DEFAULT_CAPACITY),
        Err(ToolError::CapacityExceeded {
            male: 30,
            female: 31,
            capacity: 30
        })
    ));
}

#[test]
fn default_path_replaces_spaces() {
    let dir = std::path::Path::new("reports");
    let path = default_output_path(dir, "October", "St. John Paul");
    assert_eq!(path, dir.join("Attendance_October_St._John_Paul.xlsx"));
}

#[test]
fn part_suffix_is_inserted_before_the_extension() {
    let base = std::path::Path::new("out/report.xlsx");
    assert_eq!(part_path(base, 0, 1), base);
    assert_eq!(part_path(base, 0, 3), std::path::Path::new("out/report_pt1.xlsx"));
    assert_eq!(part_path(base, 2, 3), std::path::Path::new("out/report_pt3.xlsx"));
}

#[test]
fn existing_reports_are_never_overwritten() {
    let temp_dir = tempdir().expect("temporary directory");
    let base = temp_dir.path().join("Attendance_October_Agimat.xlsx");
    let now = NaiveDate::from_ymd_opt(2025, 10, 17)
        .and_then(|date| date.and_hms_opt(8, 30, 5))
        .expect("valid timestamp");

    assert_eq!(avoid_collision(&base, now), base);
    fs::write(&base, b"first").expect("first report written");

    let second = avoid_collision(&base, now);
    assert_eq!(
        second,
        temp_dir.path().join("Attendance_October_Agimat_20251017_083005.xlsx")
    );
    fs::write(&second, b"second").expect("second report written");

    // Same second again: the timestamped name is taken too.
    let third = avoid_collision(&base, now);
    assert_ne!(third, base);
    assert_ne!(third, second);
    assert!(!third.exists());
    assert_eq!(third.extension().and_then(|ext| ext.to_str()), Some("xlsx"));
}
