use std::collections::BTreeSet;

use sf2_tools::ToolError;
use sf2_tools::calendar;
use sf2_tools::layout::{self, CellValue, LayoutSchema};
use sf2_tools::model::{AttendanceStatus, Gender, SchoolInfo, StudentRecord};

fn school_info() -> SchoolInfo {
    SchoolInfo {
        school_name: "Sample National High School".to_string(),
        school_id: "301234".to_string(),
        school_year: "2025-2026".to_string(),
        month: "October".to_string(),
        grade: "10".to_string(),
        section: "Agimat".to_string(),
    }
}

fn dates() -> Vec<String> {
    vec![
        "2025-10-01".to_string(),
        "2025-10-02".to_string(),
        "2025-10-03".to_string(),
    ]
}

fn holidays() -> BTreeSet<String> {
    BTreeSet::from(["2025-10-02".to_string()])
}

fn male() -> Vec<StudentRecord> {
    vec![
        StudentRecord::new("Alpha, Andres", Gender::Male),
        StudentRecord::new("Bravo, Benito", Gender::Male)
            .with_status("2025-10-01", AttendanceStatus::Absent)
            .with_status("2025-10-02", AttendanceStatus::Absent)
            .with_status("2025-10-03", AttendanceStatus::Present),
    ]
}

fn female() -> Vec<StudentRecord> {
    vec![
        StudentRecord::new("Cruz, Carla", Gender::Female)
            .with_status("2025-10-03", AttendanceStatus::Absent),
    ]
}

fn text(value: &str) -> Option<CellValue> {
    Some(CellValue::Text(value.to_string()))
}

fn formula(value: &str) -> Option<CellValue> {
    Some(CellValue::Formula(value.to_string()))
}

#[test]
fn header_fields_land_on_their_cells() {
    let schema = LayoutSchema::default();
    let document = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(document.get_a1("G6").cloned(), text("301234"));
    assert_eq!(document.get_a1("G7").cloned(), text("Sample National High School"));
    assert_eq!(document.get_a1("N6").cloned(), text("2025-2026"));
    assert_eq!(document.get_a1("AA6").cloned(), text("October"));
    assert_eq!(document.get_a1("AA7").cloned(), text("10"));
    assert_eq!(document.get_a1("AF7").cloned(), text("Agimat"));
}

#[test]
fn holidays_are_blank_and_excluded_from_total_days() {
    let schema = LayoutSchema::default();
    let document = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(document.get_a1("G10").cloned(), Some(CellValue::Number(1.0)));
    assert_eq!(document.get_a1("H10").cloned(), Some(CellValue::Blank));
    assert_eq!(document.get_a1("I10").cloned(), Some(CellValue::Number(3.0)));
    assert_eq!(document.total_days(), 2);
    assert_eq!(document.get_a1("AQ9").cloned(), Some(CellValue::Number(2.0)));

    // Bravo is recorded absent on the holiday, which must not show.
    assert_eq!(document.get_a1("H14").cloned(), Some(CellValue::Blank));
    for row in [13, 14, 44] {
        assert_eq!(document.get(row, 8).cloned(), Some(CellValue::Blank));
    }
}

#[test]
fn students_fill_their_blocks_with_absence_marks() {
    let schema = LayoutSchema::default();
    let document = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(document.get_a1("B13").cloned(), text("Alpha, Andres"));
    assert_eq!(document.get_a1("B14").cloned(), text("Bravo, Benito"));
    assert_eq!(document.get_a1("B15"), None);
    assert_eq!(document.get_a1("B44").cloned(), text("Cruz, Carla"));

    assert_eq!(document.get_a1("G13").cloned(), Some(CellValue::Blank));
    assert_eq!(document.get_a1("G14").cloned(), text("x"));
    assert_eq!(document.get_a1("I14").cloned(), Some(CellValue::Blank));
    assert_eq!(document.get_a1("I44").cloned(), text("x"));
    // Nothing beyond the mapped dates is touched.
    assert_eq!(document.get_a1("J13"), None);
}

#[test]
fn aggregate_formulas_match_the_template_conventions() {
    let schema = LayoutSchema::default();
    let document = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(
        document.get_a1("G43").cloned(),
        formula(
            "=IF(G10=\"\",\"\",COUNTA($B$13:$B$42)-(COUNTIF(G13:G42,\"x\") + COUNTIF(G13:G42,\"h\")*0.5))"
        )
    );
    assert_eq!(
        document.get_a1("H74").cloned(),
        formula(
            "=IF(H10=\"\",\"\",COUNTA($B$44:$B$73)-(COUNTIF(H44:H73,\"x\") + COUNTIF(H44:H73,\"h\")*0.5))"
        )
    );
    assert_eq!(
        document.get_a1("I75").cloned(),
        formula("=IF(I10=\"\",\"\",I43+I74)")
    );
    assert_eq!(
        document.get_a1("AF14").cloned(),
        formula("=IF(B14=\"\",\"\",COUNTIF(G14:AE14,\"x\") + COUNTIF(G14:AE14,\"h\")*0.5)")
    );
    assert_eq!(
        document.get_a1("AG44").cloned(),
        formula("=IF(B44=\"\",\"\",$AQ$9-AF44)")
    );
    assert_eq!(document.get_a1("AF15"), None);
}

#[test]
fn mapping_is_deterministic() {
    let schema = LayoutSchema::default();
    let first = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");
    let second = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(first, second);
    let first_cells: Vec<_> = first.cells().collect();
    let second_cells: Vec<_> = second.cells().collect();
    assert_eq!(first_cells, second_cells);
}

#[test]
fn dates_beyond_the_grid_are_dropped() {
    let schema = LayoutSchema::default();
    let mut dates = calendar::resolve("2025-2026", "October").expect("period resolved");
    dates.extend(
        calendar::resolve("2025-2026", "November")
            .expect("period resolved")
            .into_iter()
            .take(5),
    );
    assert!(dates.len() > schema.date_column_count());

    let document = layout::map(&school_info(), &dates, &BTreeSet::new(), &male(), &[], &schema)
        .expect("document laid out");

    assert_eq!(document.date_columns().len(), 25);
    assert_eq!(document.total_days(), 25);
    // October has 23 school days, so AE holds November 4.
    assert_eq!(document.get_a1("AE10").cloned(), Some(CellValue::Number(4.0)));
    assert_eq!(document.get_a1("AF10"), None);
    assert_eq!(document.get_a1("AF43"), None);
}

#[test]
fn holidays_outside_the_date_list_have_no_effect() {
    let schema = LayoutSchema::default();
    let holidays = BTreeSet::from(["2025-12-25".to_string()]);
    let document = layout::map(&school_info(), &dates(), &holidays, &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(document.total_days(), 3);
}

#[test]
fn malformed_dates_abort_mapping() {
    let schema = LayoutSchema::default();

    let bad_attendance = vec![
        StudentRecord::new("Alpha, Andres", Gender::Male)
            .with_status("2025-13-01", AttendanceStatus::Absent),
    ];
    let result = layout::map(&school_info(), &dates(), &holidays(), &bad_attendance, &[], &schema);
    assert!(matches!(result, Err(ToolError::InvalidDate(date)) if date == "2025-13-01"));

    let bad_holidays = BTreeSet::from(["Oct 2".to_string()]);
    let result = layout::map(&school_info(), &dates(), &bad_holidays, &male(), &female(), &schema);
    assert!(matches!(result, Err(ToolError::InvalidDate(_))));

    // Padded keys would never match the date list, so they are rejected.
    let padded_holidays = BTreeSet::from([" 2025-10-02".to_string()]);
    let result = layout::map(&school_info(), &dates(), &padded_holidays, &male(), &female(), &schema);
    assert!(matches!(result, Err(ToolError::InvalidDate(date)) if date == " 2025-10-02"));

    let bad_dates = vec!["2025-10-01".to_string(), "10/02/2025".to_string()];
    let result = layout::map(&school_info(), &bad_dates, &holidays(), &male(), &female(), &schema);
    assert!(matches!(result, Err(ToolError::InvalidDate(_))));
}

#[test]
fn revised_layouts_move_cells_and_formulas() {
    let mut json = serde_json::to_value(LayoutSchema::default()).expect("layout serialised");
    json["header"]["total_days"] = serde_json::json!("AR8");
    json["name_column"] = serde_json::json!("C");
    json["first_date_column"] = serde_json::json!("H");
    json["absent_marker"] = serde_json::json!("A");
    let schema: LayoutSchema = serde_json::from_value(json).expect("layout parsed");
    schema.validate().expect("layout valid");

    let document = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &schema)
        .expect("document laid out");

    assert_eq!(document.get_a1("C14").cloned(), text("Bravo, Benito"));
    assert_eq!(document.get_a1("H14").cloned(), text("A"));
    assert_eq!(document.get_a1("AR8").cloned(), Some(CellValue::Number(2.0)));
    assert_eq!(
        document.get_a1("AG13").cloned(),
        formula("=IF(C13=\"\",\"\",$AR$8-AF13)")
    );
    assert_eq!(
        document.get_a1("H43").cloned(),
        formula(
            "=IF(H10=\"\",\"\",COUNTA($C$13:$C$42)-(COUNTIF(H13:H42,\"A\") + COUNTIF(H13:H42,\"h\")*0.5))"
        )
    );
}

#[test]
fn malformed_layouts_are_rejected_before_mapping() {
    let mut zero_total = LayoutSchema::default();
    zero_total.combined_total_row = 0;
    assert!(matches!(zero_total.validate(), Err(ToolError::InvalidWorkbook(_))));
    let result = layout::map(&school_info(), &dates(), &holidays(), &male(), &female(), &zero_total);
    assert!(matches!(result, Err(ToolError::InvalidWorkbook(_))));

    let mut overlapping = LayoutSchema::default();
    overlapping.female.first_row = 40;
    assert!(matches!(overlapping.validate(), Err(ToolError::InvalidWorkbook(_))));

    let mut total_inside_block = LayoutSchema::default();
    total_inside_block.male.total_row = 20;
    assert!(matches!(total_inside_block.validate(), Err(ToolError::InvalidWorkbook(_))));

    let mut zero_header = LayoutSchema::default();
    zero_header.date_header_row = 0;
    assert!(matches!(zero_header.validate(), Err(ToolError::InvalidWorkbook(_))));

    let mut column_clash = LayoutSchema::default();
    column_clash.present_column = 20;
    assert!(matches!(column_clash.validate(), Err(ToolError::InvalidWorkbook(_))));

    let mut shared_column = LayoutSchema::default();
    shared_column.absent_column = shared_column.present_column;
    assert!(matches!(shared_column.validate(), Err(ToolError::InvalidWorkbook(_))));
}
