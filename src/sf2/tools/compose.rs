use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, instrument, warn};

use crate::sf2::tools::calendar::{CalendarOptions, resolve_with};
use crate::sf2::tools::error::Result;
use crate::sf2::tools::io::excel_write::{DocumentWriter, TemplateWriter};
use crate::sf2::tools::io::{self, InputFormat};
use crate::sf2::tools::layout::{self, FilledDocument, LayoutSchema};
use crate::sf2::tools::model::{IsoDate, ReportSource, Roster};
use crate::sf2::tools::partition::{
    DEFAULT_CAPACITY, OverflowPolicy, avoid_collision, default_output_path,
    ensure_within_capacity, part_path, partition,
};

/// Default template location, relative to the working directory.
pub const DEFAULT_TEMPLATE: &str = "sf2-template/SF2Template.xlsx";

/// Settings shared by every report generated from one input.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    pub template: PathBuf,
    /// Explicit output path. Defaults to `Attendance_{month}_{section}.xlsx`
    /// next to the input.
    pub output: Option<PathBuf>,
    pub overflow: OverflowPolicy,
    /// Students per gender per part, further limited by the layout.
    pub capacity: usize,
    pub schema: LayoutSchema,
    pub calendar: CalendarOptions,
    /// Holidays added to those listed in the input.
    pub extra_holidays: BTreeSet<IsoDate>,
}

impl ComposeOptions {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output: None,
            overflow: OverflowPolicy::default(),
            capacity: DEFAULT_CAPACITY,
            schema: LayoutSchema::default(),
            calendar: CalendarOptions::default(),
            extra_holidays: BTreeSet::new(),
        }
    }

    fn effective_capacity(&self) -> usize {
        self.capacity.min(self.schema.capacity())
    }
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

/// Generates report parts from an attendance JSON document.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), template = %options.template.display())
)]
pub fn json_to_excel(input: &Path, options: &ComposeOptions) -> Result<Vec<PathBuf>> {
    input_to_excel(input, InputFormat::Json, options)
}

/// Generates report parts from an attendance CSV export.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), template = %options.template.display())
)]
pub fn csv_to_excel(input: &Path, options: &ComposeOptions) -> Result<Vec<PathBuf>> {
    input_to_excel(input, InputFormat::Csv, options)
}

/// Generates report parts from an input in the given format.
#[instrument(level = "debug", skip(input, options), fields(input = %input.display()))]
pub fn input_to_excel(
    input: &Path,
    format: InputFormat,
    options: &ComposeOptions,
) -> Result<Vec<PathBuf>> {
    let source = io::read_source(input, Some(format))?;
    info!(
        student_count = source.students.len(),
        holiday_count = source.holidays.len(),
        "parsed attendance source"
    );
    let writer = TemplateWriter::open(&options.template)?;
    let output_dir = input.parent().unwrap_or_else(|| Path::new(""));
    compose_report(&source, output_dir, options, &writer)
}

/// Lays out every part of the report and hands each to `writer`.
///
/// All parts are laid out before the first one is written, so invalid
/// periods or dates never leave a partial set of files behind.
pub fn compose_report(
    source: &ReportSource,
    output_dir: &Path,
    options: &ComposeOptions,
    writer: &dyn DocumentWriter,
) -> Result<Vec<PathBuf>> {
    let documents = build_documents(source, options)?;

    let base = options.output.clone().unwrap_or_else(|| {
        default_output_path(output_dir, &source.info.month, &source.info.section)
    });
    let part_count = documents.len();
    let mut written = Vec::with_capacity(part_count);

    for (index, document) in documents.iter().enumerate() {
        let path = avoid_collision(&part_path(&base, index, part_count), Local::now().naive_local());
        info!(
            part = index + 1,
            parts = part_count,
            school = %source.info.school_name,
            path = %path.display(),
            "writing report part"
        );
        writer.write(document, &path)?;
        written.push(path);
    }

    Ok(written)
}

/// Resolves the school days, partitions the roster and lays out one
/// document per part.
pub fn build_documents(
    source: &ReportSource,
    options: &ComposeOptions,
) -> Result<Vec<FilledDocument>> {
    let dates = match &source.dates {
        Some(dates) => dates.clone(),
        None => resolve_with(
            &source.info.school_year,
            &source.info.month,
            &options.calendar,
        )?,
    };
    let holidays: BTreeSet<IsoDate> = source
        .holidays
        .union(&options.extra_holidays)
        .cloned()
        .collect();

    let roster = Roster::from_students(source.students.iter().cloned());
    let capacity = options.effective_capacity();
    if options.overflow == OverflowPolicy::Abort {
        ensure_within_capacity(&roster.male, &roster.female, capacity)?;
    }

    let split = partition(
        &roster.male,
        &roster.female,
        capacity,
        options.overflow.force_split(),
    );
    if let Some(overflow) = split.overflow {
        warn!(
            dropped_male = overflow.male.saturating_sub(capacity),
            dropped_female = overflow.female.saturating_sub(capacity),
            "students beyond the template capacity were left out"
        );
    }
    debug!(
        parts = split.parts.len(),
        school_days = dates.len(),
        "roster partitioned"
    );

    split
        .parts
        .iter()
        .map(|part| {
            layout::map(
                &source.info,
                &dates,
                &holidays,
                part.male,
                part.female,
                &options.schema,
            )
        })
        .collect()
}
