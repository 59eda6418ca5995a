//! Splitting of rosters that exceed the per-gender capacity of the
//! template, and naming of the resulting report files.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::warn;

use crate::sf2::tools::error::{Result, ToolError};
use crate::sf2::tools::model::StudentRecord;

/// Students per gender the SF2 template holds.
pub const DEFAULT_CAPACITY: usize = 30;

const DEFAULT_EXTENSION: &str = "xlsx";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// What to do when a roster does not fit in a single report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Refuse to generate anything.
    #[default]
    Abort,
    /// Generate a single report holding the first `capacity` students of
    /// each gender.
    Truncate,
    /// Generate as many reports as needed.
    Split,
}

impl OverflowPolicy {
    /// Whether the partitioner should emit every part.
    pub fn force_split(self) -> bool {
        matches!(self, OverflowPolicy::Split)
    }
}

/// Advisory raised when a roster had to be truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    pub male: usize,
    pub female: usize,
    pub capacity: usize,
}

impl From<CapacityExceeded> for ToolError {
    fn from(value: CapacityExceeded) -> Self {
        ToolError::CapacityExceeded {
            male: value.male,
            female: value.female,
            capacity: value.capacity,
        }
    }
}

/// One report's share of the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterPart<'a> {
    pub male: &'a [StudentRecord],
    pub female: &'a [StudentRecord],
}

/// Result of partitioning a roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    pub parts: Vec<RosterPart<'a>>,
    /// Set when students were dropped because splitting was not requested.
    pub overflow: Option<CapacityExceeded>,
}

/// Fails when either gender exceeds `capacity`.
pub fn ensure_within_capacity(
    male: &[StudentRecord],
    female: &[StudentRecord],
    capacity: usize,
) -> Result<()> {
    match check_capacity(male.len(), female.len(), capacity) {
        Some(exceeded) => Err(exceeded.into()),
        None => Ok(()),
    }
}

/// Chunks each gender into blocks of at most `capacity` students and pairs
/// the chunks up by index.
///
/// Without `force_split` an oversized roster is truncated to a single part
/// and the overflow is reported on the returned [`Partition`].
pub fn partition<'a>(
    male: &'a [StudentRecord],
    female: &'a [StudentRecord],
    capacity: usize,
    force_split: bool,
) -> Partition<'a> {
    let capacity = capacity.max(1);
    let overflow = check_capacity(male.len(), female.len(), capacity);

    if !force_split {
        if let Some(exceeded) = overflow {
            warn!(
                male = exceeded.male,
                female = exceeded.female,
                capacity,
                "student limit exceeded, truncating to a single report"
            );
        }
        let parts = vec![RosterPart {
            male: &male[..male.len().min(capacity)],
            female: &female[..female.len().min(capacity)],
        }];
        return Partition { parts, overflow };
    }

    let male_chunks: Vec<&[StudentRecord]> = male.chunks(capacity).collect();
    let female_chunks: Vec<&[StudentRecord]> = female.chunks(capacity).collect();
    let part_count = male_chunks.len().max(female_chunks.len()).max(1);

    let parts = (0..part_count)
        .map(|index| RosterPart {
            male: male_chunks.get(index).copied().unwrap_or(&[]),
            female: female_chunks.get(index).copied().unwrap_or(&[]),
        })
        .collect();

    Partition {
        parts,
        overflow: None,
    }
}

fn check_capacity(male: usize, female: usize, capacity: usize) -> Option<CapacityExceeded> {
    (male > capacity || female > capacity).then_some(CapacityExceeded {
        male,
        female,
        capacity,
    })
}

/// Default report location next to the input file:
/// `Attendance_{month}_{section}.xlsx` with spaces replaced by underscores.
pub fn default_output_path(dir: &Path, month: &str, section: &str) -> PathBuf {
    let name = format!("Attendance_{month}_{section}.{DEFAULT_EXTENSION}").replace(' ', "_");
    dir.join(name)
}

/// Path of part `index` (zero-based) out of `count`. A single part keeps
/// `base` unchanged; otherwise `_ptN` is inserted before the extension.
pub fn part_path(base: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return base.to_path_buf();
    }
    with_suffix(base, &format!("_pt{}", index + 1))
}

/// Returns `path` when nothing exists there yet. Otherwise a
/// `_YYYYMMDD_HHMMSS` timestamp is inserted before the extension, followed
/// by a counter if the timestamped name is taken as well.
pub fn avoid_collision(path: &Path, now: NaiveDateTime) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stamped = with_suffix(path, &format!("_{}", now.format(TIMESTAMP_FORMAT)));
    if !stamped.exists() {
        return stamped;
    }

    let mut counter = 2;
    loop {
        let candidate = with_suffix(&stamped, &format!("_{counter}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(extension) => format!("{stem}{suffix}.{}", extension.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}
