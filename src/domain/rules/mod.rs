// Domain rules - Row validation and clip identity allocation

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::output::index::ExistingClipIndex;
use crate::utils::time::TimeParser;
use crate::utils::url::extract_video_id;

/// Two clips whose start and end each differ by less than this are the same clip
pub const DUPLICATE_TOLERANCE_SECONDS: f64 = 0.1;

/// One CSV row as named cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub row_number: u64,
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(row_number: u64, cells: Vec<(String, String)>) -> Self {
        Self { row_number, cells }
    }

    /// Cell value by column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    fn require(&self, column: &str) -> Result<&str, RejectionReason> {
        self.get(column).ok_or_else(|| RejectionReason::MissingField {
            field: column.to_string(),
        })
    }

    /// Comment rows have at least one cell starting with `#`
    pub fn is_comment(&self) -> bool {
        self.cells
            .iter()
            .any(|(_, value)| value.trim_start().starts_with('#'))
    }
}

/// Where a row's source video comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceBinding {
    /// Batch form: resolve from the row's `url` column
    UrlColumn,
    /// Per-folder form: every row belongs to this source
    Fixed(SourceRef),
}

/// Allowed clip length, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationLimits {
    pub min: f64,
    pub max: f64,
}

impl DurationLimits {
    pub fn new(min: f64, max: f64) -> Result<Self, DomainError> {
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(DomainError::BadArgs(format!(
                "invalid clip duration limits {}-{}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, duration: f64) -> bool {
        duration >= self.min && duration <= self.max
    }
}

/// Validates single CSV rows into clip requests
#[derive(Debug, Clone)]
pub struct RowValidator {
    limits: DurationLimits,
    binding: SourceBinding,
}

impl RowValidator {
    pub fn new(limits: DurationLimits, binding: SourceBinding) -> Self {
        Self { limits, binding }
    }

    /// Validate one row.
    ///
    /// Returns `None` for comment rows, which produce neither a request nor
    /// a rejection.
    pub fn validate(&self, row: &RawRow) -> Option<Result<ClipRequest, RejectedRow>> {
        if row.is_comment() {
            return None;
        }

        Some(self.build_request(row).map_err(|reason| RejectedRow {
            source_row_number: row.row_number,
            reason,
        }))
    }

    fn build_request(&self, row: &RawRow) -> Result<ClipRequest, RejectionReason> {
        let start = TimeParser::parse_time(row.require("start")?)?;
        let end = TimeParser::parse_time(row.require("end")?)?;

        let source = match &self.binding {
            SourceBinding::UrlColumn => {
                let url = row.require("url")?.trim();
                let id = extract_video_id(url).ok_or_else(|| {
                    RejectionReason::UnresolvableSource {
                        url: url.to_string(),
                    }
                })?;
                SourceRef::remote(id, url)
            }
            SourceBinding::Fixed(source) => source.clone(),
        };

        let label_text = row.require("label")?;
        let label = Label::normalize(label_text).ok_or_else(|| RejectionReason::InvalidLabel {
            value: label_text.trim().to_string(),
        })?;

        let duration = end - start;
        if !self.limits.contains(duration) {
            return Err(RejectionReason::DurationOutOfRange {
                duration,
                min: self.limits.min,
                max: self.limits.max,
            });
        }

        // Only reachable when min_duration is 0
        if start >= end {
            return Err(RejectionReason::InverseRange { start, end });
        }

        Ok(ClipRequest {
            source,
            start_seconds: start,
            end_seconds: end,
            label,
            duration_seconds: duration,
            source_row_number: row.row_number,
        })
    }
}

/// Result of checking a request against the existing clips
#[derive(Debug, Clone, PartialEq)]
pub enum Allocation {
    /// An equivalent clip already exists; do not cut it again
    Duplicate(ClipRecord),
    /// New clip; use this sequence number
    Fresh { sequence_number: u32 },
    /// New clip, but the label has no sequence number left
    Exhausted,
}

/// Decides duplicate-or-new and hands out sequence numbers
pub struct DedupAllocator;

impl DedupAllocator {
    /// Resolve a request against the index.
    ///
    /// A `Fresh` answer is only a reservation: the caller must insert the new
    /// record into the index right after a successful cut, otherwise the next
    /// request for the same label gets the same number.
    pub fn resolve(
        request: &ClipRequest,
        index: &ExistingClipIndex,
        discriminator: &str,
    ) -> Allocation {
        match Self::find_duplicate(request, index, discriminator) {
            Some(existing) => Allocation::Duplicate(existing.clone()),
            None => match index.next_sequence_number(request.label) {
                Some(sequence_number) => Allocation::Fresh { sequence_number },
                None => Allocation::Exhausted,
            },
        }
    }

    /// Find a record with the same label and discriminator whose range matches
    /// within [`DUPLICATE_TOLERANCE_SECONDS`]
    pub fn find_duplicate<'a>(
        request: &ClipRequest,
        index: &'a ExistingClipIndex,
        discriminator: &str,
    ) -> Option<&'a ClipRecord> {
        index.records(request.label).iter().find(|existing| {
            existing.source_discriminator == discriminator
                && Self::same_instant(existing.start_seconds, request.start_seconds)
                && Self::same_instant(existing.end_seconds, request.end_seconds)
        })
    }

    fn same_instant(a: f64, b: f64) -> bool {
        (a - b).abs() < DUPLICATE_TOLERANCE_SECONDS
    }
}
