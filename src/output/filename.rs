//! Clip filename encoding and decoding
//!
//! `{f|n}_{seq:03}_{discriminator}_{start}_{end}.{ext}`, e.g.
//! `f_001_Some_Title_10.5_16.2.mp4`.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::model::{ClipRecord, Label};
use crate::utils::time::TimeParser;

/// Extension of the clip files the index is built from
pub const VIDEO_EXTENSION: &str = "mp4";

static CLIP_NAME: OnceLock<Regex> = OnceLock::new();

// The discriminator group is greedy; the two trailing numeric groups are
// matched last, so discriminators containing underscores survive.
fn clip_name_pattern() -> &'static Regex {
    CLIP_NAME.get_or_init(|| {
        Regex::new(r"^([fn])_(\d+)_(.+)_([0-9.]+)_([0-9.]+)\.mp4$")
            .expect("clip filename regex should compile")
    })
}

/// Bidirectional mapping between clip records and filenames
pub struct ClipFilenameCodec;

impl ClipFilenameCodec {
    /// Filename without extension
    pub fn stem(
        label: Label,
        sequence_number: u32,
        discriminator: &str,
        start_seconds: f64,
        end_seconds: f64,
    ) -> String {
        format!(
            "{}_{:03}_{}_{}_{}",
            label.prefix(),
            sequence_number,
            discriminator,
            TimeParser::format_for_filename(start_seconds),
            TimeParser::format_for_filename(end_seconds)
        )
    }

    /// Full filename with the given extension
    pub fn encode(
        label: Label,
        sequence_number: u32,
        discriminator: &str,
        start_seconds: f64,
        end_seconds: f64,
        extension: &str,
    ) -> String {
        format!(
            "{}.{}",
            Self::stem(label, sequence_number, discriminator, start_seconds, end_seconds),
            extension
        )
    }

    /// Build the record for a new video clip, filename included
    pub fn record(
        label: Label,
        sequence_number: u32,
        discriminator: &str,
        start_seconds: f64,
        end_seconds: f64,
    ) -> ClipRecord {
        ClipRecord {
            label,
            sequence_number,
            source_discriminator: discriminator.to_string(),
            start_seconds,
            end_seconds,
            filename: Self::encode(
                label,
                sequence_number,
                discriminator,
                start_seconds,
                end_seconds,
                VIDEO_EXTENSION,
            ),
        }
    }

    /// Parse a video clip filename back into a record.
    ///
    /// Returns `None` for anything that does not follow the clip naming
    /// scheme; such files are simply not clips.
    pub fn decode(filename: &str) -> Option<ClipRecord> {
        let caps = clip_name_pattern().captures(filename)?;

        let label = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .and_then(Label::from_prefix)?;
        let sequence_number = caps.get(2)?.as_str().parse::<u32>().ok()?;
        let discriminator = caps.get(3)?.as_str();
        let start_seconds = caps.get(4)?.as_str().parse::<f64>().ok()?;
        let end_seconds = caps.get(5)?.as_str().parse::<f64>().ok()?;

        Some(ClipRecord {
            label,
            sequence_number,
            source_discriminator: discriminator.to_string(),
            start_seconds,
            end_seconds,
            filename: filename.to_string(),
        })
    }
}
