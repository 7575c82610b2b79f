//! Path utilities for naming downloaded sources and clip files

use std::path::{Path, PathBuf};

/// Longest discriminator we derive from a video title
pub const MAX_TITLE_LENGTH: usize = 80;

/// Turn an arbitrary video title into a string safe for file and folder names.
///
/// Characters reserved on common file systems are dropped, spaces become
/// underscores, leading/trailing dots and underscores are trimmed and the
/// result is cut to `max_length` characters. An empty result becomes
/// `untitled` so it can still act as a filename segment.
pub fn sanitize_filename(title: &str, max_length: usize) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    let truncated: String = trimmed.chars().take(max_length).collect();

    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated
    }
}

/// Find the first file in `dir` whose name ends with `suffix` and starts with
/// `prefix` (either may be empty). Entries are checked in name order so the
/// choice is stable between runs.
pub fn find_file(dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| {
            path.file_name()
                .map(|name| {
                    let name = name.to_string_lossy();
                    name.starts_with(prefix) && name.ends_with(suffix)
                })
                .unwrap_or(false)
        })
}

/// Locate the `*_video.mp4` / `*_audio.*` pair inside a source folder.
///
/// With `stem` set, only `{stem}_video.mp4` and `{stem}_audio.*` qualify.
pub fn find_media_pair(dir: &Path, stem: Option<&str>) -> Option<(PathBuf, PathBuf)> {
    match stem {
        Some(stem) => {
            let video = dir.join(format!("{}_video.mp4", stem));
            if !video.is_file() {
                return None;
            }
            let audio = find_file(dir, &format!("{}_audio.", stem), "")?;
            Some((video, audio))
        }
        None => {
            let video = find_file(dir, "", "_video.mp4")?;
            let audio = find_file_containing(dir, "_audio.")?;
            Some((video, audio))
        }
    }
}

fn find_file_containing(dir: &Path, needle: &str) -> Option<PathBuf> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().contains(needle))
                .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_strips_reserved_characters() {
        assert_eq!(
            sanitize_filename("What? A <great> day: part 1/2", MAX_TITLE_LENGTH),
            "What_A_great_day_part_12"
        );
    }

    #[test]
    fn test_sanitize_trims_dots_and_underscores() {
        assert_eq!(sanitize_filename("  ..hello world.. ", 80), "hello_world");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let title = "한글제목".repeat(30);
        let safe = sanitize_filename(&title, MAX_TITLE_LENGTH);
        assert_eq!(safe.chars().count(), MAX_TITLE_LENGTH);
    }

    #[test]
    fn test_sanitize_empty_becomes_untitled() {
        assert_eq!(sanitize_filename("???", 80), "untitled");
        assert_eq!(sanitize_filename("", 80), "untitled");
    }

    #[test]
    fn test_find_media_pair_any_stem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("My_Video_video.mp4"), b"v").unwrap();
        fs::write(dir.path().join("My_Video_audio.webm"), b"a").unwrap();
        fs::write(dir.path().join("timestamps.csv"), b"start,end,label\n").unwrap();

        let (video, audio) = find_media_pair(dir.path(), None).unwrap();
        assert!(video.ends_with("My_Video_video.mp4"));
        assert!(audio.ends_with("My_Video_audio.webm"));
    }

    #[test]
    fn test_find_media_pair_requires_both_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("abc_video.mp4"), b"v").unwrap();
        assert!(find_media_pair(dir.path(), None).is_none());
        assert!(find_media_pair(dir.path(), Some("abc")).is_none());
    }

    #[test]
    fn test_find_media_pair_with_stem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("other_video.mp4"), b"v").unwrap();
        fs::write(dir.path().join("abc_video.mp4"), b"v").unwrap();
        fs::write(dir.path().join("abc_audio.m4a"), b"a").unwrap();

        let (video, audio) = find_media_pair(dir.path(), Some("abc")).unwrap();
        assert!(video.ends_with("abc_video.mp4"));
        assert!(audio.ends_with("abc_audio.m4a"));
    }
}
