use std::fmt;
use std::fs::{self, File};
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let mut data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;
    data.push(b'\n');

    fs::write(path, data).with_context(|| format!("failed to write json file: {}", path.display()))
}

/// Inclusive 1-indexed page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parses "384-387" or a single "384".
pub fn parse_page_range(raw: &str) -> Result<PageRange> {
    let trimmed = raw.trim();
    let (start_raw, end_raw) = match trimmed.split_once('-') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (trimmed, trimmed),
    };

    let start = start_raw
        .parse::<usize>()
        .with_context(|| format!("invalid page range: {raw}"))?;
    let end = end_raw
        .parse::<usize>()
        .with_context(|| format!("invalid page range: {raw}"))?;

    if start == 0 {
        bail!("invalid page range: {raw} (pages are 1-indexed)");
    }
    if end < start {
        bail!("invalid page range: {raw} (start exceeds end)");
    }

    Ok(PageRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_range_accepts_span_and_single_page() {
        assert_eq!(
            parse_page_range("384-387").unwrap(),
            PageRange {
                start: 384,
                end: 387
            }
        );
        assert_eq!(
            parse_page_range(" 12 - 14 ").unwrap(),
            PageRange { start: 12, end: 14 }
        );
        assert_eq!(
            parse_page_range("384").unwrap(),
            PageRange {
                start: 384,
                end: 384
            }
        );
    }

    #[test]
    fn parse_page_range_rejects_bad_input() {
        assert!(parse_page_range("0-3").is_err());
        assert!(parse_page_range("9-4").is_err());
        assert!(parse_page_range("four").is_err());
        assert!(parse_page_range("").is_err());
    }

    #[test]
    fn page_range_renders_compactly() {
        assert_eq!(
            PageRange {
                start: 384,
                end: 387
            }
            .to_string(),
            "384-387"
        );
        assert_eq!(PageRange { start: 9, end: 9 }.to_string(), "9");
    }
}
