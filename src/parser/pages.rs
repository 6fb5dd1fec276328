//! Page specification parsing.
//!
//! A page spec is what a user types to pick pages: comma-separated single
//! pages and inclusive ranges, 1-indexed (`"1-3,5"`). It resolves to a
//! [`PageSet`] of 0-indexed page indices, sorted and free of duplicates.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StudyError};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").expect("page token pattern is valid")
});

/// Sorted, duplicate-free set of 0-indexed pages.
///
/// Stored as merged inclusive ranges of 1-indexed page numbers, so a spec
/// like `"1-100000"` costs nothing until the pages are walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    ranges: Vec<RangeInclusive<u32>>,
}

impl PageSet {
    fn from_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Self {
        ranges.sort_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            if let Some(last) = merged.last_mut()
                && *range.start() <= last.end().saturating_add(1)
            {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
                continue;
            }
            merged.push(range);
        }

        Self { ranges: merged }
    }

    /// Number of pages in the set.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|r| (r.end() - r.start()) as usize + 1)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Highest 0-indexed page in the set.
    pub fn max_index(&self) -> Option<u32> {
        self.ranges.last().map(|r| r.end() - 1)
    }

    /// 0-indexed pages in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|r| r.clone()).map(|n| n - 1)
    }

    /// 1-indexed page numbers in ascending order.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.indices().map(|i| i + 1)
    }
}

/// Canonical 1-indexed form, e.g. `1-3,5`. Parsing it gives the same set back.
impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if range.start() == range.end() {
                write!(f, "{}", range.start())?;
            } else {
                write!(f, "{}-{}", range.start(), range.end())?;
            }
        }
        Ok(())
    }
}

/// Parse a user page spec into a [`PageSet`].
pub fn parse_page_spec(spec: &str) -> Result<PageSet> {
    if spec.trim().is_empty() {
        return Err(StudyError::EmptyPageSpec);
    }

    let mut ranges = Vec::new();
    for token in spec.split(',') {
        ranges.push(parse_token(spec, token)?);
    }

    let pages = PageSet::from_ranges(ranges);
    if pages.is_empty() {
        return Err(StudyError::EmptyPageSpec);
    }

    tracing::debug!("Parsed page spec '{}' as {}", spec, pages);
    Ok(pages)
}

fn parse_token(spec: &str, token: &str) -> Result<RangeInclusive<u32>> {
    if token.trim().is_empty() {
        return Err(StudyError::malformed(spec, "empty page entry"));
    }

    let caps = TOKEN.captures(token).ok_or_else(|| {
        StudyError::malformed(spec, format!("'{}' is not a page or range", token.trim()))
    })?;

    let start = parse_page_number(spec, &caps[1])?;
    let end = match caps.get(2) {
        Some(m) => parse_page_number(spec, m.as_str())?,
        None => start,
    };

    if start > end {
        return Err(StudyError::malformed(
            spec,
            format!("range {}-{} starts after it ends", start, end),
        ));
    }

    Ok(start..=end)
}

fn parse_page_number(spec: &str, digits: &str) -> Result<u32> {
    let n: u32 = digits
        .parse()
        .map_err(|_| StudyError::malformed(spec, format!("page number {} is too large", digits)))?;
    if n == 0 {
        return Err(StudyError::malformed(spec, "page numbers start at 1"));
    }
    Ok(n)
}
