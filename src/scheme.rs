//! Episode scheme classification
//!
//! Decides from a media file name whether an episode is addressed by season
//! and episode number (`S01E05`) or by the date it aired (`2023-05-01`).
//! The two matchers are independent and consulted in that order.

use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

// S01E05, s1e5, S2024E113, ...
static RE_SXXEXX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S([0-9]+)E([0-9]+)").unwrap());

// Year 1000-2999, month 1-12, day 1-31 with any of - : / . between the parts.
// The trailing group stands in for "not followed by a digit".
static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(1[0-9]{3}|2[0-9]{3})[-:/.](0?[1-9]|1[012])[-:/.](0?[1-9]|[12][0-9]|3[01])(?:[^0-9]|$)",
    )
    .unwrap()
});

/// How an episode file identifies its episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeToken {
    /// Season and episode number, e.g. `S02E05`
    Numeric { season: u32, episode: u32 },
    /// Air date, for daily and live shows
    Date(NaiveDate),
}

impl fmt::Display for SchemeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeToken::Numeric { season, episode } => write!(f, "S{season:02}E{episode:02}"),
            SchemeToken::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Finds the first `S<digits>E<digits>` token in `file_name`.
///
/// Numbers too large for `u32` saturate, so an oversized token still counts
/// as a numeric scheme.
pub fn find_numeric_scheme(file_name: &str) -> Option<SchemeToken> {
    let caps = RE_SXXEXX.captures(file_name)?;
    Some(SchemeToken::Numeric {
        season: saturating_number(caps.get(1)?.as_str()),
        episode: saturating_number(caps.get(2)?.as_str()),
    })
}

// Only ever called on all-digit input, so a failed parse means overflow.
fn saturating_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Finds the first calendar date in `file_name`.
///
/// Date-shaped matches that are not a real day (e.g. `2023-02-30`) are
/// skipped.
pub fn find_calendar_date(file_name: &str) -> Option<SchemeToken> {
    RE_DATE.captures_iter(file_name).find_map(|caps| {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let day = caps.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day).map(SchemeToken::Date)
    })
}

/// Classifies a media file name.
///
/// Directory components are ignored. The numeric scheme takes precedence;
/// the date matcher is only consulted when no numeric token is present.
pub fn classify(file_name: &str) -> Option<SchemeToken> {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    find_numeric_scheme(name).or_else(|| find_calendar_date(name))
}
