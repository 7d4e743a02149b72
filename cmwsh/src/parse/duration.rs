//! Free-text uptime parsing.
//!
//! Comware reports uptime as prose, e.g.
//! `H3C S5560 uptime is 0 weeks, 2 days, 4 hours, 10 minutes`. Every
//! `<number> <unit>` pair found is converted with fixed factors; a year is
//! always 365 days.

use once_cell::sync::Lazy;
use regex::Regex;

static UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(year|week|day|hour|minute|second)s?\b")
        .expect("valid duration pattern")
});

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 365 * DAY;

const UNITS: [(&str, u64); 6] = [
    ("year", YEAR),
    ("week", WEEK),
    ("day", DAY),
    ("hour", HOUR),
    ("minute", MINUTE),
    ("second", 1),
];

/// Convert an uptime string to seconds.
///
/// Units may appear in any order and any letter case; only the first
/// occurrence of each unit counts. Text without a recognizable unit is 0.
/// Never fails: oversized numbers saturate.
pub fn parse_duration(text: &str) -> u64 {
    let mut seen = [false; UNITS.len()];
    let mut total: u64 = 0;

    for caps in UNIT.captures_iter(text) {
        let unit = caps[2].to_ascii_lowercase();
        let Some(slot) = UNITS.iter().position(|(name, _)| *name == unit) else {
            continue;
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;

        let amount = caps[1].parse::<u64>().unwrap_or(u64::MAX);
        total = total.saturating_add(amount.saturating_mul(UNITS[slot].1));
    }

    total
}
