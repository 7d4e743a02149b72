//! Expect patterns for Comware prompts and confirmations.
//!
//! All patterns are compiled once on first use and shared process-wide.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// User view prompt, e.g. `<sw1>`.
pub static USER_VIEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^<[^<>\r\n]+>\s*$").expect("valid user view pattern"));

/// System view prompt or any sub-view, e.g. `[sw1]`, `[sw1-Vlan-interface10]`.
pub static SYSTEM_VIEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\[[^\[\]\r\n]+\]\s*$").expect("valid system view pattern"));

/// Either view.
pub static ANY_VIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:<[^<>\r\n]+>|\[[^\[\]\r\n]+\])\s*$").expect("valid any view pattern")
});

/// A `[Y/N]` confirmation question.
pub static CONFIRM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[?Y/N\]?").expect("valid confirmation pattern"));

/// A confirmation question or either view prompt.
///
/// Used where the device may or may not ask a follow-up question.
pub static CONFIRM_OR_VIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:\[?Y/N\]?|^(?:<[^<>\r\n]+>|\[[^\[\]\r\n]+\])\s*$)")
        .expect("valid confirmation or view pattern")
});

/// Compile a caller-supplied expect pattern.
///
/// Patterns without an end anchor get a trailing `\s*$` so they only match
/// once the device has stopped printing after them.
pub fn compile_expect_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if pattern.ends_with('$') {
        Regex::new(pattern)
    } else {
        Regex::new(&format!(r"{pattern}\s*$"))
    }
}
