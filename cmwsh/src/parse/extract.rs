//! Typed field extraction from one section of output.
//!
//! Mandatory fields fail the whole record with a [`FormatError`]; optional
//! fields fall back to fixed sentinels so records always have every field.

use regex::{Captures, Regex};

use crate::error::FormatError;

/// Sentinel for absent optional integers.
pub const MISSING_INT: i64 = -1;

/// Sentinel for absent optional floats.
pub const MISSING_FLOAT: f64 = -1.0;

/// Field accessors over a block of text.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    text: &'a str,
}

/// First non-empty capture group, or the whole match.
fn first_group<'a>(caps: &Captures<'a>) -> &'a str {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .find(|s| !s.is_empty())
        .or_else(|| caps.get(0).map(|m| m.as_str()))
        .unwrap_or_default()
}

impl<'a> Fields<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Capture groups of the first match of a mandatory field.
    pub fn required_captures(
        &self,
        pattern: &Regex,
        field: &'static str,
    ) -> Result<Captures<'a>, FormatError> {
        pattern
            .captures(self.text)
            .ok_or_else(|| FormatError::MissingField {
                field,
                section: self.text.to_string(),
            })
    }

    /// A mandatory string field.
    pub fn required(&self, pattern: &Regex, field: &'static str) -> Result<&'a str, FormatError> {
        self.required_captures(pattern, field)
            .map(|caps| first_group(&caps).trim_end())
    }

    /// An optional string field, `""` when absent.
    pub fn optional_str(&self, pattern: &Regex) -> String {
        pattern
            .captures(self.text)
            .map(|caps| first_group(&caps).trim_end().to_string())
            .unwrap_or_default()
    }

    /// An optional integer field, [`MISSING_INT`] when absent or not numeric.
    pub fn optional_int(&self, pattern: &Regex) -> i64 {
        pattern
            .captures(self.text)
            .and_then(|caps| first_group(&caps).parse().ok())
            .unwrap_or(MISSING_INT)
    }

    /// The first occurrence of a counter, 0 when absent.
    ///
    /// Patterns may offer alternative spellings as separate groups; the
    /// first group that matched is used.
    pub fn counter(&self, pattern: &Regex) -> u64 {
        pattern
            .captures(self.text)
            .map(|caps| parse_counter(first_group(&caps)))
            .unwrap_or(0)
    }

    /// An inbound/outbound counter pair.
    ///
    /// The first occurrence is inbound and the second outbound. Any other
    /// number of occurrences leaves both at 0.
    pub fn counter_pair(&self, pattern: &Regex) -> (u64, u64) {
        let values: Vec<u64> = pattern
            .captures_iter(self.text)
            .map(|caps| parse_counter(first_group(&caps)))
            .collect();

        match values.as_slice() {
            [rx, tx] => (*rx, *tx),
            _ => (0, 0),
        }
    }

    /// Every match of `pattern` as `(group 1, group 2)`.
    pub fn pairs(&self, pattern: &Regex) -> Vec<(&'a str, &'a str)> {
        pattern
            .captures_iter(self.text)
            .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .collect()
    }
}

fn parse_counter(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

/// Parse a value that must be numeric, naming the field on failure.
pub fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
) -> Result<T, FormatError> {
    value.trim().parse().map_err(|_| FormatError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

/// Normalize a MAC address to upper-case colon notation.
///
/// Accepts Comware's `0cda-41b0-1234` as well as colon or dot separated
/// forms. Anything that is not 12 hex digits is returned unchanged.
pub fn normalize_mac(mac: &str) -> String {
    let digits: String = mac.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    let separators_only = mac
        .chars()
        .all(|c| c.is_ascii_hexdigit() || matches!(c, '-' | ':' | '.'));

    if digits.len() != 12 || !separators_only {
        return mac.to_string();
    }

    digits
        .to_ascii_uppercase()
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "\
GigabitEthernet1/0/1 current state: UP
Line protocol current state: UP
Description: uplink to core
Speed: auto
 Input (total):  1200 packets, 153600 bytes
          1000 unicasts, 150 broadcasts, 50 multicasts, 0 pauses
 Input (normal):  1200 packets, - bytes
 Output (total): 900 packets, 115200 bytes
          800 unicasts, 60 broadcasts, 40 multicasts, 0 pauses
";

    #[test]
    fn test_required_present_and_missing() {
        let fields = Fields::new(SECTION);
        let re = Regex::new(r"(?m)^Description\W+(.*)$").unwrap();
        assert_eq!(fields.required(&re, "description").unwrap(), "uplink to core");

        let re = Regex::new(r"(?m)^Hardware address\W+(\S+)").unwrap();
        let err = fields.required(&re, "mac_address").unwrap_err();
        assert!(matches!(err, FormatError::MissingField { field: "mac_address", .. }));
    }

    #[test]
    fn test_optional_sentinels() {
        let fields = Fields::new(SECTION);
        let missing = Regex::new(r"(?m)^MTU\W+(\d+)").unwrap();
        assert_eq!(fields.optional_str(&missing), "");
        assert_eq!(fields.optional_int(&missing), MISSING_INT);

        // matched but not numeric
        let speed = Regex::new(r"(?m)^Speed\W+(\d+|\w+)").unwrap();
        assert_eq!(fields.optional_int(&speed), MISSING_INT);
    }

    #[test]
    fn test_counter_pair_exactly_two() {
        let fields = Fields::new(SECTION);
        let unicast = Regex::new(r"Unicast:\s+(\d+)|(\d+)\s+unicast").unwrap();
        assert_eq!(fields.counter_pair(&unicast), (1000, 800));

        let one = Fields::new("10 unicasts");
        assert_eq!(one.counter_pair(&unicast), (0, 0));

        let three = Fields::new("1 unicasts 2 unicasts 3 unicasts");
        assert_eq!(three.counter_pair(&unicast), (0, 0));
    }

    #[test]
    fn test_counter_first_occurrence() {
        let fields = Fields::new(SECTION);
        let rx = Regex::new(r"Input.+\s+(\d+)\sbytes|Input:.+,(\d+)\sbytes").unwrap();
        assert_eq!(fields.counter(&rx), 153600);

        let missing = Regex::new(r"(\d+)\s+frames").unwrap();
        assert_eq!(fields.counter(&missing), 0);
    }

    #[test]
    fn test_pairs() {
        let fields = Fields::new(
            "Internet Address is 10.0.0.1/24 Primary\nInternet Address is 10.0.1.1/24 Sub",
        );
        let re = Regex::new(r"Internet Address is\s+(\d+\.\d+\.\d+\.\d+)/(\d+)").unwrap();
        assert_eq!(
            fields.pairs(&re),
            vec![("10.0.0.1", "24"), ("10.0.1.1", "24")]
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u32>(" 24", "prefix_length").unwrap(), 24);
        let err = parse_number::<u32>("x", "prefix_length").unwrap_err();
        assert!(matches!(err, FormatError::InvalidValue { field: "prefix_length", .. }));
    }

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("0cda-41b0-1234"), "0C:DA:41:B0:12:34");
        assert_eq!(normalize_mac("0c:da:41:b0:12:34"), "0C:DA:41:B0:12:34");
        assert_eq!(normalize_mac("0cda.41b0.1234"), "0C:DA:41:B0:12:34");
        assert_eq!(normalize_mac("N/A"), "N/A");
    }
}
