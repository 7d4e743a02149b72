//! Device identity from version, sysname, interface and manufacturing output.

use serde::Serialize;

use super::patterns::PATTERNS;
use crate::parse::{MISSING_INT, parse_duration};

const UNKNOWN: &str = "Unknown";

/// Basic device facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceFacts {
    /// Seconds since boot, -1 when the device did not report it.
    pub uptime: i64,
    pub vendor: String,
    pub os_version: String,
    /// Stack members are joined with `" / "`.
    pub serial_number: String,
    pub model: String,
    pub hostname: String,
    pub fqdn: String,
    pub interface_list: Vec<String>,
}

/// Raw output of the commands facts are built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactsOutput<'a> {
    /// `display version`
    pub version: &'a str,
    /// `display current-configuration | include sysname`
    pub sysname: &'a str,
    /// `display ip interface brief`
    pub interface_brief: &'a str,
    /// `display device manuinfo`
    pub manuinfo: &'a str,
}

impl DeviceFacts {
    /// Build facts from command output; anything missing keeps its default.
    pub fn parse(output: FactsOutput<'_>) -> Self {
        let mut facts = Self {
            uptime: MISSING_INT,
            vendor: "H3C".to_string(),
            os_version: UNKNOWN.to_string(),
            serial_number: UNKNOWN.to_string(),
            model: UNKNOWN.to_string(),
            hostname: UNKNOWN.to_string(),
            fqdn: UNKNOWN.to_string(),
            interface_list: Vec::new(),
        };

        for line in output.version.lines() {
            if line.contains("H3C Comware Software") {
                if let Some(m) = PATTERNS.os_version.find(line) {
                    facts.os_version = m.as_str().to_string();
                }
            }

            if let Some(caps) = PATTERNS.model_uptime.captures(line) {
                facts.model = caps[1].to_string();
                facts.uptime = i64::try_from(parse_duration(line)).unwrap_or(i64::MAX);
                break;
            }
        }

        let serials: Vec<&str> = PATTERNS
            .serial_number
            .captures_iter(output.manuinfo)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        if !serials.is_empty() {
            facts.serial_number = serials.join(" / ");
        }

        if let Some(caps) = PATTERNS.sysname.captures(output.sysname) {
            facts.hostname = caps[1].to_string();
        }

        facts.interface_list = interface_names(output.interface_brief);
        facts
    }
}

/// First column of every row under the `Interface` header.
fn interface_names(brief: &str) -> Vec<String> {
    brief
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Interface"))
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
