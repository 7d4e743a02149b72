//! Row-oriented tables: LLDP neighbors, ARP and MAC address entries.

use indexmap::IndexMap;
use serde::Serialize;

use super::patterns::PATTERNS;
use crate::error::FormatError;
use crate::parse::{MISSING_FLOAT, MISSING_INT, normalize_mac, parse_number};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LldpNeighbor {
    pub hostname: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArpEntry {
    pub interface: String,
    pub mac: String,
    pub ip: String,
    /// Seconds until the entry ages out, -1.0 for entries that never age.
    pub age: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacEntry {
    pub mac: String,
    pub interface: String,
    pub vlan: u16,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub active: bool,
    pub moves: i64,
    pub last_move: f64,
}

/// Parse `display lldp neighbor-information list`, grouped by local port.
pub fn parse_lldp_neighbors(output: &str) -> IndexMap<String, Vec<LldpNeighbor>> {
    let mut neighbors: IndexMap<String, Vec<LldpNeighbor>> = IndexMap::new();

    for caps in PATTERNS.lldp_row.captures_iter(output) {
        if &caps[1] == "System" {
            continue;
        }
        neighbors
            .entry(caps[2].to_string())
            .or_default()
            .push(LldpNeighbor {
                hostname: caps[1].to_string(),
                port: caps[4].to_string(),
            });
    }

    neighbors
}

/// Parse `display arp`.
///
/// The aging column is in minutes; static entries show `N/A`.
pub fn parse_arp_table(output: &str) -> Vec<ArpEntry> {
    PATTERNS
        .arp_row
        .captures_iter(output)
        .map(|caps| ArpEntry {
            interface: caps[4].to_string(),
            mac: normalize_mac(&caps[2]),
            ip: caps[1].to_string(),
            age: caps[5]
                .parse::<u32>()
                .map_or(MISSING_FLOAT, |minutes| f64::from(minutes) * 60.0),
        })
        .collect()
}

/// Parse `display mac-address`.
pub fn parse_mac_address_table(output: &str) -> Result<Vec<MacEntry>, FormatError> {
    PATTERNS
        .mac_row
        .captures_iter(output)
        .map(|caps| {
            let state = caps[3].to_ascii_lowercase();
            let is_static = state.contains("static") || state == "blackhole";
            Ok(MacEntry {
                mac: normalize_mac(&caps[1]),
                interface: caps[4].to_string(),
                vlan: parse_number(&caps[2], "vlan")?,
                is_static,
                active: !is_static,
                moves: MISSING_INT,
                last_move: MISSING_FLOAT,
            })
        })
        .collect()
}
