//! Interface state, counters and addresses from `display interface` style
//! output.

use indexmap::IndexMap;
use serde::Serialize;

use super::patterns::PATTERNS;
use crate::error::FormatError;
use crate::parse::{Fields, MISSING_FLOAT, Section, normalize_mac, parse_number};

/// State of one interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub is_enabled: bool,
    pub is_up: bool,
    /// `""` when not configured.
    pub description: String,
    /// Upper-case colon notation, `""` when not reported.
    pub mac_address: String,
    /// Mbit/s, -1 when absent or not numeric (e.g. `auto`).
    pub speed: i64,
    /// Not reported by the platform, always -1.0.
    pub last_flapped: f64,
}

/// Traffic counters of one interface. Absent counters are 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceCounters {
    pub tx_errors: u64,
    pub rx_errors: u64,
    pub tx_discards: u64,
    pub rx_discards: u64,
    pub tx_octets: u64,
    pub rx_octets: u64,
    pub tx_unicast_packets: u64,
    pub rx_unicast_packets: u64,
    pub tx_multicast_packets: u64,
    pub rx_multicast_packets: u64,
    pub tx_broadcast_packets: u64,
    pub rx_broadcast_packets: u64,
}

/// Addresses configured on one interface, address → prefix length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceAddresses {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub ipv4: IndexMap<String, u8>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub ipv6: IndexMap<String, u8>,
}

/// Name and admin state from a section header.
fn header_fields<'a>(section: &Section<'a>) -> Result<(&'a str, &'a str), FormatError> {
    let caps = Fields::new(section.header).required_captures(&PATTERNS.interface_header, "name")?;
    match (caps.get(1), caps.get(2)) {
        (Some(name), Some(state)) => Ok((name.as_str(), state.as_str().trim_end())),
        _ => Err(FormatError::MissingField {
            field: "state",
            section: section.text(),
        }),
    }
}

fn is_up(state: &str) -> bool {
    state.to_ascii_lowercase().contains("up")
}

/// Parse `display interface`.
pub fn parse_interfaces(output: &str) -> Result<IndexMap<String, Interface>, FormatError> {
    let mut interfaces = IndexMap::new();

    for section in PATTERNS.interface_boundary.split(output)? {
        let (name, state) = header_fields(&section)?;
        let fields = Fields::new(section.body);
        let protocol = fields.required(&PATTERNS.protocol, "protocol")?;

        let mac_address = match fields.optional_str(&PATTERNS.mac_address) {
            mac if mac.is_empty() => mac,
            mac => normalize_mac(&mac),
        };

        interfaces.insert(
            name.to_string(),
            Interface {
                is_enabled: is_up(state),
                is_up: is_up(protocol),
                description: fields.optional_str(&PATTERNS.description),
                mac_address,
                speed: fields.optional_int(&PATTERNS.speed),
                last_flapped: MISSING_FLOAT,
            },
        );
    }

    Ok(interfaces)
}

/// Parse counters out of `display interface`.
///
/// Paired counters need exactly one inbound and one outbound occurrence;
/// anything else leaves both at 0.
pub fn parse_counters(output: &str) -> Result<IndexMap<String, InterfaceCounters>, FormatError> {
    let mut counters = IndexMap::new();

    for section in PATTERNS.interface_boundary.split(output)? {
        let (name, _) = header_fields(&section)?;
        let fields = Fields::new(section.body);

        let (rx_errors, tx_errors) = fields.counter_pair(&PATTERNS.errors);
        let (rx_discards, tx_discards) = fields.counter_pair(&PATTERNS.discards);
        let (rx_unicast_packets, tx_unicast_packets) = fields.counter_pair(&PATTERNS.unicast);
        let (rx_multicast_packets, tx_multicast_packets) = fields.counter_pair(&PATTERNS.multicast);
        let (rx_broadcast_packets, tx_broadcast_packets) = fields.counter_pair(&PATTERNS.broadcast);

        counters.insert(
            name.to_string(),
            InterfaceCounters {
                tx_errors,
                rx_errors,
                tx_discards,
                rx_discards,
                tx_octets: fields.counter(&PATTERNS.tx_octets),
                rx_octets: fields.counter(&PATTERNS.rx_octets),
                tx_unicast_packets,
                rx_unicast_packets,
                tx_multicast_packets,
                rx_multicast_packets,
                tx_broadcast_packets,
                rx_broadcast_packets,
            },
        );
    }

    Ok(counters)
}

/// Parse `display ip interface` and `display ipv6 interface`.
///
/// Interfaces without any address are left out.
pub fn parse_addresses(
    ipv4_output: &str,
    ipv6_output: &str,
) -> Result<IndexMap<String, InterfaceAddresses>, FormatError> {
    let mut addresses: IndexMap<String, InterfaceAddresses> = IndexMap::new();

    for section in PATTERNS.interface_boundary.split(ipv4_output)? {
        let (name, _) = header_fields(&section)?;
        for (address, prefix) in Fields::new(section.body).pairs(&PATTERNS.ipv4_address) {
            addresses
                .entry(name.to_string())
                .or_default()
                .ipv4
                .insert(address.to_string(), parse_number(prefix, "prefix_length")?);
        }
    }

    for section in PATTERNS.ipv6_boundary.split(ipv6_output)? {
        let (name, _) = header_fields(&section)?;
        for (address, prefix) in Fields::new(section.body).pairs(&PATTERNS.ipv6_address) {
            addresses
                .entry(name.to_string())
                .or_default()
                .ipv6
                .insert(address.to_string(), parse_number(prefix, "prefix_length")?);
        }
    }

    Ok(addresses)
}
