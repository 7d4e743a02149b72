//! Compiled field patterns for every fact reader.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parse::SectionBoundary;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid fact pattern {pattern:?}: {e}"))
}

/// Every pattern the fact readers use, built once on first access.
pub(crate) struct FactPatterns {
    // display version / manuinfo / sysname
    pub os_version: Regex,
    pub model_uptime: Regex,
    pub serial_number: Regex,
    pub sysname: Regex,

    // display interface
    pub interface_header: Regex,
    pub interface_boundary: SectionBoundary,
    pub ipv6_boundary: SectionBoundary,
    pub protocol: Regex,
    pub mac_address: Regex,
    pub speed: Regex,
    pub description: Regex,

    // counters
    pub unicast: Regex,
    pub multicast: Regex,
    pub broadcast: Regex,
    pub discards: Regex,
    pub errors: Regex,
    pub rx_octets: Regex,
    pub tx_octets: Regex,

    // addresses
    pub ipv4_address: Regex,
    pub ipv6_address: Regex,

    // tables
    pub lldp_row: Regex,
    pub arp_row: Regex,
    pub mac_row: Regex,

    // ping
    pub ping_transmitted: Regex,
    pub ping_received: Regex,
    pub ping_rtt: Regex,
    pub ping_reply: Regex,
}

pub(crate) static PATTERNS: Lazy<FactPatterns> = Lazy::new(|| {
    let header_line = compile(r"(?m)^.*current state.*$");

    FactPatterns {
        os_version: compile(r"V\S+\s+\S+\s+\S+\s+\S+"),
        model_uptime: compile(r"H3C\s+(\S+)\s+uptime is"),
        serial_number: compile(r"DEVICE_SERIAL_NUMBER\s*:\s*(\S+)"),
        sysname: compile(r"(?m)^\s*sysname\s+(\S+)"),

        interface_header: compile(r"^(\S+).+current state\W+(.+)$"),
        interface_boundary: SectionBoundary::new(header_line.clone()).excluding("Line protocol"),
        ipv6_boundary: SectionBoundary::new(header_line)
            .excluding("Line protocol")
            .excluding("IPv6 protocol"),
        protocol: compile(r"(?m)Line protocol current state\W+(.+)$"),
        mac_address: compile(r"(?mi)hardware address(?: is)?\W+(\S+)"),
        speed: compile(r"(?m)^\s*Speed\W+(\d+|\w+)"),
        description: compile(r"(?m)^\s*Description\W+(.*)$"),

        unicast: compile(r"Unicast:\s+(\d+)|(\d+)\s+unicast"),
        multicast: compile(r"Multicast:\s+(\d+)|(\d+)\s+multicast"),
        broadcast: compile(r"Broadcast:\s+(\d+)|(\d+)\s+broadcast"),
        discards: compile(r"Discard:\s+(\d+)|(\d+)\s+discard"),
        errors: compile(r"Total Error:\s+(\d+)|(\d+)\s+errors"),
        rx_octets: compile(r"Input.+\s+(\d+)\sbytes|Input:.+,(\d+)\sbytes"),
        tx_octets: compile(r"Output.+\s+(\d+)\sbytes|Output:.+,(\d+)\sbytes"),

        ipv4_address: compile(r"Internet Address is\s+(\d+\.\d+\.\d+\.\d+)/(\d+)"),
        ipv6_address: compile(r"(\S+), subnet is.+/(\d+)"),

        lldp_row: compile(r"(?m)^(\S+)[ \t]+(\S+)[ \t]+(\S+)[ \t]+(\S+)[ \t]*$"),
        arp_row: compile(
            r"(?m)^(\d+\.\d+\.\d+\.\d+)[ \t]+([0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4})[ \t]+(\S+)[ \t]+(\S+)[ \t]+(\S+)[ \t]+([A-Z]+)[ \t]*$",
        ),
        mac_row: compile(
            r"(?m)^([0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4})[ \t]+(\d+)[ \t]+(Config \w+|\S+)[ \t]+(\S+)[ \t]+(\S+)[ \t]*$",
        ),

        ping_transmitted: compile(r"(\d+)\D+transmitted"),
        ping_received: compile(r"(\d+)\D+received"),
        ping_rtt: compile(r"min/avg/max(?:/std-dev)? = ([\d.]+)/([\d.]+)/([\d.]+)(?:/([\d.]+))?"),
        ping_reply: compile(r"time=([\d.]+)"),
    }
});
