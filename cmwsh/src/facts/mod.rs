//! Structured facts parsed from Comware command output.
//!
//! Every reader is a pure function over command text; [`ComwareDevice`](crate::device::ComwareDevice)
//! issues the commands and hands the output over. Records have every field
//! present, with fixed sentinels for values the device did not report.

mod interfaces;
mod patterns;
mod ping;
mod system;
mod tables;

pub use interfaces::{
    Interface, InterfaceAddresses, InterfaceCounters, parse_addresses, parse_counters,
    parse_interfaces,
};
pub use ping::{PingOptions, PingReply, PingResult, PingSuccess, parse_ping};
pub use system::{DeviceFacts, FactsOutput};
pub use tables::{
    ArpEntry, LldpNeighbor, MacEntry, parse_arp_table, parse_lldp_neighbors,
    parse_mac_address_table,
};
