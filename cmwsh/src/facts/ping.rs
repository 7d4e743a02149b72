//! Ping command construction and result parsing.

use serde::Serialize;

use super::patterns::PATTERNS;
use crate::error::FormatError;
use crate::parse::{Fields, parse_number};

/// Ping parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingOptions {
    /// Source address, device default when `None`.
    pub source: Option<String>,
    /// Seconds to wait for each reply.
    pub timeout: u32,
    /// Payload size in bytes.
    pub size: u32,
    /// Number of echo requests.
    pub count: u32,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            source: None,
            timeout: 2,
            size: 100,
            count: 5,
        }
    }
}

impl PingOptions {
    /// The device command pinging `destination`.
    pub fn command(&self, destination: &str) -> String {
        let mut command = format!(
            "ping -t {} -s {} -c {}",
            u64::from(self.timeout) * 1000,
            self.size,
            self.count
        );
        if let Some(source) = self.source.as_deref().filter(|s| !s.is_empty()) {
            command.push_str(&format!(" -a {}", source));
        }
        command.push(' ');
        command.push_str(destination);
        command
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingReply {
    pub ip_address: String,
    pub rtt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingSuccess {
    pub probes_sent: u32,
    pub packet_loss: u32,
    pub rtt_min: f64,
    pub rtt_max: f64,
    pub rtt_avg: f64,
    pub rtt_stddev: f64,
    pub results: Vec<PingReply>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PingResult {
    Success(PingSuccess),
    /// The device refused the ping; carries its output.
    Error(String),
}

/// Parse ping output for `destination`.
pub fn parse_ping(output: &str, destination: &str) -> Result<PingResult, FormatError> {
    if output.contains("Error") {
        return Ok(PingResult::Error(output.to_string()));
    }

    let fields = Fields::new(output);
    let sent: u32 = parse_number(
        fields.required(&PATTERNS.ping_transmitted, "transmitted")?,
        "transmitted",
    )?;
    let received: u32 = parse_number(
        fields.required(&PATTERNS.ping_received, "received")?,
        "received",
    )?;

    let mut success = PingSuccess {
        probes_sent: sent,
        packet_loss: sent.saturating_sub(received),
        rtt_min: 0.0,
        rtt_max: 0.0,
        rtt_avg: 0.0,
        rtt_stddev: 0.0,
        results: Vec::new(),
    };

    if let Some(caps) = PATTERNS.ping_rtt.captures(output) {
        let rtt = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        success.rtt_min = rtt(1);
        success.rtt_avg = rtt(2);
        success.rtt_max = rtt(3);
        success.rtt_stddev = rtt(4);

        success.results = PATTERNS
            .ping_reply
            .captures_iter(output)
            .filter_map(|caps| caps[1].parse::<f64>().ok())
            .map(|rtt| PingReply {
                ip_address: destination.to_string(),
                rtt,
            })
            .collect();
    }

    Ok(PingResult::Success(success))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING_OK: &str = "\
Ping 10.0.0.1 (10.0.0.1): 100 data bytes, press CTRL_C to break
108 bytes from 10.0.0.1: icmp_seq=0 ttl=255 time=1.000 ms
108 bytes from 10.0.0.1: icmp_seq=1 ttl=255 time=2.000 ms
Request time out

--- Ping statistics for 10.0.0.1 ---
3 packet(s) transmitted, 2 packet(s) received, 33.3% packet loss
round-trip min/avg/max/std-dev = 1.000/1.500/2.000/0.500 ms";

    #[test]
    fn test_command() {
        assert_eq!(
            PingOptions::default().command("10.0.0.1"),
            "ping -t 2000 -s 100 -c 5 10.0.0.1"
        );

        let options = PingOptions {
            source: Some("10.0.0.254".to_string()),
            count: 3,
            ..PingOptions::default()
        };
        assert_eq!(
            options.command("10.0.0.1"),
            "ping -t 2000 -s 100 -c 3 -a 10.0.0.254 10.0.0.1"
        );
    }

    #[test]
    fn test_parse_success() {
        let PingResult::Success(result) = parse_ping(PING_OK, "10.0.0.1").unwrap() else {
            panic!("expected success");
        };
        assert_eq!(result.probes_sent, 3);
        assert_eq!(result.packet_loss, 1);
        assert_eq!(result.rtt_min, 1.0);
        assert_eq!(result.rtt_avg, 1.5);
        assert_eq!(result.rtt_max, 2.0);
        assert_eq!(result.rtt_stddev, 0.5);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[1].rtt, 2.0);
        assert_eq!(result.results[0].ip_address, "10.0.0.1");
    }

    #[test]
    fn test_parse_all_lost() {
        let output = "\
Ping 10.9.9.9 (10.9.9.9): 100 data bytes, press CTRL_C to break
Request time out
--- Ping statistics for 10.9.9.9 ---
1 packet(s) transmitted, 0 packet(s) received, 100.0% packet loss";
        let PingResult::Success(result) = parse_ping(output, "10.9.9.9").unwrap() else {
            panic!("expected success");
        };
        assert_eq!(result.packet_loss, 1);
        assert!(result.results.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let output = "Error: Failed to resolve host name nowhere.";
        assert!(matches!(
            parse_ping(output, "nowhere").unwrap(),
            PingResult::Error(text) if text.contains("resolve")
        ));
    }

    #[test]
    fn test_missing_counts_is_format_error() {
        let err = parse_ping("% Incomplete command found at '^' position.", "x").unwrap_err();
        assert!(matches!(err, FormatError::MissingField { field: "transmitted", .. }));
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(PingResult::Error("boom".to_string())).unwrap();
        assert_eq!(json["error"], "boom");
    }
}
