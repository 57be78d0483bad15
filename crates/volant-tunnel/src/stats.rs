//! Parsing of `wg show` output into transfer statistics.
//!
//! The driver's human-readable dump is not a versioned contract, so parsing
//! is strictly best-effort: an unknown unit or a missing line yields zero or
//! empty values, never an error.

/// Structured counters extracted from a status dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Free-text handshake age, e.g. "32 seconds ago". Kept verbatim for
    /// display; empty when no handshake line was present.
    pub latest_handshake: String,
}

/// Parse a raw `wg show` dump. Tolerant of any input, including empty.
///
/// Looks for two line shapes:
///
/// ```text
/// transfer: 1.23 KiB received, 2.34 MiB sent
/// latest handshake: 32 seconds ago
/// ```
pub fn parse_transfer_stats(raw: &str) -> TransferStats {
    let mut stats = TransferStats::default();

    for line in raw.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("transfer:") {
            for clause in rest.split(',') {
                let clause = clause.trim();
                if clause.contains("received") {
                    stats.bytes_received = parse_size(clause);
                } else if clause.contains("sent") {
                    stats.bytes_sent = parse_size(clause);
                }
            }
        } else if let Some(rest) = line.strip_prefix("latest handshake:") {
            stats.latest_handshake = rest.trim().to_string();
        }
    }

    stats
}

/// Parse a size clause like "1.23 KiB received" into bytes.
/// Unknown or missing units yield 0.
fn parse_size(clause: &str) -> u64 {
    let trimmed = clause
        .replace("received", "")
        .replace("sent", "")
        .trim()
        .to_string();

    let mut fields = trimmed.split_whitespace();
    let (Some(number), Some(unit)) = (fields.next(), fields.next()) else {
        return 0;
    };

    let Ok(value) = number.parse::<f64>() else {
        return 0;
    };

    let multiplier: u64 = match unit {
        "B" => 1,
        "KiB" => 1024,
        "MiB" => 1024 * 1024,
        "GiB" => 1024 * 1024 * 1024,
        "TiB" => 1024_u64.pow(4),
        _ => return 0,
    };

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (value * multiplier as f64) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sent_and_received_clauses() {
        let stats = parse_transfer_stats("transfer: 2.00 MiB received, 1.50 KiB sent");
        assert_eq!(stats.bytes_received, 2_097_152);
        assert_eq!(stats.bytes_sent, 1536);
    }

    #[test]
    fn clause_order_does_not_matter() {
        let stats = parse_transfer_stats("transfer: 1.50 KiB sent, 2.00 MiB received");
        assert_eq!(stats.bytes_sent, 1536);
        assert_eq!(stats.bytes_received, 2_097_152);
    }

    #[test]
    fn converts_all_units_by_powers_of_1024() {
        let cases = [
            ("1 B", 1),
            ("1 KiB", 1024),
            ("1 MiB", 1024 * 1024),
            ("1 GiB", 1024 * 1024 * 1024),
            ("1 TiB", 1024_u64.pow(4)),
        ];
        for (size, expected) in cases {
            let stats = parse_transfer_stats(&format!("transfer: {size} received, 0 B sent"));
            assert_eq!(stats.bytes_received, expected, "unit case {size}");
        }
    }

    #[test]
    fn unknown_unit_yields_zero() {
        let stats = parse_transfer_stats("transfer: 3.14 PiB received, 1 blobs sent");
        assert_eq!(stats.bytes_received, 0);
        assert_eq!(stats.bytes_sent, 0);
    }

    #[test]
    fn captures_handshake_verbatim() {
        let raw = "interface: volant0\n  latest handshake: 1 minute, 3 seconds ago\n";
        let stats = parse_transfer_stats(raw);
        assert_eq!(stats.latest_handshake, "1 minute, 3 seconds ago");
    }

    #[test]
    fn handshake_never_is_kept_as_display_text() {
        let stats = parse_transfer_stats("latest handshake: never");
        assert_eq!(stats.latest_handshake, "never");
    }

    #[test]
    fn degrades_gracefully_on_malformed_input() {
        for raw in ["", "garbage\nlines\n", "transfer:", "transfer: ,,,", "transfer: sent"] {
            let stats = parse_transfer_stats(raw);
            assert_eq!(stats.bytes_sent, 0, "input {raw:?}");
            assert_eq!(stats.bytes_received, 0, "input {raw:?}");
            assert!(stats.latest_handshake.is_empty(), "input {raw:?}");
        }
    }

    #[test]
    fn parses_full_wg_show_dump() {
        let raw = "interface: volant0\n\
                   \x20 public key: abc123=\n\
                   \x20 listening port: 51820\n\
                   \n\
                   peer: def456=\n\
                   \x20 endpoint: 1.2.3.4:51820\n\
                   \x20 allowed ips: 0.0.0.0/0\n\
                   \x20 latest handshake: 32 seconds ago\n\
                   \x20 transfer: 128.50 KiB received, 42.00 KiB sent\n";
        let stats = parse_transfer_stats(raw);
        assert_eq!(stats.bytes_received, 131_584);
        assert_eq!(stats.bytes_sent, 43_008);
        assert_eq!(stats.latest_handshake, "32 seconds ago");
    }
}
