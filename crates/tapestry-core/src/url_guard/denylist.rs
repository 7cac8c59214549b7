//! Literal hostname denylist for private, loopback, and link-local targets.
//!
//! Rules are matched against the hostname exactly as the URL parser produced
//! it; no DNS lookups happen here.

/// How a rule compares against a lowercase hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPattern {
    /// Whole-value match.
    Exact(&'static str),
    /// Hostname starts with the given text.
    Prefix(&'static str),
    /// `prefix`, then a decimal octet within `lo..=hi`, then a dot.
    OctetRange {
        prefix: &'static str,
        lo: u8,
        hi: u8,
    },
}

impl HostPattern {
    pub fn matches(&self, host: &str) -> bool {
        match *self {
            HostPattern::Exact(value) => host == value,
            HostPattern::Prefix(prefix) => host.starts_with(prefix),
            HostPattern::OctetRange { prefix, lo, hi } => {
                let Some(rest) = host.strip_prefix(prefix) else {
                    return false;
                };
                let Some((octet, _)) = rest.split_once('.') else {
                    return false;
                };
                if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
                    return false;
                }
                octet
                    .parse::<u8>()
                    .map(|n| (lo..=hi).contains(&n))
                    .unwrap_or(false)
            }
        }
    }
}

/// One denylist entry: a pattern and the address range it stands for.
#[derive(Debug, Clone, Copy)]
pub struct DenyRule {
    pub pattern: HostPattern,
    pub covers: &'static str,
}

/// Ordered denylist. New ranges are added here, not in the validator.
pub const DENYLIST: &[DenyRule] = &[
    DenyRule {
        pattern: HostPattern::Exact("localhost"),
        covers: "loopback name",
    },
    DenyRule {
        pattern: HostPattern::Prefix("127."),
        covers: "127.0.0.0/8",
    },
    DenyRule {
        pattern: HostPattern::Prefix("10."),
        covers: "10.0.0.0/8",
    },
    DenyRule {
        pattern: HostPattern::OctetRange {
            prefix: "172.",
            lo: 16,
            hi: 31,
        },
        covers: "172.16.0.0/12",
    },
    DenyRule {
        pattern: HostPattern::Prefix("192.168."),
        covers: "192.168.0.0/16",
    },
    DenyRule {
        pattern: HostPattern::Exact("0.0.0.0"),
        covers: "unspecified IPv4",
    },
    DenyRule {
        pattern: HostPattern::Exact("[::1]"),
        covers: "IPv6 loopback",
    },
    DenyRule {
        pattern: HostPattern::Prefix("[fe80:"),
        covers: "IPv6 link-local",
    },
    DenyRule {
        pattern: HostPattern::Prefix("169.254."),
        covers: "169.254.0.0/16 link-local",
    },
    DenyRule {
        pattern: HostPattern::Prefix("fc00:"),
        covers: "IPv6 unique-local",
    },
    DenyRule {
        pattern: HostPattern::Prefix("fd00:"),
        covers: "IPv6 unique-local",
    },
];

/// Returns the first rule blocking `host`, if any.
///
/// Matching is case-insensitive. Bracketed IPv6 hosts are also tried without
/// their brackets so the bare `fc00:`/`fd00:` prefixes apply.
pub fn blocked_by(host: &str) -> Option<&'static DenyRule> {
    let host = host.to_ascii_lowercase();
    let bare = host.strip_prefix('[').and_then(|h| h.strip_suffix(']'));
    DENYLIST.iter().find(|rule| {
        rule.pattern.matches(&host) || bare.is_some_and(|b| rule.pattern.matches(b))
    })
}
