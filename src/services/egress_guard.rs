//! Outbound webhook egress safety policy.
//!
//! Every webhook URL is validated before any network call so automations
//! cannot be used to probe loopback, private, or link-local address space.
//! This is stricter than generic URL validation on purpose: it defends the
//! engine's egress path specifically.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

use crate::domain::errors::{DomainError, DomainResult};

/// Validate a user-supplied webhook destination. Returns the parsed URL on
/// success so callers never re-parse.
pub fn validate_egress_url(raw: &str) -> DomainResult<Url> {
    let url = Url::parse(raw).map_err(|e| blocked(format!("invalid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(blocked(format!("scheme '{other}' is not allowed"))),
    }

    match url.host() {
        None => Err(blocked("URL has no host")),
        Some(Host::Ipv4(addr)) => check_ipv4(addr),
        Some(Host::Ipv6(addr)) => check_ipv6(addr),
        Some(Host::Domain(domain)) => check_domain(domain),
    }?;

    Ok(url)
}

fn blocked(reason: impl Into<String>) -> DomainError {
    DomainError::EgressBlocked(reason.into())
}

fn check_ipv4(addr: Ipv4Addr) -> DomainResult<()> {
    if addr.is_private()
        || addr.is_loopback()
        || addr.is_link_local()
        || addr.is_unspecified()
        || addr.is_broadcast()
    {
        return Err(blocked(format!("address {addr} is not publicly routable")));
    }
    Ok(())
}

fn check_ipv6(addr: Ipv6Addr) -> DomainResult<()> {
    if addr.is_loopback() || addr.is_unspecified() {
        return Err(blocked(format!("address {addr} is not publicly routable")));
    }
    // IPv4-mapped (::ffff:a.b.c.d) addresses are rejected outright rather
    // than range-checked: mapped forms exist to smuggle v4 targets past
    // v6-only checks.
    if addr.to_ipv4_mapped().is_some() {
        return Err(blocked(format!("IPv4-mapped address {addr} is not allowed")));
    }
    let segments = addr.segments();
    // fe80::/10 link-local
    if (segments[0] & 0xffc0) == 0xfe80 {
        return Err(blocked(format!("link-local address {addr} is not allowed")));
    }
    // fc00::/7 unique-local (covers fd00::/8)
    if (segments[0] & 0xfe00) == 0xfc00 {
        return Err(blocked(format!("unique-local address {addr} is not allowed")));
    }
    Ok(())
}

fn check_domain(domain: &str) -> DomainResult<()> {
    let host = domain.trim_matches(|c| c == '[' || c == ']').to_ascii_lowercase();

    if host == "localhost" || host.ends_with(".localhost") {
        return Err(blocked("localhost is not allowed"));
    }
    if host.ends_with(".internal") || host.ends_with(".local") {
        return Err(blocked(format!("host '{host}' resolves to an internal zone")));
    }
    // Unique-local IPv6 literal that arrived as a raw string. The colon
    // requirement keeps ordinary domains that merely start with the letters
    // "fd" (e.g. fdic.gov) routable.
    if host.starts_with("fd") && host.contains(':') {
        return Err(blocked(format!("unique-local address {host} is not allowed")));
    }
    if host.contains(':') {
        // Any other IPv6-looking string the parser did not canonicalize:
        // parse and range-check, rejecting on failure.
        return match host.parse::<Ipv6Addr>() {
            Ok(addr) => check_ipv6(addr),
            Err(_) => Err(blocked(format!("unparseable IPv6 host '{host}'"))),
        };
    }
    if is_obfuscated_ipv4(&host) {
        return Err(blocked(format!(
            "obfuscated IPv4 literal '{host}' is not allowed"
        )));
    }
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return check_ipv4(addr);
    }
    Ok(())
}

/// Numeric hosts in hex/octal or non-dotted-quad form ("0x7f.1",
/// "017700000001"). The URL parser canonicalizes these for http(s) URLs;
/// this also covers hosts handed in as raw strings.
fn is_obfuscated_ipv4(host: &str) -> bool {
    let segments: Vec<&str> = host.split('.').collect();
    if segments.is_empty() || segments.len() > 4 {
        return false;
    }
    let all_numeric = segments.iter().all(|s| {
        if let Some(hex) = s.strip_prefix("0x") {
            !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
        } else {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
        }
    });
    if !all_numeric {
        return false;
    }
    // Canonical dotted-decimal is handled by the Ipv4Addr range check; flag
    // everything else (hex segments, octal leading zeros, packed forms).
    host.parse::<Ipv4Addr>().is_err()
        || segments
            .iter()
            .any(|s| s.starts_with("0x") || (s.len() > 1 && s.starts_with('0')))
}
