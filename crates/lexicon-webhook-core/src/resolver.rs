//! Zone and challenge record name resolution
//!
//! cert-manager hands the solver a fully-qualified challenge name
//! (`_acme-challenge.www.example.com.`) and the zone it resolved through SOA
//! lookups (`example.com.`). lexicon wants the zone plus a name relative to
//! it, so this module strips trailing dots, removes the zone suffix and makes
//! sure the result sits under `_acme-challenge`.

use crate::error::{Error, Result};

/// Leading label of every DNS-01 challenge record
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// Pick the zone to operate on
///
/// The issuer's `zoneName` override wins over the zone cert-manager resolved.
/// Both are returned without a trailing dot.
///
/// # Errors
///
/// Returns a configuration error when neither source yields a zone.
pub fn resolve_zone(zone_override: Option<&str>, resolved_zone: &str) -> Result<String> {
    let zone = zone_override
        .map(trim_dot)
        .filter(|z| !z.is_empty())
        .unwrap_or_else(|| trim_dot(resolved_zone));

    if zone.is_empty() {
        return Err(Error::config(
            "could not determine zone (config.zoneName or resolvedZone)",
        ));
    }
    Ok(zone.to_string())
}

/// Name of `fqdn` relative to `zone`
///
/// - `fqdn == zone` → empty string (zone apex)
/// - `fqdn` ends in `.zone` → the part before the suffix
/// - otherwise `fqdn` unchanged (minus a trailing dot)
pub fn relative_record_name(fqdn: &str, zone: &str) -> String {
    let fqdn = trim_dot(fqdn);
    let zone = trim_dot(zone);

    if zone.is_empty() {
        return fqdn.to_string();
    }
    if fqdn.eq_ignore_ascii_case(zone) {
        return String::new();
    }

    // ".zone" suffix, compared without allocating
    let split = fqdn.len().checked_sub(zone.len() + 1);
    if let Some(split) = split
        && fqdn.is_char_boundary(split)
        && fqdn.as_bytes()[split] == b'.'
        && fqdn[split + 1..].eq_ignore_ascii_case(zone)
    {
        return trim_dot(&fqdn[..split]).to_string();
    }

    fqdn.to_string()
}

/// Zone-relative TXT record name for a challenge
///
/// The result always starts with `_acme-challenge`. Only the leading label is
/// inspected: `foo._acme-challenge` is not recognised as prefixed and becomes
/// `_acme-challenge.foo._acme-challenge`.
pub fn record_name_for_challenge(fqdn: &str, zone: &str) -> String {
    let rel = relative_record_name(fqdn, zone);
    let rel = trim_dot(&rel);

    if rel.is_empty() {
        return ACME_CHALLENGE_LABEL.to_string();
    }

    if has_challenge_prefix(rel) {
        return rel.to_string();
    }

    format!("{}.{}", ACME_CHALLENGE_LABEL, rel)
}

fn has_challenge_prefix(name: &str) -> bool {
    name == ACME_CHALLENGE_LABEL
        || name
            .strip_prefix(ACME_CHALLENGE_LABEL)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn trim_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
