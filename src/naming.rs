//! Name normalization between the source model's `:`-segmented names and the
//! target database's dotted predicates and PascalCase type names.
//!
//! Pure functions with no state and no failure modes.

/// Namespace separator in source names.
pub const NAMESPACE_SEP: char = ':';

/// `inet:dns:a.fqdn` → `inet.dns.a.fqdn`.
///
/// A doubled separator collapses to `._` so that a reserved nested property
/// keeps its own predicate: `file:bytes..seen` → `file.bytes._seen`.
pub fn to_predicate(name: &str) -> String {
    let dotted = name
        .split(NAMESPACE_SEP)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".");
    dotted.replace("..", "._")
}

/// `inet:dns:a` → `InetDnsA`.
pub fn to_type_name(name: &str) -> String {
    name.split(NAMESPACE_SEP).map(title_case).collect()
}

/// `inet:dns:a.fqdn` → `inet_dns_a_fqdn`.
pub fn to_snake(name: &str) -> String {
    name.replace('.', "_")
        .split(NAMESPACE_SEP)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// `InetIPv4` → `inet:ipv4`.
///
/// Splits at capitals. `IP` is the one acronym kept whole.
pub fn to_source_name(identifier: &str) -> String {
    let normalized = identifier.replace("IP", "Ip");
    let mut segments: Vec<String> = Vec::new();
    for ch in normalized.chars() {
        match segments.last_mut() {
            Some(seg) if !ch.is_uppercase() => seg.extend(ch.to_lowercase()),
            _ => segments.push(ch.to_lowercase().collect()),
        }
    }
    segments.join(":")
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut in_word = false;
    for ch in segment.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
