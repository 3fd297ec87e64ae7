use crate::value::Kind;

/// Suffix added to trails that were skipped rather than compared.
pub const SKIPPED: &str = " <skipped>";

/// Trail of struct field `field` below `trail`. At the root the struct
/// type name is used.
pub fn field(trail: &str, type_name: &str, field: &str) -> String {
    if trail.is_empty() {
        format!("{}.{}", type_name, field)
    } else {
        format!("{}.{}", trail, field)
    }
}

/// Trail of element `index` of an array or slice.
pub fn index(trail: &str, kind: Kind, index: usize) -> String {
    if !trail.is_empty() {
        return format!("{}[{}]", trail, index);
    }
    match kind {
        Kind::Array => format!("<array>[{}]", index),
        _ => format!("<slice>[{}]", index),
    }
}

/// Trail of the map entry whose key dumps as `key`.
pub fn key(trail: &str, key: &str) -> String {
    if trail.is_empty() {
        format!("map[{}]", key)
    } else if trail.ends_with(']') {
        format!("{}map[{}]", trail, key)
    } else {
        format!("{}[{}]", trail, key)
    }
}

/// `trail` marked as skipped.
pub fn skipped(trail: &str) -> String {
    format!("{}{}", trail, SKIPPED)
}
