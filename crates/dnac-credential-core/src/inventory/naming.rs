//! Group name normalization

/// Location type the controller uses for buildings
pub const BUILDING: &str = "building";

/// Group name for a controller site
///
/// German umlauts and `ß` are transliterated, `( ) - .` and spaces become
/// `_`, the result is lowercased, and buildings get a `bld_` prefix.
pub fn normalize_site_name(name: &str, location_type: Option<&str>) -> String {
    let mut normalized = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match c {
            'ä' => normalized.push_str("ae"),
            'ü' => normalized.push_str("ue"),
            'ö' => normalized.push_str("oe"),
            'ß' => normalized.push_str("ss"),
            '(' | ')' | ' ' | '-' | '.' => normalized.push('_'),
            other => normalized.push(other),
        }
    }
    let normalized = normalized.to_lowercase();

    if location_type == Some(BUILDING) {
        format!("bld_{}", normalized)
    } else {
        normalized
    }
}

/// Group names the dynamic inventory format reserves
pub const RESERVED_GROUPS: [&str; 3] = ["all", "_meta", "ungrouped"];

/// Replace every character that is not alphanumeric or `_` with `_`
pub fn sanitize_group_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
