//! Picking and trimming display labels.

/// Pick the representative item name.
///
/// Priority: first name containing a keyword (case-insensitive) > first
/// non-empty name > None.
pub fn derive_label(candidates: &[String], keywords: &[String]) -> Option<String> {
    let names: Vec<&str> = candidates
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();

    let keyword_hit = names.iter().find(|name| {
        let lower = name.to_lowercase();
        keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
    });

    keyword_hit.or(names.first()).map(|name| name.to_string())
}

/// Limit a label to `max_chars` characters, ending in "..." when cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
