/// Normalize a player's display name into a URL-safe grouping key.
///
/// Lowercases, drops everything outside `[a-z0-9]`, whitespace and `-`, then
/// folds whitespace and hyphen runs into single hyphens. Distinct names that
/// normalize identically share one slug.
pub fn player_slug(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            prev_dash = false;
        } else if (ch.is_whitespace() || ch == '-') && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// Title-case a slug for display when no catalog name exists: the first
/// letter of every alphabetic run is uppercased.
pub fn title_case(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;
    for ch in slug.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
