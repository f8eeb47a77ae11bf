// 🔤 Label Normalization
// Matching keys for the classifier and display labels for provider field names

/// Canonical matching key for a line-item label.
///
/// Lower-cases, collapses every run of characters outside `[a-z0-9]` into a
/// single space and trims. The original label is kept for display.
pub fn normalize(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_space = false;

    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Turn a provider field name into a display label.
///
/// `costOfRevenue` → `Cost Of Revenue`, `sellingGeneral_and-Admin` →
/// `Selling General And Admin`, `EBITDA` → `Ebitda`.
pub fn prettify_label(key: &str) -> String {
    let chars: Vec<char> = key
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();

    // Split camelCase (aB) and acronym boundaries (ABc -> A Bc)
    let mut spaced = String::with_capacity(chars.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                spaced.push(' ');
            }
        }
        spaced.push(c);
    }

    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Upper-case the first letter of every word, lower-case the rest.
/// A letter that follows a non-letter starts a new word.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
