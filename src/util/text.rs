// Text normalization for cell contents scraped off the appraisal pages.

pub fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        // &nbsp; shows up all over the county tables
        if ch.is_whitespace() || ch == '\u{a0}' {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}

/// Word-initial capitals, everything else lowercase. A letter counts as
/// word-initial when the previous char is not a letter, so "1ST STORY"
/// becomes "1St Story".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha { out.extend(ch.to_lowercase()); } else { out.extend(ch.to_uppercase()); }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Parses an area/count like "1,234", "1,234.00" or " 412 " into its integer part.
pub fn parse_area(s: &str) -> Option<u32> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    let int_part = cleaned.split('.').next().unwrap_or("");
    if int_part.is_empty() { return None; }
    int_part.parse().ok()
}

/// "1,234.00" -> "1,234"; anything else unchanged (trimmed).
pub fn strip_cents(s: &str) -> String {
    let t = s.trim();
    t.strip_suffix(".00").unwrap_or(t).trim().to_string()
}
