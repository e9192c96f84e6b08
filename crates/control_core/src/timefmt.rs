use chrono::{DateTime, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%b %-d, %Y %H:%M:%S";
const BARE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Renders a module-supplied timestamp for display, e.g.
/// `"2026-01-23T19:53:46"` becomes `"Jan 23, 2026 19:53:46"`. Accepts
/// RFC 3339 (sub-second/zone suffix allowed) or the bare
/// `yyyy-MM-ddTHH:mm:ss` pattern; anything unparseable is returned
/// unchanged. Empty in, empty out.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_local().format(DISPLAY_FORMAT).to_string();
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, BARE_PATTERN) {
        return parsed.format(DISPLAY_FORMAT).to_string();
    }

    raw.to_string()
}

#[cfg(test)]
#[path = "tests/timefmt_tests.rs"]
mod tests;
