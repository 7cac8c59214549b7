//! Filesystem-safe filename sanitization.
//!
//! Produces names that are safe on Linux, macOS, and Windows alike: no path
//! separators, shell metacharacters, control or bidi-format characters, dot
//! runs, or reserved device names.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Default maximum length in characters.
pub const DEFAULT_MAX_LENGTH: usize = 100;

/// Returned when nothing usable is left.
pub const FALLBACK_NAME: &str = "unnamed";

/// Only an extension whose dot sits within this many trailing characters is
/// kept when truncating.
const EXTENSION_WINDOW: usize = 10;

const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
    "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

static DOT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.+").expect("static regex"));
static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("static regex"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("static regex"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").expect("static regex"));
/// Every "Other" category: control, format (bidi overrides, zero-width
/// marks), private-use, and unassigned code points.
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{C}").expect("static regex"));

/// Replacement for characters that are unsafe on common filesystems.
/// `None` keeps the character, `Some("")` drops it.
fn replacement(c: char) -> Option<&'static str> {
    match c {
        '/' | '\\' => Some("_"),
        ':' | '|' => Some("-"),
        '*' | '?' | '"' | '\'' | '<' | '>' | '`' | '$' | '\0' | '\r' => Some(""),
        '\n' | '\t' => Some(" "),
        _ => None,
    }
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '.')
}

fn is_windows_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or_default();
    WINDOWS_RESERVED
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
}

/// Sanitizes `name` for use as a single path component of at most
/// `max_length` characters. Returns `"unnamed"` if nothing usable remains.
///
/// The result is a fixed point: sanitizing it again with the same
/// `max_length` returns it unchanged.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    if name.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    // Composed first so that decompositions onto unsafe characters
    // (U+1FEF is a backtick) are caught below.
    let mut out = String::with_capacity(name.len());
    for c in name.nfc() {
        match replacement(c) {
            Some(r) => out.push_str(r),
            None => out.push(c),
        }
    }

    let out = INVISIBLE.replace_all(&out, "");
    let out = DOT_RUN.replace_all(&out, "");
    let out = DASH_RUN.replace_all(&out, "-");
    let out = UNDERSCORE_RUN.replace_all(&out, "_");
    let out = SPACE_RUN.replace_all(&out, " ");
    // Removal can leave a base letter next to a combining mark it was
    // separated from; compose again.
    let mut result: String = trim_edges(&out).nfc().collect();

    if is_windows_reserved(&result) {
        result.insert(0, '_');
    }

    if result.chars().count() > max_length {
        result = truncate_keeping_extension(&result, max_length);
        // Cutting "CONSOLE" short can land on a device name.
        if is_windows_reserved(&result) {
            result.insert(0, '_');
            if result.chars().count() > max_length {
                result = truncate_keeping_extension(&result, max_length);
            }
        }
    }

    if result.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        result
    }
}

fn truncate_keeping_extension(name: &str, max_length: usize) -> String {
    let total = name.chars().count();
    let window_start = name
        .char_indices()
        .nth(total.saturating_sub(EXTENSION_WINDOW))
        .map(|(i, _)| i)
        .unwrap_or(0);

    if let Some(dot) = name.rfind('.').filter(|&i| i >= window_start) {
        let (stem, ext) = (&name[..dot], &name[dot + 1..]);
        let ext_len = ext.chars().count();
        if ext_len + 1 < max_length {
            let stem: String = stem.chars().take(max_length - ext_len - 1).collect();
            let stem = trim_edges(&stem);
            if !stem.is_empty() {
                return format!("{stem}.{ext}");
            }
        }
    }

    let head: String = name.chars().take(max_length).collect();
    trim_edges(&head).to_string()
}
