//! Terminal cell measurement for menu labels.

use std::path::PathBuf;

use dirs_next::home_dir;
use unicode_width::UnicodeWidthStr;

/// Display width of `text` in terminal cells, saturating at `u16::MAX`.
pub fn display_width(text: &str) -> u16 {
    u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX)
}

/// Width of a label rendered with `padding` blank cells on each side.
pub fn padded_width(text: &str, padding: u16) -> u16 {
    display_width(text).saturating_add(padding.saturating_mul(2))
}

/// Truncates `text` so it fits into `max_width` cells, appending an ellipsis
/// when anything was cut.
pub fn truncate_to_width(text: &str, max_width: u16) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = usize::from(max_width - 1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_glyphs_count_two_cells() {
        assert_eq!(display_width("Docs"), 4);
        assert_eq!(display_width("設定"), 4);
        assert_eq!(padded_width("Docs", 1), 6);
    }

    #[test]
    fn truncation_keeps_within_budget() {
        assert_eq!(truncate_to_width("Settings", 8), "Settings");
        assert_eq!(truncate_to_width("Settings", 5), "Sett…");
        assert_eq!(truncate_to_width("Settings", 0), "");
    }

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde(" /tmp/menubar.json "), PathBuf::from("/tmp/menubar.json"));
    }
}
