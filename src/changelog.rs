//! Changelog maintenance.
//!
//! Entries are kept newest-first. A new entry goes directly after the
//! header block of an existing changelog, or a fresh document is
//! synthesized around it when the file has no changelog heading.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::Version;

static CHANGELOG_HEADING: OnceLock<Regex> = OnceLock::new();
static ENTRY_HEADING: OnceLock<Regex> = OnceLock::new();

pub const DEFAULT_HEADING: &str = "# Changelog";
pub const DEFAULT_DESCRIPTION: &str =
    "> All notable changes to this project are documented in this file, newest first.";
const ENTRY_INTRO: &str = "Changes included in this release:";
const EMPTY_BODY: &str = "No release notes were provided.";

/// Render the entry block for one release.
///
/// The block ends with a horizontal rule followed by a blank line.
pub fn render_entry(version: &Version, body: &str, url: Option<&str>) -> String {
    let body = body.trim();
    let body = if body.is_empty() { EMPTY_BODY } else { body };

    let mut entry = format!("# v{}\n\n{}\n\n{}\n\n", version, ENTRY_INTRO, body);
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        entry.push_str(&format!("[Pull request]({})\n\n", url.trim()));
    }
    entry.push_str("---\n\n");
    entry
}

/// Merge a new release entry into existing changelog text
pub fn merge_entry(existing: &str, version: &Version, body: &str, url: Option<&str>) -> String {
    splice(existing, &render_entry(version, body, url))
}

/// Insert a rendered entry into existing changelog text.
///
/// Prior content is kept byte-for-byte.
pub fn splice(existing: &str, entry: &str) -> String {
    if !has_changelog_heading(existing) {
        return synthesize(existing, entry);
    }

    let offset = header_end_offset(existing);
    let mut merged = String::with_capacity(existing.len() + entry.len() + 1);
    merged.push_str(&existing[..offset]);
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    merged.push_str(entry);
    merged.push_str(&existing[offset..]);
    merged
}

fn synthesize(existing: &str, entry: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}{}",
        DEFAULT_HEADING, DEFAULT_DESCRIPTION, entry, existing
    )
}

fn has_changelog_heading(text: &str) -> bool {
    CHANGELOG_HEADING
        .get_or_init(|| {
            Regex::new(r"(?mi)^#[ \t]+change[ \t]?log\b").expect("CHANGELOG_HEADING should be valid")
        })
        .is_match(text)
}

/// Byte offset where the header block ends.
///
/// The header is line 0 plus following blank, heading or comment lines; it
/// stops at the first release entry heading or the first line of plain text.
fn header_end_offset(text: &str) -> usize {
    let entry_heading = ENTRY_HEADING.get_or_init(|| {
        Regex::new(r"^#{1,2}[ \t]+\[?v?[0-9]+\.[0-9]+\.[0-9]+").expect("ENTRY_HEADING should be valid")
    });

    let mut offset = 0;
    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(['\n', '\r']).trim_start();
        if index > 0 && !line.is_empty() {
            let header_line =
                line.starts_with('#') || line.starts_with("<!--") || line.starts_with('>');
            if entry_heading.is_match(line) || !header_line {
                return offset;
            }
        }
        offset += raw.len();
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIOR_ENTRY: &str = "# v1.1.0\n\nChanges included in this release:\n\nFixed invoices.\n\n---\n\n";

    #[test]
    fn test_render_entry_with_link() {
        let entry = render_entry(
            &Version::new(1, 2, 0),
            "Adds exports.",
            Some("https://github.com/acme/billing/pull/42"),
        );
        assert_eq!(
            entry,
            "# v1.2.0\n\nChanges included in this release:\n\nAdds exports.\n\n\
             [Pull request](https://github.com/acme/billing/pull/42)\n\n---\n\n"
        );
    }

    #[test]
    fn test_render_entry_empty_body_uses_placeholder() {
        let entry = render_entry(&Version::new(1, 2, 0), "   \n", None);
        assert!(entry.contains(EMPTY_BODY));
        assert!(!entry.contains("[Pull request]"));
        assert!(entry.ends_with("---\n\n"));
    }

    #[test]
    fn test_splice_places_entry_after_header_before_prior_entry() {
        let existing = format!("# Changelog\n\n{}", PRIOR_ENTRY);
        let merged = merge_entry(&existing, &Version::new(1, 2, 0), "Adds exports.", None);

        let new_at = merged.find("# v1.2.0").unwrap();
        let old_at = merged.find("# v1.1.0").unwrap();
        assert!(merged.starts_with("# Changelog\n\n# v1.2.0"));
        assert!(new_at < old_at);
        assert!(merged.ends_with(PRIOR_ENTRY));
    }

    #[test]
    fn test_splice_keeps_header_comments_and_description() {
        let existing = format!(
            "# Changelog\n\n{}\n<!-- generated -->\n\n{}",
            DEFAULT_DESCRIPTION, PRIOR_ENTRY
        );
        let merged = merge_entry(&existing, &Version::new(2, 0, 0), "Big one.", None);
        let expected_header = format!("# Changelog\n\n{}\n<!-- generated -->\n\n", DEFAULT_DESCRIPTION);
        assert!(merged.starts_with(&format!("{}# v2.0.0", expected_header)));
        assert!(merged.ends_with(PRIOR_ENTRY));
    }

    #[test]
    fn test_splice_stops_at_plain_text() {
        let existing = "# Changelog\n\nHand-written notes.\n";
        let merged = merge_entry(existing, &Version::new(1, 0, 0), "First.", None);
        assert!(merged.starts_with("# Changelog\n\n# v1.0.0"));
        assert!(merged.ends_with("---\n\nHand-written notes.\n"));
    }

    #[test]
    fn test_splice_header_only_appends() {
        let merged = merge_entry("# CHANGELOG", &Version::new(1, 0, 0), "First.", None);
        assert!(merged.starts_with("# CHANGELOG\n# v1.0.0\n"));
    }

    #[test]
    fn test_splice_without_heading_synthesizes_document() {
        let prior = "Some old notes\nwithout a heading\n";
        let merged = merge_entry(prior, &Version::new(1, 2, 0), "Adds exports.", None);
        assert!(merged.starts_with(&format!(
            "{}\n\n{}\n\n# v1.2.0",
            DEFAULT_HEADING, DEFAULT_DESCRIPTION
        )));
        assert!(merged.ends_with(prior));
    }

    #[test]
    fn test_splice_empty_changelog() {
        let merged = merge_entry("", &Version::new(0, 1, 0), "", None);
        assert!(merged.starts_with(DEFAULT_HEADING));
        assert!(merged.contains("# v0.1.0"));
    }

    #[test]
    fn test_synthesized_document_accepts_next_entry_at_top() {
        let first = merge_entry("", &Version::new(1, 0, 0), "First.", None);
        let second = merge_entry(&first, &Version::new(1, 1, 0), "Second.", None);
        let newer = second.find("# v1.1.0").unwrap();
        let older = second.find("# v1.0.0").unwrap();
        assert!(newer < older);
        assert!(second.contains(DEFAULT_DESCRIPTION));
        assert!(second.find(DEFAULT_DESCRIPTION).unwrap() < newer);
    }

    #[test]
    fn test_splice_handles_crlf_lines() {
        let existing = "# Changelog\r\n\r\n## [1.0.0] - 2024-01-01\r\n- init\r\n";
        let merged = merge_entry(existing, &Version::new(1, 1, 0), "More.", None);
        assert!(merged.starts_with("# Changelog\r\n\r\n# v1.1.0"));
        assert!(merged.ends_with("## [1.0.0] - 2024-01-01\r\n- init\r\n"));
    }
}
