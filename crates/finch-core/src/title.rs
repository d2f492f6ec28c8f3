//! Local title inference for untitled sessions.
//!
//! The first user message of a session becomes its title: whitespace is
//! collapsed, the text is lowercased, truncated to 60 characters preferring
//! the last space boundary at or after position 30, and the first letter is
//! capitalized. The server may later assign its own title; this one is
//! cosmetic and never rolled back.

/// Maximum inferred title length in characters.
pub const MAX_TITLE_LEN: usize = 60;

/// A space boundary before this position is too aggressive a cut.
pub const MIN_BREAK_POS: usize = 30;

/// Whether a session title should be replaced by an inferred one.
///
/// Absent, blank, and the literal placeholder "new chat" (any case) all
/// count as placeholders.
pub fn is_placeholder(title: Option<&str>) -> bool {
    match title {
        None => true,
        Some(t) => {
            let t = t.trim();
            t.is_empty() || t.eq_ignore_ascii_case("new chat")
        }
    }
}

/// Infers a display title from the first user message.
///
/// Returns `None` when the message is empty or whitespace-only.
pub fn infer_title(first_message: &str) -> Option<String> {
    let collapsed = first_message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() {
        return None;
    }

    let lowered = collapsed.to_lowercase();
    let truncated = if lowered.chars().count() > MAX_TITLE_LEN {
        let prefix: String = lowered.chars().take(MAX_TITLE_LEN).collect();
        // The break position is measured in characters, not bytes.
        let break_at = prefix
            .char_indices()
            .enumerate()
            .filter(|(pos, (_, ch))| *ch == ' ' && *pos >= MIN_BREAK_POS)
            .map(|(_, (idx, _))| idx)
            .last();
        match break_at {
            Some(idx) => prefix[..idx].to_string(),
            None => prefix,
        }
    } else {
        lowered
    };

    let mut chars = truncated.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_message_breaks_at_space() {
        let message = "  what are YOUR transfer   limits please help me \
                       understand the fees involved today now  ";
        assert_eq!(
            infer_title(message).as_deref(),
            Some("What are your transfer limits please help me understand the")
        );
    }

    #[test]
    fn test_short_message_kept_whole() {
        assert_eq!(
            infer_title("How do I reset my PIN?").as_deref(),
            Some("How do i reset my pin?")
        );
    }

    #[test]
    fn test_no_late_space_hard_truncates() {
        // One unbroken token longer than the limit; no space at or after 30.
        let message = "a".repeat(80);
        let title = infer_title(&message).unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_LEN);
        assert!(title.starts_with('A'));
    }

    #[test]
    fn test_multibyte_prefix_counts_characters_not_bytes() {
        // The only space sits at character 28 (byte 56); it is before the
        // minimum break position and must not be used as a cut point.
        let message = format!("{} {}", "é".repeat(28), "b".repeat(40));
        let title = infer_title(&message).unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_LEN);
        assert!(title.starts_with('É'));
        assert!(!title.ends_with(' '));
    }

    #[test]
    fn test_blank_message_yields_none() {
        assert_eq!(infer_title(""), None);
        assert_eq!(infer_title("   \t  "), None);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(None));
        assert!(is_placeholder(Some("")));
        assert!(is_placeholder(Some("  ")));
        assert!(is_placeholder(Some("New chat")));
        assert!(is_placeholder(Some("NEW CHAT")));
        assert!(!is_placeholder(Some("Transfer limits")));
    }
}
