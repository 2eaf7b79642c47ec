use crate::config::EvidenceConfig;
use crate::schema::{FieldPrediction, Span};
use crate::text::NoteText;

/// Appended to snippets cut at the display limit.
pub const ELLIPSIS: &str = "...";

/// Builds short, single-line, verbatim snippets around evidence spans.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceResolver {
    config: EvidenceConfig,
}

impl EvidenceResolver {
    pub fn new(config: EvidenceConfig) -> Self {
        Self { config }
    }

    /// Snippet for a prediction, or `None` when it carries no evidence.
    pub fn snippet(&self, note: &NoteText<'_>, prediction: &FieldPrediction) -> Option<String> {
        prediction.evidence.and_then(|span| self.resolve(note, span))
    }

    /// Context window around `span`, widened so it never starts or ends
    /// mid-word, with whitespace collapsed.
    pub fn resolve(&self, note: &NoteText<'_>, span: Span) -> Option<String> {
        let chars = note.chars();
        let n = chars.len();
        let span_end = span.end.min(n);
        let span_start = span.start.min(span_end);

        let mut start = span_start.saturating_sub(self.config.context_chars);
        let mut end = (span_end + self.config.context_chars).min(n);

        let left_limit = span_start.saturating_sub(self.config.max_extension_chars);
        while start > left_limit && start < n && chars[start].is_alphanumeric() {
            start -= 1;
        }

        let right_limit = (span_end + self.config.max_extension_chars).min(n);
        while end < right_limit && end > 0 && chars[end - 1].is_alphanumeric() {
            end += 1;
        }

        let snippet = collapse_whitespace(note.slice(Span::new(start, end)));
        if snippet.is_empty() {
            return None;
        }

        if snippet.chars().count() > self.config.max_len {
            let keep = self.config.max_len.saturating_sub(ELLIPSIS.len());
            let cut: String = snippet.chars().take(keep).collect();
            return Some(format!("{}{}", cut.trim_end(), ELLIPSIS));
        }

        Some(snippet)
    }
}

impl Default for EvidenceResolver {
    fn default() -> Self {
        Self::new(EvidenceConfig::default())
    }
}

/// Collapse every whitespace run (line breaks included) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `snippet` can be found verbatim in `note_text` once whitespace is
/// collapsed on both sides. A trailing truncation marker is not part of the
/// quoted text.
pub fn is_traceable(snippet: &str, note_text: &str) -> bool {
    let note = collapse_whitespace(note_text);
    let quoted = collapse_whitespace(snippet);
    if note.contains(&quoted) {
        return true;
    }
    quoted
        .strip_suffix(ELLIPSIS)
        .is_some_and(|head| note.contains(head.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resolve(text: &str, start: usize, end: usize) -> Option<String> {
        EvidenceResolver::default().resolve(&NoteText::new(text), Span::new(start, end))
    }

    #[test]
    fn test_does_not_cut_words() {
        let prefix = "x".repeat(30);
        let text = format!("{} the left breast mass measured 2 cm", prefix);
        let start = text.find("mass").unwrap();
        let snippet = resolve(&text, start, start + 4).unwrap();

        // base window starts 40 chars left, inside the run of x's
        assert!(snippet.starts_with(&prefix));
        assert!(snippet.ends_with("2 cm"));
    }

    #[test]
    fn test_extends_to_word_boundary_within_cap() {
        let text =
            "Findings: invasive carcinoma of the left breast, upper outer quadrant, grade 2.";
        let start = text.find("carcinoma").unwrap();
        let snippet = resolve(text, start, start + 9).unwrap();

        // right edge lands inside "quadrant" and is pushed past it
        assert_eq!(
            snippet,
            "Findings: invasive carcinoma of the left breast, upper outer quadrant,"
        );
        assert!(is_traceable(&snippet, text));
    }

    #[test]
    fn test_collapses_line_breaks() {
        let text = "ER:\r\n   positive\n\tPR: negative";
        let snippet = resolve(text, 0, 2).unwrap();
        assert_eq!(snippet, "ER: positive PR: negative");
        assert!(is_traceable(&snippet, text));
    }

    #[test]
    fn test_truncates_long_snippets() {
        let word = "carcinoma ".repeat(40);
        let snippet = resolve(&word, 150, 250).unwrap();

        assert!(snippet.ends_with(ELLIPSIS));
        assert!(snippet.chars().count() <= 160);
        assert!(is_traceable(&snippet, &word));
    }

    #[test]
    fn test_blank_region_has_no_snippet() {
        assert_eq!(resolve("     ", 1, 2), None);
        assert_eq!(resolve("", 0, 0), None);
    }

    #[test]
    fn test_out_of_range_span_is_clamped() {
        let snippet = resolve("HER2 negative", 5, 500).unwrap();
        assert_eq!(snippet, "HER2 negative");
    }

    #[test]
    fn test_prediction_without_evidence() {
        let note = NoteText::new("nothing here");
        assert_eq!(EvidenceResolver::default().snippet(&note, &FieldPrediction::empty()), None);
    }

    proptest! {
        #[test]
        fn prop_snippet_is_traceable(
            text in "[a-zA-Z0-9 ,.:\\n\\t\\r-]{0,400}",
            a in 0usize..400,
            b in 0usize..400,
        ) {
            let note = NoteText::new(&text);
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            let span = Span::new(start.min(note.char_len()), end.min(note.char_len()));
            if let Some(snippet) = EvidenceResolver::default().resolve(&note, span) {
                prop_assert!(!snippet.is_empty());
                prop_assert!(snippet.chars().count() <= 160);
                prop_assert!(is_traceable(&snippet, &text));
            }
        }
    }
}
