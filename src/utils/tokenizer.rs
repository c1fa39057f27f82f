use std::collections::HashSet;

/// Split document text into its distinct terms, in first-occurrence order.
///
/// Terms are maximal runs of non-whitespace characters, kept verbatim (no case
/// folding or punctuation stripping). A term repeated within a document is
/// returned once. Term ids are assigned on first sighting, so the order matters.
pub fn extract_terms(content: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    content
        .split_whitespace()
        .filter(|t| seen.insert(*t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_terms_dedups() {
        assert_eq!(extract_terms("to be or not to be"), vec!["to", "be", "or", "not"]);
    }

    #[test]
    fn test_first_occurrence_order() {
        assert_eq!(extract_terms("b a b c a"), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_whitespace_variants() {
        let terms = extract_terms("  alpha\tbeta\n\n gamma\r\n");
        assert_eq!(terms, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_empty_content() {
        assert!(extract_terms("").is_empty());
        assert!(extract_terms(" \n\t ").is_empty());
    }

    #[test]
    fn test_case_and_punctuation_preserved() {
        let terms = extract_terms("Hello hello, hello");
        assert_eq!(terms, vec!["Hello", "hello,", "hello"]);
    }
}
