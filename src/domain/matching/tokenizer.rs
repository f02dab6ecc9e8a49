//! Lightweight term-frequency tokenization

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s]+").expect("valid tokenizer pattern"));

/// Split text into lowercase alphanumeric tokens with punctuation stripped
/// and whitespace normalized.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = NON_ALPHANUMERIC.replace_all(&lowered, " ");

    stripped
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}

/// Build a term-frequency map from the text's tokens.
pub fn term_frequency(text: &str) -> HashMap<String, f64> {
    let mut frequencies = HashMap::new();
    for token in tokenize(text) {
        *frequencies.entry(token).or_insert(0.0) += 1.0;
    }
    frequencies
}

/// Cosine similarity over the sparse term space. Returns 0.0 when either
/// vector has zero norm or the vectors share no terms.
pub fn term_cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let mut dot_product = 0.0;
    for (term, weight_a) in a {
        if let Some(weight_b) = b.get(term) {
            dot_product += weight_a * weight_b;
        }
    }

    let norm_a: f64 = a.values().map(|w| w * w).sum();
    let norm_b: f64 = b.values().map(|w| w * w).sum();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        let tokens = tokenize("How do I use Goroutines?!");

        assert_eq!(tokens, vec!["how", "do", "i", "use", "goroutines"]);
    }

    #[test]
    fn test_tokenize_normalizes_whitespace() {
        let tokens = tokenize("  hello\t\nworld   again ");

        assert_eq!(tokens, vec!["hello", "world", "again"]);
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("?!,.;:").is_empty());
    }

    #[test]
    fn test_term_frequency_counts_repeats() {
        let frequencies = term_frequency("go go go python");

        assert_eq!(frequencies.get("go"), Some(&3.0));
        assert_eq!(frequencies.get("python"), Some(&1.0));
    }

    #[test]
    fn test_term_cosine_identical_text() {
        let a = term_frequency("concurrency with channels");
        let b = term_frequency("concurrency with channels");

        assert!((term_cosine_similarity(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_term_cosine_symmetric() {
        let a = term_frequency("goroutines channels concurrency");
        let b = term_frequency("how do i use goroutines");

        assert_eq!(
            term_cosine_similarity(&a, &b),
            term_cosine_similarity(&b, &a)
        );
    }

    #[test]
    fn test_term_cosine_no_shared_terms() {
        let a = term_frequency("alpha beta");
        let b = term_frequency("gamma delta");

        assert_eq!(term_cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_term_cosine_empty_vector() {
        let empty = term_frequency("");
        let non_empty = term_frequency("hello world");

        assert_eq!(term_cosine_similarity(&empty, &non_empty), 0.0);
        assert_eq!(term_cosine_similarity(&empty, &empty), 0.0);
    }
}
