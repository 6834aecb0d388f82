//! Query-relevant excerpts by keyword-overlap sentence scoring

use crate::retriever::truncate_chars;

pub const MAX_EXCERPT_CHARS: usize = 500;
const TOP_SENTENCES: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "are", "from", "that", "this", "site", "what", "how", "does",
    "your", "our", "you",
];

/// Distinct lowercase query words longer than two characters
fn query_words(query: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in query
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(&w.as_str()))
    {
        if !words.contains(&word) {
            words.push(word);
        }
    }
    words
}

/// Split on sentence punctuation followed by whitespace, and on newlines
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let boundary = match c {
            '\n' => Some(idx),
            '.' | '!' | '?' => match chars.peek() {
                Some((_, next)) if next.is_whitespace() => Some(idx + c.len_utf8()),
                _ => None,
            },
            _ => None,
        };

        if let Some(end) = boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Pick the sentences sharing the most distinct words with the query and
/// join the best three, capped at 500 characters. Falls back to the start
/// of the text when nothing overlaps.
pub fn extract_excerpt(text: &str, query: &str) -> String {
    let words = query_words(query);
    let sentences = split_sentences(text);

    let mut scored: Vec<(usize, usize, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(pos, sentence)| {
            let lower = sentence.to_lowercase();
            let score = words.iter().filter(|w| lower.contains(w.as_str())).count();
            (score, pos, *sentence)
        })
        .filter(|(score, _, _)| *score > 0)
        .collect();

    if scored.is_empty() {
        return truncate_chars(&crate::retriever::collapse_whitespace(text), MAX_EXCERPT_CHARS);
    }

    // Highest score first, earlier sentence on ties
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let joined = scored
        .iter()
        .take(TOP_SENTENCES)
        .map(|(_, _, s)| *s)
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&joined, MAX_EXCERPT_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Acme is great. Version 2.0 ships SSO!\nPricing? Ask us");
        assert_eq!(
            sentences,
            vec!["Acme is great.", "Version 2.0 ships SSO!", "Pricing?", "Ask us"]
        );
    }

    #[test]
    fn test_excerpt_prefers_overlapping_sentences() {
        let text = "Welcome to Acme. We love our customers. Acme is SOC 2 Type II certified. \
                    Our SOC 2 report covers security and availability. Lunch is free.";
        let excerpt = extract_excerpt(text, "SOC 2 security certification");

        assert!(excerpt.starts_with("Our SOC 2 report covers security"));
        assert!(excerpt.contains("SOC 2 Type II certified"));
        assert!(!excerpt.contains("Lunch"));
    }

    #[test]
    fn test_excerpt_falls_back_to_leading_text() {
        let excerpt = extract_excerpt("Nothing relevant here at all.", "pricing");
        assert_eq!(excerpt, "Nothing relevant here at all.");
    }

    #[test]
    fn test_excerpt_is_capped() {
        let sentence = format!("pricing {}.", "x".repeat(400));
        let text = format!("{} {} {}", sentence, sentence, sentence);
        let excerpt = extract_excerpt(&text, "pricing");
        assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS);
    }
}
