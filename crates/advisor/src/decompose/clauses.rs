//! Splitting a query into topic clauses.

use crate::query::tokenize;
use crate::vocab;

const CLAUSE_BREAKS: &[char] = &['?', ';', '.', '!', '\n'];
const CONJUNCTIONS: &[&str] = &["and", "also"];

/// Words that survive into search text: English only, no stopwords.
pub fn content_tokens(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        if !token.is_ascii() || vocab::is_stopword(token) || CONJUNCTIONS.contains(&token.as_str()) {
            continue;
        }
        if !out.contains(token) {
            out.push(token.clone());
        }
    }
    out
}

/// Split `text` into clauses of English tokens.
///
/// Punctuation always ends a clause. A conjunction ends one only when both
/// sides carry at least two content words and it is not part of a known term
/// such as "foot and mouth disease".
pub fn split_clauses(text: &str) -> Vec<Vec<String>> {
    sentences(text)
        .into_iter()
        .flat_map(|part| split_on_conjunctions(ascii_tokens(part)))
        .filter(|clause| !content_tokens(clause).is_empty())
        .collect()
}

/// Split on clause punctuation. A '.' between two digits is a decimal point.
fn sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let decimal_point = c == '.'
            && prev.is_some_and(|p: char| p.is_ascii_digit())
            && chars.peek().is_some_and(|&(_, next)| next.is_ascii_digit());
        if CLAUSE_BREAKS.contains(&c) && !decimal_point {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
        prev = Some(c);
    }

    parts.push(&text[start..]);
    parts
}

fn ascii_tokens(text: &str) -> Vec<String> {
    tokenize(text).into_iter().filter(|t| t.is_ascii()).collect()
}

fn split_on_conjunctions(tokens: Vec<String>) -> Vec<Vec<String>> {
    let mut clauses = Vec::new();
    let mut start = 0;

    for i in 0..tokens.len() {
        if !CONJUNCTIONS.contains(&tokens[i].as_str()) || is_inside_term(&tokens, i) {
            continue;
        }
        let left = &tokens[start..i];
        let right = &tokens[i + 1..];
        if content_tokens(left).len() >= 2 && content_tokens(right).len() >= 2 {
            clauses.push(left.to_vec());
            start = i + 1;
        }
    }

    clauses.push(tokens[start..].to_vec());
    clauses
}

/// True when the token at `index` belongs to a multi-word vocabulary term.
fn is_inside_term(tokens: &[String], index: usize) -> bool {
    vocab::CONCEPTS
        .iter()
        .flat_map(|c| std::iter::once(c.name).chain(c.lay_terms.iter().copied()))
        .filter(|term| term.contains(' '))
        .any(|term| {
            let len = term.split_whitespace().count();
            let lo = index.saturating_sub(len - 1);
            (lo..=index).any(|start| {
                tokens
                    .get(start..start + len)
                    .is_some_and(|window| vocab::contains_phrase(window, term))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(text: &str) -> Vec<String> {
        split_clauses(text).into_iter().map(|c| c.join(" ")).collect()
    }

    #[test]
    fn test_splits_on_punctuation() {
        assert_eq!(
            joined("How to sow cumin? Which fertilizer for wheat."),
            vec!["how to sow cumin", "which fertilizer for wheat"]
        );
    }

    #[test]
    fn test_decimal_point_does_not_end_clause() {
        assert_eq!(
            joined("Apply 2.5 kg urea per acre. Then irrigate wheat"),
            vec!["apply 2.5 kg urea per acre", "then irrigate wheat"]
        );
    }

    #[test]
    fn test_splits_on_conjunction_between_topics() {
        assert_eq!(
            joined("how to treat mastitis in cows and when to sow cotton"),
            vec!["how to treat mastitis in cows", "when to sow cotton"]
        );
    }

    #[test]
    fn test_keeps_conjunction_inside_terms() {
        assert_eq!(
            joined("how to treat foot and mouth disease in buffaloes"),
            vec!["how to treat foot and mouth disease in buffaloes"]
        );
    }

    #[test]
    fn test_keeps_short_conjunct() {
        assert_eq!(joined("cotton and wheat prices"), vec!["cotton and wheat prices"]);
    }

    #[test]
    fn test_drops_regional_and_empty_clauses() {
        assert_eq!(joined("કપાસ cotton pests?? ."), vec!["cotton pests"]);
        assert!(split_clauses("?!").is_empty());
    }

    #[test]
    fn test_content_tokens_drop_stopwords() {
        let tokens = tokenize("how to treat mastitis in the cows");
        assert_eq!(content_tokens(&tokens), vec!["treat", "mastitis", "cows"]);
    }
}
