//! Heuristic virality scoring
//!
//! Scores start at a neutral base and only ever gain bonuses, so the result
//! lives in `[BASE_SCORE, MAX_SCORE]`. Each marker term counts once no matter
//! how often it appears.

use regex::Regex;
use std::sync::LazyLock;

const BASE_SCORE: f64 = 5.0;
const MAX_SCORE: f64 = 10.0;

const VIRAL_KEYWORD_BONUS: f64 = 0.5;
const QUESTION_WORD_BONUS: f64 = 0.3;
const EMOTIONAL_WORD_BONUS: f64 = 0.2;
const URGENCY_WORD_BONUS: f64 = 0.3;
const NUMBER_BONUS: f64 = 0.4;
const SUPERLATIVE_BONUS: f64 = 0.3;

const VIRAL_KEYWORDS: &[&str] = &[
    "mind-blowing",
    "shocking",
    "incredible",
    "amazing",
    "unbelievable",
    "secret",
    "hidden",
    "revealed",
    "exposed",
    "truth",
    "you won't believe",
    "this will change",
    "nobody talks about",
    "three",
    "five",
    "top",
    "best",
    "worst",
    "most",
    "before",
    "after",
    "vs",
    "versus",
    "compared to",
];

const QUESTION_WORDS: &[&str] = &["what", "why", "how", "when", "where", "who"];

const EMOTIONAL_WORDS: &[&str] = &["love", "hate", "fear", "excited", "angry", "surprised"];

const URGENCY_WORDS: &[&str] = &["now", "today", "immediately", "urgent", "breaking", "latest"];

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(three|3|five|5|ten|10)\b").expect("valid number pattern"));

static SUPERLATIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(best|worst|most|least|biggest|smallest)\b").expect("valid superlative pattern")
});

fn term_bonus(text: &str, terms: &[&str], bonus: f64) -> f64 {
    terms.iter().filter(|term| text.contains(*term)).count() as f64 * bonus
}

/// Score a piece of text for viral potential, in `[0, 10]`.
pub fn score(text: &str) -> f64 {
    let lower = text.to_lowercase();

    let mut score = BASE_SCORE;
    score += term_bonus(&lower, VIRAL_KEYWORDS, VIRAL_KEYWORD_BONUS);

    // Question words only count as standalone words followed by a space
    score += QUESTION_WORDS
        .iter()
        .filter(|word| lower.contains(&format!("{word} ")))
        .count() as f64
        * QUESTION_WORD_BONUS;

    score += term_bonus(&lower, EMOTIONAL_WORDS, EMOTIONAL_WORD_BONUS);
    score += term_bonus(&lower, URGENCY_WORDS, URGENCY_WORD_BONUS);

    if NUMBER_PATTERN.is_match(&lower) {
        score += NUMBER_BONUS;
    }
    if SUPERLATIVE_PATTERN.is_match(&lower) {
        score += SUPERLATIVE_BONUS;
    }

    score.min(MAX_SCORE)
}
