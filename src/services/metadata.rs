//! Title, caption and hashtag generation for scored segments
//!
//! Titles come from keyword rules with a random fallback; captions combine a
//! random hook with a random call to action. The random source is a
//! [`PhrasePicker`] so callers can pin the output.

use rand::Rng;

use crate::constants::MAX_HASHTAGS;
use crate::models::{ClipMetadata, ScoredSegment};

pub const FALLBACK_TITLES: &[&str] = &[
    "This AI Fact Will Blow Your Mind",
    "The Truth About AI Nobody Talks About",
    "3 AI Secrets That Will Change Everything",
    "Why AI is More Dangerous Than You Think",
    "The AI Revolution is Happening NOW",
    "This Changes Everything About Technology",
    "AI Facts That Will Shock You",
    "The Future of AI is Terrifying",
    "Mind-Blowing AI Breakthrough Revealed",
    "This AI Discovery Changes Everything",
];

/// Keyword rules checked in order; first match wins
const KEYWORD_TITLES: &[(&[&str], &str)] = &[
    (&["three", "3"], "3 Mind-Blowing AI Facts That Will Shock You"),
    (&["future"], "The Future of AI Will Blow Your Mind"),
    (&["breakthrough"], "AI Breakthrough That Changes Everything"),
    (&["job"], "How AI Will Transform Your Job Forever"),
];

pub const CAPTION_HOOKS: &[&str] = &[
    "🤯 This will completely change your perspective!",
    "⚡ You won't believe what's happening right now!",
    "🚀 The future is here and it's incredible!",
    "😱 This is happening faster than you think!",
    "🔥 Everyone needs to know about this!",
    "💡 This insight will blow your mind!",
    "⭐ The most important thing you'll learn today!",
    "🌟 This changes everything we know!",
];

pub const CAPTION_CTAS: &[&str] = &[
    "What do you think about this? 👇",
    "Share your thoughts in the comments!",
    "Which fact surprised you the most?",
    "Are you ready for this change?",
    "Let me know what you think!",
    "Drop a 🤯 if this shocked you!",
    "Tag someone who needs to see this!",
    "What's your prediction for the future?",
];

pub const BASE_HASHTAGS: &[&str] = &["#AI", "#Technology", "#Future", "#Innovation"];

const CONTEXT_HASHTAGS: &[(&[&str], [&str; 2])] = &[
    (&["art", "creative"], ["#AIArt", "#Creativity"]),
    (&["job", "work"], ["#FutureOfWork", "#Jobs"]),
    (&["breakthrough", "discovery"], ["#Breakthrough", "#Discovery"]),
    (&["mind", "blow"], ["#MindBlown", "#Shocking"]),
    (&["society", "impact"], ["#Society", "#Impact"]),
];

pub const TRENDING_HASHTAGS: &[&str] = &["#TechNews", "#Viral", "#MustWatch", "#Trending"];

/// Source of uniform picks from a fixed-size pool
pub trait PhrasePicker {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> PhrasePicker for R {
    fn pick(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

fn choose<'a, P: PhrasePicker + ?Sized>(picker: &mut P, pool: &[&'a str]) -> &'a str {
    pool[picker.pick(pool.len()) % pool.len()]
}

/// Pick a title from keyword rules, falling back to a random generic title.
pub fn generate_title<P: PhrasePicker + ?Sized>(text: &str, picker: &mut P) -> String {
    let lower = text.to_lowercase();

    KEYWORD_TITLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| choose(picker, FALLBACK_TITLES).to_string())
}

/// Build a caption as "{hook} {call to action}".
pub fn generate_caption<P: PhrasePicker + ?Sized>(picker: &mut P) -> String {
    let hook = choose(picker, CAPTION_HOOKS);
    let cta = choose(picker, CAPTION_CTAS);
    format!("{hook} {cta}")
}

/// Base tags, then context tags, then trending tags, truncated to
/// [`MAX_HASHTAGS`]. Base tags always survive the cut.
pub fn generate_hashtags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    let context = CONTEXT_HASHTAGS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .flat_map(|(_, tags)| tags.iter());

    BASE_HASHTAGS
        .iter()
        .chain(context)
        .chain(TRENDING_HASHTAGS.iter())
        .take(MAX_HASHTAGS)
        .map(|tag| tag.to_string())
        .collect()
}

/// Generate title, caption and hashtags for one segment.
///
/// `video_title` is accepted for parity with the processing request but does
/// not influence the rules.
pub fn generate<P: PhrasePicker + ?Sized>(
    segment: &ScoredSegment,
    _video_title: Option<&str>,
    picker: &mut P,
) -> ClipMetadata {
    let text = &segment.segment.text;

    ClipMetadata {
        title: generate_title(text, picker),
        caption: generate_caption(picker),
        hashtags: generate_hashtags(text),
    }
}
