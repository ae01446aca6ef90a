//! Candidate segment construction from transcript lines

use crate::constants::SEGMENT_WINDOW_LINES;
use crate::models::{CandidateSegment, TranscriptLine};

/// Slide a window of up to [`SEGMENT_WINDOW_LINES`] lines over the transcript.
///
/// The window advances one line at a time, so segments overlap. A window
/// starts at every index except the last, which means a transcript with
/// `L >= 2` lines yields `L - 1` segments and a single line yields none.
pub fn build_segments(lines: &[TranscriptLine]) -> Vec<CandidateSegment> {
    if lines.len() < 2 {
        return Vec::new();
    }

    (0..lines.len() - 1)
        .map(|start| {
            let end = (start + SEGMENT_WINDOW_LINES).min(lines.len());
            let window = &lines[start..end];

            let text = window
                .iter()
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let start_time = window[0].start_seconds;
            let end_time = window[window.len() - 1].end_seconds;

            CandidateSegment {
                text,
                start_time,
                end_time,
                duration: end_time - start_time,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(len: usize) -> Vec<TranscriptLine> {
        (0..len)
            .map(|i| TranscriptLine::new(format!("line {i}"), i as f64 * 25.0, (i + 1) as f64 * 25.0))
            .collect()
    }

    #[test]
    fn empty_and_single_line_yield_nothing() {
        assert!(build_segments(&[]).is_empty());
        assert!(build_segments(&transcript(1)).is_empty());
    }

    #[test]
    fn yields_one_less_segment_than_lines() {
        for len in 2..15 {
            assert_eq!(build_segments(&transcript(len)).len(), len - 1);
        }
    }

    #[test]
    fn windows_overlap_and_shrink_at_the_tail() {
        let segments = build_segments(&transcript(4));

        assert_eq!(segments[0].text, "line 0 line 1 line 2");
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 75.0);
        assert_eq!(segments[0].duration, 75.0);

        assert_eq!(segments[1].text, "line 1 line 2 line 3");

        // Last window only has two lines left
        assert_eq!(segments[2].text, "line 2 line 3");
        assert_eq!(segments[2].start_time, 50.0);
        assert_eq!(segments[2].end_time, 100.0);
        assert_eq!(segments[2].duration, 50.0);
    }

    #[test]
    fn two_lines_make_one_segment() {
        let segments = build_segments(&transcript(2));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "line 0 line 1");
        assert_eq!(segments[0].duration, 50.0);
    }
}
