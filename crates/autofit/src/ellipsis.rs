//! Ellipsis truncation for text that overflows even at the smallest size.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::TrimStrategy;
use crate::measure::{LineMeasurer, MeasureError, MeasureRequest};

fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Cut `request.text` after the last line that fits `max_height` and end it with
/// `ellipsis`.
///
/// The last visible line is shortened one grapheme at a time until it has room for the
/// ellipsis within `request.max_width`. A line that was soft-wrapped with room to spare
/// instead keeps taking graphemes from the rest of its paragraph while they still fit.
/// Returns an empty string when not even the first line fits. When the ellipsis alone
/// is wider than the line, the text is cut at the start of the last visible line
/// without one.
pub fn truncate_with_ellipsis<M: LineMeasurer + ?Sized>(
    measurer: &mut M,
    request: MeasureRequest<'_>,
    max_height: f32,
    ellipsis: char,
    strategy: TrimStrategy,
) -> Result<String, MeasureError> {
    let text = request.text;
    let lines = measurer.break_lines(request)?;

    let visible = lines
        .iter()
        .take_while(|line| line.bottom <= max_height)
        .count();
    let Some(last) = visible.checked_sub(1).map(|index| lines[index]) else {
        log::debug!("no line fits {max_height}px, clearing text");
        return Ok(String::new());
    };

    let start = last.start;
    let line_len = text[start..last.end]
        .trim_end_matches(is_line_terminator)
        .len();
    let paragraph_end = text[start + line_len..]
        .find(is_line_terminator)
        .map_or(text.len(), |i| start + line_len + i);
    let tail = &text[start..paragraph_end];

    // Candidate cut points from the line start to the paragraph end, shortest first
    let cuts: Vec<usize> = std::iter::once(0)
        .chain(tail.grapheme_indices(true).map(|(i, g)| i + g.len()))
        .collect();
    // Index of the cut at the end of the visible line
    let line_cut = cuts.partition_point(|&cut| cut <= line_len) - 1;

    let ellipsis_width = measurer.glyph_width(ellipsis, request.font_size)?;
    let room = request.max_width - ellipsis_width;
    let mut fits = |cut: usize| -> Result<bool, MeasureError> {
        let width = measurer.text_width(&tail[..cut], request.font_size)?;
        log::trace!("trim probe {cut}/{} bytes -> {width}px", tail.len());
        Ok(width <= room)
    };

    let cut = match strategy {
        TrimStrategy::Linear => last_fitting_linear(&cuts, line_cut, &mut fits)?,
        TrimStrategy::Bisect => last_fitting_bisect(&cuts, &mut fits)?,
    };

    Ok(match cut {
        Some(cut) => {
            let mut out = String::with_capacity(start + cut + ellipsis.len_utf8());
            out.push_str(&text[..start + cut]);
            out.push(ellipsis);
            out
        }
        None => {
            log::debug!("ellipsis wider than {}px, cutting at line start", request.max_width);
            text[..start].trim_end_matches(is_line_terminator).to_string()
        }
    })
}

/// Walk back from `cuts[from]` until a cut fits; if `cuts[from]` itself fits, walk
/// forward instead while the next one still does
fn last_fitting_linear<F>(
    cuts: &[usize],
    from: usize,
    fits: &mut F,
) -> Result<Option<usize>, MeasureError>
where
    F: FnMut(usize) -> Result<bool, MeasureError>,
{
    let mut index = from;
    while !fits(cuts[index])? {
        if index == 0 {
            return Ok(None);
        }
        index -= 1;
    }
    if index == from {
        while index + 1 < cuts.len() && fits(cuts[index + 1])? {
            index += 1;
        }
    }
    Ok(Some(cuts[index]))
}

/// Largest fitting cut, assuming width never shrinks as the cut grows
fn last_fitting_bisect<F>(cuts: &[usize], fits: &mut F) -> Result<Option<usize>, MeasureError>
where
    F: FnMut(usize) -> Result<bool, MeasureError>,
{
    // Invariant: cuts[..lo] fit, cuts[hi..] don't
    let (mut lo, mut hi) = (0, cuts.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if fits(cuts[mid])? {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo.checked_sub(1).map(|index| cuts[index]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monospace::MonospaceMeasurer;

    fn unit() -> MonospaceMeasurer {
        MonospaceMeasurer::new(1.0, 1.0)
    }

    fn truncate(text: &str, width: f32, height: f32, strategy: TrimStrategy) -> String {
        truncate_with_ellipsis(
            &mut unit(),
            MeasureRequest::new(text, 1.0, width),
            height,
            '…',
            strategy,
        )
        .unwrap()
    }

    #[test]
    fn test_trims_last_visible_line() {
        // Lines: "abcdef", "ghijkl", "mn"
        let out = truncate("abcdefghijklmn", 6.0, 2.0, TrimStrategy::Linear);
        assert_eq!(out, "abcdefghijk…");
    }

    #[test]
    fn test_soft_wrapped_line_borrows_from_next_word() {
        // Lines: "abc ", "defgh"; "abc d…" still fits six columns
        let out = truncate("abc defgh", 6.0, 1.0, TrimStrategy::Linear);
        assert_eq!(out, "abc d…");
        let out = truncate("abc defgh", 6.0, 1.0, TrimStrategy::Bisect);
        assert_eq!(out, "abc d…");
    }

    #[test]
    fn test_borrowing_stops_at_hard_break() {
        // "abc\n" ends its paragraph, nothing after it may be pulled in
        let out = truncate("abc\ndefgh\nij", 6.0, 1.0, TrimStrategy::Linear);
        assert_eq!(out, "abc…");
    }

    #[test]
    fn test_no_visible_line_clears_text() {
        let out = truncate("abcdef", 6.0, 0.5, TrimStrategy::Linear);
        assert_eq!(out, "");
    }

    #[test]
    fn test_short_line_keeps_content_and_drops_terminator() {
        let out = truncate("ab\ncd\nef", 10.0, 2.0, TrimStrategy::Linear);
        assert_eq!(out, "ab\ncd…");
    }

    #[test]
    fn test_ellipsis_wider_than_line_cuts_at_line_start() {
        // Narrower than one glyph: every line holds a single character
        let mut measurer = MonospaceMeasurer::new(1.0, 1.0);
        let out = truncate_with_ellipsis(
            &mut measurer,
            MeasureRequest::new("ab\ncd", 0.5, 0.4),
            1.5,
            '…',
            TrimStrategy::Linear,
        )
        .unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_keeps_graphemes_whole() {
        // "e\u{301}" is one grapheme of two chars; it must not be split
        let text = "abcde\u{301}fghij";
        let out = truncate(text, 6.0, 1.0, TrimStrategy::Linear);
        assert_eq!(out, "abcd…");
    }

    #[test]
    fn test_bisect_matches_linear() {
        let texts = [
            "abcdefghijklmn",
            "the quick brown fox jumps over the lazy dog",
            "ab\ncd\nef\ngh",
            "a b c d e f g h i j k l m n o p",
            "abc defgh ijk\nlm nopq rs",
        ];
        for text in texts {
            for height in [0.5, 1.0, 2.0, 3.0] {
                for width in [1.0, 3.0, 6.0, 9.0] {
                    assert_eq!(
                        truncate(text, width, height, TrimStrategy::Linear),
                        truncate(text, width, height, TrimStrategy::Bisect),
                        "{text:?} at {width}x{height}"
                    );
                }
            }
        }
    }
}
