//! Line locator: maps a logical stage index back to its physical source line.

/// Whether a raw line carries stage content (not blank, not a `#` comment).
pub fn is_stage_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// 0-based physical line of the `index`-th stage line in `text`.
///
/// Only blank and comment lines are skipped; every other line counts as a
/// stage whether or not it compiles.
pub fn locate_line(text: &str, index: usize) -> Option<usize> {
    locate_line_with(text, index, |_| true)
}

/// Like [`locate_line`], but only lines for which `accept` returns `true`
/// (given the trimmed line) are counted.
pub fn locate_line_with<F>(text: &str, index: usize, mut accept: F) -> Option<usize>
where
    F: FnMut(&str) -> bool,
{
    text.lines()
        .enumerate()
        .filter(|(_, line)| is_stage_line(line))
        .filter(|(_, line)| accept(line.trim()))
        .nth(index)
        .map(|(physical, _)| physical)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "# warm-up\n\nbinaural:360:367:sine:10\n   \n  # focus\nisochronic:333:10:square:5\ngenerator:432:432:sine:3\n";

    #[test]
    fn skip_predicate() {
        assert!(!is_stage_line(""));
        assert!(!is_stage_line("   \t"));
        assert!(!is_stage_line("   # note"));
        assert!(is_stage_line("binaural:1:2:sine:1"));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(locate_line(TEXT, 0), Some(2));
        assert_eq!(locate_line(TEXT, 1), Some(5));
        assert_eq!(locate_line(TEXT, 2), Some(6));
    }

    #[test]
    fn index_past_end_is_none() {
        assert_eq!(locate_line(TEXT, 3), None);
        assert_eq!(locate_line("", 0), None);
    }

    #[test]
    fn accept_predicate_skips_rejected_lines() {
        let found = locate_line_with(TEXT, 0, |line| line.starts_with("iso"));
        assert_eq!(found, Some(5));
    }

    #[test]
    fn crlf_line_endings() {
        let text = "# a\r\nbinaural:360:367:sine:10\r\n";
        assert_eq!(locate_line(text, 0), Some(1));
    }
}
