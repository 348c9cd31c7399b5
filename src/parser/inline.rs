//! Inline emphasis tokenizer.
//!
//! Splits a text span into [`InlineRun`]s for `**bold**`, `*italic*` and
//! `__underline__`. The scan is a single greedy left-to-right pass; at each
//! position the markers are tried in table order, so `**` always wins over
//! `*`. Anything that does not form a closed pair stays plain text.

use crate::model::InlineRun;

#[derive(Debug, Clone, Copy)]
enum Emphasis {
    Bold,
    Italic,
    Underline,
}

/// Markers in match priority order.
const MARKERS: &[(&str, Emphasis)] = &[
    ("**", Emphasis::Bold),
    ("*", Emphasis::Italic),
    ("__", Emphasis::Underline),
];

/// Tokenize inline markup into styled runs.
///
/// The result is never empty: empty input yields one empty plain run.
/// Concatenating the run texts gives the input with matched markers
/// removed.
pub fn tokenize_inline(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        match match_emphasis(rest) {
            Some((run, consumed)) => {
                if !plain.is_empty() {
                    runs.push(InlineRun::plain(std::mem::take(&mut plain)));
                }
                runs.push(run);
                rest = &rest[consumed..];
            }
            None => {
                plain.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    if !plain.is_empty() || runs.is_empty() {
        runs.push(InlineRun::plain(plain));
    }

    runs
}

/// Try every marker at the start of `s`; returns the run and bytes consumed.
fn match_emphasis(s: &str) -> Option<(InlineRun, usize)> {
    MARKERS.iter().find_map(|&(marker, emphasis)| {
        let body = s.strip_prefix(marker)?;
        let end = find_closing(body, marker)?;
        let inner = &body[..end];
        let run = match emphasis {
            Emphasis::Bold => InlineRun::bold(inner),
            Emphasis::Italic => InlineRun::italic(inner),
            Emphasis::Underline => InlineRun::underline(inner),
        };
        Some((run, marker.len() * 2 + end))
    })
}

/// Find the shortest non-empty, single-line span closed by `marker`.
fn find_closing(body: &str, marker: &str) -> Option<usize> {
    let first = body.chars().next()?;
    if first == '\n' {
        return None;
    }

    let mut idx = first.len_utf8();
    while idx < body.len() {
        let tail = &body[idx..];
        if tail.starts_with(marker) {
            return Some(idx);
        }
        let ch = tail.chars().next()?;
        if ch == '\n' {
            return None;
        }
        idx += ch.len_utf8();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(runs: &[InlineRun]) -> Vec<&str> {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_plain_text_single_run() {
        let runs = tokenize_inline("Just some text.");
        assert_eq!(runs, vec![InlineRun::plain("Just some text.")]);
    }

    #[test]
    fn test_empty_input_yields_one_run() {
        let runs = tokenize_inline("");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].is_empty());
        assert!(!runs[0].has_styling());
    }

    #[test]
    fn test_bold_span() {
        let runs = tokenize_inline("Some **bold** text.");
        assert_eq!(
            runs,
            vec![
                InlineRun::plain("Some "),
                InlineRun::bold("bold"),
                InlineRun::plain(" text."),
            ]
        );
    }

    #[test]
    fn test_bold_before_italic() {
        // "**x**" must not be read as two italic spans sharing an asterisk
        let runs = tokenize_inline("**x**");
        assert_eq!(runs, vec![InlineRun::bold("x")]);
    }

    #[test]
    fn test_italic_and_underline() {
        let runs = tokenize_inline("*it* and __under__");
        assert_eq!(
            runs,
            vec![
                InlineRun::italic("it"),
                InlineRun::plain(" and "),
                InlineRun::underline("under"),
            ]
        );
    }

    #[test]
    fn test_unterminated_marker_is_plain() {
        let runs = tokenize_inline("5 * 3 = 15");
        assert_eq!(runs, vec![InlineRun::plain("5 * 3 = 15")]);

        let runs = tokenize_inline("**open bold");
        assert_eq!(texts(&runs), vec!["**open bold"]);
        assert!(!runs[0].has_styling());
    }

    #[test]
    fn test_empty_pair_is_plain() {
        let runs = tokenize_inline("a ** b");
        assert_eq!(runs, vec![InlineRun::plain("a ** b")]);
    }

    #[test]
    fn test_single_underscore_is_plain() {
        let runs = tokenize_inline("snake_case_name");
        assert_eq!(runs, vec![InlineRun::plain("snake_case_name")]);
    }

    #[test]
    fn test_shortest_closing_marker() {
        let runs = tokenize_inline("**a** and **b**");
        assert_eq!(
            texts(&runs),
            vec!["a", " and ", "b"]
        );
        assert!(runs[0].bold && runs[2].bold);
    }

    #[test]
    fn test_unicode_content() {
        let runs = tokenize_inline("Größe **über** alles");
        assert_eq!(texts(&runs), vec!["Größe ", "über", " alles"]);
    }

    #[test]
    fn test_span_does_not_cross_newline() {
        let runs = tokenize_inline("*a\nb*");
        assert_eq!(runs, vec![InlineRun::plain("*a\nb*")]);
    }

    #[test]
    fn test_concatenation_reconstructs_stripped_input() {
        let input = "Lead **bold** mid *it* tail __u__ end *";
        let joined: String = tokenize_inline(input)
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(joined, "Lead bold mid it tail u end *");
    }
}
