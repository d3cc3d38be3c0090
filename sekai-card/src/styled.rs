//! `**bold**` runs inside a single body line.

use std::sync::LazyLock;

use regex::Regex;

use crate::layout::CardStyle;
use crate::metrics::{FontSpec, TextMeasure};
use crate::surface::{Stroke, Surface, TextPaint};

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold span pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStyle {
    Plain,
    Bold,
    /// Bold span whose text is the card title; drawn larger with an outline.
    Heading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

/// Whether `line` contains at least one complete `**…**` span.
pub fn has_bold_span(line: &str) -> bool {
    BOLD_SPAN.is_match(line)
}

/// Remove every complete `**…**` delimiter pair, keeping the inner text.
pub fn strip_bold_markers(line: &str) -> String {
    BOLD_SPAN.replace_all(line, "$1").into_owned()
}

/// Split `line` into alternating plain and bold runs.
///
/// An unterminated `**` is left in the plain text as-is. Bold text equal to
/// `heading` (ignoring surrounding whitespace) becomes a [`RunStyle::Heading`].
pub fn split_runs(line: &str, heading: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in BOLD_SPAN.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_run(&mut runs, &line[last..whole.start()], RunStyle::Plain);
        let style = if inner.as_str().trim() == heading {
            RunStyle::Heading
        } else {
            RunStyle::Bold
        };
        push_run(&mut runs, inner.as_str(), style);
        last = whole.end();
    }
    push_run(&mut runs, &line[last..], RunStyle::Plain);
    runs
}

fn push_run(runs: &mut Vec<StyledRun>, text: &str, style: RunStyle) {
    if !text.is_empty() {
        runs.push(StyledRun {
            text: text.to_string(),
            style,
        });
    }
}

/// Font and paint for a run.
pub(crate) fn run_face(style: &CardStyle, run: RunStyle) -> (FontSpec, TextPaint) {
    let ink = TextPaint::fill(style.theme.text_color);
    match run {
        RunStyle::Plain => (style.fonts.body, ink),
        RunStyle::Bold => (style.fonts.bold_run, ink),
        RunStyle::Heading => (
            style.fonts.heading,
            ink.with_stroke(Stroke {
                color: style.theme.text_color,
                width: style.fonts.heading_stroke,
            }),
        ),
    }
}

/// Unwrapped pixel width of a styled line.
pub fn styled_width<M: TextMeasure + ?Sized>(line: &str, measure: &M, style: &CardStyle) -> f32 {
    split_runs(line, &style.theme.title_sentinel)
        .iter()
        .map(|run| measure.width(&run.text, &run_face(style, run.style).0))
        .sum()
}

/// Draw a line containing bold spans, switching fonts run by run.
///
/// The line is not wrapped: it always occupies exactly one line and the
/// returned baseline is `y + line_height`.
pub fn render_styled_line<S: Surface, M: TextMeasure + ?Sized>(
    surface: &mut S,
    measure: &M,
    style: &CardStyle,
    line: &str,
    start_x: f32,
    y: f32,
) -> f32 {
    let mut x = start_x;
    for run in split_runs(line, &style.theme.title_sentinel) {
        let (font, paint) = run_face(style, run.style);
        surface.text(&run.text, x, y, &font, &paint);
        x += measure.width(&run.text, &font);
    }
    y + style.policy.line_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{MonoMeasure, RecordingSurface};

    #[test]
    fn plain_bold_plain() {
        let runs = split_runs("plain **bold** plain", "Today's small talk");
        let styles: Vec<RunStyle> = runs.iter().map(|r| r.style).collect();
        assert_eq!(styles, vec![RunStyle::Plain, RunStyle::Bold, RunStyle::Plain]);
        assert_eq!(runs[0].text, "plain ");
        assert_eq!(runs[1].text, "bold");
        assert_eq!(runs[2].text, " plain");
    }

    #[test]
    fn runs_concatenate_to_stripped_line() {
        let line = "a **b** c **d** e";
        let joined: String = split_runs(line, "x").into_iter().map(|r| r.text).collect();
        assert_eq!(joined, strip_bold_markers(line));
        assert_eq!(joined, "a b c d e");
    }

    #[test]
    fn sentinel_becomes_heading() {
        let runs = split_runs("**Today's small talk**", "Today's small talk");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style, RunStyle::Heading);
    }

    #[test]
    fn unterminated_marker_stays_plain() {
        assert!(!has_bold_span("oops **never closed"));
        let runs = split_runs("oops **never closed", "x");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style, RunStyle::Plain);
        assert_eq!(runs[0].text, "oops **never closed");
    }

    #[test]
    fn partially_terminated_line_keeps_tail_literal() {
        let runs = split_runs("**one** and **two", "x");
        assert_eq!(runs[0].style, RunStyle::Bold);
        assert_eq!(runs[1].text, " and **two");
        assert_eq!(runs[1].style, RunStyle::Plain);
    }

    #[test]
    fn cursor_advances_by_run_widths() {
        let style = CardStyle::default();
        let measure = MonoMeasure { advance: 10.0 };
        let mut surface = RecordingSurface::default();

        let end_y = render_styled_line(
            &mut surface,
            &measure,
            &style,
            "plain **bold** plain",
            50.0,
            300.0,
        );

        let texts = surface.texts();
        assert_eq!(texts.len(), 3);
        let plain_w = measure.width("plain ", &style.fonts.body);
        let bold_w = measure.width("bold", &style.fonts.bold_run);
        assert_eq!(texts[1].1, 50.0 + plain_w);
        assert_eq!(texts[2].1, 50.0 + plain_w + bold_w);
        assert_eq!(texts[1].3, style.fonts.bold_run);
        assert!(!texts[1].4, "plain bold runs are not outlined");
        assert_eq!(texts[2].3, style.fonts.body);
        assert_eq!(end_y, 300.0 + style.policy.line_height);
    }

    #[test]
    fn heading_run_is_outlined() {
        let style = CardStyle::default();
        let mut surface = RecordingSurface::default();
        render_styled_line(
            &mut surface,
            &MonoMeasure { advance: 10.0 },
            &style,
            "**Today's small talk** starts now",
            50.0,
            100.0,
        );
        let texts = surface.texts();
        assert_eq!(texts[0].3, style.fonts.heading);
        assert!(texts[0].4);
        assert!(!texts[1].4);
    }
}
