//! Key hints on the bottom line.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::theme;

/// Which keys are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintContext {
    Table,
    Search,
    Popup,
}

impl HintContext {
    fn hints(self, can_export_report: bool) -> &'static str {
        match self {
            HintContext::Table if can_export_report => {
                "[j/k] row [h/l] column [space] select [n/p] page [s] size [o] sort [/] search [f] filter [v] view [e] export [E] report [R] type [tab] next [q] quit"
            }
            HintContext::Table => {
                "[j/k] row [h/l] column [space] select [n/p] page [s] size [o] sort [/] search [f] filter [v] view [e] export [r] refresh [tab] next [q] quit"
            }
            HintContext::Search => "[type] search [backspace] delete [enter] done [esc] clear",
            HintContext::Popup => "[j/k] move [space] toggle [c] clear [esc] close",
        }
    }
}

/// Render the hint line for `context`.
pub fn render_context_help(
    frame: &mut Frame,
    area: Rect,
    context: HintContext,
    can_export_report: bool,
) {
    let line = Line::from(hint_spans(context.hints(can_export_report)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Split `[key] description` text into key and description spans.
fn hint_spans(hints: &str) -> Vec<Span<'static>> {
    let t = theme();
    let key = Style::default().fg(t.accent);
    let text = Style::default().fg(t.muted);

    let mut spans = Vec::new();
    let mut rest = hints;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|c| open + c) else {
            break;
        };
        if open > 0 {
            spans.push(Span::styled(rest[..open].to_string(), text));
        }
        spans.push(Span::styled(rest[open..=close].to_string(), key));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), text));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_and_text_alternate() {
        let spans = hint_spans("[j/k] row [esc] close");
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["[j/k]", " row ", "[esc]", " close"]);
    }

    #[test]
    fn test_unclosed_bracket_is_text() {
        let spans = hint_spans("plain [oops");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "plain [oops");
    }

    #[test]
    fn test_report_hints_only_when_configured() {
        assert!(HintContext::Table.hints(true).contains("[E] report"));
        assert!(!HintContext::Table.hints(false).contains("[E] report"));
    }
}
