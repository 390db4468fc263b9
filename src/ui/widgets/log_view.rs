//! Scrollable output log widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::commands::output::LogLine;
use crate::ui::theme;

pub struct LogView<'a> {
    lines: Vec<&'a LogLine>,
    title: Option<&'a str>,
    /// Lines scrolled back from the tail
    scroll_back: usize,
}

impl<'a> LogView<'a> {
    pub fn new(lines: impl Iterator<Item = &'a LogLine>) -> Self {
        Self {
            lines: lines.collect(),
            title: None,
            scroll_back: 0,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Index range of the lines shown in a pane of `height` rows
    fn window(&self, height: usize) -> (usize, usize) {
        let end = self.lines.len().saturating_sub(self.scroll_back);
        let end = end.max(height.min(self.lines.len()));
        (end.saturating_sub(height), end)
    }
}

impl Widget for LogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border());

        if let Some(title) = self.title {
            block = block.title(Span::styled(title, theme::title()));
        }
        if self.scroll_back > 0 {
            block = block.title_bottom(Span::styled(
                format!(" scrolled back {} ", self.scroll_back),
                theme::dim(),
            ));
        }

        let inner_height = area.height.saturating_sub(2) as usize; // Account for borders
        let (start, end) = self.window(inner_height);

        let visible_lines: Vec<Line> = self.lines[start..end]
            .iter()
            .map(|line| Line::from(Span::styled(line.text.as_str(), theme::log_line(line.kind))))
            .collect();

        let paragraph = Paragraph::new(visible_lines)
            .block(block)
            .wrap(Wrap { trim: false });

        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::LineKind;

    fn lines(n: usize) -> Vec<LogLine> {
        (0..n)
            .map(|i| LogLine {
                kind: LineKind::Stdout,
                text: i.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_follows_tail() {
        let lines = lines(20);
        let view = LogView::new(lines.iter());
        assert_eq!(view.window(5), (15, 20));
    }

    #[test]
    fn test_scroll_back_stops_at_top() {
        let lines = lines(20);
        assert_eq!(LogView::new(lines.iter()).scroll_back(10).window(5), (5, 10));
        assert_eq!(LogView::new(lines.iter()).scroll_back(100).window(5), (0, 5));
    }

    #[test]
    fn test_short_log() {
        let lines = lines(3);
        assert_eq!(LogView::new(lines.iter()).scroll_back(2).window(10), (0, 3));
    }
}
