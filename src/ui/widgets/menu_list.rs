//! Selectable list widget, optionally with check boxes and disabled rows

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::ui::theme;

pub struct MenuList<'a> {
    items: Vec<&'a str>,
    selected: usize,
    title: Option<&'a str>,
    focused: bool,
    checked: Option<&'a [bool]>,
    disabled: Vec<bool>,
}

impl<'a> MenuList<'a> {
    pub fn new(items: Vec<&'a str>, selected: usize) -> Self {
        // Clamp selected index to valid range to prevent out-of-bounds access
        let clamped_selected = if items.is_empty() {
            0
        } else {
            selected.min(items.len() - 1)
        };

        Self {
            items,
            selected: clamped_selected,
            title: None,
            focused: true,
            checked: None,
            disabled: Vec::new(),
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    /// Unfocused lists keep the cursor but use a plain border
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Render a `[x]` box per item
    pub fn checked(mut self, checked: &'a [bool]) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn disabled(mut self, disabled: Vec<bool>) -> Self {
        self.disabled = disabled;
        self
    }
}

impl Widget for MenuList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let is_cursor = i == self.selected && self.focused;
                let prefix = if is_cursor { "> " } else { "  " };
                let style = if is_cursor {
                    theme::selected()
                } else if self.disabled.get(i).copied().unwrap_or(false) {
                    theme::dim()
                } else {
                    theme::text()
                };
                let mut spans = vec![Span::styled(prefix, style)];
                if let Some(checked) = self.checked {
                    let mark = if checked.get(i).copied().unwrap_or(false) {
                        "[x] "
                    } else {
                        "[ ] "
                    };
                    spans.push(Span::styled(mark, style));
                }
                spans.push(Span::styled(*item, style));
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut block = Block::default().borders(Borders::ALL).border_style(if self.focused {
            theme::border_active()
        } else {
            theme::border()
        });

        if let Some(title) = self.title {
            block = block.title(Span::styled(title, theme::title()));
        }

        let list = List::new(items).block(block);

        // Use StatefulWidget so long lists scroll to the cursor
        let mut state = ListState::default().with_selected(Some(self.selected));
        StatefulWidget::render(list, area, buf, &mut state);
    }
}
