//! Drawn order card widget
//!
//! Renders the drawn prompt as a framed card:
//! - Title (bold, centered)
//! - Category the prompt came from (dimmed)
//! - Prompt text, word-wrapped and vertically centered
//! - Acknowledge hint at the bottom

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

/// Card size in cells (roughly a playing card in a terminal)
pub const CARD_WIDTH: u16 = 44;
pub const CARD_HEIGHT: u16 = 16;

pub struct OrderCard<'a> {
    text: &'a str,
    category: Option<&'a str>,
    title: &'a str,
    acknowledge: &'a str,
    theme: &'a Theme,
}

impl<'a> OrderCard<'a> {
    pub fn new(text: &'a str, theme: &'a Theme) -> Self {
        Self {
            text,
            category: None,
            title: "",
            acknowledge: "",
            theme,
        }
    }

    pub fn category(mut self, category: Option<&'a str>) -> Self {
        self.category = category;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn acknowledge(mut self, label: &'a str) -> Self {
        self.acknowledge = label;
        self
    }
}

impl<'a> Widget for OrderCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        let base = Style::default().fg(self.theme.card_fg).bg(self.theme.card_bg);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(base)
            .style(base);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let max_y = inner.y + inner.height;
        let mut y = inner.y;

        // Header
        if !self.title.is_empty() {
            let style = base.add_modifier(Modifier::BOLD);
            put_centered(buf, inner, y, &truncate(self.title, width), style);
            y += 1;
        }
        if let Some(category) = self.category {
            if y < max_y {
                let style = Style::default().fg(self.theme.dimmed).bg(self.theme.card_bg);
                put_centered(buf, inner, y, &truncate(category, width), style);
                y += 1;
            }
        }

        // Footer takes the last line
        let footer_y = max_y.saturating_sub(1);
        let body_end = if self.acknowledge.is_empty() { max_y } else { footer_y };
        if !self.acknowledge.is_empty() && footer_y >= y {
            let hint = format!("[ Enter: {} ]", self.acknowledge);
            let style = Style::default().fg(self.theme.accent).bg(self.theme.card_bg);
            put_centered(buf, inner, footer_y, &truncate(&hint, width), style);
        }

        // Body, one blank line of padding on each side where room allows
        let padding = 2usize;
        let body_width = width.saturating_sub(padding * 2).max(1);
        let body_top = (y + 1).min(body_end);
        let body_height = body_end.saturating_sub(body_top) as usize;
        if body_height == 0 {
            return;
        }

        let mut lines = wrap_text(self.text, body_width);
        if lines.len() > body_height {
            lines.truncate(body_height);
            if let Some(last) = lines.last_mut() {
                *last = truncate(&format!("{}…", last), body_width);
            }
        }

        let offset = (body_height - lines.len()) / 2;
        let style = base.add_modifier(Modifier::BOLD);
        for (i, line) in lines.iter().enumerate() {
            put_centered(buf, inner, body_top + (offset + i) as u16, line, style);
        }
    }
}

/// Word-wrap text into lines no wider than `width`
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Truncate string to fit within max_width, adding ellipsis if needed
pub fn truncate(s: &str, max_width: usize) -> String {
    let width = s.width();
    if width <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let mut result = String::new();
        let mut current_width = 0;

        for c in s.chars() {
            let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width + 1 > max_width {
                result.push('…');
                break;
            }
            result.push(c);
            current_width += char_width;
        }

        result
    }
}

fn put_centered(buf: &mut Buffer, inner: Rect, y: u16, text: &str, style: Style) {
    let text_width = (text.width() as u16).min(inner.width);
    let x = inner.x + (inner.width - text_width) / 2;
    buf.set_string(x, y, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        let area = buf.area;
        (area.x..area.x + area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("Seize the bridge before the bells ring", 12);
        assert!(lines.iter().all(|l| l.width() <= 12));
        assert_eq!(lines.join(" "), "Seize the bridge before the bells ring");
    }

    #[test]
    fn test_render_card() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);

        OrderCard::new("Hold the gate", &theme)
            .title("ORDERS")
            .category(Some("combat"))
            .acknowledge("Acknowledge")
            .render(area, &mut buf);

        let rendered: Vec<String> = (0..10).map(|y| row(&buf, y)).collect();
        assert!(rendered[1].contains("ORDERS"));
        assert!(rendered[2].contains("combat"));
        assert!(rendered.iter().any(|r| r.contains("Hold the gate")));
        assert!(rendered[8].contains("Enter: Acknowledge"));
    }

    #[test]
    fn test_render_tiny_area() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        OrderCard::new("anything", &theme).render(area, &mut buf);
    }
}
