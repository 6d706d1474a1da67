//! Drawing functions for the TUI
//!
//! Tabs bar on top, the active tab in the middle, status bar at the bottom.
//! Cards, notices and delete confirmations are drawn as centered popups.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppMode, Tab};
use crate::draw::{pool, DrawFilter};
use crate::ui::layout::centered_rect;
use crate::ui::order_card::{truncate, OrderCard, CARD_HEIGHT, CARD_WIDTH};
use crate::ui::theme::Theme;

/// Width of the category column in the order list
const TAG_WIDTH: usize = 12;

/// Main draw function
pub fn draw(f: &mut Frame, app: &mut App, theme: &Theme) {
    let area = f.area();
    let bg_block = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tabs(f, app, chunks[0], theme);
    match app.tab() {
        Tab::Home => draw_home(f, app, chunks[1], theme),
        Tab::Orders => draw_orders(f, app, chunks[1], theme),
    }
    draw_status_bar(f, app, chunks[2], theme);

    // Popups on top
    let mode = app.mode().clone();
    match mode {
        AppMode::Card { ref text, ref category } => {
            let card_area = centered_rect(CARD_WIDTH, CARD_HEIGHT, area);
            f.render_widget(Clear, card_area);
            let appearance = &app.config().appearance;
            let card = OrderCard::new(text, theme)
                .title(&appearance.card_title)
                .category(category.as_deref())
                .acknowledge(&appearance.acknowledge_label);
            f.render_widget(card, card_area);
        }
        AppMode::Notice { ref title, ref message } => {
            draw_popup(f, area, title, message, theme);
        }
        AppMode::ConfirmDelete { ref rows } => {
            let question = match rows.as_slice() {
                [row] => format!("Delete \"{}\" from {}?", row.text, row.category),
                _ => format!("Delete {} marked orders?", rows.len()),
            };
            let message = format!("{}\n\ny: delete   any other key: keep", question);
            draw_popup(f, area, "Delete Order", &message, theme);
        }
        AppMode::Browse | AppMode::Input { .. } | AppMode::Exit => {}
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let selected = match app.tab() {
        Tab::Home => 0,
        Tab::Orders => 1,
    };
    let titles = vec![" 1 Draw ", " 2 Orders "];

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme.dimmed).bg(theme.background))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent))
                .title(" index-orders ")
                .style(Style::default().bg(theme.background)),
        );
    f.render_widget(tabs, area);
}

/// Draw tab: list of draw choices with the size of each pool
fn draw_home(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let catalog = app.store().catalog();
    let mut lines = vec![
        Line::from(Span::styled(
            "Choose a deck and press Enter to draw an order",
            Style::default().fg(theme.dimmed),
        )),
        Line::default(),
    ];
    if catalog.is_empty() {
        lines.insert(
            1,
            Line::from(Span::styled(
                "The deck is empty. Add orders on the Orders tab.",
                Style::default().fg(theme.warning),
            )),
        );
    }

    for (i, choice) in app.draw_choices().iter().enumerate() {
        let is_selected = i == app.draw_selected();
        let filter = DrawFilter::from_option(choice.clone());
        let count = pool(catalog, &filter).len();
        let label = match choice {
            Some(name) => name.clone(),
            None => "any category".to_string(),
        };

        let style = if is_selected {
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        let prefix = if is_selected { "● " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<16}", prefix, label), style),
            Span::styled(format!(" {:>4} orders", count), Style::default().fg(theme.dimmed)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.tag))
        .style(Style::default().bg(theme.background));
    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);
}

/// Orders tab: input/filter line and the paged list of rows
fn draw_orders(f: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    draw_input_line(f, app, chunks[0], theme);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.tag))
        .style(Style::default().bg(theme.background));
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    if inner.width == 0 || inner.height == 0 {
        return;
    }
    app.set_visible_rows(inner.height);

    let rows = app.visible_rows();
    if rows.is_empty() {
        let hint = if app.filter_text().is_empty() {
            "No orders yet. Press a to add one."
        } else {
            "No matching orders."
        };
        let para = Paragraph::new(hint).style(Style::default().fg(theme.dimmed));
        f.render_widget(para, inner);
        return;
    }

    let selected = app.selected_index();
    let range = app.list_layout().visible_range(selected, rows.len());
    let text_width = (inner.width as usize).saturating_sub(TAG_WIDTH + 3);

    for (offset, idx) in range.enumerate() {
        let row = rows[idx];
        let is_selected = idx == selected;
        let (fg, bg) = if is_selected {
            (theme.selection_fg, theme.selection_bg)
        } else {
            (theme.foreground, theme.background)
        };
        let (prefix, prefix_fg) = match (app.is_marked(idx), is_selected) {
            (true, _) => ("✗ ", theme.warning),
            (false, true) => ("● ", theme.accent),
            (false, false) => ("  ", theme.accent),
        };

        let line = Line::from(vec![
            Span::styled(prefix, Style::default().fg(prefix_fg).bg(bg)),
            Span::styled(
                tag_cell(&row.category),
                Style::default().fg(theme.tag).bg(bg).add_modifier(Modifier::ITALIC),
            ),
            Span::styled(truncate(&row.text, text_width), Style::default().fg(fg).bg(bg)),
        ]);
        let row_area = Rect {
            x: inner.x,
            y: inner.y + offset as u16,
            width: inner.width,
            height: 1,
        };
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(bg)),
            row_area,
        );
    }
}

/// Category column: truncated, then padded to `TAG_WIDTH` columns plus a gap.
/// Pads by display width so wide glyphs keep the text column aligned.
fn tag_cell(category: &str) -> String {
    let tag = truncate(category, TAG_WIDTH);
    let pad = TAG_WIDTH.saturating_sub(tag.width()) + 1;
    format!("{}{}", tag, " ".repeat(pad))
}

/// Input line: new order text, filter text, or a hint
fn draw_input_line(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let prompt = &app.config().appearance.prompt;

    let (title, text, style, cursor) = match app.mode() {
        AppMode::Input { category, text } => {
            let categories = app.input_categories();
            let name = categories.get(*category).map(String::as_str).unwrap_or("");
            (
                format!(" New {} order (Tab: category) ", name),
                format!("{}{}", prompt, text),
                Style::default().fg(theme.input_highlight),
                Some(prompt.width() + text.width()),
            )
        }
        _ if app.is_filtering() || !app.filter_text().is_empty() => (
            " Filter ".to_string(),
            format!("{}{}", prompt, app.filter_text()),
            Style::default().fg(theme.input_highlight),
            app.is_filtering()
                .then(|| prompt.width() + app.filter_text().width()),
        ),
        _ => (
            " Orders ".to_string(),
            format!("{}a: add   /: filter", prompt),
            Style::default().fg(theme.dimmed),
            None,
        ),
    };

    let para = Paragraph::new(text).style(style.bg(theme.background)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .title(title)
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(para, area);

    if let Some(width) = cursor {
        // +1 for the border on the left side of the block
        let cursor_x = (area.x + 1 + width as u16).min(area.x + area.width.saturating_sub(2));
        f.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn draw_popup(f: &mut Frame, area: Rect, title: &str, message: &str, theme: &Theme) {
    let popup = centered_rect(48, 8, area);
    f.render_widget(Clear, popup);

    let para = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.foreground).bg(theme.card_bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.warning))
                .title(format!(" {} ", title))
                .title_alignment(Alignment::Center)
                .style(Style::default().bg(theme.card_bg)),
        );
    f.render_widget(para, popup);
}

/// Draw the status bar
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let total = app.store().total();
    let status = match (app.mode(), app.tab()) {
        (AppMode::Card { .. }, _) | (AppMode::Notice { .. }, _) => {
            " Enter/Esc: dismiss".to_string()
        }
        (AppMode::ConfirmDelete { .. }, _) => " y: delete | any key: keep".to_string(),
        (AppMode::Input { .. }, _) => {
            " Enter: add | Tab: category | Esc: cancel".to_string()
        }
        (_, Tab::Home) => format!(
            " {} orders | ↑↓: deck | Enter: draw | Tab: orders | q: quit",
            total
        ),
        (_, Tab::Orders) if app.is_filtering() => format!(
            " {} matches | ESC: clear | Enter: keep filter",
            app.visible_rows().len()
        ),
        (_, Tab::Orders) if app.marked_count() > 0 => format!(
            " {} marked | Space: mark | d: delete marked | u: unmark all",
            app.marked_count()
        ),
        (_, Tab::Orders) => format!(
            " {}/{} | a: add | Space: mark | d: delete | /: filter | Tab: draw | q: quit",
            (app.selected_index() + 1).min(app.visible_rows().len()),
            app.visible_rows().len()
        ),
    };

    let status_bar =
        Paragraph::new(status).style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(status_bar, area);
}
