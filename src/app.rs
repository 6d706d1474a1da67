use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nucleo_matcher::{
    pattern::{CaseMatching, Normalization, Pattern},
    Matcher,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

use crate::catalog::OrderRow;
use crate::config::Config;
use crate::draw::{self, DrawError, DrawFilter};
use crate::store::OrderStore;
use crate::ui::layout::ListLayout;

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Pick a category and draw
    Home,
    /// Browse, add and delete orders
    Orders,
}

/// Application mode - determines what UI to show and how to handle input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    /// Normal navigation on the current tab
    Browse,
    /// Typing a new order
    Input { category: usize, text: String },
    /// Drawn order shown as a card until acknowledged
    Card {
        text: String,
        category: Option<String>,
    },
    /// Modal message (e.g. empty deck)
    Notice { title: String, message: String },
    /// Waiting for y/n before deleting the marked rows (or the selected one)
    ConfirmDelete { rows: Vec<OrderRow> },
    /// Quit requested
    Exit,
}

/// Application state.
///
/// The store's catalog is the only source of truth; `rows` is rebuilt from it
/// after every mutation.
pub struct App {
    mode: AppMode,
    tab: Tab,
    store: OrderStore,
    config: Config,
    /// Flattened (category, text) rows of the catalog
    rows: Vec<OrderRow>,
    /// Filtered rows (indices into `rows`)
    filtered: Vec<usize>,
    /// Currently selected index in filtered list
    selected: usize,
    /// Current filter text
    filter: String,
    /// Whether we're in filter input mode
    filtering: bool,
    /// Rows marked for batch deletion (indices into `rows`)
    marked: BTreeSet<usize>,
    /// Draw choices on the home tab; `None` is "any category"
    draw_choices: Vec<Option<String>>,
    draw_selected: usize,
    list_layout: ListLayout,
    matcher: Matcher,
    rng: StdRng,
}

impl App {
    pub fn new(store: OrderStore, config: Config) -> Self {
        Self::with_rng(store, config, StdRng::from_os_rng())
    }

    /// Same as `new` with a caller-supplied RNG
    pub fn with_rng(store: OrderStore, config: Config, rng: StdRng) -> Self {
        let mut app = Self {
            mode: AppMode::Browse,
            tab: Tab::Home,
            store,
            config,
            rows: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            filter: String::new(),
            filtering: false,
            marked: BTreeSet::new(),
            draw_choices: Vec::new(),
            draw_selected: 0,
            list_layout: ListLayout::default(),
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            rng,
        };
        app.refresh();
        app
    }

    // --- accessors -------------------------------------------------------

    pub fn mode(&self) -> &AppMode {
        &self.mode
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn should_exit(&self) -> bool {
        matches!(self.mode, AppMode::Exit)
    }

    /// Get currently visible rows
    pub fn visible_rows(&self) -> Vec<&OrderRow> {
        self.filtered.iter().map(|&i| &self.rows[i]).collect()
    }

    /// Get the currently selected row
    pub fn selected_row(&self) -> Option<&OrderRow> {
        self.filtered.get(self.selected).map(|&i| &self.rows[i])
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    /// Whether the visible row at `idx` is marked for deletion
    pub fn is_marked(&self, idx: usize) -> bool {
        self.filtered
            .get(idx)
            .is_some_and(|row| self.marked.contains(row))
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn draw_choices(&self) -> &[Option<String>] {
        &self.draw_choices
    }

    pub fn draw_selected(&self) -> usize {
        self.draw_selected
    }

    pub fn list_layout(&self) -> &ListLayout {
        &self.list_layout
    }

    /// Keep list paging in step with the terminal height
    pub fn set_visible_rows(&mut self, rows: u16) {
        self.list_layout = ListLayout::new(rows);
    }

    /// Categories a new order can go into: configured ones, then any extra
    /// categories already in the catalog
    pub fn input_categories(&self) -> Vec<String> {
        let mut categories = self.config.behavior.categories.clone();
        for name in self.store.catalog().categories() {
            if !categories.iter().any(|c| c == name) {
                categories.push(name.to_string());
            }
        }
        categories
    }

    // --- view model ------------------------------------------------------

    /// Rebuild rows and draw choices from the catalog
    fn refresh(&mut self) {
        self.rows = self.store.catalog().rows();
        self.marked.clear();

        self.draw_choices = std::iter::once(None)
            .chain(self.input_categories().into_iter().map(Some))
            .collect();
        if self.draw_selected >= self.draw_choices.len() {
            self.draw_selected = 0;
        }

        self.update_filtered();
    }

    /// Update filtered list based on current filter
    fn update_filtered(&mut self) {
        if self.filter.is_empty() {
            self.filtered = (0..self.rows.len()).collect();
        } else {
            let pattern = Pattern::parse(&self.filter, CaseMatching::Ignore, Normalization::Smart);

            let mut scored: Vec<(usize, u32)> = self
                .rows
                .iter()
                .enumerate()
                .filter_map(|(i, row)| {
                    let haystack = format!("{} {}", row.text, row.category);
                    let mut buf = Vec::new();
                    pattern
                        .score(nucleo_matcher::Utf32Str::new(&haystack, &mut buf), &mut self.matcher)
                        .map(|score| (i, score))
                })
                .collect();

            // Best match first, catalog order among equals
            scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            self.filtered = scored.into_iter().map(|(i, _)| i).collect();
        }

        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    // --- operations ------------------------------------------------------

    /// Draw from the currently selected choice and show the result
    pub fn draw_order(&mut self) {
        let choice = self.draw_choices.get(self.draw_selected).cloned().flatten();
        let filter = DrawFilter::from_option(choice.clone());

        self.mode = match draw::draw(self.store.catalog(), &filter, &mut self.rng) {
            Ok(text) => AppMode::Card {
                text: text.to_string(),
                category: choice,
            },
            Err(DrawError::EmptyPool { filter }) => {
                tracing::info!("Draw from empty pool ({})", filter);
                let message = match filter {
                    DrawFilter::Any => "There are no orders in the list!".to_string(),
                    DrawFilter::Category(name) => format!("There are no {} orders!", name),
                };
                AppMode::Notice {
                    title: "Empty Deck".to_string(),
                    message: format!("{}\nGo to the Orders tab to add some.", message),
                }
            }
        };
    }

    /// Add the typed order and leave input mode
    fn submit_input(&mut self) -> Result<()> {
        let AppMode::Input { category, ref text } = self.mode else {
            return Ok(());
        };
        let categories = self.input_categories();
        let name = categories
            .get(category)
            .cloned()
            .unwrap_or_else(|| crate::catalog::NARRATIVE.to_string());

        let text = text.clone();
        self.mode = AppMode::Browse;
        if self.store.add(&name, &text)? {
            self.refresh();
            // Select the new row (last of its category)
            if let Some(pos) = self
                .filtered
                .iter()
                .rposition(|&i| self.rows[i].category == name && self.rows[i].text == text.trim())
            {
                self.selected = pos;
            }
        }
        Ok(())
    }

    /// Mark or unmark the selected row, then move down
    fn toggle_mark(&mut self) {
        let Some(&row) = self.filtered.get(self.selected) else {
            return;
        };
        if !self.marked.remove(&row) {
            self.marked.insert(row);
        }
        self.selected = self.list_layout.move_down(self.selected, self.filtered.len());
    }

    /// Delete the marked rows, or the selected row when nothing is marked.
    /// Asks first if configured.
    fn request_delete(&mut self) -> Result<()> {
        let rows: Vec<OrderRow> = if self.marked.is_empty() {
            self.selected_row().cloned().into_iter().collect()
        } else {
            self.marked.iter().map(|&i| self.rows[i].clone()).collect()
        };
        if rows.is_empty() {
            return Ok(());
        }
        if self.config.behavior.confirm_delete {
            self.mode = AppMode::ConfirmDelete { rows };
            Ok(())
        } else {
            self.delete_rows(&rows)
        }
    }

    fn delete_rows(&mut self, rows: &[OrderRow]) -> Result<()> {
        self.mode = AppMode::Browse;
        let removed = match rows {
            [row] => usize::from(self.store.remove(&row.category, &row.text)?),
            _ => self.store.remove_many(
                rows.iter()
                    .map(|row| (row.category.as_str(), row.text.as_str())),
            )?,
        };
        if removed > 0 {
            self.refresh();
        }
        Ok(())
    }

    // --- input -----------------------------------------------------------

    /// Dispatch a key press for the current mode
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.mode = AppMode::Exit;
            return Ok(());
        }

        match self.mode {
            AppMode::Card { .. } | AppMode::Notice { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.mode = AppMode::Browse;
                }
                Ok(())
            }
            AppMode::ConfirmDelete { ref rows } => {
                let rows = rows.clone();
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.delete_rows(&rows),
                    _ => {
                        self.mode = AppMode::Browse;
                        Ok(())
                    }
                }
            }
            AppMode::Input { .. } => self.handle_input_key(key),
            AppMode::Browse => match self.tab {
                Tab::Home => {
                    self.handle_home_key(key);
                    Ok(())
                }
                Tab::Orders if self.filtering => {
                    self.handle_filter_key(key);
                    Ok(())
                }
                Tab::Orders => self.handle_orders_key(key),
            },
            AppMode::Exit => Ok(()),
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.mode = AppMode::Exit,
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = match self.tab {
                    Tab::Home => Tab::Orders,
                    Tab::Orders => Tab::Home,
                };
            }
            KeyCode::Char('1') => self.tab = Tab::Home,
            KeyCode::Char('2') => self.tab = Tab::Orders,
            _ => return false,
        }
        true
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        if self.handle_global_key(key) {
            return;
        }
        let total = self.draw_choices.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Left | KeyCode::Char('h') => {
                self.draw_selected = if self.draw_selected == 0 {
                    total.saturating_sub(1)
                } else {
                    self.draw_selected - 1
                };
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Right | KeyCode::Char('l') => {
                self.draw_selected = if total == 0 { 0 } else { (self.draw_selected + 1) % total };
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('g') => self.draw_order(),
            _ => {}
        }
    }

    fn handle_orders_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.handle_global_key(key) {
            return Ok(());
        }
        let total = self.filtered.len();
        let layout = self.list_layout;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = layout.move_up(self.selected),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = layout.move_down(self.selected, total)
            }
            KeyCode::PageUp => self.selected = layout.page_up(self.selected),
            KeyCode::PageDown => self.selected = layout.page_down(self.selected, total),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = layout.move_end(total),
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.mode = AppMode::Input {
                    category: 0,
                    text: String::new(),
                };
            }
            KeyCode::Char(' ') => self.toggle_mark(),
            KeyCode::Char('u') => self.marked.clear(),
            KeyCode::Char('d') | KeyCode::Delete => return self.request_delete(),
            KeyCode::Char('/') => self.filtering = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.filtering = false;
                self.update_filtered();
            }
            KeyCode::Enter => self.filtering = false,
            KeyCode::Backspace => {
                self.filter.pop();
                if self.filter.is_empty() {
                    self.filtering = false;
                }
                self.update_filtered();
            }
            KeyCode::Up => self.selected = self.list_layout.move_up(self.selected),
            KeyCode::Down => {
                self.selected = self.list_layout.move_down(self.selected, self.filtered.len())
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.update_filtered();
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Result<()> {
        let category_count = self.input_categories().len().max(1);
        let AppMode::Input { category, text } = &mut self.mode else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => self.mode = AppMode::Browse,
            KeyCode::Enter => return self.submit_input(),
            KeyCode::Tab => *category = (*category + 1) % category_count,
            KeyCode::BackTab => *category = (*category + category_count - 1) % category_count,
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char(c) => text.push(c),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{COMBAT, NARRATIVE};
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(press(KeyCode::Char(c))).unwrap();
        }
    }

    fn test_app(dir: &TempDir) -> App {
        let store = OrderStore::new(dir.path().join("orders.json"));
        App::with_rng(store, Config::default(), StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_starts_on_home() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        assert_eq!(app.tab(), Tab::Home);
        assert_eq!(app.mode(), &AppMode::Browse);
        assert_eq!(
            app.draw_choices(),
            &[None, Some(COMBAT.to_string()), Some(NARRATIVE.to_string())]
        );
    }

    #[test]
    fn test_draw_empty_deck_shows_notice() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_key(press(KeyCode::Enter)).unwrap();

        match app.mode() {
            AppMode::Notice { title, message } => {
                assert_eq!(title, "Empty Deck");
                assert!(message.contains("no orders"));
            }
            other => panic!("expected notice, got {:?}", other),
        }

        app.handle_key(press(KeyCode::Enter)).unwrap();
        assert_eq!(app.mode(), &AppMode::Browse);
    }

    #[test]
    fn test_add_then_draw() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.handle_key(press(KeyCode::Tab)).unwrap();
        assert_eq!(app.tab(), Tab::Orders);

        app.handle_key(press(KeyCode::Char('a'))).unwrap();
        type_str(&mut app, "  Take the high ground ");
        app.handle_key(press(KeyCode::Enter)).unwrap();

        assert_eq!(app.mode(), &AppMode::Browse);
        assert_eq!(app.store().catalog().get(COMBAT).unwrap(), &["Take the high ground"]);
        assert_eq!(app.visible_rows().len(), 1);

        // Back home, choose "combat" and draw
        app.handle_key(press(KeyCode::Char('1'))).unwrap();
        app.handle_key(press(KeyCode::Down)).unwrap();
        app.handle_key(press(KeyCode::Enter)).unwrap();
        assert_eq!(
            app.mode(),
            &AppMode::Card {
                text: "Take the high ground".to_string(),
                category: Some(COMBAT.to_string()),
            }
        );
    }

    #[test]
    fn test_input_tab_cycles_category() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        app.handle_key(press(KeyCode::Char('a'))).unwrap();
        app.handle_key(press(KeyCode::Tab)).unwrap();
        type_str(&mut app, "Meet the oracle");
        app.handle_key(press(KeyCode::Enter)).unwrap();

        assert_eq!(app.store().catalog().get(NARRATIVE).unwrap(), &["Meet the oracle"]);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        app.handle_key(press(KeyCode::Char('a'))).unwrap();
        type_str(&mut app, "   ");
        app.handle_key(press(KeyCode::Enter)).unwrap();

        assert!(app.store().catalog().is_empty());
        assert!(!app.store().path().exists());
    }

    #[test]
    fn test_delete_selected_row() {
        let dir = TempDir::new().unwrap();
        let mut store = OrderStore::new(dir.path().join("orders.json"));
        store.add(COMBAT, "c1").unwrap();
        store.add(NARRATIVE, "n1").unwrap();
        let mut app = App::with_rng(store, Config::default(), StdRng::seed_from_u64(3));

        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        app.handle_key(press(KeyCode::Down)).unwrap();
        app.handle_key(press(KeyCode::Char('d'))).unwrap();

        assert_eq!(app.store().catalog().get(NARRATIVE).unwrap().len(), 0);
        assert_eq!(app.visible_rows().len(), 1);
        assert_eq!(app.selected_index(), 0);
    }

    #[test]
    fn test_delete_marked_rows_in_one_batch() {
        let dir = TempDir::new().unwrap();
        let mut store = OrderStore::new(dir.path().join("orders.json"));
        store.add(COMBAT, "c1").unwrap();
        store.add(COMBAT, "c2").unwrap();
        store.add(NARRATIVE, "n1").unwrap();
        let mut app = App::with_rng(store, Config::default(), StdRng::seed_from_u64(3));

        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        // Mark c1, skip c2, mark n1
        app.handle_key(press(KeyCode::Char(' '))).unwrap();
        app.handle_key(press(KeyCode::Down)).unwrap();
        app.handle_key(press(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.marked_count(), 2);
        assert!(app.is_marked(0));
        assert!(!app.is_marked(1));
        assert!(app.is_marked(2));

        app.handle_key(press(KeyCode::Char('d'))).unwrap();
        assert_eq!(app.marked_count(), 0);
        assert_eq!(app.store().catalog().get(COMBAT).unwrap(), &["c2"]);
        assert!(app.store().catalog().get(NARRATIVE).unwrap().is_empty());

        let reloaded = OrderStore::open(app.store().path()).unwrap();
        assert_eq!(reloaded.total(), 1);
    }

    #[test]
    fn test_toggle_mark_twice_unmarks() {
        let dir = TempDir::new().unwrap();
        let mut store = OrderStore::new(dir.path().join("orders.json"));
        store.add(COMBAT, "c1").unwrap();
        let mut app = App::with_rng(store, Config::default(), StdRng::seed_from_u64(3));

        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        app.handle_key(press(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.marked_count(), 1);
        app.handle_key(press(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.marked_count(), 0);
    }

    #[test]
    fn test_confirm_delete() {
        let dir = TempDir::new().unwrap();
        let mut store = OrderStore::new(dir.path().join("orders.json"));
        store.add(COMBAT, "c1").unwrap();
        let mut config = Config::default();
        config.behavior.confirm_delete = true;
        let mut app = App::with_rng(store, config, StdRng::seed_from_u64(3));

        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        app.handle_key(press(KeyCode::Char('d'))).unwrap();
        assert!(matches!(app.mode(), AppMode::ConfirmDelete { .. }));

        // Anything but y cancels
        app.handle_key(press(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.store().total(), 1);

        app.handle_key(press(KeyCode::Char('d'))).unwrap();
        app.handle_key(press(KeyCode::Char('y'))).unwrap();
        assert_eq!(app.store().total(), 0);
    }

    #[test]
    fn test_filter_rows() {
        let dir = TempDir::new().unwrap();
        let mut store = OrderStore::new(dir.path().join("orders.json"));
        store.add(COMBAT, "Ambush the convoy").unwrap();
        store.add(NARRATIVE, "Visit the library").unwrap();
        let mut app = App::with_rng(store, Config::default(), StdRng::seed_from_u64(3));

        app.handle_key(press(KeyCode::Char('2'))).unwrap();
        app.handle_key(press(KeyCode::Char('/'))).unwrap();
        type_str(&mut app, "library");

        let rows = app.visible_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "Visit the library");

        app.handle_key(press(KeyCode::Esc)).unwrap();
        assert!(!app.is_filtering());
        assert_eq!(app.visible_rows().len(), 2);
    }

    #[test]
    fn test_extra_catalog_categories_are_offered() {
        let dir = TempDir::new().unwrap();
        let mut store = OrderStore::new(dir.path().join("orders.json"));
        store.add("social", "Charm the duke").unwrap();
        let app = App::with_rng(store, Config::default(), StdRng::seed_from_u64(3));

        assert_eq!(app.input_categories(), vec![COMBAT, NARRATIVE, "social"]);
        assert_eq!(app.draw_choices().len(), 4);
    }

    #[test]
    fn test_quit_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_exit());

        let mut app = test_app(&dir);
        app.handle_key(press(KeyCode::Char('q'))).unwrap();
        assert!(app.should_exit());
    }
}
