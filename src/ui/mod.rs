//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw.rs` - Tabs, order list, popups, status bar
//! - `theme.rs` - Color themes and presets
//! - `layout.rs` - List paging and popup placement
//! - `order_card.rs` - Drawn order card widget

mod draw;
pub mod layout;
pub mod order_card;
pub mod theme;

// Re-export main draw function
pub use draw::draw;
