//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core palette ──────────────────────────────────────────────────────

pub const SKY_BLUE: Color = Color::Rgb(110, 181, 255); // #6eb5ff
pub const MINT: Color = Color::Rgb(118, 230, 178); // #76e6b2
pub const AMBER: Color = Color::Rgb(245, 205, 121); // #f5cd79
pub const ERROR_RED: Color = Color::Rgb(255, 107, 107); // #ff6b6b
pub const DIM_GRAY: Color = Color::Rgb(120, 130, 150); // #788296
pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 48, 64); // #2a3040

// ── Semantic styles ───────────────────────────────────────────────────

/// Breadcrumb header line.
pub fn header() -> Style {
    Style::default().fg(SKY_BLUE).add_modifier(Modifier::BOLD)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(SKY_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Currently selected row.
pub fn selected_row() -> Style {
    Style::default()
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Footer key hints.
pub fn key_hint() -> Style {
    Style::default().fg(DIM_GRAY)
}

/// Spinner and loading text.
pub fn loading() -> Style {
    Style::default().fg(AMBER)
}

/// Error text.
pub fn error() -> Style {
    Style::default().fg(ERROR_RED)
}

/// Success / confirmation text.
pub fn success() -> Style {
    Style::default().fg(MINT)
}

/// Secondary text (timestamps, labels).
pub fn dim() -> Style {
    Style::default().fg(DIM_GRAY)
}

/// Emphasized value (user codes, prompts).
pub fn emphasis() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}
