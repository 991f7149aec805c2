use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Borders;

/// Набор глифов для линий дерева.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlyphSet {
    #[default]
    Unicode,
    Ascii,
}

/// Визуальные настройки виджета дерева.
///
/// Item colours, fonts and connector colour come from the tree's preferences;
/// these styles are patched on top.
#[derive(Clone)]
pub struct ItemTreeStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    pub selection_style: Style,
    pub focus_style: Style,
    pub line_style: Style,
    pub borders: Borders,
    pub glyph_set: GlyphSet,
}

impl Default for ItemTreeStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            selection_style: Style::default().add_modifier(Modifier::REVERSED),
            focus_style: Style::default().add_modifier(Modifier::UNDERLINED),
            line_style: Style::default(),
            borders: Borders::ALL,
            glyph_set: GlyphSet::Unicode,
        }
    }
}
