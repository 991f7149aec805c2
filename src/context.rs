use ratatui::style::Style;

use crate::glyphs::TreeGlyphs;

/// Per-row drawing context handed to [`ItemRenderer::draw`](crate::ItemRenderer::draw).
#[derive(Clone, Copy)]
pub struct RowContext<'a> {
    pub level: u16,
    pub is_tail_stack: &'a [bool],
    pub is_open: bool,
    pub has_children: bool,
    pub is_selected: bool,
    pub is_focused: bool,
    pub glyphs: &'a TreeGlyphs,
    pub line_style: Style,
    pub selection_style: Style,
    pub focus_style: Style,
    /// Content columns scrolled out to the left.
    pub hscroll: usize,
    /// Lines of a tall row scrolled out above the viewport.
    pub vskip: u16,
}
