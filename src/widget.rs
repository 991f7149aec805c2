use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::style::Style;
use ratatui::widgets::{
    Block, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
};

use crate::context::RowContext;
use crate::glyphs::TreeGlyphs;
use crate::layout::to_u16;
use crate::style::{GlyphSet, ItemTreeStyle};
use crate::tree::ItemTree;

/// Основной виджет дерева: рисует [`ItemTree`] как stateful-виджет.
///
/// Rendering sizes the tree to the block's inner area, runs a pending layout
/// pass, draws the rows in the viewport through the tree's
/// [`ItemRenderer`](crate::ItemRenderer) and draws the scrollbars.
pub struct ItemTreeView<'a> {
    style: ItemTreeStyle<'a>,
}

impl<'a> ItemTreeView<'a> {
    pub const fn new(style: ItemTreeStyle<'a>) -> Self {
        Self { style }
    }

    fn glyphs(&self, tree: &ItemTree) -> TreeGlyphs {
        match self.style.glyph_set {
            GlyphSet::Unicode => TreeGlyphs::unicode(tree.connectorstyle(), tree.connectorwidth()),
            GlyphSet::Ascii => TreeGlyphs::ascii(tree.connectorstyle(), tree.connectorwidth()),
        }
    }

    #[inline]
    fn render_rows(&self, tree: &ItemTree, buf: &mut Buffer) {
        let glyphs = self.glyphs(tree);
        let line_style = Style::default()
            .fg(tree.connectorcolor())
            .patch(self.style.line_style);
        let content = tree.inner_area();
        let vpos = tree.vposition();
        let view_bottom = vpos + usize::from(content.height);
        let focus = tree.item_focus();
        let renderer = tree.item_renderer();

        for row in tree.rows_in_view() {
            let Some(item) = tree.item(row.id()) else {
                continue;
            };
            let top = row.y().max(vpos);
            let bottom = (row.y() + usize::from(row.height())).min(view_bottom);
            let area = Rect {
                x: content.x,
                y: content.y + to_u16(top - vpos),
                width: content.width,
                height: to_u16(bottom - top),
            };
            let tail_stack = tree.tail_stack(row);
            let ctx = RowContext {
                level: row.level(),
                is_tail_stack: &tail_stack,
                is_open: item.is_open(),
                has_children: item.has_children(),
                is_selected: item.is_selected(),
                is_focused: focus == Some(row.id()),
                glyphs: &glyphs,
                line_style,
                selection_style: self.style.selection_style,
                focus_style: self.style.focus_style,
                hscroll: tree.hposition(),
                vskip: to_u16(top - row.y()),
            };
            renderer.draw(tree, row, &ctx, area, buf);
        }
    }

    #[inline]
    fn render_scrollbars(tree: &ItemTree, buf: &mut Buffer) {
        let content = tree.inner_area();
        if let Some(area) = tree.vscroll_area() {
            let viewport = usize::from(content.height);
            let scroll_rows = tree.tree_height().saturating_sub(viewport);
            let mut state = ScrollbarState::new(scroll_rows.saturating_add(1))
                .position(tree.vposition().min(scroll_rows))
                .viewport_content_length(viewport);
            Scrollbar::new(ScrollbarOrientation::VerticalRight).render(area, buf, &mut state);
        }
        if let Some(area) = tree.hscroll_area() {
            let viewport = usize::from(content.width);
            let scroll_cols = tree.tree_width().saturating_sub(viewport);
            let mut state = ScrollbarState::new(scroll_cols.saturating_add(1))
                .position(tree.hposition().min(scroll_cols))
                .viewport_content_length(viewport);
            Scrollbar::new(ScrollbarOrientation::HorizontalBottom).render(area, buf, &mut state);
        }
    }
}

impl Default for ItemTreeView<'_> {
    fn default() -> Self {
        Self::new(ItemTreeStyle::default())
    }
}

impl StatefulWidget for ItemTreeView<'_> {
    type State = ItemTree;

    fn render(self, area: Rect, buf: &mut Buffer, tree: &mut Self::State) {
        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block = block
            .style(self.style.block_style)
            .border_style(self.style.border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        tree.resize(inner);
        tree.ensure_layout();
        let tree: &ItemTree = tree;
        self.render_rows(tree, buf);
        Self::render_scrollbars(tree, buf);
    }
}
