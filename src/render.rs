use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::context::RowContext;
use crate::glyphs::row_prefix_line;
use crate::item::ItemId;
use crate::layout::{ItemRow, to_u16};
use crate::tree::ItemTree;

/// Part of a row hit by a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    /// The open/close icon of an item with children.
    OpenClose,
    UserIcon,
    /// The embedded control area.
    Widget,
    /// The label or any other part of the row right of the connectors.
    Label,
}

/// Pluggable per-item measuring, label drawing and hit-testing.
///
/// The tree calls `measure` during every layout pass; the view calls `label`
/// for each row in the viewport.
pub trait ItemRenderer {
    /// Width and height, in cells, of the item's label.
    fn measure(&self, tree: &ItemTree, id: ItemId) -> (u16, u16);

    /// Styled label content. Selection and focus styling is applied on top.
    fn label<'a>(&self, tree: &'a ItemTree, id: ItemId) -> Line<'a>;

    /// Draws one row into `area`, the on-screen part of the row.
    fn draw(&self, tree: &ItemTree, row: &ItemRow, ctx: &RowContext<'_>, area: Rect, buf: &mut Buffer) {
        let mut line = row_prefix_line(tree, row, ctx);
        if row.label().width() > 0 {
            let label = self.label(tree, row.id());
            let mut overlay = Style::default();
            if ctx.is_selected {
                overlay = overlay.patch(ctx.selection_style);
            }
            if ctx.is_focused {
                overlay = overlay.patch(ctx.focus_style);
            }
            let base = label.style;
            line.spans.extend(label.spans.into_iter().map(|span| {
                let style = base.patch(span.style).patch(overlay);
                span.style(style)
            }));
        }
        Paragraph::new(line)
            .scroll((ctx.vskip, to_u16(ctx.hscroll)))
            .render(area, buf);
    }

    /// Classifies a content column inside the row.
    fn hit_test(&self, tree: &ItemTree, row: &ItemRow, x: usize) -> HitTarget {
        if let Some(collapse) = row.collapse()
            && collapse.contains(x)
            && !tree.children(row.id()).is_empty()
        {
            return HitTarget::OpenClose;
        }
        if row.usericon().is_some_and(|icon| icon.contains(x)) {
            return HitTarget::UserIcon;
        }
        if row.widget().is_some_and(|widget| widget.contains(x)) {
            return HitTarget::Widget;
        }
        HitTarget::Label
    }
}

/// Draws the plain item label using the item's font and colours.
#[derive(Clone, Copy, Debug, Default)]
pub struct LabelRenderer;

impl ItemRenderer for LabelRenderer {
    fn measure(&self, tree: &ItemTree, id: ItemId) -> (u16, u16) {
        tree.item(id).map_or((0, 1), |item| {
            (to_u16(item.label().width()), item.labelsize().max(1))
        })
    }

    fn label<'a>(&self, tree: &'a ItemTree, id: ItemId) -> Line<'a> {
        let Some(item) = tree.item(id) else {
            return Line::default();
        };
        let mut style = Style::default()
            .fg(item.labelfgcolor())
            .add_modifier(item.labelfont());
        if let Some(bg) = item.labelbgcolor() {
            style = style.bg(bg);
        }
        Line::from(Span::styled(item.label(), style))
    }
}
