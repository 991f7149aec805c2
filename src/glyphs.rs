use std::borrow::Cow;

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::context::RowContext;
use crate::layout::ItemRow;
use crate::prefs::ConnectorStyle;
use crate::tree::ItemTree;

/// Connector segments, each exactly one connector column wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeGlyphs {
    pub branch: String,
    pub branch_last: String,
    pub vert: String,
    pub empty: String,
}

impl TreeGlyphs {
    /// Box-drawing connectors.
    pub fn unicode(style: ConnectorStyle, width: u16) -> Self {
        match style {
            ConnectorStyle::None => Self::blank(width),
            ConnectorStyle::Dotted => Self::build('├', '└', '┊', '┈', width),
            ConnectorStyle::Solid => Self::build('├', '└', '│', '─', width),
        }
    }

    /// Connectors for terminals without box-drawing glyphs.
    pub fn ascii(style: ConnectorStyle, width: u16) -> Self {
        match style {
            ConnectorStyle::None => Self::blank(width),
            ConnectorStyle::Dotted => Self::build(':', '`', ':', '.', width),
            ConnectorStyle::Solid => Self::build('|', '`', '|', '-', width),
        }
    }

    fn blank(width: u16) -> Self {
        let empty = " ".repeat(usize::from(width));
        Self {
            branch: empty.clone(),
            branch_last: empty.clone(),
            vert: empty.clone(),
            empty,
        }
    }

    fn build(tee: char, corner: char, vert: char, horiz: char, width: u16) -> Self {
        let width = usize::from(width);
        if width == 0 {
            return Self::blank(0);
        }
        let segment = |head: char, fill: char| {
            let mut out = String::with_capacity(width * 3);
            out.push(head);
            out.extend(std::iter::repeat_n(fill, width - 1));
            out
        };
        Self {
            branch: segment(tee, horiz),
            branch_last: segment(corner, horiz),
            vert: segment(vert, ' '),
            empty: " ".repeat(width),
        }
    }
}

struct RowLine<'a> {
    spans: Vec<Span<'a>>,
    col: usize,
}

impl<'a> RowLine<'a> {
    fn push(&mut self, span: Span<'a>) {
        self.col += span.content.width();
        self.spans.push(span);
    }

    fn pad_to(&mut self, col: usize) {
        if col > self.col {
            self.spans.push(Span::raw(Cow::Owned(" ".repeat(col - self.col))));
            self.col = col;
        }
    }
}

/// Builds the part of a row left of the label: margin, connectors, the
/// open/close icon and the user icon, padded to the label's start column.
pub fn row_prefix_line<'a>(tree: &'a ItemTree, row: &ItemRow, ctx: &RowContext<'a>) -> Line<'a> {
    let mut line = RowLine {
        spans: Vec::with_capacity(ctx.is_tail_stack.len() + 6),
        col: 0,
    };
    line.pad_to(usize::from(tree.marginleft()));

    let level = ctx.is_tail_stack.len();
    for (l, is_last) in ctx.is_tail_stack.iter().enumerate() {
        let part = if l + 1 == level {
            if *is_last {
                &ctx.glyphs.branch_last
            } else {
                &ctx.glyphs.branch
            }
        } else if *is_last {
            &ctx.glyphs.empty
        } else {
            &ctx.glyphs.vert
        };
        line.push(Span::styled(part.as_str(), ctx.line_style));
    }
    line.pad_to(row.x());

    if let Some(collapse) = row.collapse() {
        if ctx.has_children {
            let icon = if ctx.is_open {
                tree.openicon()
            } else {
                tree.closeicon()
            };
            line.push(Span::styled(icon, ctx.line_style));
        }
        line.pad_to(collapse.end);
    }

    if let Some(extent) = row.usericon() {
        let icon = tree
            .item(row.id())
            .and_then(|item| item.usericon())
            .or_else(|| tree.usericon())
            .unwrap_or_default();
        line.pad_to(extent.start);
        line.push(Span::raw(icon));
        line.pad_to(extent.end);
    }

    line.pad_to(row.label().start);
    Line::from(line.spans)
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::*;

    #[test]
    fn segments_match_connector_width() {
        let glyphs = TreeGlyphs::unicode(ConnectorStyle::Solid, 4);
        assert_eq!(glyphs.branch, "├───");
        assert_eq!(glyphs.branch_last, "└───");
        assert_eq!(glyphs.vert, "│   ");
        assert_eq!(glyphs.empty, "    ");

        let none = TreeGlyphs::ascii(ConnectorStyle::None, 2);
        assert_eq!(none.branch, "  ");
        assert_eq!(TreeGlyphs::ascii(ConnectorStyle::Solid, 0).branch, "");
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn prefix_draws_connectors_and_icons() {
        let mut tree = ItemTree::new();
        tree.set_showroot(false);
        for path in ["a/a1/x", "a/a2", "b"] {
            tree.add(path).unwrap();
        }
        let a1 = tree.find_item("a/a1").unwrap();
        let x = tree.find_item("a/a1/x").unwrap();
        tree.resize(Rect::new(0, 0, 40, 10));

        let glyphs = TreeGlyphs::unicode(ConnectorStyle::Solid, 3);
        let line_for = |id| {
            let row = tree.item_row(id).unwrap();
            let item = tree.item(id).unwrap();
            let tail_stack = tree.tail_stack(row);
            let ctx = RowContext {
                level: row.level(),
                is_tail_stack: &tail_stack,
                is_open: item.is_open(),
                has_children: item.has_children(),
                is_selected: false,
                is_focused: false,
                glyphs: &glyphs,
                line_style: ratatui::style::Style::default(),
                selection_style: ratatui::style::Style::default(),
                focus_style: ratatui::style::Style::default(),
                hscroll: 0,
                vskip: 0,
            };
            text(&row_prefix_line(&tree, row, &ctx))
        };

        assert_eq!(line_for(a1), "├──▼ ");
        assert_eq!(line_for(x), "│  └──  ");
        assert_eq!(line_for(tree.find_item("b").unwrap()), "  ");
    }
}
