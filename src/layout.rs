use ratatui::layout::Rect;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use unicode_width::UnicodeWidthStr;

use crate::item::ItemId;
use crate::prefs::TreePrefs;
use crate::tree::ItemTree;

/// Half-open column range `[start, end)` in content coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub start: usize,
    pub end: usize,
}

impl Extent {
    pub const fn new(start: usize, width: usize) -> Self {
        Self {
            start,
            end: start + width,
        }
    }

    pub const fn width(&self) -> usize {
        self.end - self.start
    }

    pub const fn contains(&self, x: usize) -> bool {
        x >= self.start && x < self.end
    }
}

/// Geometry of one visible item, produced by the layout pass.
#[derive(Clone, Debug)]
pub struct ItemRow {
    pub(crate) id: ItemId,
    pub(crate) level: u16,
    pub(crate) y: usize,
    pub(crate) height: u16,
    pub(crate) x: usize,
    pub(crate) collapse: Option<Extent>,
    pub(crate) usericon: Option<Extent>,
    pub(crate) label: Extent,
    pub(crate) widget: Option<Extent>,
}

impl ItemRow {
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Indentation level (number of connector columns).
    pub const fn level(&self) -> u16 {
        self.level
    }

    /// Top of the row in content coordinates.
    pub const fn y(&self) -> usize {
        self.y
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Column where the item starts, right of its connectors.
    pub const fn x(&self) -> usize {
        self.x
    }

    pub const fn collapse(&self) -> Option<Extent> {
        self.collapse
    }

    pub const fn usericon(&self) -> Option<Extent> {
        self.usericon
    }

    pub const fn label(&self) -> Extent {
        self.label
    }

    pub const fn widget(&self) -> Option<Extent> {
        self.widget
    }

    /// Rightmost content column occupied by the row.
    pub fn right(&self) -> usize {
        [self.collapse, self.usericon, Some(self.label), self.widget]
            .into_iter()
            .flatten()
            .map(|extent| extent.end)
            .max()
            .unwrap_or(self.x)
    }

    const fn bottom(&self) -> usize {
        self.y + self.height as usize
    }
}

/// Cached layout and viewport state of a tree.
#[derive(Clone, Debug)]
pub(crate) struct TreeLayout {
    dirty: bool,
    pub(crate) rows: Vec<ItemRow>,
    row_index: FxHashMap<ItemId, usize>,
    pub(crate) tree_w: usize,
    pub(crate) tree_h: usize,
    pub(crate) outer: Rect,
    pub(crate) inner: Rect,
    pub(crate) vpos: usize,
    pub(crate) hpos: usize,
    vscroll: bool,
    hscroll: bool,
    scrollbar_size: u16,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            dirty: true,
            rows: Vec::new(),
            row_index: FxHashMap::with_hasher(FxBuildHasher),
            tree_w: 0,
            tree_h: 0,
            outer: Rect::default(),
            inner: Rect::default(),
            vpos: 0,
            hpos: 0,
            vscroll: false,
            hscroll: false,
            scrollbar_size: 1,
        }
    }
}

impl TreeLayout {
    /// Marks the layout as stale; the next geometry operation recomputes it.
    pub(crate) const fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn row(&self, id: ItemId) -> Option<&ItemRow> {
        self.row_index.get(&id).map(|idx| &self.rows[*idx])
    }

    // Rows are only served between a layout pass and the next invalidation.
    fn current_rows(&self) -> &[ItemRow] {
        if self.dirty { &[] } else { self.rows.as_slice() }
    }

    fn current_row(&self, id: ItemId) -> Option<&ItemRow> {
        if self.dirty { None } else { self.row(id) }
    }

    fn max_vpos(&self) -> usize {
        self.tree_h.saturating_sub(usize::from(self.inner.height))
    }

    fn max_hpos(&self) -> usize {
        self.tree_w.saturating_sub(usize::from(self.inner.width))
    }

    fn row_at(&self, content_y: usize) -> Option<&ItemRow> {
        let idx = self.rows.partition_point(|row| row.bottom() <= content_y);
        self.rows.get(idx).filter(|row| row.y <= content_y)
    }
}

struct RowAccumulator {
    rows: Vec<ItemRow>,
    y: usize,
    width: usize,
}

// An item whose children are being laid out.
#[derive(Clone, Copy)]
struct LayoutFrame {
    id: ItemId,
    shown: bool,
    open: bool,
    child_level: u16,
    next_child: usize,
    rows_before: usize,
}

pub(crate) fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn collapse_width(prefs: &TreePrefs) -> usize {
    prefs.openicon.width().max(prefs.closeicon.width())
}

/// Layout pass, viewport and scrollbar geometry.
impl ItemTree {
    /// Walks the visible order once, assigning every visible item its row
    /// geometry and accumulating the content extent, then updates the
    /// viewport. Safe to call repeatedly.
    pub fn calc_tree(&mut self) {
        let mut acc = RowAccumulator {
            rows: Vec::with_capacity(self.layout.rows.len()),
            y: usize::from(self.prefs.margintop),
            width: 0,
        };
        if let Some(root) = self.root {
            self.push_rows(root, &mut acc);
        }

        let layout = &mut self.layout;
        if acc.rows.is_empty() {
            layout.tree_w = 0;
            layout.tree_h = 0;
        } else {
            layout.tree_w = acc.width;
            layout.tree_h = acc.y + usize::from(self.prefs.marginbottom);
        }
        layout.row_index.clear();
        layout.row_index.reserve(acc.rows.len());
        for (idx, row) in acc.rows.iter().enumerate() {
            layout.row_index.insert(row.id, idx);
        }
        layout.rows = acc.rows;
        layout.dirty = false;
        tracing::trace!(
            rows = layout.rows.len(),
            tree_w = layout.tree_w,
            tree_h = layout.tree_h,
            "layout pass"
        );
        self.calc_dimensions();
    }

    /// Schedules a layout pass for the next geometry operation.
    pub const fn recalc_tree(&mut self) {
        self.layout.invalidate();
    }

    pub(crate) fn ensure_layout(&mut self) {
        if self.layout.dirty {
            self.calc_tree();
        }
    }

    /// Splits the outer area into the content area and scrollbars.
    ///
    /// Each scrollbar is shown when the content exceeds the outer area in its
    /// direction; the decision for one does not account for the space taken by
    /// the other.
    pub fn calc_dimensions(&mut self) {
        let layout = &mut self.layout;
        let outer = layout.outer;
        let visible = !outer.is_empty();
        layout.vscroll = visible && layout.tree_h > usize::from(outer.height);
        layout.hscroll = visible && layout.tree_w > usize::from(outer.width);

        let mut inner = outer;
        if layout.vscroll {
            inner.width = inner.width.saturating_sub(layout.scrollbar_size);
        }
        if layout.hscroll {
            inner.height = inner.height.saturating_sub(layout.scrollbar_size);
        }
        layout.inner = inner;
        layout.vpos = layout.vpos.min(layout.max_vpos());
        layout.hpos = layout.hpos.min(layout.max_hpos());
    }

    /// Moves and resizes the tree's outer area, running a pending layout pass.
    pub fn resize(&mut self, area: Rect) {
        self.layout.outer = area;
        self.ensure_layout();
        self.calc_dimensions();
    }

    pub const fn outer_area(&self) -> Rect {
        self.layout.outer
    }

    /// Content area: the outer area minus visible scrollbars.
    pub const fn inner_area(&self) -> Rect {
        self.layout.inner
    }

    /// Width of the laid-out visible hierarchy.
    pub const fn tree_width(&self) -> usize {
        self.layout.tree_w
    }

    /// Height of the laid-out visible hierarchy.
    pub const fn tree_height(&self) -> usize {
        self.layout.tree_h
    }

    pub const fn scrollbar_size(&self) -> u16 {
        self.layout.scrollbar_size
    }

    pub fn set_scrollbar_size(&mut self, size: u16) {
        self.layout.scrollbar_size = size;
        self.calc_dimensions();
    }

    pub const fn is_vscroll_visible(&self) -> bool {
        self.layout.vscroll
    }

    pub const fn is_hscroll_visible(&self) -> bool {
        self.layout.hscroll
    }

    pub fn vscroll_area(&self) -> Option<Rect> {
        let layout = &self.layout;
        layout.vscroll.then(|| Rect {
            x: layout.outer.x + layout.inner.width,
            y: layout.outer.y,
            width: layout.outer.width - layout.inner.width,
            height: layout.inner.height,
        })
    }

    pub fn hscroll_area(&self) -> Option<Rect> {
        let layout = &self.layout;
        layout.hscroll.then(|| Rect {
            x: layout.outer.x,
            y: layout.outer.y + layout.inner.height,
            width: layout.inner.width,
            height: layout.outer.height - layout.inner.height,
        })
    }

    /// Vertical scroll offset in content rows.
    pub const fn vposition(&self) -> usize {
        self.layout.vpos
    }

    /// Sets the vertical scroll offset, clamped to the scrollable range.
    pub fn set_vposition(&mut self, pos: usize) {
        self.ensure_layout();
        let pos = pos.min(self.layout.max_vpos());
        if pos != self.layout.vpos {
            tracing::trace!(pos, "vposition");
            self.layout.vpos = pos;
        }
    }

    /// Horizontal scroll offset in content columns.
    pub const fn hposition(&self) -> usize {
        self.layout.hpos
    }

    pub fn set_hposition(&mut self, pos: usize) {
        self.ensure_layout();
        let pos = pos.min(self.layout.max_hpos());
        if pos != self.layout.hpos {
            tracing::trace!(pos, "hposition");
            self.layout.hpos = pos;
        }
    }

    /// Laid-out rows of all visible items, top to bottom.
    ///
    /// Empty while the layout is stale; call [`calc_tree`](Self::calc_tree)
    /// (or `resize`) after changing the hierarchy.
    pub fn rows(&self) -> &[ItemRow] {
        self.layout.current_rows()
    }

    /// Row of a visible item; `None` while the layout is stale.
    pub fn item_row(&self, id: ItemId) -> Option<&ItemRow> {
        self.layout.current_row(id)
    }

    /// One flag per connector column of the row, outermost first: whether
    /// that ancestor (or the item itself, for the last flag) is the last
    /// child of its parent.
    pub fn tail_stack(&self, row: &ItemRow) -> SmallVec<[bool; 8]> {
        let mut stack: SmallVec<[bool; 8]> = SmallVec::with_capacity(usize::from(row.level));
        let mut cur = row.id;
        for _ in 0..row.level {
            let Some(parent) = self.parent(cur) else {
                break;
            };
            stack.push(self.children(parent).last() == Some(&cur));
            cur = parent;
        }
        stack.reverse();
        stack
    }

    /// Rows that intersect the viewport.
    pub fn rows_in_view(&self) -> &[ItemRow] {
        let layout = &self.layout;
        let rows = layout.current_rows();
        let top = layout.vpos;
        let bottom = top + usize::from(layout.inner.height);
        let start = rows.partition_point(|row| row.bottom() <= top);
        let end = rows.partition_point(|row| row.y < bottom);
        &rows[start..end.max(start)]
    }

    /// Returns `true` if the whole row of the item lies inside the viewport.
    pub fn displayed(&mut self, id: ItemId) -> bool {
        self.ensure_layout();
        let layout = &self.layout;
        layout.row(id).is_some_and(|row| {
            row.y >= layout.vpos && row.bottom() <= layout.vpos + usize::from(layout.inner.height)
        })
    }

    /// Scrolls so the item's row starts `yoff` rows below the top of the viewport.
    pub fn show_item_offset(&mut self, id: ItemId, yoff: usize) -> bool {
        self.ensure_layout();
        let Some(row) = self.layout.row(id) else {
            return false;
        };
        let pos = row.y.saturating_sub(yoff);
        self.set_vposition(pos);
        true
    }

    pub fn show_item_top(&mut self, id: ItemId) -> bool {
        self.show_item_offset(id, 0)
    }

    pub fn show_item_middle(&mut self, id: ItemId) -> bool {
        let yoff = self.slack_below(id) / 2;
        self.show_item_offset(id, yoff)
    }

    pub fn show_item_bottom(&mut self, id: ItemId) -> bool {
        let yoff = self.slack_below(id);
        self.show_item_offset(id, yoff)
    }

    /// Scrolls the minimum amount needed to bring the item fully into view.
    pub fn show_item(&mut self, id: ItemId) -> bool {
        if self.displayed(id) {
            return true;
        }
        let Some(above) = self.layout.row(id).map(|row| row.y < self.layout.vpos) else {
            return false;
        };
        if above {
            self.show_item_top(id)
        } else {
            self.show_item_bottom(id)
        }
    }

    /// Centres the item unless it is already fully displayed.
    pub fn display(&mut self, id: ItemId) -> bool {
        if self.displayed(id) {
            return true;
        }
        self.show_item_middle(id)
    }

    /// Finds the item under a screen position. With `yonly`, only the row is
    /// considered; otherwise the column must also be right of the connectors.
    pub fn find_clicked(&mut self, column: u16, row: u16, yonly: bool) -> Option<ItemId> {
        self.ensure_layout();
        let layout = &self.layout;
        let inner = layout.inner;
        if row < inner.y || row >= inner.bottom() {
            return None;
        }
        if !yonly && (column < inner.x || column >= inner.right()) {
            return None;
        }
        let content_y = usize::from(row - inner.y) + layout.vpos;
        let hit = layout.row_at(content_y)?;
        if !yonly && self.content_x(column) < hit.x {
            return None;
        }
        Some(hit.id)
    }

    /// Screen area of the item's row, clipped to the viewport.
    pub fn item_area(&self, id: ItemId) -> Option<Rect> {
        let layout = &self.layout;
        let row = layout.current_row(id)?;
        let inner = layout.inner;
        let top = layout.vpos;
        let bottom = top + usize::from(inner.height);
        if row.y < top || row.y >= bottom {
            return None;
        }
        Some(Rect {
            x: inner.x,
            y: inner.y + to_u16(row.y - top),
            width: inner.width,
            height: to_u16(row.bottom().min(bottom) - row.y),
        })
    }

    /// Screen area assigned to the item's embedded control, clipped to the viewport.
    pub fn widget_area(&self, id: ItemId) -> Option<Rect> {
        let extent = self.layout.current_row(id)?.widget?;
        let area = self.item_area(id)?;
        let hpos = self.layout.hpos;
        let view_end = hpos + usize::from(area.width);
        let start = extent.start.max(hpos);
        let end = extent.end.min(view_end);
        if start >= end {
            return None;
        }
        Some(Rect {
            x: area.x + to_u16(start - hpos),
            width: to_u16(end - start),
            ..area
        })
    }

    pub(crate) fn content_x(&self, column: u16) -> usize {
        usize::from(column.saturating_sub(self.layout.inner.x)) + self.layout.hpos
    }

    fn slack_below(&mut self, id: ItemId) -> usize {
        self.ensure_layout();
        let height = self.layout.row(id).map_or(1, |row| row.height);
        usize::from(self.layout.inner.height.saturating_sub(height))
    }

    // Pre-order walk over open items with an explicit stack, so depth is
    // bounded by memory rather than the call stack.
    fn push_rows(&self, root: ItemId, acc: &mut RowAccumulator) {
        let mut stack: Vec<LayoutFrame> = Vec::new();
        self.enter_item(root, 0, acc, &mut stack);

        while let Some(frame) = stack.last_mut() {
            let children = &self.items[frame.id].children;
            if frame.open && frame.next_child < children.len() {
                let child = children[frame.next_child];
                frame.next_child += 1;
                let level = frame.child_level;
                self.enter_item(child, level, acc, &mut stack);
                continue;
            }
            let done = *frame;
            stack.pop();
            if done.shown && done.open && acc.rows.len() > done.rows_before {
                acc.y += usize::from(self.prefs.openchild_marginbottom);
            }
        }
    }

    fn enter_item(
        &self,
        id: ItemId,
        level: u16,
        acc: &mut RowAccumulator,
        stack: &mut Vec<LayoutFrame>,
    ) {
        let item = &self.items[id];
        // A hidden root still lays out its children, one level shallower.
        let shown = item.parent.is_some() || self.prefs.showroot;
        if shown && item.visible {
            let row = self.measure_row(id, level, acc.y);
            acc.y = row.bottom();
            acc.width = acc.width.max(row.right());
            acc.rows.push(row);
        }
        stack.push(LayoutFrame {
            id,
            shown,
            open: item.open,
            child_level: if shown { level.saturating_add(1) } else { level },
            next_child: 0,
            rows_before: acc.rows.len(),
        });
    }

    fn measure_row(&self, id: ItemId, level: u16, y: usize) -> ItemRow {
        let prefs = &self.prefs;
        let item = &self.items[id];
        let x = usize::from(prefs.marginleft) + usize::from(level) * usize::from(prefs.connectorwidth);
        let mut cursor = x;

        let mut collapse = None;
        if prefs.showcollapse {
            let extent = Extent::new(cursor, collapse_width(prefs));
            cursor = extent.end;
            collapse = Some(extent);
        }

        let mut usericon = None;
        if let Some(icon) = item.usericon().or(prefs.usericon.as_deref()) {
            let extent = Extent::new(cursor + usize::from(prefs.usericonmarginleft), icon.width());
            cursor = extent.end;
            usericon = Some(extent);
        }

        let widget = item.widget();
        let draw_label = widget.is_none() || prefs.item_draw_mode.label_and_widget;
        let (label_w, label_h) = self.item_renderer().measure(self, id);
        cursor += usize::from(prefs.labelmarginleft);
        let label = Extent::new(cursor, if draw_label { usize::from(label_w) } else { 0 });
        cursor = label.end;

        let mut content_h = if draw_label { label_h } else { 1 };
        let widget_extent = widget.map(|control| {
            if prefs.item_draw_mode.height_from_widget {
                content_h = content_h.max(control.height);
            }
            let start = if draw_label {
                cursor + usize::from(prefs.widgetmarginleft)
            } else {
                cursor
            };
            Extent::new(start, usize::from(control.width))
        });

        ItemRow {
            id,
            level,
            y,
            height: content_h.max(1).saturating_add(prefs.linespacing),
            x,
            collapse,
            usericon,
            label,
            widget: widget_extent,
        }
    }
}
