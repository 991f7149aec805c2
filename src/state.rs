use crate::action::{Direction, TreeReason};
use crate::error::TreeError;
use crate::item::ItemId;
use crate::prefs::{ReselectMode, SelectMode};
use crate::tree::ItemTree;

/// Open/close and selection state transitions.
///
/// Id-based mutators return whether state changed; stale ids are no-ops.
/// Every state change fires the callback when `notify` is set. Multi-item
/// operations snapshot the affected ids first and re-check each one after a
/// callback, since the callback may have removed it.
impl ItemTree {
    // ---------------------------------------------------------------------
    // Open / close
    // ---------------------------------------------------------------------

    pub fn open(&mut self, id: ItemId, notify: bool) -> bool {
        self.set_open(id, true, notify)
    }

    pub fn close(&mut self, id: ItemId, notify: bool) -> bool {
        self.set_open(id, false, notify)
    }

    pub fn open_toggle(&mut self, id: ItemId, notify: bool) -> bool {
        match self.items.get(id) {
            Some(item) => {
                let open = !item.open;
                self.set_open(id, open, notify)
            }
            None => false,
        }
    }

    pub fn open_path(&mut self, path: &str, notify: bool) -> Result<bool, TreeError> {
        let id = self.resolve(path)?;
        Ok(self.open(id, notify))
    }

    pub fn close_path(&mut self, path: &str, notify: bool) -> Result<bool, TreeError> {
        let id = self.resolve(path)?;
        Ok(self.close(id, notify))
    }

    pub fn is_open(&self, id: ItemId) -> bool {
        self.items.get(id).is_some_and(|item| item.open)
    }

    pub fn is_close(&self, id: ItemId) -> bool {
        self.items.get(id).is_some_and(|item| !item.open)
    }

    pub fn is_open_path(&self, path: &str) -> Result<bool, TreeError> {
        self.resolve(path).map(|id| self.is_open(id))
    }

    pub fn is_close_path(&self, path: &str) -> Result<bool, TreeError> {
        self.resolve(path).map(|id| self.is_close(id))
    }

    fn set_open(&mut self, id: ItemId, open: bool, notify: bool) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if item.open == open {
            return false;
        }
        item.open = open;
        self.layout.invalidate();
        if notify {
            let reason = if open {
                TreeReason::Opened
            } else {
                TreeReason::Closed
            };
            self.do_callback_for_item(id, reason);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.items.get(id).is_some_and(|item| item.selected)
    }

    pub fn is_selected_path(&self, path: &str) -> Result<bool, TreeError> {
        self.resolve(path).map(|id| self.is_selected(id))
    }

    /// Selects the item. In the single-select modes every other item is
    /// deselected first; in [`SelectMode::None`] nothing happens.
    ///
    /// Selecting an already selected item changes nothing but reports
    /// `Reselected` when the reselect mode is `Always`.
    pub fn select(&mut self, id: ItemId, notify: bool) -> bool {
        let mode = self.prefs.selectmode;
        if mode == SelectMode::None || !self.items.contains_key(id) {
            return false;
        }
        if mode.is_single() {
            return self.select_only(id, notify) > 0;
        }
        self.apply_select(id, notify)
    }

    pub fn select_path(&mut self, path: &str, notify: bool) -> Result<bool, TreeError> {
        let id = self.resolve(path)?;
        Ok(self.select(id, notify))
    }

    pub fn deselect(&mut self, id: ItemId, notify: bool) -> bool {
        if self.prefs.selectmode == SelectMode::None {
            return false;
        }
        self.apply_deselect(id, notify)
    }

    pub fn deselect_path(&mut self, path: &str, notify: bool) -> Result<bool, TreeError> {
        let id = self.resolve(path)?;
        Ok(self.deselect(id, notify))
    }

    pub fn select_toggle(&mut self, id: ItemId, notify: bool) -> bool {
        if self.is_selected(id) {
            self.deselect(id, notify)
        } else {
            self.select(id, notify)
        }
    }

    /// Deselects every item. Returns the number of items changed.
    pub fn deselect_all(&mut self, notify: bool) -> usize {
        if self.prefs.selectmode == SelectMode::None {
            return 0;
        }
        self.deselect_all_except(None, notify)
    }

    /// Leaves exactly `id` selected, whatever the select mode other than
    /// [`SelectMode::None`]. Returns the number of items changed.
    pub fn select_only(&mut self, id: ItemId, notify: bool) -> usize {
        if self.prefs.selectmode == SelectMode::None || !self.items.contains_key(id) {
            return 0;
        }
        let mut changed = self.deselect_all_except(Some(id), notify);
        if self.apply_select(id, notify) {
            changed += 1;
        }
        changed
    }

    /// Selects every item. Only honoured in [`SelectMode::Multi`].
    pub fn select_all(&mut self, notify: bool) -> usize {
        if self.prefs.selectmode != SelectMode::Multi {
            return 0;
        }
        let targets = self.collect_items(|tree, id| !tree.items[id].selected);
        targets
            .into_iter()
            .filter(|id| self.apply_select(*id, notify))
            .count()
    }

    /// Walks from `from` to `to` inclusive in `dir`, setting each item's
    /// selection to `value`.
    ///
    /// Nothing changes unless `to` is reached from `from` walking in `dir`.
    /// In the single-select modes, extending with `value == true` degrades to
    /// [`select_only(to)`](Self::select_only).
    pub fn extend_selection_dir(
        &mut self,
        from: ItemId,
        to: ItemId,
        dir: Direction,
        value: bool,
        visible_only: bool,
    ) -> usize {
        let mode = self.prefs.selectmode;
        if mode == SelectMode::None || !self.reaches(from, to, dir, visible_only) {
            return 0;
        }
        if value && mode.is_single() {
            return self.select_only(to, true);
        }
        let mut changed = 0;
        let mut cur = Some(from);
        while let Some(id) = cur {
            let applied = if value {
                self.apply_select(id, true)
            } else {
                self.apply_deselect(id, true)
            };
            changed += usize::from(applied);
            if id == to || !self.items.contains_key(id) {
                break;
            }
            cur = self.next_item(id, dir, visible_only);
        }
        changed
    }

    /// Like [`extend_selection_dir`](Self::extend_selection_dir), picking the
    /// direction in which `to` lies from `from`. Unreachable targets are a no-op.
    pub fn extend_selection(
        &mut self,
        from: ItemId,
        to: ItemId,
        value: bool,
        visible_only: bool,
    ) -> usize {
        let dir = if self.reaches(from, to, Direction::Down, visible_only) {
            Direction::Down
        } else if self.reaches(from, to, Direction::Up, visible_only) {
            Direction::Up
        } else {
            return 0;
        };
        self.extend_selection_dir(from, to, dir, value, visible_only)
    }

    pub fn first_selected_item(&self) -> Option<ItemId> {
        let first = self.first()?;
        if self.is_selected(first) {
            Some(first)
        } else {
            self.next_selected_item(first, Direction::Down)
        }
    }

    pub fn last_selected_item(&self) -> Option<ItemId> {
        let last = self.last()?;
        if self.is_selected(last) {
            Some(last)
        } else {
            self.next_selected_item(last, Direction::Up)
        }
    }

    /// Next selected item after `id` in logical order.
    pub fn next_selected_item(&self, id: ItemId, dir: Direction) -> Option<ItemId> {
        let mut cur = self.next_item(id, dir, false);
        while let Some(candidate) = cur {
            if self.is_selected(candidate) {
                return Some(candidate);
            }
            cur = self.next_item(candidate, dir, false);
        }
        None
    }

    /// All selected items in logical order.
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.collect_items(|tree, id| tree.items[id].selected)
    }

    fn apply_select(&mut self, id: ItemId, notify: bool) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if item.selected {
            if notify && self.prefs.item_reselect_mode == ReselectMode::Always {
                self.do_callback_for_item(id, TreeReason::Reselected);
            }
            return false;
        }
        item.selected = true;
        if notify {
            self.do_callback_for_item(id, TreeReason::Selected);
        }
        true
    }

    fn apply_deselect(&mut self, id: ItemId, notify: bool) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if !item.selected {
            return false;
        }
        item.selected = false;
        if notify {
            self.do_callback_for_item(id, TreeReason::Deselected);
        }
        true
    }

    fn deselect_all_except(&mut self, keep: Option<ItemId>, notify: bool) -> usize {
        let targets = self.collect_items(|tree, id| Some(id) != keep && tree.items[id].selected);
        targets
            .into_iter()
            .filter(|id| self.apply_deselect(*id, notify))
            .count()
    }

    fn collect_items<F>(&self, keep: F) -> Vec<ItemId>
    where
        F: Fn(&Self, ItemId) -> bool,
    {
        let mut out = Vec::new();
        let mut cur = self.first();
        while let Some(id) = cur {
            if keep(self, id) {
                out.push(id);
            }
            cur = self.next(id);
        }
        out
    }

    // Whether walking from `from` in `dir` arrives at `to`. Both must be live,
    // and `to` visible when only the visible order is walked.
    fn reaches(&self, from: ItemId, to: ItemId, dir: Direction, visible_only: bool) -> bool {
        if !self.items.contains_key(from) || !self.items.contains_key(to) {
            return false;
        }
        if visible_only && from != to && !self.is_visible_r(to) {
            return false;
        }
        let mut cur = Some(from);
        while let Some(id) = cur {
            if id == to {
                return true;
            }
            cur = self.next_item(id, dir, visible_only);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;

    fn tree_with(mode: SelectMode, paths: &[&str]) -> ItemTree {
        let mut tree = ItemTree::new();
        tree.set_selectmode(mode);
        for path in paths {
            tree.add(path).unwrap();
        }
        tree
    }

    fn id(tree: &ItemTree, path: &str) -> ItemId {
        tree.find_item(path).unwrap()
    }

    fn record(tree: &mut ItemTree) -> Rc<RefCell<Vec<(String, TreeReason)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tree.set_callback(move |tree| {
            let label = tree
                .callback_item()
                .and_then(|id| tree.label(id))
                .unwrap_or_default()
                .to_string();
            sink.borrow_mut().push((label, tree.callback_reason()));
        });
        log
    }

    #[test]
    fn single_mode_select_replaces_selection() {
        let mut tree = tree_with(SelectMode::Single, &["a", "b", "c"]);
        let (a, b) = (id(&tree, "a"), id(&tree, "b"));

        assert!(tree.select(a, false));
        assert!(tree.select(b, false));
        assert_eq!(tree.selected_items(), [b]);
    }

    #[test]
    fn none_mode_ignores_selection_mutators() {
        let mut tree = tree_with(SelectMode::None, &["a", "b"]);
        let a = id(&tree, "a");

        assert!(!tree.select(a, true));
        assert_eq!(tree.select_only(a, true), 0);
        assert_eq!(tree.select_all(true), 0);
        assert!(tree.selected_items().is_empty());
    }

    #[test]
    fn select_only_clears_others_in_multi_mode() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c"]);
        let (a, b, c) = (id(&tree, "a"), id(&tree, "b"), id(&tree, "c"));
        tree.select(a, false);
        tree.select(c, false);

        assert_eq!(tree.select_only(b, false), 3);
        assert_eq!(tree.selected_items(), [b]);
        assert_eq!(tree.first_selected_item(), Some(b));
        assert_eq!(tree.last_selected_item(), Some(b));
    }

    #[test]
    fn callbacks_report_reason_and_item() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b"]);
        let log = record(&mut tree);
        let (a, b) = (id(&tree, "a"), id(&tree, "b"));

        tree.select(a, true);
        tree.select(a, true);
        tree.select(b, false);
        tree.deselect(a, true);
        tree.close(b, true);
        tree.open(b, true);
        tree.open(b, true);

        assert_eq!(
            *log.borrow(),
            [
                ("a".to_string(), TreeReason::Selected),
                ("a".to_string(), TreeReason::Deselected),
                ("b".to_string(), TreeReason::Closed),
                ("b".to_string(), TreeReason::Opened),
            ]
        );
    }

    #[test]
    fn reselect_always_reports_reselected() {
        let mut tree = tree_with(SelectMode::Single, &["a"]);
        tree.set_item_reselect_mode(ReselectMode::Always);
        let log = record(&mut tree);
        let a = id(&tree, "a");

        assert!(tree.select(a, true));
        assert!(!tree.select(a, true));
        assert!(tree.is_selected(a));
        assert_eq!(
            log.borrow().iter().map(|(_, r)| *r).collect::<Vec<_>>(),
            [TreeReason::Selected, TreeReason::Reselected]
        );
    }

    #[test]
    fn extend_selection_selects_visible_range_only() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b/hidden", "c", "d"]);
        let (a, b, c, d) = (
            id(&tree, "a"),
            id(&tree, "b"),
            id(&tree, "c"),
            id(&tree, "d"),
        );
        tree.close(b, false);

        assert_eq!(tree.extend_selection_dir(a, c, Direction::Down, true, true), 3);
        assert_eq!(tree.selected_items(), [a, b, c]);
        assert!(!tree.is_selected(d));
        assert!(!tree.is_selected(id(&tree, "b/hidden")));
    }

    #[test]
    fn extend_selection_picks_direction() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c"]);
        let (a, b, c) = (id(&tree, "a"), id(&tree, "b"), id(&tree, "c"));

        assert_eq!(tree.extend_selection(c, a, true, true), 3);
        assert_eq!(tree.selected_items(), [a, b, c]);
        assert_eq!(tree.extend_selection(b, c, false, true), 2);
        assert_eq!(tree.selected_items(), [a]);
    }

    #[test]
    fn extend_in_single_mode_selects_target_only() {
        let mut tree = tree_with(SelectMode::Single, &["a", "b", "c"]);
        let (a, c) = (id(&tree, "a"), id(&tree, "c"));
        tree.extend_selection(a, c, true, true);
        assert_eq!(tree.selected_items(), [c]);
    }

    #[test]
    fn closing_keeps_descendant_selection() {
        let mut tree = tree_with(SelectMode::Multi, &["p/child"]);
        let (p, child) = (id(&tree, "p"), id(&tree, "p/child"));
        tree.select(child, false);

        tree.close(p, false);
        assert!(tree.is_selected(child));
        assert!(!tree.is_visible_r(child));

        tree.open(p, false);
        assert!(tree.is_visible_r(child));
    }

    #[test]
    fn reopening_restores_nested_state() {
        let mut tree = tree_with(SelectMode::Multi, &["p/q/r", "p/s"]);
        let (p, q) = (id(&tree, "p"), id(&tree, "p/q"));
        tree.close(q, false);
        let before = tree.visible_items();

        tree.close(p, false);
        assert!(tree.is_close(q));
        tree.open(p, false);
        assert_eq!(tree.visible_items(), before);
    }

    #[test]
    fn path_variants_report_missing_items() {
        let mut tree = tree_with(SelectMode::Multi, &["a/b"]);
        assert_eq!(tree.select_path("a/b", false), Ok(true));
        assert_eq!(tree.is_selected_path("a/b"), Ok(true));
        assert_eq!(tree.close_path("a", false), Ok(true));
        assert_eq!(tree.is_close_path("a"), Ok(true));
        assert_eq!(
            tree.open_path("nope", false),
            Err(TreeError::PathNotFound("nope".to_string()))
        );
        assert!(tree.deselect_path("x/y", false).is_err());
    }

    #[test]
    fn callback_may_remove_the_item_being_walked() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c"]);
        let (a, b, c) = (id(&tree, "a"), id(&tree, "b"), id(&tree, "c"));
        tree.set_callback(move |tree| {
            if tree.callback_item() == Some(b) {
                tree.remove(b);
            }
        });

        assert_eq!(tree.extend_selection_dir(a, c, Direction::Down, true, true), 2);
        assert!(!tree.contains(b));
        assert!(tree.is_selected(a));
        assert!(!tree.is_selected(c));
        assert_eq!(tree.callback_item(), None);
    }

    #[test]
    fn deselect_all_survives_removal_from_callback() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c"]);
        tree.select_all(false);
        let b = id(&tree, "b");
        tree.set_callback(move |tree| {
            tree.remove(b);
        });

        // ROOT, a and c; b is gone before its turn.
        assert_eq!(tree.deselect_all(true), 3);
        assert!(tree.selected_items().is_empty());
    }

    #[test]
    fn extend_to_removed_item_changes_nothing() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c", "d"]);
        let (a, b) = (id(&tree, "a"), id(&tree, "b"));
        let c = id(&tree, "c");
        tree.remove(b);

        assert_eq!(tree.extend_selection_dir(a, b, Direction::Down, true, true), 0);
        assert_eq!(tree.extend_selection(c, b, true, true), 0);
        assert_eq!(tree.extend_selection(c, b, true, false), 0);
        assert!(tree.selected_items().is_empty());
    }

    #[test]
    fn extend_to_unreachable_item_changes_nothing() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b/hidden", "c"]);
        let (a, b, c) = (id(&tree, "a"), id(&tree, "b"), id(&tree, "c"));
        let hidden = id(&tree, "b/hidden");
        tree.close(b, false);

        // Wrong direction.
        assert_eq!(tree.extend_selection_dir(c, a, Direction::Down, true, true), 0);
        assert_eq!(tree.extend_selection_dir(a, c, Direction::Up, true, false), 0);
        // Target outside the visible order.
        assert_eq!(tree.extend_selection(a, hidden, true, true), 0);
        assert!(tree.selected_items().is_empty());

        // The logical order still reaches it.
        assert_eq!(tree.extend_selection(a, hidden, true, false), 3);
        assert_eq!(tree.selected_items(), [a, b, hidden]);
    }

    // (parent index into already created items, closed)
    fn build_shape(nodes: &[(usize, bool)]) -> ItemTree {
        let mut tree = ItemTree::new();
        tree.set_selectmode(SelectMode::Multi);
        let mut ids = vec![tree.root().unwrap()];
        for (idx, (parent, closed)) in nodes.iter().enumerate() {
            let parent = ids[parent % ids.len()];
            let id = tree.add_child(parent, &format!("n{idx}")).unwrap();
            ids.push(id);
            if *closed {
                tree.close(id, false);
            }
        }
        tree
    }

    proptest! {
        #[test]
        fn extend_selects_exactly_the_visible_range(
            nodes in prop::collection::vec((any::<usize>(), prop::bool::weighted(0.3)), 1..30),
            from in any::<prop::sample::Index>(),
            to in any::<prop::sample::Index>(),
        ) {
            let mut tree = build_shape(&nodes);
            let visible = tree.visible_items();
            let (from_idx, to_idx) = (from.index(visible.len()), to.index(visible.len()));

            let changed = tree.extend_selection(visible[from_idx], visible[to_idx], true, true);

            let (lo, hi) = (from_idx.min(to_idx), from_idx.max(to_idx));
            prop_assert_eq!(changed, hi - lo + 1);
            prop_assert_eq!(tree.selected_items(), visible[lo..=hi].to_vec());
        }

        #[test]
        fn multi_select_reflects_net_effect(ops in prop::collection::vec((0usize..6, any::<bool>()), 0..40)) {
            let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c", "d", "e", "f"]);
            let root = tree.root().unwrap();
            let ids = tree.children(root).to_vec();
            let mut expected = [false; 6];
            for (idx, select) in ops {
                if select {
                    tree.select(ids[idx], true);
                } else {
                    tree.deselect(ids[idx], true);
                }
                expected[idx] = select;
            }
            for (idx, id) in ids.iter().enumerate() {
                prop_assert_eq!(tree.is_selected(*id), expected[idx]);
            }
        }

        #[test]
        fn select_only_leaves_singleton(pre in prop::collection::vec(any::<bool>(), 6), target in 0usize..6) {
            for mode in [SelectMode::Single, SelectMode::Multi, SelectMode::SingleDraggable] {
                let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c", "d", "e", "f"]);
                let root = tree.root().unwrap();
                let ids = tree.children(root).to_vec();
                for (id, selected) in ids.iter().zip(&pre) {
                    if *selected {
                        tree.select(*id, false);
                    }
                }
                tree.set_selectmode(mode);
                tree.select_only(ids[target], true);
                prop_assert_eq!(tree.selected_items(), vec![ids[target]]);
            }
        }
    }
}
