use crate::action::Direction;
use crate::item::ItemId;
use crate::tree::ItemTree;

/// Traversal in logical order (pre-order, visibility ignored) and in visible
/// order (closed subtrees and hidden items skipped).
impl ItemTree {
    /// First item in logical order (the root).
    pub const fn first(&self) -> Option<ItemId> {
        self.root
    }

    /// Next item in pre-order, ignoring open/closed state and visibility.
    pub fn next(&self, id: ItemId) -> Option<ItemId> {
        let item = self.items.get(id)?;
        if let Some(child) = item.children.first() {
            return Some(*child);
        }
        self.next_sibling_up(id)
    }

    /// Previous item in pre-order, ignoring open/closed state and visibility.
    pub fn prev(&self, id: ItemId) -> Option<ItemId> {
        let parent = self.items.get(id)?.parent?;
        let index = self.child_index(id)?;
        if index == 0 {
            return Some(parent);
        }
        let mut cur = self.items[parent].children[index - 1];
        while let Some(last) = self.items[cur].children.last() {
            cur = *last;
        }
        Some(cur)
    }

    /// Last item in logical order.
    pub fn last(&self) -> Option<ItemId> {
        let mut cur = self.root?;
        while let Some(last) = self.items[cur].children.last() {
            cur = *last;
        }
        Some(cur)
    }

    /// Returns `true` if the item takes part in the visible order: every
    /// ancestor is open, the item is not hidden, and it is not a hidden root.
    pub fn is_visible_r(&self, id: ItemId) -> bool {
        let Some(item) = self.items.get(id) else {
            return false;
        };
        if !item.visible || (item.parent.is_none() && !self.prefs.showroot) {
            return false;
        }
        let mut cur = item.parent;
        while let Some(parent) = cur {
            let parent_item = &self.items[parent];
            if !parent_item.open {
                return false;
            }
            cur = parent_item.parent;
        }
        true
    }

    pub fn first_visible_item(&self) -> Option<ItemId> {
        let root = self.root?;
        if self.is_visible_r(root) {
            Some(root)
        } else {
            self.next_visible_item(root, Direction::Down)
        }
    }

    pub fn last_visible_item(&self) -> Option<ItemId> {
        let mut cur = self.root?;
        loop {
            let item = &self.items[cur];
            match item.children.last() {
                Some(last) if item.open => cur = *last,
                _ => break,
            }
        }
        if self.is_visible_r(cur) {
            Some(cur)
        } else {
            self.next_visible_item(cur, Direction::Up)
        }
    }

    /// Steps from `start` to the neighbouring item in visible order.
    ///
    /// Returns `None` at either end of the tree or for a stale `start`.
    pub fn next_visible_item(&self, start: ItemId, dir: Direction) -> Option<ItemId> {
        let mut cur = start;
        loop {
            cur = match dir {
                Direction::Down => self.next_displayed(cur)?,
                Direction::Up => self.prev_displayed(cur)?,
            };
            if self.is_visible_r(cur) {
                return Some(cur);
            }
        }
    }

    /// Steps through either the visible or the logical order.
    pub fn next_item(&self, id: ItemId, dir: Direction, visible_only: bool) -> Option<ItemId> {
        match (visible_only, dir) {
            (true, dir) => self.next_visible_item(id, dir),
            (false, Direction::Down) => self.next(id),
            (false, Direction::Up) => self.prev(id),
        }
    }

    /// Collects the visible order from the first visible item.
    pub fn visible_items(&self) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut cur = self.first_visible_item();
        while let Some(id) = cur {
            out.push(id);
            cur = self.next_visible_item(id, Direction::Down);
        }
        out
    }

    // Pre-order successor that does not descend into closed items.
    fn next_displayed(&self, id: ItemId) -> Option<ItemId> {
        let item = self.items.get(id)?;
        if item.open
            && let Some(child) = item.children.first()
        {
            return Some(*child);
        }
        self.next_sibling_up(id)
    }

    // Pre-order predecessor that does not descend into closed items.
    fn prev_displayed(&self, id: ItemId) -> Option<ItemId> {
        let parent = self.items.get(id)?.parent?;
        let index = self.child_index(id)?;
        if index == 0 {
            return Some(parent);
        }
        let mut cur = self.items[parent].children[index - 1];
        loop {
            let item = &self.items[cur];
            match item.children.last() {
                Some(last) if item.open => cur = *last,
                _ => return Some(cur),
            }
        }
    }

    // Next sibling of the item or of its nearest ancestor that has one.
    fn next_sibling_up(&self, id: ItemId) -> Option<ItemId> {
        let mut cur = id;
        loop {
            let parent = self.items.get(cur)?.parent?;
            let siblings = &self.items[parent].children;
            let index = siblings.iter().position(|child| *child == cur)?;
            if let Some(next) = siblings.get(index + 1) {
                return Some(*next);
            }
            cur = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn labels(tree: &ItemTree, ids: &[ItemId]) -> Vec<String> {
        ids.iter()
            .map(|id| tree.label(*id).unwrap().to_string())
            .collect()
    }

    fn logical_order(tree: &ItemTree) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut cur = tree.first();
        while let Some(id) = cur {
            out.push(id);
            cur = tree.next(id);
        }
        out
    }

    #[test]
    fn families_scenario() {
        let mut tree = ItemTree::new();
        tree.set_showroot(false);
        for path in [
            "Simpsons/Homer",
            "Simpsons/Marge",
            "Flintstones/Fred",
            "Flintstones/Wilma",
        ] {
            tree.add(path).unwrap();
        }
        let flintstones = tree.find_item("Flintstones").unwrap();
        tree.close(flintstones, false);

        let simpsons = tree.first_visible_item().unwrap();
        assert_eq!(tree.label(simpsons), Some("Simpsons"));
        let homer = tree.next_visible_item(simpsons, Direction::Down).unwrap();
        assert_eq!(tree.label(homer), Some("Homer"));
        assert_eq!(
            labels(&tree, &tree.visible_items()),
            ["Simpsons", "Homer", "Marge", "Flintstones"]
        );

        tree.open(flintstones, false);
        assert_eq!(tree.first_visible_item(), Some(simpsons));
        assert_eq!(
            labels(&tree, &tree.visible_items()),
            ["Simpsons", "Homer", "Marge", "Flintstones", "Fred", "Wilma"]
        );
    }

    #[test]
    fn prev_visible_climbs_to_parent_and_descends_open_siblings() {
        let mut tree = ItemTree::new();
        for path in ["a/a1", "a/a2/deep", "b"] {
            tree.add(path).unwrap();
        }
        let b = tree.find_item("b").unwrap();
        let deep = tree.find_item("a/a2/deep").unwrap();
        let a2 = tree.find_item("a/a2").unwrap();
        let a = tree.find_item("a").unwrap();

        assert_eq!(tree.next_visible_item(b, Direction::Up), Some(deep));
        tree.close(a2, false);
        assert_eq!(tree.next_visible_item(b, Direction::Up), Some(a2));
        let a1 = tree.find_item("a/a1").unwrap();
        assert_eq!(tree.next_visible_item(a1, Direction::Up), Some(a));
        assert_eq!(tree.last_visible_item(), Some(b));
        assert_eq!(tree.last(), Some(b));
    }

    #[test]
    fn hidden_root_is_not_visited() {
        let mut tree = ItemTree::new();
        tree.add("only").unwrap();
        let only = tree.find_item("only").unwrap();
        assert_eq!(tree.first_visible_item(), tree.root());

        tree.set_showroot(false);
        assert_eq!(tree.first_visible_item(), Some(only));
        assert_eq!(tree.next_visible_item(only, Direction::Up), None);
        assert_eq!(tree.next_visible_item(only, Direction::Down), None);
    }

    #[test]
    fn hidden_items_are_skipped() {
        let mut tree = ItemTree::new();
        for path in ["a", "b", "c"] {
            tree.add(path).unwrap();
        }
        let b = tree.find_item("b").unwrap();
        tree.item_mut(b).unwrap().hide();
        let a = tree.find_item("a").unwrap();
        let c = tree.find_item("c").unwrap();

        assert_eq!(tree.next_visible_item(a, Direction::Down), Some(c));
        assert_eq!(tree.next_visible_item(c, Direction::Up), Some(a));
        assert_eq!(tree.next(a), Some(b));
    }

    #[test]
    fn logical_order_ignores_open_state() {
        let mut tree = ItemTree::new();
        for path in ["a/a1", "b/b1"] {
            tree.add(path).unwrap();
        }
        let a = tree.find_item("a").unwrap();
        tree.close(a, false);

        let order = logical_order(&tree);
        assert_eq!(labels(&tree, &order), ["ROOT", "a", "a1", "b", "b1"]);
        let mut back = Vec::new();
        let mut cur = tree.last();
        while let Some(id) = cur {
            back.push(id);
            cur = tree.prev(id);
        }
        back.reverse();
        assert_eq!(back, order);
    }

    #[test]
    fn empty_tree_has_no_items() {
        let mut tree = ItemTree::new();
        tree.clear();
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
        assert_eq!(tree.first_visible_item(), None);
        assert_eq!(tree.last_visible_item(), None);
    }

    #[derive(Clone, Debug)]
    struct Shape {
        // (parent index into already created items, closed, hidden)
        nodes: Vec<(usize, bool, bool)>,
        showroot: bool,
    }

    fn shape_strategy() -> impl Strategy<Value = Shape> {
        (
            prop::collection::vec((any::<usize>(), any::<bool>(), prop::bool::weighted(0.2)), 0..40),
            any::<bool>(),
        )
            .prop_map(|(nodes, showroot)| Shape { nodes, showroot })
    }

    fn build(shape: &Shape) -> ItemTree {
        let mut tree = ItemTree::new();
        tree.set_showroot(shape.showroot);
        let mut ids = vec![tree.root().unwrap()];
        for (idx, (parent, closed, hidden)) in shape.nodes.iter().enumerate() {
            let parent = ids[parent % ids.len()];
            let id = tree.add_child(parent, &format!("n{idx}")).unwrap();
            ids.push(id);
            if *closed {
                tree.close(id, false);
            }
            if *hidden {
                tree.item_mut(id).unwrap().hide();
            }
        }
        tree
    }

    proptest! {
        #[test]
        fn visible_walk_matches_filtered_preorder(shape in shape_strategy()) {
            let tree = build(&shape);
            let expected: Vec<_> = logical_order(&tree)
                .into_iter()
                .filter(|id| tree.is_visible_r(*id))
                .collect();
            prop_assert_eq!(tree.visible_items(), expected.clone());

            let mut backwards = Vec::new();
            let mut cur = tree.last_visible_item();
            while let Some(id) = cur {
                backwards.push(id);
                cur = tree.next_visible_item(id, Direction::Up);
            }
            backwards.reverse();
            prop_assert_eq!(backwards, expected);
        }
    }
}
