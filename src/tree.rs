use ratatui::style::{Color, Modifier};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::action::TreeReason;
use crate::error::{PrefsError, TreeError};
use crate::input::Interaction;
use crate::item::{ItemId, TreeItem};
use crate::layout::TreeLayout;
use crate::path;
use crate::prefs::{
    ConnectorStyle, ItemDrawMode, PrefsStore, ReselectMode, SelectMode, SortOrder, TreePrefs,
};
use crate::render::{ItemRenderer, LabelRenderer};

type Callback = Box<dyn FnMut(&mut ItemTree)>;

/// Hierarchical item container: owns the items, selection/open state, focus,
/// viewport geometry and the reason-tagged callback.
///
/// All operations are synchronous and must be called from a single thread.
pub struct ItemTree {
    pub(crate) items: SlotMap<ItemId, TreeItem>,
    pub(crate) root: Option<ItemId>,
    pub(crate) prefs: TreePrefs,
    pub(crate) focus: Option<ItemId>,
    pub(crate) last_selected: Option<ItemId>,
    pub(crate) last_clicked: Option<ItemId>,
    callback_item: Option<ItemId>,
    callback_reason: TreeReason,
    callback: Option<Callback>,
    pub(crate) interaction: Interaction,
    pub(crate) layout: TreeLayout,
    renderer: Box<dyn ItemRenderer>,
}

impl Default for ItemTree {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! prefs_accessors {
    ($($(#[$meta:meta])* $field:ident, $setter:ident: $ty:ty;)+) => {
        $(
            $(#[$meta])*
            pub const fn $field(&self) -> $ty {
                self.prefs.$field
            }

            pub fn $setter(&mut self, value: $ty) {
                self.prefs.$field = value;
                self.layout.invalidate();
            }
        )+
    };
}

impl ItemTree {
    /// Creates a tree holding a single root item labelled `ROOT`.
    pub fn new() -> Self {
        Self::with_prefs(TreePrefs::default())
    }

    /// Creates a tree with the given preferences and a `ROOT` item.
    pub fn with_prefs(prefs: TreePrefs) -> Self {
        let mut tree = Self {
            items: SlotMap::with_key(),
            root: None,
            prefs,
            focus: None,
            last_selected: None,
            last_clicked: None,
            callback_item: None,
            callback_reason: TreeReason::None,
            callback: None,
            interaction: Interaction::default(),
            layout: TreeLayout::default(),
            renderer: Box::new(LabelRenderer),
        };
        tree.ensure_root();
        tree
    }

    pub const fn prefs(&self) -> &TreePrefs {
        &self.prefs
    }

    /// Replaces all preferences. Existing items keep their label overrides.
    pub fn set_prefs(&mut self, prefs: TreePrefs) {
        self.prefs = prefs;
        self.layout.invalidate();
    }

    /// Restores preferences from a key/value store.
    pub fn load<S: PrefsStore + ?Sized>(&mut self, store: &S) -> Result<(), PrefsError> {
        self.prefs.load(store)?;
        self.layout.invalidate();
        Ok(())
    }

    pub fn item_renderer(&self) -> &dyn ItemRenderer {
        self.renderer.as_ref()
    }

    /// Plugs in a custom renderer used for measuring, drawing and hit-testing items.
    pub fn set_item_renderer<R: ItemRenderer + 'static>(&mut self, renderer: R) {
        self.renderer = Box::new(renderer);
        self.layout.invalidate();
    }

    // ---------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------

    pub const fn root(&self) -> Option<ItemId> {
        self.root
    }

    /// Sets the root label, creating the root if the tree is empty.
    pub fn set_root_label(&mut self, label: impl Into<String>) {
        let root = self.ensure_root();
        self.items[root].label = label.into();
        self.layout.invalidate();
    }

    pub fn item(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.get(id)
    }

    /// Mutable access to an item's label and presentation attributes.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut TreeItem> {
        self.layout.invalidate();
        self.items.get_mut(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Number of live items, root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn label(&self, id: ItemId) -> Option<&str> {
        self.items.get(id).map(TreeItem::label)
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.items.get(id).and_then(TreeItem::parent)
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.items.get(id).map_or(&[], TreeItem::children)
    }

    /// Number of ancestors of the item (the root has depth 0).
    pub fn depth(&self, id: ItemId) -> Option<usize> {
        let mut depth = 0;
        let mut cur = self.items.get(id)?.parent;
        while let Some(parent) = cur {
            depth += 1;
            cur = self.items.get(parent).and_then(|item| item.parent);
        }
        Some(depth)
    }

    /// Returns `true` if `ancestor` lies strictly above `id`.
    pub fn is_ancestor(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut cur = self.parent(id);
        while let Some(parent) = cur {
            if parent == ancestor {
                return true;
            }
            cur = self.parent(parent);
        }
        false
    }

    /// First child of `parent` carrying `label`.
    pub fn find_child(&self, parent: ItemId, label: &str) -> Option<ItemId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.items[*child].label == label)
    }

    /// Creates a detached item that carries the current label defaults.
    ///
    /// Pass it to [`add_item`](Self::add_item) to place it in the tree.
    pub fn new_item(&self, label: impl Into<String>) -> TreeItem {
        TreeItem::new(label, self.prefs.label_defaults())
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    /// Adds an item at `path`, creating missing intermediate items.
    ///
    /// The last segment always creates a new item, even if a sibling with the
    /// same label exists.
    pub fn add(&mut self, path: &str) -> Result<ItemId, TreeError> {
        let leaf = self.new_item(String::new());
        self.add_item(path, leaf)
    }

    /// Like [`add`](Self::add), using a pre-built item for the last segment.
    pub fn add_item(&mut self, path: &str, mut item: TreeItem) -> Result<ItemId, TreeError> {
        let segments = path::split(path);
        let Some((last, intermediate)) = segments.split_last() else {
            return Err(TreeError::EmptyPath);
        };
        let mut parent = self.ensure_root();
        for segment in intermediate {
            parent = match self.find_child(parent, segment) {
                Some(child) => child,
                None => {
                    let child = self.new_item(segment.as_str());
                    let index = self.sorted_index(parent, segment);
                    self.link_child(parent, child, index)
                }
            };
        }
        item.label.clone_from(last);
        let index = self.sorted_index(parent, last);
        let id = self.link_child(parent, item, index);
        tracing::debug!(path, "added item");
        Ok(id)
    }

    /// Adds a child labelled `name` under `parent`, honouring the sort order.
    pub fn add_child(&mut self, parent: ItemId, name: &str) -> Option<ItemId> {
        if !self.items.contains_key(parent) {
            return None;
        }
        let item = self.new_item(name);
        let index = self.sorted_index(parent, name);
        Some(self.link_child(parent, item, index))
    }

    /// Inserts a new sibling directly above `sibling`. Fails for the root.
    pub fn insert_above(&mut self, sibling: ItemId, name: &str) -> Option<ItemId> {
        let parent = self.parent(sibling)?;
        let index = self.child_index(sibling)?;
        let item = self.new_item(name);
        Some(self.link_child(parent, item, index))
    }

    /// Inserts a new child at `index` (`index == child count` appends).
    pub fn insert(&mut self, parent: ItemId, name: &str, index: usize) -> Result<ItemId, TreeError> {
        let len = self
            .items
            .get(parent)
            .ok_or(TreeError::ItemNotFound)?
            .children
            .len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let item = self.new_item(name);
        tracing::debug!(index, "inserted item");
        Ok(self.link_child(parent, item, index))
    }

    /// Removes the item and its whole subtree. Removing the root clears the tree.
    pub fn remove(&mut self, id: ItemId) -> bool {
        if !self.items.contains_key(id) {
            return false;
        }
        if Some(id) == self.root {
            self.clear();
            return true;
        }
        let removed = self.destroy_subtree(id);
        tracing::debug!(removed, "removed subtree");
        true
    }

    /// Removes every item, the root included.
    pub fn clear(&mut self) {
        self.items.clear();
        self.root = None;
        self.focus = None;
        self.last_selected = None;
        self.last_clicked = None;
        self.callback_item = None;
        self.interaction = Interaction::default();
        self.layout.invalidate();
        tracing::debug!("cleared tree");
    }

    /// Removes all children of the item, keeping the item itself.
    pub fn clear_children(&mut self, id: ItemId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.destroy_subtree(child);
        }
    }

    /// Moves `id` under `new_parent` at `index`.
    ///
    /// `index` addresses the child list after `id` has been detached from its
    /// current parent.
    pub fn reparent(&mut self, id: ItemId, new_parent: ItemId, index: usize) -> Result<(), TreeError> {
        if !self.items.contains_key(id) || !self.items.contains_key(new_parent) {
            return Err(TreeError::ItemNotFound);
        }
        let Some(old_parent) = self.parent(id) else {
            return Err(TreeError::InvalidMove);
        };
        if id == new_parent || self.is_ancestor(id, new_parent) {
            tracing::warn!("rejected move of an item into its own subtree");
            return Err(TreeError::InvalidMove);
        }
        let len = self.items[new_parent].children.len() - usize::from(old_parent == new_parent);
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        self.items[old_parent].children.retain(|child| *child != id);
        self.items[new_parent].children.insert(index, id);
        self.items[id].parent = Some(new_parent);
        self.layout.invalidate();
        tracing::debug!(index, "reparented item");
        Ok(())
    }

    /// Swaps two children of `parent` by index.
    pub fn swap_children(&mut self, parent: ItemId, a: usize, b: usize) -> bool {
        let Some(item) = self.items.get_mut(parent) else {
            return false;
        };
        if a >= item.children.len() || b >= item.children.len() {
            return false;
        }
        item.children.swap(a, b);
        self.layout.invalidate();
        true
    }

    // ---------------------------------------------------------------------
    // Paths
    // ---------------------------------------------------------------------

    /// Finds the item at `path` without creating anything.
    ///
    /// Duplicate labels resolve to the first match in child order.
    pub fn find_item(&self, path: &str) -> Option<ItemId> {
        let segments = path::split(path);
        if segments.is_empty() {
            return None;
        }
        let mut cur = self.root?;
        for segment in &segments {
            cur = self.find_child(cur, segment)?;
        }
        Some(cur)
    }

    /// Mutable variant of [`find_item`](Self::find_item).
    pub fn find_item_mut(&mut self, path: &str) -> Option<&mut TreeItem> {
        let id = self.find_item(path)?;
        self.item_mut(id)
    }

    pub(crate) fn resolve(&self, path: &str) -> Result<ItemId, TreeError> {
        self.find_item(path)
            .ok_or_else(|| TreeError::PathNotFound(path.to_string()))
    }

    /// Builds the slash-delimited path of the item. The root label is never
    /// part of a path, so the root itself yields an empty string.
    pub fn item_pathname(&self, id: ItemId) -> Option<String> {
        let mut chain: SmallVec<[ItemId; 16]> = SmallVec::new();
        let mut cur = Some(id);
        while let Some(item_id) = cur {
            let item = self.items.get(item_id)?;
            if item.parent.is_some() {
                chain.push(item_id);
            }
            cur = item.parent;
        }
        let mut out = String::new();
        for (idx, item_id) in chain.iter().rev().enumerate() {
            if idx > 0 {
                out.push('/');
            }
            path::push_escaped(&mut out, &self.items[*item_id].label);
        }
        Some(out)
    }

    // ---------------------------------------------------------------------
    // Focus and interaction references
    // ---------------------------------------------------------------------

    /// Item carrying the keyboard focus box.
    pub fn item_focus(&self) -> Option<ItemId> {
        self.focus.filter(|id| self.items.contains_key(*id))
    }

    /// Moves the focus box. Items that are not currently visible are refused.
    pub fn set_item_focus(&mut self, id: Option<ItemId>) -> bool {
        match id {
            Some(id) if !self.is_visible_r(id) => false,
            _ => {
                self.focus = id;
                true
            }
        }
    }

    /// Item most recently selected through user interaction.
    pub fn last_selected(&self) -> Option<ItemId> {
        self.last_selected.filter(|id| self.items.contains_key(*id))
    }

    /// Item most recently clicked.
    pub fn item_clicked(&self) -> Option<ItemId> {
        self.last_clicked.filter(|id| self.items.contains_key(*id))
    }

    // ---------------------------------------------------------------------
    // Callback
    // ---------------------------------------------------------------------

    /// Installs the callback fired on selection and open/close changes.
    ///
    /// Mutations made from inside the callback do not fire it again.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Self) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Item affected by the most recent callback.
    pub fn callback_item(&self) -> Option<ItemId> {
        self.callback_item.filter(|id| self.items.contains_key(*id))
    }

    pub const fn set_callback_item(&mut self, id: Option<ItemId>) {
        self.callback_item = id;
    }

    /// Reason of the most recent callback.
    pub const fn callback_reason(&self) -> TreeReason {
        self.callback_reason
    }

    pub const fn set_callback_reason(&mut self, reason: TreeReason) {
        self.callback_reason = reason;
    }

    pub(crate) fn do_callback_for_item(&mut self, id: ItemId, reason: TreeReason) {
        self.callback_item = Some(id);
        self.callback_reason = reason;
        let Some(mut callback) = self.callback.take() else {
            return;
        };
        tracing::debug!(?reason, "tree callback");
        callback(self);
        if self.callback.is_none() {
            self.callback = Some(callback);
        }
    }

    // ---------------------------------------------------------------------
    // Preference mirrors
    // ---------------------------------------------------------------------

    prefs_accessors! {
        /// Default label font for new items.
        labelfont, set_labelfont: Modifier;
        /// Default label row height for new items.
        labelsize, set_labelsize: u16;
        labelfgcolor, set_labelfgcolor: Color;
        labelbgcolor, set_labelbgcolor: Option<Color>;
        connectorcolor, set_connectorcolor: Color;
        connectorstyle, set_connectorstyle: ConnectorStyle;
        connectorwidth, set_connectorwidth: u16;
        marginleft, set_marginleft: u16;
        margintop, set_margintop: u16;
        marginbottom, set_marginbottom: u16;
        linespacing, set_linespacing: u16;
        openchild_marginbottom, set_openchild_marginbottom: u16;
        usericonmarginleft, set_usericonmarginleft: u16;
        labelmarginleft, set_labelmarginleft: u16;
        widgetmarginleft, set_widgetmarginleft: u16;
        showcollapse, set_showcollapse: bool;
        showroot, set_showroot: bool;
        selectmode, set_selectmode: SelectMode;
        sortorder, set_sortorder: SortOrder;
        item_reselect_mode, set_item_reselect_mode: ReselectMode;
        item_draw_mode, set_item_draw_mode: ItemDrawMode;
    }

    pub fn openicon(&self) -> &str {
        &self.prefs.openicon
    }

    pub fn set_openicon(&mut self, icon: impl Into<String>) {
        self.prefs.openicon = icon.into();
        self.layout.invalidate();
    }

    pub fn closeicon(&self) -> &str {
        &self.prefs.closeicon
    }

    pub fn set_closeicon(&mut self, icon: impl Into<String>) {
        self.prefs.closeicon = icon.into();
        self.layout.invalidate();
    }

    /// Tree-wide user icon drawn before every label without its own icon.
    pub fn usericon(&self) -> Option<&str> {
        self.prefs.usericon.as_deref()
    }

    pub fn set_usericon(&mut self, icon: Option<String>) {
        self.prefs.usericon = icon;
        self.layout.invalidate();
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn ensure_root(&mut self) -> ItemId {
        if let Some(root) = self.root {
            return root;
        }
        let item = self.new_item("ROOT");
        let root = self.items.insert(item);
        self.root = Some(root);
        self.layout.invalidate();
        root
    }

    pub(crate) fn child_index(&self, id: ItemId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.items[parent].children.iter().position(|child| *child == id)
    }

    fn sorted_index(&self, parent: ItemId, label: &str) -> usize {
        let children = &self.items[parent].children;
        let position = match self.prefs.sortorder {
            SortOrder::None => None,
            SortOrder::Ascending => children
                .iter()
                .position(|child| self.items[*child].label.as_str() > label),
            SortOrder::Descending => children
                .iter()
                .position(|child| self.items[*child].label.as_str() < label),
        };
        position.unwrap_or(children.len())
    }

    fn link_child(&mut self, parent: ItemId, mut item: TreeItem, index: usize) -> ItemId {
        item.parent = Some(parent);
        let id = self.items.insert(item);
        self.items[parent].children.insert(index, id);
        self.layout.invalidate();
        id
    }

    /// Frees the subtree rooted at `id` (never the root) and repairs every
    /// container reference that pointed into it.
    fn destroy_subtree(&mut self, id: ItemId) -> usize {
        let Some(parent) = self.parent(id) else {
            return 0;
        };
        self.items[parent].children.retain(|child| *child != id);

        let mut stack: SmallVec<[ItemId; 16]> = SmallVec::new();
        stack.push(id);
        let mut removed = 0;
        while let Some(cur) = stack.pop() {
            if let Some(item) = self.items.remove(cur) {
                stack.extend(item.children);
                removed += 1;
            }
        }

        self.repair_references(parent);
        self.layout.invalidate();
        removed
    }

    fn repair_references(&mut self, surviving_parent: ItemId) {
        let items = &self.items;
        let alive = |id: Option<ItemId>| id.filter(|id| items.contains_key(*id));
        self.last_selected = alive(self.last_selected);
        self.last_clicked = alive(self.last_clicked);
        self.callback_item = alive(self.callback_item);
        self.interaction.forget_removed(items);

        if self.focus.is_some() && alive(self.focus).is_none() {
            let mut fallback = Some(surviving_parent);
            while let Some(candidate) = fallback {
                if self.is_visible_r(candidate) {
                    break;
                }
                fallback = self.parent(candidate);
            }
            self.focus = fallback;
        }
    }
}
