use ratatui::style::{Color, Modifier};
use slotmap::new_key_type;

new_key_type! {
    /// Generational handle of an item stored in an [`ItemTree`](crate::ItemTree).
    ///
    /// Ids of removed items never resolve again, even if the slot is reused.
    pub struct ItemId;
}

/// Control embedded in an item row.
///
/// The tree only manages its geometry; the application draws the control into
/// the rectangle reported by [`ItemTree::widget_area`](crate::ItemTree::widget_area).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemWidget {
    /// Opaque application handle.
    pub handle: u64,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl ItemWidget {
    pub const fn new(handle: u64, width: u16, height: u16) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

/// A single node of the hierarchy.
///
/// Open/selected state is owned by the tree and changed through
/// [`ItemTree`](crate::ItemTree) so that selection mode and callbacks apply.
#[derive(Clone, Debug)]
pub struct TreeItem {
    pub(crate) label: String,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
    pub(crate) open: bool,
    pub(crate) selected: bool,
    pub(crate) visible: bool,
    labelfont: Modifier,
    labelsize: u16,
    labelfgcolor: Color,
    labelbgcolor: Option<Color>,
    usericon: Option<String>,
    widget: Option<ItemWidget>,
}

/// Label attributes copied into every new item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LabelDefaults {
    pub(crate) font: Modifier,
    pub(crate) size: u16,
    pub(crate) fg: Color,
    pub(crate) bg: Option<Color>,
}

impl TreeItem {
    pub(crate) fn new(label: impl Into<String>, defaults: LabelDefaults) -> Self {
        Self {
            label: label.into(),
            parent: None,
            children: Vec::new(),
            open: true,
            selected: false,
            visible: true,
            labelfont: defaults.font,
            labelsize: defaults.size,
            labelfgcolor: defaults.fg,
            labelbgcolor: defaults.bg,
            usericon: None,
            widget: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub const fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub const fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<ItemId> {
        self.children.get(index).copied()
    }

    pub const fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn is_close(&self) -> bool {
        !self.open
    }

    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns `false` if the item was individually hidden.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hides the item from the visible order. Its children keep their own flags.
    pub const fn hide(&mut self) {
        self.visible = false;
    }

    pub const fn show(&mut self) {
        self.visible = true;
    }

    pub const fn labelfont(&self) -> Modifier {
        self.labelfont
    }

    pub const fn set_labelfont(&mut self, font: Modifier) {
        self.labelfont = font;
    }

    /// Row height of the label in cells.
    pub const fn labelsize(&self) -> u16 {
        self.labelsize
    }

    pub const fn set_labelsize(&mut self, size: u16) {
        self.labelsize = size;
    }

    pub const fn labelfgcolor(&self) -> Color {
        self.labelfgcolor
    }

    pub const fn set_labelfgcolor(&mut self, color: Color) {
        self.labelfgcolor = color;
    }

    /// `None` means transparent (the tree background shows through).
    pub const fn labelbgcolor(&self) -> Option<Color> {
        self.labelbgcolor
    }

    pub const fn set_labelbgcolor(&mut self, color: Option<Color>) {
        self.labelbgcolor = color;
    }

    pub fn usericon(&self) -> Option<&str> {
        self.usericon.as_deref()
    }

    /// Overrides the tree-wide user icon for this item.
    pub fn set_usericon(&mut self, icon: Option<String>) {
        self.usericon = icon;
    }

    pub const fn widget(&self) -> Option<ItemWidget> {
        self.widget
    }

    pub const fn set_widget(&mut self, widget: Option<ItemWidget>) {
        self.widget = widget;
    }
}
