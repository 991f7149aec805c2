use crate::item::ItemId;

/// Why the tree callback was invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TreeReason {
    /// Unknown or no reason (also the value outside of callbacks).
    #[default]
    None,
    /// An item was selected.
    Selected,
    /// An item was deselected.
    Deselected,
    /// An already selected item was selected again.
    Reselected,
    /// An item was opened.
    Opened,
    /// An item was closed.
    Closed,
    /// An item was dragged into a new place.
    Dragged,
}

/// Traversal direction for stepping through items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Keyboard-level actions the tree understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeAction {
    /// Move focus to the previous visible item.
    FocusPrev,
    /// Move focus to the next visible item.
    FocusNext,
    /// Move focus up and extend the selection (multi mode).
    ExtendPrev,
    /// Move focus down and extend the selection (multi mode).
    ExtendNext,
    /// Move focus to the first visible item.
    FocusFirst,
    /// Move focus to the last visible item.
    FocusLast,
    /// Move focus one viewport up.
    PageUp,
    /// Move focus one viewport down.
    PageDown,
    /// Open the focused item.
    OpenFocus,
    /// Close the focused item.
    CloseFocus,
    /// Toggle open/close of the focused item.
    ToggleOpen,
    /// Select the focused item.
    SelectFocus,
    /// Toggle selection of the focused item.
    ToggleSelect,
    /// Extend the selection from the last selected item to the focus.
    ExtendToFocus,
    /// Select every item (multi mode only).
    SelectAll,
}

/// Result of handling an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    /// The input was consumed and state may have changed.
    Handled,
    /// The input was ignored.
    Unhandled,
    /// A press and release both landed on this item's user icon.
    UserIconActivated(ItemId),
}

impl TreeEvent {
    pub const fn is_handled(self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}
