pub use crate::{
    ConnectorStyle, Direction, GlyphSet, HitTarget, InputModifiers, ItemId, ItemRenderer,
    ItemRow, ItemTree, ItemTreeStyle, ItemTreeView, ItemWidget, LabelRenderer, PointerEvent,
    PointerKind, PrefsStore, RowContext, SelectMode, SortOrder, TreeAction, TreeError, TreeEvent,
    TreeInput, TreeItem, TreePrefs, TreeReason,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};
