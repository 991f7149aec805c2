//! Hierarchical item tree for ratatui: a container of labelled items with
//! path addressing, open/close state, selection modes, a reason-tagged change
//! callback, viewport scrolling and pointer/keyboard input handling.
//!
//! [`ItemTree`] owns the items and all interaction state; [`ItemTreeView`]
//! renders it as a `StatefulWidget`.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `ItemTree::handle_key`/`handle_mouse`.
//! - `serde`: serde support for [`TreePrefs`] and its enums.

mod action;
mod context;
mod error;
mod glyphs;
mod input;
mod item;
#[cfg(feature = "keymap")]
mod keymap;
mod layout;
mod path;
mod prefs;
pub mod prelude;
mod render;
mod state;
mod style;
mod traverse;
mod tree;
mod widget;

pub use action::{Direction, TreeAction, TreeEvent, TreeReason};
pub use context::RowContext;
pub use error::{PrefsError, TreeError};
pub use glyphs::{TreeGlyphs, row_prefix_line};
pub use input::{InputModifiers, PointerEvent, PointerKind, PushTarget, TreeInput};
pub use item::{ItemId, ItemWidget, TreeItem};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings, pointer_event};
pub use layout::{Extent, ItemRow};
pub use prefs::{
    ConnectorStyle, ItemDrawMode, PrefsStore, ReselectMode, SelectMode, SortOrder, TreePrefs,
};
pub use render::{HitTarget, ItemRenderer, LabelRenderer};
pub use style::{GlyphSet, ItemTreeStyle};
pub use tree::ItemTree;
pub use widget::ItemTreeView;
