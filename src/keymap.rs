use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::action::{TreeAction, TreeEvent};
use crate::input::{InputModifiers, PointerEvent, PointerKind};
use crate::prefs::SelectMode;
use crate::tree::ItemTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    /// Arrow keys plus `hjkl`.
    #[default]
    Default,
    /// Only `hjkl` for navigation.
    Vim,
    /// Only arrow keys for navigation.
    Arrows,
}

/// Maps crossterm key events to tree actions.
///
/// | Key | Multi | Single | None |
/// |-----|-------|--------|------|
/// | Ctrl-A | select all | - | - |
/// | Space | select | select | toggle open |
/// | Ctrl-Space | toggle selection | toggle selection | toggle open |
/// | Shift-Space | extend to focus | select | toggle open |
/// | Enter (any modifier) | toggle open | toggle open | toggle open |
/// | Right / Left | open / close | open / close | open / close |
/// | Up / Down | move focus | move focus | move focus |
/// | Shift-Up / Shift-Down | extend | move focus | move focus |
/// | Home / End, PageUp / PageDown | jump focus | jump focus | jump focus |
#[derive(Clone, Copy, Debug)]
pub struct TreeKeyBindings {
    profile: KeymapProfile,
}

impl Default for TreeKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve(&self, key: KeyEvent, mode: SelectMode) -> Option<TreeAction> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('a' | 'A') if ctrl => {
                return (mode == SelectMode::Multi).then_some(TreeAction::SelectAll);
            }
            KeyCode::Char(' ') => {
                return Some(match mode {
                    SelectMode::None => TreeAction::ToggleOpen,
                    _ if ctrl => TreeAction::ToggleSelect,
                    SelectMode::Multi if shift => TreeAction::ExtendToFocus,
                    _ => TreeAction::SelectFocus,
                });
            }
            KeyCode::Enter => return Some(TreeAction::ToggleOpen),
            KeyCode::Home => return Some(TreeAction::FocusFirst),
            KeyCode::End => return Some(TreeAction::FocusLast),
            KeyCode::PageUp => return Some(TreeAction::PageUp),
            KeyCode::PageDown => return Some(TreeAction::PageDown),
            _ => {}
        }

        let nav = match self.profile {
            KeymapProfile::Default => Self::resolve_default_nav(key),
            KeymapProfile::Vim => Self::resolve_vim_nav(key),
            KeymapProfile::Arrows => Self::resolve_arrow_nav(key),
        }?;
        let extend = shift && mode == SelectMode::Multi;
        Some(match nav {
            TreeAction::FocusPrev if extend => TreeAction::ExtendPrev,
            TreeAction::FocusNext if extend => TreeAction::ExtendNext,
            other => other,
        })
    }

    const fn resolve_default_nav(key: KeyEvent) -> Option<TreeAction> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k' | 'K') => Some(TreeAction::FocusPrev),
            KeyCode::Down | KeyCode::Char('j' | 'J') => Some(TreeAction::FocusNext),
            KeyCode::Left | KeyCode::Char('h') => Some(TreeAction::CloseFocus),
            KeyCode::Right | KeyCode::Char('l') => Some(TreeAction::OpenFocus),
            _ => None,
        }
    }

    const fn resolve_vim_nav(key: KeyEvent) -> Option<TreeAction> {
        match key.code {
            KeyCode::Char('k' | 'K') => Some(TreeAction::FocusPrev),
            KeyCode::Char('j' | 'J') => Some(TreeAction::FocusNext),
            KeyCode::Char('h') => Some(TreeAction::CloseFocus),
            KeyCode::Char('l') => Some(TreeAction::OpenFocus),
            _ => None,
        }
    }

    const fn resolve_arrow_nav(key: KeyEvent) -> Option<TreeAction> {
        match key.code {
            KeyCode::Up => Some(TreeAction::FocusPrev),
            KeyCode::Down => Some(TreeAction::FocusNext),
            KeyCode::Left => Some(TreeAction::CloseFocus),
            KeyCode::Right => Some(TreeAction::OpenFocus),
            _ => None,
        }
    }
}

/// Converts a crossterm mouse event; only the left button and the wheel are used.
pub fn pointer_event(mouse: MouseEvent) -> Option<PointerEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerKind::Press,
        MouseEventKind::Drag(MouseButton::Left) => PointerKind::Drag,
        MouseEventKind::Up(MouseButton::Left) => PointerKind::Release,
        MouseEventKind::ScrollUp => PointerKind::ScrollUp,
        MouseEventKind::ScrollDown => PointerKind::ScrollDown,
        _ => return None,
    };
    let modifiers = InputModifiers {
        shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
    };
    Some(PointerEvent::new(kind, mouse.column, mouse.row).with_modifiers(modifiers))
}

impl ItemTree {
    /// Resolves the key against the current select mode and applies it.
    pub fn handle_key(&mut self, bindings: &TreeKeyBindings, key: KeyEvent) -> TreeEvent {
        match bindings.resolve(key, self.selectmode()) {
            Some(action) => self.handle_action(action),
            None => TreeEvent::Unhandled,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> TreeEvent {
        match pointer_event(mouse) {
            Some(event) => self.handle_pointer(event),
            None => TreeEvent::Unhandled,
        }
    }
}
