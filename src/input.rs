use ratatui::layout::Rect;
use slotmap::SlotMap;

use crate::action::{Direction, TreeAction, TreeEvent, TreeReason};
use crate::item::{ItemId, TreeItem};
use crate::prefs::SelectMode;
use crate::render::HitTarget;
use crate::tree::ItemTree;

/// Part of an item that received the last pointer press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PushTarget {
    #[default]
    None,
    OpenClose,
    UserIcon,
    Label,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputModifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl InputModifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Drag,
    Release,
    ScrollUp,
    ScrollDown,
}

/// Pointer input in screen cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub column: u16,
    pub row: u16,
    pub modifiers: InputModifiers,
}

impl PointerEvent {
    pub const fn new(kind: PointerKind, column: u16, row: u16) -> Self {
        Self {
            kind,
            column,
            row,
            modifiers: InputModifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: InputModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Backend-neutral input accepted by [`ItemTree::handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeInput {
    Pointer(PointerEvent),
    Action(TreeAction),
}

impl From<PointerEvent> for TreeInput {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<TreeAction> for TreeInput {
    fn from(action: TreeAction) -> Self {
        Self::Action(action)
    }
}

/// Transient pointer state between a press and its release.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Interaction {
    pushed: PushTarget,
    pressed_item: Option<ItemId>,
    drag_origin: Option<ItemId>,
    dragging: bool,
}

impl Interaction {
    pub(crate) fn forget_removed(&mut self, items: &SlotMap<ItemId, TreeItem>) {
        let alive = |id: Option<ItemId>| id.filter(|id| items.contains_key(*id));
        self.drag_origin = alive(self.drag_origin);
        self.pressed_item = alive(self.pressed_item);
        if self.pressed_item.is_none() {
            *self = Self::default();
        }
    }
}

const fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

enum DropPlace {
    Above,
    Below,
    FirstChild,
}

/// Pointer and keyboard handling.
impl ItemTree {
    /// Part of the item that received the pending pointer press.
    pub const fn pushed(&self) -> PushTarget {
        self.interaction.pushed
    }

    /// Item being dragged in [`SelectMode::SingleDraggable`].
    pub fn drag_origin(&self) -> Option<ItemId> {
        self.interaction
            .drag_origin
            .filter(|_| self.interaction.dragging)
    }

    pub fn handle(&mut self, input: impl Into<TreeInput>) -> TreeEvent {
        match input.into() {
            TreeInput::Pointer(event) => self.handle_pointer(event),
            TreeInput::Action(action) => self.handle_action(action),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> TreeEvent {
        self.ensure_layout();
        match event.kind {
            PointerKind::Press => self.handle_press(event),
            PointerKind::Drag => self.handle_drag(event),
            PointerKind::Release => self.handle_release(event),
            PointerKind::ScrollUp | PointerKind::ScrollDown => {
                if !contains(self.outer_area(), event.column, event.row) {
                    return TreeEvent::Unhandled;
                }
                let step = self
                    .rows_in_view()
                    .first()
                    .map_or(1, |row| usize::from(row.height()));
                let pos = if event.kind == PointerKind::ScrollUp {
                    self.vposition().saturating_sub(step)
                } else {
                    self.vposition() + step
                };
                self.set_vposition(pos);
                TreeEvent::Handled
            }
        }
    }

    /// Applies a keyboard-level action to the focused item.
    pub fn handle_action(&mut self, action: TreeAction) -> TreeEvent {
        let Some(focus) = self.keyboard_focus() else {
            return TreeEvent::Unhandled;
        };
        let mode = self.prefs.selectmode;
        match action {
            TreeAction::FocusPrev => self.step_focus(focus, Direction::Up),
            TreeAction::FocusNext => self.step_focus(focus, Direction::Down),
            TreeAction::ExtendPrev | TreeAction::ExtendNext => {
                let dir = if action == TreeAction::ExtendPrev {
                    Direction::Up
                } else {
                    Direction::Down
                };
                if mode != SelectMode::Multi {
                    return self.step_focus(focus, dir);
                }
                let Some(target) = self.next_visible_item(focus, dir) else {
                    return TreeEvent::Unhandled;
                };
                self.extend_selection_dir(focus, target, dir, true, true);
                self.move_focus(target);
                self.remember_selected(target);
                TreeEvent::Handled
            }
            TreeAction::FocusFirst => match self.first_visible_item() {
                Some(first) => self.navigate_to(first),
                None => TreeEvent::Unhandled,
            },
            TreeAction::FocusLast => match self.last_visible_item() {
                Some(last) => self.navigate_to(last),
                None => TreeEvent::Unhandled,
            },
            TreeAction::PageUp => {
                let target = self.page_target(focus, Direction::Up);
                self.navigate_to(target)
            }
            TreeAction::PageDown => {
                let target = self.page_target(focus, Direction::Down);
                self.navigate_to(target)
            }
            TreeAction::OpenFocus => {
                if !self.items[focus].has_children() {
                    return TreeEvent::Unhandled;
                }
                if self.is_open(focus) {
                    let first = self.children(focus)[0];
                    if self.is_visible_r(first) {
                        return self.navigate_to(first);
                    }
                    return TreeEvent::Handled;
                }
                self.open(focus, true);
                TreeEvent::Handled
            }
            TreeAction::CloseFocus => {
                if self.is_open(focus) && self.items[focus].has_children() {
                    self.close(focus, true);
                    return TreeEvent::Handled;
                }
                match self.parent(focus).filter(|parent| self.is_visible_r(*parent)) {
                    Some(parent) => self.navigate_to(parent),
                    None => TreeEvent::Unhandled,
                }
            }
            TreeAction::ToggleOpen => self.toggle_focus_open(focus),
            TreeAction::SelectFocus => match mode {
                SelectMode::None => self.toggle_focus_open(focus),
                _ => {
                    self.select(focus, true);
                    self.remember_selected(focus);
                    TreeEvent::Handled
                }
            },
            TreeAction::ToggleSelect => match mode {
                SelectMode::None => self.toggle_focus_open(focus),
                _ => {
                    self.select_toggle(focus, true);
                    self.remember_selected(focus);
                    TreeEvent::Handled
                }
            },
            TreeAction::ExtendToFocus => match mode {
                SelectMode::None => self.toggle_focus_open(focus),
                SelectMode::Multi => {
                    match self.last_selected() {
                        Some(anchor) => {
                            self.extend_selection(anchor, focus, true, true);
                        }
                        None => {
                            self.select(focus, true);
                            self.remember_selected(focus);
                        }
                    }
                    TreeEvent::Handled
                }
                SelectMode::Single | SelectMode::SingleDraggable => {
                    self.select(focus, true);
                    self.remember_selected(focus);
                    TreeEvent::Handled
                }
            },
            TreeAction::SelectAll => {
                if mode != SelectMode::Multi {
                    return TreeEvent::Unhandled;
                }
                self.select_all(true);
                TreeEvent::Handled
            }
        }
    }

    fn handle_press(&mut self, event: PointerEvent) -> TreeEvent {
        self.interaction = Interaction::default();
        let Some(id) = self.find_clicked(event.column, event.row, false) else {
            return TreeEvent::Unhandled;
        };
        let Some(row) = self.item_row(id).cloned() else {
            return TreeEvent::Unhandled;
        };
        let x = self.content_x(event.column);
        let target = self.item_renderer().hit_test(self, &row, x);
        if target == HitTarget::Widget {
            return TreeEvent::Unhandled;
        }

        self.last_clicked = Some(id);
        self.focus = Some(id);
        self.interaction.pressed_item = Some(id);
        match target {
            HitTarget::OpenClose => {
                self.interaction.pushed = PushTarget::OpenClose;
                self.open_toggle(id, true);
            }
            HitTarget::UserIcon => self.interaction.pushed = PushTarget::UserIcon,
            HitTarget::Label | HitTarget::Widget => {
                self.interaction.pushed = PushTarget::Label;
                if self.prefs.selectmode == SelectMode::SingleDraggable {
                    self.interaction.drag_origin = Some(id);
                }
                self.select_by_click(id, event.modifiers);
            }
        }
        TreeEvent::Handled
    }

    fn handle_drag(&mut self, event: PointerEvent) -> TreeEvent {
        match self.interaction.pushed {
            PushTarget::None => return TreeEvent::Unhandled,
            PushTarget::Label => {}
            PushTarget::OpenClose | PushTarget::UserIcon => return TreeEvent::Handled,
        }
        let inner = self.inner_area();
        if inner.is_empty() {
            return TreeEvent::Handled;
        }
        if event.row < inner.y {
            self.set_vposition(self.vposition().saturating_sub(1));
        } else if event.row >= inner.bottom() {
            self.set_vposition(self.vposition() + 1);
        }
        let row = event.row.clamp(inner.y, inner.bottom() - 1);
        let Some(id) = self.find_clicked(event.column, row, true) else {
            return TreeEvent::Handled;
        };
        self.focus = Some(id);
        self.show_item(id);

        match self.prefs.selectmode {
            SelectMode::None => {}
            SelectMode::Single => {
                self.select_only(id, true);
                self.remember_selected(id);
            }
            SelectMode::SingleDraggable => self.interaction.dragging = true,
            SelectMode::Multi => {
                if let Some(anchor) = self.last_selected() {
                    self.extend_selection(anchor, id, true, true);
                }
            }
        }
        TreeEvent::Handled
    }

    fn handle_release(&mut self, event: PointerEvent) -> TreeEvent {
        let interaction = std::mem::take(&mut self.interaction);
        if interaction.pushed == PushTarget::None {
            return TreeEvent::Unhandled;
        }
        let Some(pressed) = interaction.pressed_item.filter(|id| self.contains(*id)) else {
            return TreeEvent::Handled;
        };
        match interaction.pushed {
            PushTarget::UserIcon => {
                if self.find_clicked(event.column, event.row, false) != Some(pressed) {
                    return TreeEvent::Handled;
                }
                let x = self.content_x(event.column);
                let on_icon = self.item_row(pressed).is_some_and(|row| {
                    self.item_renderer().hit_test(self, row, x) == HitTarget::UserIcon
                });
                if on_icon {
                    TreeEvent::UserIconActivated(pressed)
                } else {
                    TreeEvent::Handled
                }
            }
            PushTarget::Label if interaction.dragging => {
                if let Some(origin) = interaction.drag_origin {
                    self.drop_dragged(origin, event);
                }
                TreeEvent::Handled
            }
            _ => TreeEvent::Handled,
        }
    }

    fn drop_dragged(&mut self, origin: ItemId, event: PointerEvent) -> bool {
        let Some(target) = self.find_clicked(event.column, event.row, true) else {
            return false;
        };
        if target == origin || self.is_ancestor(origin, target) {
            tracing::warn!("rejected drop of an item onto itself or its subtree");
            return false;
        }
        let Some(row) = self.item_row(target) else {
            return false;
        };
        let inner = self.inner_area();
        let offset = usize::from(event.row - inner.y) + self.vposition() - row.y();
        let place = if offset * 2 < usize::from(row.height()) {
            DropPlace::Above
        } else if self.is_open(target) && self.items[target].has_children() {
            DropPlace::FirstChild
        } else {
            DropPlace::Below
        };

        let (parent, index) = match (place, self.parent(target)) {
            (DropPlace::FirstChild, _) | (_, None) => (target, 0),
            (place, Some(parent)) => {
                let mut index = self.child_index(target).unwrap_or(0);
                if self.parent(origin) == Some(parent)
                    && self.child_index(origin).is_some_and(|own| own < index)
                {
                    index -= 1;
                }
                if matches!(place, DropPlace::Below) {
                    index += 1;
                }
                (parent, index)
            }
        };
        if self.reparent(origin, parent, index).is_err() {
            return false;
        }
        tracing::debug!(index, "dropped dragged item");
        self.do_callback_for_item(origin, TreeReason::Dragged);
        if self.contains(origin) {
            self.show_item(origin);
        }
        true
    }

    fn select_by_click(&mut self, id: ItemId, modifiers: InputModifiers) {
        match self.prefs.selectmode {
            SelectMode::None => {}
            SelectMode::Single | SelectMode::SingleDraggable => {
                self.select_only(id, true);
                self.remember_selected(id);
            }
            SelectMode::Multi => {
                if modifiers.ctrl {
                    self.select_toggle(id, true);
                    self.remember_selected(id);
                } else if modifiers.shift
                    && let Some(anchor) = self.last_selected()
                {
                    // The anchor stays put so repeated shift-clicks resize the range.
                    self.extend_selection(anchor, id, true, true);
                } else {
                    self.select_only(id, true);
                    self.remember_selected(id);
                }
            }
        }
    }

    fn remember_selected(&mut self, id: ItemId) {
        if self.items.contains_key(id) {
            self.last_selected = Some(id);
        }
    }

    // Focus may point at an item hidden by a close; fall back to the nearest
    // visible ancestor, then to the first visible item.
    fn keyboard_focus(&mut self) -> Option<ItemId> {
        let mut cur = self.item_focus();
        while let Some(id) = cur {
            if self.is_visible_r(id) {
                break;
            }
            cur = self.parent(id);
        }
        let focus = cur.or_else(|| self.first_visible_item())?;
        self.focus = Some(focus);
        Some(focus)
    }

    fn step_focus(&mut self, focus: ItemId, dir: Direction) -> TreeEvent {
        match self.next_visible_item(focus, dir) {
            Some(target) => self.navigate_to(target),
            None => TreeEvent::Unhandled,
        }
    }

    // Keyboard navigation selects the new focus in the single-select modes.
    fn navigate_to(&mut self, target: ItemId) -> TreeEvent {
        self.move_focus(target);
        if self.prefs.selectmode.is_single() {
            self.select_only(target, true);
            self.remember_selected(target);
        }
        TreeEvent::Handled
    }

    fn move_focus(&mut self, target: ItemId) {
        self.focus = Some(target);
        self.show_item(target);
    }

    fn toggle_focus_open(&mut self, focus: ItemId) -> TreeEvent {
        if !self.items[focus].has_children() {
            return TreeEvent::Unhandled;
        }
        self.open_toggle(focus, true);
        TreeEvent::Handled
    }

    fn page_target(&mut self, from: ItemId, dir: Direction) -> ItemId {
        self.ensure_layout();
        let budget = usize::from(self.inner_area().height).max(1);
        let mut cur = from;
        let mut used = 0;
        while let Some(next) = self.next_visible_item(cur, dir) {
            used += self
                .item_row(next)
                .map_or(1, |row| usize::from(row.height()));
            if used > budget && cur != from {
                break;
            }
            cur = next;
            if used >= budget {
                break;
            }
        }
        cur
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn tree_with(mode: SelectMode, paths: &[&str]) -> ItemTree {
        let mut tree = ItemTree::new();
        tree.set_showroot(false);
        tree.set_selectmode(mode);
        for path in paths {
            tree.add(path).unwrap();
        }
        tree.resize(Rect::new(0, 0, 30, 10));
        tree
    }

    fn id(tree: &ItemTree, path: &str) -> ItemId {
        tree.find_item(path).unwrap()
    }

    fn press(tree: &mut ItemTree, column: u16, row: u16) -> TreeEvent {
        tree.handle(PointerEvent::new(PointerKind::Press, column, row))
    }

    fn release(tree: &mut ItemTree, column: u16, row: u16) -> TreeEvent {
        tree.handle(PointerEvent::new(PointerKind::Release, column, row))
    }

    fn drag(tree: &mut ItemTree, column: u16, row: u16) -> TreeEvent {
        tree.handle(PointerEvent::new(PointerKind::Drag, column, row))
    }

    fn reasons(tree: &mut ItemTree) -> Rc<RefCell<Vec<TreeReason>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tree.set_callback(move |tree| sink.borrow_mut().push(tree.callback_reason()));
        log
    }

    // Rows (showroot off): a y0, a1 y1 (label at 5), a2 y2, b y3 (label at 2).
    const PATHS: &[&str] = &["a/a1", "a/a2", "b"];

    #[test]
    fn label_click_selects_and_focuses() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        let log = reasons(&mut tree);
        let a1 = id(&tree, "a/a1");

        assert_eq!(press(&mut tree, 6, 1), TreeEvent::Handled);
        assert_eq!(tree.pushed(), PushTarget::Label);
        assert_eq!(release(&mut tree, 6, 1), TreeEvent::Handled);

        assert!(tree.is_selected(a1));
        assert_eq!(tree.item_focus(), Some(a1));
        assert_eq!(tree.item_clicked(), Some(a1));
        assert_eq!(tree.last_selected(), Some(a1));
        assert_eq!(*log.borrow(), [TreeReason::Selected]);
        assert_eq!(tree.pushed(), PushTarget::None);
    }

    #[test]
    fn collapse_click_toggles_without_selecting() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        let log = reasons(&mut tree);
        let a = id(&tree, "a");

        press(&mut tree, 0, 0);
        assert_eq!(tree.pushed(), PushTarget::OpenClose);
        release(&mut tree, 0, 0);

        assert!(tree.is_close(a));
        assert!(!tree.is_selected(a));
        assert_eq!(*log.borrow(), [TreeReason::Closed]);
        assert_eq!(tree.find_clicked(2, 1, false), Some(id(&tree, "b")));
    }

    #[test]
    fn press_outside_items_is_unhandled() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        assert_eq!(press(&mut tree, 2, 8), TreeEvent::Unhandled);
        assert_eq!(release(&mut tree, 2, 8), TreeEvent::Unhandled);
        assert_eq!(press(&mut tree, 40, 0), TreeEvent::Unhandled);
    }

    #[test]
    fn user_icon_activates_on_matching_release() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        let b = id(&tree, "b");
        tree.item_mut(b).unwrap().set_usericon(Some("*".to_string()));
        tree.calc_tree();
        // b: collapse 0, icon 1, label from 3.

        press(&mut tree, 1, 3);
        assert_eq!(tree.pushed(), PushTarget::UserIcon);
        assert_eq!(release(&mut tree, 1, 3), TreeEvent::UserIconActivated(b));
        assert!(!tree.is_selected(b));

        press(&mut tree, 1, 3);
        assert_eq!(release(&mut tree, 4, 3), TreeEvent::Handled);
    }

    #[test]
    fn multi_click_modifiers() {
        let mut tree = tree_with(SelectMode::Multi, &["a", "b", "c", "d"]);
        let [a, b, c, d] = ["a", "b", "c", "d"].map(|p| id(&tree, p));

        press(&mut tree, 2, 0);
        release(&mut tree, 2, 0);
        tree.handle(PointerEvent::new(PointerKind::Press, 2, 2).with_modifiers(InputModifiers::SHIFT));
        release(&mut tree, 2, 2);
        assert_eq!(tree.selected_items(), [a, b, c]);
        assert_eq!(tree.last_selected(), Some(a));

        tree.handle(PointerEvent::new(PointerKind::Press, 2, 1).with_modifiers(InputModifiers::CTRL));
        release(&mut tree, 2, 1);
        assert_eq!(tree.selected_items(), [a, c]);

        press(&mut tree, 2, 3);
        release(&mut tree, 2, 3);
        assert_eq!(tree.selected_items(), [d]);
    }

    #[test]
    fn single_navigation_selects_and_multi_only_moves_focus() {
        let mut tree = tree_with(SelectMode::Single, &["a", "b", "c"]);
        let [a, b, c] = ["a", "b", "c"].map(|p| id(&tree, p));

        assert_eq!(tree.handle(TreeAction::FocusNext), TreeEvent::Handled);
        assert_eq!(tree.item_focus(), Some(b));
        assert_eq!(tree.selected_items(), [b]);
        tree.handle(TreeAction::FocusLast);
        assert_eq!(tree.selected_items(), [c]);
        assert_eq!(tree.handle(TreeAction::FocusNext), TreeEvent::Unhandled);

        tree.set_selectmode(SelectMode::Multi);
        tree.deselect_all(false);
        tree.handle(TreeAction::FocusFirst);
        assert_eq!(tree.item_focus(), Some(a));
        assert!(tree.selected_items().is_empty());

        tree.handle(TreeAction::ExtendNext);
        tree.handle(TreeAction::ExtendNext);
        assert_eq!(tree.selected_items(), [a, b, c]);
        assert_eq!(tree.item_focus(), Some(c));
    }

    #[test]
    fn space_keys_follow_select_mode() {
        let mut tree = tree_with(SelectMode::Multi, &["p/q", "r"]);
        let p = id(&tree, "p");
        tree.set_item_focus(Some(p));

        tree.handle(TreeAction::SelectFocus);
        assert!(tree.is_selected(p));
        tree.handle(TreeAction::ToggleSelect);
        assert!(!tree.is_selected(p));
        assert_eq!(tree.handle(TreeAction::SelectAll), TreeEvent::Handled);
        assert_eq!(tree.selected_items().len(), 4);

        tree.set_selectmode(SelectMode::Single);
        assert_eq!(tree.handle(TreeAction::SelectAll), TreeEvent::Unhandled);

        tree.set_selectmode(SelectMode::None);
        tree.handle(TreeAction::SelectFocus);
        assert!(tree.is_close(p));
        tree.handle(TreeAction::ToggleSelect);
        assert!(tree.is_open(p));
    }

    #[test]
    fn left_right_open_close_and_walk_hierarchy() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        let a = id(&tree, "a");
        let a1 = id(&tree, "a/a1");
        tree.set_item_focus(Some(a));

        tree.handle(TreeAction::CloseFocus);
        assert!(tree.is_close(a));
        tree.handle(TreeAction::OpenFocus);
        assert!(tree.is_open(a));
        tree.handle(TreeAction::OpenFocus);
        assert_eq!(tree.item_focus(), Some(a1));
        tree.handle(TreeAction::CloseFocus);
        assert_eq!(tree.item_focus(), Some(a));
        assert_eq!(tree.handle(TreeAction::ToggleOpen), TreeEvent::Handled);
        assert!(tree.is_close(a));
    }

    #[test]
    fn hidden_focus_is_rederived_from_ancestor() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        let a = id(&tree, "a");
        let a2 = id(&tree, "a/a2");
        tree.set_item_focus(Some(a2));
        tree.close(a, false);

        tree.handle(TreeAction::FocusNext);
        assert_eq!(tree.item_focus(), Some(id(&tree, "b")));
    }

    #[test]
    fn page_keys_move_by_viewport() {
        let paths: Vec<String> = (0..30).map(|i| format!("n{i:02}")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut tree = tree_with(SelectMode::Single, &refs);
        tree.resize(Rect::new(0, 0, 30, 5));
        let root = tree.root().unwrap();
        let items = tree.children(root).to_vec();
        tree.set_item_focus(Some(items[0]));

        tree.handle(TreeAction::PageDown);
        assert_eq!(tree.item_focus(), Some(items[5]));
        assert!(tree.displayed(items[5]));
        tree.handle(TreeAction::PageDown);
        tree.handle(TreeAction::PageUp);
        assert_eq!(tree.item_focus(), Some(items[5]));
        tree.handle(TreeAction::FocusLast);
        assert_eq!(tree.vposition(), 25);
    }

    #[test]
    fn wheel_scrolls_by_row_height() {
        let paths: Vec<String> = (0..30).map(|i| format!("n{i:02}")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut tree = tree_with(SelectMode::Single, &refs);

        tree.handle(PointerEvent::new(PointerKind::ScrollDown, 1, 1));
        tree.handle(PointerEvent::new(PointerKind::ScrollDown, 1, 1));
        assert_eq!(tree.vposition(), 2);
        tree.handle(PointerEvent::new(PointerKind::ScrollUp, 1, 1));
        assert_eq!(tree.vposition(), 1);
        assert_eq!(
            tree.handle(PointerEvent::new(PointerKind::ScrollUp, 50, 1)),
            TreeEvent::Unhandled
        );
    }

    #[test]
    fn drag_moves_item_above_target() {
        let mut tree = tree_with(SelectMode::SingleDraggable, PATHS);
        let log = reasons(&mut tree);
        let a = id(&tree, "a");
        let b = id(&tree, "b");

        press(&mut tree, 2, 3);
        assert!(tree.is_selected(b));
        drag(&mut tree, 6, 1);
        assert_eq!(tree.drag_origin(), Some(b));
        release(&mut tree, 6, 1);

        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.children(a)[0], b);
        assert_eq!(tree.item_pathname(b).as_deref(), Some("a/b"));
        assert_eq!(log.borrow().last(), Some(&TreeReason::Dragged));
        assert_eq!(tree.callback_item(), Some(b));
        assert_eq!(tree.drag_origin(), None);
    }

    #[test]
    fn drag_lower_half_places_below_or_inside() {
        let mut tree = ItemTree::new();
        tree.set_showroot(false);
        tree.set_selectmode(SelectMode::SingleDraggable);
        tree.set_labelsize(2);
        for path in PATHS {
            tree.add(path).unwrap();
        }
        tree.resize(Rect::new(0, 0, 30, 10));
        // Rows: a y0, a1 y2, a2 y4, b y6.
        let a = id(&tree, "a");
        let a1 = id(&tree, "a/a1");
        let a2 = id(&tree, "a/a2");
        let b = id(&tree, "b");

        press(&mut tree, 2, 6);
        drag(&mut tree, 6, 5);
        release(&mut tree, 6, 5);
        assert_eq!(tree.children(a), [a1, a2, b]);

        press(&mut tree, 6, 2);
        drag(&mut tree, 6, 1);
        release(&mut tree, 6, 1);
        assert_eq!(tree.children(a), [a1, a2, b]);
        assert_eq!(tree.children(tree.root().unwrap()), [a]);
    }

    #[test]
    fn drop_into_own_subtree_is_rejected() {
        let mut tree = tree_with(SelectMode::SingleDraggable, PATHS);
        let log = reasons(&mut tree);
        let a = id(&tree, "a");
        let root = tree.root().unwrap();

        press(&mut tree, 2, 0);
        drag(&mut tree, 6, 1);
        release(&mut tree, 6, 1);

        assert_eq!(tree.parent(a), Some(root));
        assert!(!log.borrow().contains(&TreeReason::Dragged));
    }

    #[test]
    fn drag_without_draggable_mode_never_moves() {
        let mut tree = tree_with(SelectMode::Single, PATHS);
        let b = id(&tree, "b");
        let a1 = id(&tree, "a/a1");
        press(&mut tree, 2, 3);
        drag(&mut tree, 6, 1);
        assert!(tree.is_selected(a1));
        release(&mut tree, 6, 1);
        assert_eq!(tree.parent(b), tree.root());
    }

    #[test]
    fn removing_pressed_item_resets_interaction() {
        let mut tree = tree_with(SelectMode::SingleDraggable, PATHS);
        let b = id(&tree, "b");
        press(&mut tree, 2, 3);
        tree.remove(b);
        assert_eq!(tree.pushed(), PushTarget::None);
        assert_eq!(release(&mut tree, 2, 3), TreeEvent::Unhandled);
    }
}
