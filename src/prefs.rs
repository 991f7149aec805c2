use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::str::FromStr;

use ratatui::style::{Color, Modifier};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PrefsError;
use crate::item::LabelDefaults;

/// How many items may be selected at once.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectMode {
    /// Nothing can be selected; keys and clicks only move focus and open/close.
    None,
    /// At most one item is selected.
    #[default]
    Single,
    /// Any number of items may be selected.
    Multi,
    /// Like `Single`, and a dragged label reparents the item.
    SingleDraggable,
}

impl SelectMode {
    /// Returns `true` for the modes that allow at most one selected item.
    pub const fn is_single(self) -> bool {
        matches!(self, Self::Single | Self::SingleDraggable)
    }
}

/// Where newly added children are placed among their siblings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Append in insertion order.
    #[default]
    None,
    Ascending,
    Descending,
}

/// Connector line style between parents and children.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectorStyle {
    None,
    #[default]
    Dotted,
    Solid,
}

/// Whether clicking an already selected item raises a callback again.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReselectMode {
    /// Only the transition to selected is reported.
    #[default]
    Once,
    /// Every click on a selected item reports `Reselected`.
    Always,
}

/// How an item with an embedded control is laid out.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemDrawMode {
    /// Draw the label followed by the control instead of the control alone.
    pub label_and_widget: bool,
    /// Let the control's height define the row height.
    pub height_from_widget: bool,
}

macro_rules! parse_enum {
    ($ty:ident { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

parse_enum!(SelectMode {
    "none" => None,
    "single" => Single,
    "multi" => Multi,
    "single_draggable" => SingleDraggable,
});

parse_enum!(SortOrder {
    "none" => None,
    "ascending" => Ascending,
    "descending" => Descending,
});

parse_enum!(ConnectorStyle {
    "none" => None,
    "dotted" => Dotted,
    "solid" => Solid,
});

/// Layout and behaviour settings consulted by the tree and inherited by new items.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreePrefs {
    pub labelfont: Modifier,
    pub labelsize: u16,
    pub labelfgcolor: Color,
    pub labelbgcolor: Option<Color>,
    pub connectorcolor: Color,
    pub connectorstyle: ConnectorStyle,
    pub connectorwidth: u16,
    pub marginleft: u16,
    pub margintop: u16,
    pub marginbottom: u16,
    pub linespacing: u16,
    pub openchild_marginbottom: u16,
    pub usericonmarginleft: u16,
    pub labelmarginleft: u16,
    pub widgetmarginleft: u16,
    pub openicon: String,
    pub closeicon: String,
    pub usericon: Option<String>,
    pub showcollapse: bool,
    pub showroot: bool,
    pub selectmode: SelectMode,
    pub sortorder: SortOrder,
    pub item_reselect_mode: ReselectMode,
    pub item_draw_mode: ItemDrawMode,
}

impl Default for TreePrefs {
    fn default() -> Self {
        Self {
            labelfont: Modifier::empty(),
            labelsize: 1,
            labelfgcolor: Color::Reset,
            labelbgcolor: None,
            connectorcolor: Color::DarkGray,
            connectorstyle: ConnectorStyle::default(),
            connectorwidth: 3,
            marginleft: 0,
            margintop: 0,
            marginbottom: 0,
            linespacing: 0,
            openchild_marginbottom: 0,
            usericonmarginleft: 0,
            labelmarginleft: 1,
            widgetmarginleft: 1,
            openicon: "▼".to_string(),
            closeicon: "▶".to_string(),
            usericon: None,
            showcollapse: true,
            showroot: true,
            selectmode: SelectMode::default(),
            sortorder: SortOrder::default(),
            item_reselect_mode: ReselectMode::default(),
            item_draw_mode: ItemDrawMode::default(),
        }
    }
}

impl TreePrefs {
    pub(crate) const fn label_defaults(&self) -> LabelDefaults {
        LabelDefaults {
            font: self.labelfont,
            size: self.labelsize,
            fg: self.labelfgcolor,
            bg: self.labelbgcolor,
        }
    }

    /// Restores preferences from a key/value store.
    ///
    /// Missing keys keep their current value. If any stored value fails to
    /// parse, nothing is changed and the first offending key is reported.
    pub fn load<S: PrefsStore + ?Sized>(&mut self, store: &S) -> Result<(), PrefsError> {
        let mut next = self.clone();

        if let Some(font) = read(store, "labelfont", parse_modifier)? {
            next.labelfont = font;
        }
        if let Some(size) = read(store, "labelsize", parse_u16)? {
            next.labelsize = size.max(1);
        }
        if let Some(color) = read(store, "labelfgcolor", parse_color)? {
            next.labelfgcolor = color;
        }
        if let Some(color) = read(store, "labelbgcolor", parse_optional_color)? {
            next.labelbgcolor = color;
        }
        if let Some(color) = read(store, "connectorcolor", parse_color)? {
            next.connectorcolor = color;
        }
        if let Some(style) = read(store, "connectorstyle", |s| s.parse::<ConnectorStyle>().ok())? {
            next.connectorstyle = style;
        }
        if let Some(mode) = read(store, "selectmode", |s| s.parse::<SelectMode>().ok())? {
            next.selectmode = mode;
        }
        if let Some(order) = read(store, "sortorder", |s| s.parse::<SortOrder>().ok())? {
            next.sortorder = order;
        }
        if let Some(show) = read(store, "showcollapse", parse_bool)? {
            next.showcollapse = show;
        }
        if let Some(show) = read(store, "showroot", parse_bool)? {
            next.showroot = show;
        }

        let margins: [(&'static str, &mut u16); 9] = [
            ("connectorwidth", &mut next.connectorwidth),
            ("marginleft", &mut next.marginleft),
            ("margintop", &mut next.margintop),
            ("marginbottom", &mut next.marginbottom),
            ("linespacing", &mut next.linespacing),
            ("openchild_marginbottom", &mut next.openchild_marginbottom),
            ("usericonmarginleft", &mut next.usericonmarginleft),
            ("labelmarginleft", &mut next.labelmarginleft),
            ("widgetmarginleft", &mut next.widgetmarginleft),
        ];
        for (key, slot) in margins {
            if let Some(value) = read(store, key, parse_u16)? {
                *slot = value;
            }
        }

        *self = next;
        Ok(())
    }
}

/// Read-only key/value source of persisted preferences.
pub trait PrefsStore {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: BuildHasher> PrefsStore for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl PrefsStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

fn read<S, T, F>(store: &S, key: &'static str, parse: F) -> Result<Option<T>, PrefsError>
where
    S: PrefsStore + ?Sized,
    F: Fn(&str) -> Option<T>,
{
    let Some(value) = store.get(key) else {
        return Ok(None);
    };
    match parse(&value) {
        Some(parsed) => Ok(Some(parsed)),
        None => {
            tracing::warn!(key, value = %value, "unparsable preference");
            Err(PrefsError::InvalidValue { key, value })
        }
    }
}

fn parse_u16(s: &str) -> Option<u16> {
    s.trim().parse().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_color(s: &str) -> Option<Color> {
    s.trim().parse().ok()
}

fn parse_optional_color(s: &str) -> Option<Option<Color>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("none") || s.is_empty() {
        return Some(None);
    }
    parse_color(s).map(Some)
}

// Font names map to text modifiers: "bold", "italic", "bold|italic", "normal".
fn parse_modifier(s: &str) -> Option<Modifier> {
    let mut font = Modifier::empty();
    for part in s.split('|').map(str::trim) {
        font |= match part.to_ascii_lowercase().as_str() {
            "" | "normal" | "regular" => Modifier::empty(),
            "bold" => Modifier::BOLD,
            "italic" => Modifier::ITALIC,
            "dim" => Modifier::DIM,
            "underlined" => Modifier::UNDERLINED,
            _ => return None,
        };
    }
    Some(font)
}
