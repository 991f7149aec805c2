use thiserror::Error;

/// Errors returned by fallible hierarchy operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No item exists at the given path.
    #[error("no item at path `{0}`")]
    PathNotFound(String),
    /// The path has no segments.
    #[error("empty path")]
    EmptyPath,
    /// The item id does not refer to a live item.
    #[error("item not found")]
    ItemNotFound,
    /// The move would make an item its own descendant, or moves the root.
    #[error("invalid move")]
    InvalidMove,
    /// An insertion index lies outside the child list.
    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current number of children.
        len: usize,
    },
}

/// Errors returned when loading preferences from a key/value store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PrefsError {
    /// The stored value could not be parsed for the given key.
    #[error("invalid value `{value}` for preference `{key}`")]
    InvalidValue {
        /// Preference key.
        key: &'static str,
        /// Raw stored value.
        value: String,
    },
}
