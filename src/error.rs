//! Errors surfaced by tree and window construction.
//!
//! Routing itself never fails: stale paths degrade to "no target" as
//! described in the module docs of [`crate::dispatch`]. The embedder-facing
//! mutation APIs do fail, loudly, because silently ignoring a bad parent id
//! would hide bugs in the embedder.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The widget id does not refer to a live widget.
    #[error("unknown widget id")]
    UnknownWidget,
    /// The window id does not refer to a live window.
    #[error("unknown window id")]
    UnknownWindow,
    /// The window already has a root widget.
    #[error("window already has a root widget")]
    RootAlreadySet,
    /// Attempted to parent a widget under a widget in another window.
    #[error("parent belongs to a different window")]
    CrossWindowParent,
    /// The parent window for a popup/menu window is gone.
    #[error("parent window no longer exists")]
    UnknownParentWindow,
}
