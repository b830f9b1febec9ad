//! Errors raised while running a controller command
//!
//! All of them are recoverable: the public controller API turns them into a
//! `false` return and a `debug!` line.

/// Why a controller command stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// The host was torn down, or navigated to another document, mid-command.
    #[error("host document is no longer available")]
    NotAvailable,

    /// Confirm or cancel was requested while idle.
    #[error("no active composition")]
    NoActiveComposition,

    /// An offset or host position does not map to a live position.
    #[error("range cannot be resolved against the editable scope")]
    RangeUnresolvable,

    /// The composition span was disconnected or collapsed behind our back.
    #[error("composition span no longer covers any text")]
    SelectionDesync,

    /// A cancelable `beforeinput` was cancelled by the host.
    #[error("beforeinput was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ControllerError>;
