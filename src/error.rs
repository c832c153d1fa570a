//! Error types.

use hidapi::HidError;
use thiserror::Error;

/// Errors raised while resolving, encoding or sending a lighting change.
#[derive(Error, Debug)]
pub enum Error {
    /// No command with this name exists.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Wrong number of arguments for a known command.
    #[error("wrong argument count for {command}\n\n{usage}")]
    ArgumentCountMismatch { command: &'static str, usage: String },

    /// Color argument is not a six digit hex string.
    #[error(
        "could not interpret color parameter value {0}\nPlease give this value as a \
         six-character hex string like ff0000."
    )]
    InvalidColorFormat(String),

    /// Speed argument is not 1, 2 or 3.
    #[error(
        "could not interpret speed parameter value {0}\nPlease give this value as an integer: 1 \
         (slow), 2 (medium), or 3 (fast)."
    )]
    InvalidSpeedValue(String),

    /// No attached keyboard matched the supported vendor/product IDs.
    #[error("no compatible device found")]
    NoCompatibleDeviceFound,

    /// Writing a feature report to one keyboard failed.
    #[error("unable to write to {device}: {source}")]
    DeviceWriteFailure {
        device: String,
        #[source]
        source: HidError,
    },

    /// HID subsystem could not be accessed.
    #[error("unable to access HID: {0}")]
    Hid(#[from] HidError),
}
