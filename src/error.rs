//! Two error domains, deliberately kept apart.
//!
//! Guest-visible MOS errors (BBC-canonical error codes) are never Rust
//! `Result`s: they are written into guest memory at the error scratch area
//! and delivered by redirecting the emulated program counter, exactly as
//! real MOS does it (see [`crate::environment::Environment::raise_error`]).
//!
//! [`HostError`] is the host-side domain: failures talking to the real
//! filesystem, clock, or `.inf` sidecar format. A `HostError` never escapes
//! to a caller expecting guest semantics; every handler catches it at its
//! boundary and turns it into `raise_error(ERR_TODO, ...)`, mirroring the
//! original implementation's `panic(err)` sites but recoverably.

use thiserror::Error;

/// Guest-visible MOS error codes (BBC-canonical numbers).
pub const ERR_TODO: u8 = 129;
pub const ERR_CATALOGUE_FULL: u8 = 190;
pub const ERR_BAD_DRIVE: u8 = 205;
pub const ERR_BAD_DIRECTORY: u8 = 206;
pub const ERR_FILE_NOT_FOUND: u8 = 214;
pub const ERR_CHANNEL: u8 = 222;
pub const ERR_BAD_ADDRESS: u8 = 252;
pub const ERR_BAD_STRING: u8 = 253;
pub const ERR_BAD_COMMAND: u8 = 254;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("bad string: {0}")]
    BadString(String),

    #[error("bad address: {0}")]
    BadAddress(String),

    /// A guest-visible error with an explicit code, e.g. "Channel" (222) on
    /// a bad file handle — carried through rather than collapsed to
    /// [`ERR_TODO`] so callers still raise the right MOS error number.
    #[error("{1}")]
    Guest(u8, String),

    #[error("{0}")]
    Other(String),
}

impl HostError {
    /// The guest error code that should accompany this failure, absent a
    /// more specific mapping at the call site.
    pub fn guest_code(&self) -> u8 {
        match self {
            HostError::BadString(_) => ERR_BAD_STRING,
            HostError::BadAddress(_) => ERR_BAD_ADDRESS,
            HostError::Guest(code, _) => *code,
            HostError::Io(_) | HostError::Other(_) => ERR_TODO,
        }
    }
}
