//! Error types for bridge message decoding.

use thiserror::Error;

use crate::ArgShape;

/// Errors produced while decoding a bridge call.
///
/// All variants describe misuse of the bridge by embedded content. The host
/// logs them and answers the call with an error reply; none of them may reach
/// content rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Message was not a JSON call envelope.
    #[error("malformed bridge message: {0}")]
    MalformedMessage(String),

    /// No capability with this name exists.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// Argument missing or of the wrong shape for the named capability.
    #[error("invalid argument for {capability}: expected {expected:?}")]
    InvalidArgument {
        /// Wire name of the capability being invoked.
        capability: &'static str,
        /// Shape the capability expects.
        expected: ArgShape,
    },
}

impl ProtocolError {
    /// Wire name of the capability the caller invoked, when it exists.
    ///
    /// Present only for [`Self::InvalidArgument`]: the page knows this shell
    /// but passed a bad argument. Unknown names and unparseable envelopes
    /// usually come from a page written for a different shell.
    pub fn capability(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { capability, .. } => Some(*capability),
            Self::MalformedMessage(_) | Self::UnknownCapability(_) => None,
        }
    }
}

/// Convenience alias for decode results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
