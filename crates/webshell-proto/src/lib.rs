//! Capability bridge wire contract.
//!
//! The one contract that must be bit-for-bit identical across hosts: embedded
//! content is shared, so capability names, argument shapes and reply forms are
//! defined here once and consumed by every host adapter.
//!
//! # Components
//!
//! - [`Capability`]: the fixed capability set and its canonical wire names
//! - [`CallEnvelope`] / [`CapabilityCall`]: untyped and decoded call forms
//! - [`BridgeReply`] / [`CallbackDelivery`]: immediate and deferred results
//! - [`shim`]: the page-side `window.Native` script

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod call;
mod capability;
mod error;
mod reply;
pub mod shim;

pub use call::{CallEnvelope, CapabilityCall, NotificationArgs};
pub use capability::{ArgShape, Capability, ReplyKind};
pub use error::{ProtocolError, Result};
pub use reply::{BridgeReply, CallbackDelivery};
