//! Push delivery to an ntfy topic.
//!
//! Each notification becomes one plain-text POST. ntfy reads the message
//! metadata from request headers:
//! - `Title`: fixed heading shown above the body
//! - `Click`: URL opened when the push is tapped (only sent when known)

pub mod ntfy;

pub use ntfy::NtfyForwarder;
