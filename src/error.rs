use std::{boxed, error};

/// Error type for the fallible edges of the crate (config validation).
/// Relay sessions themselves never fail; see [`crate::End`].
pub type Box = boxed::Box<dyn error::Error + Send + Sync>;
