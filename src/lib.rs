#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod error;
pub mod heartbeat;
pub mod policy;
pub mod registry;
pub mod reporter;
pub mod router;
pub(crate) mod serde_helpers;
pub mod types;
pub mod ws;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;
