//! Core types for pagelet responses.
//!
//! A backend builds a [`Response`] out of ordered [`Action`]s (inject content,
//! reload a region, navigate, log a message, attach a resource). The pagelets
//! client replays them in order to update one page without a full reload.
//!
//! This crate owns the action model and the bytes on the wire. How content is
//! rendered and how the bytes are transported belong to the caller.
//!
//! ```
//! use pagelets_core::Response;
//!
//! let mut response = Response::new();
//! response
//!     .add_css_resource("/my.css")
//!     .set_content("<div>hi</div>", "");
//!
//! let bytes = response.to_bytes().unwrap();
//! assert!(bytes.starts_with(b")]}'"));
//! ```

mod action;
mod frame;
mod response;

pub use action::{
    Action, ActionKind, Content, Custom, DEFAULT_LOG_LEVEL, Finalize, Load, Location, Log,
    Refresh, Resource, ResourceType, Synchronous,
};
pub use frame::{FrameError, SENTINEL, unframe};
pub use response::{Response, ResponseError};
