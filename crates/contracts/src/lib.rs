//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Object model
//! - A [`Handle`] is assigned by the remote simulation server and is only valid for the
//!   lifetime of one connection.
//! - Every handle belongs to exactly one [`ObjectKind`].
//! - Remote calls answer with a [`ReturnCode`]; [`LinkResult`] carries either the payload
//!   or the failing code.

mod blueprint;
mod collection;
mod error;
mod link;
mod object;
mod sensor;

pub use blueprint::*;
pub use collection::*;
pub use error::*;
pub use link::*;
pub use object::*;
pub use sensor::*;
