//! ABI type model, primitive encoders, and calldata composition.
//!
//! This crate is the "core" of the design: a closed sum type over ABI
//! kinds with one packer per variant, no runtime reflection over caller
//! values beyond checking that a supplied [`Value`] is shaped like its
//! declared [`TypeDescriptor`].

pub mod descriptor;
pub mod encode;
pub mod method;
pub mod packer;
pub mod types;
pub mod value;

pub use descriptor::{AbiDescriptor, AbiParseError, Event};
pub use encode::{EncodeError, Int256};
pub use method::Method;
pub use packer::encode_tuple;
pub use types::{Kind, TypeDescriptor, TypeParseError};
pub use value::Value;
