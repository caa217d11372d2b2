//! Shared fixtures for the unit tests: synthetic PE images, idiom encodings and in-memory
//! stand-ins for the network and the archive tool.

mod builder;
mod idiom;
mod mocks;

pub use builder::PeBuilder;
pub use idiom::*;
pub use mocks::{MockArchive, MockFetch};
