//! Binary codecs for cell names and counter values.

pub mod composite;
pub mod counter;

pub use composite::{Composite, CompositeBuilder, encode, split};
