//! Type inference for raw textual values.

mod classifier;

pub use classifier::classify;
