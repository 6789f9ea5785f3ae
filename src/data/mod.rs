//! Runtime data: the field snapshot rules are evaluated against.

pub mod context;
pub mod model;

pub use context::*;
pub use model::*;
