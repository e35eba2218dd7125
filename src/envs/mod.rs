//! Small hand-written models for the binary and the tests.

mod simple_golf;
mod toy_mdps;

pub use simple_golf::*;
pub use toy_mdps::*;
