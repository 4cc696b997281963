//! Behavior integration tests
//!
//! One module per concrete behavior, plus tests of the composed chain itself.

mod adopt;
mod chain;
mod lifecycle;
