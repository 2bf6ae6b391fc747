//! Integration test crate for edlkit.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the edlkit crates to verify they work together.

#[cfg(test)]
mod document;
