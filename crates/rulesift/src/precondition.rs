//! Contract checks for caller errors.
//!
//! A failed precondition is a programming error, not bad input data, so it
//! panics instead of returning an error. Nothing in this crate catches it.

/// Panics with `contract violation: {message}` when `condition` is false.
#[track_caller]
pub fn require(condition: bool, message: &str) {
    if !condition {
        panic!("contract violation: {}", message);
    }
}
