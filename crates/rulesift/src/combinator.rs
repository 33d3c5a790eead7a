//! Boolean combinators that tolerate an absent operand.
//!
//! Folding a rule tree starts from "nothing accumulated yet". These
//! combinators treat `None` as that empty accumulator: combining it with a
//! predicate yields the predicate unchanged.

use crate::precondition::require;
use crate::predicate::Predicate;
use crate::rule::LogicalOperation;

/// Short-circuit OR of two optional predicates.
///
/// If one side is absent the other is returned unchanged. Otherwise `left`
/// runs first and `right` runs only when `left` is false.
///
/// # Panics
///
/// Panics with a contract violation when both sides are absent.
#[track_caller]
pub fn or<T: 'static>(left: Option<Predicate<T>>, right: Option<Predicate<T>>) -> Predicate<T> {
    require(
        left.is_some() || right.is_some(),
        "or() needs at least one predicate",
    );
    match (left, right) {
        (Some(left), Some(right)) => left.or(right),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => unreachable!("checked by precondition"),
    }
}

/// Short-circuit AND of two optional predicates.
///
/// If one side is absent the other is returned unchanged. Otherwise `left`
/// runs first and `right` runs only when `left` is true.
///
/// # Panics
///
/// Panics with a contract violation when both sides are absent.
#[track_caller]
pub fn and<T: 'static>(left: Option<Predicate<T>>, right: Option<Predicate<T>>) -> Predicate<T> {
    require(
        left.is_some() || right.is_some(),
        "and() needs at least one predicate",
    );
    match (left, right) {
        (Some(left), Some(right)) => left.and(right),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => unreachable!("checked by precondition"),
    }
}

/// Joins `next` onto `acc` with the given operation.
pub fn combine<T: 'static>(
    operation: LogicalOperation,
    acc: Predicate<T>,
    next: Predicate<T>,
) -> Predicate<T> {
    match operation {
        LogicalOperation::And => and(Some(acc), Some(next)),
        LogicalOperation::Or => or(Some(acc), Some(next)),
    }
}
