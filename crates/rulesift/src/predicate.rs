//! Compiled boolean tests over entities.
//!
//! A [`Predicate`] is the product of compilation: a shared, thread-safe
//! function `&T -> bool` that holds no reference back into the rule tree it
//! was compiled from. Cloning is cheap.

use std::fmt;
use std::sync::Arc;

type TestFn<T> = dyn Fn(&T) -> bool + Send + Sync;

/// A reusable boolean test over `T`.
///
/// # Example
///
/// ```
/// use rulesift::Predicate;
///
/// let even = Predicate::new(|n: &i32| n % 2 == 0);
/// let positive = Predicate::new(|n: &i32| *n > 0);
/// let both = even.and(positive);
///
/// let numbers = [-2, -1, 0, 1, 2, 3, 4];
/// assert_eq!(both.filter(&numbers), vec![&2, &4]);
/// ```
pub struct Predicate<T> {
    test: Arc<TestFn<T>>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

impl<T: 'static> Predicate<T> {
    /// Wraps a function as a predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Predicate { test: Arc::new(f) }
    }

    /// A predicate that ignores its input and returns `result`.
    pub fn always(result: bool) -> Self {
        Predicate::new(move |_: &T| result)
    }

    /// Matches every element.
    pub fn always_true() -> Self {
        Predicate::always(true)
    }

    /// Matches no element.
    pub fn always_false() -> Self {
        Predicate::always(false)
    }

    /// Short-circuit disjunction: `other` runs only when `self` is false.
    pub fn or(self, other: Predicate<T>) -> Self {
        Predicate::new(move |item: &T| self.test(item) || other.test(item))
    }

    /// Short-circuit conjunction: `other` runs only when `self` is true.
    pub fn and(self, other: Predicate<T>) -> Self {
        Predicate::new(move |item: &T| self.test(item) && other.test(item))
    }

    /// Negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::new(move |item: &T| !self.test(item))
    }
}

impl<T> Predicate<T> {
    /// Evaluates the predicate against one element.
    pub fn test(&self, item: &T) -> bool {
        (self.test)(item)
    }

    /// Returns `true` if both handles share the same compiled function.
    pub fn ptr_eq(a: &Predicate<T>, b: &Predicate<T>) -> bool {
        Arc::ptr_eq(&a.test, &b.test)
    }

    /// Filters a slice, returning references to matching items in order.
    pub fn filter<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.test(item)).collect()
    }

    /// Filters and clones matching items.
    pub fn filter_cloned(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        items
            .iter()
            .filter(|item| self.test(item))
            .cloned()
            .collect()
    }

    /// Filters a vector in place, keeping only matching items.
    pub fn retain(&self, items: &mut Vec<T>) {
        items.retain(|item| self.test(item));
    }

    /// Counts the number of matching items.
    pub fn count(&self, items: &[T]) -> usize {
        items.iter().filter(|item| self.test(item)).count()
    }

    /// Returns `true` if any item matches.
    pub fn any(&self, items: &[T]) -> bool {
        items.iter().any(|item| self.test(item))
    }

    /// Returns `true` if all items match.
    pub fn all(&self, items: &[T]) -> bool {
        items.iter().all(|item| self.test(item))
    }

    /// Finds the first matching item.
    pub fn find<'a>(&self, items: &'a [T]) -> Option<&'a T> {
        items.iter().find(|item| self.test(item))
    }

    /// Finds the first matching item and returns its index.
    pub fn position(&self, items: &[T]) -> Option<usize> {
        items.iter().position(|item| self.test(item))
    }
}
