//! Folding a rule tree into a single predicate.
//!
//! [`PredicateCompiler`] walks an ordered tree of groups and rules and
//! folds it, left to right, into one [`Predicate`]. Each rule and group
//! carries the [`LogicalOperation`](crate::LogicalOperation) joining it to
//! what precedes it among its siblings.
//!
//! # Folding
//!
//! ```text
//! rules(r1, r2, r3)      = (r1 op2 r2) op3 r3            empty list = TRUE
//! group without children = rules(own)
//! group with children    = own  op(child1)  children     own omitted when empty
//!   where children       = (c1 op2 c2) op3 c3
//! groups(g1, g2, g3)     = (g1 op2 g2) op3 g3
//! ```
//!
//! The first element's own operation never takes part in its list.
//!
//! # Failures
//!
//! A rule that fails to compile makes its whole rule list match nothing.
//! The error is logged at `warn` and goes no further; siblings outside the
//! list are unaffected. Contract violations (an empty top-level list) panic.

use tracing::{debug, trace, warn};

use crate::combinator::combine;
use crate::error::Result;
use crate::group::Group;
use crate::precondition::require;
use crate::predicate::Predicate;
use crate::rule::Rule;
use crate::rule_compiler::RuleCompiler;

/// Compiles rule trees into predicates over `T`.
///
/// # Example
///
/// ```
/// use rulesift::{FieldRuleCompiler, Group, Number, Op, PredicateCompiler, Rule, Value};
///
/// struct Person {
///     age: i64,
/// }
///
/// let compiler = PredicateCompiler::new(FieldRuleCompiler::new(|p: &Person, field: &str| {
///     match field {
///         "age" => Value::Number(Number::I64(p.age)),
///         _ => Value::None,
///     }
/// }));
///
/// let adults = compiler.compile_groups(&[Group::new().rule(Rule::new("age", Op::Gt, 18))]);
/// assert!(adults.test(&Person { age: 20 }));
/// assert!(!adults.test(&Person { age: 10 }));
/// ```
pub struct PredicateCompiler<T, C> {
    rule_compiler: C,
    _entity: std::marker::PhantomData<fn(&T)>,
}

impl<T, C: Clone> Clone for PredicateCompiler<T, C> {
    fn clone(&self) -> Self {
        PredicateCompiler {
            rule_compiler: self.rule_compiler.clone(),
            _entity: std::marker::PhantomData,
        }
    }
}

impl<T, C> PredicateCompiler<T, C>
where
    T: 'static,
    C: RuleCompiler<T>,
{
    pub fn new(rule_compiler: C) -> Self {
        PredicateCompiler {
            rule_compiler,
            _entity: std::marker::PhantomData,
        }
    }

    /// The leaf rule compiler this compiler delegates to.
    pub fn rule_compiler(&self) -> &C {
        &self.rule_compiler
    }

    /// Compiles an ordered rule list.
    ///
    /// An empty list matches everything. If any rule fails to compile, the
    /// result matches nothing.
    pub fn compile_rules(&self, rules: &[Rule]) -> Predicate<T> {
        match self.try_compile_rules(rules) {
            Ok(predicate) => predicate,
            Err(error) => {
                warn!(
                    %error,
                    rule_count = rules.len(),
                    rules = %RuleList(rules),
                    "rule list failed to compile, it will match nothing"
                );
                Predicate::always_false()
            }
        }
    }

    /// Compiles an ordered rule list, returning the first rule error.
    pub fn try_compile_rules(&self, rules: &[Rule]) -> Result<Predicate<T>> {
        let Some((first, rest)) = rules.split_first() else {
            return Ok(Predicate::always_true());
        };

        let mut acc = self.rule_compiler.compile(first)?;
        for rule in rest {
            let next = self.rule_compiler.compile(rule)?;
            acc = combine(rule.logical_operation, acc, next);
        }
        trace!(rule_count = rules.len(), "compiled rule list");
        Ok(acc)
    }

    /// Compiles one group and its subtree.
    pub fn compile_group(&self, group: &Group) -> Predicate<T> {
        let Some((first_child, other_children)) = group.groups.split_first() else {
            return self.compile_rules(&group.rules);
        };

        let own = if group.rules.is_empty() {
            None
        } else {
            Some(self.compile_rules(&group.rules))
        };

        let mut children = self.compile_group(first_child);
        for child in other_children {
            let next = self.compile_group(child);
            children = combine(child.logical_operation, children, next);
        }

        match own {
            None => children,
            Some(own) => combine(first_child.logical_operation, own, children),
        }
    }

    /// Compiles a top-level group list into the final predicate.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if `groups` is empty.
    #[track_caller]
    pub fn compile_groups(&self, groups: &[Group]) -> Predicate<T> {
        require(
            !groups.is_empty(),
            "compile_groups needs at least one group",
        );

        debug!(
            group_count = groups.len(),
            depth = groups.iter().map(Group::depth).max().unwrap_or(0),
            rule_count = groups.iter().map(Group::rule_count).sum::<usize>(),
            "compiling filter"
        );

        let (first, rest) = groups.split_at(1);
        let mut acc = self.compile_group(&first[0]);
        for group in rest {
            acc = combine(group.logical_operation, acc, self.compile_group(group));
        }
        acc
    }
}

/// Renders a rule list the way it folds, for diagnostics.
struct RuleList<'a>(&'a [Rule]);

impl std::fmt::Display for RuleList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, rule) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", rule.logical_operation)?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::op::Op;
    use crate::rule::{LogicalOperation, RuleValue};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Rules name a bit of the tested `u8`; field "fail" never compiles.
    /// Counts compilations and evaluations per field.
    #[derive(Default, Clone)]
    struct BitCompiler {
        compiled: Arc<Mutex<HashMap<String, usize>>>,
        evaluated: Arc<AtomicUsize>,
    }

    impl RuleCompiler<u8> for BitCompiler {
        fn compile(&self, rule: &Rule) -> Result<Predicate<u8>> {
            *self
                .compiled
                .lock()
                .unwrap()
                .entry(rule.field.clone())
                .or_default() += 1;
            let bit: u8 = match rule.field.parse() {
                Ok(bit) => bit,
                Err(_) => return Err(RuleError::UnknownField(rule.field.clone())),
            };
            let evaluated = Arc::clone(&self.evaluated);
            Ok(Predicate::new(move |x: &u8| {
                evaluated.fetch_add(1, Ordering::SeqCst);
                *x & (1u8 << bit) != 0
            }))
        }
    }

    fn bit(n: u8) -> Rule {
        Rule::new(n.to_string(), Op::Eq, RuleValue::Null)
    }

    fn compiler() -> PredicateCompiler<u8, BitCompiler> {
        PredicateCompiler::new(BitCompiler::default())
    }

    #[test]
    fn empty_rule_list_matches_everything() {
        let p = compiler().compile_rules(&[]);
        assert!((0..=u8::MAX).all(|x| p.test(&x)));
    }

    #[test]
    fn rule_list_folds_left_to_right() {
        // (b0 OR b1) AND b2
        let rules = [
            bit(0),
            bit(1).with_logic(LogicalOperation::Or),
            bit(2).with_logic(LogicalOperation::And),
        ];
        let p = compiler().compile_rules(&rules);
        for x in 0..8u8 {
            let expected = (x & 1 != 0 || x & 2 != 0) && x & 4 != 0;
            assert_eq!(p.test(&x), expected, "x = {:03b}", x);
        }
    }

    #[test]
    fn first_rule_operation_is_ignored() {
        let second = Rule::or("1", Op::Eq, RuleValue::Null);
        let and_first = compiler().compile_rules(&[bit(0), second.clone()]);
        let first = bit(0).with_logic(LogicalOperation::Or);
        let or_first = compiler().compile_rules(&[first, second]);
        for x in 0..4u8 {
            assert_eq!(and_first.test(&x), or_first.test(&x));
        }
    }

    #[test]
    fn first_rule_is_compiled_once() {
        let c = compiler();
        c.compile_rules(&[bit(0), bit(1)]);
        let compiled = c.rule_compiler().compiled.lock().unwrap();
        assert_eq!(compiled.get("0"), Some(&1));
        assert_eq!(compiled.get("1"), Some(&1));
    }

    #[test]
    fn failing_rule_fails_the_whole_list_closed() {
        let rules = [bit(0), Rule::or("fail", Op::Eq, RuleValue::Null)];
        let c = compiler();
        let p = c.compile_rules(&rules);
        assert!((0..=u8::MAX).all(|x| !p.test(&x)));

        let err = c.try_compile_rules(&rules).unwrap_err();
        assert!(matches!(err, RuleError::UnknownField(f) if f == "fail"));
    }

    #[test]
    fn failure_stops_compiling_the_list() {
        let c = compiler();
        c.compile_rules(&[Rule::new("fail", Op::Eq, RuleValue::Null), bit(3)]);
        assert_eq!(c.rule_compiler().compiled.lock().unwrap().get("3"), None);
    }

    #[test]
    fn group_without_children_is_its_rule_list() {
        let rules = vec![bit(0), bit(1).with_logic(LogicalOperation::Or)];
        let c = compiler();
        let from_group = c.compile_group(&Group {
            rules: rules.clone(),
            ..Group::default()
        });
        let from_rules = c.compile_rules(&rules);
        for x in 0..4u8 {
            assert_eq!(from_group.test(&x), from_rules.test(&x));
        }
    }

    #[test]
    fn empty_group_matches_everything() {
        let p = compiler().compile_group(&Group::new());
        assert!(p.test(&0));
    }

    #[test]
    fn children_fold_by_their_own_operation() {
        let a = Group::new().rule(bit(0));
        let b = Group::new().rule(bit(1));

        let joined = Group::new().group(a.clone()).group(b.clone());
        let and = compiler().compile_group(&joined);
        assert!(!and.test(&0b01));
        assert!(and.test(&0b11));

        let either = b.with_logic(LogicalOperation::Or);
        let joined = Group::new().group(a).group(either);
        let or = compiler().compile_group(&joined);
        assert!(or.test(&0b01));
        assert!(or.test(&0b10));
        assert!(!or.test(&0b00));
    }

    #[test]
    fn first_child_operation_links_own_rules_to_children() {
        // own = b0; children = (b1 AND b2); linked by first child's OR
        let group = Group::new()
            .rule(bit(0))
            .group(Group::or().rule(bit(1)))
            .group(Group::and().rule(bit(2)));
        let p = compiler().compile_group(&group);
        for x in 0..8u8 {
            let expected = x & 1 != 0 || (x & 2 != 0 && x & 4 != 0);
            assert_eq!(p.test(&x), expected, "x = {:03b}", x);
        }

        // Same tree, first child joined with AND
        let group = Group::new()
            .rule(bit(0))
            .group(Group::and().rule(bit(1)))
            .group(Group::or().rule(bit(2)));
        let p = compiler().compile_group(&group);
        for x in 0..8u8 {
            let expected = x & 1 != 0 && (x & 2 != 0 || x & 4 != 0);
            assert_eq!(p.test(&x), expected, "x = {:03b}", x);
        }
    }

    #[test]
    fn group_with_children_and_no_rules_is_its_children() {
        let group = Group::new().group(Group::or().rule(bit(1)));
        let p = compiler().compile_group(&group);
        // With no own rules the first child's OR has nothing to join
        assert!(!p.test(&0b01));
        assert!(p.test(&0b10));
    }

    #[test]
    fn deep_nesting_recurses() {
        let mut group = Group::new().rule(bit(7));
        for _ in 0..50 {
            group = Group::new().group(group);
        }
        let p = compiler().compile_group(&group);
        assert!(p.test(&0b1000_0000));
        assert!(!p.test(&0b0111_1111));
    }

    #[test]
    fn failing_rule_only_closes_its_own_list() {
        // Children: [broken] OR [b1]
        let broken = Rule::new("fail", Op::Eq, RuleValue::Null);
        let group = Group::new()
            .group(Group::new().rule(broken))
            .group(Group::or().rule(bit(1)));
        let p = compiler().compile_group(&group);
        assert!(p.test(&0b10));
        assert!(!p.test(&0b01));
    }

    #[test]
    fn top_level_groups_fold() {
        let groups = [
            Group::new().rule(bit(0)),
            Group::or().rule(bit(1)),
            Group::and().rule(bit(2)),
        ];
        let p = compiler().compile_groups(&groups);
        for x in 0..8u8 {
            let expected = (x & 1 != 0 || x & 2 != 0) && x & 4 != 0;
            assert_eq!(p.test(&x), expected, "x = {:03b}", x);
        }
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn empty_top_level_list_is_a_contract_violation() {
        compiler().compile_groups(&[]);
    }

    #[test]
    fn evaluation_short_circuits() {
        let c = compiler();
        // b0 OR b1: b1 is not evaluated when b0 holds
        let either = [bit(0), bit(1).with_logic(LogicalOperation::Or)];
        let p = c.compile_rules(&either);
        c.rule_compiler().evaluated.store(0, Ordering::SeqCst);
        assert!(p.test(&0b01));
        assert_eq!(c.rule_compiler().evaluated.load(Ordering::SeqCst), 1);

        // b0 AND b1: b1 is not evaluated when b0 fails
        let p = c.compile_rules(&[bit(0), bit(1)]);
        c.rule_compiler().evaluated.store(0, Ordering::SeqCst);
        assert!(!p.test(&0b10));
        assert_eq!(c.rule_compiler().evaluated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rule_list_display() {
        let rules = [bit(0), bit(1).with_logic(LogicalOperation::Or)];
        let shown = RuleList(&rules).to_string();
        assert_eq!(shown, "0 equal null OR 1 equal null");
    }
}
