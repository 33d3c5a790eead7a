//! Rule groups: the nodes of a filter tree.
//!
//! A [`Group`] owns an ordered list of rules and an ordered list of child
//! groups. Filter definitions persisted by a UI rule builder are a list of
//! top-level groups; [`parse_groups`] reads them from JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::rule::{LogicalOperation, Rule};

/// A node in the filter tree.
///
/// # Example
///
/// ```
/// use rulesift::{Group, Op, Rule};
///
/// let group = Group::new()
///     .rule(Rule::new("age", Op::Gte, 18))
///     .group(
///         Group::or()
///             .rule(Rule::new("country", Op::Eq, "NL"))
///             .rule(Rule::or("country", Op::Eq, "BE")),
///     );
///
/// assert!(group.has_children());
/// assert_eq!(group.depth(), 2);
/// assert_eq!(group.rule_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    /// Leaf rules, folded left to right.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Child groups, folded left to right.
    #[serde(default, alias = "children")]
    pub groups: Vec<Group>,
    /// How this group joins its preceding sibling group.
    #[serde(default, alias = "condition", alias = "logic")]
    pub logical_operation: LogicalOperation,
}

impl Group {
    /// Creates an empty group joined with `AND`.
    pub fn new() -> Self {
        Group::default()
    }

    /// Creates an empty group joined to its preceding sibling with `AND`.
    pub fn and() -> Self {
        Group::new()
    }

    /// Creates an empty group joined to its preceding sibling with `OR`.
    pub fn or() -> Self {
        Group::new().with_logic(LogicalOperation::Or)
    }

    /// Appends a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a child group.
    pub fn group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Sets the logical operation.
    pub fn with_logic(mut self, logical_operation: LogicalOperation) -> Self {
        self.logical_operation = logical_operation;
        self
    }

    /// Returns `true` if this group has child groups.
    pub fn has_children(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Number of group levels in this subtree, counting this one.
    pub fn depth(&self) -> usize {
        1 + self.groups.iter().map(Group::depth).max().unwrap_or(0)
    }

    /// Number of rules in this subtree.
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.groups.iter().map(Group::rule_count).sum::<usize>()
    }
}

trait Joined: fmt::Display {
    fn joined_by(&self) -> LogicalOperation;
}

impl Joined for Rule {
    fn joined_by(&self) -> LogicalOperation {
        self.logical_operation
    }
}

impl Joined for Group {
    fn joined_by(&self) -> LogicalOperation {
        self.logical_operation
    }
}

fn write_sequence<J: Joined>(f: &mut fmt::Formatter<'_>, items: &[J]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", item.joined_by())?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rules.is_empty() && self.groups.is_empty() {
            return write!(f, "TRUE");
        }
        let Some(first) = self.groups.first() else {
            write!(f, "(")?;
            write_sequence(f, &self.rules)?;
            return write!(f, ")");
        };
        if self.rules.is_empty() {
            write!(f, "(")?;
            write_sequence(f, &self.groups)?;
            return write!(f, ")");
        }
        // Own rules and children each fold on their own before the first
        // child's operation joins them.
        write!(f, "(")?;
        write_folded(f, &self.rules)?;
        write!(f, " {} ", first.logical_operation)?;
        write_folded(f, &self.groups)?;
        write!(f, ")")
    }
}

fn write_folded<J: Joined>(f: &mut fmt::Formatter<'_>, items: &[J]) -> fmt::Result {
    if items.len() == 1 {
        return write_sequence(f, items);
    }
    write!(f, "(")?;
    write_sequence(f, items)?;
    write!(f, ")")
}

/// Parses a single group from JSON.
pub fn parse_group(json: &str) -> Result<Group, DefinitionError> {
    Ok(serde_json::from_str(json)?)
}

/// Parses a top-level group list from JSON.
///
/// Accepts either an array of groups or a single group object, which is
/// treated as a one-element list. An empty array is rejected.
pub fn parse_groups(json: &str) -> Result<Vec<Group>, DefinitionError> {
    let doc: serde_json::Value = serde_json::from_str(json)?;
    let groups = match doc {
        serde_json::Value::Array(_) => serde_json::from_value::<Vec<Group>>(doc)?,
        other => vec![serde_json::from_value::<Group>(other)?],
    };
    if groups.is_empty() {
        return Err(DefinitionError::Empty);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Op;
    use crate::rule::RuleValue;

    #[test]
    fn has_children_tracks_child_groups() {
        let leaf = Group::new().rule(Rule::new("a", Op::Eq, 1));
        assert!(!leaf.has_children());
        assert!(Group::new().group(leaf).has_children());
    }

    #[test]
    fn depth_and_rule_count() {
        assert_eq!(Group::new().depth(), 1);
        assert_eq!(Group::new().rule_count(), 0);

        let inner = Group::new().rule(Rule::new("b", Op::Eq, 2));
        let tree = Group::new()
            .rule(Rule::new("a", Op::Eq, 1))
            .group(Group::new().group(inner))
            .group(Group::new().rule(Rule::new("c", Op::Eq, 3)));
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.rule_count(), 3);
    }

    #[test]
    fn display_renders_infix() {
        assert_eq!(Group::new().to_string(), "TRUE");

        let no_email = Rule::new("email", Op::IsNull, RuleValue::Null);
        let group = Group::new()
            .rule(Rule::new("age", Op::Gt, 18))
            .rule(Rule::or("vip", Op::Eq, true))
            .group(Group::and().rule(Rule::new("name", Op::Contains, "a")))
            .group(Group::or().rule(no_email));

        assert_eq!(
            group.to_string(),
            r#"((age greater 18 OR vip equal true) AND ((name contains "a") OR (email is_null)))"#
        );

        let single = Group::new()
            .rule(Rule::new("a", Op::Eq, 1))
            .group(Group::or().rule(Rule::new("b", Op::Eq, 2)));
        assert_eq!(single.to_string(), "(a equal 1 OR (b equal 2))");

        let children_only = Group::new()
            .group(Group::new().rule(Rule::new("a", Op::Eq, 1)))
            .group(Group::or().rule(Rule::new("b", Op::Eq, 2)));
        assert_eq!(children_only.to_string(), "((a equal 1) OR (b equal 2))");
    }

    #[test]
    fn parse_nested_definition() {
        let json = r#"{
            "logical_operation": "and",
            "rules": [
                {"field": "age", "operator": ">", "value": 18, "logical_operation": "and"}
            ],
            "groups": [
                {
                    "condition": "OR",
                    "rules": [{"field": "name", "op": "begins_with", "value": "A"}]
                }
            ]
        }"#;

        let group = parse_group(json).unwrap();
        assert_eq!(group.rules, vec![Rule::new("age", Op::Gt, 18i64)]);
        assert_eq!(group.groups.len(), 1);
        assert_eq!(group.groups[0].logical_operation, LogicalOperation::Or);
        assert!(group.groups[0].groups.is_empty());
    }

    #[test]
    fn parse_groups_accepts_object_or_array() {
        let single = parse_groups(r#"{"rules": []}"#).unwrap();
        assert_eq!(single, vec![Group::new()]);

        let json = r#"[{"rules": []}, {"logic": "or", "children": []}]"#;
        let many = parse_groups(json).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].logical_operation, LogicalOperation::Or);
    }

    #[test]
    fn parse_groups_rejects_empty_and_malformed() {
        assert!(matches!(parse_groups("[]"), Err(DefinitionError::Empty)));
        assert!(matches!(
            parse_groups(r#"{"rules": [{"field": "a"}]}"#),
            Err(DefinitionError::Json(_))
        ));
        let garbage = parse_groups("not json");
        assert!(matches!(garbage, Err(DefinitionError::Json(_))));
    }
}
