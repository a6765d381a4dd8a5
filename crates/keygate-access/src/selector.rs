//! label selectors for server queries.
//!
//! the syntax follows the kubernetes label-selector grammar: requirements
//! separated by commas, all of which must match. supported operators are
//! `=`, `==`, `!=`, `in (a, b)`, `notin (a, b)`, bare-key existence and
//! `!key` non-existence.

use std::collections::BTreeMap;

use crate::error::SelectorParseError;

/// one requirement of a label selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// `key = value` (also `key == value`).
    Equals(String, String),
    /// `key != value`.
    NotEquals(String, String),
    /// `key in (a, b)`.
    In(String, Vec<String>),
    /// `key notin (a, b)`.
    NotIn(String, Vec<String>),
    /// bare `key`: the label must exist.
    Exists(String),
    /// `!key`: the label must not exist.
    NotExists(String),
}

impl Requirement {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Requirement::Equals(key, value) => labels.get(key) == Some(value),
            Requirement::NotEquals(key, value) => labels.get(key) != Some(value),
            Requirement::In(key, values) => {
                labels.get(key).is_some_and(|v| values.contains(v))
            }
            Requirement::NotIn(key, values) => {
                !labels.get(key).is_some_and(|v| values.contains(v))
            }
            Requirement::Exists(key) => labels.contains_key(key),
            Requirement::NotExists(key) => !labels.contains_key(key),
        }
    }
}

/// a parsed label selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// parse a selector string.
    ///
    /// an empty string parses to a selector that matches everything.
    pub fn parse(input: &str) -> Result<Self, SelectorParseError> {
        let mut requirements = Vec::new();
        for part in split_requirements(input) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            requirements.push(parse_requirement(part)?);
        }
        Ok(Self { requirements })
    }

    /// true if every requirement matches the given label set.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }

    /// the parsed requirements.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

// commas inside `in (...)` value sets do not separate requirements, so a
// plain split(',') is not enough.
fn split_requirements(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_requirement(part: &str) -> Result<Requirement, SelectorParseError> {
    if let Some(rest) = part.strip_prefix('!') {
        let key = rest.trim();
        if key.is_empty() {
            return Err(SelectorParseError::EmptyKey(part.to_string()));
        }
        return Ok(Requirement::NotExists(key.to_string()));
    }

    if let Some((key, rest)) = split_keyword_op(part, " notin ") {
        return Ok(Requirement::NotIn(key, parse_value_set(part, rest)?));
    }
    if let Some((key, rest)) = split_keyword_op(part, " in ") {
        return Ok(Requirement::In(key, parse_value_set(part, rest)?));
    }

    if let Some((key, value)) = part.split_once("!=") {
        return make_eq(part, key, value, false);
    }
    if let Some((key, value)) = part.split_once("==") {
        return make_eq(part, key, value, true);
    }
    if let Some((key, value)) = part.split_once('=') {
        return make_eq(part, key, value, true);
    }

    let key = part.trim();
    if key.contains(char::is_whitespace) || key.contains('(') {
        return Err(SelectorParseError::UnknownRequirement(part.to_string()));
    }
    Ok(Requirement::Exists(key.to_string()))
}

fn make_eq(
    part: &str,
    key: &str,
    value: &str,
    eq: bool,
) -> Result<Requirement, SelectorParseError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SelectorParseError::EmptyKey(part.to_string()));
    }
    let value = value.trim().to_string();
    Ok(if eq {
        Requirement::Equals(key.to_string(), value)
    } else {
        Requirement::NotEquals(key.to_string(), value)
    })
}

fn split_keyword_op(part: &str, op: &str) -> Option<(String, String)> {
    let idx = part.find(op)?;
    let key = part[..idx].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), part[idx + op.len()..].trim().to_string()))
}

fn parse_value_set(part: &str, rest: String) -> Result<Vec<String>, SelectorParseError> {
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| SelectorParseError::MissingValueSet(part.to_string()))?;
    Ok(inner
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_equals() {
        let selector = LabelSelector::parse("env=prod").unwrap();
        assert!(selector.matches(&labels(&[("env", "prod")])));
        assert!(!selector.matches(&labels(&[("env", "stage")])));
        assert!(!selector.matches(&labels(&[])));
    }

    #[test]
    fn test_parse_double_equals() {
        let selector = LabelSelector::parse("env == prod").unwrap();
        assert!(selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_parse_not_equals() {
        let selector = LabelSelector::parse("env!=prod").unwrap();
        assert!(!selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "stage")])));
        // absent label satisfies !=
        assert!(selector.matches(&labels(&[])));
    }

    #[test]
    fn test_parse_in() {
        let selector = LabelSelector::parse("env in (prod, stage)").unwrap();
        assert!(selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "stage")])));
        assert!(!selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&labels(&[])));
    }

    #[test]
    fn test_parse_notin() {
        let selector = LabelSelector::parse("env notin (prod)").unwrap();
        assert!(!selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "dev")])));
        assert!(selector.matches(&labels(&[])));
    }

    #[test]
    fn test_parse_exists_and_not_exists() {
        let selector = LabelSelector::parse("gpu").unwrap();
        assert!(selector.matches(&labels(&[("gpu", "a100")])));
        assert!(!selector.matches(&labels(&[])));

        let selector = LabelSelector::parse("!gpu").unwrap();
        assert!(!selector.matches(&labels(&[("gpu", "a100")])));
        assert!(selector.matches(&labels(&[])));
    }

    #[test]
    fn test_conjunction() {
        let selector = LabelSelector::parse("env=prod, tier in (web, api), !canary").unwrap();
        assert!(selector.matches(&labels(&[("env", "prod"), ("tier", "web")])));
        assert!(!selector.matches(&labels(&[
            ("env", "prod"),
            ("tier", "web"),
            ("canary", "true")
        ])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = LabelSelector::parse("").unwrap();
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_missing_value_set_rejected() {
        assert!(LabelSelector::parse("env in prod").is_err());
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(LabelSelector::parse("=prod").is_err());
        assert!(LabelSelector::parse("!").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn key_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_.-]{0,30}"
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9_.-]{0,30}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn equals_requirement_matches_own_label(key in key_strategy(), value in value_strategy()) {
            let selector = LabelSelector::parse(&format!("{}={}", key, value)).unwrap();
            let mut labels = std::collections::BTreeMap::new();
            labels.insert(key, value);
            prop_assert!(selector.matches(&labels));
        }

        #[test]
        fn in_requirement_matches_any_listed_value(
            key in key_strategy(),
            values in prop::collection::vec(value_strategy(), 1..5),
            pick in 0usize..5,
        ) {
            let input = format!("{} in ({})", key, values.join(", "));
            let selector = LabelSelector::parse(&input).unwrap();
            let mut labels = std::collections::BTreeMap::new();
            labels.insert(key, values[pick % values.len()].clone());
            prop_assert!(selector.matches(&labels));
        }

        #[test]
        fn arbitrary_string_never_panics(s in ".*") {
            let _ = LabelSelector::parse(&s);
        }
    }
}
