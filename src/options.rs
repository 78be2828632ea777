//! Analyzer option tree.
//!
//! Applies directives, in order, to a JSON object of analyzer options. This is
//! how the analyzer itself reads `--set`/`--sets` flags, mirrored so fixtures
//! can be inspected without launching it.

use std::path::Path;

use log::trace;
use serde_json::{Map, Value};

use crate::directive::{Directive, ListOp, Verb};
use crate::errors::RegrunError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionTree {
    root: Map<String, Value>,
}

impl OptionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, RegrunError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(RegrunError::conflict(
                "<root>",
                format!("option tree must be a JSON object, found {}", type_name(&other)),
            )),
        }
    }

    /// Loads a base tree from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RegrunError> {
        let text = std::fs::read_to_string(path).map_err(|e| RegrunError::io(path, e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| RegrunError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn apply_all<'a>(
        &mut self,
        directives: impl IntoIterator<Item = &'a Directive>,
    ) -> Result<(), RegrunError> {
        for directive in directives {
            self.apply(directive)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, directive: &Directive) -> Result<(), RegrunError> {
        trace!("applying {}", directive);
        let value = directive_value(directive);

        // Removal never creates intermediate objects or leaves.
        if directive.list_op == Some(ListOp::Remove) {
            return match self.existing_mut(&directive.path) {
                None | Some(Value::Null) => Ok(()),
                Some(Value::Array(items)) => {
                    items.retain(|item| *item != value);
                    Ok(())
                }
                Some(other) => Err(RegrunError::conflict(
                    &directive.path,
                    format!("cannot remove from {}", type_name(other)),
                )),
            };
        }

        let slot = self.slot(&directive.path)?;
        match directive.list_op {
            Some(ListOp::Append) => match slot {
                Value::Null => *slot = Value::Array(vec![value]),
                Value::Array(items) => items.push(value),
                other => {
                    return Err(RegrunError::conflict(
                        &directive.path,
                        format!("cannot append to {}", type_name(other)),
                    ))
                }
            },
            _ => *slot = value,
        }
        Ok(())
    }

    /// The value at `path`, if every segment exists. Non-object parents count
    /// as absent.
    fn existing_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        Some(current)
    }

    /// Walks to the value at `path`, creating missing objects on the way.
    /// A freshly created leaf is `Null`.
    fn slot(&mut self, path: &str) -> Result<&mut Value, RegrunError> {
        let segments: Vec<&str> = path.split('.').collect();
        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| RegrunError::conflict(path, "empty option path"))?;

        let mut current = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match entry {
                Value::Object(map) => map,
                other => {
                    return Err(RegrunError::conflict(
                        segments[..=depth].join("."),
                        format!("expected an object, found {}", type_name(other)),
                    ))
                }
            };
        }
        Ok(current.entry(leaf.to_string()).or_insert(Value::Null))
    }
}

/// The JSON value a directive assigns.
pub fn directive_value(directive: &Directive) -> Value {
    match directive.verb {
        Verb::Enable => Value::Bool(true),
        Verb::Disable => Value::Bool(false),
        Verb::Sets => Value::String(directive.value.clone().unwrap_or_default()),
        Verb::Set => interpret(directive.value.as_deref().unwrap_or_default()),
    }
}

/// Reads a `--set` value: JSON if it parses, JSON with single quotes if that
/// parses, otherwise a plain string.
pub fn interpret(raw: &str) -> Value {
    if let Ok(value) = serde_json::from_str(raw) {
        return value;
    }
    if raw.contains('\'') {
        if let Ok(value) = serde_json::from_str(&raw.replace('\'', "\"")) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpret_prefers_json() {
        assert_eq!(interpret("1"), json!(1));
        assert_eq!(interpret("true"), json!(true));
        assert_eq!(interpret("['a','b']"), json!(["a", "b"]));
        assert_eq!(interpret("apron"), json!("apron"));
        assert_eq!(interpret("'none'"), json!("none"));
    }

    #[test]
    fn sets_never_interprets() {
        let mut tree = OptionTree::new();
        tree.apply(&Directive::sets("exp.depth", "10")).unwrap();
        assert_eq!(tree.get("exp.depth"), Some(&json!("10")));
    }

    #[test]
    fn remove_from_missing_list_is_noop() {
        let mut tree = OptionTree::new();
        tree.apply(&Directive::remove("ana.activated", "threadJoins"))
            .unwrap();
        assert_eq!(tree.as_value(), json!({}));

        tree.apply(&Directive::set("ana", "1")).unwrap();
        tree.apply(&Directive::remove("ana.activated", "threadJoins"))
            .unwrap();
        assert_eq!(tree.as_value(), json!({"ana": 1}));
    }

    #[test]
    fn remove_filters_existing_list() {
        let mut tree = OptionTree::from_value(json!({
            "ana": {"activated": ["base", "threadJoins", "base"]}
        }))
        .unwrap();
        tree.apply(&Directive::remove("ana.activated", "base")).unwrap();
        assert_eq!(tree.get("ana.activated"), Some(&json!(["threadJoins"])));

        tree.apply(&Directive::sets("ana.activated", "all")).unwrap();
        let err = tree
            .apply(&Directive::remove("ana.activated", "all"))
            .unwrap_err();
        assert!(matches!(err, RegrunError::OptionConflict { .. }));
    }

    #[test]
    fn append_to_scalar_conflicts() {
        let mut tree = OptionTree::new();
        tree.apply(&Directive::set("ana.activated", "apron")).unwrap();
        let err = tree
            .apply(&Directive::append("ana.activated", "base"))
            .unwrap_err();
        assert!(matches!(err, RegrunError::OptionConflict { .. }));
    }

    #[test]
    fn descending_through_scalar_conflicts() {
        let mut tree = OptionTree::new();
        tree.apply(&Directive::set("ana", "1")).unwrap();
        let err = tree.apply(&Directive::set("ana.activated", "x")).unwrap_err();
        let RegrunError::OptionConflict { path, .. } = err else {
            panic!("expected OptionConflict");
        };
        assert_eq!(path, "ana");
    }
}
