// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Index;

/// One unit of data flowing between pipeline stages: an ordered list of JSON values.
///
/// Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuple(Vec<Value>);

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Elements of a JSON array; any other value becomes a one-element tuple.
    pub fn from_array(value: Value) -> Self {
        match value {
            Value::Array(values) => Self(values),
            other => Self(vec![other]),
        }
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<usize> for Tuple {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

/// Builds a [`Tuple`] with the element syntax of a `serde_json::json!` array.
///
/// ```
/// use the_spigot::tuple;
///
/// let t = tuple![1, "a", null, {"k": [true]}];
/// assert_eq!(t.len(), 4);
/// assert_eq!(t[1], "a");
/// assert!(t[2].is_null());
/// ```
#[macro_export]
macro_rules! tuple {
    ($($tt:tt)*) => {
        $crate::proto::Tuple::from_array($crate::__serde_json::json!([$($tt)*]))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_plain_array() {
        let t = crate::tuple![1, "a", null];
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"[1,"a",null]"#);
    }

    #[test]
    fn accepts_json_literals_and_expressions() {
        let word = "Hello";
        let t = crate::tuple![word.to_lowercase(), {"n": [1, 2]}, [null, false], 1 + 1];
        assert_eq!(t[0], "hello");
        assert_eq!(t[1], json!({"n": [1, 2]}));
        assert_eq!(t[2], json!([null, false]));
        assert_eq!(t[3], 2);
        assert!(crate::tuple![].is_empty());
    }

    #[test]
    fn from_array_wraps_scalars() {
        assert_eq!(Tuple::from_array(json!([1, 2])).len(), 2);
        assert_eq!(Tuple::from_array(json!("x")), crate::tuple!["x"]);
    }

    #[test]
    fn structural_equality() {
        let a: Tuple = vec![json!(1), json!({"k": "v"})].into();
        let b = Tuple::new(vec![json!(1), json!({"k": "v"})]);
        assert_eq!(a, b);
        assert_ne!(a, crate::tuple![1]);
    }
}
