//! Declared operations and the argument bindings they are invoked with.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Invoked with arguments; memoized per argument binding.
    #[default]
    Operation,
    /// Takes no arguments; memoized once per node.
    Attribute,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    name: String,
    kind: OperationKind,
    formals: Vec<String>,
}

impl Operation {
    pub(crate) fn new(name: String, kind: OperationKind, formals: Vec<String>) -> Self {
        Self {
            name,
            kind,
            formals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_attribute(&self) -> bool {
        self.kind == OperationKind::Attribute
    }

    pub fn formals(&self) -> &[String] {
        &self.formals
    }

    /// Bind positional argument values to the formal names.
    pub fn bind_args(&self, values: Vec<Value>) -> Result<Args> {
        if values.len() != self.formals.len() {
            return Err(Error::ArityMismatch {
                operation: self.name.clone(),
                expected: self.formals.len(),
                got: values.len(),
            });
        }
        Ok(Args(self.formals.iter().cloned().zip(values).collect()))
    }

    /// Every formal bound to `null`, as used by forced passes.
    pub fn null_args(&self) -> Args {
        Args(
            self.formals
                .iter()
                .map(|name| (name.clone(), Value::Null))
                .collect(),
        )
    }
}

/// Argument binding of one invocation. Compared structurally.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Args(IndexMap<String, Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Signature stored with a cached result: absent when nothing is bound.
    pub(crate) fn signature(&self) -> Option<Args> {
        (!self.is_empty()).then(|| self.clone())
    }

    pub(crate) fn matches_signature(&self, signature: Option<&Args>) -> bool {
        match signature {
            Some(sig) => sig == self,
            None => self.is_empty(),
        }
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}
