//! Outcomes of applying an operation to a node.

use std::fmt;

use tracelens_core::NodeKey;

use crate::value::Value;

/// One application of an operation to a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeOpKey {
    pub node: NodeKey,
    pub operation: String,
}

impl NodeOpKey {
    pub fn new(node: NodeKey, operation: impl Into<String>) -> Self {
        Self {
            node,
            operation: operation.into(),
        }
    }
}

impl fmt::Display for NodeOpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_at_{}", self.node, self.operation)
    }
}

/// A runtime error, attributed to the application that raised it.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorWrapper {
    causing_key: NodeOpKey,
    message: String,
}

impl ErrorWrapper {
    pub fn new(causing_key: NodeOpKey, message: impl Into<String>) -> Self {
        Self {
            causing_key,
            message: message.into(),
        }
    }

    pub fn causing_key(&self) -> &NodeOpKey {
        &self.causing_key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn caused_by(&self, key: &NodeOpKey) -> bool {
        &self.causing_key == key
    }
}

impl fmt::Display for ErrorWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (raised by {})", self.message, self.causing_key)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Value(Value),
    /// No action decided a value for this application.
    Missing,
    Error(ErrorWrapper),
}

impl Outcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Outcome::Missing)
    }

    /// Missing and erroring outcomes both count as errors for display.
    pub fn is_error(&self) -> bool {
        !matches!(self, Outcome::Value(_))
    }

    pub fn error(&self) -> Option<&ErrorWrapper> {
        match self {
            Outcome::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{v}"),
            Outcome::Missing => f.write_str("missing"),
            Outcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Unresolved applications and unattributed errors collected during one
/// dynamic extent of evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Scratch {
    pub todo: Vec<NodeOpKey>,
    pub errors: Vec<ErrorWrapper>,
}

impl Scratch {
    /// Append everything a nested extent collected.
    pub fn absorb(&mut self, nested: &Scratch) {
        self.todo.extend(nested.todo.iter().cloned());
        self.errors.extend(nested.errors.iter().cloned());
    }

    /// Outcome of an extent that produced `value`: missing if anything inside
    /// was unresolved, else the first error, else the value.
    pub fn resolve(&self, value: Value) -> Outcome {
        if !self.todo.is_empty() {
            Outcome::Missing
        } else if let Some(error) = self.errors.first() {
            Outcome::Error(error.clone())
        } else {
            Outcome::Value(value)
        }
    }
}
