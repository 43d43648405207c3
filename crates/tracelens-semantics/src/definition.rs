//! JSON semantics documents.
//!
//! ```json
//! {
//!   "operations": [
//!     {
//!       "name": "eval",
//!       "kind": "operation",
//!       "formals": [],
//!       "actions": {
//!         "letter": { "params": ["c"], "body": "c.source" }
//!       }
//!     }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use crate::Result;
use crate::operation::OperationKind;
use crate::registry::Semantics;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SemanticsDefinition {
    #[serde(default)]
    pub operations: Vec<OperationDefinition>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OperationDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: OperationKind,
    #[serde(default)]
    pub formals: Vec<String>,
    /// Rule name to action, in document order.
    #[serde(default)]
    pub actions: IndexMap<String, ActionDefinition>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActionDefinition {
    #[serde(default)]
    pub params: Vec<String>,
    pub body: String,
}

impl Semantics {
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: SemanticsDefinition = serde_json::from_str(json)?;
        Self::from_definition(&definition)
    }

    /// Every operation is declared before any action is compiled, so bodies
    /// may refer to operations declared later in the document.
    pub fn from_definition(definition: &SemanticsDefinition) -> Result<Self> {
        let mut semantics = Semantics::new();
        for op in &definition.operations {
            semantics.declare(&op.name, op.kind, op.formals.clone())?;
        }
        for op in &definition.operations {
            for (rule, action) in &op.actions {
                let params: Vec<&str> = action.params.iter().map(String::as_str).collect();
                semantics.set_action_source(&op.name, rule, &params, &action.body)?;
            }
        }
        Ok(semantics)
    }
}
