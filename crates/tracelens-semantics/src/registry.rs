//! Declared operations and their per-rule action overrides.

use std::fmt;

use indexmap::IndexMap;

use crate::action::{Action, ActionContext, ActionResult, NativeAction, NodeShape};
use crate::dsl;
use crate::operation::{Operation, OperationKind};
use crate::{Error, Result};

/// A user-supplied action registered for one rule.
pub struct UserAction {
    params: Vec<String>,
    source: Option<String>,
    action: Box<dyn Action>,
}

impl UserAction {
    /// Names bound to the node's children. Empty for native actions.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Body text, for actions compiled from source.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub(crate) fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }
}

impl fmt::Debug for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAction")
            .field("params", &self.params)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Rule name to user action, for one operation. The three shape defaults are
/// built in; an override named `_terminal`, `_iter` or `_nonterminal`
/// replaces the default for that whole shape.
#[derive(Debug, Default)]
pub struct ActionDict {
    overrides: IndexMap<String, UserAction>,
}

/// Action chosen for a node.
#[derive(Debug)]
pub enum Dispatch<'s> {
    Default(NodeShape),
    User(&'s UserAction),
}

impl ActionDict {
    pub fn get(&self, rule: &str) -> Option<&UserAction> {
        self.overrides.get(rule)
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(String::as_str)
    }

    /// The shape default is determined first; an override by constructor
    /// name, then by shape key, replaces it.
    pub fn dispatch(&self, ctor_name: &str, shape: NodeShape) -> Dispatch<'_> {
        self.overrides
            .get(ctor_name)
            .or_else(|| self.overrides.get(shape.default_key()))
            .map_or(Dispatch::Default(shape), Dispatch::User)
    }
}

#[derive(Debug)]
struct Entry {
    operation: Operation,
    actions: ActionDict,
}

#[derive(Debug, Default)]
pub struct Semantics {
    entries: IndexMap<String, Entry>,
}

impl Semantics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operation(&mut self, name: &str, formals: &[&str]) -> Result<()> {
        let formals = formals.iter().map(|f| f.to_string()).collect();
        self.declare(name, OperationKind::Operation, formals)
    }

    pub fn add_attribute(&mut self, name: &str) -> Result<()> {
        self.declare(name, OperationKind::Attribute, Vec::new())
    }

    pub(crate) fn declare(
        &mut self,
        name: &str,
        kind: OperationKind,
        formals: Vec<String>,
    ) -> Result<()> {
        if let Some(bad) = std::iter::once(name)
            .chain(formals.iter().map(String::as_str))
            .find(|n| !dsl::is_identifier(n))
        {
            return Err(Error::InvalidName(bad.to_owned()));
        }
        if kind == OperationKind::Attribute && !formals.is_empty() {
            return Err(Error::ArityMismatch {
                operation: name.to_owned(),
                expected: 0,
                got: formals.len(),
            });
        }
        if self.entries.contains_key(name) {
            return Err(Error::DuplicateOperation(name.to_owned()));
        }
        let operation = Operation::new(name.to_owned(), kind, formals);
        self.entries.insert(
            name.to_owned(),
            Entry {
                operation,
                actions: ActionDict::default(),
            },
        );
        Ok(())
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.entries.get(name).map(|e| &e.operation)
    }

    /// Operations and attributes in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.entries.values().map(|e| &e.operation)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(OperationKind::Operation)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(OperationKind::Attribute)
    }

    fn names_of(&self, kind: OperationKind) -> impl Iterator<Item = &str> {
        self.operations()
            .filter(move |op| op.kind() == kind)
            .map(Operation::name)
    }

    pub fn actions(&self, operation: &str) -> Option<&ActionDict> {
        self.entries.get(operation).map(|e| &e.actions)
    }

    fn entry_mut(&mut self, operation: &str) -> Result<&mut Entry> {
        self.entries
            .get_mut(operation)
            .ok_or_else(|| Error::UnknownOperation(operation.to_owned()))
    }

    /// Register a Rust closure as the action for `rule`.
    pub fn set_action<F>(&mut self, operation: &str, rule: &str, action: F) -> Result<()>
    where
        F: Fn(&mut ActionContext<'_>) -> ActionResult + 'static,
    {
        let entry = self.entry_mut(operation)?;
        entry.actions.overrides.insert(
            rule.to_owned(),
            UserAction {
                params: Vec::new(),
                source: None,
                action: Box::new(NativeAction(action)),
            },
        );
        Ok(())
    }

    /// Compile `body` as the action for `rule`. `params` name the node's
    /// children. A blank body removes the override.
    pub fn set_action_source(
        &mut self,
        operation: &str,
        rule: &str,
        params: &[&str],
        body: &str,
    ) -> Result<()> {
        let entry = self.entry_mut(operation)?;
        if body.trim().is_empty() {
            entry.actions.overrides.shift_remove(rule);
            return Ok(());
        }

        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let compiled = dsl::compile(&params, entry.operation.formals(), body).map_err(|error| {
            Error::Compile {
                operation: operation.to_owned(),
                rule: rule.to_owned(),
                error,
            }
        })?;
        entry.actions.overrides.insert(
            rule.to_owned(),
            UserAction {
                params,
                source: Some(body.to_owned()),
                action: Box::new(compiled),
            },
        );
        Ok(())
    }

    pub fn remove_action(&mut self, operation: &str, rule: &str) -> Option<UserAction> {
        self.entries
            .get_mut(operation)?
            .actions
            .overrides
            .shift_remove(rule)
    }

    /// The user action registered under exactly `rule`, never a default.
    pub fn user_action(&self, operation: &str, rule: &str) -> Option<&UserAction> {
        self.actions(operation)?.get(rule)
    }

    /// Action for a node of the given constructor and shape.
    pub(crate) fn resolve(&self, operation: &str, ctor_name: &str, shape: NodeShape) -> Dispatch<'_> {
        self.actions(operation)
            .map_or(Dispatch::Default(shape), |actions| actions.dispatch(ctor_name, shape))
    }

    pub fn action_params(&self, operation: &str, rule: &str) -> Option<&[String]> {
        self.user_action(operation, rule).map(UserAction::params)
    }
}
