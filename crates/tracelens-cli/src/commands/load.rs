//! Loading trace and semantics documents from disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracelens_core::Trace;
use tracelens_semantics::{Semantics, SemanticsDefinition};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}': {source}", path.display())]
    Trace {
        path: PathBuf,
        #[source]
        source: tracelens_core::Error,
    },

    #[error("'{}': {source}", path.display())]
    Semantics {
        path: PathBuf,
        #[source]
        source: tracelens_semantics::Error,
        /// Compile errors rendered against the offending action body.
        report: Option<String>,
    },
}

impl LoadError {
    /// Full message for the terminal, including any source snippet.
    pub fn render(&self) -> String {
        match self {
            LoadError::Semantics {
                report: Some(report),
                path,
                ..
            } => format!("in '{}':\n{report}", path.display()),
            other => format!("error: {other}"),
        }
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })
}

pub fn load_trace(path: &Path) -> Result<Trace, LoadError> {
    let text = read(path)?;
    Trace::from_json(&text).map_err(|source| LoadError::Trace {
        path: path.to_owned(),
        source,
    })
}

pub fn load_semantics(path: &Path, colored: bool) -> Result<Semantics, LoadError> {
    let text = read(path)?;
    let fail = |source: tracelens_semantics::Error, report| LoadError::Semantics {
        path: path.to_owned(),
        source,
        report,
    };

    let definition: SemanticsDefinition =
        serde_json::from_str(&text).map_err(|e| fail(e.into(), None))?;
    Semantics::from_definition(&definition).map_err(|source| {
        let report = compile_report(&definition, &source, colored);
        fail(source, report)
    })
}

/// Annotated snippet for a compile error, pointing into the action body.
fn compile_report(
    definition: &SemanticsDefinition,
    error: &tracelens_semantics::Error,
    colored: bool,
) -> Option<String> {
    let tracelens_semantics::Error::Compile {
        operation,
        rule,
        error,
    } = error
    else {
        return None;
    };
    let body = &definition
        .operations
        .iter()
        .find(|op| &op.name == operation)?
        .actions
        .get(rule)?
        .body;
    let path = format!("{operation}/{rule}");
    Some(
        error
            .printer()
            .source(body)
            .path(&path)
            .colored(colored)
            .render(),
    )
}
