use std::io::Write;

use indoc::indoc;
use tempfile::NamedTempFile;

/// `start = letter+` over `"ab"`, with the failed third `letter` attempt.
///
/// Trace ids: `#0` start, `#1` letter+, `#2` and `#3` the letters, `#4` the
/// failure.
pub const LETTERS_TRACE: &str = indoc! {r#"
    {
      "input": "ab",
      "primitive_rules": ["letter"],
      "root": {
        "expr": "apply", "name": "start", "start": 0, "end": 2,
        "bindings": [
          { "kind": "nonterminal", "rule": "start", "start": 0, "end": 2, "children": [
            { "kind": "iter", "start": 0, "end": 2, "children": [
              { "kind": "nonterminal", "rule": "letter", "start": 0, "end": 1, "children": [
                { "kind": "terminal", "start": 0, "end": 1 }
              ] },
              { "kind": "nonterminal", "rule": "letter", "start": 1, "end": 2, "children": [
                { "kind": "terminal", "start": 1, "end": 2 }
              ] }
            ] }
          ] }
        ],
        "children": [
          {
            "expr": "iter", "name": "letter+", "start": 0, "end": 2,
            "bindings": [
              { "kind": "iter", "start": 0, "end": 2, "children": [
                { "kind": "nonterminal", "rule": "letter", "start": 0, "end": 1, "children": [
                  { "kind": "terminal", "start": 0, "end": 1 }
                ] },
                { "kind": "nonterminal", "rule": "letter", "start": 1, "end": 2, "children": [
                  { "kind": "terminal", "start": 1, "end": 2 }
                ] }
              ] }
            ],
            "children": [
              { "expr": "apply", "name": "letter", "start": 0, "end": 1, "bindings": [
                { "kind": "nonterminal", "rule": "letter", "start": 0, "end": 1, "children": [
                  { "kind": "terminal", "start": 0, "end": 1 }
                ] }
              ] },
              { "expr": "apply", "name": "letter", "start": 1, "end": 2, "bindings": [
                { "kind": "nonterminal", "rule": "letter", "start": 1, "end": 2, "children": [
                  { "kind": "terminal", "start": 1, "end": 2 }
                ] }
              ] },
              { "expr": "apply", "name": "letter", "start": 2, "end": 2, "succeeded": false }
            ]
          }
        ]
      }
    }
"#};

pub const LETTERS_SEMANTICS: &str = indoc! {r#"
    {
      "operations": [
        { "name": "eval", "actions": {
          "letter": { "params": ["c"], "body": "c.source" }
        } },
        { "name": "joined", "formals": ["sep"], "actions": {
          "start": { "params": ["xs"], "body": "xs.eval().join(sep)" }
        } },
        { "name": "size", "kind": "attribute", "actions": {
          "_nonterminal": { "body": "self.count" }
        } }
      ]
    }
"#};

pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}
