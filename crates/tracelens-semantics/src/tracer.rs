//! Instrumentation for semantic evaluation.
//!
//! [`NoopTracer`] compiles away entirely; [`PrintTracer`] collects one line
//! per event, indented by application depth.

use tracelens_core::{Colors, TraceId};

use crate::action::NodeShape;
use crate::cache::ResultWrapper;
use crate::operation::Args;
use crate::outcome::{NodeOpKey, Outcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Results only.
    #[default]
    Default,
    /// Adds applications, dispatch decisions and cache hits.
    Verbose,
    /// Adds argument bindings to every application line.
    VeryVerbose,
}

/// Action an application was dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchKind {
    Default(NodeShape),
    User,
}

pub trait EvalTracer {
    /// The cache was cleared.
    fn trace_reset(&mut self);

    /// A result pass starts at a trace node.
    fn trace_pass(&mut self, node: TraceId, forcing: bool);

    /// An application misses the cache and is about to run.
    fn trace_apply(&mut self, key: &NodeOpKey, args: &Args, depth: u32);

    /// A repeated application is answered from the cache.
    fn trace_cache_hit(&mut self, key: &NodeOpKey, result: &ResultWrapper, depth: u32);

    fn trace_dispatch(&mut self, key: &NodeOpKey, dispatch: DispatchKind, depth: u32);

    /// An application finished and its result was cached.
    fn trace_result(&mut self, key: &NodeOpKey, result: &ResultWrapper, depth: u32);
}

pub struct NoopTracer;

impl EvalTracer for NoopTracer {
    #[inline(always)]
    fn trace_reset(&mut self) {}

    #[inline(always)]
    fn trace_pass(&mut self, _node: TraceId, _forcing: bool) {}

    #[inline(always)]
    fn trace_apply(&mut self, _key: &NodeOpKey, _args: &Args, _depth: u32) {}

    #[inline(always)]
    fn trace_cache_hit(&mut self, _key: &NodeOpKey, _result: &ResultWrapper, _depth: u32) {}

    #[inline(always)]
    fn trace_dispatch(&mut self, _key: &NodeOpKey, _dispatch: DispatchKind, _depth: u32) {}

    #[inline(always)]
    fn trace_result(&mut self, _key: &NodeOpKey, _result: &ResultWrapper, _depth: u32) {}
}

/// Tracer that collects human-readable lines.
#[derive(Debug, Default)]
pub struct PrintTracer {
    verbosity: Verbosity,
    colors: Colors,
    lines: Vec<String>,
}

impl PrintTracer {
    pub fn new(verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            verbosity,
            colors,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    fn verbose(&self) -> bool {
        self.verbosity != Verbosity::Default
    }

    fn push(&mut self, depth: u32, text: String) {
        let indent = "  ".repeat(depth as usize);
        self.lines.push(format!("{indent}{text}"));
    }

    fn format_outcome(&self, outcome: &Outcome) -> String {
        let c = &self.colors;
        match outcome {
            Outcome::Value(v) => c.paint(c.green, v),
            Outcome::Missing => c.paint(c.yellow, "missing"),
            Outcome::Error(e) => c.paint(c.red, format!("error: {e}")),
        }
    }

    fn format_flags(&self, result: &ResultWrapper) -> String {
        let mut flags = Vec::new();
        if result.is_forced() {
            flags.push("forced");
        }
        if result.is_pass_through() {
            flags.push("pass-through");
        }
        if result.is_next_step() {
            flags.push("next-step");
        }
        if flags.is_empty() {
            return String::new();
        }
        let c = &self.colors;
        format!(" {}", c.paint(c.dim, format!("[{}]", flags.join(", "))))
    }
}

impl EvalTracer for PrintTracer {
    fn trace_reset(&mut self) {
        if self.verbose() {
            let c = self.colors;
            self.lines.push(c.paint(c.dim, "-- reset --"));
        }
    }

    fn trace_pass(&mut self, node: TraceId, forcing: bool) {
        let c = self.colors;
        let mode = if forcing { "forced" } else { "on demand" };
        self.lines
            .push(format!("{} {node} ({mode})", c.paint(c.dim, "pass")));
    }

    fn trace_apply(&mut self, key: &NodeOpKey, args: &Args, depth: u32) {
        if !self.verbose() {
            return;
        }
        let c = self.colors;
        let mut line = format!("> {}", c.paint(c.blue, key));
        if self.verbosity == Verbosity::VeryVerbose && !args.is_empty() {
            line.push_str(&format!(" {}", c.paint(c.dim, args)));
        }
        self.push(depth, line);
    }

    fn trace_cache_hit(&mut self, key: &NodeOpKey, result: &ResultWrapper, depth: u32) {
        if !self.verbose() {
            return;
        }
        let c = self.colors;
        let line = format!(
            "= {} {}",
            c.paint(c.blue, key),
            self.format_outcome(result.outcome())
        );
        self.push(depth, line);
    }

    fn trace_dispatch(&mut self, _key: &NodeOpKey, dispatch: DispatchKind, depth: u32) {
        if !self.verbose() {
            return;
        }
        let c = self.colors;
        let target = match dispatch {
            DispatchKind::Default(shape) => format!("default {}", shape.default_key()),
            DispatchKind::User => "user action".to_owned(),
        };
        self.push(depth, c.paint(c.dim, format!("via {target}")));
    }

    fn trace_result(&mut self, key: &NodeOpKey, result: &ResultWrapper, depth: u32) {
        let c = self.colors;
        let line = format!(
            "< {} {}{}",
            c.paint(c.blue, key),
            self.format_outcome(result.outcome()),
            self.format_flags(result)
        );
        self.push(depth, line);
    }
}
