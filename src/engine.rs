//! The interpreter façade: one root environment, the embedded prelude,
//! and the read → expand → evaluate pipeline with source attachment for
//! diagnostics.

use std::fs;
use std::path::Path;

use crate::env::Env;
use crate::errors::{self, Result};
use crate::eval::{self, EvalContext, DEFAULT_MAX_DEPTH};
use crate::expand;
use crate::primitives::{NullSink, OutputSink};
use crate::syntax;
use crate::value::Value;

const PRELUDE: &str = include_str!("prelude.quill");

/// Collects output into a string, newline-separated per `print` call.
#[derive(Default)]
pub struct BufferSink {
    pub buffer: String,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl OutputSink for BufferSink {
    fn emit(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// Writes output to stdout; the CLI default.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

/// One interpreter instance: a root environment seeded with primitives
/// and the prelude. Instances are independent; nothing is shared between
/// them.
pub struct Interpreter {
    root: Env,
    max_depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        let interpreter = Self {
            root: Env::new_root(),
            max_depth: DEFAULT_MAX_DEPTH,
        };
        let mut sink = NullSink;
        interpreter
            .eval_source("<prelude>", PRELUDE, &mut sink)
            .expect("embedded prelude must evaluate");
        interpreter
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &Env {
        &self.root
    }

    /// Reads and evaluates a whole buffer, returning the last form's
    /// value. Errors come back with the source attached.
    pub fn eval_source(
        &self,
        name: &str,
        source: &str,
        output: &mut dyn OutputSink,
    ) -> Result<Value> {
        let forms = syntax::read(source).map_err(|e| e.with_source(name, source))?;

        let mut ctx = EvalContext {
            output,
            max_depth: self.max_depth,
        };
        let mut last = Value::nil();
        for form in &forms {
            last = eval::eval(form, &self.root, &mut ctx)
                .map_err(|e| e.with_source(name, source))?;
        }
        Ok(last)
    }

    /// Reads a buffer and returns its forms fully macro-expanded, without
    /// evaluating them. Macro bodies still run, so output they produce
    /// goes to `output`.
    pub fn expand_source(
        &self,
        name: &str,
        source: &str,
        output: &mut dyn OutputSink,
    ) -> Result<Vec<Value>> {
        let forms = syntax::read(source).map_err(|e| e.with_source(name, source))?;

        let mut ctx = EvalContext {
            output,
            max_depth: self.max_depth,
        };
        forms
            .iter()
            .map(|form| {
                expand::expand(form, &self.root, &mut ctx)
                    .map_err(|e| e.with_source(name, source))
            })
            .collect()
    }

    pub fn run_file(&self, path: &Path, output: &mut dyn OutputSink) -> Result<Value> {
        let source = read_file(path)?;
        self.eval_source(&path.display().to_string(), &source, output)
    }

    pub fn expand_file(&self, path: &Path, output: &mut dyn OutputSink) -> Result<Vec<Value>> {
        let source = read_file(path)?;
        self.expand_source(&path.display().to_string(), &source, output)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| errors::io(format!("cannot read '{}': {e}", path.display())))
}
