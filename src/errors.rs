//! Unified error handling for the quill runtime.
//!
//! Every failure surfaced to a user is a [`QuillError`]: an [`ErrorKind`]
//! plus an optional source span, with the source text attached lazily via
//! [`QuillError::with_source`] so the reader and evaluator never need to
//! thread the full buffer through every call. Rendering goes through
//! [`miette::GraphicalReportHandler`]; errors are not `Send` because the
//! `User` kind carries the thrown runtime value verbatim.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::Span;
use crate::value::Value;

pub type Result<T, E = QuillError> = std::result::Result<T, E>;

/// What went wrong, with the data needed to describe it.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("unbound symbol '{symbol}'")]
    Unbound { symbol: String },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("wrong arity: expected {expected} arguments, got {actual}")]
    Arity { expected: String, actual: usize },

    #[error("ffi error: {message}")]
    Ffi { message: String },

    #[error("uncaught throw: {value}")]
    User { value: Value },

    #[error("i/o error: {message}")]
    Io { message: String },

    #[error("recursion limit exceeded")]
    Recursion,
}

/// Coarse error families, used by tests and the CLI exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Unbound,
    TypeMismatch,
    Arity,
    Ffi,
    User,
    Io,
    Recursion,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse { .. } => ErrorCategory::Parse,
            Self::Unbound { .. } => ErrorCategory::Unbound,
            Self::TypeMismatch { .. } => ErrorCategory::TypeMismatch,
            Self::Arity { .. } => ErrorCategory::Arity,
            Self::Ffi { .. } => ErrorCategory::Ffi,
            Self::User { .. } => ErrorCategory::User,
            Self::Io { .. } => ErrorCategory::Io,
            Self::Recursion => ErrorCategory::Recursion,
        }
    }

    /// Stable diagnostic code for this kind.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "quill::parse",
            Self::Unbound { .. } => "quill::eval::unbound",
            Self::TypeMismatch { .. } => "quill::eval::type_mismatch",
            Self::Arity { .. } => "quill::eval::arity",
            Self::Ffi { .. } => "quill::ffi",
            Self::User { .. } => "quill::eval::throw",
            Self::Io { .. } => "quill::io",
            Self::Recursion => "quill::eval::recursion",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "invalid syntax here",
            Self::Unbound { .. } => "not bound at this point",
            Self::TypeMismatch { .. } => "wrong kind of value",
            Self::Arity { .. } => "called here",
            Self::Ffi { .. } => "foreign call failed here",
            Self::User { .. } => "thrown from here",
            Self::Io { .. } => "i/o failed here",
            Self::Recursion => "recursion limit hit here",
        }
    }
}

/// The single error type carried through the runtime.
#[derive(Debug, Clone)]
pub struct QuillError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    source: Option<Arc<NamedSource<String>>>,
    help: Option<String>,
}

impl QuillError {
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            source: None,
            help: None,
        }
    }

    /// Attaches the originating source buffer so rendering can show an
    /// annotated excerpt. Called at the driver layer, once per buffer.
    pub fn with_source(mut self, name: impl Into<String> + AsRef<str>, text: impl Into<String>) -> Self {
        if self.source.is_none() {
            self.source = Some(Arc::new(NamedSource::new(name, text.into())));
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Renders the full graphical diagnostic into a string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let handler = miette::GraphicalReportHandler::new();
        if handler.render_report(&mut out, self).is_err() {
            out = format!("{self}");
        }
        out
    }
}

impl fmt::Display for QuillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for QuillError {}

impl Diagnostic for QuillError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        self.source.as_ref()?;
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.label().to_string()),
            SourceSpan::from(span.start..span.end),
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &dyn miette::SourceCode)
    }
}

// Constructors, kept free-standing so call sites stay terse.

pub fn parse(message: impl Into<String>, span: Option<Span>) -> QuillError {
    QuillError::new(
        ErrorKind::Parse {
            message: message.into(),
        },
        span,
    )
}

pub fn unbound(symbol: impl Into<String>, span: Option<Span>) -> QuillError {
    QuillError::new(
        ErrorKind::Unbound {
            symbol: symbol.into(),
        },
        span,
    )
}

pub fn type_mismatch(
    expected: impl Into<String>,
    actual: impl Into<String>,
    span: Option<Span>,
) -> QuillError {
    QuillError::new(
        ErrorKind::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        },
        span,
    )
}

pub fn arity(expected: impl Into<String>, actual: usize, span: Option<Span>) -> QuillError {
    QuillError::new(
        ErrorKind::Arity {
            expected: expected.into(),
            actual,
        },
        span,
    )
}

pub fn ffi(message: impl Into<String>, span: Option<Span>) -> QuillError {
    QuillError::new(
        ErrorKind::Ffi {
            message: message.into(),
        },
        span,
    )
}

pub fn user(value: Value) -> QuillError {
    let span = value.span();
    QuillError::new(ErrorKind::User { value }, span)
}

pub fn io(message: impl Into<String>) -> QuillError {
    QuillError::new(
        ErrorKind::Io {
            message: message.into(),
        },
        None,
    )
}

pub fn recursion(span: Option<Span>) -> QuillError {
    QuillError::new(ErrorKind::Recursion, span)
}
