//! Command-line arguments for the quill binary.
//!
//! Uses `clap` with its derive feature; unrecognised flags are a usage
//! error out of the box.

use clap::Parser;
use std::path::PathBuf;

/// A small homoiconic Lisp dialect.
///
/// Each file is read, macro-expanded, and evaluated in the shared root
/// environment, in command-line order.
#[derive(Debug, Parser)]
#[command(name = "quill", version, about)]
pub struct QuillArgs {
    /// Source files to evaluate, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the fully macro-expanded forms instead of evaluating them.
    #[arg(long)]
    pub expand: bool,
}
