//! The quill command-line interface: a thin driver over the engine.

pub mod args;

use std::process;

use clap::Parser;

use crate::cli::args::QuillArgs;
use crate::engine::{Interpreter, StdoutSink};

/// The main entry point for the CLI. Exits non-zero on the first
/// uncaught error.
pub fn run() {
    let args = QuillArgs::parse();
    let interpreter = Interpreter::new();
    let mut sink = StdoutSink;

    for file in &args.files {
        let result = if args.expand {
            interpreter.expand_file(file, &mut sink).map(|forms| {
                for form in forms {
                    println!("{form}");
                }
            })
        } else {
            interpreter.run_file(file, &mut sink).map(|_| ())
        };

        if let Err(error) = result {
            eprintln!("{}", error.render());
            process::exit(1);
        }
    }
}
