/*!
The contract between the facade and the solving engine it wraps.

An engine accumulates literals one at a time (a zero closes the clause), reports
its outcome with integer result codes, answers per-variable value queries, and
optionally writes a DRAT trace of its reasoning to a file.
*/

use std::path::{Path, PathBuf};

use crate::formula::{Lit, Variable};
use crate::prelude::*;

mod backend;

pub use backend::VarisatEngine;

/// Result code of an interrupted or failed search.
pub const RESULT_UNKNOWN: i32 = 0;
/// Result code of a satisfiable formula.
pub const RESULT_SATISFIABLE: i32 = 10;
/// Result code of an unsatisfiable formula.
pub const RESULT_UNSATISFIABLE: i32 = 20;

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub enum Error {
    #[snafu(display("Failed to open proof trace '{}'", path.display()))]
    OpenProof {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub trait Engine {
    /// Adds a literal to the clause being built, or closes it when `literal` is 0.
    fn add(&mut self, literal: Lit);

    /// Runs the search and returns its result code.
    fn solve(&mut self) -> i32;

    /// Returns the value of a variable after a satisfiable search:
    /// its ID if true, the negated ID if false, 0 if the engine has no value.
    fn val(&self, variable: Variable) -> Lit;

    /// Selects the binary or textual proof encoding.
    /// Only affects traces enabled afterwards.
    fn set_binary_proof(&mut self, binary: bool);

    /// Starts writing the proof trace to `path`.
    /// Must be called before any literal is added.
    fn trace_proof(&mut self, path: &Path) -> Result<(), Error>;

    fn flush_proof_trace(&mut self) {}

    /// Finishes the proof trace. The file is complete once this returns.
    fn close_proof_trace(&mut self);
}
