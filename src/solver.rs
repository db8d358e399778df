/*!
The solver facade: loads clause lists into an engine, times the search, and
extracts models and DRAT proofs in plain clause-list form.
*/

use std::{
    fmt::Display,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::engine::{
    self, Engine, VarisatEngine, RESULT_SATISFIABLE, RESULT_UNKNOWN, RESULT_UNSATISFIABLE,
};
use crate::formula::{Clause, ClauseList, Lit, Variable};
use crate::prelude::*;
use crate::proof::{self, ProofParser, ProofStep};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to enable proof tracing"))]
    TraceProof { source: engine::Error },
}

/// Outcome of the most recent search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Unknown,
    Satisfiable,
    Unsatisfiable,
}

impl SolveStatus {
    /// Maps an engine result code. Codes other than SAT and UNSAT are `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            RESULT_SATISFIABLE => SolveStatus::Satisfiable,
            RESULT_UNSATISFIABLE => SolveStatus::Unsatisfiable,
            _ => SolveStatus::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            SolveStatus::Unknown => RESULT_UNKNOWN,
            SolveStatus::Satisfiable => RESULT_SATISFIABLE,
            SolveStatus::Unsatisfiable => RESULT_UNSATISFIABLE,
        }
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::Unknown => "UNKNOWN",
            SolveStatus::Satisfiable => "SATISFIABLE",
            SolveStatus::Unsatisfiable => "UNSATISFIABLE",
        };
        write!(f, "{}", s)
    }
}

/// Incremental solving session over an owned engine.
pub struct Solver<E = VarisatEngine> {
    engine: E,
    /// Destination of the proof trace, fixed at construction.
    proof: Option<PathBuf>,
    status: SolveStatus,
    /// Raw engine code of the last search, kept as returned.
    result_code: i32,
    /// Seconds spent in the last search.
    solve_time: f64,
}

impl Solver<VarisatEngine> {
    /// Creates a session without proof tracing.
    pub fn new() -> Self {
        Solver::configure(VarisatEngine::new(), None)
    }

    /// Creates a session that traces a textual DRAT proof to `path`.
    pub fn with_proof(path: impl AsRef<Path>) -> Result<Self, Error> {
        Solver::with_engine(VarisatEngine::new(), Some(path.as_ref()))
    }
}

impl Default for Solver<VarisatEngine> {
    fn default() -> Self {
        Solver::new()
    }
}

impl<E: Engine> Solver<E> {
    fn configure(mut engine: E, proof: Option<PathBuf>) -> Self {
        // Proofs are parsed back as text, never in the binary encoding.
        engine.set_binary_proof(false);

        Solver {
            engine,
            proof,
            status: SolveStatus::Unknown,
            result_code: RESULT_UNKNOWN,
            solve_time: 0.0,
        }
    }

    /// Wraps `engine`, tracing its proof to `proof` when given.
    pub fn with_engine(engine: E, proof: Option<&Path>) -> Result<Self, Error> {
        let mut solver = Solver::configure(engine, proof.map(Path::to_path_buf));
        if let Some(path) = &solver.proof {
            solver.engine.trace_proof(path).context(TraceProof)?;
        }

        Ok(solver)
    }

    /// Streams every clause to the engine, each closed by a zero.
    /// Literals are forwarded unchecked.
    pub fn add_list(&mut self, clauses: &[Clause]) {
        for clause in clauses {
            for &literal in clause {
                self.engine.add(literal);
            }
            self.engine.add(0);
        }
        debug!("Added {} clauses", clauses.len());
    }

    /// Runs the engine to completion and records its outcome and duration.
    pub fn solve(&mut self) -> SolveStatus {
        let start = Instant::now();
        self.result_code = self.engine.solve();
        self.solve_time = start.elapsed().as_secs_f64();
        self.status = SolveStatus::from_code(self.result_code);

        debug!(
            "Solved as {} (code {}) in {:.6}s",
            self.status, self.result_code, self.solve_time
        );
        self.status
    }

    /// Returns the signed value of each variable `1..=max_var` after a satisfiable search.
    /// Variables without a value are reported false. Empty unless the last search found a model.
    pub fn get_results(&self, max_var: Lit) -> Vec<Lit> {
        if self.status != SolveStatus::Satisfiable {
            return Vec::new();
        }

        (1..=max_var)
            .filter_map(Variable::from_literal)
            .map(|variable| variable.literal(self.engine.val(variable) > 0))
            .collect()
    }

    /// Returns every step of the proof trace, deletions included.
    ///
    /// Empty unless the last search was unsatisfiable and a proof path was configured.
    /// An unreadable trace yields whatever could be read. A line that is not text or
    /// holds a token that is not an integer is an error.
    pub fn get_proof_steps(&mut self) -> Result<Vec<ProofStep>, proof::Error> {
        if self.status != SolveStatus::Unsatisfiable {
            return Ok(Vec::new());
        }
        let path = match &self.proof {
            Some(path) => path,
            None => return Ok(Vec::new()),
        };

        self.engine.flush_proof_trace();
        self.engine.close_proof_trace();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!("Failed to open proof trace '{}': {}", path.display(), err);
                return Ok(Vec::new());
            }
        };

        let mut steps = Vec::new();
        for step in ProofParser::new(BufReader::new(file)) {
            match step {
                Ok(step) => steps.push(step),
                Err(err @ proof::Error::IoError { .. }) => {
                    warn!("Proof trace '{}' cut short: {}", path.display(), err);
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        debug!("Read {} proof steps", steps.len());

        Ok(steps)
    }

    /// Returns the clauses added by the proof trace, one per addition line, in order.
    ///
    /// Deletion lines (`d ...`) are skipped, so the result can be shorter than the
    /// trace. Use [`Solver::get_proof_steps`] to see them.
    /// Empty unless the last search was unsatisfiable and a proof path was configured.
    pub fn get_proof(&mut self) -> Result<ClauseList, proof::Error> {
        self.get_proof_steps().map(proof::lemmas)
    }

    /// Seconds spent in the most recent `solve`, 0 before the first one.
    pub fn get_time(&self) -> f64 {
        self.solve_time
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn result_code(&self) -> i32 {
        self.result_code
    }

    pub fn proof_path(&self) -> Option<&Path> {
        self.proof.as_deref()
    }
}
