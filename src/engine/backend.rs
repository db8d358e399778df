use std::{fs::File, io::BufWriter, mem::take, path::Path};

use varisat::{ExtendFormula, ProofFormat};

use crate::formula::{Lit, Variable};
use crate::prelude::*;

use super::{
    Engine, Error, OpenProof, RESULT_SATISFIABLE, RESULT_UNKNOWN, RESULT_UNSATISFIABLE,
};

/// [`Engine`] backed by the varisat CDCL solver.
pub struct VarisatEngine {
    solver: varisat::Solver<'static>,
    /// Literals of the clause being built.
    pending: Vec<varisat::Lit>,
    /// Variable index -> value in the last satisfying model
    model: Vec<Option<bool>>,
    binary_proof: bool,
    tracing: bool,
}

impl VarisatEngine {
    pub fn new() -> Self {
        VarisatEngine {
            solver: varisat::Solver::new(),
            pending: Vec::new(),
            model: Vec::new(),
            binary_proof: true,
            tracing: false,
        }
    }

    fn record_model(&mut self) {
        self.model.clear();
        let model = match self.solver.model() {
            Some(model) => model,
            None => return,
        };

        for literal in model {
            let index = literal.var().index();
            if self.model.len() <= index {
                self.model.resize(index + 1, None);
            }
            self.model[index] = Some(literal.is_positive());
        }
    }
}

impl Default for VarisatEngine {
    fn default() -> Self {
        VarisatEngine::new()
    }
}

impl Engine for VarisatEngine {
    fn add(&mut self, literal: Lit) {
        if literal == 0 {
            let clause = take(&mut self.pending);
            self.solver.add_clause(&clause);
        } else {
            self.pending.push(varisat::Lit::from_dimacs(literal as isize));
        }
    }

    fn solve(&mut self) -> i32 {
        if !self.pending.is_empty() {
            warn!(
                "Solving with {} literals of an unterminated clause pending",
                self.pending.len()
            );
        }

        let code = match self.solver.solve() {
            Ok(true) => RESULT_SATISFIABLE,
            Ok(false) => RESULT_UNSATISFIABLE,
            Err(err) => {
                warn!("varisat stopped without a result: {}", err);
                RESULT_UNKNOWN
            }
        };

        if code == RESULT_SATISFIABLE {
            self.record_model();
        } else {
            self.model.clear();
        }

        code
    }

    fn val(&self, variable: Variable) -> Lit {
        match self.model.get(variable.as_index()).copied().flatten() {
            Some(value) => variable.literal(value),
            None => 0,
        }
    }

    fn set_binary_proof(&mut self, binary: bool) {
        self.binary_proof = binary;
    }

    fn trace_proof(&mut self, path: &Path) -> Result<(), Error> {
        let file = File::create(path).context(OpenProof {
            path: path.to_owned(),
        })?;

        let (format, encoding) = if self.binary_proof {
            (ProofFormat::BinaryDrat, "binary")
        } else {
            (ProofFormat::Drat, "textual")
        };
        debug!("Tracing {} DRAT proof to '{}'", encoding, path.display());

        self.solver.write_proof(BufWriter::new(file), format);
        self.tracing = true;

        Ok(())
    }

    fn close_proof_trace(&mut self) {
        if !self.tracing {
            return;
        }
        self.tracing = false;

        // varisat flushes the writer when the proof is closed
        if let Err(err) = self.solver.close_proof() {
            warn!("Failed to close proof trace: {}", err);
        }
    }
}
