/*!
Clause, formula and assignment types shared by the facade and its collaborators.

Literals use the DIMACS convention: the sign is the polarity and the magnitude is
the variable ID. Zero is never a literal, it only terminates clauses on the wire.
*/

use std::{convert::TryInto, num::NonZeroU32};

use typed_index_collections::TiVec;

/// Signed DIMACS literal.
pub type Lit = i32;

/// Disjunction of literals.
pub type Clause = Vec<Lit>;

/// Conjunction of clauses. Also the shape of a parsed proof.
pub type ClauseList = Vec<Clause>;

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    /// Every variable must be expressible as a positive literal.
    pub const MAX_VARIABLE_ID: usize = Lit::MAX as usize;

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Creates a variable from a raw index.
    /// Returns `None` if the index is invalid.
    pub fn from_index(index: usize) -> Option<Self> {
        let id = index.checked_add(1)?;
        if id > Variable::MAX_VARIABLE_ID {
            return None;
        }
        Some(Variable(NonZeroU32::new(id.try_into().ok()?)?))
    }

    /// Returns the variable a literal refers to, `None` for the terminator.
    pub fn from_literal(literal: Lit) -> Option<Self> {
        let id = literal.unsigned_abs();
        if id as usize > Variable::MAX_VARIABLE_ID {
            return None;
        }
        NonZeroU32::new(id).map(Variable)
    }

    pub fn id(&self) -> Lit {
        self.0.get() as Lit
    }

    /// Returns the literal of this variable with the given polarity.
    pub fn literal(&self, positive: bool) -> Lit {
        if positive {
            self.id()
        } else {
            -self.id()
        }
    }
}

// Only index-keyed collections convert from `usize`, and their keys never
// exceed the number of stored variables.
impl From<usize> for Variable {
    fn from(index: usize) -> Self {
        Variable::from_index(index).expect("variable index out of range")
    }
}

impl From<Variable> for usize {
    fn from(variable: Variable) -> Self {
        variable.as_index()
    }
}

/// Returns the largest variable ID mentioned in `clauses`, or 0 if there is none.
pub fn max_variable(clauses: &[Clause]) -> Lit {
    clauses
        .iter()
        .flatten()
        .filter_map(|&literal| Variable::from_literal(literal))
        .map(|variable| variable.id())
        .max()
        .unwrap_or(0)
}

/// Formula representation in Conjunctive Normal Form, as read from a DIMACS file.
#[derive(Debug, Clone)]
pub struct Cnf {
    num_variables: usize,
    clauses: ClauseList,
}

impl Cnf {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Cnf {
            num_variables,
            clauses: Vec::new(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn clauses(&self) -> &ClauseList {
        &self.clauses
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }
}

/// Total assignment to variables `1..=n`, built from a signed result list.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: TiVec<Variable, bool>,
}

impl Assignment {
    /// Builds an assignment from signed literals. Variables in the gaps are false.
    pub fn from_literals(literals: &[Lit]) -> Self {
        let mut values: TiVec<Variable, bool> = TiVec::new();
        for (variable, positive) in literals
            .iter()
            .filter_map(|&literal| Some((Variable::from_literal(literal)?, literal > 0)))
        {
            while values.len() <= variable.as_index() {
                values.push(false);
            }
            values[variable] = positive;
        }

        Assignment { values }
    }

    /// Returns the truth value of a literal, `None` if its variable is unassigned.
    pub fn value(&self, literal: Lit) -> Option<bool> {
        let variable = Variable::from_literal(literal)?;
        let value = *self.values.get(variable)?;
        Some(value == (literal > 0))
    }

    /// Returns the first clause with no true literal.
    pub fn falsified_clause<'c>(&self, clauses: &'c [Clause]) -> Option<&'c Clause> {
        clauses.iter().find(|clause| {
            !clause
                .iter()
                .any(|&literal| self.value(literal) == Some(true))
        })
    }

    pub fn satisfies(&self, clauses: &[Clause]) -> bool {
        self.falsified_clause(clauses).is_none()
    }

    /// Signed literals for variables `1..=n`, in order.
    pub fn to_literals(&self) -> Vec<Lit> {
        self.values
            .iter_enumerated()
            .map(|(variable, &value)| variable.literal(value))
            .collect()
    }
}
