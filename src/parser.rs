use std::{
    fs::File,
    io::{BufRead, BufReader},
    mem::take,
    path::{Path, PathBuf},
};

use crate::formula::{Cnf, Lit, Variable};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while opening CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading CNF input"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MalformedProblemDefinition,
    #[snafu(display("Failed to parse '{}' as literal", token))]
    MalformedLiteral {
        token: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display(
        "Literal {} is out of range (the problem defines {} variables)",
        literal,
        num_variables
    ))]
    VariableOutOfRange { literal: Lit, num_variables: usize },
    #[snafu(display(
        "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
        found,
        expected,
    ))]
    ClauseCountMismatch { expected: usize, found: usize },
}

/// Parses `p cnf <num_variables> <num_clauses>`.
fn parse_problem_line(line: &str) -> Result<(usize, usize), Error> {
    let splitted = line.split_ascii_whitespace().collect::<Vec<_>>();

    // We only support CNF DIMACS format
    ensure!(
        splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
        MalformedProblemDefinition
    );

    match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
        (Ok(num_variables), Ok(num_clauses)) => Ok((num_variables, num_clauses)),
        _ => MalformedProblemDefinition.fail(),
    }
}

/// Parses a DIMACS CNF formula. Clauses may span lines and end at each `0`.
pub fn parse_dimacs(reader: impl BufRead) -> Result<Cnf, Error> {
    let mut lines = reader.lines();

    // skip comments until we find the problem definition
    let mut problem = None;
    for line in &mut lines {
        let line = line.context(ReadError)?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        problem = Some(parse_problem_line(trimmed)?);
        break;
    }
    let (num_variables, num_clauses) = problem.context(MalformedProblemDefinition)?;
    ensure!(
        num_variables <= Variable::MAX_VARIABLE_ID,
        MalformedProblemDefinition
    );

    let mut cnf = Cnf::new(num_variables);
    let mut clause = Vec::new();

    for line in lines {
        let line = line.context(ReadError)?;
        let trimmed = line.trim();
        // SATLIB benchmarks end with a '%' trailer
        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }

        for token in trimmed.split_ascii_whitespace() {
            let literal = token
                .parse::<Lit>()
                .context(MalformedLiteral { token })?;
            if literal == 0 {
                cnf.add_clause(take(&mut clause));
                continue;
            }

            ensure!(
                literal.unsigned_abs() as usize <= num_variables,
                VariableOutOfRange {
                    literal,
                    num_variables,
                }
            );
            clause.push(literal);
        }
    }

    // tolerate a missing terminator on the last clause
    if !clause.is_empty() {
        cnf.add_clause(clause);
    }

    ensure!(
        cnf.clauses().len() == num_clauses,
        ClauseCountMismatch {
            found: cnf.clauses().len(),
            expected: num_clauses,
        }
    );

    debug!(
        "Parsed CNF with {} variables and {} clauses",
        num_variables, num_clauses
    );
    Ok(cnf)
}

/// Parses CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(IoError {
        path: path.to_owned(),
    })?);

    parse_dimacs(file)
}
