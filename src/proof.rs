/*!
Parser for textual DRAT proof traces.

Each line of a trace is one step: an optional `d` marker for deletions followed
by whitespace-separated literals. Zeros are clause terminators and are dropped,
so a line always yields exactly one clause no matter how many zeros it holds.
*/

use std::{
    fs::File,
    io::{BufRead, BufReader, Split},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Lit};
use crate::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub enum Error {
    #[snafu(display("Failed to open proof file '{}'", path.display()))]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading proof line {}", line))]
    IoError { line: usize, source: std::io::Error },
    #[snafu(display("Proof line {} is not valid UTF-8", line))]
    InvalidText {
        line: usize,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Invalid token '{}' on proof line {}", token, line))]
    MalformedToken {
        line: usize,
        token: String,
        source: std::num::ParseIntError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Add,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub kind: StepKind,
    pub clause: Clause,
}

impl ProofStep {
    pub fn is_addition(&self) -> bool {
        self.kind == StepKind::Add
    }
}

/// Parses one trace line. `line` is the 1-based line number used in errors.
fn parse_line(text: &str, line: usize) -> Result<ProofStep, Error> {
    let mut tokens = text.split_ascii_whitespace().peekable();

    let kind = if tokens.peek() == Some(&"d") {
        tokens.next();
        StepKind::Delete
    } else {
        StepKind::Add
    };

    let mut clause = Vec::new();
    for token in tokens {
        let literal = token
            .parse::<Lit>()
            .context(MalformedToken { line, token })?;
        if literal != 0 {
            clause.push(literal);
        }
    }

    Ok(ProofStep { kind, clause })
}

/// Iterator over the steps of a textual proof trace.
///
/// A failed read yields `IoError`. A line that was read but is not UTF-8 yields
/// `InvalidText`.
pub struct ProofParser<R> {
    lines: Split<R>,
    line: usize,
}

impl<R: BufRead> ProofParser<R> {
    pub fn new(reader: R) -> Self {
        ProofParser {
            lines: reader.split(b'\n'),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for ProofParser<R> {
    type Item = Result<ProofStep, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.lines.next()?;
        self.line += 1;

        let line = self.line;
        let step = text
            .context(IoError { line })
            .and_then(|bytes| String::from_utf8(bytes).context(InvalidText { line }))
            .and_then(|text| parse_line(&text, line));
        trace!("Proof line {}: {:?}", line, step);

        Some(step)
    }
}

/// Parses every step of a textual proof trace.
pub fn parse_proof(reader: impl BufRead) -> Result<Vec<ProofStep>, Error> {
    ProofParser::new(reader).collect()
}

/// Parses a textual proof trace file.
pub fn parse_proof_file(path: impl AsRef<Path>) -> Result<Vec<ProofStep>, Error> {
    let path = path.as_ref();
    let file = File::open(path).context(OpenFile {
        path: path.to_owned(),
    })?;

    parse_proof(BufReader::new(file))
}

/// Keeps the clauses introduced by the trace, in order.
pub fn lemmas(steps: Vec<ProofStep>) -> Vec<Clause> {
    steps
        .into_iter()
        .filter(ProofStep::is_addition)
        .map(|step| step.clause)
        .collect()
}
