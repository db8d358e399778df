use std::{
    env::args,
    io::{self, BufWriter, Write},
    path::Path,
};

use pretty_env_logger::formatted_builder;
use satfacade::{
    formula::{Assignment, Cnf, Lit},
    parser::{self, parse_file},
    prelude::*,
    proof::{self, parse_proof_file, StepKind},
    report::Report,
    solver::{self, SolveStatus, Solver},
};

fn usage_string() -> String {
    format!(
        "Usage: {} <command>

command:
    solve <cnf_file> [proof_file] - solve the formula, optionally tracing a DRAT proof
    proof <proof_file>            - print the steps of a textual DRAT proof",
        args().next().unwrap_or_else(|| "satfacade".to_owned())
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Failed to set up the solver"))]
    SolverError { source: solver::Error },
    #[snafu(display("Failed to read the proof"))]
    ProofError { source: proof::Error },
    #[snafu(display("Model falsifies clause {:?}", clause))]
    InvalidModel { clause: Vec<Lit> },
    #[snafu(display("Failed to write output"))]
    OutputError { source: io::Error },
}

/// Prints a solution in the SAT competition output format.
fn write_solution(
    writer: &mut impl Write,
    status: SolveStatus,
    assignment: &Assignment,
) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "s {}", status)?;

    if status == SolveStatus::Satisfiable {
        const PER_LINE: usize = 10;
        for chunk in assignment.to_literals().chunks(PER_LINE) {
            let chunk_str = chunk
                .iter()
                .map(|lit| lit.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "v {}", chunk_str)?;
        }
        writeln!(writer, "v 0")?;
    }

    writer.flush()
}

fn solve_path(path: &Path, proof: Option<&Path>) -> Result<(), Error> {
    let cnf: Cnf = parse_file(path).context(ParserError)?;

    let mut solver = match proof {
        Some(proof) => Solver::with_proof(proof).context(SolverError)?,
        None => Solver::new(),
    };
    solver.add_list(cnf.clauses());
    let status = solver.solve();
    let model = solver.get_results(cnf.num_variables() as Lit);
    let assignment = Assignment::from_literals(&model);

    if status == SolveStatus::Satisfiable {
        if let Some(clause) = assignment.falsified_clause(cnf.clauses()) {
            return InvalidModel {
                clause: clause.clone(),
            }
            .fail();
        }
    }

    let mut stdout = io::stdout();
    writeln!(stdout, "c solve time: {:.6}s", solver.get_time()).context(OutputError)?;
    write_solution(&mut stdout, status, &assignment).context(OutputError)?;

    if proof.is_some() && status == SolveStatus::Unsatisfiable {
        let lemmas = solver.get_proof().context(ProofError)?;
        writeln!(stdout, "c proof lemmas: {}", lemmas.len()).context(OutputError)?;
    }

    Ok(())
}

fn print_proof(path: &Path) -> Result<(), Error> {
    let steps = parse_proof_file(path).context(ProofError)?;

    let mut writer = BufWriter::new(io::stdout());
    for step in &steps {
        let marker = match step.kind {
            StepKind::Add => "a",
            StepKind::Delete => "d",
        };
        writeln!(writer, "{} {:?}", marker, step.clause).context(OutputError)?;
    }
    writer.flush().context(OutputError)?;

    Ok(())
}

fn dispatch_command(args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("solve") => {
            let path = args.get(1).context(MissingArgument)?;
            let proof = args.get(2).map(Path::new);
            solve_path(path.as_ref(), proof)?;
        }
        Some("proof") => {
            let path = args.get(1).context(MissingArgument)?;
            print_proof(path.as_ref())?;
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => {
            println!("{}", usage_string());
        }
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("satfacade=debug");
    } else {
        builder.parse_filters("satfacade=warn");
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    // drop arg[0]
    let remaining: Vec<_> = args().skip(1).collect();
    dispatch_command(remaining)?;

    Ok(())
}
