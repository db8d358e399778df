use std::{fs, path::PathBuf};

use paste::paste;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    formula::{max_variable, Assignment, Clause, Lit},
    parser::parse_file,
    proof::parse_proof_file,
    solver::{SolveStatus, Solver},
};

fn proof_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("satfacade-{}-{}.drat", name, std::process::id()))
}

macro_rules! sat_testcase {
    ($dir:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< sat_ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let path = proof_path(concat!(stringify!($dir), "-", stringify!($name)));
                let mut solver = Solver::with_proof(&path).unwrap();
                solver.add_list(formula.clauses());

                assert_eq!(solver.solve(), SolveStatus::Satisfiable);
                let results = solver.get_results(formula.num_variables() as Lit);
                assert_eq!(results.len(), formula.num_variables());
                assert!(Assignment::from_literals(&results).satisfies(formula.clauses()));
                assert!(solver.get_proof().unwrap().is_empty());

                fs::remove_file(&path).unwrap();
            }
        }
    };
}

macro_rules! unsat_testcase {
    ($dir:ident, $name:ident) => {
        unsat_testcase!(@run $dir, $name, false);
    };
    ($dir:ident, $name:ident, learns) => {
        unsat_testcase!(@run $dir, $name, true);
    };
    (@run $dir:ident, $name:ident, $learns:expr) => {
        paste! {
            #[test]
            fn [< unsat_ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let path = proof_path(concat!(stringify!($dir), "-", stringify!($name)));
                let mut solver = Solver::with_proof(&path).unwrap();
                solver.add_list(formula.clauses());

                assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
                assert_eq!(solver.result_code(), 20);
                assert!(solver.get_results(formula.num_variables() as Lit).is_empty());

                let proof = solver.get_proof().unwrap();
                if $learns {
                    assert!(!proof.is_empty());
                }
                // the trace on disk is textual DRAT
                let steps = parse_proof_file(&path).unwrap();
                assert!(steps.len() >= proof.len());

                fs::remove_file(&path).unwrap();
            }
        }
    };
}

sat_testcase!(small, simple);
sat_testcase!(small, units);
sat_testcase!(small, empty);
sat_testcase!(small, chain);
unsat_testcase!(small, contradiction);
unsat_testcase!(small, broken_chain);
unsat_testcase!(small, full3, learns);

sat_testcase!(pigeonhole, fit3);
sat_testcase!(pigeonhole, fit5);
unsat_testcase!(pigeonhole, ph2, learns);
unsat_testcase!(pigeonhole, ph3, learns);
unsat_testcase!(pigeonhole, ph4, learns);
unsat_testcase!(pigeonhole, ph5, learns);

/// Pigeonhole formula placing `holes + 1` pigeons into `holes` holes.
fn pigeonhole(holes: Lit) -> Vec<Clause> {
    let pigeons = holes + 1;
    let var = |pigeon: Lit, hole: Lit| pigeon * holes + hole + 1;

    let mut clauses: Vec<Clause> = (0..pigeons)
        .map(|pigeon| (0..holes).map(|hole| var(pigeon, hole)).collect())
        .collect();
    for hole in 0..holes {
        for a in 0..pigeons {
            for b in a + 1..pigeons {
                clauses.push(vec![-var(a, hole), -var(b, hole)]);
            }
        }
    }
    clauses
}

fn random_clauses(rng: &mut StdRng) -> Vec<Clause> {
    let num_variables = rng.gen_range(1..=8);
    let num_clauses = rng.gen_range(0..=12);

    (0..num_clauses)
        .map(|_| {
            let len = rng.gen_range(1..=4);
            (0..len)
                .map(|_| {
                    let variable = rng.gen_range(1..=num_variables);
                    if rng.gen_bool(0.5) {
                        variable
                    } else {
                        -variable
                    }
                })
                .collect()
        })
        .collect()
}

fn brute_force_satisfiable(clauses: &[Clause]) -> bool {
    let num_variables = max_variable(clauses);
    (0..1u32 << num_variables).any(|bits| {
        let literals: Vec<Lit> = (1..=num_variables)
            .map(|variable| {
                if bits & (1 << (variable - 1)) != 0 {
                    variable
                } else {
                    -variable
                }
            })
            .collect();
        Assignment::from_literals(&literals).satisfies(clauses)
    })
}

#[test]
fn agrees_with_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5a7);

    for _ in 0..500 {
        let clauses = random_clauses(&mut rng);
        let max_var = max_variable(&clauses);

        let mut solver = Solver::new();
        solver.add_list(&clauses);
        match solver.solve() {
            SolveStatus::Satisfiable => {
                let results = solver.get_results(max_var);
                assert_eq!(results.len(), max_var as usize);
                assert!(
                    Assignment::from_literals(&results).satisfies(&clauses),
                    "model {:?} falsifies {:?}",
                    results,
                    clauses
                );
            }
            SolveStatus::Unsatisfiable => {
                assert!(solver.get_results(max_var).is_empty());
                assert!(
                    !brute_force_satisfiable(&clauses),
                    "{:?} reported unsatisfiable",
                    clauses
                );
            }
            SolveStatus::Unknown => panic!("no result for {:?}", clauses),
        }
    }
}

#[test]
fn empty_formula_is_satisfiable() {
    let mut solver = Solver::new();
    assert_eq!(solver.solve(), SolveStatus::Satisfiable);
    assert_eq!(solver.result_code(), 10);

    let results = solver.get_results(3);
    assert_eq!(
        results.iter().map(|lit| lit.abs()).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn results_before_solve_are_empty() {
    let mut solver = Solver::new();
    solver.add_list(&[vec![1, 2]]);
    assert!(solver.get_results(2).is_empty());
    assert!(solver.get_proof().unwrap().is_empty());
    assert_eq!(solver.get_time(), 0.0);
}

#[test]
fn incremental_clauses() {
    let mut solver = Solver::new();
    solver.add_list(&[vec![1, 2], vec![-1]]);
    assert_eq!(solver.solve(), SolveStatus::Satisfiable);
    assert_eq!(solver.get_results(2), vec![-1, 2]);

    solver.add_list(&[vec![-2]]);
    assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
    assert!(solver.get_results(2).is_empty());
}

#[test]
fn unsat_without_proof_path() {
    let mut solver = Solver::new();
    solver.add_list(&pigeonhole(3));
    assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
    assert!(solver.proof_path().is_none());
    assert!(solver.get_proof().unwrap().is_empty());
}

#[test]
fn proof_steps_include_lemmas() {
    let path = proof_path("proof-steps");
    let mut solver = Solver::with_proof(&path).unwrap();
    solver.add_list(&pigeonhole(4));
    assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

    let steps = solver.get_proof_steps().unwrap();
    let lemmas = solver.get_proof().unwrap();
    assert_eq!(
        steps.iter().filter(|step| step.is_addition()).count(),
        lemmas.len()
    );
    assert!(!lemmas.is_empty());

    fs::remove_file(&path).unwrap();
}

#[test]
fn solve_time_grows_with_instance() {
    let mut trivial = Solver::new();
    trivial.solve();
    assert!(trivial.get_time() >= 0.0);

    let mut hard = Solver::new();
    hard.add_list(&pigeonhole(6));
    assert_eq!(hard.solve(), SolveStatus::Unsatisfiable);
    assert!(hard.get_time() > 0.0);
    assert!(hard.get_time() >= trivial.get_time());
}
