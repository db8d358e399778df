#[macro_use]
extern crate log;

pub mod engine;
pub mod formula;
pub mod parser;
pub mod prelude;
pub mod proof;
pub mod report;
pub mod solver;

#[cfg(test)]
mod tests;
