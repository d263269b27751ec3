//! MILP solver backends implementing [`MilpSolver`](crate::port::MilpSolver).

mod highs;

pub use highs::HighsSolver;
