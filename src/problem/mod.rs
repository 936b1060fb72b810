//! Problem description: stages, choice levels, benefit table, capacity

mod data;

pub use data::{Amount, ProblemSpec, Stage};
