//! Symbolic tensor algebra for integrating heavy fields out of effective
//! Lagrangians: build operators from indexed tensors, rewrite them with
//! rules, vary them, and eliminate heavy degrees of freedom through their
//! equations of motion.

use thiserror::Error;

pub mod algebra;
pub mod collect;
pub mod eom;
pub mod integration;
pub mod invertibles;
pub mod matching;
pub mod rules;
pub mod variation;

pub use algebra::{
  d, number_op, op, op_sum, Coefficient, ConstantBuilder, Differentiate,
  FieldBuilder, Index, Operator, OperatorSum, Statistics, Symmetry, Tensor,
  TensorKind,
};
pub use collect::{collect, equivalent_sums};
pub use eom::{solve_field, substitute_field, EquationSolution, System};
pub use integration::{integrate_out, HeavyField};
pub use invertibles::{inverse, merge_mass_factors, merge_mass_factors_in};
pub use matching::{isomorphism_sign, match_operators, Match, Matches};
pub use rules::{apply_rules, Identity, Rule};
pub use variation::variation;

/// Fatal conditions from heavy-field elimination. A pattern that simply
/// does not match anywhere is not an error; it shows up as an empty match
/// sequence instead.
#[derive(Error, Debug)]
pub enum EquationError {
  #[error("no term linear in {field}; the varied lagrangian was {variation}")]
  NoLinearTerm { field: String, variation: String },
  #[error("{field} occurs linearly in more than one term: {terms}")]
  MultipleLinearTerms { field: String, terms: String },
  #[error(
    "{context} still mentions a heavy field after {rounds} substitution rounds"
  )]
  NoFixedPoint { context: String, rounds: usize },
}
