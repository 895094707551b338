//! Euler-Lagrange functional derivative of an action density.

use std::collections::HashMap;

use crate::algebra::{Index, Operator, OperatorSum, Statistics, Tensor};

/// The functional derivative of the spacetime integral of `lagrangian` with
/// respect to `field`.
///
/// Each occurrence of the field contributes the term around it, with the
/// occurrence removed and its indices renamed to the template's. Derivatives
/// that acted on the occurrence are integrated by parts: each one flips the
/// sign once and is re-applied to the remaining product. A fermionic field
/// flips the sign once more when an odd number of fermion factors precede
/// the occurrence. Terms without the field contribute nothing.
pub fn variation(lagrangian: &OperatorSum, field: &Tensor) -> OperatorSum {
  let mut out = Vec::new();
  for term in lagrangian.operators() {
    for (pos, occurrence) in term.tensors().iter().enumerate() {
      if !occurrence.is_occurrence_of(field) {
        continue;
      }

      let mut sign: i64 = if occurrence.derivative_indices().len() % 2 == 0 {
        1
      } else {
        -1
      };
      if field.statistics() == Statistics::Fermion {
        let preceding = term.tensors()[..pos]
          .iter()
          .filter(|t| t.statistics() == Statistics::Fermion)
          .count();
        if preceding % 2 == 1 {
          sign = -sign;
        }
      }

      let mut rest_tensors = term.tensors().to_vec();
      rest_tensors.remove(pos);
      let rest = Operator {
        coefficient: term.coefficient() * sign,
        tensors: rest_tensors,
      };

      let mut sum = OperatorSum::from(rest);
      for &didx in occurrence.derivative_indices() {
        sum = sum.differentiate(didx);
      }

      let map: HashMap<Index, Index> = occurrence
        .indices()
        .iter()
        .copied()
        .zip(field.indices().iter().copied())
        .collect();
      out.extend(sum.substitute_indices(&map).operators.into_iter());
    }
  }
  OperatorSum { operators: out }
}
