//! Constants with an algebraic inverse, and mass-factor merging.

use std::collections::HashMap;

use num_traits::Zero;

use crate::algebra::{op_sum, Index, Operator, OperatorSum, Tensor, TensorKind};

/// The algebraic inverse of an invertible constant: mass factors flip the
/// sign of their exponent, epsilons swap between the upper and lower kind.
/// Fields and plain constants have no inverse.
pub fn inverse(tensor: &Tensor) -> Option<Tensor> {
  match tensor.kind() {
    TensorKind::MassMatrix | TensorKind::MassScalar => {
      Some(tensor.powered(-tensor.exponent_or_one()))
    }
    TensorKind::EpsilonUp => {
      let mut out = tensor.clone();
      out.kind = TensorKind::EpsilonDown;
      Some(out)
    }
    TensorKind::EpsilonDown => {
      let mut out = tensor.clone();
      out.kind = TensorKind::EpsilonUp;
      Some(out)
    }
    TensorKind::Field | TensorKind::Constant => None,
  }
}

/// Merge chained mass factors of the same field in every term; see
/// [`merge_mass_factors_in`].
pub fn merge_mass_factors(sum: &OperatorSum) -> OperatorSum {
  op_sum(
    sum
      .operators()
      .iter()
      .map(merge_mass_factors_in)
      .collect(),
  )
}

/// What happens to a mergeable pair of mass factors.
enum Merge {
  /// Replace the pair by one factor with the summed exponent.
  Combine(Tensor),
  /// The exponents cancel and the factor disappears.
  Cancel,
  /// A matrix pair cancels to a Kronecker delta: drop both factors and
  /// identify the second leftover index with the first across the term.
  CancelIdentify(Index, Index),
}

/// Repeatedly combine two mass factors of the same name into one with the
/// summed exponent: scalar masses must carry identical indices, mass
/// matrices must share exactly one index (matrix multiplication on the
/// shared slot). A fully cancelled scalar pair disappears; a fully
/// cancelled matrix pair leaves an index identification behind.
pub fn merge_mass_factors_in(term: &Operator) -> Operator {
  let mut tensors = term.tensors().to_vec();
  loop {
    match find_merge(&tensors) {
      Some((i, j, merge)) => {
        tensors.remove(j);
        tensors.remove(i);
        match merge {
          Merge::Combine(t) => tensors.insert(i, t),
          Merge::Cancel => {}
          Merge::CancelIdentify(keep, gone) => {
            let mut map = HashMap::new();
            map.insert(gone, keep);
            tensors = tensors
              .iter()
              .map(|t| t.substitute_indices(&map))
              .collect();
          }
        }
      }
      None => break,
    }
  }
  Operator {
    coefficient: term.coefficient(),
    tensors,
  }
}

fn find_merge(tensors: &[Tensor]) -> Option<(usize, usize, Merge)> {
  for i in 0..tensors.len() {
    for j in i + 1..tensors.len() {
      if let Some(merge) = merge_pair(&tensors[i], &tensors[j]) {
        return Some((i, j, merge));
      }
    }
  }
  None
}

fn merge_pair(a: &Tensor, b: &Tensor) -> Option<Merge> {
  if a.name() != b.name()
    || a.kind() != b.kind()
    || a.is_conjugated() != b.is_conjugated()
  {
    return None;
  }
  let exponent = a.exponent_or_one() + b.exponent_or_one();
  match a.kind() {
    TensorKind::MassScalar => {
      if a.indices() != b.indices() {
        return None;
      }
      if exponent.is_zero() {
        Some(Merge::Cancel)
      } else {
        Some(Merge::Combine(a.powered(exponent)))
      }
    }
    TensorKind::MassMatrix => {
      let mut shared = None;
      let mut shared_count = 0;
      for (ia, &xa) in a.indices().iter().enumerate() {
        for (ib, &xb) in b.indices().iter().enumerate() {
          if xa == xb {
            shared = Some((ia, ib));
            shared_count += 1;
          }
        }
      }
      let (ia, ib) = match (shared, shared_count) {
        (Some(pair), 1) => pair,
        _ => return None,
      };
      let a_left: Vec<Index> = a
        .indices()
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != ia)
        .map(|(_, &idx)| idx)
        .collect();
      let b_left: Vec<Index> = b
        .indices()
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != ib)
        .map(|(_, &idx)| idx)
        .collect();
      if exponent.is_zero() {
        return match (a_left.as_slice(), b_left.as_slice()) {
          (&[keep], &[gone]) => Some(Merge::CancelIdentify(keep, gone)),
          _ => None,
        };
      }
      let mut merged = a.powered(exponent);
      merged.indices = a_left.into_iter().chain(b_left).collect();
      Some(Merge::Combine(merged))
    }
    _ => None,
  }
}
