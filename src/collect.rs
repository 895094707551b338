//! Combining terms that are the same operator written differently.

use crate::algebra::{op_sum, Operator, OperatorSum};
use crate::matching::isomorphism_sign;

/// Merge terms equal up to factor reordering and renaming of contracted
/// indices, adding coefficients (with the fermion reordering sign folded
/// in). Terms whose coefficients cancel completely are dropped.
pub fn collect(sum: &OperatorSum) -> OperatorSum {
  let mut kept: Vec<Operator> = Vec::new();
  'terms: for term in sum.operators() {
    for existing in kept.iter_mut() {
      if let Some(sign) = isomorphism_sign(existing, term) {
        existing.coefficient = existing.coefficient + term.coefficient() * sign;
        continue 'terms;
      }
    }
    kept.push(term.clone());
  }
  kept.retain(|o| !o.coefficient().is_zero());
  op_sum(kept)
}

/// Whether two sums represent the same expression: after collection they
/// must pair up term by term, with matching coefficients up to the
/// reordering sign.
pub fn equivalent_sums(a: &OperatorSum, b: &OperatorSum) -> bool {
  let a = collect(a);
  let b = collect(b);
  if a.len() != b.len() {
    return false;
  }
  let mut used = vec![false; b.len()];
  'outer: for ta in a.operators() {
    for (i, tb) in b.operators().iter().enumerate() {
      if used[i] {
        continue;
      }
      if let Some(sign) = isomorphism_sign(ta, tb) {
        if tb.coefficient() == ta.coefficient() * sign {
          used[i] = true;
          continue 'outer;
        }
      }
    }
    return false;
  }
  true
}
