//! Solving equations of motion and substituting their solutions.

use std::collections::HashMap;

use num_rational::Rational64;

use crate::algebra::{
  op_sum, Coefficient, Index, Operator, OperatorSum, Tensor,
};
use crate::collect::collect;
use crate::invertibles::{inverse, merge_mass_factors, merge_mass_factors_in};
use crate::EquationError;

/// A closed form for one field: wherever an occurrence of `field` appears,
/// it may be replaced by `replacement` (with the template's free indices
/// renamed to the occurrence's, and everything else alpha-renamed fresh).
#[derive(Debug, Clone)]
pub struct EquationSolution {
  pub field: Tensor,
  pub replacement: OperatorSum,
}

impl EquationSolution {
  pub fn substitute_into(&self, target: &OperatorSum) -> OperatorSum {
    substitute_field(target, &self.field, &self.replacement)
  }
}

/// Replace every occurrence of `field` in `target` by `replacement`.
///
/// Derivatives acting on an occurrence are re-applied to the substituted
/// expression through the product rule. Content spliced in by one
/// replacement is not re-scanned, so a self-referential replacement is
/// expanded exactly one level per call.
pub fn substitute_field(
  target: &OperatorSum,
  field: &Tensor,
  replacement: &OperatorSum,
) -> OperatorSum {
  let mut out = Vec::new();
  for term in target.operators() {
    substitute_in_operator(term, field, replacement, &mut out);
  }
  op_sum(out)
}

fn substitute_in_operator(
  term: &Operator,
  field: &Tensor,
  replacement: &OperatorSum,
  out: &mut Vec<Operator>,
) {
  let mut work: Vec<(Vec<Tensor>, Coefficient, usize)> =
    vec![(term.tensors().to_vec(), term.coefficient(), 0)];
  while let Some((tensors, coefficient, from)) = work.pop() {
    let found = tensors
      .iter()
      .enumerate()
      .skip(from)
      .find(|(_, t)| t.is_occurrence_of(field));
    let (pos, occurrence) = match found {
      Some((pos, t)) => (pos, t.clone()),
      None => {
        out.push(Operator {
          coefficient,
          tensors,
        });
        continue;
      }
    };
    for e in replacement.operators() {
      let mut map: HashMap<Index, Index> = field
        .indices()
        .iter()
        .copied()
        .zip(occurrence.indices().iter().copied())
        .collect();
      for t in e.tensors() {
        for idx in t.total_indices() {
          map.entry(idx).or_insert_with(Index::fresh);
        }
      }
      let mapped = e.substitute_indices(&map);
      let mut expanded = OperatorSum::from(mapped);
      for &didx in occurrence.derivative_indices().iter().rev() {
        expanded = expanded.differentiate(didx);
      }
      for piece in expanded.operators() {
        let mut spliced = tensors[..pos].to_vec();
        spliced.extend(piece.tensors().iter().cloned());
        spliced.extend(tensors[pos + 1..].iter().cloned());
        work.push((
          spliced,
          coefficient * piece.coefficient(),
          pos + piece.tensors().len(),
        ));
      }
    }
  }
}

/// Isolate `field` from its varied Lagrangian: the single linear term gives
/// the field in closed form, with the invertible prefactors inverted onto
/// the other side.
///
/// The variation is collected first, so syntactically duplicated linear
/// terms (as produced by a quadratic mass term) count as one.
pub fn solve_field(
  variation: &OperatorSum,
  field: &Tensor,
) -> Result<EquationSolution, EquationError> {
  let collected = collect(variation);
  let mut candidates = Vec::new();
  for (i, term) in collected.operators().iter().enumerate() {
    if let Some(pos) = isolatable_occurrence(term, field) {
      candidates.push((i, pos));
    }
  }
  let (pivot_index, occurrence_pos) = match candidates.as_slice() {
    &[only] => only,
    &[] => {
      return Err(EquationError::NoLinearTerm {
        field: field.to_string(),
        variation: collected.to_string(),
      })
    }
    many => {
      let terms = many
        .iter()
        .map(|&(i, _)| collected.operators()[i].to_string())
        .collect::<Vec<_>>()
        .join(" | ");
      return Err(EquationError::MultipleLinearTerms {
        field: field.to_string(),
        terms,
      });
    }
  };

  let pivot = &collected.operators()[pivot_index];
  let occurrence = pivot.tensors()[occurrence_pos].clone();
  let prefactors: Vec<Tensor> = pivot
    .tensors()
    .iter()
    .enumerate()
    .filter(|(pos, _)| *pos != occurrence_pos)
    .map(|(_, t)| t.clone())
    .collect();
  let merged = merge_mass_factors_in(&Operator {
    coefficient: Coefficient::one(),
    tensors: prefactors,
  });
  let inverted: Vec<Tensor> =
    merged.tensors().iter().filter_map(inverse).collect();

  let mut replacement = Vec::new();
  for (i, term) in collected.operators().iter().enumerate() {
    if i == pivot_index {
      continue;
    }
    let mut tensors = inverted.clone();
    tensors.extend(term.tensors().iter().cloned());
    replacement.push(Operator {
      coefficient: -(term.coefficient() / pivot.coefficient()),
      tensors,
    });
  }

  Ok(EquationSolution {
    field: occurrence,
    replacement: op_sum(replacement),
  })
}

/// The position of the single undifferentiated, unpowered occurrence of
/// `field`, provided every other factor of the term is invertible.
fn isolatable_occurrence(term: &Operator, field: &Tensor) -> Option<usize> {
  let mut found = None;
  for (pos, t) in term.tensors().iter().enumerate() {
    if t.is_occurrence_of(field) {
      if found.is_some()
        || !t.derivative_indices().is_empty()
        || t.exponent().is_some()
      {
        return None;
      }
      found = Some(pos);
    } else if !t.kind().is_invertible() {
      return None;
    }
  }
  found
}

/// The coupled solutions of all heavy fields, iterated together to a fixed
/// point under a dimension ceiling.
#[derive(Debug, Clone)]
pub struct System {
  pub solutions: Vec<EquationSolution>,
  pub max_dimension: Rational64,
}

impl System {
  /// Substitute every solution into every replacement (self-referential
  /// ones included) until no heavy-field name remains, filtering by
  /// dimension after each round. Each substitution raises the dimension of
  /// the terms it touches, so the rounds are bounded by the ceiling.
  pub fn solve(mut self) -> Result<Vec<EquationSolution>, EquationError> {
    let rounds = round_bound(self.max_dimension);
    for _ in 0..rounds {
      if self.is_settled() {
        return Ok(self.solutions);
      }
      let snapshot = self.solutions.clone();
      for solution in &mut self.solutions {
        let mut replacement = solution.replacement.clone();
        for other in &snapshot {
          replacement =
            substitute_field(&replacement, &other.field, &other.replacement);
        }
        let bounded = replacement.filter_dimension(self.max_dimension);
        solution.replacement = collect(&merge_mass_factors(&bounded));
      }
    }
    if self.is_settled() {
      return Ok(self.solutions);
    }
    let context = self
      .solutions
      .iter()
      .map(|s| s.field.name().to_string())
      .collect::<Vec<_>>()
      .join(", ");
    Err(EquationError::NoFixedPoint { context, rounds })
  }

  fn is_settled(&self) -> bool {
    self.solutions.iter().all(|solution| {
      self
        .solutions
        .iter()
        .all(|s| !solution.replacement.mentions_tensor(s.field.name()))
    })
  }
}

/// Substitution rounds that suffice for any input respecting the dimension
/// ceiling: every round raises the dimension of unsettled terms by at least
/// one half, so anything still heavy after this many rounds cannot
/// terminate at all.
pub(crate) fn round_bound(max_dimension: Rational64) -> usize {
  let doubled = (Rational64::from_integer(2) * max_dimension)
    .ceil()
    .to_integer();
  doubled.max(0) as usize + 2
}
