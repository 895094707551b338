//! Rewriting rules and identities.
//!
//! A [`Rule`] rewrites the first occurrence of its pattern in each term.
//! Replacement indices not bound by the match are always renamed to fresh
//! ones, so a rule can never capture an index that happens to live in the
//! surrounding term.
//!
//! Rewriting with first-match application is not confluent for arbitrary
//! rule sets: different rule orders or round counts can land on different
//! but equal normal forms. Callers order their rules and pick the round
//! count in [`apply_rules`] per use case.

use crate::algebra::{op_sum, Index, Operator, OperatorSum};
use crate::matching::match_operators;

/// One rewriting rule: wherever `pattern` occurs, it is worth `replacement`.
#[derive(Debug, Clone)]
pub struct Rule {
  pattern: Operator,
  replacement: OperatorSum,
}

impl Rule {
  pub fn new(pattern: Operator, replacement: impl Into<OperatorSum>) -> Rule {
    Rule {
      pattern,
      replacement: replacement.into(),
    }
  }

  /// Rewrite each term of `target` once, using the first match found.
  /// Terms without a match pass through unchanged.
  pub fn apply(&self, target: &OperatorSum) -> OperatorSum {
    let mut out = Vec::new();
    for term in target.operators() {
      match self.apply_to_operator(term) {
        Some(rewritten) => out.extend(rewritten.operators.into_iter()),
        None => out.push(term.clone()),
      }
    }
    op_sum(out)
  }

  /// Rewrite the first occurrence of the pattern in one term, or None when
  /// the pattern does not occur.
  pub fn apply_to_operator(&self, target: &Operator) -> Option<OperatorSum> {
    let m = match_operators(&self.pattern, target).next()?;
    let scale =
      (target.coefficient() / self.pattern.coefficient()) * m.sign;
    let mut out = Vec::new();
    for term in self.replacement.operators() {
      let mut map = m.index_mapping.clone();
      for t in term.tensors() {
        for idx in t.total_indices() {
          map.entry(idx).or_insert_with(Index::fresh);
        }
      }
      let mapped = term.substitute_indices(&map);
      let mut tensors = mapped.tensors().to_vec();
      tensors.extend(m.rest.iter().cloned());
      out.push(Operator {
        coefficient: mapped.coefficient() * scale,
        tensors,
      });
    }
    Some(op_sum(out))
  }
}

/// An equality `lhs == rhs` usable as a rewriting rule in every direction:
/// one rule sends the left side to the right side, and one rule per
/// right-side term solves the equality for that term.
#[derive(Debug, Clone)]
pub struct Identity {
  lhs: Operator,
  rhs: OperatorSum,
}

impl Identity {
  pub fn equals(lhs: Operator, rhs: impl Into<OperatorSum>) -> Identity {
    Identity {
      lhs,
      rhs: rhs.into(),
    }
  }

  pub fn rules(&self) -> Vec<Rule> {
    let mut rules = vec![Rule::new(self.lhs.clone(), self.rhs.clone())];
    for (i, term) in self.rhs.operators().iter().enumerate() {
      let mut replacement = vec![self.lhs.clone()];
      for (j, other) in self.rhs.operators().iter().enumerate() {
        if j != i {
          replacement.push(-other.clone());
        }
      }
      rules.push(Rule::new(term.clone(), op_sum(replacement)));
    }
    rules
  }
}

/// Apply every rule in order, `rounds` times over.
pub fn apply_rules(
  rules: &[Rule],
  sum: &OperatorSum,
  rounds: usize,
) -> OperatorSum {
  let mut current = sum.clone();
  for _ in 0..rounds {
    for rule in rules {
      current = rule.apply(&current);
    }
  }
  current
}
