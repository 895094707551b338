//! Products and sums of tensors with exact coefficients.
//!
//! An [`Operator`] is one term: a coefficient times an ordered product of
//! tensors. An [`OperatorSum`] is a list of such terms. Arithmetic operators
//! build both from tensors, so a Lagrangian reads close to how it is written
//! on paper.

use std::collections::HashMap;
use std::ops::{Add, Mul, Neg, Sub};

use num_rational::Rational64;
use num_traits::Zero;

use crate::algebra::index::Index;
use crate::algebra::number::Coefficient;
use crate::algebra::tensor::{Tensor, TensorKind};

/// One term: a coefficient times an ordered product of tensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
  pub(crate) coefficient: Coefficient,
  pub(crate) tensors: Vec<Tensor>,
}

/// A sum of terms. The additive identity is the empty sum.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperatorSum {
  pub(crate) operators: Vec<Operator>,
}

/// A product of tensors with coefficient one.
pub fn op(tensors: Vec<Tensor>) -> Operator {
  Operator {
    coefficient: Coefficient::one(),
    tensors,
  }
}

/// A sum built from the given terms, kept in order.
pub fn op_sum(operators: Vec<Operator>) -> OperatorSum {
  OperatorSum { operators }
}

/// A bare number as a term with no tensors.
pub fn number_op(value: impl Into<Coefficient>) -> Operator {
  Operator {
    coefficient: value.into(),
    tensors: Vec::new(),
  }
}

impl Operator {
  pub fn coefficient(&self) -> Coefficient {
    self.coefficient
  }

  pub fn tensors(&self) -> &[Tensor] {
    &self.tensors
  }

  pub fn scaled(&self, factor: impl Into<Coefficient>) -> Operator {
    Operator {
      coefficient: self.coefficient * factor.into(),
      tensors: self.tensors.clone(),
    }
  }

  /// Canonical (mass) dimension: each tensor contributes its dimension times
  /// its exponent, plus one per derivative applied to it.
  pub fn dimension(&self) -> Rational64 {
    self.tensors.iter().fold(Rational64::zero(), |acc, t| {
      acc
        + t.dimension * t.exponent_or_one()
        + Rational64::from_integer(t.derivative_indices.len() as i64)
    })
  }

  /// How often each index appears, counting derivative and ordinary slots.
  pub fn index_multiplicities(&self) -> HashMap<Index, usize> {
    let mut counts = HashMap::new();
    for t in &self.tensors {
      for idx in t.total_indices() {
        *counts.entry(idx).or_insert(0) += 1;
      }
    }
    counts
  }

  /// Indices appearing exactly once, in order of first appearance.
  pub fn free_indices(&self) -> Vec<Index> {
    let counts = self.index_multiplicities();
    let mut free = Vec::new();
    for t in &self.tensors {
      for idx in t.total_indices() {
        if counts.get(&idx) == Some(&1) {
          free.push(idx);
        }
      }
    }
    free
  }

  /// Elementwise complex conjugate; the factor order is kept.
  pub fn conjugate(&self) -> Operator {
    Operator {
      coefficient: self.coefficient.conjugate(),
      tensors: self.tensors.iter().map(Tensor::conjugated).collect(),
    }
  }

  /// Leibniz rule: one term per field factor, with the new derivative index
  /// prepended to that factor. Constants drop out.
  pub fn differentiate(&self, index: Index) -> OperatorSum {
    let mut out = Vec::new();
    for (pos, t) in self.tensors.iter().enumerate() {
      if t.kind() != TensorKind::Field {
        continue;
      }
      let mut tensors = self.tensors.clone();
      tensors[pos] = t.with_derivative(index);
      out.push(Operator {
        coefficient: self.coefficient,
        tensors,
      });
    }
    OperatorSum { operators: out }
  }

  pub fn substitute_indices(&self, map: &HashMap<Index, Index>) -> Operator {
    Operator {
      coefficient: self.coefficient,
      tensors: self
        .tensors
        .iter()
        .map(|t| t.substitute_indices(map))
        .collect(),
    }
  }

  pub fn mentions_tensor(&self, name: &str) -> bool {
    self.tensors.iter().any(|t| t.name() == name)
  }
}

impl OperatorSum {
  pub fn operators(&self) -> &[Operator] {
    &self.operators
  }

  pub fn len(&self) -> usize {
    self.operators.len()
  }

  pub fn is_empty(&self) -> bool {
    self.operators.is_empty()
  }

  pub fn conjugate(&self) -> OperatorSum {
    OperatorSum {
      operators: self.operators.iter().map(Operator::conjugate).collect(),
    }
  }

  pub fn differentiate(&self, index: Index) -> OperatorSum {
    let mut out = Vec::new();
    for o in &self.operators {
      out.extend(o.differentiate(index).operators);
    }
    OperatorSum { operators: out }
  }

  pub fn substitute_indices(&self, map: &HashMap<Index, Index>) -> OperatorSum {
    OperatorSum {
      operators: self
        .operators
        .iter()
        .map(|o| o.substitute_indices(map))
        .collect(),
    }
  }

  /// Drop every term whose dimension exceeds `max`.
  pub fn filter_dimension(&self, max: impl Into<Rational64>) -> OperatorSum {
    let max = max.into();
    OperatorSum {
      operators: self
        .operators
        .iter()
        .filter(|o| o.dimension() <= max)
        .cloned()
        .collect(),
    }
  }

  pub fn mentions_tensor(&self, name: &str) -> bool {
    self.operators.iter().any(|o| o.mentions_tensor(name))
  }
}

impl From<Tensor> for Operator {
  fn from(tensor: Tensor) -> Operator {
    Operator {
      coefficient: Coefficient::one(),
      tensors: vec![tensor],
    }
  }
}

impl From<Operator> for OperatorSum {
  fn from(operator: Operator) -> OperatorSum {
    OperatorSum {
      operators: vec![operator],
    }
  }
}

impl From<Tensor> for OperatorSum {
  fn from(tensor: Tensor) -> OperatorSum {
    OperatorSum::from(Operator::from(tensor))
  }
}

impl Mul for Tensor {
  type Output = Operator;

  fn mul(self, rhs: Tensor) -> Operator {
    Operator {
      coefficient: Coefficient::one(),
      tensors: vec![self, rhs],
    }
  }
}

impl Mul<Operator> for Tensor {
  type Output = Operator;

  fn mul(self, mut rhs: Operator) -> Operator {
    rhs.tensors.insert(0, self);
    rhs
  }
}

impl Mul<Tensor> for Operator {
  type Output = Operator;

  fn mul(mut self, rhs: Tensor) -> Operator {
    self.tensors.push(rhs);
    self
  }
}

impl Mul for Operator {
  type Output = Operator;

  fn mul(mut self, mut rhs: Operator) -> Operator {
    self.coefficient = self.coefficient * rhs.coefficient;
    self.tensors.append(&mut rhs.tensors);
    self
  }
}

impl Mul<OperatorSum> for Operator {
  type Output = OperatorSum;

  fn mul(self, rhs: OperatorSum) -> OperatorSum {
    OperatorSum {
      operators: rhs
        .operators
        .into_iter()
        .map(|o| self.clone() * o)
        .collect(),
    }
  }
}

impl Mul<Operator> for OperatorSum {
  type Output = OperatorSum;

  fn mul(self, rhs: Operator) -> OperatorSum {
    OperatorSum {
      operators: self
        .operators
        .into_iter()
        .map(|o| o * rhs.clone())
        .collect(),
    }
  }
}

impl Mul for OperatorSum {
  type Output = OperatorSum;

  fn mul(self, rhs: OperatorSum) -> OperatorSum {
    let mut operators =
      Vec::with_capacity(self.operators.len() * rhs.operators.len());
    for a in &self.operators {
      for b in &rhs.operators {
        operators.push(a.clone() * b.clone());
      }
    }
    OperatorSum { operators }
  }
}

macro_rules! impl_scalar_mul {
  ($($scalar:ty),*) => {
    $(
      impl Mul<Tensor> for $scalar {
        type Output = Operator;

        fn mul(self, rhs: Tensor) -> Operator {
          Operator {
            coefficient: Coefficient::from(self),
            tensors: vec![rhs],
          }
        }
      }

      impl Mul<Operator> for $scalar {
        type Output = Operator;

        fn mul(self, mut rhs: Operator) -> Operator {
          rhs.coefficient = rhs.coefficient * Coefficient::from(self);
          rhs
        }
      }

      impl Mul<OperatorSum> for $scalar {
        type Output = OperatorSum;

        fn mul(self, rhs: OperatorSum) -> OperatorSum {
          OperatorSum {
            operators: rhs.operators.into_iter().map(|o| self * o).collect(),
          }
        }
      }
    )*
  };
}

impl_scalar_mul!(i64, Rational64, Coefficient);

impl Neg for Tensor {
  type Output = Operator;

  fn neg(self) -> Operator {
    Operator {
      coefficient: -Coefficient::one(),
      tensors: vec![self],
    }
  }
}

impl Neg for Operator {
  type Output = Operator;

  fn neg(mut self) -> Operator {
    self.coefficient = -self.coefficient;
    self
  }
}

impl Neg for OperatorSum {
  type Output = OperatorSum;

  fn neg(self) -> OperatorSum {
    OperatorSum {
      operators: self.operators.into_iter().map(Operator::neg).collect(),
    }
  }
}

impl Add for Operator {
  type Output = OperatorSum;

  fn add(self, rhs: Operator) -> OperatorSum {
    OperatorSum {
      operators: vec![self, rhs],
    }
  }
}

impl Add<OperatorSum> for Operator {
  type Output = OperatorSum;

  fn add(self, mut rhs: OperatorSum) -> OperatorSum {
    rhs.operators.insert(0, self);
    rhs
  }
}

impl Add<Operator> for OperatorSum {
  type Output = OperatorSum;

  fn add(mut self, rhs: Operator) -> OperatorSum {
    self.operators.push(rhs);
    self
  }
}

impl Add for OperatorSum {
  type Output = OperatorSum;

  fn add(mut self, mut rhs: OperatorSum) -> OperatorSum {
    self.operators.append(&mut rhs.operators);
    self
  }
}

impl Sub for Operator {
  type Output = OperatorSum;

  fn sub(self, rhs: Operator) -> OperatorSum {
    self + (-rhs)
  }
}

impl Sub<OperatorSum> for Operator {
  type Output = OperatorSum;

  fn sub(self, rhs: OperatorSum) -> OperatorSum {
    self + (-rhs)
  }
}

impl Sub<Operator> for OperatorSum {
  type Output = OperatorSum;

  fn sub(self, rhs: Operator) -> OperatorSum {
    self + (-rhs)
  }
}

impl Sub for OperatorSum {
  type Output = OperatorSum;

  fn sub(self, rhs: OperatorSum) -> OperatorSum {
    self + (-rhs)
  }
}

impl std::fmt::Display for Operator {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.tensors.is_empty() {
      return write!(f, "{}", self.coefficient);
    }
    let product = self
      .tensors
      .iter()
      .map(|t| t.to_string())
      .collect::<Vec<_>>()
      .join(" * ");
    if self.coefficient.is_one() {
      write!(f, "{product}")
    } else if self.coefficient == -Coefficient::one() {
      write!(f, "-{product}")
    } else {
      write!(f, "{} * {product}", self.coefficient)
    }
  }
}

impl std::fmt::Display for OperatorSum {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.operators.is_empty() {
      return write!(f, "0");
    }
    write!(f, "{}", self.operators[0])?;
    for o in &self.operators[1..] {
      if o.coefficient.is_negative_real() {
        write!(f, " - {}", o.scaled(-1))?;
      } else {
        write!(f, " + {o}")?;
      }
    }
    Ok(())
  }
}
