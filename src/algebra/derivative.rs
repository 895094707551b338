//! The spacetime derivative as one generic entry point.
//!
//! `d(mu, x)` works on a single tensor (prepending the derivative index) and
//! on whole operators and sums (applying the Leibniz rule term by term).

use crate::algebra::index::Index;
use crate::algebra::operator::{Operator, OperatorSum};
use crate::algebra::tensor::Tensor;

pub trait Differentiate {
  type Output;

  fn differentiate(self, index: Index) -> Self::Output;
}

impl Differentiate for Tensor {
  type Output = Tensor;

  fn differentiate(self, index: Index) -> Tensor {
    self.with_derivative(index)
  }
}

impl Differentiate for &Tensor {
  type Output = Tensor;

  fn differentiate(self, index: Index) -> Tensor {
    self.with_derivative(index)
  }
}

impl Differentiate for &Operator {
  type Output = OperatorSum;

  fn differentiate(self, index: Index) -> OperatorSum {
    Operator::differentiate(self, index)
  }
}

impl Differentiate for &OperatorSum {
  type Output = OperatorSum;

  fn differentiate(self, index: Index) -> OperatorSum {
    OperatorSum::differentiate(self, index)
  }
}

/// Apply one derivative with the given spacetime index.
pub fn d<T: Differentiate>(index: Index, x: T) -> T::Output {
  x.differentiate(index)
}
