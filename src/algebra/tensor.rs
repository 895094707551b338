use std::collections::HashMap;
use std::fmt;

use num_rational::Rational64;
use num_traits::{One, Signed, Zero};

use crate::algebra::index::Index;

/// Exchange statistics: a tensor either commutes or anticommutes with its
/// own kind under the reordering bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistics {
  Boson,
  Fermion,
}

/// Behavior under permutations of the tensor's own ordinary index slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Symmetry {
  #[default]
  None,
  Symmetric,
  Antisymmetric,
}

/// What a tensor is. Everything except `Field` is a constant; the mass and
/// epsilon kinds are the constants equation solving knows how to invert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorKind {
  Field,
  Constant,
  MassMatrix,
  MassScalar,
  EpsilonUp,
  EpsilonDown,
}

impl TensorKind {
  pub fn is_constant(&self) -> bool {
    !matches!(self, TensorKind::Field)
  }

  pub fn is_invertible(&self) -> bool {
    matches!(
      self,
      TensorKind::MassMatrix
        | TensorKind::MassScalar
        | TensorKind::EpsilonUp
        | TensorKind::EpsilonDown
    )
  }
}

/// A named multi-index atom: a field or a constant, possibly conjugated,
/// possibly raised to a rational exponent, with any derivatives applied to it
/// recorded index-by-index (most recent prepended).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tensor {
  pub(crate) name: String,
  pub(crate) kind: TensorKind,
  pub(crate) statistics: Statistics,
  pub(crate) dimension: Rational64,
  pub(crate) symmetry: Symmetry,
  pub(crate) self_conjugate: bool,
  pub(crate) is_conjugated: bool,
  pub(crate) exponent: Option<Rational64>,
  pub(crate) derivative_indices: Vec<Index>,
  pub(crate) indices: Vec<Index>,
}

impl Tensor {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> TensorKind {
    self.kind
  }

  pub fn statistics(&self) -> Statistics {
    self.statistics
  }

  pub fn dimension(&self) -> Rational64 {
    self.dimension
  }

  pub fn symmetry(&self) -> Symmetry {
    self.symmetry
  }

  pub fn is_conjugated(&self) -> bool {
    self.is_conjugated
  }

  pub fn is_self_conjugate(&self) -> bool {
    self.self_conjugate
  }

  pub fn exponent(&self) -> Option<Rational64> {
    self.exponent
  }

  pub fn exponent_or_one(&self) -> Rational64 {
    self.exponent.unwrap_or_else(Rational64::one)
  }

  /// Ordinary (non-derivative) indices.
  pub fn indices(&self) -> &[Index] {
    &self.indices
  }

  pub fn derivative_indices(&self) -> &[Index] {
    &self.derivative_indices
  }

  /// All index slots: derivative indices first, then ordinary indices.
  pub fn total_indices(&self) -> impl Iterator<Item = Index> + '_ {
    self
      .derivative_indices
      .iter()
      .copied()
      .chain(self.indices.iter().copied())
  }

  /// Complex conjugate. Self-conjugate (real) tensors are fixed points.
  pub fn conjugated(&self) -> Tensor {
    let mut out = self.clone();
    if !out.self_conjugate {
      out.is_conjugated = !out.is_conjugated;
    }
    out
  }

  /// The same tensor raised to `exponent` (an exponent of one is stored as
  /// no exponent at all).
  pub fn powered(&self, exponent: impl Into<Rational64>) -> Tensor {
    let exponent = exponent.into();
    let mut out = self.clone();
    out.exponent = if exponent.is_one() {
      None
    } else {
      Some(exponent)
    };
    out
  }

  /// Prepend one derivative index.
  pub fn with_derivative(&self, index: Index) -> Tensor {
    let mut out = self.clone();
    out.derivative_indices.insert(0, index);
    out
  }

  /// Rewrite every index through `map`; unmapped indices stay.
  pub fn substitute_indices(&self, map: &HashMap<Index, Index>) -> Tensor {
    let mut out = self.clone();
    for idx in out
      .derivative_indices
      .iter_mut()
      .chain(out.indices.iter_mut())
    {
      if let Some(&to) = map.get(idx) {
        *idx = to;
      }
    }
    out
  }

  /// Whether this tensor is an occurrence of the given field template
  /// (same name and conjugation; indices do not participate).
  pub(crate) fn is_occurrence_of(&self, field: &Tensor) -> bool {
    self.kind == TensorKind::Field
      && self.name == field.name
      && self.is_conjugated == field.is_conjugated
  }
}

impl fmt::Display for Tensor {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for d in &self.derivative_indices {
      write!(f, "D({d})")?;
    }
    write!(f, "{}", self.name)?;
    if self.is_conjugated {
      write!(f, "*")?;
    }
    if !self.indices.is_empty() {
      let list = self
        .indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
      write!(f, "({list})")?;
    }
    if let Some(e) = self.exponent {
      if e.is_integer() && !e.is_negative() {
        write!(f, "^{e}")?;
      } else {
        write!(f, "^({e})")?;
      }
    }
    Ok(())
  }
}

/// Factory for the tensors of one field: fixed name, mass dimension, and
/// statistics; every call site supplies the indices.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
  name: String,
  dimension: Rational64,
  statistics: Statistics,
  self_conjugate: bool,
}

impl FieldBuilder {
  pub fn new(
    name: &str,
    dimension: impl Into<Rational64>,
    statistics: Statistics,
  ) -> Self {
    FieldBuilder {
      name: name.to_string(),
      dimension: dimension.into(),
      statistics,
      self_conjugate: false,
    }
  }

  /// Mark the field real: conjugation leaves its tensors untouched.
  pub fn real(mut self) -> Self {
    self.self_conjugate = true;
    self
  }

  pub fn of(&self, indices: &[Index]) -> Tensor {
    Tensor {
      name: self.name.clone(),
      kind: TensorKind::Field,
      statistics: self.statistics,
      dimension: self.dimension,
      symmetry: Symmetry::None,
      self_conjugate: self.self_conjugate,
      is_conjugated: false,
      exponent: None,
      derivative_indices: Vec::new(),
      indices: indices.to_vec(),
    }
  }
}

/// Factory for constant tensors: couplings, numerical invariants, masses,
/// epsilons. Constants default to dimension zero so the dimension ceiling
/// counts field and derivative content only.
#[derive(Debug, Clone)]
pub struct ConstantBuilder {
  name: String,
  kind: TensorKind,
  symmetry: Symmetry,
  dimension: Rational64,
  self_conjugate: bool,
}

impl ConstantBuilder {
  pub fn new(name: &str) -> Self {
    ConstantBuilder {
      name: name.to_string(),
      kind: TensorKind::Constant,
      symmetry: Symmetry::None,
      dimension: Rational64::zero(),
      self_conjugate: false,
    }
  }

  /// A diagonal mass factor: one flavor slot, mergeable and invertible.
  pub fn mass_scalar(name: &str) -> Self {
    ConstantBuilder {
      kind: TensorKind::MassScalar,
      self_conjugate: true,
      ..ConstantBuilder::new(name)
    }
  }

  /// A mass matrix: two flavor slots, chains merge by matrix multiplication.
  pub fn mass_matrix(name: &str) -> Self {
    ConstantBuilder {
      kind: TensorKind::MassMatrix,
      self_conjugate: true,
      ..ConstantBuilder::new(name)
    }
  }

  pub fn epsilon_up(name: &str) -> Self {
    ConstantBuilder {
      kind: TensorKind::EpsilonUp,
      symmetry: Symmetry::Antisymmetric,
      self_conjugate: true,
      ..ConstantBuilder::new(name)
    }
  }

  pub fn epsilon_down(name: &str) -> Self {
    ConstantBuilder {
      kind: TensorKind::EpsilonDown,
      symmetry: Symmetry::Antisymmetric,
      self_conjugate: true,
      ..ConstantBuilder::new(name)
    }
  }

  pub fn symmetric(mut self) -> Self {
    self.symmetry = Symmetry::Symmetric;
    self
  }

  pub fn antisymmetric(mut self) -> Self {
    self.symmetry = Symmetry::Antisymmetric;
    self
  }

  /// Mark the constant real: conjugation leaves its tensors untouched.
  pub fn real(mut self) -> Self {
    self.self_conjugate = true;
    self
  }

  pub fn dimension(mut self, dimension: impl Into<Rational64>) -> Self {
    self.dimension = dimension.into();
    self
  }

  pub fn of(&self, indices: &[Index]) -> Tensor {
    Tensor {
      name: self.name.clone(),
      kind: self.kind,
      statistics: Statistics::Boson,
      dimension: self.dimension,
      symmetry: self.symmetry,
      self_conjugate: self.self_conjugate,
      is_conjugated: false,
      exponent: None,
      derivative_indices: Vec::new(),
      indices: indices.to_vec(),
    }
  }
}
