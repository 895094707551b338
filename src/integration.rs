//! The driver that eliminates heavy fields from a Lagrangian.

use num_rational::Rational64;

use crate::algebra::{d, Index, OperatorSum, Tensor};
use crate::collect::collect;
use crate::eom::{round_bound, solve_field, System};
use crate::invertibles::merge_mass_factors;
use crate::variation::variation;
use crate::EquationError;

#[derive(Debug, Clone, Copy)]
enum HeavyKind {
  RealScalar,
  ComplexScalar,
  DiracFermion,
}

/// One heavy degree of freedom to integrate out: the field template, its
/// mass factor, and the standard quadratic Lagrangian implied by its kind.
#[derive(Debug, Clone)]
pub struct HeavyField {
  field: Tensor,
  mass: Tensor,
  kind: HeavyKind,
  extra_quadratic: OperatorSum,
}

impl HeavyField {
  /// A real scalar with `(1/2) (dPhi)^2 - (1/2) M^2 Phi Phi`. The field
  /// tensor should be built real, so that it is its own conjugate.
  pub fn real_scalar(field: Tensor, mass: Tensor) -> HeavyField {
    HeavyField {
      field,
      mass,
      kind: HeavyKind::RealScalar,
      extra_quadratic: OperatorSum::default(),
    }
  }

  /// A complex scalar with `(dPhi*)(dPhi) - M^2 Phi* Phi`.
  pub fn complex_scalar(field: Tensor, mass: Tensor) -> HeavyField {
    HeavyField {
      field,
      mass,
      kind: HeavyKind::ComplexScalar,
      extra_quadratic: OperatorSum::default(),
    }
  }

  /// A Dirac fermion with the mass term `- M Psi* Psi`. The kinetic term
  /// involves the caller's spinor structure, so it comes in through
  /// [`HeavyField::with_extra_quadratic_terms`] when needed.
  pub fn dirac_fermion(field: Tensor, mass: Tensor) -> HeavyField {
    HeavyField {
      field,
      mass,
      kind: HeavyKind::DiracFermion,
      extra_quadratic: OperatorSum::default(),
    }
  }

  /// Further quadratic terms to add alongside the standard ones.
  pub fn with_extra_quadratic_terms(
    mut self,
    terms: impl Into<OperatorSum>,
  ) -> HeavyField {
    self.extra_quadratic = self.extra_quadratic + terms.into();
    self
  }

  pub fn name(&self) -> &str {
    self.field.name()
  }

  /// The kinetic and mass terms for this field, plus any extra quadratic
  /// terms.
  pub fn quadratic_lagrangian(&self) -> OperatorSum {
    let mu = Index::new("mu");
    let standard = match self.kind {
      HeavyKind::RealScalar => {
        Rational64::new(1, 2)
          * (d(mu, self.field.clone()) * d(mu, self.field.clone()))
          + Rational64::new(-1, 2)
            * (self.mass.powered(2) * self.field.clone() * self.field.clone())
      }
      HeavyKind::ComplexScalar => {
        d(mu, self.field.conjugated()) * d(mu, self.field.clone())
          - self.mass.powered(2) * self.field.conjugated() * self.field.clone()
      }
      HeavyKind::DiracFermion => OperatorSum::from(
        -(self.mass.clone() * self.field.conjugated() * self.field.clone()),
      ),
    };
    standard + self.extra_quadratic.clone()
  }

  fn solve_targets(&self) -> Vec<Tensor> {
    match self.kind {
      HeavyKind::RealScalar => vec![self.field.clone()],
      HeavyKind::ComplexScalar | HeavyKind::DiracFermion => {
        vec![self.field.clone(), self.field.conjugated()]
      }
    }
  }
}

/// Integrate the heavy fields out of `lagrangian`, keeping effective
/// operators up to `max_dimension`.
///
/// The quadratic terms of every heavy field are added to the given
/// (interaction) Lagrangian first. Each heavy degree of freedom is then
/// isolated from the Euler-Lagrange equations, the coupled solutions are
/// iterated to a fixed point, and the settled solutions are substituted
/// back until no heavy-field name remains.
pub fn integrate_out(
  lagrangian: &OperatorSum,
  heavy_fields: &[HeavyField],
  max_dimension: impl Into<Rational64>,
) -> Result<OperatorSum, EquationError> {
  let max_dimension = max_dimension.into();
  let mut full = lagrangian.clone();
  for heavy in heavy_fields {
    full = full + heavy.quadratic_lagrangian();
  }

  let mut raw = Vec::new();
  for heavy in heavy_fields {
    for target in heavy.solve_targets() {
      let template = with_fresh_indices(&target.conjugated());
      let varied = variation(&full, &template);
      raw.push(solve_field(&varied, &target)?);
    }
  }
  let solutions = System {
    solutions: raw,
    max_dimension,
  }
  .solve()?;

  let rounds = round_bound(max_dimension);
  let mut effective = full;
  for _ in 0..=rounds {
    let bounded = effective.filter_dimension(max_dimension);
    effective = collect(&merge_mass_factors(&bounded));
    if solutions
      .iter()
      .all(|s| !effective.mentions_tensor(s.field.name()))
    {
      return Ok(effective);
    }
    for solution in &solutions {
      effective = solution.substitute_into(&effective);
    }
  }
  Err(EquationError::NoFixedPoint {
    context: "effective lagrangian".to_string(),
    rounds,
  })
}

/// The same tensor with every ordinary index replaced by a fresh one, for
/// use as a variation template that cannot collide with indices already in
/// the Lagrangian.
fn with_fresh_indices(tensor: &Tensor) -> Tensor {
  let map = tensor
    .indices()
    .iter()
    .map(|&idx| (idx, Index::fresh()))
    .collect();
  tensor.substitute_indices(&map)
}
