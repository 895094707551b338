use num_rational::Rational64;
use reweft::{
  equivalent_sums, integrate_out, ConstantBuilder, FieldBuilder, HeavyField,
  Index, OperatorSum, Statistics,
};

mod integration_tests {
  use super::*;

  #[test]
  fn a_heavy_real_scalar_leaves_a_four_point_contact_term() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
    let g = ConstantBuilder::new("g");
    let m = ConstantBuilder::mass_scalar("M");
    let (i, j, a) = (Index::new("i"), Index::new("j"), Index::new("a"));

    let interaction = OperatorSum::from(-(g.of(&[a])
      * phi.of(&[i])
      * phi.of(&[j])
      * s.of(&[i, j, a])));
    let heavy = HeavyField::real_scalar(s.of(&[i, j, a]), m.of(&[a]));

    let effective = integrate_out(&interaction, &[heavy], 4).unwrap();
    assert!(!effective.mentions_tensor("S"));

    let expected = OperatorSum::from(
      Rational64::new(1, 2)
        * (g.of(&[a])
          * g.of(&[a])
          * m.of(&[a]).powered(-2)
          * phi.of(&[i])
          * phi.of(&[i])
          * phi.of(&[j])
          * phi.of(&[j])),
    );
    assert!(equivalent_sums(&effective, &expected));
  }

  #[test]
  fn raising_the_dimension_bound_keeps_derivative_operators() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
    let g = ConstantBuilder::new("g");
    let m = ConstantBuilder::mass_scalar("M");
    let (i, j, a) = (Index::new("i"), Index::new("j"), Index::new("a"));

    let interaction = OperatorSum::from(-(g.of(&[a])
      * phi.of(&[i])
      * phi.of(&[j])
      * s.of(&[i, j, a])));
    let heavy = HeavyField::real_scalar(s.of(&[i, j, a]), m.of(&[a]));

    let effective = integrate_out(&interaction, &[heavy], 6).unwrap();
    assert!(!effective.mentions_tensor("S"));
    assert!(!effective.is_empty());
    assert!(effective.len() > 1);
  }

  #[test]
  fn a_heavy_complex_scalar_counts_both_charge_flows() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let heavy_phi = FieldBuilder::new("Phi", 1, Statistics::Boson);
    let g = ConstantBuilder::new("g");
    let m = ConstantBuilder::mass_scalar("M");
    let i = Index::new("i");
    let j = Index::new("j");

    let interaction = -(g.of(&[]) * phi.of(&[i]) * phi.of(&[i])
      * heavy_phi.of(&[]))
      - g.of(&[])
        * phi.of(&[i])
        * phi.of(&[i])
        * heavy_phi.of(&[]).conjugated();
    let heavy = HeavyField::complex_scalar(heavy_phi.of(&[]), m.of(&[]));

    let effective = integrate_out(&interaction, &[heavy], 4).unwrap();
    assert!(!effective.mentions_tensor("Phi"));

    let expected = OperatorSum::from(
      g.of(&[])
        * g.of(&[])
        * m.of(&[]).powered(-2)
        * phi.of(&[i])
        * phi.of(&[i])
        * phi.of(&[j])
        * phi.of(&[j]),
    );
    assert!(equivalent_sums(&effective, &expected));
  }

  #[test]
  fn a_heavy_dirac_fermion_leaves_a_yukawa_squared_operator() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let chi =
      FieldBuilder::new("chi", Rational64::new(3, 2), Statistics::Fermion);
    let psi =
      FieldBuilder::new("Psi", Rational64::new(3, 2), Statistics::Fermion);
    let y = ConstantBuilder::new("y");
    let m = ConstantBuilder::mass_scalar("M");

    let interaction = -(y.of(&[])
      * phi.of(&[])
      * chi.of(&[]).conjugated()
      * psi.of(&[]))
      - y.of(&[]) * phi.of(&[]) * psi.of(&[]).conjugated() * chi.of(&[]);
    let heavy = HeavyField::dirac_fermion(psi.of(&[]), m.of(&[]));

    let effective = integrate_out(&interaction, &[heavy], 6).unwrap();
    assert!(!effective.mentions_tensor("Psi"));

    let expected = OperatorSum::from(
      y.of(&[])
        * y.of(&[])
        * m.of(&[]).powered(-1)
        * phi.of(&[])
        * phi.of(&[])
        * chi.of(&[]).conjugated()
        * chi.of(&[]),
    );
    assert!(equivalent_sums(&effective, &expected));
  }

  #[test]
  fn self_couplings_of_the_heavy_field_still_terminate() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
    let g = ConstantBuilder::new("g");
    let lambda = ConstantBuilder::new("lambda");
    let m = ConstantBuilder::mass_scalar("M");
    let i = Index::new("i");

    let interaction = -(g.of(&[]) * phi.of(&[i]) * phi.of(&[i]) * s.of(&[]))
      - lambda.of(&[]) * s.of(&[]) * s.of(&[]) * s.of(&[]);
    let heavy = HeavyField::real_scalar(s.of(&[]), m.of(&[]));

    let effective = integrate_out(&interaction, &[heavy], 4).unwrap();
    assert!(!effective.mentions_tensor("S"));
    assert!(!effective.is_empty());
  }

  #[test]
  fn two_heavy_scalars_with_a_heavy_mixing_decouple_at_low_dimension() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let s1 = FieldBuilder::new("S1", 1, Statistics::Boson).real();
    let s2 = FieldBuilder::new("S2", 1, Statistics::Boson).real();
    let g = ConstantBuilder::new("g");
    let c = ConstantBuilder::new("c").dimension(2);
    let m1 = ConstantBuilder::mass_scalar("M1");
    let m2 = ConstantBuilder::mass_scalar("M2");
    let i = Index::new("i");
    let j = Index::new("j");

    let interaction = -(g.of(&[]) * phi.of(&[i]) * phi.of(&[i]) * s1.of(&[]))
      - c.of(&[]) * s1.of(&[]) * s2.of(&[]);
    let heavies = [
      HeavyField::real_scalar(s1.of(&[]), m1.of(&[])),
      HeavyField::real_scalar(s2.of(&[]), m2.of(&[])),
    ];

    let effective = integrate_out(&interaction, &heavies, 4).unwrap();
    assert!(!effective.mentions_tensor("S1"));
    assert!(!effective.mentions_tensor("S2"));

    // The mixing needs two heavy propagators, so it first shows up beyond
    // dimension four.
    let expected = OperatorSum::from(
      Rational64::new(1, 2)
        * (g.of(&[])
          * g.of(&[])
          * m1.of(&[]).powered(-2)
          * phi.of(&[i])
          * phi.of(&[i])
          * phi.of(&[j])
          * phi.of(&[j])),
    );
    assert!(equivalent_sums(&effective, &expected));
  }

  #[test]
  fn extra_quadratic_terms_replace_the_built_in_mass() {
    let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
    let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
    let g = ConstantBuilder::new("g");
    let m = ConstantBuilder::mass_scalar("M");
    let n = ConstantBuilder::mass_scalar("N");
    let i = Index::new("i");
    let j = Index::new("j");

    let interaction =
      OperatorSum::from(-(g.of(&[]) * phi.of(&[i]) * phi.of(&[i]) * s.of(&[])));
    let swap = Rational64::new(1, 2)
      * (m.of(&[]).powered(2) * s.of(&[]) * s.of(&[]))
      - Rational64::new(1, 2) * (n.of(&[]).powered(2) * s.of(&[]) * s.of(&[]));
    let heavy = HeavyField::real_scalar(s.of(&[]), m.of(&[]))
      .with_extra_quadratic_terms(swap);

    let effective = integrate_out(&interaction, &[heavy], 4).unwrap();
    assert!(!effective.mentions_tensor("S"));

    let expected = OperatorSum::from(
      Rational64::new(1, 2)
        * (g.of(&[])
          * g.of(&[])
          * n.of(&[]).powered(-2)
          * phi.of(&[i])
          * phi.of(&[i])
          * phi.of(&[j])
          * phi.of(&[j])),
    );
    assert!(equivalent_sums(&effective, &expected));
  }
}
