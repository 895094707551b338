use num_rational::Rational64;
use reweft::{
  d, equivalent_sums, inverse, merge_mass_factors_in, op, solve_field,
  substitute_field, ConstantBuilder, EquationError, EquationSolution,
  FieldBuilder, Index, OperatorSum, Statistics, System,
};

mod eom_tests {
  use super::*;

  fn boson(name: &str) -> FieldBuilder {
    FieldBuilder::new(name, 1, Statistics::Boson).real()
  }

  mod inverses {
    use super::*;

    #[test]
    fn mass_exponents_flip() {
      let m = ConstantBuilder::mass_scalar("M");
      let a = Index::new("a");
      assert_eq!(
        inverse(&m.of(&[a]).powered(2)),
        Some(m.of(&[a]).powered(-2))
      );
      assert_eq!(inverse(&m.of(&[a])), Some(m.of(&[a]).powered(-1)));
    }

    #[test]
    fn epsilons_invert_to_their_partners() {
      let i = Index::new("i");
      let j = Index::new("j");
      let up = ConstantBuilder::epsilon_up("eps").of(&[i, j]);
      let down = ConstantBuilder::epsilon_down("eps").of(&[i, j]);
      assert_eq!(inverse(&up), Some(down.clone()));
      assert_eq!(inverse(&down), Some(up));
    }

    #[test]
    fn fields_and_plain_constants_have_no_inverse() {
      let phi = boson("phi");
      let g = ConstantBuilder::new("g");
      let i = Index::new("i");
      assert_eq!(inverse(&phi.of(&[i])), None);
      assert_eq!(inverse(&g.of(&[i])), None);
    }
  }

  mod merging {
    use super::*;

    #[test]
    fn opposite_powers_cancel() {
      let m = ConstantBuilder::mass_scalar("M");
      let a = Index::new("a");
      let term = op(vec![
        m.of(&[a]).powered(2),
        m.of(&[a]).powered(-2),
        m.of(&[a]).powered(-2),
      ]);
      let merged = merge_mass_factors_in(&term);
      assert_eq!(merged.tensors(), &[m.of(&[a]).powered(-2)]);
    }

    #[test]
    fn repeated_scalar_masses_accumulate() {
      let m = ConstantBuilder::mass_scalar("M");
      let a = Index::new("a");
      let term = op(vec![m.of(&[a]), m.of(&[a]), m.of(&[a])]);
      let merged = merge_mass_factors_in(&term);
      assert_eq!(merged.tensors(), &[m.of(&[a]).powered(3)]);
    }

    #[test]
    fn matrix_masses_chain_along_a_shared_index() {
      let m = ConstantBuilder::mass_matrix("M");
      let a = Index::new("a");
      let b = Index::new("b");
      let x = Index::new("x");
      let term = op(vec![m.of(&[a, x]), m.of(&[x, b])]);
      let merged = merge_mass_factors_in(&term);
      assert_eq!(merged.tensors(), &[m.of(&[a, b]).powered(2)]);
    }

    #[test]
    fn longer_matrix_chains_collapse_end_to_end() {
      let m = ConstantBuilder::mass_matrix("M");
      let a = Index::new("a");
      let b = Index::new("b");
      let x = Index::new("x");
      let y = Index::new("y");
      let term = op(vec![m.of(&[a, x]), m.of(&[x, y]), m.of(&[y, b])]);
      let merged = merge_mass_factors_in(&term);
      assert_eq!(merged.tensors(), &[m.of(&[a, b]).powered(3)]);
    }

    #[test]
    fn a_vanishing_matrix_power_identifies_its_outer_indices() {
      let m = ConstantBuilder::mass_matrix("M");
      let phi = boson("phi");
      let a = Index::new("a");
      let b = Index::new("b");
      let x = Index::new("x");
      let term = op(vec![
        m.of(&[a, x]).powered(2),
        m.of(&[x, b]).powered(-2),
        phi.of(&[b]),
      ]);
      let merged = merge_mass_factors_in(&term);
      assert_eq!(merged.tensors(), &[phi.of(&[a])]);
    }

    #[test]
    fn traces_are_left_alone() {
      let m = ConstantBuilder::mass_matrix("M");
      let x = Index::new("x");
      let y = Index::new("y");
      let term = op(vec![m.of(&[x, y]), m.of(&[y, x])]);
      assert_eq!(merge_mass_factors_in(&term).tensors().len(), 2);
    }

    #[test]
    fn distinct_masses_are_left_alone() {
      let m = ConstantBuilder::mass_scalar("M");
      let n = ConstantBuilder::mass_scalar("N");
      let a = Index::new("a");
      let b = Index::new("b");
      let mixed = op(vec![m.of(&[a]), n.of(&[a])]);
      assert_eq!(merge_mass_factors_in(&mixed).tensors().len(), 2);
      let flavors = op(vec![m.of(&[a]), m.of(&[b])]);
      assert_eq!(merge_mass_factors_in(&flavors).tensors().len(), 2);
    }
  }

  mod substitution {
    use super::*;

    #[test]
    fn template_indices_are_renamed_to_each_occurrence() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let h = ConstantBuilder::new("h");
      let phi = boson("phi");
      let g = ConstantBuilder::new("g");
      let (i, j, a, b) = (
        Index::new("i"),
        Index::new("j"),
        Index::new("a"),
        Index::new("b"),
      );
      let target = OperatorSum::from(h.of(&[a, b]) * s.of(&[a, b]));
      let replacement =
        OperatorSum::from(g.of(&[]) * phi.of(&[i]) * phi.of(&[j]));
      let substituted = substitute_field(&target, &s.of(&[i, j]), &replacement);
      let expected = OperatorSum::from(
        h.of(&[a, b]) * g.of(&[]) * phi.of(&[a]) * phi.of(&[b]),
      );
      assert!(equivalent_sums(&substituted, &expected));
    }

    #[test]
    fn replacement_dummies_stay_out_of_the_surrounding_term() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let phi = boson("phi");
      let i = Index::new("i");
      let k = Index::new("k");
      let target = OperatorSum::from(phi.of(&[k]) * s.of(&[k]));
      let replacement =
        OperatorSum::from(phi.of(&[i]) * phi.of(&[k]) * phi.of(&[k]));
      let substituted = substitute_field(&target, &s.of(&[i]), &replacement);
      assert_eq!(substituted.len(), 1);
      // The dummy k of the replacement must not be captured by the k that
      // is already contracted against the occurrence.
      let mults = substituted.operators()[0].index_multiplicities();
      assert_eq!(mults[&k], 2);
      assert!(mults.values().all(|&n| n == 2));
    }

    #[test]
    fn derivatives_distribute_over_the_replacement() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let phi = boson("phi");
      let g = ConstantBuilder::new("g");
      let (i, k, c, mu) = (
        Index::new("i"),
        Index::new("k"),
        Index::new("c"),
        Index::new("mu"),
      );
      let target = OperatorSum::from(op(vec![d(mu, s.of(&[c]))]));
      let replacement = OperatorSum::from(
        g.of(&[]) * phi.of(&[i]) * phi.of(&[k]) * phi.of(&[k]),
      );
      let substituted = substitute_field(&target, &s.of(&[i]), &replacement);
      assert_eq!(substituted.len(), 3);
      let expected = d(
        mu,
        &OperatorSum::from(
          g.of(&[]) * phi.of(&[c]) * phi.of(&[k]) * phi.of(&[k]),
        ),
      );
      assert!(equivalent_sums(&substituted, &expected));
    }

    #[test]
    fn self_referential_replacements_expand_one_level_per_call() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let g = ConstantBuilder::new("g");
      let target = OperatorSum::from(op(vec![s.of(&[])]));
      let replacement = OperatorSum::from(g.of(&[]) * s.of(&[]));
      let once = substitute_field(&target, &s.of(&[]), &replacement);
      assert_eq!(once.len(), 1);
      assert_eq!(once.operators()[0].tensors().len(), 2);
      assert!(once.mentions_tensor("S"));
      let twice = substitute_field(&once, &s.of(&[]), &replacement);
      assert_eq!(twice.operators()[0].tensors().len(), 3);
    }

    #[test]
    fn an_empty_replacement_deletes_occurrences() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let phi = boson("phi");
      let i = Index::new("i");
      let target =
        op(vec![s.of(&[])]) + phi.of(&[i]) * phi.of(&[i]);
      let substituted =
        substitute_field(&target, &s.of(&[]), &OperatorSum::default());
      assert_eq!(substituted.len(), 1);
      assert!(!substituted.mentions_tensor("S"));
    }
  }

  mod solving {
    use super::*;

    #[test]
    fn a_heavy_scalar_solves_to_its_source() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let m = ConstantBuilder::mass_scalar("M");
      let phi = boson("phi");
      let b = Index::new("b");
      let varied =
        -(m.of(&[b]).powered(2) * s.of(&[b])) - op(vec![phi.of(&[b])]);
      let solution = solve_field(&varied, &s.of(&[b])).unwrap();
      assert_eq!(solution.field, s.of(&[b]));
      let expected =
        OperatorSum::from(-(m.of(&[b]).powered(-2) * phi.of(&[b])));
      assert!(equivalent_sums(&solution.replacement, &expected));
    }

    #[test]
    fn duplicated_quadratic_terms_collect_before_solving() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let m = ConstantBuilder::mass_scalar("M");
      let b = Index::new("b");
      let half =
        Rational64::new(-1, 2) * (m.of(&[b]).powered(2) * s.of(&[b]));
      let varied = half.clone() + half;
      let solution = solve_field(&varied, &s.of(&[b])).unwrap();
      assert!(solution.replacement.is_empty());
    }

    #[test]
    fn matrix_masses_solve_across_their_indices() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let m = ConstantBuilder::mass_matrix("M");
      let phi = boson("phi");
      let b = Index::new("b");
      let x = Index::new("x");
      let varied =
        -(m.of(&[b, x]).powered(2) * s.of(&[x])) - op(vec![phi.of(&[b])]);
      let solution = solve_field(&varied, &s.of(&[x])).unwrap();
      assert_eq!(solution.field, s.of(&[x]));
      let expected =
        OperatorSum::from(-(m.of(&[b, x]).powered(-2) * phi.of(&[b])));
      assert!(equivalent_sums(&solution.replacement, &expected));
    }

    #[test]
    fn a_variation_without_a_linear_term_is_an_error() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let b = Index::new("b");
      let mu = Index::new("mu");
      let varied = OperatorSum::from(op(vec![d(mu, s.of(&[b]))]));
      let result = solve_field(&varied, &s.of(&[b]));
      assert!(matches!(result, Err(EquationError::NoLinearTerm { .. })));
    }

    #[test]
    fn non_invertible_prefactors_disqualify_a_term() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let phi = boson("phi");
      let b = Index::new("b");
      let varied = OperatorSum::from(phi.of(&[b]) * s.of(&[b]));
      let result = solve_field(&varied, &s.of(&[b]));
      assert!(matches!(result, Err(EquationError::NoLinearTerm { .. })));
    }

    #[test]
    fn two_separate_linear_terms_are_an_error() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let m = ConstantBuilder::mass_scalar("M");
      let n = ConstantBuilder::mass_scalar("N");
      let b = Index::new("b");
      let varied =
        -(m.of(&[b]).powered(2) * s.of(&[b])) - n.of(&[b]) * s.of(&[b]);
      let result = solve_field(&varied, &s.of(&[b]));
      assert!(matches!(
        result,
        Err(EquationError::MultipleLinearTerms { .. })
      ));
    }
  }

  mod systems {
    use super::*;

    #[test]
    fn solutions_are_substituted_into_each_other_until_settled() {
      let s1 = FieldBuilder::new("S1", 1, Statistics::Boson).real();
      let s2 = FieldBuilder::new("S2", 1, Statistics::Boson).real();
      let phi = boson("phi");
      let system = System {
        solutions: vec![
          EquationSolution {
            field: s1.of(&[]),
            replacement: OperatorSum::from(phi.of(&[]) * s2.of(&[])),
          },
          EquationSolution {
            field: s2.of(&[]),
            replacement: OperatorSum::from(op(vec![phi.of(&[])])),
          },
        ],
        max_dimension: Rational64::from_integer(4),
      };
      let solved = system.solve().unwrap();
      assert!(!solved[0].replacement.mentions_tensor("S2"));
      let expected = OperatorSum::from(phi.of(&[]) * phi.of(&[]));
      assert!(equivalent_sums(&solved[0].replacement, &expected));
    }

    #[test]
    fn a_system_that_never_settles_is_an_error() {
      let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
      let system = System {
        solutions: vec![EquationSolution {
          field: s.of(&[]),
          replacement: OperatorSum::from(op(vec![s.of(&[])])),
        }],
        max_dimension: Rational64::from_integer(2),
      };
      let result = system.solve();
      assert!(matches!(result, Err(EquationError::NoFixedPoint { .. })));
    }
  }
}
