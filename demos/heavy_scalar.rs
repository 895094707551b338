//! Integrates a heavy scalar out of a toy scalar model and prints the
//! effective Lagrangian at two different dimension bounds.

use anyhow::Result;
use reweft::{
  integrate_out, ConstantBuilder, FieldBuilder, HeavyField, Index,
  OperatorSum, Statistics,
};

fn main() -> Result<()> {
  let phi = FieldBuilder::new("phi", 1, Statistics::Boson).real();
  let s = FieldBuilder::new("S", 1, Statistics::Boson).real();
  let g = ConstantBuilder::new("g");
  let m = ConstantBuilder::mass_scalar("M");
  let (i, j, a) = (Index::new("i"), Index::new("j"), Index::new("a"));

  let interaction = OperatorSum::from(
    -(g.of(&[a]) * phi.of(&[i]) * phi.of(&[j]) * s.of(&[i, j, a])),
  );
  println!("interaction lagrangian:");
  println!("  {interaction}");
  println!();

  let heavy = HeavyField::real_scalar(s.of(&[i, j, a]), m.of(&[a]));
  println!("quadratic lagrangian of {}:", heavy.name());
  println!("  {}", heavy.quadratic_lagrangian());
  println!();

  for max_dimension in [4, 6] {
    let effective =
      integrate_out(&interaction, &[heavy.clone()], max_dimension)?;
    println!("effective lagrangian up to dimension {max_dimension}:");
    for term in effective.operators() {
      println!("  {term}");
    }
    println!();
  }

  Ok(())
}
