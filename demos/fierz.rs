//! Rewrites sigma-matrix contractions with a Fierz-style identity, along
//! both contraction patterns of a four-point structure, and solves the
//! identity backwards for one of its delta terms.

use anyhow::Result;
use reweft::{
  equivalent_sums, ConstantBuilder, Identity, Index, OperatorSum,
};

fn main() -> Result<()> {
  let sigma = ConstantBuilder::new("sigma");
  let delta = ConstantBuilder::new("delta");
  let (cap_k, i, j, k, l) = (
    Index::new("K"),
    Index::new("i"),
    Index::new("j"),
    Index::new("k"),
    Index::new("l"),
  );

  let identity = Identity::equals(
    sigma.of(&[cap_k, i, j]) * sigma.of(&[cap_k, k, l]),
    2 * (delta.of(&[i, l]) * delta.of(&[k, j]))
      - delta.of(&[i, j]) * delta.of(&[k, l]),
  );
  let rules = identity.rules();
  println!("the identity yields {} rewriting rules", rules.len());
  println!();

  let cap_i = Index::new("I");
  let (a, b, c, e) = (
    Index::new("a"),
    Index::new("b"),
    Index::new("c"),
    Index::new("e"),
  );

  let direct =
    OperatorSum::from(sigma.of(&[cap_i, a, b]) * sigma.of(&[cap_i, c, e]));
  println!("direct contraction:");
  println!("  {direct}");
  println!("  -> {}", rules[0].apply(&direct));
  let expected = 2 * (delta.of(&[a, e]) * delta.of(&[c, b]))
    - delta.of(&[a, b]) * delta.of(&[c, e]);
  println!(
    "  matches the hand expansion: {}",
    equivalent_sums(&rules[0].apply(&direct), &expected)
  );
  println!();

  let crossed =
    OperatorSum::from(sigma.of(&[cap_i, a, c]) * sigma.of(&[cap_i, e, b]));
  println!("crossed contraction:");
  println!("  {crossed}");
  println!("  -> {}", rules[0].apply(&crossed));
  println!();

  // Solving the identity for its first right-hand term reintroduces the
  // sigma pair with a fresh contraction index.
  let deltas = OperatorSum::from(2 * (delta.of(&[a, e]) * delta.of(&[c, b])));
  println!("solving backwards for the leading delta pair:");
  println!("  {deltas}");
  println!("  -> {}", rules[1].apply(&deltas));

  Ok(())
}
