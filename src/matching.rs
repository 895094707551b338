//! Structural matching of one operator inside another.
//!
//! [`match_operators`] enumerates every way the pattern's tensors can be
//! mapped onto a subset of the target's tensors, lazily: candidates are
//! produced one at a time by an odometer over per-shape-class injections and
//! per-tensor symmetry permutations, so a caller that needs only the first
//! match never pays for the rest.

use std::collections::HashMap;

use crate::algebra::{Index, Operator, Statistics, Symmetry, Tensor};

/// One way of locating the pattern inside the target.
#[derive(Debug, Clone)]
pub struct Match {
  /// For each pattern tensor position, the target tensor position it took.
  pub tensor_mapping: Vec<usize>,
  /// Pattern index to target index, as forced by the tensor pairing.
  pub index_mapping: HashMap<Index, Index>,
  /// Fermion reordering parity times antisymmetric permutation parities.
  pub sign: i64,
  /// Target tensors not consumed by the pattern, in their original order.
  pub rest: Vec<Tensor>,
}

/// Tensors that can stand in for each other in a match: everything equal
/// except the actual index values.
fn same_shape(a: &Tensor, b: &Tensor) -> bool {
  a.name() == b.name()
    && a.kind() == b.kind()
    && a.statistics() == b.statistics()
    && a.dimension() == b.dimension()
    && a.symmetry() == b.symmetry()
    && a.is_self_conjugate() == b.is_self_conjugate()
    && a.is_conjugated() == b.is_conjugated()
    && a.exponent() == b.exponent()
    && a.derivative_indices().len() == b.derivative_indices().len()
    && a.indices().len() == b.indices().len()
}

/// All pattern slots of one shape, with the odometer state choosing which
/// same-shape target slots they currently take: `combo` picks a subset of
/// `target_slots`, `perm` assigns the pattern slots onto it.
#[derive(Debug)]
struct Class {
  pattern_slots: Vec<usize>,
  target_slots: Vec<usize>,
  combo: Vec<usize>,
  perm: Vec<usize>,
}

/// Odometer state for one symmetric or antisymmetric pattern tensor: the
/// permutation currently applied to its own ordinary index positions.
#[derive(Debug)]
struct SymPerm {
  slot: usize,
  perm: Vec<usize>,
  antisymmetric: bool,
}

/// Lazy stream of [`Match`]es; see [`match_operators`].
pub struct Matches<'a> {
  pattern: &'a Operator,
  target: &'a Operator,
  classes: Vec<Class>,
  sym_perms: Vec<SymPerm>,
  pattern_mult: HashMap<Index, usize>,
  target_mult: HashMap<Index, usize>,
  fermion_rank: Vec<Option<usize>>,
  fermion_total: usize,
  started: bool,
  done: bool,
}

/// All ways `pattern` occurs inside `target`, as a lazy iterator.
///
/// The coefficients of both operators are ignored here; callers that care
/// (rule application) divide them out themselves.
pub fn match_operators<'a>(
  pattern: &'a Operator,
  target: &'a Operator,
) -> Matches<'a> {
  let mut classes: Vec<Class> = Vec::new();
  for (slot, t) in pattern.tensors().iter().enumerate() {
    let existing = classes
      .iter_mut()
      .find(|c| same_shape(&pattern.tensors()[c.pattern_slots[0]], t));
    match existing {
      Some(class) => class.pattern_slots.push(slot),
      None => classes.push(Class {
        pattern_slots: vec![slot],
        target_slots: Vec::new(),
        combo: Vec::new(),
        perm: Vec::new(),
      }),
    }
  }

  let mut done = false;
  for class in &mut classes {
    let representative = &pattern.tensors()[class.pattern_slots[0]];
    class.target_slots = target
      .tensors()
      .iter()
      .enumerate()
      .filter(|(_, t)| same_shape(representative, t))
      .map(|(slot, _)| slot)
      .collect();
    let k = class.pattern_slots.len();
    if k > class.target_slots.len() {
      done = true;
    }
    class.combo = (0..k).collect();
    class.perm = (0..k).collect();
  }

  let sym_perms = pattern
    .tensors()
    .iter()
    .enumerate()
    .filter(|(_, t)| t.symmetry() != Symmetry::None && t.indices().len() >= 2)
    .map(|(slot, t)| SymPerm {
      slot,
      perm: (0..t.indices().len()).collect(),
      antisymmetric: t.symmetry() == Symmetry::Antisymmetric,
    })
    .collect();

  let mut fermion_rank = Vec::with_capacity(pattern.tensors().len());
  let mut fermion_total = 0;
  for t in pattern.tensors() {
    if t.statistics() == Statistics::Fermion {
      fermion_rank.push(Some(fermion_total));
      fermion_total += 1;
    } else {
      fermion_rank.push(None);
    }
  }

  Matches {
    pattern,
    target,
    classes,
    sym_perms,
    pattern_mult: pattern.index_multiplicities(),
    target_mult: target.index_multiplicities(),
    fermion_rank,
    fermion_total,
    started: false,
    done,
  }
}

impl Matches<'_> {
  /// Step the odometer, rightmost digit first. Returns false once every
  /// combination has been visited.
  fn advance(&mut self) -> bool {
    for s in self.sym_perms.iter_mut().rev() {
      if next_permutation(&mut s.perm) {
        return true;
      }
    }
    for class in self.classes.iter_mut().rev() {
      if next_permutation(&mut class.perm) {
        return true;
      }
      if next_combination(&mut class.combo, class.target_slots.len()) {
        return true;
      }
    }
    false
  }

  /// Try to turn the current odometer position into an accepted match.
  fn build(&self) -> Option<Match> {
    let mut tensor_mapping = vec![0usize; self.pattern.tensors().len()];
    for class in &self.classes {
      for (i, &p_slot) in class.pattern_slots.iter().enumerate() {
        tensor_mapping[p_slot] = class.target_slots[class.combo[class.perm[i]]];
      }
    }

    // Walk the paired tensors positionally; a pattern index forced onto two
    // different target indices kills the candidate.
    let mut index_mapping: HashMap<Index, Index> = HashMap::new();
    for (p_slot, &t_slot) in tensor_mapping.iter().enumerate() {
      let p = &self.pattern.tensors()[p_slot];
      let t = &self.target.tensors()[t_slot];
      for (&pi, &ti) in
        p.derivative_indices().iter().zip(t.derivative_indices())
      {
        if *index_mapping.entry(pi).or_insert(ti) != ti {
          return None;
        }
      }
      let sym = self.sym_perms.iter().find(|s| s.slot == p_slot);
      for (k, &ti) in t.indices().iter().enumerate() {
        let pi = match sym {
          Some(s) => p.indices()[s.perm[k]],
          None => p.indices()[k],
        };
        if *index_mapping.entry(pi).or_insert(ti) != ti {
          return None;
        }
      }
    }

    // A free target index may only be taken by a free pattern index.
    for (pi, ti) in &index_mapping {
      let p_mult = self.pattern_mult.get(pi).copied().unwrap_or(0);
      let t_mult = self.target_mult.get(ti).copied().unwrap_or(0);
      if t_mult == 1 && p_mult != 1 {
        return None;
      }
    }

    // Two distinct pattern indices may collapse onto one target index only
    // if both are free in the pattern.
    let mut taken: HashMap<Index, Index> = HashMap::new();
    for (&pi, &ti) in &index_mapping {
      if let Some(&other) = taken.get(&ti) {
        if other != pi {
          let a = self.pattern_mult.get(&pi).copied().unwrap_or(0);
          let b = self.pattern_mult.get(&other).copied().unwrap_or(0);
          if a != 1 || b != 1 {
            return None;
          }
        }
      } else {
        taken.insert(ti, pi);
      }
    }

    let mut sign = 1;
    for s in &self.sym_perms {
      if s.antisymmetric {
        sign *= permutation_parity(&s.perm);
      }
    }

    // Parity of pulling the matched fermions out to the front, in pattern
    // order, past the other fermions; bosons reorder freely.
    let mut matched_by: Vec<Option<usize>> =
      vec![None; self.target.tensors().len()];
    for (p_slot, &t_slot) in tensor_mapping.iter().enumerate() {
      matched_by[t_slot] = Some(p_slot);
    }
    let mut labels = Vec::new();
    let mut next_label = self.fermion_total;
    for (t_slot, t) in self.target.tensors().iter().enumerate() {
      if t.statistics() != Statistics::Fermion {
        continue;
      }
      match matched_by[t_slot].and_then(|p| self.fermion_rank[p]) {
        Some(rank) => labels.push(rank),
        None => {
          labels.push(next_label);
          next_label += 1;
        }
      }
    }
    sign *= permutation_parity(&labels);

    let rest = self
      .target
      .tensors()
      .iter()
      .enumerate()
      .filter(|(t_slot, _)| matched_by[*t_slot].is_none())
      .map(|(_, t)| t.clone())
      .collect();

    Some(Match {
      tensor_mapping,
      index_mapping,
      sign,
      rest,
    })
  }
}

impl Iterator for Matches<'_> {
  type Item = Match;

  fn next(&mut self) -> Option<Match> {
    loop {
      if self.done {
        return None;
      }
      if !self.started {
        self.started = true;
      } else if !self.advance() {
        self.done = true;
        return None;
      }
      if let Some(m) = self.build() {
        return Some(m);
      }
    }
  }
}

/// Whether two operators are the same term up to renaming of contracted
/// indices and reordering of factors. Free indices must agree literally.
/// Returns the reordering sign when they are.
pub fn isomorphism_sign(a: &Operator, b: &Operator) -> Option<i64> {
  if a.tensors().len() != b.tensors().len() {
    return None;
  }
  let a_mult = a.index_multiplicities();
  for m in match_operators(a, b) {
    if !m.rest.is_empty() {
      continue;
    }
    let free_indices_fixed = m
      .index_mapping
      .iter()
      .all(|(pi, ti)| a_mult.get(pi).copied().unwrap_or(0) != 1 || pi == ti);
    if free_indices_fixed {
      return Some(m.sign);
    }
  }
  None
}

/// Advance to the next permutation in lexicographic order; false (and a
/// reset to sorted order) once the last one has been seen.
fn next_permutation(perm: &mut [usize]) -> bool {
  if perm.len() < 2 {
    return false;
  }
  let mut i = perm.len() - 1;
  while i > 0 && perm[i - 1] >= perm[i] {
    i -= 1;
  }
  if i == 0 {
    perm.sort_unstable();
    return false;
  }
  let mut j = perm.len() - 1;
  while perm[j] <= perm[i - 1] {
    j -= 1;
  }
  perm.swap(i - 1, j);
  perm[i..].reverse();
  true
}

/// Advance a sorted k-subset of `0..n` to the next one in lexicographic
/// order; false (and a reset to the first subset) once the last has been
/// seen.
fn next_combination(combo: &mut [usize], n: usize) -> bool {
  let k = combo.len();
  let mut i = k;
  while i > 0 {
    i -= 1;
    if combo[i] < n - (k - i) {
      combo[i] += 1;
      for j in i + 1..k {
        combo[j] = combo[j - 1] + 1;
      }
      return true;
    }
  }
  for (j, c) in combo.iter_mut().enumerate() {
    *c = j;
  }
  false
}

/// Parity of a sequence of distinct labels: +1 for an even number of
/// inversions, -1 for odd.
fn permutation_parity(labels: &[usize]) -> i64 {
  let mut inversions = 0;
  for i in 0..labels.len() {
    for j in i + 1..labels.len() {
      if labels[i] > labels[j] {
        inversions += 1;
      }
    }
  }
  if inversions % 2 == 0 {
    1
  } else {
    -1
  }
}
