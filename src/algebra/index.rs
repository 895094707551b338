use std::fmt;
use std::sync::{LazyLock, Mutex, MutexGuard};

// Display names, position = index id. The algebra never reads this; only
// rendering does.
static NAMES: LazyLock<Mutex<Vec<String>>> =
  LazyLock::new(|| Mutex::new(Vec::new()));

fn names() -> MutexGuard<'static, Vec<String>> {
  match NAMES.lock() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner(),
  }
}

/// A tensor index. Identity is the numeric id: two indices created with the
/// same display name are distinct, and equality never consults the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(u64);

impl Index {
  /// Allocate a new index with a cosmetic display name.
  pub fn new(name: &str) -> Self {
    let mut names = names();
    let id = names.len() as u64;
    names.push(name.to_string());
    Index(id)
  }

  /// Allocate an index guaranteed absent from every existing term, for
  /// alpha-renaming during rule application and equation solving.
  pub fn fresh() -> Self {
    let mut names = names();
    let id = names.len() as u64;
    names.push(format!("x{id}"));
    Index(id)
  }

  pub fn id(&self) -> u64 {
    self.0
  }
}

impl fmt::Display for Index {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match names().get(self.0 as usize) {
      Some(name) => write!(f, "{name}"),
      None => write!(f, "x{}", self.0),
    }
  }
}
