use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use num_complex::Complex;
use num_rational::Rational64;
use num_traits::{One, Signed, Zero};

/// Exact complex-rational coefficient of an operator. All arithmetic is
/// exact; conjugation flips the imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coefficient(Complex<Rational64>);

impl Coefficient {
  pub fn new(re: Rational64, im: Rational64) -> Self {
    Coefficient(Complex::new(re, im))
  }

  pub fn integer(n: i64) -> Self {
    Coefficient::new(Rational64::from_integer(n), Rational64::zero())
  }

  pub fn rational(numer: i64, denom: i64) -> Self {
    Coefficient::new(Rational64::new(numer, denom), Rational64::zero())
  }

  /// The imaginary unit times `numer/denom`.
  pub fn imaginary(numer: i64, denom: i64) -> Self {
    Coefficient::new(Rational64::zero(), Rational64::new(numer, denom))
  }

  pub fn zero() -> Self {
    Coefficient(Complex::zero())
  }

  pub fn one() -> Self {
    Coefficient(Complex::one())
  }

  pub fn re(&self) -> Rational64 {
    self.0.re
  }

  pub fn im(&self) -> Rational64 {
    self.0.im
  }

  pub fn is_zero(&self) -> bool {
    self.0.is_zero()
  }

  pub fn is_one(&self) -> bool {
    self.0.is_one()
  }

  pub fn conjugate(&self) -> Self {
    Coefficient(self.0.conj())
  }

  pub(crate) fn is_negative_real(&self) -> bool {
    self.0.im.is_zero() && self.0.re.is_negative()
  }
}

impl From<i64> for Coefficient {
  fn from(n: i64) -> Self {
    Coefficient::integer(n)
  }
}

impl From<Rational64> for Coefficient {
  fn from(r: Rational64) -> Self {
    Coefficient::new(r, Rational64::zero())
  }
}

impl Add for Coefficient {
  type Output = Coefficient;
  fn add(self, rhs: Coefficient) -> Coefficient {
    Coefficient(self.0 + rhs.0)
  }
}

impl AddAssign for Coefficient {
  fn add_assign(&mut self, rhs: Coefficient) {
    self.0 = self.0 + rhs.0;
  }
}

impl Sub for Coefficient {
  type Output = Coefficient;
  fn sub(self, rhs: Coefficient) -> Coefficient {
    Coefficient(self.0 - rhs.0)
  }
}

impl Mul for Coefficient {
  type Output = Coefficient;
  fn mul(self, rhs: Coefficient) -> Coefficient {
    Coefficient(self.0 * rhs.0)
  }
}

impl Mul<i64> for Coefficient {
  type Output = Coefficient;
  fn mul(self, rhs: i64) -> Coefficient {
    self * Coefficient::integer(rhs)
  }
}

impl Div for Coefficient {
  type Output = Coefficient;
  fn div(self, rhs: Coefficient) -> Coefficient {
    Coefficient(self.0 / rhs.0)
  }
}

impl Neg for Coefficient {
  type Output = Coefficient;
  fn neg(self) -> Coefficient {
    Coefficient(-self.0)
  }
}

fn fmt_rational(r: Rational64) -> String {
  r.to_string()
}

impl fmt::Display for Coefficient {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let (re, im) = (self.0.re, self.0.im);
    if im.is_zero() {
      return write!(f, "{}", fmt_rational(re));
    }
    let unsigned_im = if im.abs().is_one() {
      "i".to_string()
    } else {
      format!("{}i", fmt_rational(im.abs()))
    };
    if re.is_zero() {
      if im.is_negative() {
        return write!(f, "-{unsigned_im}");
      }
      return write!(f, "{unsigned_im}");
    }
    let sign = if im.is_negative() { '-' } else { '+' };
    write!(f, "({} {} {})", fmt_rational(re), sign, unsigned_im)
  }
}
