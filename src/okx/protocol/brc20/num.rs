use super::{error::NumError, params::MAX_DECIMAL_WIDTH};
use bigdecimal::{num_bigint::Sign, BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
  fmt::{Display, Formatter},
  str::FromStr,
};

/// Exact decimal amount. Ledger arithmetic never goes through floating point.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Default)]
pub struct Num(BigDecimal);

impl Num {
  pub fn zero() -> Self {
    Self(BigDecimal::zero())
  }

  pub fn checked_add(&self, other: &Num) -> Result<Self, NumError> {
    Ok(Self(self.0.clone() + &other.0))
  }

  /// Fails instead of going below zero.
  pub fn checked_sub(&self, other: &Num) -> Result<Self, NumError> {
    if self.0 < other.0 {
      return Err(NumError::Overflow {
        op: String::from("checked_sub"),
        org: self.clone(),
        other: other.clone(),
      });
    }

    Ok(Self(self.0.clone() - &other.0))
  }

  pub fn checked_to_u8(&self) -> Result<u8, NumError> {
    if !self.0.is_integer() {
      return Err(NumError::InvalidInteger(self.clone()));
    }
    self.0.to_u8().ok_or(NumError::Overflow {
      op: String::from("to_u8"),
      org: self.clone(),
      other: Self(BigDecimal::from(u8::MAX)),
    })
  }

  pub fn sign(&self) -> Sign {
    self.0.sign()
  }

  pub fn is_positive(&self) -> bool {
    self.sign() == Sign::Plus
  }
}

impl From<u64> for Num {
  fn from(n: u64) -> Self {
    Self(BigDecimal::from(n))
  }
}

impl FromStr for Num {
  type Err = NumError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.starts_with('.') || s.ends_with('.') || s.find(&['e', 'E', '+', '-']).is_some() {
      return Err(NumError::InvalidNum(s.to_string()));
    }
    let num = BigDecimal::from_str(s).map_err(|_| NumError::InvalidNum(s.to_string()))?;

    let (_, scale) = num.as_bigint_and_exponent();
    if scale > i64::from(MAX_DECIMAL_WIDTH) {
      return Err(NumError::InvalidNum(s.to_string()));
    }

    Ok(Self(num))
  }
}

impl Display for Num {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

impl Serialize for Num {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for Num {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Ok(Self(
      BigDecimal::from_str(&s).map_err(serde::de::Error::custom)?,
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bigdecimal::num_bigint::BigInt;

  #[test]
  fn test_num_from_str() {
    assert!(Num::from_str(".1").is_err());
    assert_eq!(
      Num(BigDecimal::new(BigInt::from(1), 0)),
      Num::from_str("001").unwrap()
    );
    assert_eq!(
      Num(BigDecimal::new(BigInt::from(1), 1)),
      Num::from_str("00.1").unwrap()
    );
    assert_eq!(
      Num(BigDecimal::new(BigInt::from(11), 1)),
      Num::from_str("1.1000").unwrap()
    );

    // can not be negative
    assert!(Num::from_str("-1.1").is_err());

    // number of decimal fractional can not exceed 18
    assert_eq!(
      Num(BigDecimal::new(BigInt::from(1_0000000000_00000001u64), 18)),
      Num::from_str("1.000000000000000001").unwrap()
    );
    assert!(Num::from_str("1.0000000000000000001").is_err());
  }

  #[test]
  fn test_invalid_num() {
    assert!(Num::from_str("").is_err());
    assert!(Num::from_str(" ").is_err());
    assert!(Num::from_str(".").is_err());
    assert!(Num::from_str(" 456").is_err());
    assert!(Num::from_str("45 6").is_err());
    assert!(Num::from_str("123.+456").is_err());
    assert!(Num::from_str("+123.456").is_err());
    assert!(Num::from_str("123.456.789").is_err());
    assert!(Num::from_str("123456789.").is_err());
    assert!(Num::from_str("1e2").is_err());
    assert!(Num::from_str("100E2").is_err());
  }

  #[test]
  fn test_num_serde() {
    let num = Num::from_str("1.01").unwrap();
    assert_eq!(serde_json::to_string(&num).unwrap(), "\"1.01\"");
    assert_eq!(serde_json::from_str::<Num>("\"1.01\"").unwrap(), num);

    let bytes = bincode::serialize(&Some(num.clone())).unwrap();
    assert_eq!(
      bincode::deserialize::<Option<Num>>(&bytes).unwrap(),
      Some(num)
    );
  }

  #[test]
  fn test_num_checked_add() {
    assert_eq!(
      Num::from_str("2.222"),
      Num::from_str("1.101")
        .unwrap()
        .checked_add(&Num::from_str("1.121").unwrap())
    );
  }

  #[test]
  fn test_num_checked_sub() {
    assert_eq!(
      Num::from_str("2.1"),
      Num::from_str("3")
        .unwrap()
        .checked_sub(&Num::from_str("0.9").unwrap())
    );
    assert_eq!(
      Num::from_str("1")
        .unwrap()
        .checked_sub(&Num::from_str("1.5").unwrap())
        .unwrap_err(),
      NumError::Overflow {
        op: String::from("checked_sub"),
        org: Num::from_str("1").unwrap(),
        other: Num::from_str("1.5").unwrap(),
      }
    );
  }

  #[test]
  fn test_to_u8() {
    assert_eq!(Num::from_str("18").unwrap().checked_to_u8().unwrap(), 18);
    assert_eq!(Num::from_str("15.00").unwrap().checked_to_u8().unwrap(), 15);
    assert!(Num::from_str("256").unwrap().checked_to_u8().is_err());
    assert_eq!(
      Num::from_str("1.5").unwrap().checked_to_u8().unwrap_err(),
      NumError::InvalidInteger(Num::from_str("1.5").unwrap())
    );
  }

  #[test]
  fn test_sign_and_min() {
    assert!(Num::from_str("0.1").unwrap().is_positive());
    assert!(!Num::zero().is_positive());
    assert_eq!(
      Num::from(500).min(Num::from(200)),
      Num::from(200)
    );
  }
}
