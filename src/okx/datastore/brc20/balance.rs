use crate::okx::protocol::brc20::Num;
use serde::{Deserialize, Serialize};

/// Holdings of one address for one tick. `tick` and `address` are kept as first seen;
/// lookups go through [`balance_key`](super::balance_key).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Balance {
  pub tick: String,
  pub address: String,
  pub available: Num,
  pub transferable: Num,
  pub last_updated_block: u64,
}

impl Balance {
  pub fn new(tick: &str, address: &str) -> Self {
    Self {
      tick: tick.to_string(),
      address: address.to_string(),
      available: Num::zero(),
      transferable: Num::zero(),
      last_updated_block: 0,
    }
  }

  pub fn key(&self) -> String {
    super::balance_key(&self.tick, &self.address)
  }
}
