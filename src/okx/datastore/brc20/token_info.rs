use crate::okx::protocol::brc20::Num;
use bitcoin::Txid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TokenInfo {
  pub tick: String,
  pub decimal: u8,
  pub supply: Num,
  pub limit_per_mint: Num,
  pub minted: Num,
  pub deploy_txid: Txid,
  pub deploy_by: String,
  pub deployed_height: u64,
  pub deployed_timestamp: u32,
  pub deploy_position: u32,
  pub finish_txid: Option<Txid>,
  pub finish_timestamp: Option<u32>,
  pub last_updated_block: u64,
}

impl TokenInfo {
  pub fn key(&self) -> String {
    super::tick_key(&self.tick)
  }

  pub fn remaining(&self) -> Num {
    self
      .supply
      .checked_sub(&self.minted)
      .unwrap_or_else(|_| Num::zero())
  }
}
