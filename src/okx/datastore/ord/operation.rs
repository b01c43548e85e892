use crate::{okx::protocol::brc20::Num, InscriptionId};
use bitcoin::Txid;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OperationType {
  Deploy,
  Mint,
  InscribeTransfer,
  Transfer,
}

impl OperationType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Deploy => "deploy",
      Self::Mint => "mint",
      Self::InscribeTransfer => "inscribe-transfer",
      Self::Transfer => "transfer",
    }
  }
}

impl Display for OperationType {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Status {
  #[default]
  Unknown,
  Valid,
  Invalid,
}

/// Satoshi range `[start, end]` relative to the output that currently owns the inscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SatRange {
  pub start: u64,
  pub end: u64,
}

impl Display for SatRange {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{},{}", self.start, self.end)
  }
}

/// Primary key of an operation: ordered by height, then position in block, then input index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationKey {
  pub height: u64,
  pub position: u32,
  pub input_index: u32,
}

pub type OperationKeyValue = [u8; 16];

impl OperationKey {
  pub fn store(self) -> OperationKeyValue {
    let mut value = [0; 16];
    value[..8].copy_from_slice(&self.height.to_be_bytes());
    value[8..12].copy_from_slice(&self.position.to_be_bytes());
    value[12..].copy_from_slice(&self.input_index.to_be_bytes());
    value
  }

  pub fn load(value: &OperationKeyValue) -> Self {
    let mut height = [0; 8];
    let mut position = [0; 4];
    let mut input_index = [0; 4];
    height.copy_from_slice(&value[..8]);
    position.copy_from_slice(&value[8..12]);
    input_index.copy_from_slice(&value[12..]);
    Self {
      height: u64::from_be_bytes(height),
      position: u32::from_be_bytes(position),
      input_index: u32::from_be_bytes(input_index),
    }
  }

  pub fn first_of_block(height: u64) -> Self {
    Self {
      height,
      position: 0,
      input_index: 0,
    }
  }

  pub fn last_of_block(height: u64) -> Self {
    Self {
      height,
      position: u32::MAX,
      input_index: u32::MAX,
    }
  }
}

/// One decoded ledger operation. Created once by the indexer; afterwards only `status`,
/// `reason` and `valid_amount` change.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Operation {
  pub txid: Txid,
  pub inscription_id: InscriptionId,
  pub op: OperationType,
  pub tick: String,
  pub amount: String,
  pub valid_amount: Option<Num>,
  pub from: String,
  pub to: String,
  pub sat_range: SatRange,
  pub height: u64,
  pub block_time: u32,
  pub position: u32,
  pub input_index: u32,
  pub output_index: u32,
  pub status: Status,
  pub reason: String,
  pub content_type: String,
  pub content: Vec<u8>,
}

impl Operation {
  pub fn key(&self) -> OperationKey {
    OperationKey {
      height: self.height,
      position: self.position,
      input_index: self.input_index,
    }
  }

  pub fn is_patched(&self) -> bool {
    self
      .reason
      .starts_with(crate::okx::protocol::brc20::PATCH_REASON_PREFIX)
  }
}
