pub mod brc20;
pub mod ord;
pub mod redb;

use self::{
  brc20::{Balance, TokenInfo},
  ord::{Operation, OperationKey},
};
use bitcoin::Txid;
use std::fmt::{Debug, Display};

pub use self::redb::{LedgerStore, LedgerWriter};

pub trait LedgerReader {
  type Error: Debug + Display;

  fn get_checkpoint(&self, key: &str) -> Result<Option<u64>, Self::Error>;

  /// The deploy, mint or inscribe-transfer operation created by `txid`, if any.
  fn get_inscription_operation(&self, txid: &Txid) -> Result<Option<Operation>, Self::Error>;

  /// Operations of one block in (position, input index) order, starting after `after`.
  fn get_block_operations(
    &self,
    height: u64,
    after: Option<OperationKey>,
    limit: usize,
  ) -> Result<Vec<Operation>, Self::Error>;

  fn get_lowest_operation_height(&self) -> Result<Option<u64>, Self::Error>;

  fn get_token_info(&self, tick: &str) -> Result<Option<TokenInfo>, Self::Error>;

  /// Ticks ordered by lower-case name, starting after `after`.
  fn get_tokens_info(
    &self,
    after: Option<&str>,
    limit: usize,
  ) -> Result<Vec<TokenInfo>, Self::Error>;

  fn get_balance(&self, tick: &str, address: &str) -> Result<Option<Balance>, Self::Error>;

  /// Balances ordered by lower-case `tick,address`, starting after `after`.
  fn get_balances(&self, after: Option<&str>, limit: usize) -> Result<Vec<Balance>, Self::Error>;
}

/// Writes are staged and become visible together when the implementation commits.
pub trait LedgerReaderWriter: LedgerReader {
  /// Returns `false` if an operation with the same key already exists.
  fn insert_operation(&self, operation: &Operation) -> Result<bool, Self::Error>;

  fn update_operations(&self, operations: &[Operation]) -> Result<(), Self::Error>;

  /// Returns `false` if the tick already exists; the first deploy wins.
  fn insert_token_info(&self, info: &TokenInfo) -> Result<bool, Self::Error>;

  fn update_tokens_info(&self, infos: &[TokenInfo]) -> Result<(), Self::Error>;

  /// Inserts or replaces each balance.
  fn update_balances(&self, balances: &[Balance]) -> Result<(), Self::Error>;

  fn set_checkpoint(&self, key: &str, height: u64) -> Result<(), Self::Error>;
}
