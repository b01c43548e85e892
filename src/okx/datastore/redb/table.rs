use crate::{
  okx::datastore::{
    brc20::{Balance, TokenInfo},
    ord::{Operation, OperationKey, OperationKeyValue},
  },
  Result,
};
use redb::{ReadableTable, Table};
use serde::{de::DeserializeOwned, Serialize};
use std::ops::Bound;

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
  Ok(bincode::deserialize(bytes)?)
}

pub(super) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
  Ok(bincode::serialize(value)?)
}

// CHECKPOINTS
pub fn get_checkpoint<T>(table: &T, key: &str) -> Result<Option<u64>>
where
  T: ReadableTable<&'static str, u64>,
{
  Ok(table.get(key)?.map(|value| value.value()))
}

// OPERATIONS
pub fn get_operation<T>(table: &T, key: &OperationKeyValue) -> Result<Option<Operation>>
where
  T: ReadableTable<&'static OperationKeyValue, &'static [u8]>,
{
  table
    .get(key)?
    .map(|value| decode(value.value()))
    .transpose()
}

// OPERATIONS
pub fn get_block_operations<T>(
  table: &T,
  height: u64,
  after: Option<OperationKey>,
  limit: usize,
) -> Result<Vec<Operation>>
where
  T: ReadableTable<&'static OperationKeyValue, &'static [u8]>,
{
  let first = after
    .unwrap_or_else(|| OperationKey::first_of_block(height))
    .store();
  let last = OperationKey::last_of_block(height).store();
  let lower = if after.is_some() {
    Bound::Excluded(&first)
  } else {
    Bound::Included(&first)
  };

  table
    .range::<&OperationKeyValue>((lower, Bound::Included(&last)))?
    .take(limit)
    .map(|entry| {
      let (_, value) = entry?;
      decode(value.value())
    })
    .collect()
}

// OPERATIONS
pub fn get_lowest_operation_height<T>(table: &T) -> Result<Option<u64>>
where
  T: ReadableTable<&'static OperationKeyValue, &'static [u8]>,
{
  match table.iter()?.next() {
    Some(entry) => {
      let (key, _) = entry?;
      Ok(Some(OperationKey::load(key.value()).height))
    }
    None => Ok(None),
  }
}

// TXID_TO_INSCRIPTION
pub fn get_inscription_key<T>(table: &T, txid: &str) -> Result<Option<OperationKeyValue>>
where
  T: ReadableTable<&'static str, &'static OperationKeyValue>,
{
  Ok(table.get(txid)?.map(|value| *value.value()))
}

// TICKS / BALANCES
pub fn get_record<T, R>(table: &T, key: &str) -> Result<Option<R>>
where
  T: ReadableTable<&'static str, &'static [u8]>,
  R: DeserializeOwned,
{
  table
    .get(key)?
    .map(|value| decode(value.value()))
    .transpose()
}

// TICKS / BALANCES
pub fn get_records<T, R>(table: &T, after: Option<&str>, limit: usize) -> Result<Vec<R>>
where
  T: ReadableTable<&'static str, &'static [u8]>,
  R: DeserializeOwned,
{
  let start = after.map_or(Bound::Unbounded, Bound::Excluded);

  table
    .range::<&str>((start, Bound::Unbounded))?
    .take(limit)
    .map(|entry| {
      let (_, value) = entry?;
      decode(value.value())
    })
    .collect()
}

/// Returns `false` and leaves the table alone when the key already exists.
pub fn insert_if_absent(
  table: &mut Table<'_, '_, &'static str, &'static [u8]>,
  key: &str,
  value: &[u8],
) -> Result<bool> {
  if table.get(key)?.is_some() {
    return Ok(false);
  }
  table.insert(key, value)?;
  Ok(true)
}

pub(super) fn token_info_row(info: &TokenInfo) -> Result<(String, Vec<u8>)> {
  Ok((info.key(), encode(info)?))
}

pub(super) fn balance_row(balance: &Balance) -> Result<(String, Vec<u8>)> {
  Ok((balance.key(), encode(balance)?))
}

pub(super) fn operation_row(operation: &Operation) -> Result<(OperationKeyValue, Vec<u8>)> {
  Ok((operation.key().store(), encode(operation)?))
}
