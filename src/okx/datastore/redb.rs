mod table;

use {
  self::table::{balance_row, insert_if_absent, operation_row, token_info_row},
  super::{
    brc20::{self, Balance, TokenInfo},
    ord::{Operation, OperationKey, OperationKeyValue, OperationType},
    LedgerReader, LedgerReaderWriter,
  },
  crate::{Result, WorkerPool},
  anyhow::Context,
  bitcoin::Txid,
  redb::{Database, ReadableTable, TableDefinition, WriteTransaction},
  std::path::Path,
};

const OPERATIONS: TableDefinition<&OperationKeyValue, &[u8]> = TableDefinition::new("OPERATIONS");
const TXID_TO_INSCRIPTION: TableDefinition<&str, &OperationKeyValue> =
  TableDefinition::new("TXID_TO_INSCRIPTION");
const TICKS: TableDefinition<&str, &[u8]> = TableDefinition::new("TICKS");
const BALANCES: TableDefinition<&str, &[u8]> = TableDefinition::new("BALANCES");
const CHECKPOINTS: TableDefinition<&str, u64> = TableDefinition::new("CHECKPOINTS");

/// The ledger database. Reads through the store see committed state only; writes go through a
/// [`LedgerWriter`] and become visible when it commits.
pub struct LedgerStore {
  database: Database,
  pool: WorkerPool,
}

impl LedgerStore {
  pub fn open(path: &Path, cache_size: Option<usize>, write_workers: usize) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create data dir `{}`", parent.display()))?;
    }

    let mut builder = Database::builder();
    if let Some(cache_size) = cache_size {
      log::info!("Setting DB cache size to {} bytes", cache_size);
      builder.set_cache_size(cache_size);
    }

    let database = builder
      .create(path)
      .with_context(|| format!("failed to open ledger database `{}`", path.display()))?;

    let store = Self {
      database,
      pool: WorkerPool::new(write_workers, WRITE_PARTITION)?,
    };

    let writer = store.begin_write()?;
    writer.wtx.open_table(OPERATIONS)?;
    writer.wtx.open_table(TXID_TO_INSCRIPTION)?;
    writer.wtx.open_table(TICKS)?;
    writer.wtx.open_table(BALANCES)?;
    writer.wtx.open_table(CHECKPOINTS)?;
    writer.commit()?;

    Ok(store)
  }

  pub fn begin_write(&self) -> Result<LedgerWriter<'_>> {
    #[allow(unused_mut)]
    let mut wtx = self.database.begin_write()?;

    #[cfg(test)]
    wtx.set_durability(redb::Durability::None);

    Ok(LedgerWriter {
      wtx,
      pool: &self.pool,
    })
  }
}

/// Records encoded per worker job when writing back.
const WRITE_PARTITION: usize = 20;

/// One atomic batch of ledger writes. Dropping it without [`commit`](Self::commit) discards
/// everything staged.
pub struct LedgerWriter<'db> {
  wtx: WriteTransaction<'db>,
  pool: &'db WorkerPool,
}

impl<'db> LedgerWriter<'db> {
  pub fn commit(self) -> Result {
    self.wtx.commit()?;
    Ok(())
  }
}

macro_rules! read_with {
  ($txn:expr, $table:expr, |$name:ident| $body:expr) => {{
    let $name = $txn.open_table($table)?;
    $body
  }};
}

impl LedgerReader for LedgerStore {
  type Error = anyhow::Error;

  fn get_checkpoint(&self, key: &str) -> Result<Option<u64>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, CHECKPOINTS, |table| table::get_checkpoint(&table, key))
  }

  fn get_inscription_operation(&self, txid: &Txid) -> Result<Option<Operation>> {
    let rtx = self.database.begin_read()?;
    let key = read_with!(rtx, TXID_TO_INSCRIPTION, |table| {
      table::get_inscription_key(&table, &txid.to_string())
    })?;
    match key {
      Some(key) => read_with!(rtx, OPERATIONS, |table| table::get_operation(&table, &key)),
      None => Ok(None),
    }
  }

  fn get_block_operations(
    &self,
    height: u64,
    after: Option<OperationKey>,
    limit: usize,
  ) -> Result<Vec<Operation>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, OPERATIONS, |table| {
      table::get_block_operations(&table, height, after, limit)
    })
  }

  fn get_lowest_operation_height(&self) -> Result<Option<u64>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, OPERATIONS, |table| table::get_lowest_operation_height(
      &table
    ))
  }

  fn get_token_info(&self, tick: &str) -> Result<Option<TokenInfo>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, TICKS, |table| table::get_record(
      &table,
      &brc20::tick_key(tick)
    ))
  }

  fn get_tokens_info(&self, after: Option<&str>, limit: usize) -> Result<Vec<TokenInfo>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, TICKS, |table| table::get_records(&table, after, limit))
  }

  fn get_balance(&self, tick: &str, address: &str) -> Result<Option<Balance>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, BALANCES, |table| table::get_record(
      &table,
      &brc20::balance_key(tick, address)
    ))
  }

  fn get_balances(&self, after: Option<&str>, limit: usize) -> Result<Vec<Balance>> {
    let rtx = self.database.begin_read()?;
    read_with!(rtx, BALANCES, |table| table::get_records(&table, after, limit))
  }
}

impl<'db> LedgerReader for LedgerWriter<'db> {
  type Error = anyhow::Error;

  fn get_checkpoint(&self, key: &str) -> Result<Option<u64>> {
    read_with!(self.wtx, CHECKPOINTS, |table| table::get_checkpoint(
      &table, key
    ))
  }

  fn get_inscription_operation(&self, txid: &Txid) -> Result<Option<Operation>> {
    let key = read_with!(self.wtx, TXID_TO_INSCRIPTION, |table| {
      table::get_inscription_key(&table, &txid.to_string())
    })?;
    match key {
      Some(key) => read_with!(self.wtx, OPERATIONS, |table| table::get_operation(
        &table, &key
      )),
      None => Ok(None),
    }
  }

  fn get_block_operations(
    &self,
    height: u64,
    after: Option<OperationKey>,
    limit: usize,
  ) -> Result<Vec<Operation>> {
    read_with!(self.wtx, OPERATIONS, |table| {
      table::get_block_operations(&table, height, after, limit)
    })
  }

  fn get_lowest_operation_height(&self) -> Result<Option<u64>> {
    read_with!(self.wtx, OPERATIONS, |table| {
      table::get_lowest_operation_height(&table)
    })
  }

  fn get_token_info(&self, tick: &str) -> Result<Option<TokenInfo>> {
    read_with!(self.wtx, TICKS, |table| table::get_record(
      &table,
      &brc20::tick_key(tick)
    ))
  }

  fn get_tokens_info(&self, after: Option<&str>, limit: usize) -> Result<Vec<TokenInfo>> {
    read_with!(self.wtx, TICKS, |table| table::get_records(
      &table, after, limit
    ))
  }

  fn get_balance(&self, tick: &str, address: &str) -> Result<Option<Balance>> {
    read_with!(self.wtx, BALANCES, |table| table::get_record(
      &table,
      &brc20::balance_key(tick, address)
    ))
  }

  fn get_balances(&self, after: Option<&str>, limit: usize) -> Result<Vec<Balance>> {
    read_with!(self.wtx, BALANCES, |table| table::get_records(
      &table, after, limit
    ))
  }
}

impl<'db> LedgerReaderWriter for LedgerWriter<'db> {
  fn insert_operation(&self, operation: &Operation) -> Result<bool> {
    let (key, value) = operation_row(operation)?;

    {
      let mut table = self.wtx.open_table(OPERATIONS)?;
      if table.get(&key)?.is_some() {
        return Ok(false);
      }
      table.insert(&key, value.as_slice())?;
    }

    if operation.op != OperationType::Transfer {
      self
        .wtx
        .open_table(TXID_TO_INSCRIPTION)?
        .insert(operation.txid.to_string().as_str(), &key)?;
    }

    Ok(true)
  }

  fn update_operations(&self, operations: &[Operation]) -> Result {
    let rows = self.pool.run(operations, operation_row)?;
    let mut table = self.wtx.open_table(OPERATIONS)?;
    for (key, value) in rows {
      table.insert(&key, value.as_slice())?;
    }
    Ok(())
  }

  fn insert_token_info(&self, info: &TokenInfo) -> Result<bool> {
    let (key, value) = token_info_row(info)?;
    insert_if_absent(&mut self.wtx.open_table(TICKS)?, &key, &value)
  }

  fn update_tokens_info(&self, infos: &[TokenInfo]) -> Result {
    let rows = self.pool.run(infos, token_info_row)?;
    let mut table = self.wtx.open_table(TICKS)?;
    for (key, value) in rows {
      table.insert(key.as_str(), value.as_slice())?;
    }
    Ok(())
  }

  fn update_balances(&self, balances: &[Balance]) -> Result {
    let rows = self.pool.run(balances, balance_row)?;
    let mut table = self.wtx.open_table(BALANCES)?;
    for (key, value) in rows {
      table.insert(key.as_str(), value.as_slice())?;
    }
    Ok(())
  }

  fn set_checkpoint(&self, key: &str, height: u64) -> Result {
    self.wtx.open_table(CHECKPOINTS)?.insert(key, height)?;
    Ok(())
  }
}
