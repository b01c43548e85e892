use {
  crate::{
    config::Settings,
    okx::{
      datastore::{
        brc20::{tick_key, Balance, TokenInfo},
        ord::{Operation, OperationType, Status},
        LedgerReader, LedgerReaderWriter, LedgerStore,
      },
      protocol::brc20::{execute, ExecutionContext, Num},
    },
    shutting_down, Result, WorkerPool,
  },
  anyhow::{anyhow, bail},
  bitcoin::Txid,
  std::{
    collections::{BTreeSet, HashMap, HashSet},
    time::Instant,
  },
};

mod revalidate;
mod state;

pub(crate) use self::state::LedgerState;
use self::state::PAGE_SIZE;

/// Ticks loaded per worker job.
const LOAD_PARTITION: usize = 20;

/// Which operations of a block get evaluated and where progress is recorded.
struct Scope<'a> {
  /// Lower-case tick names; everything else is left alone.
  ticks: Option<&'a HashSet<String>>,
  checkpoint: Option<&'a str>,
}

impl Scope<'_> {
  fn includes(&self, operation: &Operation) -> bool {
    self
      .ticks
      .map_or(true, |ticks| ticks.contains(&tick_key(&operation.tick)))
  }

  /// Outside revalidation an operation is decided once.
  fn rewrites_decided(&self) -> bool {
    self.ticks.is_some()
  }
}

/// Replays the operation log block by block against tick and balance state.
pub(crate) struct LedgerValidator<'a> {
  store: &'a LedgerStore,
  settings: &'a Settings,
  pool: WorkerPool,
}

impl<'a> LedgerValidator<'a> {
  pub(crate) fn new(store: &'a LedgerStore, settings: &'a Settings) -> Result<Self> {
    Ok(Self {
      store,
      settings,
      pool: WorkerPool::new(settings.write_workers, LOAD_PARTITION)?,
    })
  }

  /// Validates every indexed block after the validator checkpoint. On the first run the
  /// checkpoint starts just below the lowest block holding an operation.
  pub(crate) fn run(&self) -> Result {
    let checkpoint_key = self.settings.chain.validator_checkpoint();

    let validated = match self.store.get_checkpoint(&checkpoint_key)? {
      Some(height) if height > 0 => height,
      _ => {
        let genesis = self
          .store
          .get_lowest_operation_height()?
          .map_or(0, |height| height.saturating_sub(1));
        let writer = self.store.begin_write()?;
        writer.set_checkpoint(&checkpoint_key, genesis)?;
        writer.commit()?;
        log::info!("Ledger Validator starts after block {genesis}");
        genesis
      }
    };

    let indexed = self
      .store
      .get_checkpoint(&self.settings.chain.indexer_checkpoint())?
      .unwrap_or_default();

    if validated >= indexed {
      log::info!("Ledger Validator is up to date at block {validated}");
      return Ok(());
    }

    let mut state = LedgerState::load(self.store, &self.pool)?;

    let scope = Scope {
      ticks: None,
      checkpoint: Some(&checkpoint_key),
    };

    for height in validated + 1..=indexed {
      if shutting_down() {
        log::info!("Ledger Validator stopped at block {}", height - 1);
        break;
      }
      self.validate_block(&mut state, height, &scope)?;
    }

    Ok(())
  }

  /// Evaluates one block and writes operations, touched records and the checkpoint in a single
  /// commit. Nothing is written if any step fails.
  fn validate_block(&self, state: &mut LedgerState, height: u64, scope: &Scope) -> Result {
    let start = Instant::now();
    let writer = self.store.begin_write()?;

    let mut inscribe_transfers: HashMap<Txid, Status> = HashMap::new();
    let mut updated = Vec::new();
    let mut evaluated = 0;

    let mut after = None;
    loop {
      let page = writer.get_block_operations(height, after, PAGE_SIZE)?;
      after = page.last().map(Operation::key);
      let full = page.len() == PAGE_SIZE;

      for mut operation in page {
        if !scope.includes(&operation) {
          continue;
        }
        if operation.is_patched() && operation.status == Status::Invalid {
          continue;
        }

        let context = ExecutionContext {
          block: height,
          protocol: &self.settings.protocol,
          ledger: &writer,
          inscribe_transfers: &inscribe_transfers,
        };
        let receipt = execute(&context, state, &operation)?;
        evaluated += 1;

        if operation.op == OperationType::InscribeTransfer {
          inscribe_transfers
            .entry(operation.txid)
            .or_insert(receipt.status);
        }

        if operation.is_patched() {
          continue;
        }
        if operation.status != Status::Unknown && !scope.rewrites_decided() {
          continue;
        }

        operation.status = receipt.status;
        operation.reason = receipt.reason;
        operation.valid_amount = receipt.valid_amount;
        updated.push(operation);
      }

      if !full {
        break;
      }
    }

    let (ticks, balances) = state.take_dirty(height);

    writer.update_operations(&updated)?;
    writer.update_tokens_info(&ticks)?;
    writer.update_balances(&balances)?;
    if let Some(key) = scope.checkpoint {
      writer.set_checkpoint(key, height)?;
    }
    writer.commit()?;

    log::info!(
      "Ledger Validator validated block {} with {} operations, {} ticks and {} balances updated in {} ms",
      height,
      evaluated,
      ticks.len(),
      balances.len(),
      (Instant::now() - start).as_millis()
    );

    Ok(())
  }
}
