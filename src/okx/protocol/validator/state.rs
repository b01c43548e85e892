use {
  super::*,
  crate::okx::datastore::brc20::{balance_key, tick_key},
};

/// Page size for bulk loads and per-block operation reads.
pub(crate) const PAGE_SIZE: usize = 2000;

/// Every tick and balance, held in memory while validating. Records touched in the current block
/// are tracked and handed out once for writeback.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
  ticks: HashMap<String, TokenInfo>,
  balances: HashMap<String, Balance>,
  dirty_ticks: BTreeSet<String>,
  dirty_balances: BTreeSet<String>,
}

impl LedgerState {
  /// Loads all ticks and balances. A tick whose deploy operation is missing is fatal; a tick
  /// without a deploy position takes it from the deploy operation and is written back.
  pub(crate) fn load(store: &LedgerStore, pool: &WorkerPool) -> Result<Self> {
    let start = Instant::now();
    let mut state = Self::default();

    let mut after: Option<String> = None;
    loop {
      let page = store.get_tokens_info(after.as_deref(), PAGE_SIZE)?;

      let checked = pool.run(&page, |token| {
        let deploy = store
          .get_inscription_operation(&token.deploy_txid)?
          .filter(|operation| operation.op == OperationType::Deploy)
          .ok_or_else(|| {
            anyhow!(
              "tick {} has no deploy operation {}",
              token.tick,
              token.deploy_txid
            )
          })?;

        if token.deploy_position > 0 {
          return Ok(None);
        }

        let mut repaired = token.clone();
        repaired.deploy_position = deploy.position;
        Ok(Some(repaired))
      })?;

      let repaired = checked.into_iter().flatten().collect::<Vec<TokenInfo>>();
      if !repaired.is_empty() {
        log::info!("Repairing deploy position of {} ticks", repaired.len());
        let writer = store.begin_write()?;
        writer.update_tokens_info(&repaired)?;
        writer.commit()?;
      }

      after = page.last().map(TokenInfo::key);
      let full = page.len() == PAGE_SIZE;

      for token in page {
        state.ticks.insert(token.key(), token);
      }
      for token in repaired {
        state.ticks.insert(token.key(), token);
      }

      if !full {
        break;
      }
    }

    let mut after: Option<String> = None;
    loop {
      let page = store.get_balances(after.as_deref(), PAGE_SIZE)?;
      after = page.last().map(Balance::key);
      let full = page.len() == PAGE_SIZE;

      for balance in page {
        state.balances.insert(balance.key(), balance);
      }

      if !full {
        break;
      }
    }

    log::info!(
      "Loaded {} ticks and {} balances in {} ms",
      state.ticks.len(),
      state.balances.len(),
      (Instant::now() - start).as_millis()
    );

    Ok(state)
  }

  pub(crate) fn token(&self, tick: &str) -> Option<&TokenInfo> {
    self.ticks.get(&tick_key(tick))
  }

  pub(crate) fn contains_token(&self, tick: &str) -> bool {
    self.ticks.contains_key(&tick_key(tick))
  }

  /// The token, marked for writeback.
  pub(crate) fn token_mut(&mut self, tick: &str) -> Option<&mut TokenInfo> {
    let key = tick_key(tick);
    let token = self.ticks.get_mut(&key)?;
    self.dirty_ticks.insert(key);
    Some(token)
  }

  /// Current holdings; an address that never held the tick holds nothing.
  pub(crate) fn balance(&self, tick: &str, address: &str) -> Balance {
    self
      .balances
      .get(&balance_key(tick, address))
      .cloned()
      .unwrap_or_else(|| Balance::new(tick, address))
  }

  pub(crate) fn balance_updated_before(&self, tick: &str, address: &str, block: u64) -> bool {
    self
      .balances
      .get(&balance_key(tick, address))
      .map_or(true, |balance| balance.last_updated_block < block)
  }

  /// The balance, created on first use and marked for writeback.
  pub(crate) fn balance_mut(&mut self, tick: &str, address: &str) -> &mut Balance {
    let key = balance_key(tick, address);
    self.dirty_balances.insert(key.clone());
    self
      .balances
      .entry(key)
      .or_insert_with(|| Balance::new(tick, address))
  }

  /// Touched records, stamped with `block`. The dirty sets are cleared.
  pub(crate) fn take_dirty(&mut self, block: u64) -> (Vec<TokenInfo>, Vec<Balance>) {
    let mut ticks = Vec::with_capacity(self.dirty_ticks.len());
    for key in std::mem::take(&mut self.dirty_ticks) {
      if let Some(token) = self.ticks.get_mut(&key) {
        token.last_updated_block = token.last_updated_block.max(block);
        ticks.push(token.clone());
      }
    }

    let mut balances = Vec::with_capacity(self.dirty_balances.len());
    for key in std::mem::take(&mut self.dirty_balances) {
      if let Some(balance) = self.balances.get_mut(&key) {
        balance.last_updated_block = balance.last_updated_block.max(block);
        balances.push(balance.clone());
      }
    }

    (ticks, balances)
  }

  /// Clears the mint progress of `ticks` and every balance held in them. Returns the reset records.
  pub(crate) fn reset(&mut self, ticks: &HashSet<String>) -> (Vec<TokenInfo>, Vec<Balance>) {
    let mut reset_ticks = Vec::new();
    for (key, token) in self.ticks.iter_mut() {
      if ticks.contains(key) {
        token.minted = Num::zero();
        token.finish_txid = None;
        token.finish_timestamp = None;
        token.last_updated_block = 0;
        reset_ticks.push(token.clone());
      }
    }

    let mut reset_balances = Vec::new();
    for balance in self.balances.values_mut() {
      if ticks.contains(&tick_key(&balance.tick)) {
        balance.available = Num::zero();
        balance.transferable = Num::zero();
        balance.last_updated_block = 0;
        reset_balances.push(balance.clone());
      }
    }

    self.dirty_ticks.clear();
    self.dirty_balances.clear();

    (reset_ticks, reset_balances)
  }
}
