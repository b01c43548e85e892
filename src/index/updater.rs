use super::*;

/// Walks blocks in order and appends the ledger operations found in them to the operation log.
pub(crate) struct BlockIndexer<'a, O: ChainOracle> {
  oracle: &'a O,
  store: &'a LedgerStore,
  settings: &'a Settings,
}

impl<'a, O: ChainOracle> BlockIndexer<'a, O> {
  pub(crate) fn new(oracle: &'a O, store: &'a LedgerStore, settings: &'a Settings) -> Self {
    Self {
      oracle,
      store,
      settings,
    }
  }

  /// Indexes `start + 1 ..= end`. Without both bounds the run resumes from the indexer checkpoint
  /// and follows the chain tip, keeping `min_confirmation` blocks back; the checkpoint then
  /// advances with every block.
  pub(crate) fn index_range(&self, start: Option<u64>, end: Option<u64>) -> Result {
    let checkpoint_key = self.settings.chain.indexer_checkpoint();

    let (start, end, checkpoint) = match (start, end) {
      (Some(start), Some(end)) if start > 0 && end > 0 => (start, end, None),
      _ => {
        let start = match self.store.get_checkpoint(&checkpoint_key)? {
          Some(height) if height > 0 => height,
          _ => {
            let genesis = self.settings.genesis_block;
            let writer = self.store.begin_write()?;
            writer.set_checkpoint(&checkpoint_key, genesis)?;
            writer.commit()?;
            genesis
          }
        };
        let end = self
          .oracle
          .block_count()?
          .saturating_sub(self.settings.min_confirmation);
        (start, end, Some(checkpoint_key.as_str()))
      }
    };

    log::info!(
      "Indexing {} blocks {} to {}",
      self.settings.chain,
      start + 1,
      end
    );

    for height in start + 1..=end {
      if shutting_down() {
        log::info!("Stopped indexing before block {height}");
        break;
      }
      self.index_block(height, checkpoint)?;
    }

    Ok(())
  }

  fn index_block(&self, height: u64, checkpoint: Option<&str>) -> Result {
    let start = Instant::now();

    let block = self.oracle.block_at(height)?;
    if block.height != height {
      bail!("node returned block {} for height {height}", block.height);
    }

    let writer = self.store.begin_write()?;
    let mut inscribe_transfers = HashMap::new();
    let mut operations = 0;

    for (position, tx) in block.txdata.iter().enumerate() {
      let position = u32::try_from(position)?;
      operations += self.index_transaction(&writer, &block, position, tx, &mut inscribe_transfers)?;
    }

    if let Some(key) = checkpoint {
      writer.set_checkpoint(key, height)?;
    }
    writer.commit()?;

    log::info!(
      "Block Indexer indexed block {} ({}) with {} transactions, ledger operations {} in {} ms",
      height,
      block.hash,
      block.txdata.len(),
      operations,
      (Instant::now() - start).as_millis(),
    );

    Ok(())
  }

  /// Records at most one new inscription per transaction. Only a transaction without one can
  /// move inscribe-transfers.
  fn index_transaction(
    &self,
    writer: &LedgerWriter,
    block: &Block,
    position: u32,
    tx: &Transaction,
    inscribe_transfers: &mut HashMap<Txid, Operation>,
  ) -> Result<usize> {
    if let Some(operation) = self.find_inscription(writer, block, position, tx)? {
      if operation.op == OperationType::InscribeTransfer {
        inscribe_transfers.insert(operation.txid, operation);
      }
      return Ok(1);
    }

    let mut cache = SpentOutputCache::new();
    let mut recorded = 0;

    for (input_index, input) in tx.vin.iter().enumerate() {
      let (Some(previous), Some(0)) = (input.txid, input.vout) else {
        continue;
      };

      let inscribed = match inscribe_transfers.get(&previous) {
        Some(operation) => Some(operation.clone()),
        None => writer
          .get_inscription_operation(&previous)?
          .filter(|operation| operation.op == OperationType::InscribeTransfer),
      };
      let Some(inscribed) = inscribed else {
        continue;
      };

      let resolution =
        transfer::resolve(self.oracle, tx, input_index, inscribed.sat_range, &mut cache)?;

      let operation = Operation {
        txid: tx.txid,
        inscription_id: inscribed.inscription_id,
        op: OperationType::Transfer,
        tick: inscribed.tick,
        amount: inscribed.amount,
        valid_amount: None,
        from: inscribed.to,
        to: resolution.address,
        sat_range: resolution.range,
        height: block.height,
        block_time: block.time,
        position,
        input_index: u32::try_from(input_index)?,
        output_index: resolution.output_index,
        status: Status::Unknown,
        reason: String::new(),
        content_type: String::new(),
        content: Vec::new(),
      };

      log::debug!(
        "Transfer of {} moves {} {} from {} to {}",
        operation.inscription_id,
        operation.amount,
        operation.tick,
        operation.from,
        operation.to
      );

      if writer.insert_operation(&operation)? {
        recorded += 1;
      }
    }

    Ok(recorded)
  }

  fn find_inscription(
    &self,
    writer: &LedgerWriter,
    block: &Block,
    position: u32,
    tx: &Transaction,
  ) -> Result<Option<Operation>> {
    let chain = self.settings.chain;

    for (input_index, input) in tx.vin.iter().enumerate() {
      for script in chain.candidate_scripts(input) {
        let envelope = envelope::parse(chain, script);

        let payload = match deserialize_operation(&envelope.content, &self.settings.protocol) {
          Ok(payload) => payload,
          Err(JSONError::InvalidJson) => {
            if looks_like_operation(script) {
              log::error!(
                "Inscription in input {input_index} of {} looks like a ledger operation but could not be parsed",
                tx.txid
              );
            }
            continue;
          }
          Err(_) => continue,
        };

        let operation = self.new_operation(block, position, input_index, tx, &envelope, &payload)?;

        if let BRC20Operation::Deploy(deploy) = &payload {
          let inserted = writer.insert_token_info(&TokenInfo {
            tick: deploy.tick.clone(),
            decimal: deploy.decimals(),
            supply: deploy.supply(),
            limit_per_mint: deploy.mint_limit(),
            minted: Default::default(),
            deploy_txid: tx.txid,
            deploy_by: operation.to.clone(),
            deployed_height: block.height,
            deployed_timestamp: block.time,
            deploy_position: position,
            finish_txid: None,
            finish_timestamp: None,
            last_updated_block: 0,
          })?;
          if !inserted {
            log::debug!("Tick {} deployed again by {}", deploy.tick, tx.txid);
          }
        }

        writer.insert_operation(&operation)?;

        return Ok(Some(operation));
      }
    }

    Ok(None)
  }

  fn new_operation(
    &self,
    block: &Block,
    position: u32,
    input_index: usize,
    tx: &Transaction,
    envelope: &Envelope,
    payload: &BRC20Operation,
  ) -> Result<Operation> {
    let first = tx
      .vout
      .first()
      .ok_or_else(|| anyhow!("inscription transaction {} has no outputs", tx.txid))?;

    Ok(Operation {
      txid: tx.txid,
      inscription_id: InscriptionId::from(tx.txid),
      op: match payload {
        BRC20Operation::Deploy(_) => OperationType::Deploy,
        BRC20Operation::Mint(_) => OperationType::Mint,
        BRC20Operation::Transfer(_) => OperationType::InscribeTransfer,
      },
      tick: payload.tick().to_string(),
      amount: payload.amount(),
      valid_amount: None,
      from: String::new(),
      to: first.script_pub_key.owner(),
      sat_range: SatRange {
        start: 0,
        end: first.value.to_sat(),
      },
      height: block.height,
      block_time: block.time,
      position,
      input_index: u32::try_from(input_index)?,
      output_index: 0,
      status: Status::Unknown,
      reason: String::new(),
      content_type: envelope.content_type.clone(),
      content: envelope.content.clone(),
    })
  }
}

fn looks_like_operation(script: &[u8]) -> bool {
  let text = String::from_utf8_lossy(script);
  text.contains("\"op\"") && text.contains("\"tick\"")
}
