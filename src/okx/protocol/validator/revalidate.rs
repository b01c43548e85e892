use super::*;

impl LedgerValidator<'_> {
  /// Recomputes `ticks` from scratch over blocks `start + 1 ..= end`. Their mint progress and
  /// every balance held in them are cleared first; the validator checkpoint is left alone.
  pub(crate) fn revalidate(&self, start: u64, end: u64, ticks: &[String]) -> Result {
    if ticks.is_empty() {
      bail!("no ticks to revalidate");
    }

    let ticks = ticks
      .iter()
      .map(|tick| tick_key(tick.trim()))
      .collect::<HashSet<String>>();

    let mut state = LedgerState::load(self.store, &self.pool)?;

    let mut missing = ticks
      .iter()
      .filter(|tick| !state.contains_token(tick))
      .cloned()
      .collect::<Vec<String>>();
    if !missing.is_empty() {
      missing.sort();
      return Err(anyhow!("unknown ticks: {}", missing.join(",")));
    }

    let (reset_ticks, reset_balances) = state.reset(&ticks);
    let writer = self.store.begin_write()?;
    writer.update_tokens_info(&reset_ticks)?;
    writer.update_balances(&reset_balances)?;
    writer.commit()?;

    log::info!(
      "Ledger Validator reset {} ticks and {} balances, revalidating blocks {}..={}",
      reset_ticks.len(),
      reset_balances.len(),
      start + 1,
      end
    );

    let scope = Scope {
      ticks: Some(&ticks),
      checkpoint: None,
    };

    for height in start + 1..=end {
      if shutting_down() {
        log::info!("Ledger Validator revalidation stopped at block {}", height - 1);
        break;
      }
      self.validate_block(&mut state, height, &scope)?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{
      super::tests::{num, Ledger},
      *,
    },
    pretty_assertions::assert_eq,
  };

  fn activity() -> Ledger {
    let mut ledger = Ledger::new();
    ledger.deploy(100, "ordi", "21000000", "1000");
    ledger.deploy(100, "sats", "5000", "5000");
    ledger.mint(101, "ordi", "1000", "alice");
    ledger.mint(101, "sats", "5000", "alice");
    ledger.mint(101, "sats", "1", "bob");
    let ordi = ledger.inscribe_transfer(102, "ordi", "400", "alice");
    let sats = ledger.inscribe_transfer(102, "sats", "2500", "alice");
    ledger.transfer(103, &ordi, "alice", "bob");
    ledger.transfer(103, &sats, "alice", "carol");
    ledger.validate_to(103);
    ledger
  }

  fn snapshot(ledger: &Ledger) -> (Vec<Balance>, TokenInfo, TokenInfo) {
    (
      ledger.balances(),
      ledger.token("ordi"),
      ledger.token("sats"),
    )
  }

  #[test]
  fn revalidation_reproduces_the_ledger() {
    let ledger = activity();
    let before = snapshot(&ledger);

    LedgerValidator::new(&ledger.store, &ledger.settings)
      .unwrap()
      .revalidate(99, 103, &["SATS".into()])
      .unwrap();

    assert_eq!(snapshot(&ledger), before);
    assert_eq!(ledger.available("sats", "carol"), num("2500"));
    assert_eq!(ledger.token("sats").minted, num("5000"));
  }

  #[test]
  fn revalidation_leaves_other_ticks_and_checkpoint_alone() {
    let ledger = activity();
    let ordi = ledger.token("ordi");
    let alice_ordi = ledger.store.get_balance("ordi", "alice").unwrap();

    // replaying only part of the history leaves the tick partially rebuilt
    LedgerValidator::new(&ledger.store, &ledger.settings)
      .unwrap()
      .revalidate(99, 101, &["sats".into()])
      .unwrap();

    assert_eq!(ledger.available("sats", "alice"), num("5000"));
    assert_eq!(ledger.transferable("sats", "alice"), num("0"));
    assert_eq!(ledger.available("sats", "carol"), num("0"));

    assert_eq!(ledger.token("ordi"), ordi);
    assert_eq!(ledger.store.get_balance("ordi", "alice").unwrap(), alice_ordi);
    assert_eq!(
      ledger
        .store
        .get_checkpoint(&ledger.settings.chain.validator_checkpoint())
        .unwrap(),
      Some(103)
    );
  }

  #[test]
  fn revalidation_needs_known_ticks() {
    let ledger = activity();
    let validator = LedgerValidator::new(&ledger.store, &ledger.settings).unwrap();

    assert_eq!(
      validator.revalidate(99, 103, &[]).unwrap_err().to_string(),
      "no ticks to revalidate"
    );
    assert_eq!(
      validator
        .revalidate(99, 103, &["ordi".into(), "pepe".into()])
        .unwrap_err()
        .to_string(),
      "unknown ticks: pepe"
    );
    assert_eq!(ledger.token("ordi").minted, num("1000"));
  }
}
