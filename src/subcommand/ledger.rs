use {
  super::*,
  crate::okx::datastore::{brc20::Balance, LedgerReader},
};

#[derive(Debug, Parser)]
pub(crate) enum LedgerSubcommand {
  #[command(about = "Show what an address holds of a tick")]
  Balance(BalanceQuery),
  #[command(about = "Show supply and mint progress of a tick")]
  Tick(TickQuery),
}

impl LedgerSubcommand {
  pub(crate) fn run(self, options: &Options, settings: &Settings) -> SubcommandResult {
    let store = open_store(options, settings)?;

    match self {
      Self::Balance(query) => Ok(Some(Box::new(balance(&store, &query.tick, &query.address)?))),
      Self::Tick(query) => Ok(Some(Box::new(tick(&store, &query.tick)?))),
    }
  }
}

#[derive(Debug, Parser)]
pub(crate) struct BalanceQuery {
  #[arg(long, help = "Show balance in <TICK>.")]
  tick: String,
  #[arg(long, help = "Show balance of <ADDRESS>.")]
  address: String,
}

#[derive(Debug, Parser)]
pub(crate) struct TickQuery {
  #[arg(long, help = "Show <TICK>.")]
  tick: String,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct BalanceOutput {
  pub tick: String,
  pub address: String,
  pub available: String,
  pub transferable: String,
  pub overall: String,
  pub last_updated_block: u64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TickOutput {
  pub tick: String,
  pub decimal: u8,
  pub max_supply: String,
  pub limit_per_mint: String,
  pub minted: String,
  pub deploy_txid: String,
  pub deploy_by: String,
  pub deployed_height: u64,
  pub deployed_at: String,
  pub finish_txid: Option<String>,
  pub finished_at: Option<String>,
  pub last_updated_block: u64,
}

fn balance<L>(ledger: &L, tick: &str, address: &str) -> Result<BalanceOutput>
where
  L: LedgerReader<Error = Error>,
{
  let info = ledger
    .get_token_info(tick)?
    .ok_or_else(|| anyhow!("tick {tick} has not been deployed"))?;

  let balance = ledger
    .get_balance(tick, address)?
    .unwrap_or_else(|| Balance::new(&info.tick, address));

  Ok(BalanceOutput {
    tick: info.tick,
    address: balance.address,
    overall: balance.available.checked_add(&balance.transferable)?.to_string(),
    available: balance.available.to_string(),
    transferable: balance.transferable.to_string(),
    last_updated_block: balance.last_updated_block,
  })
}

fn tick<L>(ledger: &L, tick: &str) -> Result<TickOutput>
where
  L: LedgerReader<Error = Error>,
{
  let info = ledger
    .get_token_info(tick)?
    .ok_or_else(|| anyhow!("tick {tick} has not been deployed"))?;

  Ok(TickOutput {
    decimal: info.decimal,
    max_supply: info.supply.to_string(),
    limit_per_mint: info.limit_per_mint.to_string(),
    minted: info.minted.to_string(),
    deploy_txid: info.deploy_txid.to_string(),
    deploy_by: info.deploy_by,
    deployed_height: info.deployed_height,
    deployed_at: timestamp(info.deployed_timestamp).to_rfc3339(),
    finish_txid: info.finish_txid.map(|txid| txid.to_string()),
    finished_at: info
      .finish_timestamp
      .map(|seconds| timestamp(seconds).to_rfc3339()),
    last_updated_block: info.last_updated_block,
    tick: info.tick,
  })
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::okx::{
      datastore::{brc20::TokenInfo, LedgerReaderWriter},
      protocol::brc20::Num,
    },
    pretty_assertions::assert_eq,
    tempfile::TempDir,
  };

  fn store() -> (TempDir, LedgerStore) {
    let dir = TempDir::new().unwrap();
    let store = LedgerStore::open(&dir.path().join("ledger.redb"), None, 1).unwrap();

    let deploy_txid = format!("{:064x}", 7).parse::<Txid>().unwrap();
    let writer = store.begin_write().unwrap();
    writer
      .insert_token_info(&TokenInfo {
        tick: "Ordi".into(),
        decimal: 18,
        supply: Num::from(21000000),
        limit_per_mint: Num::from(1000),
        minted: Num::from(1500),
        deploy_txid,
        deploy_by: "alice".into(),
        deployed_height: 779832,
        deployed_timestamp: 1678248991,
        deploy_position: 1,
        finish_txid: None,
        finish_timestamp: None,
        last_updated_block: 779900,
      })
      .unwrap();
    writer
      .update_balances(&[Balance {
        tick: "Ordi".into(),
        address: "bc1qalice".into(),
        available: "1000.5".parse().unwrap(),
        transferable: "499.5".parse().unwrap(),
        last_updated_block: 779900,
      }])
      .unwrap();
    writer.commit().unwrap();

    (dir, store)
  }

  #[test]
  fn balance_of_holder() {
    let (_dir, store) = store();
    assert_eq!(
      balance(&store, "ORDI", "bc1qalice").unwrap(),
      BalanceOutput {
        tick: "Ordi".into(),
        address: "bc1qalice".into(),
        available: "1000.5".into(),
        transferable: "499.5".into(),
        overall: "1500.0".into(),
        last_updated_block: 779900,
      }
    );
  }

  #[test]
  fn balance_of_stranger_is_zero() {
    let (_dir, store) = store();
    let output = balance(&store, "ordi", "bc1qbob").unwrap();
    assert_eq!(output.available, "0");
    assert_eq!(output.overall, "0");
    assert_eq!(output.last_updated_block, 0);
  }

  #[test]
  fn unknown_tick() {
    let (_dir, store) = store();
    assert_eq!(
      balance(&store, "pepe", "bc1qalice").unwrap_err().to_string(),
      "tick pepe has not been deployed"
    );
    assert!(tick(&store, "pepe").is_err());
  }

  #[test]
  fn tick_details() {
    let (_dir, store) = store();
    let output = tick(&store, "ordi").unwrap();
    assert_eq!(output.tick, "Ordi");
    assert_eq!(output.minted, "1500");
    assert_eq!(output.deployed_at, "2023-03-08T04:16:31+00:00");
    assert_eq!(output.finished_at, None);
  }
}
