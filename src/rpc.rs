use {
  self::model::{Block, BlockSummary, Transaction},
  super::*,
  bitcoincore_rpc::{Auth, Client, RpcApi},
  serde::de::DeserializeOwned,
  serde_json::{json, Value},
};

pub(crate) mod model;
#[cfg(test)]
pub(crate) mod testing;

const MAX_ATTEMPTS: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);
const TRANSACTION_FETCH_PARTITION: usize = 10;

/// Read access to the chain node. The node is trusted as ground truth.
pub(crate) trait ChainOracle: Sync {
  fn block_count(&self) -> Result<u64>;

  fn block_hash(&self, height: u64) -> Result<BlockHash>;

  /// Block with every transaction decoded in verbose form, in block order.
  fn block(&self, hash: &BlockHash) -> Result<Block>;

  fn transaction(&self, txid: &Txid) -> Result<Transaction>;

  fn block_at(&self, height: u64) -> Result<Block> {
    let hash = self.block_hash(height)?;
    self.block(&hash)
  }
}

pub(crate) struct RpcOracle {
  client: Client,
  chain: Chain,
  fetch_pool: WorkerPool,
}

impl RpcOracle {
  pub(crate) fn open(settings: &Settings) -> Result<Self> {
    let auth = match (
      &settings.rpc_user,
      &settings.rpc_pass,
      &settings.cookie_file,
    ) {
      (Some(user), Some(pass), _) => Auth::UserPass(user.clone(), pass.clone()),
      (_, _, Some(cookie_file)) => Auth::CookieFile(cookie_file.clone()),
      _ => Auth::None,
    };

    log::info!(
      "Connecting to {} node RPC server at {}",
      settings.chain,
      settings.rpc_url
    );

    let client = Client::new(&settings.rpc_url, auth).context("failed to connect to RPC URL")?;

    Ok(Self {
      client,
      chain: settings.chain,
      fetch_pool: WorkerPool::new(TRANSACTION_FETCH_PARTITION, TRANSACTION_FETCH_PARTITION)?,
    })
  }

  /// Every call is attempted a fixed number of times with a fixed pause in between.
  fn call<T: DeserializeOwned>(&self, method: &str, args: &[Value]) -> Result<T> {
    let mut attempt = 0;
    loop {
      attempt += 1;
      match self.client.call::<T>(method, args) {
        Ok(result) => return Ok(result),
        Err(err) if attempt < MAX_ATTEMPTS => {
          log::warn!(
            "{method} failed ({attempt}/{MAX_ATTEMPTS}), retrying in {}s: {err}",
            RETRY_BACKOFF.as_secs()
          );
          thread::sleep(RETRY_BACKOFF);
        }
        Err(err) => {
          return Err(err).with_context(|| format!("{method} failed after {MAX_ATTEMPTS} attempts"))
        }
      }
    }
  }
}

impl ChainOracle for RpcOracle {
  fn block_count(&self) -> Result<u64> {
    self.call("getblockcount", &[])
  }

  fn block_hash(&self, height: u64) -> Result<BlockHash> {
    self.call("getblockhash", &[json!(height)])
  }

  fn block(&self, hash: &BlockHash) -> Result<Block> {
    if self.chain.embeds_transactions() {
      return self.call("getblock", &[json!(hash), json!(3)]);
    }

    let summary: BlockSummary = self.call("getblock", &[json!(hash)])?;
    let txdata = self
      .fetch_pool
      .run(&summary.tx, |txid| self.transaction(txid))?;

    Ok(Block {
      hash: summary.hash,
      height: summary.height,
      time: summary.time,
      txdata,
    })
  }

  fn transaction(&self, txid: &Txid) -> Result<Transaction> {
    let tx: Transaction = self.call("getrawtransaction", &[json!(txid), json!(2)])?;
    if tx.txid != *txid {
      bail!(
        "getrawtransaction returned {} when asked for {txid}",
        tx.txid
      );
    }
    Ok(tx)
  }
}
