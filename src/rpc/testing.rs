//! In-memory chain used by the indexer and resolver tests.

use {
  super::{
    model::{Block, HexBytes, PrevOut, ScriptPubKey, ScriptSig, Transaction, TxIn, TxOut},
    ChainOracle,
  },
  crate::{Chain, Result},
  anyhow::anyhow,
  bitcoin::{Amount, BlockHash, Txid},
  std::collections::{BTreeMap, HashMap},
};

#[derive(Default)]
pub(crate) struct FakeOracle {
  blocks: BTreeMap<u64, Block>,
  transactions: HashMap<Txid, Transaction>,
}

impl FakeOracle {
  pub(crate) fn add_block(&mut self, height: u64, time: u32, txdata: Vec<Transaction>) {
    for tx in &txdata {
      self.transactions.insert(tx.txid, tx.clone());
    }
    self.blocks.insert(
      height,
      Block {
        hash: block_hash(height),
        height,
        time,
        txdata,
      },
    );
  }

  /// Registers a transaction that is only reachable through `getrawtransaction`.
  pub(crate) fn add_transaction(&mut self, tx: Transaction) {
    self.transactions.insert(tx.txid, tx);
  }
}

impl ChainOracle for FakeOracle {
  fn block_count(&self) -> Result<u64> {
    Ok(self.blocks.keys().next_back().copied().unwrap_or_default())
  }

  fn block_hash(&self, height: u64) -> Result<BlockHash> {
    self
      .blocks
      .get(&height)
      .map(|block| block.hash)
      .ok_or_else(|| anyhow!("no block at height {height}"))
  }

  fn block(&self, hash: &BlockHash) -> Result<Block> {
    self
      .blocks
      .values()
      .find(|block| block.hash == *hash)
      .cloned()
      .ok_or_else(|| anyhow!("no block {hash}"))
  }

  fn transaction(&self, txid: &Txid) -> Result<Transaction> {
    self
      .transactions
      .get(txid)
      .cloned()
      .ok_or_else(|| anyhow!("no transaction {txid}"))
  }
}

fn block_hash(height: u64) -> BlockHash {
  format!("{:064x}", height + 1)
    .parse()
    .unwrap_or_else(|_| panic!("invalid block hash for height {height}"))
}

pub(crate) fn txid(n: u64) -> Txid {
  format!("{n:064x}").parse().unwrap()
}

pub(crate) fn output(sats: u64, address: &str) -> TxOut {
  TxOut {
    value: Amount::from_sat(sats),
    script_pub_key: ScriptPubKey {
      address: Some(address.into()),
      addresses: Vec::new(),
    },
  }
}

pub(crate) fn spend(txid: Txid, vout: u32) -> TxIn {
  TxIn {
    txid: Some(txid),
    vout: Some(vout),
    script_sig: None,
    txinwitness: Vec::new(),
    prevout: None,
  }
}

/// An input that embeds its previous output, as `getblock` verbosity 3 does.
pub(crate) fn spend_with_prevout(txid: Txid, vout: u32, sats: u64, address: &str) -> TxIn {
  TxIn {
    prevout: Some(PrevOut {
      value: Amount::from_sat(sats),
      script_pub_key: ScriptPubKey {
        address: Some(address.into()),
        addresses: Vec::new(),
      },
    }),
    ..spend(txid, vout)
  }
}

pub(crate) fn tx(txid: Txid, vin: Vec<TxIn>, vout: Vec<TxOut>) -> Transaction {
  Transaction {
    txid,
    vin,
    vout,
  }
}

fn push(script: &mut Vec<u8>, data: &[u8]) {
  match data.len() {
    0 => script.push(0x00),
    len @ 1..=0x4b => script.push(u8::try_from(len).unwrap()),
    len @ 0x4c..=0xff => {
      script.push(0x4c);
      script.push(u8::try_from(len).unwrap());
    }
    len => {
      script.push(0x4d);
      script.extend_from_slice(&u16::try_from(len).unwrap().to_le_bytes());
    }
  }
  script.extend_from_slice(data);
}

/// Marks `input` as carrying an inscription with the given content, in the layout the chain
/// uses: a tapscript witness item, or the scriptSig on Dogecoin.
pub(crate) fn inscribe(chain: Chain, input: TxIn, content_type: &str, content: &[u8]) -> TxIn {
  let mut script = Vec::new();
  match chain {
    Chain::Btc | Chain::Ltc => {
      push(&mut script, &[0xab; 32]);
      script.push(0xac);
      script.extend_from_slice(chain.marker());
      push(&mut script, &[1]);
    }
    Chain::Doge => script.extend_from_slice(chain.marker()),
  }
  push(&mut script, content_type.as_bytes());
  push(&mut script, &[]);
  push(&mut script, content);

  match chain {
    Chain::Btc | Chain::Ltc => {
      script.push(0x68);
      TxIn {
        txinwitness: vec![
          HexBytes(vec![0x01; 64]),
          HexBytes(script),
          HexBytes(vec![0xc0; 33]),
        ],
        ..input
      }
    }
    Chain::Doge => {
      push(&mut script, &[0x30; 71]);
      TxIn {
        script_sig: Some(ScriptSig {
          hex: HexBytes(script),
        }),
        ..input
      }
    }
  }
}
