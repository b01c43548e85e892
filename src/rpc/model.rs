//! Typed view of the node's verbose JSON-RPC responses. Everything the indexer needs is
//! decoded here once; nothing downstream touches raw JSON.

use {super::*, bitcoin::Amount};

/// Hex-encoded bytes as returned by the node, decoded on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HexBytes(pub(crate) Vec<u8>);

impl HexBytes {
  pub(crate) fn as_slice(&self) -> &[u8] {
    &self.0
  }
}

impl<'de> Deserialize<'de> for HexBytes {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    hex::decode(s).map(Self).map_err(serde::de::Error::custom)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Block {
  pub(crate) hash: BlockHash,
  pub(crate) height: u64,
  pub(crate) time: u32,
  #[serde(rename = "tx")]
  pub(crate) txdata: Vec<Transaction>,
}

/// `getblock` answer when the node only lists transaction ids.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BlockSummary {
  pub(crate) hash: BlockHash,
  pub(crate) height: u64,
  pub(crate) time: u32,
  pub(crate) tx: Vec<Txid>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Transaction {
  pub(crate) txid: Txid,
  #[serde(default)]
  pub(crate) vin: Vec<TxIn>,
  #[serde(default)]
  pub(crate) vout: Vec<TxOut>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TxIn {
  /// Absent for coinbase inputs.
  #[serde(default)]
  pub(crate) txid: Option<Txid>,
  #[serde(default)]
  pub(crate) vout: Option<u32>,
  #[serde(rename = "scriptSig", default)]
  pub(crate) script_sig: Option<ScriptSig>,
  #[serde(default)]
  pub(crate) txinwitness: Vec<HexBytes>,
  #[serde(default)]
  pub(crate) prevout: Option<PrevOut>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScriptSig {
  pub(crate) hex: HexBytes,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PrevOut {
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub(crate) value: Amount,
  #[serde(rename = "scriptPubKey", default)]
  pub(crate) script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TxOut {
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub(crate) value: Amount,
  #[serde(rename = "scriptPubKey", default)]
  pub(crate) script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ScriptPubKey {
  #[serde(default)]
  pub(crate) address: Option<String>,
  #[serde(default)]
  pub(crate) addresses: Vec<String>,
}

impl ScriptPubKey {
  /// Newer nodes report `address`, older ones `addresses`. Non-standard scripts have neither.
  pub(crate) fn owner(&self) -> String {
    self
      .address
      .clone()
      .or_else(|| self.addresses.first().cloned())
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode_verbose_transaction() {
    let tx: Transaction = serde_json::from_value(serde_json::json!({
      "txid": "1111111111111111111111111111111111111111111111111111111111111111",
      "vin": [
        {
          "coinbase": "03",
          "sequence": 4294967295u64
        },
        {
          "txid": "2222222222222222222222222222222222222222222222222222222222222222",
          "vout": 1,
          "scriptSig": { "asm": "", "hex": "" },
          "txinwitness": ["00", "0063036f7264"],
          "prevout": {
            "value": 0.0001,
            "scriptPubKey": { "address": "bc1qalice" }
          }
        }
      ],
      "vout": [
        {
          "value": 0.00000546,
          "n": 0,
          "scriptPubKey": { "addresses": ["DBob"] }
        },
        {
          "value": 1.5,
          "n": 1,
          "scriptPubKey": { "type": "nulldata" }
        }
      ]
    }))
    .unwrap();

    assert!(tx.vin[0].txid.is_none());
    assert_eq!(tx.vin[1].vout, Some(1));
    assert_eq!(
      tx.vin[1].txinwitness[1].as_slice(),
      &[0x00, 0x63, 0x03, b'o', b'r', b'd']
    );
    let prevout = tx.vin[1].prevout.as_ref().unwrap();
    assert_eq!(prevout.value.to_sat(), 10_000);
    assert_eq!(prevout.script_pub_key.owner(), "bc1qalice");
    assert_eq!(tx.vout[0].value.to_sat(), 546);
    assert_eq!(tx.vout[0].script_pub_key.owner(), "DBob");
    assert_eq!(tx.vout[1].script_pub_key.owner(), "");
    assert_eq!(tx.vout[1].value.to_sat(), 150_000_000);
  }

  #[test]
  fn invalid_hex_is_rejected() {
    assert!(serde_json::from_str::<HexBytes>("\"zz\"").is_err());
  }
}
