use {super::*, crate::rpc::model::TxIn, clap::ValueEnum};

/// `OP_FALSE OP_IF OP_PUSHBYTES_3 "ord"`
const TAPSCRIPT_MARKER: [u8; 6] = [0x00, 0x63, 0x03, b'o', b'r', b'd'];

/// `OP_PUSHBYTES_3 "ord" OP_PUSHNUM_1`
const SCRIPT_SIG_MARKER: [u8; 5] = [0x03, b'o', b'r', b'd', 0x51];

#[derive(
  Default, ValueEnum, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
  #[default]
  Btc,
  Ltc,
  Doge,
}

impl Chain {
  /// Byte sequence that opens an inscription envelope on this chain.
  pub fn marker(self) -> &'static [u8] {
    match self {
      Self::Btc | Self::Ltc => &TAPSCRIPT_MARKER,
      Self::Doge => &SCRIPT_SIG_MARKER,
    }
  }

  /// Dogecoin's marker ends in `OP_1`, which already is the content-type tag.
  pub fn initial_tag(self) -> Option<u8> {
    match self {
      Self::Btc | Self::Ltc => None,
      Self::Doge => Some(1),
    }
  }

  pub fn default_protocol(self) -> &'static str {
    match self {
      Self::Btc => "brc-20",
      Self::Ltc => "ltc-20",
      Self::Doge => "drc-20",
    }
  }

  pub fn default_rpc_port(self) -> u16 {
    match self {
      Self::Btc => 8332,
      Self::Ltc => 9332,
      Self::Doge => 22555,
    }
  }

  /// Height just below the first block that can carry a ledger operation.
  pub fn default_genesis_block(self) -> u64 {
    match self {
      Self::Btc => 779831,
      Self::Ltc | Self::Doge => 0,
    }
  }

  pub fn indexer_checkpoint(self) -> String {
    format!("{self}.ord.indexer.block")
  }

  pub fn validator_checkpoint(self) -> String {
    format!("{self}.ord.validator.block")
  }

  /// Dogecoin nodes return txids only for `getblock`; transactions are fetched one by one.
  pub fn embeds_transactions(self) -> bool {
    !matches!(self, Self::Doge)
  }

  pub(crate) fn candidate_scripts(self, input: &TxIn) -> Vec<&[u8]> {
    match self {
      Self::Doge => input
        .script_sig
        .as_ref()
        .map(|script_sig| vec![script_sig.hex.as_slice()])
        .unwrap_or_default(),
      Self::Btc | Self::Ltc => {
        let witness = &input.txinwitness;
        if witness.len() < 2 {
          return Vec::new();
        }
        witness[witness.len() - 2..]
          .iter()
          .map(|item| item.as_slice())
          .collect()
      }
    }
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Btc => "btc",
        Self::Ltc => "ltc",
        Self::Doge => "doge",
      }
    )
  }
}

impl FromStr for Chain {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "btc" => Ok(Self::Btc),
      "ltc" => Ok(Self::Ltc),
      "doge" => Ok(Self::Doge),
      _ => bail!("invalid chain `{s}`"),
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, crate::rpc::model::HexBytes};

  fn input(witness: &[&[u8]], script_sig: Option<&[u8]>) -> TxIn {
    TxIn {
      txid: None,
      vout: None,
      script_sig: script_sig.map(|hex| crate::rpc::model::ScriptSig {
        hex: HexBytes(hex.to_vec()),
      }),
      txinwitness: witness.iter().map(|item| HexBytes(item.to_vec())).collect(),
      prevout: None,
    }
  }

  #[test]
  fn checkpoint_keys() {
    assert_eq!(Chain::Btc.indexer_checkpoint(), "btc.ord.indexer.block");
    assert_eq!(Chain::Doge.validator_checkpoint(), "doge.ord.validator.block");
  }

  #[test]
  fn from_str() {
    assert_eq!("LTC".parse::<Chain>().unwrap(), Chain::Ltc);
    assert!("eth".parse::<Chain>().is_err());
  }

  #[test]
  fn witness_candidates_are_last_two_items() {
    let input = input(&[b"sig", b"script", b"control"], None);
    assert_eq!(
      Chain::Btc.candidate_scripts(&input),
      vec![b"script".as_slice(), b"control".as_slice()]
    );
  }

  #[test]
  fn short_witness_has_no_candidates() {
    assert!(Chain::Ltc
      .candidate_scripts(&input(&[b"sig"], None))
      .is_empty());
  }

  #[test]
  fn dogecoin_inspects_script_sig() {
    let input = input(&[b"a", b"b"], Some(b"scriptsig"));
    assert_eq!(
      Chain::Doge.candidate_scripts(&input),
      vec![b"scriptsig".as_slice()]
    );
  }
}
