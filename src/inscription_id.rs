use super::*;

/// `<txid>i<index>`. Only the first inscription of a transaction is recognized, so `index` is
/// always zero for ids this crate creates.
#[derive(Debug, PartialEq, Copy, Clone, Hash, Eq, PartialOrd, Ord)]
pub struct InscriptionId {
  pub txid: Txid,
  pub index: u32,
}

impl From<Txid> for InscriptionId {
  fn from(txid: Txid) -> Self {
    Self { txid, index: 0 }
  }
}

impl Display for InscriptionId {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}i{}", self.txid, self.index)
  }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError {
  #[error("invalid character: '{0}'")]
  Character(char),
  #[error("invalid length: {0}")]
  Length(usize),
  #[error("invalid separator: '{0}'")]
  Separator(char),
  #[error("invalid txid: {0}")]
  Txid(bitcoin::hashes::hex::Error),
  #[error("invalid index: {0}")]
  Index(std::num::ParseIntError),
}

impl FromStr for InscriptionId {
  type Err = ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if let Some(char) = s.chars().find(|char| !char.is_ascii()) {
      return Err(ParseError::Character(char));
    }

    const TXID_LEN: usize = 64;
    const MIN_LEN: usize = TXID_LEN + 2;

    if s.len() < MIN_LEN {
      return Err(ParseError::Length(s.len()));
    }

    let txid = &s[..TXID_LEN];

    let separator = s.chars().nth(TXID_LEN).unwrap_or_default();

    if separator != 'i' {
      return Err(ParseError::Separator(separator));
    }

    let vout = &s[TXID_LEN + 1..];

    Ok(Self {
      txid: txid.parse().map_err(ParseError::Txid)?,
      index: vout.parse().map_err(ParseError::Index)?,
    })
  }
}

impl Serialize for InscriptionId {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for InscriptionId {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    String::deserialize(deserializer)?
      .parse()
      .map_err(serde::de::Error::custom)
  }
}
