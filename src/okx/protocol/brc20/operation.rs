use super::{error::JSONError, params::MAX_DECIMAL_WIDTH, Num};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Decoded inscription payload. `op` is matched case-insensitively.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "op")]
pub enum Operation {
  #[serde(rename = "deploy")]
  Deploy(Deploy),
  #[serde(rename = "mint")]
  Mint(Mint),
  #[serde(rename = "transfer")]
  Transfer(Transfer),
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct Deploy {
  #[serde(deserialize_with = "string_or_number")]
  pub tick: String,
  #[serde(rename = "max", default, deserialize_with = "optional_string_or_number")]
  pub max_supply: Option<String>,
  #[serde(rename = "lim", default, deserialize_with = "optional_string_or_number")]
  pub mint_limit: Option<String>,
  #[serde(rename = "dec", default, deserialize_with = "optional_string_or_number")]
  pub decimals: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct Mint {
  #[serde(deserialize_with = "string_or_number")]
  pub tick: String,
  #[serde(rename = "amt", default, deserialize_with = "optional_string_or_number")]
  pub amount: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct Transfer {
  #[serde(deserialize_with = "string_or_number")]
  pub tick: String,
  #[serde(rename = "amt", default, deserialize_with = "optional_string_or_number")]
  pub amount: Option<String>,
}

impl Operation {
  pub fn tick(&self) -> &str {
    match self {
      Self::Deploy(deploy) => &deploy.tick,
      Self::Mint(mint) => &mint.tick,
      Self::Transfer(transfer) => &transfer.tick,
    }
  }

  /// Amount exactly as inscribed. Deploys carry none.
  pub fn amount(&self) -> String {
    match self {
      Self::Deploy(_) => String::new(),
      Self::Mint(Mint { amount, .. }) | Self::Transfer(Transfer { amount, .. }) => {
        amount.clone().unwrap_or_default()
      }
    }
  }
}

impl Deploy {
  pub fn decimals(&self) -> u8 {
    self
      .decimals
      .as_deref()
      .and_then(|dec| Num::from_str(dec).ok())
      .and_then(|dec| dec.checked_to_u8().ok())
      .unwrap_or(MAX_DECIMAL_WIDTH)
  }

  /// An unparseable supply counts as zero, which leaves nothing to mint.
  pub fn supply(&self) -> Num {
    self
      .max_supply
      .as_deref()
      .and_then(|max| Num::from_str(max).ok())
      .unwrap_or_default()
  }

  /// Defaults to the supply when `lim` is absent.
  pub fn mint_limit(&self) -> Num {
    match self.mint_limit.as_deref() {
      Some(lim) => Num::from_str(lim).unwrap_or_default(),
      None => self.supply(),
    }
  }
}

pub fn deserialize_operation(content: &[u8], protocol: &str) -> Result<Operation, JSONError> {
  let mut value: Value = serde_json::from_slice(content).map_err(|_| JSONError::InvalidJson)?;
  let object = value.as_object_mut().ok_or(JSONError::InvalidJson)?;

  match object.get("p").and_then(Value::as_str) {
    Some(p) if p.eq_ignore_ascii_case(protocol) => {}
    _ => return Err(JSONError::ProtocolMismatch(protocol.to_string())),
  }

  if let Some(Value::String(op)) = object.get_mut("op") {
    *op = op.to_lowercase();
  }

  serde_json::from_value(value).map_err(|e| JSONError::ParseOperationJsonError(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
  String(String),
  Number(serde_json::Number),
}

impl From<Text> for String {
  fn from(text: Text) -> Self {
    match text {
      Text::String(s) => s,
      Text::Number(n) => n.to_string(),
    }
  }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Text::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Text>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deploy_deserialize() {
    let json_str = r##"{
  "p": "brc-20",
  "op": "deploy",
  "tick": "ordi",
  "max": "21000000",
  "lim": "1000"
}"##;

    let operation = deserialize_operation(json_str.as_bytes(), "brc-20").unwrap();
    assert_eq!(
      operation,
      Operation::Deploy(Deploy {
        tick: "ordi".to_string(),
        max_supply: Some("21000000".to_string()),
        mint_limit: Some("1000".to_string()),
        decimals: None,
      })
    );
    match operation {
      Operation::Deploy(deploy) => {
        assert_eq!(deploy.decimals(), 18);
        assert_eq!(deploy.supply(), Num::from(21000000));
        assert_eq!(deploy.mint_limit(), Num::from(1000));
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn test_mint_deserialize() {
    assert_eq!(
      deserialize_operation(
        br#"{"p":"brc-20","op":"mint","tick":"ordi","amt":"1000"}"#,
        "brc-20"
      )
      .unwrap(),
      Operation::Mint(Mint {
        tick: "ordi".to_string(),
        amount: Some("1000".to_string()),
      })
    );
  }

  #[test]
  fn test_protocol_and_op_are_case_insensitive() {
    let operation = deserialize_operation(
      br#"{"p":"DRC-20","op":"Transfer","tick":"dogi","amt":"50"}"#,
      "drc-20",
    )
    .unwrap();
    assert_eq!(operation.tick(), "dogi");
    assert_eq!(operation.amount(), "50");
    assert!(matches!(operation, Operation::Transfer(_)));
  }

  #[test]
  fn test_numbers_are_accepted_as_strings() {
    let operation = deserialize_operation(
      br#"{"p":"ltc-20","op":"deploy","tick":"fomo","max":21000000,"dec":8}"#,
      "ltc-20",
    )
    .unwrap();
    match operation {
      Operation::Deploy(deploy) => {
        assert_eq!(deploy.max_supply.as_deref(), Some("21000000"));
        assert_eq!(deploy.decimals(), 8);
        assert_eq!(deploy.mint_limit(), Num::from(21000000));
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn test_unparseable_limit_is_zero() {
    let operation = deserialize_operation(
      br#"{"p":"brc-20","op":"deploy","tick":"abcd","max":"100","lim":"lots"}"#,
      "brc-20",
    )
    .unwrap();
    match operation {
      Operation::Deploy(deploy) => assert_eq!(deploy.mint_limit(), Num::zero()),
      _ => unreachable!(),
    }
  }

  #[test]
  fn test_rejects() {
    assert_eq!(
      deserialize_operation(b"not json", "brc-20").unwrap_err(),
      JSONError::InvalidJson
    );
    assert_eq!(
      deserialize_operation(b"[1,2]", "brc-20").unwrap_err(),
      JSONError::InvalidJson
    );
    assert_eq!(
      deserialize_operation(br#"{"p":"ltc-20","op":"mint","tick":"a"}"#, "brc-20").unwrap_err(),
      JSONError::ProtocolMismatch("brc-20".to_string())
    );
    assert!(matches!(
      deserialize_operation(br#"{"p":"brc-20","op":"burn","tick":"ordi"}"#, "brc-20"),
      Err(JSONError::ParseOperationJsonError(_))
    ));
  }
}
