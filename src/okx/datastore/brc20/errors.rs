use crate::{okx::protocol::brc20::Num, InscriptionId};
use bitcoin::Txid;

/// Rule failures. The `Display` text is what gets stored as an operation's reason.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BRC20Error {
  #[error("The tick:{0} has not been deployed yet.")]
  TickNotFound(String),

  #[error("'from' and 'to' address are both empty")]
  MissingAddresses,

  #[error("not {0} protocol")]
  ProtocolMismatch(String),

  #[error("content-type:{0} is not valid")]
  InvalidContentType(String),

  #[error("The amount:{0} not valid")]
  InvalidAmount(String),

  #[error("The tick:{0} has been deployed at {1}.")]
  DuplicateTick(String, Txid),

  #[error("The tick:{0} has not been deployed before {1}.")]
  MintBeforeDeploy(String, u32),

  #[error("The mint amount:{0} has exceeded mint limit:{1}")]
  AmountExceedLimit(String, Num),

  #[error("The tick:{0} have already been full minted.")]
  TickMinted(String),

  #[error("Insufficient balance for inscription; 'available balance' is only '{0}'")]
  InsufficientAvailable(Num),

  #[error("Insufficient balance for inscription; 'transferable balance' is only '{0}'")]
  InsufficientTransferable(Num),

  #[error("The previous inscribe-transfer tx:{0} failed.")]
  InscribeTransferFailed(InscriptionId),
}
