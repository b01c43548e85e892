use {
  self::transfer::SpentOutputCache,
  super::*,
  crate::{
    okx::{
      datastore::{
        brc20::TokenInfo,
        ord::{Operation, OperationType, SatRange, Status},
        LedgerReader, LedgerReaderWriter, LedgerStore, LedgerWriter,
      },
      protocol::brc20::{deserialize_operation, BRC20Operation, JSONError},
    },
    rpc::{
      model::{Block, Transaction, TxIn},
      ChainOracle,
    },
  },
};

pub mod envelope;
pub(crate) mod transfer;
mod updater;

pub(crate) use self::updater::BlockIndexer;
