pub use self::operation::{
  Operation, OperationKey, OperationKeyValue, OperationType, SatRange, Status,
};

pub mod operation;
