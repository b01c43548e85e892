mod error;
mod msg_executor;
mod num;
mod operation;
mod params;

use self::error::Error;
pub(crate) use self::{
  error::JSONError,
  msg_executor::{execute, ExecutionContext},
  num::Num,
  operation::{deserialize_operation, Operation as BRC20Operation},
  params::PATCH_REASON_PREFIX,
};
