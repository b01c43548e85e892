use super::{params::CONTENT_TYPE_PREFIXES, *};

use crate::{
  okx::{
    datastore::{
      brc20::BRC20Error,
      ord::{Operation, OperationType, Status},
      LedgerReader,
    },
    protocol::validator::LedgerState,
  },
  Result,
};
use anyhow::anyhow;
use bitcoin::Txid;
use serde_json::Value;
use std::{collections::HashMap, str::FromStr};

/// What evaluating one operation decided.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Receipt {
  pub(crate) status: Status,
  pub(crate) reason: String,
  pub(crate) valid_amount: Option<Num>,
}

pub(crate) struct ExecutionContext<'a, L: LedgerReader> {
  pub(crate) block: u64,
  pub(crate) protocol: &'a str,
  pub(crate) ledger: &'a L,
  /// Verdicts on inscribe-transfers evaluated earlier in the same block. These take precedence
  /// over what storage says.
  pub(crate) inscribe_transfers: &'a HashMap<Txid, Status>,
}

/// Evaluates `operation` against `state` and applies its effects. Rule failures become an invalid
/// receipt; anything else is fatal.
pub(crate) fn execute<L: LedgerReader>(
  context: &ExecutionContext<L>,
  state: &mut LedgerState,
  operation: &Operation,
) -> Result<Receipt> {
  log::debug!("BRC20 execute operation: {:?}", operation.key());

  let result = if state.contains_token(&operation.tick) {
    match operation.op {
      OperationType::Deploy => process_deploy(context, state, operation),
      OperationType::Mint => process_mint(context, state, operation),
      OperationType::InscribeTransfer => process_inscribe_transfer(context, state, operation),
      OperationType::Transfer => process_transfer(context, state, operation),
    }
  } else {
    Err(Error::BRC20Error(BRC20Error::TickNotFound(
      operation.tick.clone(),
    )))
  };

  let receipt = match result {
    Ok(valid_amount) => Receipt {
      status: Status::Valid,
      reason: String::new(),
      valid_amount,
    },
    Err(Error::BRC20Error(e)) => Receipt {
      status: Status::Invalid,
      reason: e.to_string(),
      valid_amount: None,
    },
    Err(e) => return Err(anyhow!("BRC20 execute exception: {e}")),
  };

  log::debug!("BRC20 operation receipt: {:?}", receipt);

  Ok(receipt)
}

/// Checks shared by every operation kind. Returns the parsed amount, zero for deploys.
fn validate_common<L: LedgerReader>(
  context: &ExecutionContext<L>,
  operation: &Operation,
) -> Result<Num, Error<L>> {
  if operation.from.is_empty() && operation.to.is_empty() {
    return Err(Error::BRC20Error(BRC20Error::MissingAddresses));
  }

  if operation.op != OperationType::Transfer {
    if let Ok(Value::Object(content)) = serde_json::from_slice::<Value>(&operation.content) {
      let protocol = content.get("p").and_then(Value::as_str).unwrap_or_default();
      if !protocol.eq_ignore_ascii_case(context.protocol) {
        return Err(Error::BRC20Error(BRC20Error::ProtocolMismatch(
          context.protocol.to_string(),
        )));
      }
    }

    let content_type = operation.content_type.trim().to_lowercase();
    if !CONTENT_TYPE_PREFIXES
      .iter()
      .any(|prefix| content_type.starts_with(prefix))
    {
      return Err(Error::BRC20Error(BRC20Error::InvalidContentType(
        operation.content_type.clone(),
      )));
    }
  }

  if operation.op == OperationType::Deploy {
    return Ok(Num::zero());
  }

  match Num::from_str(&operation.amount) {
    Ok(amount) if amount.is_positive() => Ok(amount),
    _ => Err(Error::BRC20Error(BRC20Error::InvalidAmount(
      operation.amount.clone(),
    ))),
  }
}

fn process_deploy<L: LedgerReader>(
  context: &ExecutionContext<L>,
  state: &mut LedgerState,
  operation: &Operation,
) -> Result<Option<Num>, Error<L>> {
  validate_common(context, operation)?;

  let token = state
    .token(&operation.tick)
    .ok_or_else(|| BRC20Error::TickNotFound(operation.tick.clone()))?;

  if token.deploy_txid != operation.txid {
    return Err(Error::BRC20Error(BRC20Error::DuplicateTick(
      operation.tick.clone(),
      token.deploy_txid,
    )));
  }

  Ok(None)
}

fn process_mint<L: LedgerReader>(
  context: &ExecutionContext<L>,
  state: &mut LedgerState,
  operation: &Operation,
) -> Result<Option<Num>, Error<L>> {
  let amount = validate_common(context, operation)?;

  let token = state
    .token(&operation.tick)
    .ok_or_else(|| BRC20Error::TickNotFound(operation.tick.clone()))?
    .clone();

  let remaining = token.remaining();

  let verdict = if (token.deployed_timestamp, token.deploy_position)
    > (operation.block_time, operation.position)
  {
    Err(BRC20Error::MintBeforeDeploy(
      operation.tick.clone(),
      operation.block_time,
    ))
  } else if amount > token.limit_per_mint {
    Err(BRC20Error::AmountExceedLimit(
      operation.amount.clone(),
      token.limit_per_mint.clone(),
    ))
  } else if !remaining.is_positive() {
    Err(BRC20Error::TickMinted(token.tick.clone()))
  } else {
    Ok(())
  };

  if let Err(e) = &verdict {
    if !operation.is_patched() {
      return Err(e.clone().into());
    }
  }

  // the last mint only gets what is left and closes the tick.
  let finishes = remaining <= amount;
  let credit = if finishes { remaining } else { amount };

  if token.last_updated_block < context.block {
    if let Some(info) = state.token_mut(&operation.tick) {
      if finishes {
        info.minted = info.supply.clone();
        // a forced mint on an exhausted tick must not take over the finish marker
        if info.finish_txid.is_none() {
          info.finish_txid = Some(operation.txid);
          info.finish_timestamp = Some(operation.block_time);
        }
      } else {
        info.minted = info.minted.checked_add(&credit)?;
      }
    }
  }

  if state.balance_updated_before(&token.tick, &operation.to, context.block) {
    let balance = state.balance_mut(&token.tick, &operation.to);
    balance.available = balance.available.checked_add(&credit)?;
  }

  verdict?;

  Ok(Some(credit))
}

fn process_inscribe_transfer<L: LedgerReader>(
  context: &ExecutionContext<L>,
  state: &mut LedgerState,
  operation: &Operation,
) -> Result<Option<Num>, Error<L>> {
  let amount = validate_common(context, operation)?;

  let tick = state
    .token(&operation.tick)
    .ok_or_else(|| BRC20Error::TickNotFound(operation.tick.clone()))?
    .tick
    .clone();

  let holder = state.balance(&tick, &operation.to);

  let verdict = if holder.available < amount {
    Err(BRC20Error::InsufficientAvailable(holder.available.clone()))
  } else {
    Ok(())
  };

  if let Err(e) = &verdict {
    if !operation.is_patched() {
      return Err(e.clone().into());
    }
  }

  if holder.last_updated_block < context.block {
    let balance = state.balance_mut(&tick, &operation.to);
    balance.available = balance.available.checked_sub(&amount)?;
    balance.transferable = balance.transferable.checked_add(&amount)?;
  }

  verdict?;

  Ok(Some(amount))
}

fn process_transfer<L: LedgerReader>(
  context: &ExecutionContext<L>,
  state: &mut LedgerState,
  operation: &Operation,
) -> Result<Option<Num>, Error<L>> {
  let amount = validate_common(context, operation)?;

  let tick = state
    .token(&operation.tick)
    .ok_or_else(|| BRC20Error::TickNotFound(operation.tick.clone()))?
    .tick
    .clone();

  let sender = state.balance(&tick, &operation.from);

  let verdict = if sender.transferable < amount {
    Err(BRC20Error::InsufficientTransferable(
      sender.transferable.clone(),
    ))
  } else if !inscribe_transfer_is_valid(context, operation)? {
    Err(BRC20Error::InscribeTransferFailed(operation.inscription_id))
  } else {
    Ok(())
  };

  if let Err(e) = &verdict {
    if !operation.is_patched() {
      return Err(e.clone().into());
    }
  }

  if sender.last_updated_block < context.block {
    let balance = state.balance_mut(&tick, &operation.from);
    balance.transferable = balance.transferable.checked_sub(&amount)?;
  }

  if state.balance_updated_before(&tick, &operation.to, context.block) {
    let balance = state.balance_mut(&tick, &operation.to);
    balance.available = balance.available.checked_add(&amount)?;
  }

  verdict?;

  Ok(Some(amount))
}

/// Whether the inscribe-transfer that created the moved inscription was valid.
fn inscribe_transfer_is_valid<L: LedgerReader>(
  context: &ExecutionContext<L>,
  operation: &Operation,
) -> Result<bool, Error<L>> {
  let txid = operation.inscription_id.txid;

  if let Some(status) = context.inscribe_transfers.get(&txid) {
    return Ok(*status == Status::Valid);
  }

  Ok(
    context
      .ledger
      .get_inscription_operation(&txid)
      .map_err(Error::LedgerError)?
      .map_or(false, |inscribed| {
        inscribed.op == OperationType::InscribeTransfer
          && inscribed.tick.eq_ignore_ascii_case(&operation.tick)
          && inscribed.status == Status::Valid
      }),
  )
}
