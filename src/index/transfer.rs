use super::*;

/// Value and owner of the output an input spends.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpentOutput {
  pub(crate) value: u64,
  pub(crate) owner: String,
}

/// Spent outputs of the transaction being indexed, by input index.
pub(crate) type SpentOutputCache = HashMap<usize, SpentOutput>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
  pub(crate) address: String,
  pub(crate) output_index: u32,
  pub(crate) range: SatRange,
}

/// Follows the inscribed sat range of input `input_index` through `tx`, first in first out.
/// Sats that land in no output went to the fee, which is credited to the last input's owner.
pub(crate) fn resolve(
  oracle: &impl ChainOracle,
  tx: &Transaction,
  input_index: usize,
  prior: SatRange,
  cache: &mut SpentOutputCache,
) -> Result<Resolution> {
  if tx.vin.is_empty() || tx.vout.is_empty() {
    bail!("transaction {} has no inputs or no outputs", tx.txid);
  }
  if input_index >= tx.vin.len() {
    bail!("transaction {} has no input {input_index}", tx.txid);
  }

  let mut input_base = 0u64;
  let mut input_total = 0u64;
  for (index, input) in tx.vin.iter().enumerate() {
    let value = spent_output(oracle, tx, index, input, cache)?.value;
    if index < input_index {
      input_base += value;
    }
    input_total += value;
  }

  let mut outputs = tx
    .vout
    .iter()
    .map(|output| (output.value.to_sat(), output.script_pub_key.owner()))
    .collect::<Vec<(u64, String)>>();

  let output_total = outputs.iter().map(|(value, _)| value).sum::<u64>();
  if input_total > output_total {
    let last = tx.vin.len() - 1;
    let fee_owner = spent_output(oracle, tx, last, &tx.vin[last], cache)?
      .owner
      .clone();
    outputs.push((input_total - output_total, fee_owner));
  }

  let mut offsets = Vec::with_capacity(outputs.len());
  let mut offset = 0u64;
  for (value, _) in &outputs {
    offsets.push(offset);
    offset += value;
  }

  let start = input_base + prior.start;
  let end = input_base + prior.end;

  for (index, (value, owner)) in outputs.iter().enumerate().rev() {
    let base = offsets[index];
    if base <= start {
      return Ok(Resolution {
        address: owner.clone(),
        output_index: u32::try_from(index)?,
        range: SatRange {
          start: start - base,
          end: (*value).min(end - base),
        },
      });
    }
  }

  bail!("no output of {} holds sat {start}", tx.txid)
}

fn spent_output<'a>(
  oracle: &impl ChainOracle,
  tx: &Transaction,
  index: usize,
  input: &TxIn,
  cache: &'a mut SpentOutputCache,
) -> Result<&'a SpentOutput> {
  if !cache.contains_key(&index) {
    let spent = match &input.prevout {
      Some(prevout) => SpentOutput {
        value: prevout.value.to_sat(),
        owner: prevout.script_pub_key.owner(),
      },
      None => {
        let (Some(txid), Some(vout)) = (input.txid, input.vout) else {
          bail!("input {index} of {} spends no output", tx.txid);
        };
        let previous = oracle
          .transaction(&txid)
          .with_context(|| format!("failed to look up input {index} of {}", tx.txid))?;
        let output = previous
          .vout
          .get(usize::try_from(vout)?)
          .ok_or_else(|| anyhow!("output {txid}:{vout} spent by {} does not exist", tx.txid))?;
        SpentOutput {
          value: output.value.to_sat(),
          owner: output.script_pub_key.owner(),
        }
      }
    };
    cache.insert(index, spent);
  }

  cache
    .get(&index)
    .ok_or_else(|| anyhow!("spent output cache lost input {index}"))
}
