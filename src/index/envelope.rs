//! Ordinal envelope decoding. Parsing is total: any byte string yields an envelope, which is empty
//! when no marker or no content was found.

use super::*;

const OP_PUSHBYTES_75: u8 = 0x4b;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

/// Pushes shorter than `"text/plain".len()` are neither a content type nor content.
const MIN_FIELD_LEN: usize = 10;

const CONTENT_TYPE_TAG: u8 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
  /// Lower-cased and trimmed.
  pub content_type: String,
  pub content: Vec<u8>,
}

impl Envelope {
  pub fn is_empty(&self) -> bool {
    self.content_type.is_empty() && self.content.is_empty()
  }
}

pub fn parse(chain: Chain, script: &[u8]) -> Envelope {
  let mut envelope = Envelope::default();

  let Some(mut cursor) = body_start(script, chain.marker()) else {
    return envelope;
  };

  // dogecoin envelopes open with the content-type push and no tag, so start as if tag 1 was read
  let mut tag = chain.initial_tag();

  while let Some((push, next)) = next_push(script, cursor) {
    cursor = next;

    let Some(push) = push else {
      continue;
    };

    if push.len() == 1 {
      tag = Some(push[0]);
    }

    if push.len() < MIN_FIELD_LEN {
      continue;
    }

    if tag == Some(CONTENT_TYPE_TAG) && envelope.content_type.is_empty() {
      envelope.content_type = String::from_utf8_lossy(push).trim().to_lowercase();
    } else if !envelope.content_type.is_empty() {
      envelope.content = push.to_vec();
      break;
    }
  }

  envelope
}

/// Index just past the first marker that is followed by at least one byte.
fn body_start(script: &[u8], marker: &[u8]) -> Option<usize> {
  if script.len() <= marker.len() {
    return None;
  }

  script
    .windows(marker.len())
    .take(script.len() - marker.len())
    .position(|window| window == marker)
    .map(|position| position + marker.len())
}

/// Decodes the opcode at `cursor`. Returns the pushed bytes, `None` for opcodes that push
/// nothing, and the cursor of the following opcode. Returns `None` altogether once the script is
/// exhausted or a push runs past its end.
fn next_push(script: &[u8], cursor: usize) -> Option<(Option<&[u8]>, usize)> {
  let opcode = *script.get(cursor)?;
  let start = cursor + 1;

  let (len, start) = match opcode {
    1..=OP_PUSHBYTES_75 => (usize::from(opcode), start),
    OP_PUSHDATA1 => (usize::from(*script.get(start)?), start + 1),
    OP_PUSHDATA2 => {
      let bytes = script.get(start..start + 2)?;
      (usize::from(u16::from_le_bytes([bytes[0], bytes[1]])), start + 2)
    }
    OP_PUSHDATA4 => {
      let bytes = script.get(start..start + 4)?;
      let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
      (usize::try_from(len).ok()?, start + 4)
    }
    _ => return Some((None, start)),
  };

  let end = start.checked_add(len)?;
  Some((Some(script.get(start..end)?), end))
}
