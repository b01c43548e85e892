use {super::*, crate::okx::protocol::LedgerValidator};

#[derive(Debug, Parser)]
pub(crate) enum ValidateSubcommand {
  #[command(about = "Validate every indexed block after the validator checkpoint")]
  Run,
  #[command(about = "Rebuild selected ticks over a block range")]
  Revalidate(Revalidate),
}

impl ValidateSubcommand {
  pub(crate) fn run(self, options: &Options, settings: &Settings) -> SubcommandResult {
    let store = open_store(options, settings)?;
    let validator = LedgerValidator::new(&store, settings)?;

    match self {
      Self::Run => validator.run()?,
      Self::Revalidate(revalidate) => {
        validator.revalidate(revalidate.start, revalidate.end, &revalidate.ticks)?
      }
    }

    Ok(None)
  }
}

#[derive(Debug, Parser)]
pub(crate) struct Revalidate {
  #[arg(long, value_delimiter = ',', required = true, help = "Rebuild <TICKS>, comma separated.")]
  ticks: Vec<String>,
  #[arg(long, help = "Replay blocks after <START>.")]
  start: u64,
  #[arg(long, help = "Replay blocks up to and including <END>.")]
  end: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn revalidate_arguments() {
    let arguments = Arguments::try_parse_from([
      "ord-ledger",
      "validate",
      "revalidate",
      "--ticks",
      "ordi,SATS",
      "--start",
      "779830",
      "--end",
      "780000",
    ])
    .unwrap();

    match arguments.subcommand {
      Subcommand::Validate(ValidateSubcommand::Revalidate(revalidate)) => {
        assert_eq!(revalidate.ticks, vec!["ordi".to_string(), "SATS".to_string()]);
        assert_eq!(revalidate.start, 779830);
        assert_eq!(revalidate.end, 780000);
      }
      subcommand => panic!("unexpected subcommand {subcommand:?}"),
    }
  }

  #[test]
  fn revalidate_needs_ticks() {
    assert!(Arguments::try_parse_from([
      "ord-ledger",
      "validate",
      "revalidate",
      "--start",
      "1",
      "--end",
      "2",
    ])
    .is_err());
  }
}
