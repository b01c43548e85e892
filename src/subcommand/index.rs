use {
  super::*,
  crate::{index::BlockIndexer, rpc::RpcOracle},
};

#[derive(Debug, Parser)]
pub(crate) enum IndexSubcommand {
  #[command(about = "Index blocks up to the confirmed chain tip, or an explicit range")]
  Run(Run),
}

impl IndexSubcommand {
  pub(crate) fn run(self, options: &Options, settings: &Settings) -> SubcommandResult {
    match self {
      Self::Run(run) => run.run(options, settings),
    }
  }
}

#[derive(Debug, Parser)]
pub(crate) struct Run {
  #[arg(long, help = "Index blocks after <START>. Requires --end.")]
  start: Option<u64>,
  #[arg(long, help = "Index blocks up to and including <END>. Requires --start.")]
  end: Option<u64>,
}

impl Run {
  fn run(self, options: &Options, settings: &Settings) -> SubcommandResult {
    let store = open_store(options, settings)?;
    let oracle = RpcOracle::open(settings)?;

    BlockIndexer::new(&oracle, &store, settings).index_range(self.start, self.end)?;

    Ok(None)
  }
}
