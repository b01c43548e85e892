use {
  super::*,
  crate::okx::datastore::LedgerStore,
  std::io,
  sysinfo::{System, SystemExt},
};

mod index;
mod ledger;
mod validate;

pub(crate) trait Output: Send {
  fn print_json(&self);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print_json(&self) {
    if let Err(err) = serde_json::to_writer_pretty(io::stdout(), self) {
      log::error!("failed to write output: {err}");
      return;
    }
    println!();
  }
}

pub(crate) type SubcommandResult = Result<Option<Box<dyn Output>>>;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(subcommand, about = "Index ledger operations from the chain")]
  Index(index::IndexSubcommand),
  #[command(subcommand, about = "Validate indexed ledger operations")]
  Validate(validate::ValidateSubcommand),
  #[command(subcommand, about = "Query ticks and balances")]
  Ledger(ledger::LedgerSubcommand),
}

impl Subcommand {
  pub(crate) fn run(self, options: Options) -> SubcommandResult {
    let settings = options.settings()?;
    match self {
      Self::Index(index) => index.run(&options, &settings),
      Self::Validate(validate) => validate.run(&options, &settings),
      Self::Ledger(ledger) => ledger.run(&options, &settings),
    }
  }
}

/// Opens the ledger database. Without `--db-cache-size` a quarter of system memory is used.
fn open_store(options: &Options, settings: &Settings) -> Result<LedgerStore> {
  let db_cache_size = match options.db_cache_size {
    Some(db_cache_size) => db_cache_size,
    None => {
      let mut sys = System::new();
      sys.refresh_memory();
      usize::try_from(sys.total_memory() / 4)?
    }
  };

  log::info!("Setting DB cache size to {} bytes", db_cache_size);

  let path = options.ledger_path()?;
  LedgerStore::open(&path, Some(db_cache_size), settings.write_workers)
    .with_context(|| format!("failed to open ledger database `{}`", path.display()))
}
