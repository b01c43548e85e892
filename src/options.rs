use {super::*, log::LevelFilter};

#[derive(Clone, Debug, Parser)]
pub(crate) struct Options {
  #[arg(long, short = 'n', value_enum, default_value_t, help = "Index <CHAIN>.")]
  pub(crate) chain: Chain,
  #[arg(long, short, help = "Load per-chain configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Store ledger and logs in <DATA_DIR>.")]
  pub(crate) data_dir: Option<PathBuf>,
  #[arg(long, help = "Use ledger database at <INDEX>.")]
  pub(crate) index: Option<PathBuf>,
  #[arg(long, help = "Set ledger database cache to <DB_CACHE_SIZE> bytes.")]
  pub(crate) db_cache_size: Option<usize>,
  #[arg(long, help = "Connect to node RPC at <RPC_URL>.")]
  pub(crate) rpc_url: Option<String>,
  #[arg(long, help = "Authenticate to node RPC as <RPC_USER>.")]
  pub(crate) rpc_user: Option<String>,
  #[arg(long, help = "Authenticate to node RPC with <RPC_PASS>.")]
  pub(crate) rpc_pass: Option<String>,
  #[arg(long, help = "Load node RPC cookie file from <COOKIE_FILE>.")]
  pub(crate) cookie_file: Option<PathBuf>,
  #[arg(long, default_value = "info", help = "Log at <LOG_LEVEL>.")]
  pub(crate) log_level: LevelFilter,
  #[arg(long, help = "Write log files to <LOG_DIR>.")]
  pub(crate) log_dir: Option<PathBuf>,
  #[arg(
    long,
    default_value = "8",
    help = "Encode ledger writes with <WRITE_WORKERS> threads."
  )]
  pub(crate) write_workers: usize,
}

impl Options {
  pub(crate) fn data_dir(&self) -> Result<PathBuf> {
    let base = match &self.data_dir {
      Some(data_dir) => data_dir.clone(),
      None => dirs::data_dir()
        .ok_or_else(|| anyhow!("failed to retrieve data dir"))?
        .join("ord-ledger"),
    };

    Ok(base.join(self.chain.to_string()))
  }

  pub(crate) fn log_dir(&self) -> Result<PathBuf> {
    match &self.log_dir {
      Some(log_dir) => Ok(log_dir.clone()),
      None => Ok(self.data_dir()?.join("logs")),
    }
  }

  pub(crate) fn ledger_path(&self) -> Result<PathBuf> {
    match &self.index {
      Some(path) => Ok(path.clone()),
      None => Ok(self.data_dir()?.join("ledger.redb")),
    }
  }

  /// Config file values, overridden by whatever was passed on the command line.
  pub(crate) fn settings(&self) -> Result<Settings> {
    let config = match &self.config {
      Some(path) => Config::load(path)?,
      None => Config::default(),
    };

    let mut chain_config = config.chain(self.chain);
    if self.rpc_url.is_some() {
      chain_config.rpc_url = self.rpc_url.clone();
    }
    if self.rpc_user.is_some() {
      chain_config.rpc_user = self.rpc_user.clone();
    }
    if self.rpc_pass.is_some() {
      chain_config.rpc_pass = self.rpc_pass.clone();
    }
    if self.cookie_file.is_some() {
      chain_config.cookie_file = self.cookie_file.clone();
    }

    Ok(Settings::new(self.chain, chain_config, self.write_workers))
  }
}

#[cfg(test)]
mod tests {
  use {super::*, std::io::Write};

  fn parse(args: &[&str]) -> Options {
    Arguments::try_parse_from(
      ["ord-ledger"]
        .iter()
        .chain(args)
        .chain(["validate", "run"].iter()),
    )
    .unwrap()
    .options
  }

  #[test]
  fn data_dir_is_per_chain() {
    let options = parse(&["--chain", "doge", "--data-dir", "/tmp/ledger"]);
    assert_eq!(
      options.data_dir().unwrap(),
      PathBuf::from("/tmp/ledger/doge")
    );
    assert_eq!(
      options.ledger_path().unwrap(),
      PathBuf::from("/tmp/ledger/doge/ledger.redb")
    );
    assert_eq!(
      options.log_dir().unwrap(),
      PathBuf::from("/tmp/ledger/doge/logs")
    );
  }

  #[test]
  fn index_overrides_ledger_path() {
    let options = parse(&["--index", "/tmp/other.redb"]);
    assert_eq!(
      options.ledger_path().unwrap(),
      PathBuf::from("/tmp/other.redb")
    );
  }

  #[test]
  fn command_line_overrides_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      "btc:\n  rpc_url: http://config:8332\n  rpc_user: alice\n  min_confirmation: 2"
    )
    .unwrap();

    let options = parse(&[
      "--config",
      file.path().to_str().unwrap(),
      "--rpc-url",
      "http://flag:8332",
    ]);
    let settings = options.settings().unwrap();

    assert_eq!(settings.rpc_url, "http://flag:8332");
    assert_eq!(settings.rpc_user.as_deref(), Some("alice"));
    assert_eq!(settings.min_confirmation, 2);
  }

  #[test]
  fn log_level_is_parsed() {
    assert_eq!(parse(&["--log-level", "debug"]).log_level, LevelFilter::Debug);
    assert_eq!(parse(&[]).log_level, LevelFilter::Info);
  }
}
