use super::*;

/// Per-chain settings loaded from a YAML file:
///
/// ```yaml
/// btc:
///   rpc_url: http://127.0.0.1:8332
///   rpc_user: bitcoin
///   rpc_pass: secret
///   min_confirmation: 3
///   genesis_block: 779831
///   protocol: brc-20
/// ```
#[derive(Deserialize, Default, PartialEq, Debug, Clone)]
#[serde(transparent)]
pub(crate) struct Config(pub(crate) BTreeMap<Chain, ChainConfig>);

#[derive(Deserialize, Default, PartialEq, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ChainConfig {
  pub(crate) rpc_url: Option<String>,
  pub(crate) rpc_user: Option<String>,
  pub(crate) rpc_pass: Option<String>,
  pub(crate) cookie_file: Option<PathBuf>,
  pub(crate) min_confirmation: Option<u64>,
  pub(crate) genesis_block: Option<u64>,
  pub(crate) protocol: Option<String>,
}

impl Config {
  pub(crate) fn load(path: &Path) -> Result<Self> {
    let file = fs::File::open(path)
      .with_context(|| format!("failed to open config file `{}`", path.display()))?;
    serde_yaml::from_reader(file)
      .with_context(|| format!("failed to deserialize config file `{}`", path.display()))
  }

  pub(crate) fn chain(&self, chain: Chain) -> ChainConfig {
    self.0.get(&chain).cloned().unwrap_or_default()
  }
}

/// Fully resolved settings for one run against one chain.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct Settings {
  pub(crate) chain: Chain,
  pub(crate) rpc_url: String,
  pub(crate) rpc_user: Option<String>,
  pub(crate) rpc_pass: Option<String>,
  pub(crate) cookie_file: Option<PathBuf>,
  pub(crate) min_confirmation: u64,
  pub(crate) genesis_block: u64,
  pub(crate) protocol: String,
  pub(crate) write_workers: usize,
}

impl Settings {
  pub(crate) fn new(chain: Chain, config: ChainConfig, write_workers: usize) -> Self {
    Self {
      chain,
      rpc_url: config
        .rpc_url
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", chain.default_rpc_port())),
      rpc_user: config.rpc_user,
      rpc_pass: config.rpc_pass,
      cookie_file: config.cookie_file,
      min_confirmation: config.min_confirmation.unwrap_or_default(),
      genesis_block: config
        .genesis_block
        .unwrap_or_else(|| chain.default_genesis_block()),
      protocol: config
        .protocol
        .unwrap_or_else(|| chain.default_protocol().into()),
      write_workers: write_workers.max(1),
    }
  }
}
