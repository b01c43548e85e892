use {
  super::*,
  log::LevelFilter,
  log4rs::{
    append::{
      console::ConsoleAppender,
      rolling_file::{
        policy::compound::{
          roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
        },
        RollingFileAppender,
      },
    },
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
  },
};

const LOG_FILE: &str = "ord-ledger.log";
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} [{M}] {m}{n}";
const MAX_LOG_FILE_SIZE: u64 = 100 * 1024 * 1024;
const MAX_ROLLED_FILES: u32 = 10;

pub(crate) fn init(level: LevelFilter, log_dir: &Path) -> Result<log4rs::Handle> {
  fs::create_dir_all(log_dir)
    .with_context(|| format!("failed to create log dir `{}`", log_dir.display()))?;

  let stdout = ConsoleAppender::builder()
    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
    .build();

  let log_file = log_dir.join(LOG_FILE);
  // rolled files ending in `.gz` are compressed
  let roller = FixedWindowRoller::builder()
    .base(1)
    .build(
      &format!("{}.{{}}.gz", log_file.display()),
      MAX_ROLLED_FILES,
    )
    .map_err(|err| anyhow!("failed to build log roller: {err}"))?;
  let policy = CompoundPolicy::new(
    Box::new(SizeTrigger::new(MAX_LOG_FILE_SIZE)),
    Box::new(roller),
  );
  let file = RollingFileAppender::builder()
    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
    .build(&log_file, Box::new(policy))
    .with_context(|| format!("failed to open log file `{}`", log_file.display()))?;

  let config = Config::builder()
    .appender(Appender::builder().build("stdout", Box::new(stdout)))
    .appender(Appender::builder().build("file", Box::new(file)))
    .logger(Logger::builder().build("redb", LevelFilter::Warn))
    .logger(Logger::builder().build("bitcoincore_rpc", LevelFilter::Warn))
    .build(
      Root::builder()
        .appender("stdout")
        .appender("file")
        .build(level),
    )?;

  Ok(log4rs::init_config(config)?)
}
