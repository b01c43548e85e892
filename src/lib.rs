#![allow(
  clippy::too_many_arguments,
  clippy::type_complexity,
  clippy::result_large_err
)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    arguments::Arguments,
    config::{Config, Settings},
    options::Options,
    subcommand::{Subcommand, SubcommandResult},
    worker_pool::WorkerPool,
  },
  anyhow::{anyhow, bail, Context, Error},
  bitcoin::{BlockHash, Txid},
  chrono::{DateTime, TimeZone, Utc},
  clap::Parser,
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  std::{
    collections::{BTreeMap, HashMap},
    env,
    fmt::{self, Display, Formatter},
    fs,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::atomic::{self, AtomicBool},
    thread,
    time::{Duration, Instant},
  },
};

pub use crate::{
  chain::Chain,
  index::envelope::{self, Envelope},
  inscription_id::InscriptionId,
};

mod arguments;
pub mod chain;
mod config;
pub mod index;
pub mod inscription_id;
mod logger;
mod okx;
mod options;
mod rpc;
mod subcommand;
mod worker_pool;

type Result<T = (), E = Error> = std::result::Result<T, E>;

static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

fn shutting_down() -> bool {
  SHUTTING_DOWN.load(atomic::Ordering::Relaxed)
}

fn timestamp(seconds: u32) -> DateTime<Utc> {
  Utc
    .timestamp_opt(seconds.into(), 0)
    .single()
    .unwrap_or_default()
}

pub fn main() {
  let args = Arguments::parse();

  let log_dir = match args.options.log_dir() {
    Ok(dir) => dir,
    Err(err) => {
      eprintln!("error: failed to resolve log directory: {err}");
      process::exit(1);
    }
  };
  if let Err(err) = logger::init(args.options.log_level, &log_dir) {
    eprintln!("error: failed to initialize logger: {err}");
    process::exit(1);
  }

  if let Err(err) = ctrlc::set_handler(move || {
    if SHUTTING_DOWN.fetch_or(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    println!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");
  }) {
    log::warn!("failed to set <CTRL-C> handler: {err}");
  }

  match args.run() {
    Err(err) => {
      log::error!("{err:#}");
      eprintln!("error: {err}");
      err
        .chain()
        .skip(1)
        .for_each(|cause| eprintln!("because: {cause}"));
      if env::var_os("RUST_BACKTRACE")
        .map(|val| val == "1")
        .unwrap_or_default()
      {
        eprintln!("{}", err.backtrace());
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print_json();
      }
    }
  }
}
