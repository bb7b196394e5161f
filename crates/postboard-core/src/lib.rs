pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod render;
pub mod storage;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting postboard"
  );
  debug!(
    overrides = ?pre.rc_overrides,
    "preprocessed rc overrides"
  );

  let mut cfg = config::Config::load(
    cli.rc_file.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let storage =
    storage::FileStore::open(&data_dir)
      .with_context(|| {
        format!(
          "failed to open comment store \
           at {}",
          data_dir.display()
        )
      })?;

  let source = client::HttpSource::new(
    &cfg.api_base(),
    cfg.api_timeout()?
  )?;
  info!(api = %source.base(), "using remote post source");

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let command = cli
    .command
    .unwrap_or(cli::Command::List {
      tags: vec![]
    });

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(async {
    let mut session =
      commands::Session::new(
        &source,
        &storage,
        &mut renderer
      );
    session.run(command).await
  })?;

  info!("done");
  Ok(())
}
