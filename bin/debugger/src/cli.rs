//! Contains the debugger CLI.

use crate::{
    fixture::{Fixture, RecordedExecutor},
    flags::{TraceArgs, load_config},
};
use anyhow::Result;
use clap::Parser;
use std::{io::Write, path::PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use zkr_cli::{LogArgs, LogConfig, cli_styles};
use zkr_debug::BlockDebugger;
use zkr_executor::TracingEventLog;

/// Re-executes a stored L2 block and prints the trace of every transaction.
#[derive(Parser, Debug)]
#[command(name = "zkr-debugger", about = "zkEVM block debugger", styles = cli_styles())]
pub struct Cli {
    /// Global args
    #[command(flatten)]
    pub v: LogArgs,

    /// Path to the network configuration, TOML or JSON.
    #[arg(long, short = 'c', env = "ZKR_DEBUGGER_CONFIG")]
    pub config: PathBuf,

    /// Path to the recorded chain fixture.
    #[arg(long, short = 'f', env = "ZKR_DEBUGGER_FIXTURE")]
    pub fixture: PathBuf,

    /// L2 block number to debug.
    #[arg(long, short = 'b')]
    pub block: u64,

    /// Tracer args
    #[command(flatten)]
    pub trace: TraceArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        LogConfig::new(self.v.clone()).init_tracing_subscriber(None)?;

        let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        rt.block_on(self.debug())
    }

    async fn debug(self) -> Result<()> {
        let config = load_config(&self.config).await?;
        let fixture = Fixture::load(&self.fixture).await?;
        let trace_config = self.trace.trace_config().await?;

        let Fixture { chain, state, responses } = fixture;
        let debugger = BlockDebugger::new(
            config,
            chain,
            state,
            RecordedExecutor::new(responses),
            TracingEventLog,
        );

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(target: "debugger", "Ctrl+C received, cancelling");
                interrupt.cancel();
            }
        });

        let results = debugger.debug_block(self.block, &trace_config, cancel).await?;
        info!(target: "debugger", block = self.block, transactions = results.len(), "Debugged block");

        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &results)?;
        writeln!(stdout)?;
        Ok(())
    }
}
