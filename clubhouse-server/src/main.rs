use std::net::SocketAddr;
use std::process;

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
struct ServerArgs {
    /// Override bind address
    #[arg(long)]
    bind: Option<String>,
    /// Verbose startup output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = real_main().await {
        eprintln!("server exited with error: {err:#}");
        process::exit(1);
    }
}

async fn real_main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    clubhouse_server::telemetry::init()?;

    let mut config = clubhouse_server::ServerConfig::from_env()?;
    if let Some(bind) = args.bind {
        let addr: SocketAddr = bind.parse().context("invalid --bind address")?;
        config = config.with_bind(addr);
    }
    if args.verbose {
        println!(
            "config loaded (bind={}, store={:?}, dev_admin={})",
            config.bind_addr,
            config.store,
            config.dev_admin_token.is_some()
        );
    }

    clubhouse_server::run(config).await
}
