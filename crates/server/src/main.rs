use clap::Parser;

use treebase_server::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treebase_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    treebase_server::run(args).await
}
