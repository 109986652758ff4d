use crate::opts::CliArgs;
use clap::Parser;
use helmet::{chartfs::ChartFS, constants::DEFAULT_APP_NAME, error::Result, k8s::Kube, RunContext};
use tracing::{debug, info_span, Instrument};
use tracing_subscriber::EnvFilter;

mod commands;
mod opts;

#[tokio::main]
async fn main() {
    init_logging();

    let opts = CliArgs::parse();
    if let Err(error) = run(&opts).await {
        debug!(?error, "Failed to run {}", DEFAULT_APP_NAME);
        console_logger::error(&error.to_string(), error.help().as_deref());
        std::process::exit(1);
    }
}

/// Initialize logging components -- tracing. Logs go to stderr so they never mix with command
/// output.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Build the run context and hand it to the requested operation.
async fn run(opts: &CliArgs) -> Result<()> {
    let kube = Kube::builder()
        .with_context(opts.kube_context())
        .build()
        .await?;
    let chart_fs = ChartFS::new(opts.charts_dir());
    let logger = info_span!("helmet", app = DEFAULT_APP_NAME);

    let ctx = RunContext::new(DEFAULT_APP_NAME, kube, chart_fs, logger);
    opts.operation()
        .execute(&ctx, opts.timeout())
        .instrument(ctx.logger().clone())
        .await
}
