use crate::opts::Operations;
use helmet::{
    error::{Result, Timeout},
    RunContext,
};
use snafu::ResultExt;
use std::{future::Future, time::Duration};

/// Handler for the charts subcommand.
mod charts;
/// Handlers for the config subcommand.
mod config;

impl Operations {
    /// Run the operation, every cluster request is bounded by `timeout`.
    pub(crate) async fn execute(&self, ctx: &RunContext, timeout: Duration) -> Result<()> {
        match self {
            Operations::Config(operation) => operation.execute(ctx, timeout).await,
            Operations::Charts => charts::list(ctx, timeout).await,
        }
    }
}

/// Await a cluster request, failing with a Timeout error if it takes longer than `timeout`.
pub(crate) async fn with_timeout<F, T>(timeout: Duration, operation: &str, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, request)
        .await
        .context(Timeout { operation, timeout })?
}
