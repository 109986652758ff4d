use helmet::{error::Result, RunContext};
use std::time::Duration;
use tracing::debug;

/// Print every chart with its version and the namespace it is deployed to. A product with the
/// chart's name decides the namespace, otherwise it is the installer namespace.
pub(crate) async fn list(ctx: &RunContext, timeout: Duration) -> Result<()> {
    let config = ctx.get_config_within(timeout).await?;
    let charts = ctx.chart_fs().walk_charts()?;
    debug!(count = charts.len(), base_dir = %ctx.chart_fs().base_dir().display(), "Found charts");

    let installer_ns = config.installer().namespace();
    for chart in charts.iter() {
        let namespace = config
            .product(chart.name())
            .map(|product| product.namespace_or(installer_ns))
            .unwrap_or(installer_ns);
        println!("{}\t{}\t{}", chart.name(), chart.version(), namespace);
    }
    Ok(())
}
