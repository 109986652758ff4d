use crate::{commands::with_timeout, opts::ConfigOperation};
use helmet::{
    config::{Config, ConfigMapManager},
    constants::CONFIG_FILE,
    error::{ReadingFile, Result},
    RunContext,
};
use snafu::ResultExt;
use std::{path::Path, time::Duration};
use tracing::info;

impl ConfigOperation {
    pub(crate) async fn execute(&self, ctx: &RunContext, timeout: Duration) -> Result<()> {
        match self {
            ConfigOperation::Get => get(ctx, timeout).await,
            ConfigOperation::Create { force, file } => {
                create(ctx, file.as_deref(), *force, timeout).await
            }
            ConfigOperation::Delete => delete(ctx, timeout).await,
        }
    }
}

async fn get(ctx: &RunContext, timeout: Duration) -> Result<()> {
    let config = ctx.get_config_within(timeout).await?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

async fn create(
    ctx: &RunContext,
    file: Option<&Path>,
    force: bool,
    timeout: Duration,
) -> Result<()> {
    let buf = match file {
        Some(filepath) => std::fs::read(filepath).context(ReadingFile { filepath })?,
        None => ctx.chart_fs().read_file(CONFIG_FILE)?,
    };
    let config = Config::try_from(buf.as_slice())?;
    info!(namespace = config.installer().namespace(), "Loaded installer configuration");

    let manager = ConfigMapManager::new(ctx.kube().clone(), ctx.app_name());
    with_timeout(timeout, "configuration create", manager.create(&config, force)).await?;

    console_logger::info(&format!(
        "Configuration stored in namespace {}",
        config.installer().namespace()
    ));
    Ok(())
}

async fn delete(ctx: &RunContext, timeout: Duration) -> Result<()> {
    let manager = ConfigMapManager::new(ctx.kube().clone(), ctx.app_name());
    let deleted = with_timeout(timeout, "configuration delete", manager.delete()).await?;

    match deleted {
        0 => console_logger::warn(
            "No configuration found for",
            &manager.label_selector(),
        ),
        _ => console_logger::info(&format!("Deleted {deleted} configuration ConfigMap(s)")),
    }
    Ok(())
}
