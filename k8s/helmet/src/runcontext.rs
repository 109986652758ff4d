use crate::{
    chartfs::ChartFS,
    config::{Config, ConfigManager, ConfigManagerFactory},
    error::{ConfigFetch, Result, Timeout},
    k8s::Kube,
};
use snafu::{IntoError, ResultExt};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn, Instrument, Span};

/// Runtime dependencies for command execution: the cluster client, the chart filesystem, the
/// logger and the cluster configuration (fetched on demand by [`RunContext::get_config`]).
///
/// A RunContext is built once per invocation and lent to every command handler.
pub struct RunContext<K = Kube> {
    kube: K,
    chart_fs: ChartFS,
    logger: Span,
    /// Populated by the first successful `get_config`, never cleared afterwards.
    config: OnceCell<Config>,
    /// Installer name, binds the configuration manager.
    app_name: String,
}

impl<K> RunContext<K>
where
    K: ConfigManagerFactory,
{
    /// Configuration is left empty until `get_config` is called.
    pub fn new<T>(app_name: T, kube: K, chart_fs: ChartFS, logger: Span) -> Self
    where
        T: ToString,
    {
        Self {
            kube,
            chart_fs,
            logger,
            config: OnceCell::new(),
            app_name: app_name.to_string(),
        }
    }

    /// Returns the cluster configuration, fetching it from the cluster if it is not loaded yet.
    /// Only a successful fetch is kept, a failed one is retried on the next call. Concurrent
    /// callers share the same fetch.
    ///
    /// No deadline is applied here, callers bound the call by dropping the future.
    pub async fn get_config(&self) -> Result<&Config> {
        self.config
            .get_or_try_init(|| {
                async {
                    debug!("Fetching installer configuration from the cluster");
                    let manager = self.kube.config_manager(&self.app_name);
                    manager
                        .get_config()
                        .await
                        .map_err(|error| {
                            warn!(%error, "Unable to load the installer configuration");
                            error
                        })
                        .context(ConfigFetch {
                            app_name: self.app_name.as_str(),
                        })
                }
                .instrument(self.logger.clone())
            })
            .await
    }

    /// Same as `get_config`, bounded by `timeout`. An expired deadline is a failed fetch: nothing
    /// is cached and the error is a `ConfigFetch` like any other fetch failure.
    pub async fn get_config_within(&self, timeout: Duration) -> Result<&Config> {
        match tokio::time::timeout(timeout, self.get_config()).await {
            Ok(result) => result,
            Err(elapsed) => {
                self.logger.in_scope(|| {
                    warn!(?timeout, "Timed out loading the installer configuration");
                });
                let source = Timeout {
                    operation: "installer configuration",
                    timeout,
                }
                .into_error(elapsed);
                Err(ConfigFetch {
                    app_name: self.app_name.as_str(),
                }
                .into_error(source))
            }
        }
    }

    /// The cluster configuration, if it has already been fetched.
    pub fn config(&self) -> Option<&Config> {
        self.config.get()
    }

    pub fn kube(&self) -> &K {
        &self.kube
    }

    pub fn chart_fs(&self) -> &ChartFS {
        &self.chart_fs
    }

    /// The span command handlers should instrument themselves with.
    pub fn logger(&self) -> &Span {
        &self.logger
    }

    pub fn app_name(&self) -> &str {
        self.app_name.as_str()
    }
}
