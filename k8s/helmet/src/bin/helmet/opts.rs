use clap::{Parser, Subcommand};
use helmet::constants::{DEFAULT_APP_NAME, DEFAULT_CHARTS_DIR};
use std::{path::PathBuf, time::Duration};

/// These are the supported cli configuration options for the installer.
#[derive(Parser)]
#[command(name = DEFAULT_APP_NAME, version)]
#[command(about = "Installs Helm chart based products on a Kubernetes cluster", long_about = None)]
pub(crate) struct CliArgs {
    /// The operation to be performed.
    #[command(subcommand)]
    operation: Operations,

    /// The kubeconfig context to use, the current context is used if not set.
    #[arg(long, global = true)]
    kube_context: Option<String>,

    /// This is the directory which holds the installer's Helm charts and default configuration.
    #[arg(
        long,
        global = true,
        env = "HELMET_CHARTS_DIR",
        default_value = DEFAULT_CHARTS_DIR,
        value_name = "DIR_PATH"
    )]
    charts_dir: PathBuf,

    /// Deadline for each request made to the cluster.
    #[arg(long, global = true, default_value = "30s")]
    timeout: humantime::Duration,
}

/// The types of operations that are supported.
#[derive(Subcommand)]
pub(crate) enum Operations {
    /// Manage the installer configuration stored in the cluster.
    #[command(subcommand)]
    Config(ConfigOperation),
    /// List the Helm charts and the namespace each one is deployed to.
    Charts,
}

/// Operations on the cluster-stored configuration.
#[derive(Subcommand)]
pub(crate) enum ConfigOperation {
    /// Print the configuration.
    Get,
    /// Store a configuration in the cluster.
    Create {
        /// Replace the configuration if one is already present.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Configuration file, defaults to the config.yaml shipped with the charts.
        #[arg(value_name = "FILE_PATH")]
        file: Option<PathBuf>,
    },
    /// Remove the configuration from the cluster.
    Delete,
}

impl CliArgs {
    pub(crate) fn operation(&self) -> &Operations {
        &self.operation
    }

    /// This returns the kubeconfig context, if one was given.
    pub(crate) fn kube_context(&self) -> Option<String> {
        self.kube_context.clone()
    }

    /// This returns the chart filesystem directory.
    pub(crate) fn charts_dir(&self) -> PathBuf {
        self.charts_dir.clone()
    }

    /// This returns the deadline for cluster requests.
    pub(crate) fn timeout(&self) -> Duration {
        self.timeout.into()
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, ConfigOperation, Operations};
    use clap::{CommandFactory, Parser};
    use std::{path::PathBuf, time::Duration};

    #[test]
    fn test_cli_args() {
        CliArgs::command().debug_assert();

        let opts = CliArgs::parse_from(["helmet", "config", "create", "--force", "cfg.yaml"]);
        assert!(matches!(
            opts.operation(),
            Operations::Config(ConfigOperation::Create { force: true, file: Some(file) })
                if file == &PathBuf::from("cfg.yaml")
        ));
        assert_eq!(opts.timeout(), Duration::from_secs(30));

        let opts = CliArgs::parse_from([
            "helmet",
            "charts",
            "--timeout",
            "5s",
            "--kube-context",
            "kind-helmet",
            "--charts-dir",
            "/opt/installer",
        ]);
        assert!(matches!(opts.operation(), Operations::Charts));
        assert_eq!(opts.timeout(), Duration::from_secs(5));
        assert_eq!(opts.kube_context().as_deref(), Some("kind-helmet"));
        assert_eq!(opts.charts_dir(), PathBuf::from("/opt/installer"));
    }
}
