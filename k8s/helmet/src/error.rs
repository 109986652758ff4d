use crate::constants::config_help;
use snafu::Snafu;
use std::{path::PathBuf, time::Duration};

/// For use with multiple fallible operations which may fail for different reasons, but are
/// defined withing the same scope and must return to the outer scope (calling scope) using
/// the try operator -- '?'.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Error for when the installer configuration could not be fetched from the cluster. The
    /// source is the error returned by the configuration manager.
    #[snafu(display(
        "Failed to get the {} configuration from the cluster: {}",
        app_name,
        source
    ))]
    ConfigFetch {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        app_name: String,
    },

    /// Error for when Kubernetes API client generation fails.
    #[snafu(display("Failed to generate kubernetes client: {}", source))]
    K8sClientGeneration { source: kube::Error },

    /// Error for when the kubeconfig for a specific context could not be loaded.
    #[snafu(display("Failed to load kubeconfig context {}: {}", context, source))]
    KubeConfigLoad {
        source: kube::config::KubeconfigError,
        context: String,
    },

    /// Error for when a Kubernetes API request for GET-ing a list of ConfigMaps filtered by
    /// label fails.
    #[snafu(display("Failed to list ConfigMaps with label {}: {}", label, source))]
    ListConfigMaps { source: kube::Error, label: String },

    /// Error for when no ConfigMap carries the installer configuration label.
    #[snafu(display("No ConfigMap found with label {}", label))]
    ConfigMapNotFound { label: String },

    /// Error for when more than one ConfigMap carries the installer configuration label.
    #[snafu(display(
        "Found {} ConfigMaps with label {}, expected exactly one",
        count,
        label
    ))]
    InvalidNoOfConfigMaps { count: usize, label: String },

    /// Error for when the ConfigMap does not contain the configuration data key.
    #[snafu(display("ConfigMap {} has no data for key {}", name, key))]
    ConfigMapNoData { name: String, key: String },

    /// Error for when a configuration ConfigMap exists and overwriting was not requested.
    #[snafu(display(
        "ConfigMap {} already exists in namespace {}, use --force to replace it",
        name,
        namespace
    ))]
    ConfigMapAlreadyExists { name: String, namespace: String },

    /// Error for when a ConfigMap creation fails.
    #[snafu(display(
        "Failed to create ConfigMap {} in namespace {}: {}",
        name,
        namespace,
        source
    ))]
    CreateConfigMap {
        source: kube::Error,
        name: String,
        namespace: String,
    },

    /// Error for when a server-side apply of a ConfigMap fails.
    #[snafu(display(
        "Failed to apply ConfigMap {} in namespace {}: {}",
        name,
        namespace,
        source
    ))]
    ApplyConfigMap {
        source: kube::Error,
        name: String,
        namespace: String,
    },

    /// Error for when a ConfigMap deletion fails.
    #[snafu(display(
        "Failed to delete ConfigMap {} in namespace {}: {}",
        name,
        namespace,
        source
    ))]
    DeleteConfigMap {
        source: kube::Error,
        name: String,
        namespace: String,
    },

    /// Error for when the configuration could not be parsed.
    #[snafu(display("Failed to parse installer configuration: {}", source))]
    ConfigParse { source: serde_yaml::Error },

    /// Error for when the configuration could not be serialized.
    #[snafu(display("Failed to serialize installer configuration: {}", source))]
    ConfigSerialize { source: serde_yaml::Error },

    /// Error for when the installer namespace is empty.
    #[snafu(display("Installer configuration has an empty namespace"))]
    ConfigNoNamespace,

    /// Error for when a product in the configuration has no name.
    #[snafu(display("Installer configuration has a product with an empty name"))]
    ConfigEmptyProductName,

    /// Error for when a product name is present more than once in the configuration.
    #[snafu(display("Installer configuration has duplicate product {}", name))]
    ConfigDuplicateProduct { name: String },

    /// Error for when a file could not be read.
    #[snafu(display("Failed to read file {}: {}", filepath.display(), source))]
    ReadingFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when the contents of a directory could not be listed.
    #[snafu(display("Failed to read contents of directory {}: {}", path.display(), source))]
    ReadingDirectoryContents {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when a Chart.yaml could not be parsed.
    #[snafu(display("Failed to parse Helm chart metadata at {}: {}", filepath.display(), source))]
    ChartYamlParse {
        source: serde_yaml::Error,
        filepath: PathBuf,
    },

    /// Error for when no chart with the requested name is present in the chart filesystem.
    #[snafu(display("Helm chart {} not found in {}", name, path.display()))]
    ChartNotFound { name: String, path: PathBuf },

    /// Error for when a cluster operation does not complete within the deadline.
    #[snafu(display("Timed out after {:?} waiting for {}", timeout, operation))]
    Timeout {
        source: tokio::time::error::Elapsed,
        operation: String,
        timeout: Duration,
    },
}

impl Error {
    /// Guidance for the operator to fix the cause of this error, if there is any.
    pub fn help(&self) -> Option<String> {
        match self {
            Error::ConfigFetch { app_name, .. } => Some(config_help(app_name)),
            _ => None,
        }
    }
}

/// A wrapper type to remove repeated Result<T, Error> returns.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::{ConfigFetch, Error};
    use snafu::IntoError;

    #[test]
    fn test_config_fetch_help() {
        let error = ConfigFetch {
            app_name: "helmet",
        }
        .into_error(Error::ConfigMapNotFound {
            label: "installer.helmet.io/config=true".to_string(),
        });

        let help = error.help().expect("config fetch errors carry a hint");
        assert!(help.contains("helmet config --help"));
        assert!(error
            .to_string()
            .ends_with("No ConfigMap found with label installer.helmet.io/config=true"));
    }

    #[test]
    fn test_help_absent() {
        let error = Error::ConfigNoNamespace;
        assert!(error.help().is_none());
    }

    #[test]
    fn test_config_fetch_presentation() {
        let error = ConfigFetch {
            app_name: "helmet",
        }
        .into_error(Error::ConfigNoNamespace);

        let mut out = Vec::new();
        console_logger::write_error(&mut out, &error.to_string(), error.help().as_deref())
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Failed to get the helmet configuration from the cluster"));
        assert!(out.contains("subcommand \"helmet config\" to manage installer's"));
        assert!(out.contains("    $ helmet config --help"));
    }
}
