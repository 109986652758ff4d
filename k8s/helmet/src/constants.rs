/// This is the name of the installer binary, also used to look up its configuration.
pub const DEFAULT_APP_NAME: &str = "helmet";

/// This is the default directory of the chart filesystem.
pub const DEFAULT_CHARTS_DIR: &str = "installer";

/// This is the directory, relative to the chart filesystem root, which holds the Helm charts.
pub const CHARTS_SUBDIR: &str = "charts";

/// This is the name of the file which carries a Helm chart's metadata.
pub const CHART_FILE: &str = "Chart.yaml";

/// This is the default installer configuration shipped with the chart filesystem. It is also
/// the ConfigMap data key under which the configuration is stored in the cluster.
pub const CONFIG_FILE: &str = "config.yaml";

/// Label selector which marks the ConfigMap holding the configuration for an installer.
pub fn config_label_key(app_name: &str) -> String {
    format!("installer.{app_name}.io/config")
}

/// Field manager for Patch param, required for [`kube::api::Patch::Apply`].
pub fn field_manager(app_name: &str) -> String {
    format!("{app_name}-installer")
}

/// Name of the ConfigMap created to store the configuration for an installer.
pub fn config_map_name(app_name: &str) -> String {
    format!("{app_name}-config")
}

/// Operator guidance for when the installer's configuration could not be loaded.
pub fn config_help(app_name: &str) -> String {
    format!(
        r#"
Unable to find the configuration in the cluster, or the configuration is invalid.
Please refer to the subcommand "{app_name} config" to manage installer's
configuration for the target cluster.

    $ {app_name} config --help
"#
    )
}
