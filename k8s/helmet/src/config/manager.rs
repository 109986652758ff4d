use crate::{
    config::Config,
    constants::{config_label_key, config_map_name, field_manager, CONFIG_FILE},
    error::{
        ApplyConfigMap, ConfigMapAlreadyExists, ConfigMapNotFound, CreateConfigMap,
        DeleteConfigMap, InvalidNoOfConfigMaps, ListConfigMaps, Result,
    },
    k8s::Kube,
};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    api::{DeleteParams, ListParams, Patch, PatchParams, PostParams},
    core::ObjectMeta,
    ResourceExt,
};
use maplit::btreemap;
use snafu::ResultExt;
use tracing::{debug, info};

/// Retrieves the installer configuration from wherever it is stored.
#[async_trait]
pub trait ConfigManager: Send + Sync {
    /// Fetch and validate the configuration.
    async fn get_config(&self) -> Result<Config>;
}

/// Cluster clients which know how to build a configuration manager for an installer.
pub trait ConfigManagerFactory: Send + Sync {
    type Manager: ConfigManager;

    /// Bind a configuration manager to this cluster client and the installer name.
    fn config_manager(&self, app_name: &str) -> Self::Manager;
}

impl ConfigManagerFactory for Kube {
    type Manager = ConfigMapManager;

    fn config_manager(&self, app_name: &str) -> Self::Manager {
        ConfigMapManager::new(self.clone(), app_name)
    }
}

/// Manages the installer configuration stored as a labelled ConfigMap in the cluster.
pub struct ConfigMapManager {
    kube: Kube,
    app_name: String,
}

impl ConfigMapManager {
    pub fn new<T>(kube: Kube, app_name: T) -> Self
    where
        T: ToString,
    {
        Self {
            kube,
            app_name: app_name.to_string(),
        }
    }

    /// The label selector which matches the configuration ConfigMap.
    pub fn label_selector(&self) -> String {
        format!("{}=true", config_label_key(&self.app_name))
    }

    /// List every ConfigMap carrying the configuration label, in any namespace.
    async fn list(&self) -> Result<Vec<ConfigMap>> {
        let label = self.label_selector();
        let list_params = ListParams::default().labels(label.as_str());
        let config_maps = self
            .kube
            .all_configmaps_api()
            .list(&list_params)
            .await
            .context(ListConfigMaps { label })?;

        Ok(config_maps.items)
    }

    /// Generate the ConfigMap which stores the configuration.
    fn config_map(&self, config: &Config) -> Result<ConfigMap> {
        Ok(ConfigMap {
            metadata: ObjectMeta {
                name: Some(config_map_name(&self.app_name)),
                namespace: Some(config.installer().namespace().to_string()),
                labels: Some(btreemap! {
                    config_label_key(&self.app_name) => "true".to_string(),
                }),
                ..Default::default()
            },
            data: Some(btreemap! {
                CONFIG_FILE.to_string() => config.to_yaml()?,
            }),
            ..Default::default()
        })
    }

    /// Store the configuration in the installer namespace. Existing configurations, in any
    /// namespace, are only replaced when `force` is set; the ones outside of the installer
    /// namespace are deleted so exactly one remains.
    pub async fn create(&self, config: &Config, force: bool) -> Result<ConfigMap> {
        let namespace = config.installer().namespace();
        let name = config_map_name(&self.app_name);
        let config_map = self.config_map(config)?;

        let existing = self.list().await?;
        let plan = plan_create(existing.as_slice(), name.as_str(), namespace, force)?;

        for (stale_ns, stale_name) in plan.stale {
            info!(name = %stale_name, namespace = %stale_ns, "Deleting superseded installer configuration ConfigMap");
            self.delete_config_map(stale_name, stale_ns).await?;
        }

        let api = self.kube.configmaps_api(namespace);
        if !plan.replace {
            info!(%name, %namespace, "Creating installer configuration ConfigMap");
            return api
                .create(&PostParams::default(), &config_map)
                .await
                .context(CreateConfigMap {
                    name: name.as_str(),
                    namespace,
                });
        }

        info!(%name, %namespace, "Replacing installer configuration ConfigMap");
        let ssapply = PatchParams::apply(&field_manager(&self.app_name)).force();
        api.patch(name.as_str(), &ssapply, &Patch::Apply(&config_map))
            .await
            .context(ApplyConfigMap {
                name: name.as_str(),
                namespace,
            })
    }

    async fn delete_config_map(&self, name: String, namespace: String) -> Result<()> {
        self.kube
            .configmaps_api(namespace.as_str())
            .delete(name.as_str(), &DeleteParams::default())
            .await
            .context(DeleteConfigMap { name, namespace })?;
        Ok(())
    }

    /// Delete every ConfigMap carrying the configuration label. Returns the number of deleted
    /// ConfigMaps.
    pub async fn delete(&self) -> Result<usize> {
        let config_maps = self.list().await?;

        for cm in config_maps.iter() {
            let name = cm.name_any();
            let namespace = cm.namespace().unwrap_or_default();
            debug!(%name, %namespace, "Deleting installer configuration ConfigMap");

            self.delete_config_map(name, namespace).await?;
        }

        Ok(config_maps.len())
    }
}

/// What `create` does with the configuration ConfigMaps already in the cluster.
#[derive(Debug, Default, PartialEq)]
struct CreatePlan {
    /// ConfigMaps other than the target one, as (namespace, name), to be deleted.
    stale: Vec<(String, String)>,
    /// The target ConfigMap exists and is patched instead of created.
    replace: bool,
}

/// Decide how to store a configuration as ConfigMap `name` in `namespace`, given every labelled
/// ConfigMap found in the cluster.
fn plan_create(
    existing: &[ConfigMap],
    name: &str,
    namespace: &str,
    force: bool,
) -> Result<CreatePlan> {
    if let (Some(cm), false) = (existing.first(), force) {
        return ConfigMapAlreadyExists {
            name: cm.name_any(),
            namespace: cm.namespace().unwrap_or_default(),
        }
        .fail();
    }

    let mut plan = CreatePlan::default();
    for cm in existing {
        let cm_name = cm.name_any();
        let cm_namespace = cm.namespace().unwrap_or_default();
        if cm_name == name && cm_namespace == namespace {
            plan.replace = true;
        } else {
            plan.stale.push((cm_namespace, cm_name));
        }
    }
    Ok(plan)
}

#[async_trait]
impl ConfigManager for ConfigMapManager {
    async fn get_config(&self) -> Result<Config> {
        let label = self.label_selector();
        let config_maps = self.list().await?;

        match config_maps.as_slice() {
            [] => ConfigMapNotFound { label }.fail(),
            [cm] => {
                debug!(name = %cm.name_any(), namespace = ?cm.namespace(), "Found installer configuration");
                Config::try_from(cm)
            }
            many => InvalidNoOfConfigMaps {
                count: many.len(),
                label,
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{plan_create, ConfigManagerFactory, ConfigMapManager, CreatePlan};
    use crate::{config::Config, error::Error, k8s::Kube};
    use k8s_openapi::api::core::v1::ConfigMap;
    use kube::{core::ObjectMeta, Client, ResourceExt};

    fn kube() -> Kube {
        let config = kube::Config::new("http://127.0.0.1:6443".parse().unwrap());
        Kube::from(Client::try_from(config).unwrap())
    }

    #[tokio::test]
    async fn test_config_map() {
        let config = Config::try_from("installer:\n  namespace: tssc\n".as_bytes()).unwrap();
        let manager = kube().config_manager("tssc");
        assert_eq!(manager.label_selector(), "installer.tssc.io/config=true");

        let cm = manager.config_map(&config).unwrap();
        assert_eq!(cm.name_any(), "tssc-config");
        assert_eq!(cm.namespace().as_deref(), Some("tssc"));
        assert_eq!(
            cm.labels().get("installer.tssc.io/config").map(String::as_str),
            Some("true")
        );
        assert_eq!(Config::try_from(&cm).unwrap(), config);
    }

    #[tokio::test]
    async fn test_manager_is_bound_to_app_name() {
        let manager = ConfigMapManager::new(kube(), "helmet");
        assert_eq!(manager.label_selector(), "installer.helmet.io/config=true");
    }

    fn stored(namespace: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some("helmet-config".to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_create_without_existing_config() {
        let plan = plan_create(&[], "helmet-config", "b", false).unwrap();
        assert_eq!(plan, CreatePlan::default());
    }

    #[test]
    fn test_plan_create_existing_config_in_other_namespace() {
        let existing = vec![stored("a")];

        assert!(matches!(
            plan_create(&existing, "helmet-config", "b", false),
            Err(Error::ConfigMapAlreadyExists { name, namespace })
                if name == "helmet-config" && namespace == "a"
        ));

        let plan = plan_create(&existing, "helmet-config", "b", true).unwrap();
        assert!(!plan.replace);
        assert_eq!(plan.stale, vec![("a".to_string(), "helmet-config".to_string())]);
    }

    #[test]
    fn test_plan_create_replaces_target() {
        let existing = vec![stored("b"), stored("c")];

        assert!(plan_create(&existing, "helmet-config", "b", false).is_err());

        let plan = plan_create(&existing, "helmet-config", "b", true).unwrap();
        assert!(plan.replace);
        assert_eq!(plan.stale, vec![("c".to_string(), "helmet-config".to_string())]);
    }
}
