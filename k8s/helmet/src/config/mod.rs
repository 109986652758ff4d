use crate::{
    constants::CONFIG_FILE,
    error::{
        ConfigDuplicateProduct, ConfigEmptyProductName, ConfigMapNoData, ConfigNoNamespace,
        ConfigParse, ConfigSerialize, Error, Result,
    },
};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use snafu::{ensure, ResultExt};
use std::collections::HashSet;

/// Contains the configuration manager seam and its ConfigMap backed implementation.
pub mod manager;

pub use manager::{ConfigManager, ConfigManagerFactory, ConfigMapManager};

/// The installer configuration, stored in the target cluster.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    installer: Installer,
}

/// Installer wide settings and the products it manages.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Installer {
    /// The namespace where the installer deploys, unless a product says otherwise.
    namespace: String,
    /// Free form settings shared by every chart.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    settings: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    products: Vec<Product>,
}

/// A product deployed by the installer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Product {
    name: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    properties: Mapping,
}

impl Config {
    /// This is a getter for the installer section.
    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    /// All products, enabled or not, in declaration order.
    pub fn products(&self) -> &[Product] {
        self.installer.products.as_slice()
    }

    /// The products which are enabled for deployment.
    pub fn enabled_products(&self) -> impl Iterator<Item = &Product> {
        self.installer.products.iter().filter(|p| p.enabled)
    }

    /// Look up a product by name.
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.installer.products.iter().find(|p| p.name == name)
    }

    /// Serialize the configuration back into YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context(ConfigSerialize)
    }

    fn validate(self) -> Result<Self> {
        ensure!(!self.installer.namespace.trim().is_empty(), ConfigNoNamespace);

        let mut names = HashSet::with_capacity(self.installer.products.len());
        for product in self.installer.products.iter() {
            ensure!(!product.name.trim().is_empty(), ConfigEmptyProductName);
            ensure!(
                names.insert(product.name.as_str()),
                ConfigDuplicateProduct {
                    name: product.name.clone()
                }
            );
        }

        Ok(self)
    }
}

impl Installer {
    /// This is a getter for the installer namespace.
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// This is a getter for the installer settings.
    pub fn settings(&self) -> &Mapping {
        &self.settings
    }
}

impl Product {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn properties(&self) -> &Mapping {
        &self.properties
    }

    /// The namespace for the product, defaulting to the one passed in (usually the installer
    /// namespace).
    pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default)
    }
}

impl TryFrom<&[u8]> for Config {
    type Error = Error;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        serde_yaml::from_slice::<Config>(buf)
            .context(ConfigParse)?
            .validate()
    }
}

impl TryFrom<&ConfigMap> for Config {
    type Error = Error;

    fn try_from(cm: &ConfigMap) -> Result<Self, Self::Error> {
        let data = cm
            .data
            .as_ref()
            .and_then(|data| data.get(CONFIG_FILE))
            .ok_or_else(|| {
                ConfigMapNoData {
                    name: cm.name_any(),
                    key: CONFIG_FILE,
                }
                .build()
            })?;

        Config::try_from(data.as_bytes())
    }
}
