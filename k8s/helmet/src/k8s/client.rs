use crate::error::{K8sClientGeneration, KubeConfigLoad, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    api::Api,
    config::{Config, KubeConfigOptions},
    Client,
};
use snafu::ResultExt;
use tracing::debug;

/// Builder for the Kubernetes client.
#[derive(Default)]
pub struct KubeBuilder {
    context: Option<String>,
}

impl KubeBuilder {
    /// Use a specific kubeconfig context instead of the current one.
    #[must_use]
    pub fn with_context<T>(mut self, context: Option<T>) -> Self
    where
        T: ToString,
    {
        self.context = context.map(|ctx| ctx.to_string());
        self
    }

    /// Build the Kube client. Without a context this infers the configuration the same way
    /// kubectl does, falling back to the in-cluster environment.
    pub async fn build(self) -> Result<Kube> {
        let client = match self.context {
            Some(context) => {
                debug!(%context, "Loading kubeconfig context");
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..Default::default()
                };
                let config = Config::from_kubeconfig(&options)
                    .await
                    .context(KubeConfigLoad { context })?;
                Client::try_from(config).context(K8sClientGeneration)?
            }
            None => Client::try_default().await.context(K8sClientGeneration)?,
        };

        Ok(Kube { client })
    }
}

/// This is a wrapper around kube::Client with helper methods to generate Api<?> clients.
#[derive(Clone)]
pub struct Kube {
    client: Client,
}

impl Kube {
    pub fn builder() -> KubeBuilder {
        KubeBuilder::default()
    }

    /// Get a clone of the kube::Client.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Generate the ConfigMap api client for a namespace.
    pub fn configmaps_api(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client(), namespace)
    }

    /// Generate the ConfigMap api client across all namespaces.
    pub fn all_configmaps_api(&self) -> Api<ConfigMap> {
        Api::all(self.client())
    }
}

impl From<Client> for Kube {
    fn from(client: Client) -> Self {
        Self { client }
    }
}
