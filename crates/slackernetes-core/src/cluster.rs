//! Kubernetes API access.
//!
//! Defines the [`ClusterOps`] trait for the read-only queries the bot
//! performs and provides [`KubeCluster`], the production implementation
//! built on `kube::Client`. The abstraction lets the handlers be tested
//! without a cluster.

use std::future::Future;

use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{Api, ListParams, LogParams};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use tracing::{debug, info, instrument};

use crate::CoreError;

/// Abstraction over the read-only Kubernetes calls used by command handlers.
///
/// All methods return resources in the order the API server lists them.
pub trait ClusterOps: Send + Sync {
    /// Lists the pods in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cluster` if the API call fails.
    fn list_namespaced_pods(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<Pod>, CoreError>> + Send;

    /// Lists the pods across every namespace.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cluster` if the API call fails.
    fn list_all_pods(&self) -> impl Future<Output = Result<Vec<Pod>, CoreError>> + Send;

    /// Lists every namespace in the cluster.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cluster` if the API call fails.
    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<Namespace>, CoreError>> + Send;

    /// Reads the log of pod `name` in `namespace`.
    ///
    /// With `previous` set, returns the log of the previous terminated
    /// container instance instead of the running one.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cluster` if the API call fails.
    fn pod_logs(
        &self,
        name: &str,
        namespace: &str,
        previous: bool,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Reads the full pod object.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cluster` if the API call fails.
    fn read_pod(
        &self,
        name: &str,
        namespace: &str,
    ) -> impl Future<Output = Result<Pod, CoreError>> + Send;
}

/// Production [`ClusterOps`] implementation backed by `kube::Client`.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl std::fmt::Debug for KubeCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCluster")
            .field("default_namespace", &self.client.default_namespace())
            .finish()
    }
}

impl KubeCluster {
    /// Wraps an already configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the ambient credentials.
    ///
    /// Prefers the in-cluster service account and falls back to the local
    /// kubeconfig (`$KUBECONFIG` or `~/.kube/config`) when the process is not
    /// running inside a pod.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cluster` if neither source yields a usable
    /// configuration or the client cannot be constructed.
    pub async fn connect() -> Result<Self, CoreError> {
        let config = match Config::incluster() {
            Ok(config) => {
                info!("Using in-cluster service account credentials");
                config
            }
            Err(incluster_err) => {
                debug!(error = %incluster_err, "In-cluster config unavailable, trying kubeconfig");
                let config = Config::from_kubeconfig(&KubeConfigOptions::default())
                    .await
                    .map_err(|e| {
                        CoreError::Cluster(format!(
                            "No in-cluster credentials ({incluster_err}) and kubeconfig failed: {e}"
                        ))
                    })?;
                info!(cluster_url = %config.cluster_url, "Using local kubeconfig credentials");
                config
            }
        };

        let client = Client::try_from(config)
            .map_err(|e| CoreError::Cluster(format!("Cannot build Kubernetes client: {e}")))?;
        Ok(Self::new(client))
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Converts a kube error into a `CoreError` tagged with the failed operation.
fn kube_err(op: &'static str) -> impl FnOnce(kube::Error) -> CoreError {
    move |e| CoreError::Cluster(format!("{op} failed: {e}"))
}

impl ClusterOps for KubeCluster {
    #[instrument(skip(self))]
    async fn list_namespaced_pods(&self, namespace: &str) -> Result<Vec<Pod>, CoreError> {
        let list = self
            .pods(namespace)
            .list(&ListParams::default())
            .await
            .map_err(kube_err("list pods"))?;
        debug!(count = list.items.len(), "Listed pods");
        Ok(list.items)
    }

    #[instrument(skip(self))]
    async fn list_all_pods(&self) -> Result<Vec<Pod>, CoreError> {
        let list = Api::<Pod>::all(self.client.clone())
            .list(&ListParams::default())
            .await
            .map_err(kube_err("list pods for all namespaces"))?;
        debug!(count = list.items.len(), "Listed pods");
        Ok(list.items)
    }

    #[instrument(skip(self))]
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, CoreError> {
        let list = Api::<Namespace>::all(self.client.clone())
            .list(&ListParams::default())
            .await
            .map_err(kube_err("list namespaces"))?;
        Ok(list.items)
    }

    #[instrument(skip(self))]
    async fn pod_logs(
        &self,
        name: &str,
        namespace: &str,
        previous: bool,
    ) -> Result<String, CoreError> {
        let params = LogParams {
            previous,
            ..LogParams::default()
        };
        self.pods(namespace)
            .logs(name, &params)
            .await
            .map_err(kube_err("read pod log"))
    }

    #[instrument(skip(self))]
    async fn read_pod(&self, name: &str, namespace: &str) -> Result<Pod, CoreError> {
        self.pods(namespace)
            .get(name)
            .await
            .map_err(kube_err("read pod"))
    }
}
