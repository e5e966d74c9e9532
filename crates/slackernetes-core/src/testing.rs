//! Recording mocks for [`ClusterOps`] and [`ChatOps`] used by unit tests.

use std::sync::Mutex;

use k8s_openapi::api::core::v1::{Container, Namespace, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::CoreError;
use crate::chat::ChatOps;
use crate::cluster::ClusterOps;

/// Builds a pod with the given name, namespace and container images.
pub(crate) fn pod(name: &str, namespace: &str, images: &[&str]) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..ObjectMeta::default()
        },
        spec: Some(PodSpec {
            containers: images
                .iter()
                .enumerate()
                .map(|(i, image)| Container {
                    name: format!("c{i}"),
                    image: Some((*image).to_string()),
                    ..Container::default()
                })
                .collect(),
            ..PodSpec::default()
        }),
        ..Pod::default()
    }
}

// ── Mock ClusterOps ─────────────────────────────────────────────

/// A cluster call observed by [`MockCluster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClusterCall {
    ListNamespacedPods(String),
    ListAllPods,
    ListNamespaces,
    PodLogs {
        name: String,
        namespace: String,
        previous: bool,
    },
    ReadPod {
        name: String,
        namespace: String,
    },
}

/// Serves canned pods, namespaces and logs and records every call.
#[derive(Debug, Default)]
pub(crate) struct MockCluster {
    pods: Vec<Pod>,
    namespaces: Vec<Namespace>,
    logs: String,
    fail: bool,
    calls: Mutex<Vec<ClusterCall>>,
}

impl MockCluster {
    pub(crate) fn with_pods(pods: Vec<Pod>) -> Self {
        Self {
            pods,
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn and_namespaces(mut self, names: &[&str]) -> Self {
        self.namespaces = names
            .iter()
            .map(|name| Namespace {
                metadata: ObjectMeta {
                    name: Some((*name).to_string()),
                    ..ObjectMeta::default()
                },
                ..Namespace::default()
            })
            .collect();
        self
    }

    pub(crate) fn and_logs(mut self, logs: &str) -> Self {
        self.logs = logs.to_string();
        self
    }

    pub(crate) fn calls(&self) -> Vec<ClusterCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: ClusterCall) -> Result<(), CoreError> {
        self.calls.lock().expect("calls lock").push(call);
        if self.fail {
            return Err(CoreError::Cluster("connection refused".into()));
        }
        Ok(())
    }
}

impl ClusterOps for MockCluster {
    async fn list_namespaced_pods(&self, namespace: &str) -> Result<Vec<Pod>, CoreError> {
        self.record(ClusterCall::ListNamespacedPods(namespace.to_string()))?;
        Ok(self
            .pods
            .iter()
            .filter(|p| p.metadata.namespace.as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn list_all_pods(&self) -> Result<Vec<Pod>, CoreError> {
        self.record(ClusterCall::ListAllPods)?;
        Ok(self.pods.clone())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, CoreError> {
        self.record(ClusterCall::ListNamespaces)?;
        Ok(self.namespaces.clone())
    }

    async fn pod_logs(
        &self,
        name: &str,
        namespace: &str,
        previous: bool,
    ) -> Result<String, CoreError> {
        self.record(ClusterCall::PodLogs {
            name: name.to_string(),
            namespace: namespace.to_string(),
            previous,
        })?;
        Ok(self.logs.clone())
    }

    async fn read_pod(&self, name: &str, namespace: &str) -> Result<Pod, CoreError> {
        self.record(ClusterCall::ReadPod {
            name: name.to_string(),
            namespace: namespace.to_string(),
        })?;
        self.pods
            .iter()
            .find(|p| p.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| CoreError::Cluster(format!("pods \"{name}\" not found")))
    }
}

// ── Mock ChatOps ────────────────────────────────────────────────

/// A reply posted through [`MockChat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Text {
        channel: String,
        text: String,
    },
    File {
        channel: String,
        comment: String,
        filename: String,
        content: String,
    },
}

impl Reply {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Text { text, .. } => text,
            Self::File { comment, .. } => comment,
        }
    }
}

/// Records replies; name lookups echo the ID unless configured to fail.
#[derive(Debug, Default)]
pub(crate) struct MockChat {
    fail_lookups: bool,
    fail_posts: bool,
    replies: Mutex<Vec<Reply>>,
    user_lookups: Mutex<Vec<String>>,
}

impl MockChat {
    pub(crate) fn failing_lookups() -> Self {
        Self {
            fail_lookups: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_posts() -> Self {
        Self {
            fail_posts: true,
            ..Self::default()
        }
    }

    pub(crate) fn replies(&self) -> Vec<Reply> {
        self.replies.lock().expect("replies lock").clone()
    }

    pub(crate) fn user_lookups(&self) -> Vec<String> {
        self.user_lookups.lock().expect("lookups lock").clone()
    }

    fn record(&self, reply: Reply) -> Result<(), CoreError> {
        if self.fail_posts {
            return Err(CoreError::Chat("channel_not_found".into()));
        }
        self.replies.lock().expect("replies lock").push(reply);
        Ok(())
    }
}

impl ChatOps for MockChat {
    async fn post_text(&self, channel: &str, text: &str) -> Result<(), CoreError> {
        self.record(Reply::Text {
            channel: channel.to_string(),
            text: text.to_string(),
        })
    }

    async fn post_file(
        &self,
        channel: &str,
        initial_comment: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), CoreError> {
        self.record(Reply::File {
            channel: channel.to_string(),
            comment: initial_comment.to_string(),
            filename: filename.to_string(),
            content: content.to_string(),
        })
    }

    async fn user_name(&self, user_id: &str) -> Result<String, CoreError> {
        self.user_lookups
            .lock()
            .expect("lookups lock")
            .push(user_id.to_string());
        if self.fail_lookups {
            return Err(CoreError::Chat("user_not_found".into()));
        }
        Ok(format!("name-of-{user_id}"))
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, CoreError> {
        if self.fail_lookups {
            return Err(CoreError::Chat("channel_not_found".into()));
        }
        Ok(format!("name-of-{channel_id}"))
    }
}
