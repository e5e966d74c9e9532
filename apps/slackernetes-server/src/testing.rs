//! Test doubles for the router's cluster and chat dependencies.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use k8s_openapi::api::core::v1::{Namespace, Pod};
use slackernetes_core::{BotIdentity, ChatOps, ClusterOps, CoreError, Router, builtin_commands};

/// Bot user ID the test routers answer to.
pub(crate) const BOT: &str = "UBOT";

/// A cluster with nothing in it.
#[derive(Debug, Default)]
pub(crate) struct EmptyCluster;

impl ClusterOps for EmptyCluster {
    async fn list_namespaced_pods(&self, _namespace: &str) -> Result<Vec<Pod>, CoreError> {
        Ok(Vec::new())
    }

    async fn list_all_pods(&self) -> Result<Vec<Pod>, CoreError> {
        Ok(Vec::new())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, CoreError> {
        Ok(Vec::new())
    }

    async fn pod_logs(
        &self,
        _name: &str,
        _namespace: &str,
        _previous: bool,
    ) -> Result<String, CoreError> {
        Ok(String::new())
    }

    async fn read_pod(&self, name: &str, _namespace: &str) -> Result<Pod, CoreError> {
        Err(CoreError::Cluster(format!("pods \"{name}\" not found")))
    }
}

/// Records posted texts, optionally taking `delay` per post, and tracks how
/// many posts were in flight at once.
#[derive(Debug, Default)]
pub(crate) struct RecordingChat {
    delay: Duration,
    posts: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingChat {
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub(crate) fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().expect("posts lock").clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ChatOps for RecordingChat {
    async fn post_text(&self, channel: &str, text: &str) -> Result<(), CoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.posts
            .lock()
            .expect("posts lock")
            .push((channel.to_string(), text.to_string()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn post_file(
        &self,
        channel: &str,
        initial_comment: &str,
        _filename: &str,
        _content: &str,
    ) -> Result<(), CoreError> {
        self.post_text(channel, initial_comment).await
    }

    async fn user_name(&self, user_id: &str) -> Result<String, CoreError> {
        Ok(user_id.to_string())
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, CoreError> {
        Ok(channel_id.to_string())
    }
}

/// A router over the builtin table with the given chat double.
pub(crate) fn router(chat: RecordingChat) -> Router<EmptyCluster, RecordingChat> {
    let table = builtin_commands().expect("builtin table");
    Router::new(BotIdentity::new(BOT), table, EmptyCluster, chat)
}

/// An Events API payload carrying one plain message.
pub(crate) fn message_payload(channel: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "event": {
            "type": "message",
            "channel": channel,
            "user": "U1",
            "text": text,
            "ts": "1700000000.000100"
        }
    })
}
