//! Command handler bodies.
//!
//! Each handler performs at most a couple of read-only cluster calls and
//! posts one reply. Arguments come exclusively from the first capture group
//! of the pattern that routed the message; handlers re-run that pattern
//! against the message text to obtain it.

use k8s_openapi::api::core::v1::Pod;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::CoreError;
use crate::chat::ChatOps;
use crate::cluster::ClusterOps;
use crate::formatter;
use crate::message::InboundMessage;
use crate::registry::{CommandTable, Handler};

/// Namespace assumed for pods whose metadata omits one.
const DEFAULT_NAMESPACE: &str = "default";

/// Everything a handler may look at while serving one message.
#[derive(Debug)]
pub struct HandlerContext<'a, C, R> {
    /// The message being answered.
    pub message: &'a InboundMessage,
    /// The winning pattern, `None` for the fallback.
    pub pattern: Option<&'a Regex>,
    /// The full command table, read by the help command.
    pub table: &'a CommandTable,
    /// Cluster client.
    pub cluster: &'a C,
    /// Chat client used for the reply.
    pub chat: &'a R,
}

impl<'a, C: ClusterOps, R: ChatOps> HandlerContext<'a, C, R> {
    /// Extracts the first capture group of the winning pattern.
    fn argument(&self) -> Result<&'a str, CoreError> {
        let message: &'a InboundMessage = self.message;
        let Some(pattern) = self.pattern else {
            return Err(CoreError::MissingArgument(
                "no pattern routed this message".into(),
            ));
        };
        pattern
            .captures(message.text.as_str())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                CoreError::MissingArgument(format!(
                    "pattern `{}` captured no argument",
                    pattern.as_str()
                ))
            })
    }

    async fn reply(&self, text: &str) -> Result<(), CoreError> {
        self.chat.post_text(&self.message.channel, text).await
    }

    async fn reply_file(
        &self,
        comment: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), CoreError> {
        self.chat
            .post_file(&self.message.channel, comment, filename, content)
            .await
    }
}

/// A pod picked by name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRef {
    /// Exact pod name.
    pub name: String,
    /// Namespace the pod lives in.
    pub namespace: String,
}

/// Returns the first pod whose name contains `fragment`.
///
/// The scan follows the cluster's listing order; when several pods match,
/// the earliest one wins.
pub fn find_pod<'p>(pods: &'p [Pod], fragment: &str) -> Option<&'p Pod> {
    pods.iter()
        .find(|pod| pod_name(pod).is_some_and(|name| name.contains(fragment)))
}

/// Returns the pod's name, if set.
pub fn pod_name(pod: &Pod) -> Option<&str> {
    pod.metadata.name.as_deref()
}

/// Flattens the images of every container of every pod, in order.
pub fn container_images(pods: &[Pod]) -> Vec<&str> {
    pods.iter()
        .filter_map(|pod| pod.spec.as_ref())
        .flat_map(|spec| spec.containers.iter())
        .filter_map(|container| container.image.as_deref())
        .collect()
}

fn pod_names(pods: &[Pod]) -> Vec<&str> {
    pods.iter().filter_map(pod_name).collect()
}

/// Runs `handler` for the message in `ctx`.
///
/// # Errors
///
/// Returns `CoreError` if a cluster call or the reply fails, or if the
/// routing pattern lacks the capture group the handler needs.
pub async fn run<C: ClusterOps, R: ChatOps>(
    handler: Handler,
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    match handler {
        Handler::ShowHelp => show_help(ctx).await,
        Handler::ListImages => list_images(ctx).await,
        Handler::ListPods => list_pods(ctx).await,
        Handler::ListAllPods => list_all_pods(ctx).await,
        Handler::PodLogs => pod_logs(ctx, false).await,
        Handler::PreviousPodLogs => pod_logs(ctx, true).await,
        Handler::ListNamespaces => list_namespaces(ctx).await,
        Handler::DescribePod => describe_pod(ctx).await,
        Handler::Unsupported => unsupported_command(ctx).await,
    }
}

async fn show_help<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    ctx.reply(&formatter::help(ctx.table)).await
}

#[instrument(skip(ctx), fields(channel = %ctx.message.channel))]
async fn list_images<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    let namespace = ctx.argument()?;
    let pods = ctx.cluster.list_namespaced_pods(namespace).await?;
    let images = container_images(&pods);
    debug!(namespace, count = images.len(), "Collected container images");
    ctx.reply(&formatter::images_in_namespace(namespace, &images))
        .await
}

#[instrument(skip(ctx), fields(channel = %ctx.message.channel))]
async fn list_pods<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    let namespace = ctx.argument()?;
    let pods = ctx.cluster.list_namespaced_pods(namespace).await?;
    ctx.reply(&formatter::pods_in_namespace(namespace, &pod_names(&pods)))
        .await
}

async fn list_all_pods<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    let pods = ctx.cluster.list_all_pods().await?;
    ctx.reply(&formatter::all_pods(&pod_names(&pods))).await
}

async fn list_namespaces<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    let namespaces = ctx.cluster.list_namespaces().await?;
    let names: Vec<&str> = namespaces
        .iter()
        .filter_map(|ns| ns.metadata.name.as_deref())
        .collect();
    ctx.reply(&formatter::namespaces(&names)).await
}

/// Looks up a pod by name fragment across all namespaces.
///
/// Posts the not-found reply and returns `None` when nothing matches.
async fn resolve_pod<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
    fragment: &str,
) -> Result<Option<PodRef>, CoreError> {
    let pods = ctx.cluster.list_all_pods().await?;
    let Some(pod) = find_pod(&pods, fragment) else {
        info!(fragment, "No pod name contains the requested fragment");
        ctx.reply(&formatter::pod_not_found(fragment)).await?;
        return Ok(None);
    };

    let found = PodRef {
        name: pod_name(pod).unwrap_or(fragment).to_string(),
        namespace: pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
    };
    debug!(fragment, pod = found.name, namespace = found.namespace, "Resolved pod");
    Ok(Some(found))
}

#[instrument(skip(ctx), fields(channel = %ctx.message.channel))]
async fn pod_logs<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
    previous: bool,
) -> Result<(), CoreError> {
    let fragment = ctx.argument()?;
    let Some(pod) = resolve_pod(ctx, fragment).await? else {
        return Ok(());
    };

    let logs = ctx
        .cluster
        .pod_logs(&pod.name, &pod.namespace, previous)
        .await?;

    let filename = if previous {
        format!("{}-previous.log", pod.name)
    } else {
        format!("{}.log", pod.name)
    };
    ctx.reply_file(&formatter::logs_comment(&pod.name), &filename, &logs)
        .await
}

#[instrument(skip(ctx), fields(channel = %ctx.message.channel))]
async fn describe_pod<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    let fragment = ctx.argument()?;
    let Some(pod) = resolve_pod(ctx, fragment).await? else {
        return Ok(());
    };

    let object = ctx.cluster.read_pod(&pod.name, &pod.namespace).await?;
    let description = serde_yaml_ng::to_string(&object)?;
    ctx.reply_file(
        &formatter::description_comment(&pod.name),
        &format!("{}.yaml", pod.name),
        &description,
    )
    .await
}

async fn unsupported_command<C: ClusterOps, R: ChatOps>(
    ctx: &HandlerContext<'_, C, R>,
) -> Result<(), CoreError> {
    debug!(text = ctx.message.text, "Message text not handled by any command");
    ctx.reply(&formatter::unsupported(&ctx.message.text)).await
}
