//! Per-operation configuration records.
//!
//! Each optional field maps to exactly one query parameter or body field;
//! unset fields are omitted so the daemon's defaults apply. Option values
//! are never validated client-side; the daemon's own error responses are
//! authoritative.

use std::collections::HashMap;

use serde::Serialize;

fn flag(query: &mut Vec<(&'static str, String)>, key: &'static str, on: bool) {
    if on {
        query.push((key, "true".to_string()));
    }
}

fn param(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<impl ToString>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

/// Options for listing containers.
#[derive(Debug, Clone, Default)]
pub struct ListContainersOptions {
    /// Include stopped containers; by default only running ones are shown.
    pub all: bool,
    /// Return only this many most recently created containers.
    pub limit: Option<isize>,
    /// Include size fields in each entry.
    pub size: bool,
    /// Daemon-side filters, e.g. `status` or `label`.
    pub filters: HashMap<String, Vec<String>>,
}

impl ListContainersOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        flag(&mut query, "all", self.all);
        param(&mut query, "limit", self.limit);
        flag(&mut query, "size", self.size);
        query
    }
}

/// Creation-time configuration. `name` travels as a query parameter; the
/// remaining fields form the JSON body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateContainerOptions {
    #[serde(skip)]
    pub name: Option<String>,
    /// Image to create the container from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    /// Environment in `KEY=value` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stderr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    /// Ports to expose, keyed `port/protocol` with empty objects as
    /// values, as the API expects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposed_ports: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfig>,
}

/// Host-dependent container configuration.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    /// Volume bindings, `host-src:container-dest[:ro]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binds: Option<Vec<String>>,
    /// Memory limit in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_remove: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_bindings: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestartPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_retry_count: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct LogsOptions {
    /// Keep the stream open for new output.
    pub follow: bool,
    pub stdout: bool,
    pub stderr: bool,
    pub timestamps: bool,
    /// Only output after this UNIX timestamp.
    pub since: Option<i64>,
    pub until: Option<i64>,
    /// Number of trailing lines, or `all`.
    pub tail: Option<String>,
}

impl LogsOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        flag(&mut query, "follow", self.follow);
        flag(&mut query, "stdout", self.stdout);
        flag(&mut query, "stderr", self.stderr);
        flag(&mut query, "timestamps", self.timestamps);
        param(&mut query, "since", self.since);
        param(&mut query, "until", self.until);
        param(&mut query, "tail", self.tail.as_ref());
        query
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StopOptions {
    /// Seconds to wait before killing the container.
    pub timeout: Option<i64>,
}

impl StopOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        param(&mut query, "t", self.timeout);
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct KillOptions {
    /// Signal name or number; the daemon defaults to SIGKILL.
    pub signal: Option<String>,
}

impl KillOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        param(&mut query, "signal", self.signal.as_ref());
        query
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveContainerOptions {
    /// Also remove anonymous volumes.
    pub volumes: bool,
    /// Kill a running container first.
    pub force: bool,
    pub link: bool,
}

impl RemoveContainerOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        flag(&mut query, "v", self.volumes);
        flag(&mut query, "force", self.force);
        flag(&mut query, "link", self.link);
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    /// State to wait for: `not-running` (default), `next-exit`, `removed`.
    pub condition: Option<String>,
}

impl WaitOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        param(&mut query, "condition", self.condition.as_ref());
        query
    }
}

/// Resource limits applied to a running container.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
}

#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    /// Keep sampling; `false` asks for a single sample.
    pub stream: bool,
    pub one_shot: bool,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            stream: true,
            one_shot: false,
        }
    }
}

impl StatsOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("stream", self.stream.to_string())];
        flag(&mut query, "one-shot", self.one_shot);
        query
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachOptions {
    pub stream: bool,
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
    /// Replay buffered output before attaching.
    pub logs: bool,
}

impl AttachOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        flag(&mut query, "stream", self.stream);
        flag(&mut query, "stdin", self.stdin);
        flag(&mut query, "stdout", self.stdout);
        flag(&mut query, "stderr", self.stderr);
        flag(&mut query, "logs", self.logs);
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    pub filters: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Repository name for the produced image.
    pub repo: Option<String>,
    pub tag: Option<String>,
    pub comment: Option<String>,
    pub author: Option<String>,
    /// Pause the container while committing; daemon default is true.
    pub pause: Option<bool>,
    /// Dockerfile instructions to apply, e.g. `CMD ["sh"]`.
    pub changes: Option<String>,
}

impl CommitOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        param(&mut query, "repo", self.repo.as_ref());
        param(&mut query, "tag", self.tag.as_ref());
        param(&mut query, "comment", self.comment.as_ref());
        param(&mut query, "author", self.author.as_ref());
        param(&mut query, "pause", self.pause);
        param(&mut query, "changes", self.changes.as_ref());
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopOptions {
    /// Arguments passed to ps, e.g. `aux`.
    pub ps_args: Option<String>,
}

impl TopOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        param(&mut query, "ps_args", self.ps_args.as_ref());
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct PutArchiveOptions {
    /// Directory inside the container to extract into.
    pub path: String,
    /// Refuse to replace a directory with a non-directory and vice versa.
    pub no_overwrite_dir_non_dir: bool,
}

impl PutArchiveOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("path", self.path.clone())];
        flag(&mut query, "noOverwriteDirNonDir", self.no_overwrite_dir_non_dir);
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted_from_the_body() {
        let opts = CreateContainerOptions {
            image: Some("alpine".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&opts).unwrap();
        assert_eq!(body, serde_json::json!({ "Image": "alpine" }));
    }

    #[test]
    fn name_is_not_part_of_the_body() {
        let opts = CreateContainerOptions {
            name: Some("web".into()),
            image: Some("alpine".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&opts).unwrap();
        assert!(body.get("Name").is_none());
    }

    #[test]
    fn logs_query_carries_only_set_flags() {
        let opts = LogsOptions {
            stdout: true,
            tail: Some("10".into()),
            ..Default::default()
        };
        assert_eq!(
            opts.to_query(),
            vec![("stdout", "true".to_string()), ("tail", "10".to_string())]
        );
    }

    #[test]
    fn host_config_uses_engine_field_names() {
        let config = HostConfig {
            binds: Some(vec!["/a:/b".into()]),
            nano_cpus: Some(500_000_000),
            ..Default::default()
        };
        let body = serde_json::to_value(&config).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "Binds": ["/a:/b"], "NanoCpus": 500_000_000i64 })
        );
    }
}
