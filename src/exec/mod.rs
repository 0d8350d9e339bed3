//! The two-phase exec protocol: allocate an instance against a container,
//! then start it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::transport::{tables, ByteStream, Call, Remote};

/// Factory for exec instances.
#[derive(Debug, Clone)]
pub struct Execs {
    remote: Remote,
}

impl Execs {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// Allocate an exec instance scoped to `container`. The returned handle
    /// is bound to both the exec identifier and the owning container.
    pub async fn create(&self, container: &str, opts: &ExecCreateOptions) -> Result<Exec, Error> {
        let call = Call::post(format!("/containers/{container}/exec"), tables::exec_create())
            .json(opts)?;
        let body = self.remote.raw(call).await?;
        let id = body
            .get("Id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::transport("exec create response without an Id"))?;
        tracing::trace!("Created exec {} in container {}", id, container);

        Ok(Exec {
            remote: self.remote.clone(),
            id,
            container: Some(container.to_owned()),
            snapshot: Some(body),
        })
    }

    /// Wrap a known exec identifier without touching the daemon. The owning
    /// container is unknown for handles built this way.
    pub fn get(&self, id: impl Into<String>) -> Exec {
        Exec {
            remote: self.remote.clone(),
            id: id.into(),
            container: None,
            snapshot: None,
        }
    }
}

/// Handle to one exec instance.
#[derive(Debug, Clone)]
pub struct Exec {
    remote: Remote,
    id: String,
    container: Option<String>,
    snapshot: Option<Value>,
}

impl Exec {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the owning container, when the handle was produced by
    /// [`Execs::create`].
    pub fn container_id(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn snapshot(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    /// Begin execution. Resolves with the process output stream, or with
    /// `None` when started detached.
    pub async fn start(&self, opts: &ExecStartOptions) -> Result<Option<ByteStream>, Error> {
        let call = Call::post(format!("/exec/{}/start", self.id), tables::exec_start())
            .json(opts)?;
        if opts.detach {
            self.remote.unit(call).await?;
            Ok(None)
        } else {
            Ok(Some(self.remote.stream(call).await?))
        }
    }

    /// Adjust the pseudo-terminal dimensions of the running exec.
    pub async fn resize(&self, width: u32, height: u32) -> Result<(), Error> {
        let call = Call::post(format!("/exec/{}/resize", self.id), tables::exec_resize())
            .query("w", width)
            .query("h", height);
        self.remote.unit(call).await
    }

    /// Re-fetch exec metadata, replacing the snapshot.
    pub async fn inspect(&mut self) -> Result<ExecDetails, Error> {
        let call = Call::get(format!("/exec/{}/json", self.id), tables::exec_inspect());
        let body = self.remote.raw(call).await?;
        let details = serde_json::from_value(body.clone())?;
        self.snapshot = Some(body);
        Ok(details)
    }
}

/// Configuration for allocating an exec instance.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecCreateOptions {
    pub cmd: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stderr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
}

/// Configuration for starting an allocated exec instance.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecStartOptions {
    /// Run without holding a connection open; `start` then resolves with
    /// no output stream.
    pub detach: bool,
    pub tty: bool,
}

/// The inspect representation of one exec instance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExecDetails {
    #[serde(rename = "ID")]
    pub id: String,
    pub running: bool,
    pub exit_code: i64,
    #[serde(rename = "ContainerID")]
    pub container_id: String,
    pub process_config: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_details_use_engine_id_casing() {
        let details: ExecDetails = serde_json::from_value(serde_json::json!({
            "ID": "e1",
            "Running": false,
            "ExitCode": 0,
            "ContainerID": "c1",
        }))
        .unwrap();
        assert_eq!(details.id, "e1");
        assert_eq!(details.container_id, "c1");
    }

    #[test]
    fn start_options_serialize_pascal_case() {
        let body = serde_json::to_value(ExecStartOptions {
            detach: true,
            tty: false,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "Detach": true, "Tty": false }));
    }
}
