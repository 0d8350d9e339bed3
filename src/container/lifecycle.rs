use super::model::{UpdateReport, WaitStatus};
use super::options::{KillOptions, StopOptions, UpdateOptions, WaitOptions};
use super::Container;
use crate::error::Error;
use crate::transport::{tables, Call};

impl Container {
    /// Start the container. A container already running answers 304, which
    /// is accepted.
    pub async fn start(&self) -> Result<(), Error> {
        tracing::trace!("Starting container {}", self.id);
        let call = Call::post(
            format!("/containers/{}/start", self.id),
            tables::container_start(),
        );
        self.remote.unit(call).await
    }

    /// Stop the container, waiting up to the configured timeout before the
    /// daemon kills it. Already-stopped containers answer 304, accepted.
    pub async fn stop(&self, opts: &StopOptions) -> Result<(), Error> {
        tracing::trace!("Stopping container {}", self.id);
        let call = Call::post(
            format!("/containers/{}/stop", self.id),
            tables::container_stop(),
        )
        .queries(opts.to_query());
        self.remote.unit(call).await
    }

    pub async fn restart(&self, opts: &StopOptions) -> Result<(), Error> {
        let call = Call::post(
            format!("/containers/{}/restart", self.id),
            tables::container_restart(),
        )
        .queries(opts.to_query());
        self.remote.unit(call).await
    }

    pub async fn kill(&self, opts: &KillOptions) -> Result<(), Error> {
        let call = Call::post(
            format!("/containers/{}/kill", self.id),
            tables::container_kill(),
        )
        .queries(opts.to_query());
        self.remote.unit(call).await
    }

    /// Pause the container. Pausing an already-paused container surfaces
    /// the daemon's conflict answer unchanged.
    pub async fn pause(&self) -> Result<(), Error> {
        let call = Call::post(
            format!("/containers/{}/pause", self.id),
            tables::container_pause(),
        );
        self.remote.unit(call).await
    }

    pub async fn unpause(&self) -> Result<(), Error> {
        let call = Call::post(
            format!("/containers/{}/unpause", self.id),
            tables::container_unpause(),
        );
        self.remote.unit(call).await
    }

    /// Rename the container. The handle keeps addressing it by id.
    pub async fn rename(&self, name: &str) -> Result<(), Error> {
        let call = Call::post(
            format!("/containers/{}/rename", self.id),
            tables::container_rename(),
        )
        .query("name", name);
        self.remote.unit(call).await
    }

    /// Adjust resource limits of the running container. Daemon warnings
    /// are forwarded in the report.
    pub async fn update(&self, opts: &UpdateOptions) -> Result<UpdateReport, Error> {
        let call = Call::post(
            format!("/containers/{}/update", self.id),
            tables::container_update(),
        )
        .json(opts)?;
        let report: UpdateReport = self.remote.value(call).await?;
        for warning in &report.warnings {
            tracing::warn!("updating container {}: {}", self.id, warning);
        }
        Ok(report)
    }

    /// Block until the container exits and resolve with its exit code.
    pub async fn wait(&self, opts: &WaitOptions) -> Result<i64, Error> {
        let call = Call::post(
            format!("/containers/{}/wait", self.id),
            tables::container_wait(),
        )
        .queries(opts.to_query());
        let status: WaitStatus = self.remote.value(call).await?;
        Ok(status.status_code)
    }
}
