//! Expected-status tables for every daemon endpoint.
//!
//! Each endpoint declares its table once here as data; call sites never
//! re-declare accepted codes, so the mapping cannot drift between the
//! dozens of operations that share an endpoint family.

use crate::error::Error;

/// How one response status code is interpreted for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The code signals success; the body is decoded (or the stream handed
    /// back) as the call requested.
    Accept,
    /// The code signals a daemon-reported failure with this reason.
    Reject(&'static str),
}

/// The set of status codes one endpoint may answer with.
///
/// Every code the daemon may plausibly return must be present. A code
/// absent from the table is an unmapped failure, never a silent success.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    entries: Vec<(u16, Outcome)>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Mark a status code as success.
    pub fn allow(mut self, code: u16) -> Self {
        self.entries.push((code, Outcome::Accept));
        self
    }

    /// Map a status code to a daemon-reported failure reason.
    pub fn reject(mut self, code: u16, reason: &'static str) -> Self {
        self.entries.push((code, Outcome::Reject(reason)));
        self
    }

    pub fn outcome(&self, code: u16) -> Option<Outcome> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, outcome)| *outcome)
    }

    pub fn accepts(&self, code: u16) -> bool {
        matches!(self.outcome(code), Some(Outcome::Accept))
    }

    /// Judge a response status. `body` is the raw response text, carried on
    /// unmapped codes so the caller can see what the daemon actually said.
    pub fn resolve(&self, code: u16, body: &str) -> Result<(), Error> {
        match self.outcome(code) {
            Some(Outcome::Accept) => Ok(()),
            Some(Outcome::Reject(reason)) => Err(Error::Status { code, reason }),
            None => Err(Error::UnmappedStatus {
                code,
                body: body.to_owned(),
            }),
        }
    }
}

/// One table constructor per endpoint.
pub(crate) mod tables {
    use super::StatusTable;

    const SERVER_ERROR: &str = "server error";
    const NO_SUCH_CONTAINER: &str = "no such container";
    const NOT_PART_OF_SWARM: &str = "node is not part of a swarm";

    fn server_error(table: StatusTable) -> StatusTable {
        table.reject(500, SERVER_ERROR)
    }

    pub fn container_list() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(400, "bad parameter"))
    }

    pub fn container_create() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .allow(201)
                .reject(400, "bad parameter")
                .reject(404, "no such image")
                .reject(406, "impossible to attach"),
        )
    }

    pub fn container_inspect() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    /// start and stop report 304 when the container is already in the
    /// requested state; both are accepted.
    pub fn container_start() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(204)
                .allow(304)
                .reject(404, NO_SUCH_CONTAINER),
        )
    }

    pub fn container_stop() -> StatusTable {
        container_start()
    }

    pub fn container_restart() -> StatusTable {
        server_error(StatusTable::new().allow(204).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn container_kill() -> StatusTable {
        container_restart()
    }

    pub fn container_pause() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(204)
                .reject(404, NO_SUCH_CONTAINER)
                .reject(409, "container already paused"),
        )
    }

    pub fn container_unpause() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(204)
                .reject(404, NO_SUCH_CONTAINER)
                .reject(409, "container is not paused"),
        )
    }

    pub fn container_rename() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(204)
                .reject(404, NO_SUCH_CONTAINER)
                .reject(409, "name already in use"),
        )
    }

    pub fn container_update() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn container_wait() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn container_remove() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(204)
                .reject(400, "bad parameter")
                .reject(404, NO_SUCH_CONTAINER),
        )
    }

    pub fn container_prune() -> StatusTable {
        server_error(StatusTable::new().allow(200))
    }

    /// 101 is the switching-protocols answer for TTY streams.
    pub fn container_logs() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .allow(101)
                .reject(404, NO_SUCH_CONTAINER),
        )
    }

    pub fn container_stats() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn container_attach() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .allow(101)
                .reject(400, "bad parameter")
                .reject(404, NO_SUCH_CONTAINER),
        )
    }

    pub fn container_export() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn container_top() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn container_changes() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn archive_info() -> StatusTable {
        archive_get()
    }

    pub fn archive_get() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .reject(400, "bad parameter")
                .reject(403, "permission denied")
                .reject(404, "no such container or path"),
        )
    }

    pub fn archive_put() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .reject(400, "bad parameter")
                .reject(403, "permission denied, volume or container rootfs is read-only")
                .reject(404, "no such container or path"),
        )
    }

    pub fn commit() -> StatusTable {
        server_error(StatusTable::new().allow(201).reject(404, NO_SUCH_CONTAINER))
    }

    pub fn exec_create() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .allow(201)
                .reject(404, NO_SUCH_CONTAINER)
                .reject(409, "container is paused"),
        )
    }

    pub fn exec_start() -> StatusTable {
        StatusTable::new()
            .allow(200)
            .reject(404, "no such exec instance")
            .reject(409, "container is stopped or paused")
    }

    pub fn exec_resize() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .allow(201)
                .reject(404, "no such exec instance")
                .reject(409, "container is stopped or paused"),
        )
    }

    pub fn exec_inspect() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .reject(404, "no such exec instance"),
        )
    }

    pub fn image_list() -> StatusTable {
        server_error(StatusTable::new().allow(200))
    }

    pub fn image_inspect() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(404, "no such image"))
    }

    pub fn image_history() -> StatusTable {
        image_inspect()
    }

    pub fn image_remove() -> StatusTable {
        server_error(
            StatusTable::new()
                .allow(200)
                .reject(404, "no such image")
                .reject(409, "conflict"),
        )
    }

    fn swarm(table: StatusTable) -> StatusTable {
        server_error(table.reject(503, NOT_PART_OF_SWARM))
    }

    pub fn service_list() -> StatusTable {
        swarm(StatusTable::new().allow(200))
    }

    pub fn service_create() -> StatusTable {
        swarm(
            StatusTable::new()
                .allow(201)
                .reject(400, "bad parameter")
                .reject(403, "network is not eligible for services")
                .reject(409, "name conflicts with an existing service"),
        )
    }

    pub fn service_inspect() -> StatusTable {
        swarm(StatusTable::new().allow(200).reject(404, "no such service"))
    }

    pub fn service_update() -> StatusTable {
        swarm(
            StatusTable::new()
                .allow(200)
                .reject(400, "bad parameter")
                .reject(404, "no such service"),
        )
    }

    pub fn service_remove() -> StatusTable {
        swarm(StatusTable::new().allow(200).reject(404, "no such service"))
    }

    pub fn service_logs() -> StatusTable {
        swarm(
            StatusTable::new()
                .allow(200)
                .allow(101)
                .reject(404, "no such service"),
        )
    }

    pub fn version() -> StatusTable {
        server_error(StatusTable::new().allow(200))
    }

    pub fn ping() -> StatusTable {
        server_error(StatusTable::new().allow(200))
    }

    pub fn info() -> StatusTable {
        server_error(StatusTable::new().allow(200))
    }

    pub fn events() -> StatusTable {
        server_error(StatusTable::new().allow(200).reject(400, "bad parameter"))
    }
}

#[cfg(test)]
mod tests {
    use super::{tables, Outcome, StatusTable};
    use crate::error::Error;

    #[test]
    fn unmapped_code_is_never_accepted() {
        let table = tables::container_start();
        match table.resolve(205, "") {
            Err(Error::UnmappedStatus { code: 205, .. }) => {}
            other => panic!("expected unmapped status, got {other:?}"),
        }
    }

    #[test]
    fn rejected_code_carries_its_reason() {
        let table = tables::container_inspect();
        match table.resolve(404, "") {
            Err(Error::Status { code: 404, reason }) => {
                assert_eq!(reason, "no such container")
            }
            other => panic!("expected mapped status error, got {other:?}"),
        }
    }

    #[test]
    fn start_accepts_not_modified() {
        assert!(tables::container_start().accepts(304));
        assert!(tables::container_start().accepts(204));
        assert!(!tables::container_restart().accepts(304));
    }

    #[test]
    fn every_table_maps_server_error_except_exec_start() {
        let tables: &[(&str, StatusTable)] = &[
            ("container_list", tables::container_list()),
            ("container_create", tables::container_create()),
            ("container_inspect", tables::container_inspect()),
            ("container_start", tables::container_start()),
            ("container_stop", tables::container_stop()),
            ("container_restart", tables::container_restart()),
            ("container_kill", tables::container_kill()),
            ("container_pause", tables::container_pause()),
            ("container_unpause", tables::container_unpause()),
            ("container_rename", tables::container_rename()),
            ("container_update", tables::container_update()),
            ("container_wait", tables::container_wait()),
            ("container_remove", tables::container_remove()),
            ("container_prune", tables::container_prune()),
            ("container_logs", tables::container_logs()),
            ("container_stats", tables::container_stats()),
            ("container_attach", tables::container_attach()),
            ("container_export", tables::container_export()),
            ("archive_get", tables::archive_get()),
            ("archive_put", tables::archive_put()),
            ("archive_info", tables::archive_info()),
            ("commit", tables::commit()),
            ("exec_create", tables::exec_create()),
            ("exec_resize", tables::exec_resize()),
            ("exec_inspect", tables::exec_inspect()),
            ("image_list", tables::image_list()),
            ("image_inspect", tables::image_inspect()),
            ("image_remove", tables::image_remove()),
            ("service_list", tables::service_list()),
            ("service_create", tables::service_create()),
            ("service_update", tables::service_update()),
            ("events", tables::events()),
        ];

        for (name, table) in tables {
            assert_eq!(
                table.outcome(500),
                Some(Outcome::Reject("server error")),
                "{name} does not map 500"
            );
        }
    }
}
