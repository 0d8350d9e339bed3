//! In-memory daemon double.
//!
//! Implements [`Transport`] over an in-process inventory so handle
//! behavior can be exercised without a socket. Responses go through the
//! same status tables real transports consult, so an error surfaced here
//! carries exactly the reason string a daemon answer would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use base64::Engine;
use bytes::Bytes;
use dashmap::DashMap;
use futures::StreamExt;
use rand::Rng;
use serde_json::{json, Value};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{ByteStream, Call, Method, Payload, Transport};
use crate::error::Error;

/// Lifecycle phase of an emulated container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Paused,
    Exited,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Exited => "exited",
        }
    }
}

struct MockContainer {
    name: Option<String>,
    image: String,
    config: Value,
    phase: Phase,
    exit_code: i64,
    created: i64,
    logs: Vec<Bytes>,
    archives: HashMap<String, Bytes>,
}

struct MockExec {
    container: String,
    cmd: Vec<String>,
    output: Vec<Bytes>,
    running: bool,
    exit_code: i64,
}

struct MockService {
    spec: Value,
    version: u64,
}

/// An emulated daemon holding its whole inventory in process.
pub struct MockDaemon {
    containers: DashMap<String, MockContainer>,
    container_order: Mutex<Vec<String>>,
    execs: DashMap<String, MockExec>,
    services: DashMap<String, MockService>,
    service_order: Mutex<Vec<String>>,
    images: DashMap<String, Value>,
    image_order: Mutex<Vec<String>>,
    events: Mutex<Vec<Value>>,
    clock: AtomicI64,
}

impl Default for MockDaemon {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDaemon {
    pub fn new() -> Self {
        Self {
            containers: DashMap::new(),
            container_order: Mutex::new(Vec::new()),
            execs: DashMap::new(),
            services: DashMap::new(),
            service_order: Mutex::new(Vec::new()),
            images: DashMap::new(),
            image_order: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            clock: AtomicI64::new(1_700_000_000),
        }
    }

    /// Seed an image so `create` calls referencing it succeed.
    pub fn with_image(self, name: impl Into<String>) -> Self {
        self.seed_image(name);
        self
    }

    pub fn seed_image(&self, name: impl Into<String>) {
        let name = name.into();
        let summary = json!({
            "Id": format!("sha256:{}", random_hex(32)),
            "RepoTags": [name.clone()],
            "Created": self.tick(),
            "Size": 7_340_032,
        });
        if self.images.insert(name.clone(), summary).is_none() {
            self.image_order.lock().unwrap().push(name);
        }
    }

    /// Program the byte chunks that logs and attach replay for a container.
    pub fn set_logs(&self, id: &str, chunks: Vec<Bytes>) -> bool {
        match self.containers.get_mut(id) {
            Some(mut c) => {
                c.logs = chunks;
                true
            }
            None => false,
        }
    }

    /// Program the exit code `wait` reports for a container.
    pub fn set_exit_code(&self, id: &str, code: i64) -> bool {
        match self.containers.get_mut(id) {
            Some(mut c) => {
                c.exit_code = code;
                true
            }
            None => false,
        }
    }

    /// Current phase of a container, for assertions.
    pub fn phase(&self, id: &str) -> Option<&'static str> {
        self.containers.get(id).map(|c| c.phase.as_str())
    }

    /// Bytes last uploaded to a container path, for assertions.
    pub fn archive(&self, id: &str, path: &str) -> Option<Bytes> {
        self.containers
            .get(id)
            .and_then(|c| c.archives.get(path).cloned())
    }

    fn tick(&self) -> i64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn record_event(&self, action: &str, id: &str) {
        self.events.lock().unwrap().push(json!({
            "Type": "container",
            "Action": action,
            "Actor": { "ID": id, "Attributes": {} },
            "scope": "local",
            "time": self.tick(),
        }));
    }

    /// Produce the error the endpoint's own table maps this code to.
    fn fail(&self, call: &Call, code: u16, body: &str) -> Error {
        match call.statuses.resolve(code, body) {
            Err(e) => e,
            Ok(()) => Error::transport(format!(
                "mock produced error code {code} but the table for {} accepts it",
                call.path
            )),
        }
    }

    fn respond(&self, call: &Call, code: u16, body: Value) -> Result<Payload, Error> {
        call.statuses.resolve(code, &body.to_string())?;
        if body.is_null() {
            Ok(Payload::Empty)
        } else {
            Ok(Payload::Json(body))
        }
    }

    fn respond_stream(
        &self,
        call: &Call,
        code: u16,
        chunks: Vec<Bytes>,
    ) -> Result<Payload, Error> {
        call.statuses.resolve(code, "")?;
        Ok(Payload::Stream(stream_of(chunks)))
    }
}

fn random_hex(bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..bytes).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

fn stream_of(chunks: Vec<Bytes>) -> ByteStream {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    for chunk in chunks {
        let _ = tx.send(chunk);
    }
    drop(tx);
    UnboundedReceiverStream::new(rx).map(Ok).boxed()
}

fn query<'c>(call: &'c Call, key: &str) -> Option<&'c str> {
    call.query
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

fn body_str(body: &Option<Value>, key: &str) -> Option<String> {
    body.as_ref()?.get(key)?.as_str().map(str::to_owned)
}

#[async_trait::async_trait]
impl Transport for MockDaemon {
    async fn dial(&self, mut call: Call) -> Result<Payload, Error> {
        let path = call.path.clone();
        let segs: Vec<&str> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (call.method, segs.as_slice()) {
            (Method::Get, ["containers", "json"]) => self.container_list(&call),
            (Method::Post, ["containers", "create"]) => self.container_create(&call),
            (Method::Post, ["containers", "prune"]) => self.container_prune(&call),
            (Method::Get, ["containers", id, "json"]) => self.container_inspect(&call, id),
            (Method::Get, ["containers", id, "logs"]) => self.container_logs(&call, id),
            (Method::Get, ["containers", id, "stats"]) => self.container_stats(&call, id),
            (Method::Get, ["containers", id, "export"]) => self.container_export(&call, id),
            (Method::Get, ["containers", id, "top"]) => self.container_top(&call, id),
            (Method::Get, ["containers", id, "changes"]) => self.container_changes(&call, id),
            (Method::Get, ["containers", id, "archive"]) => self.archive_get(&call, id),
            (Method::Head, ["containers", id, "archive"]) => self.archive_info(&call, id),
            (Method::Put, ["containers", id, "archive"]) => {
                let id = id.to_string();
                let input = call.input.take();
                self.archive_put(call, &id, input).await
            }
            (Method::Post, ["containers", id, "attach"]) => self.container_attach(&call, id),
            (Method::Post, ["containers", id, "exec"]) => self.exec_create(&call, id),
            (Method::Post, ["containers", id, verb]) => self.container_verb(&call, id, verb),
            (Method::Delete, ["containers", id]) => self.container_remove(&call, id),
            (Method::Post, ["commit"]) => self.commit(&call),
            (Method::Post, ["exec", id, "start"]) => self.exec_start(&call, id),
            (Method::Post, ["exec", id, "resize"]) => self.exec_resize(&call, id),
            (Method::Get, ["exec", id, "json"]) => self.exec_inspect(&call, id),
            (Method::Get, ["images", "json"]) => self.image_list(&call),
            (Method::Get, ["images", name, "json"]) => self.image_inspect(&call, name),
            (Method::Get, ["images", name, "history"]) => self.image_history(&call, name),
            (Method::Delete, ["images", name]) => self.image_remove(&call, name),
            (Method::Get, ["services"]) => self.service_list(&call),
            (Method::Post, ["services", "create"]) => self.service_create(&call),
            (Method::Get, ["services", id, "logs"]) => self.service_logs(&call, id),
            (Method::Get, ["services", id]) => self.service_inspect(&call, id),
            (Method::Post, ["services", id, "update"]) => self.service_update(&call, id),
            (Method::Delete, ["services", id]) => self.service_remove(&call, id),
            (Method::Get, ["version"]) => self.respond(
                &call,
                200,
                json!({
                    "Version": "24.0.5",
                    "ApiVersion": "1.43",
                    "Os": "linux",
                    "Arch": "amd64",
                }),
            ),
            (Method::Get, ["_ping"]) => {
                call.statuses.resolve(200, "OK")?;
                Ok(Payload::Text("OK".into()))
            }
            (Method::Get, ["info"]) => self.system_info(&call),
            (Method::Get, ["events"]) => self.system_events(&call),
            _ => Err(Error::transport(format!(
                "mock daemon has no route for {} {}",
                call.method, call.path
            ))),
        }
    }
}

impl MockDaemon {
    fn summary(&self, id: &str, c: &MockContainer) -> Value {
        let status = match c.phase {
            Phase::Running => "Up 2 minutes".to_string(),
            Phase::Paused => "Up 2 minutes (Paused)".to_string(),
            Phase::Exited => format!("Exited ({}) 1 minute ago", c.exit_code),
            Phase::Created => "Created".to_string(),
        };
        json!({
            "Id": id,
            "Names": c.name.as_ref().map(|n| vec![format!("/{n}")]).unwrap_or_default(),
            "Image": c.image,
            "Created": c.created,
            "State": c.phase.as_str(),
            "Status": status,
            "Labels": {},
        })
    }

    fn container_list(&self, call: &Call) -> Result<Payload, Error> {
        let all = query(call, "all") == Some("true");
        let order = self.container_order.lock().unwrap().clone();
        let mut out = Vec::new();
        for id in order {
            if let Some(c) = self.containers.get(&id) {
                if all || matches!(c.phase, Phase::Running | Phase::Paused) {
                    out.push(self.summary(&id, &c));
                }
            }
        }
        self.respond(call, 200, Value::Array(out))
    }

    fn container_create(&self, call: &Call) -> Result<Payload, Error> {
        let Some(image) = body_str(&call.body, "Image") else {
            return Err(self.fail(call, 400, "no image specified"));
        };
        if !self.images.contains_key(&image) {
            return Err(self.fail(call, 404, "no such image"));
        }

        let id = random_hex(32);
        let container = MockContainer {
            name: query(call, "name").map(str::to_owned),
            image,
            config: call.body.clone().unwrap_or(Value::Null),
            phase: Phase::Created,
            exit_code: 0,
            created: self.tick(),
            logs: Vec::new(),
            archives: HashMap::new(),
        };
        self.containers.insert(id.clone(), container);
        self.container_order.lock().unwrap().push(id.clone());
        self.record_event("create", &id);

        self.respond(call, 201, json!({ "Id": id, "Warnings": [] }))
    }

    fn container_inspect(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(c) = self.containers.get(id) else {
            return Err(self.fail(call, 404, "no such container"));
        };
        let state = json!({
            "Status": c.phase.as_str(),
            "Running": matches!(c.phase, Phase::Running | Phase::Paused),
            "Paused": c.phase == Phase::Paused,
            "ExitCode": c.exit_code,
            "StartedAt": "2024-01-01T00:00:00Z",
            "FinishedAt": "0001-01-01T00:00:00Z",
        });
        let body = json!({
            "Id": id,
            "Name": format!("/{}", c.name.clone().unwrap_or_else(|| id[..12].to_string())),
            "Created": "2024-01-01T00:00:00Z",
            "Image": c.image,
            "State": state,
            "Config": c.config,
        });
        self.respond(call, 200, body)
    }

    fn container_verb(&self, call: &Call, id: &str, verb: &str) -> Result<Payload, Error> {
        let Some(mut c) = self.containers.get_mut(id) else {
            return Err(self.fail(call, 404, "no such container"));
        };

        match verb {
            "start" => {
                if c.phase == Phase::Running {
                    return self.respond(call, 304, Value::Null);
                }
                c.phase = Phase::Running;
                drop(c);
                self.record_event("start", id);
                self.respond(call, 204, Value::Null)
            }
            "stop" => {
                if matches!(c.phase, Phase::Created | Phase::Exited) {
                    return self.respond(call, 304, Value::Null);
                }
                c.phase = Phase::Exited;
                drop(c);
                self.record_event("stop", id);
                self.respond(call, 204, Value::Null)
            }
            "restart" => {
                c.phase = Phase::Running;
                drop(c);
                self.record_event("restart", id);
                self.respond(call, 204, Value::Null)
            }
            "kill" => {
                c.phase = Phase::Exited;
                c.exit_code = 137;
                drop(c);
                self.record_event("kill", id);
                self.respond(call, 204, Value::Null)
            }
            "pause" => match c.phase {
                Phase::Paused => Err(self.fail(call, 409, "already paused")),
                Phase::Running => {
                    c.phase = Phase::Paused;
                    drop(c);
                    self.record_event("pause", id);
                    self.respond(call, 204, Value::Null)
                }
                _ => Err(self.fail(call, 500, "container is not running")),
            },
            "unpause" => match c.phase {
                Phase::Paused => {
                    c.phase = Phase::Running;
                    drop(c);
                    self.record_event("unpause", id);
                    self.respond(call, 204, Value::Null)
                }
                _ => Err(self.fail(call, 409, "not paused")),
            },
            "rename" => {
                let Some(name) = query(call, "name").map(str::to_owned) else {
                    return Err(self.fail(call, 500, "missing name parameter"));
                };
                // Release the write guard before scanning for collisions;
                // iterating while holding a shard lock deadlocks.
                drop(c);
                let taken = self
                    .containers
                    .iter()
                    .any(|e| e.key() != id && e.value().name.as_deref() == Some(name.as_str()));
                if taken {
                    return Err(self.fail(call, 409, "name already in use"));
                }
                if let Some(mut c) = self.containers.get_mut(id) {
                    c.name = Some(name);
                }
                self.record_event("rename", id);
                self.respond(call, 204, Value::Null)
            }
            "update" => {
                if let Some(body) = &call.body {
                    c.config["HostConfig"] = body.clone();
                }
                self.respond(call, 200, json!({ "Warnings": [] }))
            }
            "wait" => {
                c.phase = Phase::Exited;
                let code = c.exit_code;
                drop(c);
                self.record_event("die", id);
                self.respond(call, 200, json!({ "StatusCode": code, "Error": null }))
            }
            _ => Err(Error::transport(format!(
                "mock daemon has no container verb {verb}"
            ))),
        }
    }

    fn container_remove(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let force = query(call, "force") == Some("true");
        {
            let Some(c) = self.containers.get(id) else {
                return Err(self.fail(call, 404, "no such container"));
            };
            if matches!(c.phase, Phase::Running | Phase::Paused) && !force {
                return Err(self.fail(call, 400, "cannot remove a running container"));
            }
        }
        self.containers.remove(id);
        self.container_order.lock().unwrap().retain(|c| c != id);
        self.record_event("destroy", id);
        self.respond(call, 204, Value::Null)
    }

    fn container_prune(&self, call: &Call) -> Result<Payload, Error> {
        let stopped: Vec<String> = self
            .container_order
            .lock()
            .unwrap()
            .iter()
            .filter(|id| {
                self.containers
                    .get(id.as_str())
                    .map(|c| matches!(c.phase, Phase::Created | Phase::Exited))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for id in &stopped {
            self.containers.remove(id);
            self.record_event("destroy", id);
        }
        self.container_order
            .lock()
            .unwrap()
            .retain(|id| !stopped.contains(id));

        self.respond(
            call,
            200,
            json!({ "ContainersDeleted": stopped, "SpaceReclaimed": 0 }),
        )
    }

    fn container_logs(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(c) = self.containers.get(id) else {
            return Err(self.fail(call, 404, "no such container"));
        };
        let chunks = c.logs.clone();
        drop(c);
        self.respond_stream(call, 200, chunks)
    }

    fn container_attach(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        // Same replay as logs; hijacked stdin is the transport's concern.
        self.container_logs(call, id)
    }

    fn container_stats(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if !self.containers.contains_key(id) {
            return Err(self.fail(call, 404, "no such container"));
        }
        let sample = json!({
            "read": "2024-01-01T00:00:01Z",
            "cpu_stats": { "cpu_usage": { "total_usage": 1_000_000 } },
            "memory_stats": { "usage": 2048, "limit": 8_388_608 },
        });
        let line = Bytes::from(format!("{sample}\n"));
        self.respond_stream(call, 200, vec![line])
    }

    fn container_export(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if !self.containers.contains_key(id) {
            return Err(self.fail(call, 404, "no such container"));
        }
        let tar = format!("tar-export:{id}");
        if call.stream {
            self.respond_stream(call, 200, vec![Bytes::from(tar)])
        } else {
            call.statuses.resolve(200, &tar)?;
            Ok(Payload::Text(tar))
        }
    }

    fn container_top(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if !self.containers.contains_key(id) {
            return Err(self.fail(call, 404, "no such container"));
        }
        self.respond(
            call,
            200,
            json!({
                "Titles": ["PID", "USER", "COMMAND"],
                "Processes": [["1", "root", "sleep infinity"]],
            }),
        )
    }

    fn container_changes(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if !self.containers.contains_key(id) {
            return Err(self.fail(call, 404, "no such container"));
        }
        self.respond(
            call,
            200,
            json!([{ "Path": "/tmp", "Kind": 1 }]),
        )
    }

    fn archive_get(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(path) = query(call, "path") else {
            return Err(self.fail(call, 400, "missing path parameter"));
        };
        let Some(c) = self.containers.get(id) else {
            return Err(self.fail(call, 404, "no such container"));
        };
        let Some(content) = c.archives.get(path).cloned() else {
            return Err(self.fail(call, 404, "no such path"));
        };
        drop(c);
        self.respond_stream(call, 200, vec![content])
    }

    fn archive_info(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(path) = query(call, "path") else {
            return Err(self.fail(call, 400, "missing path parameter"));
        };
        let Some(c) = self.containers.get(id) else {
            return Err(self.fail(call, 404, "no such container"));
        };
        let Some(content) = c.archives.get(path) else {
            return Err(self.fail(call, 404, "no such path"));
        };
        let stat = json!({ "name": path, "size": content.len(), "mode": 0o644 });
        call.statuses.resolve(200, "")?;
        Ok(Payload::Text(
            base64::engine::general_purpose::STANDARD.encode(stat.to_string()),
        ))
    }

    async fn archive_put(
        &self,
        call: Call,
        id: &str,
        input: Option<ByteStream>,
    ) -> Result<Payload, Error> {
        let Some(path) = query(&call, "path").map(str::to_owned) else {
            return Err(self.fail(&call, 400, "missing path parameter"));
        };
        if !self.containers.contains_key(id) {
            return Err(self.fail(&call, 404, "no such container"));
        }
        let Some(mut input) = input else {
            return Err(self.fail(&call, 400, "no archive attached"));
        };

        let mut content = Vec::new();
        while let Some(chunk) = input.next().await {
            content.extend_from_slice(&chunk?);
        }

        if let Some(mut c) = self.containers.get_mut(id) {
            c.archives.insert(path, Bytes::from(content));
        }
        self.respond(&call, 200, Value::Null)
    }

    fn commit(&self, call: &Call) -> Result<Payload, Error> {
        let Some(container) = query(call, "container") else {
            return Err(self.fail(call, 404, "no such container"));
        };
        if !self.containers.contains_key(container) {
            return Err(self.fail(call, 404, "no such container"));
        }

        let image_id = format!("sha256:{}", random_hex(32));
        let name = match (query(call, "repo"), query(call, "tag")) {
            (Some(repo), Some(tag)) => format!("{repo}:{tag}"),
            (Some(repo), None) => format!("{repo}:latest"),
            _ => image_id.clone(),
        };
        let summary = json!({
            "Id": image_id,
            "RepoTags": [name.clone()],
            "Created": self.tick(),
            "Size": 0,
        });
        if self.images.insert(name.clone(), summary).is_none() {
            self.image_order.lock().unwrap().push(name);
        }
        self.respond(call, 201, json!({ "Id": image_id }))
    }

    fn exec_create(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(c) = self.containers.get(id) else {
            return Err(self.fail(call, 404, "no such container"));
        };
        if c.phase == Phase::Paused {
            return Err(self.fail(call, 409, "container is paused"));
        }
        drop(c);

        let cmd: Vec<String> = call
            .body
            .as_ref()
            .and_then(|b| b.get("Cmd"))
            .and_then(|c| c.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();

        // Emulate just enough of a shell for output-shape tests.
        let output = match cmd.split_first() {
            Some((program, args)) if program == "echo" => {
                vec![Bytes::from(format!("{}\n", args.join(" ")))]
            }
            _ => Vec::new(),
        };

        let exec_id = random_hex(32);
        self.execs.insert(
            exec_id.clone(),
            MockExec {
                container: id.to_string(),
                cmd,
                output,
                running: false,
                exit_code: 0,
            },
        );
        self.respond(call, 201, json!({ "Id": exec_id }))
    }

    fn exec_start(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(mut exec) = self.execs.get_mut(id) else {
            return Err(self.fail(call, 404, "no such exec instance"));
        };
        let paused = self
            .containers
            .get(&exec.container)
            .map(|c| c.phase == Phase::Paused)
            .unwrap_or(false);
        if paused {
            return Err(self.fail(call, 409, "container is paused"));
        }

        exec.running = false;
        exec.exit_code = 0;
        let output = exec.output.clone();
        drop(exec);

        let detach = call
            .body
            .as_ref()
            .and_then(|b| b.get("Detach"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if detach {
            self.respond(call, 200, Value::Null)
        } else {
            self.respond_stream(call, 200, output)
        }
    }

    fn exec_resize(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if !self.execs.contains_key(id) {
            return Err(self.fail(call, 404, "no such exec instance"));
        }
        self.respond(call, 200, Value::Null)
    }

    fn exec_inspect(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(exec) = self.execs.get(id) else {
            return Err(self.fail(call, 404, "no such exec instance"));
        };
        let body = json!({
            "ID": id,
            "Running": exec.running,
            "ExitCode": exec.exit_code,
            "ContainerID": exec.container,
            "ProcessConfig": {
                "entrypoint": exec.cmd.first().cloned().unwrap_or_default(),
                "arguments": exec.cmd.get(1..).unwrap_or_default(),
            },
        });
        self.respond(call, 200, body)
    }

    fn image_list(&self, call: &Call) -> Result<Payload, Error> {
        let order = self.image_order.lock().unwrap().clone();
        let out: Vec<Value> = order
            .iter()
            .filter_map(|name| self.images.get(name).map(|v| v.value().clone()))
            .collect();
        self.respond(call, 200, Value::Array(out))
    }

    fn image_inspect(&self, call: &Call, name: &str) -> Result<Payload, Error> {
        let Some(summary) = self.images.get(name) else {
            return Err(self.fail(call, 404, "no such image"));
        };
        let body = json!({
            "Id": summary["Id"],
            "RepoTags": summary["RepoTags"],
            "Created": "2024-01-01T00:00:00Z",
            "Os": "linux",
            "Architecture": "amd64",
            "Size": summary["Size"],
        });
        self.respond(call, 200, body)
    }

    fn image_history(&self, call: &Call, name: &str) -> Result<Payload, Error> {
        let Some(summary) = self.images.get(name) else {
            return Err(self.fail(call, 404, "no such image"));
        };
        let body = json!([{
            "Id": summary["Id"],
            "Created": summary["Created"],
            "CreatedBy": "ADD rootfs.tar /",
            "Size": summary["Size"],
            "Tags": summary["RepoTags"],
        }]);
        self.respond(call, 200, body)
    }

    fn image_remove(&self, call: &Call, name: &str) -> Result<Payload, Error> {
        let Some((_, summary)) = self.images.remove(name) else {
            return Err(self.fail(call, 404, "no such image"));
        };
        self.image_order.lock().unwrap().retain(|n| n != name);
        self.respond(
            call,
            200,
            json!([{ "Untagged": name }, { "Deleted": summary["Id"] }]),
        )
    }

    fn service_list(&self, call: &Call) -> Result<Payload, Error> {
        let order = self.service_order.lock().unwrap().clone();
        let out: Vec<Value> = order
            .iter()
            .filter_map(|id| {
                self.services.get(id).map(|s| {
                    json!({
                        "ID": id,
                        "Version": { "Index": s.version },
                        "Spec": s.spec,
                        "CreatedAt": "2024-01-01T00:00:00Z",
                        "UpdatedAt": "2024-01-01T00:00:00Z",
                    })
                })
            })
            .collect();
        self.respond(call, 200, Value::Array(out))
    }

    fn service_create(&self, call: &Call) -> Result<Payload, Error> {
        let Some(spec) = call.body.clone() else {
            return Err(self.fail(call, 400, "no service spec"));
        };
        let name = spec.get("Name").and_then(Value::as_str).map(str::to_owned);
        if let Some(ref name) = name {
            let conflict = self
                .services
                .iter()
                .any(|e| e.value().spec.get("Name").and_then(Value::as_str) == Some(name.as_str()));
            if conflict {
                return Err(self.fail(call, 409, "name conflict"));
            }
        }

        let id = random_hex(16);
        self.services.insert(
            id.clone(),
            MockService { spec, version: 1 },
        );
        self.service_order.lock().unwrap().push(id.clone());
        self.respond(call, 201, json!({ "ID": id, "Warnings": null }))
    }

    fn service_inspect(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(s) = self.services.get(id) else {
            return Err(self.fail(call, 404, "no such service"));
        };
        let body = json!({
            "ID": id,
            "Version": { "Index": s.version },
            "Spec": s.spec,
            "CreatedAt": "2024-01-01T00:00:00Z",
            "UpdatedAt": "2024-01-01T00:00:00Z",
        });
        self.respond(call, 200, body)
    }

    fn service_update(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        let Some(mut s) = self.services.get_mut(id) else {
            return Err(self.fail(call, 404, "no such service"));
        };
        let version: u64 = query(call, "version")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if version != s.version {
            return Err(self.fail(call, 400, "version out of date"));
        }
        if let Some(spec) = call.body.clone() {
            s.spec = spec;
        }
        s.version += 1;
        self.respond(call, 200, json!({ "Warnings": [] }))
    }

    fn service_remove(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if self.services.remove(id).is_none() {
            return Err(self.fail(call, 404, "no such service"));
        }
        self.service_order.lock().unwrap().retain(|s| s != id);
        self.respond(call, 200, Value::Null)
    }

    fn service_logs(&self, call: &Call, id: &str) -> Result<Payload, Error> {
        if !self.services.contains_key(id) {
            return Err(self.fail(call, 404, "no such service"));
        }
        self.respond_stream(call, 200, Vec::new())
    }

    fn system_info(&self, call: &Call) -> Result<Payload, Error> {
        let running = self
            .containers
            .iter()
            .filter(|e| matches!(e.value().phase, Phase::Running | Phase::Paused))
            .count();
        self.respond(
            call,
            200,
            json!({
                "ID": "mock-daemon",
                "Containers": self.containers.len(),
                "ContainersRunning": running,
                "Images": self.images.len(),
                "Name": "phobos-mock",
                "ServerVersion": "24.0.5",
                "OperatingSystem": "linux",
            }),
        )
    }

    fn system_events(&self, call: &Call) -> Result<Payload, Error> {
        let events = self.events.lock().unwrap().clone();
        let chunks = events
            .into_iter()
            .map(|e| Bytes::from(format!("{e}\n")))
            .collect();
        self.respond_stream(call, 200, chunks)
    }
}
