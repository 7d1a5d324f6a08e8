// ABOUTME: Ephemeral orchestration session state.
// ABOUTME: Tracks started container names and the supervised-task event channel.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::process::{CommandRunner, RunResult, ServiceSpec};

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Process-lifetime session: the set of started infrastructure container
/// names (for rollback) and the channel through which supervised launches
/// report their results.
///
/// Container names are appended only by the launch step and read only by
/// rollback, both on the control task.
#[derive(Debug)]
pub struct Session {
    events: mpsc::Receiver<RunResult>,
    sender: mpsc::Sender<RunResult>,
    containers: Vec<String>,
    outstanding: usize,
}

impl Session {
    pub fn new() -> Self {
        let (sender, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            events,
            sender,
            containers: Vec::new(),
            outstanding: 0,
        }
    }

    /// Record an infrastructure container name for rollback targeting.
    pub fn track_container(&mut self, name: String) {
        self.containers.push(name);
    }

    pub fn container_names(&self) -> &[String] {
        &self.containers
    }

    /// Launch a long-running spec as a supervised task. Its result is
    /// delivered to the control loop via the event channel rather than
    /// through ambient panic/exception propagation.
    pub fn launch<R: CommandRunner + 'static>(&mut self, runner: &Arc<R>, spec: ServiceSpec) {
        let sender = self.sender.clone();
        let runner = Arc::clone(runner);
        self.outstanding += 1;
        tokio::spawn(async move {
            let result = runner.run(&spec).await;
            let _ = sender.send(result).await;
        });
    }

    /// Next supervised-task result. Pends forever when nothing is left to
    /// report (the session keeps its own sender alive).
    pub async fn next_event(&mut self) -> Option<RunResult> {
        let event = self.events.recv().await;
        if event.is_some() {
            self.outstanding -= 1;
        }
        event
    }

    /// Number of supervised tasks that have not reported yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
