use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::simulation::{ForceSimulation, LayoutSnapshot};
use crate::error::GraphError;

/// Interaction sent to a running layout
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutCommand {
    DragStart { id: String },
    DragTo { id: String, x: f64, y: f64 },
    DragEnd { id: String },
}

/// Owns the tick loop of a [`ForceSimulation`] running on the tokio runtime.
///
/// Each tick publishes a fresh snapshot. Once the layout cools the loop
/// parks until a drag command warms it up again. Dropping the runner aborts
/// the loop so nothing keeps drawing into a view that no longer exists.
pub struct SimulationRunner {
    commands: mpsc::UnboundedSender<LayoutCommand>,
    snapshots: watch::Receiver<LayoutSnapshot>,
    task: JoinHandle<()>,
}

impl SimulationRunner {
    /// Start ticking. A zero `frame` ticks as fast as the runtime allows,
    /// yielding between steps.
    pub fn spawn(simulation: ForceSimulation, frame: Duration) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(simulation.snapshot());
        let task = tokio::spawn(run_loop(simulation, frame, command_rx, snapshot_tx));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LayoutSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> LayoutSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn send(&self, command: LayoutCommand) -> Result<(), GraphError> {
        self.commands
            .send(command)
            .map_err(|_| GraphError::Stopped)
    }

    pub fn drag_start(&self, id: &str) -> Result<(), GraphError> {
        self.send(LayoutCommand::DragStart { id: id.to_string() })
    }

    pub fn drag_to(&self, id: &str, x: f64, y: f64) -> Result<(), GraphError> {
        self.send(LayoutCommand::DragTo {
            id: id.to_string(),
            x,
            y,
        })
    }

    pub fn drag_end(&self, id: &str) -> Result<(), GraphError> {
        self.send(LayoutCommand::DragEnd { id: id.to_string() })
    }

    /// Wait for the first snapshot matching `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&LayoutSnapshot) -> bool,
    ) -> Result<LayoutSnapshot, GraphError> {
        let mut rx = self.subscribe();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| GraphError::Stopped)?;
        Ok(snapshot.clone())
    }

    /// Wait until the layout has cooled
    pub async fn settled(&self) -> Result<LayoutSnapshot, GraphError> {
        self.wait_for(|s| s.settled).await
    }

    pub fn stop(self) {
        // Drop does the work
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_loop(
    mut simulation: ForceSimulation,
    frame: Duration,
    mut commands: mpsc::UnboundedReceiver<LayoutCommand>,
    snapshots: watch::Sender<LayoutSnapshot>,
) {
    let mut interval = (!frame.is_zero()).then(|| tokio::time::interval(frame));

    loop {
        while let Ok(command) = commands.try_recv() {
            apply(&mut simulation, command);
        }

        if simulation.is_hot() {
            simulation.tick();
            snapshots.send_replace(simulation.snapshot());

            match interval.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None => tokio::task::yield_now().await,
            }
        } else {
            tracing::debug!(ticks = simulation.ticks(), "layout settled");
            // Parked until a drag warms the layout up or the runner goes away
            match commands.recv().await {
                Some(command) => apply(&mut simulation, command),
                None => break,
            }
        }
    }
}

fn apply(simulation: &mut ForceSimulation, command: LayoutCommand) {
    let result = match &command {
        LayoutCommand::DragStart { id } => simulation.drag_start(id),
        LayoutCommand::DragTo { id, x, y } => simulation.drag_to(id, *x, *y),
        LayoutCommand::DragEnd { id } => simulation.drag_end(id),
    };
    if let Err(e) = result {
        tracing::warn!(?command, error = %e, "ignoring layout command");
    }
}
