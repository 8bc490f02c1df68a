//! The tick coordinator: three barrier phases over the worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use weft_mesh::{SimulationConfig, StateUpdate};

use crate::pool::{PoolHandle, WorkerPool};
use crate::sync::lock;

/// Executes ticks over a [`SimulationConfig`] using a fixed worker
/// pool.
///
/// One tick is three strictly sequential barrier phases:
///
/// 1. **Compute** — one task per chip function (simulate and queue
///    state changes for outputs that differ) and one per connector
///    (advance its switching delay). If nothing reports a change the
///    tick ends here.
/// 2. **Propagate** — one task per queued change; each applies its
///    change to the target vertex and fans out over connected edges by
///    submitting further tasks, unbounded, until the wavefront dies
///    out.
/// 3. **Rectify** — one task per vertex, committing in-progress state
///    to the externally visible fields.
///
/// No phase overlaps another: the barrier between phases waits for
/// dynamically spawned work too. Task failures are contained inside the
/// tasks themselves; a tick always runs to completion.
pub struct Coordinator {
    worker_threads: usize,
    pool: Option<WorkerPool>,
    config: Option<Arc<SimulationConfig>>,
}

impl Coordinator {
    /// Create a coordinator whose pool, once started, has
    /// `worker_threads` threads (at least one).
    pub fn new(worker_threads: usize) -> Self {
        Self {
            worker_threads: worker_threads.max(1),
            pool: None,
            config: None,
        }
    }

    /// Replace the simulation config driven by subsequent ticks.
    pub fn configure(&mut self, config: Arc<SimulationConfig>) {
        self.config = Some(config);
    }

    /// Spin up the worker pool. A no-op if already started.
    pub fn start(&mut self) {
        if self.pool.is_none() {
            self.pool = Some(WorkerPool::new(self.worker_threads));
        }
    }

    /// Shut down the worker pool. A no-op if already stopped.
    pub fn stop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
        }
    }

    /// Reset every connector to its default connected/delay state.
    ///
    /// Vertex state is left alone: vertices reset naturally as the next
    /// ticks overwrite their unconnected defaults.
    pub fn reset(&self) {
        if let Some(config) = &self.config {
            for connector in config.connectors() {
                connector.reset();
            }
        }
    }

    /// Execute one tick. A no-op without a config or a started pool.
    pub fn tick(&mut self) {
        let Some(config) = self.config.clone() else {
            return;
        };
        let Some(pool) = &self.pool else {
            return;
        };

        // Phase 1 — compute.
        let changed = Arc::new(AtomicBool::new(false));
        let queue: Arc<Mutex<Vec<StateUpdate>>> = Arc::new(Mutex::new(Vec::new()));

        for function in config.functions() {
            let function = function.clone();
            let queue = queue.clone();
            let changed = changed.clone();
            pool.submit(move |_| {
                let mut local = Vec::new();
                if function.tick(&mut local) {
                    changed.store(true, Ordering::Relaxed);
                }
                if !local.is_empty() {
                    lock(&queue).append(&mut local);
                }
            });
        }
        for connector in config.connectors() {
            let connector = connector.clone();
            let changed = changed.clone();
            pool.submit(move |_| {
                if connector.tick() {
                    changed.store(true, Ordering::Relaxed);
                }
            });
        }
        pool.wait_idle();

        let updates = std::mem::take(&mut *lock(&queue));

        // Steady state: nothing changed anywhere this tick, so skip
        // propagation and rectification entirely.
        if !changed.load(Ordering::Relaxed) {
            return;
        }

        // Phase 2 — propagate, with unbounded dynamic fan-out.
        for update in updates {
            pool.submit(move |handle| propagate(update, handle));
        }
        pool.wait_idle();

        // Phase 3 — rectify.
        for vertex in config.vertices() {
            let vertex = vertex.clone();
            pool.submit(move |_| vertex.rectify());
        }
        pool.wait_idle();
    }
}

/// Apply one state change and fan the wavefront out over connected
/// edges.
///
/// Endpoints already holding the desired state (or conflicted) compare
/// false, which is what stops a wavefront that reaches the same vertex
/// twice from doing duplicate work.
fn propagate(update: StateUpdate, handle: &PoolHandle) {
    update.vertex.apply(update.change);
    let change = update.change;
    update.vertex.for_each_edge(|edge| {
        if !edge.is_connected() {
            return;
        }
        if edge.endpoint().compare(change) {
            let next = StateUpdate {
                vertex: edge.endpoint().clone(),
                change,
            };
            handle.submit(move |handle| propagate(next, handle));
        }
    });
}
