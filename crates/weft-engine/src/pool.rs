//! A fixed worker pool with dynamic fan-out and barrier waits.
//!
//! Tasks receive a [`PoolHandle`] and may submit further tasks while
//! running — the propagate phase's wavefront grows itself this way.
//! [`WorkerPool::wait_idle`] implements the phase barrier: it returns
//! only when no task is running and none remain queued, counting
//! outstanding tasks explicitly so dynamically appended work is always
//! drained before the barrier lifts.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::error;

use crate::sync::lock;

type Job = Box<dyn FnOnce(&PoolHandle) + Send>;

enum Message {
    Run(Job),
    Exit,
}

#[derive(Default)]
struct Outstanding {
    count: Mutex<usize>,
    idle: Condvar,
}

/// A cloneable handle for submitting tasks to the pool, usable from
/// inside a running task.
#[derive(Clone)]
pub struct PoolHandle {
    tx: Sender<Message>,
    outstanding: Arc<Outstanding>,
}

impl PoolHandle {
    /// Queue a task. The outstanding count is raised before the task is
    /// enqueued, so a barrier entered afterwards cannot miss it.
    pub fn submit(&self, job: impl FnOnce(&PoolHandle) + Send + 'static) {
        *lock(&self.outstanding.count) += 1;
        if self.tx.send(Message::Run(Box::new(job))).is_err() {
            // Pool is shutting down; release the slot we reserved.
            self.finish_one();
        }
    }

    fn finish_one(&self) {
        let mut count = lock(&self.outstanding.count);
        *count -= 1;
        if *count == 0 {
            self.outstanding.idle.notify_all();
        }
    }
}

fn worker_loop(rx: Receiver<Message>, handle: PoolHandle) {
    loop {
        match rx.recv() {
            Ok(Message::Run(job)) => {
                // Backstop containment: individual tasks already handle
                // their own failures, but nothing a task does may stall
                // the barrier or kill the worker.
                if catch_unwind(AssertUnwindSafe(|| job(&handle))).is_err() {
                    error!("worker task panicked");
                }
                handle.finish_one();
            }
            Ok(Message::Exit) | Err(_) => break,
        }
    }
}

/// A fixed-size pool of worker threads executing queued tasks.
pub struct WorkerPool {
    handle: PoolHandle,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn a pool with `threads` workers.
    pub fn new(threads: usize) -> Self {
        let (tx, rx) = unbounded();
        let handle = PoolHandle {
            tx,
            outstanding: Arc::new(Outstanding::default()),
        };
        let workers = (0..threads)
            .map(|_| {
                let rx = rx.clone();
                let handle = handle.clone();
                thread::spawn(move || worker_loop(rx, handle))
            })
            .collect();
        Self { handle, workers }
    }

    /// The submission handle.
    pub fn handle(&self) -> &PoolHandle {
        &self.handle
    }

    /// Queue a task.
    pub fn submit(&self, job: impl FnOnce(&PoolHandle) + Send + 'static) {
        self.handle.submit(job);
    }

    /// Block until every queued task — including tasks submitted while
    /// the barrier is waiting — has finished.
    pub fn wait_idle(&self) {
        let mut count = lock(&self.handle.outstanding.count);
        while *count > 0 {
            count = self
                .handle
                .outstanding
                .idle
                .wait(count)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Stop accepting work and join every worker.
    pub fn shutdown(self) {
        for _ in &self.workers {
            let _ = self.handle.tx.send(Message::Exit);
        }
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_all_submitted_tasks() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = counter.clone();
            pool.submit(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
        pool.wait_idle();
        assert_eq!(counter.load(Ordering::Relaxed), 100);
        pool.shutdown();
    }

    #[test]
    fn barrier_waits_for_dynamically_spawned_tasks() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        fn fan_out(depth: usize, counter: Arc<AtomicUsize>, handle: &PoolHandle) {
            counter.fetch_add(1, Ordering::Relaxed);
            if depth > 0 {
                for _ in 0..2 {
                    let counter = counter.clone();
                    handle.submit(move |handle| fan_out(depth - 1, counter, handle));
                }
            }
        }

        let root_counter = counter.clone();
        pool.submit(move |handle| fan_out(5, root_counter, handle));
        pool.wait_idle();
        // A full binary tree of depth 5: 2^6 - 1 tasks.
        assert_eq!(counter.load(Ordering::Relaxed), 63);
        pool.shutdown();
    }

    #[test]
    fn panicking_task_does_not_stall_the_barrier() {
        let pool = WorkerPool::new(2);
        pool.submit(|_| panic!("boom"));
        let ran = Arc::new(AtomicUsize::new(0));
        let observed = ran.clone();
        pool.submit(move |_| {
            observed.fetch_add(1, Ordering::Relaxed);
        });
        pool.wait_idle();
        assert_eq!(ran.load(Ordering::Relaxed), 1);
        pool.shutdown();
    }

    #[test]
    fn wait_idle_on_empty_pool_returns_immediately() {
        let pool = WorkerPool::new(1);
        pool.wait_idle();
        pool.shutdown();
    }
}
