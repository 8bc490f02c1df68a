//! The tick timer: a dedicated thread pacing the simulator.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::simulator::Simulator;
use crate::sync::lock;

struct TimerShared {
    running: AtomicBool,
    reset_flag: AtomicBool,
    cycle_nanos: AtomicU64,
    /// The next simulator to run; consumed by the loop, which stops the
    /// current one first. Swaps never overlap.
    incoming: Mutex<Option<Arc<dyn Simulator>>>,
    /// The simulator the loop is ticking. Survives stop/start so a
    /// paused simulation resumes where it left off.
    current: Mutex<Option<Arc<dyn Simulator>>>,
}

/// Paces a [`Simulator`] at a target cycle duration from a dedicated
/// loop thread.
///
/// Each cycle, in order: pending simulator swaps are applied (old one
/// stopped fully before the new one starts), a requested reset is
/// executed synchronously, and then one tick runs followed by a sleep
/// for whatever remains of the cycle budget. A tick that overruns its
/// budget just starts the next cycle immediately — ticks may slip, but
/// they never queue up.
pub struct TickTimer {
    shared: Arc<TimerShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl TickTimer {
    /// Create a timer with the given target cycle duration. The loop
    /// thread is not spawned until [`TickTimer::start`].
    pub fn new(target_cycle: Duration) -> Self {
        Self {
            shared: Arc::new(TimerShared {
                running: AtomicBool::new(false),
                reset_flag: AtomicBool::new(false),
                cycle_nanos: AtomicU64::new(cycle_to_nanos(target_cycle)),
                incoming: Mutex::new(None),
                current: Mutex::new(None),
            }),
            thread: Mutex::new(None),
        }
    }

    /// Spawn the loop thread. A no-op if already running.
    pub fn start(&self) {
        let mut thread = lock(&self.thread);
        if self.shared.running.load(Ordering::Acquire) {
            return;
        }
        // A previous loop may still be winding down; let it finish so
        // two loops never drive the same simulator.
        if let Some(old) = thread.take() {
            let _ = old.join();
        }
        self.shared.running.store(true, Ordering::Release);
        let shared = self.shared.clone();
        *thread = Some(thread::spawn(move || run(&shared)));
    }

    /// Signal the loop to exit after its current iteration. The loop
    /// stops the current simulator on its way out. Does not block.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
    }

    /// Whether the loop is (still) scheduled to run.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Request a simulator reset before the next tick. Executed on the
    /// loop thread, never mid-tick.
    pub fn request_reset(&self) {
        self.shared.reset_flag.store(true, Ordering::Release);
    }

    /// Replace the simulator. The loop stops the outgoing one fully
    /// before starting the replacement, between ticks.
    pub fn set_simulator(&self, simulator: Arc<dyn Simulator>) {
        *lock(&self.shared.incoming) = Some(simulator);
    }

    /// Change the target cycle duration, effective from the next cycle.
    pub fn set_target_cycle(&self, target_cycle: Duration) {
        self.shared
            .cycle_nanos
            .store(cycle_to_nanos(target_cycle), Ordering::Relaxed);
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = lock(&self.thread).take() {
            let _ = thread.join();
        }
    }
}

fn cycle_to_nanos(cycle: Duration) -> u64 {
    u64::try_from(cycle.as_nanos()).unwrap_or(u64::MAX)
}

fn run(shared: &TimerShared) {
    // Resuming: a simulator that was current before the last stop picks
    // back up; its start is idempotent.
    if let Some(current) = lock(&shared.current).clone() {
        current.start();
    }

    while shared.running.load(Ordering::Acquire) {
        // 1. Apply a pending swap: stop the old simulator completely
        //    before the new one starts.
        if let Some(next) = lock(&shared.incoming).take() {
            if let Some(old) = lock(&shared.current).take() {
                old.stop();
            }
            next.start();
            *lock(&shared.current) = Some(next);
        }

        // 2. Execute a requested reset here, synchronously, so it can
        //    never race an in-flight tick.
        if shared.reset_flag.swap(false, Ordering::AcqRel) {
            if let Some(current) = lock(&shared.current).clone() {
                current.reset();
            }
        }

        // 3. One paced tick.
        let cycle_start = Instant::now();
        if let Some(current) = lock(&shared.current).clone() {
            current.tick();
        }
        let budget = Duration::from_nanos(shared.cycle_nanos.load(Ordering::Relaxed));
        let elapsed = cycle_start.elapsed();
        if let Some(remaining) = budget.checked_sub(elapsed) {
            thread::sleep(remaining);
        } else if !budget.is_zero() {
            warn!(
                budget_us = budget.as_micros() as u64,
                elapsed_us = elapsed.as_micros() as u64,
                "tick overran its cycle budget; starting next cycle immediately"
            );
        }
    }

    // Loop exit: stop the current simulator but keep it current so a
    // later start resumes it.
    if let Some(current) = lock(&shared.current).clone() {
        current.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Records lifecycle calls so tests can assert ordering.
    struct Recorder {
        label: &'static str,
        log: Arc<StdMutex<Vec<String>>>,
    }

    impl Recorder {
        fn event(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{}:{}", self.label, what));
        }
    }

    impl Simulator for Recorder {
        fn initialize(
            &self,
            _design: &weft_core::Design,
        ) -> Result<Arc<weft_mesh::SimulatedDesign>, weft_core::MeshError> {
            Ok(weft_mesh::SimulatedDesign::blank())
        }

        fn start(&self) {
            self.event("start");
        }

        fn stop(&self) {
            self.event("stop");
        }

        fn tick(&self) {
            self.event("tick");
        }

        fn reset(&self) {
            self.event("reset");
        }
    }

    fn recorder(label: &'static str, log: &Arc<StdMutex<Vec<String>>>) -> Arc<Recorder> {
        Arc::new(Recorder {
            label,
            log: log.clone(),
        })
    }

    fn wait_for(log: &Arc<StdMutex<Vec<String>>>, needle: &str) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if log.lock().unwrap().iter().any(|entry| entry == needle) {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("timed out waiting for {needle}");
    }

    #[test]
    fn start_is_idempotent_and_stop_halts_the_loop() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let timer = TickTimer::new(Duration::from_millis(1));
        timer.set_simulator(recorder("sim", &log));

        assert!(!timer.is_running());
        timer.start();
        timer.start();
        assert!(timer.is_running());

        wait_for(&log, "sim:tick");
        timer.stop();
        assert!(!timer.is_running());
        wait_for(&log, "sim:stop");
    }

    #[test]
    fn swap_stops_the_old_simulator_before_starting_the_new() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let timer = TickTimer::new(Duration::from_millis(1));
        timer.set_simulator(recorder("old", &log));
        timer.start();
        wait_for(&log, "old:tick");

        timer.set_simulator(recorder("new", &log));
        wait_for(&log, "new:tick");
        timer.stop();
        wait_for(&log, "new:stop");

        let log = log.lock().unwrap();
        let stop_old = log.iter().position(|e| e == "old:stop").unwrap();
        let start_new = log.iter().position(|e| e == "new:start").unwrap();
        assert!(
            stop_old < start_new,
            "swap must stop the old simulator before starting the new one"
        );
    }

    #[test]
    fn reset_runs_between_ticks() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let timer = TickTimer::new(Duration::from_millis(1));
        timer.set_simulator(recorder("sim", &log));
        timer.start();
        wait_for(&log, "sim:tick");

        timer.request_reset();
        wait_for(&log, "sim:reset");
        timer.stop();
    }

    #[test]
    fn stopped_timer_resumes_the_same_simulator() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let timer = TickTimer::new(Duration::from_millis(1));
        timer.set_simulator(recorder("sim", &log));
        timer.start();
        wait_for(&log, "sim:tick");
        timer.stop();
        wait_for(&log, "sim:stop");

        log.lock().unwrap().clear();
        timer.start();
        wait_for(&log, "sim:start");
        wait_for(&log, "sim:tick");
        timer.stop();
    }
}
