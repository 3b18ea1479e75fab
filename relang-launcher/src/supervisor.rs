//! Watches the child process until it exits while keeping the host UI serviced.
//!
//! The loop is a fixed-rate poll: every iteration queries the child's exit
//! status without blocking, dispatches a bounded number of pending host UI
//! events and then sleeps for the poll interval. Detection latency is therefore
//! bounded by one interval.

use std::time::Duration;

use color_eyre::Result;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_EVENTS_PER_POLL: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    StillActive,
    /// `None` when the platform does not report a code (e.g. killed by a signal)
    Exited(Option<i32>),
}

/// A spawned child owned by the supervisor.
///
/// Implementations release their OS handles on drop; the supervisor drops the
/// child exactly once, on the transition to [`SupervisionState::Terminated`].
pub trait ChildProcess {
    /// Must not block
    fn exit_status(&mut self) -> Result<ChildStatus>;
}

impl ChildProcess for std::process::Child {
    fn exit_status(&mut self) -> Result<ChildStatus> {
        Ok(match self.try_wait()? {
            None => ChildStatus::StillActive,
            Some(status) => ChildStatus::Exited(status.code()),
        })
    }
}

/// The host's UI event queue
pub trait EventPump {
    /// Dispatches at most `budget` pending events without blocking and returns
    /// how many were dispatched.
    fn dispatch_pending(&mut self, budget: usize) -> usize;

    /// Signals the host event system that the launcher is shutting down
    fn post_quit(&mut self);
}

/// Used when no tracking surface could be created
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventPump;

impl EventPump for NullEventPump {
    fn dispatch_pending(&mut self, _budget: usize) -> usize {
        0
    }

    fn post_quit(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionState {
    Running,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub poll_interval: Duration,
    /// Caps the events dispatched per iteration so a flood of UI events cannot
    /// delay the next liveness check
    pub max_events_per_poll: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_events_per_poll: DEFAULT_MAX_EVENTS_PER_POLL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisionOutcome {
    pub exit_code: Option<i32>,
    pub polls: u64,
    pub events_dispatched: u64,
}

pub struct Supervisor<C: ChildProcess, P: EventPump> {
    child: Option<C>,
    pump: P,
    config: SupervisorConfig,
    state: SupervisionState,
    polls: u64,
    events_dispatched: u64,
    exit_code: Option<i32>,
}

impl<C: ChildProcess, P: EventPump> Supervisor<C, P> {
    pub const fn new(child: C, pump: P, config: SupervisorConfig) -> Self {
        Self {
            child: Some(child),
            pump,
            config,
            state: SupervisionState::Running,
            polls: 0,
            events_dispatched: 0,
            exit_code: None,
        }
    }

    pub const fn state(&self) -> SupervisionState {
        self.state
    }

    pub const fn pump(&self) -> &P {
        &self.pump
    }

    pub const fn outcome(&self) -> SupervisionOutcome {
        SupervisionOutcome {
            exit_code: self.exit_code,
            polls: self.polls,
            events_dispatched: self.events_dispatched,
        }
    }

    /// Runs a single iteration of the loop, without the trailing sleep
    pub fn step(&mut self) -> SupervisionState {
        if self.state == SupervisionState::Terminated {
            return self.state;
        }

        self.polls += 1;

        if let Some(child) = self.child.as_mut() {
            match child.exit_status() {
                Ok(ChildStatus::Exited(exit_code)) => {
                    self.terminate(exit_code);
                    return self.state;
                }
                Ok(ChildStatus::StillActive) => {}
                Err(error) => {
                    tracing::warn!("could not query the child's exit status: {}", error);
                }
            }
        }

        let dispatched = self.pump.dispatch_pending(self.config.max_events_per_poll);
        self.events_dispatched += dispatched as u64;

        self.state
    }

    fn terminate(&mut self, exit_code: Option<i32>) {
        self.pump.post_quit();

        // Releases the process and thread handles
        drop(self.child.take());

        self.exit_code = exit_code;
        self.state = SupervisionState::Terminated;

        match exit_code {
            Some(code) => tracing::info!(
                "child process exited with code {} after {} polls",
                code,
                self.polls
            ),
            None => tracing::info!(
                "child process exited without a code after {} polls",
                self.polls
            ),
        }
    }

    /// Polls until the child exits
    pub fn run(mut self) -> SupervisionOutcome {
        tracing::info!(
            "supervising child process, polling every {}ms",
            self.config.poll_interval.as_millis()
        );

        while self.step() == SupervisionState::Running {
            std::thread::sleep(self.config.poll_interval);
        }

        self.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::anyhow;
    use std::cell::Cell;
    use std::rc::Rc;

    struct ScriptedChild {
        active_polls: usize,
        exit_code: i32,
        failing_polls: usize,
        released: Rc<Cell<u32>>,
    }

    impl ScriptedChild {
        fn new(active_polls: usize, released: &Rc<Cell<u32>>) -> Self {
            Self {
                active_polls,
                exit_code: 0,
                failing_polls: 0,
                released: released.clone(),
            }
        }
    }

    impl ChildProcess for ScriptedChild {
        fn exit_status(&mut self) -> Result<ChildStatus> {
            if self.failing_polls > 0 {
                self.failing_polls -= 1;
                return Err(anyhow!("the handle is invalid"));
            }

            if self.active_polls > 0 {
                self.active_polls -= 1;
                Ok(ChildStatus::StillActive)
            } else {
                Ok(ChildStatus::Exited(Some(self.exit_code)))
            }
        }
    }

    impl Drop for ScriptedChild {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    /// Has `pending` events queued on every iteration
    #[derive(Default)]
    struct CountingPump {
        pending: usize,
        calls: usize,
        dispatched: usize,
        quits: usize,
    }

    impl EventPump for CountingPump {
        fn dispatch_pending(&mut self, budget: usize) -> usize {
            self.calls += 1;
            let dispatched = self.pending.min(budget);
            self.dispatched += dispatched;
            dispatched
        }

        fn post_quit(&mut self) {
            self.quits += 1;
        }
    }

    fn config() -> SupervisorConfig {
        SupervisorConfig {
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[test]
    fn never_terminates_while_the_child_is_active() {
        let released = Rc::new(Cell::new(0));
        let child = ScriptedChild::new(1_000, &released);
        let mut supervisor = Supervisor::new(child, CountingPump::default(), config());

        for _ in 0..1_000 {
            assert_eq!(supervisor.step(), SupervisionState::Running);
        }

        assert_eq!(supervisor.pump().quits, 0);
        assert_eq!(released.get(), 0);
        assert_eq!(supervisor.step(), SupervisionState::Terminated);
    }

    #[test]
    fn terminates_exactly_once() {
        let released = Rc::new(Cell::new(0));
        let mut child = ScriptedChild::new(3, &released);
        child.exit_code = 7;
        let mut supervisor = Supervisor::new(child, CountingPump::default(), config());

        let mut transitions = 0;
        let mut previous = supervisor.state();
        for _ in 0..10 {
            let state = supervisor.step();
            if previous == SupervisionState::Running && state == SupervisionState::Terminated {
                transitions += 1;
            }
            previous = state;
        }

        assert_eq!(transitions, 1);
        assert_eq!(supervisor.pump().quits, 1);
        assert_eq!(released.get(), 1);

        let outcome = supervisor.outcome();
        assert_eq!(outcome.exit_code, Some(7));
        assert_eq!(outcome.polls, 4);
    }

    #[test]
    fn dispatches_events_on_every_running_iteration() {
        let released = Rc::new(Cell::new(0));
        let child = ScriptedChild::new(5, &released);
        let pump = CountingPump {
            pending: 3,
            ..Default::default()
        };
        let mut supervisor = Supervisor::new(child, pump, config());

        while supervisor.step() == SupervisionState::Running {}

        assert_eq!(supervisor.pump().calls, 5);
        assert_eq!(supervisor.outcome().events_dispatched, 15);
    }

    #[test]
    fn event_flood_does_not_starve_the_liveness_check() {
        let released = Rc::new(Cell::new(0));
        let child = ScriptedChild::new(2, &released);
        let pump = CountingPump {
            pending: usize::MAX,
            ..Default::default()
        };
        let config = SupervisorConfig {
            poll_interval: Duration::from_millis(1),
            max_events_per_poll: 64,
        };

        let outcome = Supervisor::new(child, pump, config).run();

        assert_eq!(outcome.polls, 3);
        assert_eq!(outcome.events_dispatched, 128);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn failed_status_queries_keep_the_loop_running() {
        let released = Rc::new(Cell::new(0));
        let mut child = ScriptedChild::new(0, &released);
        child.failing_polls = 2;
        let mut supervisor = Supervisor::new(child, CountingPump::default(), config());

        assert_eq!(supervisor.step(), SupervisionState::Running);
        assert_eq!(supervisor.step(), SupervisionState::Running);
        assert_eq!(supervisor.step(), SupervisionState::Terminated);
        assert_eq!(supervisor.outcome().exit_code, Some(0));
    }

    #[test]
    fn runs_without_a_tracking_surface() {
        let released = Rc::new(Cell::new(0));
        let child = ScriptedChild::new(2, &released);

        let outcome = Supervisor::new(child, NullEventPump, config()).run();

        assert_eq!(outcome.polls, 3);
        assert_eq!(outcome.events_dispatched, 0);
        assert_eq!(released.get(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn detects_a_real_child_exit_within_one_interval() {
        use std::process::Command;
        use std::time::Instant;

        let started = Instant::now();
        let child = Command::new("sh")
            .args(["-c", "sleep 0.3; exit 3"])
            .spawn()
            .unwrap();

        let config = SupervisorConfig {
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        };

        let outcome = Supervisor::new(child, NullEventPump, config).run();
        let elapsed = started.elapsed();

        // The child's own runtime, one poll interval, and slack for process startup
        assert_eq!(outcome.exit_code, Some(3));
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(300 + 20 + 150), "{elapsed:?}");
        assert!(outcome.polls > 1);
    }
}
