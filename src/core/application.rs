//! # Application: starts components, waits for shutdown, stops them within a deadline.
//!
//! The [`Application`] owns the component list, the root [`Context`], the run state and
//! the event [`Bus`]. One call to [`Application::run`] drives the whole lifecycle.
//!
//! ## High-level architecture
//! ```text
//! run():
//!   StateCell::begin()            Idle → Running (else AlreadyRunning / AlreadyFinished)
//!   event_listener()              Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Spawn (one JoinSet = failure group):
//!   component[i] ──► "stop:<name>"  waits latch[i], then root.done(), then stop(detached ctx)
//!                └─► "start:<name>" fires latch[i] + drops barrier share, then start(root.child())
//!
//!   barrier.recv() == None        every start attempt has been dispatched
//!   "signal" bridge               registers OS signals → StopHandle::trigger("signal ...")
//!
//! Drain:
//!   first task error ─► recorded, StopHandle::trigger("component failed: ...")
//!   root done ──► wait for the remaining tasks (bounded by Config::grace when set)
//!                    ├─ all joined        → Bus.publish(AllStopped)
//!                    └─ grace exceeded    → abort stuck tasks, Bus.publish(GraceExceeded)
//!
//! Finish:
//!   StopHandle::complete()        state = Finished, root cancelled
//!   Bus.publish(RunFinished)      listener drains subscribers and exits
//! ```
//!
//! ## Rules
//! - `stop` of a component never begins before its `start` was dispatched.
//! - A `stop` runs at most once per component and only after the root context is done.
//! - `stop` receives a context that is not cancelled by shutdown but carries
//!   a deadline of `Config::stop_timeout`.
//! - The first non-cancellation error of any task is returned; later ones are dropped.
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use appvisor::{Application, ComponentError, ComponentFn, Config, Context};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.stop_timeout = Duration::from_secs(5);
//!
//!     let worker = ComponentFn::arc(
//!         "worker",
//!         |ctx: Context| async move {
//!             while !ctx.is_done() {
//!                 tokio::time::sleep(Duration::from_millis(250)).await;
//!             }
//!             Ok::<_, ComponentError>(())
//!         },
//!         |_ctx: Context| async { Ok::<_, ComponentError>(()) },
//!     );
//!
//!     let app = Application::builder(cfg).with_component(worker).build()?;
//!     app.run().await?;
//!     Ok(())
//! }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time;

use crate::components::ComponentRef;
use crate::context::Context;
use crate::core::builder::ApplicationBuilder;
use crate::core::config::Config;
use crate::core::handle::StopHandle;
use crate::core::runner::{self, Dispatch};
use crate::core::state::{RunState, StateCell};
use crate::error::RunError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Label and outcome of one finished task.
type TaskOutput = (String, Result<(), RunError>);

/// Starts a set of components and stops them on shutdown.
pub struct Application {
    cfg: Config,
    components: Vec<ComponentRef>,
    root: Context,
    state: Arc<StateCell>,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    handle: StopHandle,
}

impl Application {
    /// Returns a builder for an application with the given configuration.
    pub fn builder(cfg: Config) -> ApplicationBuilder {
        ApplicationBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        components: Vec<ComponentRef>,
        outer: Context,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let root = outer.child();
        let state = Arc::new(StateCell::new());
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let handle = StopHandle::new(Arc::clone(&state), root.clone(), bus.clone());
        Self {
            cfg,
            components,
            root,
            state,
            bus,
            subscribers,
            handle,
        }
    }

    /// Runs every component until shutdown, then stops them.
    ///
    /// Returns once all start and stop operations have returned (or were abandoned at
    /// their deadline). Returns `Ok(())` on a clean shutdown, or the first error
    /// recorded by any task.
    ///
    /// # Errors
    /// - [`RunError::AlreadyRunning`] / [`RunError::AlreadyFinished`]: the application
    ///   was not idle; no component is touched.
    /// - [`RunError::Component`]: a `start` or `stop` failed.
    /// - [`RunError::Signal`]: OS signal registration failed.
    /// - [`RunError::Panicked`]: a component panicked.
    /// - [`RunError::GraceExceeded`]: tasks were still running when `Config::grace` elapsed.
    pub async fn run(&self) -> Result<(), RunError> {
        self.state.begin()?;
        let listener = self.event_listener();

        let mut set = JoinSet::new();
        let mut pending = Vec::new();

        let (barrier_tx, mut barrier_rx) = mpsc::channel::<()>(1);
        self.spawn_components(&mut set, &mut pending, &barrier_tx);
        drop(barrier_tx);
        let _ = barrier_rx.recv().await;

        spawn_labeled(
            &mut set,
            &mut pending,
            "signal".to_string(),
            runner::bridge_signals(
                self.cfg.signals.clone(),
                self.root.clone(),
                self.handle.clone(),
                self.bus.clone(),
            ),
        );

        let res = self.drain(&mut set, &mut pending).await;
        self.handle.complete();

        let mut last = Event::new(EventKind::RunFinished);
        if let Err(e) = &res {
            last = last.with_reason(e.to_string());
        }
        self.bus.publish(last);

        if let Some(listener) = listener {
            let _ = listener.await;
        }
        res
    }

    /// Requests a graceful shutdown.
    ///
    /// Idempotent and safe to call from any task. Calling it before [`Application::run`]
    /// leaves the application `Finished`: a later `run` returns
    /// [`RunError::AlreadyFinished`] without touching any component.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Returns a cloneable handle that can stop the application.
    pub fn handle(&self) -> StopHandle {
        self.handle.clone()
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state.load()
    }

    /// Subscribes to the event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The application configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of managed components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no component is managed.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Forwards bus events to the subscriber set until `RunFinished`.
    ///
    /// Returns `None` when there is no subscriber.
    fn event_listener(&self) -> Option<JoinHandle<()>> {
        if self.subscribers.is_empty() {
            return None;
        }
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(&self.subscribers, self.bus.clone());

        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        set.emit(&ev);
                        if ev.kind == EventKind::RunFinished {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }

    /// Spawns the stop task, then the start task, of every component.
    fn spawn_components(
        &self,
        set: &mut JoinSet<TaskOutput>,
        pending: &mut Vec<String>,
        barrier: &mpsc::Sender<()>,
    ) {
        for component in &self.components {
            let name = component.name().to_string();
            let (latch_tx, latch_rx) = oneshot::channel();

            spawn_labeled(
                set,
                pending,
                format!("stop:{name}"),
                runner::stop_component(
                    Arc::clone(component),
                    self.root.clone(),
                    latch_rx,
                    self.cfg.stop_timeout,
                    self.bus.clone(),
                ),
            );
            spawn_labeled(
                set,
                pending,
                format!("start:{name}"),
                runner::start_component(
                    Arc::clone(component),
                    self.root.child(),
                    Dispatch::new(latch_tx, barrier.clone()),
                    self.bus.clone(),
                ),
            );
        }
    }

    /// Joins every task and returns the first recorded error.
    async fn drain(
        &self,
        set: &mut JoinSet<TaskOutput>,
        pending: &mut Vec<String>,
    ) -> Result<(), RunError> {
        let mut first: Option<RunError> = None;

        let joined_all = tokio::select! {
            _ = collect(set, pending, &mut first, &self.handle) => true,
            _ = self.root.done() => false,
        };

        if !joined_all {
            // Outer cancellation or deadline: make it a regular shutdown.
            self.handle.trigger("context done");

            match self.cfg.grace_limit() {
                None => collect(set, pending, &mut first, &self.handle).await,
                Some(grace) => {
                    let bounded =
                        time::timeout(grace, collect(set, pending, &mut first, &self.handle)).await;
                    if bounded.is_err() {
                        set.shutdown().await;

                        let mut stuck = std::mem::take(pending);
                        stuck.sort_unstable();
                        self.bus.publish(
                            Event::new(EventKind::GraceExceeded)
                                .with_reason(stuck.join(","))
                                .with_timeout(grace),
                        );
                        return match first {
                            Some(e) => Err(e),
                            None => Err(RunError::GraceExceeded { grace, stuck }),
                        };
                    }
                }
            }
        }

        self.bus.publish(Event::new(EventKind::AllStopped));
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("Application")
            .field("components", &names)
            .field("state", &self.state())
            .field("cfg", &self.cfg)
            .finish()
    }
}

/// Spawns a labeled task; a panic inside `fut` becomes [`RunError::Panicked`].
fn spawn_labeled<F>(
    set: &mut JoinSet<TaskOutput>,
    pending: &mut Vec<String>,
    label: String,
    fut: F,
) where
    F: Future<Output = Result<(), RunError>> + Send + 'static,
{
    pending.push(label.clone());
    set.spawn(async move {
        let res = match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(_) => Err(RunError::Panicked {
                task: label.clone(),
            }),
        };
        (label, res)
    });
}

/// Joins tasks until the set is empty. The first error triggers shutdown.
async fn collect(
    set: &mut JoinSet<TaskOutput>,
    pending: &mut Vec<String>,
    first: &mut Option<RunError>,
    handle: &StopHandle,
) {
    while let Some(joined) = set.join_next().await {
        let Ok((label, res)) = joined else {
            continue;
        };
        if let Some(pos) = pending.iter().position(|l| *l == label) {
            pending.swap_remove(pos);
        }
        if let Err(e) = res {
            if first.is_none() {
                handle.trigger(&format!("component failed: {e}"));
                *first = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::components::ComponentFn;
    use crate::error::{ComponentError, Phase};

    type Log = Arc<Mutex<Vec<String>>>;

    fn cfg() -> Config {
        Config {
            stop_timeout: Duration::from_millis(100),
            signals: Vec::new(),
            ..Config::default()
        }
    }

    fn push(log: &Log, line: String) {
        log.lock().unwrap().push(line);
    }

    fn lines(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    /// Runs until cancelled; `stop` records what its context looks like.
    fn waiter(name: &'static str, log: &Log) -> ComponentRef {
        let (l1, l2) = (log.clone(), log.clone());
        ComponentFn::arc(
            name,
            move |ctx: Context| {
                let log = l1.clone();
                async move {
                    push(&log, format!("start:{name}"));
                    ctx.done().await;
                    Ok::<_, ComponentError>(())
                }
            },
            move |ctx: Context| {
                let log = l2.clone();
                async move {
                    push(
                        &log,
                        format!(
                            "stop:{name} cancelled={} deadline={}",
                            ctx.is_cancelled(),
                            ctx.deadline().is_some()
                        ),
                    );
                    Ok::<_, ComponentError>(())
                }
            },
        )
    }

    fn spawn_run(app: &Arc<Application>) -> JoinHandle<Result<(), RunError>> {
        let app = Arc::clone(app);
        tokio::spawn(async move { app.run().await })
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_start_shuts_every_component_down() {
        let log: Log = Arc::default();
        let app = Application::builder(cfg())
            .with_component(waiter("a", &log))
            .with_component(waiter("b", &log))
            .with_component(waiter("c", &log))
            .build()
            .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(app.state(), RunState::Running);
        app.stop();

        assert!(run.await.unwrap().is_ok());
        assert_eq!(app.state(), RunState::Finished);

        let lines = lines(&log);
        for name in ["a", "b", "c"] {
            let start = lines.iter().position(|l| *l == format!("start:{name}"));
            let stop = lines
                .iter()
                .position(|l| *l == format!("stop:{name} cancelled=false deadline=true"));
            assert!(start.is_some(), "{name} not started: {lines:?}");
            assert!(stop.is_some(), "{name} not stopped: {lines:?}");
            assert!(start < stop);
        }
        assert_eq!(lines.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn start_failure_stops_everyone_once() {
        let stops = Arc::new(AtomicUsize::new(0));
        let log: Log = Arc::default();
        let s = stops.clone();
        let boom: ComponentRef = ComponentFn::arc(
            "boom",
            |_ctx: Context| async { Err::<(), _>(ComponentError::fail("boom")) },
            move |_ctx: Context| {
                let stops = s.clone();
                async move {
                    stops.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ComponentError>(())
                }
            },
        );

        let app = Application::builder(cfg())
            .with_component(boom)
            .with_component(waiter("peer", &log))
            .build()
            .unwrap();

        let err = app.run().await.unwrap_err();
        match &err {
            RunError::Component {
                component, phase, ..
            } => {
                assert_eq!(component, "boom");
                assert_eq!(*phase, Phase::Start);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.component_error().map(|e| e.to_string()).as_deref(), Some("boom"));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(lines(&log).contains(&"stop:peer cancelled=false deadline=true".to_string()));
        assert_eq!(app.state(), RunState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_is_rejected() {
        let log: Log = Arc::default();
        let app = Application::builder(cfg())
            .with_component(waiter("only", &log))
            .build()
            .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;

        let err = app.run().await.unwrap_err();
        assert!(matches!(err, RunError::AlreadyRunning));
        assert!(err.is_usage());

        app.stop();
        assert!(run.await.unwrap().is_ok());

        let err = app.run().await.unwrap_err();
        assert!(matches!(err, RunError::AlreadyFinished));

        let starts = lines(&log).iter().filter(|l| l.starts_with("start:")).count();
        assert_eq!(starts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_run_touches_nothing() {
        let log: Log = Arc::default();
        let app = Application::builder(cfg())
            .with_component(waiter("idle", &log))
            .build()
            .unwrap();

        app.stop();
        app.stop();
        assert_eq!(app.state(), RunState::Finished);

        let err = app.run().await.unwrap_err();
        assert!(matches!(err, RunError::AlreadyFinished));
        assert!(lines(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_components_runs_until_stopped() {
        let app = Application::builder(cfg()).build().unwrap();
        assert!(app.is_empty());

        let run = spawn_run(&app);
        time::sleep(Duration::from_secs(60)).await;
        assert!(!run.is_finished());

        app.handle().stop();
        assert!(run.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_stop_is_abandoned_at_its_deadline() {
        let stuck: ComponentRef = ComponentFn::arc(
            "stuck",
            |ctx: Context| async move {
                ctx.done().await;
                Ok::<_, ComponentError>(())
            },
            |_ctx: Context| async {
                std::future::pending::<()>().await;
                Ok::<_, ComponentError>(())
            },
        );
        let app = Application::builder(cfg()).with_component(stuck).build().unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(5)).await;
        let stopped_at = time::Instant::now();
        app.stop();

        let err = run.await.unwrap().unwrap_err();
        assert!(stopped_at.elapsed() <= Duration::from_millis(110));
        match err {
            RunError::Component {
                phase: Phase::Stop,
                source: ComponentError::DeadlineExceeded,
                ..
            } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Exits on cancellation; `stop` never returns.
    fn stuck(name: &'static str) -> ComponentRef {
        ComponentFn::arc(
            name,
            |ctx: Context| async move {
                ctx.done().await;
                Ok::<_, ComponentError>(())
            },
            |_ctx: Context| async {
                std::future::pending::<()>().await;
                Ok::<_, ComponentError>(())
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn one_stuck_stop_does_not_delay_the_others() {
        let log: Log = Arc::default();
        let app = Application::builder(cfg())
            .with_component(waiter("a", &log))
            .with_component(stuck("wedged"))
            .with_component(waiter("b", &log))
            .build()
            .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(5)).await;
        let stopped_at = time::Instant::now();
        app.stop();

        let err = run.await.unwrap().unwrap_err();
        assert!(stopped_at.elapsed() <= Duration::from_millis(110));
        match err {
            RunError::Component {
                component,
                phase: Phase::Stop,
                source: ComponentError::DeadlineExceeded,
            } => assert_eq!(component, "wedged"),
            other => panic!("unexpected error: {other:?}"),
        }

        let lines = lines(&log);
        for name in ["a", "b"] {
            let stopped = format!("stop:{name} cancelled=false deadline=true");
            assert!(lines.contains(&stopped), "{name} not stopped: {lines:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_stops_time_out_together() {
        let app = Application::builder(cfg())
            .with_components(["s1", "s2", "s3", "s4", "s5"].map(stuck))
            .build()
            .unwrap();
        let mut rx = app.subscribe();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(5)).await;
        let stopped_at = time::Instant::now();
        app.stop();

        let err = run.await.unwrap().unwrap_err();
        assert!(stopped_at.elapsed() <= Duration::from_millis(110));
        assert!(matches!(
            err.component_error(),
            Some(ComponentError::DeadlineExceeded)
        ));

        let mut timed_out = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::StopTimedOut {
                timed_out += 1;
            }
        }
        assert_eq!(timed_out, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_error_is_reported() {
        let failing: ComponentRef = ComponentFn::arc(
            "db",
            |ctx: Context| async move {
                ctx.done().await;
                Err::<(), _>(ComponentError::Canceled)
            },
            |_ctx: Context| async { Err::<(), _>(ComponentError::fail("flush failed")) },
        );
        let app = Application::builder(cfg()).with_component(failing).build().unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;
        app.stop();

        let err = run.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "db: stop: flush failed");
    }

    #[tokio::test(start_paused = true)]
    async fn start_ignoring_cancellation_exceeds_grace() {
        let stubborn: ComponentRef = ComponentFn::arc(
            "stubborn",
            |_ctx: Context| async {
                std::future::pending::<()>().await;
                Ok::<_, ComponentError>(())
            },
            |_ctx: Context| async { Ok::<_, ComponentError>(()) },
        );
        let app = Application::builder(Config {
            grace: Duration::from_secs(1),
            ..cfg()
        })
        .with_component(stubborn)
        .build()
        .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;
        app.stop();

        match run.await.unwrap().unwrap_err() {
            RunError::GraceExceeded { grace, stuck } => {
                assert_eq!(grace, Duration::from_secs(1));
                assert_eq!(stuck, vec!["start:stubborn".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_start_is_reported() {
        let bad: ComponentRef = ComponentFn::arc(
            "bad",
            |_ctx: Context| async {
                let explode = true;
                if explode {
                    panic!("kaput");
                }
                Ok::<_, ComponentError>(())
            },
            |_ctx: Context| async { Ok::<_, ComponentError>(()) },
        );
        let app = Application::builder(cfg()).with_component(bad).build().unwrap();

        match app.run().await.unwrap_err() {
            RunError::Panicked { task } => assert_eq!(task, "start:bad"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn outer_cancellation_shuts_down() {
        let log: Log = Arc::default();
        let outer = Context::background();
        let app = Application::builder(cfg())
            .with_context(outer.clone())
            .with_component(waiter("svc", &log))
            .build()
            .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;
        outer.token().cancel();

        assert!(run.await.unwrap().is_ok());
        assert_eq!(app.state(), RunState::Finished);
        assert!(lines(&log).contains(&"stop:svc cancelled=false deadline=true".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn values_reach_start_and_stop() {
        struct Region(&'static str);

        let seen: Log = Arc::default();
        let (l1, l2) = (seen.clone(), seen.clone());
        let comp: ComponentRef = ComponentFn::arc(
            "regional",
            move |ctx: Context| {
                let log = l1.clone();
                async move {
                    if let Some(r) = ctx.value::<Region>() {
                        push(&log, format!("start:{}", r.0));
                    }
                    ctx.done().await;
                    Ok::<_, ComponentError>(())
                }
            },
            move |ctx: Context| {
                let log = l2.clone();
                async move {
                    if let Some(r) = ctx.value::<Region>() {
                        push(&log, format!("stop:{}", r.0));
                    }
                    Ok::<_, ComponentError>(())
                }
            },
        );

        let app = Application::builder(cfg())
            .with_value(Region("eu-west"))
            .with_component(comp)
            .build()
            .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;
        app.stop();
        assert!(run.await.unwrap().is_ok());

        assert_eq!(lines(&seen), vec!["start:eu-west", "stop:eu-west"]);
    }

    #[tokio::test(start_paused = true)]
    async fn builder_values_survive_a_later_context() {
        struct Region(&'static str);
        struct Tenant(&'static str);

        let seen: Log = Arc::default();
        let log = seen.clone();
        let comp: ComponentRef = ComponentFn::arc(
            "tenant",
            move |ctx: Context| {
                let log = log.clone();
                async move {
                    let region = ctx.value::<Region>().map(|r| r.0);
                    let tenant = ctx.value::<Tenant>().map(|t| t.0);
                    push(&log, format!("{region:?} {tenant:?}"));
                    ctx.done().await;
                    Ok::<_, ComponentError>(())
                }
            },
            |_ctx: Context| async { Ok::<_, ComponentError>(()) },
        );

        let outer = Context::background()
            .with_value(Tenant("acme"))
            .with_value(Region("outer"));
        let app = Application::builder(cfg())
            .with_value(Region("eu-west"))
            .with_context(outer)
            .with_component(comp)
            .build()
            .unwrap();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;
        app.stop();
        assert!(run.await.unwrap().is_ok());

        assert_eq!(lines(&seen), vec![r#"Some("eu-west") Some("acme")"#]);
    }

    #[tokio::test(start_paused = true)]
    async fn events_end_with_run_finished() {
        let log: Log = Arc::default();
        let app = Application::builder(cfg())
            .with_component(waiter("svc", &log))
            .build()
            .unwrap();
        let mut rx = app.subscribe();

        let run = spawn_run(&app);
        time::sleep(Duration::from_millis(1)).await;
        app.stop();
        assert!(run.await.unwrap().is_ok());

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ShutdownRequested {
                assert_eq!(ev.reason.as_deref(), Some("stop requested"));
            }
            kinds.push(ev.kind);
        }
        let at = |k: EventKind| kinds.iter().position(|x| *x == k).unwrap();

        assert_eq!(kinds.first(), Some(&EventKind::ComponentStarting));
        assert!(at(EventKind::ShutdownRequested) < at(EventKind::ComponentStopping));
        assert!(at(EventKind::ComponentStopping) < at(EventKind::ComponentStopped));
        assert!(kinds.contains(&EventKind::ComponentExited));
        assert!(!kinds.contains(&EventKind::SignalsArmed));
        assert_eq!(
            kinds[kinds.len() - 2..],
            [EventKind::AllStopped, EventKind::RunFinished]
        );
    }

    #[test]
    fn zero_stop_timeout_is_rejected_at_build() {
        let cfg = Config {
            stop_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(Application::builder(cfg).build().is_err());
    }
}
