//! Watch controller

use std::fmt;
use std::future::Future;

use tracing::{error, info, instrument, warn};

use gantry_tasks::{Orchestrator, Outcome};

use crate::error::WatchError;
use crate::event::ChangeEvent;
use crate::rule::WatchRule;
use crate::subscription::Subscription;

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Created, not yet consuming events
    Idle,
    /// Waiting for the next event
    Watching,
    /// Running the tasks for an event
    Triggering,
    /// Finished; terminal
    Stopped,
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Watching => "watching",
            Self::Triggering => "triggering",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Maps change events onto tasks and runs them
#[derive(Debug)]
pub struct WatchController {
    orchestrator: Orchestrator,
    rules: Vec<WatchRule>,
    state: WatchState,
}

impl WatchController {
    /// Create a controller. Every rule must name a registered task.
    pub fn new(orchestrator: Orchestrator, rules: Vec<WatchRule>) -> Result<Self, WatchError> {
        for rule in &rules {
            if !orchestrator.graph().contains(rule.task()) {
                return Err(WatchError::UnknownTask {
                    glob: rule.glob().to_string(),
                    task: rule.task().to_string(),
                });
            }
        }

        Ok(Self {
            orchestrator,
            rules,
            state: WatchState::Idle,
        })
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn rules(&self) -> &[WatchRule] {
        &self.rules
    }

    /// Distinct tasks whose rule matches `event`, in rule order
    pub fn tasks_for(&self, event: &ChangeEvent) -> Vec<&str> {
        let mut tasks: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if rule.matches(&event.path) && !tasks.contains(&rule.task()) {
                tasks.push(rule.task());
            }
        }
        tasks
    }

    /// Run every task matching `event` once.
    ///
    /// Failures are logged and returned; the controller goes back to
    /// watching either way.
    #[instrument(skip_all, fields(path = %event.path.display(), kind = %event.kind))]
    pub async fn trigger(&mut self, event: &ChangeEvent) -> Vec<Outcome> {
        let tasks: Vec<String> = self
            .tasks_for(event)
            .into_iter()
            .map(str::to_string)
            .collect();
        if tasks.is_empty() {
            return Vec::new();
        }

        let previous = self.state;
        self.state = WatchState::Triggering;

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            info!(
                "File {} was {}, running {}",
                event.path.display(),
                event.kind,
                task
            );

            match self.orchestrator.run(&task).await {
                Ok(outcome) => {
                    if !outcome.is_success() {
                        for failure in outcome.failures() {
                            error!("{}", failure);
                        }
                    }
                    outcomes.push(outcome);
                }
                Err(e) => error!("{}", e),
            }
        }

        self.state = match previous {
            WatchState::Stopped => WatchState::Stopped,
            _ => WatchState::Watching,
        };
        outcomes
    }

    /// Consume events until `shutdown` resolves or the subscription ends.
    ///
    /// A watcher error stops the controller and is returned.
    pub async fn run<F>(&mut self, mut subscription: Subscription, shutdown: F) -> Result<(), WatchError>
    where
        F: Future<Output = ()>,
    {
        self.state = WatchState::Watching;
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("stopping watch");
                    break Ok(());
                }
                delivery = subscription.next() => match delivery {
                    Some(Ok(event)) => {
                        self.trigger(&event).await;
                    }
                    Some(Err(e)) => {
                        error!("watch error: {}", e);
                        break Err(e);
                    }
                    None => {
                        warn!("event stream closed");
                        break Ok(());
                    }
                },
            }
        };

        subscription.cancel();
        self.state = WatchState::Stopped;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeKind;
    use async_trait::async_trait;
    use gantry_core::{ProfileStore, TransformError};
    use gantry_tasks::{Action, CollectingReporter, RunContext, TaskGraph};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counter {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Action for Counter {
        fn describe(&self) -> String {
            "count".to_string()
        }

        async fn run(&self, _ctx: &RunContext) -> Result<(), TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TransformError::compile("app.scss", Some(1), "broken"))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        controller: WatchController,
        js: Arc<AtomicUsize>,
        sass: Arc<AtomicUsize>,
    }

    fn fixture(sass_fails: bool) -> Fixture {
        let js = Arc::new(AtomicUsize::new(0));
        let sass = Arc::new(AtomicUsize::new(0));

        let mut graph = TaskGraph::new();
        graph
            .atomic(
                "js",
                Counter {
                    calls: js.clone(),
                    fail: false,
                },
            )
            .unwrap();
        graph
            .atomic(
                "sass",
                Counter {
                    calls: sass.clone(),
                    fail: sass_fails,
                },
            )
            .unwrap();

        let orchestrator = Orchestrator::new(
            graph,
            RunContext::new(Arc::new(ProfileStore::builtin())),
            Arc::new(CollectingReporter::default()),
        );
        let rules = vec![
            WatchRule::new("app/assets/**/*.js", "js").unwrap(),
            WatchRule::new("app/assets/**/*.scss", "sass").unwrap(),
            WatchRule::new("app/assets/scss/*.scss", "sass").unwrap(),
        ];

        Fixture {
            controller: WatchController::new(orchestrator, rules).unwrap(),
            js,
            sass,
        }
    }

    #[tokio::test]
    async fn test_only_matching_task_runs() {
        let mut f = fixture(false);
        assert_eq!(f.controller.state(), WatchState::Idle);

        let outcomes = f
            .controller
            .trigger(&ChangeEvent::new("app/assets/javascripts/x.js", ChangeKind::Modified))
            .await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].task, "js");
        assert_eq!(f.js.load(Ordering::SeqCst), 1);
        assert_eq!(f.sass.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_matches_run_once() {
        let mut f = fixture(false);
        let event = ChangeEvent::new("app/assets/scss/application.scss", ChangeKind::Created);

        assert_eq!(f.controller.tasks_for(&event), vec!["sass"]);
        f.controller.trigger(&event).await;
        assert_eq!(f.sass.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unmatched_path_runs_nothing() {
        let mut f = fixture(false);
        let outcomes = f
            .controller
            .trigger(&ChangeEvent::new("README.md", ChangeKind::Modified))
            .await;
        assert!(outcomes.is_empty());
        assert_eq!(f.js.load(Ordering::SeqCst) + f.sass.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_keeps_watching_after_failure() {
        let mut f = fixture(true);
        let (sender, subscription) = Subscription::manual();

        sender.send(ChangeEvent::new("app/assets/a.scss", ChangeKind::Modified));
        sender.send(ChangeEvent::new("app/assets/a.js", ChangeKind::Modified));
        sender.send(ChangeEvent::new("app/assets/b.scss", ChangeKind::Removed));
        drop(sender);

        f.controller
            .run(subscription, std::future::pending())
            .await
            .unwrap();

        assert_eq!(f.sass.load(Ordering::SeqCst), 2);
        assert_eq!(f.js.load(Ordering::SeqCst), 1);
        assert_eq!(f.controller.state(), WatchState::Stopped);
    }

    #[tokio::test]
    async fn test_failed_trigger_returns_to_watching() {
        let mut f = fixture(true);
        f.controller.state = WatchState::Watching;

        let outcomes = f
            .controller
            .trigger(&ChangeEvent::new("app/assets/a.scss", ChangeKind::Modified))
            .await;

        assert!(!outcomes[0].is_success());
        assert_eq!(f.controller.state(), WatchState::Watching);
    }

    #[tokio::test]
    async fn test_shutdown_stops() {
        let mut f = fixture(false);
        let (_sender, subscription) = Subscription::manual();

        f.controller.run(subscription, async {}).await.unwrap();
        assert_eq!(f.controller.state(), WatchState::Stopped);
    }

    #[tokio::test]
    async fn test_watcher_error_is_fatal() {
        let mut f = fixture(false);
        let (sender, subscription) = Subscription::manual();
        sender.fail(WatchError::Notify(notify::Error::generic("inotify limit reached")));

        let err = f
            .controller
            .run(subscription, std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::Notify(_)));
        assert_eq!(f.controller.state(), WatchState::Stopped);
    }

    #[test]
    fn test_unknown_task_rejected() {
        let orchestrator = Orchestrator::new(
            TaskGraph::new(),
            RunContext::new(Arc::new(ProfileStore::builtin())),
            Arc::new(CollectingReporter::default()),
        );
        let err = WatchController::new(
            orchestrator,
            vec![WatchRule::new("app/**/*.js", "js").unwrap()],
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }
}
