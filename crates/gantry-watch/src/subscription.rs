//! Event subscriptions

use std::path::Path;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};

use crate::error::WatchError;
use crate::event::{classify, ChangeEvent};
use crate::paths::{collapse_watch_paths, watch_root};
use crate::rule::WatchRule;

type Delivery = Result<ChangeEvent, WatchError>;

/// An ordered stream of change events.
///
/// Dropping the subscription, or calling [`Subscription::cancel`],
/// unsubscribes from the filesystem.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<Delivery>,
    debouncer: Option<Debouncer<RecommendedWatcher, RecommendedCache>>,
}

impl Subscription {
    /// A subscription fed through the returned sender
    pub fn manual() -> (EventSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            EventSender { sender },
            Self {
                receiver,
                debouncer: None,
            },
        )
    }

    /// Subscribe to filesystem changes under `root` relevant to `rules`.
    ///
    /// The static prefix directory of every rule glob is watched
    /// recursively; nested prefixes share one watch. Bursts of events are
    /// coalesced over `debounce`.
    #[instrument(skip(rules), fields(rule_count = rules.len()))]
    pub fn filesystem(
        root: &Path,
        rules: &[WatchRule],
        debounce: Duration,
    ) -> Result<Self, WatchError> {
        let root = root.canonicalize().map_err(|e| WatchError::Root {
            path: root.to_path_buf(),
            source: e,
        })?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let handler_root = root.clone();

        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for de in events {
                        for (path, kind) in classify(&de.event.kind, &de.event.paths) {
                            let Ok(relative) = path.strip_prefix(&handler_root) else {
                                trace!(path = %path.display(), "outside project root");
                                continue;
                            };
                            if sender
                                .send(Ok(ChangeEvent::new(relative, kind)))
                                .is_err()
                            {
                                return;
                            }
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let _ = sender.send(Err(WatchError::Notify(error)));
                    }
                }
            }
        })?;

        let roots = collapse_watch_paths(rules.iter().map(|rule| watch_root(&root, rule.glob())));
        for dir in roots {
            info!("watching {}", dir.display());
            debouncer.watch(&dir, RecursiveMode::Recursive)?;
        }

        Ok(Self {
            receiver,
            debouncer: Some(debouncer),
        })
    }

    /// Wait for the next event. `None` once cancelled and drained, or when
    /// every sender is gone.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    /// Stop receiving new events. Events already queued are still returned.
    pub fn cancel(&mut self) {
        if self.debouncer.take().is_some() {
            debug!("unsubscribed from filesystem events");
        }
        self.receiver.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("filesystem", &self.debouncer.is_some())
            .finish()
    }
}

/// Pushes events into a [`Subscription::manual`] subscription
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl EventSender {
    /// Deliver an event. Returns false if the subscription is gone.
    pub fn send(&self, event: ChangeEvent) -> bool {
        self.sender.send(Ok(event)).is_ok()
    }

    /// Deliver a watcher error
    pub fn fail(&self, error: WatchError) -> bool {
        self.sender.send(Err(error)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeKind;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_manual_delivery_in_order() {
        let (sender, mut subscription) = Subscription::manual();
        assert!(sender.send(ChangeEvent::new("a.js", ChangeKind::Created)));
        assert!(sender.send(ChangeEvent::new("a.js", ChangeKind::Modified)));
        drop(sender);

        let first = subscription.next().await.unwrap().unwrap();
        let second = subscription.next().await.unwrap().unwrap();
        assert_eq!(first.kind, ChangeKind::Created);
        assert_eq!(second.kind, ChangeKind::Modified);
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_closes_channel() {
        let (sender, mut subscription) = Subscription::manual();
        subscription.cancel();
        assert!(!sender.send(ChangeEvent::new("a.js", ChangeKind::Created)));
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_filesystem_events_are_root_relative() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("app/assets")).unwrap();
        let rules = vec![WatchRule::new("app/assets/**/*.js", "js").unwrap()];

        let mut subscription =
            Subscription::filesystem(temp.path(), &rules, Duration::from_millis(50)).unwrap();
        fs::write(temp.path().join("app/assets/application.js"), "run();").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), subscription.next())
            .await
            .expect("no filesystem event delivered")
            .unwrap()
            .unwrap();
        assert_eq!(event.path, Path::new("app/assets/application.js"));

        subscription.cancel();
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = Subscription::filesystem(&temp.path().join("nope"), &[], Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, WatchError::Root { .. }));
    }
}
