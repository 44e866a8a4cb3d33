//! # Command Scheduler
//!
//! Runs fire-and-forget [`Command`]s on tokio and posts exactly one
//! [`CommandResult`] per command back into the event loop's channel.
//!
//! ```text
//!   event loop ──schedule()──▶ tokio::spawn(timeout(budget, task))
//!        ▲                               │
//!        └──────── mpsc ◀── CommandResult{id, origin, kind, key, outcome}
//! ```
//!
//! The loop never awaits a command. Results arrive in completion order, not
//! schedule order; consumers match them by `origin` and `key`.
//!
//! Timers share the same path: [`Scheduler::after`] sleeps on the tokio clock
//! and posts an event, so a paused test clock drives both debounce delays and
//! command timeouts.

use std::fmt;
use std::future::Future;
use std::sync::mpsc;
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, info, warn};
use serde_json::Value;

use crate::api::DataError;

/// Identity of a pushed screen. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub u64);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// Who a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The root controller (profile load, token validation).
    Root,
    Screen(ScreenId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub u64);

/// Semantic tag for a command's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Profile,
    ValidateToken,
    Library,
    Search,
    Lists,
    ListBooks,
    DeleteList,
    Stats,
    Book,
    LibraryEntry,
    Tags,
    Reviews,
    Cover,
    UpdateStatus,
    UpdateRating,
    AddToLibrary,
    RemoveFromList,
    Journal,
    DeleteJournal,
    /// The user's lists, fetched when adding a book to one.
    UserLists,
    AddToList,
    SaveReview,
    UpdateProgress,
}

/// A deferred unit of work bound to a timeout.
///
/// The task owns everything it needs (a cloned `Arc` to the data source, a
/// snapshot of the credential); it never touches loop state.
pub struct Command {
    pub kind: CommandKind,
    /// Narrow staleness key, e.g. a book id or a search generation.
    pub key: Option<i64>,
    pub timeout: Duration,
    task: BoxFuture<'static, Result<Value, DataError>>,
}

impl Command {
    pub fn new<F>(kind: CommandKind, timeout: Duration, task: F) -> Self
    where
        F: Future<Output = Result<Value, DataError>> + Send + 'static,
    {
        Self {
            kind,
            key: None,
            timeout,
            task: Box::pin(task),
        }
    }

    pub fn keyed(mut self, key: i64) -> Self {
        self.key = Some(key);
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// The single event a command resolves to.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub id: CommandId,
    pub origin: Origin,
    pub kind: CommandKind,
    pub key: Option<i64>,
    pub outcome: Result<Value, DataError>,
}

impl CommandResult {
    /// True when this result carries `kind` for the given key.
    pub fn is(&self, kind: CommandKind, key: Option<i64>) -> bool {
        self.kind == kind && self.key == key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHandle {
    pub id: CommandId,
    pub kind: CommandKind,
}

/// Spawns commands and timers, posting their events to the loop.
///
/// Generic over the loop's event type so the scheduler stays free of any
/// terminal types.
pub struct Scheduler<E> {
    tx: mpsc::Sender<E>,
    next_id: u64,
}

impl<E> Scheduler<E>
where
    E: From<CommandResult> + Send + 'static,
{
    pub fn new(tx: mpsc::Sender<E>) -> Self {
        Self { tx, next_id: 1 }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, origin: Origin, command: Command) -> CommandHandle {
        let id = CommandId(self.next_id);
        self.next_id += 1;

        let Command {
            kind,
            key,
            timeout,
            task,
        } = command;
        info!(
            "Scheduling {:?} #{} for {:?} (key={:?}, timeout={:?})",
            kind, id.0, origin, key, timeout
        );

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, task).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("{:?} #{} timed out after {:?}", kind, id.0, timeout);
                    Err(DataError::Timeout)
                }
            };
            debug!("{:?} #{} finished (ok={})", kind, id.0, outcome.is_ok());
            let result = CommandResult {
                id,
                origin,
                kind,
                key,
                outcome,
            };
            if tx.send(E::from(result)).is_err() {
                debug!("Event loop gone, dropping result of #{}", id.0);
            }
        });

        CommandHandle { id, kind }
    }

    /// Posts `event` after `delay` on the tokio clock.
    pub fn after(&self, delay: Duration, event: E) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).is_err() {
                debug!("Event loop gone, dropping timer event after {:?}", delay);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    enum TestEvent {
        Result(CommandResult),
        Timer(u32),
    }

    impl From<CommandResult> for TestEvent {
        fn from(r: CommandResult) -> Self {
            TestEvent::Result(r)
        }
    }

    fn result(event: TestEvent) -> CommandResult {
        match event {
            TestEvent::Result(r) => r,
            other => panic!("expected a result, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_at_boundary_not_before() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::<TestEvent>::new(tx);
        scheduler.schedule(
            Origin::Root,
            Command::new(
                CommandKind::Library,
                Duration::from_secs(30),
                std::future::pending(),
            ),
        );

        tokio::time::sleep(Duration::from_millis(29_999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let r = result(rx.try_recv().unwrap());
        assert_eq!(r.kind, CommandKind::Library);
        assert_eq!(r.outcome, Err(DataError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_one_result_per_command_in_completion_order() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::<TestEvent>::new(tx);
        let slow = scheduler.schedule(
            Origin::Screen(ScreenId(1)),
            Command::new(CommandKind::Book, Duration::from_secs(30), async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(json!({"slow": true}))
            })
            .keyed(42),
        );
        let fast = scheduler.schedule(
            Origin::Screen(ScreenId(1)),
            Command::new(CommandKind::Tags, Duration::from_secs(15), async {
                Err(DataError::RateLimited)
            }),
        );
        assert_ne!(slow.id, fast.id);

        tokio::time::sleep(Duration::from_secs(60)).await;
        let first = result(rx.try_recv().unwrap());
        let second = result(rx.try_recv().unwrap());
        assert!(rx.try_recv().is_err());

        assert_eq!(first.id, fast.id);
        assert_eq!(first.outcome, Err(DataError::RateLimited));
        assert_eq!(second.id, slow.id);
        assert!(second.is(CommandKind::Book, Some(42)));
        assert_eq!(second.origin, Origin::Screen(ScreenId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_posts_once_delay_elapses() {
        let (tx, rx) = mpsc::channel();
        let scheduler = Scheduler::<TestEvent>::new(tx);
        scheduler.after(Duration::from_millis(300), TestEvent::Timer(7));

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(matches!(rx.try_recv(), Ok(TestEvent::Timer(7))));
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_panic() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::<TestEvent>::new(tx);
        drop(rx);
        scheduler.schedule(
            Origin::Root,
            Command::new(CommandKind::Profile, Duration::from_secs(1), async {
                Ok(Value::Null)
            }),
        );
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_after_receiver_dropped_completes_quietly() {
        let (tx, rx) = mpsc::channel();
        let scheduler = Scheduler::<TestEvent>::new(tx);
        drop(rx);
        let timer = scheduler.after(Duration::from_millis(10), TestEvent::Timer(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(timer.await.is_ok());
    }
}
