//! Scripted mock binlog client.
//!
//! Each `start_sync` call pops the next scripted session: either a connect
//! error or a list of steps the session will replay from `get_event`. Once a
//! session's steps run out, `get_event` returns `ClientError::Closed`.
//!
//! The syncer is cheaply cloneable; keep a clone to inspect recorded calls
//! after the reader has taken ownership of the other.
//!
//! # Example
//! ```rust,ignore
//! let syncer = MockSyncer::new()
//!     .with_session(vec![Step::Event(rotate("log.000002")), Step::Event(insert(500, &[1]))]);
//! let probe = syncer.clone();
//! let mut reader = BinlogReader::new(ReaderConfig::for_testing(0), syncer);
//! // ...
//! assert_eq!(probe.start_positions().len(), 1);
//! ```

use binlog_streamer::client::{BinlogPosition, BinlogStreamer, BinlogSyncer, BoxFuture, ClientError, ClientResult};
use binlog_streamer::RawEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One scripted `get_event` outcome.
#[derive(Debug)]
pub enum Step {
    Event(RawEvent),
    Fail(ClientError),
    /// Never resolves, like a quiet primary with no read timeout.
    Hang,
}

#[derive(Default)]
struct Shared {
    sessions: Mutex<VecDeque<ClientResult<Vec<Step>>>>,
    positions: Mutex<Vec<BinlogPosition>>,
    closes: AtomicUsize,
    fetched: AtomicUsize,
}

/// Mock [`BinlogSyncer`] replaying scripted sessions.
#[derive(Clone, Default)]
pub struct MockSyncer {
    shared: Arc<Shared>,
}

impl MockSyncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a session that connects and then replays `steps`.
    pub fn with_session(self, steps: Vec<Step>) -> Self {
        self.shared.sessions.lock().push_back(Ok(steps));
        self
    }

    /// Queue a session whose `start_sync` fails with `err`.
    pub fn with_connect_error(self, err: ClientError) -> Self {
        self.shared.sessions.lock().push_back(Err(err));
        self
    }

    /// Positions passed to every `start_sync` call, in order.
    pub fn start_positions(&self) -> Vec<BinlogPosition> {
        self.shared.positions.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// Total `get_event` calls across all sessions.
    pub fn events_fetched(&self) -> usize {
        self.shared.fetched.load(Ordering::SeqCst)
    }
}

impl BinlogSyncer for MockSyncer {
    type Streamer = MockStreamer;

    fn start_sync(&self, position: BinlogPosition) -> BoxFuture<'_, MockStreamer> {
        self.shared.positions.lock().push(position);
        let session = self.shared.sessions.lock().pop_front().unwrap_or(Ok(Vec::new()));
        let shared = Arc::clone(&self.shared);
        Box::pin(async move {
            session.map(|steps| MockStreamer {
                steps: steps.into(),
                shared,
            })
        })
    }

    fn close(&self) {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Session produced by [`MockSyncer`].
pub struct MockStreamer {
    steps: VecDeque<Step>,
    shared: Arc<Shared>,
}

impl BinlogStreamer for MockStreamer {
    fn get_event(&mut self) -> BoxFuture<'_, RawEvent> {
        self.shared.fetched.fetch_add(1, Ordering::SeqCst);
        match self.steps.pop_front() {
            Some(Step::Event(event)) => Box::pin(async move { Ok(event) }),
            Some(Step::Fail(err)) => Box::pin(async move { Err(err) }),
            Some(Step::Hang) => Box::pin(std::future::pending::<ClientResult<RawEvent>>()),
            None => Box::pin(async { Err(ClientError::Closed) }),
        }
    }
}
