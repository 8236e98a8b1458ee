use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::trace;

use crate::client::RequestConfig;

/// Serializes concurrent requests to the same URL.
///
/// While a request is outstanding, later requests for a URL known to the
/// serializer are parked in that URL's FIFO queue; each [`next`](Self::next)
/// call releases at most one of them, in arrival order.
///
/// The "waiting" gate is a single flag shared across all URLs, not a per-URL
/// lock: one outstanding request anywhere parks newcomers for every
/// registered URL, and a `next` call for URL A can release a request for A
/// even if URL B's requests arrived earlier. Kept for compatibility with
/// the behavior this layer replaces.
///
/// If the outstanding request never completes, `next` is never called and
/// parked requests wait indefinitely. Callers that need an upper bound
/// should wrap the returned future in a timeout; the client wrapper exposes
/// this as its queue timeout.
#[derive(Debug, Default)]
pub struct RequestSerializer {
    inner: Mutex<SerializerState>,
}

#[derive(Debug, Default)]
struct SerializerState {
    waiting: bool,
    queues: HashMap<String, VecDeque<oneshot::Sender<()>>>,
}

impl RequestSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submits a request for `url`, returning a future that yields the
    /// config once the request may proceed.
    ///
    /// When no request is outstanding the future is immediately ready and
    /// this request becomes the outstanding one. Otherwise the request is
    /// parked until a [`next`](Self::next) call for the same URL releases
    /// it. Parking happens synchronously in this call, so arrival order is
    /// the order of `add_request` calls; only the wait itself is deferred.
    ///
    /// Either way the URL is registered in the queue map, which is what
    /// [`is_registered`](Self::is_registered) reports.
    pub fn add_request(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> impl Future<Output = RequestConfig> + use<> {
        let parked = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let queue = state.queues.entry(url.to_owned()).or_default();
            if state.waiting {
                trace!(url, position = queue.len(), "parking request");
                let (release_tx, release_rx) = oneshot::channel();
                queue.push_back(release_tx);
                Some(release_rx)
            } else {
                state.waiting = true;
                None
            }
        };
        async move {
            if let Some(release) = parked {
                // A dropped serializer releases everything rather than
                // leaving parked requests pending forever.
                drop(release.await);
            }
            config
        }
    }

    /// Marks the outstanding request complete and releases the next parked
    /// request for `url`, if any.
    ///
    /// Exactly one release per call. A URL with an empty queue, or one the
    /// serializer has never seen, only clears the gate.
    pub fn next(&self, url: &str) {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.waiting = false;
        if let Some(queue) = state.queues.get_mut(url) {
            if let Some(release) = queue.pop_front() {
                trace!(url, remaining = queue.len(), "releasing parked request");
                // The receiver may be gone (canceled or timed out); the
                // release turn is spent either way.
                drop(release.send(()));
            }
        }
    }

    /// Registers `url` without submitting a request, so that the next
    /// request for it takes the queued path.
    pub fn register(&self, url: &str) {
        self.lock().queues.entry(url.to_owned()).or_default();
    }

    /// Whether `url` has ever been routed through this serializer.
    ///
    /// Registration happens on every `add_request` call, including ones
    /// that proceed immediately, so this drives the caller's decision to
    /// route follow-up requests for the same URL through the queue.
    #[must_use]
    pub fn is_registered(&self, url: &str) -> bool {
        self.lock().queues.contains_key(url)
    }

    /// Number of requests currently parked for `url`.
    #[must_use]
    pub fn pending(&self, url: &str) -> usize {
        self.lock().queues.get(url).map_or(0, VecDeque::len)
    }

    /// Whether a request is currently outstanding.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.lock().waiting
    }

    fn lock(&self) -> MutexGuard<'_, SerializerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
