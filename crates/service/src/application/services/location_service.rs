//! Location Service - the positioning facade
//!
//! This service handles:
//! - Requesting location permission (with re-prompt gating)
//! - Subscribing to continuous position updates and authorization changes
//! - Bounded last-position retrieval: resolve once, within a time budget,
//!   with either a fresh reading or the best previously-known one
//!
//! # Bounded retrieval
//!
//! `get_last_position` races the sensor's one-shot locate request against a
//! timer. Both race arms funnel through a single lock and resolve by taking
//! the pending record, so a simultaneous timer expiry and sensor delivery
//! cannot both invoke the completion. A new call supersedes a pending one:
//! the old timer is aborted and the old completion is dropped uninvoked.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use wayfinder_domain::{Accuracy, AuthorizationStatus, Position, RequestType};

use crate::infrastructure::converters::{
    authorization_status_from_native, desired_accuracy_value,
};
use crate::ports::outbound::{LocationSensorPort, NativeAuthorizationStatus, SensorEvent};

/// Completion callback for a bounded retrieval. Invoked at most once, with
/// `None` when no position was ever observed before the timeout.
pub type PositionCompletion = Box<dyn FnOnce(Option<Position>) + Send + 'static>;

/// Subscriber for continuous position updates.
pub type UpdateSubscriber = Box<dyn FnMut(Position) + Send + 'static>;

/// Subscriber for authorization changes.
pub type AuthorizationSubscriber = Box<dyn FnMut(AuthorizationStatus) + Send + 'static>;

/// In-flight state of one `get_last_position` call.
struct PendingRetrieval {
    generation: u64,
    completion: Option<PositionCompletion>,
    timer: AbortHandle,
}

impl Drop for PendingRetrieval {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// State mutated by the retrieval race. One lock serializes the timer arm,
/// the delivery arm, and supersession; `last_position` needs no lock of its
/// own because every writer goes through this one.
#[derive(Default)]
struct RaceState {
    last_position: Option<Position>,
    pending: Option<PendingRetrieval>,
    generation: u64,
}

struct Inner {
    port: Arc<dyn LocationSensorPort>,
    rt: Handle,
    race: Mutex<RaceState>,
    on_update: Mutex<Option<UpdateSubscriber>>,
    on_authorization_change: Mutex<Option<AuthorizationSubscriber>>,
}

/// Facade over the platform positioning sensor.
///
/// Cheap to clone; clones share state. Dropping the last clone aborts any
/// outstanding retrieval timer and guarantees its completion never fires.
#[derive(Clone)]
pub struct LocationService {
    inner: Arc<Inner>,
}

impl LocationService {
    /// Create the facade and register it as the port's event listener.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime; the captured handle is what
    /// retrieval timers and completions are spawned onto.
    pub fn new(port: Arc<dyn LocationSensorPort>) -> Self {
        let inner = Arc::new(Inner {
            port: Arc::clone(&port),
            rt: Handle::current(),
            race: Mutex::new(RaceState::default()),
            on_update: Mutex::new(None),
            on_authorization_change: Mutex::new(None),
        });

        // The listener holds a weak back-reference so the port does not keep
        // a dropped service alive, and events after drop are ignored.
        let weak = Arc::downgrade(&inner);
        port.subscribe(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                Inner::ingest(&inner, event);
            }
        }));

        Self { inner }
    }

    /// Replace the continuous-update subscriber. `None` clears it.
    pub fn set_update_subscriber(&self, subscriber: Option<UpdateSubscriber>) {
        *lock(&self.inner.on_update) = subscriber;
    }

    /// Replace the authorization-change subscriber. `None` clears it.
    pub fn set_authorization_subscriber(&self, subscriber: Option<AuthorizationSubscriber>) {
        *lock(&self.inner.on_authorization_change) = subscriber;
    }

    /// Current authorization state, translated from the platform's.
    pub fn authorization_status(&self) -> AuthorizationStatus {
        authorization_status_from_native(self.inner.port.authorization_status())
    }

    /// Request location permission with the default kilometer accuracy.
    pub fn request_authorization(&self, request_type: RequestType) {
        self.request_authorization_with_accuracy(request_type, Accuracy::Kilometer);
    }

    /// Request location permission and set the desired accuracy.
    ///
    /// A no-op when the platform status is already determined: the platform
    /// will not re-prompt the user. The outcome arrives later through the
    /// authorization subscriber.
    pub fn request_authorization_with_accuracy(
        &self,
        request_type: RequestType,
        accuracy: Accuracy,
    ) {
        if self.inner.port.authorization_status() != NativeAuthorizationStatus::NotDetermined {
            tracing::debug!("authorization already determined; not re-prompting");
            return;
        }

        if let Err(e) = self.inner.port.request_permission(request_type) {
            tracing::warn!(error = %e, "permission request did not reach the sensor");
        }
        self.inner
            .port
            .set_desired_accuracy(desired_accuracy_value(accuracy));
    }

    /// Set the desired accuracy on the sensor immediately.
    pub fn set_accuracy(&self, accuracy: Accuracy) {
        self.inner
            .port
            .set_desired_accuracy(desired_accuracy_value(accuracy));
    }

    /// Begin continuous updates. Idempotent.
    pub fn start_updating(&self) {
        self.inner.port.start_continuous_updates();
    }

    /// Stop continuous updates. Idempotent, including without a prior start.
    pub fn stop_updating(&self) {
        self.inner.port.stop_continuous_updates();
    }

    /// Fetch the most recent known position within `timeout`.
    ///
    /// Returns immediately. The completion fires exactly once - with a fresh
    /// reading if the sensor delivers one in time, otherwise with the cached
    /// position (possibly `None`) when the timer expires. A second call
    /// supersedes a pending one: the superseded completion never fires.
    /// `Duration::ZERO` resolves immediately with whatever is cached.
    ///
    /// The completion runs on the service's runtime, never inline on the
    /// sensor's delivery context.
    pub fn get_last_position<F>(&self, timeout: Duration, completion: F)
    where
        F: FnOnce(Option<Position>) + Send + 'static,
    {
        let inner = &self.inner;
        {
            let mut race = lock(&inner.race);
            race.generation = race.generation.wrapping_add(1);
            let generation = race.generation;

            if let Some(superseded) = race.pending.take() {
                // Last request wins: abort the old timer (via Drop) and drop
                // the old completion uninvoked.
                tracing::debug!(
                    generation = superseded.generation,
                    "superseding pending last-position retrieval"
                );
            }

            // The timer holds a weak back-reference: dropping the service
            // cancels pending work instead of the timer keeping it alive.
            let weak = Arc::downgrade(inner);
            let timer = inner.rt.spawn(async move {
                tokio::time::sleep(timeout).await;
                if let Some(inner) = weak.upgrade() {
                    Inner::resolve_on_timeout(&inner, generation);
                }
            });

            race.pending = Some(PendingRetrieval {
                generation,
                completion: Some(Box::new(completion)),
                timer: timer.abort_handle(),
            });
        }

        // Outside the lock: the port may deliver synchronously.
        if let Err(e) = inner.port.request_one_shot_location() {
            tracing::warn!(error = %e, "one-shot locate request failed; retrieval will resolve at timeout");
        }
    }
}

impl Inner {
    /// Shared ingestion path for sensor events, called on the sensor's
    /// delivery context.
    fn ingest(inner: &Arc<Inner>, event: SensorEvent) {
        match event {
            SensorEvent::PositionsUpdated(positions) => {
                let Some(position) = positions.last().copied() else {
                    return;
                };

                // Cache the reading and claim any pending retrieval under
                // the race lock.
                let pending = {
                    let mut race = lock(&inner.race);
                    race.last_position = Some(position);
                    race.pending.take()
                };

                // Continuous delivery and bounded retrieval share this path:
                // the subscriber hears every update, pending or not.
                if let Some(subscriber) = lock(&inner.on_update).as_mut() {
                    subscriber(position);
                }

                if let Some(pending) = pending {
                    inner.resolve(pending, Some(position));
                }
            }
            SensorEvent::AuthorizationChanged(native) => {
                let status = authorization_status_from_native(native);
                if let Some(subscriber) = lock(&inner.on_authorization_change).as_mut() {
                    subscriber(status);
                }
            }
            SensorEvent::Error(error) => {
                // Non-fatal by policy: a pending retrieval keeps waiting for
                // a reading or its timeout.
                tracing::warn!(error = %error, "sensor delivery failed");
            }
        }
    }

    /// Timer arm of the race. A stale generation means the retrieval was
    /// superseded or already resolved.
    fn resolve_on_timeout(inner: &Arc<Inner>, generation: u64) {
        let (pending, position) = {
            let mut race = lock(&inner.race);
            let claimed = match race.pending.as_ref() {
                Some(p) if p.generation == generation => race.pending.take(),
                _ => None,
            };
            (claimed, race.last_position)
        };

        if let Some(pending) = pending {
            inner.resolve(pending, position);
        } else {
            tracing::debug!(
                generation,
                "retrieval timer fired with nothing pending - already resolved or superseded"
            );
        }
    }

    /// Invoke a claimed retrieval's completion, marshalled onto the runtime
    /// rather than whichever context won the race.
    fn resolve(&self, mut pending: PendingRetrieval, position: Option<Position>) {
        if let Some(completion) = pending.completion.take() {
            self.rt.spawn(async move {
                completion(position);
            });
        }
    }
}

/// Poisoning only happens if a subscriber panicked; keep serving.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;
    use tokio::time::Instant;

    use crate::infrastructure::testing::MockLocationSensorPort;
    use crate::ports::outbound::SensorError;

    fn position(latitude: f64) -> Position {
        Position::new(latitude, 2.2945, 10.0)
    }

    fn service_with_mock() -> (LocationService, MockLocationSensorPort) {
        let mock = MockLocationSensorPort::new();
        let service = LocationService::new(Arc::new(mock.clone()));
        (service, mock)
    }

    #[tokio::test]
    async fn test_times_out_with_none_when_no_update_ever() {
        let (service, _mock) = service_with_mock();
        let (tx, rx) = oneshot::channel();

        let started = Instant::now();
        service.get_last_position(Duration::from_millis(100), move |pos| {
            let _ = tx.send(pos);
        });

        let resolved = rx.await.unwrap();
        assert!(resolved.is_none());
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_times_out_with_cached_position() {
        let (service, mock) = service_with_mock();
        mock.emit_positions(vec![position(48.0)]);

        let (tx, rx) = oneshot::channel();
        service.get_last_position(Duration::from_millis(50), move |pos| {
            let _ = tx.send(pos);
        });

        let resolved = rx.await.unwrap().unwrap();
        assert_eq!(resolved.latitude, 48.0);
    }

    #[tokio::test]
    async fn test_update_resolves_before_timeout() {
        let (service, mock) = service_with_mock();
        let (tx, rx) = oneshot::channel();

        let started = Instant::now();
        service.get_last_position(Duration::from_secs(5), move |pos| {
            let _ = tx.send(pos);
        });
        assert_eq!(mock.one_shot_requests(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        mock.emit_positions(vec![position(51.5)]);

        let resolved = rx.await.unwrap().unwrap();
        assert_eq!(resolved.latitude, 51.5);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_timer_neutralized_after_update_resolution() {
        let (service, mock) = service_with_mock();
        let invocations = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&invocations);
        service.get_last_position(Duration::from_millis(100), move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });
        mock.emit_positions(vec![position(48.0)]);

        // Wait well past the original timeout.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_superseded_completion_never_fires() {
        let (service, _mock) = service_with_mock();
        let first_invocations = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&first_invocations);
        service.get_last_position(Duration::from_millis(50), move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        let (tx, rx) = oneshot::channel();
        service.get_last_position(Duration::from_millis(50), move |pos| {
            let _ = tx.send(pos);
        });

        assert!(rx.await.unwrap().is_none());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(first_invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_timeout_resolves_immediately_with_cache() {
        let (service, mock) = service_with_mock();
        mock.emit_positions(vec![position(35.6)]);

        let (tx, rx) = oneshot::channel();
        let started = Instant::now();
        service.get_last_position(Duration::ZERO, move |pos| {
            let _ = tx.send(pos);
        });

        let resolved = rx.await.unwrap().unwrap();
        assert_eq!(resolved.latitude, 35.6);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_drop_while_pending_never_completes() {
        let (service, _mock) = service_with_mock();
        let invocations = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&invocations);
        service.get_last_position(Duration::from_millis(50), move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });
        drop(service);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sensor_error_is_nonfatal_to_pending_retrieval() {
        let (service, mock) = service_with_mock();
        let (tx, rx) = oneshot::channel();

        service.get_last_position(Duration::from_millis(500), move |pos| {
            let _ = tx.send(pos);
        });
        mock.emit_error(SensorError::LocationUnknown);

        // The retrieval survives the error and still accepts a reading.
        mock.emit_positions(vec![position(40.7)]);
        let resolved = rx.await.unwrap().unwrap();
        assert_eq!(resolved.latitude, 40.7);
    }

    #[tokio::test]
    async fn test_error_then_timeout_resolves_with_none() {
        let (service, mock) = service_with_mock();
        let (tx, rx) = oneshot::channel();

        service.get_last_position(Duration::from_millis(80), move |pos| {
            let _ = tx.send(pos);
        });
        mock.emit_error(SensorError::SensorUnavailable);

        assert!(rx.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_request_authorization_noop_when_already_determined() {
        let (service, mock) = service_with_mock();
        mock.set_authorization_status(NativeAuthorizationStatus::AuthorizedWhenInUse);

        service.request_authorization(RequestType::WhenInUseAuth);

        assert!(mock.permission_requests().is_empty());
        assert!(mock.desired_accuracy().is_none());
    }

    #[tokio::test]
    async fn test_request_authorization_prompts_with_default_accuracy() {
        let (service, mock) = service_with_mock();

        service.request_authorization(RequestType::AlwaysAuth);

        assert_eq!(mock.permission_requests(), vec![RequestType::AlwaysAuth]);
        assert_eq!(mock.desired_accuracy(), Some(1000.0));
    }

    #[tokio::test]
    async fn test_request_authorization_with_explicit_accuracy() {
        let (service, mock) = service_with_mock();

        service
            .request_authorization_with_accuracy(RequestType::WhenInUseAuth, Accuracy::Best);

        assert_eq!(
            mock.permission_requests(),
            vec![RequestType::WhenInUseAuth]
        );
        assert_eq!(mock.desired_accuracy(), Some(-1.0));
    }

    #[tokio::test]
    async fn test_set_accuracy_forwards_immediately() {
        let (service, mock) = service_with_mock();

        service.set_accuracy(Accuracy::NearestTenMeters);

        assert_eq!(mock.desired_accuracy(), Some(10.0));
    }

    #[tokio::test]
    async fn test_subscriber_observes_updates_in_order() {
        let (service, mock) = service_with_mock();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        service.set_update_subscriber(Some(Box::new(move |pos| {
            sink.lock().unwrap().push(pos.latitude);
        })));

        service.start_updating();
        mock.emit_positions(vec![position(1.0)]);
        mock.emit_positions(vec![position(2.0)]);

        assert_eq!(*seen.lock().unwrap(), vec![1.0, 2.0]);
        assert_eq!(mock.start_calls(), 1);

        // The cache ends on the most recent update.
        let (tx, rx) = oneshot::channel();
        service.get_last_position(Duration::ZERO, move |pos| {
            let _ = tx.send(pos);
        });
        assert_eq!(rx.await.unwrap().unwrap().latitude, 2.0);
    }

    #[tokio::test]
    async fn test_batch_delivery_forwards_only_most_recent() {
        let (service, mock) = service_with_mock();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        service.set_update_subscriber(Some(Box::new(move |pos| {
            sink.lock().unwrap().push(pos.latitude);
        })));

        mock.emit_positions(vec![position(1.0), position(2.0), position(3.0)]);

        assert_eq!(*seen.lock().unwrap(), vec![3.0]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_ignored() {
        let (service, mock) = service_with_mock();
        mock.emit_positions(Vec::new());

        let (tx, rx) = oneshot::channel();
        service.get_last_position(Duration::ZERO, move |pos| {
            let _ = tx.send(pos);
        });
        assert!(rx.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clearing_update_subscriber() {
        let (service, mock) = service_with_mock();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        service.set_update_subscriber(Some(Box::new(move |pos| {
            sink.lock().unwrap().push(pos.latitude);
        })));
        service.set_update_subscriber(None);

        mock.emit_positions(vec![position(1.0)]);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authorization_change_forwarded_translated() {
        let (service, mock) = service_with_mock();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        service.set_authorization_subscriber(Some(Box::new(move |status| {
            sink.lock().unwrap().push(status);
        })));

        mock.emit_authorization_change(NativeAuthorizationStatus::Restricted);
        mock.emit_authorization_change(NativeAuthorizationStatus::AuthorizedAlways);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AuthorizationStatus::Denied,
                AuthorizationStatus::AuthorizedAlways
            ]
        );
    }

    #[tokio::test]
    async fn test_authorization_status_query_translates() {
        let (service, mock) = service_with_mock();
        assert_eq!(
            service.authorization_status(),
            AuthorizationStatus::NotDetermined
        );

        mock.set_authorization_status(NativeAuthorizationStatus::Restricted);
        assert_eq!(service.authorization_status(), AuthorizationStatus::Denied);
    }

    #[tokio::test]
    async fn test_start_stop_forwarding_is_idempotent() {
        let (service, mock) = service_with_mock();

        service.stop_updating();
        service.start_updating();
        service.start_updating();
        service.stop_updating();

        assert_eq!(mock.start_calls(), 2);
        assert_eq!(mock.stop_calls(), 2);
    }

    #[tokio::test]
    async fn test_update_during_retrieval_still_reaches_subscriber() {
        let (service, mock) = service_with_mock();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        service.set_update_subscriber(Some(Box::new(move |pos| {
            sink.lock().unwrap().push(pos.latitude);
        })));

        let (tx, rx) = oneshot::channel();
        service.get_last_position(Duration::from_secs(5), move |pos| {
            let _ = tx.send(pos);
        });
        mock.emit_positions(vec![position(9.9)]);

        assert_eq!(rx.await.unwrap().unwrap().latitude, 9.9);
        assert_eq!(*seen.lock().unwrap(), vec![9.9]);
    }
}
