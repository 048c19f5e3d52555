//! Mock implementation of LocationSensorPort for testing
//!
//! This mock belongs in the infrastructure layer (not ports) because:
//! 1. It's a concrete implementation of a port trait
//! 2. Mocks are infrastructure concerns, not interface definitions
//! 3. Test utilities should be close to the implementations they mock

use std::sync::{Arc, Mutex};

use wayfinder_domain::{Position, RequestType};

use crate::ports::outbound::{
    LocationSensorPort, NativeAuthorizationStatus, SensorError, SensorEvent, SensorListener,
};

struct State {
    authorization: NativeAuthorizationStatus,
    desired_accuracy: Option<f64>,
    permission_requests: Vec<RequestType>,
    one_shot_requests: usize,
    start_calls: usize,
    stop_calls: usize,
    listener: Option<SensorListener>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            authorization: NativeAuthorizationStatus::NotDetermined,
            desired_accuracy: None,
            permission_requests: Vec::new(),
            one_shot_requests: 0,
            start_calls: 0,
            stop_calls: 0,
            listener: None,
        }
    }
}

/// Mock `LocationSensorPort` for tests.
///
/// Lets tests drive authorization state + sensor events and assert the
/// commands the facade issued.
#[derive(Clone, Default)]
pub struct MockLocationSensorPort {
    state: Arc<Mutex<State>>,
}

impl MockLocationSensorPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status returned by `authorization_status` without emitting a
    /// change event.
    pub fn set_authorization_status(&self, status: NativeAuthorizationStatus) {
        self.state.lock().unwrap().authorization = status;
    }

    /// Deliver readings to the registered listener, oldest first.
    pub fn emit_positions(&self, positions: Vec<Position>) {
        let mut s = self.state.lock().unwrap();
        if let Some(listener) = s.listener.as_mut() {
            listener(SensorEvent::PositionsUpdated(positions));
        }
    }

    /// Deliver a sensor failure to the registered listener.
    pub fn emit_error(&self, error: SensorError) {
        let mut s = self.state.lock().unwrap();
        if let Some(listener) = s.listener.as_mut() {
            listener(SensorEvent::Error(error));
        }
    }

    /// Change the authorization state and notify the listener.
    pub fn emit_authorization_change(&self, status: NativeAuthorizationStatus) {
        let mut s = self.state.lock().unwrap();
        s.authorization = status;
        if let Some(listener) = s.listener.as_mut() {
            listener(SensorEvent::AuthorizationChanged(status));
        }
    }

    pub fn permission_requests(&self) -> Vec<RequestType> {
        self.state.lock().unwrap().permission_requests.clone()
    }

    pub fn desired_accuracy(&self) -> Option<f64> {
        self.state.lock().unwrap().desired_accuracy
    }

    pub fn one_shot_requests(&self) -> usize {
        self.state.lock().unwrap().one_shot_requests
    }

    pub fn start_calls(&self) -> usize {
        self.state.lock().unwrap().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.state.lock().unwrap().stop_calls
    }
}

impl LocationSensorPort for MockLocationSensorPort {
    fn authorization_status(&self) -> NativeAuthorizationStatus {
        self.state.lock().unwrap().authorization
    }

    fn request_permission(&self, request_type: RequestType) -> anyhow::Result<()> {
        let mut s = self.state.lock().unwrap();
        s.permission_requests.push(request_type);
        Ok(())
    }

    fn set_desired_accuracy(&self, value: f64) {
        self.state.lock().unwrap().desired_accuracy = Some(value);
    }

    fn request_one_shot_location(&self) -> anyhow::Result<()> {
        let mut s = self.state.lock().unwrap();
        s.one_shot_requests += 1;
        Ok(())
    }

    fn start_continuous_updates(&self) {
        self.state.lock().unwrap().start_calls += 1;
    }

    fn stop_continuous_updates(&self) {
        self.state.lock().unwrap().stop_calls += 1;
    }

    fn subscribe(&self, listener: SensorListener) {
        self.state.lock().unwrap().listener = Some(listener);
    }
}
