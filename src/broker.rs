// src/broker.rs

//! Support-call registry.
//!
//! Holds every in-flight call and publishes a [`CallEvent`] whenever the set
//! changes, so the student and admin surfaces are told about incoming calls
//! instead of rescanning the list.
//!
//! Lifecycle: `waiting` -> `active` -> removed. Calls never expire on their own.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;

use crate::{
    models::{
        call::{ActiveCall, CallEvent, CallStatus, Initiator},
        user::User,
    },
    utils::ids::random_id,
};

const EVENT_CAPACITY: usize = 256;

pub struct CallBroker {
    calls: Mutex<Vec<ActiveCall>>,
    events: broadcast::Sender<CallEvent>,
}

impl CallBroker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    // Every mutation is a single push/replace/remove, so a poisoned list is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<ActiveCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: CallEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Starts a call for `student`, or returns the id of the call they already have.
    pub fn initiate(&self, student: &User, initiator: Initiator) -> String {
        let mut calls = self.lock();

        if let Some(existing) = calls.iter().find(|c| c.student_id == student.id) {
            tracing::debug!(
                call_id = %existing.id,
                student_id = %student.id,
                "Call already in progress, reusing"
            );
            return existing.id.clone();
        }

        let call = ActiveCall {
            id: random_id(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            start_time: Utc::now(),
            status: CallStatus::Waiting,
            initiator,
        };
        let id = call.id.clone();
        calls.push(call.clone());
        drop(calls);

        tracing::info!(call_id = %id, student_id = %student.id, ?initiator, "Call initiated");
        self.publish(CallEvent::Initiated { call });
        id
    }

    /// Marks the call active. Returns the updated call, or `None` if no such call exists.
    pub fn join(&self, call_id: &str) -> Option<ActiveCall> {
        let mut calls = self.lock();
        let call = calls.iter_mut().find(|c| c.id == call_id)?;
        if call.status == CallStatus::Active {
            return Some(call.clone());
        }
        call.status = CallStatus::Active;
        let call = call.clone();
        drop(calls);

        tracing::info!(call_id = %call.id, student_id = %call.student_id, "Call joined");
        self.publish(CallEvent::Joined { call: call.clone() });
        Some(call)
    }

    /// Removes the call. Returns what was removed, or `None` if it was already gone.
    pub fn end(&self, call_id: &str) -> Option<ActiveCall> {
        let mut calls = self.lock();
        let pos = calls.iter().position(|c| c.id == call_id)?;
        let call = calls.remove(pos);
        drop(calls);

        tracing::info!(call_id = %call.id, student_id = %call.student_id, "Call ended");
        self.publish(CallEvent::Ended { call: call.clone() });
        Some(call)
    }

    /// Snapshot of all calls in creation order.
    pub fn list(&self) -> Vec<ActiveCall> {
        self.lock().clone()
    }

    pub fn get(&self, call_id: &str) -> Option<ActiveCall> {
        self.lock().iter().find(|c| c.id == call_id).cloned()
    }

    /// The call belonging to `student_id`, if any. There is at most one.
    pub fn for_student(&self, student_id: &str) -> Option<ActiveCall> {
        self.lock().iter().find(|c| c.student_id == student_id).cloned()
    }

    /// An admin-initiated call still waiting for `student_id` to pick up.
    pub fn incoming_for(&self, student_id: &str) -> Option<ActiveCall> {
        self.lock()
            .iter()
            .find(|c| c.is_incoming_for(student_id))
            .cloned()
    }

    pub fn is_busy(&self, student_id: &str) -> bool {
        self.lock().iter().any(|c| c.student_id == student_id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events.subscribe()
    }
}

impl Default for CallBroker {
    fn default() -> Self {
        Self::new()
    }
}
