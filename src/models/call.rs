// src/models/call.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Waiting,
    Active,
}

/// Which side started the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initiator {
    Student,
    Admin,
}

impl Initiator {
    /// The side `user` takes in a call.
    pub fn of(user: &User) -> Self {
        match user.role {
            Role::Admin => Initiator::Admin,
            Role::Student => Initiator::Student,
        }
    }
}

/// A support call between one student and the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCall {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub start_time: DateTime<Utc>,
    pub status: CallStatus,
    pub initiator: Initiator,
}

impl ActiveCall {
    /// An admin-started call the student has not picked up yet.
    pub fn is_incoming_for(&self, student_id: &str) -> bool {
        self.student_id == student_id
            && self.initiator == Initiator::Admin
            && self.status == CallStatus::Waiting
    }

    /// Only the side that did not start the call may pick it up.
    pub fn can_be_joined_by(&self, user: &User) -> bool {
        Initiator::of(user) != self.initiator
    }
}

/// Change notifications published by the call broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CallEvent {
    Initiated { call: ActiveCall },
    Joined { call: ActiveCall },
    Ended { call: ActiveCall },
}

impl CallEvent {
    pub fn call(&self) -> &ActiveCall {
        match self {
            CallEvent::Initiated { call } | CallEvent::Joined { call } | CallEvent::Ended { call } => {
                call
            }
        }
    }
}

/// Response for call creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallCreated {
    pub call_id: String,
}
