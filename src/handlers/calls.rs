// src/handlers/calls.rs

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, Stream};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use crate::{
    broker::CallBroker,
    error::AppError,
    models::{
        call::{ActiveCall, CallCreated, Initiator},
        user::User,
    },
    session::SessionDescriptor,
    state::AppState,
    utils::jwt::Claims,
};

/// Students may only see and act on their own call; the administrator on any.
fn ensure_party(user: &User, call: &ActiveCall) -> Result<(), AppError> {
    if user.is_admin() || call.student_id == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "This call belongs to another student".to_string(),
        ))
    }
}

/// Lists calls: all of them for the administrator, the caller's own for a student.
pub async fn list_calls(
    State(calls): State<Arc<CallBroker>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let user = claims.user();
    let visible: Vec<ActiveCall> = if user.is_admin() {
        calls.list()
    } else {
        calls.for_student(&user.id).into_iter().collect()
    };
    Json(visible)
}

/// Student requests a live session. Returns the existing call if one is already open.
pub async fn start_call(
    State(calls): State<Arc<CallBroker>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = claims.user();
    if user.is_admin() {
        return Err(AppError::BadRequest(
            "Administrators call a student from the reports view".to_string(),
        ));
    }

    let call_id = calls.initiate(&user, Initiator::Student);
    Ok((StatusCode::CREATED, Json(CallCreated { call_id })))
}

/// An administrator call waiting for the current student to accept, if any.
pub async fn incoming_call(
    State(calls): State<Arc<CallBroker>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(calls.incoming_for(&claims.sub))
}

/// Accepts a call as its counterpart. Reports 404 once the call is gone; nothing changes in that case.
pub async fn join_call(
    State(calls): State<Arc<CallBroker>>,
    Extension(claims): Extension<Claims>,
    Path(call_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(call) = calls.get(&call_id) {
        let user = claims.user();
        ensure_party(&user, &call)?;
        if !call.can_be_joined_by(&user) {
            return Err(AppError::Forbidden(
                "Waiting for the other party to pick up".to_string(),
            ));
        }
    }

    let call = calls
        .join(&call_id)
        .ok_or_else(|| AppError::NotFound("Call not found".to_string()))?;
    Ok(Json(call))
}

/// Ends or declines a call. Always succeeds for a party to the call, even if it is already gone.
pub async fn end_call(
    State(calls): State<Arc<CallBroker>>,
    Extension(claims): Extension<Claims>,
    Path(call_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(call) = calls.get(&call_id) {
        ensure_party(&claims.user(), &call)?;
    }

    calls.end(&call_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Session view data for a call: status, meeting link and local preview settings.
pub async fn session_view(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(call_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let call = state
        .calls
        .get(&call_id)
        .ok_or_else(|| AppError::NotFound("Call not found".to_string()))?;
    ensure_party(&claims.user(), &call)?;

    let meet_link = state.store.support_config().meet_link;
    Ok(Json(SessionDescriptor::new(call, meet_link)))
}

/// Server-sent stream of call changes.
///
/// Students only receive events for their own calls.
pub async fn call_events(
    State(calls): State<Arc<CallBroker>>,
    Extension(claims): Extension<Claims>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user = claims.user();
    let rx = calls.subscribe();

    let updates = BroadcastStream::new(rx).filter_map(move |result| {
        // Lagged receivers just skip ahead.
        let event = result.ok()?;
        if !user.is_admin() && event.call().student_id != user.id {
            return None;
        }
        Some(Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().data("error"))))
    });

    let initial = stream::once(async { Ok(Event::default().event("connected").data("ok")) });

    Sse::new(initial.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
