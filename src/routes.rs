// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, auth, calls, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quiz, calls, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, call broker, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // route_layer keeps unknown paths on the plain 404 fallback.
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(auth.clone()),
        );

    let quiz_routes = Router::new()
        .route("/api/questions", get(quiz::list_questions))
        .route("/api/questions/{id}/answer", post(quiz::answer_question))
        .route("/api/submissions/me", get(quiz::my_submissions))
        .route("/api/support", get(quiz::get_support))
        .route_layer(auth.clone());

    let call_routes = Router::new()
        .route("/", get(calls::list_calls).post(calls::start_call))
        .route("/incoming", get(calls::incoming_call))
        .route("/events", get(calls::call_events))
        .route("/{id}", delete(calls::end_call))
        .route("/{id}/join", post(calls::join_call))
        .route("/{id}/session", get(calls::session_view))
        .route_layer(auth.clone());

    let admin_routes = Router::new()
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route("/questions/{id}", delete(admin::delete_question))
        .route("/reports", get(admin::reports))
        .route("/students/{id}/call", post(admin::call_student))
        .route("/support", put(admin::update_support))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(quiz_routes)
        .nest("/api/calls", call_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
