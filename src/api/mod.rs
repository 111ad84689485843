mod handlers;

pub use handlers::{
    AdviceResponse, CreateSubjectInput, CreateTaskInput, ListTasksQuery, ReplaceTaskInput,
    SubjectView, TaskOrder,
};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::coordinator::Coordinator;

pub fn create_router(app: Arc<Coordinator>) -> Router {
    let api = Router::new()
        // Tasks
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::replace_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/{id}/toggle", post(handlers::toggle_task))
        // Subjects
        .route(
            "/subjects",
            get(handlers::list_subjects).post(handlers::create_subject),
        )
        .route(
            "/subjects/{id}",
            axum::routing::delete(handlers::delete_subject),
        )
        // Advice
        .route("/advice", get(handlers::load_advice))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app)
}
