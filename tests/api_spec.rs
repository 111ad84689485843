use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use study_manager::advisory::AdvisoryClient;
use study_manager::api::{create_router, AdviceResponse};
use study_manager::coordinator::Coordinator;
use study_manager::db::Database;
use study_manager::models::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_with_advice(base_url: &str) -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = Coordinator::new(db, Arc::new(AdvisoryClient::new(base_url)));
    TestServer::new(create_router(Arc::new(app))).expect("Failed to create test server")
}

fn setup() -> TestServer {
    // Nothing listens here; only the advice tests need a live upstream.
    setup_with_advice("http://127.0.0.1:9/")
}

async fn create_task(server: &TestServer, body: serde_json::Value) -> Task {
    let response = server.post("/api/v1/tasks").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Task>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod tasks {
    use super::*;

    #[tokio::test]
    async fn returns_empty_list_when_no_tasks_exist() {
        let server = setup();

        let response = server.get("/api/v1/tasks").await;

        response.assert_status_ok();
        let tasks: Vec<Task> = response.json();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn creates_task_in_quadrant() {
        let server = setup();

        let task = create_task(
            &server,
            json!({
                "category": "urgent_important",
                "title": "Submit lab",
                "deadline": "2025-03-03",
                "description": "Physics"
            }),
        )
        .await;

        assert_eq!(task.category, Some(Category::UrgentImportant));
        assert_eq!(task.title, "Submit lab");
        assert!(!task.is_completed);

        let fetched: Task = server.get(&format!("/api/v1/tasks/{}", task.id)).await.json();
        assert_eq!(fetched, task);
    }

    #[tokio::test]
    async fn rejects_blank_title() {
        let server = setup();

        let response = server
            .post("/api/v1/tasks")
            .json(&json!({ "title": "  " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "task title must not be empty");
    }

    #[tokio::test]
    async fn filters_by_category_and_sorts_by_deadline() {
        let server = setup();
        create_task(&server, json!({ "title": "Study & Review: late", "deadline": "2025-01-01" })).await;
        create_task(&server, json!({ "title": "Study & Review: undated" })).await;
        create_task(&server, json!({ "title": "Study & Review: early", "deadline": "2024-06-15" })).await;
        create_task(&server, json!({ "title": "Urgent & Important: other", "deadline": "2020-01-01" })).await;

        let response = server
            .get("/api/v1/tasks")
            .add_query_param("category", "study_review")
            .add_query_param("sort", "deadline")
            .await;

        response.assert_status_ok();
        let titles: Vec<String> = response.json::<Vec<Task>>().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["early", "late", "undated"]);
    }

    #[tokio::test]
    async fn toggle_flips_completion_each_time() {
        let server = setup();
        let task = create_task(&server, json!({ "title": "Flip" })).await;

        let once: Task = server
            .post(&format!("/api/v1/tasks/{}/toggle", task.id))
            .await
            .json();
        assert!(once.is_completed);

        let twice: Task = server
            .post(&format!("/api/v1/tasks/{}/toggle", task.id))
            .await
            .json();
        assert!(!twice.is_completed);
        assert_eq!(twice.version, 2);
    }

    #[tokio::test]
    async fn toggle_unknown_task_is_not_found() {
        let server = setup();

        let response = server.post("/api/v1/tasks/77/toggle").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn replace_with_stale_version_conflicts() {
        let server = setup();
        let task = create_task(&server, json!({ "title": "Draft" })).await;
        server
            .post(&format!("/api/v1/tasks/{}/toggle", task.id))
            .await
            .assert_status_ok();

        let response = server
            .put(&format!("/api/v1/tasks/{}", task.id))
            .json(&json!({ "title": "Final", "version": task.version }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn replace_with_current_version_succeeds() {
        let server = setup();
        let task = create_task(&server, json!({ "title": "Draft", "category": "important_not_urgent" })).await;

        let response = server
            .put(&format!("/api/v1/tasks/{}", task.id))
            .json(&json!({
                "title": "Final",
                "deadline": "2025-09-01",
                "version": task.version
            }))
            .await;

        response.assert_status_ok();
        let updated: Task = response.json();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.deadline, "2025-09-01");
        assert_eq!(updated.category, Some(Category::ImportantNotUrgent));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let server = setup();
        let task = create_task(&server, json!({ "title": "Bye" })).await;

        server
            .delete(&format!("/api/v1/tasks/{}", task.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format!("/api/v1/tasks/{}", task.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let tasks: Vec<Task> = server.get("/api/v1/tasks").await.json();
        assert!(tasks.is_empty());
    }
}

mod subjects {
    use super::*;

    #[tokio::test]
    async fn lists_subjects_with_feedback_tier() {
        let server = setup();

        server
            .post("/api/v1/subjects")
            .json(&json!({ "subject": "Math", "score": 95.0 }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/subjects")
            .json(&json!({ "subject": "Art", "score": 61.0 }))
            .await
            .assert_status(StatusCode::CREATED);

        let subjects: Vec<serde_json::Value> = server.get("/api/v1/subjects").await.json();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0]["subject"], "Math");
        assert_eq!(subjects[0]["tier"], "excellent");
        assert_eq!(subjects[1]["tier"], "needs_improvement");
        assert_eq!(
            subjects[1]["feedback"],
            "Needs improvement. Review core concepts and practice more."
        );
    }

    #[tokio::test]
    async fn rejects_blank_subject_name() {
        let server = setup();

        let response = server
            .post("/api/v1/subjects")
            .json(&json!({ "subject": "", "score": 50.0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_removes_subject() {
        let server = setup();
        let created: serde_json::Value = server
            .post("/api/v1/subjects")
            .json(&json!({ "subject": "Math", "score": 95.0 }))
            .await
            .json();

        server
            .delete(&format!("/api/v1/subjects/{}", created["id"]))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let subjects: Vec<serde_json::Value> = server.get("/api/v1/subjects").await.json();
        assert!(subjects.is_empty());
    }
}

mod advice {
    use super::*;

    #[tokio::test]
    async fn returns_fetched_suggestions() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": [
                    { "title": "Pomodoro", "description": "25 minute blocks" }
                ]
            })))
            .mount(&upstream)
            .await;
        let server = setup_with_advice(&upstream.uri());

        let response = server.get("/api/v1/advice").await;

        response.assert_status_ok();
        let body: AdviceResponse = response.json();
        assert!(body.success);
        assert_eq!(body.suggestions.len(), 1);
        assert_eq!(body.suggestions[0].title, "Pomodoro");
    }

    #[tokio::test]
    async fn upstream_failure_reports_unsuccessful_with_previous_list() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": [ { "title": "Sleep", "description": "8 hours" } ]
            })))
            .up_to_n_times(1)
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&upstream)
            .await;
        let server = setup_with_advice(&upstream.uri());

        let first: AdviceResponse = server.get("/api/v1/advice").await.json();
        assert!(first.success);

        let second: AdviceResponse = server.get("/api/v1/advice").await.json();
        assert!(!second.success);
        assert_eq!(second.suggestions, first.suggestions);
    }
}
