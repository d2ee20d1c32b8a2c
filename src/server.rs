use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::agent::SearchAgent;
use crate::error::StartupError;
use crate::ui::{Page, PageState};

/// Outcome of startup: either an agent ready to take questions or the
/// error that stopped it.
pub enum Startup {
    Ready(SearchAgent),
    Halted(StartupError),
}

pub struct AppState {
    startup: Startup,
    page: Page,
}

impl AppState {
    pub fn new(startup: Startup) -> Result<Self, minijinja::Error> {
        Ok(Self {
            startup,
            page: Page::new()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    query: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn show_page(State(state): State<Arc<AppState>>) -> Response {
    let page_state = match &state.startup {
        Startup::Ready(_) => PageState::Idle,
        Startup::Halted(err) => PageState::Halted {
            message: err.to_string(),
        },
    };
    render(&state, &page_state)
}

async fn submit(State(state): State<Arc<AppState>>, Form(form): Form<SubmitForm>) -> Response {
    let page_state = match &state.startup {
        Startup::Ready(agent) => PageState::Completed {
            result: agent.handle_submit(&form.query).await,
            query: form.query,
        },
        Startup::Halted(err) => PageState::Halted {
            message: err.to_string(),
        },
    };
    render(&state, &page_state)
}

fn render(state: &AppState, page_state: &PageState) -> Response {
    match state.page.render(page_state) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{non_web, web, FakeModel};
    use crate::error::RemoteServiceError;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn app_with(model: &Arc<FakeModel>) -> Router {
        let state = AppState::new(Startup::Ready(SearchAgent::new(model.clone()))).unwrap();
        router(Arc::new(state))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_query(encoded: &str) -> Request<Body> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("query={}", encoded)))
            .unwrap()
    }

    #[tokio::test]
    async fn get_renders_idle_form() {
        let model = Arc::new(FakeModel::answering("unused", vec![]));
        let response = app_with(&model)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<form"));
        assert!(!html.contains("<h2>Answer</h2>"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn post_renders_answer_with_filtered_sources() {
        let model = Arc::new(FakeModel::answering(
            "It is 15°C and cloudy.",
            vec![non_web(), web("https://example.com/a", "Weather A")],
        ));
        let response = app_with(&model)
            .oneshot(post_query("What%27s+the+weather+in+London%3F"))
            .await
            .unwrap();
        let html = body_text(response).await;

        assert_eq!(model.queries(), ["What's the weather in London?"]);
        assert!(html.contains("<h2>Answer</h2>"));
        assert!(html.contains("It is 15°C and cloudy."));
        assert!(html.contains("<h2>Sources</h2>"));
        assert!(html.contains(r#"[1] <a href="https://example.com/a">Weather A</a>"#));
        assert!(!html.contains("[2]"));
    }

    #[tokio::test]
    async fn post_empty_query_warns_without_remote_call() {
        let model = Arc::new(FakeModel::answering("unused", vec![]));
        let response = app_with(&model).oneshot(post_query("")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Please enter a question."));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn post_timeout_shows_error_banner() {
        let model = Arc::new(FakeModel::failing(|| {
            RemoteServiceError::Timeout("operation timed out".into())
        }));
        let response = app_with(&model).oneshot(post_query("news")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("banner error"));
        assert!(html.contains("operation timed out"));
        assert!(!html.contains("<h2>Answer</h2>"));
        assert!(!html.contains("<h2>Sources</h2>"));
    }

    #[tokio::test]
    async fn halted_startup_has_no_submission_path() {
        let state = AppState::new(Startup::Halted(StartupError::MissingCredential {
            key: "GEMINI_API_KEY".into(),
        }))
        .unwrap();
        let app = router(Arc::new(state));

        let html = body_text(
            app.clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("GEMINI_API_KEY not found."));
        assert!(!html.contains("<form"));

        let html = body_text(app.oneshot(post_query("hello")).await.unwrap()).await;
        assert!(!html.contains("<form"));
        assert!(!html.contains("<h2>Answer</h2>"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let model = Arc::new(FakeModel::answering("unused", vec![]));
        let response = app_with(&model)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "ok");
    }
}
