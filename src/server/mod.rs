mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;

#[derive(OpenApi)]
#[openapi(
    paths(api::identify_handler, api::enroll_handler, api::withdraw_handler, api::gallery_handler),
    components(schemas(
        types::IdentifyRequest,
        types::IdentifyResponse,
        types::EnrollRequest,
        types::WithdrawRequest,
        types::GalleryUpdateResponse,
        types::GalleryResponse,
    ))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/identify", post(api::identify_handler))
        .route("/enroll", post(api::enroll_handler))
        .route("/withdraw", post(api::withdraw_handler))
        .route("/gallery", get(api::gallery_handler))
        .route("/metrics", get(api::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        // 上传限制：10M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 10))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use tempfile::TempDir;

    use super::api::*;
    use super::types::*;
    use super::*;
    use crate::engine::RecognitionEngine;
    use crate::store::GalleryFile;

    async fn enroll(state: &Arc<AppState>, id: &str, vector: Vec<f64>) {
        let request = EnrollRequest { id: id.into(), vector, overwrite: false };
        enroll_handler(State(state.clone()), Json(request)).await.ok().unwrap();
    }

    fn identify_request(vector: Vec<f64>) -> Json<IdentifyRequest> {
        Json(IdentifyRequest { vector, count: 2 })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_enroll_identify_withdraw() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery.json");
        let engine = RecognitionEngine::new(3, 2, 0.1).unwrap();
        let state = AppState::new(engine, Some(path.clone()));

        enroll(&state, "A", vec![1.0, 0.0, 0.0]).await;
        enroll(&state, "B", vec![0.0, 1.0, 0.0]).await;
        assert_eq!(GalleryFile::load(&path).unwrap().faces.len(), 2);

        let Json(response) =
            identify_handler(State(state.clone()), identify_request(vec![1.0, 0.0, 0.0]))
                .await
                .ok()
                .unwrap();
        assert_eq!(response.result.unwrap().id, "A");
        assert_eq!(response.nearest.len(), 2);

        let Json(response) =
            identify_handler(State(state.clone()), identify_request(vec![0.5, 0.5, 0.0]))
                .await
                .ok()
                .unwrap();
        assert!(response.result.is_none());

        let request = WithdrawRequest { id: "A".into() };
        let Json(response) = withdraw_handler(State(state.clone()), Json(request)).await.ok().unwrap();
        assert!(response.changed);
        assert_eq!(response.size, 1);
        assert_eq!(GalleryFile::load(&path).unwrap().faces.len(), 1);

        let Json(gallery) = gallery_handler(State(state.clone())).await.ok().unwrap();
        assert_eq!(gallery.faces, vec!["B".to_string()]);
        assert_eq!(gallery.eigenfaces, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_requests() {
        let engine = RecognitionEngine::new(3, 2, 0.1).unwrap();
        let state = AppState::new(engine, None);
        enroll(&state, "A", vec![1.0, 0.0, 0.0]).await;
        enroll(&state, "B", vec![0.0, 1.0, 0.0]).await;

        let mut tasks = vec![];
        for _ in 0..8 {
            let state = state.clone();
            tasks.push(tokio::spawn(async move {
                let request = identify_request(vec![1.0, 0.0, 0.0]);
                let Json(response) = identify_handler(State(state), request).await.ok().unwrap();
                response.result.map(|c| c.id)
            }));
        }
        let request =
            EnrollRequest { id: "A".into(), vector: vec![1.0, 0.0, 0.0], overwrite: true };
        enroll_handler(State(state.clone()), Json(request)).await.ok().unwrap();

        for task in tasks {
            assert_eq!(task.await.unwrap().as_deref(), Some("A"));
        }
        assert_eq!(state.engine.read().await.gallery().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_status() {
        let engine = RecognitionEngine::new(3, 2, 0.1).unwrap();
        let state = AppState::new(engine, None);

        let err = identify_handler(State(state.clone()), identify_request(vec![1.0, 0.0, 0.0]))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::CONFLICT);

        enroll(&state, "A", vec![1.0, 0.0, 0.0]).await;
        let request = EnrollRequest { id: "A".into(), vector: vec![0.0, 1.0, 0.0], overwrite: false };
        let err = enroll_handler(State(state.clone()), Json(request)).await.err().unwrap();
        assert_eq!(err.0, StatusCode::CONFLICT);

        let request = EnrollRequest { id: "C".into(), vector: vec![0.0, 1.0], overwrite: false };
        let err = enroll_handler(State(state.clone()), Json(request)).await.err().unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(state.engine.read().await.gallery().len(), 1);
    }
}
