use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{diary, plans, recognition};

pub fn build_app(state: AppState) -> Router {
    let max_upload = state.config.max_upload_bytes;
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(recognition::router(max_upload))
                  .merge(diary::router())
                  .merge(plans::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use http_body_util::BodyExt;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::genai::fake::ScriptedModel;
    use crate::plans::services::plan_fixtures;

    const IDLI: &str = r#"{"name":"Idli","calories":120,"protein":3,"carbs":24,"fat":1,
        "ingredients":["rice","urad dal"]}"#;

    fn app_with(model: ScriptedModel) -> (Router, AppState) {
        let state = AppState::fake(Arc::new(model));
        (build_app(state.clone()), state)
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixel = image::Rgb([200, 160, 90]);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, pixel));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn multipart(field: &str, data: &[u8]) -> (String, Vec<u8>) {
        let boundary = "nutrilens-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"meal.jpg\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app_with(ScriptedModel::silent());
        let res = app
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn multipart_scan_normalizes_and_recognizes() {
        let (app, _) = app_with(ScriptedModel::text(IDLI));
        let (content_type, body) = multipart("file", &jpeg(1024, 768));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/scan")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["width"], 512);
        assert_eq!(json["height"], 384);
        assert_eq!(json["estimate"]["name"], "Idli");
        assert!(json["image_url"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn base64_scan_accepts_data_urls() {
        let (app, _) = app_with(ScriptedModel::text(IDLI));
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg(200, 100)));
        let payload = json!({ "image_b64": data_url });
        let (status, json) = send(app, Method::POST, "/api/v1/scan/base64", Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["width"], 200);
        assert_eq!(json["estimate"]["calories"], 120.0);
    }

    #[tokio::test]
    async fn scan_rejects_non_images_before_calling_model() {
        let model = Arc::new(ScriptedModel::text(IDLI));
        let app = build_app(AppState::fake(model.clone()));
        let payload = json!({ "image_b64": STANDARD.encode(b"plain text, not a photo") });
        let (status, _) = send(app, Method::POST, "/api/v1/scan/base64", Some(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_reports_model_failures_as_bad_gateway() {
        let (app, _) = app_with(ScriptedModel::text(""));
        let payload = json!({ "image_b64": STANDARD.encode(jpeg(64, 64)) });
        let (status, _) = send(app, Method::POST, "/api/v1/scan/base64", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn scan_without_file_is_bad_request() {
        let (app, _) = app_with(ScriptedModel::text(IDLI));
        let (content_type, body) = multipart("notes", b"hello");
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/scan")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logging_an_estimate_updates_dashboard() {
        let (app, state) = app_with(ScriptedModel::silent());
        let (status, item) = send(
            app.clone(),
            Method::POST,
            "/api/v1/diary/items",
            Some(json!({ "estimate": { "name": "Idli", "calories": 120, "protein": 3 } })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["carbs"], 0.0);
        assert_eq!(item["ingredients"], json!([]));
        assert_eq!(state.diary.read().await.items().len(), 1);

        send(app.clone(), Method::POST, "/api/v1/diary/water", None).await;
        let (_, water) = send(app.clone(), Method::POST, "/api/v1/diary/water", None).await;
        assert_eq!(water["water"], 2);

        let (status, dash) = send(app.clone(), Method::GET, "/api/v1/diary/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dash["calories_consumed"], 120.0);
        assert_eq!(dash["calories_left"], 1880.0);
        assert_eq!(dash["protein"]["consumed"], 3.0);
        assert_eq!(dash["water"], 2);

        let (status, week) = send(app.clone(), Method::GET, "/api/v1/diary/week", None).await;
        assert_eq!(status, StatusCode::OK);
        let week = week.as_array().unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[6]["calories"], 120.0);
        assert_eq!(week[6]["date"], dash["stats"]["date"]);

        let uri = format!("/api/v1/diary/items/{}", item["id"].as_str().unwrap());
        let (status, _) = send(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_patch_feeds_plan_prompt() {
        let model = Arc::new(ScriptedModel::text(plan_fixtures::week().to_string()));
        let app = build_app(AppState::fake(model.clone()));

        let (status, profile) = send(
            app.clone(),
            Method::PATCH,
            "/api/v1/profile",
            Some(json!({ "allergies": ["peanut"], "water_reminder_enabled": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["allergies"], json!(["peanut"]));
        assert_eq!(profile["water_reminder"]["enabled"], true);
        assert_eq!(profile["daily_goal"], 2000);

        let (status, plan) = send(app, Method::POST, "/api/v1/plans/weekly", None).await;
        assert_eq!(status, StatusCode::OK);
        let days = plan["days"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| !d["meals"].as_array().unwrap().is_empty()));

        let parts = serde_json::to_value(model.last_request().parts).unwrap();
        let prompt = parts[0]["text"].as_str().unwrap();
        assert!(prompt.contains("Allergies: peanut."));
        assert!(prompt.contains("Protein: 100g"));
    }

    #[tokio::test]
    async fn plan_failure_is_bad_gateway() {
        let (app, _) = app_with(ScriptedModel::text("not json"));
        let (status, _) = send(app, Method::POST, "/api/v1/plans/daily", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
