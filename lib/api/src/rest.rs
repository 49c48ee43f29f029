use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use matchx_core::Error;
use matchx_similarity::{validate_top_n, RecommenderService, DEFAULT_TOP_N};
use matchx_storage::ProfileSource;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state handed to every handler
pub struct ApiState {
    pub service: Arc<RecommenderService>,
    pub source: Arc<dyn ProfileSource>,
}

impl ApiState {
    pub fn new(service: Arc<RecommenderService>, source: Arc<dyn ProfileSource>) -> Self {
        Self { service, source }
    }

    /// Reload the source and refit when the profile count changed.
    /// A failed reload keeps serving the previous fit if there is one.
    fn sync_with_source(&self) -> Result<(), Error> {
        let outcome = self
            .source
            .load()
            .and_then(|corpus| self.service.refresh(corpus));

        match outcome {
            Ok(true) => {
                info!(source = %self.source.describe(), "recommender refitted from source");
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) if self.service.is_fitted() => {
                warn!(source = %self.source.describe(), error = %e, "reload failed, serving previous fit");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Unconditional reload and refit
    fn reload(&self) -> Result<(), Error> {
        self.source.load().and_then(|corpus| self.service.fit(corpus))
    }
}

/// Run source reads and fits on the blocking pool so a refit never stalls
/// the worker serving other requests
async fn run_blocking<F>(state: &web::Data<ApiState>, job: F) -> Result<(), Error>
where
    F: FnOnce(&ApiState) -> Result<(), Error> + Send + 'static,
{
    let state = state.clone();
    web::block(move || job(state.get_ref()))
        .await
        .map_err(|e| Error::Internal(format!("blocking task failed: {}", e)))?
}

#[derive(Deserialize)]
struct RecommendQuery {
    top_n: Option<i64>,
}

/// HTTP status for each error kind
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::NotFitted => StatusCode::SERVICE_UNAVAILABLE,
        Error::EmptyCorpus | Error::Configuration(_) | Error::Serialization(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::Internal(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &Error) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!(kind = err.kind(), error = %err, "request failed");
    }
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": err.to_string()
    }))
}

/// Register all routes on an app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommendations/{uid}", web::get().to(get_recommendations))
        .route("/explain/{uid}/{candidate}", web::get().to(explain_pair))
        .route("/refresh", web::post().to(refresh))
        .route("/health", web::get().to(health));
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        service: Arc<RecommenderService>,
        source: Arc<dyn ProfileSource>,
        port: u16,
    ) -> std::io::Result<()> {
        let state = web::Data::new(ApiState::new(service, source));

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

async fn get_recommendations(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    query: web::Query<RecommendQuery>,
) -> ActixResult<HttpResponse> {
    let uid = path.into_inner();
    let top_n = query.top_n.unwrap_or(DEFAULT_TOP_N);

    if let Err(e) = validate_top_n(top_n) {
        return Ok(error_response(&e));
    }
    if let Err(e) = run_blocking(&state, ApiState::sync_with_source).await {
        return Ok(error_response(&e));
    }

    match state.service.recommend(&uid, top_n) {
        Ok(matches) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "total": matches.len(),
            "matches": matches
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn explain_pair(
    state: web::Data<ApiState>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (uid, candidate) = path.into_inner();

    match state.service.explain(&uid, &candidate) {
        Ok(explanation) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "result": explanation
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn refresh(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    match run_blocking(&state, ApiState::reload).await {
        Ok(()) => {
            let profiles = state.service.stats().profiles;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": format!("Recommender refitted on {} profiles", profiles)
            })))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn health(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "recommender": state.service.stats()
    })))
}
