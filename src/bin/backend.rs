use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use log::{error, info, warn};
use serde::Deserialize;
use tokio::{signal, task};
use tubetags::{
    config::{DEFAULT_ENV_FILE, load_settings_from},
    insights::{Insights, collect_insights_ordered},
    view::{self, IndexPage},
    youtube::{SearchOrder, YouTubeClient},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve the YouTube tag finder web form.")]
struct Cli {
    #[arg(
        long = "env-file",
        value_name = "PATH",
        default_value = DEFAULT_ENV_FILE,
        help = "KEY=value file read before the process environment"
    )]
    env_file: PathBuf,
    #[arg(long, value_name = "ADDR", help = "Override the listen address (HOST)")]
    host: Option<String>,
    #[arg(short, long, value_name = "PORT", help = "Override the listen port (PORT)")]
    port: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    client: Arc<YouTubeClient>,
}

#[derive(Debug, Deserialize)]
struct QueryForm {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct InsightsParams {
    #[serde(default)]
    q: String,
    /// Search order for the tag ranking, as the API spells it.
    order: Option<String>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<tubetags::Error> for ApiError {
    fn from(err: tubetags::Error) -> Self {
        let status = if err.is_configuration() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_GATEWAY
        };
        Self {
            status,
            message: format!("{:#}", anyhow::Error::from(err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_settings_from(&cli.env_file)
        .with_context(|| format!("loading settings from {}", cli.env_file.display()))?;

    let client = YouTubeClient::new(settings.api.clone());
    if !client.has_api_key() {
        warn!("YOUTUBE_API_KEY is not set; every query will fail until it is configured");
    }

    let state = AppState {
        client: Arc::new(client),
    };

    let host = cli.host.unwrap_or(settings.host);
    let port = cli.port.unwrap_or(settings.port);
    let addr = SocketAddr::new(
        host.parse()
            .with_context(|| format!("parsing listen address {host:?}"))?,
        port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!("Tag finder listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running web server")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/api/insights", get(api_insights))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", err);
    }
}

async fn index() -> Html<String> {
    Html(view::index(&IndexPage::default()).into_string())
}

/// Form submits always render a page; failures become an error banner.
async fn submit(State(state): State<AppState>, Form(form): Form<QueryForm>) -> Html<String> {
    let query = form.title.trim().to_string();
    let mut page = IndexPage {
        query: query.clone(),
        ..IndexPage::default()
    };

    if !query.is_empty() {
        match run_insights(state, query, SearchOrder::ViewCount).await {
            Ok(insights) => page.insights = Some(insights),
            Err(err) => {
                error!("Query failed: {}", err.message);
                page.error = Some(err.message);
            }
        }
    }

    Html(view::index(&page).into_string())
}

async fn api_insights(
    State(state): State<AppState>,
    Query(params): Query<InsightsParams>,
) -> ApiResult<Json<Insights>> {
    let order = match params.order.as_deref() {
        Some(name) => name
            .parse::<SearchOrder>()
            .map_err(|err| ApiError::bad_request(err.to_string()))?,
        None => SearchOrder::ViewCount,
    };
    let insights = run_insights(state, params.q, order).await?;
    Ok(Json(insights))
}

/// The API client blocks, so each cycle runs on the blocking pool.
async fn run_insights(state: AppState, query: String, order: SearchOrder) -> ApiResult<Insights> {
    let client = state.client.clone();
    task::spawn_blocking(move || collect_insights_ordered(&*client, &query, order))
        .await
        .map_err(|err| ApiError::internal(format!("task join error: {err}")))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tubetags::config::ApiConfig;

    fn unconfigured_state() -> AppState {
        AppState {
            client: Arc::new(YouTubeClient::new(ApiConfig {
                api_key: None,
                base_url: "http://127.0.0.1:9".into(),
                timeout: Duration::from_secs(1),
            })),
        }
    }

    #[test]
    fn cli_defaults_to_dotenv() {
        let cli = Cli::parse_from(["backend"]);
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn cli_accepts_overrides() {
        let cli = Cli::parse_from([
            "backend",
            "--env-file",
            "/etc/tubetags.env",
            "--host",
            "127.0.0.1",
            "-p",
            "8081",
        ]);
        assert_eq!(cli.env_file, PathBuf::from("/etc/tubetags.env"));
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(8081));
    }

    #[test]
    fn upstream_errors_map_to_bad_gateway() {
        let err = ApiError::from(tubetags::Error::Upstream {
            endpoint: "videos",
            status: 500,
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("500"));
    }

    #[test]
    fn missing_key_maps_to_internal_error() {
        let err = ApiError::from(tubetags::Error::MissingApiKey);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn decode_errors_carry_their_cause_once() {
        let err = ApiError::from(tubetags::Error::Decode(std::io::Error::other("bad json")));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "could not decode YouTube API response: bad json");
    }

    #[tokio::test]
    async fn api_rejects_unknown_order() {
        let result = api_insights(
            State(unconfigured_state()),
            Query(InsightsParams {
                q: "cats".into(),
                order: Some("views".into()),
            }),
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, r#"unknown search order: "views""#);
    }

    #[tokio::test]
    async fn api_accepts_known_order() {
        let result = api_insights(
            State(unconfigured_state()),
            Query(InsightsParams {
                q: "cats".into(),
                order: Some("date".into()),
            }),
        )
        .await;
        // Parsing succeeded, so the failure comes from the missing key.
        assert_eq!(result.unwrap_err().status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn submit_shows_error_instead_of_failing() {
        let Html(body) = submit(
            State(unconfigured_state()),
            Form(QueryForm {
                title: " cats ".into(),
            }),
        )
        .await;
        assert!(body.contains("Error: YOUTUBE_API_KEY is not set"));
        assert!(body.contains(r#"value="cats""#));
    }

    #[tokio::test]
    async fn blank_submit_renders_empty_form() {
        let Html(body) = submit(
            State(unconfigured_state()),
            Form(QueryForm {
                title: "   ".into(),
            }),
        )
        .await;
        assert!(!body.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn api_reports_missing_key_as_json_error() {
        let result = api_insights(
            State(unconfigured_state()),
            Query(InsightsParams {
                q: "cats".into(),
                order: None,
            }),
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "YOUTUBE_API_KEY is not set");
    }
}
