// Hand-crafted async HTTP client for the LX gateway REST API.
//
// Auth: optional `Authorization: Bearer` header, injected as a default
// header at construction. Paths are rooted at the gateway base URL.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    AttackTypeInfo, AttackTypesResponse, LoginRequest, LoginResponse, LogsResponse, RawAlert,
    SensorCatalog, SensorReading, ShapExplanation, SimulationTarget, UserAccount, UsersResponse,
};

// ── Error response shape from the gateway ────────────────────────────

/// Both `{"message": …}` and FastAPI-style `{"detail": …}` appear in the wild.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the LX gateway REST API.
///
/// Cheap to clone; all state is the inner `reqwest::Client` and the
/// normalized base URL.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build an unauthenticated client (public endpoints only).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Build from a bearer token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a default header on
    /// every request, marked sensitive so it never appears in logs.
    pub fn from_token(
        base_url: &str,
        token: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Parse and normalize the base URL to always end with `/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the alert WebSocket URL (`/ws/alerts`), mapping the scheme
    /// to `ws`/`wss` and attaching the token as a query parameter when
    /// one is supplied.
    pub fn alerts_ws_url(&self, token: Option<&secrecy::SecretString>) -> Result<Url, Error> {
        let mut url = self.url("ws/alerts");
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|()| Error::WebSocketConnect(format!("cannot derive ws URL from {url}")))?;
        if let Some(token) = token {
            url.query_pairs_mut()
                .append_pair("token", token.expose_secret());
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"api/logs"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = body_preview(&body, 200);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.error_from_status(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from_status(status, resp).await)
        }
    }

    async fn error_from_status(
        &self,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let body = resp.text().await.unwrap_or_default();
        let parsed: Option<ErrorResponse> = serde_json::from_str(&body).ok();
        let (message, code) = match parsed {
            Some(e) => (
                e.message.or(e.detail).unwrap_or_else(|| status.to_string()),
                e.code,
            ),
            None => (status.to_string(), None),
        };

        Error::Gateway {
            message,
            code,
            status: status.as_u16(),
        }
    }

    // ── Logs ─────────────────────────────────────────────────────────

    /// Fetch the persisted alert/audit log (`GET /api/logs`).
    pub async fn list_logs(&self) -> Result<Vec<RawAlert>, Error> {
        let resp: LogsResponse = self.get("api/logs").await?;
        Ok(resp.logs)
    }

    /// Clear persisted server-side logs (`DELETE /api/logs`).
    ///
    /// Destructive and irreversible; callers are responsible for user
    /// confirmation before issuing this request.
    pub async fn clear_logs(&self) -> Result<(), Error> {
        self.delete("api/logs").await
    }

    // ── Catalogs ─────────────────────────────────────────────────────

    /// Known sensor families and sensor IDs (`GET /api/sensor-types`).
    pub async fn sensor_catalog(&self) -> Result<SensorCatalog, Error> {
        self.get("api/sensor-types").await
    }

    /// Attack kinds the gateway can simulate (`GET /api/attack-types`).
    pub async fn attack_types(&self) -> Result<Vec<AttackTypeInfo>, Error> {
        let resp: AttackTypesResponse = self.get("api/attack-types").await?;
        Ok(resp.attack_types)
    }

    // ── Sensor readings ──────────────────────────────────────────────

    /// Latest readings for one sensor family (`GET /api/{family}`).
    pub async fn readings(&self, family: &str) -> Result<Vec<SensorReading>, Error> {
        self.get(&format!("api/{family}")).await
    }

    /// Rolling averages across all sensors (`GET /api/averages`).
    pub async fn averages(&self) -> Result<std::collections::BTreeMap<String, f64>, Error> {
        self.get("api/averages").await
    }

    // ── Attack simulation ────────────────────────────────────────────

    /// Post a simulated attack payload to its gateway endpoint.
    ///
    /// The payload is attack-specific opaque JSON; the response is
    /// alert-shaped and suitable for audit-log ingestion.
    pub async fn simulate(
        &self,
        target: SimulationTarget,
        payload: &serde_json::Value,
    ) -> Result<RawAlert, Error> {
        self.post(target.path(), payload).await
    }

    // ── SHAP explanations ────────────────────────────────────────────

    /// Request a SHAP explanation for a feature vector (`POST /api/explain`).
    pub async fn explain(&self, features: &serde_json::Value) -> Result<ShapExplanation, Error> {
        self.post("api/explain", features).await
    }

    // ── Auth & admin ─────────────────────────────────────────────────

    /// Exchange credentials for a bearer token (`POST /api/login`).
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, Error> {
        self.post("api/login", &LoginRequest { username, password })
            .await
    }

    /// List gateway user accounts (`GET /api/admin/users`).
    pub async fn list_users(&self) -> Result<Vec<UserAccount>, Error> {
        let resp: UsersResponse = self.get("api/admin/users").await?;
        Ok(resp.users)
    }

    /// Create a gateway user account (`POST /api/admin/users`).
    pub async fn create_user(&self, user: &UserAccount) -> Result<UserAccount, Error> {
        self.post("api/admin/users", user).await
    }

    /// Delete a gateway user account (`DELETE /api/admin/users/{username}`).
    pub async fn delete_user(&self, username: &str) -> Result<(), Error> {
        self.delete(&format!("api/admin/users/{username}")).await
    }
}

/// Truncate a body to at most `max_bytes`, never splitting a UTF-8
/// character.
fn body_preview(body: &str, max_bytes: usize) -> &str {
    if body.len() <= max_bytes {
        return body;
    }
    let mut cut = max_bytes;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    &body[..cut]
}
