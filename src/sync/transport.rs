use super::{SavePayload, SaveResponse, SyncError, SyncResult};

const CSRF_HEADER: &str = "X-CSRFToken";

/// Performs one save round-trip. Runs on a worker thread.
pub trait SaveTransport: Send + Sync {
    fn save(&self, payload: &SavePayload) -> SyncResult<SaveResponse>;
}

/// JSON-over-HTTP transport: `POST <endpoint>` with the anti-forgery token header.
#[derive(Clone)]
pub struct HttpSaveTransport {
    agent: ureq::Agent,
    endpoint: String,
    csrf_token: Option<String>,
}

impl std::fmt::Debug for HttpSaveTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSaveTransport")
            .field("endpoint", &self.endpoint)
            .field("has_csrf_token", &self.csrf_token.is_some())
            .finish()
    }
}

impl HttpSaveTransport {
    pub fn new(endpoint: impl Into<String>, csrf_token: Option<String>) -> SyncResult<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(SyncError::MissingEndpoint);
        }
        Ok(Self {
            agent: ureq::AgentBuilder::new().build(),
            endpoint,
            csrf_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SaveTransport for HttpSaveTransport {
    fn save(&self, payload: &SavePayload) -> SyncResult<SaveResponse> {
        let mut request = self.agent.post(&self.endpoint);
        if let Some(token) = self.csrf_token.as_deref() {
            request = request.set(CSRF_HEADER, token);
        }

        match request.send_json(payload) {
            Ok(response) => response
                .into_json::<SaveResponse>()
                .map_err(|err| SyncError::InvalidResponse {
                    message: err.to_string(),
                }),
            // Error statuses may still carry an application-level `{status, message}` body.
            Err(ureq::Error::Status(code, response)) => response
                .into_json::<SaveResponse>()
                .map_err(|_| SyncError::Transport {
                    message: format!("server responded with HTTP {code}"),
                }),
            Err(err) => Err(SyncError::Transport {
                message: err.to_string(),
            }),
        }
    }
}
