use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::Fantasy402Config;
use crate::dto::{
    AccountDto, AccountEnvelope, AgentDto, AgentEnvelope, AgentsEnvelope, AuthResponse,
    BalanceEnvelope, BalanceUpdateDto, BalanceUpdateRequest, BetDto, BetEnvelope, BetQuery,
    BetsEnvelope,
    CancelBetRequest, EventOddsDto, EventsEnvelope, OddsEnvelope, PlaceBetRequest, SportEventDto,
    SportEventQuery,
};
use crate::error::AdapterError;
use crate::retry::{RetryConfig, RetryPolicy};

const AUTH_ENDPOINT: &str = "System/authenticateCustomer";

/// Authenticated session with the remote system. Overwritten on
/// re-authentication, cleared on disconnect.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub customer_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        !self.token.is_empty() && self.expires_at > Utc::now()
    }
}

/// Protocol adapter for the Fantasy402 wagering API. Owns the session token
/// and executes resilient HTTP calls; does shape translation only, no
/// business logic.
///
/// The session is the only cross-call shared mutable state. Concurrent
/// callers racing through an expired session each re-authenticate; the last
/// token written wins, which is redundant but not corrupting.
pub struct Fantasy402Adapter {
    client: Client,
    config: Arc<Fantasy402Config>,
    session: RwLock<Option<Session>>,
    retry_policy: RetryPolicy,
}

impl Fantasy402Adapter {
    pub fn new(config: Fantasy402Config) -> Self {
        let retry_policy = RetryPolicy::new(RetryConfig::adapter(config.retry_attempts));
        Self::with_retry_policy(config, retry_policy)
    }

    /// Constructor with an explicit retry policy, used by tests to shrink
    /// backoff delays.
    pub fn with_retry_policy(config: Fantasy402Config, retry_policy: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            session: RwLock::new(None),
            retry_policy,
        }
    }

    pub fn config(&self) -> &Fantasy402Config {
        &self.config
    }

    /// Current session token, if an unexpired session exists.
    pub async fn session_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .filter(|session| session.is_valid())
            .map(|session| session.token.clone())
    }

    /// Drops the current session. The next authenticated call will log in
    /// again.
    pub async fn disconnect(&self) {
        *self.session.write().await = None;
    }

    /// Submits credentials (uppercase-normalized) as a form-encoded POST and
    /// extracts the session token from the JSON body (`code` or `token`
    /// field) or, failing that, the raw response text.
    pub async fn authenticate(&self) -> Result<Session, AdapterError> {
        let customer_id = self.config.customer_id.to_uppercase();
        let password = self.config.password.to_uppercase();
        let url = self.endpoint_url(AUTH_ENDPOINT);

        debug!(customer_id = %customer_id, "authenticating with Fantasy402");

        let form = [
            ("customerID", customer_id.as_str()),
            ("password", password.as_str()),
            ("operation", "authenticateCustomer"),
        ];

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout())
            .form(&form)
            .send()
            .await
            .map_err(|err| classify_send_error(AUTH_ENDPOINT, err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| classify_send_error(AUTH_ENDPOINT, err))?;

        if !status.is_success() {
            return Err(AdapterError::Authentication(format!(
                "authentication endpoint returned status {status}"
            )));
        }

        let token = match serde_json::from_str::<AuthResponse>(&body) {
            Ok(parsed) => parsed.into_token(),
            Err(_) => {
                // Some deployments answer with the bare token as text.
                let raw = body.trim().trim_matches('"');
                (!raw.is_empty()).then(|| raw.to_string())
            }
        };

        let token = token.ok_or_else(|| {
            AdapterError::Authentication("no authentication token received".to_string())
        })?;

        let session = Session {
            token,
            customer_id,
            expires_at: Utc::now() + self.config.session_ttl(),
        };
        *self.session.write().await = Some(session.clone());
        debug!(expires_at = %session.expires_at, "Fantasy402 session established");
        Ok(session)
    }

    /// Returns a token for the current session, transparently
    /// re-authenticating if the session is missing or expired. There is no
    /// single-flight guard; concurrent refreshes are tolerated.
    async fn ensure_valid_session(&self) -> Result<String, AdapterError> {
        if let Some(session) = self.session.read().await.as_ref() {
            if session.is_valid() {
                return Ok(session.token.clone());
            }
        }
        let session = self.authenticate().await?;
        Ok(session.token)
    }

    /// One HTTP attempt: session check, bearer-authenticated call with a hard
    /// timeout, envelope-agnostic JSON decode. 404 maps to the typed
    /// `NotFound` variant and is never retried.
    async fn execute_once<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(&'static str, String)]>,
        body: Option<&Value>,
    ) -> Result<T, AdapterError> {
        let token = self.ensure_valid_session().await?;
        let url = self.endpoint_url(endpoint);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(token)
            .timeout(self.config.request_timeout());
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| classify_send_error(endpoint, err))?;

        let status = response.status();
        debug!(endpoint, %status, "Fantasy402 response");

        if status == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound {
                resource: endpoint.to_string(),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            // Stale or revoked token: clear it so the retry re-authenticates.
            self.disconnect().await;
            return Err(AdapterError::Authentication(format!(
                "session rejected by {endpoint}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Http {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|err| classify_send_error(endpoint, err))?;
        serde_json::from_str(&text).map_err(|err| AdapterError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    }

    /// Executes a call with the adapter's retry discipline: transient
    /// failures retry with exponential backoff, sequentially, until attempts
    /// are exhausted; the terminal error names the endpoint and attempt
    /// count.
    async fn make_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(&'static str, String)]>,
        body: Option<&Value>,
    ) -> Result<T, AdapterError> {
        let result = self
            .retry_policy
            .retry_if(
                || self.execute_once::<T>(method.clone(), endpoint, query, body),
                AdapterError::is_retryable,
            )
            .await;

        result.map_err(|err| {
            if err.is_retryable() {
                warn!(endpoint, error = %err, "Fantasy402 request exhausted retries");
                AdapterError::Exhausted {
                    endpoint: endpoint.to_string(),
                    attempts: self.retry_policy.max_attempts(),
                    message: err.to_string(),
                }
            } else {
                err
            }
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    // ========================================================================
    // Domain-facing endpoint wrappers: shape translation only
    // ========================================================================

    pub async fn get_sport_events(
        &self,
        query: &SportEventQuery,
    ) -> Result<Vec<SportEventDto>, AdapterError> {
        let params = query.to_params();
        let envelope: EventsEnvelope = self
            .make_request(Method::GET, "sports/events", Some(&params), None)
            .await?;
        Ok(envelope.events)
    }

    pub async fn get_event_odds(&self, event_id: &str) -> Result<Vec<EventOddsDto>, AdapterError> {
        let endpoint = format!("sports/events/{event_id}/odds");
        let envelope: OddsEnvelope = self
            .make_request(Method::GET, &endpoint, None, None)
            .await?;
        Ok(envelope.odds)
    }

    pub async fn get_agents(&self) -> Result<Vec<AgentDto>, AdapterError> {
        let envelope: AgentsEnvelope =
            self.make_request(Method::GET, "agents", None, None).await?;
        Ok(envelope.agents)
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<AgentDto, AdapterError> {
        let endpoint = format!("agents/{agent_id}");
        let envelope: AgentEnvelope = self
            .make_request(Method::GET, &endpoint, None, None)
            .await?;
        Ok(envelope.agent)
    }

    pub async fn get_agent_account(&self, agent_id: &str) -> Result<AccountDto, AdapterError> {
        let endpoint = format!("agents/{agent_id}/account");
        let envelope: AccountEnvelope = self
            .make_request(Method::GET, &endpoint, None, None)
            .await?;
        Ok(envelope.account)
    }

    pub async fn get_bets(&self, query: &BetQuery) -> Result<Vec<BetDto>, AdapterError> {
        let params = query.to_params();
        let envelope: BetsEnvelope = self
            .make_request(Method::GET, "bets", Some(&params), None)
            .await?;
        Ok(envelope.bets)
    }

    pub async fn get_bet(&self, bet_id: &str) -> Result<BetDto, AdapterError> {
        let endpoint = format!("bets/{bet_id}");
        let envelope: BetEnvelope = self
            .make_request(Method::GET, &endpoint, None, None)
            .await?;
        Ok(envelope.bet)
    }

    pub async fn place_bet(&self, request: &PlaceBetRequest) -> Result<BetDto, AdapterError> {
        let body = serde_json::to_value(request).map_err(|err| AdapterError::Decode {
            endpoint: "bets".to_string(),
            message: err.to_string(),
        })?;
        let envelope: BetEnvelope = self
            .make_request(Method::POST, "bets", None, Some(&body))
            .await?;
        Ok(envelope.bet)
    }

    pub async fn cancel_bet(
        &self,
        bet_id: &str,
        reason: Option<&str>,
    ) -> Result<BetDto, AdapterError> {
        let endpoint = format!("bets/{bet_id}/cancel");
        let body = serde_json::to_value(CancelBetRequest {
            reason: reason.map(str::to_string),
        })
        .map_err(|err| AdapterError::Decode {
            endpoint: endpoint.clone(),
            message: err.to_string(),
        })?;
        let envelope: BetEnvelope = self
            .make_request(Method::POST, &endpoint, None, Some(&body))
            .await?;
        Ok(envelope.bet)
    }

    pub async fn update_balance(
        &self,
        agent_id: &str,
        request: &BalanceUpdateRequest,
    ) -> Result<BalanceUpdateDto, AdapterError> {
        let endpoint = format!("agents/{agent_id}/balance");
        let body = serde_json::to_value(request).map_err(|err| AdapterError::Decode {
            endpoint: endpoint.clone(),
            message: err.to_string(),
        })?;
        let envelope: BalanceEnvelope = self
            .make_request(Method::POST, &endpoint, None, Some(&body))
            .await?;
        Ok(envelope.balance)
    }

    /// Lightweight ping used by the gateway's health check. Single attempt,
    /// no retries: health checks must fail fast.
    pub async fn health_check(&self) -> Result<(), AdapterError> {
        self.execute_once::<Value>(Method::GET, "health", None, None)
            .await?;
        Ok(())
    }
}

fn classify_send_error(endpoint: &str, err: reqwest::Error) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        AdapterError::Network {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}
