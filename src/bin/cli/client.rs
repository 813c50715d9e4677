use chrono::NaiveDate;
use recall::dto::{QueueQueryDto, RateItemDto, RegisterReviewItemDto, UpdateStatusDto};
use recall::handlers::SessionRatingResponse;
use recall::models::{ItemStatus, ReviewItem, ReviewSummaryCounts, SourceType};
use recall::scheduler::RatingPreview;
use recall::session::SessionView;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;

    /// Checks the status, then decodes the JSON body
    async fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }

    async fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        self.check().await?.json().await.map_err(ClientError::Request)
    }
}

/// HTTP client wrapper for one learner's view of the Recall server
pub struct RecallClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The learner every request is scoped to
    owner_id: String,
    /// The underlying HTTP client
    client: Client,
}

impl RecallClient {
    /// Creates a new RecallClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the Recall server
    /// * `owner_id` - The learner to act as
    pub fn new(base_url: String, owner_id: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            owner_id,
            client: Client::new(),
        }
    }

    fn learner_url(&self, path: &str) -> String {
        format!("{}/learners/{}/{}", self.base_url, self.owner_id, path)
    }

    // ── Review item endpoints ────────────────────────────────────────

    /// Registers a wrong answer or flashcard; returns the existing item if already registered
    pub async fn register_item(
        &self,
        source_type: SourceType,
        source_id: String,
        course_id: Option<String>,
    ) -> Result<ReviewItem, ClientError> {
        let dto = RegisterReviewItemDto {
            course_id,
            source_type: source_type.to_string(),
            source_id,
        };
        self.client.post(self.learner_url("review_items")).json(&dto)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Gets a specific review item by ID
    pub async fn get_item(&self, id: &str) -> Result<ReviewItem, ClientError> {
        self.client.get(self.learner_url(&format!("review_items/{}", id)))
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Lists review items, optionally by status
    pub async fn list_items(&self, status: Option<ItemStatus>) -> Result<Vec<ReviewItem>, ClientError> {
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }

        self.client.get(self.learner_url("review_items")).query(&params)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Suspends or resumes a review item
    pub async fn set_item_status(&self, id: &str, status: ItemStatus) -> Result<ReviewItem, ClientError> {
        let dto = UpdateStatusDto { status: status.to_string() };
        self.client.put(self.learner_url(&format!("review_items/{}/status", id))).json(&dto)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Rates a review item with the four-outcome vocabulary
    pub async fn rate_item(&self, id: &str, rating: String) -> Result<ReviewItem, ClientError> {
        let dto = RateItemDto { rating };
        self.client.post(self.learner_url(&format!("review_items/{}/ratings", id))).json(&dto)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Rates a review item with the three-outcome dashboard vocabulary
    pub async fn rate_item_legacy(&self, id: &str, rating: String) -> Result<ReviewItem, ClientError> {
        let dto = RateItemDto { rating };
        self.client.post(self.learner_url(&format!("review_items/{}/legacy_ratings", id))).json(&dto)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Previews where each rating would send an item
    pub async fn preview_item(&self, id: &str, as_of: Option<NaiveDate>) -> Result<Vec<RatingPreview>, ClientError> {
        let params = as_of_params(as_of);
        self.client.get(self.learner_url(&format!("review_items/{}/next_reviews", id))).query(&params)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    // ── Queue endpoints ──────────────────────────────────────────────

    /// Builds the learner's due queue
    pub async fn get_queue(&self, query: &QueueQueryDto) -> Result<Vec<ReviewItem>, ClientError> {
        let mut params = as_of_params(query.as_of);
        if let Some(ref filter) = query.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        self.client.get(self.learner_url("queue")).query(&params)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Gets the dashboard's due-state counts
    pub async fn get_counts(&self, as_of: Option<NaiveDate>) -> Result<ReviewSummaryCounts, ClientError> {
        let params = as_of_params(as_of);
        self.client.get(self.learner_url("summary_counts")).query(&params)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    // ── Session endpoints ────────────────────────────────────────────

    /// Starts a review session
    pub async fn start_session(&self, query: &QueueQueryDto) -> Result<SessionView, ClientError> {
        self.client.post(self.learner_url("sessions")).json(query)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Rates the current item of a session
    pub async fn rate_session_item(&self, session_id: &str, rating: String) -> Result<SessionRatingResponse, ClientError> {
        let dto = RateItemDto { rating };
        self.client.post(self.learner_url(&format!("sessions/{}/ratings", session_id))).json(&dto)
            .send().await.map_err(ClientError::Request)?
            .decode().await
    }

    /// Abandons a session
    pub async fn abandon_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.client.delete(self.learner_url(&format!("sessions/{}", session_id)))
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        Ok(())
    }
}

fn as_of_params(as_of: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    as_of.map(|date| vec![("as_of", date.to_string())]).unwrap_or_default()
}
