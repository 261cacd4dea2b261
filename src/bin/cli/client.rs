use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use yakcat::dto::{
    AdminStats, AdminUserView, AuthResponse, CreateItemDto, ItemDetail, ItemQueryDto, ItemSummary,
    LoginDto, MessageView, SendMessageDto, SuccessResponse, UpdateItemDto, UpdateRoleDto,
};
use yakcat::models::{Item, Message, SiteSettings, User};

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

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request(err)
    }
}

/// Pulls the `{"error": "..."}` message out of a failed response
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => format!("HTTP {}", status),
    };
    Err(ClientError::Server { status, message })
}

/// HTTP client for a YakCat server
///
/// Requests carry the session token as a bearer header once one is known,
/// either passed in up front or obtained through [`YakCatClient::login`].
pub struct YakCatClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl YakCatClient {
    /// Creates a client for `base_url`, optionally already authenticated
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = check(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.client.patch(self.url(path)).json(body)).await
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Logs in and keeps the returned token for later requests
    pub async fn login(&mut self, email: String, password: String) -> Result<AuthResponse, ClientError> {
        let session: AuthResponse = self.post("/auth/login", &LoginDto { email, password }).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.get("/auth/me").await
    }

    // ── Items ────────────────────────────────────────────────────────

    /// Lists available items, optionally filtered by search text and tag
    pub async fn list_items(&self, query: &ItemQueryDto) -> Result<Vec<ItemSummary>, ClientError> {
        self.send(self.client.get(self.url("/items")).query(query)).await
    }

    pub async fn get_item(&self, id: &str) -> Result<ItemDetail, ClientError> {
        self.get(&format!("/items/{}", id)).await
    }

    pub async fn get_item_by_slug(&self, slug: &str) -> Result<ItemDetail, ClientError> {
        self.get(&format!("/items/slug/{}", slug)).await
    }

    pub async fn create_item(&self, dto: &CreateItemDto) -> Result<ItemDetail, ClientError> {
        self.post("/items", dto).await
    }

    pub async fn update_item(&self, id: &str, dto: &UpdateItemDto) -> Result<Item, ClientError> {
        self.patch(&format!("/items/{}", id), dto).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<SuccessResponse, ClientError> {
        self.send(self.client.delete(self.url(&format!("/items/{}", id)))).await
    }

    pub async fn my_items(&self) -> Result<Vec<ItemSummary>, ClientError> {
        self.get("/my-items").await
    }

    // ── Messages ─────────────────────────────────────────────────────

    pub async fn inbox(&self) -> Result<Vec<MessageView>, ClientError> {
        self.get("/messages").await
    }

    pub async fn sent_messages(&self) -> Result<Vec<MessageView>, ClientError> {
        self.get("/messages/sent").await
    }

    pub async fn send_message(&self, dto: &SendMessageDto) -> Result<MessageView, ClientError> {
        self.post("/messages", dto).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<Message, ClientError> {
        self.send(self.client.patch(self.url(&format!("/messages/{}/read", id)))).await
    }

    // ── Administration ───────────────────────────────────────────────

    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.get("/admin/stats").await
    }

    pub async fn admin_users(&self) -> Result<Vec<AdminUserView>, ClientError> {
        self.get("/admin/users").await
    }

    pub async fn set_role(&self, user_id: &str, role: String) -> Result<User, ClientError> {
        self.patch(&format!("/admin/users/{}", user_id), &UpdateRoleDto { role }).await
    }

    pub async fn get_settings(&self) -> Result<SiteSettings, ClientError> {
        self.get("/admin/settings").await
    }

    /// Sends only the keys to change; the server merges them over the stored settings
    pub async fn update_settings(&self, changes: &serde_json::Value) -> Result<SiteSettings, ClientError> {
        self.post("/admin/settings", changes).await
    }
}
