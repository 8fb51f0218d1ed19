//! Resource client for the novel content service.
//!
//! Maps each logical operation onto an HTTP method and path under the
//! configured base URL, and hands out [`StreamEventReader`]s for the
//! streaming assistant endpoint.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientResult};
use crate::models::{AiRequest, Chapter, Conversation, Message, Novel};
use crate::sse::StreamEventReader;
use crate::traits::{Headers, HttpClient, Response};

/// HTTP method of a resource call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Client for the novel content service.
///
/// # Example
///
/// ```ignore
/// use novelforge::client::NovelForgeClient;
/// use novelforge::config::ClientConfig;
/// use novelforge::models::Novel;
///
/// let client = NovelForgeClient::new(ClientConfig::from_env())?;
/// let novel = client.create_novel(&Novel::new("Ashes")).await?;
/// let chapters = client.list_chapters(novel.id.unwrap_or_default()).await?;
/// ```
pub struct NovelForgeClient<C: HttpClient + ?Sized = ReqwestHttpClient> {
    http: Arc<C>,
    config: ClientConfig,
    headers: Headers,
}

impl NovelForgeClient<ReqwestHttpClient> {
    /// Create a client backed by reqwest.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = match config.timeout {
            Some(timeout) => ReqwestHttpClient::with_timeout(timeout)?,
            None => ReqwestHttpClient::new(),
        };
        Ok(Self::with_http(Arc::new(http), config))
    }
}

impl<C: HttpClient + ?Sized> Clone for NovelForgeClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            config: self.config.clone(),
            headers: self.headers.clone(),
        }
    }
}

impl<C: HttpClient + ?Sized + 'static> NovelForgeClient<C> {
    /// Create a client over any [`HttpClient`].
    pub fn with_http(http: Arc<C>, config: ClientConfig) -> Self {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            http,
            config,
            headers,
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Reader for the streaming assistant endpoint.
    pub fn stream_reader(&self) -> StreamEventReader<C> {
        let mut reader =
            StreamEventReader::new(Arc::clone(&self.http), self.config.url(&self.config.stream_path));
        for (name, value) in &self.headers {
            if name != "Accept" {
                reader = reader.with_header(name.clone(), value.clone());
            }
        }
        reader
    }

    /// Issue a raw request and return the response, whatever its status.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ClientResult<Response> {
        let url = self.config.url(path);
        debug!(method = method.as_str(), url = %url, "request");
        let body = match body {
            Some(value) => serde_json::to_string(value)?,
            None => String::new(),
        };
        let response = match method {
            Method::Get => self.http.get(&url, &self.headers).await?,
            Method::Post => self.http.post(&url, &body, &self.headers).await?,
            Method::Put => self.http.put(&url, &body, &self.headers).await?,
            Method::Delete => self.http.delete(&url, &self.headers).await?,
        };
        Ok(response)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = body.map(serde_json::to_value).transpose()?;
        let response = self.request(method, path, value.as_ref()).await?;
        let response = check_status(path, response)?;
        Ok(response.json()?)
    }

    async fn send_empty(&self, method: Method, path: &str) -> ClientResult<()> {
        let response = self.request(method, path, None).await?;
        check_status(path, response)?;
        Ok(())
    }

    // ============= Novels =============

    pub async fn list_novels(&self) -> ClientResult<Vec<Novel>> {
        self.send::<(), _>(Method::Get, "/novels", None).await
    }

    pub async fn get_novel(&self, id: i64) -> ClientResult<Novel> {
        self.send::<(), _>(Method::Get, &format!("/novels/{}", id), None)
            .await
    }

    pub async fn create_novel(&self, novel: &Novel) -> ClientResult<Novel> {
        self.send(Method::Post, "/novels", Some(novel)).await
    }

    pub async fn update_novel(&self, id: i64, novel: &Novel) -> ClientResult<Novel> {
        self.send(Method::Put, &format!("/novels/{}", id), Some(novel))
            .await
    }

    pub async fn delete_novel(&self, id: i64) -> ClientResult<()> {
        self.send_empty(Method::Delete, &format!("/novels/{}", id))
            .await
    }

    // ============= Chapters =============

    pub async fn list_chapters(&self, novel_id: i64) -> ClientResult<Vec<Chapter>> {
        self.send::<(), _>(Method::Get, &format!("/novels/{}/chapters", novel_id), None)
            .await
    }

    pub async fn get_chapter(&self, id: i64) -> ClientResult<Chapter> {
        self.send::<(), _>(Method::Get, &format!("/chapters/{}", id), None)
            .await
    }

    pub async fn create_chapter(&self, novel_id: i64, chapter: &Chapter) -> ClientResult<Chapter> {
        self.send(
            Method::Post,
            &format!("/novels/{}/chapters", novel_id),
            Some(chapter),
        )
        .await
    }

    pub async fn update_chapter(&self, id: i64, chapter: &Chapter) -> ClientResult<Chapter> {
        self.send(Method::Put, &format!("/chapters/{}", id), Some(chapter))
            .await
    }

    pub async fn delete_chapter(&self, id: i64) -> ClientResult<()> {
        self.send_empty(Method::Delete, &format!("/chapters/{}", id))
            .await
    }

    // ============= Conversations =============

    pub async fn list_conversations(&self) -> ClientResult<Vec<Conversation>> {
        self.send::<(), _>(Method::Get, "/conversations", None).await
    }

    pub async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> ClientResult<Conversation> {
        self.send(Method::Post, "/conversations", Some(conversation))
            .await
    }

    pub async fn update_conversation(
        &self,
        id: i64,
        conversation: &Conversation,
    ) -> ClientResult<Conversation> {
        self.send(
            Method::Put,
            &format!("/conversations/{}", id),
            Some(conversation),
        )
        .await
    }

    pub async fn delete_conversation(&self, id: i64) -> ClientResult<()> {
        self.send_empty(Method::Delete, &format!("/conversations/{}", id))
            .await
    }

    pub async fn list_messages(&self, conversation_id: i64) -> ClientResult<Vec<Message>> {
        self.send::<(), _>(
            Method::Get,
            &format!("/conversations/{}/messages", conversation_id),
            None,
        )
        .await
    }

    // ============= Assistant =============

    /// Single-shot assistant call. Returns the reply text.
    pub async fn chat(&self, request: &AiRequest) -> ClientResult<String> {
        let path = self.config.chat_path.clone();
        let value = serde_json::to_value(request)?;
        let response = self.request(Method::Post, &path, Some(&value)).await?;
        let response = check_status(&path, response)?;
        Ok(response.text()?)
    }
}

/// Turn a non-success response into an error, reading the body as the message.
fn check_status(path: &str, response: Response) -> ClientResult<Response> {
    if response.is_success() {
        return Ok(response);
    }
    if response.status == 404 {
        return Err(ApiError::NotFound(path.to_string()));
    }
    let message = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ApiError::ServerError {
        status: response.status,
        message,
    })
}
