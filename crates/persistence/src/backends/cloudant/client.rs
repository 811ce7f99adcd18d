//! HTTP client for Cloudant / CouchDB.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::auth::{IamToken, IamTokenResponse, token_request_form};
use crate::config::{Credentials, StoreConfig};
use crate::core::{CollectionHandle, CollectionInfo, DocumentStore, WriteReceipt};
use crate::error::StoreError;
use crate::types::{Document, Selector};

const BACKEND_NAME: &str = "cloudant";

/// Page size used when draining `_find` results.
const FIND_PAGE_SIZE: usize = 200;

/// Cloudant store client authenticating with an IAM API key.
///
/// One client can serve any number of collections; bearer tokens are cached
/// and refreshed shortly before they expire.
#[derive(Debug)]
pub struct CloudantClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
    iam_token_url: String,
    token: RwLock<Option<IamToken>>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Default, Deserialize)]
struct IamErrorBody {
    #[serde(default, rename = "errorMessage")]
    error_message: String,
}

#[derive(Debug, Serialize)]
struct FindRequest<'a> {
    selector: &'a Selector,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bookmark: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    docs: Vec<Document>,
    #[serde(default)]
    bookmark: Option<String>,
    #[serde(default)]
    warning: Option<String>,
}

impl CloudantClient {
    /// Creates a client from configuration. No request is made until
    /// [`DocumentStore::authenticate`] is called.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = config.base_url();
        let base_url = Url::parse(&base_url).map_err(|e| StoreError::BadRequest {
            reason: format!("invalid store URL '{}': {}", base_url, e),
        })?;

        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url,
            credentials: config.credentials(),
            iam_token_url: config.iam_token_url.clone(),
            token: RwLock::new(None),
        })
    }

    /// Returns the store's base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the account this client authenticates as.
    pub fn account(&self) -> &str {
        &self.credentials.account
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::BadRequest {
                reason: format!("store URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        let cached = self.token.read().clone();
        match cached.filter(IamToken::is_fresh) {
            Some(token) => Ok(token.access_token().to_string()),
            None => self.refresh_token().await,
        }
    }

    async fn refresh_token(&self) -> Result<String, StoreError> {
        debug!(account = %self.credentials.account, "Requesting IAM access token");

        let response = self
            .http
            .post(&self.iam_token_url)
            .header(header::ACCEPT, "application/json")
            .form(&token_request_form(&self.credentials.api_key))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_iam_error(status.as_u16(), &body));
        }

        let token: IamToken = read_json::<IamTokenResponse>(response).await?.into();
        let access_token = token.access_token().to_string();
        *self.token.write() = Some(token);
        Ok(access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.bearer_token().await?;
        let response = request
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(map_error_response(status, &body))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::InvalidResponse {
            message: format!("failed to decode store response: {}", e),
        })
}

fn transport_error(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable {
        message: err.to_string(),
    }
}

/// Maps a non-success store response to a [`StoreError`].
pub(crate) fn map_error_response(status: u16, body: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let reason = if parsed.reason.is_empty() {
        body.trim().to_string()
    } else {
        parsed.reason
    };
    StoreError::from_status(status, parsed.error, reason)
}

/// Maps a failed IAM token exchange. Any refusal counts as unauthorized.
pub(crate) fn map_iam_error(status: u16, body: &str) -> StoreError {
    let parsed: IamErrorBody = serde_json::from_str(body).unwrap_or_default();
    let reason = if parsed.error_message.is_empty() {
        format!("IAM token request failed: {}", body.trim())
    } else {
        parsed.error_message
    };

    if status >= 500 {
        StoreError::Unavailable { message: reason }
    } else {
        StoreError::Unauthorized { status, reason }
    }
}

#[async_trait]
impl DocumentStore for CloudantClient {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn authenticate(&self) -> Result<(), StoreError> {
        self.refresh_token().await.map(|_| ())
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let url = self.url_for(&["_all_dbs"])?;
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let url = self.url_for(&[name])?;
        self.send(self.http.put(url)).await?;
        Ok(())
    }

    async fn find(
        &self,
        handle: &CollectionHandle,
        selector: &Selector,
    ) -> Result<Vec<Document>, StoreError> {
        let url = self.url_for(&[handle.name(), "_find"])?;
        let mut documents = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let body = FindRequest {
                selector,
                limit: FIND_PAGE_SIZE,
                bookmark: bookmark.as_deref(),
            };
            let response = self.send(self.http.post(url.clone()).json(&body)).await?;
            let page: FindResponse = read_json(response).await?;

            if let Some(warning) = &page.warning {
                debug!(collection = %handle, warning = %warning, "Query warning");
            }

            let page_len = page.docs.len();
            documents.extend(page.docs);

            if page_len < FIND_PAGE_SIZE {
                break;
            }
            match page.bookmark {
                Some(next) if bookmark.as_deref() != Some(next.as_str()) => bookmark = Some(next),
                _ => {
                    warn!(collection = %handle, "Query returned a full page without a new bookmark");
                    break;
                }
            }
        }

        Ok(documents)
    }

    async fn insert(
        &self,
        handle: &CollectionHandle,
        document: Document,
    ) -> Result<WriteReceipt, StoreError> {
        let url = self.url_for(&[handle.name()])?;
        let response = self.send(self.http.post(url).json(&document)).await?;
        read_json(response).await
    }

    async fn get(&self, handle: &CollectionHandle, id: &str) -> Result<Document, StoreError> {
        let url = self.url_for(&[handle.name(), id])?;
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }

    async fn destroy(
        &self,
        handle: &CollectionHandle,
        id: &str,
        revision: &str,
    ) -> Result<WriteReceipt, StoreError> {
        let url = self.url_for(&[handle.name(), id])?;
        let request = self.http.delete(url).query(&[("rev", revision)]);
        let response = self.send(request).await?;
        read_json(response).await
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, StoreError> {
        let url = self.url_for(&[name])?;
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }
}
