//! GitHubStore - DocumentStore over the GitHub REST contents API.
//!
//! Requires the `github` feature (on by default).
//!
//! ## Endpoints
//!
//! - `GET /repos/{owner}/{name}` for access checks.
//! - `GET /repos/{owner}/{name}/contents/{path}?ref={branch}` for files and
//!   directory listings. File content arrives base64 encoded.
//! - `PUT /repos/{owner}/{name}/contents/{path}` with
//!   `{ message, content, sha?, branch }`. Omitting `sha` creates the file.
//! - `GET /repos/{owner}/{name}/commits?sha={branch}&per_page={n}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::{
    ChangeRecord, Document, DocumentStore, DirectoryEntry, EntryKind, StoreError, VersionTag,
};
use crate::config::{ClientConfig, Credentials};

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const MAX_PER_PAGE: usize = 100;

/// Document store backed by a GitHub repository branch.
///
/// Every successful write or create is a commit on the configured branch.
#[derive(Clone)]
pub struct GitHubStore {
    client: Client,
    credentials: Credentials,
    config: ClientConfig,
}

#[derive(Deserialize)]
struct ContentsFile {
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(rename = "type")]
    kind: EntryKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    File(ContentsFile),
    Listing(Vec<ContentsEntry>),
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Deserialize)]
struct CommitItem {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
    #[serde(default)]
    author: Option<CommitAuthor>,
}

#[derive(Deserialize)]
struct CommitAuthor {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
}

impl GitHubStore {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn repo_url<'s, I>(&self, segments: I) -> Result<Url, StoreError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| StoreError::Transient(format!("invalid api base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transient("api base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["repos", self.credentials.owner(), self.credentials.name()])
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, StoreError> {
        let segments = std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty()));
        self.repo_url(segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.credentials.token())
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn get_contents(&self, path: &str) -> Result<ContentsResponse, StoreError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut()
            .append_pair("ref", self.credentials.branch());

        tracing::debug!(path, "fetching contents");
        let response = self.request(Method::GET, url).send().await?;
        let response = check(response, path, None).await?;
        Ok(response.json().await?)
    }

    async fn put_contents(
        &self,
        path: &str,
        content: &[u8],
        version: Option<&VersionTag>,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        let url = self.contents_url(path)?;
        let body = PutContents {
            message,
            content: STANDARD.encode(content),
            sha: version.map(VersionTag::as_str),
            branch: self.credentials.branch(),
        };

        tracing::debug!(path, version = ?version.map(VersionTag::as_str), "putting contents");
        let response = self.request(Method::PUT, url).json(&body).send().await?;
        let response = check(response, path, version).await?;
        let put: PutResponse = response.json().await?;
        tracing::info!(path, version = %put.content.sha, message, "committed");
        Ok(VersionTag::new(put.content.sha))
    }
}

impl DocumentStore for GitHubStore {
    async fn fetch_document(&self, path: &str) -> Result<Document, StoreError> {
        let file = match self.get_contents(path).await? {
            ContentsResponse::File(file) => file,
            ContentsResponse::Listing(_) => {
                return Err(StoreError::Transient(format!("{} is a directory", path)))
            }
        };

        if file.kind != EntryKind::File {
            return Err(StoreError::Transient(format!("{} is not a file", path)));
        }

        let content = match (file.encoding.as_deref(), file.content) {
            (Some("base64"), Some(encoded)) => decode_base64(&encoded)?,
            (_, _) => {
                return Err(StoreError::Transient(format!(
                    "{} has no inline content (too large for the contents API)",
                    path
                )))
            }
        };

        Ok(Document {
            path: file.path,
            content,
            version: VersionTag::new(file.sha),
        })
    }

    async fn write_document(
        &self,
        path: &str,
        content: &[u8],
        version: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        self.put_contents(path, content, Some(version), message).await
    }

    async fn create_document(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        self.put_contents(path, content, None, message).await
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, StoreError> {
        match self.get_contents(path).await? {
            ContentsResponse::Listing(entries) => Ok(entries
                .into_iter()
                .map(|entry| DirectoryEntry {
                    name: entry.name,
                    path: entry.path,
                    kind: entry.kind,
                    size: entry.size,
                    version: VersionTag::new(entry.sha),
                })
                .collect()),
            ContentsResponse::File(_) => {
                Err(StoreError::Transient(format!("{} is not a directory", path)))
            }
        }
    }

    async fn list_recent_changes(&self, limit: usize) -> Result<Vec<ChangeRecord>, StoreError> {
        let mut url = self.repo_url(["commits"])?;
        url.query_pairs_mut()
            .append_pair("sha", self.credentials.branch())
            .append_pair("per_page", &limit.clamp(1, MAX_PER_PAGE).to_string());

        let response = self.request(Method::GET, url).send().await?;
        let response = check(response, "commits", None).await?;
        let commits: Vec<CommitItem> = response.json().await?;

        Ok(commits
            .into_iter()
            .take(limit)
            .map(|item| {
                let (author, timestamp) = match item.commit.author {
                    Some(author) => (author.name, author.date),
                    None => (String::new(), DateTime::<Utc>::default()),
                };
                ChangeRecord {
                    id: item.sha,
                    message: item.commit.message,
                    author,
                    timestamp,
                }
            })
            .collect())
    }

    async fn verify_access(&self) -> Result<(), StoreError> {
        let url = self.repo_url(std::iter::empty())?;
        let response = self.request(Method::GET, url).send().await?;
        match check(response, &self.credentials.repository(), None).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { path }) => Err(StoreError::Unauthorized(format!(
                "invalid token or repository: {}",
                path
            ))),
            Err(err) => Err(err),
        }
    }
}

/// Map a non-success response onto the store error taxonomy.
async fn check(
    response: Response,
    path: &str,
    expected: Option<&VersionTag>,
) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiMessage>()
        .await
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| status.to_string());

    let err = classify(status, message, path, expected);
    if let StoreError::VersionConflict { .. } = &err {
        tracing::warn!(path, status = %status, "version conflict");
    }
    Err(err)
}

fn classify(
    status: StatusCode,
    message: String,
    path: &str,
    expected: Option<&VersionTag>,
) -> StoreError {
    let conflict = status == StatusCode::CONFLICT
        || (status == StatusCode::UNPROCESSABLE_ENTITY && message.contains("sha"));
    if conflict {
        return StoreError::VersionConflict {
            path: path.to_string(),
            expected: expected.cloned(),
            actual: None,
        };
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::NOT_FOUND => StoreError::NotFound {
            path: path.to_string(),
        },
        _ => StoreError::Transient(format!("{}: {}", status, message)),
    }
}

/// Decode the contents API's base64, which is wrapped at 60 columns.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Transient(format!("invalid base64 content: {}", e)))
}
