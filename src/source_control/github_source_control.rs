//! GitHub REST implementation of [`SourceControl`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{Result, SourceControlError};
use super::source_control::SourceControl;
use super::types::{ChangeRecord, CommitChangeSet, ContentRef};

/// Default REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const CLIENT_USER_AGENT: &str = concat!("git2s3/", env!("CARGO_PKG_VERSION"));

/// Upper bound on commit file-list pages. GitHub lists at most 3000 files.
const MAX_COMMIT_PAGES: usize = 30;

/// Configuration for [`GithubSourceControl`].
#[derive(Debug, Clone)]
pub struct GithubSourceControlConfig {
    /// REST API root, e.g. `https://api.github.com` or a GitHub Enterprise URL.
    pub api_url: String,
    /// OAuth or personal access token.
    pub token: Option<String>,
}

impl GithubSourceControlConfig {
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for GithubSourceControlConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`SourceControl`] that talks to the GitHub REST API.
pub struct GithubSourceControl {
    client: Client,
    api_url: String,
}

impl GithubSourceControl {
    /// Create a client for the given configuration.
    pub fn new(config: GithubSourceControlConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| SourceControlError::Other(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SourceControlError::Other(format!("failed to build client: {}", e)))?;

        Ok(Self::with_client(client, config.api_url))
    }

    /// Create a source control client around an already configured reqwest client.
    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn commit_url(&self, owner: &str, repository: &str, sha: &str) -> String {
        format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_url, owner, repository, sha
        )
    }

    fn blob_url(&self, owner: &str, repository: &str, sha: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/blobs/{}",
            self.api_url, owner, repository, sha
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_page(url).await.map(|(value, _)| value)
    }

    /// Fetch one JSON page and the URL of the next one, if the response
    /// carries a `Link: <...>; rel="next"` header.
    async fn get_json_page<T: DeserializeOwned>(&self, url: &str) -> Result<(T, Option<String>)> {
        debug!(url, "source control request");
        let response = self.client.get(url).send().await.map_err(|e| {
            SourceControlError::Transport {
                url: url.to_string(),
                source: e,
            }
        })?;

        match response.status() {
            StatusCode::OK => {
                let next = next_page_url(response.headers());
                let value = response.json().await.map_err(|e| SourceControlError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
                Ok((value, next))
            }
            StatusCode::NOT_FOUND => Err(SourceControlError::NotFound(url.to_string())),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(SourceControlError::Http {
                    url: url.to_string(),
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// The `rel="next"` target of a `Link` header.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| param.trim().replace(' ', "") == "rel=\"next\"");
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: Option<String>,
    #[serde(default)]
    files: Vec<CommitFile>,
}

#[derive(Debug, Deserialize)]
struct CommitFile {
    filename: String,
    status: String,
    sha: Option<String>,
    previous_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// Convert one wire file entry into a change record.
///
/// Returns `Ok(None)` for entries that need no store operation.
fn to_change_record(
    owner: &str,
    repository: &str,
    file: CommitFile,
) -> std::result::Result<Option<ChangeRecord>, String> {
    let CommitFile {
        filename,
        status,
        sha,
        previous_filename,
    } = file;

    if status == "removed" {
        return Ok(Some(ChangeRecord::removed(filename)));
    }
    if status == "unchanged" {
        return Ok(None);
    }

    let blob_sha = sha.ok_or_else(|| format!("file {} ({}) has no blob sha", filename, status))?;
    let content = ContentRef {
        owner: owner.to_string(),
        repository: repository.to_string(),
        path: filename.clone(),
        blob_sha,
    };

    let record = match status.as_str() {
        "added" => ChangeRecord::added(filename, content),
        "modified" | "changed" | "copied" => ChangeRecord::modified(filename, content),
        "renamed" => {
            let previous = previous_filename
                .ok_or_else(|| format!("renamed file {} has no previous filename", filename))?;
            ChangeRecord::renamed(previous, filename, content)
        }
        other => {
            warn!(path = %filename, status = other, "unknown change status, replacing object");
            ChangeRecord::modified(filename, content)
        }
    };
    Ok(Some(record))
}

fn append_records(
    owner: &str,
    repository: &str,
    url: &str,
    files: Vec<CommitFile>,
    records: &mut Vec<ChangeRecord>,
) -> Result<()> {
    for file in files {
        let record = to_change_record(owner, repository, file).map_err(|message| {
            SourceControlError::Decode {
                url: url.to_string(),
                message,
            }
        })?;
        records.extend(record);
    }
    Ok(())
}

#[async_trait]
impl SourceControl for GithubSourceControl {
    async fn get_commit(
        &self,
        owner: &str,
        repository: &str,
        sha: &str,
    ) -> Result<CommitChangeSet> {
        let url = self.commit_url(owner, repository, sha);
        let (commit, mut next): (CommitResponse, _) = self.get_json_page(&url).await?;
        let CommitResponse {
            sha: commit_id,
            html_url,
            files,
        } = commit;

        let mut records = Vec::with_capacity(files.len());
        append_records(owner, repository, &url, files, &mut records)?;

        // Large commits list their files across several pages.
        let mut pages = 1;
        while let Some(page_url) = next {
            if pages >= MAX_COMMIT_PAGES {
                return Err(SourceControlError::Decode {
                    url,
                    message: format!("file list exceeds {} pages", MAX_COMMIT_PAGES),
                });
            }
            let (page, page_next): (CommitResponse, _) = self.get_json_page(&page_url).await?;
            append_records(owner, repository, &page_url, page.files, &mut records)?;
            next = page_next;
            pages += 1;
        }
        debug!(commit = %commit_id, pages, files = records.len(), "fetched commit");

        let mut change_set = CommitChangeSet::new(repository, commit_id, records);
        if let Some(html_url) = html_url {
            change_set = change_set.with_html_url(html_url);
        }
        Ok(change_set)
    }

    async fn get_blob(&self, owner: &str, repository: &str, sha: &str) -> Result<String> {
        let url = self.blob_url(owner, repository, sha);
        let blob: BlobResponse = self.get_json(&url).await?;
        if blob.encoding != "base64" {
            return Err(SourceControlError::Decode {
                url,
                message: format!("unsupported blob encoding '{}'", blob.encoding),
            });
        }
        Ok(blob.content)
    }
}
