//! GitHub contents API provider

use super::{RemoteEntry, RemoteError, RepositoryClient};
use base64::engine::general_purpose;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Repository client backed by the GitHub REST contents API
pub struct GitHubClient {
    api_base: String,
    owner: String,
    repo: String,
    token: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client for `owner/repo`
    pub fn new(
        api_base: &str,
        slug: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let (owner, repo) = slug
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| RemoteError::NotFound(format!("invalid repository slug: {}", slug)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("modoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token,
            timeout,
            client,
        })
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_base, self.owner, self.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(), path.trim_matches('/'))
    }

    async fn get(&self, url: &str, branch: Option<&str>) -> Result<Option<reqwest::Response>, RemoteError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");

        if let Some(branch) = branch {
            request = request.query(&[("ref", branch)]);
        }
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(e, RemoteError::Network))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Auth(format!("{} - {}", status, body)))
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Network(format!("{} - {}", status, body)))
            }
            _ => Ok(Some(response)),
        }
    }

    /// A timed-out request keeps its own variant whatever stage it failed in
    fn request_error(&self, e: reqwest::Error, other: fn(String) -> RemoteError) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            other(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl RepositoryClient for GitHubClient {
    async fn default_branch(&self) -> Result<String, RemoteError> {
        let response = self
            .get(&self.repo_url(), None)
            .await?
            .ok_or_else(|| RemoteError::NotFound(format!("{}/{}", self.owner, self.repo)))?;

        let info: RepositoryInfo = response
            .json()
            .await
            .map_err(|e| self.request_error(e, RemoteError::InvalidResponse))?;

        Ok(info.default_branch)
    }

    async fn file_content(&self, path: &str, branch: &str) -> Result<Option<String>, RemoteError> {
        let Some(response) = self.get(&self.contents_url(path), Some(branch)).await? else {
            return Ok(None);
        };

        let file: ContentFile = response
            .json()
            .await
            .map_err(|e| self.request_error(e, RemoteError::InvalidResponse))?;

        decode_content(&file).map(Some)
    }

    async fn list_files(&self, path: &str, branch: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        let Some(response) = self.get(&self.contents_url(path), Some(branch)).await? else {
            return Ok(Vec::new());
        };

        let listing: ContentListing = response
            .json()
            .await
            .map_err(|e| self.request_error(e, RemoteError::InvalidResponse))?;

        let entries = match listing {
            ContentListing::Directory(entries) => entries
                .into_iter()
                .filter(|e| e.kind == "file")
                .map(|e| RemoteEntry::new(&e.name, &e.path))
                .collect(),
            // A path naming a single file is not a directory
            ContentListing::File(_) => Vec::new(),
        };

        Ok(entries)
    }

    fn describe(&self) -> String {
        format!("github:{}/{}", self.owner, self.repo)
    }
}

/// Parse `owner/repo` out of a GitHub remote URL
///
/// Accepts https and ssh forms, with or without the `.git` suffix.
pub fn parse_github_slug(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let mut parts = rest.split('/');
    let owner = parts.next().filter(|p| !p.is_empty())?;
    let repo = parts.next().filter(|p| !p.is_empty())?;

    Some(format!("{}/{}", owner, repo))
}

fn decode_content(file: &ContentFile) -> Result<String, RemoteError> {
    match file.encoding.as_deref() {
        Some("base64") => {
            let compact: String = file
                .content
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let bytes = general_purpose::STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| RemoteError::InvalidResponse(format!("bad base64 payload: {}", e)))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Ok(file.content.clone()),
    }
}

// GitHub API types

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    content: String,
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentListing {
    Directory(Vec<ContentEntry>),
    File(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_slug() {
        assert_eq!(
            parse_github_slug("https://github.com/owner/name.git").as_deref(),
            Some("owner/name")
        );
        assert_eq!(
            parse_github_slug("git@github.com:owner/name.git").as_deref(),
            Some("owner/name")
        );
        assert_eq!(
            parse_github_slug("https://github.com/owner/name/").as_deref(),
            Some("owner/name")
        );
        assert_eq!(parse_github_slug("https://gitlab.com/owner/name"), None);
        assert_eq!(parse_github_slug("https://github.com/owner"), None);
    }

    #[test]
    fn test_decode_base64_content_with_line_breaks() {
        let file = ContentFile {
            content: "IyBUaXRs\nZQo=\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content(&file).unwrap(), "# Title\n");

        let bad = ContentFile {
            content: "!!!".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert!(matches!(decode_content(&bad), Err(RemoteError::InvalidResponse(_))));
    }

    #[test]
    fn test_listing_shapes() {
        let dir: ContentListing = serde_json::from_str(
            r#"[{"name":"README.md","path":"README.md","type":"file"},
                {"name":"docs","path":"docs","type":"dir"}]"#,
        )
        .unwrap();
        assert!(matches!(dir, ContentListing::Directory(ref e) if e.len() == 2));

        let file: ContentListing =
            serde_json::from_str(r#"{"name":"README.md","content":""}"#).unwrap();
        assert!(matches!(file, ContentListing::File(_)));
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // Accept and hold the connection without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = GitHubClient::new(
            &format!("http://{}", addr),
            "owner/name",
            None,
            Duration::from_millis(200),
        )
        .unwrap();

        let err = client.default_branch().await.unwrap_err();
        assert!(matches!(err, RemoteError::Timeout(t) if t == Duration::from_millis(200)));
        server.abort();
    }

    #[test]
    fn test_client_rejects_bad_slug() {
        let err = GitHubClient::new("https://api.github.com", "nope", None, Duration::from_secs(1));
        assert!(err.is_err());

        let client = GitHubClient::new(
            "https://api.github.com/",
            "owner/name",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.contents_url("/docs/"),
            "https://api.github.com/repos/owner/name/contents/docs"
        );
        assert_eq!(client.describe(), "github:owner/name");
    }
}
