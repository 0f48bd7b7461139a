//! Remote Markdown→HTML conversion via the GitHub Markdown API.
//!
//! Converts a generated document with: POST https://api.github.com/markdown
//! Optional client credentials raise the anonymous rate limit.

use serde::Serialize;
use thiserror::Error;

const GITHUB_MARKDOWN_URL: &str = "https://api.github.com/markdown";

/// Errors that can occur while rendering through the GitHub API.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("GitHub API returned HTTP {0}")]
    Status(u16),
}

#[derive(Serialize)]
struct MarkdownRequest<'a> {
    text: &'a str,
    mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// Client for the GitHub Markdown rendering endpoint.
pub struct GithubRenderer {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GithubRenderer {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("crumbtrail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            client_id,
            client_secret,
        })
    }

    /// Render as GitHub Flavoured Markdown, resolving references against
    /// the given repository context (e.g. "org/repo").
    pub async fn render_gfm(
        &self,
        markdown: &str,
        context: Option<&str>,
    ) -> Result<String, RenderError> {
        self.render(MarkdownRequest {
            text: markdown,
            mode: "gfm",
            context,
        })
        .await
    }

    /// Render as plain (readme-style) Markdown.
    pub async fn render_readme(&self, markdown: &str) -> Result<String, RenderError> {
        self.render(MarkdownRequest {
            text: markdown,
            mode: "markdown",
            context: None,
        })
        .await
    }

    async fn render(&self, request: MarkdownRequest<'_>) -> Result<String, RenderError> {
        let mut builder = self.http.post(GITHUB_MARKDOWN_URL).json(&request);
        if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
            builder = builder.basic_auth(id, Some(secret));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
