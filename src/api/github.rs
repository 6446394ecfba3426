use crate::api::IssueClient;
use crate::config::settings::Settings;
use crate::errors::{IssueBranchError, Result};
use crate::models::issue::Issue;
use reqwest::Client;
use tracing::debug;

pub struct GitHubClient {
    client: Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(base_url: String, owner: String, repo: String, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            token,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api_url.clone(),
            settings.owner.clone(),
            settings.repo.clone(),
            settings.token.clone(),
        )
    }

    fn issue_url(&self, issue_id: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.base_url,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo),
            urlencoding::encode(issue_id)
        )
    }
}

impl IssueClient for GitHubClient {
    async fn get_issue(&self, issue_id: &str) -> Result<Issue> {
        let url = self.issue_url(issue_id);
        debug!(%url, "fetching issue");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "issue-branch-cli")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "issue request failed");
            return Err(IssueBranchError::GitHubApiError(status.as_u16(), text));
        }

        let body = response.text().await?;
        let issue = serde_json::from_str::<Issue>(&body).map_err(|e| {
            IssueBranchError::Other(format!("Failed to parse GitHub issue response: {}", e))
        })?;

        debug!(id = issue.id, closed = issue.is_closed(), "fetched issue");
        Ok(issue)
    }
}
