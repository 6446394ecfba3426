pub mod git;
pub mod github;

use crate::errors::Result;
use crate::models::issue::Issue;

/// Remote issue tracker lookups.
pub trait IssueClient {
    async fn get_issue(&self, issue_id: &str) -> Result<Issue>;
}

/// Branch listing and switching in the local repository.
pub trait VcsGateway {
    /// Local branches by short name, remote-tracking ones as `remotes/<remote>/<name>`.
    fn list_branches(&self) -> Result<Vec<String>>;

    fn checkout(&self, branch: &str) -> Result<()>;

    /// Creates `branch` at the current HEAD commit and switches to it.
    fn create_branch(&self, branch: &str) -> Result<()>;
}
