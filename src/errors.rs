use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum IssueBranchError {
    // Usage errors
    Usage(String),

    // Configuration errors
    ConfigInvalid(String),
    ConfigAlreadyExists(String),

    // GitHub errors
    GitHubApiError(u16, String),

    // Git errors
    NotInGitRepo,
    Git(String),
    EmptyBranchName(String),

    // Network errors
    NetworkError(String),

    // Generic error
    Other(String),
}

impl fmt::Display for IssueBranchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueBranchError::Usage(msg) => {
                write!(f, "{}\n", "Invalid usage".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Usage: {}", "issue-branch <ISSUE_ID>".green())
            }

            // Configuration errors
            IssueBranchError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your config file: ./.issue-branch.toml\n")?;
                write!(f, "   2. Or recreate it: {}", "issue-branch --init".green())
            }
            IssueBranchError::ConfigAlreadyExists(path) => {
                write!(f, "{}\n", "Configuration already exists".red().bold())?;
                write!(f, "   {}\n\n", path.dimmed())?;
                write!(f, "   Edit the file directly or remove it before running {}", "issue-branch --init".green())
            }

            // GitHub errors
            IssueBranchError::GitHubApiError(status, body) => {
                write!(f, "{}\n", format!("GitHub API error ({})", status).red().bold())?;
                write!(f, "   {}", body.dimmed())?;
                match status {
                    401 | 403 => {
                        write!(f, "\n\n   To fix:\n")?;
                        write!(f, "   1. Generate new token: Settings > Developer settings > Personal access tokens\n")?;
                        write!(f, "   2. Required scope: repo (read access to issues)\n")?;
                        write!(f, "   3. Update the token in ./.issue-branch.toml or set ISSUE_BRANCH_TOKEN")
                    }
                    404 => {
                        write!(f, "\n\n   To fix:\n")?;
                        write!(f, "   1. Check the issue number is correct\n")?;
                        write!(f, "   2. Verify owner and repo in ./.issue-branch.toml")
                    }
                    _ => Ok(()),
                }
            }

            // Git errors
            IssueBranchError::NotInGitRepo => {
                write!(f, "{}\n", "Not in a git repository".red().bold())?;
                write!(f, "   {}\n\n", "issue-branch must be run inside a git repository".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Navigate to a git repository\n")?;
                write!(f, "   2. Or initialize one: {}", "git init".green())
            }
            IssueBranchError::Git(msg) => {
                write!(f, "{}\n", "Git operation failed".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
            IssueBranchError::EmptyBranchName(title) => {
                write!(f, "{}\n", "Cannot derive a branch name".red().bold())?;
                write!(f, "   {}\n\n", format!("Issue title: {:?}", title).dimmed())?;
                write!(f, "   Create the branch manually: {}", "git checkout -b <name>".green())
            }

            // Network errors
            IssueBranchError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your internet connection\n")?;
                write!(f, "   2. Verify you can reach the GitHub API\n")?;
                write!(f, "   3. Try again in a moment")
            }

            // Generic
            IssueBranchError::Other(msg) => {
                write!(f, "{}\n", "Error".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
        }
    }
}

impl std::error::Error for IssueBranchError {}

impl From<std::io::Error> for IssueBranchError {
    fn from(err: std::io::Error) -> Self {
        IssueBranchError::Other(err.to_string())
    }
}

impl From<::config::ConfigError> for IssueBranchError {
    fn from(err: ::config::ConfigError) -> Self {
        IssueBranchError::ConfigInvalid(err.to_string())
    }
}

impl From<git2::Error> for IssueBranchError {
    fn from(err: git2::Error) -> Self {
        IssueBranchError::Git(err.message().to_string())
    }
}

impl From<reqwest::Error> for IssueBranchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            IssueBranchError::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            IssueBranchError::GitHubApiError(status.as_u16(), err.to_string())
        } else {
            IssueBranchError::Other(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, IssueBranchError>;
