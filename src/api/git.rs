use crate::api::VcsGateway;
use crate::errors::{IssueBranchError, Result};
use git2::build::CheckoutBuilder;
use git2::{BranchType, Repository};
use std::cell::OnceCell;
use std::path::PathBuf;
use tracing::{debug, warn};

const REMOTES_PREFIX: &str = "remotes/";

/// Git access rooted at a working directory. The repository is discovered on
/// first use, so constructing a client never touches git.
pub struct GitClient {
    work_dir: PathBuf,
    repo: OnceCell<Repository>,
}

/// The git command equivalent to `GitClient::checkout` for `branch`.
pub fn checkout_command(branch: &str) -> String {
    match branch.strip_prefix(REMOTES_PREFIX) {
        Some(remote_branch) => format!("git checkout --track {}", remote_branch),
        None => format!("git checkout {}", branch),
    }
}

/// The git command equivalent to `GitClient::create_branch` for `branch`.
pub fn create_command(branch: &str) -> String {
    format!("git checkout -b {}", branch)
}

impl GitClient {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            repo: OnceCell::new(),
        }
    }

    /// The repository containing `work_dir`, searching parent directories.
    fn repo(&self) -> Result<&Repository> {
        if let Some(repo) = self.repo.get() {
            return Ok(repo);
        }

        let repo = Repository::discover(&self.work_dir).map_err(|_| IssueBranchError::NotInGitRepo)?;
        debug!(path = %self.work_dir.display(), "opened repository");
        Ok(self.repo.get_or_init(|| repo))
    }

    fn switch_to(&self, refname: &str) -> Result<()> {
        let repo = self.repo()?;
        let target = repo.revparse_single(refname)?;

        let mut opts = CheckoutBuilder::new();
        opts.safe();
        repo.checkout_tree(&target, Some(&mut opts))?;
        repo.set_head(refname)?;

        debug!(refname, "switched HEAD");
        Ok(())
    }

    fn track_remote(&self, remote_branch: &str) -> Result<()> {
        let local_name = match remote_branch.split_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => {
                return Err(IssueBranchError::Git(format!(
                    "'{}' is not a remote-tracking branch",
                    remote_branch
                )))
            }
        };

        let repo = self.repo()?;
        if repo.find_branch(local_name, BranchType::Local).is_err() {
            let commit = repo
                .find_branch(remote_branch, BranchType::Remote)?
                .get()
                .peel_to_commit()?;

            let mut local = repo.branch(local_name, &commit, false)?;
            if let Err(e) = local.set_upstream(Some(remote_branch)) {
                warn!(remote_branch, error = %e, "could not set upstream");
            }
            debug!(local_name, remote_branch, "created tracking branch");
        }

        self.switch_to(&format!("refs/heads/{}", local_name))
    }
}

impl VcsGateway for GitClient {
    fn list_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in self.repo()?.branches(None)? {
            let (branch, kind) = entry?;
            let name = match branch.name()? {
                Some(name) => name,
                None => continue,
            };

            match kind {
                BranchType::Local => names.push(name.to_string()),
                BranchType::Remote => {
                    if name.ends_with("/HEAD") {
                        continue;
                    }
                    names.push(format!("{}{}", REMOTES_PREFIX, name));
                }
            }
        }

        debug!(count = names.len(), "listed branches");
        Ok(names)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        match branch.strip_prefix(REMOTES_PREFIX) {
            Some(remote_branch) => self.track_remote(remote_branch),
            None => {
                self.repo()?.find_branch(branch, BranchType::Local)?;
                self.switch_to(&format!("refs/heads/{}", branch))
            }
        }
    }

    fn create_branch(&self, branch: &str) -> Result<()> {
        let repo = self.repo()?;
        let head_commit = repo
            .head()
            .map_err(|e| IssueBranchError::Git(format!("Failed to get HEAD: {}", e.message())))?
            .peel_to_commit()?;

        repo.branch(branch, &head_commit, false).map_err(|e| {
            IssueBranchError::Git(format!("Failed to create branch '{}': {}", branch, e.message()))
        })?;
        debug!(branch, "created branch");

        self.switch_to(&format!("refs/heads/{}", branch))
    }
}
