use crate::api::git::{checkout_command, create_command};
use crate::api::{IssueClient, VcsGateway};
use crate::branch::{branches_for, slugify};
use crate::errors::IssueBranchError;
use colored::*;
use std::io::Write;
use tracing::debug;

pub const EXIT_OK: u8 = 0;
pub const EXIT_CLOSED: u8 = 1;
pub const EXIT_AMBIGUOUS: u8 = 2;
pub const EXIT_USAGE: u8 = 64;
pub const EXIT_FAILURE: u8 = 70;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(String),
    CheckedOut(String),
    Closed { url: String, closed_at: String },
    Ambiguous(Vec<String>),
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Created(_) | Outcome::CheckedOut(_) => EXIT_OK,
            Outcome::Closed { .. } => EXIT_CLOSED,
            Outcome::Ambiguous(_) => EXIT_AMBIGUOUS,
        }
    }
}

/// Accepts `123` or `#123`, surrounding whitespace ignored.
pub fn normalize_issue_id(raw: &str) -> Result<String, IssueBranchError> {
    let id = raw.trim().trim_start_matches('#').trim();
    if id.is_empty() {
        return Err(IssueBranchError::Usage(format!(
            "'{}' is not an issue id",
            raw
        )));
    }
    Ok(id.to_string())
}

/// Switches to the branch for `issue_id`, creating it when no branch
/// mentions the id yet.
///
/// Closed issues and ambiguous matches are reported on `err` and leave the
/// repository untouched.
pub async fn run<I, V, O, E>(
    issue_id: &str,
    issues: &I,
    vcs: &V,
    out: &mut O,
    err: &mut E,
) -> anyhow::Result<Outcome>
where
    I: IssueClient,
    V: VcsGateway,
    O: Write,
    E: Write,
{
    writeln!(out, "{}", format!("  Fetching issue #{}...", issue_id).dimmed())?;
    let issue = issues.get_issue(issue_id).await?;
    writeln!(out, "{}", format!("  ✓ Found: {}", issue.title).green())?;

    if let Some(closed_at) = issue.closed_at_display() {
        writeln!(err, "{}", format!("Issue #{} is closed", issue_id).yellow().bold())?;
        writeln!(err, "  {} {}", "URL:".bold(), issue.url)?;
        writeln!(err, "  {} {}", "Closed at:".bold(), closed_at)?;
        return Ok(Outcome::Closed {
            url: issue.url,
            closed_at,
        });
    }

    let branches = vcs.list_branches()?;
    let matches = branches_for(issue_id, &branches);
    debug!(issue_id, candidates = branches.len(), matches = matches.len(), "matched branches");

    match matches.len() {
        0 => {
            let slug = slugify(&issue.title, issue_id);
            if slug.is_empty() {
                return Err(IssueBranchError::EmptyBranchName(issue.title).into());
            }

            writeln!(out)?;
            writeln!(out, "  {} {}", "Branch:".bold(), slug.bright_white())?;
            writeln!(out, "  {}", format!("$ {}", create_command(&slug)).dimmed())?;
            vcs.create_branch(&slug)?;
            writeln!(out, "{}", format!("✓ Created and switched to branch '{}'", slug).green())?;

            Ok(Outcome::Created(slug))
        }
        1 => {
            let branch = &matches[0];
            writeln!(out)?;
            writeln!(out, "  {} {}", "Branch:".bold(), branch.bright_white())?;
            writeln!(out, "  {}", format!("$ {}", checkout_command(branch)).dimmed())?;
            vcs.checkout(branch)?;
            writeln!(out, "{}", format!("✓ Switched to branch '{}'", branch).green())?;

            Ok(Outcome::CheckedOut(branch.clone()))
        }
        _ => {
            writeln!(
                err,
                "{}",
                format!("Multiple branches match issue #{}:", issue_id).yellow().bold()
            )?;
            for branch in &matches {
                writeln!(err, "  {}", branch.bright_white())?;
            }
            writeln!(err, "{}", "  Check out the right one manually".dimmed())?;

            Ok(Outcome::Ambiguous(matches))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::models::issue::Issue;
    use chrono::{TimeZone, Utc};
    use std::cell::{Cell, RefCell};

    struct FakeIssues {
        issue: Option<Issue>,
        calls: Cell<usize>,
    }

    impl FakeIssues {
        fn returning(issue: Issue) -> Self {
            Self {
                issue: Some(issue),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                issue: None,
                calls: Cell::new(0),
            }
        }
    }

    impl IssueClient for FakeIssues {
        async fn get_issue(&self, _issue_id: &str) -> Result<Issue> {
            self.calls.set(self.calls.get() + 1);
            match &self.issue {
                Some(issue) => Ok(issue.clone()),
                None => Err(IssueBranchError::GitHubApiError(
                    500,
                    r#"{"message":"Server Error"}"#.to_string(),
                )),
            }
        }
    }

    #[derive(Default)]
    struct FakeVcs {
        branches: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeVcs {
        fn with_branches(branches: &[&str]) -> Self {
            Self {
                branches: branches.iter().map(|b| b.to_string()).collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl VcsGateway for FakeVcs {
        fn list_branches(&self) -> Result<Vec<String>> {
            self.calls.borrow_mut().push("list".to_string());
            Ok(self.branches.clone())
        }

        fn checkout(&self, branch: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("checkout {}", branch));
            Ok(())
        }

        fn create_branch(&self, branch: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("create {}", branch));
            Ok(())
        }
    }

    fn open_issue(id: u64, title: &str) -> Issue {
        Issue {
            id,
            title: title.to_string(),
            url: format!("https://github.com/acme/game/issues/{}", id),
            closed_at: None,
        }
    }

    async fn run_with(
        issue_id: &str,
        issues: &FakeIssues,
        vcs: &FakeVcs,
    ) -> (anyhow::Result<Outcome>, String, String) {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = run(issue_id, issues, vcs, &mut out, &mut err).await;
        (
            outcome,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Created("a".into()).exit_code(), 0);
        assert_eq!(Outcome::CheckedOut("a".into()).exit_code(), 0);
        assert_eq!(
            Outcome::Closed {
                url: "u".into(),
                closed_at: "t".into()
            }
            .exit_code(),
            1
        );
        assert_eq!(Outcome::Ambiguous(vec![]).exit_code(), 2);
    }

    #[test]
    fn test_normalize_issue_id() {
        assert_eq!(normalize_issue_id("2415").unwrap(), "2415");
        assert_eq!(normalize_issue_id(" #2415 ").unwrap(), "2415");
        assert!(matches!(
            normalize_issue_id("  # "),
            Err(IssueBranchError::Usage(_))
        ));
    }

    #[tokio::test]
    async fn test_no_match_creates_slugified_branch() {
        let issues = FakeIssues::returning(open_issue(2415, "Split combat into phases"));
        let vcs = FakeVcs::with_branches(&["main", "remotes/origin/main", "feature-24150"]);

        let (outcome, out, err) = run_with("2415", &issues, &vcs).await;

        assert_eq!(
            outcome.unwrap(),
            Outcome::Created("split-combat-into-phases-2415".to_string())
        );
        assert_eq!(
            vcs.calls(),
            vec!["list", "create split-combat-into-phases-2415"]
        );
        assert!(out.contains("Branch: split-combat-into-phases-2415"));
        assert!(out.contains("$ git checkout -b split-combat-into-phases-2415"));
        assert!(out.contains("✓ Created and switched to branch 'split-combat-into-phases-2415'"));
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_single_match_checks_out_exact_name() {
        let issues = FakeIssues::returning(open_issue(5738, "Rework reputation"));
        let vcs = FakeVcs::with_branches(&["main", "  rework-reputation-5738  "]);

        let (outcome, out, _) = run_with("5738", &issues, &vcs).await;

        assert_eq!(
            outcome.unwrap(),
            Outcome::CheckedOut("rework-reputation-5738".to_string())
        );
        assert_eq!(vcs.calls(), vec!["list", "checkout rework-reputation-5738"]);
        assert!(out.contains("$ git checkout rework-reputation-5738"));
        assert!(out.contains("✓ Switched to branch 'rework-reputation-5738'"));
    }

    #[tokio::test]
    async fn test_single_remote_match_echoes_tracking_checkout() {
        let issues = FakeIssues::returning(open_issue(77, "Remote only"));
        let vcs = FakeVcs::with_branches(&["main", "remotes/origin/remote-only-77"]);

        let (outcome, out, _) = run_with("77", &issues, &vcs).await;

        assert_eq!(
            outcome.unwrap(),
            Outcome::CheckedOut("remotes/origin/remote-only-77".to_string())
        );
        assert!(out.contains("$ git checkout --track origin/remote-only-77"));
    }

    #[tokio::test]
    async fn test_ambiguous_match_lists_branches_without_checkout() {
        let issues = FakeIssues::returning(open_issue(2415, "Combat phases"));
        let vcs = FakeVcs::with_branches(&[
            "main",
            "remotes/origin/combat-phases-2415",
            "remotes/origin/rework-combat-phases-2415",
        ]);

        let (outcome, out, err) = run_with("2415", &issues, &vcs).await;
        let outcome = outcome.unwrap();

        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(
            outcome,
            Outcome::Ambiguous(vec![
                "remotes/origin/combat-phases-2415".to_string(),
                "remotes/origin/rework-combat-phases-2415".to_string(),
            ])
        );
        assert_eq!(vcs.calls(), vec!["list"]);
        assert!(err.contains("remotes/origin/combat-phases-2415"));
        assert!(err.contains("remotes/origin/rework-combat-phases-2415"));
        assert!(!out.contains("Branch:"));
    }

    #[tokio::test]
    async fn test_closed_issue_reports_and_skips_vcs() {
        let mut issue = open_issue(12, "Crash on startup");
        issue.closed_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        let issues = FakeIssues::returning(issue);
        let vcs = FakeVcs::with_branches(&["crash-on-startup-12"]);

        let (outcome, _, err) = run_with("12", &issues, &vcs).await;
        let outcome = outcome.unwrap();

        assert_eq!(outcome.exit_code(), 1);
        assert!(vcs.calls().is_empty());
        assert!(err.contains("https://github.com/acme/game/issues/12"));
        assert!(err.contains("2024-03-01T10:00:00Z"));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_before_vcs() {
        let issues = FakeIssues::failing();
        let vcs = FakeVcs::default();

        let (outcome, _, _) = run_with("9", &issues, &vcs).await;

        let error = outcome.unwrap_err();
        assert!(error.to_string().contains(r#"{"message":"Server Error"}"#));
        assert_eq!(issues.calls.get(), 1);
        assert!(vcs.calls().is_empty());
    }

    #[tokio::test]
    async fn test_symbol_only_title_and_id_is_rejected() {
        let issues = FakeIssues::returning(open_issue(1, "???"));
        let vcs = FakeVcs::default();

        let (outcome, _, _) = run_with("#", &issues, &vcs).await;

        let error = outcome.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<IssueBranchError>(),
            Some(IssueBranchError::EmptyBranchName(_))
        ));
        assert_eq!(vcs.calls(), vec!["list"]);
    }
}
