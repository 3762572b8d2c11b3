//! Clone transport variants.
//!
//! Each transport owns its clone command shape. All three request a
//! single-branch clone of exactly the configured mainline branch.

use serde::{Deserialize, Serialize};

use crate::core::command::ExternalCommand;

/// How the target repository is cloned.
///
/// The set is closed: unknown values are rejected when the config file is
/// parsed, before any filesystem or network side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloneTransport {
    Ssh,
    Https,
    /// Delegates authentication and clone to the GitHub CLI.
    GithubCli,
}

impl CloneTransport {
    /// Build the clone invocation for `repository` (`owner/name`) at `branch`.
    pub fn clone_command(self, repository: &str, branch: &str) -> ExternalCommand {
        match self {
            CloneTransport::Ssh => git_clone(format!("git@github.com:{repository}.git"), branch),
            CloneTransport::Https => {
                git_clone(format!("https://github.com/{repository}.git"), branch)
            }
            CloneTransport::GithubCli => ExternalCommand::new("gh")
                .args(["repo", "clone", repository])
                .args(["--branch", branch])
                .arg("--single-branch"),
        }
    }
}

fn git_clone(url: String, branch: &str) -> ExternalCommand {
    ExternalCommand::new("git")
        .arg("clone")
        .args(["-b", branch])
        .arg("--single-branch")
        .arg(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_clone_targets_git_remote() {
        let cmd = CloneTransport::Ssh.clone_command("octo/widgets", "main");
        assert_eq!(
            cmd.to_string(),
            "git clone -b main --single-branch git@github.com:octo/widgets.git"
        );
    }

    #[test]
    fn https_clone_targets_https_remote() {
        let cmd = CloneTransport::Https.clone_command("octo/widgets", "develop");
        assert_eq!(
            cmd.to_string(),
            "git clone -b develop --single-branch https://github.com/octo/widgets.git"
        );
    }

    #[test]
    fn github_cli_clone_delegates_to_gh() {
        let cmd = CloneTransport::GithubCli.clone_command("octo/widgets", "main");
        assert_eq!(
            cmd.to_string(),
            "gh repo clone octo/widgets --branch main --single-branch"
        );
    }

    #[test]
    fn unknown_transport_is_a_parse_error() {
        #[derive(Deserialize)]
        struct Wrap {
            #[allow(dead_code)]
            transport: CloneTransport,
        }
        assert!(toml::from_str::<Wrap>("transport = \"subversion\"").is_err());
    }
}
