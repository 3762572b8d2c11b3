//! External command values.
//!
//! Every process the pipelines spawn (git, gh, agent CLIs) is first built as
//! an [`ExternalCommand`] value. Builders stay pure and unit-testable; the
//! executor in `io::exec` is the only place a value turns into a process.

use std::fmt;

/// A program plus its ordered arguments, not yet spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ExternalCommand {
    /// Space-joined rendering, for logs and test assertions only.
    /// Not shell-quoted; never feed this back into a shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_argument_order() {
        let cmd = ExternalCommand::new("git")
            .arg("clone")
            .args(["-b", "main"])
            .arg("url");
        assert_eq!(cmd.program, "git");
        assert_eq!(cmd.args, vec!["clone", "-b", "main", "url"]);
    }

    #[test]
    fn display_joins_with_spaces() {
        let cmd = ExternalCommand::new("git").args(["add", "-A"]);
        assert_eq!(cmd.to_string(), "git add -A");
    }
}
