//! Structured command templates for build rules.
//!
//! A rule's command is a chain of invocations joined with `&&`, optionally
//! run through `cmd /c`. Arguments are build-engine placeholders such as
//! `$in` and `$out`; they are written verbatim and never shell-quoted here.

use std::fmt;

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Text glued directly in front of the program, e.g. `${configure_env}`
    pub prefix: Option<String>,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Create a new invocation.
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            prefix: None,
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Glue `prefix` in front of the program without a separating space.
    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_str(prefix)?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Shell that wraps the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    /// `cmd /c ...`
    Cmd,
}

/// A full rule command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub wrapper: Option<Wrapper>,
    pub steps: Vec<Invocation>,
}

impl CommandTemplate {
    /// A command consisting of a single invocation.
    pub fn new(first: Invocation) -> Self {
        CommandTemplate {
            wrapper: None,
            steps: vec![first],
        }
    }

    /// Run `next` after the previous steps succeed.
    pub fn then(mut self, next: Invocation) -> Self {
        self.steps.push(next);
        self
    }

    /// Run the chain through `cmd /c`.
    pub fn via_cmd(mut self) -> Self {
        self.wrapper = Some(Wrapper::Cmd);
        self
    }
}

impl From<Invocation> for CommandTemplate {
    fn from(invocation: Invocation) -> Self {
        CommandTemplate::new(invocation)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(Wrapper::Cmd) = self.wrapper {
            f.write_str("cmd /c ")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_invocation() {
        let cmd = CommandTemplate::new(
            Invocation::new("$cxx").args(["$ldflags", "-o", "$out", "$in", "$libs"]),
        );
        assert_eq!(cmd.to_string(), "$cxx $ldflags -o $out $in $libs");
    }

    #[test]
    fn test_chain_with_cmd_wrapper() {
        let cmd = CommandTemplate::new(Invocation::new("$ar").args(["cqs", "$out.tmp", "$in"]))
            .then(Invocation::new("move").args(["/Y", "$out.tmp", "$out"]))
            .via_cmd();
        assert_eq!(
            cmd.to_string(),
            "cmd /c $ar cqs $out.tmp $in && move /Y $out.tmp $out"
        );
    }

    #[test]
    fn test_prefix_glued_to_program() {
        let cmd: CommandTemplate = Invocation::new("configure")
            .prefixed("${configure_env}")
            .arg("$configure_args")
            .into();
        assert_eq!(cmd.to_string(), "${configure_env}configure $configure_args");
    }
}
