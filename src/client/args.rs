//! client::args
//!
//! Argument forms accepted by command verbs.
//!
//! Arguments are either a preformatted string or an ordered list joined
//! with single spaces. Nothing is quoted or escaped.
//!
//! # Example
//!
//! ```
//! use p4session::client::CommandArgs;
//!
//! assert_eq!(CommandArgs::from(vec!["-d", "\"msg\"", "a.c"]).to_line(), "-d \"msg\" a.c");
//! assert_eq!(CommandArgs::from("-a").to_line(), "-a");
//! assert_eq!(CommandArgs::None.to_line(), "");
//! ```

/// Arguments for a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandArgs {
    /// No arguments.
    #[default]
    None,
    /// A preformatted argument string.
    Line(String),
    /// Ordered arguments, joined with single spaces.
    List(Vec<String>),
}

impl CommandArgs {
    /// Render the arguments as they appear on the command line.
    pub fn to_line(&self) -> String {
        match self {
            CommandArgs::None => String::new(),
            CommandArgs::Line(line) => line.clone(),
            CommandArgs::List(items) => items.join(" "),
        }
    }
}

impl From<&str> for CommandArgs {
    fn from(line: &str) -> Self {
        CommandArgs::Line(line.to_string())
    }
}

impl From<String> for CommandArgs {
    fn from(line: String) -> Self {
        CommandArgs::Line(line)
    }
}

impl From<Vec<String>> for CommandArgs {
    fn from(items: Vec<String>) -> Self {
        CommandArgs::List(items)
    }
}

impl From<Vec<&str>> for CommandArgs {
    fn from(items: Vec<&str>) -> Self {
        CommandArgs::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for CommandArgs {
    fn from(items: &[&str]) -> Self {
        CommandArgs::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandArgs {
    fn from(items: [&str; N]) -> Self {
        CommandArgs::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<CommandArgs>> From<Option<T>> for CommandArgs {
    fn from(args: Option<T>) -> Self {
        args.map(Into::into).unwrap_or_default()
    }
}

/// Compose a command line from a program, a verb, and its arguments.
///
/// Empty parts are skipped so no stray separators appear.
pub fn compose_command_line(program: &str, command: &str, args: &CommandArgs) -> String {
    let args = args.to_line();
    [program, command, args.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
