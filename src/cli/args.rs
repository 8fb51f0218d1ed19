//! Command-line argument parsing for the novelforge CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Single-shot assistant call
    Chat(String),
    /// Streaming assistant call, printing events as they arrive
    Stream(String),
    /// List all novels
    Novels,
    /// Arguments could not be understood
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// Words after `chat` or `stream` are joined into the prompt, so quoting is
/// optional.
///
/// # Examples
///
/// ```
/// use novelforge::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["novelforge".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let mut args = args.skip(1);
    let command = match args.next() {
        Some(command) => command,
        None => return CliCommand::Help,
    };

    match command.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "novels" => CliCommand::Novels,
        "chat" | "stream" => {
            let prompt = args.collect::<Vec<_>>().join(" ");
            if prompt.trim().is_empty() {
                return CliCommand::Invalid(format!("`{}` needs a prompt", command));
            }
            if command == "chat" {
                CliCommand::Chat(prompt)
            } else {
                CliCommand::Stream(prompt)
            }
        }
        other => CliCommand::Invalid(format!("unknown command `{}`", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        let mut all = vec!["novelforge".to_string()];
        all.extend(args.iter().map(|s| s.to_string()));
        parse_args(all.into_iter())
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]), CliCommand::Version);
        assert_eq!(parse(&["-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&[]), CliCommand::Help);
    }

    #[test]
    fn test_parse_novels() {
        assert_eq!(parse(&["novels"]), CliCommand::Novels);
    }

    #[test]
    fn test_parse_chat_joins_words() {
        assert_eq!(
            parse(&["chat", "write", "a", "haiku"]),
            CliCommand::Chat("write a haiku".to_string())
        );
    }

    #[test]
    fn test_parse_stream_quoted_prompt() {
        assert_eq!(
            parse(&["stream", "continue chapter two"]),
            CliCommand::Stream("continue chapter two".to_string())
        );
    }

    #[test]
    fn test_parse_missing_prompt() {
        assert!(matches!(parse(&["stream"]), CliCommand::Invalid(_)));
        assert!(matches!(parse(&["chat", " "]), CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse(&["publish"]),
            CliCommand::Invalid("unknown command `publish`".to_string())
        );
    }
}
