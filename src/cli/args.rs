//! Command-line argument parsing for the weft CLI.

use serde_json::Value;

/// Options for a single submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmitArgs {
    /// Agent service URL, overriding `WEFT_API_URL`
    pub url: Option<String>,
    /// Start a new thread instead of resuming the stored one
    pub new_thread: bool,
    /// Caller state sent alongside the message
    pub context: Option<Value>,
    /// Message text; all positional arguments joined by spaces
    pub message: String,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Forget the stored thread
    Reset { url: Option<String> },
    /// Send a message and print the resulting transcript
    Submit(SubmitArgs),
    /// Print usage, optionally after an error
    Usage { error: Option<String> },
}

pub const USAGE: &str = "\
usage: weft [--url URL] [--new] [--context JSON] MESSAGE...
       weft [--url URL] --reset
       weft --version";

/// Parse command-line arguments.
///
/// # Examples
///
/// ```
/// use weft::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["weft".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut submit = SubmitArgs::default();
    let mut words: Vec<String> = Vec::new();
    let mut reset = false;

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Usage { error: None },
            "--reset" => reset = true,
            "--new" => submit.new_thread = true,
            "--url" => match args.next() {
                Some(url) => submit.url = Some(url),
                None => return usage_error("--url needs a value"),
            },
            "--context" => {
                let Some(raw) = args.next() else {
                    return usage_error("--context needs a value");
                };
                match serde_json::from_str(&raw) {
                    Ok(value) => submit.context = Some(value),
                    Err(e) => return usage_error(&format!("--context is not valid JSON: {}", e)),
                }
            }
            "--" => {
                words.extend(args.by_ref());
            }
            flag if flag.starts_with("--") => {
                return usage_error(&format!("unknown option {}", flag));
            }
            _ => words.push(arg),
        }
    }

    if reset {
        return CliCommand::Reset { url: submit.url };
    }

    submit.message = words.join(" ");
    if submit.message.trim().is_empty() {
        return usage_error("a message is required");
    }
    CliCommand::Submit(submit)
}

fn usage_error(message: &str) -> CliCommand {
    CliCommand::Usage {
        error: Some(message.to_string()),
    }
}
