//! Session script parser.
//!
//! A script is a line-oriented recording of what a host would report to the
//! shell. Blank lines and lines starting with `#` are ignored; every other
//! line is one command followed by its argument:
//!
//! ```text
//! # boot online, lose the only network, come back
//! started https://app.example.com/
//! finished https://app.example.com/
//! offline
//! wait 500
//! online
//! invoke {"name":"getBatteryLevel"}
//! exit
//! ```

use std::{fmt, time::Duration};

use thiserror::Error;
use webshell_core::NetworkId;

/// Network used when `online` / `offline` name none.
pub const DEFAULT_NETWORK: NetworkId = 1;

/// One scripted host report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A network became available.
    Online(NetworkId),
    /// A network went away.
    Offline(NetworkId),
    /// A document started loading.
    Started(String),
    /// A document finished loading.
    Finished(String),
    /// A main-frame load failed.
    Failed(String),
    /// Content asks to navigate to a URL.
    Navigate(String),
    /// Back gesture with history available.
    Back,
    /// Back gesture at the history root.
    BackRoot,
    /// Raw bridge message from the page.
    Invoke(String),
    /// Advance virtual time.
    Wait(Duration),
    /// Content opened a file input.
    File,
    /// The user closed the file picker without choosing.
    FileCancel,
    /// The user picked a file.
    FilePick(String),
    /// Grant every permission in the open dialog.
    GrantAll,
    /// Deny every permission in the open dialog.
    DenyAll,
    /// The splash fade animation finished.
    SplashFaded,
    /// The host destroys the surface.
    Exit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online(network) => write!(f, "online {network}"),
            Self::Offline(network) => write!(f, "offline {network}"),
            Self::Started(url) => write!(f, "started {url}"),
            Self::Finished(url) => write!(f, "finished {url}"),
            Self::Failed(url) => write!(f, "failed {url}"),
            Self::Navigate(url) => write!(f, "navigate {url}"),
            Self::Back => f.write_str("back"),
            Self::BackRoot => f.write_str("back-root"),
            Self::Invoke(raw) => write!(f, "invoke {raw}"),
            Self::Wait(duration) => write!(f, "wait {}", duration.as_millis()),
            Self::File => f.write_str("file"),
            Self::FileCancel => f.write_str("file-cancel"),
            Self::FilePick(uri) => write!(f, "pick {uri}"),
            Self::GrantAll => f.write_str("grant-all"),
            Self::DenyAll => f.write_str("deny-all"),
            Self::SplashFaded => f.write_str("splash-faded"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Error raised while parsing a script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The command word is not known
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand {
        /// 1-based line number
        line: usize,
        /// Command word as written
        command: String,
    },

    /// The command needs an argument that is missing
    #[error("line {line}: `{command}` needs {expected}")]
    MissingArgument {
        /// 1-based line number
        line: usize,
        /// Command word
        command: &'static str,
        /// What the argument should be
        expected: &'static str,
    },

    /// A numeric argument does not parse
    #[error("line {line}: `{value}` is not a number")]
    InvalidNumber {
        /// 1-based line number
        line: usize,
        /// Argument as written
        value: String,
    },

    /// The command takes no argument but one was given
    #[error("line {line}: `{command}` takes no argument")]
    UnexpectedArgument {
        /// 1-based line number
        line: usize,
        /// Command word
        command: &'static str,
    },
}

impl ScriptError {
    /// Line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::UnknownCommand { line, .. }
            | Self::MissingArgument { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::UnexpectedArgument { line, .. } => *line,
        }
    }
}

/// Parse a whole script.
pub fn parse(text: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        commands.push(parse_line(index + 1, trimmed)?);
    }
    Ok(commands)
}

fn parse_line(line: usize, text: &str) -> Result<Command, ScriptError> {
    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    let command = match word {
        "online" => Command::Online(network(line, arg)?),
        "offline" => Command::Offline(network(line, arg)?),
        "started" => Command::Started(required(line, "started", arg, "a url")?),
        "finished" => Command::Finished(required(line, "finished", arg, "a url")?),
        "failed" => Command::Failed(required(line, "failed", arg, "a url")?),
        "navigate" => Command::Navigate(required(line, "navigate", arg, "a url")?),
        "invoke" => Command::Invoke(required(line, "invoke", arg, "a bridge message")?),
        "pick" => Command::FilePick(required(line, "pick", arg, "a file uri")?),
        "wait" => {
            let value = required(line, "wait", arg, "a duration in milliseconds")?;
            let millis = value.parse::<u64>().map_err(|_| ScriptError::InvalidNumber { line, value })?;
            Command::Wait(Duration::from_millis(millis))
        },
        "back" => bare(line, "back", arg, Command::Back)?,
        "back-root" => bare(line, "back-root", arg, Command::BackRoot)?,
        "file" => bare(line, "file", arg, Command::File)?,
        "file-cancel" => bare(line, "file-cancel", arg, Command::FileCancel)?,
        "grant-all" => bare(line, "grant-all", arg, Command::GrantAll)?,
        "deny-all" => bare(line, "deny-all", arg, Command::DenyAll)?,
        "splash-faded" => bare(line, "splash-faded", arg, Command::SplashFaded)?,
        "exit" => bare(line, "exit", arg, Command::Exit)?,
        other => return Err(ScriptError::UnknownCommand { line, command: other.to_string() }),
    };
    Ok(command)
}

fn network(line: usize, arg: Option<&str>) -> Result<NetworkId, ScriptError> {
    match arg {
        None => Ok(DEFAULT_NETWORK),
        Some(value) => value
            .parse()
            .map_err(|_| ScriptError::InvalidNumber { line, value: value.to_string() }),
    }
}

fn required(
    line: usize,
    command: &'static str,
    arg: Option<&str>,
    expected: &'static str,
) -> Result<String, ScriptError> {
    arg.map(str::to_string).ok_or(ScriptError::MissingArgument { line, command, expected })
}

fn bare(
    line: usize,
    command: &'static str,
    arg: Option<&str>,
    parsed: Command,
) -> Result<Command, ScriptError> {
    match arg {
        None => Ok(parsed),
        Some(_) => Err(ScriptError::UnexpectedArgument { line, command }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let script = "\
            online\n\
            offline 2\n\
            started https://app.example.com/\n\
            finished https://app.example.com/\n\
            failed https://app.example.com/\n\
            navigate https://elsewhere.example.org/\n\
            back\n\
            back-root\n\
            invoke {\"name\":\"vibrate\",\"arg\":200}\n\
            wait 1500\n\
            file\n\
            pick content://picked/1\n\
            file-cancel\n\
            grant-all\n\
            deny-all\n\
            splash-faded\n\
            exit\n";

        assert_eq!(parse(script).unwrap(), vec![
            Command::Online(DEFAULT_NETWORK),
            Command::Offline(2),
            Command::Started("https://app.example.com/".into()),
            Command::Finished("https://app.example.com/".into()),
            Command::Failed("https://app.example.com/".into()),
            Command::Navigate("https://elsewhere.example.org/".into()),
            Command::Back,
            Command::BackRoot,
            Command::Invoke(r#"{"name":"vibrate","arg":200}"#.into()),
            Command::Wait(Duration::from_millis(1_500)),
            Command::File,
            Command::FilePick("content://picked/1".into()),
            Command::FileCancel,
            Command::GrantAll,
            Command::DenyAll,
            Command::SplashFaded,
            Command::Exit,
        ]);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let script = "# boot\n\n   \n  back  \n# done\n";
        assert_eq!(parse(script).unwrap(), vec![Command::Back]);
    }

    #[test]
    fn invoke_keeps_inner_whitespace() {
        let commands = parse(r#"invoke  {"name": "notification", "arg": {"title": "a b"}}"#).unwrap();
        assert_eq!(commands, vec![Command::Invoke(
            r#"{"name": "notification", "arg": {"title": "a b"}}"#.into()
        )]);
    }

    #[test]
    fn display_parses_back() {
        let commands = parse("offline\nwait 250\npick content://x\nback-root\n").unwrap();
        let echoed: String = commands.iter().map(|c| format!("{c}\n")).collect();
        assert_eq!(parse(&echoed).unwrap(), commands);
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse("back\n# comment\nsideways\n").unwrap_err();
        assert_eq!(err, ScriptError::UnknownCommand { line: 3, command: "sideways".into() });
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(parse("wait soon"), Err(ScriptError::InvalidNumber { line: 1, .. })));
        assert!(matches!(parse("offline wifi"), Err(ScriptError::InvalidNumber { .. })));
        assert!(matches!(
            parse("started"),
            Err(ScriptError::MissingArgument { command: "started", .. })
        ));
        assert!(matches!(
            parse("exit now"),
            Err(ScriptError::UnexpectedArgument { command: "exit", .. })
        ));
    }
}
