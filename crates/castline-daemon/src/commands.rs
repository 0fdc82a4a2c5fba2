//! Console input parsing.
//!
//! Lines starting with `/` drive the simulated session manager; anything
//! else is a finalized voice transcript to send.

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(String),
    StartFailed(String),
    End(String),
    Suspend(String),
    Resume(String),
    /// Inbound message from the receiver on the open channel.
    Receive(String),
    Reopen,
    Status,
    /// Host went to the background.
    Pause,
    /// Host came back to the foreground.
    Foreground,
    Help,
    Quit,
    Transcript(String),
}

pub const HELP: &str = "\
commands:
  /start <id>     session started (opens the channel)
  /fail <id>      session failed to start
  /end <id>       session ended
  /suspend <id>   session suspended
  /resume <id>    session resumed (no channel is opened)
  /recv <text>    receiver sends <text> on the channel
  /reopen         request a channel on the current session
  /status         show session and channel state
  /pause          stop listening to session events
  /foreground     listen again and adopt the connected session
  /quit           close the channel and exit
anything else is sent as a message";

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Transcript(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "start" => Command::Start(session_arg(name, arg)?),
        "fail" => Command::StartFailed(session_arg(name, arg)?),
        "end" => Command::End(session_arg(name, arg)?),
        "suspend" => Command::Suspend(session_arg(name, arg)?),
        "resume" => Command::Resume(session_arg(name, arg)?),
        "recv" if !arg.is_empty() => Command::Receive(arg.to_string()),
        "recv" => return Err("/recv needs message text".to_string()),
        "reopen" => Command::Reopen,
        "status" => Command::Status,
        "pause" => Command::Pause,
        "foreground" => Command::Foreground,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: /{}", other)),
    };
    Ok(Some(command))
}

fn session_arg(name: &str, arg: &str) -> Result<String, String> {
    match arg.split_whitespace().next() {
        Some(id) => Ok(id.to_string()),
        None => Err(format!("/{} needs a session id", name)),
    }
}
