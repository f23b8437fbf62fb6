//! Line commands accepted by `pomotimer run`.

use std::str::FromStr;

use pomotimer_core::{SessionType, Sound};

pub const HELP: &str = "\
commands:
  <enter> | toggle        start or pause
  start | pause           start or pause explicitly
  reset                   reload the current session's duration
  skip                    finish the current session now
  focus | short | long    switch session
  clear                   reset the pomodoro count
  status                  print the current state
  settings                open the settings draft
  set <session> <min>     edit a draft duration
  sound <name>            pick a draft alarm sound
  save | cancel           commit or discard the draft
  task <text> | tasks     add to or list the task list
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Toggle,
    Start,
    Pause,
    Reset,
    Skip,
    Switch(SessionType),
    ClearCycles,
    Status,
    OpenSettings,
    SetDuration { session: SessionType, input: String },
    SetSound(Sound),
    SaveSettings,
    CancelSettings,
    AddTask(String),
    ListTasks,
    Help,
    Quit,
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let intent = match word.to_ascii_lowercase().as_str() {
            "" | "toggle" => Intent::Toggle,
            "start" | "resume" => Intent::Start,
            "pause" | "stop" => Intent::Pause,
            "reset" => Intent::Reset,
            "skip" | "complete" => Intent::Skip,
            "clear" => Intent::ClearCycles,
            "status" => Intent::Status,
            "settings" => Intent::OpenSettings,
            "set" => {
                let (session, input) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("usage: set <session> <minutes>")?;
                Intent::SetDuration {
                    session: session.parse().map_err(|e| format!("{e}"))?,
                    input: input.trim().to_string(),
                }
            }
            "sound" => Intent::SetSound(rest.parse().map_err(|e| format!("{e}"))?),
            "save" => Intent::SaveSettings,
            "cancel" => Intent::CancelSettings,
            "task" if rest.is_empty() => return Err("usage: task <text>".into()),
            "task" => Intent::AddTask(rest.to_string()),
            "tasks" => Intent::ListTasks,
            "help" | "?" => Intent::Help,
            "quit" | "exit" | "q" => Intent::Quit,
            other => match other.parse::<SessionType>() {
                Ok(session) if rest.is_empty() => Intent::Switch(session),
                _ => return Err(format!("unknown command '{line}' (try 'help')")),
            },
        };
        Ok(intent)
    }
}
