use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use pomotimer_core::{
    AudioPlayer, Config, Database, DatabasePresetStore, DesktopNotifier, Event, SessionMachine,
    SettingsStaging, SilentPlayer, Ticker,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::intent::{Intent, HELP};
use crate::render;

type Machine = SessionMachine<DesktopNotifier<Box<dyn AudioPlayer>>, DatabasePresetStore>;
type Staging = SettingsStaging<Box<dyn AudioPlayer>>;

#[derive(Args)]
pub struct RunArgs {
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Start the first focus session right away
    #[arg(long)]
    start: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session_loop(args));
    // A pending stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    result
}

fn player(config: &Config, sounds_dir: &Path) -> Box<dyn AudioPlayer> {
    if config.audio.enabled {
        backend(sounds_dir)
    } else {
        Box::new(SilentPlayer)
    }
}

#[cfg(feature = "rodio")]
fn backend(sounds_dir: &Path) -> Box<dyn AudioPlayer> {
    Box::new(pomotimer_core::audio::RodioPlayer::new(sounds_dir))
}

#[cfg(not(feature = "rodio"))]
fn backend(sounds_dir: &Path) -> Box<dyn AudioPlayer> {
    Box::new(pomotimer_core::CommandPlayer::new(sounds_dir))
}

struct Session {
    machine: Machine,
    staging: Staging,
    tasks: Vec<String>,
    json: bool,
}

async fn session_loop(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_default();
    let sounds_dir = config.audio.sounds_dir().unwrap_or_else(|e| {
        warn!(error = %e, "cannot resolve sounds directory");
        PathBuf::from("sounds")
    });
    let notifier = DesktopNotifier::new(
        config.notifications.app_name.clone(),
        config.notifications.enabled,
        player(&config, &sounds_dir),
        config.audio.alert_volume(),
    );
    let store = DatabasePresetStore::new(Database::open_or_memory()?);

    let mut session = Session {
        machine: SessionMachine::new(notifier, store),
        staging: SettingsStaging::new(player(&config, &sounds_dir), config.audio.preview_volume()),
        tasks: Vec::new(),
        json: args.json,
    };

    let (tx, mut ticks) = mpsc::channel(8);
    let mut ticker = Ticker::every_second(tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.show_snapshot()?;
    if args.start {
        session.dispatch(Intent::Start)?;
        sync_ticker(&mut ticker, session.machine.is_running());
    }

    loop {
        tokio::select! {
            Some(signal) = ticks.recv() => {
                if !ticker.accepts(&signal) {
                    debug!(generation = signal.generation, "stale tick dropped");
                    continue;
                }
                session.on_tick()?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Intent>() {
                    Ok(Intent::Quit) => break,
                    Ok(intent) => session.dispatch(intent)?,
                    Err(message) => eprintln!("{message}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        sync_ticker(&mut ticker, session.machine.is_running());
    }

    ticker.stop();
    session.staging.cancel();
    Ok(())
}

/// The ticker runs exactly while the machine does.
fn sync_ticker(ticker: &mut Ticker, running: bool) {
    if running {
        ticker.start();
    } else {
        ticker.stop();
    }
}

impl Session {
    fn on_tick(&mut self) -> Result<(), Box<dyn Error>> {
        match self.machine.tick() {
            Some(event) => self.emit(&event),
            None => {
                let remaining = self.machine.remaining_secs();
                if !self.json && remaining % 60 == 0 {
                    self.show_snapshot()?;
                }
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, intent: Intent) -> Result<(), Box<dyn Error>> {
        let event = match intent {
            Intent::Toggle if self.machine.is_running() => self.machine.pause(),
            Intent::Toggle | Intent::Start => self.machine.start(),
            Intent::Pause => self.machine.pause(),
            Intent::Reset => Some(self.machine.reset_current()),
            Intent::Skip => self.machine.skip_current(),
            Intent::Switch(session) => Some(self.machine.switch_to(session)),
            Intent::ClearCycles => Some(self.machine.clear_cycles()),
            Intent::Status => return self.show_snapshot(),
            Intent::OpenSettings => {
                self.staging.open(self.machine.presets(), self.machine.sound());
                return self.show_draft();
            }
            Intent::SetDuration { session, input } => {
                let staged = self
                    .staging
                    .edit_draft_duration(session, &input)
                    .and_then(|_| self.staging.commit_draft_duration(session));
                return match staged {
                    Ok(_) => self.show_draft(),
                    Err(e) => {
                        eprintln!("{e}");
                        Ok(())
                    }
                };
            }
            Intent::SetSound(sound) => {
                return match self.staging.set_draft_sound(sound) {
                    Ok(()) => self.show_draft(),
                    Err(e) => {
                        eprintln!("{e}");
                        Ok(())
                    }
                };
            }
            Intent::SaveSettings => match self.staging.save(&mut self.machine) {
                Ok(event) => Some(event),
                Err(e) => {
                    eprintln!("error: {e}");
                    None
                }
            },
            Intent::CancelSettings => {
                self.staging.cancel();
                let discarded = serde_json::json!({ "type": "settings_discarded" });
                return self.print_json_or(&discarded, || "settings discarded".to_string());
            }
            Intent::AddTask(text) => {
                self.tasks.push(text);
                return Ok(());
            }
            Intent::ListTasks => {
                let tasks = &self.tasks;
                return self.print_json_or(tasks, || {
                    tasks
                        .iter()
                        .enumerate()
                        .map(|(i, task)| format!("{}. {task}", i + 1))
                        .collect::<Vec<_>>()
                        .join("\n")
                });
            }
            Intent::Help => {
                println!("{HELP}");
                return Ok(());
            }
            Intent::Quit => return Ok(()),
        };

        match event {
            Some(event) => self.emit(&event),
            None => Ok(()),
        }
    }

    fn emit(&self, event: &Event) -> Result<(), Box<dyn Error>> {
        if let Event::SessionCompleted {
            finished,
            duration_secs,
            skipped,
            at,
            ..
        } = event
        {
            let db = self.machine.store().database();
            if let Err(e) = db.record_session(*finished, *duration_secs, *skipped, *at) {
                warn!(error = %e, "failed to record completed session");
            }
        }
        self.print_json_or(event, || render::event_line(event))
    }

    fn show_snapshot(&self) -> Result<(), Box<dyn Error>> {
        let snapshot = self.machine.snapshot();
        let line = render::snapshot_line(&snapshot);
        self.print_json_or(&Event::StateSnapshot(snapshot), || line)
    }

    fn show_draft(&self) -> Result<(), Box<dyn Error>> {
        let Some(draft) = self.staging.draft() else {
            return Ok(());
        };
        self.print_json_or(draft, || format!("draft: {}", render::settings(&draft.presets, draft.sound)))
    }

    fn print_json_or<T: serde::Serialize>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), Box<dyn Error>> {
        let line = if self.json {
            serde_json::to_string(value)?
        } else {
            text()
        };
        let mut stdout = std::io::stdout().lock();
        if !line.is_empty() {
            writeln!(stdout, "{line}")?;
        }
        stdout.flush()?;
        Ok(())
    }
}
