use clap::Subcommand;
use pomotimer_core::{
    Config, Database, DatabasePresetStore, SessionMachine, SessionType, SettingsStaging,
    SilentNotifier, SilentPlayer, Sound, Volume,
};

#[derive(Subcommand)]
pub enum PresetsAction {
    /// Print the saved durations (minutes) and alarm sound
    Show,
    /// Change durations and/or the alarm sound
    ///
    /// Durations are clamped to 1..=999 minutes. A duration change resets
    /// the countdown of any interactive session started afterwards.
    Set {
        /// Focus minutes
        #[arg(long, allow_negative_numbers = true)]
        focus: Option<i64>,
        /// Short break minutes
        #[arg(long, allow_negative_numbers = true)]
        short: Option<i64>,
        /// Long break minutes
        #[arg(long, allow_negative_numbers = true)]
        long: Option<i64>,
        /// Alarm sound (digital_alarm, egg_timer)
        #[arg(long)]
        sound: Option<Sound>,
    },
}

type Machine = SessionMachine<SilentNotifier, DatabasePresetStore>;

fn open_machine(db: Database) -> Machine {
    SessionMachine::new(SilentNotifier, DatabasePresetStore::new(db))
}

pub fn run(action: PresetsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PresetsAction::Show => {
            // Unreadable preferences show as defaults.
            let machine = open_machine(Database::open_or_memory()?);
            let presets = machine.presets();
            let json = serde_json::json!({
                "focus": presets.minutes(SessionType::Focus),
                "short_break": presets.minutes(SessionType::ShortBreak),
                "long_break": presets.minutes(SessionType::LongBreak),
                "sound": machine.sound(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        PresetsAction::Set {
            focus,
            short,
            long,
            sound,
        } => {
            let mut machine = open_machine(Database::open()?);
            let mut staging = SettingsStaging::new(SilentPlayer, Volume::PREVIEW);
            staging.open(machine.presets(), machine.sound());

            let edits = [
                (SessionType::Focus, focus),
                (SessionType::ShortBreak, short),
                (SessionType::LongBreak, long),
            ];
            for (session, minutes) in edits {
                if let Some(minutes) = minutes {
                    staging.set_draft_duration(session, minutes)?;
                }
            }
            if let Some(sound) = sound {
                staging.set_draft_sound(sound)?;
            }

            let event = staging.save(&mut machine)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}

pub fn list_sounds() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let sounds_dir = config.audio.sounds_dir()?;
    let selected = open_machine(Database::open_or_memory()?).sound();

    for sound in Sound::ALL {
        let path = sound.asset_path(&sounds_dir);
        let marker = if sound == selected { "*" } else { " " };
        let missing = if path.exists() { "" } else { " (missing)" };
        println!(
            "{marker} {:<14} {:<14} {}{missing}",
            sound.key(),
            sound.label(),
            path.display()
        );
    }
    Ok(())
}
