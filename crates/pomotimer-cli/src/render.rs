//! Human-readable lines for timer events.

use pomotimer_core::{format_clock, Event, PresetConfig, Sound, TimerSnapshot};

pub fn settings(presets: &PresetConfig, sound: Sound) -> String {
    format!(
        "focus {}m, short break {}m, long break {}m, sound {}",
        presets.focus / 60,
        presets.short_break / 60,
        presets.long_break / 60,
        sound.label()
    )
}

pub fn snapshot_line(snapshot: &TimerSnapshot) -> String {
    let state = if snapshot.running { "running" } else { "paused" };
    format!(
        "[{}] {}  {} ({state})",
        snapshot.session.title(),
        snapshot.clock,
        snapshot.caption
    )
}

pub fn event_line(event: &Event) -> String {
    match event {
        Event::SessionStarted {
            session,
            remaining_secs,
            ..
        } => format!("started {} at {}", session.title(), format_clock(*remaining_secs)),
        Event::SessionPaused {
            session,
            remaining_secs,
            ..
        } => format!("paused {} at {}", session.title(), format_clock(*remaining_secs)),
        Event::SessionCompleted {
            finished,
            next,
            cycle_count,
            skipped,
            ..
        } => format!(
            "{} {} ({cycle_count} pomodoros). Up next: {}",
            finished.title(),
            if *skipped { "skipped" } else { "complete" },
            next.title()
        ),
        Event::SessionSwitched {
            session,
            remaining_secs,
            ..
        } => format!("switched to {} ({})", session.title(), format_clock(*remaining_secs)),
        Event::SessionReset {
            session,
            remaining_secs,
            ..
        } => format!("reset {} to {}", session.title(), format_clock(*remaining_secs)),
        Event::CyclesCleared { .. } => "pomodoro count cleared".to_string(),
        Event::SettingsApplied {
            presets,
            sound,
            countdown_reset,
            ..
        } => {
            let mut line = format!("settings saved: {}", settings(presets, *sound));
            if *countdown_reset {
                line.push_str(" (timer reset)");
            }
            line
        }
        Event::StateSnapshot(snapshot) => snapshot_line(snapshot),
    }
}
