//! Integration tests for the session state machine.
//!
//! Drives the machine the way a front end does, one tick per simulated
//! second, and checks transitions, cycle counting, alerts and settings
//! application.

use pomotimer_core::{
    Alert, Event, MemoryPresetStore, Notifier, Permission, PresetConfig, PresetStore,
    Preferences, SessionMachine, SessionType, Sound,
};

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Debug, Default)]
struct RecordingNotifier {
    permission: Permission,
    requests: usize,
    alerts: Vec<Alert>,
}

impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        self.requests += 1;
        if self.permission == Permission::Default {
            self.permission = Permission::Granted;
        }
        self.permission
    }

    fn notify(&mut self, alert: &Alert) {
        if self.permission == Permission::Granted {
            self.alerts.push(alert.clone());
        }
    }
}

type Machine = SessionMachine<RecordingNotifier, MemoryPresetStore>;

fn machine() -> Machine {
    SessionMachine::new(RecordingNotifier::default(), MemoryPresetStore::new())
}

fn machine_with(presets: PresetConfig) -> Machine {
    let store = MemoryPresetStore::with_preferences(Preferences {
        presets,
        sound: Sound::default(),
    });
    SessionMachine::new(RecordingNotifier::default(), store)
}

/// Start the current session and tick until it completes.
fn run_to_completion(machine: &mut Machine) -> Event {
    machine.start();
    let limit = machine.remaining_secs();
    for _ in 0..limit {
        if let Some(event) = machine.tick() {
            return event;
        }
    }
    panic!("session did not complete within {limit} ticks");
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn focus_runs_down_into_short_break() {
    let mut machine = machine();
    machine.start();

    let mut completions = Vec::new();
    for _ in 0..1500 {
        assert!(machine.is_running());
        if let Some(event) = machine.tick() {
            completions.push(event);
        }
    }

    assert_eq!(completions.len(), 1);
    match &completions[0] {
        Event::SessionCompleted {
            finished,
            next,
            cycle_count,
            duration_secs,
            ..
        } => {
            assert_eq!(*finished, SessionType::Focus);
            assert_eq!(*next, SessionType::ShortBreak);
            assert_eq!(*cycle_count, 1);
            assert_eq!(*duration_secs, 1500);
        }
        other => panic!("expected SessionCompleted, got {other:?}"),
    }
    assert!(!machine.is_running());
    assert_eq!(machine.session_type(), SessionType::ShortBreak);
    assert_eq!(machine.remaining_secs(), 300);
    assert_eq!(machine.cycle_count(), 1);

    let alerts = &machine.notifier().alerts;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, "Pomodoro Complete");

    // Extra ticks after the crossing change nothing.
    assert!(machine.tick().is_none());
    assert_eq!(machine.remaining_secs(), 300);
}

#[test]
fn fourth_focus_routes_to_long_break() {
    let mut machine = machine_with(PresetConfig::from_minutes(1, 1, 2).unwrap());

    for round in 1..=3 {
        run_to_completion(&mut machine);
        assert_eq!(machine.session_type(), SessionType::ShortBreak, "round {round}");
        run_to_completion(&mut machine);
        assert_eq!(machine.session_type(), SessionType::Focus);
    }
    assert_eq!(machine.cycle_count(), 3);

    run_to_completion(&mut machine);
    assert_eq!(machine.cycle_count(), 4);
    assert_eq!(machine.session_type(), SessionType::LongBreak);
    assert_eq!(machine.remaining_secs(), 120);

    let titles: Vec<&str> = machine
        .notifier()
        .alerts
        .iter()
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(titles.last(), Some(&"Time for a Long Break!"));
    assert_eq!(titles.iter().filter(|t| **t == "Break is over!").count(), 3);

    run_to_completion(&mut machine);
    assert_eq!(machine.session_type(), SessionType::Focus);
    assert_eq!(machine.cycle_count(), 4);
}

#[test]
fn long_break_after_default_presets() {
    let mut machine = machine();
    for _ in 0..3 {
        run_to_completion(&mut machine);
        machine.switch_to(SessionType::Focus);
    }
    assert_eq!(machine.cycle_count(), 3);

    run_to_completion(&mut machine);
    assert_eq!(machine.cycle_count(), 4);
    assert_eq!(machine.session_type(), SessionType::LongBreak);
    assert_eq!(machine.remaining_secs(), 900);
    assert!(!machine.is_running());
}

#[test]
fn duration_change_resets_running_countdown() {
    let mut machine = machine();
    machine.start();
    for _ in 0..1380 {
        machine.tick();
    }
    assert_eq!(machine.remaining_secs(), 120);

    let presets = PresetConfig {
        focus: 1800,
        ..machine.presets()
    };
    let event = machine.apply_settings(presets, machine.sound()).unwrap();

    assert!(matches!(
        event,
        Event::SettingsApplied {
            countdown_reset: true,
            ..
        }
    ));
    assert!(!machine.is_running());
    assert_eq!(machine.remaining_secs(), 1800);
}

#[test]
fn sound_change_leaves_countdown_running() {
    let mut machine = machine();
    machine.start();
    for _ in 0..1380 {
        machine.tick();
    }

    let event = machine
        .apply_settings(machine.presets(), Sound::EggTimer)
        .unwrap();

    assert!(matches!(
        event,
        Event::SettingsApplied {
            countdown_reset: false,
            ..
        }
    ));
    assert!(machine.is_running());
    assert_eq!(machine.remaining_secs(), 120);
    assert_eq!(machine.sound(), Sound::EggTimer);
    assert_eq!(machine.store().load().sound, Sound::EggTimer);
}

#[test]
fn duplicate_completion_is_dropped() {
    let mut machine = machine();
    machine.start();

    assert!(machine.complete_session().is_some());
    assert!(machine.complete_session().is_none());

    assert_eq!(machine.session_type(), SessionType::ShortBreak);
    assert_eq!(machine.cycle_count(), 1);
    assert_eq!(machine.notifier().alerts.len(), 1);
}

#[test]
fn explicit_completion_after_zero_crossing_is_dropped() {
    let mut machine = machine_with(PresetConfig::from_minutes(1, 1, 1).unwrap());
    run_to_completion(&mut machine);
    assert!(machine.complete_session().is_none());
    assert_eq!(machine.session_type(), SessionType::ShortBreak);
    assert_eq!(machine.notifier().alerts.len(), 1);
}

#[test]
fn completion_after_restart_is_not_suppressed() {
    let mut machine = machine_with(PresetConfig::from_minutes(1, 1, 1).unwrap());
    run_to_completion(&mut machine);
    run_to_completion(&mut machine);
    assert_eq!(machine.session_type(), SessionType::Focus);
    assert_eq!(machine.notifier().alerts.len(), 2);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn switch_loads_preset_and_stops() {
    let presets = PresetConfig::from_minutes(40, 7, 20).unwrap();
    let mut machine = machine_with(presets);
    for session in SessionType::ALL {
        machine.start();
        machine.switch_to(session);
        assert_eq!(machine.remaining_secs(), presets.duration(session));
        assert!(!machine.is_running());
    }
}

#[test]
fn start_requests_permission_without_blocking() {
    let notifier = RecordingNotifier {
        permission: Permission::Denied,
        ..Default::default()
    };
    let mut machine = SessionMachine::new(notifier, MemoryPresetStore::new());
    assert!(machine.start().is_some());
    assert!(machine.is_running());
    assert_eq!(machine.notifier().requests, 1);

    // Denied permission suppresses the alert but not the transition.
    machine.complete_session();
    assert!(machine.notifier().alerts.is_empty());
    assert_eq!(machine.session_type(), SessionType::ShortBreak);
}

#[test]
fn resume_with_one_second_left_completes_on_next_tick() {
    let mut machine = machine();
    machine.start();
    for _ in 0..1499 {
        machine.tick();
    }
    assert_eq!(machine.remaining_secs(), 1);
    machine.pause();
    assert!(machine.start().is_some());
    assert!(machine.tick().is_some());
    assert_eq!(machine.session_type(), SessionType::ShortBreak);
}

#[test]
fn apply_settings_round_trips_through_store() {
    let mut machine = machine();
    let presets = PresetConfig::from_minutes(45, 10, 25).unwrap();
    machine.apply_settings(presets, Sound::EggTimer).unwrap();

    let stored = machine.store().load();
    assert_eq!(stored.presets, presets);
    assert_eq!(stored.sound, Sound::EggTimer);
    assert_eq!(machine.store().saves(), 1);
}

#[test]
fn alerts_carry_selected_sound_and_unique_tags() {
    let mut machine = machine_with(PresetConfig::from_minutes(1, 1, 1).unwrap());
    machine
        .apply_settings(machine.presets(), Sound::EggTimer)
        .unwrap();
    run_to_completion(&mut machine);
    std::thread::sleep(std::time::Duration::from_millis(2));
    run_to_completion(&mut machine);

    let alerts = &machine.notifier().alerts;
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|a| a.sound == Some(Sound::EggTimer) && a.renotify));
    assert_ne!(alerts[0].tag, alerts[1].tag);
}

#[test]
fn clear_cycles_restarts_the_long_break_count() {
    let mut machine = machine_with(PresetConfig::from_minutes(1, 1, 1).unwrap());
    for _ in 0..3 {
        run_to_completion(&mut machine);
        run_to_completion(&mut machine);
    }
    machine.clear_cycles();
    assert_eq!(machine.cycle_count(), 0);

    run_to_completion(&mut machine);
    assert_eq!(machine.session_type(), SessionType::ShortBreak);
}
