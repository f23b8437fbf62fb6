//! Property tests for timer invariants.

use proptest::prelude::*;

use pomotimer_core::{
    MemoryPresetStore, PresetConfig, SessionMachine, SessionType, SettingsStaging, SilentNotifier,
    SilentPlayer, Sound, Volume,
};

#[derive(Debug, Clone)]
enum Intent {
    Start,
    Pause,
    Tick(u16),
    Complete,
    Skip,
    Switch(SessionType),
    Reset,
    Clear,
    ApplyMinutes(u32, u32, u32),
}

fn session_type() -> impl Strategy<Value = SessionType> {
    prop_oneof![
        Just(SessionType::Focus),
        Just(SessionType::ShortBreak),
        Just(SessionType::LongBreak),
    ]
}

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        3 => Just(Intent::Start),
        1 => Just(Intent::Pause),
        4 => (1u16..200).prop_map(Intent::Tick),
        1 => Just(Intent::Complete),
        1 => Just(Intent::Skip),
        1 => session_type().prop_map(Intent::Switch),
        1 => Just(Intent::Reset),
        1 => Just(Intent::Clear),
        1 => (1u32..4, 1u32..4, 1u32..4).prop_map(|(f, s, l)| Intent::ApplyMinutes(f, s, l)),
    ]
}

proptest! {
    #[test]
    fn state_stays_consistent_under_any_intent_sequence(intents in prop::collection::vec(intent(), 1..60)) {
        let store = MemoryPresetStore::new();
        let mut machine = SessionMachine::new(SilentNotifier, store);

        for intent in intents {
            match intent {
                Intent::Start => { machine.start(); }
                Intent::Pause => { machine.pause(); }
                Intent::Tick(n) => {
                    for _ in 0..n {
                        machine.tick();
                    }
                }
                Intent::Complete => { machine.complete_session(); }
                Intent::Skip => { machine.skip_current(); }
                Intent::Switch(session) => { machine.switch_to(session); }
                Intent::Reset => { machine.reset_current(); }
                Intent::Clear => { machine.clear_cycles(); }
                Intent::ApplyMinutes(f, s, l) => {
                    let presets = PresetConfig::from_minutes(f, s, l).unwrap();
                    machine.apply_settings(presets, Sound::EggTimer).unwrap();
                }
            }

            let preset = machine.presets().duration(machine.session_type());
            prop_assert!(machine.remaining_secs() <= preset);
            if machine.is_running() {
                prop_assert!(machine.remaining_secs() > 0);
            }
        }
    }

    #[test]
    fn committed_drafts_are_always_valid(edits in prop::collection::vec((session_type(), -100i64..2000), 0..20)) {
        let mut machine = SessionMachine::new(SilentNotifier, MemoryPresetStore::new());
        let mut staging = SettingsStaging::new(SilentPlayer, Volume::PREVIEW);
        staging.open(machine.presets(), machine.sound());

        for (session, minutes) in edits {
            let stored = staging.set_draft_duration(session, minutes).unwrap();
            prop_assert!(stored <= 999);
        }
        staging.save(&mut machine).unwrap();
        prop_assert!(machine.presets().validate().is_ok());
    }
}
