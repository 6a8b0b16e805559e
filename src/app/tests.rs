use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::*;
use crate::driver::{DriverClient, DriverError, DriverResult, LifecycleState, RadioType, ScanSort};
use crate::settings::{PersistedSettings, SettingsStore};

type CallLog = Arc<Mutex<Vec<&'static str>>>;

struct Observed {
    supported_frequencies: Vec<i32>,
    supported_bandwidths: Vec<f32>,
    frequency: i32,
    bandwidth: f32,
    power: i32,
    network_id: String,
}

/// Driver double that records every write into a log shared with the store
struct FakeDriver {
    calls: CallLog,
    observed: Mutex<Observed>,
    enable_calls: Mutex<Vec<(bool, RadioType)>>,
    reject: Option<&'static str>,
}

impl FakeDriver {
    fn record(&self, call: &'static str) -> DriverResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.reject == Some(call) {
            Err(DriverError::Rejected { call, code: -1 })
        } else {
            Ok(())
        }
    }

    fn observe(&self, f: impl FnOnce(&mut Observed)) {
        f(&mut self.observed.lock().unwrap());
    }
}

impl DriverClient for FakeDriver {
    fn state(&self) -> DriverResult<LifecycleState> {
        Ok(LifecycleState::Ready)
    }
    fn is_modem_connected(&self) -> DriverResult<bool> {
        Ok(false)
    }
    fn status_label(&self) -> DriverResult<String> {
        Ok("FAKE".to_string())
    }
    fn supported_frequencies(&self) -> DriverResult<Vec<i32>> {
        Ok(self.observed.lock().unwrap().supported_frequencies.clone())
    }
    fn supported_bandwidths(&self) -> DriverResult<Vec<f32>> {
        Ok(self.observed.lock().unwrap().supported_bandwidths.clone())
    }
    fn frequency(&self) -> DriverResult<i32> {
        Ok(self.observed.lock().unwrap().frequency)
    }
    fn bandwidth(&self) -> DriverResult<f32> {
        Ok(self.observed.lock().unwrap().bandwidth)
    }
    fn power(&self) -> DriverResult<i32> {
        Ok(self.observed.lock().unwrap().power)
    }
    fn network_id(&self) -> DriverResult<String> {
        Ok(self.observed.lock().unwrap().network_id.clone())
    }
    fn set_frequency_and_bandwidth(&self, _frequency: i32, _bandwidth: f32) -> DriverResult<()> {
        self.record("setFreqBW")
    }
    fn set_network_name(&self, _name: &str) -> DriverResult<()> {
        self.record("setNetworkName")
    }
    fn set_network_password(&self, _password: &str) -> DriverResult<()> {
        self.record("setNetworkPassword")
    }
    fn apply_settings(&self) -> DriverResult<()> {
        self.record("applySettings")
    }
    fn set_output_power(&self, _dbm: u8) -> DriverResult<()> {
        self.record("SetOutputPower")
    }
    fn enable_radio(&self, enable: bool, radio_type: RadioType) -> DriverResult<()> {
        self.enable_calls.lock().unwrap().push((enable, radio_type));
        self.record("enableRadio")
    }
    fn scan_channels(
        &self,
        _sort: ScanSort,
        _count: u32,
        _bandwidth: f32,
    ) -> DriverResult<Vec<i32>> {
        self.record("scanChannels").map(|()| Vec::new())
    }
    fn radio_log(&self) -> DriverResult<String> {
        Ok(String::new())
    }
}

struct FakeStore {
    calls: CallLog,
    settings: Mutex<PersistedSettings>,
}

impl SettingsStore for FakeStore {
    fn load(&self) -> Result<PersistedSettings> {
        Ok(self.settings.lock().unwrap().clone())
    }

    fn save(&self, settings: &PersistedSettings) -> Result<()> {
        self.calls.lock().unwrap().push("persist");
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }
}

struct Harness {
    model: Model,
    driver: FakeDriver,
    store: FakeStore,
    calls: CallLog,
}

impl Harness {
    fn with_settings(settings: PersistedSettings) -> Self {
        let calls = CallLog::default();
        Harness {
            model: Model::new("192.168.20.4"),
            driver: FakeDriver {
                calls: calls.clone(),
                observed: Mutex::new(Observed {
                    supported_frequencies: vec![5180, 5200, 5220, 5240],
                    supported_bandwidths: vec![5.0, 10.0, 20.0],
                    frequency: 5240,
                    bandwidth: 20.0,
                    power: 20,
                    network_id: "mesh".to_string(),
                }),
                enable_calls: Mutex::default(),
                reject: None,
            },
            store: FakeStore {
                calls: calls.clone(),
                settings: Mutex::new(settings),
            },
            calls,
        }
    }

    fn new() -> Self {
        Self::with_settings(PersistedSettings {
            network_id: Some("mesh".to_string()),
            network_pass: Some("AbCdEfGhIjKlMnOp".to_string()),
            radio_enabled: true,
            radio_selection: RadioType::TypeA,
            encryption_key: Some("AbCdEfGhIjKlMnOp".to_string()),
        })
    }

    fn send(&mut self, event: Event) -> Command {
        update(event, &mut self.model, &self.driver, &self.store)
    }

    fn sample(&mut self, state: LifecycleState) -> Command {
        self.send(Event::Sampled(Sample {
            state: Ok(state),
            connected: Ok(true),
            status_label: Ok("PDDL2450".to_string()),
        }))
    }

    /// Initialized, READY and seeded, with an empty call log
    fn ready() -> Self {
        let mut harness = Self::new();
        harness.send(Event::Initialize);
        harness.sample(LifecycleState::Ready);
        harness.clear_calls();
        harness
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn enable_calls(&self) -> Vec<(bool, RadioType)> {
        self.driver.enable_calls.lock().unwrap().clone()
    }

    fn working(&self) -> &RadioConfiguration {
        self.model
            .working
            .as_ref()
            .expect("working configuration should be seeded")
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn controls_disabled_outside_ready() {
        for state in [
            LifecycleState::Unknown,
            LifecycleState::Booting,
            LifecycleState::Configuring,
            LifecycleState::Removed,
        ] {
            let mut harness = Harness::new();
            harness.send(Event::Initialize);
            harness.sample(state);

            assert!(!view(&harness.model).controls_enabled, "{state}");
            assert!(harness.model.working.is_none(), "{state}");
        }
    }

    #[test]
    fn ready_enables_controls_and_seeds_from_radio() {
        let harness = Harness::ready();

        assert!(view(&harness.model).controls_enabled);
        assert_eq!(
            harness.working(),
            &RadioConfiguration {
                frequency: 5240,
                bandwidth: 20.0,
                transmit_power: 20,
                network_name: "mesh".to_string(),
                network_key: "AbCdEfGhIjKlMnOp".to_string(),
            }
        );
        assert_eq!(harness.model.supported_frequencies, vec![5180, 5200, 5220, 5240]);
    }

    #[test]
    fn staying_ready_keeps_user_edits() {
        let mut harness = Harness::ready();
        harness.send(Event::Edit(ConfigEdit::Frequency("5200".to_string())));
        harness.driver.observe(|o| o.frequency = 5180);

        harness.sample(LifecycleState::Ready);

        assert_eq!(harness.working().frequency, 5200);
    }

    #[test]
    fn reentering_ready_reseeds_from_radio() {
        let mut harness = Harness::ready();
        harness.send(Event::Edit(ConfigEdit::Frequency("5200".to_string())));

        harness.sample(LifecycleState::Configuring);
        assert!(harness.model.working.is_none());

        harness.driver.observe(|o| o.frequency = 5180);
        harness.sample(LifecycleState::Ready);

        assert_eq!(harness.working().frequency, 5180);
    }

    #[test]
    fn garbage_state_read_changes_nothing() {
        let mut harness = Harness::ready();

        let command = harness.send(Event::Sampled(Sample {
            state: Err(DriverError::InvalidValue {
                call: "getState",
                value: "\u{fffd}".to_string(),
            }),
            connected: Ok(true),
            status_label: Ok("PDDL2450".to_string()),
        }));

        assert_eq!(command, Command::Done);
        assert_eq!(harness.model.lifecycle, LifecycleState::Ready);
        assert!(harness.model.working.is_some());
    }

    #[test]
    fn power_outside_choices_falls_back_to_default() {
        let mut harness = Harness::new();
        harness.driver.observe(|o| o.power = 33);
        harness.send(Event::Initialize);
        harness.sample(LifecycleState::Ready);

        assert_eq!(harness.working().transmit_power, DEFAULT_POWER);
    }

    #[test]
    fn missing_key_is_generated_and_persisted() {
        let mut harness = Harness::with_settings(PersistedSettings::default());
        harness.send(Event::Initialize);
        harness.sample(LifecycleState::Ready);

        let key = harness.working().network_key.clone();
        assert_eq!(key.len(), 16);
        assert!(harness.calls().contains(&"persist"));
        assert_eq!(
            harness.store.settings.lock().unwrap().encryption_key,
            Some(key)
        );
    }
}

mod commit {
    use super::*;

    #[test]
    fn steps_run_in_documented_order() {
        let mut harness = Harness::ready();

        harness.send(Event::Commit);

        assert_eq!(
            harness.calls(),
            vec![
                "setFreqBW",
                "setNetworkName",
                "setNetworkPassword",
                "persist",
                "applySettings",
                "SetOutputPower",
            ]
        );
        assert_eq!(harness.model.notice.as_deref(), Some("Power set to 20"));
    }

    #[test]
    fn commit_persists_name_and_key() {
        let mut harness = Harness::ready();
        harness.send(Event::Edit(ConfigEdit::NetworkName("field-net".to_string())));
        harness.send(Event::Edit(ConfigEdit::NetworkKey("ZyXwVuTsRqPoNmLk".to_string())));

        harness.send(Event::Commit);

        let stored = harness.store.settings.lock().unwrap().clone();
        assert_eq!(stored.network_id.as_deref(), Some("field-net"));
        assert_eq!(stored.network_pass.as_deref(), Some("ZyXwVuTsRqPoNmLk"));
        assert_eq!(harness.model.persisted, stored);
    }

    #[test]
    fn empty_network_name_is_committed_as_is() {
        let mut harness = Harness::with_settings(PersistedSettings {
            network_pass: Some("AbCdEfGhIjKlMnOp".to_string()),
            ..Default::default()
        });
        harness.driver.observe(|o| o.network_id = String::new());
        harness.send(Event::Initialize);
        harness.sample(LifecycleState::Ready);
        harness.clear_calls();
        assert_eq!(harness.working().network_name, "");

        harness.send(Event::Commit);

        assert_eq!(
            harness.calls(),
            vec![
                "setFreqBW",
                "setNetworkName",
                "setNetworkPassword",
                "persist",
                "applySettings",
                "SetOutputPower",
            ]
        );
        assert_eq!(harness.model.notice.as_deref(), Some("Power set to 20"));
        assert_eq!(
            harness.store.settings.lock().unwrap().network_id.as_deref(),
            Some("")
        );
    }

    #[test]
    fn failed_step_does_not_stop_the_rest() {
        let mut harness = Harness::ready();
        harness.driver.reject = Some("setNetworkName");

        harness.send(Event::Commit);

        assert_eq!(harness.calls().len(), 6);
        assert_eq!(
            harness.model.notice.as_deref(),
            Some("Power set to 20 (failed: network name)")
        );
    }

    #[test]
    fn unparseable_input_discards_commit() {
        let mut harness = Harness::ready();
        harness.send(Event::Edit(ConfigEdit::TransmitPower("twenty".to_string())));

        harness.send(Event::Commit);

        assert!(harness.calls().is_empty());
        assert_eq!(
            harness.model.notice.as_deref(),
            Some("Invalid transmit power, nothing was applied")
        );
    }

    #[test]
    fn corrected_input_allows_commit_again() {
        let mut harness = Harness::ready();
        harness.send(Event::Edit(ConfigEdit::TransmitPower("twenty".to_string())));
        harness.send(Event::Edit(ConfigEdit::TransmitPower("25".to_string())));

        harness.send(Event::Commit);

        assert_eq!(harness.calls().len(), 6);
        assert_eq!(harness.model.notice.as_deref(), Some("Power set to 25"));
    }

    #[test]
    fn unsupported_frequency_is_invalid() {
        let mut harness = Harness::ready();

        harness.send(Event::Edit(ConfigEdit::Frequency("1234".to_string())));

        assert_eq!(harness.model.invalid_fields, vec![ConfigField::Frequency]);
        assert_eq!(harness.working().frequency, 5240);
    }

    #[test]
    fn commit_refused_outside_ready() {
        let mut harness = Harness::ready();
        harness.sample(LifecycleState::Booting);

        harness.send(Event::Commit);

        assert!(harness.calls().is_empty());
        assert_eq!(harness.model.notice.as_deref(), Some("Radio is not ready"));
    }
}

mod scan {
    use super::*;
    use crate::services::scan::ScanRequest;

    #[test]
    fn request_uses_current_bandwidth() {
        let mut harness = Harness::ready();

        let command = harness.send(Event::ScanRequested);

        assert_eq!(command, Command::Scan(ScanRequest::at_bandwidth(20.0)));
        assert!(view(&harness.model).is_scanning);
    }

    #[test]
    fn second_request_while_busy_is_ignored() {
        let mut harness = Harness::ready();
        harness.send(Event::ScanRequested);

        assert_eq!(harness.send(Event::ScanRequested), Command::Done);
    }

    #[test]
    fn first_candidate_is_recommended_and_accept_needs_no_driver_write() {
        let mut harness = Harness::ready();
        harness.send(Event::ScanRequested);

        harness.send(Event::ScanCompleted(Ok(vec![5180, 5200, 5220])));

        assert_eq!(harness.model.recommendation, Some(5180));
        assert!(!harness.model.is_scanning);

        harness.send(Event::RecommendationAccepted);

        assert_eq!(harness.working().frequency, 5180);
        assert!(harness.calls().is_empty());
        assert_eq!(
            harness.model.notice.as_deref(),
            Some("Frequency set to 5180")
        );
    }

    #[test]
    fn empty_result_shows_notice_without_dialog() {
        let mut harness = Harness::ready();
        harness.send(Event::ScanRequested);

        harness.send(Event::ScanCompleted(Ok(Vec::new())));

        let view = view(&harness.model);
        assert_eq!(view.notice.as_deref(), Some("No channels found."));
        assert!(!view.is_scanning);
        assert_eq!(view.recommendation_prompt, None);
    }

    #[test]
    fn failed_scan_clears_busy_indicator() {
        let mut harness = Harness::ready();
        harness.send(Event::ScanRequested);

        harness.send(Event::ScanCompleted(Err(DriverError::Unavailable {
            call: "scanChannels",
        })));

        assert!(!harness.model.is_scanning);
        assert_eq!(harness.model.recommendation, None);
    }

    #[test]
    fn decline_leaves_working_unchanged() {
        let mut harness = Harness::ready();
        harness.send(Event::ScanRequested);
        harness.send(Event::ScanCompleted(Ok(vec![5180])));

        harness.send(Event::RecommendationDeclined);

        assert_eq!(harness.model.recommendation, None);
        assert_eq!(harness.working().frequency, 5240);
    }

    #[test]
    fn unsupported_recommendation_is_not_applied() {
        let mut harness = Harness::ready();
        harness.send(Event::ScanRequested);
        harness.send(Event::ScanCompleted(Ok(vec![1640])));

        harness.send(Event::RecommendationAccepted);

        assert_eq!(harness.working().frequency, 5240);
    }
}

mod toggle {
    use super::*;

    #[test]
    fn first_observation_restores_with_exactly_one_call() {
        let mut harness = Harness::new();

        harness.send(Event::Initialize);
        harness.send(Event::RadioToggled {
            checked: true,
            type_a: true,
            type_b: false,
        });

        assert_eq!(harness.enable_calls(), vec![(true, RadioType::TypeA)]);
        assert!(harness.model.radio_enabled);
        assert_eq!(harness.model.radio_type, RadioType::TypeA);
    }

    #[test]
    fn reinitialize_restores_again() {
        let mut harness = Harness::ready();

        harness.send(Event::Initialize);

        assert_eq!(
            harness.enable_calls(),
            vec![(true, RadioType::TypeA), (true, RadioType::TypeA)]
        );
        assert!(harness.model.working.is_none());
    }

    #[test]
    fn flip_issues_call_and_persists() {
        let mut harness = Harness::ready();

        harness.send(Event::RadioToggled {
            checked: false,
            type_a: false,
            type_b: true,
        });

        assert_eq!(
            harness.enable_calls(),
            vec![(true, RadioType::TypeA), (false, RadioType::TypeB)]
        );
        assert_eq!(harness.calls(), vec!["enableRadio", "persist"]);
        let stored = harness.store.settings.lock().unwrap().clone();
        assert!(!stored.radio_enabled);
        assert_eq!(stored.radio_selection, RadioType::TypeB);
    }

    #[test]
    fn selected_type_reaches_every_view_consumer() {
        let mut harness = Harness::ready();

        harness.send(Event::RadioToggled {
            checked: false,
            type_a: false,
            type_b: true,
        });
        harness.send(Event::ShowPairing {
            width: 480,
            height: 480,
        });

        let view = view(&harness.model);
        assert_eq!(view.radio_type, RadioType::TypeB);
        assert!(!view.link_fields_visible);
        assert_eq!(
            view.pairing.as_ref().map(|p| p.payload.as_str()),
            Some("mesh//AbCdEfGhIjKlMnOp//5240//20//20.0//station//192.168.20.4")
        );

        let published = serde_json::to_value(&view).unwrap();
        assert_eq!(published["radioType"], 3);
        assert!(published["working"].get("radioType").is_none());
    }

    #[test]
    fn redundant_callback_is_skipped() {
        let mut harness = Harness::ready();
        let flip = Event::RadioToggled {
            checked: false,
            type_a: true,
            type_b: false,
        };

        harness.send(flip.clone());
        harness.send(flip);

        assert_eq!(harness.calls(), vec!["enableRadio", "persist"]);
    }
}

mod keys {
    use super::*;

    #[test]
    fn regenerate_replaces_presented_and_persisted_key() {
        let mut harness = Harness::ready();

        harness.send(Event::RegenerateKey);

        let key = harness.working().network_key.clone();
        assert_ne!(key, "AbCdEfGhIjKlMnOp");
        assert_eq!(key.len(), 16);
        assert_eq!(harness.calls(), vec!["persist"]);
        assert_eq!(
            harness.store.settings.lock().unwrap().encryption_key,
            Some(key)
        );
        assert_eq!(
            harness.model.notice.as_deref(),
            Some("New network key generated")
        );
    }
}

mod pairing {
    use super::*;

    #[test]
    fn first_render_uses_shorter_display_side() {
        let mut harness = Harness::ready();

        harness.send(Event::ShowPairing {
            width: 1080,
            height: 1920,
        });

        let pairing = view(&harness.model).pairing.expect("pairing should render");
        assert_eq!(pairing.size, 1080);
        assert_eq!(
            pairing.payload,
            "mesh//AbCdEfGhIjKlMnOp//5240//20//20//station//192.168.20.4"
        );
    }

    #[test]
    fn resize_is_clamped() {
        let mut harness = Harness::ready();
        harness.send(Event::ShowPairing {
            width: 1080,
            height: 1920,
        });

        harness.send(Event::PairingSizeChanged(50));

        assert_eq!(view(&harness.model).pairing.map(|p| p.size), Some(100));
    }

    #[test]
    fn payload_follows_edits() {
        let mut harness = Harness::ready();
        harness.send(Event::ShowPairing {
            width: 400,
            height: 400,
        });
        let before = view(&harness.model).pairing;

        harness.send(Event::Edit(ConfigEdit::Bandwidth("10".to_string())));

        assert_ne!(view(&harness.model).pairing, before);
    }

    #[test]
    fn hidden_outside_ready() {
        let mut harness = Harness::new();
        harness.send(Event::Initialize);
        harness.sample(LifecycleState::Booting);

        harness.send(Event::ShowPairing {
            width: 1080,
            height: 1920,
        });

        assert_eq!(view(&harness.model).pairing, None);
        assert!(!view(&harness.model).pairing_enabled);
    }
}

mod log {
    use super::*;

    #[test]
    fn fragments_render_only_when_non_empty() {
        let mut harness = Harness::ready();

        assert_eq!(harness.send(Event::LogFragment(String::new())), Command::Done);
        assert_eq!(
            harness.send(Event::LogFragment("setting output power\n".to_string())),
            Command::Render
        );
    }

    #[test]
    fn clear_empties_buffer() {
        let mut harness = Harness::ready();
        harness.send(Event::LogFragment("line\n".to_string()));
        harness.send(Event::VisibilityChanged(true));

        harness.send(Event::ClearLog);

        assert_eq!(view(&harness.model).log.as_deref(), Some(""));
    }
}
