use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    access::AccessList,
    config::Config,
    lamps::LampBank,
    models::{
        Card, CommandView, DeviceStateView, ExportRow, LightStrip, SensorData, SensorSummary,
        SolarPanel, StatusView, WeatherForecast,
    },
    telemetry::TelemetryLog,
};

/// Lamp switched on when an authorized card is presented.
pub const ENTRY_LAMP: usize = 0;

/// Single owner of the hub's shared state.
///
/// Every operation takes the one lock for its whole duration, persistence
/// included, so readers never see a half-applied update and a change is
/// never visible without its durable record. Cheap to clone; clones share
/// state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Mutex<HubState>>,
}

struct HubState {
    latest: SensorData,
    relay_target: bool,
    lamps: LampBank,
    light_strip: LightStrip,
    telemetry: TelemetryLog,
    access: AccessList,
    weather: String,
    forecast: WeatherForecast,
    solar: SolarPanel,
}

impl Coordinator {
    pub fn new(access: AccessList, telemetry: TelemetryLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubState {
                latest: SensorData::default(),
                relay_target: false,
                lamps: LampBank::new(),
                light_strip: LightStrip::default(),
                telemetry,
                access,
                weather: "--°C".to_owned(),
                forecast: WeatherForecast::default(),
                solar: SolarPanel::default(),
            })),
        }
    }

    /// Load the access list and the telemetry archive from disk.
    pub async fn load(config: &Config) -> Self {
        let access = AccessList::load(&config.cards_path, config.allow_all_when_empty).await;
        let telemetry = TelemetryLog::load(&config.archive_path).await;
        Self::new(access, telemetry)
    }

    // -----------------------------------------------------------------------
    // Telemetry
    // -----------------------------------------------------------------------

    /// Store a report from the sensor board and hand back the commands it
    /// should act on.
    pub async fn apply_telemetry(&self, mut data: SensorData) -> CommandView {
        let mut state = self.inner.lock().await;
        data.time = Utc::now();

        info!(
            temp = data.temp,
            hum = data.hum,
            relay = data.relay,
            "Telemetry received"
        );
        state.telemetry.record(&data).await;
        state.latest = data;

        let view = CommandView {
            command_relay: state.relay_target,
            lamp_commands: state.lamps.commands(),
            lamp_auto_modes: state.lamps.auto_modes(),
            message: state.weather.clone(),
        };
        info!(command_relay = view.command_relay, "Commands sent to sensor board");
        view
    }

    pub async fn archive_len(&self) -> usize {
        self.inner.lock().await.telemetry.archive_len()
    }

    pub async fn export_rows(&self) -> Vec<ExportRow> {
        self.inner.lock().await.telemetry.export_rows()
    }

    // -----------------------------------------------------------------------
    // Access control
    // -----------------------------------------------------------------------

    /// Check `uid` against the allow-list. On grant the entry lamp is forced
    /// on under manual control and `uid` becomes the last seen card.
    pub async fn authorize_card(&self, uid: &str) -> bool {
        let mut state = self.inner.lock().await;
        let granted = state.access.is_authorized(uid);
        info!(card_uid = %uid, granted, "RFID access attempt");

        if granted {
            state.lamps.set_state(ENTRY_LAMP, true);
            state.latest.card_uid = uid.to_owned();
        }
        granted
    }

    pub async fn list_cards(&self) -> Vec<Card> {
        self.inner.lock().await.access.list()
    }

    /// Returns `false` when a card with the same uid is already listed.
    pub async fn add_card(&self, card: Card) -> bool {
        let uid = card.uid.clone();
        let added = self.inner.lock().await.access.add(card).await;
        info!(card_uid = %uid, added, "Card enrollment");
        added
    }

    pub async fn remove_card(&self, uid: &str) {
        self.inner.lock().await.access.remove(uid).await;
        info!(card_uid = %uid, "Card removed");
    }

    // -----------------------------------------------------------------------
    // Lamps
    // -----------------------------------------------------------------------

    pub async fn toggle_lamp(&self, index: usize) -> Option<bool> {
        let on = self.inner.lock().await.lamps.toggle(index);
        if let Some(on) = on {
            info!(lamp = index, on, "Lamp toggled");
        }
        on
    }

    pub async fn set_lamp_state(&self, index: usize, on: bool) -> Option<bool> {
        let res = self.inner.lock().await.lamps.set_state(index, on);
        if res.is_some() {
            info!(lamp = index, on, "Lamp set");
        }
        res
    }

    pub async fn set_all_lamps(&self, on: bool) {
        self.inner.lock().await.lamps.set_all(on);
        info!(on, "All lamps set");
    }

    pub async fn set_lamp_timer(&self, index: usize, minutes: i64) -> Option<Option<DateTime<Utc>>> {
        self.set_lamp_timer_at(index, minutes, Utc::now()).await
    }

    pub async fn set_lamp_timer_at(
        &self,
        index: usize,
        minutes: i64,
        now: DateTime<Utc>,
    ) -> Option<Option<DateTime<Utc>>> {
        let res = self.inner.lock().await.lamps.set_timer(index, minutes, now);
        match res {
            Some(Some(expiry)) => info!(lamp = index, minutes, expiry = %expiry, "Lamp timer set"),
            Some(None) => info!(lamp = index, "Lamp on without timer"),
            None => {}
        }
        res
    }

    pub async fn toggle_lamp_auto(&self, index: usize) -> Option<bool> {
        let auto = self.inner.lock().await.lamps.toggle_auto(index);
        if let Some(auto) = auto {
            info!(lamp = index, auto, "Lamp auto mode toggled");
        }
        auto
    }

    pub async fn lamp_commands(&self) -> Vec<bool> {
        self.inner.lock().await.lamps.commands()
    }

    /// One pass of the timer engine.
    pub async fn tick(&self) -> Vec<usize> {
        self.tick_at(Utc::now()).await
    }

    pub async fn tick_at(&self, now: DateTime<Utc>) -> Vec<usize> {
        let expired = self.inner.lock().await.lamps.tick(now);
        for lamp in &expired {
            info!(lamp, "Lamp timer expired, turning off");
        }
        expired
    }

    // -----------------------------------------------------------------------
    // Relay and light strip
    // -----------------------------------------------------------------------

    pub async fn toggle_relay(&self) -> bool {
        let mut state = self.inner.lock().await;
        state.relay_target = !state.relay_target;
        info!(relay_target = state.relay_target, "Relay toggle requested");
        state.relay_target
    }

    pub async fn set_relay(&self, on: bool) {
        self.inner.lock().await.relay_target = on;
        info!(relay_target = on, "Relay set requested");
    }

    pub async fn relay_target(&self) -> bool {
        self.inner.lock().await.relay_target
    }

    pub async fn set_light_strip(&self, strip: LightStrip) {
        self.inner.lock().await.light_strip = strip;
        info!(
            on = strip.state,
            r = strip.r,
            g = strip.g,
            b = strip.b,
            brightness = strip.brightness,
            "Light strip updated"
        );
    }

    pub async fn light_strip(&self) -> LightStrip {
        self.inner.lock().await.light_strip
    }

    // -----------------------------------------------------------------------
    // Feed data
    // -----------------------------------------------------------------------

    pub async fn update_weather_message(&self, message: String) {
        self.inner.lock().await.weather = message;
    }

    pub async fn update_forecast(&self, forecast: WeatherForecast) {
        self.inner.lock().await.forecast = forecast;
    }

    pub async fn update_solar_panel(&self, solar: SolarPanel) {
        self.inner.lock().await.solar = solar;
    }

    pub async fn solar_panel(&self) -> SolarPanel {
        self.inner.lock().await.solar.clone()
    }

    // -----------------------------------------------------------------------
    // Read views
    // -----------------------------------------------------------------------

    pub async fn snapshot(&self) -> StatusView {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> StatusView {
        let state = self.inner.lock().await;
        StatusView {
            data: state.latest.clone(),
            history: state.telemetry.chart(),
            relay_target: state.relay_target,
            weather: state.weather.clone(),
            last_access: format!("Last entry: {}", state.latest.card_uid),
            lamps: state.lamps.commands(),
            lamps_auto: state.lamps.auto_modes(),
            timers: state.lamps.remaining_all(now),
            clock: now.with_timezone(&Local).format("%H:%M").to_string(),
            solar_panel: state.solar.clone(),
            weather_forecast: state.forecast.clone(),
        }
    }

    pub async fn device_state(&self) -> DeviceStateView {
        let state = self.inner.lock().await;
        DeviceStateView {
            lamp_commands: state.lamps.commands(),
            sensors: SensorSummary {
                temp: state.latest.temp,
                hum: state.latest.hum,
                soil: state.latest.soil,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::{models::LAMP_COUNT, store::tests::temp_path};

    pub(crate) fn test_coordinator() -> Coordinator {
        Coordinator::new(
            AccessList::new(temp_path("cards.json"), Vec::new(), true),
            TelemetryLog::new(temp_path("data.json"), Vec::new()),
        )
    }

    fn card(uid: &str) -> Card {
        Card {
            uid: uid.to_owned(),
            name: format!("card {uid}"),
        }
    }

    #[tokio::test]
    async fn telemetry_response_carries_relay_target() {
        let hub = test_coordinator();
        hub.set_relay(true).await;

        let view = hub
            .apply_telemetry(SensorData {
                temp: 21.5,
                ..Default::default()
            })
            .await;

        assert!(view.command_relay);
        assert_eq!(view.lamp_commands, vec![false; LAMP_COUNT]);
        assert_eq!(view.message, "--°C");

        let status = hub.snapshot().await;
        assert_eq!(status.history.last().unwrap().v, 21.5);
        assert_eq!(status.data.temp, 21.5);
        assert_eq!(hub.archive_len().await, 1);
    }

    #[tokio::test]
    async fn telemetry_never_changes_relay_target() {
        let hub = test_coordinator();
        hub.apply_telemetry(SensorData {
            relay: true,
            ..Default::default()
        })
        .await;

        assert!(!hub.relay_target().await);
        assert!(hub.snapshot().await.data.relay);
    }

    #[tokio::test]
    async fn telemetry_time_is_stamped_by_hub() {
        let hub = test_coordinator();
        let before = Utc::now();
        hub.apply_telemetry(SensorData::default()).await;
        assert!(hub.snapshot().await.data.time >= before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reports_archive_in_time_order() {
        let hub = test_coordinator();
        let mut tasks = Vec::new();
        for i in 0..32 {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                hub.apply_telemetry(SensorData {
                    temp: i as f64,
                    ..SensorData::default()
                })
                .await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let rows = hub.export_rows().await;
        assert_eq!(rows.len(), 32);
        assert!(rows.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[tokio::test]
    async fn telemetry_response_reflects_weather_message() {
        let hub = test_coordinator();
        hub.update_weather_message("12.3°C".to_owned()).await;
        let view = hub.apply_telemetry(SensorData::default()).await;
        assert_eq!(view.message, "12.3°C");
    }

    #[tokio::test]
    async fn bootstrap_mode_grants_any_card_and_lights_entry() {
        let hub = test_coordinator();
        hub.toggle_lamp_auto(ENTRY_LAMP).await;

        assert!(hub.authorize_card("CAFE01").await);
        let status = hub.snapshot().await;
        assert!(status.lamps[ENTRY_LAMP]);
        assert!(!status.lamps_auto[ENTRY_LAMP]);
        assert_eq!(status.data.card_uid, "CAFE01");
        assert_eq!(status.last_access, "Last entry: CAFE01");
    }

    #[tokio::test]
    async fn enrolled_list_denies_unknown_cards() {
        let hub = test_coordinator();
        assert!(hub.add_card(card("A1")).await);

        assert!(!hub.authorize_card("B2").await);
        let status = hub.snapshot().await;
        assert!(!status.lamps[ENTRY_LAMP]);
        assert!(status.data.card_uid.is_empty());

        assert!(hub.authorize_card("A1").await);
    }

    #[tokio::test]
    async fn grant_forces_entry_lamp_on_regardless_of_prior_state() {
        let hub = test_coordinator();
        hub.set_lamp_state(ENTRY_LAMP, true).await;
        hub.toggle_lamp_auto(ENTRY_LAMP).await;
        assert!(hub.authorize_card("X").await);
        let status = hub.snapshot().await;
        assert!(status.lamps[ENTRY_LAMP]);
        assert!(!status.lamps_auto[ENTRY_LAMP]);
    }

    #[tokio::test]
    async fn card_add_remove_round_trip() {
        let hub = test_coordinator();
        hub.add_card(card("A1")).await;
        let before = hub.list_cards().await;

        hub.add_card(card("B2")).await;
        hub.remove_card("B2").await;
        assert_eq!(hub.list_cards().await, before);

        hub.remove_card("missing").await;
        assert_eq!(hub.list_cards().await, before);
    }

    #[tokio::test]
    async fn out_of_range_lamp_commands_change_nothing() {
        let hub = test_coordinator();
        let before = hub.snapshot().await;

        assert_eq!(hub.toggle_lamp(LAMP_COUNT).await, None);
        assert_eq!(hub.set_lamp_state(42, true).await, None);
        assert_eq!(hub.set_lamp_timer(6, 5).await, None);
        assert_eq!(hub.toggle_lamp_auto(100).await, None);

        let after = hub.snapshot().await;
        assert_eq!(before.lamps, after.lamps);
        assert_eq!(before.lamps_auto, after.lamps_auto);
        assert_eq!(before.timers, after.timers);
    }

    #[tokio::test]
    async fn zero_minute_timer_keeps_lamp_on() {
        let hub = test_coordinator();
        let now = Utc::now();
        hub.set_lamp_timer_at(2, 0, now).await;
        hub.tick_at(now + TimeDelta::hours(1)).await;

        let status = hub.snapshot_at(now + TimeDelta::hours(1)).await;
        assert!(status.lamps[2]);
        assert_eq!(status.timers[2], 0);

        hub.set_lamp_state(2, false).await;
        assert!(!hub.snapshot().await.lamps[2]);
    }

    #[tokio::test]
    async fn timer_counts_down_then_expires() {
        let hub = test_coordinator();
        let now = Utc::now();
        hub.set_lamp_timer_at(4, 1, now).await;

        assert_eq!(hub.snapshot_at(now).await.timers[4], 60);
        assert_eq!(hub.snapshot_at(now + TimeDelta::seconds(30)).await.timers[4], 30);

        let expired = hub.tick_at(now + TimeDelta::seconds(60)).await;
        assert_eq!(expired, vec![4]);
        let status = hub.snapshot_at(now + TimeDelta::seconds(60)).await;
        assert!(!status.lamps[4]);
        assert_eq!(status.timers[4], 0);
    }

    #[tokio::test]
    async fn manual_override_beats_timer() {
        let hub = test_coordinator();
        let now = Utc::now();
        hub.set_lamp_timer_at(1, 10, now).await;
        hub.set_all_lamps(true).await;

        let status = hub.snapshot_at(now).await;
        assert_eq!(status.timers, vec![0; LAMP_COUNT]);
        assert_eq!(status.lamps, vec![true; LAMP_COUNT]);
    }

    #[tokio::test]
    async fn concurrent_toggles_and_ticks_keep_invariant() {
        let hub = test_coordinator();
        let lamp = 3;
        let mut tasks = Vec::new();

        for i in 0..96 {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                match i % 6 {
                    0 => {
                        hub.toggle_lamp(lamp).await;
                    }
                    1 => {
                        hub.set_lamp_timer(lamp, 5).await;
                    }
                    2 => {
                        hub.tick().await;
                    }
                    3 => {
                        hub.toggle_lamp_auto(lamp).await;
                        hub.tick().await;
                    }
                    4 => {
                        hub.set_lamp_timer(lamp, 5).await;
                        hub.toggle_lamp_auto(lamp).await;
                        hub.tick().await;
                    }
                    _ => {
                        hub.toggle_lamp(lamp).await;
                        hub.tick().await;
                    }
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let state = hub.inner.lock().await;
        let auto = state.lamps.is_auto(lamp).unwrap();
        let timer = state.lamps.timer(lamp);
        assert!(!(auto && timer.is_some()));
        if !state.lamps.is_on(lamp).unwrap() {
            assert!(timer.is_none());
        }
    }

    #[tokio::test]
    async fn relay_toggle_and_set() {
        let hub = test_coordinator();
        assert!(hub.toggle_relay().await);
        assert!(!hub.toggle_relay().await);
        hub.set_relay(true).await;
        assert!(hub.relay_target().await);
        assert!(hub.snapshot().await.relay_target);
    }

    #[tokio::test]
    async fn light_strip_is_replaced_wholesale() {
        let hub = test_coordinator();
        assert_eq!(hub.light_strip().await, LightStrip::default());

        let strip = LightStrip {
            state: false,
            r: 10,
            g: 20,
            b: 30,
            brightness: 40,
        };
        hub.set_light_strip(strip).await;
        assert_eq!(hub.light_strip().await, strip);
    }

    #[tokio::test]
    async fn device_state_combines_commands_and_sensors() {
        let hub = test_coordinator();
        hub.set_lamp_state(5, true).await;
        hub.apply_telemetry(SensorData {
            temp: 19.0,
            hum: 55.0,
            soil: 40,
            ..Default::default()
        })
        .await;

        let view = hub.device_state().await;
        assert!(view.lamp_commands[5]);
        assert_eq!(view.sensors.temp, 19.0);
        assert_eq!(view.sensors.soil, 40);
        assert_eq!(hub.lamp_commands().await, view.lamp_commands);
    }
}
