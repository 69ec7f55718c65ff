use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use tokio::time::interval;
use tracing::{ debug, error, info, warn };
use uuid::Uuid;

use crate::enums::AlertKind;
use crate::error::Result;
use crate::services::weather_service::WeatherReading;

/// How often a sweep over all enabled preferences starts.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 600;
/// Delay after each subscription, to stay under the provider's rate limit.
pub const DEFAULT_PACE_DELAY_MS: u64 = 1_000;
/// Trailing window during which a repeat alert of the same kind for the same
/// user and city is suppressed.
pub const DEFAULT_DEDUP_WINDOW_SECS: i64 = 3_600;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub check_interval: Duration,
    pub pace_delay: Duration,
    pub dedup_window: chrono::Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            pace_delay: Duration::from_millis(DEFAULT_PACE_DELAY_MS),
            dedup_window: chrono::Duration::seconds(DEFAULT_DEDUP_WINDOW_SECS),
        }
    }
}

/// One enabled alert preference joined with the owning user's contact info.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub user_id: Uuid,
    pub city_name: String,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub user_email: String,
    pub user_name: Option<String>,
}

/// A ledger entry for a delivered notification.
#[derive(Debug, Clone)]
pub struct NewAlertEvent {
    pub user_id: Uuid,
    pub city_name: String,
    pub kind: AlertKind,
    pub temperature: f64,
    pub threshold: f64,
}

/// Storage seam for the monitor: subscription snapshot plus the dedup ledger.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn load_enabled_subscriptions(&self) -> Result<Vec<Subscription>>;

    async fn was_recently_sent(
        &self,
        user_id: Uuid,
        city_name: &str,
        kind: AlertKind,
        cutoff: DateTime<Utc>
    ) -> Result<bool>;

    async fn record_alert(&self, event: NewAlertEvent) -> Result<()>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_reading(&self, city: &str) -> Result<WeatherReading>;
}

#[async_trait]
pub trait AlertMailer: Send + Sync {
    async fn send_temperature_alert(
        &self,
        to: &str,
        city: &str,
        kind: AlertKind,
        observed_temp: f64,
        threshold: f64
    ) -> bool;
}

/// Outcome of one sweep, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub subscriptions: usize,
    pub alerts_sent: usize,
    pub failures: usize,
}

/// Periodically sweeps all enabled alert preferences, compares live
/// temperatures against their thresholds and emails the owner on a crossing.
///
/// Collaborators are injected so tests can substitute fakes. Sweeps are
/// strictly sequential; overlapping sweeps are not mutually excluded and the
/// dedup window is the only backstop against duplicates in that case.
pub struct AlertMonitor {
    store: Arc<dyn AlertStore>,
    weather: Arc<dyn WeatherProvider>,
    mailer: Arc<dyn AlertMailer>,
    config: MonitorConfig,
}

impl AlertMonitor {
    pub fn new(
        store: Arc<dyn AlertStore>,
        weather: Arc<dyn WeatherProvider>,
        mailer: Arc<dyn AlertMailer>,
        config: MonitorConfig
    ) -> Self {
        Self {
            store,
            weather,
            mailer,
            config,
        }
    }

    /// Run sweeps forever on the configured interval.
    pub async fn start(self) {
        let mut ticker = interval(self.config.check_interval);

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// One full sweep over all enabled alert preferences.
    pub async fn run_once(&self) -> RunReport {
        info!("starting weather alert sweep");

        let subscriptions = match self.store.load_enabled_subscriptions().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                // Whole-batch failure: nothing was processed, retry next sweep
                error!(error = %e, "failed to load alert subscriptions, ending sweep");
                return RunReport::default();
            }
        };

        if subscriptions.is_empty() {
            info!("no enabled alert preferences, nothing to check");
            return RunReport::default();
        }

        info!(count = subscriptions.len(), "checking alert subscriptions");

        let mut report = RunReport {
            subscriptions: subscriptions.len(),
            ..RunReport::default()
        };

        for subscription in &subscriptions {
            match self.check_subscription(subscription).await {
                Ok(sent) => {
                    report.alerts_sent += sent;
                }
                Err(e) => {
                    // Per-subscription failure must not abort the batch
                    warn!(
                        city = %subscription.city_name,
                        user = %subscription.user_email,
                        error = %e,
                        "skipping subscription"
                    );
                    report.failures += 1;
                }
            }

            if !self.config.pace_delay.is_zero() {
                tokio::time::sleep(self.config.pace_delay).await;
            }
        }

        info!(
            sent = report.alerts_sent,
            failures = report.failures,
            "weather alert sweep complete"
        );

        report
    }

    /// Fetch, compare and notify for a single subscription. Returns the
    /// number of alerts delivered; Err means the weather fetch failed.
    async fn check_subscription(&self, subscription: &Subscription) -> Result<usize> {
        let reading = self.weather.current_reading(&subscription.city_name).await?;

        debug!(
            city = %subscription.city_name,
            temperature = reading.temperature,
            conditions = %reading.description,
            "current conditions"
        );

        let crossings = crossed_thresholds(
            subscription.max_temp,
            subscription.min_temp,
            reading.temperature
        );

        if crossings.is_empty() {
            if subscription.max_temp.is_some() || subscription.min_temp.is_some() {
                debug!(city = %subscription.city_name, "temperature within normal range");
            }
            return Ok(0);
        }

        let mut sent = 0;
        for (kind, threshold) in crossings {
            if self.process_crossing(subscription, kind, reading.temperature, threshold).await {
                sent += 1;
            }
        }

        Ok(sent)
    }

    /// Dedup-check one crossing and deliver it. The ledger entry is written
    /// only after a successful send, so a failed delivery is retried on the
    /// next sweep.
    async fn process_crossing(
        &self,
        subscription: &Subscription,
        kind: AlertKind,
        observed_temp: f64,
        threshold: f64
    ) -> bool {
        let cutoff = Utc::now() - self.config.dedup_window;

        let recently_sent = match
            self.store.was_recently_sent(
                subscription.user_id,
                &subscription.city_name,
                kind,
                cutoff
            ).await
        {
            Ok(recently_sent) => recently_sent,
            Err(e) => {
                warn!(
                    city = %subscription.city_name,
                    kind = %kind,
                    error = %e,
                    "dedup lookup failed, proceeding as if no recent alert"
                );
                false
            }
        };

        if recently_sent {
            debug!(
                city = %subscription.city_name,
                kind = %kind,
                "alert already sent within dedup window, skipping"
            );
            return false;
        }

        let delivered = self.mailer.send_temperature_alert(
            &subscription.user_email,
            &subscription.city_name,
            kind,
            observed_temp,
            threshold
        ).await;

        if !delivered {
            warn!(
                city = %subscription.city_name,
                user = %subscription.user_email,
                kind = %kind,
                "alert delivery failed, will retry next sweep"
            );
            return false;
        }

        if
            let Err(e) = self.store.record_alert(NewAlertEvent {
                user_id: subscription.user_id,
                city_name: subscription.city_name.clone(),
                kind,
                temperature: observed_temp,
                threshold,
            }).await
        {
            // Delivered but unrecorded: the next sweep may send a duplicate
            warn!(
                city = %subscription.city_name,
                kind = %kind,
                error = %e,
                "failed to record delivered alert"
            );
        }

        info!(
            city = %subscription.city_name,
            user = %subscription.user_email,
            kind = %kind,
            temperature = observed_temp,
            threshold = threshold,
            "temperature alert delivered"
        );

        true
    }
}

/// Which thresholds the current temperature crosses. Max and min are
/// independent checks: an inverted configuration (max below min) can yield
/// both a high and a low crossing for the same reading, and that is the
/// intended outcome. Comparisons are strict; a reading equal to a threshold
/// does not cross it.
pub fn crossed_thresholds(
    max_temp: Option<f64>,
    min_temp: Option<f64>,
    current: f64
) -> Vec<(AlertKind, f64)> {
    let mut crossings = Vec::new();

    if let Some(max) = max_temp {
        if current > max {
            crossings.push((AlertKind::High, max));
        }
    }

    if let Some(min) = min_temp {
        if current < min {
            crossings.push((AlertKind::Low, min));
        }
    }

    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ─── Fakes ───────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeStore {
        subscriptions: Vec<Subscription>,
        fail_load: bool,
        fail_recent_lookup: bool,
        history: Mutex<Vec<(Uuid, String, AlertKind, DateTime<Utc>)>>,
        recorded: Mutex<Vec<NewAlertEvent>>,
    }

    impl FakeStore {
        fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
            Self {
                subscriptions,
                ..Self::default()
            }
        }

        fn seed_history(&self, subscription: &Subscription, kind: AlertKind, sent_at: DateTime<Utc>) {
            self.history
                .lock()
                .unwrap()
                .push((subscription.user_id, subscription.city_name.clone(), kind, sent_at));
        }

        fn recorded_events(&self) -> Vec<NewAlertEvent> {
            self.recorded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlertStore for FakeStore {
        async fn load_enabled_subscriptions(&self) -> Result<Vec<Subscription>> {
            if self.fail_load {
                return Err(AppError::Internal("store offline".to_string()));
            }
            Ok(self.subscriptions.clone())
        }

        async fn was_recently_sent(
            &self,
            user_id: Uuid,
            city_name: &str,
            kind: AlertKind,
            cutoff: DateTime<Utc>
        ) -> Result<bool> {
            if self.fail_recent_lookup {
                return Err(AppError::Internal("ledger unreadable".to_string()));
            }

            let recent = self.history
                .lock()
                .unwrap()
                .iter()
                .any(|(user, city, entry_kind, sent_at)| {
                    *user == user_id &&
                        city == city_name &&
                        *entry_kind == kind &&
                        *sent_at > cutoff
                });

            Ok(recent)
        }

        async fn record_alert(&self, event: NewAlertEvent) -> Result<()> {
            self.history
                .lock()
                .unwrap()
                .push((event.user_id, event.city_name.clone(), event.kind, Utc::now()));
            self.recorded.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct FakeProvider {
        temps: HashMap<String, f64>,
    }

    impl FakeProvider {
        fn single(city: &str, temp: f64) -> Self {
            Self {
                temps: HashMap::from([(city.to_string(), temp)]),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_reading(&self, city: &str) -> Result<WeatherReading> {
            let temp = self.temps.get(city).ok_or(AppError::CityNotFound)?;

            Ok(WeatherReading {
                temperature: *temp,
                description: "clear sky".to_string(),
                location: city.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct FakeMailer {
        fail: bool,
        sent: Mutex<Vec<(String, String, AlertKind, f64, f64)>>,
    }

    impl FakeMailer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn sent_alerts(&self) -> Vec<(String, String, AlertKind, f64, f64)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlertMailer for FakeMailer {
        async fn send_temperature_alert(
            &self,
            to: &str,
            city: &str,
            kind: AlertKind,
            observed_temp: f64,
            threshold: f64
        ) -> bool {
            if self.fail {
                return false;
            }

            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), city.to_string(), kind, observed_temp, threshold));
            true
        }
    }

    // ─── Helpers ─────────────────────────────────────────────────────

    fn subscription(city: &str, max_temp: Option<f64>, min_temp: Option<f64>) -> Subscription {
        Subscription {
            user_id: Uuid::new_v4(),
            city_name: city.to_string(),
            max_temp,
            min_temp,
            user_email: format!("owner-of-{}@example.com", city.to_lowercase()),
            user_name: Some("Test Owner".to_string()),
        }
    }

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            pace_delay: Duration::ZERO,
            ..MonitorConfig::default()
        }
    }

    fn monitor(
        store: Arc<FakeStore>,
        weather: Arc<FakeProvider>,
        mailer: Arc<FakeMailer>
    ) -> AlertMonitor {
        AlertMonitor::new(store, weather, mailer, test_config())
    }

    // ─── Threshold evaluation ────────────────────────────────────────

    #[test]
    fn test_equality_never_crosses() {
        assert!(crossed_thresholds(Some(90.0), None, 90.0).is_empty());
        assert!(crossed_thresholds(None, Some(50.0), 50.0).is_empty());
    }

    #[test]
    fn test_strictly_above_max_crosses_high() {
        assert_eq!(crossed_thresholds(Some(90.0), None, 90.1), vec![(AlertKind::High, 90.0)]);
    }

    #[test]
    fn test_strictly_below_min_crosses_low() {
        assert_eq!(crossed_thresholds(None, Some(50.0), 49.9), vec![(AlertKind::Low, 50.0)]);
    }

    #[test]
    fn test_absent_thresholds_are_skipped() {
        assert!(crossed_thresholds(None, None, 120.0).is_empty());
        assert!(crossed_thresholds(Some(90.0), None, -40.0).is_empty());
    }

    #[test]
    fn test_inverted_config_crosses_both() {
        // max below min is not rejected: a reading between them fires both
        let crossings = crossed_thresholds(Some(70.0), Some(80.0), 75.0);

        assert_eq!(crossings, vec![(AlertKind::High, 70.0), (AlertKind::Low, 80.0)]);
    }

    // ─── Sweep behavior ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_high_crossing_sends_and_records() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub.clone()]));
        let weather = Arc::new(FakeProvider::single("Austin", 95.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store.clone(), weather, mailer.clone()).run_once().await;

        assert_eq!(report, RunReport { subscriptions: 1, alerts_sent: 1, failures: 0 });

        let sent = mailer.sent_alerts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], (sub.user_email.clone(), "Austin".to_string(), AlertKind::High, 95.0, 90.0));

        let recorded = store.recorded_events();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].user_id, sub.user_id);
        assert_eq!(recorded[0].city_name, "Austin");
        assert_eq!(recorded[0].kind, AlertKind::High);
        assert_eq!(recorded[0].temperature, 95.0);
        assert_eq!(recorded[0].threshold, 90.0);
    }

    #[tokio::test]
    async fn test_reading_within_range_sends_nothing() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub]));
        let weather = Arc::new(FakeProvider::single("Austin", 85.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store.clone(), weather, mailer.clone()).run_once().await;

        assert_eq!(report, RunReport { subscriptions: 1, alerts_sent: 0, failures: 0 });
        assert!(mailer.sent_alerts().is_empty());
        assert!(store.recorded_events().is_empty());
    }

    #[tokio::test]
    async fn test_reading_equal_to_threshold_sends_nothing() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub]));
        let weather = Arc::new(FakeProvider::single("Austin", 90.0));
        let mailer = Arc::new(FakeMailer::default());

        monitor(store, weather, mailer.clone()).run_once().await;

        assert!(mailer.sent_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_preference_without_thresholds_is_a_quiet_noop() {
        let sub = subscription("Austin", None, None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub]));
        let weather = Arc::new(FakeProvider::single("Austin", 120.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer.clone()).run_once().await;

        assert_eq!(report, RunReport { subscriptions: 1, alerts_sent: 0, failures: 0 });
        assert!(mailer.sent_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_inverted_thresholds_deliver_both_kinds() {
        let sub = subscription("Austin", Some(70.0), Some(80.0));
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub]));
        let weather = Arc::new(FakeProvider::single("Austin", 75.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store.clone(), weather, mailer.clone()).run_once().await;

        assert_eq!(report.alerts_sent, 2);

        let kinds: Vec<AlertKind> = mailer
            .sent_alerts()
            .into_iter()
            .map(|(_, _, kind, _, _)| kind)
            .collect();
        assert_eq!(kinds, vec![AlertKind::High, AlertKind::Low]);
        assert_eq!(store.recorded_events().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_abort_the_batch() {
        let cities = ["Austin", "Boston", "Chicago", "Denver", "El Paso"];
        let subs: Vec<Subscription> = cities
            .iter()
            .map(|city| subscription(city, Some(50.0), None))
            .collect();

        // Chicago is unknown to the provider; everyone else is over threshold
        let temps: HashMap<String, f64> = cities
            .iter()
            .filter(|city| **city != "Chicago")
            .map(|city| (city.to_string(), 60.0))
            .collect();

        let store = Arc::new(FakeStore::with_subscriptions(subs));
        let weather = Arc::new(FakeProvider { temps });
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer.clone()).run_once().await;

        assert_eq!(report, RunReport { subscriptions: 5, alerts_sent: 4, failures: 1 });

        let alerted: Vec<String> = mailer
            .sent_alerts()
            .into_iter()
            .map(|(_, city, _, _, _)| city)
            .collect();
        assert_eq!(alerted, vec!["Austin", "Boston", "Denver", "El Paso"]);
    }

    #[tokio::test]
    async fn test_recent_alert_suppresses_resend() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub.clone()]));
        store.seed_history(&sub, AlertKind::High, Utc::now() - chrono::Duration::minutes(30));

        let weather = Arc::new(FakeProvider::single("Austin", 95.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store.clone(), weather, mailer.clone()).run_once().await;

        assert_eq!(report.alerts_sent, 0);
        assert!(mailer.sent_alerts().is_empty());
        assert!(store.recorded_events().is_empty());
    }

    #[tokio::test]
    async fn test_aged_out_ledger_entry_allows_resend() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub.clone()]));
        store.seed_history(&sub, AlertKind::High, Utc::now() - chrono::Duration::minutes(61));

        let weather = Arc::new(FakeProvider::single("Austin", 95.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer.clone()).run_once().await;

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(mailer.sent_alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_is_scoped_to_the_alert_kind() {
        // A recent high alert must not suppress a low alert for the same city
        let sub = subscription("Austin", Some(70.0), Some(80.0));
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub.clone()]));
        store.seed_history(&sub, AlertKind::High, Utc::now() - chrono::Duration::minutes(10));

        let weather = Arc::new(FakeProvider::single("Austin", 75.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer.clone()).run_once().await;

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(mailer.sent_alerts()[0].2, AlertKind::Low);
    }

    #[tokio::test]
    async fn test_failed_delivery_writes_no_ledger_entry_and_is_retried() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore::with_subscriptions(vec![sub]));
        let weather = Arc::new(FakeProvider::single("Austin", 95.0));

        let failing_mailer = Arc::new(FakeMailer::failing());
        let report = monitor(store.clone(), weather.clone(), failing_mailer).run_once().await;

        assert_eq!(report.alerts_sent, 0);
        assert!(store.recorded_events().is_empty());

        // Nothing in the ledger, so the next sweep re-attempts delivery
        let working_mailer = Arc::new(FakeMailer::default());
        let report = monitor(store.clone(), weather, working_mailer.clone()).run_once().await;

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(working_mailer.sent_alerts().len(), 1);
        assert_eq!(store.recorded_events().len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_lookup_failure_still_delivers() {
        let sub = subscription("Austin", Some(90.0), None);
        let store = Arc::new(FakeStore {
            subscriptions: vec![sub],
            fail_recent_lookup: true,
            ..FakeStore::default()
        });
        let weather = Arc::new(FakeProvider::single("Austin", 95.0));
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer.clone()).run_once().await;

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(mailer.sent_alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_ends_sweep_early() {
        let store = Arc::new(FakeStore {
            fail_load: true,
            ..FakeStore::default()
        });
        let weather = Arc::new(FakeProvider { temps: HashMap::new() });
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer.clone()).run_once().await;

        assert_eq!(report, RunReport::default());
        assert!(mailer.sent_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_no_subscriptions_short_circuits() {
        let store = Arc::new(FakeStore::default());
        let weather = Arc::new(FakeProvider { temps: HashMap::new() });
        let mailer = Arc::new(FakeMailer::default());

        let report = monitor(store, weather, mailer).run_once().await;

        assert_eq!(report, RunReport::default());
    }
}
