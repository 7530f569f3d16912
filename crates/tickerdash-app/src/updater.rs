//! Auto-refresh scheduler.
//!
//! One timer at a time: every interval change cancels the pending run and
//! schedules a new one. Each cycle counts down once per second, then calls
//! the refresh callback unless the trading-hours gate is closed. The chosen
//! interval lives in session storage under `autoUpdateInterval`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tickerdash_core::MarketHours;
use tickerdash_layout::{Storage, AUTO_UPDATE_INTERVAL_KEY};
use tickerdash_telemetry::Metrics;
use tickerdash_widgets::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Refresh interval selection.
///
/// Text form: `off`, a number of seconds (`60`), or `random:MIN-MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UpdateInterval {
    #[default]
    Off,
    Fixed(u64),
    Random { min: u64, max: u64 },
}

impl UpdateInterval {
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }

    /// Seconds until the next run, drawn fresh for random intervals.
    pub fn next_delay_secs(&self) -> Option<u64> {
        match *self {
            Self::Off => None,
            Self::Fixed(secs) => Some(secs),
            Self::Random { min, max } => Some(rand::thread_rng().gen_range(min..=max)),
        }
    }
}

impl fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Fixed(secs) => write!(f, "{secs}"),
            Self::Random { min, max } => write!(f, "random:{min}-{max}"),
        }
    }
}

impl FromStr for UpdateInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("off") || s.is_empty() || s == "0" {
            return Ok(Self::Off);
        }
        if let Some(range) = s.strip_prefix("random:") {
            let (min, max) = range
                .split_once('-')
                .ok_or_else(|| format!("invalid random interval: {s}"))?;
            let min: u64 = min
                .trim()
                .parse()
                .map_err(|_| format!("invalid random minimum: {s}"))?;
            let max: u64 = max
                .trim()
                .parse()
                .map_err(|_| format!("invalid random maximum: {s}"))?;
            if min == 0 || min > max {
                return Err(format!("random interval needs 0 < min <= max: {s}"));
            }
            return Ok(Self::Random { min, max });
        }
        s.parse::<u64>()
            .map(Self::Fixed)
            .map_err(|_| format!("invalid update interval: {s}"))
    }
}

impl TryFrom<String> for UpdateInterval {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UpdateInterval> for String {
    fn from(value: UpdateInterval) -> Self {
        value.to_string()
    }
}

/// Callback invoked on each scheduled run.
pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct Scheduled {
    interval: UpdateInterval,
    token: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

pub struct AutoUpdater {
    storage: Arc<dyn Storage>,
    gate: Option<MarketHours>,
    refresh: RefreshFn,
    scheduled: Mutex<Scheduled>,
    countdown: watch::Sender<Option<u64>>,
}

impl AutoUpdater {
    /// `gate` of `None` refreshes around the clock.
    pub fn new(storage: Arc<dyn Storage>, gate: Option<MarketHours>, refresh: RefreshFn) -> Self {
        let (countdown, _) = watch::channel(None);
        Self {
            storage,
            gate,
            refresh,
            scheduled: Mutex::new(Scheduled {
                interval: UpdateInterval::Off,
                token: None,
                task: None,
            }),
            countdown,
        }
    }

    pub fn interval(&self) -> UpdateInterval {
        self.scheduled.lock().interval
    }

    /// Seconds until the next run, updated once per second. `None` while off.
    pub fn countdown(&self) -> watch::Receiver<Option<u64>> {
        self.countdown.subscribe()
    }

    /// Stored interval, or `fallback` when nothing is stored.
    ///
    /// A stored value that does not parse is cleared and `Off` is used.
    pub fn stored_interval(&self, fallback: UpdateInterval) -> UpdateInterval {
        let Some(raw) = self.storage.get(AUTO_UPDATE_INTERVAL_KEY) else {
            return fallback;
        };
        match raw.parse() {
            Ok(interval) => interval,
            Err(e) => {
                warn!(value = %raw, error = %e, "Corrupt stored update interval, clearing");
                if let Err(e) = self.storage.remove(AUTO_UPDATE_INTERVAL_KEY) {
                    error!(error = %e, "Failed to clear corrupt update interval");
                }
                UpdateInterval::Off
            }
        }
    }

    /// Restore the stored interval and start scheduling.
    pub fn start(&self, fallback: UpdateInterval) -> UpdateInterval {
        let interval = self.stored_interval(fallback);
        info!(%interval, "Auto-update starting");
        self.schedule(interval);
        interval
    }

    /// Change the interval, persist it, and restart the timer.
    pub fn set_interval(&self, interval: UpdateInterval) {
        if let Err(e) = self
            .storage
            .set(AUTO_UPDATE_INTERVAL_KEY, &interval.to_string())
        {
            warn!(error = %e, "Failed to persist update interval");
        }
        info!(%interval, "Auto-update interval changed");
        self.schedule(interval);
    }

    /// Cancel any pending run without changing the stored interval.
    pub fn stop(&self) {
        let mut scheduled = self.scheduled.lock();
        if let Some(token) = scheduled.token.take() {
            token.cancel();
        }
        scheduled.task = None;
        let _ = self.countdown.send(None);
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
            .lock()
            .task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn schedule(&self, interval: UpdateInterval) {
        let mut scheduled = self.scheduled.lock();
        if let Some(token) = scheduled.token.take() {
            debug!("Cancelling pending auto-update");
            token.cancel();
        }
        scheduled.interval = interval;
        scheduled.task = None;

        if interval.is_off() {
            let _ = self.countdown.send(None);
            return;
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(run_cycles(
            interval,
            self.gate,
            self.refresh.clone(),
            self.countdown.clone(),
            token.clone(),
        ));
        scheduled.token = Some(token);
        scheduled.task = Some(task);
    }
}

impl Drop for AutoUpdater {
    fn drop(&mut self) {
        if let Some(token) = self.scheduled.get_mut().token.take() {
            token.cancel();
        }
    }
}

async fn run_cycles(
    interval: UpdateInterval,
    gate: Option<MarketHours>,
    refresh: RefreshFn,
    countdown: watch::Sender<Option<u64>>,
    token: CancellationToken,
) {
    while let Some(secs) = interval.next_delay_secs() {
        debug!(secs, "Next auto-update scheduled");
        for remaining in (1..=secs.max(1)).rev() {
            let _ = countdown.send(Some(remaining));
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            }
        }
        let _ = countdown.send(Some(0));

        if gate.is_some_and(|hours| !hours.is_open_now()) {
            debug!("Market closed, skipping auto-update");
            Metrics::auto_refresh("skipped");
            continue;
        }

        tokio::select! {
            _ = token.cancelled() => return,
            _ = refresh() => Metrics::auto_refresh("ran"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tickerdash_layout::MemoryStorage;

    fn counting() -> (RefreshFn, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let refresh: RefreshFn = Arc::new(move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });
        (refresh, runs)
    }

    fn always_open() -> MarketHours {
        MarketHours {
            open: NaiveTime::MIN,
            close: NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap(),
            weekdays_only: false,
        }
    }

    fn never_open() -> MarketHours {
        MarketHours {
            open: NaiveTime::MIN,
            close: NaiveTime::MIN,
            weekdays_only: false,
        }
    }

    async fn advance(secs: u64) {
        for _ in 0..secs {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        tokio::task::yield_now().await;
    }

    #[test]
    fn test_interval_text_forms() {
        assert_eq!("off".parse::<UpdateInterval>(), Ok(UpdateInterval::Off));
        assert_eq!("60".parse::<UpdateInterval>(), Ok(UpdateInterval::Fixed(60)));
        assert_eq!(
            "random:30-120".parse::<UpdateInterval>(),
            Ok(UpdateInterval::Random { min: 30, max: 120 })
        );
        assert!("random:120-30".parse::<UpdateInterval>().is_err());
        assert!("soon".parse::<UpdateInterval>().is_err());
        assert_eq!(UpdateInterval::Random { min: 5, max: 9 }.to_string(), "random:5-9");
    }

    #[test]
    fn test_random_delay_within_bounds() {
        let interval = UpdateInterval::Random { min: 10, max: 20 };
        for _ in 0..100 {
            let secs = interval.next_delay_secs().unwrap();
            assert!((10..=20).contains(&secs));
        }
        assert_eq!(UpdateInterval::Off.next_delay_secs(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_runs_refresh() {
        let (refresh, runs) = counting();
        let storage = Arc::new(MemoryStorage::new());
        let updater = AutoUpdater::new(storage.clone(), Some(always_open()), refresh);

        updater.set_interval(UpdateInterval::Fixed(3));
        assert_eq!(storage.get(AUTO_UPDATE_INTERVAL_KEY).as_deref(), Some("3"));

        advance(4).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        advance(3).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        updater.stop();
        advance(10).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_each_second() {
        let (refresh, _runs) = counting();
        let updater = AutoUpdater::new(Arc::new(MemoryStorage::new()), None, refresh);
        let countdown = updater.countdown();

        updater.set_interval(UpdateInterval::Fixed(5));
        tokio::task::yield_now().await;
        assert_eq!(*countdown.borrow(), Some(5));
        advance(2).await;
        assert_eq!(*countdown.borrow(), Some(3));

        updater.set_interval(UpdateInterval::Off);
        assert_eq!(*countdown.borrow(), None);
        assert!(!updater.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_keeps_single_timer() {
        let (refresh, runs) = counting();
        let updater = AutoUpdater::new(Arc::new(MemoryStorage::new()), None, refresh);

        updater.set_interval(UpdateInterval::Fixed(5));
        advance(3).await;
        updater.set_interval(UpdateInterval::Fixed(5));
        advance(3).await;
        // The first timer would have fired by now.
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        advance(3).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_market_skips_run() {
        let (refresh, runs) = counting();
        let updater = AutoUpdater::new(Arc::new(MemoryStorage::new()), Some(never_open()), refresh);

        updater.set_interval(UpdateInterval::Fixed(2));
        advance(7).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(updater.is_scheduled());
    }

    /// Storage that can be read but never changed.
    struct ReadOnlyStorage(&'static str);

    impl Storage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            Some(self.0.to_string())
        }

        fn set(&self, _key: &str, _value: &str) -> tickerdash_layout::LayoutResult<()> {
            Err(tickerdash_layout::LayoutError::Storage("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> tickerdash_layout::LayoutResult<()> {
            Err(tickerdash_layout::LayoutError::Storage("read-only".to_string()))
        }
    }

    #[test]
    fn test_corrupt_interval_on_read_only_storage_falls_back_to_off() {
        let (refresh, _runs) = counting();
        let updater = AutoUpdater::new(Arc::new(ReadOnlyStorage("every tuesday")), None, refresh);
        assert_eq!(
            updater.stored_interval(UpdateInterval::Fixed(60)),
            UpdateInterval::Off
        );
    }

    #[tokio::test]
    async fn test_stored_interval_restore() {
        let (refresh, _runs) = counting();
        let storage = Arc::new(MemoryStorage::new());
        let updater = AutoUpdater::new(storage.clone(), None, refresh);

        assert_eq!(
            updater.stored_interval(UpdateInterval::Fixed(60)),
            UpdateInterval::Fixed(60)
        );

        storage.set(AUTO_UPDATE_INTERVAL_KEY, "random:30-90").unwrap();
        assert_eq!(
            updater.stored_interval(UpdateInterval::Off),
            UpdateInterval::Random { min: 30, max: 90 }
        );

        storage.set(AUTO_UPDATE_INTERVAL_KEY, "{not an interval").unwrap();
        assert_eq!(
            updater.stored_interval(UpdateInterval::Fixed(60)),
            UpdateInterval::Off
        );
        assert!(storage.get(AUTO_UPDATE_INTERVAL_KEY).is_none());

        assert_eq!(updater.start(UpdateInterval::Off), UpdateInterval::Off);
        assert!(!updater.is_scheduled());
    }
}
