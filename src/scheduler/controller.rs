use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use log::{debug, info, warn};
use tokio::{
    task::{JoinHandle, JoinSet},
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    models::Campus,
    settings::WeatherSettings,
    utils::Clock,
    votes::DiningHandle,
    weather::{WeatherCache, WeatherSource},
};

pub const CROWD_RESET_INTERVAL: Duration = Duration::from_secs(20 * 60);
pub const MEAL_CHECK_INTERVAL: Duration = Duration::from_secs(60);
pub const WEATHER_UPDATE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub crowd_reset_every: Duration,
    pub meal_check_every: Duration,
    pub weather_every: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            crowd_reset_every: CROWD_RESET_INTERVAL,
            meal_check_every: MEAL_CHECK_INTERVAL,
            weather_every: WEATHER_UPDATE_INTERVAL,
        }
    }
}

/// Owns the repeating tasks. They only post messages through a `DiningHandle`;
/// the state itself stays with the owner task.
pub struct ResetScheduler {
    config: SchedulerConfig,
    cancel_token: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
}

impl ResetScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            cancel_token: None,
            handles: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel_token.is_some()
    }

    /// Starts the crowd-reset and meal-period timers. Both fire once right away.
    pub fn start(&mut self, dining: DiningHandle, clock: Arc<dyn Clock>) -> Result<()> {
        if self.is_running() {
            bail!("scheduler already running");
        }

        let reset_step = TimeDelta::from_std(self.config.crowd_reset_every)
            .context("crowd reset interval out of range")?;

        let cancel_token = CancellationToken::new();
        self.handles.push(tokio::spawn(crowd_reset_loop(
            dining.clone(),
            clock.clone(),
            self.config.crowd_reset_every,
            reset_step,
            cancel_token.clone(),
        )));
        self.handles.push(tokio::spawn(meal_period_loop(
            dining,
            clock,
            self.config.meal_check_every,
            cancel_token.clone(),
        )));
        self.cancel_token = Some(cancel_token);

        info!(
            "Scheduler started (crowd reset every {:?}, meal check every {:?})",
            self.config.crowd_reset_every, self.config.meal_check_every
        );
        Ok(())
    }

    /// Adds the weather refresher; shares the lifecycle of the other timers.
    pub fn start_weather<S: WeatherSource>(
        &mut self,
        dining: DiningHandle,
        cache: Arc<WeatherCache<S>>,
        locations: WeatherSettings,
    ) -> Result<()> {
        let Some(cancel_token) = self.cancel_token.clone() else {
            bail!("start the scheduler before the weather refresher");
        };

        self.handles.push(tokio::spawn(weather_loop(
            dining,
            cache,
            locations,
            self.config.weather_every,
            cancel_token,
        )));
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        for handle in self.handles.drain(..) {
            handle.await.context("scheduler task failed to join")?;
        }
        info!("Scheduler stopped");
        Ok(())
    }
}

async fn crowd_reset_loop(
    dining: DiningHandle,
    clock: Arc<dyn Clock>,
    period: Duration,
    step: TimeDelta,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let fired_at = clock.now();
                if let Err(err) = dining.reset_crowd(fired_at, fired_at + step).await {
                    warn!("Crowd reset timer stopping: {err}");
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                debug!("Crowd reset loop shutting down");
                break;
            }
        }
    }
}

async fn meal_period_loop(
    dining: DiningHandle,
    clock: Arc<dyn Clock>,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = dining.refresh_meal(clock.now()).await {
                    warn!("Meal period timer stopping: {err}");
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                debug!("Meal period loop shutting down");
                break;
            }
        }
    }
}

async fn weather_loop<S: WeatherSource>(
    dining: DiningHandle,
    cache: Arc<WeatherCache<S>>,
    locations: WeatherSettings,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for campus in Campus::ALL {
                    let ticket = dining.weather_ticket();
                    let dining = dining.clone();
                    let cache = cache.clone();
                    let location = locations.location(campus).to_string();
                    // Detached from the tick so a slow request never holds up the next one.
                    in_flight.spawn(async move {
                        let reading = cache.fetch(&location).await;
                        if let Err(err) = dining.update_weather(campus, ticket, reading).await {
                            debug!("Dropping weather for {campus}: {err}");
                        }
                    });
                }
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            _ = cancel_token.cancelled() => {
                debug!("Weather loop shutting down ({} fetches in flight)", in_flight.len());
                in_flight.shutdown().await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{CrowdLevel, MealPeriod, TemperatureUnit, WeatherData},
        utils::ManualClock,
        votes::DiningController,
    };
    use anyhow::Result as AnyResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use chrono::{NaiveDate, NaiveDateTime};

    fn monday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    struct FixedSource;

    impl WeatherSource for FixedSource {
        async fn fetch_current(&self, location: &str) -> AnyResult<WeatherData> {
            let temp = if location.contains("Collegeville") { 40.0 } else { 42.0 };
            Ok(WeatherData {
                temp: Some(temp),
                humidity: Some(60.0),
                feels_like: Some(temp - 3.0),
            })
        }
    }

    struct SlowSource {
        completed: Arc<AtomicUsize>,
    }

    impl WeatherSource for SlowSource {
        async fn fetch_current(&self, _location: &str) -> AnyResult<WeatherData> {
            time::sleep(Duration::from_secs(30)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherData {
                temp: Some(50.0),
                humidity: None,
                feels_like: None,
            })
        }
    }

    async fn settle() {
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn crowd_reset_fires_immediately_and_every_period() {
        let clock = ManualClock::new(monday(12, 0));
        let controller = DiningController::spawn(Arc::new(clock.clone()), None, TemperatureUnit::F);
        let dining = controller.handle();
        let mut scheduler = ResetScheduler::new(SchedulerConfig::default());
        scheduler.start(dining.clone(), Arc::new(clock.clone())).unwrap();
        settle().await;

        let first = dining.snapshot().await.unwrap().crowd_reset;
        assert_eq!(first.last_reset, Some(monday(12, 0)));
        assert_eq!(first.next_reset, Some(monday(12, 20)));

        dining.report_crowd(Campus::Csb, CrowdLevel::High).await.unwrap();
        clock.set(monday(12, 20));
        time::advance(CROWD_RESET_INTERVAL).await;
        settle().await;

        let snapshot = dining.snapshot().await.unwrap();
        assert_eq!(snapshot.votes.csb.crowd_level, CrowdLevel::Unknown);
        assert_eq!(snapshot.crowd_reset.next_reset, Some(monday(12, 40)));

        scheduler.stop().await.unwrap();
        controller.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn meal_timer_picks_up_period_changes() {
        let clock = ManualClock::new(monday(10, 29));
        let controller = DiningController::spawn(Arc::new(clock.clone()), None, TemperatureUnit::F);
        let dining = controller.handle();
        let mut scheduler = ResetScheduler::new(SchedulerConfig::default());
        scheduler.start(dining.clone(), Arc::new(clock.clone())).unwrap();
        settle().await;
        assert_eq!(dining.snapshot().await.unwrap().meal, MealPeriod::Breakfast);

        clock.set(monday(10, 30));
        time::advance(MEAL_CHECK_INTERVAL).await;
        settle().await;
        assert_eq!(dining.snapshot().await.unwrap().meal, MealPeriod::Dinner);

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
        controller.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn weather_refresher_fills_both_campuses() {
        let clock = ManualClock::new(monday(12, 0));
        let controller = DiningController::spawn(Arc::new(clock.clone()), None, TemperatureUnit::F);
        let dining = controller.handle();
        let mut scheduler = ResetScheduler::new(SchedulerConfig::default());

        let cache = Arc::new(WeatherCache::new(FixedSource));
        assert!(scheduler
            .start_weather(dining.clone(), cache.clone(), WeatherSettings::default())
            .is_err());

        scheduler.start(dining.clone(), Arc::new(clock)).unwrap();
        scheduler
            .start_weather(dining.clone(), cache, WeatherSettings::default())
            .unwrap();
        settle().await;

        let weather = dining.snapshot().await.unwrap().weather;
        assert_eq!(weather.sju.reading.temp, Some(40.0));
        assert_eq!(weather.csb.reading.temp, Some(42.0));

        scheduler.stop().await.unwrap();
        controller.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_abandons_weather_fetches_in_flight() {
        let clock = ManualClock::new(monday(12, 0));
        let controller = DiningController::spawn(Arc::new(clock.clone()), None, TemperatureUnit::F);
        let dining = controller.handle();
        let completed = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(WeatherCache::new(SlowSource {
            completed: completed.clone(),
        }));

        let mut scheduler = ResetScheduler::new(SchedulerConfig::default());
        scheduler.start(dining.clone(), Arc::new(clock)).unwrap();
        scheduler
            .start_weather(dining.clone(), cache, WeatherSettings::default())
            .unwrap();
        settle().await;

        scheduler.stop().await.unwrap();
        time::advance(Duration::from_secs(31)).await;
        settle().await;

        assert_eq!(completed.load(Ordering::SeqCst), 0);
        let weather = dining.snapshot().await.unwrap().weather;
        assert!(weather.csb.loading);
        assert!(weather.sju.loading);
        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn starting_twice_is_an_error() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(monday(12, 0)));
        let controller = DiningController::spawn(clock.clone(), None, TemperatureUnit::F);
        let mut scheduler = ResetScheduler::new(SchedulerConfig::default());
        scheduler.start(controller.handle(), clock.clone()).unwrap();
        assert!(scheduler.start(controller.handle(), clock).is_err());
        scheduler.stop().await.unwrap();
        controller.shutdown().await.unwrap();
    }
}
