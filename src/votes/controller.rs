use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    hours::{current_meal_period, open_status, OpenStatus},
    models::{Campus, CrowdLevel, MealPeriod, TemperatureUnit, VotesState, WeatherData, WeatherState},
    scheduler::CrowdResetState,
    storage::SnapshotStore,
    utils::Clock,
};

use super::aggregator::Rejection;

const COMMAND_BUFFER: usize = 64;

/// Everything the view layer renders.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub votes: VotesState,
    pub meal: MealPeriod,
    pub open: OpenStatus,
    pub crowd_reset: CrowdResetState,
    pub weather: WeatherState,
    pub unit: TemperatureUnit,
    pub taken_at: NaiveDateTime,
}

/// Result of a user intent. A rejected intent still carries the (unchanged) tallies.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentReceipt {
    pub votes: VotesState,
    pub rejection: Option<Rejection>,
}

impl IntentReceipt {
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

#[derive(Debug)]
enum Intent {
    Vote(Campus),
    React(Campus, String),
    ReportCrowd(Campus, CrowdLevel),
    Feedback {
        campus: Campus,
        text: String,
        is_positive: bool,
    },
}

impl Intent {
    fn campus(&self) -> Campus {
        match self {
            Intent::Vote(campus)
            | Intent::React(campus, _)
            | Intent::ReportCrowd(campus, _)
            | Intent::Feedback { campus, .. } => *campus,
        }
    }
}

enum StateCommand {
    Intent {
        intent: Intent,
        reply: oneshot::Sender<IntentReceipt>,
    },
    ResetCrowd {
        fired_at: NaiveDateTime,
        next_at: NaiveDateTime,
    },
    RefreshMeal {
        now: NaiveDateTime,
    },
    UpdateWeather {
        campus: Campus,
        ticket: u64,
        reading: WeatherData,
    },
    Snapshot {
        reply: oneshot::Sender<DashboardSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Sole owner of the vote state. Every mutation arrives as a message, so no two
/// ever interleave.
struct StateOwner {
    clock: Arc<dyn Clock>,
    store: Option<SnapshotStore>,
    votes: VotesState,
    meal: MealPeriod,
    date: NaiveDate,
    crowd_reset: CrowdResetState,
    weather: WeatherState,
    weather_applied: [u64; 2],
    unit: TemperatureUnit,
    publisher: watch::Sender<DashboardSnapshot>,
}

fn campus_slot(campus: Campus) -> usize {
    match campus {
        Campus::Csb => 0,
        Campus::Sju => 1,
    }
}

impl StateOwner {
    async fn restore(&mut self, now: NaiveDateTime) {
        if let Some(store) = &self.store {
            if now.date() != self.date {
                store.prune_before(now.date()).await;
            }
        }
        self.date = now.date();
        self.meal = current_meal_period(now);
        self.votes = match &self.store {
            Some(store) => store.load(self.date, self.meal).await.unwrap_or_default(),
            None => VotesState::default(),
        };
        // Crowd readings go stale quickly; a restored tally starts without them.
        self.votes.reset_crowd_levels();
        info!("Tracking votes for {} on {}", self.meal, self.date);
    }

    async fn run(mut self, mut commands: mpsc::Receiver<StateCommand>) {
        let now = self.clock.now();
        if let Some(store) = &self.store {
            store.prune_before(now.date()).await;
        }
        self.restore(now).await;
        self.publish();

        while let Some(command) = commands.recv().await {
            match command {
                StateCommand::Intent { intent, reply } => {
                    let receipt = self.apply_intent(intent).await;
                    self.publish();
                    if reply.send(receipt).is_err() {
                        debug!("Intent caller went away before the receipt was sent");
                    }
                    continue;
                }
                StateCommand::ResetCrowd { fired_at, next_at } => {
                    self.votes.reset_crowd_levels();
                    self.crowd_reset.record(fired_at, next_at);
                    debug!("Crowd levels reset at {fired_at}; next reset at {next_at}");
                }
                StateCommand::RefreshMeal { now } => self.refresh_meal(now).await,
                StateCommand::UpdateWeather {
                    campus,
                    ticket,
                    reading,
                } => self.apply_weather(campus, ticket, reading),
                StateCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                    continue;
                }
                StateCommand::Shutdown { reply } => {
                    info!("Vote state owner shutting down");
                    let _ = reply.send(());
                    return;
                }
            }
            self.publish();
        }

        info!("Vote state owner stopped: all handles dropped");
    }

    async fn apply_intent(&mut self, intent: Intent) -> IntentReceipt {
        let now = self.clock.now();
        let campus = intent.campus();
        let outcome = match &intent {
            Intent::Vote(campus) => self.votes.record_vote(*campus, now),
            Intent::React(campus, token) => self.votes.record_reaction(*campus, token, now),
            Intent::ReportCrowd(campus, level) => self.votes.report_crowd(*campus, *level, now),
            Intent::Feedback {
                campus,
                text,
                is_positive,
            } => self.votes.submit_feedback(*campus, text, *is_positive, now),
        };

        match outcome {
            Ok(()) => {
                debug!("Accepted {intent:?} for {campus}");
                if let Some(store) = &self.store {
                    store.save(&self.votes, self.date, self.meal).await;
                }
                IntentReceipt {
                    votes: self.votes.clone(),
                    rejection: None,
                }
            }
            Err(rejection) => {
                debug!("Rejected {intent:?}: {rejection}");
                IntentReceipt {
                    votes: self.votes.clone(),
                    rejection: Some(rejection),
                }
            }
        }
    }

    async fn refresh_meal(&mut self, now: NaiveDateTime) {
        let meal = current_meal_period(now);
        if meal == self.meal && now.date() == self.date {
            return;
        }

        info!("Meal period changed from {} to {meal}", self.meal);
        self.restore(now).await;
    }

    fn apply_weather(&mut self, campus: Campus, ticket: u64, reading: WeatherData) {
        let slot = campus_slot(campus);
        if ticket < self.weather_applied[slot] {
            debug!("Discarding superseded weather reading for {campus} (ticket {ticket})");
            return;
        }
        self.weather_applied[slot] = ticket;

        let entry = self.weather.get_mut(campus);
        entry.reading = reading;
        entry.loading = false;
    }

    fn snapshot(&self) -> DashboardSnapshot {
        let now = self.clock.now();
        DashboardSnapshot {
            votes: self.votes.clone(),
            meal: self.meal,
            open: open_status(now),
            crowd_reset: self.crowd_reset,
            weather: self.weather,
            unit: self.unit,
            taken_at: now,
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }
}

/// Cloneable front door to the state owner task.
#[derive(Clone)]
pub struct DiningHandle {
    sender: mpsc::Sender<StateCommand>,
    updates: watch::Receiver<DashboardSnapshot>,
    weather_tickets: Arc<AtomicU64>,
}

impl DiningHandle {
    pub async fn vote(&self, campus: Campus) -> Result<IntentReceipt> {
        self.intent(Intent::Vote(campus)).await
    }

    pub async fn react(&self, campus: Campus, token: impl Into<String>) -> Result<IntentReceipt> {
        self.intent(Intent::React(campus, token.into())).await
    }

    pub async fn report_crowd(&self, campus: Campus, level: CrowdLevel) -> Result<IntentReceipt> {
        self.intent(Intent::ReportCrowd(campus, level)).await
    }

    pub async fn feedback(
        &self,
        campus: Campus,
        text: impl Into<String>,
        is_positive: bool,
    ) -> Result<IntentReceipt> {
        self.intent(Intent::Feedback {
            campus,
            text: text.into(),
            is_positive,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(StateCommand::Snapshot { reply }).await?;
        response.await.map_err(|_| anyhow!("state owner stopped"))
    }

    /// Receiver that sees a fresh snapshot after every processed message.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.updates.clone()
    }

    pub async fn reset_crowd(&self, fired_at: NaiveDateTime, next_at: NaiveDateTime) -> Result<()> {
        self.send(StateCommand::ResetCrowd { fired_at, next_at }).await
    }

    pub async fn refresh_meal(&self, now: NaiveDateTime) -> Result<()> {
        self.send(StateCommand::RefreshMeal { now }).await
    }

    /// Take a ticket before starting a weather fetch; readings posted with an older
    /// ticket than one already applied are dropped.
    pub fn weather_ticket(&self) -> u64 {
        self.weather_tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn update_weather(&self, campus: Campus, ticket: u64, reading: WeatherData) -> Result<()> {
        self.send(StateCommand::UpdateWeather {
            campus,
            ticket,
            reading,
        })
        .await
    }

    async fn intent(&self, intent: Intent) -> Result<IntentReceipt> {
        let (reply, response) = oneshot::channel();
        self.send(StateCommand::Intent { intent, reply }).await?;
        response.await.map_err(|_| anyhow!("state owner stopped"))
    }

    async fn send(&self, command: StateCommand) -> Result<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| anyhow!("state owner stopped"))
    }
}

pub struct DiningController {
    handle: DiningHandle,
    task: JoinHandle<()>,
}

impl DiningController {
    /// Spawns the state owner on the current tokio runtime.
    pub fn spawn(clock: Arc<dyn Clock>, store: Option<SnapshotStore>, unit: TemperatureUnit) -> Self {
        let now = clock.now();
        let initial = DashboardSnapshot {
            votes: VotesState::default(),
            meal: MealPeriod::Closed,
            open: open_status(now),
            crowd_reset: CrowdResetState::default(),
            weather: WeatherState::default(),
            unit,
            taken_at: now,
        };
        let (publisher, updates) = watch::channel(initial);
        let (sender, commands) = mpsc::channel(COMMAND_BUFFER);

        let owner = StateOwner {
            clock,
            store,
            votes: VotesState::default(),
            meal: MealPeriod::Closed,
            date: now.date(),
            crowd_reset: CrowdResetState::default(),
            weather: WeatherState::default(),
            weather_applied: [0; 2],
            unit,
            publisher,
        };
        let task = tokio::spawn(owner.run(commands));

        Self {
            handle: DiningHandle {
                sender,
                updates,
                weather_tickets: Arc::new(AtomicU64::new(0)),
            },
            task,
        }
    }

    pub fn handle(&self) -> DiningHandle {
        self.handle.clone()
    }

    pub async fn shutdown(self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        if self
            .handle
            .send(StateCommand::Shutdown { reply })
            .await
            .is_ok()
        {
            let _ = done.await;
        } else {
            warn!("State owner already stopped before shutdown");
        }
        self.task
            .await
            .map_err(|err| anyhow!("state owner task failed to join: {err}"))
    }
}
