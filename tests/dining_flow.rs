use std::{fs, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};
use dining_battle_lib::{
    config::AppConfig,
    models::{Campus, CrowdLevel, MealPeriod},
    start,
    utils::{Clock, ManualClock},
    votes::Rejection,
    weather::client::DEFAULT_BASE_URL,
};
use tempfile::TempDir;

fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 14)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn config_in(dir: &TempDir) -> AppConfig {
    AppConfig {
        data_dir: dir.path().join("data"),
        weather_api_key: None,
        weather_base_url: DEFAULT_BASE_URL.to_string(),
        debug: false,
    }
}

#[tokio::test]
async fn votes_survive_a_restart_within_the_same_meal() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let clock = ManualClock::new(monday(12, 0));

    let app = start(&config, Arc::new(clock.clone())).await.unwrap();
    let dining = app.controller.handle();
    dining.vote(Campus::Csb).await.unwrap();
    dining.vote(Campus::Csb).await.unwrap();
    dining.vote(Campus::Sju).await.unwrap();
    dining.react(Campus::Sju, "😋").await.unwrap();
    let receipt = dining
        .report_crowd(Campus::Csb, CrowdLevel::High)
        .await
        .unwrap();
    assert!(receipt.is_accepted());
    app.shutdown().await.unwrap();

    assert!(config.database_path().exists());
    assert!(config.settings_path().exists());

    clock.set(monday(12, 30));
    let app = start(&config, Arc::new(clock.clone())).await.unwrap();
    let snapshot = app.controller.handle().snapshot().await.unwrap();
    assert_eq!(snapshot.meal, MealPeriod::Lunch);
    assert_eq!(snapshot.votes.csb.count, 2);
    assert_eq!(snapshot.votes.sju.count, 1);
    assert_eq!(snapshot.votes.csb.percentage, 67);
    assert_eq!(snapshot.votes.sju.recent_reactions.len(), 1);
    assert_eq!(snapshot.votes.csb.crowd_level, CrowdLevel::Unknown);
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn each_meal_keeps_its_own_tally() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let clock = ManualClock::new(monday(9, 0));

    let app = start(&config, Arc::new(clock.clone())).await.unwrap();
    let dining = app.controller.handle();
    dining.vote(Campus::Sju).await.unwrap();

    clock.set(monday(12, 0));
    dining.refresh_meal(clock.now()).await.unwrap();
    let lunch = dining.snapshot().await.unwrap();
    assert_eq!(lunch.meal, MealPeriod::Lunch);
    assert_eq!(lunch.votes.total_votes(), 0);
    dining.vote(Campus::Csb).await.unwrap();

    clock.set(monday(9, 30));
    dining.refresh_meal(clock.now()).await.unwrap();
    let breakfast = dining.snapshot().await.unwrap();
    assert_eq!(breakfast.meal, MealPeriod::Breakfast);
    assert_eq!(breakfast.votes.sju.count, 1);
    assert_eq!(breakfast.votes.csb.count, 0);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn closed_halls_reject_every_intent() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let clock = ManualClock::new(monday(23, 0));

    let app = start(&config, Arc::new(clock)).await.unwrap();
    let dining = app.controller.handle();

    let receipt = dining.vote(Campus::Csb).await.unwrap();
    assert_eq!(receipt.rejection, Some(Rejection::CampusClosed(Campus::Csb)));
    let receipt = dining.feedback(Campus::Sju, "great", true).await.unwrap();
    assert_eq!(receipt.rejection, Some(Rejection::CampusClosed(Campus::Sju)));

    let snapshot = dining.snapshot().await.unwrap();
    assert_eq!(snapshot.meal, MealPeriod::Closed);
    assert_eq!(snapshot.votes.total_votes(), 0);
    assert!(!snapshot.open.any());
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn snapshots_can_be_switched_off_in_settings() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::create_dir_all(&config.data_dir).unwrap();
    fs::write(config.settings_path(), r#"{"persistSnapshots": false}"#).unwrap();
    let clock = ManualClock::new(monday(12, 0));

    let app = start(&config, Arc::new(clock.clone())).await.unwrap();
    app.controller.handle().vote(Campus::Csb).await.unwrap();
    app.shutdown().await.unwrap();
    assert!(!config.database_path().exists());

    let app = start(&config, Arc::new(clock)).await.unwrap();
    let snapshot = app.controller.handle().snapshot().await.unwrap();
    assert_eq!(snapshot.votes.total_votes(), 0);
    app.shutdown().await.unwrap();
}
