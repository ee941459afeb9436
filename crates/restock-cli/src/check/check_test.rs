use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use restock_core::{DetectionRule, LocationPromptConfig};
use restock_store::Snapshot;

use super::*;

const ROSE: &str = "https://shop.example.com/en/product/rose-lassi";
const PLAIN: &str = "https://shop.example.com/en/product/plain-lassi";

fn test_config(state_path: &Path) -> AppConfig {
    AppConfig {
        telegram_bot_token: None,
        telegram_chat_id: None,
        location_code: None,
        product_urls: Some(format!("{ROSE},{PLAIN}")),
        products_path: "config/products.yaml".into(),
        state_path: state_path.to_path_buf(),
        log_level: "info".to_string(),
        detection: DetectionRule::Structural {
            purchase_selector: "a.add-to-cart".to_string(),
        },
        location_prompt: LocationPromptConfig {
            input_selector: "input#search".to_string(),
            suggestion_selector: ".searchitem-name".to_string(),
            apply_selector: None,
            frame_selector: None,
            probe_timeout_secs: 1,
            settle_secs: 1,
        },
        navigation_timeout_secs: 30,
        chrome_executable: None,
        max_concurrent_checks: 1,
        diagnostics_dir: None,
        notify_timeout_secs: 5,
        notify_max_retries: 0,
        notify_backoff_base_ms: 0,
    }
}

/// Rose is in stock, everything else is sold out.
struct RoseInStock;

#[async_trait]
impl AvailabilityProbe for RoseInStock {
    async fn probe(&self, product: &Product) -> Result<bool, ScraperError> {
        Ok(product.url == ROSE)
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

#[async_trait]
impl AlertSink for Recorder {
    async fn alert(&self, product: &Product) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(product.url.clone());
        Ok(())
    }
}

fn read_state(store: &StateFile) -> Snapshot {
    store.load().expect("state file should be readable")
}

#[tokio::test]
async fn first_run_announces_and_persists_unavailable_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));
    let config = test_config(store.path());
    let alerts = Recorder::default();

    let report = run_check_with(&config, &[], false, &RoseInStock, &alerts, &store)
        .await
        .expect("cycle should succeed");

    assert_eq!(*alerts.0.lock().unwrap(), vec![ROSE.to_string()]);
    assert_eq!(report.results.len(), 2);
    let state = read_state(&store);
    assert!(!state.first_run);
    assert_eq!(state.set.iter().collect::<Vec<_>>(), vec![PLAIN]);
}

#[tokio::test]
async fn consecutive_runs_do_not_repeat_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("state.txt"));
    let config = test_config(store.path());

    let first = Recorder::default();
    run_check_with(&config, &[], false, &RoseInStock, &first, &store)
        .await
        .unwrap();
    let second = Recorder::default();
    let report = run_check_with(&config, &[], false, &RoseInStock, &second, &store)
        .await
        .unwrap();

    assert_eq!(first.0.lock().unwrap().len(), 1);
    assert!(second.0.lock().unwrap().is_empty());
    assert!(report.notified.is_empty());
}

#[tokio::test]
async fn dry_run_leaves_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("state.txt"));
    let config = test_config(store.path());

    run_check_with(&config, &[], true, &RoseInStock, &Recorder::default(), &store)
        .await
        .unwrap();

    assert!(!store.path().exists());
}

#[tokio::test]
async fn narrowed_run_keeps_state_of_unchecked_products() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("state.txt"));
    let other = "https://shop.example.com/en/product/kesar-lassi";
    store
        .save(&[ROSE, other].into_iter().collect())
        .unwrap();
    let config = test_config(store.path());
    let alerts = Recorder::default();

    let report = run_check_with(
        &config,
        &[ROSE.to_string()],
        false,
        &RoseInStock,
        &alerts,
        &store,
    )
    .await
    .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(*alerts.0.lock().unwrap(), vec![ROSE.to_string()]);
    assert_eq!(read_state(&store).set.iter().collect::<Vec<_>>(), vec![other]);
}

#[tokio::test]
async fn narrowed_first_run_keeps_unchecked_products_tracked() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("state.txt"));
    let config = test_config(store.path());

    let narrowed = Recorder::default();
    run_check_with(
        &config,
        &[PLAIN.to_string()],
        false,
        &RoseInStock,
        &narrowed,
        &store,
    )
    .await
    .unwrap();

    assert!(narrowed.0.lock().unwrap().is_empty());
    let state = read_state(&store);
    assert!(!state.first_run);
    assert_eq!(state.set.iter().collect::<Vec<_>>(), vec![PLAIN, ROSE]);

    let full = Recorder::default();
    run_check_with(&config, &[], false, &RoseInStock, &full, &store)
        .await
        .unwrap();

    assert_eq!(*full.0.lock().unwrap(), vec![ROSE.to_string()]);
}

#[tokio::test]
async fn unwritable_state_is_reported_after_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the state file should be: load and save both fail.
    let store = StateFile::new(dir.path());
    let config = test_config(store.path());

    let err = run_check_with(&config, &[], false, &RoseInStock, &Recorder::default(), &store)
        .await
        .unwrap_err();

    assert!(
        err.to_string().contains("failed to read state file"),
        "got: {err:#}"
    );
}

#[test]
fn explicit_selection_overrides_configured_products() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("state.txt"));

    let products =
        select_products(&config, &[PLAIN.to_string(), format!("  {PLAIN} ")]).unwrap();

    assert_eq!(products.len(), 1, "duplicates are collapsed");
    assert_eq!(products[0].name, "plain-lassi");
}

#[test]
fn configured_products_are_used_without_selection() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("state.txt"));

    let names: Vec<String> = select_products(&config, &[])
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();

    assert_eq!(names, vec!["rose-lassi", "plain-lassi"]);
}

#[test]
fn invalid_selection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("state.txt"));

    assert!(select_products(&config, &["ftp://shop.example.com/x".to_string()]).is_err());
}

#[tokio::test]
async fn missing_credentials_fall_back_to_unconfigured_sink() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("state.txt"));
    let sink = alert_sink_from_config(&config).unwrap();

    let product = Product::from_url(ROSE).unwrap();
    let err = sink.alert(&product).await.unwrap_err();

    assert!(matches!(err, NotifyError::MissingCredentials));
}
