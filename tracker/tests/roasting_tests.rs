//! Roast history tests
//!
//! Tests for roast operations including:
//! - Submitting new, edited and duplicated roasts
//! - History ordering and deletion
//! - Derived metrics stored with each roast

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use roast_tracker::config::StorageConfig;
use roast_tracker::services::roasting::sort_history;
use roast_tracker::services::{BeanService, RoastService};
use roast_tracker::{AppError, KeyValueStore};
use shared::{FormMode, Roast, RoastInput};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A complete roast form: final at 10:00, first crack at 09:00, cooling TP at 11:00
fn roast_input(bean: &str, roast_date: NaiveDate) -> RoastInput {
    let mut input = RoastInput {
        roast_date: Some(roast_date),
        bean_name: bean.to_string(),
        final_temp_celsius: Some(dec("205.5")),
        green_weight_grams: Some(dec("250")),
        roasted_weight_grams: Some(dec("212.5")),
        ..Default::default()
    };
    input.checkpoints.final_point.time_seconds = Some(600);
    input.checkpoints.first_crack_start.time_seconds = Some(540);
    input.checkpoints.cooling_turning_point.time_seconds = Some(660);
    input
}

async fn open_store(dir: &tempfile::TempDir) -> KeyValueStore {
    let config = StorageConfig {
        database_path: dir.path().join("roastlog.sqlite"),
        ..Default::default()
    };
    KeyValueStore::connect(&config).await.unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_stored_metrics_for_typical_roast() {
        let roast = Roast::from_input(1, chrono::Utc::now(), roast_input("Kenya AA", date(2024, 3, 14)))
            .unwrap();

        // (250 - 212.5) / 250 * 100 = 15%
        assert_eq!(roast.metrics.loss_percent, Some(dec("15.00")));
        assert_eq!(roast.metrics.total_time_cs, Some(780));
        assert_eq!(roast.metrics.dev_time_cs, Some(240));
        // 240 / 780 * 100 = 30.77
        assert_eq!(roast.metrics.dtr_cs, Some(dec("30.8")));
        assert_eq!(roast.metrics.dev_time_ctp, Some(120));
        assert_eq!(roast.metrics.dtr_ctp, Some(dec("18.2")));
    }

    #[test]
    fn test_history_sorted_by_date_then_newest_id() {
        let mut roasts: Vec<Roast> = [(1, date(2024, 3, 1)), (2, date(2024, 3, 5)), (3, date(2024, 3, 1))]
            .into_iter()
            .map(|(id, d)| Roast::from_input(id, chrono::Utc::now(), roast_input("Java", d)).unwrap())
            .collect();

        sort_history(&mut roasts);

        let ids: Vec<_> = roasts.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_day() -> impl Strategy<Value = NaiveDate> {
        (0i64..1000).prop_map(|offset| date(2022, 1, 1) + chrono::Duration::days(offset))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// History order never puts an older roast date before a newer one
        #[test]
        fn prop_history_order(days in prop::collection::vec(arb_day(), 0..20)) {
            let mut roasts: Vec<Roast> = days
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    Roast::from_input(i as i64 + 1, chrono::Utc::now(), roast_input("Java", *d)).unwrap()
                })
                .collect();

            sort_history(&mut roasts);

            for pair in roasts.windows(2) {
                prop_assert!(pair[0].roast_date >= pair[1].roast_date);
                if pair[0].roast_date == pair[1].roast_date {
                    prop_assert!(pair[0].id > pair[1].id);
                }
            }
        }

        /// Weight loss is stored whenever both weights are positive
        #[test]
        fn prop_loss_between_zero_and_hundred(
            green in 1u32..5000,
            fraction in 1u32..100,
        ) {
            let green = Decimal::from(green);
            let roasted = green * Decimal::from(fraction) / Decimal::from(100);
            let mut input = roast_input("Java", date(2024, 1, 1));
            input.green_weight_grams = Some(green);
            input.roasted_weight_grams = Some(roasted);

            let roast = Roast::from_input(1, chrono::Utc::now(), input).unwrap();
            let loss = roast.metrics.loss_percent.unwrap();

            prop_assert!(loss >= Decimal::ZERO);
            prop_assert!(loss < Decimal::ONE_HUNDRED);
        }
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_submit_new_roast_registers_bean() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let service = RoastService::new(store.clone());

        let roast = assert_ok!(
            service
                .submit(FormMode::New, roast_input(" Kenya Peaberry ", date(2024, 3, 14)))
                .await
        );

        assert_eq!(roast.bean_name, "Kenya Peaberry");
        assert_eq!(roast.checkpoints.cooling_start.time_seconds, Some(780));
        assert_eq!(roast.checkpoints.final_minus_2.temp_celsius, Some(dec("203.5")));

        let beans = BeanService::new(store).list().await.unwrap();
        assert!(beans.contains("Kenya Peaberry"));
        assert!(beans.contains("Brazil Santos"));
    }

    #[tokio::test]
    async fn test_submit_requires_final_time_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let mut input = roast_input("Java", date(2024, 3, 14));
        input.checkpoints.final_point.time_seconds = None;

        let err = assert_err!(service.submit(FormMode::New, input).await);
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "final_time"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_date_and_bean() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let mut input = roast_input("Java", date(2024, 3, 14));
        input.roast_date = None;
        match service.submit(FormMode::New, input).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "roast_date"),
            other => panic!("unexpected result: {:?}", other),
        }

        let input = roast_input("   ", date(2024, 3, 14));
        assert!(service.submit(FormMode::New, input).await.is_err());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_position() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let first = service.submit(FormMode::New, roast_input("Java", date(2024, 3, 1))).await.unwrap();
        let second = service.submit(FormMode::New, roast_input("Rwanda", date(2024, 3, 2))).await.unwrap();

        let mut draft = service.draft_edit(first.id).await.unwrap();
        assert_eq!(draft.mode, FormMode::Editing { id: first.id });
        draft.input.roasted_weight_grams = Some(dec("200"));
        let edited = service.submit(draft.mode, draft.input).await.unwrap();

        assert_eq!(edited.id, first.id);
        assert!(edited.saved_at >= first.saved_at);
        assert_eq!(edited.metrics.loss_percent, Some(dec("20.00")));

        let stored: Vec<_> = service.list_stored().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(stored, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_edit_missing_roast_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let result = service
            .submit(FormMode::Editing { id: 42 }, roast_input("Java", date(2024, 3, 1)))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_creates_new_record_dated_today() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let source = service.submit(FormMode::New, roast_input("Java", date(2023, 12, 24))).await.unwrap();
        let draft = service.duplicate(source.id).await.unwrap();

        assert_eq!(
            draft.mode,
            FormMode::Duplicating {
                source_id: source.id,
                source_date: date(2023, 12, 24),
            }
        );
        assert_eq!(draft.input.roast_date, Some(chrono::Local::now().date_naive()));
        assert_eq!(draft.input.bean_name, "Java");

        let copy = service.submit(draft.mode, draft.input).await.unwrap();
        assert!(copy.id > source.id);
        assert_eq!(service.list().await.unwrap().len(), 2);
        assert_eq!(service.get(source.id).await.unwrap(), source);
    }

    #[tokio::test]
    async fn test_delete_keeps_relative_order() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let mut ids = Vec::new();
        for (bean, day) in [("Java", 3), ("Rwanda", 1), ("Burundi", 2), ("Yemen Mocha", 1)] {
            let roast = service.submit(FormMode::New, roast_input(bean, date(2024, 3, day))).await.unwrap();
            ids.push(roast.id);
        }

        let removed = service.delete(ids[1]).await.unwrap();
        assert_eq!(removed.bean_name, "Rwanda");

        let stored: Vec<_> = service.list_stored().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(stored, vec![ids[0], ids[2], ids[3]]);

        let listed: Vec<_> = service.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![ids[0], ids[2], ids[3]]);

        assert!(matches!(service.delete(ids[1]).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let mut last = 0;
        for _ in 0..5 {
            let roast = service.submit(FormMode::New, roast_input("Java", date(2024, 3, 1))).await.unwrap();
            assert!(roast.id > last);
            last = roast.id;
        }
    }

    #[tokio::test]
    async fn test_clear_all() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        service.submit(FormMode::New, roast_input("Java", date(2024, 3, 1))).await.unwrap();
        service.submit(FormMode::New, roast_input("Java", date(2024, 3, 2))).await.unwrap();

        assert_eq!(service.clear_all().await.unwrap(), 2);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_assigns_fresh_ids_and_recomputes_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let service = RoastService::new(store.clone());

        let existing = service.submit(FormMode::New, roast_input("Java", date(2024, 3, 1))).await.unwrap();

        let mut without_final = roast_input("Sumatra Gayo", date(2024, 2, 1));
        without_final.checkpoints.final_point.time_seconds = None;
        let (imported, skipped) = service
            .import(vec![roast_input("Java", date(2024, 1, 1)), without_final])
            .await
            .unwrap();

        assert_eq!(skipped, 0);
        assert_eq!(imported.len(), 2);
        assert!(imported[0].id > existing.id);
        assert!(imported[1].id > imported[0].id);
        assert_eq!(imported[0].metrics.dtr_ctp, Some(dec("18.2")));
        assert_eq!(imported[1].metrics.total_time_cs, None);

        assert_eq!(service.list().await.unwrap().len(), 3);
        assert!(BeanService::new(store).list().await.unwrap().contains("Sumatra Gayo"));
    }

    #[tokio::test]
    async fn test_import_skips_negative_weights() {
        let dir = tempfile::tempdir().unwrap();
        let service = RoastService::new(open_store(&dir).await);

        let mut negative_green = roast_input("Java", date(2024, 1, 1));
        negative_green.green_weight_grams = Some(dec("-250"));
        let mut negative_roasted = roast_input("Java", date(2024, 1, 2));
        negative_roasted.roasted_weight_grams = Some(dec("-1"));

        let (imported, skipped) = service
            .import(vec![
                negative_green,
                roast_input("Sumatra Gayo", date(2024, 1, 3)),
                negative_roasted,
            ])
            .await
            .unwrap();

        assert_eq!(skipped, 2);
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].bean_name, "Sumatra Gayo");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
