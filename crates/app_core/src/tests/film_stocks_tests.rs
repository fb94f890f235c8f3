use super::*;
use shared::{
    domain::{FilmStockFilterMode, FilmType},
    filters::apply_predicates,
};
use storage::Storage;

async fn seeded_controller() -> (Arc<FilmStocksController>, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let seed = [
        ("Kodak", "Tri-X 400", 400, true),
        ("Kodak", "Portra 160", 160, true),
        ("ILFORD", "HP5+", 400, true),
        ("Fuji", "Velvia 50", 50, false),
        ("Lomography", "Berlin", 400, false),
    ];
    for (make, model, iso, preadded) in seed {
        storage
            .add_film_stock(&FilmStock {
                make: make.into(),
                model: model.into(),
                iso,
                is_preadded: preadded,
                ..FilmStock::default()
            })
            .await
            .expect("seed stock");
    }
    let controller = FilmStocksController::new(storage.clone());
    controller.spawn_load().await.expect("initial load");
    (controller, storage)
}

#[tokio::test]
async fn initial_load_holds_full_set_sorted_by_name() {
    let (controller, _storage) = seeded_controller().await;
    let names: Vec<String> = controller
        .film_stocks()
        .await
        .iter()
        .map(FilmStock::name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Fuji Velvia 50",
            "ILFORD HP5+",
            "Kodak Portra 160",
            "Kodak Tri-X 400",
            "Lomography Berlin",
        ]
    );
}

#[tokio::test]
async fn filter_set_recomputes_exact_subset() {
    let (controller, storage) = seeded_controller().await;
    let filter_set = FilmStockFilterSet {
        manufacturers: vec!["Kodak".into(), "ILFORD".into()],
        iso_values: vec![400],
        ..FilmStockFilterSet::default()
    };
    controller.set_filter_set(filter_set.clone()).await;

    let held = controller.film_stocks().await;
    let mut expected: Vec<FilmStock> = storage
        .list_film_stocks()
        .await
        .expect("all stocks")
        .into_iter()
        .filter(|s| filter_set.matches(s))
        .collect();
    shared::sort::sort_film_stocks(&mut expected, FilmStockSortMode::Name);
    assert_eq!(held, expected);
    let names: Vec<String> = held.iter().map(FilmStock::name).collect();
    assert_eq!(names, vec!["ILFORD HP5+", "Kodak Tri-X 400"]);
}

#[tokio::test]
async fn predicate_order_does_not_change_result() {
    let (controller, storage) = seeded_controller().await;
    let set = FilmStockFilterSet {
        filter_mode: FilmStockFilterMode::Preadded,
        manufacturers: vec!["Kodak".into()],
        iso_values: vec![400, 160],
        ..FilmStockFilterSet::default()
    };
    let all = storage.list_film_stocks().await.expect("all stocks");

    let forward = apply_predicates(
        &all,
        &[
            &|s: &FilmStock| set.manufacturer_matches(s),
            &|s: &FilmStock| set.iso_matches(s),
            &|s: &FilmStock| set.added_by_matches(s),
        ],
    );
    let reverse = apply_predicates(
        &all,
        &[
            &|s: &FilmStock| set.added_by_matches(s),
            &|s: &FilmStock| set.iso_matches(s),
            &|s: &FilmStock| set.manufacturer_matches(s),
        ],
    );
    assert_eq!(forward, reverse);

    controller.set_filter_set(set.clone()).await;
    let held = controller.film_stocks().await;
    assert_eq!(held.len(), forward.len());
    assert!(held.iter().all(|s| set.matches(s)));
}

#[tokio::test]
async fn submit_existing_stock_replaces_in_place() {
    let (controller, storage) = seeded_controller().await;
    let mut stock = controller.film_stocks().await[0].clone();
    stock.iso = 100;
    let resubmitted = controller
        .submit_film_stock(stock.clone())
        .await
        .expect("resubmit");
    assert_eq!(resubmitted.id, stock.id);

    let held = controller.film_stocks().await;
    let occurrences: Vec<&FilmStock> = held.iter().filter(|s| s.id == stock.id).collect();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].iso, 100);
    assert_eq!(storage.list_film_stocks().await.expect("stocks").len(), 5);
}

#[tokio::test]
async fn submit_filtered_out_stock_leaves_store_intact() {
    let (controller, storage) = seeded_controller().await;
    controller
        .set_filter_set(FilmStockFilterSet {
            filter_mode: FilmStockFilterMode::UserAdded,
            ..FilmStockFilterSet::default()
        })
        .await;
    assert_eq!(controller.film_stocks().await.len(), 2);

    // Flipping a held stock to preadded makes it fail the active filter.
    let mut stock = controller.film_stocks().await[0].clone();
    stock.is_preadded = true;
    controller
        .submit_film_stock(stock.clone())
        .await
        .expect("submit");

    assert!(controller
        .film_stocks()
        .await
        .iter()
        .all(|s| s.id != stock.id));
    let stored = storage.list_film_stocks().await.expect("stocks");
    assert!(stored.iter().any(|s| s.id == stock.id && s.is_preadded));
}

#[tokio::test]
async fn delete_film_stock_removes_from_held_list_and_store() {
    let (controller, storage) = seeded_controller().await;
    let stock = controller.film_stocks().await[0].clone();
    controller.delete_film_stock(&stock).await.expect("delete");

    assert_eq!(controller.film_stocks().await.len(), 4);
    let stored = storage.list_film_stocks().await.expect("stocks");
    assert!(stored.iter().all(|s| s.id != stock.id));
}

#[tokio::test]
async fn new_stock_submits_through_insert_fallback() {
    let (controller, _storage) = seeded_controller().await;
    let submitted = controller
        .submit_film_stock(FilmStock {
            make: "Adox".into(),
            model: "CHS 100 II".into(),
            iso: 100,
            ..FilmStock::default()
        })
        .await
        .expect("submit");
    assert!(submitted.id.0 > 0);
    assert_eq!(controller.film_stocks().await.len(), 6);
}

#[tokio::test]
async fn blank_stock_name_is_rejected() {
    let (controller, _storage) = seeded_controller().await;
    let err = controller
        .submit_film_stock(FilmStock {
            make: "Kodak".into(),
            model: "  ".into(),
            ..FilmStock::default()
        })
        .await
        .expect_err("validation failure");
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::EmptyName)
    );
}

#[tokio::test]
async fn iso_sort_reorders_held_list_in_place() {
    let (controller, _storage) = seeded_controller().await;
    controller.set_sort_mode(FilmStockSortMode::Iso).await;
    let isos: Vec<i32> = controller.film_stocks().await.iter().map(|s| s.iso).collect();
    assert_eq!(isos, vec![50, 160, 400, 400, 400]);
}

#[tokio::test]
async fn filtered_iso_values_ignore_own_iso_filter() {
    let (controller, _storage) = seeded_controller().await;
    controller
        .set_filter_set(FilmStockFilterSet {
            manufacturers: vec!["Kodak".into()],
            iso_values: vec![400],
            ..FilmStockFilterSet::default()
        })
        .await;

    // The ISO picker still offers every Kodak ISO, not just the selected one.
    assert_eq!(controller.filtered_iso_values().await, vec![160, 400]);
    // The manufacturer picker ignores the manufacturer filter but honors ISO.
    assert_eq!(
        controller.filtered_manufacturers().await,
        vec!["ILFORD".to_string(), "Kodak".to_string(), "Lomography".to_string()]
    );
}

#[tokio::test]
async fn type_filter_narrows_by_emulsion_type() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .add_film_stock(&FilmStock {
            make: "ILFORD".into(),
            model: "HP5+".into(),
            iso: 400,
            film_type: FilmType::BwNegative,
            ..FilmStock::default()
        })
        .await
        .expect("stock");
    storage
        .add_film_stock(&FilmStock {
            make: "Kodak".into(),
            model: "Portra 400".into(),
            iso: 400,
            film_type: FilmType::ColorNegative,
            ..FilmStock::default()
        })
        .await
        .expect("stock");

    let controller = FilmStocksController::new(storage);
    controller.spawn_load().await.expect("load");
    controller
        .set_filter_set(FilmStockFilterSet {
            types: vec![FilmType::BwNegative],
            ..FilmStockFilterSet::default()
        })
        .await;

    let held = controller.film_stocks().await;
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].make, "ILFORD");
}
