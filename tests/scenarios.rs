use prepaid_ledger::{
    handle, load_snapshot, Body, CsvFileSource, CsvTextSource, Notice, RowPolicy, Settings,
};

fn page_for(csv: &str, store: Option<&str>) -> prepaid_ledger::Page {
    handle(&CsvTextSource::new(csv), &Settings::default(), store)
}

#[test]
fn scenario_a_latest_and_history() {
    let page = page_for(
        r#"날짜,거래처,잔액
        2024-01-01,Shop A,1000
        2024-01-05,Shop B,2000
        2024-01-10,Shop A,1500"#,
        Some("Shop A"),
    );
    let detail = page.detail().expect("detail for Shop A");

    assert_eq!(detail.balance.value, "1,500 원");
    assert_eq!(detail.last_updated.value, "2024-01-10");
    assert_eq!(detail.history.rows.len(), 2);
    assert_eq!(detail.history.rows[0][0], "2");
    assert_eq!(detail.history.rows[1][0], "0");
}

#[test]
fn scenario_b_empty_snapshot() {
    let page = page_for("날짜,거래처,잔액", None);

    assert!(page.selector.as_ref().unwrap().options.is_empty());
    assert!(page.detail().is_none());
    assert!(matches!(page.body, Body::Notice(Notice::NoData { .. })));
}

#[test]
fn scenario_c_unknown_store() {
    let page = page_for(
        r#"날짜,거래처,잔액
        2024-01-01,Shop A,1000"#,
        Some("Shop C"),
    );

    assert!(matches!(page.body, Body::Notice(Notice::NoHistory { ref store, .. }) if store == "Shop C"));
}

#[test]
fn scenario_d_fetch_fails() {
    let source = CsvFileSource::new("/nonexistent/prepaid/ledger.csv");
    let page = handle(&source, &Settings::default(), Some("Shop A"));

    assert!(page.is_failure());
    assert!(page.selector.is_none());
    assert!(page.detail().is_none());
}

#[test]
fn latest_ignores_date_order() {
    let page = page_for(
        r#"날짜,거래처,잔액
        2024-05-01,Shop A,9000
        2024-01-01,Shop A,100"#,
        None,
    );
    let detail = page.detail().unwrap();

    assert_eq!(detail.balance.value, "100 원");
    assert_eq!(detail.last_updated.value, "2024-01-01");
}

#[test]
fn every_listed_store_has_history() {
    let source = CsvTextSource::new(
        r#"날짜,거래처,잔액,메모
        2024. 1. 1,김밥천국,100000,입금
        2024. 1. 3,동네카페,50000,입금
        2024. 1. 8,김밥천국,82500,
        2024. 2. 1,꽃집,30000,입금"#,
    );
    let snapshot = load_snapshot(&source, &Settings::default()).unwrap();
    let stores = snapshot.counterparties();

    assert_eq!(stores, vec!["김밥천국", "동네카페", "꽃집"]);
    for store in stores {
        let history = snapshot.history(store);
        assert!(!history.is_empty());
        assert!(history.iter().all(|row| row.counterparty.as_deref() == Some(store)));
    }
}

#[test]
fn skip_policy_keeps_good_rows() {
    let settings = Settings {
        on_bad_row: RowPolicy::Skip,
        ..Settings::default()
    };
    let source = CsvTextSource::new(
        r#"날짜,거래처,잔액
        2024-01-01,Shop A,1000
        someday,Shop A,1
        2024-01-02,Shop B,500"#,
    );
    let page = handle(&source, &settings, Some("Shop A"));

    assert_eq!(page.detail().unwrap().balance.value, "1,000 원");
}

#[test]
fn text_output_of_detail_page() {
    let text = page_for(
        r#"날짜,거래처,잔액
        2024-01-01,Shop A,1234567"#,
        None,
    )
    .to_string();

    assert!(text.contains("💳 선결제 잔액 조회"));
    assert!(text.contains("🏪 Shop A"));
    assert!(text.contains("1,234,567 원"));
}

#[test]
fn odd_balance_in_another_store_does_not_hide_page() {
    let page = page_for(
        r#"날짜,거래처,잔액
        2024-01-01,Shop A,1000
        2024-01-02,Shop B,정산중"#,
        Some("Shop A"),
    );

    assert!(!page.is_failure());
    assert_eq!(page.detail().unwrap().balance.value, "1,000 원");
}

#[test]
fn odd_balance_in_last_row_is_still_latest() {
    let page = page_for(
        r#"날짜,거래처,잔액
        2024-01-01,Shop A,1000
        2024-01-05,Shop A,확인중"#,
        Some("Shop A"),
    );
    let detail = page.detail().unwrap();

    assert_eq!(detail.balance.value, "확인중");
    assert_eq!(detail.last_updated.value, "2024-01-05");
    assert_eq!(detail.history.rows.len(), 2);
}
