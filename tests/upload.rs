mod common;

use common::{log_text, outbound_only, write_minimal_outbound, Workspace};
use std::collections::HashSet;
use wms_velocity::{Env, ProjectService, TransformOptions, WeekendDateRule};

#[test]
fn test_minimal_happy_path() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    let service = ws.project("P1");

    let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(response.success, "{}", response.message);
    assert_eq!(response.project_number, "P1");

    let rows = &response.rows_inserted;
    assert_eq!(rows.skus, 2);
    assert_eq!(rows.outbound_lines, 2);
    assert_eq!(rows.outbound_orders, 1);
    assert_eq!(rows.inbound_receipts, 0);
    assert_eq!(rows.inventory_lines, 0);
    assert_eq!(rows.total, 20);
    assert_eq!(ws.derived_rows("P1"), 20);

    // One line each: cumulative shares 0.5 and 1.0
    let conn = ws.connection();
    let mut stmt = conn
        .prepare("SELECT Velocity, ActiveSKUs, Lines, Units FROM VelocitySummary WHERE ProjectNumber = ?1 ORDER BY Velocity")
        .unwrap();
    let summary: Vec<(String, i64, i64, i64)> = stmt
        .query_map(["P1"], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(
        summary,
        vec![("B".to_string(), 1, 1, 3), ("E".to_string(), 1, 1, 1)]
    );

    let project = service.get_project().unwrap();
    assert!(project.data_uploaded);
    assert!(project.upload_date.is_some());
    assert_eq!(project.options, Some(outbound_only()));
    assert_eq!(project.files.len(), 3);

    let log = log_text(&response.log_file_path);
    assert!(log.contains("OutboundData: first row"));
    assert!(log.contains("Total rows inserted: 20"));
}

#[test]
fn test_surrogates_are_project_prefixed() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    let service = ws.project("WH-7");
    assert!(service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap().success);

    let pairs = ws.strings(
        "SELECT ProjectNumber_SKU || '|' || SKU FROM OutboundData WHERE ProjectNumber = ?1",
        "WH-7",
    );
    for pair in pairs {
        let (surrogate, sku) = pair.split_once('|').unwrap();
        assert_eq!(surrogate, format!("WH-7-{}", sku));
    }

    let velocities = ws.strings(
        "SELECT ProjectNumber_Velocity FROM ProjectNumberVelocity WHERE ProjectNumber = ?1 ORDER BY Velocity",
        "WH-7",
    );
    assert_eq!(velocities, vec!["WH-7-A", "WH-7-B", "WH-7-C", "WH-7-D", "WH-7-E"]);
}

#[test]
fn test_weekend_rule_moves_analysis_date() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-06");
    let service = ws.project("P1");

    let options = TransformOptions {
        weekend_date_rule: WeekendDateRule::AllToMonday,
        ..outbound_only()
    };
    assert!(service.transform_and_upload(&ws.data_dir(), options).unwrap().success);

    let conn = ws.connection();
    let (date, weekday, idx): (String, String, i64) = conn
        .query_row(
            "SELECT Date, Weekday, Weekday_Idx FROM OutboundData WHERE ProjectNumber = ?1 LIMIT 1",
            ["P1"],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(date, "2024-01-08");
    assert_eq!(weekday, "Monday");
    assert_eq!(idx, 1);
}

#[test]
fn test_foreign_key_violation_writes_nothing() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    ws.write(
        "OrderDetails.csv",
        "OrderNumber,SKU,Quantity,UoM\nO1,A,3,Each\nO1,B,1,Each\nO1,C,1,Each\n",
    );
    let service = ws.project("P1");

    let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(!response.success);
    assert!(response.message.contains("foreign key mismatch"));
    assert!(response.message.contains('C'));
    assert_eq!(response.rows_inserted.total, 0);
    assert_eq!(ws.derived_rows("P1"), 0);
    assert!(!service.get_project().unwrap().data_uploaded);

    let log = log_text(&response.log_file_path);
    assert!(log.contains("OrderDetails.SKU -> ItemMaster.SKU: 1 unknown key(s): C"));
}

#[test]
fn test_store_failure_rolls_back_every_table() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    let service = ws.project("P1");

    ws.connection()
        .execute_batch(
            "CREATE TRIGGER fail_outbound BEFORE INSERT ON OutboundData
             BEGIN SELECT RAISE(FAIL, 'injected failure'); END;",
        )
        .unwrap();

    let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(!response.success);
    assert!(response.message.contains("OutboundData"), "{}", response.message);
    assert_eq!(ws.derived_rows("P1"), 0);
    assert!(!service.get_project().unwrap().data_uploaded);

    let log = log_text(&response.log_file_path);
    assert!(log.contains("Rolled back"));
    assert!(log.contains("FAILED [StoreWriteFailed]"));
}

#[test]
fn test_boundary_classes_through_pipeline() {
    let ws = Workspace::new();
    let mut items = String::from("SKU,Description,UoM,EachLength,EachWidth,EachHeight,EachWeight\n");
    let mut details = String::from("OrderNumber,SKU,Quantity,UoM\n");
    for i in 0..100 {
        items.push_str(&format!("S{:03},Item {},Each,1,1,1,1\n", i, i));
        details.push_str(&format!("O1,S{:03},1,Each\n", i));
    }
    ws.write("ItemMaster.csv", &items);
    ws.write("OrderHeader.csv", "OrderNumber,ReceivedDate,PickDate,ShipDate\nO1,2024-01-01,2024-01-01,2024-01-02\n");
    ws.write("OrderDetails.csv", &details);

    let service = ws.project("P1");
    assert!(service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap().success);

    let classes = ws.strings(
        "SELECT Velocity || ':' || COUNT(*) FROM ItemMaster WHERE ProjectNumber = ?1 GROUP BY Velocity ORDER BY Velocity",
        "P1",
    );
    assert_eq!(classes, vec!["A:25", "B:55", "C:15", "D:4", "E:1"]);
}

#[test]
fn test_all_files_with_inventory_and_inbound() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    ws.write(
        "InboundHeader.csv",
        "ReceiptNumber,ArrivalDate,ArrivalTime,Carrier\nR1,2024-01-03,08:30:00,UPS\nR2,2024-01-04,,FedEx\n",
    );
    ws.write(
        "InboundDetails.csv",
        "ReceiptNumber,SKU,UoM,Quantity\nR1,A,Carton,2\nR1,B,Each,10\nR2,B,Each,5\n",
    );
    ws.write(
        "Inventory.csv",
        "Period,SKU,Quantity,UoM,Location\n2024-01-31,A,4,Each,R01\n2024-01-31,B,0,Each,R02\n",
    );
    let service = ws.project("P1");

    let response = service
        .transform_and_upload(&ws.data_dir(), TransformOptions::default())
        .unwrap();
    assert!(response.success, "{}", response.message);
    assert_eq!(response.rows_inserted.inbound_receipts, 2);
    assert_eq!(response.rows_inserted.inbound_lines, 3);
    assert_eq!(response.rows_inserted.inventory_lines, 2);

    let conn = ws.connection();
    let (lines, skus): (i64, i64) = conn
        .query_row(
            "SELECT Lines, SKUs FROM InboundHeader WHERE ProjectNumber_ReceiptNumber = 'P1-R1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!((lines, skus), (2, 2));

    // Carton of A is 24*24*12/1728 = 4 cu ft
    let cube: f64 = conn
        .query_row(
            "SELECT LineCube FROM InboundDetails WHERE ProjectNumber = 'P1' AND SKU = 'A'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(cube, 8.0);

    let flags = ws.strings(
        "SELECT SKU || ':' || Velocity || ':' || ExistsInOutbound FROM InventoryData WHERE ProjectNumber = ?1 ORDER BY SKU",
        "P1",
    );
    assert_eq!(flags, vec!["A:B:1", "B:E:1"]);

    // Every SKU written anywhere is an ItemMaster SKU
    let items: HashSet<String> = ws
        .strings("SELECT SKU FROM ItemMaster WHERE ProjectNumber = ?1", "P1")
        .into_iter()
        .collect();
    for table in ["InboundDetails", "InventoryData", "OutboundData", "VelocityByMonth"] {
        let skus = ws.strings(&format!("SELECT SKU FROM {} WHERE ProjectNumber = ?1", table), "P1");
        assert!(skus.iter().all(|s| items.contains(s)), "{}", table);
    }
}

#[test]
fn test_missing_required_file_fails_validation() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    let service = ws.project("P1");

    let response = service
        .transform_and_upload(&ws.data_dir(), TransformOptions::default())
        .unwrap();
    assert!(!response.success);
    assert!(response.message.contains("InboundHeader.csv"), "{}", response.message);
    assert_eq!(ws.derived_rows("P1"), 0);
}

#[test]
fn test_missing_directory_and_project() {
    let ws = Workspace::new();
    let service = ws.project("P1");
    let response = service
        .transform_and_upload(&ws.root.path().join("nowhere"), outbound_only())
        .unwrap();
    assert!(!response.success);
    assert!(response.message.contains("data directory not found"));

    write_minimal_outbound(&ws, "2024-01-02");
    let response = ws
        .service("P2")
        .transform_and_upload(&ws.data_dir(), outbound_only())
        .unwrap();
    assert!(!response.success);
    assert!(response.message.contains("P2 does not exist"));
}

#[test]
fn test_unreachable_store_is_an_expected_failure() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    let mut settings = ws.settings();
    settings.stores.dev = ws.root.path().join("no").join("such").join("dir.db").display().to_string();
    settings.connect_attempts = 2;

    let service = ProjectService::new("P1", Env::Dev, settings).unwrap();
    let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(!response.success);
    assert!(response.message.contains("store unavailable after 2 attempt(s)"));
}

#[test]
fn test_second_upload_refused_until_data_deleted() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    let service = ws.project("P1");

    let first = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(first.success);

    let again = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(!again.success);
    assert!(again.message.contains("already has uploaded data"));
    assert_eq!(ws.derived_rows("P1"), first.rows_inserted.total as i64);
}

#[test]
fn test_unknown_order_number_writes_nothing() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    ws.write(
        "OrderDetails.csv",
        "OrderNumber,SKU,Quantity,UoM\nO1,A,3,Each\nO9,B,1,Each\n",
    );
    let service = ws.project("P1");

    let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(!response.success);
    assert!(
        response
            .message
            .contains("OrderDetails.OrderNumber -> OrderHeader.OrderNumber: O9"),
        "{}",
        response.message
    );
    assert_eq!(ws.derived_rows("P1"), 0);
    assert!(!service.get_project().unwrap().data_uploaded);
}

#[test]
fn test_huge_quantities_saturate_instead_of_failing() {
    let ws = Workspace::new();
    write_minimal_outbound(&ws, "2024-01-02");
    ws.write(
        "OrderDetails.csv",
        "OrderNumber,SKU,Quantity,UoM\nO1,A,9000000000000000000,Each\nO1,A,9000000000000000000,Each\nO1,B,1,Each\n",
    );
    let service = ws.project("P1");

    let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
    assert!(response.success, "{}", response.message);

    let conn = ws.connection();
    let units = |sql: &str| -> i64 { conn.query_row(sql, ["P1"], |r| r.get(0)).unwrap() };
    assert_eq!(
        units("SELECT Units FROM VelocitySummary WHERE ProjectNumber = ?1 AND Velocity = 'B'"),
        i64::MAX
    );
    assert_eq!(
        units("SELECT Units FROM OutboundDataByOrder WHERE ProjectNumber = ?1"),
        i64::MAX
    );
    assert_eq!(
        units("SELECT Units FROM ItemMaster WHERE ProjectNumber = ?1 AND SKU = 'A'"),
        i64::MAX
    );
}

#[test]
fn test_non_utf8_cell_is_a_coercion_error_on_any_row() {
    for bad_row in [1usize, 8] {
        let ws = Workspace::new();
        write_minimal_outbound(&ws, "2024-01-02");

        let mut details = b"OrderNumber,SKU,Quantity,UoM,Carrier\n".to_vec();
        for row in 1..=8 {
            details.extend_from_slice(b"O1,A,1,Each,");
            if row == bad_row {
                details.extend_from_slice(&[0xFF, 0xFE]);
            } else {
                details.extend_from_slice(b"UPS");
            }
            details.push(b'\n');
        }
        std::fs::write(ws.data_dir().join("OrderDetails.csv"), details).unwrap();

        let service = ws.project("P1");
        let response = service.transform_and_upload(&ws.data_dir(), outbound_only()).unwrap();
        assert!(!response.success);
        assert_eq!(
            response.message,
            "OrderDetails column(s) could not be coerced: Carrier",
            "bad byte on data row {}",
            bad_row
        );
        assert_eq!(ws.derived_rows("P1"), 0);
    }
}
