use harvest_core::ProductRecord;
use harvest_engine::{
    CategoryHarvest, Completion, CsvSink, CsvSinkOptions, FailureKind, FetchError, OutputSink,
};
use pretty_assertions::assert_eq;

fn record(category: &str, name: &str, reviews: u32, price: &str) -> ProductRecord {
    ProductRecord {
        category: category.to_string(),
        name: name.to_string(),
        link: format!("https://shop.example.com/p/{reviews}"),
        review_count: reviews,
        rating: Some(4.5),
        price: price.to_string(),
    }
}

fn harvest(category: &str, records: Vec<ProductRecord>, completion: Completion) -> CategoryHarvest {
    CategoryHarvest {
        category: category.to_string(),
        site: "petvalu".to_string(),
        records,
        pages_fetched: 1,
        cards_skipped: 0,
        completion,
    }
}

#[test]
fn writes_table_rows_in_aggregate_order_with_quoting() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvSink::new(
        dir.path().to_path_buf(),
        CsvSinkOptions {
            manifest_filename: None,
            ..CsvSinkOptions::default()
        },
    );

    let harvests = vec![
        harvest(
            "Cat Dry Food",
            vec![
                record("Cat Dry Food", "Kibble, Salmon \"Deluxe\"", 12, "$1,299.00"),
                record("Cat Dry Food", "Plain Kibble", 7, "$9.99"),
            ],
            Completion::Complete,
        ),
        harvest(
            "Dog Toys",
            vec![record("Dog Toys", "Rope Toy", 3, "$4.49")],
            Completion::Complete,
        ),
    ];

    let summary = sink.write_run(&harvests).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.manifest_path, None);

    let table = std::fs::read_to_string(&summary.table_path).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "Category,Name,Link,Reviews,Rating,Price");
    assert_eq!(
        lines[1],
        "Cat Dry Food,\"Kibble, Salmon \"\"Deluxe\"\"\",https://shop.example.com/p/12,12,4.5,\"$1,299.00\""
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[3].starts_with("Dog Toys,Rope Toy,"));
}

#[test]
fn manifest_reports_per_category_completion() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvSink::new(
        dir.path().to_path_buf(),
        CsvSinkOptions {
            generated_utc: Some("2026-01-05T10:00:00Z".to_string()),
            ..CsvSinkOptions::default()
        },
    );

    let harvests = vec![
        harvest(
            "Cat Dry Food",
            vec![record("Cat Dry Food", "Kibble", 12, "$9.99")],
            Completion::Complete,
        ),
        harvest(
            "Dog Toys",
            Vec::new(),
            Completion::Truncated {
                page: 2,
                error: FetchError {
                    kind: FailureKind::Timeout,
                    message: "deadline elapsed".to_string(),
                },
            },
        ),
    ];

    let summary = sink.write_run(&harvests).unwrap();
    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(summary.manifest_path.unwrap()).unwrap())
            .unwrap();

    assert_eq!(manifest["generated_utc"], "2026-01-05T10:00:00Z");
    assert_eq!(manifest["total_rows"], 1);
    assert_eq!(manifest["categories"][0]["complete"], true);
    assert_eq!(manifest["categories"][1]["complete"], false);
    assert_eq!(manifest["categories"][1]["rows"], 0);
    assert!(manifest["categories"][1]["error"]
        .as_str()
        .unwrap()
        .contains("timeout"));
}

#[test]
fn rerun_replaces_the_previous_table() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvSink::new(dir.path().to_path_buf(), CsvSinkOptions::default());

    let first = vec![harvest(
        "Cat Dry Food",
        vec![record("Cat Dry Food", "Kibble", 12, "$9.99")],
        Completion::Complete,
    )];
    let second = vec![harvest("Cat Dry Food", Vec::new(), Completion::Complete)];

    sink.write_run(&first).unwrap();
    let summary = sink.write_run(&second).unwrap();

    let table = std::fs::read_to_string(&summary.table_path).unwrap();
    assert_eq!(table.lines().count(), 1);
}

#[test]
fn empty_aggregate_still_writes_a_header() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvSink::new(dir.path().to_path_buf(), CsvSinkOptions::default());

    let summary = sink.write_run(&[]).unwrap();
    assert_eq!(summary.rows, 0);
    let table = std::fs::read_to_string(&summary.table_path).unwrap();
    assert_eq!(table, "Category,Name,Link,Reviews,Rating,Price\n");
}
