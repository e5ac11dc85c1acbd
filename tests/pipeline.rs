mod common;

use csv_ingest::{
    distribution::AgeBucket,
    error::IngestError,
    generate,
    pipeline::{self, IngestOptions},
    store::UserStore,
};

use common::{TestWorkspace, sample_csv};

#[test]
fn upload_from_file_persists_rows_across_reopen() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "users.csv",
        &sample_csv(&[("Rohit", "Prasad", "35"), ("Priya", "Sharma", "15")]),
    );

    {
        let mut store = UserStore::open(workspace.database()).expect("open store");
        let summary =
            pipeline::upload(&mut store, &input, &IngestOptions::default()).expect("upload");
        assert_eq!(summary.records_processed, 2);
        assert_eq!(summary.batch_sizes, vec![2]);
    }

    let store = UserStore::open(workspace.database()).expect("reopen store");
    let users = pipeline::list_users(&store).expect("list users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, 1);
    assert_eq!(users[0].name, "Rohit Prasad");
    assert_eq!(users[0].age, 35);
    assert_eq!(
        users[0].address.as_deref(),
        Some(
            r#"{"line1":"A-563 Rakshak Society","line2":"New Pune Road","city":"Pune","state":"Maharashtra"}"#
        )
    );
    assert_eq!(
        users[0].additional_info.as_deref(),
        Some(r#"{"gender":"male"}"#)
    );
}

#[test]
fn quoted_fields_survive_into_storage() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = "name.firstName,name.lastName,age,address.line1\n\
                   Sneha,Patel,28,\"Flat 4, Palm Grove\"\n";
    pipeline::ingest_content(&mut store, content, &IngestOptions::default()).expect("ingest");
    let users = pipeline::list_users(&store).expect("list");
    assert_eq!(
        users[0].address.as_deref(),
        Some(r#"{"line1":"Flat 4, Palm Grove"}"#)
    );
}

#[test]
fn mismatched_rows_are_skipped_not_fatal() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = "name.firstName,name.lastName,age\n\
                   Rohit,Prasad,34\n\
                   Broken,Row\n\
                   Amit,Kumar,61\n";
    let summary =
        pipeline::ingest_content(&mut store, content, &IngestOptions::default()).expect("ingest");
    assert_eq!(summary.records_processed, 2);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(store.count().expect("count"), 2);
}

#[test]
fn one_invalid_row_rolls_back_the_whole_file() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = sample_csv(&[
        ("A", "One", "21"),
        ("B", "Two", "22"),
        ("C", "Three", "23"),
        ("D", "Four", "24"),
        ("E", "Five", "25"),
        ("F", "Six", ""),
    ]);
    let err = pipeline::ingest_content(&mut store, &content, &IngestOptions::default())
        .expect_err("missing age must abort");
    assert!(matches!(err.row_error(), IngestError::MissingField(_)));
    assert!(matches!(err, IngestError::InvalidRecord { line: 7, .. }));
    assert_eq!(store.count().expect("count"), 0);
}

#[test]
fn invalid_age_rolls_back_previous_batches() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = sample_csv(&[
        ("A", "One", "21"),
        ("B", "Two", "22"),
        ("C", "Three", "unknown"),
    ]);
    let options = IngestOptions {
        batch_size: 1,
        ..IngestOptions::default()
    };
    let err = pipeline::ingest_content(&mut store, &content, &options)
        .expect_err("invalid age must abort");
    assert!(matches!(err.row_error(), IngestError::InvalidAge(_)));
    assert!(err.to_string().starts_with("Line 4: Age must be a valid number"));
    assert_eq!(store.count().expect("count"), 0);
}

#[test]
fn rejected_row_is_reported_by_line_after_blank_lines() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = "name.firstName,name.lastName,age\n\
                   \n\
                   Rohit,Prasad,34\n\
                   Priya,Sharma,abc\n";
    let err = pipeline::ingest_content(&mut store, content, &IngestOptions::default())
        .expect_err("invalid age must abort");
    assert!(matches!(err, IngestError::InvalidRecord { line: 3, .. }));
    assert_eq!(store.count().expect("count"), 0);
}

#[test]
fn blank_name_parts_roll_back_the_file() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = "name.firstName,name.lastName,age,address\n\
                   Rohit,Prasad,35,0\n\
                   false,0,30,0\n";
    let err = pipeline::ingest_content(&mut store, content, &IngestOptions::default())
        .expect_err("blank name must abort");
    assert_eq!(
        err.to_string(),
        "Line 3: Missing mandatory field: name.firstName or name.lastName"
    );
    assert_eq!(store.count().expect("count"), 0);
}

#[test]
fn blank_address_is_stored_as_null() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = "name.firstName,name.lastName,age,address,score\nRohit,Prasad,35,0,1e400\n";
    pipeline::ingest_content(&mut store, content, &IngestOptions::default()).expect("ingest");
    let users = pipeline::list_users(&store).expect("list");
    assert_eq!(users[0].address, None);
    assert_eq!(users[0].additional_info.as_deref(), Some(r#"{"score":null}"#));
}

#[test]
fn failed_run_keeps_previously_committed_rows() {
    let mut store = UserStore::open_in_memory().expect("store");
    pipeline::ingest_content(
        &mut store,
        &sample_csv(&[("Kept", "Row", "50")]),
        &IngestOptions::default(),
    )
    .expect("first run");
    let bad = sample_csv(&[("New", "Row", "30"), ("Bad", "Row", "")]);
    assert!(pipeline::ingest_content(&mut store, &bad, &IngestOptions::default()).is_err());
    let users = pipeline::list_users(&store).expect("list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Kept Row");
}

#[test]
fn generated_file_commits_in_three_batches() {
    let workspace = TestWorkspace::new();
    let input = workspace.path().join("bulk.csv");
    generate::generate_csv(&input, 2500).expect("generate");

    let mut store = UserStore::open_in_memory().expect("store");
    let summary =
        pipeline::upload(&mut store, &input, &IngestOptions::default()).expect("upload");
    assert_eq!(summary.records_processed, 2500);
    assert_eq!(summary.batch_sizes, vec![1000, 1000, 500]);

    let users = pipeline::list_users(&store).expect("list");
    assert_eq!(users.len(), 2500);
    assert!(users.windows(2).all(|pair| pair[0].id + 1 == pair[1].id));

    let distribution = summary.age_distribution.expect("distribution");
    assert_eq!(distribution.total_users, 2500);
    assert_eq!(distribution.count(AgeBucket::UnderTwenty), 250);
    assert_eq!(distribution.count(AgeBucket::TwentyToForty), 1000);
    assert_eq!(distribution.count(AgeBucket::FortyToSixty), 750);
    assert_eq!(distribution.count(AgeBucket::OverSixty), 500);
    assert_eq!(
        distribution.percentage(AgeBucket::TwentyToForty).to_string(),
        "40.00"
    );
}

#[test]
fn distribution_example_over_three_users() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = sample_csv(&[("A", "A", "15"), ("B", "B", "45"), ("C", "C", "70")]);
    pipeline::ingest_content(&mut store, &content, &IngestOptions::default()).expect("ingest");

    let distribution = pipeline::age_distribution(&store).expect("distribution");
    let percentages = AgeBucket::ALL
        .iter()
        .map(|&bucket| distribution.percentage(bucket).to_string())
        .collect::<Vec<_>>();
    assert_eq!(percentages, vec!["33.33", "0.00", "33.33", "33.33"]);
}

#[test]
fn clear_twice_then_distribution_reports_no_data() {
    let mut store = UserStore::open_in_memory().expect("store");
    pipeline::ingest_content(
        &mut store,
        &sample_csv(&[("A", "B", "30")]),
        &IngestOptions::default(),
    )
    .expect("ingest");
    pipeline::clear_users(&mut store).expect("first clear");
    pipeline::clear_users(&mut store).expect("second clear");
    assert!(matches!(
        pipeline::age_distribution(&store),
        Err(IngestError::NoData)
    ));

    pipeline::ingest_content(
        &mut store,
        &sample_csv(&[("C", "D", "40")]),
        &IngestOptions::default(),
    )
    .expect("ingest after clear");
    assert_eq!(pipeline::list_users(&store).expect("list")[0].id, 1);
}

#[test]
fn semicolon_delimited_input() {
    let mut store = UserStore::open_in_memory().expect("store");
    let content = "name.firstName;name.lastName;age;notes\nRiya;Bose;19;\"likes a;b\"\n";
    let options = IngestOptions {
        delimiter: b';',
        ..IngestOptions::default()
    };
    pipeline::ingest_content(&mut store, content, &options).expect("ingest");
    let users = pipeline::list_users(&store).expect("list");
    assert_eq!(
        users[0].additional_info.as_deref(),
        Some(r#"{"notes":"likes a;b"}"#)
    );
}
