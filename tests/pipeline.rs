// Filesystem-backed pipeline tests: directory loading, full runs, output bytes

use card_portfolio::{
    load_catalog_dirs, load_inventory_dirs, run, summarize_file, CatalogParser,
    JsonCatalogParser, PipelineConfig, PortfolioError, RowSource,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE1_JSON: &str = r#"{
  "data": [
    {
      "id": "base1-4", "name": "Charizard", "number": "4",
      "set": { "id": "base1", "name": "Base" },
      "tcgplayer": { "prices": { "holofoil": { "market": 350.0 } } }
    },
    {
      "id": "base1-58", "name": "Pikachu", "number": "58",
      "set": { "id": "base1", "name": "Base" },
      "tcgplayer": { "prices": { "normal": { "market": 2.3 } } }
    }
  ]
}"#;

const SM1_JSON: &str = r#"[
  {
    "id": "sm1-1", "name": "Bulbasaur", "number": "001",
    "set": { "id": "SM1", "name": "Sun & Moon" },
    "tcgplayer": { "prices": { "normal": { "market": 1.2 }, "holofoil": null } }
  },
  "not a card"
]"#;

// CSV content saved with a .json extension
const SM1_LOOKUP_TABULAR: &str = "card_name,card_number,set_id\nBulbasaur,001,SM1\n";

const BINDER_CSV: &str = "\
set_id,card_number,binder_name,page_number,slot_number
SM1,001,A,1,2
base1,4,A,1,3
SM1,001,B,2,1
XY9,050,B,2,2
";

const LOOSE_CSV: &str = "\
set,number,card_name
base1,58,My Pikachu
,012,
";

fn write_file(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

fn create_test_layout() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path();

    let lookup = base.join("card_set_lookup");
    write_file(&lookup, "base1.json", BASE1_JSON);
    write_file(&lookup, "broken.json", "{\"data\": [");
    write_file(&lookup, "sm1_lookup.json", SM1_LOOKUP_TABULAR);
    write_file(&base.join("card_set_lookup_test"), "sm1.json", SM1_JSON);

    let inventory = base.join("card_inventory");
    write_file(&inventory, "binder.csv", BINDER_CSV);
    write_file(&base.join("card_inventory_test"), "loose.csv", LOOSE_CSV);
    write_file(&base.join("card_inventory_test"), "notes.txt", "not inventory");

    tmp
}

#[test]
fn test_catalog_loading_skips_malformed_files() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path());

    let catalog = load_catalog_dirs(&config.catalog_dirs);

    // base1.json (2) + sm1_lookup.json (1) + sm1.json (1, string element dropped)
    assert_eq!(catalog.records.len(), 4);
    assert_eq!(catalog.report.files_loaded, 3);
    assert_eq!(catalog.report.skipped.len(), 1);
    assert!(catalog.report.skipped[0].path.ends_with("broken.json"));

    // Sorted listing: base1.json entries come first
    assert_eq!(catalog.records[0].card_id.as_deref(), Some("base1-4"));
    assert_eq!(catalog.records[2].source_file, "sm1_lookup.json");
    assert!(catalog.records[2].prices.is_empty());
}

#[test]
fn test_inventory_loading_aliases_and_leading_zeros() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path());

    let inventory = load_inventory_dirs(&config.inventory_dirs);

    assert_eq!(inventory.records.len(), 6);
    assert_eq!(inventory.report.files_loaded, 2);
    assert!(inventory.report.skipped.is_empty());

    let ids: Vec<Option<&str>> = inventory
        .records
        .iter()
        .map(|r| r.card_id.as_deref())
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("SM1-001"),
            Some("base1-4"),
            Some("SM1-001"),
            Some("XY9-050"),
            Some("base1-58"),
            None,
        ]
    );
    assert_eq!(inventory.records[5].card_number.as_deref(), Some("012"));
}

#[test]
fn test_full_run_output() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path());

    let outcome = run(&config).unwrap();

    assert_eq!(outcome.rows_written(), 6);
    assert_eq!(outcome.reconciliation.mode, RowSource::Inventory);
    assert_eq!(outcome.reconciliation.matched, 4);
    assert_eq!(outcome.reconciliation.unmatched, 1);
    assert_eq!(outcome.reconciliation.unkeyed, 1);
    assert_eq!(outcome.reconciliation.catalog_duplicates_dropped, 1);
    assert_eq!(outcome.catalog_load.skipped.len(), 1);

    let written = fs::read_to_string(tmp.path().join("portfolio.csv")).unwrap();
    let expected = "\
card_id,card_name,card_number,set_id,set_name,card_market_value,binder_name,page_number,slot_number,index
SM1-001,Bulbasaur,001,SM1,Sun & Moon,1.2,A,1,2,A-1-2
base1-4,Charizard,4,base1,Base,350.0,A,1,3,A-1-3
SM1-001,Bulbasaur,001,SM1,Sun & Moon,1.2,B,2,1,B-2-1
XY9-050,,050,XY9,NOT_FOUND,0.0,B,2,2,B-2-2
base1-58,My Pikachu,58,base1,Base,2.3,,,,--
,,012,,NOT_FOUND,0.0,,,,--
";
    assert_eq!(written, expected);
}

#[test]
fn test_rerun_is_byte_identical() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path());

    let first = run(&config).unwrap();
    let first_bytes = fs::read(&config.output_path).unwrap();
    let second = run(&config).unwrap();
    let second_bytes = fs::read(&config.output_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.write.sha256, second.write.sha256);
}

#[test]
fn test_empty_sources_write_header_only() {
    let tmp = TempDir::new().unwrap();
    let config = PipelineConfig::new(tmp.path());

    let outcome = run(&config).unwrap();

    assert_eq!(outcome.rows_written(), 0);
    assert_eq!(outcome.reconciliation.mode, RowSource::Empty);
    assert_eq!(
        fs::read_to_string(&config.output_path).unwrap(),
        "card_id,card_name,card_number,set_id,set_name,card_market_value\n"
    );
}

#[test]
fn test_catalog_only_run() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path()).with_inventory_dirs(vec![]);

    let outcome = run(&config).unwrap();

    assert_eq!(outcome.reconciliation.mode, RowSource::CatalogOnly);
    assert_eq!(outcome.rows_written(), 3);
    let written = fs::read_to_string(&config.output_path).unwrap();
    let expected = "\
card_id,card_name,card_number,set_id,set_name,card_market_value
base1-4,Charizard,4,base1,Base,350.0
base1-58,Pikachu,58,base1,Base,2.3
SM1-001,Bulbasaur,001,SM1,Sun & Moon,1.2
";
    assert_eq!(written, expected);
}

#[test]
fn test_unwritable_destination_names_path() {
    let tmp = create_test_layout();
    let output: PathBuf = tmp.path().join("no_such_dir").join("portfolio.csv");
    let config = PipelineConfig::new(tmp.path()).with_output_path(&output);

    let err = run(&config).unwrap_err();

    match &err {
        PortfolioError::Write { path, .. } => assert_eq!(path, &output),
        other => panic!("expected write error, got {:?}", other),
    }
    assert!(err.to_string().contains("no_such_dir"));
}

#[test]
fn test_summary_reads_back_portfolio() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path());
    run(&config).unwrap();

    let summary = summarize_file(&config.output_path).unwrap();

    assert_eq!(summary.row_count, 6);
    assert!((summary.total_value - 354.7).abs() < 1e-9);
    let best = summary.most_valuable.unwrap();
    assert_eq!(best.card_name, "Charizard");
    assert_eq!(best.card_id, "base1-4");
}

#[test]
fn test_summary_coerces_bad_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("portfolio.csv");
    fs::write(
        &path,
        "card_id,card_name,card_market_value\na-1,Alpha,oops\nb-1,,4.5\n",
    )
    .unwrap();

    let summary = summarize_file(&path).unwrap();

    assert_eq!(summary.row_count, 2);
    assert_eq!(summary.total_value, 4.5);
    assert_eq!(summary.most_valuable.unwrap().card_name, "UNKNOWN");
}

#[test]
fn test_summary_missing_file() {
    let tmp = TempDir::new().unwrap();
    let err = summarize_file(&tmp.path().join("portfolio.csv")).unwrap_err();
    assert!(matches!(err, PortfolioError::NotFound { .. }));
}

#[test]
fn test_json_parser_rejects_scalar_top_level() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "scalar.json", "42");

    let result = JsonCatalogParser::new().parse(&tmp.path().join("scalar.json"));
    assert!(result.is_err());
}

#[test]
fn test_config_file_relative_paths() {
    let tmp = create_test_layout();
    let config_path = tmp.path().join("pipeline.json");
    fs::write(
        &config_path,
        r#"{
  "catalog_dirs": ["card_set_lookup_test"],
  "inventory_dirs": ["card_inventory"],
  "output_path": "out.csv"
}"#,
    )
    .unwrap();

    let config = PipelineConfig::from_file(&config_path).unwrap();
    assert_eq!(config.output_path, tmp.path().join("out.csv"));

    let outcome = run(&config).unwrap();
    assert_eq!(outcome.rows_written(), 4);
    assert!(tmp.path().join("out.csv").is_file());
}

#[test]
fn test_invalid_config_file() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("pipeline.json");
    fs::write(&config_path, "{ not json").unwrap();

    let err = PipelineConfig::from_file(&config_path).unwrap_err();
    assert!(matches!(err, PortfolioError::Config { .. }));
    assert!(err.to_string().contains("pipeline.json"));
}

#[test]
fn test_short_rows_keep_location_columns() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("card_inventory"),
        "a.csv",
        "set_id,card_number,binder_name\nSM1,001\n",
    );
    let config = PipelineConfig::new(tmp.path());

    let outcome = run(&config).unwrap();

    assert!(outcome.reconciliation.include_location);
    let written = fs::read_to_string(&config.output_path).unwrap();
    let expected = "\
card_id,card_name,card_number,set_id,set_name,card_market_value,binder_name,page_number,slot_number,index
SM1-001,,001,SM1,NOT_FOUND,0.0,,,,--
";
    assert_eq!(written, expected);
}

fn priced_card(name: &str, set_id: &str, number: &str, market: f64) -> String {
    format!(
        r#"[{{ "name": "{}", "number": "{}", "set": {{ "id": "{}", "name": "Test Set" }},
             "tcgplayer": {{ "prices": {{ "normal": {{ "market": {} }} }} }} }}]"#,
        name, number, set_id, market
    )
}

#[test]
fn test_equal_price_tie_goes_to_first_listed_file() {
    let tmp = TempDir::new().unwrap();
    let lookup = tmp.path().join("card_set_lookup");
    // Written in reverse so creation order cannot stand in for name order
    write_file(&lookup, "b_reprint.json", &priced_card("Reprint", "X1", "7", 5.0));
    write_file(&lookup, "a_original.json", &priced_card("Original", "X1", "7", 5.0));
    write_file(&tmp.path().join("card_inventory"), "binder.csv", "set_id,card_number\nX1,7\n");

    let outcome = run(&PipelineConfig::new(tmp.path())).unwrap();

    assert_eq!(outcome.reconciliation.catalog_duplicates_dropped, 1);
    let written = fs::read_to_string(tmp.path().join("portfolio.csv")).unwrap();
    assert!(written.ends_with("X1-7,Original,7,X1,Test Set,5.0\n"));
}

#[test]
fn test_equal_price_tie_goes_to_first_lookup_directory() {
    let tmp = TempDir::new().unwrap();
    // "a_" would sort first if both files shared one directory
    write_file(
        &tmp.path().join("card_set_lookup_test"),
        "a_test.json",
        &priced_card("From Test Dir", "Y1", "3", 2.5),
    );
    write_file(
        &tmp.path().join("card_set_lookup"),
        "z_main.json",
        &priced_card("From Main Dir", "Y1", "3", 2.5),
    );

    run(&PipelineConfig::new(tmp.path())).unwrap();

    let written = fs::read_to_string(tmp.path().join("portfolio.csv")).unwrap();
    assert_eq!(
        written,
        "card_id,card_name,card_number,set_id,set_name,card_market_value\n\
         Y1-3,From Main Dir,3,Y1,Test Set,2.5\n"
    );
}

#[test]
fn test_rendered_summary_names_portfolio_file() {
    let tmp = create_test_layout();
    let config = PipelineConfig::new(tmp.path());
    run(&config).unwrap();

    let summary = summarize_file(&config.output_path).unwrap();

    assert_eq!(summary.source_path.as_deref(), Some(config.output_path.as_path()));
    let expected_first_line = format!(
        "Loaded portfolio with 6 rows from: {}",
        config.output_path.display()
    );
    assert_eq!(summary.render().lines().next(), Some(expected_first_line.as_str()));
}
