//! Institution processor and pipeline driver tests against a mock DBLP.

use chrono::{Datelike, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use adjusted_score::client::DblpClient;
use adjusted_score::config::Config;
use adjusted_score::config::pipeline::CHECKPOINT_NAME;
use adjusted_score::models::{Area, MissedLookups};
use adjusted_score::pipeline::{
    CsvRoster, InstitutionProcessor, JsonFileStore, PipelineDriver, Stage, UniversityFinder,
};

const PUBL_PATH: &str = "/search/publ/api";
const AUTHOR_PATH: &str = "/search/author/api";
const EPS: f64 = 1e-9;

/// Matches publication queries carrying a `year:` filter.
struct YearFilter;

impl Match for YearFilter {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().any(|(k, v)| k == "q" && v.contains(" year:"))
    }
}

fn hit(venue: &str, pages: &str, authors: usize, year: &str) -> serde_json::Value {
    let authors: Vec<_> = (0..authors).map(|i| json!({"text": format!("Author {i}")})).collect();
    json!({"info": {"venue": venue, "pages": pages, "year": year, "authors": {"author": authors}}})
}

fn search_result(total: u64, hits: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"result": {"hits": {"@total": total.to_string(), "hit": hits}}})
}

async fn mount_profiles(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(AUTHOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"hits": {"hit": [{"info": {"url": "https://dblp.org/pid/0"}}]}}
        })))
        .mount(mock_server)
        .await;
}

async fn mount_publications(mock_server: &MockServer, author: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(query_param("q", author))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

// =============================================================================
// Institution Processor
// =============================================================================

#[tokio::test]
async fn test_processor_scores_each_author() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;
    mount_publications(
        &mock_server,
        "Jane Doe",
        search_result(
            3,
            vec![
                hit("SOSP", "1-20", 2, "2019"),
                hit("Local Workshop X", "1-20", 1, "2019"),
                hit("ICSE", "5", 3, "2020"),
            ],
        ),
    )
    .await;
    let body = search_result(1, vec![hit("PLDI", "1-15", 4, "2021")]);
    mount_publications(&mock_server, "John Roe", body).await;

    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let processor = InstitutionProcessor::new(&client, &config);
    let mut missed = MissedLookups::new();

    let result = processor
        .process("Purdue University", &names(&["Jane Doe", "John Roe"]), &mut missed)
        .await
        .unwrap();

    assert!(missed.is_empty());
    assert!((result.total_score - 0.75).abs() < EPS);
    assert!((result.total_score - result.authors_total()).abs() < EPS);

    let jane = &result.authors["Jane Doe"];
    assert_eq!(jane.paper_count, 1);
    assert!((jane.area_scores[&Area::OperatingSystems] - 0.5).abs() < EPS);
    assert_eq!(jane.dblp_link.as_deref(), Some("https://dblp.org/pid/0"));

    let john = &result.authors["John Roe"];
    assert!((john.area_scores[&Area::ProgrammingLanguages] - 0.25).abs() < EPS);
    assert_eq!(result.area_paper_counts[&Area::ProgrammingLanguages], 1);
}

#[tokio::test]
async fn test_processor_partitions_truncated_author_by_year() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    let config = Config::for_testing(&mock_server.uri());
    let years = u64::try_from(Utc::now().year() - 1935 + 1).unwrap();
    assert_eq!(config.year_range().count() as u64, years);

    // Truncated first page: its hits must not be credited.
    let body = search_result(1000, vec![hit("SOSP", "1-20", 1, "2000")]);
    mount_publications(&mock_server, "Jane Doe", body).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(YearFilter)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_result(1, vec![hit("SOSP", "1-20", 2, "2019")])),
        )
        .expect(years)
        .mount(&mock_server)
        .await;

    let client = DblpClient::new(&config).unwrap();
    let processor = InstitutionProcessor::new(&client, &config);
    let mut missed = MissedLookups::new();

    let result =
        processor.process("Purdue University", &names(&["Jane Doe"]), &mut missed).await.unwrap();

    let jane = &result.authors["Jane Doe"];
    assert_eq!(jane.paper_count, years);
    assert!((result.total_score - 0.5 * years as f64).abs() < EPS);
}

#[tokio::test]
async fn test_processor_records_missed_lookup_on_server_error() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(query_param("q", "Jane Doe"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;
    let body = search_result(1, vec![hit("SOSP", "1-20", 1, "2019")]);
    mount_publications(&mock_server, "John Roe", body).await;

    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let processor = InstitutionProcessor::new(&client, &config);
    let mut missed = MissedLookups::new();

    let result = processor
        .process("Purdue University", &names(&["Jane Doe", "John Roe"]), &mut missed)
        .await
        .unwrap();

    assert!(missed.contains("Purdue University", "Jane Doe"));
    assert_eq!(missed.len(), 1);
    assert_eq!(result.authors["Jane Doe"].paper_count, 0);
    assert!((result.total_score - 1.0).abs() < EPS);
}

#[tokio::test]
async fn test_processor_fatal_error_propagates() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let processor = InstitutionProcessor::new(&client, &config);
    let mut missed = MissedLookups::new();

    let result = processor.process("Purdue University", &names(&["Jane Doe"]), &mut missed).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_processor_profile_failure_is_not_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AUTHOR_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let body = search_result(1, vec![hit("SOSP", "1-20", 1, "2019")]);
    mount_publications(&mock_server, "Jane Doe", body).await;

    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let processor = InstitutionProcessor::new(&client, &config);
    let mut missed = MissedLookups::new();

    let result =
        processor.process("Purdue University", &names(&["Jane Doe"]), &mut missed).await.unwrap();

    assert!(result.authors["Jane Doe"].dblp_link.is_none());
    assert_eq!(result.authors["Jane Doe"].paper_count, 1);
}

// =============================================================================
// Pipeline Driver
// =============================================================================

const ROSTER: &str = "\
name,affiliation,homepage,scholarid
Jane Doe,Purdue University,http://a,abc
Jane Doe,Purdue University,http://a,abc
John Roe,Purdue University,http://b,def
Mary Major,Carnegie Mellon University,http://c,ghi
Sam Poe,UNSW,http://d,jkl
Ann Loe,Unheard-of Institute,http://e,mno
";

fn finder() -> UniversityFinder {
    UniversityFinder::from_names(["PURDUE UNIVERSITY", "CARNEGIE MELLON UNIVERSITY", "UNSW SYDNEY"])
}

#[tokio::test]
async fn test_driver_full_run() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_result(1, vec![hit("SOSP", "1-20", 2, "2019")])),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(ROSTER.as_bytes()).unwrap();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let summary = driver.run().await.unwrap();

    assert_eq!(driver.stage(), Stage::Done);
    assert_eq!(summary.institutions, 2);
    assert_eq!(summary.retry_passes, 0);
    assert!(summary.abandoned.is_empty());

    let results = driver.results();
    let keys: Vec<_> = results.keys().cloned().collect();
    assert_eq!(keys, ["Carnegie Mellon University", "Purdue University"]);

    let purdue = &results["Purdue University"];
    assert_eq!(purdue.author_count, Some(2));
    assert!((purdue.total_score - 1.0).abs() < EPS);
    assert_eq!(results["Carnegie Mellon University"].author_count, Some(1));

    assert!(store.path_for(CHECKPOINT_NAME).exists());
    let final_doc: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(store.path_for(&summary.final_document)).unwrap(),
    )
    .unwrap();
    assert_eq!(final_doc["Purdue University"]["author_count"], 2);
    assert_eq!(final_doc["Purdue University"]["area_scores"]["operating_systems"], 1.0);
    assert!(final_doc.get("UNSW").is_none());

    let checkpoint: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(store.path_for(CHECKPOINT_NAME)).unwrap(),
    )
    .unwrap();
    assert!(checkpoint["Purdue University"].get("author_count").is_none());
}

#[tokio::test]
async fn test_driver_deferred_retry_recovers_author() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(query_param("q", "Jane Doe"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_result(1, vec![hit("SOSP", "1-20", 2, "2019")])),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(ROSTER.as_bytes()).unwrap();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.retry_passes, 1);
    assert!(summary.abandoned.is_empty());
    assert!(driver.missed().is_empty());

    let purdue = &driver.results()["Purdue University"];
    assert_eq!(purdue.authors["Jane Doe"].paper_count, 1);
    assert!((purdue.total_score - 1.0).abs() < EPS);
    assert!((purdue.total_score - purdue.authors_total()).abs() < EPS);
}

#[tokio::test]
async fn test_deferred_year_query_is_retried_alone() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    // Truncated single call: never credited, never re-issued.
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(query_param("q", "Jane Doe"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_result(1500, vec![hit("SOSP", "1-20", 1, "2019")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(query_param("q", "Jane Doe year:2000:"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(query_param("q", "Jane Doe year:2019:"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_result(1, vec![hit("SOSP", "1-20", 1, "2019")])),
        )
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .and(YearFilter)
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(0, vec![])))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(
        "name,affiliation,scholarid\nJane Doe,Purdue University,abc\n".as_bytes(),
    )
    .unwrap();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.retry_passes, 1);
    assert!(summary.abandoned.is_empty());

    let purdue = &driver.results()["Purdue University"];
    let jane = &purdue.authors["Jane Doe"];
    assert_eq!(jane.paper_count, 1);
    assert!((purdue.total_score - 1.0).abs() < EPS);
    assert!((purdue.total_score - purdue.authors_total()).abs() < EPS);
}

#[tokio::test]
async fn test_deferred_retry_creates_missing_institution_and_author() {
    let mock_server = MockServer::start().await;
    let body = search_result(1, vec![hit("NSDI", "1-14", 1, "2018")]);
    mount_publications(&mock_server, "Jane Doe", body).await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::default();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    driver.missed_mut().record("Purdue University", "Jane Doe");

    let passes = driver.retry_missed().await;

    assert_eq!(passes, 1);
    let purdue = &driver.results()["Purdue University"];
    let jane = &purdue.authors["Jane Doe"];
    assert_eq!(jane.paper_count, 1);
    assert!(jane.dblp_link.is_none());
    assert!((purdue.area_scores[&Area::ComputerNetworks] - 1.0).abs() < EPS);
    assert!((purdue.total_score - 1.0).abs() < EPS);
}

#[tokio::test]
async fn test_deferred_retry_gives_up_after_pass_cap() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    // One main-pass call plus one per retry pass.
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(17)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(
        "name,affiliation,scholarid\nJane Doe,Purdue University,abc\n".as_bytes(),
    )
    .unwrap();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.retry_passes, 16);
    assert_eq!(summary.abandoned.len(), 1);
    assert_eq!(summary.abandoned[0].author, "Jane Doe");
    assert!(store.path_for(&summary.final_document).exists());
    assert_eq!(driver.results()["Purdue University"].authors["Jane Doe"].paper_count, 0);
}

#[tokio::test]
async fn test_deferred_retry_stops_on_fatal_error() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(
        "name,affiliation,scholarid\nJane Doe,Purdue University,abc\n".as_bytes(),
    )
    .unwrap();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.retry_passes, 1);
    assert_eq!(summary.abandoned.len(), 1);
    assert!(store.path_for(&summary.final_document).exists());
}

#[tokio::test]
async fn test_driver_main_pass_fatal_error_aborts_run() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(PUBL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(&mock_server.uri());
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(ROSTER.as_bytes()).unwrap();
    let finder = finder();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    assert!(driver.run().await.is_err());
    assert_eq!(driver.stage(), Stage::ProcessEachInstitution);
}

#[test]
fn test_enumerate_filters_unrecognized_and_denylisted() {
    let config = Config::for_testing("http://127.0.0.1:1");
    let client = DblpClient::new(&config).unwrap();
    let roster = CsvRoster::from_reader(ROSTER.as_bytes()).unwrap();
    let finder = finder();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let institutions = driver.enumerate_institutions();

    assert_eq!(institutions, ["Carnegie Mellon University", "Purdue University"]);
}
