use httpmock::{Method::GET, MockServer};
use url::Url;

use ccass_rs::{lookup, CcassClient, CcassError};

use crate::common;

fn client_for(server: &MockServer) -> CcassClient {
    CcassClient::builder()
        .base_stock_list(
            Url::parse(&format!("{}/sdw/search/stocklist.aspx", server.base_url())).unwrap(),
        )
        .base_participant_list(
            Url::parse(&format!("{}/sdw/search/partlist.aspx", server.base_url())).unwrap(),
        )
        .build()
        .unwrap()
}

const STOCK_LIST_JSON: &str = r#"[
    {"c":"00001","n":"CKH HOLDINGS"},
    {"c":"00005","n":"HSBC HOLDINGS"},
    {"c":"02800","n":"TRACKER FUND OF HONG KONG"}
]"#;

#[tokio::test]
async fn offline_stock_list_parses_codes_and_names() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/sdw/search/stocklist.aspx")
            .query_param("sortby", "stockcode")
            .query_param("shareholdingdate", "20230110");
        then.status(200)
            .header("content-type", "application/json")
            .body(STOCK_LIST_JSON);
    });

    let client = client_for(&server);
    let entries = lookup::stock_list(&client, common::date("2023-01-10"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].code, 1);
    assert_eq!(entries[0].name, "CKH HOLDINGS");
    assert_eq!(entries[2].code, 2800);
}

#[tokio::test]
async fn offline_list_tickers_yields_the_codes_only() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sdw/search/stocklist.aspx");
        then.status(200).body(STOCK_LIST_JSON);
    });

    let client = client_for(&server);
    let tickers = lookup::list_tickers(&client, common::date("2023-01-10"))
        .await
        .unwrap();
    assert_eq!(tickers, vec![1, 5, 2800]);
}

#[tokio::test]
async fn offline_resolve_name_finds_listed_and_misses_unlisted() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sdw/search/stocklist.aspx");
        then.status(200).body(STOCK_LIST_JSON);
    });

    let client = client_for(&server);
    let day = common::date("2023-01-10");

    let name = lookup::resolve_name(&client, 5, day).await.unwrap();
    assert_eq!(name.as_deref(), Some("HSBC HOLDINGS"));

    let missing = lookup::resolve_name(&client, 700, day).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn offline_participant_directory_keeps_ids_verbatim() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/sdw/search/partlist.aspx")
            .query_param("sortby", "partid")
            .query_param("shareholdingdate", "20230110");
        then.status(200).body(
            r#"[{"c":"A00001","n":"THE HONGKONG AND SHANGHAI BANKING CORPORATION LIMITED"},
                {"c":"B00128","n":"EXAMPLE SECURITIES LIMITED"}]"#,
        );
    });

    let client = client_for(&server);
    let directory = lookup::participant_directory(&client, common::date("2023-01-10"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(directory.len(), 2);
    assert_eq!(directory[0].id, "A00001");
    assert_eq!(directory[1].name, "EXAMPLE SECURITIES LIMITED");
}

#[tokio::test]
async fn offline_non_json_index_is_a_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sdw/search/stocklist.aspx");
        then.status(200).body("<html>maintenance</html>");
    });

    let client = client_for(&server);
    let err = lookup::stock_list(&client, common::date("2023-01-10"))
        .await
        .unwrap_err();
    assert!(matches!(err, CcassError::Parse(_)));
}

#[tokio::test]
async fn offline_non_numeric_stock_code_is_a_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/sdw/search/stocklist.aspx");
        then.status(200).body(r#"[{"c":"GB00005","n":"ODD ENTRY"}]"#);
    });

    let client = client_for(&server);
    let err = lookup::stock_list(&client, common::date("2023-01-10"))
        .await
        .unwrap_err();
    assert!(matches!(err, CcassError::Parse(_)));
}
