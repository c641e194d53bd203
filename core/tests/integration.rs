//! Full CRUD lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the `Executor` over
//! real HTTP with `UreqTransport`. Validates that parameter resolution,
//! request building, dispatch and result mapping work end-to-end.

use std::net::SocketAddr;

use ondo_core::{
    ApiError, Credentials, ExecutionError, Executor, JsonParameters, OndoClient, ResultRecord,
    StaticCredentials, Transport, UreqTransport,
};
use serde_json::{json, Map, Value};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn credentials(addr: SocketAddr) -> StaticCredentials {
    StaticCredentials(Credentials::new("integration-key").with_base_url(format!("http://{addr}")))
}

fn params(value: Value) -> JsonParameters {
    JsonParameters::try_from(value).unwrap()
}

fn run_one(
    addr: SocketAddr,
    value: Value,
    continue_on_fail: bool,
) -> Result<ResultRecord, ExecutionError> {
    let parameters = params(value);
    let store = credentials(addr);
    let mut records = Executor::new(&parameters, &store, UreqTransport::new())
        .continue_on_fail(continue_on_fail)
        .run(1)?;
    assert_eq!(records.len(), 1);
    Ok(records.remove(0))
}

#[test]
fn fund_management_lifecycle() {
    let addr = start_server();
    let base = json!({"resource": "ousgFundManagement"});
    let with = |extra: Value| {
        let mut merged = base.clone();
        for (key, value) in extra.as_object().unwrap() {
            merged[key] = value.clone();
        }
        merged
    };

    // Step 1: list: empty.
    let listed = run_one(addr, with(json!({"operation": "getAll"})), false).unwrap();
    assert_eq!(listed.json, json!([]));

    // Step 2: create with defaults for the optional fields.
    let created = run_one(
        addr,
        with(json!({"operation": "create", "fundName": "Short-Term Treasuries"})),
        false,
    )
    .unwrap();
    assert_eq!(created.json["fundName"], "Short-Term Treasuries");
    assert_eq!(created.json["managementStrategy"], "active");
    assert_eq!(created.json["riskProfile"], "moderate");
    assert_eq!(created.json["targetAllocation"], 100.0);
    let id = created.json["id"].as_str().unwrap().to_string();

    // Step 3: get the created record.
    let fetched = run_one(addr, with(json!({"operation": "get", "id": id})), false).unwrap();
    assert_eq!(fetched.json, created.json);

    // Step 4: partial update, untouched fields survive.
    let updated = run_one(
        addr,
        with(json!({"operation": "update", "id": id, "riskProfile": "conservative", "managementStrategy": ""})),
        false,
    )
    .unwrap();
    assert_eq!(updated.json["riskProfile"], "conservative");
    assert_eq!(updated.json["managementStrategy"], "active");

    // Step 5: list has one record.
    let listed = run_one(addr, with(json!({"operation": "getAll"})), false).unwrap();
    assert_eq!(listed.json.as_array().unwrap().len(), 1);

    // Step 6: delete.
    let deleted = run_one(addr, with(json!({"operation": "delete", "id": id})), false).unwrap();
    assert_eq!(deleted.json["deleted"], true);

    // Step 7: get after delete, strict: the run fails with NotFound.
    let err = run_one(addr, with(json!({"operation": "get", "id": id})), false).unwrap_err();
    assert_eq!(err.item(), Some(0));
    assert_eq!(err.api_error(), &ApiError::NotFound);

    // Step 8: same call, tolerant: one error record.
    let record = run_one(addr, with(json!({"operation": "get", "id": id})), true).unwrap();
    assert_eq!(record, ResultRecord::error(0, "Not Found"));
}

#[test]
fn lending_batch_with_per_item_parameters() {
    let addr = start_server();
    let mut first = Map::new();
    first.insert("asset".to_string(), json!("USDC"));
    first.insert("amount".to_string(), json!("100"));
    let mut second = Map::new();
    second.insert("asset".to_string(), json!("fUSDC"));
    second.insert("amount".to_string(), json!("250"));
    second.insert("interestRate".to_string(), json!("4.5"));
    second.insert("duration".to_string(), json!(30));

    let parameters = params(json!({
        "resource": "fluxFinanceLending",
        "operation": "create",
        "interestRate": "",
        "duration": 0,
    }))
    .with_item(first)
    .with_item(second);
    let store = credentials(addr);
    let records = Executor::new(&parameters, &store, UreqTransport::new())
        .run(2)
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].paired_item.item, 0);
    assert_eq!(records[1].paired_item.item, 1);
    assert!(records[0].json.get("interestRate").is_none());
    assert!(records[0].json.get("duration").is_none());
    assert_eq!(records[1].json["interestRate"], "4.5");
    assert_eq!(records[1].json["duration"], 30);
}

#[test]
fn tolerant_batch_keeps_going_past_a_missing_record() {
    let addr = start_server();
    let created = run_one(
        addr,
        json!({
            "resource": "redemptionsAndSubscriptions",
            "operation": "create",
            "fundId": "ousg",
            "amount": "5000",
            "investorAddress": "0xINV",
        }),
        false,
    )
    .unwrap();
    assert_eq!(created.json["type"], "subscription");
    assert_eq!(created.json["status"], "pending");
    let id = created.json["id"].as_str().unwrap().to_string();

    let mut missing = Map::new();
    missing.insert("id".to_string(), json!("does-not-exist"));
    let mut present = Map::new();
    present.insert("id".to_string(), json!(id));
    let parameters = params(json!({"resource": "redemptionsAndSubscriptions", "operation": "get"}))
        .with_item(missing)
        .with_item(present);
    let store = credentials(addr);
    let records = Executor::new(&parameters, &store, UreqTransport::new())
        .continue_on_fail(true)
        .run(2)
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[0].is_error());
    assert_eq!(records[1].json["fundId"], "ousg");
}

#[test]
fn health_check_succeeds_with_credentials() {
    let addr = start_server();
    let client = OndoClient::new(Credentials::new("k").with_base_url(format!("http://{addr}")));
    let response = UreqTransport::new()
        .send(&client.build_health_check())
        .unwrap();
    assert_eq!(client.parse(response).unwrap()["status"], "ok");
}

#[test]
fn unreachable_api_is_a_transport_failure() {
    let parameters = params(json!({"resource": "ondoGlobalMarkets", "operation": "get", "id": "m1"}));
    let store = StaticCredentials(Credentials::new("k").with_base_url("http://127.0.0.1:1"));
    let err = Executor::new(&parameters, &store, UreqTransport::new())
        .run(1)
        .unwrap_err();
    assert!(matches!(err.api_error(), ApiError::Transport(_)));
}
