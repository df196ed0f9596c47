//! Verify request building and response parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector describes inputs, the expected request, a simulated response,
//! and the expected result or error. Bodies are compared as parsed JSON so
//! field ordering does not matter.

mod common;

use common::{client, ReplayTransport, BASE_URL};
use serde_json::Value;
use smsguard_core::{
    CheckRequest, CheckResponse, Error, GeoAction, GeoRule, HttpMethod, HttpRequest, HttpResponse,
    TransportError,
};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

fn replay(case: &Value) -> ReplayTransport {
    let sim = &case["simulated_response"];
    ReplayTransport::new(Ok(HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }))
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn assert_api_error(name: &str, err: smsguard_core::Error, expected: &Value) {
    let api = err.as_api().unwrap_or_else(|| panic!("{name}: expected API error"));
    assert_eq!(api.code(), expected["code"].as_str().unwrap(), "{name}: code");
    assert_eq!(u64::from(api.status()), expected["status"].as_u64().unwrap(), "{name}: status");
    if let Some(message) = expected.get("message") {
        assert_eq!(api.message(), message.as_str().unwrap(), "{name}: message");
    }
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

#[test]
fn check_test_vectors() {
    let raw = include_str!("../../test-vectors/check.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: CheckRequest = serde_json::from_value(case["input"].clone()).unwrap();

        let transport = replay(case);
        let result = client(&transport).check(&input);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{name}: request count");
        assert_request(name, &requests[0], &case["expected_request"]);

        if let Some(expected_error) = case.get("expected_error") {
            assert_api_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: CheckResponse =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Report & override
// ---------------------------------------------------------------------------

#[test]
fn report_test_vectors() {
    let raw = include_str!("../../test-vectors/report.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let transport = replay(case);
        let result = client(&transport).report(
            input["check_id"].as_str().unwrap(),
            input["sms_sent"].as_bool().unwrap(),
            input["code_verified"].as_bool().unwrap(),
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{name}: request count");
        assert_request(name, &requests[0], &case["expected_request"]);

        match case.get("expected_error") {
            Some(expected_error) => assert_api_error(name, result.unwrap_err(), expected_error),
            None => result.unwrap(),
        }
    }
}

#[test]
fn override_test_vectors() {
    let raw = include_str!("../../test-vectors/override.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let transport = replay(case);
        let result = client(&transport).override_decision(
            input["check_id"].as_str().unwrap(),
            input["action"].as_str().unwrap(),
        );

        if case["expected_validation_error"].as_bool().unwrap_or(false) {
            assert!(matches!(result, Err(Error::Validation(_))), "{name}: validation error");
            assert!(transport.requests().is_empty(), "{name}: nothing sent");
            continue;
        }

        result.unwrap();
        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{name}: request count");
        assert_request(name, &requests[0], &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Geo rules
// ---------------------------------------------------------------------------

#[test]
fn get_geo_rules_test_vectors() {
    let raw = include_str!("../../test-vectors/geo_rules.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["get"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = replay(case);
        let rules = client(&transport).get_geo_rules().unwrap();

        assert_request(name, &transport.requests()[0], &case["expected_request"]);
        let expected: Vec<GeoRule> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(rules, expected, "{name}: parsed result");
    }
}

#[test]
fn unrecognised_geo_action_parses_as_other() {
    let raw = include_str!("../../test-vectors/geo_rules.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let case = vectors["get"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "unrecognised action kept verbatim")
        .unwrap();

    let transport = replay(case);
    let rules = client(&transport).get_geo_rules().unwrap();
    assert_eq!(rules, vec![GeoRule::new("BR", GeoAction::Other("review".to_string()))]);
}

#[test]
fn update_geo_rules_test_vectors() {
    let raw = include_str!("../../test-vectors/geo_rules.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["update"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: Vec<GeoRule> = serde_json::from_value(case["input"].clone()).unwrap();
        let transport = replay(case);
        client(&transport).update_geo_rules(&input).unwrap();

        assert_request(name, &transport.requests()[0], &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors_apply_to_every_operation() {
    let raw = include_str!("../../test-vectors/errors.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_error"];
        let transport = replay(case);
        let c = client(&transport);

        let check = CheckRequest::new("+15551234567", "203.0.113.42");
        assert_api_error(name, c.check(&check).unwrap_err(), expected);
        assert_api_error(name, c.report("chk_1", true, true).unwrap_err(), expected);
        assert_api_error(name, c.override_decision("chk_1", "allow").unwrap_err(), expected);
        assert_api_error(name, c.get_geo_rules().unwrap_err(), expected);
        assert_api_error(name, c.update_geo_rules(&[]).unwrap_err(), expected);
        assert_eq!(transport.requests().len(), 5, "{name}: request count");
    }
}

#[test]
fn timeout_applies_to_every_operation() {
    let transport = ReplayTransport::new(Err(TransportError::Timeout));
    let c = client(&transport);

    let results = [
        c.check(&CheckRequest::new("+15551234567", "203.0.113.42")).map(|_| ()),
        c.report("chk_1", false, false),
        c.override_decision("chk_1", "deny"),
        c.get_geo_rules().map(|_| ()),
        c.update_geo_rules(&[]),
    ];
    for result in results {
        let err = result.unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!((api.code(), api.status()), ("timeout", 408));
    }
}
