//! The JSON-RPC 2.0 protocol examples, played between a client call and an
//! in-memory receiver.

use serde_json::{Value, json};
use turul_json_rpc_call::prelude::*;
use turul_json_rpc_call_integration_tests::{Reply, exchange, init_logging, serve, subtract};

/// Client builds from `request`, the receiver answers, the client assigns.
/// Checks every hop against the expected wire text.
fn compare_example(request: &str, expected_response: &str) -> (RpcCall, RpcCall) {
    init_logging();
    let mut client = RpcCall::from_request(request).expect("client call");

    let sent = client.request_bytes(Encoding::Utf8).unwrap();
    assert_eq!(sent, request.as_bytes());

    let server = RpcCall::from_request(&sent).unwrap();
    assert_eq!(server, client);

    let (response, assigned) = exchange(&mut client, subtract).expect("a response");
    assert_eq!(response, expected_response);
    assert_eq!(
        serde_json::from_str::<Value>(&response).unwrap(),
        serde_json::from_str::<Value>(expected_response).unwrap()
    );

    let mut answered = server;
    let expected: Value = serde_json::from_str(expected_response).unwrap();
    if let Some(error) = expected.get("error") {
        let err = assigned.expect_err("error responses surface to the caller");
        assert_eq!(err.rpc_error().map(RpcError::values), Some(error.clone()));
        answered
            .set_error(error["code"].as_i64().unwrap(), None, None)
            .unwrap();
        assert_eq!(client.error().unwrap().map(RpcError::values), Some(error.clone()));
    } else {
        assigned.unwrap();
        answered.set_result(expected["result"].clone()).unwrap();
        assert_eq!(client.result().unwrap(), &expected["result"]);
    }
    assert_eq!(client, answered);
    assert_eq!(client.response().unwrap(), expected_response);

    (client, answered)
}

#[test]
fn test_positional_params() {
    compare_example(
        r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}"#,
        r#"{"jsonrpc":"2.0","result":19,"id":1}"#,
    );
    compare_example(
        r#"{"jsonrpc":"2.0","method":"subtract","params":[23,42],"id":2}"#,
        r#"{"jsonrpc":"2.0","result":-19,"id":2}"#,
    );
}

#[test]
fn test_named_params() {
    compare_example(
        r#"{"jsonrpc":"2.0","method":"subtract","params":{"subtrahend":23,"minuend":42},"id":3}"#,
        r#"{"jsonrpc":"2.0","result":19,"id":3}"#,
    );
    compare_example(
        r#"{"jsonrpc":"2.0","method":"subtract","params":{"minuend":42,"subtrahend":23},"id":4}"#,
        r#"{"jsonrpc":"2.0","result":19,"id":4}"#,
    );
}

#[test]
fn test_method_not_found() {
    let (client, _) = compare_example(
        r#"{"jsonrpc":"2.0","method":"foobar","id":"1"}"#,
        r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":"1"}"#,
    );
    let error = client.error().unwrap().unwrap();
    assert_eq!(error.kind(), JsonRpcErrorCode::MethodNotFound);
    assert_eq!(error.id(), Some(&RequestId::String("1".into())));
}

#[test]
fn test_notifications_get_no_response() {
    for request in [
        r#"{"jsonrpc":"2.0","method":"update","params":[1,2,3,4,5]}"#,
        r#"{"jsonrpc":"2.0","method":"foobar"}"#,
    ] {
        let mut notification = RpcCall::from_request(request).unwrap();
        assert!(notification.is_notification());
        assert_eq!(notification.identifier(), &Identifier::Notification);
        assert_eq!(notification.request().unwrap(), request);

        assert_eq!(
            notification.set_result(json!("69")).unwrap_err().to_string(),
            "cannot set result on a notification"
        );
        assert_eq!(
            notification.set_error(1, None, None).unwrap_err().to_string(),
            "cannot set error on a notification"
        );
        assert!(serve(request.as_bytes(), subtract).is_none());
    }

    let built = RpcCall::builder("update")
        .positional([1, 2, 3, 4, 5])
        .notification()
        .build()
        .unwrap();
    assert_eq!(
        built.request().unwrap(),
        r#"{"jsonrpc":"2.0","method":"update","params":[1,2,3,4,5]}"#
    );
}

#[test]
fn test_invalid_json() {
    let request = r#"{"jsonrpc": "2.0", "method": "foobar, "params": "bar", "baz]"#;
    let expected = r#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Parse error"},"id":null}"#;

    let err = RpcCall::from_request(request).unwrap_err();
    let error = err.rpc_error().expect("a protocol error");
    assert_eq!(error.response().unwrap(), expected);
    assert_eq!(error.response_bytes(Encoding::Utf8).unwrap(), expected.as_bytes());

    let response = serve(request.as_bytes(), subtract).unwrap();
    assert_eq!(response, expected.as_bytes());
}

#[test]
fn test_invalid_request_object() {
    let request = r#"{"jsonrpc": "2.0", "method": 1, "params": "bar"}"#;
    let expected =
        r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid Request"},"id":null}"#;

    let err = RpcCall::from_request(request).unwrap_err();
    assert_eq!(err.rpc_error().unwrap().response().unwrap(), expected);
    assert_eq!(serve(request.as_bytes(), subtract).unwrap(), expected.as_bytes());
}

#[test]
fn test_invalid_params_keep_the_id() {
    let request = r#"{"jsonrpc":"2.0","method":"subtract","params":[[42],23],"id":8}"#;
    assert_eq!(
        serve(request.as_bytes(), subtract).unwrap(),
        br#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid params"},"id":8}"#
    );
}

#[test]
fn test_batches_are_not_supported() {
    for request in [
        r#"[{"jsonrpc":"2.0","method":"sum","params":[1,2,4],"id":"1"}]"#,
        "[]",
        "[1,2,3]",
    ] {
        assert!(matches!(
            RpcCall::from_request(request),
            Err(CallError::BatchUnsupported)
        ));
        assert!(serve(request.as_bytes(), subtract).is_none());
    }
}

#[test]
fn test_generated_ids_correlate() {
    init_logging();
    let mut client = RpcCall::builder("subtract")
        .named([("minuend", 42), ("subtrahend", 23)])
        .build()
        .unwrap();
    let Identifier::AutoGenerated(token) = client.identifier().clone() else {
        panic!("expected a generated id");
    };

    let (response, assigned) = exchange(&mut client, subtract).unwrap();
    assigned.unwrap();
    assert_eq!(response, format!(r#"{{"jsonrpc":"2.0","result":19,"id":"{}"}}"#, token));
    assert_eq!(client.result().unwrap(), &json!(19));
}

#[test]
fn test_application_error_round_trip() {
    let mut client = RpcCall::builder("transfer").id(11).positional(["alice", "bob"]).build().unwrap();
    let (response, assigned) = exchange(&mut client, |_| Reply::Error(7, Some("Insufficient funds")))
        .unwrap();

    assert_eq!(
        response,
        r#"{"jsonrpc":"2.0","error":{"code":7,"message":"Insufficient funds"},"id":11}"#
    );
    let err = assigned.unwrap_err();
    assert_eq!(err.to_string(), "Insufficient funds [code 7]");
    assert_eq!(client.response().unwrap(), response);
}

#[test]
fn test_response_is_stable_across_calls() {
    let mut server =
        RpcCall::from_request(r#"{"jsonrpc":"2.0","method":"echo","params":["naïve"],"id":"é"}"#)
            .unwrap();
    server.set_result(json!({"text": "naïve", "n": 1.5})).unwrap();

    let first = server.response().unwrap();
    assert_eq!(first, r#"{"jsonrpc":"2.0","result":{"text":"naïve","n":1.5},"id":"é"}"#);
    for _ in 0..3 {
        assert_eq!(server.response().unwrap(), first);
    }
}

#[test]
fn test_ids_are_echoed_exactly() {
    for (request, expected) in [
        (
            r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":10000000000000000000}"#,
            r#"{"jsonrpc":"2.0","result":19,"id":10000000000000000000}"#,
        ),
        (
            r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":4.0}"#,
            r#"{"jsonrpc":"2.0","result":19,"id":4.0}"#,
        ),
        (
            r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":2.3}"#,
            r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid Request"},"id":2.3}"#,
        ),
    ] {
        assert_eq!(serve(request.as_bytes(), subtract).unwrap(), expected.as_bytes());
    }
}
