/*!
 * Client Interceptor Tests
 * Event construction, classification and skip policy on the caller side
 */

use crate::support::{capture_all, capture_context, FakeCall, FakeValue};
use orb_monitor::addressing::encode_ior;
use orb_monitor::events::{Direction, ExceptionKind, InterceptionPoint, MessageKind, Status};
use orb_monitor::interceptor::{CaptureSettings, ClientInterceptor};
use pretty_assertions::assert_eq;
use serde_json::json;

const TRACKER: &str = "IDL:FleetManagement/VehicleTracker:1.0";

fn get_vehicle(id: &[u8]) -> FakeCall {
    FakeCall::new(id, "getVehicle")
        .with_type(TRACKER)
        .with_target("corbaloc:iiop:1.2@fleet-host:9001/VehicleTracker")
        .with_arguments(vec![FakeValue::Text("TRK-001".to_string()), FakeValue::Bool(true)])
}

#[test]
fn test_send_request_builds_request_event() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx.clone());

    client.send_request(&get_vehicle(b"abc").with_context(1, 12));

    let event = sink.last();
    assert_eq!(event.call.request_id, "616263");
    assert_eq!(event.call.operation.as_deref(), Some("getVehicle"));
    assert_eq!(event.call.interface_name.as_deref(), Some("VehicleTracker"));
    assert_eq!(event.call.repository_id.as_deref(), Some(TRACKER));
    assert_eq!(event.call.source_host.as_deref(), Some("10.1.1.1"));
    assert_eq!(event.call.target_host.as_deref(), Some("fleet-host"));
    assert_eq!(event.call.target_port, Some(9001));
    assert_eq!(event.call.interception_point, InterceptionPoint::SendRequest);
    assert_eq!(event.direction, Direction::Request);
    assert_eq!(event.status, Status::Success);
    assert_eq!(event.message_type, MessageKind::Request);
    assert!(event.latency_ms.is_none());
    assert_eq!(ctx.correlator.len(), 1);

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(
        value["request_data"],
        json!({"_idl_type": "getVehicle", "params": {"arg0": "TRK-001", "arg1": true}})
    );
    assert_eq!(value["context_data"]["ctx_1"]["data_length"], 12);
    assert_eq!(value["giop_version"], "1.2");
}

#[test]
fn test_target_from_ior() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);
    let ior = encode_ior(TRACKER, &[("192.168.7.20", 2810)]);

    client.send_request(&FakeCall::new(b"k", "getVehicle").with_type(TRACKER).with_target(&ior));

    let event = sink.last();
    assert_eq!(event.call.target_host.as_deref(), Some("192.168.7.20"));
    assert_eq!(event.call.target_port, Some(2810));
}

#[test]
fn test_reply_consumes_start_and_captures_result() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx.clone());
    let call = get_vehicle(b"req-1").with_result(FakeValue::Struct {
        name: "VehicleInfo".to_string(),
        id: "IDL:FleetManagement/VehicleInfo:1.0".to_string(),
    });

    client.send_request(&call);
    client.receive_reply(&call);

    let reply = sink.last();
    assert_eq!(reply.direction, Direction::Reply);
    assert_eq!(reply.status, Status::Success);
    assert_eq!(reply.message_type, MessageKind::Reply);
    assert!(reply.latency_ms.is_some());
    assert!(ctx.correlator.is_empty());

    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(
        value["response_data"],
        json!({
            "_idl_type": "getVehicle::_return",
            "return_value": {
                "_type": "VehicleInfo",
                "_kind": 15,
                "_id": "IDL:FleetManagement/VehicleInfo:1.0"
            }
        })
    );
}

#[test]
fn test_reply_without_start_has_no_latency() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.receive_reply(&get_vehicle(b"never-sent"));

    assert!(sink.last().latency_ms.is_none());
}

#[test]
fn test_void_result_is_omitted() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.receive_reply(&get_vehicle(b"v").with_result(FakeValue::Void));

    assert!(sink.last().response_data.is_none());
}

#[test]
fn test_transient_exception_is_timeout() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);
    let call = get_vehicle(b"t").with_exception("IDL:omg.org/CORBA/TRANSIENT:1.0");

    client.send_request(&call);
    client.receive_exception(&call);

    let event = sink.last();
    assert_eq!(event.status, Status::Timeout);
    assert_eq!(event.direction, Direction::Reply);
    assert_eq!(event.error_message.as_deref(), Some("CORBA::TRANSIENT"));
    assert_eq!(event.exception_type, Some(ExceptionKind::System));
    assert!(event.latency_ms.is_some());
}

#[test]
fn test_user_exception() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.receive_exception(
        &get_vehicle(b"u").with_exception("IDL:FleetManagement/VehicleNotFound:1.0"),
    );

    let event = sink.last();
    assert_eq!(event.status, Status::Exception);
    assert_eq!(event.exception_type, Some(ExceptionKind::User));
    assert_eq!(event.error_message.as_deref(), Some("CORBA::VehicleNotFound"));

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["exception_type"], "USER_EXCEPTION");
}

#[test]
fn test_unknown_exception_id() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.receive_exception(&get_vehicle(b"x"));

    let event = sink.last();
    assert_eq!(event.status, Status::Exception);
    assert_eq!(event.error_message.as_deref(), Some("CORBA::UNKNOWN"));
}

#[test]
fn test_receive_other_is_locate_reply() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.receive_other(&get_vehicle(b"fwd"));

    let event = sink.last();
    assert_eq!(event.message_type, MessageKind::LocateReply);
    assert_eq!(event.direction, Direction::Reply);
    assert_eq!(event.status, Status::Success);
    assert!(event.latency_ms.is_none());
}

#[test]
fn test_skipped_operation_touches_nothing() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx.clone());
    let call = FakeCall::new(b"ns", "resolve").with_type(TRACKER);

    client.send_request(&call);
    assert!(ctx.correlator.is_empty());
    ctx.correlator.record_start("6e73", std::time::Instant::now());

    client.receive_reply(&call);
    client.receive_exception(&call);
    client.receive_other(&call);

    assert_eq!(sink.len(), 0);
    // The pre-existing entry was not read
    assert_eq!(ctx.correlator.len(), 1);
}

#[test]
fn test_skipped_interface_touches_nothing() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx.clone());
    let call = FakeCall::new(b"ns", "get_status").with_type("IDL:omg.org/CosNaming/NamingContextExt:1.0");

    client.send_request(&call);
    client.receive_reply(&call);

    assert_eq!(sink.len(), 0);
    assert!(ctx.correlator.is_empty());
}

#[test]
fn test_empty_request_id_is_uncorrelated() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx.clone());
    let call = get_vehicle(b"");

    client.send_request(&call);
    client.receive_reply(&call);

    assert!(ctx.correlator.is_empty());
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].call.request_id.len(), 36);
    assert!(events[1].latency_ms.is_none());
}

#[test]
fn test_capture_disabled() {
    let (ctx, sink) = capture_context(CaptureSettings {
        request_data: false,
        response_data: false,
        max_payload_bytes: 65_536,
    });
    let client = ClientInterceptor::new(ctx);
    let call = get_vehicle(b"c").with_result(FakeValue::Long(4));

    client.send_request(&call);
    client.receive_reply(&call);

    for event in sink.events() {
        assert!(event.request_data.is_none());
        assert!(event.response_data.is_none());
    }
}

#[test]
fn test_unavailable_arguments_become_note() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.send_request(&FakeCall::new(b"n", "getVehicle").with_type(TRACKER));

    let value = serde_json::to_value(sink.last()).unwrap();
    assert_eq!(
        value["request_data"]["_note"],
        "Arguments not available at this interception point"
    );
}

#[test]
fn test_broken_argument_becomes_placeholder() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);

    client.send_request(
        &FakeCall::new(b"b", "getVehicle")
            .with_type(TRACKER)
            .with_arguments(vec![FakeValue::Long(7), FakeValue::Broken]),
    );

    let value = serde_json::to_value(sink.last()).unwrap();
    assert_eq!(value["request_data"]["params"]["arg0"], 7);
    assert_eq!(value["request_data"]["params"]["arg1"], "<RuntimeError>");
}

#[test]
fn test_oversized_payload_replaced_by_note() {
    let (ctx, sink) = capture_context(CaptureSettings {
        request_data: true,
        response_data: true,
        max_payload_bytes: 16,
    });
    let client = ClientInterceptor::new(ctx);

    client.send_request(&get_vehicle(b"big"));

    let note = sink.last().request_data.unwrap().note.unwrap();
    assert!(note.contains("exceeds limit of 16 bytes"), "{note}");
}

#[test]
fn test_runtime_panic_is_contained() {
    let (ctx, sink) = capture_context(capture_all());
    let client = ClientInterceptor::new(ctx);
    let call = get_vehicle(b"p").exploding();

    client.send_request(&call);
    client.receive_reply(&call);

    assert_eq!(sink.len(), 0);
}
