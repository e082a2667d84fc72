//! End-to-end dispatch scenarios over the in-memory transport.

use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use serde_json::json;

use commander::backend::SimBackend;
use commander::bus::{Envelope, local};
use commander::dispatch::DispatchWorker;

struct Bench {
    inbound: Sender<Envelope>,
    outbound: Receiver<Envelope>,
    worker: DispatchWorker<local::LocalConsumer, local::LocalProducer>,
}

fn bench() -> Bench {
    let (inbound, consumer) = local::inbox();
    let (producer, outbound) = local::outbox();
    let backend = SimBackend::with_nodes([("ns=2;s=Temp".to_string(), json!(21.5))]);
    let worker = DispatchWorker::new(
        consumer,
        producer,
        Box::new(backend),
        "Devices/Plant1/#".to_string(),
        "Devices/Plant1/Response".to_string(),
        Duration::ZERO,
    );
    Bench {
        inbound,
        outbound,
        worker,
    }
}

impl Bench {
    fn roundtrip(&mut self, topic: &str, payload: &str) -> Envelope {
        self.inbound
            .send(Envelope::new(topic, payload))
            .expect("inbound send");
        self.worker.step();
        self.outbound.recv().expect("response published")
    }
}

#[test]
fn command_request_publishes_success_marker() {
    let mut bench = bench();
    let response = bench.roundtrip(
        "Devices/Plant1/Command?42",
        r#"{"node":"ns=2;s=Temp","value":21}"#,
    );

    assert_eq!(response.topic, "Devices/Plant1/Response");
    assert_eq!(response.payload, "\"Success\"");
    assert_eq!(response.content_type(), Some(&b"application/json"[..]));
}

#[test]
fn read_request_publishes_current_value() {
    let mut bench = bench();
    let response = bench.roundtrip("Devices/Plant1/Read?7", r#"{"node":"ns=2;s=Temp"}"#);

    assert_eq!(response.topic, "Devices/Plant1/Response");
    assert_eq!(
        serde_json::from_str::<String>(&response.payload).unwrap(),
        "21.5"
    );
}

#[test]
fn write_is_visible_to_a_later_read() {
    let mut bench = bench();

    let written = bench.roundtrip(
        "Devices/Plant1/Write?1",
        r#"{"node":"ns=2;s=Setpoint","value":72}"#,
    );
    assert_eq!(written.payload, "\"Success\"");

    let read = bench.roundtrip("Devices/Plant1/Read?2", r#"{"node":"ns=2;s=Setpoint"}"#);
    assert_eq!(serde_json::from_str::<String>(&read.payload).unwrap(), "72");
}

#[test]
fn unroutable_topic_publishes_empty_string() {
    let mut bench = bench();
    let response = bench.roundtrip("Devices/Plant1/Unsubscribe?1", "{}");

    assert_eq!(response.topic, "Devices/Plant1/Response");
    assert_eq!(serde_json::from_str::<String>(&response.payload).unwrap(), "");
}

#[test]
fn failed_request_answers_with_error_text_then_recovers() {
    let mut bench = bench();

    let failed = bench.roundtrip("Devices/Plant1/Read?1", r#"{"node":"ns=9;s=Missing"}"#);
    assert_eq!(
        serde_json::from_str::<String>(&failed.payload).unwrap(),
        "Not found: ns=9;s=Missing"
    );

    let recovered = bench.roundtrip("Devices/Plant1/Read?2", r#"{"node":"ns=2;s=Temp"}"#);
    assert_eq!(
        serde_json::from_str::<String>(&recovered.payload).unwrap(),
        "21.5"
    );
}

#[test]
fn malformed_payload_answers_with_error_text() {
    let mut bench = bench();
    let response = bench.roundtrip("Devices/Plant1/Write?9", "not json");

    let text = serde_json::from_str::<String>(&response.payload).unwrap();
    assert!(text.starts_with("JSON error:"), "unexpected payload: {}", text);
}
