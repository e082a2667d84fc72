//! Kafka bus endpoints
//!
//! Wraps the librdkafka consumer/producer pair behind the transport traits.
//! Receive blocks until a message is delivered; send is acknowledged by
//! flushing the producer queue before returning.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::message::{Header, Headers, Message, OwnedHeaders};
use rdkafka::producer::{BaseProducer, BaseRecord, Producer};

use crate::config::BusConfig;
use crate::types::{Error, Result};

use super::{BusConsumer, BusProducer, Envelope};

/// Poll slice used to implement the blocking receive
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound on waiting for the broker to acknowledge a send
const ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect both bus endpoints and subscribe to the request topic.
pub fn connect(config: &BusConfig) -> Result<(KafkaConsumer, KafkaProducer)> {
    let consumer = KafkaConsumer::connect(config)?;
    let producer = KafkaProducer::connect(config)?;
    tracing::info!("Connected to bus at {}", config.brokers);
    Ok((consumer, producer))
}

fn base_config(config: &BusConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client.set("bootstrap.servers", &config.brokers);
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client
            .set("security.protocol", "sasl_ssl")
            .set("sasl.mechanism", "PLAIN")
            .set("sasl.username", username)
            .set("sasl.password", password);
    }
    client
}

/// Receiving endpoint of the bus subscription.
pub struct KafkaConsumer {
    inner: BaseConsumer,
}

impl KafkaConsumer {
    fn connect(config: &BusConfig) -> Result<Self> {
        let inner: BaseConsumer = base_config(config)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "earliest")
            .create()?;
        inner.subscribe(&[config.request_topic.as_str()])?;
        tracing::debug!("Subscribed to request topic {}", config.request_topic);
        Ok(Self { inner })
    }
}

impl BusConsumer for KafkaConsumer {
    fn recv(&mut self) -> Result<Envelope> {
        // No overall timeout: an absent message means we keep waiting.
        loop {
            match self.inner.poll(POLL_INTERVAL) {
                None => continue,
                Some(Err(e)) => return Err(Error::Kafka(e)),
                Some(Ok(message)) => {
                    let payload = message
                        .payload()
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                        .unwrap_or_default();
                    let mut headers = Vec::new();
                    if let Some(borrowed) = message.headers() {
                        for header in borrowed.iter() {
                            headers.push((
                                header.key.to_string(),
                                header.value.map(|v| v.to_vec()).unwrap_or_default(),
                            ));
                        }
                    }
                    return Ok(Envelope {
                        topic: message.topic().to_string(),
                        payload,
                        headers,
                    });
                }
            }
        }
    }
}

/// Sending endpoint of the bus connection.
pub struct KafkaProducer {
    inner: BaseProducer,
}

impl KafkaProducer {
    fn connect(config: &BusConfig) -> Result<Self> {
        let inner: BaseProducer = base_config(config)
            .set("request.timeout.ms", "20000")
            .set("message.timeout.ms", "10000")
            .create()?;
        Ok(Self { inner })
    }
}

impl BusProducer for KafkaProducer {
    fn send(&mut self, envelope: Envelope) -> Result<()> {
        let mut headers = OwnedHeaders::new();
        for (key, value) in &envelope.headers {
            headers = headers.insert(Header {
                key: key.as_str(),
                value: Some(value.as_slice()),
            });
        }

        let record = BaseRecord::<(), str>::to(&envelope.topic)
            .payload(envelope.payload.as_str())
            .headers(headers);
        self.inner.send(record).map_err(|(e, _)| Error::Kafka(e))?;

        // Block until the broker acknowledges delivery.
        self.inner.flush(ACK_TIMEOUT)?;
        Ok(())
    }
}
