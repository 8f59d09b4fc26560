//! Keypoint subscription and result publication.
//!
//! The loop only sees the [`FrameAcquirer`] and [`Publisher`] traits. The UDP
//! implementations carry one JSON envelope per datagram:
//! `{"topic": "...", "payload": ...}`.

use crate::{
    constants::MAX_DATAGRAM_SIZE,
    types::{InputFrame, OutputRecord},
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::Duration;

/// Source of raw keypoint frames
pub trait FrameAcquirer {
    /// Next frame, or `None` if nothing arrived within roughly one tick
    ///
    /// # Errors
    ///
    /// Returns `Transport` on socket or decoding failures
    fn receive(&mut self) -> Result<Option<InputFrame>>;

    /// Release the underlying resources. Later calls to `receive` yield `None`.
    fn release(&mut self);
}

/// Sink for output records
pub trait Publisher {
    /// # Errors
    ///
    /// Returns `Transport` if the record could not be sent
    fn publish(&mut self, host: &str, port: u16, topic: &str, record: &OutputRecord) -> Result<()>;
}

/// Topic-tagged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub topic: String,
    pub payload: T,
}

/// Listens for `InputFrame` envelopes addressed to one topic
pub struct UdpKeypointSubscriber {
    socket: Option<UdpSocket>,
    topic: String,
    buffer: Vec<u8>,
}

impl UdpKeypointSubscriber {
    /// Bind `host:port`; `receive` waits at most `read_timeout`
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the socket cannot be bound or configured
    pub fn bind(host: &str, port: u16, topic: &str, read_timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind((host, port))
            .map_err(|e| Error::Transport(format!("Failed to bind {host}:{port}: {e}")))?;
        socket
            .set_read_timeout(Some(read_timeout.max(Duration::from_millis(1))))
            .map_err(|e| Error::Transport(format!("Failed to set read timeout: {e}")))?;

        info!("Subscribed to topic '{}' on {}:{}", topic, host, port);

        Ok(Self {
            socket: Some(socket),
            topic: topic.to_string(),
            buffer: vec![0; MAX_DATAGRAM_SIZE],
        })
    }

    /// Address the socket is bound to, if still held
    #[must_use]
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

impl FrameAcquirer for UdpKeypointSubscriber {
    fn receive(&mut self) -> Result<Option<InputFrame>> {
        let Some(socket) = &self.socket else {
            return Ok(None);
        };

        let len = match socket.recv(&mut self.buffer) {
            Ok(len) => len,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => return Ok(None),
            Err(e) => return Err(Error::Transport(format!("Failed to receive keypoints: {e}"))),
        };

        let envelope: Envelope<InputFrame> = serde_json::from_slice(&self.buffer[..len])
            .map_err(|e| Error::Transport(format!("Undecodable keypoint message: {e}")))?;

        if envelope.topic != self.topic {
            debug!("Ignoring message on topic '{}'", envelope.topic);
            return Ok(None);
        }

        Ok(Some(envelope.payload))
    }

    fn release(&mut self) {
        if self.socket.take().is_some() {
            info!("Keypoint subscriber for '{}' released", self.topic);
        }
    }
}

/// Sends each record as one JSON datagram
pub struct UdpPublisher {
    socket: UdpSocket,
}

impl UdpPublisher {
    /// # Errors
    ///
    /// Returns `Transport` if no local socket can be bound
    pub fn new() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| Error::Transport(format!("Failed to bind publisher socket: {e}")))?;
        Ok(Self { socket })
    }
}

impl Publisher for UdpPublisher {
    fn publish(&mut self, host: &str, port: u16, topic: &str, record: &OutputRecord) -> Result<()> {
        let envelope = Envelope {
            topic: topic.to_string(),
            payload: record,
        };
        let data = serde_json::to_vec(&envelope)?;
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(Error::Transport(format!(
                "Record of {} bytes does not fit in one datagram",
                data.len()
            )));
        }

        self.socket
            .send_to(&data, (host, port))
            .map_err(|e| Error::Transport(format!("Failed to publish to {host}:{port}/{topic}: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Basis, CoordinateFrame, HandSide, KeypointSet};
    use nalgebra::Vector3;

    fn record() -> OutputRecord {
        OutputRecord {
            timestamp_s: 1.0,
            hand_side: HandSide::Right,
            keypoints: KeypointSet::from_rows(&[[0.0, 1.0, 2.0]]),
            is_relative: true,
            frame_vectors: CoordinateFrame::new(Vector3::zeros(), Basis::identity()),
        }
    }

    #[test]
    fn test_subscriber_times_out_with_none() {
        let mut subscriber =
            UdpKeypointSubscriber::bind("127.0.0.1", 0, "right", Duration::from_millis(5)).unwrap();
        assert!(subscriber.receive().unwrap().is_none());
    }

    #[test]
    fn test_subscriber_filters_by_topic() {
        let mut subscriber =
            UdpKeypointSubscriber::bind("127.0.0.1", 0, "right", Duration::from_millis(500)).unwrap();
        let addr = subscriber.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        let other = Envelope {
            topic: "left".to_string(),
            payload: InputFrame::from_rows(vec![[0.0; 3]], false),
        };
        sender.send_to(&serde_json::to_vec(&other).unwrap(), addr).unwrap();
        assert!(subscriber.receive().unwrap().is_none());

        let mine = Envelope {
            topic: "right".to_string(),
            payload: InputFrame::from_rows(vec![[1.0, 2.0, 3.0]], true),
        };
        sender.send_to(&serde_json::to_vec(&mine).unwrap(), addr).unwrap();
        let frame = subscriber.receive().unwrap().unwrap();
        assert!(frame.is_relative);
    }

    #[test]
    fn test_garbage_is_a_transport_error() {
        let mut subscriber =
            UdpKeypointSubscriber::bind("127.0.0.1", 0, "right", Duration::from_millis(500)).unwrap();
        let addr = subscriber.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"not json", addr).unwrap();

        assert!(matches!(subscriber.receive(), Err(Error::Transport(_))));
    }

    #[test]
    fn test_released_subscriber_yields_nothing() {
        let mut subscriber =
            UdpKeypointSubscriber::bind("127.0.0.1", 0, "right", Duration::from_millis(5)).unwrap();
        subscriber.release();
        subscriber.release();
        assert!(subscriber.local_addr().is_none());
        assert!(subscriber.receive().unwrap().is_none());
    }

    #[test]
    fn test_publisher_sends_enveloped_record() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        listener.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut publisher = UdpPublisher::new().unwrap();
        publisher
            .publish("127.0.0.1", port, "right_transformed_hand_coords", &record())
            .unwrap();

        let mut buf = vec![0; MAX_DATAGRAM_SIZE];
        let len = listener.recv(&mut buf).unwrap();
        let envelope: Envelope<OutputRecord> = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(envelope.topic, "right_transformed_hand_coords");
        assert_eq!(envelope.payload, record());
    }
}
