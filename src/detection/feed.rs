//! Single-slot handoff between the detector and the simulation tick
//!
//! The producer replaces the whole payload on every publish; the tick reads
//! whatever is newest. Older payloads are dropped, never queued.

use std::sync::Arc;

use tokio::sync::watch;

use crate::core::error::Result;
use crate::detection::frame::DetectionFrame;
use crate::detection::payload::DetectionPayload;

type Slot = Option<Arc<DetectionPayload>>;

/// Anything the engine can poll for the latest detections
pub trait DetectionSource {
    /// The newest valid frame, or `None` when there is nothing usable
    fn latest_detections(&self) -> Option<DetectionFrame>;
}

impl DetectionSource for Option<DetectionFrame> {
    fn latest_detections(&self) -> Option<DetectionFrame> {
        self.clone()
    }
}

/// Writing half, held by the ingestion side
#[derive(Debug)]
pub struct DetectionFeed {
    tx: watch::Sender<Slot>,
}

/// Reading half, polled once per tick
#[derive(Debug, Clone)]
pub struct DetectionSlot {
    rx: watch::Receiver<Slot>,
}

impl DetectionFeed {
    /// Create an empty slot and its two halves
    pub fn channel() -> (DetectionFeed, DetectionSlot) {
        let (tx, rx) = watch::channel(None);
        (DetectionFeed { tx }, DetectionSlot { rx })
    }

    /// Replace the slot's contents
    pub fn publish(&self, payload: DetectionPayload) {
        self.tx.send_replace(Some(Arc::new(payload)));
    }

    /// Decode a JSON body and publish it
    ///
    /// A body that fails to decode leaves the previous payload in place.
    pub fn publish_json(&self, body: &str) -> Result<()> {
        let payload = DetectionPayload::from_json(body)?;
        self.publish(payload);
        Ok(())
    }

    /// Empty the slot
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

impl DetectionSlot {
    /// The raw payload currently in the slot
    pub fn latest_payload(&self) -> Option<Arc<DetectionPayload>> {
        self.rx.borrow().clone()
    }
}

impl DetectionSource for DetectionSlot {
    fn latest_detections(&self) -> Option<DetectionFrame> {
        self.latest_payload()?.to_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(names: &[&str]) -> DetectionPayload {
        let n = names.len();
        DetectionPayload {
            max_width: 100,
            max_height: 100,
            bboxes: Some((0..n).flat_map(|_| [10, 10, 20, 20]).collect()),
            masks: Some(vec![]),
            mask_lengths: Some(vec![0; n]),
            angles: Some(vec![0; n]),
            names: Some(names.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_empty_slot_has_no_detections() {
        let (_feed, slot) = DetectionFeed::channel();
        assert!(slot.latest_detections().is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let (feed, slot) = DetectionFeed::channel();
        feed.publish(payload(&["red"]));
        feed.publish(payload(&["green", "blue"]));
        let frame = slot.latest_detections().unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.detections[0].label, "green");
    }

    #[test]
    fn test_reading_does_not_consume() {
        let (feed, slot) = DetectionFeed::channel();
        feed.publish(payload(&["red"]));
        assert!(slot.latest_detections().is_some());
        assert!(slot.latest_detections().is_some());
    }

    #[test]
    fn test_invalid_payload_reads_as_none() {
        let (feed, slot) = DetectionFeed::channel();
        feed.publish(DetectionPayload::default());
        assert!(slot.latest_payload().is_some());
        assert!(slot.latest_detections().is_none());
    }

    #[test]
    fn test_bad_json_keeps_previous_payload() {
        let (feed, slot) = DetectionFeed::channel();
        feed.publish(payload(&["red"]));
        assert!(feed.publish_json("{oops").is_err());
        assert_eq!(slot.latest_detections().unwrap().detections[0].label, "red");
        feed.clear();
        assert!(slot.latest_detections().is_none());
    }

    #[test]
    fn test_publish_from_another_thread() {
        let (feed, slot) = DetectionFeed::channel();
        let handle = std::thread::spawn(move || {
            for _ in 0..10 {
                feed.publish(payload(&["red", "red"]));
            }
            feed.publish(payload(&["blue"]));
        });
        handle.join().unwrap();
        let frame = slot.latest_detections().unwrap();
        assert_eq!(frame.detections[0].label, "blue");
    }
}
