//! Inbound transport bridge.
//!
//! The transport callback hands each received buffer to
//! [`Ingress::deliver`], which decodes it and routes the frame to its lane:
//! Start frames to the cycle lane (state machine), Update frames to the
//! sensor lane (control loop). Delivery never blocks. A full lane drops the
//! frame and reports it to the diagnostic sink only, never to the sender.

use log::warn;

use crate::app::events::{AppEvent, FrameKind};
use crate::app::ports::EventSink;
use crate::channels::Fabric;
use crate::frame::{self, ProcessFrame};

/// Outcome of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued(FrameKind),
    Rejected,
    Dropped(FrameKind),
}

pub struct Ingress<'f> {
    fabric: &'f Fabric,
}

impl<'f> Ingress<'f> {
    pub fn new(fabric: &'f Fabric) -> Self {
        Self { fabric }
    }

    pub fn deliver(&self, bytes: &[u8], sink: &mut impl EventSink) -> Delivery {
        let frame = match frame::decode(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("ingress: rejected {} byte frame: {}", bytes.len(), e);
                sink.emit(&AppEvent::FrameRejected(e));
                return Delivery::Rejected;
            }
        };

        let (kind, queued) = match frame {
            ProcessFrame::Start(start) => {
                (FrameKind::Start, self.fabric.cycle.try_send(start).is_ok())
            }
            ProcessFrame::Update(update) => {
                (FrameKind::Update, self.fabric.sensor.try_send(update).is_ok())
            }
        };

        if queued {
            Delivery::Queued(kind)
        } else {
            warn!("ingress: {:?} lane full, dropping frame", kind);
            sink.emit(&AppEvent::FrameDropped(kind));
            Delivery::Dropped(kind)
        }
    }
}
