use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::mot::{CountState, CountingEngine, Detector, FrameResult, FrameStatus};
use crate::pipeline::overlay_queue::OverlayQueue;

/// Requests the frame loop to stop at the next frame boundary.
/// Clones control the same loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        StopHandle::default()
    }
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst)
    }
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Frame paired with the engine output it should be annotated with
pub struct OverlayItem<F> {
    pub frame: F,
    pub result: Arc<FrameResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub frames: u64,
    pub detector_failures: u64,
    pub counts: CountState,
    pub stopped_early: bool,
}

/// Drives `engine` over `frames` one frame at a time.
/// Each processed frame is offered to `overlay` (if any) without blocking.
pub fn run_stream<F, D, I>(
    engine: &mut CountingEngine,
    detector: &mut D,
    frames: I,
    stop: &StopHandle,
    overlay: Option<&OverlayQueue<OverlayItem<F>>>,
) -> StreamSummary
where
    D: Detector<F>,
    I: IntoIterator<Item = F>,
{
    let mut summary = StreamSummary {
        frames: 0,
        detector_failures: 0,
        counts: engine.counts(),
        stopped_early: false,
    };
    for frame in frames {
        if stop.is_stopped() {
            log::info!("Stream stopped after {} frames", summary.frames);
            summary.stopped_early = true;
            break;
        }
        let result = engine.process_frame(detector, &frame);
        summary.frames += 1;
        if let FrameStatus::DetectorFailed(_) = result.status {
            summary.detector_failures += 1;
        }
        if let Some(queue) = overlay {
            queue.push(OverlayItem {
                frame,
                result: Arc::new(result),
            });
        }
    }
    summary.counts = engine.counts();
    summary
}
