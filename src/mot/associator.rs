use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use itertools::iproduct;

use crate::mot::detection::Detection;
use crate::mot::track::{Track, TrackId};
use crate::utils::iou;

// Candidate pair for the priority queue.
// Ordered by cost, then by misses of the track (recently confirmed tracks first),
// then by ids so equal pairs are resolved the same way on every run.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f32,
    misses: usize,
    track_id: TrackId,
    detection_idx: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.misses.cmp(&other.misses))
            .then(self.track_id.cmp(&other.track_id))
            .then(self.detection_idx.cmp(&other.detection_idx))
    }
}

/// Result of matching one frame of detections against live tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    /// (track id, index into the detections slice), sorted by track id
    pub matches: Vec<(TrackId, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_tracks: Vec<TrackId>,
}

/// Greedy lowest-cost-first matcher over cost = 1 - IoU(predicted box, detection box)
#[derive(Debug, Clone, Copy)]
pub struct Associator {
    // Pairs below this IoU are never matched. Default is 0.3
    iou_threshold: f32,
}

impl Default for Associator {
    fn default() -> Self {
        Associator { iou_threshold: 0.3 }
    }
}

impl Associator {
    pub fn new(iou_threshold: f32) -> Self {
        Associator { iou_threshold }
    }
    pub fn get_iou_threshold(&self) -> f32 {
        self.iou_threshold
    }
    /// Matches detections to tracks.
    /// Detections are expected to be filtered already (target class, well-formed).
    pub fn associate<'a, I>(&self, tracks: I, detections: &[Detection]) -> Association
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let tracks: Vec<&Track> = tracks.into_iter().collect();
        let predicted: Vec<_> = tracks.iter().map(|track| track.predicted_bbox()).collect();

        let mut priority_queue: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        for (i, j) in iproduct!(0..tracks.len(), 0..detections.len()) {
            let iou_value = iou(&predicted[i], &detections[j].bbox);
            // Below threshold is an infinite cost: the pair never enters the queue
            if iou_value < self.iou_threshold || iou_value <= 0.0 {
                continue;
            }
            priority_queue.push(Reverse(Candidate {
                cost: 1.0 - iou_value,
                misses: tracks[i].get_misses(),
                track_id: tracks[i].get_id(),
                detection_idx: j,
            }));
        }

        let mut reserved_tracks: HashSet<TrackId> = HashSet::new();
        let mut reserved_detections: HashSet<usize> = HashSet::new();
        let mut matches = Vec::new();
        while let Some(Reverse(candidate)) = priority_queue.pop() {
            if reserved_tracks.contains(&candidate.track_id)
                || reserved_detections.contains(&candidate.detection_idx)
            {
                continue;
            }
            reserved_tracks.insert(candidate.track_id);
            reserved_detections.insert(candidate.detection_idx);
            matches.push((candidate.track_id, candidate.detection_idx));
            if reserved_tracks.len() == tracks.len() || reserved_detections.len() == detections.len() {
                break;
            }
        }
        matches.sort_unstable();

        let unmatched_detections = (0..detections.len())
            .filter(|j| !reserved_detections.contains(j))
            .collect();
        let mut unmatched_tracks: Vec<TrackId> = tracks
            .iter()
            .map(|track| track.get_id())
            .filter(|id| !reserved_tracks.contains(id))
            .collect();
        unmatched_tracks.sort_unstable();

        Association {
            matches,
            unmatched_detections,
            unmatched_tracks,
        }
    }
}
