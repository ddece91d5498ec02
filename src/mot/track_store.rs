use std::collections::{BTreeMap, VecDeque};

use crate::mot::associator::Association;
use crate::mot::detection::Detection;
use crate::mot::track::{Track, TrackId, TrackSnapshot};
use crate::utils::{iou, BBox, Point};

/// Ids touched by one `TrackStore::update` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreUpdate {
    /// Matched tracks and newly created ones, ascending
    pub touched: Vec<TrackId>,
    pub created: Vec<TrackId>,
    pub evicted: Vec<TrackId>,
}

// Evicted track, remembered for `respawn_cooldown` frames. Its box keeps moving with the last velocity.
#[derive(Debug, Clone, Copy)]
struct Evicted {
    bbox: BBox,
    velocity: Point,
    frames_left: usize,
}

/// Live tracks of one stream plus their lifecycle
pub struct TrackStore {
    // Max consecutive frames without a match. Track is evicted once misses exceed it. Default is 30
    max_misses: usize,
    // Velocity smoothing factor. Default is 0.5
    alpha: f32,
    // Frames during which a recently evicted track suppresses new tracks at its position. Default is 0 (off)
    respawn_cooldown: usize,
    // Detections must overlap an evicted box by this much to be suppressed
    iou_threshold: f32,
    next_id: TrackId,
    // Storage
    tracks: BTreeMap<TrackId, Track>,
    recently_evicted: VecDeque<Evicted>,
}

impl Default for TrackStore {
    fn default() -> Self {
        TrackStore::new(30, 0.5)
    }
}

impl TrackStore {
    /// Creates new instance of TrackStore
    ///
    /// Basic usage:
    ///
    /// ```
    /// use line_counter_rs::mot::TrackStore;
    /// let max_misses: usize = 30;
    /// let alpha: f32 = 0.5;
    /// let store = TrackStore::new(max_misses, alpha);
    /// assert!(store.is_empty());
    /// ```
    pub fn new(max_misses: usize, alpha: f32) -> Self {
        TrackStore {
            max_misses,
            alpha,
            respawn_cooldown: 0,
            iou_threshold: 0.3,
            next_id: 1,
            tracks: BTreeMap::new(),
            recently_evicted: VecDeque::new(),
        }
    }
    /// Enables suppression of new tracks near recently evicted ones
    pub fn with_respawn_cooldown(mut self, frames: usize, iou_threshold: f32) -> Self {
        self.respawn_cooldown = frames;
        self.iou_threshold = iou_threshold;
        self
    }
    pub fn len(&self) -> usize {
        self.tracks.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }
    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }
    /// Tracks in ascending id order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }
    pub fn snapshots(&self) -> Vec<TrackSnapshot> {
        self.tracks.values().map(Track::snapshot).collect()
    }
    /// Forgets every track. Id allocation continues where it stopped.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.recently_evicted.clear();
    }
    /// Applies one frame of association results
    pub fn update(&mut self, detections: &[Detection], association: &Association) -> StoreUpdate {
        let mut result = StoreUpdate::default();
        self.age_evicted();

        for &(id, detection_idx) in association.matches.iter() {
            match self.tracks.get_mut(&id) {
                Some(track) => {
                    track.update(detections[detection_idx].bbox, self.alpha);
                    result.touched.push(id);
                }
                None => {
                    debug_assert!(false, "association refers to unknown track {}", id);
                }
            }
        }

        for &id in association.unmatched_tracks.iter() {
            let evict = match self.tracks.get_mut(&id) {
                Some(track) => {
                    track.inc_misses();
                    track.get_misses() > self.max_misses
                }
                None => false,
            };
            if evict {
                if let Some(track) = self.tracks.remove(&id) {
                    log::debug!("Evicting track {} after {} misses", id, track.get_misses());
                    if self.respawn_cooldown > 0 {
                        // Ageing at the top of the next update takes one tick before that frame's check
                        self.recently_evicted.push_back(Evicted {
                            bbox: track.predicted_bbox(),
                            velocity: track.get_velocity(),
                            frames_left: self.respawn_cooldown + 1,
                        });
                    }
                    result.evicted.push(id);
                }
            }
        }

        for &detection_idx in association.unmatched_detections.iter() {
            let bbox = detections[detection_idx].bbox;
            if self.resembles_evicted(&bbox) {
                log::trace!("Not spawning track at {:?}: overlaps a recently evicted track", bbox);
                continue;
            }
            let id = self.allocate_id();
            debug_assert!(!self.tracks.contains_key(&id), "duplicate track id {}", id);
            self.tracks.insert(id, Track::new(id, bbox));
            log::debug!("Created track {} at {:?}", id, bbox);
            result.created.push(id);
            result.touched.push(id);
        }
        result.touched.sort_unstable();
        result
    }
    fn allocate_id(&mut self) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
    fn age_evicted(&mut self) {
        for evicted in self.recently_evicted.iter_mut() {
            evicted.frames_left = evicted.frames_left.saturating_sub(1);
            evicted.bbox = evicted.bbox.translated(evicted.velocity.x, evicted.velocity.y);
        }
        self.recently_evicted.retain(|evicted| evicted.frames_left > 0);
    }
    fn resembles_evicted(&self, bbox: &BBox) -> bool {
        self.recently_evicted
            .iter()
            .any(|evicted| iou(&evicted.bbox, bbox) >= self.iou_threshold)
    }
}
