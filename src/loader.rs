use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use winit::event_loop::EventLoopProxy;

use crate::files::Gallery;

// ---------------------------------------------------------------------------
// Decoded image data (RGBA8, CPU side)
// ---------------------------------------------------------------------------

pub struct DecodedImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn decode_image(path: &Path, bound: Option<u32>) -> Result<DecodedImage, String> {
    let img = image::open(path).map_err(|e| e.to_string())?;
    let img = match bound {
        Some(px) if img.width() > px || img.height() > px => img.thumbnail(px, px),
        _ => img,
    };
    let (width, height) = (img.width(), img.height());
    Ok(DecodedImage {
        rgba_bytes: img.to_rgba8().into_raw(),
        width,
        height,
    })
}

fn decode_thumbnail(gallery: &Gallery, id: &str, bound: u32) -> Result<DecodedImage, String> {
    let prebuilt = gallery.thumbnail_path(id);
    if prebuilt.is_file() {
        if let Ok(img) = decode_image(&prebuilt, Some(bound)) {
            return Ok(img);
        }
        log::debug!("Unreadable thumbnail {:?}, decoding original", prebuilt);
    }
    decode_image(&gallery.path(id), Some(bound))
}

// ---------------------------------------------------------------------------
// Cache state (shared between the UI and worker threads via Mutex + Condvar)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkType {
    Full,
    Thumbnail,
}

/// Indices here are 0-based.
pub struct CacheState {
    pub current_idx: usize,
    pub preload: usize,
    pub file_count: usize,

    pub images: HashMap<usize, Arc<DecodedImage>>,
    pub thumbnails: HashMap<usize, Arc<DecodedImage>>,
    pub wanted_thumbnails: VecDeque<usize>,

    pub in_progress: HashSet<(usize, WorkType)>,
    pub errors: HashMap<usize, String>,
    pub thumbnail_errors: HashSet<usize>,
}

pub type SharedState = Arc<(Mutex<CacheState>, Condvar)>;

impl CacheState {
    pub fn new(file_count: usize, preload: usize) -> Self {
        Self {
            current_idx: 0,
            preload: preload.min(file_count),
            file_count,
            images: HashMap::new(),
            thumbnails: HashMap::new(),
            wanted_thumbnails: VecDeque::new(),
            in_progress: HashSet::new(),
            errors: HashMap::new(),
            thumbnail_errors: HashSet::new(),
        }
    }

    pub fn set_current_idx(&mut self, idx: usize) {
        if idx != self.current_idx {
            self.current_idx = idx;
            self.evict_outside_window();
        }
    }

    pub fn get(&self, idx: usize) -> Option<Arc<DecodedImage>> {
        self.images.get(&idx).cloned()
    }

    pub fn get_thumbnail(&self, idx: usize) -> Option<Arc<DecodedImage>> {
        self.thumbnails.get(&idx).cloned()
    }

    /// Queue thumbnails, nearest first. Already known ones are skipped.
    pub fn want_thumbnails(&mut self, indices: impl IntoIterator<Item = usize>) {
        for idx in indices {
            if idx < self.file_count
                && !self.thumbnails.contains_key(&idx)
                && !self.thumbnail_errors.contains(&idx)
                && !self.wanted_thumbnails.contains(&idx)
            {
                self.wanted_thumbnails.push_back(idx);
            }
        }
    }

    fn window_end(&self) -> usize {
        self.current_idx.saturating_add(self.preload)
    }

    fn in_window(&self, idx: usize) -> bool {
        idx >= self.current_idx && idx <= self.window_end()
    }

    fn is_available(&self, idx: usize, wtype: WorkType) -> bool {
        if idx >= self.file_count || self.in_progress.contains(&(idx, wtype)) {
            return false;
        }
        match wtype {
            WorkType::Full => !self.images.contains_key(&idx) && !self.errors.contains_key(&idx),
            WorkType::Thumbnail => {
                !self.thumbnails.contains_key(&idx) && !self.thumbnail_errors.contains(&idx)
            }
        }
    }

    /// Current item first, then queued thumbnails, then the preload window
    /// (only once the current item is settled).
    pub fn find_work(&mut self) -> Option<(usize, WorkType)> {
        let current = self.current_idx;
        if self.is_available(current, WorkType::Full) {
            return Some((current, WorkType::Full));
        }

        while let Some(idx) = self.wanted_thumbnails.pop_front() {
            if self.is_available(idx, WorkType::Thumbnail) {
                return Some((idx, WorkType::Thumbnail));
            }
        }

        let settled = self.images.contains_key(&current) || self.errors.contains_key(&current);
        if settled {
            for idx in current.saturating_add(1)..=self.window_end() {
                if self.is_available(idx, WorkType::Full) {
                    return Some((idx, WorkType::Full));
                }
            }
        }
        None
    }

    pub fn insert(&mut self, idx: usize, decoded: DecodedImage, wtype: WorkType) {
        match wtype {
            WorkType::Full => {
                if self.in_window(idx) {
                    self.images.insert(idx, Arc::new(decoded));
                } else {
                    log::debug!("Dropping decoded image {} outside the preload window", idx);
                }
            }
            WorkType::Thumbnail => {
                self.thumbnails.insert(idx, Arc::new(decoded));
            }
        }
    }

    fn evict_outside_window(&mut self) {
        let (lo, hi) = (self.current_idx, self.window_end());
        self.images.retain(|&idx, _| idx >= lo && idx <= hi);
    }
}

// ---------------------------------------------------------------------------
// User event for waking the UI from worker threads
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum UserEvent {
    /// Full image finished (successfully or not); 0-based.
    ImageReady(usize),
    ThumbnailReady(usize),
}

// ---------------------------------------------------------------------------
// Background decode workers
// ---------------------------------------------------------------------------

pub fn spawn_decode_workers(
    shared: SharedState,
    gallery: Arc<Gallery>,
    proxy: EventLoopProxy<UserEvent>,
    thumbnail_bound: u32,
    num_threads: usize,
) {
    for _ in 0..num_threads {
        let shared = Arc::clone(&shared);
        let gallery = Arc::clone(&gallery);
        let proxy = proxy.clone();
        thread::spawn(move || {
            loop {
                let Some((idx, wtype)) = next_job(&shared) else {
                    return;
                };

                let id = &gallery.items[idx];
                let result = match wtype {
                    WorkType::Full => decode_image(&gallery.path(id), None),
                    WorkType::Thumbnail => decode_thumbnail(&gallery, id, thumbnail_bound),
                };

                {
                    let (lock, cvar) = &*shared;
                    let Ok(mut state) = lock.lock() else {
                        return;
                    };
                    state.in_progress.remove(&(idx, wtype));
                    match result {
                        Ok(decoded) => state.insert(idx, decoded, wtype),
                        Err(e) => {
                            log::warn!("Could not load {}: {}", id, e);
                            match wtype {
                                WorkType::Full => {
                                    state.errors.insert(idx, e);
                                }
                                WorkType::Thumbnail => {
                                    state.thumbnail_errors.insert(idx);
                                }
                            }
                        }
                    }
                    cvar.notify_all();
                }

                let event = match wtype {
                    WorkType::Full => UserEvent::ImageReady(idx),
                    WorkType::Thumbnail => UserEvent::ThumbnailReady(idx),
                };
                // The event loop is gone once the window closes.
                if proxy.send_event(event).is_err() {
                    return;
                }
            }
        });
    }
}

/// Block until there is work. `None` when the lock is poisoned.
fn next_job(shared: &SharedState) -> Option<(usize, WorkType)> {
    let (lock, cvar) = &**shared;
    let mut state = lock.lock().ok()?;
    loop {
        if let Some(job) = state.find_work() {
            state.in_progress.insert(job);
            return Some(job);
        }
        state = cvar.wait(state).ok()?;
    }
}

pub fn worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .clamp(1, 4)
}
