use std::collections::HashMap;

use crate::api::types::TextureHandle;

/// Texture loading collaborator.
///
/// Requests are fire-and-forget: the host decodes and uploads the image and
/// later reports the handle back (see `Orrery::texture_loaded`). Completions
/// may arrive in any order.
pub trait TextureLoader {
    fn request_load(&mut self, path: &str) -> TextureHandle;
}

/// A requested texture waiting to be fetched by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub handle: TextureHandle,
    pub path: String,
}

/// Loader that queues requests for the host to drain.
/// Handles are sequential starting at 0.
#[derive(Debug, Default)]
pub struct QueuedLoader {
    requests: Vec<TextureRequest>,
    next_handle: u32,
}

impl QueuedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet drained.
    pub fn requests(&self) -> &[TextureRequest] {
        &self.requests
    }

    /// Take all queued requests.
    pub fn drain(&mut self) -> Vec<TextureRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl TextureLoader for QueuedLoader {
    fn request_load(&mut self, path: &str) -> TextureHandle {
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.requests.push(TextureRequest {
            handle,
            path: path.to_string(),
        });
        handle
    }
}

/// Textures requested but not yet reported complete.
///
/// Lets completions be counted exactly once each, in any order: repeats and
/// unknown handles are rejected.
#[derive(Debug, Default)]
pub struct PendingTextures {
    pending: HashMap<TextureHandle, String>,
}

impl PendingTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: TextureHandle, path: &str) {
        self.pending.insert(handle, path.to_string());
    }

    /// Mark a handle complete. Returns its path if it was pending.
    pub fn complete(&mut self, handle: TextureHandle) -> Option<String> {
        self.pending.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Wraps a loader and records every handle it issues as pending.
pub struct TrackingLoader<'a> {
    inner: &'a mut dyn TextureLoader,
    pending: &'a mut PendingTextures,
}

impl<'a> TrackingLoader<'a> {
    pub fn new(inner: &'a mut dyn TextureLoader, pending: &'a mut PendingTextures) -> Self {
        Self { inner, pending }
    }
}

impl TextureLoader for TrackingLoader<'_> {
    fn request_load(&mut self, path: &str) -> TextureHandle {
        let handle = self.inner.request_load(path);
        self.pending.insert(handle, path);
        handle
    }
}
