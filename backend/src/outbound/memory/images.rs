//! In-memory `ImageStore`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ImageName;
use crate::domain::ports::{ImageFormat, ImageStore, ImageStoreError};

use super::poisoned;

/// Image bytes kept in a map keyed by generated name.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an image with `name` is held.
    pub fn contains(&self, name: &ImageName) -> bool {
        self.images
            .lock()
            .is_ok_and(|images| images.contains_key(name.as_str()))
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store(&self, bytes: &[u8], format: ImageFormat) -> Result<ImageName, ImageStoreError> {
        let name = ImageName::new(format!("{}.{}", Uuid::new_v4().simple(), format.extension()))
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        self.images
            .lock()
            .map_err(|_| poisoned(ImageStoreError::io))?
            .insert(name.as_str().to_owned(), bytes.to_vec());
        Ok(name)
    }

    async fn remove(&self, name: &ImageName) -> Result<(), ImageStoreError> {
        self.images
            .lock()
            .map_err(|_| poisoned(ImageStoreError::io))?
            .remove(name.as_str());
        Ok(())
    }
}
