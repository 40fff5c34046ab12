//! Filesystem image storage scoped to the uploads directory with `cap-std`.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ImageName;
use crate::domain::ports::{ImageFormat, ImageStore, ImageStoreError};

/// [`ImageStore`] writing `<uuid>.<ext>` files into one directory.
///
/// All access goes through a capability handle, so stored names cannot
/// escape the uploads directory.
#[derive(Clone)]
pub struct CapStdImageStore {
    dir: Arc<Dir>,
}

impl CapStdImageStore {
    /// Open `root`, creating it first when missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: &Path) -> std::io::Result<Self> {
        let authority = ambient_authority();
        Dir::create_ambient_dir_all(root, authority)?;
        let dir = Dir::open_ambient_dir(root, authority)?;
        Ok(Self { dir: Arc::new(dir) })
    }

    /// Read a stored image back.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::Io`] when the file cannot be read.
    pub fn read(&self, name: &ImageName) -> Result<Vec<u8>, ImageStoreError> {
        self.dir
            .read(name.as_str())
            .map_err(|err| ImageStoreError::io(err.to_string()))
    }
}

fn generated_name(format: ImageFormat) -> Result<ImageName, ImageStoreError> {
    let raw = format!("{}.{}", Uuid::new_v4().simple(), format.extension());
    ImageName::new(raw).map_err(|err| ImageStoreError::io(err.to_string()))
}

#[async_trait]
impl ImageStore for CapStdImageStore {
    async fn store(&self, bytes: &[u8], format: ImageFormat) -> Result<ImageName, ImageStoreError> {
        let name = generated_name(format)?;
        let dir = Arc::clone(&self.dir);
        let path = name.as_str().to_owned();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || dir.write(&path, bytes))
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        debug!(image = %name.as_str(), "image stored");
        Ok(name)
    }

    async fn remove(&self, name: &ImageName) -> Result<(), ImageStoreError> {
        match self.dir.remove_file(name.as_str()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(image = %name.as_str(), "image already removed");
                Ok(())
            }
            Err(err) => Err(ImageStoreError::io(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn store() -> (TempDir, CapStdImageStore) {
        let temp = TempDir::new().expect("temp dir");
        let store = CapStdImageStore::open(&temp.path().join("uploads")).expect("open store");
        (temp, store)
    }

    #[rstest]
    #[case(ImageFormat::Jpeg, ".jpg")]
    #[case(ImageFormat::Webp, ".webp")]
    #[tokio::test]
    async fn stores_bytes_under_generated_name(
        #[case] format: ImageFormat,
        #[case] suffix: &str,
    ) {
        let (_temp, store) = store();
        let name = store.store(b"pixels", format).await.expect("stored");

        assert!(name.as_str().ends_with(suffix));
        assert_eq!(store.read(&name).expect("read back"), b"pixels");
    }

    #[rstest]
    #[tokio::test]
    async fn removing_twice_is_fine() {
        let (_temp, store) = store();
        let name = store.store(b"pixels", ImageFormat::Png).await.expect("stored");

        store.remove(&name).await.expect("first removal");
        store.remove(&name).await.expect("missing file is not an error");
        assert!(store.read(&name).is_err());
    }
}
