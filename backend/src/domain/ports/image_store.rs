//! Port for storing uploaded listing images.
use async_trait::async_trait;

use crate::domain::ImageName;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image stores.
    pub enum ImageStoreError {
        /// Reading or writing the backing store failed.
        Io { message: String } => "image store i/o failed: {message}",
    }
}

/// Image file formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageFormat {
    /// Resolve a MIME type.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::ports::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_mime("image/png"), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::from_mime("text/plain"), None);
    /// ```
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used for stored images.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Storage for listing images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store image bytes under a generated name.
    async fn store(&self, bytes: &[u8], format: ImageFormat) -> Result<ImageName, ImageStoreError>;

    /// Remove a stored image. A missing file is not an error.
    async fn remove(&self, name: &ImageName) -> Result<(), ImageStoreError>;
}
