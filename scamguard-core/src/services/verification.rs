//! Verification service - submit an image for fraud analysis

use std::io::ErrorKind;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::result::{Error, Outcome, Result};
use crate::domain::{ImageFormat, ImageRef, ImageUpload, VerificationResult, MAX_IMAGE_BYTES};
use crate::ports::VerificationGateway;

/// Stateless with respect to the session: the caller supplies the user id
/// and is responsible for having authenticated first.
pub struct VerificationService {
    gateway: Arc<dyn VerificationGateway>,
}

impl VerificationService {
    pub fn new(gateway: Arc<dyn VerificationGateway>) -> Self {
        Self { gateway }
    }

    /// Upload `image` with optional context and return the analysis
    pub async fn verify_image(
        &self,
        image: &ImageRef,
        user_id: i64,
        description: Option<&str>,
    ) -> Outcome<VerificationResult> {
        let upload = match load_upload(image, user_id, description).await {
            Ok(upload) => upload,
            Err(e) => return Outcome::from_error(e),
        };

        debug!(
            user_id,
            bytes = upload.bytes.len(),
            mime = upload.format.mime_type(),
            "Uploading image for verification"
        );

        let result = self.gateway.upload_image(&upload).await;
        if let Err(e) = &result {
            warn!(error = %e, "Image verification failed");
        }
        result.into()
    }
}

/// Read and check the image before anything goes over the network
async fn load_upload(image: &ImageRef, user_id: i64, description: Option<&str>) -> Result<ImageUpload> {
    let unreadable = |e: std::io::Error| {
        if e.kind() == ErrorKind::NotFound {
            Error::validation(format!("Image not found: {}", image.path().display()))
        } else {
            Error::validation(format!("Cannot read image {}: {}", image.path().display(), e))
        }
    };

    // Size and kind come from metadata so oversized files are never loaded
    let metadata = tokio::fs::metadata(image.path()).await.map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(Error::validation(format!(
            "Not an image file: {}",
            image.path().display()
        )));
    }
    check_size(metadata.len())?;

    let bytes = tokio::fs::read(image.path()).await.map_err(unreadable)?;
    // The file may have changed since the metadata call
    check_size(bytes.len() as u64)?;

    let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
        Error::validation("Unsupported image format. Use JPEG, PNG, GIF or WebP.")
    })?;

    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(ImageUpload {
        file_name: image.file_name(),
        format,
        bytes,
        user_id,
        description,
    })
}

fn check_size(len: u64) -> Result<()> {
    if len == 0 {
        return Err(Error::validation("Image file is empty"));
    }
    if len > MAX_IMAGE_BYTES as u64 {
        return Err(Error::validation(format!(
            "Image is too large ({} MB max)",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}
