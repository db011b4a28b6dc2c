//! Image asset store
//!
//! Validates uploads (image content, size cap), re-encodes to JPEG,
//! deduplicates by content hash, and stores under the work directory.
//! Returns a public URL path served by the assets API.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use shared::error::{AppError, AppResult, ErrorCode};

/// Maximum upload size (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// JPEG quality for stored images
const JPEG_QUALITY: u8 = 85;

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Local image asset store
#[derive(Debug, Clone)]
pub struct AssetService {
    images_dir: PathBuf,
}

impl AssetService {
    pub fn new(images_dir: PathBuf) -> Self {
        Self { images_dir }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Validate and store an uploaded image, returning its public URL path.
    ///
    /// Rejects empty payloads, payloads over [`MAX_FILE_SIZE`],
    /// non-image content types, and bytes that do not decode as an image.
    pub fn store_image(&self, data: &[u8], content_type: Option<&str>) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File size exceeds {} MB limit",
                    MAX_FILE_SIZE / 1024 / 1024
                ),
            ));
        }
        if let Some(ct) = content_type
            && !ct.starts_with("image/")
        {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("File is not an image (content type: {ct})"),
            ));
        }

        // Verify it's actually an image by decoding it
        let img = image::load_from_memory(data).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
        })?;

        // Re-encode as JPEG
        let mut buffer = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            let rgb_img = img.to_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            rgb_img.write_with_encoder(encoder).map_err(|e| {
                AppError::with_message(
                    ErrorCode::ImageProcessingFailed,
                    format!("Failed to compress image: {e}"),
                )
            })?;
        }

        fs::create_dir_all(&self.images_dir).map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create images directory: {e}"),
            )
        })?;

        // Content-hash dedup: identical uploads resolve to the same file
        let file_hash = calculate_hash(&buffer);
        if let Some(existing) = self.find_file_by_hash(&file_hash) {
            tracing::info!(existing_file = %existing, "Duplicate image detected, returning existing file");
            return Ok(format!("/api/assets/{existing}"));
        }

        let filename = format!("{}.jpg", Uuid::new_v4());
        let file_path = self.images_dir.join(&filename);
        fs::write(&file_path, &buffer).map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to save file: {e}"),
            )
        })?;

        self.create_hash_symlink(&file_hash, &filename)?;

        tracing::info!(
            filename = %filename,
            size = buffer.len(),
            hash = %file_hash,
            "Image stored"
        );

        Ok(format!("/api/assets/{filename}"))
    }

    /// Resolve a stored file path by name, refusing path traversal
    pub fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(AppError::validation("Invalid asset name"));
        }
        let path = self.images_dir.join(filename);
        if !path.is_file() {
            return Err(AppError::not_found(format!("Asset {filename}")));
        }
        Ok(path)
    }

    /// Find existing file by content hash
    fn find_file_by_hash(&self, hash: &str) -> Option<String> {
        let hash_dir = self.images_dir.join("by_hash");
        if !hash_dir.exists() {
            return None;
        }

        // Hash directory uses first 2 chars as subdir (e.g., "ab/abc123...")
        let prefix = &hash[..2];
        let hash_path = hash_dir.join(format!("{prefix}/{hash}"));

        if hash_path.exists()
            && let Ok(target) = fs::read_link(&hash_path)
        {
            return target.file_name().map(|s| s.to_string_lossy().to_string());
        }
        None
    }

    /// Create hash-based symlink for deduplication
    fn create_hash_symlink(&self, hash: &str, filename: &str) -> AppResult<()> {
        let hash_subdir = self.images_dir.join("by_hash").join(&hash[..2]);
        fs::create_dir_all(&hash_subdir).map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create hash dir: {e}"),
            )
        })?;

        let hash_path = hash_subdir.join(hash);
        let target_path = PathBuf::from("../../").join(filename);

        symlink::symlink_auto(&target_path, &hash_path).map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create symlink: {e}"),
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (tempfile::TempDir, AssetService) {
        let dir = tempfile::tempdir().unwrap();
        let service = AssetService::new(dir.path().join("images"));
        (dir, service)
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(4, 4);
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_store_and_resolve_image() {
        let (_dir, service) = service();
        let url = service.store_image(&png_bytes(), Some("image/png")).unwrap();
        let filename = url.strip_prefix("/api/assets/").unwrap();
        assert!(service.resolve(filename).is_ok());
    }

    #[test]
    fn test_duplicate_upload_dedupes() {
        let (_dir, service) = service();
        let data = png_bytes();
        let first = service.store_image(&data, Some("image/png")).unwrap();
        let second = service.store_image(&data, Some("image/png")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_non_image() {
        let (_dir, service) = service();
        let err = service
            .store_image(b"definitely not an image", Some("image/png"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageFile);

        let err = service
            .store_image(&png_bytes(), Some("application/pdf"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    }

    #[test]
    fn test_rejects_oversize_and_empty() {
        let (_dir, service) = service();
        assert_eq!(
            service.store_image(&[], None).unwrap_err().code,
            ErrorCode::EmptyFile
        );
        let oversized = vec![0u8; MAX_FILE_SIZE + 1];
        assert_eq!(
            service.store_image(&oversized, None).unwrap_err().code,
            ErrorCode::FileTooLarge
        );
    }

    #[test]
    fn test_resolve_refuses_traversal() {
        let (_dir, service) = service();
        assert!(service.resolve("../secret.jpg").is_err());
    }
}
