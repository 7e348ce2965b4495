use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::debug;

use crate::errors::PhotoError;

/// An image attached to a mattress line, kept as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    file_name: String,
    mime: String,
    size: u64,
    data_url: String,
}

impl PhotoAttachment {
    /// Encode `bytes`, rejecting empty, oversized and non-image files.
    pub fn from_bytes(file_name: &str, bytes: &[u8], max_bytes: u64) -> Result<Self, PhotoError> {
        let size = bytes.len() as u64;
        if size == 0 {
            return Err(PhotoError::Empty {
                file_name: file_name.to_string(),
            });
        }
        if size > max_bytes {
            return Err(PhotoError::TooLarge {
                file_name: file_name.to_string(),
                size,
                limit: max_bytes,
            });
        }

        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(PhotoError::UnsupportedType {
                file_name: file_name.to_string(),
                mime: mime.essence_str().to_string(),
            });
        }

        let mime = mime.essence_str().to_string();
        let data_url = format!("data:{};base64,{}", mime, B64.encode(bytes));
        debug!(file_name, %mime, size, "photo encoded");
        Ok(Self {
            file_name: file_name.to_string(),
            mime,
            size,
            data_url,
        })
    }

    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self, PhotoError> {
        let read_err = |source| PhotoError::Read {
            path: path.to_path_buf(),
            source,
        };
        // Check the size before reading the whole file.
        let size = std::fs::metadata(path).map_err(read_err)?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if size > max_bytes {
            return Err(PhotoError::TooLarge {
                file_name,
                size,
                limit: max_bytes,
            });
        }
        let bytes = std::fs::read(path).map_err(read_err)?;
        Self::from_bytes(&file_name, &bytes, max_bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn data_url(&self) -> String {
        self.data_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_image_becomes_data_url() {
        let photo = PhotoAttachment::from_bytes("m.jpg", b"abc", 1024).unwrap();
        assert_eq!(photo.mime(), "image/jpeg");
        assert_eq!(photo.data_url(), "data:image/jpeg;base64,YWJj");
        assert_eq!(photo.size(), 3);
    }

    #[test]
    fn test_non_image_is_rejected() {
        let err = PhotoAttachment::from_bytes("notes.pdf", b"%PDF", 1024).unwrap_err();
        assert!(matches!(err, PhotoError::UnsupportedType { ref mime, .. } if mime == "application/pdf"));
    }

    #[test]
    fn test_oversized_is_rejected() {
        let err = PhotoAttachment::from_bytes("big.png", &[0u8; 16], 8).unwrap_err();
        assert!(matches!(
            err,
            PhotoError::TooLarge {
                size: 16,
                limit: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(
            PhotoAttachment::from_bytes("e.png", b"", 8),
            Err(PhotoError::Empty { .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let photo = PhotoAttachment::from_path(&path, 1024).unwrap();
        assert_eq!(photo.file_name(), "photo.png");
        assert!(photo.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = PhotoAttachment::from_path(&dir.path().join("none.png"), 1024).unwrap_err();
        assert!(matches!(err, PhotoError::Read { .. }));
    }
}
