//! Guard for image attachments on workspace and project forms.

/// Largest accepted image, in bytes (1 MiB).
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/svg+xml"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("File size must be less than 1MB")]
    TooLarge { size: u64 },
    #[error("Only JPG, PNG, SVG, and JPEG files are allowed")]
    UnsupportedType { content_type: String },
}

/// Check an attachment's size and MIME type. Size is checked first.
pub fn validate_image(size: u64, content_type: &str) -> Result<(), UploadError> {
    if size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge { size });
    }

    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(UploadError::UnsupportedType {
            content_type: content_type.to_string(),
        });
    }

    Ok(())
}

/// Best-effort MIME type from a file name's extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// A file picked by the user, held in memory until submission.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        validate_image(self.size(), &self.content_type)
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// What a form submission does to an entity's image.
///
/// `Remove` is distinct from `Keep`: it clears an image that is already
/// persisted, while `Keep` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(UploadFile),
    Remove,
}

impl ImageChange {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_png_reports_size_before_type() {
        let err = validate_image(1_048_577, "image/png").unwrap_err();
        assert_eq!(err, UploadError::TooLarge { size: 1_048_577 });
        assert_eq!(err.to_string(), "File size must be less than 1MB");
    }

    #[test]
    fn oversized_text_file_still_reports_size() {
        let err = validate_image(2_000_000, "text/plain").unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
    }

    #[test]
    fn small_text_file_reports_type() {
        let err = validate_image(12, "text/plain").unwrap_err();
        assert_eq!(err.to_string(), "Only JPG, PNG, SVG, and JPEG files are allowed");
    }

    #[test]
    fn exactly_one_megabyte_is_accepted() {
        assert_eq!(validate_image(MAX_FILE_SIZE, "image/svg+xml"), Ok(()));
        assert_eq!(validate_image(0, "image/jpg"), Ok(()));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("logo.PNG"), "image/png");
        assert_eq!(content_type_for("icon.svg"), "image/svg+xml");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
