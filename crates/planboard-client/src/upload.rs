//! Staging state for the image picker on workspace and project forms.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use planboard_shared::upload::{content_type_for, ImageChange, UploadError, UploadFile};

/// Inline preview for a staged file.
pub fn preview_url(file: &UploadFile) -> String {
    format!("data:{};base64,{}", file.content_type, STANDARD.encode(&file.bytes))
}

/// Read a file from disk, guessing its MIME type from the extension.
pub async fn load_file(path: &Path) -> std::io::Result<UploadFile> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = content_type_for(&file_name);
    Ok(UploadFile::new(file_name, content_type, bytes))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub file: UploadFile,
    pub preview: String,
}

/// What the image field of a form currently holds.
///
/// An accepted file replaces whatever was staged before. A rejected file
/// changes nothing. Removing clears both the staged file and the image the
/// entity already had, which is reported as [`ImageChange::Remove`] rather
/// than [`ImageChange::Keep`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageStager {
    existing: Option<String>,
    staged: Option<StagedImage>,
    removed: bool,
    drag_active: bool,
}

impl ImageStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the image an entity already has.
    pub fn with_existing(image_url: Option<String>) -> Self {
        Self {
            existing: image_url,
            ..Self::default()
        }
    }

    pub fn offer(&mut self, file: UploadFile) -> Result<(), UploadError> {
        if let Err(err) = file.validate() {
            tracing::debug!(file = %file.file_name, error = %err, "image rejected");
            return Err(err);
        }

        let preview = preview_url(&file);
        self.staged = Some(StagedImage { file, preview });
        Ok(())
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    pub fn drop_file(&mut self, file: UploadFile) -> Result<(), UploadError> {
        self.drag_active = false;
        self.offer(file)
    }

    pub fn remove(&mut self) {
        self.staged = None;
        if self.existing.take().is_some() {
            self.removed = true;
        }
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn staged(&self) -> Option<&StagedImage> {
        self.staged.as_ref()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// What to show in the form: the staged file, else the persisted image.
    pub fn preview(&self) -> Option<&str> {
        self.staged
            .as_ref()
            .map(|staged| staged.preview.as_str())
            .or(self.existing.as_deref())
    }

    pub fn change(&self) -> ImageChange {
        match (&self.staged, self.removed) {
            (Some(staged), _) => ImageChange::Replace(staged.file.clone()),
            (None, true) => ImageChange::Remove,
            (None, false) => ImageChange::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use planboard_shared::upload::MAX_FILE_SIZE;
    use pretty_assertions::assert_eq;

    use super::*;

    fn png(bytes: usize) -> UploadFile {
        UploadFile::new("logo.png", "image/png", vec![0u8; bytes])
    }

    #[test]
    fn rejected_files_leave_state_untouched() {
        let mut stager = ImageStager::with_existing(Some("https://cdn/logo.png".to_string()));
        stager.offer(png(10)).unwrap();
        let before = stager.clone();

        let too_big = png(MAX_FILE_SIZE as usize + 1);
        assert_eq!(
            stager.offer(too_big),
            Err(UploadError::TooLarge {
                size: MAX_FILE_SIZE + 1
            })
        );
        let text = UploadFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(stager.offer(text), Err(UploadError::UnsupportedType { .. })));

        assert_eq!(stager, before);
    }

    #[test]
    fn accepted_file_replaces_staged_file() {
        let mut stager = ImageStager::new();
        stager.offer(png(4)).unwrap();
        let svg = UploadFile::new("icon.svg", "image/svg+xml", b"<svg/>".to_vec());
        stager.offer(svg.clone()).unwrap();

        assert_eq!(stager.change(), ImageChange::Replace(svg));
        assert_eq!(stager.preview(), Some("data:image/svg+xml;base64,PHN2Zy8+"));
    }

    #[test]
    fn removal_is_distinct_from_no_change() {
        let mut untouched = ImageStager::with_existing(Some("https://cdn/a.png".to_string()));
        assert_eq!(untouched.change(), ImageChange::Keep);
        assert_eq!(untouched.preview(), Some("https://cdn/a.png"));

        untouched.offer(png(1)).unwrap();
        untouched.remove();
        assert_eq!(untouched.change(), ImageChange::Remove);
        assert_eq!(untouched.preview(), None);
        assert!(untouched.is_removed());
    }

    #[test]
    fn removing_a_staged_file_without_existing_image_is_no_change() {
        let mut stager = ImageStager::new();
        stager.offer(png(1)).unwrap();
        stager.remove();
        assert_eq!(stager.change(), ImageChange::Keep);
    }

    #[test]
    fn drop_ends_drag_even_when_rejected() {
        let mut stager = ImageStager::new();
        stager.drag_enter();
        assert!(stager.is_drag_active());

        let text = UploadFile::new("notes.txt", "text/plain", vec![1]);
        assert!(stager.drop_file(text).is_err());
        assert!(!stager.is_drag_active());
        assert!(stager.staged().is_none());
    }

    #[tokio::test]
    async fn load_file_guesses_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.JPG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = load_file(&path).await.unwrap();
        assert_eq!(file.file_name, "avatar.JPG");
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.size(), 3);
    }
}
