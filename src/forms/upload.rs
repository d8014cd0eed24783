use actix_multipart::form::{MultipartForm, tempfile::TempFile};

use crate::domain::wizard::SelectedFile;
use crate::forms::FormError;

/// Multipart payload of the capture screen. Size limits come from the
/// app-wide `MultipartFormConfig`.
#[derive(MultipartForm)]
pub struct UploadDocumentForm {
    pub file: TempFile,
}

impl TryFrom<UploadDocumentForm> for SelectedFile {
    type Error = FormError;

    fn try_from(form: UploadDocumentForm) -> Result<Self, Self::Error> {
        let upload = form.file;
        let filename = upload
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(FormError::MissingFile)?
            .to_string();
        let declared_type = upload
            .content_type
            .as_ref()
            .map(|mime| mime.essence_str().to_string());

        let bytes = std::fs::read(upload.file.path())?;

        Ok(SelectedFile::new(filename, declared_type, bytes))
    }
}
