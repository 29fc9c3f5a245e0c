pub mod members;
pub mod projects;
pub mod tasks;
pub mod workspaces;

use axum::{extract::Multipart, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use planboard_shared::{api::Envelope, upload::validate_image};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::ImageUpdate;

pub type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

fn data<T>(value: T) -> ApiResult<T> {
    Ok(Json(Envelope::data(value)))
}

/// Multipart body shared by workspace and project forms.
#[derive(Debug)]
struct EntityForm {
    name: Option<String>,
    workspace_id: Option<Uuid>,
    image: ImageUpdate,
}

impl EntityForm {
    /// New entities have no image to keep.
    fn initial_image(&self) -> Option<String> {
        match &self.image {
            ImageUpdate::Set(url) => Some(url.clone()),
            ImageUpdate::Keep | ImageUpdate::Clear => None,
        }
    }
}

fn bad_form(err: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Malformed form: {}", err))
}

/// Read `name`, `workspaceId` and `image`. A file `image` part is stored as
/// a data URL; a text part is an existing URL, or empty to clear the image.
async fn read_form(mut multipart: Multipart) -> Result<EntityForm, AppError> {
    let mut form = EntityForm {
        name: None,
        workspace_id: None,
        image: ImageUpdate::Keep,
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = Some(field.text().await.map_err(bad_form)?),
            "workspaceId" => {
                let raw = field.text().await.map_err(bad_form)?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("Invalid workspaceId".to_string()))?;
                form.workspace_id = Some(id);
            }
            "image" if field.file_name().is_some() => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                validate_image(bytes.len() as u64, &content_type)
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                form.image = ImageUpdate::Set(format!(
                    "data:{};base64,{}",
                    content_type,
                    STANDARD.encode(&bytes)
                ));
            }
            "image" => {
                let url = field.text().await.map_err(bad_form)?;
                form.image = if url.is_empty() {
                    ImageUpdate::Clear
                } else {
                    ImageUpdate::Set(url)
                };
            }
            _ => {}
        }
    }

    Ok(form)
}
