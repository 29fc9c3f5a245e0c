use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use planboard_shared::api::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

pub async fn identity_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let headers = request.headers();

    let id = header(headers, USER_ID_HEADER)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(AppError::Unauthorized)?;

    let user = CurrentUser {
        id,
        name: header(headers, USER_NAME_HEADER)
            .unwrap_or("Anonymous")
            .to_string(),
        email: header(headers, USER_EMAIL_HEADER)
            .unwrap_or_default()
            .to_string(),
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
