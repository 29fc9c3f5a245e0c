//! Headers carrying the caller's identity. Authentication itself belongs to
//! the hosted backend; the development backend trusts these as sent.

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
