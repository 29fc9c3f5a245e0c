use serde::{Deserialize, Serialize};

use crate::models::MemberRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub role: MemberRole,
}
