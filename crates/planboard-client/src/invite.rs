//! Shareable invite links: `{origin}/workspaces/{workspaceId}/join/{inviteCode}`.

use url::Url;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum InviteLinkError {
    #[error("Invalid invite link: {0}")]
    Url(#[from] url::ParseError),
    #[error("Not an invite link")]
    NotInvite,
    #[error("Invite link has an invalid workspace id")]
    WorkspaceId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    pub workspace_id: Uuid,
    pub code: String,
}

pub fn invite_link(origin: &str, workspace_id: Uuid, invite_code: &str) -> String {
    format!(
        "{}/workspaces/{}/join/{}",
        origin.trim_end_matches('/'),
        workspace_id,
        invite_code
    )
}

/// Pull the workspace id and code back out of an invite link. The origin is
/// not checked, and a link served under a path prefix is accepted.
pub fn parse_invite_link(link: &str) -> Result<Invite, InviteLinkError> {
    let url = Url::parse(link.trim())?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., "workspaces", workspace_id, "join", code] => Ok(Invite {
            workspace_id: Uuid::parse_str(workspace_id).map_err(|_| InviteLinkError::WorkspaceId)?,
            code: code.to_string(),
        }),
        _ => Err(InviteLinkError::NotInvite),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn link_round_trips() {
        let workspace_id = Uuid::new_v4();
        let link = invite_link("https://plan.example.com/", workspace_id, "ABC123");

        assert_eq!(
            link,
            format!("https://plan.example.com/workspaces/{}/join/ABC123", workspace_id)
        );
        assert_eq!(
            parse_invite_link(&link).unwrap(),
            Invite {
                workspace_id,
                code: "ABC123".to_string()
            }
        );
    }

    #[test]
    fn other_pages_are_not_invites() {
        let link = format!("http://localhost:3000/workspaces/{}/settings", Uuid::new_v4());
        assert!(matches!(parse_invite_link(&link), Err(InviteLinkError::NotInvite)));
    }

    #[test]
    fn malformed_links_are_rejected() {
        assert!(matches!(parse_invite_link("not a url"), Err(InviteLinkError::Url(_))));
        assert!(matches!(
            parse_invite_link("http://localhost/workspaces/nope/join/ABC123"),
            Err(InviteLinkError::WorkspaceId)
        ));
    }
}
