use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every response: a payload, or a message describing why the
/// request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Data { data: T },
    Error { error: String },
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self::Data { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Data { data } => Ok(data),
            Self::Error { error } => Err(error),
        }
    }
}

/// Error-only body used for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// List responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub documents: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(documents: Vec<T>) -> Self {
        let total = documents.len();
        Self { documents, total }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Query string for endpoints scoped to one workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceQuery {
    pub workspace_id: Uuid,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn error_body_decodes_as_error_variant() {
        let parsed: Envelope<Page<u32>> = serde_json::from_str(r#"{"error":"Invalid invite code"}"#).unwrap();
        assert_eq!(parsed, Envelope::error("Invalid invite code"));
    }

    #[test]
    fn data_body_decodes_as_data_variant() {
        let parsed: Envelope<Page<u32>> =
            serde_json::from_str(r#"{"data":{"documents":[1,2],"total":2}}"#).unwrap();
        assert_eq!(parsed.into_result(), Ok(Page::new(vec![1, 2])));
    }
}
