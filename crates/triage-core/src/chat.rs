//! Request and response shapes of the finding assistant. Transport and the
//! assistant itself live elsewhere; this crate only builds the payloads.

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::{ConversationId, EngineRef, Finding};

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FindingContext {
    pub code: String,
    pub severity: String,
    pub engine: EngineRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regeltype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branche: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entiteit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waarde: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omschrijving: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verwacht: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bron: Option<String>,
}

impl FindingContext {
    /// Empty text fields are left out of the context.
    pub fn from_finding(f: &Finding) -> Self {
        Self {
            code: f.code.clone(),
            severity: f.severity.clone(),
            engine: f.engine.clone(),
            regeltype: f.regeltype.as_deref().and_then(non_empty),
            contract: non_empty(&f.contract),
            branche: f.branche.as_deref().and_then(non_empty),
            entiteit: non_empty(&f.entiteit),
            label: non_empty(&f.label),
            waarde: non_empty(&f.waarde),
            omschrijving: non_empty(&f.omschrijving),
            verwacht: non_empty(&f.verwacht),
            bron: non_empty(&f.bron),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub document_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub relevance_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding_context: Option<FindingContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Result<Self, ReviewError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ReviewError::EmptyMessage);
        }
        Ok(Self {
            message,
            conversation_id: None,
            finding_context: None,
            validation_file: None,
        })
    }

    /// A question about one finding, opening a fresh conversation.
    pub fn about_finding(message: impl Into<String>, finding: &Finding, file_name: &str) -> Result<Self, ReviewError> {
        let mut req = Self::new(message)?;
        req.conversation_id = Some(ConversationId::new());
        req.finding_context = Some(FindingContext::from_finding(finding));
        req.validation_file = non_empty(file_name);
        Ok(req)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: ConversationId,
    pub message: ChatMessage,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub finding: FindingContext,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_drops_empty_fields() {
        let f = Finding {
            code: "E2-002".into(),
            severity: "FOUT".into(),
            engine: EngineRef::Number(2),
            contract: "DL1".into(),
            label: "PP_BTP".into(),
            ..Default::default()
        };
        let ctx = FindingContext::from_finding(&f);
        assert_eq!(ctx.contract.as_deref(), Some("DL1"));
        assert!(ctx.waarde.is_none());
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["engine"], 2);
        assert!(json.get("verwacht").is_none());
    }

    #[test]
    fn empty_message_is_rejected() {
        assert_eq!(ChatRequest::new("  "), Err(ReviewError::EmptyMessage));
    }

    #[test]
    fn finding_question_carries_context() {
        let f = Finding {
            code: "E1-002".into(),
            ..Default::default()
        };
        let req = ChatRequest::about_finding("Wat betekent dit?", &f, "polis.xml").unwrap();
        assert!(req.conversation_id.is_some());
        assert_eq!(req.finding_context.unwrap().code, "E1-002");
        assert_eq!(req.validation_file.as_deref(), Some("polis.xml"));
    }

    #[test]
    fn response_defaults_suggestions() {
        let raw = r#"{"conversation_id":"c1","message":{"role":"assistant","content":"Hoi"}}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.suggested_questions.is_empty());
        assert_eq!(resp.conversation_id.as_str(), "c1");
    }
}
