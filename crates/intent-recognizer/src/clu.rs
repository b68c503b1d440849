//! Conversation-analysis (CLU) recognizer over HTTP.

use crate::{
    decode_clu_response, CallContext, RecognitionResult, Recognizer, RecognizerError, Result,
};
use async_trait::async_trait;
use reqwest::Client;
use robot_gateway::Interrupted;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Connection settings for a deployed conversation-analysis project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CluSettings {
    /// Language resource endpoint, e.g. `https://<name>.cognitiveservices.azure.com`
    pub endpoint: String,
    pub api_key: String,
    pub project_name: String,
    pub deployment_name: String,
    pub api_version: String,
}

impl Default for CluSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            project_name: String::new(),
            deployment_name: String::new(),
            api_version: "2023-04-01".to_string(),
        }
    }
}

impl CluSettings {
    pub fn is_complete(&self) -> bool {
        [
            &self.endpoint,
            &self.api_key,
            &self.project_name,
            &self.deployment_name,
        ]
        .iter()
        .all(|v| !v.trim().is_empty())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    kind: &'static str,
    analysis_input: AnalysisInput<'a>,
    parameters: Parameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisInput<'a> {
    conversation_item: ConversationItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationItem<'a> {
    id: String,
    participant_id: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    project_name: &'a str,
    deployment_name: &'a str,
    string_index_type: &'static str,
}

pub struct CluRecognizer {
    settings: CluSettings,
    client: Client,
}

impl CluRecognizer {
    pub fn new(settings: CluSettings) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| RecognizerError::InvalidSettings(e.to_string()))?;
        Ok(Self { settings, client })
    }

    fn url(&self) -> String {
        format!(
            "{}/language/:analyze-conversations?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.api_version
        )
    }
}

#[async_trait]
impl Recognizer for CluRecognizer {
    fn is_configured(&self) -> bool {
        self.settings.is_complete()
    }

    async fn recognize(&self, utterance: &str, ctx: &CallContext) -> Result<RecognitionResult> {
        if !self.is_configured() {
            return Err(RecognizerError::NotConfigured);
        }

        let body = AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: Uuid::new_v4().to_string(),
                    participant_id: "user",
                    text: utterance,
                },
            },
            parameters: Parameters {
                project_name: &self.settings.project_name,
                deployment_name: &self.settings.deployment_name,
                string_index_type: "TextElement_V8",
            },
        };

        let request = self
            .client
            .post(self.url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.settings.api_key)
            .timeout(ctx.remaining())
            .json(&body);

        let response = ctx.run(request.send()).await?.map_err(|e| {
            if e.is_timeout() {
                RecognizerError::Interrupted(Interrupted::DeadlineExceeded)
            } else {
                RecognizerError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "recognizer returned non-success status");
            return Err(RecognizerError::Status(status.as_u16()));
        }

        let bytes = ctx
            .run(response.bytes())
            .await?
            .map_err(|e| RecognizerError::Transport(e.to_string()))?;
        let result = decode_clu_response(&bytes)?;
        tracing::debug!(
            intent = %result.top_intent().intent,
            score = result.top_intent().score,
            "recognized utterance"
        );
        Ok(result)
    }
}
