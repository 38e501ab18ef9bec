//! OpenAI chat-completions rule analyzer

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::audit::{
    AnalysisOutcome, Recommendation, RuleAnalyzer, Violation, ViolationSeverity,
};
use crate::domain::rule::NormalizedRuleSet;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

const SYSTEM_PROMPT: &str = "You are a network security auditor. Given a set of \
canonical firewall rules and an audit intent, respond with a single JSON object: \
{\"violations\": [{\"rule_id\", \"severity\" (low|medium|high|critical), \
\"category\", \"description\", \"remediation\", \"risk_score\" (0-10)}], \
\"recommendations\": [{\"rule_id\", \"title\", \"description\"}], \
\"confidence_score\" (0-1)}. No prose outside the JSON.";

/// OpenAI-backed analyzer
#[derive(Debug)]
pub struct OpenAiRuleAnalyzer<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiRuleAnalyzer<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(
        &self,
        rule_set: &NormalizedRuleSet,
        intent: &str,
    ) -> Result<serde_json::Value, DomainError> {
        let rules_json = serde_json::to_string(rule_set)
            .map_err(|e| DomainError::internal(format!("Failed to serialize rule set: {}", e)))?;

        Ok(serde_json::json!({
            "model": self.model,
            "temperature": 0.0,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {
                    "role": "user",
                    "content": format!("Audit intent: {}\n\nRules:\n{}", intent, rules_json)
                }
            ]
        }))
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<AnalysisOutcome, DomainError> {
        let response: ChatCompletionResponse = serde_json::from_value(json)
            .map_err(|e| DomainError::model_call(format!("Malformed completion response: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DomainError::model_call("Completion response had no choices"))?;

        let analysis: ModelAnalysis = serde_json::from_str(&content).map_err(|e| {
            DomainError::model_call(format!("Model output was not valid analysis JSON: {}", e))
        })?;

        let violations = analysis
            .violations
            .into_iter()
            .map(ModelViolation::into_domain)
            .collect::<Vec<_>>();

        let recommendations = analysis
            .recommendations
            .into_iter()
            .map(|r| {
                Recommendation::from_model(
                    Uuid::new_v4().to_string(),
                    r.rule_id,
                    r.title,
                    r.description,
                )
            })
            .collect::<Vec<_>>();

        debug!(
            violations = violations.len(),
            recommendations = recommendations.len(),
            "Parsed model analysis"
        );

        Ok(AnalysisOutcome {
            violations,
            recommendations,
            confidence_score: analysis.confidence_score.clamp(0.0, 1.0),
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> RuleAnalyzer for OpenAiRuleAnalyzer<C> {
    async fn analyze(
        &self,
        rule_set: &NormalizedRuleSet,
        intent: &str,
    ) -> Result<AnalysisOutcome, DomainError> {
        let body = self.build_request(rule_set, intent)?;

        let response = self
            .client
            .post_json(&self.completions_url(), self.headers(), &body)
            .await
            .map_err(|e| DomainError::model_call(e.to_string()))?;

        self.parse_response(response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// OpenAI API types

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

// Model-emitted analysis shape, tolerant of omitted optional fields

#[derive(Debug, Deserialize)]
struct ModelAnalysis {
    #[serde(default)]
    violations: Vec<ModelViolation>,
    #[serde(default)]
    recommendations: Vec<ModelRecommendation>,
    #[serde(default = "default_confidence")]
    confidence_score: f32,
}

fn default_confidence() -> f32 {
    0.5
}

#[derive(Debug, Deserialize)]
struct ModelViolation {
    #[serde(default)]
    rule_id: String,
    severity: ViolationSeverity,
    #[serde(default)]
    category: String,
    description: String,
    remediation: Option<String>,
    #[serde(default)]
    risk_score: f32,
}

impl ModelViolation {
    fn into_domain(self) -> Violation {
        Violation {
            rule_id: self.rule_id,
            severity: self.severity,
            category: self.category,
            description: self.description,
            remediation: self.remediation,
            risk_score: self.risk_score.clamp(0.0, 10.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelRecommendation {
    rule_id: Option<String>,
    title: String,
    description: String,
}
