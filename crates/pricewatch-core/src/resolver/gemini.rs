//! Gemini `generateContent` resolver with Google Search grounding.

use reqwest::{Client, Request, StatusCode};
use serde::{Deserialize, Serialize};

use super::{extract_payload, ProductResolver, ResolvedProduct};
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::models::NOT_AVAILABLE;
use crate::util::compact_text;

/// Prompt asking the model for one JSON object describing both stores.
#[must_use]
pub fn build_prompt(reference_url: &str) -> String {
    format!(
        "Você é um assistente de comparação de preços no Brasil. \
         Use a busca para identificar o produto deste link: {reference_url}\n\
         Encontre o mesmo produto na Amazon Brasil (amazon.com.br) e no Mercado Livre \
         (mercadolivre.com.br) e informe o preço atual à vista em reais.\n\
         Responda SOMENTE com um objeto JSON, sem texto adicional, no formato:\n\
         {{\"name\": \"nome do produto\", \"image_url\": \"URL da imagem ou {na}\", \
         \"stores\": [\
         {{\"store\": \"amazon\", \"price\": \"R$ 1.234,56 ou {na}\", \"url\": \"link do anúncio ou {na}\"}}, \
         {{\"store\": \"mercado_livre\", \"price\": \"R$ 1.234,56 ou {na}\", \"url\": \"link do anúncio ou {na}\"}}]}}\n\
         Use \"{na}\" quando não encontrar o preço ou o link em uma loja. \
         Se não conseguir identificar o produto, responda {{\"error\": \"motivo\"}}.",
        na = NOT_AVAILABLE
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty());

        match (text, self.prompt_feedback.and_then(|f| f.block_reason)) {
            (Some(text), _) => Ok(text),
            (None, Some(reason)) => Err(Error::Resolution(format!(
                "request was blocked by the model ({reason})"
            ))),
            (None, None) => Err(Error::Resolution(
                "model returned an empty response".to_string(),
            )),
        }
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.error.and_then(|error| error.message) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

/// Resolver backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiResolver {
    client: Client,
    config: ResolverConfig,
}

impl GeminiResolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, reference_url: &str) -> Result<Request> {
        let reference_url = reference_url.trim();
        if reference_url.is_empty() {
            return Err(Error::InvalidInput("product URL must not be empty".to_string()));
        }

        let prompt = build_prompt(reference_url);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        Ok(self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .build()?)
    }
}

impl ProductResolver for GeminiResolver {
    async fn resolve(&self, reference_url: &str) -> Result<ResolvedProduct> {
        let request = self.build_request(reference_url)?;
        tracing::debug!("Resolving {} with {}", reference_url, self.config.model);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| Error::Resolution(format!("Gemini request failed: {error}")))?;

        if response.status() == StatusCode::UNAUTHORIZED || response.status() == StatusCode::FORBIDDEN
        {
            return Err(Error::Resolution(format!(
                "Gemini rejected the API key (check {})",
                crate::config::ENV_GEMINI_API_KEY
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Resolution(parse_api_error(status, &body)));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|error| Error::Resolution(format!("Unreadable Gemini response: {error}")))?;
        extract_payload(&payload.into_text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> GeminiResolver {
        GeminiResolver::new(ResolverConfig::new("test-key").unwrap()).unwrap()
    }

    #[test]
    fn request_shape_is_correct() {
        let request = resolver()
            .build_request("https://www.amazon.com.br/dp/B0TEST")
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            request.headers().get("x-goog-api-key").unwrap(),
            "test-key"
        );

        let body = request.body().and_then(|body| body.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert!(json["tools"][0].get("google_search").is_some());
        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("https://www.amazon.com.br/dp/B0TEST"));
    }

    #[test]
    fn empty_url_is_rejected_before_sending() {
        assert!(matches!(
            resolver().build_request("   ").unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn prompt_describes_both_stores_and_sentinel() {
        let prompt = build_prompt("https://example.com/p");
        assert!(prompt.contains("\"amazon\""));
        assert!(prompt.contains("\"mercado_livre\""));
        assert!(prompt.contains("N/A"));
        assert!(prompt.contains("\"error\""));
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blocked_or_empty_response_is_an_error() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(blocked.into_text().unwrap_err().to_string().contains("SAFETY"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn api_error_message_is_extracted() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"code": 400, "message": "API key not valid."}}"#,
        );
        assert_eq!(message, "API key not valid. (400)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_resolution_error() {
        let config = ResolverConfig::from_parts(
            Some("test-key".to_string()),
            None,
            Some("http://127.0.0.1:9".to_string()),
        )
        .unwrap()
        .unwrap();
        let resolver = GeminiResolver::new(config).unwrap();

        let error = resolver
            .resolve("https://www.amazon.com.br/dp/B0TEST")
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Resolution(_)), "got {error:?}");
    }
}
