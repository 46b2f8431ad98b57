use serde::{Deserialize, Serialize};

/// Request/response bodies mirror the backend DTOs field for field.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefactorRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateTestsRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_framework: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
    pub line_count: u64,
    pub character_count: u64,
    pub provider: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefactorResponse {
    pub refactored_code: String,
    pub explanation: String,
    #[serde(default)]
    pub improvements: Vec<String>,
    pub line_count: u64,
    pub character_count: u64,
    pub provider: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateTestsResponse {
    pub test_code: String,
    pub test_framework: String,
    #[serde(default)]
    pub test_cases: Vec<String>,
    #[serde(default)]
    pub setup_instructions: Option<String>,
    pub line_count: u64,
    pub character_count: u64,
    pub provider: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub api_version: String,
    pub ai_provider: String,
    pub environment: String,
    pub timestamp: String,
}

/// Legacy liveness probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PingResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
