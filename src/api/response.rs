//! API response types

use serde::{Deserialize, Serialize};

use crate::error::{CfmError, Result};

/// Standard Cloudflare API response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

impl<T> ApiResponse<T> {
    /// The `result` payload; a successful envelope without one is an error
    pub fn into_result(self) -> Result<T> {
        self.result.ok_or_else(|| CfmError::Api {
            status: 200,
            message: "response carried no result".to_string(),
        })
    }

    /// All envelope errors as one line, e.g. `1003: Invalid zone, 1004: ...`
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "request was not successful".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// API error
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

/// API message
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub code: Option<i32>,
    pub message: String,
}

/// Pagination info
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultInfo {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub count: Option<u32>,
    pub total_count: Option<u32>,
}
