//! Report client errors.

use thiserror::Error;

/// Errors from a single upstream attempt or from client setup.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Upstream answered with a non-success status.
    #[error("API请求失败 ({status}): {reason}. 详情: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// Upstream answered 2xx without usable content.
    #[error("API返回格式错误: 未找到有效的回复内容")]
    MissingContent,

    /// Response body was not valid JSON.
    #[error("响应解析失败: {0}")]
    Decode(String),

    /// Connection or transfer failure.
    #[error("网络请求失败: {0}")]
    Transport(String),

    /// The attempt exceeded its deadline and was cancelled.
    #[error("请求超时（{0}秒）")]
    Timeout(u64),

    /// No API key configured.
    #[error("未配置API密钥")]
    MissingApiKey,

    /// HTTP client could not be constructed.
    #[error("客户端初始化失败: {0}")]
    Setup(String),
}

impl LlmError {
    /// Local configuration problems cannot be fixed by trying again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::MissingApiKey | LlmError::Setup(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout(_))
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Status { .. } => "status",
            LlmError::MissingContent => "missing_content",
            LlmError::Decode(_) => "decode",
            LlmError::Transport(_) => "transport",
            LlmError::Timeout(_) => "timeout",
            LlmError::MissingApiKey => "missing_api_key",
            LlmError::Setup(_) => "setup",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Decode(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}
