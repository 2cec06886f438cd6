//! # 签发策略错误定义

use ::error::{Error, ErrorCategory, ErrorInfo, ErrorSeverity};

/// 签发策略模块错误
///
/// 所有错误都在构造或校验时立即返回，携带出错的字段与取值。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// 需要映射或序列的位置给出了其他类型
    #[error("参数结构错误: {field} 应为{expected}，实际为{actual}")]
    InvalidArgumentShape {
        field: String,
        expected: String,
        actual: String,
    },

    /// 主题字段策略的取值不是 required / optional
    #[error("无效的主题字段策略: {attribute} 的取值 {value} 无效，只允许 required 或 optional")]
    InvalidPolicyDeclaration { attribute: String, value: String },

    /// 主题缺少必需字段；消息列出全部必需字段
    #[error("此签发模板要求提供以下主题字段: {required}")]
    PolicyViolation {
        required: String,
        missing: Vec<String>,
    },

    /// 字段校验器拒绝了输入
    #[error("字段 {field} 无效: {reason}")]
    InvalidField { field: String, reason: String },

    /// 不支持的摘要算法
    #[error("未知的摘要算法: {0}")]
    UnknownDigest(String),

    /// 导出文档时序列化失败
    #[error("序列化签发模板失败: {0}")]
    Serialization(String),
}

impl PolicyError {
    /// 构造字段校验错误
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PolicyError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 构造结构错误
    pub fn shape(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        PolicyError::InvalidArgumentShape {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl From<PolicyError> for ErrorInfo {
    fn from(err: PolicyError) -> Self {
        let (code, category, severity) = match &err {
            PolicyError::InvalidArgumentShape { .. } => (7001, ErrorCategory::Configuration, ErrorSeverity::Error),
            PolicyError::InvalidPolicyDeclaration { .. } => (7002, ErrorCategory::Configuration, ErrorSeverity::Error),
            PolicyError::PolicyViolation { .. } => (7003, ErrorCategory::Policy, ErrorSeverity::Warning),
            PolicyError::InvalidField { .. } => (7004, ErrorCategory::Validation, ErrorSeverity::Error),
            PolicyError::UnknownDigest(_) => (7005, ErrorCategory::Validation, ErrorSeverity::Error),
            PolicyError::Serialization(_) => (7006, ErrorCategory::Parse, ErrorSeverity::Error),
        };

        ErrorInfo::from_kind(code, &err)
            .with_category(category)
            .with_severity(severity)
    }
}
