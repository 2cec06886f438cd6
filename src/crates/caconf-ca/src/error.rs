//! # CA 配置错误定义

use ::error::{Error, ErrorCategory, ErrorInfo, ErrorSeverity};
use caconf_credential::CredentialError;
use caconf_policy::PolicyError;

/// CA 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaConfigError {
    /// 需要映射的位置给出了其他类型
    #[error("参数结构错误: {field} 应为{expected}，实际为{actual}")]
    InvalidArgumentShape {
        field: String,
        expected: String,
        actual: String,
    },

    /// 缺少必需选项
    #[error("缺少必需选项: {0}")]
    MissingRequiredOption(String),

    /// 选项存在但类型不对
    #[error("选项 {option} 应为{expected}，实际为{actual}")]
    InvalidOptionType {
        option: String,
        expected: String,
        actual: String,
    },

    /// 签发模板未注册
    #[error("未知的签发模板: {0}")]
    UnknownProfile(String),

    /// 签发模板条目不是模板定义
    #[error("签发模板 {name} 应为映射，实际为{actual}")]
    InvalidProfileType { name: String, actual: String },

    /// 签发模板字段无效
    #[error("签发模板 {name} 无效: {source}")]
    Profile { name: String, source: PolicyError },

    /// 凭据加载失败
    #[error("{option} 加载失败: {source}")]
    Credential {
        option: String,
        source: CredentialError,
    },

    /// 配置文档无法解析或导出
    #[error("配置文档错误: {0}")]
    Document(String),

    /// 读取配置文档失败
    #[error("读取配置文档 {path} 失败: {reason}")]
    Io { path: String, reason: String },
}

impl CaConfigError {
    pub(crate) fn credential(option: &str) -> impl FnOnce(CredentialError) -> Self + '_ {
        move |source| CaConfigError::Credential {
            option: option.to_string(),
            source,
        }
    }

    pub(crate) fn option_type(option: &str, expected: &str, actual: impl Into<String>) -> Self {
        CaConfigError::InvalidOptionType {
            option: option.to_string(),
            expected: expected.to_string(),
            actual: actual.into(),
        }
    }

    /// 凭据加载失败时的底层原因
    pub fn credential_source(&self) -> Option<&CredentialError> {
        match self {
            CaConfigError::Credential { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CaConfigError> for ErrorInfo {
    fn from(err: CaConfigError) -> Self {
        let (code, category) = match &err {
            CaConfigError::InvalidArgumentShape { .. } => (7201, ErrorCategory::Configuration),
            CaConfigError::MissingRequiredOption(_) => (7202, ErrorCategory::Configuration),
            CaConfigError::InvalidOptionType { .. } => (7203, ErrorCategory::Configuration),
            CaConfigError::UnknownProfile(_) => (7204, ErrorCategory::Validation),
            CaConfigError::InvalidProfileType { .. } => (7205, ErrorCategory::Configuration),
            CaConfigError::Profile { name, source } => {
                return ErrorInfo::from(source.clone()).with_context(format!("签发模板 {}", name));
            }
            CaConfigError::Credential { option, source } => {
                return ErrorInfo::from(source.clone()).with_context(format!("选项 {}", option));
            }
            CaConfigError::Document(_) => (7206, ErrorCategory::Parse),
            CaConfigError::Io { .. } => (7207, ErrorCategory::Io),
        };

        ErrorInfo::from_kind(code, &err)
            .with_category(category)
            .with_severity(ErrorSeverity::Error)
    }
}
