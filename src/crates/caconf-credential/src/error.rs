//! # 凭据加载错误定义

use ::error::{Error, ErrorCategory, ErrorInfo, ErrorSeverity};

/// 凭据加载错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// 需要映射或字符串的位置给出了其他类型
    #[error("参数结构错误: {field} 应为{expected}，实际为{actual}")]
    InvalidArgumentShape {
        field: String,
        expected: String,
        actual: String,
    },

    /// 两个互斥的凭据来源同时出现
    #[error("凭据来源冲突: {first} 不能与 {second} 同时使用")]
    ConflictingCredentialSource { first: String, second: String },

    /// 凭据来源缺少配套选项
    #[error("{marker} 需要同时提供 {companion}")]
    MissingCredentialCompanion { marker: String, companion: String },

    /// 根目录不存在或不是目录
    #[error("根目录无效: {0}")]
    InvalidRootPath(String),

    /// 读取文件失败
    #[error("读取文件 {path} 失败: {reason}")]
    Io { path: String, reason: String },

    /// 证书无法解析
    #[error("无效的证书: {0}")]
    InvalidCertificate(String),

    /// 私钥无法解析或解密
    #[error("无效的私钥: {0}")]
    InvalidPrivateKey(String),

    /// PKCS#12 文件无法解析或解密
    #[error("无效的 PKCS#12 文件: {0}")]
    InvalidPkcs12(String),

    /// 私钥与证书公钥不一致
    #[error("私钥与证书不匹配: {0}")]
    KeyMismatch(String),

    /// 引用了未注册的密钥引擎
    #[error("未注册的密钥引擎: {0}")]
    UnknownEngine(String),

    /// 密钥引擎无法提供指定密钥
    #[error("密钥引擎 {engine} 加载密钥 {key_name} 失败: {reason}")]
    EngineFailure {
        engine: String,
        key_name: String,
        reason: String,
    },
}

impl CredentialError {
    pub(crate) fn conflict(first: &str, second: &str) -> Self {
        CredentialError::ConflictingCredentialSource {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub(crate) fn companion(marker: &str, companion: &str) -> Self {
        CredentialError::MissingCredentialCompanion {
            marker: marker.to_string(),
            companion: companion.to_string(),
        }
    }
}

impl From<CredentialError> for ErrorInfo {
    fn from(err: CredentialError) -> Self {
        let (code, category, severity) = match &err {
            CredentialError::InvalidArgumentShape { .. } => (7101, ErrorCategory::Configuration, ErrorSeverity::Error),
            CredentialError::ConflictingCredentialSource { .. } => (7102, ErrorCategory::Configuration, ErrorSeverity::Error),
            CredentialError::MissingCredentialCompanion { .. } => (7103, ErrorCategory::Configuration, ErrorSeverity::Error),
            CredentialError::InvalidRootPath(_) => (7104, ErrorCategory::Configuration, ErrorSeverity::Error),
            CredentialError::Io { .. } => (7105, ErrorCategory::Io, ErrorSeverity::Error),
            CredentialError::InvalidCertificate(_) => (7106, ErrorCategory::Parse, ErrorSeverity::Error),
            CredentialError::InvalidPrivateKey(_) => (7107, ErrorCategory::Credential, ErrorSeverity::Error),
            CredentialError::InvalidPkcs12(_) => (7108, ErrorCategory::Credential, ErrorSeverity::Error),
            CredentialError::KeyMismatch(_) => (7109, ErrorCategory::Credential, ErrorSeverity::Critical),
            CredentialError::UnknownEngine(_) => (7110, ErrorCategory::Configuration, ErrorSeverity::Error),
            CredentialError::EngineFailure { .. } => (7111, ErrorCategory::Credential, ErrorSeverity::Error),
        };

        ErrorInfo::from_kind(code, &err)
            .with_category(category)
            .with_severity(severity)
    }
}
