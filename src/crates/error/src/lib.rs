//! # 错误处理框架
//!
//! caconf 各模块共用的错误基础设施。各模块定义自己的错误枚举，
//! 通过 `#[derive(Error)]` 获得 `Display` 与 `ErrorKind` 实现，
//! 在模块边界处再转换为统一的 [`ErrorInfo`]，携带稳定错误码、类别与严重程度。
//!
//! ## 使用示例
//!
//! ```rust
//! use error::{Error, ErrorInfo, ErrorCategory, ErrorSeverity};
//!
//! #[derive(Debug, Error)]
//! enum LoadError {
//!     #[error("缺少必需选项: {0}")]
//!     MissingOption(String),
//!
//!     #[error("凭据来源冲突: {first} 与 {second}")]
//!     Conflict { first: String, second: String },
//! }
//!
//! let err = LoadError::MissingOption("ca_cert".to_string());
//! let info = ErrorInfo::from_kind(7201, &err)
//!     .with_category(ErrorCategory::Configuration)
//!     .with_severity(ErrorSeverity::Error);
//! assert_eq!(info.message(), "缺少必需选项: ca_cert");
//! ```

pub use error_derive::Error;

use std::fmt;

/// 错误严重程度
///
/// 配置加载错误通常是 `Error`，会中止启动；
/// 签发时的主题校验失败是 `Warning`，只影响单个请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 调试级别
    Debug = 0,
    /// 信息级别
    Info = 1,
    /// 警告级别：只影响当前请求
    Warning = 2,
    /// 错误级别：当前操作失败
    Error = 3,
    /// 严重级别：无法继续运行
    Critical = 4,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "调试"),
            ErrorSeverity::Info => write!(f, "信息"),
            ErrorSeverity::Warning => write!(f, "警告"),
            ErrorSeverity::Error => write!(f, "错误"),
            ErrorSeverity::Critical => write!(f, "严重"),
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// IO 错误（读取证书、密钥、配置文件）
    Io,
    /// 解析错误（YAML、PEM、DER、PKCS#12）
    Parse,
    /// 字段校验错误
    Validation,
    /// 配置结构错误
    Configuration,
    /// 签名凭据错误
    Credential,
    /// 签发策略错误
    Policy,
    /// 其他错误
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Io => write!(f, "IO错误"),
            ErrorCategory::Parse => write!(f, "解析错误"),
            ErrorCategory::Validation => write!(f, "验证错误"),
            ErrorCategory::Configuration => write!(f, "配置错误"),
            ErrorCategory::Credential => write!(f, "凭据错误"),
            ErrorCategory::Policy => write!(f, "策略错误"),
            ErrorCategory::Other => write!(f, "其他错误"),
        }
    }
}

/// 错误类型的核心trait
///
/// `#[derive(Error)]` 自动实现此trait。
pub trait ErrorKind: fmt::Debug + fmt::Display + Send + Sync {
    /// 获取错误码
    fn error_code(&self) -> u32;

    /// 获取错误消息
    fn error_message(&self) -> String;

    /// 获取错误源
    fn source(&self) -> Option<&(dyn ErrorKind + Send + Sync)> {
        None
    }
}

/// 错误信息结构体
///
/// 封装错误码、消息、上下文、严重程度和类别。
#[derive(Debug)]
pub struct ErrorInfo {
    code: u32,
    message: String,
    source: Option<Box<dyn ErrorKind + Send + Sync>>,
    context: Vec<String>,
    severity: ErrorSeverity,
    category: ErrorCategory,
}

impl Clone for ErrorInfo {
    fn clone(&self) -> Self {
        Self {
            code: self.code,
            message: self.message.clone(),
            source: None, // 源错误不克隆
            context: self.context.clone(),
            severity: self.severity,
            category: self.category,
        }
    }
}

impl PartialEq for ErrorInfo {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.message == other.message
            && self.context == other.context
            && self.severity == other.severity
            && self.category == other.category
    }
}

impl ErrorInfo {
    /// 创建一个新的错误信息
    ///
    /// ```rust
    /// use error::ErrorInfo;
    ///
    /// let error = ErrorInfo::new(7202, "未知的签发模板: server".to_string());
    /// assert_eq!(error.code(), 7202);
    /// ```
    pub fn new(code: u32, message: String) -> Self {
        Self {
            code,
            message,
            source: None,
            context: Vec::new(),
            severity: ErrorSeverity::Error,
            category: ErrorCategory::Other,
        }
    }

    /// 以某个 `ErrorKind` 的消息创建错误信息，使用调用方给定的错误码
    pub fn from_kind<E: ErrorKind + ?Sized>(code: u32, kind: &E) -> Self {
        Self::new(code, kind.error_message())
    }

    /// 创建一个带有源错误的错误信息
    pub fn with_source<E: ErrorKind + 'static>(code: u32, message: String, source: E) -> Self {
        Self {
            code,
            message,
            source: Some(Box::new(source)),
            context: Vec::new(),
            severity: ErrorSeverity::Error,
            category: ErrorCategory::Other,
        }
    }

    /// 添加错误上下文
    pub fn add_context(&mut self, context: String) {
        self.context.push(context);
    }

    /// 链式添加错误上下文
    ///
    /// ```rust
    /// use error::ErrorInfo;
    ///
    /// let error = ErrorInfo::new(7104, "无法读取文件".to_string())
    ///     .with_context("加载 ca_cert".to_string())
    ///     .with_context("加载 CA: root".to_string());
    /// assert_eq!(error.context().len(), 2);
    /// ```
    pub fn with_context(mut self, context: String) -> Self {
        self.context.push(context);
        self
    }

    /// 设置错误严重程度
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// 设置错误类别
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    /// 获取错误码
    pub fn code(&self) -> u32 {
        self.code
    }

    /// 获取错误消息
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取源错误
    pub fn source(&self) -> Option<&(dyn ErrorKind + Send + Sync)> {
        self.source.as_ref().map(|e| e.as_ref())
    }

    /// 获取错误上下文
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// 获取错误严重程度
    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// 判断是否为严重错误
    pub fn is_critical(&self) -> bool {
        self.severity == ErrorSeverity::Critical
    }

    /// 判断是否为警告
    pub fn is_warning(&self) -> bool {
        self.severity == ErrorSeverity::Warning
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}][错误码: {}] {}",
               self.severity, self.category, self.code, self.message)?;

        for ctx in &self.context {
            write!(f, "\n  上下文: {}", ctx)?;
        }

        if let Some(source) = &self.source {
            write!(f, "\n  由以下错误引起: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorInfo {}

impl ErrorKind for ErrorInfo {
    fn error_code(&self) -> u32 {
        self.code
    }

    fn error_message(&self) -> String {
        self.message.clone()
    }

    fn source(&self) -> Option<&(dyn ErrorKind + Send + Sync)> {
        self.source.as_ref().map(|e| e.as_ref())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ErrorInfo>;

impl From<std::io::Error> for ErrorInfo {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => 404,
            std::io::ErrorKind::PermissionDenied => 403,
            std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidData => 400,
            _ => 500,
        };

        ErrorInfo::new(code, err.to_string())
            .with_category(ErrorCategory::Io)
            .with_severity(ErrorSeverity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_new() {
        let error = ErrorInfo::new(7202, "未知的签发模板".to_string());
        assert_eq!(error.code(), 7202);
        assert_eq!(error.message(), "未知的签发模板");
        assert!(error.source().is_none());
        assert_eq!(error.category(), ErrorCategory::Other);
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_info_with_source() {
        let source = ErrorInfo::new(7104, "文件不存在".to_string());
        let error = ErrorInfo::with_source(7201, "加载CA失败".to_string(), source);

        assert_eq!(error.code(), 7201);
        let src = error.source().expect("应该存在源错误");
        assert_eq!(src.error_code(), 7104);
        assert_eq!(src.error_message(), "文件不存在");

        let display = format!("{}", error);
        assert!(display.contains("由以下错误引起"));
        assert!(display.contains("文件不存在"));
    }

    #[test]
    fn test_error_context_display() {
        let mut error = ErrorInfo::new(7104, "无法读取文件".to_string());
        error.add_context("加载 ca_cert".to_string());
        error.add_context("加载 CA: root".to_string());

        assert_eq!(error.context(), ["加载 ca_cert".to_string(), "加载 CA: root".to_string()]);

        let display = format!("{}", error);
        assert!(display.contains("上下文: 加载 ca_cert"));
        assert!(display.contains("上下文: 加载 CA: root"));
    }

    #[test]
    fn test_severity_and_category() {
        let error = ErrorInfo::new(7003, "主题缺少必需字段".to_string())
            .with_category(ErrorCategory::Policy)
            .with_severity(ErrorSeverity::Warning);

        assert!(error.is_warning());
        assert!(!error.is_critical());
        assert!(format!("{}", error).contains("策略错误"));
        assert!(ErrorSeverity::Critical > ErrorSeverity::Warning);
    }

    #[test]
    fn test_clone_drops_source() {
        let source = ErrorInfo::new(1, "源".to_string());
        let error = ErrorInfo::with_source(2, "包装".to_string(), source);
        let cloned = error.clone();
        assert!(cloned.source().is_none());
        assert_eq!(cloned, error);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "ca.pem");
        let error: ErrorInfo = io.into();
        assert_eq!(error.code(), 404);
        assert_eq!(error.category(), ErrorCategory::Io);
    }
}
