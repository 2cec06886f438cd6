//! # Error 派生宏集成测试
//!
//! 测试 `#[derive(Error)]` 宏在配置加载类错误上的使用

use error::{Error, ErrorInfo, ErrorKind};

/// 单元变体
#[derive(Debug, Error)]
enum RootError {
    #[error("根目录不可用")]
    Unavailable,

    #[error("根目录不是目录")]
    NotDirectory,
}

#[test]
fn test_unit_variants() {
    let err = RootError::Unavailable;
    assert_eq!(format!("{}", err), "根目录不可用");
    assert_eq!(err.error_code(), 1);
    assert_eq!(err.error_message(), "根目录不可用");

    assert_eq!(RootError::NotDirectory.error_code(), 2);
}

/// 元组变体
#[derive(Debug, Error)]
#[allow(dead_code)]
enum OptionError {
    #[error("缺少必需选项: {0}")]
    Missing(String),

    #[error("选项 {0} 类型错误，期望 {1}")]
    WrongType(String, String),

    #[error("选项冲突")]
    Conflict(String, String),
}

#[test]
fn test_tuple_variants() {
    let err = OptionError::Missing("ca_cert".to_string());
    assert_eq!(format!("{}", err), "缺少必需选项: ca_cert");
    assert_eq!(err.error_code(), 1);

    let err = OptionError::WrongType("crl_validity_hours".to_string(), "整数".to_string());
    assert_eq!(format!("{}", err), "选项 crl_validity_hours 类型错误，期望 整数");
    assert_eq!(err.error_code(), 2);

    let err = OptionError::Conflict("engine".to_string(), "pkcs12".to_string());
    assert_eq!(format!("{}", err), "选项冲突");
    assert_eq!(err.error_code(), 3);
}

/// 结构体变体
#[derive(Debug, Error)]
#[allow(dead_code)]
enum SourceError {
    #[error("凭据来源冲突: {first} 与 {second}")]
    Conflicting { first: String, second: String },

    #[error("{marker} 需要同时提供 {companion}")]
    Companion { marker: String, companion: String },

    #[error("字段 {field} 无效")]
    Field { field: String, reason: String },
}

#[test]
fn test_struct_variants() {
    let err = SourceError::Conflicting {
        first: "engine".to_string(),
        second: "key".to_string(),
    };
    assert_eq!(format!("{}", err), "凭据来源冲突: engine 与 key");
    assert_eq!(err.error_code(), 1);

    let err = SourceError::Companion {
        marker: "engine".to_string(),
        companion: "key_name".to_string(),
    };
    assert_eq!(format!("{}", err), "engine 需要同时提供 key_name");

    let err = SourceError::Field {
        field: "key_usage".to_string(),
        reason: "未使用的字段".to_string(),
    };
    assert_eq!(format!("{}", err), "字段 key_usage 无效");
    assert_eq!(err.error_code(), 3);
}

/// 占位符顺序与字段声明顺序不同
#[derive(Debug, Error)]
enum OrderError {
    #[error("{second} 先于 {first}，再次 {second}")]
    Swapped { first: u32, second: u32 },

    #[error("{1}/{0}")]
    Reversed(u32, u32),
}

#[test]
fn test_placeholder_order() {
    let err = OrderError::Swapped { first: 1, second: 2 };
    assert_eq!(format!("{}", err), "2 先于 1，再次 2");

    let err = OrderError::Reversed(1, 2);
    assert_eq!(format!("{}", err), "2/1");
}

/// 包装其他错误
#[derive(Debug, Error)]
enum OuterError {
    #[error("{0}")]
    Root(RootError),
}

#[test]
fn test_wrapped_error_and_chain() {
    let err = OuterError::Root(RootError::NotDirectory);
    assert_eq!(format!("{}", err), "根目录不是目录");

    let info = ErrorInfo::with_source(7201, "加载CA失败".to_string(), err);
    let source = info.source().expect("应该存在源错误");
    assert_eq!(source.error_message(), "根目录不是目录");
}

#[test]
fn test_std_error_impl() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&RootError::Unavailable);
}
