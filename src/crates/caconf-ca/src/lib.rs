//! # caconf 证书颁发机构配置
//!
//! 从 YAML 文档加载一个或多个 CA 的配置：
//!
//! - [`CaConfig`]: 签名凭据、可选的 OCSP 委托凭据与证书链、CRL/OCSP 时间参数、签发模板集合
//! - [`CaConfigPool`]: 多个命名 CA 配置
//! - [`LoadOptions`]: 根目录、密钥引擎与模板字段校验规则
//!
//! ## 文档结构
//!
//! ```yaml
//! certificate_authorities:
//!   test_ca:
//!     ca_cert: {cert: ca.pem, key: ca.key}
//!     ocsp_cert: {pkcs12: ocsp.p12, password: secret}
//!     crl_validity_hours: 72
//!     crl_number: crl_number.txt
//!     profiles:
//!       server:
//!         basic_constraints: {ca: false}
//!         extended_key_usage: [serverAuth]
//!         subject_item_policy: {CN: required, O: optional}
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod pool;

pub use config::{
    CaConfig, CaConfigBuilder, CaConfigSummary, DEFAULT_CRL_START_SKEW_SECONDS, DEFAULT_CRL_VALIDITY_HOURS,
    DEFAULT_OCSP_START_SKEW_SECONDS, DEFAULT_OCSP_VALIDITY_HOURS,
};
pub use error::CaConfigError;
pub use loader::{load_profile, LoadOptions};
pub use pool::CaConfigPool;

/// CA 配置结果类型
pub type CaResult<T> = std::result::Result<T, CaConfigError>;
