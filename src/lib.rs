//! # caconf - 证书颁发机构配置层
//!
//! 为签发引擎提供经过校验的 CA 配置：签名凭据、OCSP/CRL 参数、
//! 签发模板与主题字段策略。所有对象在加载时一次性校验，之后只读。
//!
//! ## 模块架构
//!
//! ```text
//! caconf/
//! ├── src/
//! │   ├── main.rs         # 命令行入口
//! │   ├── lib.rs          # 库入口
//! │   └── crates/
//! │       ├── error/              # 错误处理框架
//! │       ├── error-derive/       # 错误派生宏
//! │       ├── caconf-policy/      # 签发模板、主题字段策略、字段校验
//! │       ├── caconf-credential/  # 证书/私钥加载、密钥引擎、PKCS#12
//! │       └── caconf-ca/          # CA 配置、文档加载、配置池
//! ```
//!
//! ## 使用示例
//!
//! ```no_run
//! use caconf::{CaConfigPool, LoadOptions, Subject};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = LoadOptions::new().with_root_path("/etc/caconf");
//!     let pool = CaConfigPool::from_yaml_file("certificate_authorities", "/etc/caconf/caconf.yaml", &options)?;
//!
//!     let ca = pool.get("root_ca").ok_or("root_ca 不存在")?;
//!     let profile = ca.profile("server")?;
//!     if let Some(policy) = profile.subject_item_policy() {
//!         let subject = policy.validate_subject(&Subject::new().with("CN", "www.example.com"))?;
//!         println!("签发主题: {}", subject);
//!     }
//!     Ok(())
//! }
//! ```

pub use caconf_ca::{
    load_profile, CaConfig, CaConfigBuilder, CaConfigError, CaConfigPool, CaConfigSummary, LoadOptions,
    DEFAULT_CRL_START_SKEW_SECONDS, DEFAULT_CRL_VALIDITY_HOURS, DEFAULT_OCSP_START_SKEW_SECONDS,
    DEFAULT_OCSP_VALIDITY_HOURS,
};
pub use caconf_credential::{
    Certificate, Credential, CredentialError, CredentialSource, DirectoryEngine, EngineRegistry, KeyEngine,
    KeyOrigin, PrivateKey, RootPath,
};
pub use caconf_policy::{
    BasicConstraints, CertProfile, CertProfileBuilder, FieldValidators, GeneralName, GeneralNameType,
    ItemRequirement, MessageDigest, NameConstraints, PolicyConstraints, PolicyError, PolicyInformation,
    StandardValidators, Subject, SubjectItemPolicy, UserNotice,
};
pub use error::{ErrorCategory, ErrorInfo, ErrorKind, ErrorSeverity};

/// 配置池默认的顶层条目名
pub const DEFAULT_POOL_ENTRY: &str = "certificate_authorities";
