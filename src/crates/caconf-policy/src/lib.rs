//! # caconf 签发策略模型
//!
//! 定义证书请求在签发前必须满足的规则：
//!
//! - **主题字段策略** ([`SubjectItemPolicy`]): 声明必需/可选的主题属性，校验并过滤请求主题
//! - **签发模板** ([`CertProfile`]): 扩展项设置、摘要算法与主题字段策略的不可变组合
//! - **字段校验** ([`FieldValidators`]): 每类模板字段一个校验方法，可替换
//!
//! ## 使用示例
//!
//! ```rust
//! use caconf_policy::{CertProfile, Subject};
//!
//! let document = serde_yaml::from_str(r#"
//! basic_constraints: {ca: false}
//! key_usage: [digitalSignature, keyEncipherment]
//! extended_key_usage: [serverAuth]
//! subject_item_policy:
//!   CN: required
//!   O: optional
//! "#).unwrap();
//!
//! let profile = CertProfile::from_document(&document).unwrap();
//! let policy = profile.subject_item_policy().unwrap();
//!
//! let requested = Subject::new().with("CN", "www.example.com").with("L", "City");
//! let issued = policy.validate_subject(&requested).unwrap();
//! assert_eq!(issued.to_string(), "/CN=www.example.com");
//! ```

pub mod digest;
pub mod error;
pub mod extensions;
pub mod profile;
pub mod subject;
pub mod subject_policy;
pub mod validators;
pub mod value;

pub use digest::MessageDigest;
pub use error::PolicyError;
pub use extensions::{
    BasicConstraints, GeneralName, GeneralNameType, NameConstraints, PolicyConstraints,
    PolicyInformation, UserNotice,
};
pub use profile::{CertProfile, CertProfileBuilder};
pub use subject::Subject;
pub use subject_policy::{ItemRequirement, SubjectItemPolicy};
pub use validators::{FieldValidators, StandardValidators};

/// 签发策略模块结果类型
pub type PolicyResult<T> = std::result::Result<T, PolicyError>;
