//! # CA 签名凭据
//!
//! 从配置文档的凭据声明加载证书和私钥。支持三种来源：
//!
//! - `engine` + `key_name` + `cert`：私钥由已注册的密钥引擎提供
//! - `pkcs12` (+ `password`)：证书与私钥同在一个 PKCS#12 文件
//! - `cert` (+ `key` + `password`)：独立的 PEM 文件，省略 `key` 时只有证书
//!
//! 文件路径相对于 [`RootPath`] 解析。

pub mod certificate;
pub mod credential;
pub mod engine;
pub mod error;
pub mod files;
pub mod key;
pub mod pkcs12;
pub mod source;

pub use certificate::Certificate;
pub use credential::Credential;
pub use engine::{DirectoryEngine, EngineRegistry, KeyEngine};
pub use error::CredentialError;
pub use files::RootPath;
pub use key::{KeyOrigin, PrivateKey};
pub use source::{load_credential, CredentialSource};

/// 凭据加载结果
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;
