//! # 摘要算法

use crate::error::PolicyError;
use std::fmt;
use std::str::FromStr;

/// 签名使用的消息摘要算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDigest {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Md5,
}

impl MessageDigest {
    /// 未配置 `default_md` 时使用的算法
    pub const DEFAULT: MessageDigest = MessageDigest::Sha256;

    /// 全部支持的算法
    pub const ALL: [MessageDigest; 6] = [
        MessageDigest::Sha1,
        MessageDigest::Sha224,
        MessageDigest::Sha256,
        MessageDigest::Sha384,
        MessageDigest::Sha512,
        MessageDigest::Md5,
    ];

    /// 规范名称（大写）
    pub fn name(&self) -> &'static str {
        match self {
            MessageDigest::Sha1 => "SHA1",
            MessageDigest::Sha224 => "SHA224",
            MessageDigest::Sha256 => "SHA256",
            MessageDigest::Sha384 => "SHA384",
            MessageDigest::Sha512 => "SHA512",
            MessageDigest::Md5 => "MD5",
        }
    }
}

impl Default for MessageDigest {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 不区分大小写，接受 `sha256` 与 `SHA-256` 两种写法
impl FromStr for MessageDigest {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "").to_ascii_uppercase();
        MessageDigest::ALL
            .into_iter()
            .find(|md| md.name() == normalized)
            .ok_or_else(|| PolicyError::UnknownDigest(s.to_string()))
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digest_names() {
        assert_eq!("sha256".parse::<MessageDigest>().unwrap(), MessageDigest::Sha256);
        assert_eq!("SHA-384".parse::<MessageDigest>().unwrap(), MessageDigest::Sha384);
        assert_eq!("md5".parse::<MessageDigest>().unwrap(), MessageDigest::Md5);
        assert_eq!(
            "whirlpool".parse::<MessageDigest>(),
            Err(PolicyError::UnknownDigest("whirlpool".to_string()))
        );
    }

    #[test]
    fn test_default_digest() {
        assert_eq!(MessageDigest::default(), MessageDigest::Sha256);
        assert_eq!(MessageDigest::DEFAULT.to_string(), "SHA256");
    }
}
