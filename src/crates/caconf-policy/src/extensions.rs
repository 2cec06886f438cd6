//! # 扩展项取值类型
//!
//! 字段校验器的输出类型。序列化形式与配置文档中的写法一致，
//! 导出后可以被重新加载。

use serde::Serialize;
use std::fmt;

/// 基本约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BasicConstraints {
    /// 是否为CA证书
    pub ca: bool,

    /// 路径长度限制，仅CA证书可设置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_length: Option<u32>,
}

/// 证书策略条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyInformation {
    /// 策略OID
    pub policy_identifier: String,

    /// CPS 地址
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cps_uris: Vec<String>,

    /// 用户声明
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_notices: Vec<UserNotice>,
}

/// 用户声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_text: Option<String>,

    /// 与 `notice_numbers` 成对出现
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notice_numbers: Vec<u32>,
}

/// 策略约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_explicit_policy: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inhibit_policy_mapping: Option<u32>,
}

/// 名称约束
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameConstraints {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permitted: Vec<GeneralName>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<GeneralName>,
}

/// 名称约束中的通用名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralName {
    #[serde(rename = "type")]
    pub kind: GeneralNameType,
    pub value: String,
}

/// 通用名称类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneralNameType {
    #[serde(rename = "DNS")]
    Dns,
    #[serde(rename = "IP")]
    Ip,
    #[serde(rename = "URI")]
    Uri,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "dirName")]
    DirName,
}

impl GeneralNameType {
    /// 文档中的类型名
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneralNameType::Dns => "DNS",
            GeneralNameType::Ip => "IP",
            GeneralNameType::Uri => "URI",
            GeneralNameType::Email => "email",
            GeneralNameType::DirName => "dirName",
        }
    }

    /// 按文档中的类型名解析
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "DNS" => Some(GeneralNameType::Dns),
            "IP" => Some(GeneralNameType::Ip),
            "URI" => Some(GeneralNameType::Uri),
            "email" => Some(GeneralNameType::Email),
            "dirName" => Some(GeneralNameType::DirName),
            _ => None,
        }
    }
}

impl fmt::Display for GeneralNameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 合法的密钥用途名称
pub const KEY_USAGE_NAMES: [&str; 9] = [
    "digitalSignature",
    "nonRepudiation",
    "keyEncipherment",
    "dataEncipherment",
    "keyAgreement",
    "keyCertSign",
    "cRLSign",
    "encipherOnly",
    "decipherOnly",
];

/// 可用短名称表示的扩展密钥用途，其他用途需写成点分OID
pub const EXTENDED_KEY_USAGE_NAMES: [&str; 7] = [
    "serverAuth",
    "clientAuth",
    "codeSigning",
    "emailProtection",
    "OCSPSigning",
    "timeStamping",
    "anyExtendedKeyUsage",
];
