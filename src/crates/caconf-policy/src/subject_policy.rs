//! # 主题字段策略
//!
//! 声明签发模板要求（required）和允许（optional）的主题属性，
//! 并据此校验、过滤请求中的主题。

use crate::error::PolicyError;
use crate::subject::Subject;
use crate::value::{expect_mapping, key_str, kind_of};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// 单个主题属性的要求级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRequirement {
    /// 必须出现
    Required,
    /// 可以出现
    Optional,
}

impl ItemRequirement {
    /// 文档中的标记值
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemRequirement::Required => "required",
            ItemRequirement::Optional => "optional",
        }
    }
}

impl FromStr for ItemRequirement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(ItemRequirement::Required),
            "optional" => Ok(ItemRequirement::Optional),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ItemRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 主题字段策略
///
/// 构造后不可变。`required` 与 `optional` 保留声明顺序，不去重。
/// 同时出现在两个列表中的属性按 required 处理。
///
/// ```rust
/// use caconf_policy::{Subject, SubjectItemPolicy};
///
/// let policy = SubjectItemPolicy::from_pairs([("CN", "required"), ("O", "optional")]).unwrap();
/// let subject = Subject::new().with("CN", "example").with("L", "city");
/// let filtered = policy.validate_subject(&subject).unwrap();
/// assert_eq!(filtered.to_string(), "/CN=example");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectItemPolicy {
    required: Vec<String>,
    optional: Vec<String>,
}

impl SubjectItemPolicy {
    /// 从文档中的声明映射构造（属性名 → `required` | `optional`）
    pub fn from_declaration(value: &Value) -> Result<Self, PolicyError> {
        let map = expect_mapping("subject_item_policy", value)?;
        Self::from_mapping(map)
    }

    /// 从声明映射构造
    pub fn from_mapping(map: &Mapping) -> Result<Self, PolicyError> {
        let mut policy = SubjectItemPolicy::default();

        for (key, marker) in map {
            let attribute = key_str("subject_item_policy", key)?;
            let requirement = marker
                .as_str()
                .and_then(|s| s.parse::<ItemRequirement>().ok())
                .ok_or_else(|| PolicyError::InvalidPolicyDeclaration {
                    attribute: attribute.to_string(),
                    value: describe_marker(marker),
                })?;
            policy.push(attribute, requirement);
        }

        debug!(
            "主题字段策略: required={:?}, optional={:?}",
            policy.required, policy.optional
        );
        Ok(policy)
    }

    /// 从 (属性名, 标记) 对构造，标记只能是 `required` 或 `optional`
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut policy = SubjectItemPolicy::default();
        for (attribute, marker) in pairs {
            let attribute = attribute.into();
            let requirement = marker.as_ref().parse::<ItemRequirement>().map_err(|_| {
                PolicyError::InvalidPolicyDeclaration {
                    attribute: attribute.clone(),
                    value: marker.as_ref().to_string(),
                }
            })?;
            policy.push(attribute, requirement);
        }
        Ok(policy)
    }

    fn push(&mut self, attribute: impl Into<String>, requirement: ItemRequirement) {
        match requirement {
            ItemRequirement::Required => self.required.push(attribute.into()),
            ItemRequirement::Optional => self.optional.push(attribute.into()),
        }
    }

    /// 必需属性，按声明顺序
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// 可选属性，按声明顺序
    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// 属性在本策略下的要求级别；未声明的属性返回 `None`
    pub fn requirement(&self, attribute: &str) -> Option<ItemRequirement> {
        if self.required.iter().any(|a| a == attribute) {
            Some(ItemRequirement::Required)
        } else if self.optional.iter().any(|a| a == attribute) {
            Some(ItemRequirement::Optional)
        } else {
            None
        }
    }

    /// 校验并过滤主题
    ///
    /// 缺少任一必需属性时返回 [`PolicyError::PolicyViolation`]，消息列出全部必需属性。
    /// 成功时返回只含已声明属性的新主题，保持原有相对顺序；未声明的属性被静默丢弃。
    pub fn validate_subject(&self, subject: &Subject) -> Result<Subject, PolicyError> {
        let present: HashSet<&str> = subject.names().collect();

        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !present.contains(name.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            warn!("主题 {} 缺少必需字段: {}", subject, missing.join(", "));
            return Err(PolicyError::PolicyViolation {
                required: self.required.join(", "),
                missing,
            });
        }

        let allowed: HashSet<&str> = self
            .required
            .iter()
            .chain(self.optional.iter())
            .map(String::as_str)
            .collect();

        Ok(subject.retained(|name| allowed.contains(name)))
    }

    /// 导出为声明映射（先 required 后 optional）
    pub fn to_document(&self) -> Value {
        let mut map = Mapping::new();
        for attribute in &self.required {
            map.insert(Value::from(attribute.as_str()), Value::from(ItemRequirement::Required.as_str()));
        }
        for attribute in &self.optional {
            if !map.contains_key(attribute.as_str()) {
                map.insert(Value::from(attribute.as_str()), Value::from(ItemRequirement::Optional.as_str()));
            }
        }
        Value::Mapping(map)
    }
}

fn describe_marker(marker: &Value) -> String {
    match marker {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => format!("<{}>", kind_of(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(yaml: &str) -> Result<SubjectItemPolicy, PolicyError> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        SubjectItemPolicy::from_declaration(&value)
    }

    #[test]
    fn test_declaration_order_preserved() {
        let policy = policy("CN: required\nO: optional\nOU: optional\nL: required").unwrap();
        assert_eq!(policy.required(), ["CN", "L"]);
        assert_eq!(policy.optional(), ["O", "OU"]);
        assert_eq!(policy.requirement("L"), Some(ItemRequirement::Required));
        assert_eq!(policy.requirement("ST"), None);
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let err = policy("CN: required\nO: mandatory").unwrap_err();
        assert_eq!(
            err,
            PolicyError::InvalidPolicyDeclaration {
                attribute: "O".to_string(),
                value: "mandatory".to_string(),
            }
        );

        assert!(matches!(
            policy("CN: true"),
            Err(PolicyError::InvalidPolicyDeclaration { .. })
        ));
    }

    #[test]
    fn test_non_mapping_rejected() {
        assert!(matches!(
            policy("[CN, O]"),
            Err(PolicyError::InvalidArgumentShape { .. })
        ));
        assert!(matches!(
            policy("just-a-string"),
            Err(PolicyError::InvalidArgumentShape { .. })
        ));
    }

    #[test]
    fn test_empty_declaration() {
        let policy = policy("{}").unwrap();
        assert!(policy.required().is_empty());
        assert!(policy.optional().is_empty());

        let subject = Subject::new().with("CN", "a");
        assert!(policy.validate_subject(&subject).unwrap().is_empty());
    }

    #[test]
    fn test_required_checked_by_presence_only() {
        let policy = SubjectItemPolicy::from_pairs([("OU", "required")]).unwrap();
        let subject = Subject::new().with("OU", "a").with("OU", "b").with("CN", "x");
        let filtered = policy.validate_subject(&subject).unwrap();
        assert_eq!(filtered.to_string(), "/OU=a/OU=b");
    }

    #[test]
    fn test_violation_lists_all_required() {
        let policy = SubjectItemPolicy::from_pairs([("CN", "required"), ("O", "required")]).unwrap();
        let subject = Subject::new().with("CN", "example");

        match policy.validate_subject(&subject) {
            Err(PolicyError::PolicyViolation { required, missing }) => {
                assert_eq!(required, "CN, O");
                assert_eq!(missing, ["O"]);
            }
            other => panic!("期望 PolicyViolation，实际为 {:?}", other),
        }
    }

    #[test]
    fn test_to_document_reloads() {
        let original = policy("CN: required\nO: optional").unwrap();
        let reloaded = SubjectItemPolicy::from_declaration(&original.to_document()).unwrap();
        assert_eq!(original, reloaded);
    }
}
