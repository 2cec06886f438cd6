//! # 证书主题
//!
//! 有序的 (属性名, 值) 序列，属性名使用短格式（如 `CN`、`O`）。
//! 顺序影响输出，不影响成员判断。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 证书主题（类 Distinguished Name 结构）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    items: Vec<(String, String)>,
}

impl Subject {
    /// 创建空主题
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个属性，允许同名属性重复出现
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.items.push((name.into(), value.into()));
        self
    }

    /// 链式追加属性
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// 按原始顺序遍历属性
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// 按原始顺序遍历属性名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(name, _)| name.as_str())
    }

    /// 是否包含指定属性
    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// 第一个同名属性的值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// 属性个数
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 保留满足条件的属性，保持原有相对顺序
    pub(crate) fn retained<F>(&self, mut keep: F) -> Subject
    where
        F: FnMut(&str) -> bool,
    {
        Subject {
            items: self
                .items
                .iter()
                .filter(|(name, _)| keep(name))
                .cloned()
                .collect(),
        }
    }
}

impl<N, V> FromIterator<(N, V)> for Subject
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Subject {
            items: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// 以 OpenSSL 单行格式输出，如 `/CN=example/O=Acme`
impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "/{}={}", name, value)?;
        }
        Ok(())
    }
}
