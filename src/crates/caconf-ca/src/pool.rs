//! # CA 配置池
//!
//! 一个文档描述多个 CA 时的加载结果。任一 CA 加载失败则整个池加载失败。

use crate::config::CaConfig;
use crate::error::CaConfigError;
use crate::loader::{load_ca, parse_document, read_document, top_level_entry, LoadOptions};
use caconf_policy::value::kind_of;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// 按名称索引的 CA 配置集合
#[derive(Debug, Clone, Default)]
pub struct CaConfigPool {
    configs: HashMap<String, CaConfig>,
}

impl CaConfigPool {
    pub fn new(configs: HashMap<String, CaConfig>) -> Self {
        Self { configs }
    }

    /// 从 YAML 文本中名为 `name` 的顶层条目加载
    pub fn from_yaml(name: &str, yaml: &str, options: &LoadOptions) -> Result<Self, CaConfigError> {
        Self::from_document(name, &parse_document(yaml)?, options)
    }

    /// 从 YAML 文件加载
    pub fn from_yaml_file(name: &str, path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, CaConfigError> {
        Self::from_yaml(name, &read_document(path.as_ref())?, options)
    }

    /// 从已解析的文档加载
    pub fn from_document(name: &str, document: &Value, options: &LoadOptions) -> Result<Self, CaConfigError> {
        let entries = top_level_entry(document, name)?;
        let entries = entries.as_mapping().ok_or_else(|| CaConfigError::InvalidArgumentShape {
            field: name.to_string(),
            expected: "映射".to_string(),
            actual: kind_of(entries).to_string(),
        })?;

        let root = options.root()?;
        let mut configs = HashMap::with_capacity(entries.len());

        for (ca_name, data) in entries {
            let ca_name = ca_name.as_str().ok_or_else(|| CaConfigError::InvalidArgumentShape {
                field: name.to_string(),
                expected: "字符串键".to_string(),
                actual: kind_of(ca_name).to_string(),
            })?;

            info!("加载CA配置: {}", ca_name);
            let config = load_ca(data, &root, options)?;
            configs.insert(ca_name.to_string(), config);
        }

        info!("CA 配置池加载完成，共 {} 个", configs.len());
        Ok(Self { configs })
    }

    /// 全部 CA 名称，按字典序
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.configs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 按名称查找，不存在时返回 `None`
    pub fn get(&self, name: &str) -> Option<&CaConfig> {
        self.configs.get(name)
    }

    /// 全部配置，顺序不定
    pub fn all(&self) -> impl Iterator<Item = &CaConfig> {
        self.configs.values()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// 导出为以 `name` 为顶层条目的文档
    pub fn to_document(&self, name: &str) -> Result<Value, CaConfigError> {
        let mut entries = Mapping::new();
        for ca_name in self.names() {
            if let Some(config) = self.configs.get(ca_name) {
                entries.insert(Value::from(ca_name), config.to_document()?);
            }
        }

        let mut document = Mapping::new();
        document.insert(Value::from(name), Value::Mapping(entries));
        Ok(Value::Mapping(document))
    }

    /// 导出为 YAML 文本
    pub fn to_yaml(&self, name: &str) -> Result<String, CaConfigError> {
        serde_yaml::to_string(&self.to_document(name)?).map_err(|e| CaConfigError::Document(e.to_string()))
    }
}
