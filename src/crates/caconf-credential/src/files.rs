//! # 根目录
//!
//! 配置文档中的相对路径统一相对于根目录解析。

use crate::error::CredentialError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 已校验存在的根目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPath {
    root: PathBuf,
}

impl RootPath {
    /// 根目录必须存在且是目录
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(CredentialError::InvalidRootPath(path.display().to_string()));
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// 以当前工作目录为根
    pub fn current_dir() -> Result<Self, CredentialError> {
        let cwd = std::env::current_dir()
            .map_err(|e| CredentialError::InvalidRootPath(format!("无法获取当前目录: {}", e)))?;
        Self::new(cwd)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// 解析路径，绝对路径原样返回
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// 读取文件全部内容
    pub fn read(&self, path: &str) -> Result<Vec<u8>, CredentialError> {
        let full = self.resolve(path);
        debug!("读取文件: {}", full.display());
        fs::read(&full).map_err(|e| CredentialError::Io {
            path: full.display().to_string(),
            reason: e.to_string(),
        })
    }
}
