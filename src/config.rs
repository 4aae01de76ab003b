//! 配置模块，负责加载JSON表名配置
//!
//! 生成的SQL片段里引用的表名可以通过JSON文件覆盖，默认使用 `issues` 和
//! `deliverables`。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 表名配置错误
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "配置错误: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// 表名配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// 主记录（issue）所在的表
    #[serde(default = "default_issues_table")]
    pub issues: String,
    /// 中间实体（deliverable）所在的表
    #[serde(default = "default_deliverables_table")]
    pub deliverables: String,
}

fn default_issues_table() -> String {
    "issues".to_string()
}

fn default_deliverables_table() -> String {
    "deliverables".to_string()
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            issues: default_issues_table(),
            deliverables: default_deliverables_table(),
        }
    }
}

impl TableConfig {
    /// 从JSON文件加载表名配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::new(format!(
                "配置文件不存在: {}",
                path_ref.display()
            )));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|e| {
            ConfigError::new(format!("无法读取配置文件 {}: {}", path_ref.display(), e))
        })?;

        // 解析JSON
        let config: TableConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::new(format!("无法解析JSON配置文件 {}: {}", path_ref.display(), e))
        })?;

        Ok(config)
    }
}
