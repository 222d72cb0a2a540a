//! # Record：可合并的存储记录
//!
//! ## 核心意图（Why）
//! - 协调存储中的每个节点保存一条记录：`id`、简单字段、映射字段与列表字段；
//! - 状态更新、错误轨迹这类诊断数据依赖 “合并写入”：新条目与旧条目并存，旧条目永不被删除。
//!
//! ## 合并语义（What）
//! - 简单字段：按键合并，传入值覆盖同名旧值；
//! - 映射字段：按条目 ID 合并；同一条目 ID 的子映射做并集，旧子映射中未被提及的键保留；
//! - 列表字段：追加；
//! - `id` 保持目标记录原值。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 可合并记录。
///
/// 映射字段使用 `BTreeMap`，读取方按键顺序遍历即可得到条目 ID 的字典序。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    id: String,
    #[serde(default)]
    simple_fields: BTreeMap<String, String>,
    #[serde(default)]
    map_fields: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    list_fields: BTreeMap<String, Vec<String>>,
}

impl Record {
    /// 创建空记录。
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn simple_fields(&self) -> &BTreeMap<String, String> {
        &self.simple_fields
    }

    pub fn map_fields(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.map_fields
    }

    pub fn list_fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.list_fields
    }

    pub fn simple_field(&self, key: &str) -> Option<&str> {
        self.simple_fields.get(key).map(String::as_str)
    }

    pub fn map_field(&self, key: &str) -> Option<&BTreeMap<String, String>> {
        self.map_fields.get(key)
    }

    pub fn set_simple_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.simple_fields.insert(key.into(), value.into());
    }

    /// 设置（替换）一个映射条目。
    pub fn set_map_field(&mut self, key: impl Into<String>, value: BTreeMap<String, String>) {
        self.map_fields.insert(key.into(), value);
    }

    pub fn push_list_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.list_fields.entry(key.into()).or_default().push(value.into());
    }

    /// 是否不含任何字段。
    pub fn is_empty(&self) -> bool {
        self.simple_fields.is_empty() && self.map_fields.is_empty() && self.list_fields.is_empty()
    }

    /// 将 `other` 合并进当前记录。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：多线程、多进程对同一路径的诊断写入必须是加法式的；
    /// - **契约 (What)**：合并后当前记录包含双方全部条目 ID；同名条目的子映射做并集；
    /// - **风险 (Trade-offs)**：同名简单字段与同名子映射键以传入值为准，调用方应保证条目 ID 唯一。
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in &other.simple_fields {
            self.simple_fields.insert(key.clone(), value.clone());
        }
        for (entry_id, content) in &other.map_fields {
            let slot = self.map_fields.entry(entry_id.clone()).or_default();
            for (key, value) in content {
                slot.insert(key.clone(), value.clone());
            }
        }
        for (key, values) in &other.list_fields {
            self.list_fields
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }
}
