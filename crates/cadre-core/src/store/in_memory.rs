use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::property::{PropertyScope, PropertyType};
use crate::record::Record;

use super::CoordinationStore;

/// 一次已生效的合并写入。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreWrite {
    pub scope: PropertyScope,
    pub property: PropertyType,
    pub path: String,
    pub record: Record,
}

/// 注入的写入故障。`property` 为 `None` 时对所有属性生效。
#[derive(Clone, Debug)]
struct Fault {
    property: Option<PropertyType>,
    error: StoreError,
}

/// 基于内存的协调存储，便于测试与进程内嵌入。
///
/// # 教案式说明
/// - **意图 (Why)**：在不启动真实存储的前提下复现合并写入语义，并允许测试观察每次写入与模拟故障；
/// - **逻辑 (How)**：以完整路径为键保存 [`Record`]；写入通过 `DashMap::entry` 在分片锁内完成
///   “读取-合并-回写”，同一路径的并发写入因此不会丢条目；
/// - **契约 (What)**：
///   - 成功写入追加到写入日志，可通过 [`InMemoryCoordinationStore::writes`] 读取；
///   - [`fail_with`](Self::fail_with) / [`fail_property_with`](Self::fail_property_with) 注入的故障
///     持续生效，直到 [`heal`](Self::heal)；失败的写入不修改任何记录，也不进入写入日志。
#[derive(Debug)]
pub struct InMemoryCoordinationStore {
    cluster: String,
    records: DashMap<String, Record>,
    journal: Mutex<Vec<StoreWrite>>,
    fault: Mutex<Option<Fault>>,
}

impl InMemoryCoordinationStore {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            records: DashMap::new(),
            journal: Mutex::new(Vec::new()),
            fault: Mutex::new(None),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// 读取指定路径当前记录的副本。
    pub fn record(&self, path: &str) -> Option<Record> {
        self.records.get(path).map(|entry| entry.value().clone())
    }

    /// 控制器作用域下某属性节点的记录。
    pub fn controller_record(&self, property: PropertyType, sub_path: &str) -> Option<Record> {
        self.record(&PropertyScope::Controller.path(&self.cluster, property, sub_path, ""))
    }

    /// 成员作用域下某属性节点的记录。
    pub fn member_record(
        &self,
        member: &str,
        property: PropertyType,
        sub_path: &str,
        entry_key: &str,
    ) -> Option<Record> {
        let scope = PropertyScope::Member(member.to_owned());
        self.record(&scope.path(&self.cluster, property, sub_path, entry_key))
    }

    /// 已存在记录的全部路径（字典序）。
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.records.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// 成功写入的日志副本，按生效顺序排列。
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.journal.lock().clone()
    }

    /// 令后续所有写入返回 `error`。
    pub fn fail_with(&self, error: StoreError) {
        *self.fault.lock() = Some(Fault {
            property: None,
            error,
        });
    }

    /// 仅令指定属性的写入返回 `error`。
    pub fn fail_property_with(&self, property: PropertyType, error: StoreError) {
        *self.fault.lock() = Some(Fault {
            property: Some(property),
            error,
        });
    }

    /// 清除注入的故障。
    pub fn heal(&self) {
        *self.fault.lock() = None;
    }

    fn apply(
        &self,
        scope: PropertyScope,
        property: PropertyType,
        sub_path: &str,
        entry_key: &str,
        record: &Record,
    ) -> Result<(), StoreError> {
        if let Some(fault) = self.fault.lock().as_ref()
            && fault.property.is_none_or(|p| p == property)
        {
            return Err(fault.error.clone());
        }

        let path = scope.path(&self.cluster, property, sub_path, entry_key);
        self.records
            .entry(path.clone())
            .and_modify(|stored| stored.merge(record))
            .or_insert_with(|| {
                let mut fresh = Record::new(record.id());
                fresh.merge(record);
                fresh
            });
        tracing::trace!(%path, entries = record.map_fields().len(), "merged record");

        self.journal.lock().push(StoreWrite {
            scope,
            property,
            path,
            record: record.clone(),
        });
        Ok(())
    }
}

impl CoordinationStore for InMemoryCoordinationStore {
    fn merge_controller_property(
        &self,
        property: PropertyType,
        sub_path: &str,
        record: &Record,
    ) -> Result<(), StoreError> {
        self.apply(PropertyScope::Controller, property, sub_path, "", record)
    }

    fn merge_member_property(
        &self,
        member: &str,
        property: PropertyType,
        sub_path: &str,
        entry_key: &str,
        record: &Record,
    ) -> Result<(), StoreError> {
        self.apply(
            PropertyScope::Member(member.to_owned()),
            property,
            sub_path,
            entry_key,
            record,
        )
    }
}
