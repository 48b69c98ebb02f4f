//! 编制表：UnitId -> 子单元
//!
//! 进程启动时构建一次，之后只读，由构造函数注入各层（测试可替换为替身单元）。

use std::sync::Arc;

use crate::core::MissionError;
use crate::hierarchy::unit::Unit;
use crate::hierarchy::unit_id::UnitId;

#[derive(Clone)]
pub struct RosterEntry {
    pub id: UnitId,
    pub specialty: String,
    pub unit: Arc<dyn Unit>,
}

/// 某一层的下级编制（保持插入顺序，prompt 按此顺序列出）
#[derive(Clone)]
pub struct Roster {
    owner: String,
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: Vec::new(),
        }
    }

    /// 加入下级；同一 id 再次加入时替换
    pub fn with(mut self, id: UnitId, unit: Arc<dyn Unit>) -> Self {
        self.insert(id, id.specialty(), unit);
        self
    }

    fn insert(&mut self, id: UnitId, specialty: &str, unit: Arc<dyn Unit>) {
        let entry = RosterEntry {
            id,
            specialty: specialty.to_string(),
            unit,
        };
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// 所属单元名（层内日志以此标识本层）
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, id: UnitId) -> Option<Arc<dyn Unit>> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| Arc::clone(&e.unit))
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 路由节点使用：把 responsible_unit 解析为本层的子单元
    pub fn resolve(&self, raw: &str) -> Result<(UnitId, Arc<dyn Unit>), MissionError> {
        raw.parse::<UnitId>()
            .ok()
            .and_then(|id| self.get(id).map(|unit| (id, unit)))
            .ok_or_else(|| MissionError::UnknownUnit(raw.to_string()))
    }
}
