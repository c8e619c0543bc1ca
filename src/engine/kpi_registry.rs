// ==========================================
// 绩效监测平台 - KPI 注册表
// ==========================================
// 职责: KPI 定义集合的增删改查与派生统计
// 红线: id 全局唯一、只增不复用; 注册表本身不做输入校验
// 顺序: 插入顺序即展示顺序
// ==========================================

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::kpi::{Kpi, KpiFields};
use crate::domain::types::KpiRole;

/// 注册表错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("KPI不存在: id={id}")]
    NotFound { id: i64 },

    #[error("KPI ID重复: id={id}")]
    DuplicateId { id: i64 },

    #[error("KPI ID已耗尽: 已分配最大ID={high_water}")]
    IdExhausted { high_water: i64 },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

// ==========================================
// KpiSummary - 派生统计（按需计算，不存储）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_count: usize,    // KPI 总数
    pub category_count: usize, // 不同类别数
    pub total_weight: i64,     // 权重原始合计（不归一化）
}

// ==========================================
// KpiRegistry - KPI 注册表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct KpiRegistry {
    kpis: Vec<Kpi>,
    // 已分配过的最大ID
    high_water: i64,
}

impl KpiRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 从快照构建注册表（保持快照顺序）
    ///
    /// # 返回
    /// - Err(DuplicateId): 快照中存在重复ID
    pub fn from_kpis(kpis: Vec<Kpi>) -> RegistryResult<Self> {
        let mut registry = Self::new();
        registry.replace_all(kpis)?;
        Ok(registry)
    }

    /// 用快照整体替换当前集合
    ///
    /// 失败时当前集合保持不变
    pub fn replace_all(&mut self, kpis: Vec<Kpi>) -> RegistryResult<()> {
        let mut seen = HashSet::with_capacity(kpis.len());
        for kpi in &kpis {
            if !seen.insert(kpi.id) {
                return Err(RegistryError::DuplicateId { id: kpi.id });
            }
        }

        let max_id = kpis.iter().map(|k| k.id).max().unwrap_or(0);
        self.high_water = self.high_water.max(max_id);
        self.kpis = kpis;
        Ok(())
    }

    /// 用存储快照恢复集合与已分配最大ID
    ///
    /// 最大ID取 max(当前值, 存储值, 快照最大ID)，删除过的ID不会再分配
    pub fn restore(&mut self, kpis: Vec<Kpi>, high_water: i64) -> RegistryResult<()> {
        self.replace_all(kpis)?;
        self.high_water = self.high_water.max(high_water);
        Ok(())
    }

    /// 已分配过的最大ID
    pub fn high_water(&self) -> i64 {
        self.high_water
    }

    // ==========================================
    // 核心操作
    // ==========================================

    /// 按插入顺序返回全部 KPI
    pub fn list(&self) -> &[Kpi] {
        &self.kpis
    }

    /// 按ID查询
    pub fn get(&self, id: i64) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.id == id)
    }

    /// 新增 KPI
    ///
    /// id = max(已分配最大ID, 当前最大ID) + 1；空的新注册表从 1 开始。
    /// 草稿原样接受，不做校验。
    ///
    /// # 返回
    /// - Err(IdExhausted): 已分配最大ID为 i64::MAX，集合不变
    pub fn create(&mut self, draft: KpiFields) -> RegistryResult<Kpi> {
        let id = self.next_id()?;
        self.high_water = id;

        let kpi = Kpi::from_fields(id, draft);
        self.kpis.push(kpi.clone());
        tracing::debug!(kpi_id = id, "KPI已追加到注册表");
        Ok(kpi)
    }

    /// 修改 KPI（id 不变，其余字段整体替换）
    pub fn update(&mut self, id: i64, draft: KpiFields) -> RegistryResult<Kpi> {
        let kpi = self
            .kpis
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(RegistryError::NotFound { id })?;

        kpi.apply(draft);
        Ok(kpi.clone())
    }

    /// 删除 KPI，返回被删除的记录
    ///
    /// 删除确认由调用方负责，注册表不再询问
    pub fn delete(&mut self, id: i64) -> RegistryResult<Kpi> {
        let pos = self
            .kpis
            .iter()
            .position(|k| k.id == id)
            .ok_or(RegistryError::NotFound { id })?;

        Ok(self.kpis.remove(pos))
    }

    fn next_id(&self) -> RegistryResult<i64> {
        let max_existing = self.kpis.iter().map(|k| k.id).max().unwrap_or(0);
        let high_water = self.high_water.max(max_existing);
        high_water
            .checked_add(1)
            .ok_or(RegistryError::IdExhausted { high_water })
    }

    // ==========================================
    // 派生视图
    // ==========================================

    pub fn len(&self) -> usize {
        self.kpis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty()
    }

    /// 总数 / 类别数 / 权重合计
    pub fn summary(&self) -> KpiSummary {
        let categories: HashSet<&str> = self.kpis.iter().map(|k| k.category.as_str()).collect();
        KpiSummary {
            total_count: self.kpis.len(),
            category_count: categories.len(),
            total_weight: self.total_weight(),
        }
    }

    pub fn total_weight(&self) -> i64 {
        self.kpis.iter().map(|k| i64::from(k.weight)).sum()
    }

    /// 按角色文本汇总权重（仅展示，不要求合计为100）
    pub fn weight_by_role(&self) -> BTreeMap<String, i64> {
        let mut sums = BTreeMap::new();
        for kpi in &self.kpis {
            *sums.entry(kpi.role.clone()).or_insert(0) += i64::from(kpi.weight);
        }
        sums
    }

    /// 适用于指定角色的 KPI（角色为 All 或与之相同）
    pub fn list_for_role(&self, role: KpiRole) -> Vec<Kpi> {
        self.kpis
            .iter()
            .filter(|k| k.role_kind().map_or(false, |r| r.applies_to(role)))
            .cloned()
            .collect()
    }
}
