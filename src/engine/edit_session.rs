// ==========================================
// 绩效监测平台 - KPI 编辑会话
// ==========================================
// 状态机: Idle → Editing(draft, target) → Idle
// 红线: 草稿是暂存的，保存之前不得改动注册表中的任何记录
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::kpi::{Kpi, KpiFields};

// ==========================================
// EditSession - 编辑会话状态
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditSession {
    #[default]
    Idle,
    Editing {
        draft: KpiFields,
        // None 表示新增
        target: Option<Kpi>,
    },
}

/// 保存意图（交给调用方落到注册表）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveIntent {
    Create(KpiFields),
    Update { id: i64, draft: KpiFields },
}

impl EditSession {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    /// 打开"新增": 空草稿, target = None
    ///
    /// 已在编辑中时丢弃原草稿
    pub fn open_add(&mut self) {
        *self = EditSession::Editing {
            draft: KpiFields::default(),
            target: None,
        };
    }

    /// 打开"编辑": 草稿按现有记录预填
    pub fn open_edit(&mut self, kpi: &Kpi) {
        *self = EditSession::Editing {
            draft: kpi.fields(),
            target: Some(kpi.clone()),
        };
    }

    pub fn draft(&self) -> Option<&KpiFields> {
        match self {
            EditSession::Editing { draft, .. } => Some(draft),
            EditSession::Idle => None,
        }
    }

    /// 暂存修改入口
    pub fn draft_mut(&mut self) -> Option<&mut KpiFields> {
        match self {
            EditSession::Editing { draft, .. } => Some(draft),
            EditSession::Idle => None,
        }
    }

    pub fn target(&self) -> Option<&Kpi> {
        match self {
            EditSession::Editing { target, .. } => target.as_ref(),
            EditSession::Idle => None,
        }
    }

    /// 取消: 丢弃草稿, 回到 Idle
    pub fn cancel(&mut self) {
        *self = EditSession::Idle;
    }

    /// 保存
    ///
    /// # 返回
    /// - Ok(None): 当前不在编辑状态，未调用 `apply`
    /// - Ok(Some(kpi)): `apply` 成功，会话回到 Idle
    /// - Err(e): `apply` 失败，会话保持 Editing 且草稿不变
    pub fn commit<E, F>(&mut self, apply: F) -> Result<Option<Kpi>, E>
    where
        F: FnOnce(SaveIntent) -> Result<Kpi, E>,
    {
        let (draft, target) = match self {
            EditSession::Editing { draft, target } => (draft.clone(), target.as_ref().map(|k| k.id)),
            EditSession::Idle => return Ok(None),
        };

        let intent = match target {
            Some(id) => SaveIntent::Update { id, draft },
            None => SaveIntent::Create(draft),
        };

        let kpi = apply(intent)?;
        *self = EditSession::Idle;
        Ok(Some(kpi))
    }
}
