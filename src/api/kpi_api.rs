// ==========================================
// 绩效监测平台 - KPI 管理 API
// ==========================================
// 职责: 供展示层调用的 KPI 管理接口
// 1. KPI 查询与派生统计
// 2. 新增/修改/删除（含草稿校验、操作日志、自动保存）
// 3. 编辑会话（暂存草稿，保存时才写入注册表）
// 4. 删除确认（由调用方提供确认提示）
// 5. 持久化 load/save 钩子
// ==========================================

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::api::validator::{KpiDraftValidator, ValidationMode};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::kpi::{sample_kpis, Kpi, KpiFields};
use crate::domain::types::KpiRole;
use crate::engine::edit_session::{EditSession, SaveIntent};
use crate::engine::kpi_registry::{KpiRegistry, KpiSummary, RegistryError};
use crate::engine::scorecard::{KpiMeasurement, Scorecard, ScorecardEngine};
use crate::i18n;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::kpi_repo::KpiStore;

// ==========================================
// 删除确认
// ==========================================

/// 删除前的确认提示（是/否）
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteOutcome {
    Deleted { kpi: Kpi },
    Cancelled,
}

// ==========================================
// 请求/响应结构
// ==========================================

/// 运行参数（由 ConfigManager 读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiApiSettings {
    pub validation_mode: ValidationMode,
    pub autosave: bool,
    pub seed_samples: bool,
}

impl Default for KpiApiSettings {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::Permissive,
            autosave: true,
            seed_samples: true,
        }
    }
}

/// 新增/修改结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSaveResult {
    pub kpi: Kpi,
    /// 宽松模式下的校验警告
    pub warnings: Vec<ValidationViolation>,
    /// 是否已写入存储（未开启自动保存或保存失败时为 false）
    pub persisted: bool,
}

struct KpiWorkspace {
    registry: KpiRegistry,
    session: EditSession,
    settings: KpiApiSettings,
}

// ==========================================
// KpiApi - KPI 管理 API
// ==========================================
pub struct KpiApi {
    workspace: Mutex<KpiWorkspace>,
    store: Arc<dyn KpiStore>,
    action_log_repo: Option<Arc<ActionLogRepository>>,
    validator: KpiDraftValidator,
    scorecard_engine: ScorecardEngine,
}

impl KpiApi {
    /// 创建新的KpiApi实例（注册表为空，需调用 `load` 读取存储）
    pub fn new(
        store: Arc<dyn KpiStore>,
        action_log_repo: Option<Arc<ActionLogRepository>>,
        settings: KpiApiSettings,
    ) -> Self {
        Self {
            workspace: Mutex::new(KpiWorkspace {
                registry: KpiRegistry::new(),
                session: EditSession::new(),
                settings,
            }),
            store,
            action_log_repo,
            validator: KpiDraftValidator::new(),
            scorecard_engine: ScorecardEngine::new(),
        }
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, KpiWorkspace>> {
        self.workspace
            .lock()
            .map_err(|e| ApiError::InternalError(format!("KPI工作区锁获取失败: {}", e)))
    }

    pub fn settings(&self) -> ApiResult<KpiApiSettings> {
        Ok(self.lock()?.settings)
    }

    pub fn set_settings(&self, settings: KpiApiSettings) -> ApiResult<()> {
        self.lock()?.settings = settings;
        Ok(())
    }

    // ==========================================
    // 持久化钩子
    // ==========================================

    /// 从存储读取全部 KPI 并替换注册表
    ///
    /// - 存储从未分配过ID且开启 seed_samples 时写入示例数据
    /// - 进行中的编辑会话随之结束（草稿基于旧快照）
    ///
    /// # 返回
    /// - Ok(usize): 读取后的 KPI 数量
    pub fn load(&self, operator: &str) -> ApiResult<usize> {
        let mut ws = self.lock()?;
        let mut kpis = self.store.load()?;
        let mut high_water = self.store.load_high_water()?;

        if kpis.is_empty() && high_water == 0 && ws.settings.seed_samples {
            kpis = sample_kpis();
            self.store.save(&kpis)?;
            high_water = self.store.load_high_water()?;
            let count = kpis.len().to_string();
            self.record_action(
                ActionLog::new(ActionType::SeedSamples, operator, None)
                    .with_detail(i18n::t_with_args("kpi.seeded", &[("count", count.as_str())])),
            );
            tracing::info!("存储为空，已写入{}条示例KPI", kpis.len());
        }

        // 未保存的新增也写过操作日志，其ID同样不再分配
        if let Some(repo) = &self.action_log_repo {
            high_water = high_water.max(repo.max_kpi_id()?);
        }

        ws.registry.restore(kpis, high_water)?;
        if ws.session.is_editing() {
            tracing::info!("重新加载KPI，放弃进行中的编辑");
            ws.session.cancel();
        }
        tracing::info!(
            high_water = ws.registry.high_water(),
            "已加载{}条KPI定义",
            ws.registry.len()
        );
        Ok(ws.registry.len())
    }

    /// 将当前注册表整体写入存储
    pub fn save(&self) -> ApiResult<()> {
        let ws = self.lock()?;
        self.store
            .save_with_high_water(ws.registry.list(), ws.registry.high_water())?;
        tracing::info!("已保存{}条KPI定义", ws.registry.len());
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 全部 KPI（插入顺序）
    pub fn list(&self) -> ApiResult<Vec<Kpi>> {
        Ok(self.lock()?.registry.list().to_vec())
    }

    pub fn get(&self, id: i64) -> ApiResult<Kpi> {
        self.lock()?
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound { id }.into())
    }

    pub fn list_for_role(&self, role: KpiRole) -> ApiResult<Vec<Kpi>> {
        Ok(self.lock()?.registry.list_for_role(role))
    }

    pub fn summary(&self) -> ApiResult<KpiSummary> {
        Ok(self.lock()?.registry.summary())
    }

    pub fn weight_by_role(&self) -> ApiResult<BTreeMap<String, i64>> {
        Ok(self.lock()?.registry.weight_by_role())
    }

    /// 计算某角色员工的计分卡
    pub fn scorecard(
        &self,
        role: KpiRole,
        measurements: &HashMap<i64, KpiMeasurement>,
    ) -> ApiResult<Scorecard> {
        let kpis = self.list_for_role(role)?;
        Ok(self.scorecard_engine.evaluate(&kpis, measurements))
    }

    /// 最近的KPI操作日志
    pub fn recent_actions(&self, limit: i32) -> ApiResult<Vec<ActionLog>> {
        if limit <= 0 {
            return Err(ApiError::InvalidInput("limit必须大于0".to_string()));
        }
        match &self.action_log_repo {
            Some(repo) => Ok(repo.find_recent(limit)?),
            None => Ok(Vec::new()),
        }
    }

    // ==========================================
    // 直接写入
    // ==========================================

    /// 新增 KPI
    pub fn create(&self, draft: KpiFields, operator: &str) -> ApiResult<KpiSaveResult> {
        let mut ws = self.lock()?;
        let warnings = self.validator.validate(&draft, ws.settings.validation_mode)?;
        let kpi = ws.registry.create(draft)?;
        Ok(self.after_create(&ws, kpi, warnings, operator))
    }

    /// 修改 KPI（id 不变）
    pub fn update(&self, id: i64, draft: KpiFields, operator: &str) -> ApiResult<KpiSaveResult> {
        let mut ws = self.lock()?;
        let before = ws
            .registry
            .get(id)
            .cloned()
            .ok_or(RegistryError::NotFound { id })?;
        let warnings = self.validator.validate(&draft, ws.settings.validation_mode)?;
        let kpi = ws.registry.update(id, draft)?;
        Ok(self.after_update(&ws, &before, kpi, warnings, operator))
    }

    /// 删除 KPI（不询问，调用方已确认）
    pub fn delete(&self, id: i64, operator: &str) -> ApiResult<Kpi> {
        let mut ws = self.lock()?;
        let removed = ws.registry.delete(id)?;

        self.record_action(
            ActionLog::new(ActionType::DeleteKpi, operator, Some(removed.id))
                .with_payload(serde_json::json!({ "before": removed }))
                .with_detail(i18n::t_with_args("kpi.deleted", &[("name", removed.name.as_str())])),
        );
        self.autosave(&ws);
        tracing::info!(kpi_id = removed.id, "KPI已删除");
        Ok(removed)
    }

    /// 确认后删除
    ///
    /// 先确认记录存在再询问；用户取消时不做任何修改
    pub fn request_delete(
        &self,
        id: i64,
        prompt: &dyn ConfirmPrompt,
        operator: &str,
    ) -> ApiResult<DeleteOutcome> {
        self.get(id)?;

        if !prompt.confirm(&i18n::t("kpi.confirm_delete")) {
            tracing::debug!(kpi_id = id, "用户取消删除");
            return Ok(DeleteOutcome::Cancelled);
        }

        let kpi = self.delete(id, operator)?;
        Ok(DeleteOutcome::Deleted { kpi })
    }

    // ==========================================
    // 编辑会话
    // ==========================================

    /// 打开"新增"对话，返回空草稿
    pub fn open_add(&self) -> ApiResult<KpiFields> {
        let mut ws = self.lock()?;
        ws.session.open_add();
        Ok(KpiFields::default())
    }

    /// 打开"编辑"对话，返回按现有记录预填的草稿
    pub fn open_edit(&self, id: i64) -> ApiResult<KpiFields> {
        let mut ws = self.lock()?;
        let kpi = ws
            .registry
            .get(id)
            .cloned()
            .ok_or(RegistryError::NotFound { id })?;
        ws.session.open_edit(&kpi);
        Ok(kpi.fields())
    }

    /// 修改暂存草稿（不触及注册表）
    pub fn edit_draft<F>(&self, edit: F) -> ApiResult<KpiFields>
    where
        F: FnOnce(&mut KpiFields),
    {
        let mut ws = self.lock()?;
        let draft = ws.session.draft_mut().ok_or(ApiError::NoActiveEdit)?;
        edit(draft);
        Ok(draft.clone())
    }

    pub fn current_draft(&self) -> ApiResult<Option<KpiFields>> {
        Ok(self.lock()?.session.draft().cloned())
    }

    pub fn edit_session(&self) -> ApiResult<EditSession> {
        Ok(self.lock()?.session.clone())
    }

    /// 取消编辑，丢弃草稿
    pub fn cancel_edit(&self) -> ApiResult<()> {
        self.lock()?.session.cancel();
        Ok(())
    }

    /// 保存草稿
    ///
    /// - 新增: 调用 create
    /// - 编辑: 调用 update(target.id, draft)
    /// - 严格模式校验失败: 会话保持打开，草稿保留
    /// - 目标已被删除: 结束会话并返回 NotFound
    pub fn save_edit(&self, operator: &str) -> ApiResult<KpiSaveResult> {
        let mut ws = self.lock()?;
        let draft = ws.session.draft().cloned().ok_or(ApiError::NoActiveEdit)?;
        let warnings = self.validator.validate(&draft, ws.settings.validation_mode)?;

        let KpiWorkspace {
            registry, session, ..
        } = &mut *ws;
        let before = session.target().and_then(|t| registry.get(t.id).cloned());

        let committed = session.commit(|intent| match intent {
            SaveIntent::Create(d) => registry.create(d),
            SaveIntent::Update { id, draft } => registry.update(id, draft),
        });

        let kpi = match committed {
            Ok(Some(kpi)) => kpi,
            Ok(None) => return Err(ApiError::NoActiveEdit),
            Err(e @ RegistryError::NotFound { .. }) => {
                tracing::warn!("编辑目标已不存在，结束会话: {}", e);
                session.cancel();
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!("保存编辑失败，会话保持打开: {}", e);
                return Err(e.into());
            }
        };

        Ok(match before {
            Some(before) => self.after_update(&ws, &before, kpi, warnings, operator),
            None => self.after_create(&ws, kpi, warnings, operator),
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn after_create(
        &self,
        ws: &KpiWorkspace,
        kpi: Kpi,
        warnings: Vec<ValidationViolation>,
        operator: &str,
    ) -> KpiSaveResult {
        self.record_action(
            ActionLog::new(ActionType::CreateKpi, operator, Some(kpi.id))
                .with_payload(serde_json::json!({ "after": kpi, "warnings": warnings }))
                .with_detail(i18n::t_with_args("kpi.created", &[("name", kpi.name.as_str())])),
        );
        let persisted = self.autosave(ws);
        tracing::info!(kpi_id = kpi.id, "KPI已新增");

        KpiSaveResult {
            kpi,
            warnings,
            persisted,
        }
    }

    fn after_update(
        &self,
        ws: &KpiWorkspace,
        before: &Kpi,
        kpi: Kpi,
        warnings: Vec<ValidationViolation>,
        operator: &str,
    ) -> KpiSaveResult {
        self.record_action(
            ActionLog::new(ActionType::UpdateKpi, operator, Some(kpi.id))
                .with_payload(serde_json::json!({
                    "before": before,
                    "after": kpi,
                    "warnings": warnings,
                }))
                .with_detail(i18n::t_with_args("kpi.updated", &[("name", kpi.name.as_str())])),
        );
        let persisted = self.autosave(ws);
        tracing::info!(kpi_id = kpi.id, "KPI已修改");

        KpiSaveResult {
            kpi,
            warnings,
            persisted,
        }
    }

    /// 自动保存；失败只记录日志，内存注册表仍为准
    fn autosave(&self, ws: &KpiWorkspace) -> bool {
        if !ws.settings.autosave {
            return false;
        }
        match self
            .store
            .save_with_high_water(ws.registry.list(), ws.registry.high_water())
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("KPI自动保存失败: {}", e);
                false
            }
        }
    }

    fn record_action(&self, log: ActionLog) {
        if let Some(repo) = &self.action_log_repo {
            if let Err(e) = repo.insert(&log) {
                tracing::warn!("写入操作日志失败({}): {}", log.action_type, e);
            }
        }
    }
}
