// ==========================================
// 绩效监测平台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{KpiApi, KpiApiSettings};
use crate::config::config_keys;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::i18n;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::kpi_repo::SqliteKpiRepository;

/// 启动/后台操作使用的操作人
pub const SYSTEM_OPERATOR: &str = "system";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储
    pub action_log_repo: Arc<ActionLogRepository>,

    /// KPI 管理API
    pub kpi_api: Arc<KpiApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 已加载 KPI 的应用状态
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并初始化 schema
    /// 2. 读取配置（校验模式/自动保存/示例数据/语言）
    /// 3. 创建 KpiApi 并从存储加载
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库schema初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let kpi_repo = Arc::new(SqliteKpiRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // 未配置 ui/locale 时保持当前语言
        let locale_configured = config_manager
            .get_config_value(config_keys::UI_LOCALE)
            .map_err(|e| format!("读取语言配置失败: {}", e))?
            .is_some();
        if locale_configured {
            let locale = config_manager
                .get_locale()
                .map_err(|e| format!("读取语言配置失败: {}", e))?;
            i18n::set_locale(&locale);
        }

        let settings = load_settings(&config_manager)
            .map_err(|e| format!("读取KPI配置失败: {}", e))?;
        tracing::info!(
            validation_mode = %settings.validation_mode,
            autosave = settings.autosave,
            seed_samples = settings.seed_samples,
            "KPI配置已加载"
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let kpi_api = Arc::new(KpiApi::new(
            kpi_repo,
            Some(action_log_repo.clone()),
            settings,
        ));
        kpi_api
            .load(SYSTEM_OPERATOR)
            .map_err(|e| format!("加载KPI定义失败: {}", e))?;

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            action_log_repo,
            kpi_api,
        })
    }

    /// 配置修改后重新应用到 KpiApi
    pub fn reload_settings(&self) -> Result<KpiApiSettings, String> {
        let settings = load_settings(&self.config_manager)
            .map_err(|e| format!("读取KPI配置失败: {}", e))?;
        self.kpi_api
            .set_settings(settings)
            .map_err(|e| e.to_string())?;
        Ok(settings)
    }
}

fn load_settings(config: &ConfigManager) -> RepositoryResult<KpiApiSettings> {
    Ok(KpiApiSettings {
        validation_mode: config.get_validation_mode()?,
        autosave: config.get_autosave()?,
        seed_samples: config.get_seed_samples()?,
    })
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 KPI_REGISTRY_DB_PATH，否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("KPI_REGISTRY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./kpi_registry.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("kpi-registry");
        // 目录创建失败时回落到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("kpi_registry.db");
        }
    }

    path.to_string_lossy().to_string()
}
