// ==========================================
// 绩效监测平台 - 应用层
// ==========================================
// 职责: 组装仓储/配置/API，供入口程序与展示层持有
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
