// ==========================================
// 绩效监测平台 - 命令行入口
// ==========================================
// 用法: kpi-registry [db_path]
// 输出: KPI 汇总与列表（JSON，stdout）
// 日志: stderr
// ==========================================

use kpi_registry::api::{ApiError, ErrorResponse};
use kpi_registry::app::{get_default_db_path, AppState};
use serde_json::json;

fn main() {
    // 初始化日志系统
    kpi_registry::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - KPI 定义管理", kpi_registry::APP_NAME);
    tracing::info!("系统版本: {}", kpi_registry::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    if let Err(err) = run(db_path) {
        tracing::error!("执行失败: {}", err);
        let response = ErrorResponse::from(&err);
        match serde_json::to_string_pretty(&response) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{}", err),
        }
        std::process::exit(1);
    }
}

fn run(db_path: String) -> Result<(), ApiError> {
    let state = AppState::new(db_path).map_err(ApiError::InternalError)?;

    let output = json!({
        "summary": state.kpi_api.summary()?,
        "weight_by_role": state.kpi_api.weight_by_role()?,
        "kpis": state.kpi_api.list()?,
    });

    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| ApiError::InternalError(format!("JSON序列化失败: {}", e)))?;
    println!("{}", text);
    Ok(())
}
