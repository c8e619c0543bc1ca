// ==========================================
// 绩效监测平台 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供展示层调用
// ==========================================

pub mod error;
pub mod kpi_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorResponse, ValidationViolation};
pub use kpi_api::{ConfirmPrompt, DeleteOutcome, KpiApi, KpiApiSettings, KpiSaveResult};
pub use validator::{KpiDraftValidator, ValidationMode};
