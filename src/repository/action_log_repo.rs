// ==========================================
// 绩效监测平台 - 操作日志数据仓储
// ==========================================
// 红线: KPI 定义的所有写入必须记录
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
