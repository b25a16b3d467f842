//! 统一错误处理模块
//!
//! 定义应用级错误类型（配置、交互输入）。各服务层有各自的错误枚举，
//! 在 main 中统一转换为 anyhow::Error。

use thiserror::Error;

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 未找到当前 Provider 的 API 密钥
    #[error("未找到 {provider} 的 API 密钥（请在 config.json 中设置 api_key 或设置环境变量 {env_var}）")]
    MissingApiKey { provider: String, env_var: String },

    /// 交互式提示失败（非终端、读取中断等）
    #[error("输入错误: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
