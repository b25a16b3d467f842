//! 控制台交互
//!
//! 读取搜索模式，列出模型并读取用户选择。

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::error::AppResult;
use crate::llm::ChatModel;

/// 读取文件名搜索模式（例如 `*.cs`）
pub fn prompt_pattern() -> AppResult<String> {
    let pattern: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter the search pattern (e.g. *.cs)")
        .validate_with(|input: &String| validate_pattern(input))
        .interact_text()?;
    Ok(pattern.trim().to_string())
}

/// 搜索模式不能为空，且必须是合法的 glob
pub fn validate_pattern(input: &str) -> Result<(), String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("搜索模式不能为空".to_string());
    }
    glob::Pattern::new(input)
        .map(|_| ())
        .map_err(|e| format!("无效的匹配模式: {}", e))
}

/// 以 `[i] model` 格式生成模型列表
pub fn model_items(models: &[ChatModel]) -> Vec<String> {
    models
        .iter()
        .enumerate()
        .map(|(i, model)| format!("[{}] {}", i, model))
        .collect()
}

/// 列出模型并读取用户选择，按 Esc 放弃时返回 None
pub fn choose_model(models: &[ChatModel]) -> AppResult<Option<usize>> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a model")
        .items(&model_items(models))
        .default(0)
        .interact_opt()?;
    Ok(choice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_items_format() {
        let models = vec![ChatModel::new("gpt-4o"), ChatModel::new("gpt-4o-mini")];
        assert_eq!(model_items(&models), vec!["[0] gpt-4o", "[1] gpt-4o-mini"]);
        assert!(model_items(&[]).is_empty());
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("*.cs").is_ok());
        assert!(validate_pattern("  *.txt ").is_ok());
        assert!(validate_pattern("").is_err());
        assert!(validate_pattern("   ").is_err());
        assert!(validate_pattern("[*.cs").is_err());
    }
}
