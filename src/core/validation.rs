use crate::core::address::parse_input;
use crate::domain::model::{InputKind, ValidationResult};

/// 即時驗證：回傳給表單的訊息格式固定
pub fn validate_ip(input: &str) -> ValidationResult {
    let input = input.trim();
    if input.is_empty() {
        return ValidationResult::invalid("Please enter an IP address");
    }

    match parse_input(input) {
        Ok(parsed) => {
            let label = match parsed.kind {
                InputKind::Address => "address",
                InputKind::Network => "network",
            };
            ValidationResult {
                valid: true,
                kind: Some(parsed.kind),
                version: Some(parsed.version()),
                message: format!("Valid IPv{} {}: {}", parsed.version(), label, parsed),
            }
        }
        Err(reason) => {
            ValidationResult::invalid(format!("Invalid IP address or network: {}", reason))
        }
    }
}
