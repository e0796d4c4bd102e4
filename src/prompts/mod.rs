//! Assistant texts
//!
//! This module holds the system prompt sent to the completion service and the
//! scripted replies the conversation flow emits on its own.

pub mod replies;
pub mod system_prompt;

/// Resolve the system prompt, preferring a configured override
///
/// Blank overrides are ignored.
///
/// # Examples
///
/// ```
/// use shipsmart::prompts::build_system_prompt;
///
/// assert_eq!(build_system_prompt(Some("Be brief.")), "Be brief.");
/// assert!(build_system_prompt(None).contains("SHIPSmart"));
/// ```
pub fn build_system_prompt(override_prompt: Option<&str>) -> String {
    match override_prompt {
        Some(prompt) if !prompt.trim().is_empty() => prompt.to_string(),
        _ => system_prompt::generate_system_prompt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_override_falls_back() {
        assert!(build_system_prompt(Some("   ")).contains("UC SHIP"));
    }
}
