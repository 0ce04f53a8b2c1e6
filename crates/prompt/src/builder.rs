//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use agrinet_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system template (if any) and the user template are rendered
/// with the same variables. Missing variables render as empty strings.
///
/// # Example
/// ```no_run
/// use agrinet_prompt::{build_prompt, default_prompt, ANSWER_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = default_prompt(ANSWER_PROMPT_ID).expect("built-in prompt");
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "How to treat mastitis in cows?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let handlebars = registry(definition)?;

    let user = handlebars
        .render("user", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    let system = if definition.system.is_some() {
        Some(
            handlebars
                .render("system", &variables)
                .map_err(|e| AppError::Prompt(format!("Failed to render system template: {}", e)))?,
        )
    } else {
        None
    };

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            temperature: definition.behavior.temperature,
            resolved_variables: variables,
        },
    })
}

/// Register the definition's templates with plain-text escaping.
fn registry(definition: &PromptDefinition) -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("user", &definition.template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    if let Some(system) = &definition.system {
        handlebars
            .register_template_string("system", system)
            .map_err(|e| AppError::Prompt(format!("Failed to register system template: {}", e)))?;
    }

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PromptBehavior, PromptOutputSpec};

    fn create_test_definition(system: Option<&str>, template: &str) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            behavior: PromptBehavior {
                tone: "friendly".to_string(),
                style: "concise".to_string(),
                temperature: Some(0.1),
            },
            system: system.map(str::to_string),
            template: template.to_string(),
            output: PromptOutputSpec {
                format: "markdown".to_string(),
            },
        }
    }

    #[test]
    fn test_build_user_and_system() {
        let def = create_test_definition(Some("Reply in {{language}}."), "Question: {{query}}");
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "When to sow cotton?".to_string());
        vars.insert("language".to_string(), "Gujarati".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Question: When to sow cotton?");
        assert_eq!(built.system.as_deref(), Some("Reply in Gujarati."));
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
        assert_eq!(built.metadata.temperature, Some(0.1));
    }

    #[test]
    fn test_no_html_escaping() {
        let def = create_test_definition(None, "{{evidence}}");
        let mut vars = HashMap::new();
        vars.insert("evidence".to_string(), "**Neem** <oil> & \"soap\"".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "**Neem** <oil> & \"soap\"");
        assert!(built.system.is_none());
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let def = create_test_definition(None, "Question: {{missing}}");
        let built = build_prompt(&def, HashMap::new()).unwrap();
        assert_eq!(built.user, "Question: ");
    }

    #[test]
    fn test_broken_template_is_prompt_error() {
        let def = create_test_definition(None, "{{#if}}");
        assert!(matches!(
            build_prompt(&def, HashMap::new()),
            Err(AppError::Prompt(_))
        ));
    }
}
