//! Prompt loader for YAML prompt definitions.
//!
//! Workspace definitions in `.agrinet/prompts/<id>.yml` take precedence over
//! the built-in ones, so deployments can retune wording without a rebuild.

use crate::types::PromptDefinition;
use agrinet_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the prompt used to generate evidence-backed answers.
pub const ANSWER_PROMPT_ID: &str = "agrinet.answer";

const ANSWER_PROMPT_YAML: &str = r#"
id: agrinet.answer
title: Evidence-backed farmer answer
apiVersion: "1.0"
behavior:
  tone: friendly
  style: concise
  temperature: 0.2
system: |
  You are an agricultural advisory assistant for farmers.
  Answer only from the documents provided below. Do not use outside knowledge.
  If the documents do not answer the question, say that the information is not available.
  Respond in {{language}} using simple words a farmer would use.
  End with a "Sources" line naming only the documents listed under Sources.
template: |
  **User:** "{{query}}"
  **Selected Language:** {{language}}

  # Documents
  {{evidence}}

  # Sources
  {{citations}}
output:
  format: markdown
"#;

/// Identifier of the prompt used to suggest follow-up questions.
pub const SUGGESTIONS_PROMPT_ID: &str = "agrinet.suggestions";

const SUGGESTIONS_PROMPT_YAML: &str = r#"
id: agrinet.suggestions
title: Follow-up question suggestions
apiVersion: "1.0"
behavior:
  tone: friendly
  style: concise
  temperature: 0.4
system: |
  You suggest follow-up questions a farmer could ask next.
  Every question must be answerable from the documents provided below.
  Write each question in {{language}}, from the farmer's point of view, in under 15 words.
  Reply with a JSON array of exactly {{count}} strings and nothing else.
template: |
  # Conversation so far
  {{conversation}}

  # Documents
  {{evidence}}
output:
  format: json
"#;

/// Return a built-in prompt definition by ID.
pub fn default_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    let yaml = match prompt_id {
        ANSWER_PROMPT_ID => ANSWER_PROMPT_YAML,
        SUGGESTIONS_PROMPT_ID => SUGGESTIONS_PROMPT_YAML,
        _ => return None,
    };

    match serde_yaml::from_str(yaml) {
        Ok(def) => Some(def),
        Err(e) => {
            tracing::error!("Built-in prompt '{}' failed to parse: {}", prompt_id, e);
            None
        }
    }
}

/// Load a prompt definition by ID.
///
/// Looks for `<workspace>/.agrinet/prompts/<id>.yml` first and falls back
/// to the built-in definition.
///
/// # Example
/// ```no_run
/// use agrinet_prompt::{load_prompt, ANSWER_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), ANSWER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".agrinet/prompts")
        .join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("No workspace prompt at {:?}, using built-in", prompt_file);
        return default_prompt(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
