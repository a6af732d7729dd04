//! Loads prompt templates from the template directory.

use std::collections::HashMap;
use std::path::Path;

use dobi_core::prompt::registry::PromptRegistry;
use dobi_types::error::PromptError;
use dobi_types::prompt::PromptName;

/// File holding the intent descriptions shown to the classifier.
pub const INTENT_LIST_FILE: &str = "intent_list.txt";

async fn read_template(dir: &Path, file_name: &str) -> Result<String, PromptError> {
    let path = dir.join(file_name);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PromptError::TemplateNotFound(path.display().to_string()))
        }
        Err(e) => Err(PromptError::Io(format!("{}: {e}", path.display()))),
    }
}

/// Read every named template plus the intent list from `dir`.
pub async fn load_prompt_registry(dir: &Path) -> Result<PromptRegistry, PromptError> {
    let mut sources = HashMap::new();
    for name in PromptName::ALL {
        sources.insert(name, read_template(dir, name.file_name()).await?);
    }
    let intent_list = read_template(dir, INTENT_LIST_FILE).await?;

    let registry = PromptRegistry::from_sources(sources, intent_list)?;
    tracing::info!(dir = %dir.display(), templates = PromptName::ALL.len(), "loaded prompt templates");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use dobi_core::orchestrator::supplied_keys;
    use dobi_types::prompt::ContextBag;

    use super::*;

    fn write_all(dir: &Path) {
        for name in PromptName::ALL {
            std::fs::write(dir.join(name.file_name()), format!("[{}] {{input}}", name.as_str())).unwrap();
        }
        std::fs::write(dir.join(INTENT_LIST_FILE), "kakao_sync: 카카오싱크\n").unwrap();
    }

    #[tokio::test]
    async fn test_loads_all_templates() {
        let tmp = tempfile::tempdir().unwrap();
        write_all(tmp.path());

        let registry = load_prompt_registry(tmp.path()).await.unwrap();
        let rendered = registry
            .get(PromptName::DefaultChain)
            .unwrap()
            .render(&ContextBag::new().with("input", "질문"))
            .unwrap();
        assert_eq!(rendered, "[default_chain] 질문");
        assert_eq!(registry.intent_list(), "kakao_sync: 카카오싱크");
    }

    #[tokio::test]
    async fn test_missing_file_is_template_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        write_all(tmp.path());
        std::fs::remove_file(tmp.path().join("search_compress.txt")).unwrap();

        let err = load_prompt_registry(tmp.path()).await.unwrap_err();
        match err {
            PromptError::TemplateNotFound(path) => assert!(path.ends_with("search_compress.txt")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shipped_templates_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/templates");
        let registry = load_prompt_registry(&dir).await.unwrap();
        let intent = registry.get(PromptName::ParseIntent).unwrap();
        assert!(intent.placeholders().contains(&"intent_list"));

        for name in PromptName::ALL {
            let supplied = supplied_keys(name);
            let template = registry.get(name).unwrap();
            for placeholder in template.placeholders() {
                assert!(
                    supplied.iter().any(|key| *key == placeholder),
                    "{} uses {{{placeholder}}} which its chain never supplies",
                    name.file_name()
                );
            }

            let bag = supplied.iter().fold(ContextBag::new(), |bag, key| bag.with(*key, "x"));
            template.render(&bag).unwrap();
        }
        assert!(!registry.intent_list().is_empty());
    }
}
