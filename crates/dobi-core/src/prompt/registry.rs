//! PromptRegistry -- the fixed set of named templates plus the intent list.
//!
//! Built once at startup and shared read-only. Reading template files from
//! disk is done by dobi-infra; this type only validates completeness.

use std::collections::HashMap;
use std::sync::Arc;

use dobi_types::error::PromptError;
use dobi_types::prompt::PromptName;

use super::template::PromptTemplate;

#[derive(Debug, Clone)]
pub struct PromptRegistry {
    templates: HashMap<PromptName, Arc<PromptTemplate>>,
    intent_list: Arc<str>,
}

impl PromptRegistry {
    /// Build a registry from raw template texts.
    ///
    /// Every [`PromptName`] must be present; each text is parsed eagerly so
    /// malformed templates fail at startup rather than mid-request.
    pub fn from_sources(
        mut sources: HashMap<PromptName, String>,
        intent_list: impl Into<String>,
    ) -> Result<Self, PromptError> {
        let mut templates = HashMap::new();
        for name in PromptName::ALL {
            let text = sources
                .remove(&name)
                .ok_or_else(|| PromptError::TemplateNotFound(name.file_name().to_string()))?;
            let template = PromptTemplate::parse(name.as_str(), name.output_key(), &text)?;
            templates.insert(name, Arc::new(template));
        }
        let intent_list: String = intent_list.into();
        Ok(Self {
            templates,
            intent_list: Arc::from(intent_list.trim()),
        })
    }

    pub fn get(&self, name: PromptName) -> Result<Arc<PromptTemplate>, PromptError> {
        self.templates
            .get(&name)
            .cloned()
            .ok_or_else(|| PromptError::TemplateNotFound(name.file_name().to_string()))
    }

    /// Description of the known intents, fed to the classifier prompt.
    pub fn intent_list(&self) -> &str {
        &self.intent_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> HashMap<PromptName, String> {
        PromptName::ALL
            .into_iter()
            .map(|n| (n, format!("{} says {{input}}", n.as_str())))
            .collect()
    }

    #[test]
    fn test_from_sources_builds_all_templates() {
        let registry = PromptRegistry::from_sources(sources(), "kakao_social: ...\n").unwrap();
        for name in PromptName::ALL {
            let t = registry.get(name).unwrap();
            assert_eq!(t.name(), name.as_str());
            assert_eq!(t.output_key(), name.output_key());
        }
        assert_eq!(registry.intent_list(), "kakao_social: ...");
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let mut partial = sources();
        partial.remove(&PromptName::SearchCompression);
        match PromptRegistry::from_sources(partial, "").unwrap_err() {
            PromptError::TemplateNotFound(file) => assert_eq!(file, "search_compress.txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_template_fails_eagerly() {
        let mut bad = sources();
        bad.insert(PromptName::DefaultChain, "oops {".to_string());
        assert!(matches!(
            PromptRegistry::from_sources(bad, ""),
            Err(PromptError::MalformedTemplate { .. })
        ));
    }
}
