//! Environment variable credential source.
//!
//! Takes a snapshot of the process environment at startup. Empty values
//! count as missing.

use std::collections::HashMap;

use secrecy::SecretString;

use dobi_types::error::CredentialError;

pub struct EnvCredentials {
    vars: HashMap<String, String>,
}

impl EnvCredentials {
    /// Snapshot the current process environment. Non-unicode values are skipped.
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<SecretString> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.to_string()))
    }

    /// Like [`get`](Self::get) but a missing value is a startup error.
    pub fn require(&self, name: &str) -> Result<SecretString, CredentialError> {
        self.get(name)
            .ok_or_else(|| CredentialError::Missing(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::secret::{GOOGLE_API_KEY, OPENAI_API_KEY};

    #[test]
    fn test_require_present() {
        let creds = EnvCredentials::from_pairs([(OPENAI_API_KEY, "sk-test")]);
        let key = creds.require(OPENAI_API_KEY).unwrap();
        assert_eq!(key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_require_missing_names_variable() {
        let creds = EnvCredentials::from_pairs(Vec::<(String, String)>::new());
        let err = creds.require(OPENAI_API_KEY).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let creds = EnvCredentials::from_pairs([(GOOGLE_API_KEY, "   ")]);
        assert!(creds.get(GOOGLE_API_KEY).is_none());
        assert!(creds.require(GOOGLE_API_KEY).is_err());
    }
}
