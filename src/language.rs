use serde::{Deserialize, Serialize};
use std::path::Path;

/// Language identifier sent with scan and fix requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
    Java,
    Php,
    Go,
    Ruby,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Php => "php",
            Language::Go => "go",
            Language::Ruby => "ruby",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Javascript => "JavaScript",
            Language::Typescript => "TypeScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Php => "PHP",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" => Some(Language::Javascript),
            "ts" | "tsx" => Some(Language::Typescript),
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "php" => Some(Language::Php),
            "go" => Some(Language::Go),
            "rb" => Some(Language::Ruby),
            _ => None,
        }
    }

    /// Guesses from the file extension; unknown extensions fall back to
    /// JavaScript, the service default.
    pub fn detect(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Language::Javascript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::Javascript),
            "typescript" | "ts" => Ok(Language::Typescript),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "php" => Ok(Language::Php),
            "go" => Ok(Language::Go),
            "ruby" | "rb" => Ok(Language::Ruby),
            _ => Err(format!(
                "Unknown language: {}. Use: javascript, typescript, python, java, php, go, ruby",
                s
            )),
        }
    }
}
