use std::fmt;

use serde::{Deserialize, Serialize};

/// A declared submission file type (e.g. `DONOR`, `SPECIMEN`, `SSM_M`).
///
/// File types are the nodes of the dependency graph. Codes are normalized to
/// uppercase so schema documents, file-name matching, and findings agree on
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct FileType(String);

impl FileType {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileType {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for FileType {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::FileType;

    #[test]
    fn normalizes_to_uppercase() {
        assert_eq!(FileType::new(" donor "), FileType::new("DONOR"));
        assert_eq!(FileType::new("ssm_m").as_str(), "SSM_M");
    }

    #[test]
    fn serde_round_trip() {
        let file_type = FileType::new("SPECIMEN");
        let json = serde_json::to_string(&file_type).expect("serialize");
        assert_eq!(json, "\"SPECIMEN\"");
        let parsed: FileType = serde_json::from_str("\"specimen\"").expect("deserialize");
        assert_eq!(parsed, file_type);
    }
}
