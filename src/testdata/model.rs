use serde::{Deserialize, Serialize};

use crate::classify::field_type::FieldType;
use crate::classify::registry::ClassificationMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Valid,
    Boundary,
    Edge,
    Invalid,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Valid => "valid",
            Category::Boundary => "boundary",
            Category::Edge => "edge",
            Category::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceSource {
    Generated,
    Human,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorInfo {
    pub generator: String,
    pub version: String,
    /// Template entry or strategy that produced the value.
    pub template_id: String,
    pub method: ClassificationMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub source: ProvenanceSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_info: Option<GeneratorInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseStatus {
    Pending,
    Approved,
    Rejected,
    NeedsReview,
}

/// One representative input value. Only `status` may change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    id: String,
    category: Category,
    value: String,
    description: String,
    provenance: Provenance,
    status: TestCaseStatus,
    quality_score: f32,
}

impl TestCase {
    /// The id is derived from the field key and the case content, so the same
    /// field regenerates the same ids.
    pub fn new(
        field_key: &str,
        category: Category,
        value: &str,
        description: &str,
        provenance: Provenance,
        quality_score: f32,
    ) -> Self {
        TestCase {
            id: case_id(field_key, category, value, description),
            category,
            value: value.to_string(),
            description: description.to_string(),
            provenance,
            status: TestCaseStatus::Pending,
            quality_score: quality_score.clamp(0.0, 1.0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn status(&self) -> TestCaseStatus {
        self.status
    }

    pub fn quality_score(&self) -> f32 {
        self.quality_score
    }

    /// Review outcome.
    pub fn set_status(&mut self, status: TestCaseStatus) {
        self.status = status;
    }
}

fn case_id(field_key: &str, category: Category, value: &str, description: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(field_key.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(category.as_str().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(value.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(description.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("tc-{}", &digest[..12])
}

// ============================================================================
// Test data set
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One valid case per enumerated choice
    Choice,
    Template,
    /// Non-interactive field, nothing to generate
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDataSummary {
    pub field_type: FieldType,
    pub confidence: u8,
    pub method: ClassificationMethod,
    pub strategy: Strategy,
    pub total: usize,
    pub valid: usize,
    pub boundary: usize,
    pub edge: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDataSet {
    pub test_cases: Vec<TestCase>,
    pub summary: TestDataSummary,
}

impl TestDataSet {
    pub fn new(
        test_cases: Vec<TestCase>,
        field_type: FieldType,
        confidence: u8,
        method: ClassificationMethod,
        strategy: Strategy,
    ) -> Self {
        let count = |c: Category| test_cases.iter().filter(|t| t.category() == c).count();
        let summary = TestDataSummary {
            field_type,
            confidence,
            method,
            strategy,
            total: test_cases.len(),
            valid: count(Category::Valid),
            boundary: count(Category::Boundary),
            edge: count(Category::Edge),
            invalid: count(Category::Invalid),
        };
        TestDataSet {
            test_cases,
            summary,
        }
    }

    /// First valid case, the value the filler uses.
    pub fn first_valid(&self) -> Option<&TestCase> {
        self.test_cases
            .iter()
            .find(|t| t.category() == Category::Valid)
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &TestCase> {
        self.test_cases
            .iter()
            .filter(move |t| t.category() == category)
    }
}
