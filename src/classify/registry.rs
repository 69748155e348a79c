use std::sync::Mutex;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::advisor::TypeAdvisor;
use crate::classify::field_type::FieldType;
use crate::classify::patterns::default_patterns;
use crate::survey::model::InputKind;

/// Weight of a question-text match.
pub const TEXT_WEIGHT: f32 = 0.8;
/// Weight of an input-kind match.
pub const ATTRIBUTE_WEIGHT: f32 = 0.6;
/// Weight of a choice-text match.
pub const CONTEXT_WEIGHT: f32 = 0.4;

/// Confidence reported when no pattern fires and the kind table decides.
pub const FALLBACK_CONFIDENCE: u8 = 50;
/// Confidence reported for a type suggested by the advisor.
pub const ADVISOR_CONFIDENCE: u8 = 60;

// ============================================================================
// Patterns
// ============================================================================

/// Uncompiled pattern definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSpec {
    pub id: String,
    pub priority: i32,
    pub text_patterns: Vec<String>,
    pub attribute_patterns: Vec<InputKind>,
    pub context_patterns: Vec<String>,
    pub target_template: FieldType,
    pub confidence: u8,
}

impl PatternSpec {
    pub fn new(id: &str, priority: i32, target_template: FieldType, confidence: u8) -> Self {
        PatternSpec {
            id: id.to_string(),
            priority,
            text_patterns: vec![],
            attribute_patterns: vec![],
            context_patterns: vec![],
            target_template,
            confidence: confidence.min(100),
        }
    }

    pub fn text(mut self, pattern: &str) -> Self {
        self.text_patterns.push(pattern.to_string());
        self
    }

    pub fn kinds(mut self, kinds: &[InputKind]) -> Self {
        self.attribute_patterns.extend_from_slice(kinds);
        self
    }

    pub fn context(mut self, pattern: &str) -> Self {
        self.context_patterns.push(pattern.to_string());
        self
    }
}

/// A compiled rule. Definitions are append-only once registered.
#[derive(Debug, Clone)]
pub struct FieldTypePattern {
    pub id: String,
    pub priority: i32,
    pub text_patterns: Vec<Regex>,
    pub attribute_patterns: Vec<InputKind>,
    pub context_patterns: Vec<Regex>,
    pub target_template: FieldType,
    pub confidence: u8,
}

/// Why a pattern fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "value", rename_all = "snake_case")]
pub enum MatchedSignal {
    Text(String),
    Kind(InputKind),
    Choice(String),
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

impl FieldTypePattern {
    pub fn compile(spec: &PatternSpec) -> Result<Self, regex::Error> {
        Ok(FieldTypePattern {
            id: spec.id.clone(),
            priority: spec.priority,
            text_patterns: spec
                .text_patterns
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
            attribute_patterns: spec.attribute_patterns.clone(),
            context_patterns: spec
                .context_patterns
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
            target_template: spec.target_template,
            confidence: spec.confidence,
        })
    }

    /// Weighted score of this rule against one question, or `None` when it
    /// does not fire. Rules that declare text or choice patterns need at
    /// least one of those to match; an input-kind match alone is not enough.
    /// Scale widgets are only claimed by rules that list their kind.
    pub fn evaluate(
        &self,
        question_text: &str,
        kind: InputKind,
        choices: &[String],
    ) -> Option<(f32, Vec<MatchedSignal>)> {
        if kind.is_scale_widget() && !self.attribute_patterns.contains(&kind) {
            return None;
        }

        let base = f32::from(self.confidence);
        let mut score = 0.0;
        let mut signals = Vec::new();

        let text_hit = self.text_patterns.iter().find(|re| re.is_match(question_text));
        if let Some(re) = text_hit {
            score += base * TEXT_WEIGHT;
            signals.push(MatchedSignal::Text(re.as_str().to_string()));
        }

        if self.attribute_patterns.contains(&kind) {
            score += base * ATTRIBUTE_WEIGHT;
            signals.push(MatchedSignal::Kind(kind));
        }

        let context_hit = self
            .context_patterns
            .iter()
            .find(|re| choices.iter().any(|c| re.is_match(c)));
        if let Some(re) = context_hit {
            score += base * CONTEXT_WEIGHT;
            signals.push(MatchedSignal::Choice(re.as_str().to_string()));
        }

        let needs_content = !self.text_patterns.is_empty() || !self.context_patterns.is_empty();
        if signals.is_empty() || (needs_content && text_hit.is_none() && context_hit.is_none()) {
            return None;
        }

        Some((score.min(100.0), signals))
    }
}

// ============================================================================
// Classification result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationMethod {
    Pattern { id: String },
    Advisor,
    KindFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub field_type: FieldType,
    /// 0–100
    pub confidence: u8,
    pub method: ClassificationMethod,
    pub matched_signals: Vec<MatchedSignal>,
    /// Key of the test-data template to use.
    pub template: FieldType,
}

/// Per-pattern counters for auditing dead or over-firing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternUsage {
    pub evaluated: u64,
    pub matched: u64,
    pub selected: u64,
}

/// A question no pattern recognised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownField {
    pub question_text: String,
    pub input_kind: InputKind,
    pub choice_count: usize,
    pub assigned: FieldType,
    pub method: ClassificationMethod,
}

// ============================================================================
// Registry
// ============================================================================

/// Ranked-rule evaluator mapping question text, input kind and choice text
/// to a semantic field type.
pub struct FieldTypeRegistry {
    patterns: Vec<FieldTypePattern>,
    // pattern indices by descending priority, registration order within a priority
    order: Vec<usize>,
    usage: Mutex<Vec<PatternUsage>>,
    unknown: Mutex<Vec<UnknownField>>,
    advisor: Option<Box<dyn TypeAdvisor>>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FieldTypeRegistry {
    pub fn new() -> Self {
        FieldTypeRegistry {
            patterns: Vec::new(),
            order: Vec::new(),
            usage: Mutex::new(Vec::new()),
            unknown: Mutex::new(Vec::new()),
            advisor: None,
        }
    }

    /// Registry loaded with the built-in pattern set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in default_patterns() {
            if let Err(e) = registry.register(&spec) {
                warn!(pattern = %spec.id, error = %e, "skipping built-in pattern that does not compile");
            }
        }
        registry
    }

    pub fn with_advisor(mut self, advisor: Box<dyn TypeAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn register(&mut self, spec: &PatternSpec) -> Result<(), regex::Error> {
        let pattern = FieldTypePattern::compile(spec)?;
        self.patterns.push(pattern);
        self.usage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PatternUsage::default());

        let mut order: Vec<usize> = (0..self.patterns.len()).collect();
        // stable sort keeps registration order for equal priorities
        order.sort_by(|a, b| self.patterns[*b].priority.cmp(&self.patterns[*a].priority));
        self.order = order;
        Ok(())
    }

    pub fn patterns(&self) -> &[FieldTypePattern] {
        &self.patterns
    }

    /// Classify one question. Only the usage counters and the unknown-field
    /// log change between calls with identical inputs.
    pub fn classify(&self, question_text: &str, kind: InputKind, choices: &[String]) -> Classification {
        let mut best: Option<(usize, f32, Vec<MatchedSignal>)> = None;

        {
            let mut usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());
            for &index in &self.order {
                usage[index].evaluated += 1;
                let Some((score, signals)) =
                    self.patterns[index].evaluate(question_text, kind, choices)
                else {
                    continue;
                };
                usage[index].matched += 1;
                if best.as_ref().is_none_or(|(_, top, _)| score > *top) {
                    best = Some((index, score, signals));
                }
            }

            if let Some((index, score, signals)) = best {
                usage[index].selected += 1;
                let pattern = &self.patterns[index];
                debug!(pattern = %pattern.id, score, "pattern selected");
                return Classification {
                    field_type: pattern.target_template,
                    confidence: score.round() as u8,
                    method: ClassificationMethod::Pattern {
                        id: pattern.id.clone(),
                    },
                    matched_signals: signals,
                    template: pattern.target_template,
                };
            }
        }

        let (field_type, confidence, method) = match self
            .advisor
            .as_ref()
            .and_then(|a| a.suggest(question_text, kind, choices))
        {
            Some(suggested) => {
                info!(field_type = suggested.as_str(), "type suggested by advisor");
                (suggested, ADVISOR_CONFIDENCE, ClassificationMethod::Advisor)
            }
            None => (
                FieldType::for_input_kind(kind),
                FALLBACK_CONFIDENCE,
                ClassificationMethod::KindFallback,
            ),
        };

        self.unknown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(UnknownField {
                question_text: question_text.to_string(),
                input_kind: kind,
                choice_count: choices.len(),
                assigned: field_type,
                method: method.clone(),
            });

        Classification {
            field_type,
            confidence,
            method,
            matched_signals: vec![MatchedSignal::Kind(kind)],
            template: field_type,
        }
    }

    /// Usage counters keyed by pattern id, in registration order.
    pub fn usage(&self) -> Vec<(String, PatternUsage)> {
        let usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        self.patterns
            .iter()
            .zip(usage.iter())
            .map(|(p, u)| (p.id.clone(), u.clone()))
            .collect()
    }

    pub fn unknown_fields(&self) -> Vec<UnknownField> {
        self.unknown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
