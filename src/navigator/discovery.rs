use crate::browser::driver::Driver;
use crate::survey::model::FieldRecord;
use crate::survey::scanner::{FormScanner, ScanError};

/// Visible question identifiers at one instant, in DOM order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSnapshot {
    ids: Vec<String>,
}

impl QuestionSnapshot {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuestionSnapshot {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn capture(
        driver: &mut dyn Driver,
        scanner: &FormScanner,
        root: &str,
    ) -> Result<Self, ScanError> {
        Ok(QuestionSnapshot {
            ids: scanner.visible_question_numbers(driver, root)?,
        })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Identifiers present now but absent from `before`, in DOM order.
    pub fn revealed_since(&self, before: &QuestionSnapshot) -> Vec<String> {
        let mut revealed: Vec<String> = Vec::new();
        for id in &self.ids {
            if !before.contains(id) && !revealed.contains(id) {
                revealed.push(id.clone());
            }
        }
        revealed
    }
}

/// Insert `revealed` right after `trigger` keeping their order. Fields whose
/// key is already in the list are dropped. Returns how many were inserted.
pub fn splice_after(fields: &mut Vec<FieldRecord>, trigger: usize, revealed: Vec<FieldRecord>) -> usize {
    let mut at = (trigger + 1).min(fields.len());
    let mut inserted = 0;
    for field in revealed {
        if fields.iter().any(|f| f.key() == field.key()) {
            continue;
        }
        fields.insert(at, field);
        at += 1;
        inserted += 1;
    }
    inserted
}
