use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use survey_walker::browser::driver::{CaptureTarget, Driver};
use survey_walker::browser::error::DriverError;
use survey_walker::browser::script::PageScript;

// =========================================================================
// Fixture model
// =========================================================================

#[derive(Debug, Clone)]
pub enum FakeControl {
    Radio(Vec<String>),
    Text,
    Email,
    Number,
    Textarea,
    Select(Vec<String>),
    Slider,
    Rating(usize),
    None,
}

#[derive(Debug, Clone)]
pub struct FakeQuestion {
    pub dom_id: String,
    /// Container text as rendered, e.g. "3.1. Do you take medication? *"
    pub text: String,
    pub control: FakeControl,
    pub hidden: bool,
    /// dom ids made visible once this question has a value
    pub reveals: Vec<String>,
    pub clearable: bool,
    pub answer: Option<String>,
}

impl FakeQuestion {
    pub fn new(dom_id: &str, text: &str, control: FakeControl) -> Self {
        FakeQuestion {
            dom_id: dom_id.to_string(),
            text: text.to_string(),
            control,
            hidden: false,
            reveals: vec![],
            clearable: false,
            answer: None,
        }
    }

    pub fn radio(dom_id: &str, text: &str, labels: &[&str]) -> Self {
        Self::new(
            dom_id,
            text,
            FakeControl::Radio(labels.iter().map(|l| l.to_string()).collect()),
        )
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn reveals(mut self, dom_ids: &[&str]) -> Self {
        self.reveals = dom_ids.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn clearable(mut self) -> Self {
        self.clearable = true;
        self
    }

    pub fn answered(mut self, value: &str) -> Self {
        self.answer = Some(value.to_string());
        self
    }

    fn token(&self) -> String {
        format!("#{}", self.dom_id)
    }

    fn raw(&self) -> Value {
        let name = self.dom_id.clone();
        let input = |kind: &str| {
            json!([{
                "tag": "input",
                "type": kind,
                "name": name,
                "domId": format!("{}-input", name),
                "label": "",
                "locator": format!("#{}-input", name),
            }])
        };

        let (controls, options, analog, rating, text) = match &self.control {
            FakeControl::Radio(labels) => {
                let controls: Vec<Value> = labels
                    .iter()
                    .enumerate()
                    .map(|(i, label)| {
                        json!({
                            "tag": "input",
                            "type": "radio",
                            "name": name,
                            "label": label,
                            "hidden": true,
                            "locator": format!("input[name=\"{}\"][value=\"{}\"]", name, i),
                        })
                    })
                    .collect();
                // choice labels render inside the container
                let text = format!("{} {}", self.text, labels.join(" "));
                (Value::Array(controls), json!([]), Value::Null, json!([]), text)
            }
            FakeControl::Text => (input("text"), json!([]), Value::Null, json!([]), self.text.clone()),
            FakeControl::Email => (input("email"), json!([]), Value::Null, json!([]), self.text.clone()),
            FakeControl::Number => (input("number"), json!([]), Value::Null, json!([]), self.text.clone()),
            FakeControl::Textarea => (
                json!([{ "tag": "textarea", "name": name, "label": "", "locator": "textarea" }]),
                json!([]),
                Value::Null,
                json!([]),
                self.text.clone(),
            ),
            FakeControl::Select(labels) => {
                let mut options = vec!["-- please select --".to_string()];
                options.extend(labels.iter().cloned());
                (
                    json!([{ "tag": "select", "name": name, "label": "", "locator": "select" }]),
                    json!(options),
                    Value::Null,
                    json!([]),
                    self.text.clone(),
                )
            }
            FakeControl::Slider => (
                json!([]),
                json!([]),
                json!({ "locator": "> div:nth-of-type(2)" }),
                json!([]),
                self.text.clone(),
            ),
            FakeControl::Rating(max) => {
                let buttons: Vec<Value> = (0..=*max)
                    .map(|i| {
                        json!({
                            "label": i.to_string(),
                            "locator": format!("> div:nth-of-type(2) > button:nth-of-type({})", i + 1),
                        })
                    })
                    .collect();
                (json!([]), json!([]), Value::Null, Value::Array(buttons), self.text.clone())
            }
            FakeControl::None => (json!([]), json!([]), Value::Null, json!([]), self.text.clone()),
        };

        json!({
            "tag": "div",
            "domId": self.dom_id,
            "text": text,
            "metadata": "",
            "controls": controls,
            "options": options,
            "analogScale": analog,
            "ratingButtons": rating,
            "clearAffordance": if self.clearable { json!(".clear") } else { Value::Null },
        })
    }
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub long_title: String,
    pub short_name: String,
    pub questions: Vec<FakeQuestion>,
    pub previous: bool,
    /// Finish button instead of next
    pub last: bool,
}

impl FakePage {
    pub fn new(short_name: &str, questions: Vec<FakeQuestion>) -> Self {
        FakePage {
            long_title: format!("{} of the intake survey", short_name),
            short_name: short_name.to_string(),
            questions,
            previous: false,
            last: false,
        }
    }

    pub fn with_previous(mut self) -> Self {
        self.previous = true;
        self
    }

    pub fn last(mut self) -> Self {
        self.last = true;
        self
    }
}

// =========================================================================
// Fake driver
// =========================================================================

pub const NEXT: &str = "#next";
pub const PREVIOUS: &str = "#prev";
pub const FINISH: &str = "#finish";
pub const MODAL_TEXT: &str = "Please answer all required questions";

/// Scripted multi-step survey that answers the engine's page scripts
/// from an in-memory model.
#[derive(Debug, Default)]
pub struct FakeSurvey {
    pub pages: Vec<FakePage>,
    pub current: usize,
    pub has_root: bool,
    /// First next click wipes the step's answers and raises a modal.
    pub clear_on_first_submit: bool,
    /// Every next click raises a modal and stays.
    pub always_invalid: bool,
    /// Next clicks are swallowed.
    pub next_ignored: bool,
    /// Previous clicks are swallowed.
    pub previous_ignored: bool,
    /// Page index whose containers never render.
    pub blank_page: Option<usize>,
    pub modal_open: bool,
    /// The modal has no close button; only Escape dismisses it.
    pub modal_needs_escape: bool,
    pub submitted: bool,
    pub finished: bool,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub selected: Vec<(String, String)>,
    pub waits: Vec<u64>,
    pub screenshots: Vec<(CaptureTarget, PathBuf)>,
    pub scripts: Vec<&'static str>,
    pub keys: Vec<String>,
    pub waited_for: Vec<String>,
}

impl FakeSurvey {
    pub fn new(pages: Vec<FakePage>) -> Self {
        FakeSurvey {
            pages,
            has_root: true,
            ..Default::default()
        }
    }

    pub fn page(&self) -> &FakePage {
        &self.pages[self.current]
    }

    pub fn question(&self, dom_id: &str) -> Option<&FakeQuestion> {
        self.pages
            .iter()
            .flat_map(|p| p.questions.iter())
            .find(|q| q.dom_id == dom_id)
    }

    fn visible(&self) -> Vec<&FakeQuestion> {
        if self.blank_page == Some(self.current) {
            return vec![];
        }
        self.page().questions.iter().filter(|q| !q.hidden).collect()
    }

    /// Visible question on the current step addressed by `selector`.
    fn target(&self, selector: &str) -> Option<usize> {
        let tokens: Vec<&str> = selector.split_whitespace().collect();
        self.page()
            .questions
            .iter()
            .position(|q| !q.hidden && tokens.contains(&q.token().as_str()))
            .filter(|_| self.blank_page != Some(self.current))
    }

    fn answer(&mut self, index: usize, value: &str) {
        let current = self.current;
        let question = &mut self.pages[current].questions[index];
        question.answer = Some(value.to_string());
        let reveals = question.reveals.clone();
        for q in self.pages[current].questions.iter_mut() {
            if reveals.contains(&q.dom_id) {
                q.hidden = false;
            }
        }
    }

    fn buttons(&self) -> Vec<Value> {
        let page = self.page();
        let mut buttons = Vec::new();
        if page.previous {
            buttons.push(json!({ "label": "Back", "locator": PREVIOUS, "enabled": true, "hint": "prev" }));
        }
        if page.last {
            buttons.push(json!({ "label": "Submit", "locator": FINISH, "enabled": true, "hint": "" }));
        } else {
            buttons.push(json!({ "label": "Next", "locator": NEXT, "enabled": true, "hint": "" }));
        }
        buttons.push(json!({ "label": "Help", "locator": "#help", "enabled": true, "hint": "" }));
        buttons
    }

    fn submit(&mut self) {
        if self.always_invalid {
            self.modal_open = true;
            return;
        }
        if self.clear_on_first_submit && !self.submitted {
            self.submitted = true;
            let current = self.current;
            for q in self.pages[current].questions.iter_mut() {
                q.answer = None;
            }
            self.modal_open = true;
            return;
        }
        if !self.next_ignored && self.current + 1 < self.pages.len() {
            self.current += 1;
        }
    }
}

impl Driver for FakeSurvey {
    fn evaluate(&mut self, script: &PageScript) -> Result<Value, DriverError> {
        self.scripts.push(script.name());
        let value = match script {
            PageScript::ScrollContainer { .. } => json!(true),
            PageScript::ExtractTitle { .. } => json!({
                "longTitle": self.page().long_title,
                "shortName": self.page().short_name,
            }),
            PageScript::ExtractQuestions { .. } => {
                Value::Array(self.visible().iter().map(|q| q.raw()).collect())
            }
            PageScript::QuestionHeads { .. } => Value::Array(
                self.visible()
                    .iter()
                    .map(|q| json!(q.text.chars().take(32).collect::<String>()))
                    .collect(),
            ),
            PageScript::ExtractNavButtons => Value::Array(self.buttons()),
            PageScript::LocateByLabel { .. } => Value::Null,
            PageScript::ProbeModal => {
                if self.modal_open {
                    json!({ "locator": "[data-sw-modal=\"1\"]", "text": MODAL_TEXT })
                } else {
                    Value::Null
                }
            }
            PageScript::CloseModal => {
                if self.modal_needs_escape {
                    json!(false)
                } else {
                    let was_open = self.modal_open;
                    self.modal_open = false;
                    json!(was_open)
                }
            }
            PageScript::FieldIsEmpty { container, .. } => match self.target(container) {
                Some(i) => json!(self.page().questions[i].answer.is_none()),
                None => Value::Null,
            },
            PageScript::SetAnalogScale { container, fraction } => match self.target(container) {
                Some(i) => {
                    self.answer(i, &format!("{}", (fraction * 100.0).round()));
                    json!(true)
                }
                None => json!(false),
            },
            PageScript::PickSuggestion { .. } => json!(false),
        };
        Ok(value)
    }

    fn query_count(&mut self, selector: &str) -> Result<usize, DriverError> {
        let count = match selector {
            "#survey" => usize::from(self.has_root),
            "body" => 1,
            NEXT => usize::from(!self.page().last),
            FINISH => usize::from(self.page().last),
            PREVIOUS => usize::from(self.page().previous),
            "#help" => 1,
            _ => usize::from(self.target(selector).is_some()),
        };
        Ok(count)
    }

    fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.clicks.push(selector.to_string());
        match selector {
            NEXT => self.submit(),
            PREVIOUS => {
                if !self.previous_ignored && self.current > 0 {
                    self.current -= 1;
                }
            }
            FINISH => self.finished = true,
            _ => {
                let Some(index) = self.target(selector) else {
                    return Err(DriverError::ElementNotFound {
                        selector: selector.to_string(),
                    });
                };
                if selector.ends_with(".clear") {
                    let current = self.current;
                    self.pages[current].questions[index].answer = None;
                } else {
                    let value = selector
                        .rsplit("value=\"")
                        .next()
                        .map(|v| v.trim_end_matches("\"]").to_string())
                        .unwrap_or_default();
                    self.answer(index, &value);
                }
            }
        }
        Ok(())
    }

    fn type_text(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.typed.push((selector.to_string(), text.to_string()));
        let Some(index) = self.target(selector) else {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            });
        };
        self.answer(index, text);
        Ok(())
    }

    fn select(&mut self, selector: &str, label: &str) -> Result<(), DriverError> {
        self.selected.push((selector.to_string(), label.to_string()));
        let Some(index) = self.target(selector) else {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            });
        };
        self.answer(index, label);
        Ok(())
    }

    fn screenshot(&mut self, target: &CaptureTarget, path: &Path) -> Result<(), DriverError> {
        std::fs::write(path, b"").map_err(|e| DriverError::SessionIO(e.to_string()))?;
        self.screenshots.push((target.clone(), path.to_path_buf()));
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> Result<(), DriverError> {
        self.keys.push(key.to_string());
        if key == "Escape" {
            self.modal_open = false;
        }
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, _timeout_ms: u64) -> Result<bool, DriverError> {
        self.waited_for.push(selector.to_string());
        Ok(self.query_count(selector)? > 0)
    }

    fn wait_idle(&mut self, ms: u64) {
        self.waits.push(ms);
    }
}
