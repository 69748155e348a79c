use serde_json::{Value, json};

use crate::survey::model::InputKind;

/// Named in-page functions the engine runs through `Driver::evaluate`.
///
/// Each variant carries its arguments; `source()` holds the JavaScript body
/// the live session ships to the page. Drivers that do not talk to a real
/// page (tests, recorders) match on the variant instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PageScript {
    /// Scroll the root container to its end (or back to its start).
    ScrollContainer { root: String, to_end: bool },
    /// Co-located paragraph title + short label.
    ExtractTitle { root: String },
    /// Every visible question container under the root.
    ExtractQuestions { root: String, container_class: String },
    /// Leading text of every visible question container, in DOM order.
    QuestionHeads { root: String, container_class: String },
    /// Every visible button-like element on the page.
    ExtractNavButtons,
    /// Tag the first element under `scope` whose label matches and return a selector for it.
    LocateByLabel { scope: String, labels: Vec<String> },
    ProbeModal,
    CloseModal,
    /// Live value/selection check of one question container.
    FieldIsEmpty { container: String, kind: InputKind },
    SetAnalogScale { container: String, fraction: f64 },
    PickSuggestion { container: String },
}

impl PageScript {
    pub fn name(&self) -> &'static str {
        match self {
            PageScript::ScrollContainer { .. } => "scroll_container",
            PageScript::ExtractTitle { .. } => "extract_title",
            PageScript::ExtractQuestions { .. } => "extract_questions",
            PageScript::QuestionHeads { .. } => "question_heads",
            PageScript::ExtractNavButtons => "extract_nav_buttons",
            PageScript::LocateByLabel { .. } => "locate_by_label",
            PageScript::ProbeModal => "probe_modal",
            PageScript::CloseModal => "close_modal",
            PageScript::FieldIsEmpty { .. } => "field_is_empty",
            PageScript::SetAnalogScale { .. } => "set_analog_scale",
            PageScript::PickSuggestion { .. } => "pick_suggestion",
        }
    }

    /// Arguments object passed as the single parameter of `source()`.
    pub fn args(&self) -> Value {
        match self {
            PageScript::ScrollContainer { root, to_end } => json!({ "root": root, "toEnd": to_end }),
            PageScript::ExtractTitle { root } => json!({ "root": root }),
            PageScript::ExtractQuestions {
                root,
                container_class,
            }
            | PageScript::QuestionHeads {
                root,
                container_class,
            } => json!({ "root": root, "containerClass": container_class }),
            PageScript::LocateByLabel { scope, labels } => {
                json!({ "scope": scope, "labels": labels })
            }
            PageScript::FieldIsEmpty { container, kind } => {
                json!({ "container": container, "kind": kind })
            }
            PageScript::SetAnalogScale {
                container,
                fraction,
            } => json!({ "container": container, "fraction": fraction }),
            PageScript::PickSuggestion { container } => json!({ "container": container }),
            PageScript::ExtractNavButtons
            | PageScript::ProbeModal
            | PageScript::CloseModal => json!({}),
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            PageScript::ScrollContainer { .. } => SCROLL_CONTAINER,
            PageScript::ExtractTitle { .. } => EXTRACT_TITLE,
            PageScript::ExtractQuestions { .. } => EXTRACT_QUESTIONS,
            PageScript::QuestionHeads { .. } => QUESTION_HEADS,
            PageScript::ExtractNavButtons => EXTRACT_NAV_BUTTONS,
            PageScript::LocateByLabel { .. } => LOCATE_BY_LABEL,
            PageScript::ProbeModal => PROBE_MODAL,
            PageScript::CloseModal => CLOSE_MODAL,
            PageScript::FieldIsEmpty { .. } => FIELD_IS_EMPTY,
            PageScript::SetAnalogScale { .. } => SET_ANALOG_SCALE,
            PageScript::PickSuggestion { .. } => PICK_SUGGESTION,
        }
    }
}

// ============================================================================
// Shared helpers (prepended to every script body by the session helper)
// ============================================================================

pub const PRELUDE: &str = r#"
const clean = (s) => (s || '').replace(/\s+/g, ' ').trim();
const visible = (el) => {
  if (!el) return false;
  const s = getComputedStyle(el);
  return s.display !== 'none' && s.visibility !== 'hidden' && el.getClientRects().length > 0;
};
const pathWithin = (ancestor, el) => {
  const steps = [];
  let node = el;
  while (node && node !== ancestor) {
    const tag = node.tagName.toLowerCase();
    const same = Array.from(node.parentElement ? node.parentElement.children : []).filter((c) => c.tagName === node.tagName);
    steps.unshift(`${tag}:nth-of-type(${same.indexOf(node) + 1})`);
    node = node.parentElement;
  }
  return '> ' + steps.join(' > ');
};
const textOf = (node) => {
  const parts = [];
  const walker = document.createTreeWalker(node, NodeFilter.SHOW_TEXT, {
    acceptNode: (t) => {
      const p = t.parentElement;
      if (!p || /^(SCRIPT|STYLE|OPTION|SELECT|TEXTAREA|INPUT|BUTTON|NOSCRIPT)$/.test(p.tagName)) return NodeFilter.FILTER_REJECT;
      return visible(p) ? NodeFilter.FILTER_ACCEPT : NodeFilter.FILTER_REJECT;
    },
  });
  while (walker.nextNode()) parts.push(walker.currentNode.nodeValue);
  return clean(parts.join(' '));
};
const containersOf = (root, containerClass) => {
  const scope = document.querySelector(root) || document.body;
  const all = Array.from(scope.querySelectorAll(`[class*="${containerClass}"]`));
  // nested matches (e.g. "question-text" inside "question") belong to the outer container
  return all.filter((el) => visible(el) && !all.some((o) => o !== el && o.contains(el)));
};
"#;

const SCROLL_CONTAINER: &str = r#"({ root, toEnd }) => {
  const el = document.querySelector(root) || document.scrollingElement || document.body;
  const top = toEnd ? el.scrollHeight : 0;
  if (el.scrollTo) el.scrollTo(0, top); else el.scrollTop = top;
  window.scrollTo(0, toEnd ? document.body.scrollHeight : 0);
  return true;
}"#;

const EXTRACT_TITLE: &str = r#"({ root }) => {
  const scope = document.querySelector(root) || document.body;
  for (const p of scope.querySelectorAll('p, h1, h2, h3')) {
    const parent = p.parentElement;
    if (!parent || !clean(p.innerText)) continue;
    const label = Array.from(parent.children).find((c) =>
      c !== p && /^(SPAN|SMALL|LABEL|DIV|STRONG|B)$/.test(c.tagName) &&
      clean(c.innerText).length > 0 && clean(c.innerText).length <= 40);
    if (label) return { longTitle: clean(p.innerText), shortName: clean(label.innerText) };
  }
  const heading = scope.querySelector('h1, h2, h3, p');
  const title = heading ? clean(heading.innerText) : clean(document.title);
  return { longTitle: title, shortName: title.slice(0, 40) };
}"#;

const EXTRACT_QUESTIONS: &str = r#"({ root, containerClass }) => {
  const stable = ['data-question-id', 'data-qid', 'data-id', 'data-testid', 'data-qa'];
  const labelFor = (input) => {
    if (input.id) {
      const l = document.querySelector(`label[for="${CSS.escape(input.id)}"]`);
      if (l) return clean(l.innerText);
    }
    const wrap = input.closest('label');
    if (wrap) return clean(wrap.innerText);
    const next = input.nextElementSibling;
    if (next && /^(LABEL|SPAN)$/.test(next.tagName)) return clean(next.innerText);
    return clean(input.getAttribute('aria-label') || '');
  };
  const locatorOf = (container, el) => {
    if (el.id) return `#${CSS.escape(el.id)}`;
    const tag = el.tagName.toLowerCase();
    if (el.name && (el.type === 'radio' || el.type === 'checkbox')) return `${tag}[name="${el.name}"][value="${el.value}"]`;
    if (el.name) return `${tag}[name="${el.name}"]`;
    return pathWithin(container, el);
  };
  return containersOf(root, containerClass).map((container) => {
    const parent = container.parentElement;
    const siblings = parent ? Array.from(parent.children).filter((c) => c.tagName === container.tagName) : [];
    const scope = document.querySelector(root) || document.body;
    const slider = container.querySelector('[role="slider"], input[type="range"], [class*="vas"], [class*="slider"]');
    const rating = Array.from(container.querySelectorAll('[class*="nrs"] button, [class*="rating"] button, [class*="scale"] button'))
      .filter((b) => /^\d+$/.test(clean(b.innerText)));
    const controls = Array.from(container.querySelectorAll('input, select, textarea')).map((el) => ({
      tag: el.tagName.toLowerCase(),
      type: el.tagName === 'INPUT' ? (el.getAttribute('type') || 'text').toLowerCase() : null,
      name: el.getAttribute('name'),
      domId: el.id || null,
      label: labelFor(el),
      hidden: el.type === 'hidden' || !visible(el),
      required: el.required || el.getAttribute('aria-required') === 'true',
      autocomplete: el.getAttribute('role') === 'combobox' || el.hasAttribute('aria-autocomplete'),
      locator: locatorOf(container, el),
    }));
    const select = container.querySelector('select');
    const clear = container.querySelector('[class*="clear"], [class*="reset"], button[aria-label*="clear" i]');
    return {
      tag: container.tagName.toLowerCase(),
      domId: container.id || null,
      dataAttributes: stable.filter((a) => container.hasAttribute(a)).map((a) => [a, container.getAttribute(a)]),
      nthOfType: siblings.length > 1 ? siblings.indexOf(container) + 1 : null,
      ancestorPath: scope.contains(container) ? pathWithin(scope, container) : null,
      text: textOf(container),
      metadata: clean(Array.from(container.querySelectorAll('input, select, textarea'))
        .map((el) => [el.getAttribute('placeholder'), el.getAttribute('aria-label'), el.name, el.className, el.getAttribute('data-type')].filter(Boolean).join(' '))
        .join(' ')),
      controls,
      options: select ? Array.from(select.options).map((o) => clean(o.text)) : [],
      analogScale: slider ? { locator: pathWithin(container, slider) } : null,
      ratingButtons: rating.map((b) => ({ label: clean(b.innerText), locator: pathWithin(container, b) })),
      clearAffordance: clear ? pathWithin(container, clear) : null,
    };
  });
}"#;

const QUESTION_HEADS: &str = r#"({ root, containerClass }) =>
  containersOf(root, containerClass).map((c) => textOf(c).slice(0, 32))"#;

const EXTRACT_NAV_BUTTONS: &str = r#"() => {
  const nodes = Array.from(document.querySelectorAll('button, input[type="submit"], input[type="button"], a[role="button"], [role="button"]'));
  return nodes.filter(visible).map((el, i) => {
    el.setAttribute('data-sw-nav', String(i));
    return {
      label: clean(el.innerText || el.value || el.getAttribute('aria-label')),
      locator: el.id ? `#${CSS.escape(el.id)}` : `[data-sw-nav="${i}"]`,
      enabled: !el.disabled && el.getAttribute('aria-disabled') !== 'true',
      role: el.getAttribute('role'),
      hint: [el.id, typeof el.className === 'string' ? el.className : '', el.getAttribute('aria-label'), el.getAttribute('title')].filter(Boolean).join(' '),
    };
  });
}"#;

const LOCATE_BY_LABEL: &str = r#"({ scope, labels }) => {
  const base = document.querySelector(scope) || document.body;
  const wanted = labels.map((l) => clean(l).toLowerCase()).filter(Boolean);
  const nodes = Array.from(base.querySelectorAll('button, a, label, input[type="submit"], input[type="button"], [role="button"], [role="radio"], [role="option"], span'));
  const labelOf = (el) => clean(el.innerText || el.value || el.getAttribute('aria-label')).toLowerCase();
  const hit = nodes.find((el) => visible(el) && wanted.includes(labelOf(el)))
    || nodes.find((el) => visible(el) && wanted.some((w) => labelOf(el).includes(w)));
  if (!hit) return null;
  const mark = `sw-${Date.now()}-${Math.floor(Math.random() * 1e6)}`;
  hit.setAttribute('data-sw-locate', mark);
  return `[data-sw-locate="${mark}"]`;
}"#;

const PROBE_MODAL: &str = r#"() => {
  const el = Array.from(document.querySelectorAll('[role="dialog"], [role="alertdialog"], [role="alert"], .modal, [class*="modal"], [class*="dialog"]'))
    .find((m) => visible(m) && clean(m.innerText).length > 0);
  if (!el) return null;
  el.setAttribute('data-sw-modal', '1');
  return { locator: '[data-sw-modal="1"]', text: clean(el.innerText).slice(0, 300) };
}"#;

const CLOSE_MODAL: &str = r#"() => {
  const modal = document.querySelector('[data-sw-modal="1"]')
    || document.querySelector('[role="dialog"], [role="alertdialog"], [role="alert"], .modal');
  if (!modal) return false;
  const words = ['close', 'ok', 'schließen', 'schliessen', 'verstanden', 'got it', '×', 'x'];
  const btn = Array.from(modal.querySelectorAll('button, [role="button"], a, .close, [class*="close"]'))
    .find((b) => words.includes(clean(b.innerText || b.getAttribute('aria-label')).toLowerCase())
      || /close/i.test(b.className || '') || /close/i.test(b.getAttribute('aria-label') || ''));
  if (!btn) return false;
  btn.click();
  return true;
}"#;

const FIELD_IS_EMPTY: &str = r#"({ container, kind }) => {
  const c = document.querySelector(container);
  if (!c || !visible(c)) return null;
  const picked = (el) => el.getAttribute('aria-pressed') === 'true' || el.getAttribute('aria-checked') === 'true'
    || /\b(selected|active|checked)\b/.test(el.className || '');
  switch (kind) {
    case 'radio':
    case 'checkbox':
      return !Array.from(c.querySelectorAll('input')).some((i) => i.checked)
        && !Array.from(c.querySelectorAll('[role="radio"], [role="checkbox"]')).some(picked);
    case 'dropdown': {
      const s = c.querySelector('select');
      return !s || s.value === '' || (s.selectedIndex <= 0 && clean(s.options[0] && s.options[0].text) === '');
    }
    case 'VAS': {
      const slider = c.querySelector('[role="slider"], input[type="range"], [class*="vas"], [class*="slider"]');
      return !slider || !(slider.hasAttribute('data-sw-touched') || slider.getAttribute('aria-valuenow'));
    }
    case 'NRS':
      return !Array.from(c.querySelectorAll('button')).some(picked);
    default:
      return Array.from(c.querySelectorAll('input:not([type="hidden"]), textarea'))
        .filter(visible)
        .every((i) => clean(i.value) === '');
  }
}"#;

const SET_ANALOG_SCALE: &str = r#"({ container, fraction }) => {
  const c = document.querySelector(container);
  if (!c) return false;
  const slider = c.querySelector('input[type="range"]') || c.querySelector('[role="slider"], [class*="vas"], [class*="slider"]');
  if (!slider) return false;
  if (slider.tagName === 'INPUT') {
    const min = Number(slider.min || 0);
    const max = Number(slider.max || 100);
    slider.value = String(min + fraction * (max - min));
    slider.dispatchEvent(new Event('input', { bubbles: true }));
    slider.dispatchEvent(new Event('change', { bubbles: true }));
  } else {
    const track = slider.closest('[class*="track"]') || slider.parentElement || slider;
    const rect = track.getBoundingClientRect();
    const x = rect.left + fraction * rect.width;
    const y = rect.top + rect.height / 2;
    for (const type of ['pointerdown', 'mousedown', 'pointerup', 'mouseup', 'click']) {
      const Ctor = type.startsWith('pointer') ? PointerEvent : MouseEvent;
      track.dispatchEvent(new Ctor(type, { clientX: x, clientY: y, bubbles: true }));
    }
  }
  slider.setAttribute('data-sw-touched', '1');
  return true;
}"#;

const PICK_SUGGESTION: &str = r#"({ container }) => {
  const c = document.querySelector(container) || document.body;
  const option = Array.from(c.querySelectorAll('[role="option"], [class*="option"], [class*="suggestion"] li'))
    .concat(Array.from(document.querySelectorAll('[role="listbox"] [role="option"]')))
    .find(visible);
  if (!option) return false;
  option.click();
  return true;
}"#;
