//! In-memory retained scene implementing [`RenderSurface`].
//!
//! Keeps elements, listeners and deferred class changes on a virtual clock,
//! so a session can be driven by replayed clicks and exported as HTML.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::UiEvent;
use crate::infrastructure::traits::{ElementHandle, ElementKind, RenderSurface};

const EMPTY_STATE_TEXT: &str =
    "no categories registered\nuse the registration page to add categories";

#[derive(Debug, Clone, Serialize)]
pub struct SceneElement {
    pub handle: ElementHandle,
    pub kind: ElementKind,
    pub attributes: BTreeMap<String, String>,
    /// Inline styles in the order they were first set
    pub styles: Vec<(String, String)>,
    /// Classes in insertion order, no duplicates
    pub classes: Vec<String>,
    pub text: String,
}

impl SceneElement {
    fn new(handle: ElementHandle, kind: ElementKind) -> Self {
        Self {
            handle,
            kind,
            attributes: BTreeMap::new(),
            styles: Vec::new(),
            classes: Vec::new(),
            text: String::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn to_html(&self, out: &mut String) {
        let tag_attrs = self
            .attributes
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", k, escape_html(v)))
            .collect::<String>();
        let class = if self.classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", escape_html(&self.classes.join(" ")))
        };
        let style = if self.styles.is_empty() {
            String::new()
        } else {
            let css = self
                .styles
                .iter()
                .map(|(p, v)| format!("{p}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            format!(" style=\"{}\"", escape_html(&css))
        };
        let _ = write!(out, "  <div{tag_attrs}{class}{style}>");
        for line in self.text.lines() {
            let _ = write!(out, "<div>{}</div>", escape_html(line));
        }
        out.push_str("</div>\n");
    }
}

#[derive(Debug, Clone)]
struct PendingClass {
    due: Duration,
    element: ElementHandle,
    class: String,
}

#[derive(Debug, Default)]
pub struct SceneSurface {
    next_handle: u64,
    elements: HashMap<ElementHandle, SceneElement>,
    /// Attached elements in append order
    attached: Vec<ElementHandle>,
    listeners: HashMap<ElementHandle, UiEvent>,
    pending: Vec<PendingClass>,
    clock: Duration,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, handle: ElementHandle) -> Option<&SceneElement> {
        self.elements.get(&handle)
    }

    /// Attached elements in append order.
    pub fn elements(&self) -> impl Iterator<Item = &SceneElement> + '_ {
        self.attached.iter().filter_map(|h| self.elements.get(h))
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty_state(&self) -> bool {
        self.elements().any(|e| e.kind == ElementKind::EmptyState)
    }

    /// Attached element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.elements()
            .find(|e| e.attribute("id") == Some(id))
            .map(|e| e.handle)
    }

    pub fn has_listener(&self, handle: ElementHandle) -> bool {
        self.listeners.contains_key(&handle)
    }

    /// Dispatch a click: returns the registered payload, or None for
    /// elements without a listener.
    pub fn click(&self, handle: ElementHandle) -> Option<UiEvent> {
        let event = self.listeners.get(&handle).cloned();
        trace!("click {}: listener={}", handle, event.is_some());
        event
    }

    pub fn click_id(&self, id: &str) -> Option<UiEvent> {
        self.find_by_id(id).and_then(|h| self.click(h))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Move the virtual clock forward and apply every class change that fell due.
    /// Returns the number of changes applied.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.clock = self.clock.saturating_add(elapsed);
        let clock = self.clock;
        let (mut due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= clock);
        self.pending = later;
        due.sort_by_key(|p| p.due);
        let applied = due.len();
        for p in due {
            self.add_class(p.element, &p.class);
        }
        applied
    }

    /// Apply all pending class changes regardless of their delay.
    pub fn flush(&mut self) -> usize {
        let latest = self.pending.iter().map(|p| p.due).max();
        match latest {
            Some(due) => self.advance(due.saturating_sub(self.clock)),
            None => 0,
        }
    }

    /// Render the attached elements as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<div class=\"tree-container\">\n");
        for element in self.elements() {
            element.to_html(&mut out);
        }
        out.push_str("</div>\n");
        out
    }

    fn with_element(&mut self, handle: ElementHandle, f: impl FnOnce(&mut SceneElement)) {
        match self.elements.get_mut(&handle) {
            Some(element) => f(element),
            None => trace!("ignoring update of removed element {}", handle),
        }
    }
}

impl RenderSurface for SceneSurface {
    fn create_element(&mut self, kind: ElementKind) -> ElementHandle {
        self.next_handle += 1;
        let handle = ElementHandle(self.next_handle);
        self.elements.insert(handle, SceneElement::new(handle, kind));
        handle
    }

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        self.with_element(element, |e| {
            e.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str) {
        self.with_element(element, |e| {
            match e.styles.iter_mut().find(|(p, _)| p == property) {
                Some((_, v)) => *v = value.to_string(),
                None => e.styles.push((property.to_string(), value.to_string())),
            }
        });
    }

    fn set_text(&mut self, element: ElementHandle, text: &str) {
        self.with_element(element, |e| e.text = text.to_string());
    }

    fn add_class(&mut self, element: ElementHandle, class: &str) {
        self.with_element(element, |e| {
            if !e.has_class(class) {
                e.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&mut self, element: ElementHandle, class: &str) {
        self.with_element(element, |e| e.classes.retain(|c| c != class));
    }

    fn listen(&mut self, element: ElementHandle, event: UiEvent) {
        if self.elements.contains_key(&element) {
            self.listeners.insert(element, event);
        }
    }

    fn defer_class(&mut self, element: ElementHandle, class: &str, delay: Duration) {
        self.pending.push(PendingClass {
            due: self.clock.saturating_add(delay),
            element,
            class: class.to_string(),
        });
    }

    fn append(&mut self, element: ElementHandle) {
        if self.elements.contains_key(&element) && !self.attached.contains(&element) {
            self.attached.push(element);
        }
    }

    fn remove(&mut self, element: ElementHandle) {
        self.elements.remove(&element);
        self.listeners.remove(&element);
        self.attached.retain(|h| *h != element);
        self.pending.retain(|p| p.element != element);
    }

    fn clear(&mut self) {
        debug!("clearing scene: {} elements", self.elements.len());
        self.elements.clear();
        self.listeners.clear();
        self.attached.clear();
        self.pending.clear();
    }

    fn show_empty_state(&mut self) {
        self.clear();
        let element = self.create_element(ElementKind::EmptyState);
        self.add_class(element, "empty-tree");
        self.set_text(element, EMPTY_STATE_TEXT);
        self.append(element);
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
