use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::page::{DomEvent, Element, ElementId, Page, PageError};

type ClickReaction = Box<dyn FnMut(&Element) -> Option<String> + Send>;

/// Everything the page was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Dispatched {
        target: ElementId,
        event: DomEvent,
        accepted: bool,
    },
    Clicked(ElementId),
    ValueSet { target: ElementId, value: String },
    TextSet { target: ElementId, value: String },
    Replaced { generation: u64 },
}

/// [`Page`] over an HTML document held in memory.
///
/// The markup is re-parsed on every query. Programmatic values live in side
/// tables keyed by [`ElementId`] and are dropped when the markup is replaced,
/// the same way a host re-render discards them.
pub struct HtmlPage {
    inner: Mutex<PageInner>,
}

struct PageInner {
    html: String,
    generation: u64,
    values: HashMap<ElementId, String>,
    texts: HashMap<ElementId, String>,
    events: Vec<PageEvent>,
    cancel_submits: bool,
    click_reaction: Option<ClickReaction>,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(PageInner {
                html: html.into(),
                generation: 1,
                values: HashMap::new(),
                texts: HashMap::new(),
                events: Vec::new(),
                cancel_submits: false,
                click_reaction: None,
            }),
        }
    }

    /// Swaps the whole document, as a host re-render would.
    pub fn replace_html(&self, html: impl Into<String>) {
        self.lock().replace(html.into());
    }

    pub fn html(&self) -> String {
        self.lock().html.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Makes every subsequent `submit` dispatch report cancellation.
    pub fn set_cancel_submits(&self, cancel: bool) {
        self.lock().cancel_submits = cancel;
    }

    /// Host behaviour on click: return replacement markup to re-render.
    pub fn on_click(&self, reaction: impl FnMut(&Element) -> Option<String> + Send + 'static) {
        self.lock().click_reaction = Some(Box::new(reaction));
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.lock().events.clone()
    }

    pub fn take_events(&self) -> Vec<PageEvent> {
        std::mem::take(&mut self.lock().events)
    }

    fn lock(&self) -> MutexGuard<'_, PageInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("HtmlPage")
            .field("generation", &inner.generation)
            .field("html_len", &inner.html.len())
            .field("events", &inner.events.len())
            .finish()
    }
}

impl PageInner {
    fn replace(&mut self, html: String) {
        self.html = html;
        self.generation += 1;
        self.values.clear();
        self.texts.clear();
        self.events.push(PageEvent::Replaced {
            generation: self.generation,
        });
    }

    fn parse(&self) -> Parsed {
        Parsed::new(&self.html)
    }

    fn resolve<'a>(&self, parsed: &'a Parsed, id: ElementId) -> Result<ElementRef<'a>, PageError> {
        if id.generation() != self.generation {
            return Err(PageError::StaleElement(id));
        }
        parsed.resolve(id.index()).ok_or(PageError::StaleElement(id))
    }

    fn snapshot(&self, parsed: &Parsed, element: ElementRef<'_>) -> Element {
        let index = parsed.order.get(&element.id()).copied().unwrap_or_default();
        let id = ElementId::new(self.generation, index);
        let value = element.value();
        Element {
            id,
            tag: value.name().to_ascii_lowercase(),
            attributes: value
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            text: self
                .texts
                .get(&id)
                .cloned()
                .unwrap_or_else(|| element.text().collect()),
            visible: is_rendered(element),
        }
    }
}

struct Parsed {
    doc: Html,
    order: HashMap<NodeId, usize>,
}

impl Parsed {
    fn new(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let order = doc
            .tree
            .root()
            .descendants()
            .enumerate()
            .map(|(index, node)| (node.id(), index))
            .collect();
        Self { doc, order }
    }

    fn resolve(&self, index: usize) -> Option<ElementRef<'_>> {
        self.doc
            .tree
            .root()
            .descendants()
            .nth(index)
            .and_then(ElementRef::wrap)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|_| PageError::InvalidSelector(selector.to_string()))
}

fn is_rendered(element: ElementRef<'_>) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .all(|el| !hides(el))
}

fn hides(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.to_ascii_lowercase().contains("display:none")
    })
}

impl Page for HtmlPage {
    fn select(&self, selector: &str) -> Result<Vec<Element>, PageError> {
        let selector = parse_selector(selector)?;
        let inner = self.lock();
        let parsed = inner.parse();
        let found = parsed
            .doc
            .select(&selector)
            .map(|el| inner.snapshot(&parsed, el))
            .collect();
        Ok(found)
    }

    fn select_within(&self, scope: ElementId, selector: &str) -> Result<Vec<Element>, PageError> {
        let selector = parse_selector(selector)?;
        let inner = self.lock();
        let parsed = inner.parse();
        let scope_ref = inner.resolve(&parsed, scope)?;
        let found = scope_ref
            .select(&selector)
            .filter(|el| el.id() != scope_ref.id())
            .map(|el| inner.snapshot(&parsed, el))
            .collect();
        Ok(found)
    }

    fn closest(&self, element: ElementId, selector: &str) -> Result<Option<Element>, PageError> {
        let selector = parse_selector(selector)?;
        let inner = self.lock();
        let parsed = inner.parse();
        let start = inner.resolve(&parsed, element)?;
        let found = std::iter::once(start)
            .chain(start.ancestors().filter_map(ElementRef::wrap))
            .find(|el| selector.matches(el))
            .map(|el| inner.snapshot(&parsed, el));
        Ok(found)
    }

    fn value(&self, element: ElementId) -> Result<String, PageError> {
        let inner = self.lock();
        let parsed = inner.parse();
        let el = inner.resolve(&parsed, element)?;
        if let Some(value) = inner.values.get(&element) {
            return Ok(value.clone());
        }
        match el.value().name() {
            "textarea" => Ok(el.text().collect()),
            "input" => Ok(el.value().attr("value").unwrap_or_default().to_string()),
            _ => Err(PageError::NotEditable(element)),
        }
    }

    fn text_content(&self, element: ElementId) -> Result<String, PageError> {
        let inner = self.lock();
        let parsed = inner.parse();
        let el = inner.resolve(&parsed, element)?;
        Ok(inner
            .texts
            .get(&element)
            .cloned()
            .unwrap_or_else(|| el.text().collect()))
    }

    fn set_value_native(&self, element: ElementId, value: &str) -> Result<(), PageError> {
        let mut inner = self.lock();
        let parsed = inner.parse();
        let el = inner.resolve(&parsed, element)?;
        if !matches!(el.value().name(), "textarea" | "input") {
            return Err(PageError::NotEditable(element));
        }
        inner.values.insert(element, value.to_string());
        inner.events.push(PageEvent::ValueSet {
            target: element,
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_text_content(&self, element: ElementId, value: &str) -> Result<(), PageError> {
        let mut inner = self.lock();
        let parsed = inner.parse();
        inner.resolve(&parsed, element)?;
        inner.texts.insert(element, value.to_string());
        inner.events.push(PageEvent::TextSet {
            target: element,
            value: value.to_string(),
        });
        Ok(())
    }

    fn dispatch(&self, element: ElementId, event: DomEvent) -> Result<bool, PageError> {
        let mut inner = self.lock();
        let parsed = inner.parse();
        inner.resolve(&parsed, element)?;
        let accepted = !(event == DomEvent::Submit && inner.cancel_submits);
        inner.events.push(PageEvent::Dispatched {
            target: element,
            event,
            accepted,
        });
        Ok(accepted)
    }

    fn click(&self, element: ElementId) -> Result<(), PageError> {
        let (snapshot, reaction) = {
            let mut inner = self.lock();
            let parsed = inner.parse();
            let el = inner.resolve(&parsed, element)?;
            let snapshot = inner.snapshot(&parsed, el);
            inner.events.push(PageEvent::Clicked(element));
            (snapshot, inner.click_reaction.take())
        };
        let Some(mut reaction) = reaction else {
            return Ok(());
        };

        // The reaction may query the page, so it runs unlocked.
        let rerender = reaction(&snapshot);

        let mut inner = self.lock();
        if inner.click_reaction.is_none() {
            inner.click_reaction = Some(reaction);
        }
        if let Some(html) = rerender {
            inner.replace(html);
        }
        Ok(())
    }
}
