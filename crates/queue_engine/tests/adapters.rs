use std::sync::Arc;

use pretty_assertions::assert_eq;
use queue_engine::{
    DomEvent, HtmlPage, InputAdapter, InputTarget, Page, PageEvent, SubmitAdapter,
};

fn page(html: &str) -> Arc<HtmlPage> {
    Arc::new(HtmlPage::new(html))
}

#[test]
fn root_textarea_wins_over_other_candidates() {
    let page = page(
        r#"<div contenteditable="true" data-id="root"></div>
           <textarea id="other"></textarea>
           <form><textarea data-id="root" id="main"></textarea></form>"#,
    );
    let input = InputAdapter::new(page.clone());
    let target = input.locate().unwrap();
    assert!(matches!(target, InputTarget::PlainField(_)));
    assert_eq!(target.element().attr("id"), Some("main"));
}

#[test]
fn content_editable_is_the_rich_variant() {
    let page = page(
        r#"<form><div contenteditable="true" placeholder="Message ChatGPT">hi</div></form>"#,
    );
    let input = InputAdapter::new(page.clone());
    let target = input.locate().unwrap();
    assert!(matches!(target, InputTarget::RichEditable(_)));
    assert_eq!(input.read(&target).unwrap(), "hi");
}

#[test]
fn missing_input_is_none() {
    let input = InputAdapter::new(page("<main><p>loading</p></main>"));
    assert!(input.locate().is_none());
}

#[test]
fn write_sets_value_then_notifies_host() {
    let page = page(r#"<form><textarea id="prompt-textarea"></textarea></form>"#);
    let input = InputAdapter::new(page.clone());
    let target = input.locate().unwrap();
    let id = target.id();

    input.write(&target, "Summarize this").unwrap();

    assert_eq!(input.read(&target).unwrap(), "Summarize this");
    assert_eq!(
        page.take_events(),
        vec![
            PageEvent::ValueSet {
                target: id,
                value: "Summarize this".to_string()
            },
            PageEvent::Dispatched {
                target: id,
                event: DomEvent::Input,
                accepted: true
            },
            PageEvent::Dispatched {
                target: id,
                event: DomEvent::Change,
                accepted: true
            },
            PageEvent::Dispatched {
                target: id,
                event: DomEvent::KeyDown,
                accepted: true
            },
        ]
    );
}

#[test]
fn rich_write_replaces_text_content() {
    let page = page(r#"<form><div contenteditable="true">old</div></form>"#);
    let input = InputAdapter::new(page.clone());
    let target = input.locate().unwrap();

    input.write(&target, "new text").unwrap();
    assert_eq!(input.read(&target).unwrap(), "new text");

    input.clear(&target).unwrap();
    assert_eq!(input.read(&target).unwrap(), "");
    assert!(page.events().iter().any(|event| matches!(
        event,
        PageEvent::TextSet { value, .. } if value.is_empty()
    )));
}

#[test]
fn preferred_send_control_is_used_first() {
    let page = page(
        r#"<form><textarea></textarea>
             <button id="labelled" aria-label="Send message">a</button>
             <button id="preferred" data-testid="send-button">b</button>
           </form>"#,
    );
    let submit = SubmitAdapter::new(page.clone());
    let button = submit.locate().unwrap();
    assert_eq!(button.attr("id"), Some("preferred"));
}

#[test]
fn localized_label_is_the_fallback() {
    let page = page(
        r#"<form><textarea></textarea>
             <button data-testid="send-button" disabled>b</button>
             <button id="ru" aria-label="Отправить сообщение">a</button>
           </form>"#,
    );
    let submit = SubmitAdapter::new(page.clone());
    let button = submit.locate().unwrap();
    assert_eq!(button.attr("id"), Some("ru"));
    assert!(SubmitAdapter::is_ready(&button));
}

#[test]
fn disabled_or_hidden_controls_are_not_candidates() {
    let page = page(
        r#"<form><textarea></textarea>
             <button data-testid="send-button" disabled>b</button>
             <div style="display:none"><button aria-label="Send">a</button></div>
           </form>"#,
    );
    let submit = SubmitAdapter::new(page.clone());
    assert!(submit.locate().is_none());
}

#[test]
fn invoke_clicks_the_control() {
    let page = page(r#"<form><textarea></textarea><button data-testid="send-button">b</button></form>"#);
    let submit = SubmitAdapter::new(page.clone());
    let button = submit.locate().unwrap();
    assert!(submit.invoke(&button).unwrap());
    assert_eq!(page.events(), vec![PageEvent::Clicked(button.id)]);
}

#[test]
fn form_fallback_reports_cancellation() {
    let page = page(r#"<form id="composer"><textarea></textarea></form>"#);
    let submit = SubmitAdapter::new(page.clone());
    assert!(submit.submit_via_form().unwrap());

    page.set_cancel_submits(true);
    assert!(!submit.submit_via_form().unwrap());

    let form = page.select("form").unwrap().remove(0);
    assert_eq!(
        page.events().last(),
        Some(&PageEvent::Dispatched {
            target: form.id,
            event: DomEvent::Submit,
            accepted: false
        })
    );
}

#[test]
fn form_fallback_without_form_is_not_accepted() {
    let page = page(r#"<div><textarea></textarea></div>"#);
    let submit = SubmitAdapter::new(page.clone());
    assert!(!submit.submit_via_form().unwrap());
    assert!(page.events().is_empty());
}
