use std::sync::Arc;

use queue_engine::{BusyDetector, BusyProbe, BusySignal, HtmlPage, Page};

fn detector(html: &str) -> BusyDetector {
    let page: Arc<dyn Page> = Arc::new(HtmlPage::new(html));
    BusyDetector::new(page)
}

const IDLE: &str = r#"
    <html><body><form>
      <textarea id="prompt-textarea"></textarea>
      <button data-testid="send-button" aria-label="Send prompt">
        <svg><path d="M2 2L10 10"></path></svg>
      </button>
    </form></body></html>
"#;

#[test]
fn idle_page_has_no_signal() {
    let detector = detector(IDLE);
    assert_eq!(detector.detect().unwrap(), None);
    assert!(!detector.is_busy());
}

#[test]
fn labelled_stop_control_anywhere_reads_busy() {
    let detector = detector(
        r#"<html><body>
             <div><button aria-label="Stop generating">■</button></div>
             <form><textarea></textarea></form>
           </body></html>"#,
    );
    assert_eq!(detector.detect().unwrap(), Some(BusySignal::StopControl));
    assert!(detector.is_busy());
}

#[test]
fn stop_label_matches_case_insensitively() {
    let detector = detector(r#"<button aria-label="STOP STREAMING"></button>"#);
    assert_eq!(detector.detect().unwrap(), Some(BusySignal::StopControl));
}

#[test]
fn hidden_stop_control_is_ignored() {
    let detector = detector(
        r#"<html><body>
             <div hidden><button aria-label="Stop generating"></button></div>
             <button aria-label="Stop" style="display: none"></button>
             <form><textarea></textarea><button aria-label="Send">go</button></form>
           </body></html>"#,
    );
    assert_eq!(detector.detect().unwrap(), None);
    assert!(!detector.is_busy());
}

#[test]
fn stop_text_in_form_control_reads_busy() {
    let detector = detector(
        r#"<form><textarea></textarea><button type="button">Stop</button></form>"#,
    );
    assert_eq!(detector.detect().unwrap(), Some(BusySignal::StopKeyword));
}

#[test]
fn generating_label_in_form_control_reads_busy() {
    // "generating" alone is not one of the stop phrases, so only the form rule fires.
    let detector = detector(
        r#"<form><button aria-label="Generating answer">…</button></form>"#,
    );
    assert_eq!(detector.detect().unwrap(), Some(BusySignal::StopKeyword));
}

#[test]
fn disabled_form_control_does_not_count() {
    let detector = detector(r#"<form><button disabled>Stop</button></form>"#);
    assert_eq!(detector.detect().unwrap(), None);
}

#[test]
fn stop_glyph_in_form_control_reads_busy() {
    let detector = detector(
        r#"<form><textarea></textarea>
             <button data-testid="composer-action">
               <svg viewBox="0 0 20 20">
                 <path d="M8.99992 16V6.41407L5.70696 9.70704C5.31643 10.0976 4.68342 10.0976 4.29289 9.70704L15.707 8.29298Z"></path>
               </svg>
             </button>
           </form>"#,
    );
    assert_eq!(detector.detect().unwrap(), Some(BusySignal::StopGlyph));
}

#[test]
fn partial_glyph_is_not_enough() {
    let detector = detector(
        r#"<form><button><svg><path d="M8.99992 16V6.41407L1 1"></path></svg></button></form>"#,
    );
    assert_eq!(detector.detect().unwrap(), None);
}

#[test]
fn detection_has_no_side_effects() {
    let page = Arc::new(HtmlPage::new(
        r#"<form><button aria-label="Stop generating"></button></form>"#,
    ));
    let detector = BusyDetector::new(page.clone());
    let first = detector.is_busy();
    let second = detector.is_busy();
    assert!(first);
    assert_eq!(first, second);
    assert!(page.events().is_empty());

    page.replace_html(IDLE);
    assert!(!detector.is_busy());
}
