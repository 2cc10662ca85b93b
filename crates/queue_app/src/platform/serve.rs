use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use queue_engine::{HtmlPage, LogPresenter, ProcessorSettings, QueueEngine, TokioTimer};
use queue_logging::{queue_debug, queue_info, queue_warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub struct ServeOptions {
    pub page: PathBuf,
    pub page_poll: Duration,
    pub settings: ProcessorSettings,
}

/// Serves requests from stdin against the page file until stdin closes and
/// the queue is drained, or until Ctrl-C.
pub async fn serve(options: ServeOptions) -> Result<()> {
    let mut watcher = PageWatcher::new(options.page.clone());
    let html = watcher
        .poll()
        .with_context(|| format!("read page {}", options.page.display()))?
        .unwrap_or_default();
    let page = Arc::new(HtmlPage::new(html));
    let engine = QueueEngine::with_detector(
        page.clone(),
        Arc::new(TokioTimer::new()),
        Arc::new(LogPresenter),
        options.settings,
    );
    engine.on_mutations();
    queue_info!("serving requests for {}", options.page.display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut tick = tokio::time::interval(options.page_poll);
    let mut stdin_open = true;

    loop {
        if !stdin_open && !engine.has_pending_work() {
            queue_info!("input closed and queue drained");
            break;
        }
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("read request")? {
                    Some(line) => {
                        if let Some(reply) = respond(&engine, &line) {
                            stdout.write_all(reply.as_bytes()).await?;
                            stdout.write_all(b"\n").await?;
                            stdout.flush().await?;
                        }
                    }
                    None => {
                        queue_debug!("stdin closed");
                        stdin_open = false;
                    }
                }
            }
            _ = tick.tick() => {
                match watcher.poll() {
                    Ok(Some(html)) => {
                        page.replace_html(html);
                        engine.on_mutations();
                    }
                    Ok(None) => {}
                    Err(err) => queue_warn!("page file unreadable: {}", err),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                queue_info!("interrupted");
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

/// Reply line for one request line. Unknown actions and malformed lines get none.
pub fn respond(engine: &QueueEngine, line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match engine.handle_raw_request(line) {
        Ok(Some(reply)) => match serde_json::to_string(&reply) {
            Ok(json) => Some(json),
            Err(err) => {
                queue_warn!("could not encode reply: {}", err);
                None
            }
        },
        Ok(None) => {
            queue_debug!("ignoring request with unknown action");
            None
        }
        Err(err) => {
            queue_warn!("malformed request: {}", err);
            None
        }
    }
}

/// Reports the page file's markup when it changed since the last poll.
pub struct PageWatcher {
    path: PathBuf,
    modified: Option<SystemTime>,
    content: Option<String>,
}

impl PageWatcher {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            modified: None,
            content: None,
        }
    }

    pub fn poll(&mut self) -> std::io::Result<Option<String>> {
        let modified = fs::metadata(&self.path)?.modified()?;
        if self.modified == Some(modified) {
            return Ok(None);
        }
        self.modified = Some(modified);
        let html = fs::read_to_string(&self.path)?;
        if self.content.as_deref() == Some(html.as_str()) {
            return Ok(None);
        }
        self.content = Some(html.clone());
        Ok(Some(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const IDLE: &str = r#"<form><textarea id="prompt-textarea"></textarea>
        <button data-testid="send-button">send</button></form>"#;

    fn touch(path: &Path, html: &str, secs: u64) {
        fs::write(path, html).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs))
            .unwrap();
    }

    #[test]
    fn watcher_reports_only_changed_markup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("page.html");
        touch(&path, "<p>one</p>", 0);

        let mut watcher = PageWatcher::new(path.clone());
        assert_eq!(watcher.poll().unwrap().as_deref(), Some("<p>one</p>"));
        assert_eq!(watcher.poll().unwrap(), None);

        touch(&path, "<p>one</p>", 5);
        assert_eq!(watcher.poll().unwrap(), None);

        touch(&path, "<p>two</p>", 10);
        assert_eq!(watcher.poll().unwrap().as_deref(), Some("<p>two</p>"));
    }

    #[test]
    fn missing_page_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut watcher = PageWatcher::new(temp.path().join("absent.html"));
        assert!(watcher.poll().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn request_lines_get_json_replies() {
        let engine = QueueEngine::with_detector(
            Arc::new(HtmlPage::new(IDLE)),
            Arc::new(TokioTimer::new()),
            Arc::new(LogPresenter),
            ProcessorSettings::default(),
        );

        assert_eq!(
            respond(&engine, r#"{"action":"enqueuePrompt","prompt":"hi"}"#).as_deref(),
            Some(r#"{"success":true}"#)
        );
        assert_eq!(
            respond(&engine, r#"{"action":"getStatus"}"#).as_deref(),
            Some(r#"{"queue":["hi"],"isResponding":false,"isProcessing":false}"#)
        );
        assert_eq!(
            respond(&engine, r#"{"action":"enqueuePrompt"}"#).as_deref(),
            Some(r#"{"success":false,"error":"Empty prompt"}"#)
        );
        assert_eq!(respond(&engine, r#"{"action":"wave"}"#), None);
        assert_eq!(respond(&engine, "{oops"), None);
        assert_eq!(respond(&engine, "   "), None);

        engine.shutdown().await;
    }
}
