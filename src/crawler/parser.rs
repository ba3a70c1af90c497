//! Incremental HTML link extraction
//!
//! The response body is fed to a streaming `lol_html` rewriter chunk by chunk
//! while the transfer is still running. Nothing is rewritten; the rewriter
//! only reports `<a href>` elements as soon as their start tag is complete.
//!
//! # Link Extraction Rules
//!
//! - Only `<a>` elements with an `href` attribute are considered
//! - The link is `base + href`, plain string concatenation
//! - Raw values `.` and `..` are skipped
//! - Comments and the bodies of `<script>` / `<style>` are not scanned
//! - Anything malformed is silently ignored

use lol_html::send::{Element, HtmlRewriter, Settings};
use lol_html::{element, OutputSink};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Output sink for a rewriter whose output nobody reads
#[derive(Debug)]
struct Discard;

impl OutputSink for Discard {
    fn handle_chunk(&mut self, _chunk: &[u8]) {}
}

/// Streaming `<a href>` extractor, one per worker
#[derive(Debug)]
pub struct LinkExtractor {
    rewriter: Option<HtmlRewriter<'static, Discard>>,
    found: Arc<Mutex<Vec<String>>>,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self {
            rewriter: None,
            found: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Begins a new document whose links resolve against `base_url`
    pub fn reset(&mut self, base_url: &str) {
        self.close();

        let base = base_url.to_string();
        let found = Arc::clone(&self.found);
        let settings = Settings {
            element_content_handlers: vec![element!("a[href]", move |el: &mut Element<'_, '_>| {
                if let Some(raw) = el.get_attribute("href") {
                    let href = decode_entities(&raw);
                    if href != "." && href != ".." {
                        found
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(format!("{}{}", base, href));
                    }
                }
                Ok(())
            })],
            strict: false,
            ..Settings::new_send()
        };

        self.rewriter = Some(HtmlRewriter::new(settings, Discard));
    }

    /// Scans the next chunk of the document, calling `emit` for every link
    ///
    /// Does nothing outside a `reset` / `close` scope. If the rewriter gives
    /// up on the document, the rest of it is ignored.
    pub fn feed<F>(&mut self, chunk: &[u8], mut emit: F)
    where
        F: FnMut(String),
    {
        let Some(rewriter) = self.rewriter.as_mut() else {
            return;
        };

        if let Err(e) = rewriter.write(chunk) {
            tracing::debug!("Link extraction stopped: {}", e);
            self.rewriter = None;
        }

        let links = std::mem::take(&mut *self.lock_found());
        for link in links {
            emit(link);
        }
    }

    /// Ends the current document; an unterminated trailing tag is dropped
    pub fn close(&mut self) {
        if let Some(rewriter) = self.rewriter.take() {
            if let Err(e) = rewriter.end() {
                tracing::trace!("Discarding malformed document tail: {}", e);
            }
        }
        self.lock_found().clear();
    }

    fn lock_found(&self) -> MutexGuard<'_, Vec<String>> {
        self.found.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes the character references that commonly show up in URLs
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric(entity),
            };
            ch.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, used)) => {
                out.push(c);
                rest = &rest[used..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_numeric(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
