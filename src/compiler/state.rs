//! Per-pass render state: the output buffer, the early-exit flags, tag
//! capture and the output-to-source line table.

use std::sync::Arc;

use crate::evaluator::Scope;

/// Everything one `execute` pass mutates while it scans.
///
/// Output stops accumulating once an exit has been requested and a later
/// print observes it; scanning itself is governed by the compiler's
/// [`ExitPolicy`](crate::config::ExitPolicy).
#[derive(Debug)]
pub struct RenderState {
    buffer: String,
    /// Set by directive code that wants the render to stop.
    exiting: bool,
    /// Set when a print observes `exiting`; from then on prints are no-ops.
    exited: bool,
    /// Number of completed (newline-terminated) output lines.
    line: usize,
    /// Source line recorded by `mark_line` for the output line in progress.
    pending_mark: Option<usize>,
    line_map: Vec<usize>,
    /// Bodies of the tags currently being captured, innermost last.
    tags: Vec<String>,
    skip_line_break: bool,
    scope: Arc<Scope>,
    line_marker: String,
}

impl RenderState {
    pub fn new(scope: Arc<Scope>, line_marker: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            exiting: false,
            exited: false,
            line: 0,
            pending_mark: None,
            line_map: Vec::new(),
            tags: Vec::new(),
            skip_line_break: false,
            scope,
            line_marker: line_marker.into(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Output produced so far.
    pub fn output(&self) -> &str {
        &self.buffer
    }

    pub fn line_map(&self) -> &[usize] {
        &self.line_map
    }

    /// 0-based index of the output line currently being written.
    pub fn current_output_line(&self) -> usize {
        self.line
    }

    /// Tag nesting level; non-zero while a tag body is being captured.
    pub fn level(&self) -> usize {
        self.tags.len()
    }

    // ── Early termination ──

    /// Request that the render stop producing output. Takes effect at the
    /// next print.
    pub fn request_exit(&mut self) {
        self.exiting = true;
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    fn check_exit(&mut self) {
        if self.exiting {
            self.exited = true;
        }
    }

    // ── Output ──

    pub fn print(&mut self, text: &str) {
        self.check_exit();
        if !self.exited {
            self.push(text);
        }
    }

    pub fn println(&mut self, text: &str) {
        self.check_exit();
        if !self.exited {
            self.push(text);
            self.push("\n");
        }
    }

    /// Append even after the render has exited.
    pub fn print_forced(&mut self, text: &str) {
        self.push(text);
        self.check_exit();
    }

    /// Discard everything printed so far, line table included.
    pub fn clear(&mut self) {
        self.check_exit();
        if !self.exited {
            self.buffer.clear();
            self.line = 0;
            self.pending_mark = None;
            self.line_map.clear();
        }
    }

    /// Write a line marker for `source_line` and record it as the origin of
    /// the current output line. The entry lands in the line table when that
    /// line is completed.
    pub fn mark_line(&mut self, source_line: usize) {
        self.check_exit();
        if !self.exited {
            let marker = format!("{}{}", self.line_marker, source_line);
            self.push(&marker);
            self.pending_mark = Some(source_line);
        }
    }

    /// Route literal template text: into the innermost captured tag body if
    /// one is open, otherwise onto the page.
    pub fn plain(&mut self, text: &str) {
        if self.tags.is_empty() {
            self.print(text);
        } else {
            self.tag_print(text);
        }
    }

    /// [`plain`](Self::plain) followed by a line break.
    pub fn plain_line(&mut self, text: &str) {
        if self.tags.is_empty() {
            self.println(text);
        } else {
            self.tag_print(text);
            self.tag_print("\n");
        }
    }

    fn tag_print(&mut self, text: &str) {
        if !self.exiting {
            if let Some(body) = self.tags.last_mut() {
                body.push_str(text);
            }
        }
    }

    fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
        for _ in text.matches('\n') {
            if let Some(source_line) = self.pending_mark.take() {
                if self.line_map.len() <= self.line {
                    self.line_map.resize(self.line + 1, 0);
                }
                self.line_map[self.line] = source_line;
            }
            self.line += 1;
        }
    }

    // ── Tag capture ──

    /// Start capturing literal text into a new tag body.
    pub fn open_tag(&mut self) {
        self.tags.push(String::new());
    }

    /// Stop capturing the innermost tag and return its body.
    pub fn close_tag(&mut self) -> Option<String> {
        self.tags.pop()
    }

    // ── Comment line breaks ──

    pub(crate) fn request_line_break_skip(&mut self) {
        self.skip_line_break = true;
    }

    /// Whether the previous token was a comment asking for its trailing
    /// line break to be swallowed. Clears the request.
    pub(crate) fn take_skip_line_break(&mut self) -> bool {
        std::mem::take(&mut self.skip_line_break)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<usize>) {
        (self.buffer, self.line_map)
    }
}
