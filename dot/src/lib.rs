//! Streaming Graphviz emitter.
//!
//! The transition graph is never held in memory: nodes and edges are written
//! as they resolve and the sink is flushed after every record, so a run that
//! is killed part way still leaves a readable (if unterminated) graph.
//!
//! ```text
//! digraph G {
//! #0 / 8
//! "R=0,E=0,S=0"
//! "R=0,E=0,S=0"->"R=1000,E=1000,S=1000"[label="setuid(1000)"]
//! ...
//! }
//! ```

use std::io::{self, Write};

use uidgraph_types::{IdentityState, TransitionEdge};

/// Writes one `digraph` to `W`, one flushed line at a time.
///
/// No validation is performed: duplicate edges are appended in arrival order.
pub struct GraphEmitter<W: Write> {
    out: W,
}

impl<W: Write> GraphEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn begin(&mut self) -> io::Result<()> {
        self.line(format_args!("digraph G {{"))
    }

    /// Progress marker followed by the quoted node declaration for `state`.
    pub fn state(&mut self, index: usize, total: usize, state: &IdentityState) -> io::Result<()> {
        writeln!(self.out, "#{index} / {total}")?;
        self.line(format_args!("\"{state}\""))
    }

    pub fn edge(&mut self, edge: &TransitionEdge<'_>) -> io::Result<()> {
        self.line(format_args!(
            "\"{}\"->\"{}\"[label=\"{}\"]",
            edge.source, edge.observed, edge.operation
        ))
    }

    /// Diagnostic comment. Line breaks in `text` are flattened so a comment
    /// never spills onto a line Graphviz would try to parse.
    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        let flat = text.replace(['\r', '\n'], " ");
        self.line(format_args!("# {flat}"))
    }

    pub fn end(&mut self) -> io::Result<()> {
        self.line(format_args!("}}"))
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
