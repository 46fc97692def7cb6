//! Source files and locations.
//!
//! Every WebIDL construct remembers where it came from through a [`Location`].
//! A location is either a byte span inside a registered [`SourceFile`] or a
//! synthetic builtin marker for definitions injected before any file is read.
//!
//! Line and column numbers are derived lazily: each [`SourceFile`] computes its
//! line-start table the first time a location inside it is resolved and keeps
//! it for every later lookup.
//!
//! # Example
//!
//! ```
//! use webidl_core::{location::{Location, SourceMap}, span::Span};
//!
//! let mut sources = SourceMap::new();
//! let file = sources.add("dom.webidl", "interface Node {\n  attribute long x;\n};\n");
//!
//! let location = Location::new(file, Span::new(29..33));
//! assert_eq!(location.resolve(&sources), Some((2, 12)));
//! assert_eq!(
//!     location.render(&sources),
//!     "dom.webidl line 2:12\n  attribute long x;\n            ^"
//! );
//! ```

use std::{cell::OnceCell, fmt};

use log::debug;

use crate::span::Span;

/// Marker used by definitions that the parser registers itself.
pub const BUILTIN: &str = "<builtin>";

/// Marker used by the builtin buffer and typed-array types.
pub const BUILTIN_TYPE: &str = "<builtin type>";

/// Handle to a file registered in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Position of the file inside its [`SourceMap`].
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A source text together with its name and a memoized line index.
#[derive(Debug)]
pub struct SourceFile {
    name: String,
    text: String,
    line_starts: OnceCell<Vec<usize>>,
}

impl SourceFile {
    fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            line_starts: OnceCell::new(),
        }
    }

    /// The file name as given to the parser.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn line_starts(&self) -> &[usize] {
        self.line_starts.get_or_init(|| {
            std::iter::once(0)
                .chain(
                    self.text
                        .char_indices()
                        .filter(|(_, c)| *c == '\n')
                        .map(|(i, _)| i + 1),
                )
                .collect()
        })
    }

    /// Resolves a byte offset to a 1-based line and 0-based column.
    ///
    /// Columns count characters, not bytes. Offsets past the end of the text
    /// are clamped to the end.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let starts = self.line_starts();
        let line = match starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = starts[line];
        let col = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());
        (line + 1, col)
    }

    /// Returns the text of a 1-based line without its terminator.
    pub fn line_text(&self, line: usize) -> &str {
        let starts = self.line_starts();
        let Some(&start) = line.checked_sub(1).and_then(|idx| starts.get(idx)) else {
            return "";
        };
        let end = starts.get(line).map_or(self.text.len(), |next| next - 1);
        self.text
            .get(start..end)
            .unwrap_or_default()
            .trim_end_matches('\r')
    }
}

/// Registry of every source text fed to the parser.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source text and return its handle.
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let file = SourceFile::new(name, text);
        debug!(name = file.name(), bytes = file.text().len(); "Registered source file");
        let id = FileId(self.files.len() as u32);
        self.files.push(file);
        id
    }

    /// Look up a registered file.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Iterate over all registered files with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(idx, file)| (FileId(idx as u32), file))
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when no file has been registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Where a construct was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// A span inside a registered source file.
    File { file: FileId, span: Span },
    /// A definition injected by the parser itself.
    Builtin(&'static str),
}

impl Location {
    /// Create a location inside a source file.
    pub fn new(file: FileId, span: Span) -> Self {
        Location::File { file, span }
    }

    /// Create a builtin location that renders as `marker`.
    pub fn builtin(marker: &'static str) -> Self {
        Location::Builtin(marker)
    }

    /// Returns `true` for builtin locations.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Location::Builtin(_))
    }

    /// The file this location points into, if any.
    pub fn file(&self) -> Option<FileId> {
        match self {
            Location::File { file, .. } => Some(*file),
            Location::Builtin(_) => None,
        }
    }

    /// The byte span of this location, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Location::File { span, .. } => Some(*span),
            Location::Builtin(_) => None,
        }
    }

    /// The name of the file this location points into.
    ///
    /// Builtin locations report their marker.
    pub fn filename<'a>(&self, sources: &'a SourceMap) -> Option<&'a str> {
        match self {
            Location::File { file, .. } => sources.get(*file).map(SourceFile::name),
            Location::Builtin(marker) => Some(marker),
        }
    }

    /// Resolves to a 1-based line and 0-based column.
    pub fn resolve(&self, sources: &SourceMap) -> Option<(usize, usize)> {
        match self {
            Location::File { file, span } => {
                sources.get(*file).map(|src| src.line_col(span.start()))
            }
            Location::Builtin(_) => None,
        }
    }

    /// Renders `"<file> line <n>:<col>\n<source line>\n<caret line>"`.
    pub fn render(&self, sources: &SourceMap) -> String {
        match self {
            Location::Builtin(marker) => (*marker).to_string(),
            Location::File { file, span } => match sources.get(*file) {
                Some(src) => {
                    let (line, col) = src.line_col(span.start());
                    format!(
                        "{} line {}:{}\n{}\n{}^",
                        src.name(),
                        line,
                        col,
                        src.line_text(line),
                        " ".repeat(col)
                    )
                }
                None => format!("<unknown file> offset {}", span.start()),
            },
        }
    }

    /// A displayable view that renders against `sources`.
    pub fn display<'a>(&'a self, sources: &'a SourceMap) -> LocationDisplay<'a> {
        LocationDisplay {
            location: self,
            sources,
        }
    }
}

/// Display adapter returned by [`Location::display`].
pub struct LocationDisplay<'a> {
    location: &'a Location,
    sources: &'a SourceMap,
}

impl fmt::Display for LocationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location.render(self.sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources_with(text: &str) -> (SourceMap, FileId) {
        let mut sources = SourceMap::new();
        let file = sources.add("test.webidl", text);
        (sources, file)
    }

    #[test]
    fn test_line_col_first_line() {
        let (sources, file) = sources_with("interface A {};");
        let src = sources.get(file).unwrap();
        assert_eq!(src.line_col(0), (1, 0));
        assert_eq!(src.line_col(10), (1, 10));
    }

    #[test]
    fn test_line_col_after_newlines() {
        let (sources, file) = sources_with("a\nbc\n\ndef");
        let src = sources.get(file).unwrap();
        assert_eq!(src.line_col(2), (2, 0));
        assert_eq!(src.line_col(3), (2, 1));
        assert_eq!(src.line_col(5), (3, 0));
        assert_eq!(src.line_col(8), (4, 2));
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let (sources, file) = sources_with("abc");
        assert_eq!(sources.get(file).unwrap().line_col(100), (1, 3));
    }

    #[test]
    fn test_line_text() {
        let (sources, file) = sources_with("first\r\nsecond\nthird");
        let src = sources.get(file).unwrap();
        assert_eq!(src.line_text(1), "first");
        assert_eq!(src.line_text(2), "second");
        assert_eq!(src.line_text(3), "third");
        assert_eq!(src.line_text(0), "");
        assert_eq!(src.line_text(9), "");
    }

    #[test]
    fn test_render_with_caret() {
        let (sources, file) = sources_with("interface A {\n  void f();\n};");
        let location = Location::new(file, Span::new(21..22));
        assert_eq!(
            location.render(&sources),
            "test.webidl line 2:7\n  void f();\n       ^"
        );
        assert_eq!(location.display(&sources).to_string(), location.render(&sources));
    }

    #[test]
    fn test_builtin_renders_marker() {
        let sources = SourceMap::new();
        let location = Location::builtin(BUILTIN_TYPE);
        assert!(location.is_builtin());
        assert_eq!(location.render(&sources), "<builtin type>");
        assert_eq!(location.resolve(&sources), None);
        assert_eq!(location.filename(&sources), Some("<builtin type>"));
    }

    #[test]
    fn test_multiple_files() {
        let mut sources = SourceMap::new();
        let a = sources.add("a.webidl", "x");
        let b = sources.add("b.webidl", "y");
        assert_ne!(a, b);
        assert_eq!(sources.len(), 2);
        let names: Vec<_> = sources.iter().map(|(_, f)| f.name().to_string()).collect();
        assert_eq!(names, vec!["a.webidl", "b.webidl"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_line_col_matches_naive_scan(text in "[a-z\\n]{0,60}", offset in 0usize..64) {
                let (sources, file) = sources_with(&text);
                let src = sources.get(file).unwrap();
                let clamped = offset.min(text.len());
                let before = &text[..clamped];
                let line = before.matches('\n').count() + 1;
                let col = before.rsplit('\n').next().map_or(0, str::len);
                prop_assert_eq!(src.line_col(offset), (line, col));
            }
        }
    }
}
