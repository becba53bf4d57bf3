//! Files participating in one translation unit and presumed-location
//! resolution.
//!
//! Every file the preprocessor reads gets a [`FileId`]. Line markers
//! (`#line 10 "gen.c"` or the GNU form `# 10 "gen.c" 1 3`) are recorded per
//! file and shift the presumed file and line of everything after them; the
//! GNU `3` flag also marks the following region as a system header.

use super::ast::{FileId, SourceLocation, SourcePosition};
use std::path::PathBuf;

/// A line-marker directive recorded in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    /// Physical line of the directive; the marker applies to later lines
    pub physical_line: usize,
    /// Presumed line number of the line after the directive
    pub presumed_line: usize,
    pub presumed_file: Option<String>,
    /// `Some` for GNU markers, which state system-header-ness explicitly
    pub system: Option<bool>,
}

/// One file read while expanding a translation unit
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub is_system: bool,
    pub markers: Vec<LineMarker>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, is_system: bool) -> Self {
        SourceFile {
            path: path.into(),
            is_system,
            markers: Vec::new(),
        }
    }

    fn marker_for(&self, line: usize) -> Option<&LineMarker> {
        self.markers.iter().rev().find(|m| m.physical_line < line)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    pub fn add(&mut self, file: SourceFile) -> FileId {
        self.files.push(file);
        self.files.len() - 1
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id)
    }

    pub fn file_mut(&mut self, id: FileId) -> Option<&mut SourceFile> {
        self.files.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolve a physical location to the position a reader perceives.
    /// Unknown files resolve to an empty path.
    pub fn presumed(&self, location: SourceLocation) -> SourcePosition {
        let Some(file) = self.file(location.file) else {
            return SourcePosition::new("", location.line, location.column);
        };

        let path = file.path.to_string_lossy().into_owned();
        match file.marker_for(location.line) {
            Some(marker) => {
                let line = marker.presumed_line + (location.line - marker.physical_line - 1);
                let path = marker.presumed_file.clone().unwrap_or(path);
                SourcePosition::new(path, line, location.column)
            }
            None => SourcePosition::new(path, location.line, location.column),
        }
    }

    /// True when the location lies in a system header, either because the
    /// file itself is one or because a GNU line marker says so.
    pub fn is_system(&self, location: SourceLocation) -> bool {
        let Some(file) = self.file(location.file) else {
            return false;
        };

        file.markers
            .iter()
            .rev()
            .filter(|m| m.physical_line < location.line)
            .find_map(|m| m.system)
            .unwrap_or(file.is_system)
    }
}
