//! # In-Memory Archive Tree
//!
//! This module defines the logical structure of an archive before it is handed to a codec.
//! An [`Archive`] is an ownership tree of [`Entry`] values rooted at an unnamed folder. It
//! mirrors the directory it was built from: every directory becomes a [`Folder`], every
//! included regular file becomes a [`FileEntry`] holding its exact bytes.
//!
//! Entries are added through [`Folder::folder`] and [`Folder::file`], which keep sibling
//! names unique.

use crate::{ArchiverError, Result};

/// A single node of the archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileEntry),
    Folder(Folder),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::File(f) => &f.name,
            Entry::Folder(d) => &d.name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder(_))
    }
}

/// A regular file and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    contents: Vec<u8>,
}

impl FileEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

/// A directory with an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Folder {
    name: String,
    children: Vec<Entry>,
}

impl Folder {
    fn named(name: &str) -> Self {
        Self { name: name.to_string(), children: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Looks up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.children.iter().find(|e| e.name() == name)
    }

    /// Returns the child folder called `name`, creating it if it does not exist yet.
    pub fn folder(&mut self, name: &str) -> Result<&mut Folder> {
        validate_name(name)?;
        let idx = match self.children.iter().position(|e| e.name() == name) {
            Some(idx) => idx,
            None => {
                self.children.push(Entry::Folder(Folder::named(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[idx] {
            Entry::Folder(folder) => Ok(folder),
            Entry::File(_) => Err(ArchiverError::NameConflict { name: name.to_string() }),
        }
    }

    /// Adds a file, replacing the contents of an existing file with the same name.
    pub fn file(&mut self, name: &str, contents: Vec<u8>) -> Result<()> {
        validate_name(name)?;
        match self.children.iter_mut().find(|e| e.name() == name) {
            Some(Entry::File(existing)) => existing.contents = contents,
            Some(Entry::Folder(_)) => {
                return Err(ArchiverError::NameConflict { name: name.to_string() })
            }
            None => self.children.push(Entry::File(FileEntry { name: name.to_string(), contents })),
        }
        Ok(())
    }

    /// Walks down a chain of folder names, creating missing folders on the way.
    pub fn descend<'a, I>(&mut self, names: I) -> Result<&mut Folder>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for name in names {
            current = current.folder(name)?;
        }
        Ok(current)
    }
}

/// The root of an archive tree. Itself an unnamed folder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Archive {
    root: Folder,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Folder {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Folder {
        &mut self.root
    }

    /// Shorthand for `root_mut().folder(name)`.
    pub fn folder(&mut self, name: &str) -> Result<&mut Folder> {
        self.root.folder(name)
    }

    /// Shorthand for `root_mut().file(name, contents)`.
    pub fn file(&mut self, name: &str, contents: Vec<u8>) -> Result<()> {
        self.root.file(name, contents)
    }

    pub fn file_count(&self) -> usize {
        self.flatten().iter().filter(|(_, e)| !e.is_folder()).count()
    }

    pub fn folder_count(&self) -> usize {
        self.flatten().iter().filter(|(_, e)| e.is_folder()).count()
    }

    /// Sum of all file contents in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.flatten()
            .iter()
            .map(|(_, e)| match e {
                Entry::File(f) => f.contents.len() as u64,
                Entry::Folder(_) => 0,
            })
            .sum()
    }

    /// Looks up an entry by a `/`-separated path. A trailing `/` is ignored.
    pub fn lookup(&self, path: &str) -> Option<&Entry> {
        let mut parts = path.trim_end_matches('/').split('/').peekable();
        let mut folder = &self.root;
        while let Some(part) = parts.next() {
            let entry = folder.get(part)?;
            if parts.peek().is_none() {
                return Some(entry);
            }
            match entry {
                Entry::Folder(f) => folder = f,
                Entry::File(_) => return None,
            }
        }
        None
    }

    /// Depth-first listing of every entry, parents before their children.
    ///
    /// Paths are `/`-joined from the archive root; folder paths carry a trailing `/`,
    /// matching ZIP directory entries.
    pub fn flatten(&self) -> Vec<(String, &Entry)> {
        let mut out = Vec::new();
        flatten_into(&self.root, "", &mut out);
        out
    }
}

fn flatten_into<'a>(folder: &'a Folder, prefix: &str, out: &mut Vec<(String, &'a Entry)>) {
    for child in &folder.children {
        match child {
            Entry::File(f) => out.push((format!("{prefix}{}", f.name), child)),
            Entry::Folder(d) => {
                let path = format!("{prefix}{}/", d.name);
                out.push((path.clone(), child));
                flatten_into(d, &path, out);
            }
        }
    }
}

/// `\` is an ordinary file-name character on Unix and only a separator on Windows.
fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(is_separator) {
        return Err(ArchiverError::InvalidName { name: name.to_string() });
    }
    Ok(())
}
