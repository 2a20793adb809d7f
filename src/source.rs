//! Assembly project trees.
//!
//! A disassembled game is a tree of assembly files whose data lives in binary files pulled
//! in with `incbin`. Loading from such a tree means resolving each asset label to the file
//! it includes, then reading that file; saving means writing the file back under an output
//! directory.
//!
//! [`IncbinIndex`] builds the label map by scanning the project's entry file and, through
//! `include` directives, every file it pulls in. A label is bound when its definition is
//! followed by an `incbin`, either on the same line or on the next non-blank line:
//!
//! ```text
//! Blockset00:     incbin "blocksets/blockset00.cbs"
//!
//! RoomPal00:
//!                 incbin  "palettes/room00.pal"   ; room palette
//!                 include "code/other.asm"
//! ```

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Label to binary-file resolution for an assembly project.
pub trait SourceTree {
    /// Project root; every relative path is resolved against it.
    fn root(&self) -> &Path;

    /// File included for `label`, relative to the root.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] for an unknown label.
    fn resolve(&self, label: &str) -> Result<PathBuf>;

    /// Read a file of the project.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read.
    fn read(&self, relative: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(self.root().join(relative))?)
    }

    /// Write `bytes` to `relative` under `dir`, creating parent directories.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] on I/O failure.
    fn write(&self, dir: &Path, relative: &Path, bytes: &[u8]) -> Result<()> {
        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, bytes)?;
        Ok(())
    }

    /// Resolve `label` and read its file.
    ///
    /// # Errors
    /// See [`SourceTree::resolve`] and [`SourceTree::read`].
    fn read_label(&self, label: &str) -> Result<Vec<u8>> {
        let relative = self.resolve(label)?;
        self.read(&relative)
    }
}

/// `incbin` label map of an assembly project.
#[derive(Debug, Clone, Default)]
pub struct IncbinIndex {
    root: PathBuf,
    labels: HashMap<String, PathBuf>,
}

impl IncbinIndex {
    /// Scan `entry` (relative to `root`) and every file it includes.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the entry file or an included file cannot be
    /// read.
    pub fn open(root: impl Into<PathBuf>, entry: impl AsRef<Path>) -> Result<Self> {
        let mut index = IncbinIndex {
            root: root.into(),
            labels: HashMap::new(),
        };

        let mut visited = HashSet::new();
        let mut queue = vec![entry.as_ref().to_path_buf()];
        while let Some(file) = queue.pop() {
            if !visited.insert(file.clone()) {
                continue;
            }

            let text = fs::read_to_string(index.root.join(&file))?;
            let includes = index.scan(&text);
            // Reverse so includes are visited in file order.
            queue.extend(includes.into_iter().rev());
        }

        log::debug!(
            "indexed {} incbin labels in {} files under {}",
            index.labels.len(),
            visited.len(),
            index.root.display()
        );
        Ok(index)
    }

    /// An empty index rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        IncbinIndex {
            root: root.into(),
            labels: HashMap::new(),
        }
    }

    /// Bind `label` to `relative`.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>, relative: impl Into<PathBuf>) -> Self {
        self.labels.insert(label.into(), relative.into());
        self
    }

    /// Number of bound labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no label is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Record the `incbin` labels of one file, returning the files it includes.
    fn scan(&mut self, text: &str) -> Vec<PathBuf> {
        let mut includes = Vec::new();
        let mut pending: Option<&str> = None;

        for line in text.lines() {
            let code = line.split(';').next().unwrap_or_default().trim();
            if code.is_empty() {
                continue;
            }

            let directive = match split_label(code) {
                Some((label, rest)) => {
                    pending = Some(label);
                    if rest.is_empty() {
                        continue;
                    }
                    rest
                }
                None => code,
            };

            let (keyword, argument) = directive
                .split_once(char::is_whitespace)
                .map_or((directive, ""), |(keyword, argument)| (keyword, argument.trim()));

            if keyword.eq_ignore_ascii_case("incbin") {
                if let Some(label) = pending {
                    self.labels
                        .insert(label.to_string(), PathBuf::from(unquote(argument)));
                }
            } else if keyword.eq_ignore_ascii_case("include") {
                includes.push(PathBuf::from(unquote(argument)));
            }
            pending = None;
        }

        includes
    }
}

impl SourceTree for IncbinIndex {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, label: &str) -> Result<PathBuf> {
        self.labels
            .get(label)
            .cloned()
            .ok_or_else(|| Error::SectionNotFound(label.to_string()))
    }
}

fn split_label(code: &str) -> Option<(&str, &str)> {
    let (label, rest) = code.split_once(':')?;
    let valid = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    valid.then(|| (label, rest.trim()))
}

fn unquote(argument: &str) -> &str {
    let argument = argument.split(',').next().unwrap_or_default().trim();
    argument.trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scan_same_and_next_line() {
        let mut index = IncbinIndex::new("/project");
        let includes = index.scan(
            "Blockset00:     incbin \"blocksets/b00.cbs\"\n\
             \n\
             RoomPal00:\n\
             \n\
             \t\tincbin  \"palettes/room00.pal\"   ; room palette\n\
             Code:\n\
             \t\tmove.w d0,d1\n\
             \t\tincbin \"orphan.bin\"\n\
             \t\tinclude \"code/other.asm\"\n",
        );

        assert_eq!(includes, vec![PathBuf::from("code/other.asm")]);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.resolve("Blockset00").unwrap(),
            PathBuf::from("blocksets/b00.cbs")
        );
        assert_eq!(
            index.resolve("RoomPal00").unwrap(),
            PathBuf::from("palettes/room00.pal")
        );
        assert!(matches!(index.resolve("Code"), Err(Error::SectionNotFound(_))));
    }

    #[test]
    fn open_follows_includes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("code")).unwrap();
        fs::write(
            root.join("main.asm"),
            "\tinclude \"code/data.asm\"\n\tinclude \"code/data.asm\"\n",
        )
        .unwrap();
        fs::write(
            root.join("code/data.asm"),
            "Script:\tincbin \"script/script.bin\"\n\tinclude \"main.asm\"\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("script")).unwrap();
        fs::write(root.join("script/script.bin"), [1, 2, 3]).unwrap();

        let index = IncbinIndex::open(root, "main.asm").unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.read_label("Script").unwrap(), vec![1, 2, 3]);

        let out = tempdir().unwrap();
        index
            .write(out.path(), Path::new("script/script.bin"), &[9])
            .unwrap();
        assert_eq!(fs::read(out.path().join("script/script.bin")).unwrap(), vec![9]);
    }

    #[test]
    fn open_missing_include() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.asm"), "\tinclude \"missing.asm\"\n").unwrap();
        assert!(matches!(
            IncbinIndex::open(dir.path(), "main.asm"),
            Err(Error::FileError(_))
        ));
    }
}
