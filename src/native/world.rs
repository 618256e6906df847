//! Compile world for the embedded Typst backend
//!
//! The compiler module's resources (standard library + font set) are loaded
//! once when the module comes up and shared by every subsequent compile;
//! each render then builds a throwaway [`DocWorld`] around a single
//! in-memory source file.
//!
//! Font provisioning follows the module locator:
//! - `Bundled` uses the fonts embedded via `typst-assets`, so the backend
//!   works on minimal systems and containers with no font installation.
//! - `Path(dir)` discovers faces in a local directory through `fontdb` and
//!   loads the file-backed ones.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use fontdb::{Database, Source as FontSource};
use typst::{
    diag::{FileError, FileResult},
    foundations::{Bytes, Datetime},
    syntax::{FileId, Source, VirtualPath},
    text::{Font, FontBook},
    utils::LazyHash,
    Library, LibraryExt,
};

use crate::ModuleLocator;

/// Loaded compiler resources, shared by every compile of the module.
#[derive(Debug)]
pub(crate) struct CompilerModule {
    library: LazyHash<Library>,
    book: LazyHash<FontBook>,
    /// Loaded fonts in the exact order the book was built from, so
    /// `World::font(index)` stays consistent with the book's indices.
    fonts: Vec<Font>,
}

impl CompilerModule {
    pub fn load(locator: &ModuleLocator) -> anyhow::Result<Self> {
        let fonts = match locator {
            ModuleLocator::Bundled => load_bundled_fonts(),
            ModuleLocator::Path(dir) => load_fonts_from_dir(dir)?,
        };
        if fonts.is_empty() {
            anyhow::bail!("no usable fonts found for compiler module {locator:?}");
        }

        let book = FontBook::from_fonts(fonts.iter());
        Ok(Self {
            library: LazyHash::new(Library::default()),
            book: LazyHash::new(book),
            fonts,
        })
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

/// Fonts embedded in the binary.
fn load_bundled_fonts() -> Vec<Font> {
    let mut fonts = Vec::new();
    for data in typst_assets::fonts() {
        if let Some(font) = Font::new(Bytes::new(data), 0) {
            fonts.push(font);
        }
    }
    fonts
}

/// File-backed fonts discovered in a local directory.
///
/// Faces that fail to read or parse are skipped rather than failing the
/// whole module; an empty result is diagnosed by the caller.
fn load_fonts_from_dir(dir: &Path) -> anyhow::Result<Vec<Font>> {
    if !dir.is_dir() {
        anyhow::bail!("font directory {} does not exist", dir.display());
    }

    let mut db = Database::new();
    db.load_fonts_dir(dir);

    let mut fonts = Vec::new();
    for face in db.faces() {
        let (path, index) = match &face.source {
            FontSource::File(p) => (p.clone(), face.index),
            _ => continue,
        };
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(_) => continue,
        };

        // typst fonts require owned 'static backing storage
        let owned: Arc<[u8]> = Arc::from(data);
        if let Some(font) = Font::new(Bytes::new(owned), index) {
            fonts.push(font);
        }
    }
    Ok(fonts)
}

/// A compile world over a single in-memory source file.
pub(crate) struct DocWorld {
    main: FileId,
    text: String,
    module: Arc<CompilerModule>,
}

impl DocWorld {
    pub fn new(module: Arc<CompilerModule>, text: impl Into<String>) -> Self {
        Self {
            main: FileId::new(None, VirtualPath::new("main.typ")),
            text: text.into(),
            module,
        }
    }
}

impl typst::World for DocWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.module.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.module.book
    }

    fn main(&self) -> FileId {
        self.main
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main {
            Ok(Source::new(id, self.text.clone()))
        } else {
            Err(FileError::NotFound(PathBuf::from("<memory>")))
        }
    }

    fn file(&self, _id: FileId) -> FileResult<Bytes> {
        // Single inline source only; no external assets.
        Err(FileError::NotFound(PathBuf::from("<memory>")))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.module.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        // Compiles stay deterministic; no wall clock.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typst::World;

    #[test]
    fn bundled_module_provides_fonts() {
        let module = CompilerModule::load(&ModuleLocator::Bundled).unwrap();
        assert!(module.font_count() > 0);
    }

    #[test]
    fn missing_font_directory_is_an_error() {
        let locator = ModuleLocator::Path(PathBuf::from("/nonexistent/fonts"));
        let err = CompilerModule::load(&locator).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn world_serves_only_the_main_source() {
        let module = Arc::new(CompilerModule::load(&ModuleLocator::Bundled).unwrap());
        let world = DocWorld::new(module, "= Hi");

        let source = world.source(world.main()).unwrap();
        assert_eq!(source.text(), "= Hi");

        let other = FileId::new(None, VirtualPath::new("other.typ"));
        assert!(world.source(other).is_err());
        assert!(world.file(other).is_err());
    }
}
