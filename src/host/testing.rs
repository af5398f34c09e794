//! Instrumented host image for pipeline tests.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ExportError, Result};
use crate::types::{ImageAsset, ImageFormat};

use super::{FsImage, HostImage};

/// Wraps an [`FsImage`], recording what the pipeline asks of it and
/// optionally failing on request.
#[derive(Debug)]
pub(crate) struct Tracked {
    pub inner: FsImage,
    /// Every path passed to `persist_as`, in order.
    pub persisted: Vec<PathBuf>,
    /// Asset path seen when `pack_into_asset` was called.
    pub packed_from: Option<PathBuf>,
    pub fail_pack: bool,
    pub fail_persist: bool,
    /// Duplicates created and not yet removed, shared with all copies.
    pub live_duplicates: Rc<Cell<i32>>,
    is_duplicate: bool,
}

impl Tracked {
    pub fn new(inner: FsImage) -> Self {
        Self {
            inner,
            persisted: Vec::new(),
            packed_from: None,
            fail_pack: false,
            fail_persist: false,
            live_duplicates: Rc::new(Cell::new(0)),
            is_duplicate: false,
        }
    }
}

impl HostImage for Tracked {
    fn asset(&self) -> &ImageAsset {
        self.inner.asset()
    }

    fn asset_mut(&mut self) -> &mut ImageAsset {
        self.inner.asset_mut()
    }

    fn persist_as(&mut self, path: &Path, format: ImageFormat) -> Result<()> {
        self.persisted.push(path.to_path_buf());
        if self.fail_persist {
            return Err(ExportError::Encode {
                path: path.to_path_buf(),
                message: "persist refused".to_string(),
            });
        }
        self.inner.persist_as(path, format)
    }

    fn pack_into_asset(&mut self) -> Result<()> {
        self.packed_from = Some(self.asset().path.clone());
        if self.fail_pack {
            return Err(ExportError::Io {
                path: self.asset().path.clone(),
                message: "pack refused".to_string(),
            });
        }
        self.inner.pack_into_asset()
    }

    fn packed_bytes(&self) -> Option<&[u8]> {
        self.inner.packed_bytes()
    }

    fn duplicate(&mut self) -> Result<Self> {
        let inner = self.inner.duplicate()?;
        self.live_duplicates.set(self.live_duplicates.get() + 1);
        Ok(Self {
            inner,
            persisted: Vec::new(),
            packed_from: None,
            fail_pack: self.fail_pack,
            fail_persist: self.fail_persist,
            live_duplicates: Rc::clone(&self.live_duplicates),
            is_duplicate: true,
        })
    }

    fn scale(&mut self, width: u32, height: u32) -> Result<()> {
        self.inner.scale(width, height)
    }

    fn remove(self) -> Result<()> {
        if self.is_duplicate {
            self.live_duplicates.set(self.live_duplicates.get() - 1);
        }
        self.inner.remove()
    }
}
