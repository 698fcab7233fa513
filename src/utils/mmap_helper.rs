/*
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Context;
use mmap_rs::{Mmap, MmapFlags};
use std::path::Path;
use std::sync::Arc;

/// A read-only memory mapping of a file, exposed as a slice of `W`.
///
/// The mapping is reference-counted so the helper is cheaply clonable, and
/// it is rounded up to a multiple of the item size; the bytes past the end
/// of the file read as zero.
#[derive(Clone)]
pub struct MmapHelper<W> {
    mmap: Arc<Mmap>,
    len: usize,
    _marker: core::marker::PhantomData<W>,
}

impl<W> core::fmt::Debug for MmapHelper<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MmapHelper")
            .field("mmap", &self.mmap.as_ptr())
            .field("len", &self.len)
            .finish()
    }
}

impl<W> MmapHelper<W> {
    /// Memory-map the given file read-only.
    pub fn mmap(path: impl AsRef<Path>, flags: MmapFlags) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file_len = path
            .metadata()
            .with_context(|| format!("Cannot stat {}", path.display()))?
            .len() as usize;
        let file = std::fs::File::open(path)
            .with_context(|| format!("Cannot open {}", path.display()))?;
        let item_size = core::mem::size_of::<W>();
        let capacity = file_len.div_ceil(item_size) * item_size;
        // SAFETY: the file is mapped read-only and outlives the mapping.
        let mmap = unsafe {
            mmap_rs::MmapOptions::new(capacity.max(1))
                .with_context(|| format!("Cannot initialize mmap of size {}", capacity))?
                .with_flags(flags)
                .with_file(&file, 0)
                .map()
                .with_context(|| format!("Cannot mmap {} (size {})", path.display(), capacity))?
        };

        Ok(Self {
            len: file_len / item_size,
            mmap: Arc::new(mmap),
            _marker: core::marker::PhantomData,
        })
    }

    /// The length of the mapping, in items.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<W> AsRef<[W]> for MmapHelper<W> {
    fn as_ref(&self) -> &[W] {
        // SAFETY: the mapping is page-aligned, read-only, and at least
        // `len * size_of::<W>()` bytes long.
        unsafe { core::slice::from_raw_parts(self.mmap.as_ptr() as *const W, self.len) }
    }
}
