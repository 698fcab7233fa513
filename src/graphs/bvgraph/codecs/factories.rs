/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Factories for bit readers.

Implementations of the [`BitReaderFactory`] trait can be used to create bit
readers accessing the graph stream using different techniques.
- [`MemoryFactory`] creates bit readers from a slice of memory, either
  [loaded from a file](MemoryFactory::new_mem) or
  [provided by the caller](MemoryFactory::from_data).
- [`MmapHelper`] creates bit readers over a memory-mapped file.
- [`FileFactory`] creates bit readers that read directly from a file,
  for the load modes that leave the graph on disk.

Any factory can be plugged either into a
[`SequentialDecoderFactory`](super::SequentialDecoderFactory) or a
[`RandomAccessDecoderFactory`](super::RandomAccessDecoderFactory),
decoupling the decoding logic from the underlying support.

*/

use crate::bits::{BitRead, BitSeek, FileBitReader, MemBitReader};
use crate::utils::MmapHelper;
use anyhow::{ensure, Context};
use bitflags::bitflags;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub trait BitReaderFactory {
    type BitReader<'a>: BitRead + BitSeek
    where
        Self: 'a;
    fn new_reader(&self) -> Self::BitReader<'_>;
}

bitflags! {
    /// Flags for [`MmapHelper`]-based loading.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct MemoryFlags: u32 {
        /// Suggest to map a region using transparent huge pages.
        ///
        /// This flag is only a suggestion, and it is ignored if the kernel
        /// does not support transparent huge pages.
        const TRANSPARENT_HUGE_PAGES = 1 << 0;
        /// Suggest that the mapped region will be accessed sequentially.
        const SEQUENTIAL = 1 << 1;
        /// Suggest that the mapped region will be accessed randomly.
        const RANDOM_ACCESS = 1 << 2;
    }
}

/// Empty flags.
impl core::default::Default for MemoryFlags {
    fn default() -> Self {
        MemoryFlags::empty()
    }
}

impl From<MemoryFlags> for mmap_rs::MmapFlags {
    fn from(flags: MemoryFlags) -> Self {
        let mut mmap_flags = mmap_rs::MmapFlags::empty();
        if flags.contains(MemoryFlags::SEQUENTIAL) {
            mmap_flags |= mmap_rs::MmapFlags::SEQUENTIAL;
        }
        if flags.contains(MemoryFlags::RANDOM_ACCESS) {
            mmap_flags |= mmap_rs::MmapFlags::RANDOM_ACCESS;
        }
        if flags.contains(MemoryFlags::TRANSPARENT_HUGE_PAGES) {
            mmap_flags |= mmap_rs::MmapFlags::TRANSPARENT_HUGE_PAGES;
        }

        mmap_flags
    }
}

/// A factory over owned or borrowed bytes.
///
/// Borrowed data is how externally managed buffers enter the library: the
/// caller keeps ownership and the graph borrows for its lifetime.
#[derive(Debug, Clone)]
pub struct MemoryFactory<M: AsRef<[u8]>> {
    data: M,
}

impl<M: AsRef<[u8]>> MemoryFactory<M> {
    pub fn from_data(data: M) -> Self {
        Self { data }
    }
}

impl MemoryFactory<Box<[u8]>> {
    /// Load the given file into memory.
    pub fn new_mem(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file_len = path
            .metadata()
            .with_context(|| format!("Could not stat {}", path.display()))?
            .len() as usize;
        let mut file = File::open(path)
            .with_context(|| format!("Could not open {}", path.display()))?;
        let mut data = vec![0; file_len];
        file.read_exact(&mut data)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }
}

impl<M: AsRef<[u8]>> BitReaderFactory for MemoryFactory<M> {
    type BitReader<'a> = MemBitReader<'a>
    where
        Self: 'a;

    fn new_reader(&self) -> Self::BitReader<'_> {
        MemBitReader::new(self.data.as_ref())
    }
}

impl BitReaderFactory for MmapHelper<u8> {
    type BitReader<'a> = MemBitReader<'a>;

    fn new_reader(&self) -> Self::BitReader<'_> {
        MemBitReader::new(self.as_ref())
    }
}

/// A factory creating readers over a file, which is opened anew for every
/// reader so that iterators over the same graph stay independent.
#[derive(Debug, Clone)]
pub struct FileFactory {
    path: Box<Path>,
}

impl FileFactory {
    pub fn new(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path: Box<Path> = path.as_ref().into();
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Could not stat {}", path.display()))?;
        ensure!(metadata.is_file(), "File {} is not a file", path.display());

        Ok(Self { path })
    }
}

impl BitReaderFactory for FileFactory {
    type BitReader<'a> = FileBitReader;

    fn new_reader(&self) -> Self::BitReader<'_> {
        FileBitReader::new(File::open(&self.path).unwrap())
    }
}
