/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{BitRead, BitSeek};
use crate::Result;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};

/// A buffered bit reader over a file.
///
/// Bytes are pulled from a [`BufReader`] into a 128-bit reservoir, so that up
/// to 64 bits can be extracted per call regardless of alignment. Used by the
/// load modes that leave the graph on disk; seeking discards the reservoir
/// and repositions the underlying file.
#[derive(Debug)]
pub struct FileBitReader {
    file: BufReader<File>,
    /// Pending bits, in the low `valid` bits of the reservoir; the oldest bit
    /// is the most significant one.
    buffer: u128,
    valid: usize,
    bit_index: u64,
    eof: bool,
}

impl FileBitReader {
    pub fn new(file: File) -> Self {
        Self {
            file: BufReader::new(file),
            buffer: 0,
            valid: 0,
            bit_index: 0,
            eof: false,
        }
    }

    /// Pull bytes into the reservoir until it cannot hold a further byte or
    /// the file ends.
    fn refill(&mut self) -> Result<()> {
        let mut byte = [0u8; 1];
        while self.valid <= 120 && !self.eof {
            match self.file.read(&mut byte)? {
                0 => self.eof = true,
                _ => {
                    self.buffer = (self.buffer << 8) | byte[0] as u128;
                    self.valid += 8;
                }
            }
        }
        Ok(())
    }

    fn exhausted(&self) -> crate::Error {
        crate::Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("bitstream exhausted at bit {}", self.bit_index),
        ))
    }
}

impl BitRead for FileBitReader {
    fn read_bits(&mut self, n_bits: usize) -> Result<u64> {
        if n_bits == 0 {
            return Ok(0);
        }
        debug_assert!(n_bits <= 64);
        if self.valid < n_bits {
            self.refill()?;
        }
        if self.valid == 0 {
            return Err(self.exhausted());
        }
        let mask = u64::MAX >> (64 - n_bits);
        let res = if n_bits <= self.valid {
            self.valid -= n_bits;
            (self.buffer >> self.valid) as u64 & mask
        } else {
            // the file ended mid-read: zero-extend, as a word-padded reader
            // would
            let res = ((self.buffer << (n_bits - self.valid)) as u64) & mask;
            self.valid = 0;
            res
        };
        self.bit_index += n_bits as u64;
        Ok(res)
    }

    fn read_unary(&mut self) -> Result<u64> {
        let mut total = 0u64;
        loop {
            if self.valid == 0 {
                self.refill()?;
                if self.valid == 0 {
                    return Err(self.exhausted());
                }
            }
            let window = self.buffer << (128 - self.valid);
            let zeros = window.leading_zeros() as usize;
            if zeros < self.valid {
                self.valid -= zeros + 1;
                self.bit_index += zeros as u64 + 1;
                return Ok(total + zeros as u64);
            }
            total += self.valid as u64;
            self.bit_index += self.valid as u64;
            self.valid = 0;
        }
    }

    fn skip_bits(&mut self, n_bits: usize) -> Result<()> {
        if n_bits <= self.valid {
            self.valid -= n_bits;
            self.bit_index += n_bits as u64;
            Ok(())
        } else {
            let pos = self.bit_index + n_bits as u64;
            self.set_bit_pos(pos)
        }
    }
}

impl BitSeek for FileBitReader {
    fn bit_pos(&mut self) -> u64 {
        self.bit_index
    }

    fn set_bit_pos(&mut self, bit_pos: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(bit_pos / 8))?;
        self.buffer = 0;
        self.valid = 0;
        self.eof = false;
        self.bit_index = bit_pos & !7;
        if bit_pos % 8 != 0 {
            self.read_bits((bit_pos % 8) as usize)?;
        }
        debug_assert_eq!(self.bit_index, bit_pos);
        Ok(())
    }
}
