//! Reads regular-grid elevation rasters (`.asc`, `.bil`, `.dtm`) as point clouds, one point per
//! non-nodata cell.
//!
//! None of these three formats has LASlib source in this crate's reference material the way the
//! text parse-string grammar does; the header field names here (`ncols`, `nrows`, `xllcorner`,
//! `cellsize`, `NODATA_value`, `nbits`, `byteorder`, `layout`) follow the longstanding Esri
//! ASCII/BIL grid header convention, not a specific LASlib source file.

use crate::{Error, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Read;

/// Which on-disk encoding the grid's samples use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDialect {
    /// `.asc`: samples are whitespace-separated ASCII floats, row-major from the top-left.
    Ascii,
    /// `.bil`/`.dtm`: samples are raw binary, row-major, described by a companion `.hdr` file.
    Binary,
}

/// The parsed key/value header shared by `.asc` and the `.hdr` sidecar of `.bil`/`.dtm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHeader {
    /// Number of columns (samples per row).
    pub ncols: u32,
    /// Number of rows.
    pub nrows: u32,
    /// X coordinate of the lower-left corner.
    pub xllcorner: f64,
    /// Y coordinate of the lower-left corner.
    pub yllcorner: f64,
    /// Edge length of one cell, in the same units as `xllcorner`/`yllcorner`.
    pub cellsize: f64,
    /// Sample value that marks a cell as having no data; such cells are skipped.
    pub nodata: f64,
    /// Bits per sample, for binary grids (`.bil`/`.dtm`). Only 16 and 32 are supported.
    pub nbits: u32,
    /// True if binary samples are big-endian (`MSBFIRST`); false for little-endian (`LSBFIRST`).
    pub big_endian: bool,
}

impl GridHeader {
    /// Parses an Esri-style `key value` header, one pair per line, case-insensitive keys.
    pub fn parse(text: &str) -> Result<Self> {
        let mut ncols = None;
        let mut nrows = None;
        let mut xllcorner = None;
        let mut yllcorner = None;
        let mut cellsize = None;
        let mut nodata = -9999.0;
        let mut nbits = 32;
        let mut big_endian = false;

        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let Some(key) = parts.next() else { continue };
            let Some(value) = parts.next() else { continue };
            match key.to_ascii_lowercase().as_str() {
                "ncols" => ncols = value.parse().ok(),
                "nrows" => nrows = value.parse().ok(),
                "xllcorner" => xllcorner = value.parse().ok(),
                "xllcenter" => xllcorner = value.parse().ok(),
                "yllcorner" => yllcorner = value.parse().ok(),
                "yllcenter" => yllcorner = value.parse().ok(),
                "cellsize" => cellsize = value.parse().ok(),
                "nodata_value" => nodata = value.parse().unwrap_or(nodata),
                "nbits" => nbits = value.parse().unwrap_or(nbits),
                "byteorder" => big_endian = value.eq_ignore_ascii_case("msbfirst"),
                _ => {}
            }
        }

        Ok(GridHeader {
            ncols: ncols.ok_or_else(|| Error::InvalidToken("missing ncols".to_string()))?,
            nrows: nrows.ok_or_else(|| Error::InvalidToken("missing nrows".to_string()))?,
            xllcorner: xllcorner.unwrap_or(0.0),
            yllcorner: yllcorner.unwrap_or(0.0),
            cellsize: cellsize.ok_or_else(|| Error::InvalidToken("missing cellsize".to_string()))?,
            nodata,
            nbits,
            big_endian,
        })
    }
}

/// A streaming reader over a raster grid's cells, in row-major order from the top-left.
#[allow(missing_debug_implementations)]
pub struct GridReader {
    header: GridHeader,
    samples: Vec<f64>,
    next_index: usize,
}

impl GridReader {
    /// Builds a reader over an already-parsed `.asc` body: whitespace-separated floats in
    /// row-major order.
    pub fn from_ascii(header: GridHeader, body: &str) -> Result<Self> {
        let samples: Result<Vec<f64>> = body
            .split_whitespace()
            .map(|token| token.parse::<f64>().map_err(|_| Error::InvalidToken(token.to_string())))
            .collect();
        Ok(GridReader {
            header,
            samples: samples?,
            next_index: 0,
        })
    }

    /// Builds a reader over raw `.bil`/`.dtm` binary samples, decoded per `header.nbits` and
    /// `header.big_endian`.
    pub fn from_binary<R: Read>(header: GridHeader, mut read: R) -> Result<Self> {
        let count = header.ncols as usize * header.nrows as usize;
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let value = match (header.nbits, header.big_endian) {
                (16, true) => f64::from(read.read_i16::<BigEndian>()?),
                (16, false) => f64::from(read.read_i16::<LittleEndian>()?),
                (32, true) => f64::from(read.read_i32::<BigEndian>()?),
                (32, false) => f64::from(read.read_i32::<LittleEndian>()?),
                _ => return Err(Error::InvalidToken(format!("unsupported nbits {}", header.nbits))),
            };
            samples.push(value);
        }
        Ok(GridReader {
            header,
            samples,
            next_index: 0,
        })
    }

    /// Returns the grid's parsed header.
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// Reads the next non-nodata cell as an `(x, y, z)` point, skipping nodata cells.
    pub fn next_cell(&mut self) -> Option<(f64, f64, f64)> {
        while self.next_index < self.samples.len() {
            let index = self.next_index;
            self.next_index += 1;
            let value = self.samples[index];
            if (value - self.header.nodata).abs() < f64::EPSILON {
                continue;
            }
            let row = index / self.header.ncols as usize;
            let col = index % self.header.ncols as usize;
            let x = self.header.xllcorner + (col as f64 + 0.5) * self.header.cellsize;
            let rows_from_bottom = self.header.nrows as usize - 1 - row;
            let y = self.header.yllcorner + (rows_from_bottom as f64 + 0.5) * self.header.cellsize;
            return Some((x, y, value));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_esri_ascii_header() {
        let header = GridHeader::parse(
            "ncols 2\nnrows 2\nxllcorner 0.0\nyllcorner 0.0\ncellsize 1.0\nNODATA_value -9999\n",
        )
        .unwrap();
        assert_eq!(2, header.ncols);
        assert_eq!(2, header.nrows);
        assert_eq!(1.0, header.cellsize);
    }

    #[test]
    fn ascii_grid_skips_nodata_cells() {
        let header = GridHeader::parse(
            "ncols 2\nnrows 1\nxllcorner 0.0\nyllcorner 0.0\ncellsize 1.0\nNODATA_value -9999\n",
        )
        .unwrap();
        let mut grid = GridReader::from_ascii(header, "-9999 5.0").unwrap();
        let (x, y, z) = grid.next_cell().unwrap();
        assert_eq!((1.5, 0.5, 5.0), (x, y, z));
        assert!(grid.next_cell().is_none());
    }
}
