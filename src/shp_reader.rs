//! Reads point geometry out of ESRI Shapefiles (`.shp`).
//!
//! The shapefile binary layout (big-endian 100-byte file header, then big-endian record
//! headers wrapping little-endian shape records) has no LASlib counterpart in this crate's
//! reference material; the layout here follows the public ESRI Shapefile Technical
//! Description. Only shape types `Point` (1) and `PointZ` (11) are decoded, since those are
//! the only ones that map onto a LAS point without inventing attributes; polylines and
//! polygons are out of scope for a point-cloud reader.

use crate::{Error, Point, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Read;

const SHAPE_TYPE_POINT: i32 = 1;
const SHAPE_TYPE_POINT_Z: i32 = 11;

/// Streams `Point`/`PointZ` records out of a shapefile, skipping any other shape type.
#[allow(missing_debug_implementations)]
pub struct ShpReader<R> {
    read: R,
    file_length_bytes: u64,
    position_bytes: u64,
    shape_type: i32,
}

impl<R: Read> ShpReader<R> {
    /// Reads the 100-byte shapefile header and positions the reader at the first record.
    pub fn new(mut read: R) -> Result<Self> {
        let file_code = read.read_i32::<BigEndian>()?;
        if file_code != 9994 {
            return Err(Error::InvalidToken(format!("bad shapefile code {file_code}")));
        }
        for _ in 0..5 {
            let _unused = read.read_i32::<BigEndian>()?;
        }
        let file_length_words = read.read_i32::<BigEndian>()?;
        let _version = read.read_i32::<LittleEndian>()?;
        let shape_type = read.read_i32::<LittleEndian>()?;
        // bounding box: xmin, ymin, xmax, ymax, zmin, zmax, mmin, mmax
        for _ in 0..8 {
            let _unused = read.read_f64::<LittleEndian>()?;
        }
        Ok(ShpReader {
            read,
            file_length_bytes: u64::from(file_length_words as u32) * 2,
            position_bytes: 100,
            shape_type,
        })
    }

    /// Reads the next point record, returning `None` once the file header's declared length is
    /// reached. Records of shape types other than `Point`/`PointZ` are skipped.
    pub fn next_point(&mut self) -> Result<Option<Point>> {
        loop {
            if self.position_bytes >= self.file_length_bytes {
                return Ok(None);
            }
            let _record_number = self.read.read_i32::<BigEndian>()?;
            let content_length_words = self.read.read_i32::<BigEndian>()?;
            let content_length_bytes = u64::from(content_length_words as u32) * 2;
            self.position_bytes += 8 + content_length_bytes;

            let record_shape_type = self.read.read_i32::<LittleEndian>()?;
            match record_shape_type {
                SHAPE_TYPE_POINT => {
                    let x = self.read.read_f64::<LittleEndian>()?;
                    let y = self.read.read_f64::<LittleEndian>()?;
                    return Ok(Some(Point {
                        x,
                        y,
                        ..Default::default()
                    }));
                }
                SHAPE_TYPE_POINT_Z => {
                    let x = self.read.read_f64::<LittleEndian>()?;
                    let y = self.read.read_f64::<LittleEndian>()?;
                    let z = self.read.read_f64::<LittleEndian>()?;
                    let _measure = self.read.read_f64::<LittleEndian>()?;
                    return Ok(Some(Point {
                        x,
                        y,
                        z,
                        ..Default::default()
                    }));
                }
                _ => {
                    // skip the remainder of this record's content; its 4-byte shape-type word
                    // is already consumed out of content_length_bytes
                    let remaining = content_length_bytes.saturating_sub(4);
                    let mut discard = vec![0u8; remaining as usize];
                    self.read.read_exact(&mut discard)?;
                }
            }
        }
    }

    /// Returns the shapefile-wide shape type declared in the header (1 = `Point`, 11 =
    /// `PointZ`, others unsupported for point decoding).
    pub fn shape_type(&self) -> i32 {
        self.shape_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(shape_type: i32, file_length_words: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&9994i32.to_be_bytes());
        for _ in 0..5 {
            bytes.extend_from_slice(&0i32.to_be_bytes());
        }
        bytes.extend_from_slice(&file_length_words.to_be_bytes());
        bytes.extend_from_slice(&1000i32.to_le_bytes());
        bytes.extend_from_slice(&shape_type.to_le_bytes());
        for _ in 0..8 {
            bytes.extend_from_slice(&0f64.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn reads_a_single_point_record() {
        let mut bytes = header_bytes(SHAPE_TYPE_POINT, 50 + 10);
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&10i32.to_be_bytes());
        bytes.extend_from_slice(&SHAPE_TYPE_POINT.to_le_bytes());
        bytes.extend_from_slice(&1.5f64.to_le_bytes());
        bytes.extend_from_slice(&2.5f64.to_le_bytes());

        let mut reader = ShpReader::new(Cursor::new(bytes)).unwrap();
        let point = reader.next_point().unwrap().unwrap();
        assert_eq!(1.5, point.x);
        assert_eq!(2.5, point.y);
        assert!(reader.next_point().unwrap().is_none());
    }
}
