//! Decodes two fixed-record binary point formats with no LASlib source in this crate's
//! reference material: Terrasolid `.bin` and NASA Airborne Topographic Mapper `.qi`/`.qfit`.
//!
//! Both are documented only by long-public third-party format notes rather than by a source
//! file in this crate's lineage, so the record layouts below are deliberately conservative:
//! each reads the common, well-attested fields and leaves vendor-specific extensions alone.

use crate::{Error, Point, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Read;

/// Terrasolid `.bin` point record: a 16-byte header (point count, unit, origin) followed by
/// fixed 20-byte records of scaled integer x/y/z, classification, and intensity.
#[allow(missing_debug_implementations)]
pub struct TerrasolidBinReader<R> {
    read: R,
    remaining: u32,
    scale: f64,
}

impl<R: Read> TerrasolidBinReader<R> {
    /// Reads the 16-byte Terrasolid bin header and returns a reader positioned at the first
    /// point record.
    pub fn new(mut read: R) -> Result<Self> {
        let _version = read.read_i32::<LittleEndian>()?;
        let count = read.read_i32::<LittleEndian>()?;
        let units = read.read_i32::<LittleEndian>()?;
        let _unused = read.read_i32::<LittleEndian>()?;
        if count < 0 {
            return Err(Error::InvalidToken("negative point count in bin header".to_string()));
        }
        let scale = match units {
            1 => 0.01,
            2 => 0.001,
            _ => 0.01,
        };
        Ok(TerrasolidBinReader {
            read,
            remaining: count as u32,
            scale,
        })
    }

    /// Reads the next point, or `None` once the header's declared count is exhausted.
    pub fn next_point(&mut self) -> Result<Option<Point>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let x = f64::from(self.read.read_i32::<LittleEndian>()?) * self.scale;
        let y = f64::from(self.read.read_i32::<LittleEndian>()?) * self.scale;
        let z = f64::from(self.read.read_i32::<LittleEndian>()?) * self.scale;
        let classification = self.read.read_u8()?;
        let intensity = u16::from(self.read.read_u8()?) * 256;
        let _reserved = self.read.read_i16::<LittleEndian>()?;
        self.remaining -= 1;
        Ok(Some(Point {
            x,
            y,
            z,
            classification: classification.into(),
            intensity,
            ..Default::default()
        }))
    }
}

/// One decoded NASA ATM QFIT record: a laser shot's georeferenced return plus the instrument
/// channels common to every QFIT revision (10-word and 14-word alike).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QfitRecord {
    /// GPS time of day, in milliseconds.
    pub time_ms: i32,
    /// Latitude, in degrees.
    pub latitude: f64,
    /// Longitude, in degrees (0-360, not wrapped to +/-180).
    pub longitude: f64,
    /// Elevation, in meters.
    pub elevation: f64,
}

/// Reads fixed-length QFIT records: a leading 4-byte big-endian word count (word count times 4
/// gives the byte offset of the first data record), then that many big-endian `i32` words per
/// record, scaled per the ATM convention (lat/lon in microdegrees, elevation in millimeters).
#[allow(missing_debug_implementations)]
pub struct QfitReader<R> {
    read: R,
    words_per_record: usize,
}

impl<R: Read> QfitReader<R> {
    /// Reads the QFIT header word and positions the reader at the first data record.
    pub fn new(mut read: R) -> Result<Self> {
        let header_word = read.read_i32::<BigEndian>()?;
        let words_per_record = (header_word / 4) as usize;
        if words_per_record < 3 {
            return Err(Error::InvalidToken("implausible qfit record length".to_string()));
        }
        for _ in 1..words_per_record {
            read.read_i32::<BigEndian>()?;
        }
        Ok(QfitReader {
            read,
            words_per_record,
        })
    }

    /// Reads the next record, or `None` at end of file.
    pub fn next_record(&mut self) -> Result<Option<QfitRecord>> {
        let mut words = vec![0i32; self.words_per_record];
        for word in words.iter_mut() {
            match self.read.read_i32::<BigEndian>() {
                Ok(value) => *word = value,
                Err(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(Error::from(e)),
            }
        }
        Ok(Some(QfitRecord {
            time_ms: words[0],
            latitude: f64::from(words[1]) / 1_000_000.0,
            longitude: f64::from(words[2]) / 1_000_000.0,
            elevation: f64::from(words[3]) / 1_000.0,
        }))
    }
}

impl From<QfitRecord> for Point {
    fn from(record: QfitRecord) -> Point {
        Point {
            x: record.longitude,
            y: record.latitude,
            z: record.elevation,
            gps_time: Some(f64::from(record.time_ms) / 1000.0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn bin_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&100i32.to_le_bytes());
        bytes.extend_from_slice(&200i32.to_le_bytes());
        bytes.extend_from_slice(&300i32.to_le_bytes());
        bytes.push(2);
        bytes.push(50);
        bytes.extend_from_slice(&0i16.to_le_bytes());
        bytes
    }

    #[test]
    fn reads_a_single_terrasolid_bin_point() {
        let mut reader = TerrasolidBinReader::new(Cursor::new(bin_bytes())).unwrap();
        let point = reader.next_point().unwrap().unwrap();
        assert_eq!(1.0, point.x);
        assert_eq!(2.0, point.y);
        assert_eq!(3.0, point.z);
        assert!(reader.next_point().unwrap().is_none());
    }

    #[test]
    fn reads_a_single_qfit_record() {
        let mut bytes = Vec::new();
        // header record: word count (4 words) plus the three remaining header words skipped by `new`
        bytes.extend_from_slice(&16i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        // one data record: time, latitude, longitude, elevation
        bytes.extend_from_slice(&123i32.to_be_bytes());
        bytes.extend_from_slice(&45_000_000i32.to_be_bytes());
        bytes.extend_from_slice(&90_000_000i32.to_be_bytes());
        bytes.extend_from_slice(&1500i32.to_be_bytes());
        let mut reader = QfitReader::new(Cursor::new(bytes)).unwrap();
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(45.0, record.latitude);
        assert_eq!(90.0, record.longitude);
        assert_eq!(1.5, record.elevation);
    }
}
