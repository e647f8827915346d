use crate::{Error, Result};
use std::convert::TryFrom;

/// Point record format type.
///
/// This describes the layout of a point record: which optional fields are present, whether
/// it's one of the "extended" (LAS 1.4, point formats 6-10) layouts, and whether the points are
/// laz-compressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Format {
    /// Does this format have a gps time field?
    pub has_gps_time: bool,
    /// Does this format have color (red, green, blue) fields?
    pub has_color: bool,
    /// Does this format have near infrared?
    pub has_nir: bool,
    /// Does this format have waveform information?
    pub has_waveform: bool,
    /// Is this one of the "extended" (point formats 6-10) layouts?
    ///
    /// Extended formats have wider classification, return count, and scanner channel fields.
    pub is_extended: bool,
    /// Is this point format laz-compressed?
    pub is_compressed: bool,
    /// The number of extra bytes tacked on to the end of each point record.
    pub extra_bytes: u16,
}

impl Format {
    /// Creates a new format for the given point data record format number (0-10).
    ///
    /// # Examples
    ///
    /// ```
    /// use las::point::Format;
    /// let format = Format::new(1).unwrap();
    /// assert!(format.has_gps_time);
    /// assert!(Format::new(11).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Format> {
        let mut format = Format::default();
        match n & 0b0111_1111 {
            0 => {}
            1 => format.has_gps_time = true,
            2 => format.has_color = true,
            3 => {
                format.has_gps_time = true;
                format.has_color = true;
            }
            4 => {
                format.has_gps_time = true;
                format.has_waveform = true;
            }
            5 => {
                format.has_gps_time = true;
                format.has_color = true;
                format.has_waveform = true;
            }
            6 => {
                format.is_extended = true;
                format.has_gps_time = true;
            }
            7 => {
                format.is_extended = true;
                format.has_gps_time = true;
                format.has_color = true;
            }
            8 => {
                format.is_extended = true;
                format.has_gps_time = true;
                format.has_color = true;
                format.has_nir = true;
            }
            9 => {
                format.is_extended = true;
                format.has_gps_time = true;
                format.has_waveform = true;
            }
            10 => {
                format.is_extended = true;
                format.has_gps_time = true;
                format.has_color = true;
                format.has_nir = true;
                format.has_waveform = true;
            }
            _ => return Err(Error::InvalidPointFormat(n)),
        }
        format.is_compressed = n & 0b1000_0000 != 0;
        Ok(format)
    }

    /// Returns true if this format can be represented by a point data record format number.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::point::Format;
    /// assert!(Format::new(0).unwrap().is_supported());
    /// ```
    pub fn is_supported(&self) -> bool {
        self.to_u8().is_ok()
    }

    /// The length of a standard point in this format, not counting extra bytes.
    fn standard_len(&self) -> u16 {
        let mut len = if self.is_extended { 30 } else { 20 };
        if self.has_gps_time {
            len += 8;
        }
        if self.has_color {
            len += 6;
        }
        if self.has_nir {
            len += 2;
        }
        if self.has_waveform {
            len += 29;
        }
        len
    }

    /// The total length of a point record in this format, including extra bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::point::Format;
    /// assert_eq!(20, Format::new(0).unwrap().len());
    /// assert_eq!(28, Format::new(1).unwrap().len());
    /// ```
    pub fn len(&self) -> u16 {
        self.standard_len() + self.extra_bytes
    }

    /// Returns true if this format has no fields at all, including no extra bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the point data record format number (0-10) for this format, ignoring
    /// compression.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::point::Format;
    /// assert_eq!(0, Format::new(0).unwrap().to_u8().unwrap());
    /// assert_eq!(6, Format::new(6).unwrap().to_u8().unwrap());
    /// ```
    pub fn to_u8(&self) -> Result<u8> {
        let n = match (
            self.is_extended,
            self.has_gps_time,
            self.has_color,
            self.has_nir,
            self.has_waveform,
        ) {
            (false, false, false, false, false) => 0,
            (false, true, false, false, false) => 1,
            (false, false, true, false, false) => 2,
            (false, true, true, false, false) => 3,
            (false, true, false, false, true) => 4,
            (false, true, true, false, true) => 5,
            (true, true, false, false, false) => 6,
            (true, true, true, false, false) => 7,
            (true, true, true, true, false) => 8,
            (true, true, false, false, true) => 9,
            (true, true, true, true, true) => 10,
            _ => return Err(Error::InvalidFormatOptions(*self)),
        };
        Ok(n)
    }

    /// Returns the point data record format number, with the compression bit set if
    /// `is_compressed` is set.
    ///
    /// This is the byte that actually gets written to a header's
    /// `point_data_record_format` field.
    pub fn to_writable_u8(&self) -> Result<u8> {
        let n = self.to_u8()?;
        if self.is_compressed {
            Ok(n | 0b1000_0000)
        } else {
            Ok(n)
        }
    }
}

impl TryFrom<u8> for Format {
    type Error = Error;

    fn try_from(n: u8) -> Result<Format> {
        Format::new(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_format_has_gps_time() {
        assert!(!Format::new(0).unwrap().has_gps_time);
        assert!(Format::new(1).unwrap().has_gps_time);
        assert!(!Format::new(2).unwrap().has_gps_time);
        assert!(Format::new(3).unwrap().has_gps_time);
    }

    #[test]
    fn point_format_has_color() {
        assert!(!Format::new(0).unwrap().has_color);
        assert!(!Format::new(1).unwrap().has_color);
        assert!(Format::new(2).unwrap().has_color);
        assert!(Format::new(3).unwrap().has_color);
    }

    #[test]
    fn point_format_is_supported() {
        for n in 0..11 {
            assert!(Format::new(n).unwrap().is_supported());
        }
        assert!(Format::new(11).is_err());
    }

    #[test]
    fn point_format_len() {
        assert_eq!(20, Format::new(0).unwrap().len());
        assert_eq!(28, Format::new(1).unwrap().len());
        assert_eq!(26, Format::new(2).unwrap().len());
        assert_eq!(34, Format::new(3).unwrap().len());
        assert_eq!(30, Format::new(6).unwrap().len());
        assert_eq!(38, Format::new(7).unwrap().len());
        assert_eq!(40, Format::new(8).unwrap().len());
    }

    #[test]
    fn point_format_roundtrip() {
        for n in 0..11 {
            let format = Format::new(n).unwrap();
            assert_eq!(n, format.to_u8().unwrap());
        }
    }

    #[test]
    fn point_format_writable_sets_compression_bit() {
        let mut format = Format::new(1).unwrap();
        format.is_compressed = true;
        assert_eq!(1, format.to_u8().unwrap());
        assert_eq!(0b1000_0001, format.to_writable_u8().unwrap());
    }

    #[test]
    fn point_format_extra_bytes() {
        let mut format = Format::new(0).unwrap();
        format.extra_bytes = 4;
        assert_eq!(24, format.len());
    }
}
