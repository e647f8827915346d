//! Variable length records.

use crate::utils::{AsLasStr, FromLasStr};
use crate::{raw, Result};

const VLR_HEADER_SIZE: u32 = 54;
const EVLR_HEADER_SIZE: u32 = 60;

/// A variable length record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vlr {
    /// The user that created this record.
    ///
    /// This value is often an official, "registered" user_id, such as "LASF_Spec" or
    /// "LASF_Projection".
    pub user_id: String,

    /// This value specifies the type of record, and depends on the user id.
    pub record_id: u16,

    /// Textual description of these data.
    pub description: String,

    /// The data themselves.
    pub data: Vec<u8>,
}

impl Vlr {
    /// Creates a vlr from a raw vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::{Vlr, raw};
    /// let vlr = Vlr::from_raw(raw::Vlr::default()).unwrap();
    /// ```
    pub fn from_raw(raw_vlr: raw::Vlr) -> Result<Vlr> {
        Ok(Vlr {
            user_id: raw_vlr.user_id.as_las_str()?.to_string(),
            record_id: raw_vlr.record_id,
            description: raw_vlr.description.as_las_str()?.to_string(),
            data: raw_vlr.data,
        })
    }

    /// Converts this vlr into a raw vlr.
    ///
    /// If `extended` is true, the record length is written using the wider evlr field. Returns
    /// an error if the data are too long to be written as a (non-extended) vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::Vlr;
    /// let vlr = Vlr { ..Default::default() };
    /// let raw_vlr = vlr.into_raw(false).unwrap();
    /// ```
    pub fn into_raw(self, extended: bool) -> Result<raw::Vlr> {
        use crate::Error;

        let mut user_id = [0; 16];
        user_id.from_las_str(&self.user_id)?;
        let mut description = [0; 32];
        description.from_las_str(&self.description)?;
        let record_length_after_header = if extended {
            raw::vlr::RecordLength::Evlr(self.data.len() as u64)
        } else {
            if self.data.len() > u16::MAX as usize {
                return Err(Error::VlrDataTooLong(self.data.len()));
            }
            raw::vlr::RecordLength::Vlr(self.data.len() as u16)
        };
        Ok(raw::Vlr {
            reserved: 0,
            user_id,
            record_id: self.record_id,
            record_length_after_header,
            description,
            data: self.data,
        })
    }

    /// Returns the total length of this vlr, header and data.
    ///
    /// An evlr header is six bytes longer than a vlr header, since the record length after
    /// header field is a `u64` rather than a `u16`.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::Vlr;
    /// let vlr = Vlr { ..Default::default() };
    /// assert_eq!(54, vlr.len(false));
    /// assert_eq!(60, vlr.len(true));
    /// ```
    pub fn len(&self, extended: bool) -> u32 {
        let header_size = if extended {
            EVLR_HEADER_SIZE
        } else {
            VLR_HEADER_SIZE
        };
        header_size + self.data.len() as u32
    }

    /// Returns true if this vlr has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if this vlr carries coordinate reference system information, either as wkt
    /// or geotiff.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::Vlr;
    /// let vlr = Vlr {
    ///     user_id: "LASF_Projection".to_string(),
    ///     record_id: 2112,
    ///     ..Default::default()
    /// };
    /// assert!(vlr.is_projection());
    /// ```
    pub fn is_projection(&self) -> bool {
        self.user_id.eq_ignore_ascii_case("LASF_Projection")
            && matches!(self.record_id, 2112 | 34735 | 34736 | 34737)
    }

    /// Returns true if this vlr's data is too large to be written as a regular (non-extended)
    /// vlr, and so must be promoted to an evlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::Vlr;
    /// let vlr = Vlr { ..Default::default() };
    /// assert!(!vlr.has_large_data());
    /// ```
    pub fn has_large_data(&self) -> bool {
        self.data.len() > u16::MAX as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len() {
        let data = vec![0; 1];
        let vlr = Vlr {
            data,
            ..Default::default()
        };
        assert_eq!(55, vlr.len(false));
        assert_eq!(61, vlr.len(true));
    }

    #[test]
    fn has_large_data() {
        let vlr = Vlr {
            data: vec![0; u16::MAX as usize + 1],
            ..Default::default()
        };
        assert!(vlr.has_large_data());
        assert!(!Vlr::default().has_large_data());
    }

    #[test]
    fn roundtrip() {
        let vlr = Vlr {
            user_id: "LASF_Spec".to_string(),
            record_id: 42,
            description: "a description".to_string(),
            data: vec![1, 2, 3],
        };
        let raw_vlr = vlr.clone().into_raw(false).unwrap();
        assert_eq!(vlr, Vlr::from_raw(raw_vlr).unwrap());
    }

    #[test]
    fn is_projection() {
        let vlr = Vlr {
            user_id: "LASF_Projection".to_string(),
            record_id: 2112,
            ..Default::default()
        };
        assert!(vlr.is_projection());
        assert!(!Vlr::default().is_projection());
    }
}
