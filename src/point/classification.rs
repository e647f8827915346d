use crate::{Error, Result};

const ASPRS_CLASSIFICATION_MASK: u8 = 0b0001_1111;
const OVERLAP_CLASSIFICATION_CODE: u8 = 12;

/// ASPRS point classification.
///
/// In version 1.0, this was a user-defined and optional u8. In subsequent versions, this field
/// was defined more rigidly. The overlap-points code (12) isn't represented here because this
/// library surfaces overlap as a flag on the point itself, not as a classification value — see
/// `las::raw::point::Flags::is_overlap`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Classification {
    #[default]
    CreatedNeverClassified,
    Unclassified,
    Ground,
    LowVegetation,
    MediumVegetation,
    HighVegetation,
    Building,
    LowPoint,
    ModelKeyPoint,
    Water,
    /// Reserved for ASPRS definition, or a user-defined class outside the low range.
    Reserved(u8),
}

impl Classification {
    /// Creates a classification from a classification byte.
    ///
    /// Only the low five bits are meaningful for legacy (point formats 0-5) points; callers
    /// should mask those out before calling this for a legacy point. The value 12 is reserved to
    /// signal overlap points via a classification flag rather than a classification value, so it
    /// can't be constructed here.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::point::Classification;
    /// assert_eq!(Classification::Ground, Classification::new(2).unwrap());
    /// assert!(Classification::new(12).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Classification> {
        if n & ASPRS_CLASSIFICATION_MASK == OVERLAP_CLASSIFICATION_CODE {
            Err(Error::Classification(n))
        } else {
            Ok(Classification::from(n))
        }
    }
}

impl From<u8> for Classification {
    fn from(n: u8) -> Classification {
        match n & ASPRS_CLASSIFICATION_MASK {
            0 => Classification::CreatedNeverClassified,
            1 => Classification::Unclassified,
            2 => Classification::Ground,
            3 => Classification::LowVegetation,
            4 => Classification::MediumVegetation,
            5 => Classification::HighVegetation,
            6 => Classification::Building,
            7 => Classification::LowPoint,
            8 => Classification::ModelKeyPoint,
            9 => Classification::Water,
            n => Classification::Reserved(n),
        }
    }
}

impl From<Classification> for u8 {
    fn from(classification: Classification) -> u8 {
        match classification {
            Classification::CreatedNeverClassified => 0,
            Classification::Unclassified => 1,
            Classification::Ground => 2,
            Classification::LowVegetation => 3,
            Classification::MediumVegetation => 4,
            Classification::HighVegetation => 5,
            Classification::Building => 6,
            Classification::LowPoint => 7,
            Classification::ModelKeyPoint => 8,
            Classification::Water => 9,
            Classification::Reserved(n) => n,
        }
    }
}

impl PartialEq<Classification> for u8 {
    fn eq(&self, other: &Classification) -> bool {
        *self == u8::from(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_from() {
        assert_eq!(Classification::Ground, Classification::from(2));
        assert_eq!(Classification::Reserved(11), Classification::from(11));
        assert_eq!(Classification::Reserved(200), Classification::from(200));
    }

    #[test]
    fn classification_new_rejects_overlap_code() {
        assert!(Classification::new(12).is_err());
        assert!(Classification::new(0b10101100).is_err());
    }

    #[test]
    fn classification_roundtrip() {
        for n in 0..32u8 {
            if n == OVERLAP_CLASSIFICATION_CODE {
                continue;
            }
            let classification = Classification::new(n).unwrap();
            assert_eq!(n, u8::from(classification));
        }
    }
}
