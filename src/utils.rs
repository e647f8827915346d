//! General-use structs and methods.

use crate::{Error, Result};
use std::iter;
use std::str;

/// Returns `None` if the value is the default (zero) value for its type, else `Some(n)`.
///
/// Several optional fields on a raw point (gps time, nir) are only meaningful when the format
/// includes them; zero is indistinguishable from "not present" for these, so callers collapse
/// the zero case to `None`.
pub fn some_or_none_if_zero<T: Default + PartialEq>(n: T) -> Option<T> {
    if n == T::default() {
        None
    } else {
        Some(n)
    }
}

/// Converts bytes into a string, following LAS rules.
///
/// LAS specifies that all string fields should be ASCII and nul filled, but not all LAS data in
/// the wild follows these rules (here's looking at you, Riegl). This trait has two methods, one
/// permissive (`as_las_str`) and one strict (`as_las_str_strict`). The first just does its best
/// to produce some sort of `&str`, while the second checks the rules.
pub trait AsLasStr {
    /// Interprets the bytes as a `&str`, permissively.
    ///
    /// # Examples
    ///
    /// `[u8]` implements `AsLasStr`.
    ///
    /// ```
    /// use las::utils::AsLasStr;
    /// assert_eq!("LiDAR", [76, 105, 68, 65, 82, 0, 33].as_las_str().unwrap());
    /// ```
    fn as_las_str(&self) -> Result<&str>;

    /// Interprets the bytes as a `&str`, enforcing the LAS rules.
    ///
    /// # Examples
    ///
    /// `[u8]` implements `AsLasStr`.
    ///
    /// ```
    /// use las::utils::AsLasStr;
    /// assert!([76, 105, 68, 65, 82, 0, 33].as_las_str_strict().is_err());
    /// ```
    fn as_las_str_strict(&self) -> Result<&str>;
}

impl AsLasStr for [u8] {
    fn as_las_str(&self) -> Result<&str> {
        if let Some(idx) = self.iter().position(|&n| n == 0) {
            str::from_utf8(&self[0..idx])
        } else {
            str::from_utf8(self)
        }
        .map_err(Error::from)
    }

    fn as_las_str_strict(&self) -> Result<&str> {
        let s = if let Some(idx) = self.iter().position(|&n| n == 0) {
            if self[idx..].iter().all(|&n| n == 0) {
                str::from_utf8(&self[0..idx]).map_err(Error::from)
            } else {
                Err(Error::NotNulFilled(self.to_vec()))
            }
        } else {
            str::from_utf8(self).map_err(Error::from)
        }?;
        if s.is_ascii() {
            Ok(s)
        } else {
            Err(Error::NotAscii(s.to_string()))
        }
    }
}

/// Converts a string into bytes, ensuring zero-fill.
pub trait FromLasStr {
    /// Modifies `self` to match the provided str.
    ///
    /// # Examples
    ///
    /// `&[u8]` implements `FromLasStr`:
    ///
    /// ```
    /// use las::utils::FromLasStr;
    /// let mut bytes = [1; 5];
    /// bytes.from_las_str("Beer").unwrap();
    /// assert_eq!([66, 101, 101, 114, 0], bytes);
    /// ```
    fn from_las_str(&mut self, s: &str) -> Result<()>;
}

impl<T: AsMut<[u8]>> FromLasStr for T {
    fn from_las_str(&mut self, s: &str) -> Result<()> {
        let count = self.as_mut().len();
        if s.len() > count {
            return Err(Error::TooLong(format!(
                "{} is larger than {} bytes",
                s, count
            )));
        }
        for (a, b) in self.as_mut().iter_mut().zip(s.bytes().chain(iter::repeat(0))) {
            *a = b;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_las_str_empty() {
        let buf = [0; 0];
        assert_eq!("", buf.as_las_str().unwrap());
        assert_eq!("", buf.as_las_str_strict().unwrap());
    }

    #[test]
    fn as_las_str_one() {
        let buf = [76];
        assert_eq!("L", buf.as_las_str().unwrap());
        assert_eq!("L", buf.as_las_str_strict().unwrap());
    }

    #[test]
    fn as_las_str_not_filled() {
        let buf = [76, 0, 33];
        assert_eq!("L", buf.as_las_str().unwrap());
        assert!(buf.as_las_str_strict().is_err());
    }

    #[test]
    fn as_las_str_unicode() {
        let buf = [240, 159, 146, 150];
        assert_eq!("\u{1f496}", buf.as_las_str().unwrap());
        assert!(buf.as_las_str_strict().is_err());
    }

    #[test]
    fn from_las_str_empty() {
        assert!([].from_las_str("").is_ok());
    }

    #[test]
    fn from_las_str_char() {
        let mut data = [0];
        data.from_las_str("B").unwrap();
        assert_eq!([66], data);
    }

    #[test]
    fn from_las_str_fill() {
        let mut data = [0, 1];
        data.from_las_str("B").unwrap();
        assert_eq!([66, 0], data);
    }

    #[test]
    fn from_las_str_too_many() {
        let mut data = [0];
        assert!(data.from_las_str("Be").is_err());
    }
}
