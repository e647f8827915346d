//! Read and write point clouds stored in the ASPRS [LAS](https://www.asprs.org/committee-general/laser-las-file-format-exchange-activities.html)
//! data exchange format, including [LASzip](https://laszip.org/)-compressed LAZ.
//!
//! # Reading
//!
//! [Reader] reads points one at a time, or in batches:
//!
//! ```
//! use las::Reader;
//!
//! let mut reader = Reader::from_path("tests/data/autzen.las").unwrap();
//! let mut points = Vec::new();
//! reader.read_all_points_into(&mut points).unwrap();
//! println!("Number of points: {}", points.len());
//! ```
//!
//! # Writing
//!
//! [Writer] writes points to anything that implements `Write + Seek`:
//!
//! ```
//! use las::{Point, Writer};
//!
//! let mut writer = Writer::default();
//! writer.write_point(Point::default()).unwrap();
//! ```
//!
//! # Filters and transforms
//!
//! [filter] and [transform_chain] hold composable, reusable logic for culling and modifying
//! points as they pass through a [pipeline].
//!
//! # Spatial indexes
//!
//! [index] builds and queries on-disk spatial indexes (`.lax` sidecar files), and [copc] reads
//! the hierarchy of a [Cloud Optimized Point Cloud](https://copc.io/).

#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

pub mod binary_point_reader;
mod bounds;
mod color;
pub mod command;
pub mod copc;
pub mod crs;
mod error;
pub mod feature;
pub mod filter;
mod gps_time_type;
pub mod grid_reader;
mod header;
pub mod index;
#[cfg(feature = "laz")]
pub mod laz;
pub mod pipeline;
pub mod point;
pub mod raw;
mod reader;
pub mod shp_reader;
pub mod text_reader;
mod transform;
pub mod transform_chain;
pub mod utils;
mod vector;
mod version;
mod vlr;
mod writer;

pub use crate::bounds::Bounds;
pub use crate::color::Color;
pub use crate::error::{Error, Result};
pub use crate::feature::Feature;
pub use crate::gps_time_type::GpsTimeType;
pub use crate::header::{Builder, Header, Vlrs};
pub use crate::point::Point;
pub use crate::transform::{RoundingMode, Transform};
pub use crate::vector::Vector;
pub use crate::version::Version;
pub use crate::vlr::Vlr;

#[cfg(feature = "laz")]
pub use crate::reader::LazParallelism;
pub use crate::reader::{PointIterator, Reader, ReaderOptions};
#[allow(deprecated)]
pub use crate::reader::Read;

pub use crate::writer::{Writer, WriterOptions};
#[allow(deprecated)]
pub use crate::writer::Write;
