//! Crate-wide error type.

use crate::point::Format;
use crate::Version;
use thiserror::Error;

/// Crate-specific errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Wraps `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wraps `std::str::Utf8Error`.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// Wraps `std::num::TryFromIntError`.
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// A string is longer than the fixed-width field it must be written into.
    #[error("{0} is too long for its field")]
    TooLong(String),

    /// A fixed-width string field isn't zero-filled after its first nul byte.
    #[error("not nul filled: {0:?}")]
    NotNulFilled(Vec<u8>),

    /// A fixed-width string field contains non-ascii bytes.
    #[error("not ascii: {0}")]
    NotAscii(String),

    /// A character followed a nul byte in a string field.
    #[error("a non-nul character followed a nul byte")]
    CharacterAfterNullByte,

    /// The file signature wasn't `LASF`.
    #[error("invalid file signature: {0:?}")]
    FileSignature([u8; 4]),

    /// An invalid point data format number.
    #[error("invalid point format: {0}")]
    InvalidPointFormat(u8),

    /// A combination of fields that cannot exist together on a point format.
    #[error("invalid combination of point format options: {0:?}")]
    InvalidFormatOptions(Format),

    /// An invalid classification value.
    #[error("invalid classification: {0}")]
    Classification(u8),

    /// An invalid return number for the operation.
    #[error("invalid return number: {0}, number of returns: {1:?}")]
    ReturnNumber(u8, Option<u8>),

    /// An invalid scanner channel, for a legacy (two-byte flags) point.
    #[error("invalid scanner channel for two-byte flags: {0}")]
    ScannerChannel(u8),

    /// This header is too large to be represented on disk.
    #[error("header is too large: {0} bytes")]
    HeaderTooLarge(usize),

    /// The offset to point data is too large to be represented on disk.
    #[error("offset to point data is too large: {0}")]
    OffsetToPointDataTooLarge(usize),

    /// A header's offset to point data falls before the end of its vlrs.
    #[error("offset to point data is too small: {0}")]
    OffsetToPointDataTooSmall(u32),

    /// A header's start of first evlr falls before the end of the point data.
    #[error("start of first evlr is too small: {0}")]
    OffsetToEvlrsTooSmall(u64),

    /// There are too many variable length records to be represented on disk.
    #[error("too many variable length records: {0}")]
    TooManyVlrs(usize),

    /// There are too many extended variable length records to be represented on disk.
    #[error("too many extended variable length records: {0}")]
    TooManyEvlrs(usize),

    /// A variable length record's payload is too long to be written as a regular (non-extended)
    /// vlr.
    #[error("vlr data is too long to be written as a non-extended vlr: {0} bytes")]
    VlrDataTooLong(usize),

    /// There are too many points to be represented on disk with this header's version.
    #[error("too many points for {version}: {n}")]
    TooManyPoints {
        /// The version.
        version: Version,
        /// The number of points.
        n: u64,
    },

    /// A version doesn't support a feature that's required by the configuration.
    #[error("{version} does not support {feature}")]
    Feature {
        /// The version.
        version: Version,
        /// The feature's name.
        feature: &'static str,
    },

    /// A version doesn't support a point format.
    #[error("{version} does not support format {format:?}")]
    Format {
        /// The version.
        version: Version,
        /// The format.
        format: Format,
    },

    /// A header had point padding set, but no evlrs to require it.
    #[error("point padding is only allowed when there are evlrs")]
    PointPadding,

    /// A header's declared point data record length doesn't match its point format.
    #[error("point data record length {len} is too small for format {format:?}")]
    PointDataRecordLength {
        /// The format.
        format: Format,
        /// The declared record length.
        len: u16,
    },

    /// A point's optional attributes don't match the ones required by its point format.
    #[error("this point's attributes don't match format {0:?}")]
    PointAttributesDoNotMatch(Format),

    /// A writer has already been closed.
    #[error("this writer is already closed")]
    ClosedWriter,

    /// A laszip vlr could not be found in a header that claims to be compressed.
    #[error("no laszip vlr found")]
    LasZipVlrNotFound,

    /// The `laz` feature is required for this operation but was not enabled.
    #[error("the `laz` feature is required to read or write compressed points")]
    LaszipNotEnabled,

    /// An error from the `laz` crate.
    #[cfg(feature = "laz")]
    #[error(transparent)]
    Laz(#[from] laz::LasZipError),

    /// A COPC info vlr could not be found.
    #[error("no copc info vlr found")]
    CopcInfoVlrNotFound,

    /// A COPC hierarchy evlr could not be found.
    #[error("no copc hierarchy evlr found")]
    CopcHierarchyVlrNotFound,

    /// Arguments passed to a COPC function don't satisfy its requirements.
    #[error("function argument requirements not met: {message}")]
    FunctionArgumentRequirementsNotMet {
        /// A description of the violated requirement.
        message: String,
    },

    /// A header already has a crs vlr, and a new one was requested.
    #[error("this header already has a crs vlr")]
    HeaderContainsCrsVlr,

    /// A requested crs feature isn't supported by this header's version or point format.
    #[error("unsupported feature: {message}")]
    UnsupportedFeature {
        /// A description of the missing feature.
        message: String,
    },

    /// A WKT crs vlr's payload could not be interpreted.
    #[error("unreadable wkt crs")]
    UnreadableWktCrs,

    /// A GeoTIFF crs vlr's payload could not be interpreted.
    #[error("unreadable geotiff crs")]
    UnreadableGeoTiffCrs,

    /// A GeoTIFF crs used a user-defined (rather than EPSG) code.
    #[error("user-defined geotiff crs has no epsg code")]
    UserDefinedCrs,

    /// A GeoTIFF key references string/double data that this crate doesn't interpret.
    #[error("unimplemented for geotiff key {0}")]
    UnimplementedForGeoTiffStringAndDoubleData(u16),

    /// An undefined GeoTIFF key was referenced.
    #[error("undefined data for geotiff key {0}")]
    UndefinedDataForGeoTiffKey(u16),

    /// A command-line token could not be parsed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// A required command-line argument was missing.
    #[error("missing argument for {0}")]
    MissingArgument(String),

    /// A spatial index is malformed.
    #[error("invalid spatial index: {0}")]
    InvalidIndex(String),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
