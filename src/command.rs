//! Tokenizes an argv-like vector of flags into reader options plus filter and transform
//! chains, mirroring the flag-driven configuration surface of `lasfilter.cpp` /
//! `lastransform.cpp` / `lasreader.cpp` (`-keep_xyz`, `-drop_class`, `-translate_z`, and so
//! on) without the rest of a `lastool`-style CLI frontend.

use crate::filter::{
    Channel, DropClassification, DropFlagged, DropReturnMask, FilterChain, KeepChannel,
    KeepCircle, KeepClassification, KeepClassificationRange, KeepEdgeOfFlightLine,
    KeepEveryNth, KeepGpsTime, KeepIntensity, KeepNumberOfReturns, KeepPointSource,
    KeepRandomFraction, KeepRawXyz, KeepRectangle, KeepReturn, KeepReturnMask, KeepScanAngle,
    KeepScanDirection, KeepScanDirectionChange, KeepTile, KeepUserData, KeepXyz, ReturnSelection,
    ThinWithGrid, ThinWithTime, WavepacketIndex,
};
use crate::point::{Classification, ScanDirection};
use crate::transform_chain::{
    AdjustedGpsToWeek, Axis, BinAbsScanAngleIntoPointSource, BinZIntoPointSource,
    ChangeClassification, ChangeNumberOfReturnsFromTo, ChangePointSource,
    ChangeReturnNumberFromTo, ChangeUserData, ClampCoordinate, ClampIntensity, ClampRawCoordinate,
    ClampScanAngle, ClampZ, ClassifyIntensity, ClassifyZ, CopyUserDataIntoPointSource, Flag,
    FlipWaveformDirection, RepairReturnNumbers, RotateXy, RotateXz, ScaleIntensity,
    ScaleRgbDown, ScaleRgbUp, ScaleScanAngle, ScaleXyz, SetClassification, SetFlag,
    SetNumberOfReturns, SetPointSource, SetReturnNumber, SetScannerChannel, SetUserData,
    SwitchAxes, SwitchCoordinates, TransformChain, TranslateGpsTime, TranslateIntensity,
    TranslateRawXyz, TranslateScanAngle, TranslateThenScaleIntensity, TranslateThenScaleScanAngle,
    TranslateThenScaleXyz, TranslateXyz, WeekToAdjustedGps,
};
use crate::{Bounds, Error, ReaderOptions, Result, Vector};

/// Parses a token stream into a `(ReaderOptions, FilterChain, TransformChain)` triple.
///
/// Each flag is consumed along with the fixed number of arguments it takes; an unrecognized
/// flag or a missing/unparseable argument is reported as [`Error::InvalidToken`] or
/// [`Error::MissingArgument`] naming the offending token, per §7's "configuration errors are
/// a dedicated variant naming the offending token" rule.
#[derive(Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Creates a new parser. `CommandParser` carries no state between calls to [`Self::parse`].
    pub fn new() -> Self {
        CommandParser
    }

    /// Parses `args` into reader options and filter/transform chains.
    ///
    /// # Examples
    ///
    /// ```
    /// use las::command::CommandParser;
    ///
    /// let (_options, mut filters, mut transforms) = CommandParser::new()
    ///     .parse(&["-keep_first", "-translate_z", "1.5"])
    ///     .unwrap();
    /// let mut point = las::Point { return_number: 2, number_of_returns: 2, ..Default::default() };
    /// assert!(filters.matches(&point));
    /// transforms.apply(&mut point);
    /// assert_eq!(1.5, point.z);
    /// ```
    pub fn parse(&self, args: &[&str]) -> Result<(ReaderOptions, FilterChain, TransformChain)> {
        let mut options = ReaderOptions::default();
        let mut filters = FilterChain::new();
        let mut transforms = TransformChain::new();

        // Classification and return-number bitmasks are accumulated across the whole token
        // stream (there may be several `-keep_class`/`-drop_class` occurrences) and combined
        // once parsing finishes, per §4.3's "bitmask convention": keep is computed first, drop
        // subtracts, and an empty drop with a non-empty keep implies drop = ~keep.
        let mut keep_classes: Option<Vec<Classification>> = None;
        let mut drop_classes: Option<Vec<Classification>> = None;
        let mut keep_return_mask: Option<u16> = None;
        let mut drop_return_mask: Option<u16> = None;

        let mut tokens = args.iter().copied().peekable();
        while let Some(token) = tokens.next() {
            match token {
                "-keep_xyz" => {
                    let min = Vector {
                        x: next_f64(&mut tokens, token)?,
                        y: next_f64(&mut tokens, token)?,
                        z: next_f64(&mut tokens, token)?,
                    };
                    let max = Vector {
                        x: next_f64(&mut tokens, token)?,
                        y: next_f64(&mut tokens, token)?,
                        z: next_f64(&mut tokens, token)?,
                    };
                    filters.push(Box::new(KeepXyz::new(Bounds { min, max })));
                }
                "-keep_raw_xyz" => {
                    let min = Vector {
                        x: next_i64(&mut tokens, token)?,
                        y: next_i64(&mut tokens, token)?,
                        z: next_i64(&mut tokens, token)?,
                    };
                    let max = Vector {
                        x: next_i64(&mut tokens, token)?,
                        y: next_i64(&mut tokens, token)?,
                        z: next_i64(&mut tokens, token)?,
                    };
                    filters.push(Box::new(KeepRawXyz::new(min, max)));
                }
                "-keep_rectangle" => {
                    let min = (next_f64(&mut tokens, token)?, next_f64(&mut tokens, token)?);
                    let max = (next_f64(&mut tokens, token)?, next_f64(&mut tokens, token)?);
                    filters.push(Box::new(KeepRectangle::new(min, max)));
                }
                "-keep_tile" => {
                    let ll = (next_f64(&mut tokens, token)?, next_f64(&mut tokens, token)?);
                    let size = next_f64(&mut tokens, token)?;
                    filters.push(Box::new(KeepTile::new(ll, size)));
                }
                "-keep_circle" => {
                    let center = (next_f64(&mut tokens, token)?, next_f64(&mut tokens, token)?);
                    let radius = next_f64(&mut tokens, token)?;
                    filters.push(Box::new(KeepCircle::new(center, radius)));
                }
                "-keep_class" => {
                    keep_classes
                        .get_or_insert_with(Vec::new)
                        .extend(classifications(&mut tokens, token)?);
                }
                "-drop_class" => {
                    drop_classes
                        .get_or_insert_with(Vec::new)
                        .extend(classifications(&mut tokens, token)?);
                }
                "-keep_class_range" => {
                    let min = next_u8(&mut tokens, token)?;
                    let max = next_u8(&mut tokens, token)?;
                    filters.push(Box::new(KeepClassificationRange::between(min, max)));
                }
                "-keep_first" | "-first_only" => {
                    filters.push(Box::new(KeepReturn::new(ReturnSelection::First)));
                }
                "-keep_last" | "-last_only" => {
                    filters.push(Box::new(KeepReturn::new(ReturnSelection::Last)));
                }
                "-keep_intermediate" => {
                    filters.push(Box::new(KeepReturn::new(ReturnSelection::Intermediate)));
                }
                "-keep_first_of_many" => {
                    filters.push(Box::new(KeepReturn::new(ReturnSelection::FirstOfMany)));
                }
                "-keep_last_of_many" => {
                    filters.push(Box::new(KeepReturn::new(ReturnSelection::LastOfMany)));
                }
                "-keep_number_of_returns" => {
                    let n = next_u8(&mut tokens, token)?;
                    filters.push(Box::new(KeepNumberOfReturns::new(n)));
                }
                "-keep_return" => {
                    let mask = return_mask(&mut tokens, token)?;
                    *keep_return_mask.get_or_insert(0) |= mask;
                }
                "-drop_return" => {
                    let mask = return_mask(&mut tokens, token)?;
                    *drop_return_mask.get_or_insert(0) |= mask;
                }
                "-keep_scan_direction" => {
                    let n = next_u8(&mut tokens, token)?;
                    let direction = if n == 0 {
                        ScanDirection::RightToLeft
                    } else {
                        ScanDirection::LeftToRight
                    };
                    filters.push(Box::new(KeepScanDirection::new(direction)));
                }
                "-keep_scan_direction_change" => {
                    filters.push(Box::new(KeepScanDirectionChange::new()));
                }
                "-keep_edge_of_flight_line" => {
                    filters.push(Box::new(KeepEdgeOfFlightLine::new()));
                }
                "-drop_withheld" => {
                    filters.push(Box::new(DropFlagged::new().with_withheld()));
                }
                "-drop_synthetic" => {
                    filters.push(Box::new(DropFlagged::new().with_synthetic()));
                }
                "-drop_keypoint" => {
                    filters.push(Box::new(DropFlagged::new().with_key_point()));
                }
                "-drop_overlap" => {
                    filters.push(Box::new(DropFlagged::new().with_overlap()));
                }
                "-keep_every_nth" => {
                    let n = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepEveryNth::new(n)));
                }
                "-keep_random_fraction" => {
                    let fraction = next_f64(&mut tokens, token)?;
                    filters.push(Box::new(KeepRandomFraction::new(fraction)));
                }
                "-thin_with_grid" => {
                    let step = next_f64(&mut tokens, token)?;
                    filters.push(Box::new(ThinWithGrid::new(step)));
                }
                "-thin_with_time" => {
                    let dt = next_f64(&mut tokens, token)?;
                    filters.push(Box::new(ThinWithTime::new(dt)));
                }
                "-keep_intensity" => {
                    let min = next_u64(&mut tokens, token)?;
                    let max = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepIntensity::between(min as u16, max as u16)));
                }
                "-keep_intensity_above" => {
                    let min = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepIntensity::above(min as u16)));
                }
                "-keep_intensity_below" => {
                    let max = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepIntensity::below(max as u16)));
                }
                "-keep_scan_angle" => {
                    let min = next_f64(&mut tokens, token)? as f32;
                    let max = next_f64(&mut tokens, token)? as f32;
                    filters.push(Box::new(KeepScanAngle::between(min, max)));
                }
                "-keep_abs_scan_angle_above" => {
                    let min = next_f64(&mut tokens, token)? as f32;
                    filters.push(Box::new(KeepScanAngle::abs_above(min)));
                }
                "-keep_user_data" => {
                    let n = next_u8(&mut tokens, token)?;
                    filters.push(Box::new(KeepUserData::exact(n)));
                }
                "-keep_point_source" => {
                    let n = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepPointSource::exact(n as u16)));
                }
                "-keep_gps_time" => {
                    let min = next_f64(&mut tokens, token)?;
                    let max = next_f64(&mut tokens, token)?;
                    filters.push(Box::new(KeepGpsTime::between(min, max)));
                }
                "-keep_rgb" => {
                    let channel = next_channel(&mut tokens, token)?;
                    let min = next_u64(&mut tokens, token)?;
                    let max = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepChannel::between(channel, min as u16, max as u16)));
                }
                "-keep_nir" => {
                    let min = next_u64(&mut tokens, token)?;
                    let max = next_u64(&mut tokens, token)?;
                    filters.push(Box::new(KeepChannel::between(
                        Channel::Nir,
                        min as u16,
                        max as u16,
                    )));
                }
                "-keep_wavepacket" => {
                    let n = next_u8(&mut tokens, token)?;
                    filters.push(Box::new(WavepacketIndex::keep(n)));
                }
                "-drop_wavepacket" => {
                    let n = next_u8(&mut tokens, token)?;
                    filters.push(Box::new(WavepacketIndex::drop(n)));
                }
                "-translate_xyz" => {
                    let dx = next_f64(&mut tokens, token)?;
                    let dy = next_f64(&mut tokens, token)?;
                    let dz = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateXyz::new(dx, dy, dz)));
                }
                "-translate_x" => {
                    let dx = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateXyz::new(dx, 0., 0.)));
                }
                "-translate_y" => {
                    let dy = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateXyz::new(0., dy, 0.)));
                }
                "-translate_z" => {
                    let dz = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateXyz::new(0., 0., dz)));
                }
                "-translate_raw_xyz" => {
                    let dx = next_i64(&mut tokens, token)?;
                    let dy = next_i64(&mut tokens, token)?;
                    let dz = next_i64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateRawXyz::new(dx, dy, dz)));
                }
                "-scale_xyz" => {
                    let sx = next_f64(&mut tokens, token)?;
                    let sy = next_f64(&mut tokens, token)?;
                    let sz = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(ScaleXyz::new(sx, sy, sz)));
                }
                "-translate_then_scale_xyz" => {
                    let dx = next_f64(&mut tokens, token)?;
                    let dy = next_f64(&mut tokens, token)?;
                    let dz = next_f64(&mut tokens, token)?;
                    let sx = next_f64(&mut tokens, token)?;
                    let sy = next_f64(&mut tokens, token)?;
                    let sz = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateThenScaleXyz::new(dx, dy, dz, sx, sy, sz)));
                }
                "-rotate_xy" => {
                    let angle = next_f64(&mut tokens, token)?;
                    let origin = (next_f64(&mut tokens, token)?, next_f64(&mut tokens, token)?);
                    transforms.push(Box::new(RotateXy::new(angle, origin)));
                }
                "-rotate_xz" => {
                    let angle = next_f64(&mut tokens, token)?;
                    let origin = (next_f64(&mut tokens, token)?, next_f64(&mut tokens, token)?);
                    transforms.push(Box::new(RotateXz::new(angle, origin)));
                }
                "-clamp_x" => {
                    let min = next_f64(&mut tokens, token)?;
                    let max = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampCoordinate::between(Axis::X, min, max)));
                }
                "-clamp_y" => {
                    let min = next_f64(&mut tokens, token)?;
                    let max = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampCoordinate::between(Axis::Y, min, max)));
                }
                "-clamp_z" => {
                    let min = next_f64(&mut tokens, token)?;
                    let max = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampZ::new(min, max)));
                }
                "-clamp_raw_x" => {
                    let min = next_i64(&mut tokens, token)?;
                    let max = next_i64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampRawCoordinate::between(Axis::X, min, max)));
                }
                "-clamp_raw_y" => {
                    let min = next_i64(&mut tokens, token)?;
                    let max = next_i64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampRawCoordinate::between(Axis::Y, min, max)));
                }
                "-clamp_raw_z" => {
                    let min = next_i64(&mut tokens, token)?;
                    let max = next_i64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampRawCoordinate::between(Axis::Z, min, max)));
                }
                "-scale_intensity" => {
                    let factor = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(ScaleIntensity::new(factor)));
                }
                "-translate_intensity" => {
                    let offset = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateIntensity::new(offset)));
                }
                "-translate_then_scale_intensity" => {
                    let offset = next_f64(&mut tokens, token)?;
                    let factor = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateThenScaleIntensity::new(offset, factor)));
                }
                "-clamp_intensity" => {
                    let min = next_u64(&mut tokens, token)?;
                    let max = next_u64(&mut tokens, token)?;
                    transforms.push(Box::new(ClampIntensity::between(min as u16, max as u16)));
                }
                "-scale_scan_angle" => {
                    let factor = next_f64(&mut tokens, token)? as f32;
                    transforms.push(Box::new(ScaleScanAngle::new(factor)));
                }
                "-translate_scan_angle" => {
                    let offset = next_f64(&mut tokens, token)? as f32;
                    transforms.push(Box::new(TranslateScanAngle::new(offset)));
                }
                "-translate_then_scale_scan_angle" => {
                    let offset = next_f64(&mut tokens, token)? as f32;
                    let factor = next_f64(&mut tokens, token)? as f32;
                    transforms.push(Box::new(TranslateThenScaleScanAngle::new(offset, factor)));
                }
                "-clamp_scan_angle" => {
                    let min = next_f64(&mut tokens, token)? as f32;
                    let max = next_f64(&mut tokens, token)? as f32;
                    transforms.push(Box::new(ClampScanAngle::new(min, max)));
                }
                "-set_classification" => {
                    let n = next_u64(&mut tokens, token)?;
                    transforms.push(Box::new(SetClassification::new(Classification::from(
                        n as u8,
                    ))));
                }
                "-change_classification" => {
                    let from = next_u64(&mut tokens, token)?;
                    let to = next_u64(&mut tokens, token)?;
                    transforms.push(Box::new(ChangeClassification::new(
                        Classification::from(from as u8),
                        Classification::from(to as u8),
                    )));
                }
                "-classify_z_below_as" => {
                    let z = next_f64(&mut tokens, token)?;
                    let class = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ClassifyZ::below(z, Classification::from(class))));
                }
                "-classify_z_above_as" => {
                    let z = next_f64(&mut tokens, token)?;
                    let class = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ClassifyZ::above(z, Classification::from(class))));
                }
                "-classify_z_between_as" => {
                    let min = next_f64(&mut tokens, token)?;
                    let max = next_f64(&mut tokens, token)?;
                    let class = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ClassifyZ::between(
                        min,
                        max,
                        Classification::from(class),
                    )));
                }
                "-classify_intensity_below_as" => {
                    let intensity = next_u64(&mut tokens, token)?;
                    let class = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ClassifyIntensity::below(
                        intensity as u16,
                        Classification::from(class),
                    )));
                }
                "-classify_intensity_above_as" => {
                    let intensity = next_u64(&mut tokens, token)?;
                    let class = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ClassifyIntensity::above(
                        intensity as u16,
                        Classification::from(class),
                    )));
                }
                "-set_withheld" => {
                    transforms.push(Box::new(SetFlag::new(Flag::Withheld, true)));
                }
                "-set_synthetic" => {
                    transforms.push(Box::new(SetFlag::new(Flag::Synthetic, true)));
                }
                "-set_keypoint" => {
                    transforms.push(Box::new(SetFlag::new(Flag::KeyPoint, true)));
                }
                "-set_extended_overlap" => {
                    transforms.push(Box::new(SetFlag::new(Flag::Overlap, true)));
                }
                "-set_scanner_channel" => {
                    let channel = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(SetScannerChannel::new(channel)));
                }
                "-set_user_data" => {
                    let value = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(SetUserData::new(value)));
                }
                "-change_user_data" => {
                    let from = next_u8(&mut tokens, token)?;
                    let to = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ChangeUserData::new(from, to)));
                }
                "-set_point_source" => {
                    let value = next_u64(&mut tokens, token)?;
                    transforms.push(Box::new(SetPointSource::new(value as u16)));
                }
                "-change_point_source" => {
                    let from = next_u64(&mut tokens, token)?;
                    let to = next_u64(&mut tokens, token)?;
                    transforms.push(Box::new(ChangePointSource::new(from as u16, to as u16)));
                }
                "-copy_user_data_into_point_source" => {
                    transforms.push(Box::new(CopyUserDataIntoPointSource::new()));
                }
                "-bin_Z_into_point_source" => {
                    let bin_size = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(BinZIntoPointSource::new(bin_size)));
                }
                "-bin_abs_scan_angle_into_point_source" => {
                    let bin_size = next_f64(&mut tokens, token)? as f32;
                    transforms.push(Box::new(BinAbsScanAngleIntoPointSource::new(bin_size)));
                }
                "-set_return_number" => {
                    let value = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(SetReturnNumber::new(value)));
                }
                "-set_number_of_returns" => {
                    let value = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(SetNumberOfReturns::new(value)));
                }
                "-change_return_number_from_to" => {
                    let from = next_u8(&mut tokens, token)?;
                    let to = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ChangeReturnNumberFromTo::new(from, to)));
                }
                "-change_number_of_returns_from_to" => {
                    let from = next_u8(&mut tokens, token)?;
                    let to = next_u8(&mut tokens, token)?;
                    transforms.push(Box::new(ChangeNumberOfReturnsFromTo::new(from, to)));
                }
                "-repair_return_numbers" => {
                    transforms.push(Box::new(RepairReturnNumbers::new()));
                }
                "-translate_gps_time" => {
                    let dt = next_f64(&mut tokens, token)?;
                    transforms.push(Box::new(TranslateGpsTime::new(dt)));
                }
                "-adjusted_to_week" => {
                    transforms.push(Box::new(AdjustedGpsToWeek::new()));
                }
                "-week_to_adjusted" => {
                    let week = next_i64(&mut tokens, token)?;
                    transforms.push(Box::new(WeekToAdjustedGps::new(week)));
                }
                "-scale_rgb_down" => {
                    transforms.push(Box::new(ScaleRgbDown::new()));
                }
                "-scale_rgb_up" => {
                    transforms.push(Box::new(ScaleRgbUp::new()));
                }
                "-switch_x_y" => {
                    transforms.push(Box::new(SwitchCoordinates::new(SwitchAxes::XY)));
                }
                "-switch_x_z" => {
                    transforms.push(Box::new(SwitchCoordinates::new(SwitchAxes::XZ)));
                }
                "-switch_y_z" => {
                    transforms.push(Box::new(SwitchCoordinates::new(SwitchAxes::YZ)));
                }
                "-flip_waveform_direction" => {
                    transforms.push(Box::new(FlipWaveformDirection::new()));
                }
                #[cfg(feature = "laz")]
                "-laz_sequential" => {
                    options = options.with_laz_parallelism(crate::LazParallelism::No);
                }
                #[cfg(feature = "laz-parallel")]
                "-laz_parallel" => {
                    options = options.with_laz_parallelism(crate::LazParallelism::Yes);
                }
                other => return Err(Error::InvalidToken(other.to_string())),
            }
        }

        if keep_classes.is_some() || drop_classes.is_some() {
            let keep = keep_classes.unwrap_or_default();
            let mut drop = drop_classes.unwrap_or_default();
            if drop.is_empty() && !keep.is_empty() {
                drop = (0u16..=255)
                    .map(|n| Classification::from(n as u8))
                    .filter(|c| !keep.contains(c))
                    .collect();
            }
            if !keep.is_empty() {
                filters.push(Box::new(KeepClassification::new(keep)));
            }
            if !drop.is_empty() {
                filters.push(Box::new(DropClassification::new(drop)));
            }
        }

        if keep_return_mask.is_some() || drop_return_mask.is_some() {
            let keep = keep_return_mask.unwrap_or(0xFFFF);
            let drop = match drop_return_mask {
                Some(mask) => mask,
                None if keep_return_mask.is_some() => !keep,
                None => 0,
            };
            if keep_return_mask.is_some() {
                filters.push(Box::new(KeepReturnMask::new(keep)));
            }
            if drop != 0 {
                filters.push(Box::new(DropReturnMask::new(drop)));
            }
        }

        Ok((options, filters, transforms))
    }
}

fn next_f64<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, flag: &str) -> Result<f64> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::MissingArgument(flag.to_string()))?;
    token
        .parse()
        .map_err(|_| Error::InvalidToken(token.to_string()))
}

fn next_u64<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, flag: &str) -> Result<u64> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::MissingArgument(flag.to_string()))?;
    token
        .parse()
        .map_err(|_| Error::InvalidToken(token.to_string()))
}

fn next_i64<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, flag: &str) -> Result<i64> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::MissingArgument(flag.to_string()))?;
    token
        .parse()
        .map_err(|_| Error::InvalidToken(token.to_string()))
}

fn next_u8<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, flag: &str) -> Result<u8> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::MissingArgument(flag.to_string()))?;
    token
        .parse()
        .map_err(|_| Error::InvalidToken(token.to_string()))
}

fn next_channel<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, flag: &str) -> Result<Channel> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::MissingArgument(flag.to_string()))?;
    match token {
        "r" | "red" => Ok(Channel::Red),
        "g" | "green" => Ok(Channel::Green),
        "b" | "blue" => Ok(Channel::Blue),
        other => Err(Error::InvalidToken(other.to_string())),
    }
}

/// Accumulates digit tokens following `-keep_class`/`-drop_class` into classification values,
/// stopping at the first non-numeric token (or end of input), per §4.5's two-pass digit
/// accumulation pattern.
fn classifications<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut std::iter::Peekable<I>,
    flag: &str,
) -> Result<Vec<Classification>> {
    let mut values = Vec::new();
    while let Some(token) = tokens.peek() {
        match token.parse::<u8>() {
            Ok(n) => {
                values.push(Classification::from(n));
                tokens.next();
            }
            Err(_) => break,
        }
    }
    if values.is_empty() {
        Err(Error::MissingArgument(flag.to_string()))
    } else {
        Ok(values)
    }
}

/// Accumulates digit tokens following `-keep_return`/`-drop_return` into a return-number
/// bitmask, stopping at the first non-numeric token (or end of input).
fn return_mask<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut std::iter::Peekable<I>,
    flag: &str,
) -> Result<u16> {
    let mut mask = 0u16;
    let mut any = false;
    while let Some(token) = tokens.peek() {
        match token.parse::<u8>() {
            Ok(n) => {
                mask |= 1u16 << n.min(15);
                any = true;
                tokens.next();
            }
            Err(_) => break,
        }
    }
    if any {
        Ok(mask)
    } else {
        Err(Error::MissingArgument(flag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keep_xyz_and_translate_z() {
        let (_options, mut filters, mut transforms) = CommandParser::new()
            .parse(&["-keep_xyz", "0", "0", "0", "10", "10", "10", "-translate_z", "1"])
            .unwrap();
        let mut point = crate::Point {
            x: 5.,
            y: 5.,
            z: 5.,
            ..Default::default()
        };
        assert!(filters.keep(&point));
        transforms.apply(&mut point);
        assert_eq!(6., point.z);
    }

    #[test]
    fn keep_class_accumulates_multiple_digits() {
        let (_options, mut filters, _transforms) = CommandParser::new()
            .parse(&["-keep_class", "2", "3", "4", "-translate_z", "1"])
            .unwrap();
        let point = crate::Point {
            classification: Classification::Ground,
            ..Default::default()
        };
        assert!(filters.keep(&point));
        let other = crate::Point {
            classification: Classification::Water,
            ..Default::default()
        };
        assert!(!filters.keep(&other));
    }

    #[test]
    fn keep_class_without_drop_implies_drop_is_complement() {
        let (_options, mut filters, _transforms) =
            CommandParser::new().parse(&["-keep_class", "2"]).unwrap();
        let kept = crate::Point {
            classification: Classification::Ground,
            ..Default::default()
        };
        let dropped = crate::Point {
            classification: Classification::Unclassified,
            ..Default::default()
        };
        assert!(filters.keep(&kept));
        assert!(!filters.keep(&dropped));
    }

    #[test]
    fn keep_return_accumulates_into_a_bitmask() {
        let (_options, mut filters, _transforms) = CommandParser::new()
            .parse(&["-keep_return", "1", "2"])
            .unwrap();
        assert!(filters.keep(&crate::Point {
            return_number: 1,
            ..Default::default()
        }));
        assert!(!filters.keep(&crate::Point {
            return_number: 3,
            ..Default::default()
        }));
    }

    #[test]
    fn unknown_token_is_an_error() {
        assert!(CommandParser::new().parse(&["-not_a_flag"]).is_err());
    }

    #[test]
    fn missing_argument_is_an_error() {
        assert!(CommandParser::new().parse(&["-translate_z"]).is_err());
    }
}
