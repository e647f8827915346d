//! Per-point mutators applied, in order, as points pass through a [pipeline](crate::pipeline).
//!
//! Named `transform_chain` rather than `transform` so it doesn't collide with the existing
//! [`crate::Transform`] quantizer (scale/offset) type; within this module, `Transform` refers
//! to the per-point mutator trait, grounded on `lastransform.cpp`'s per-operation structure
//! (one struct per operation, a virtual `transform()`, and an overflow counter for operations
//! that can saturate their field's integer range).

use crate::filter::Threshold;
use crate::point::Classification;
use crate::Point;

/// Which of a point's coordinate-adjacent fields an operation may mutate. [`TransformChain`]
/// publishes the OR of every operation's `affects()` so a reader can skip decompressing
/// unaffected sub-streams when compression is selective, per §4.4's "unified coordinate-
/// affecting bitmask".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AffectedFields(u8);

impl AffectedFields {
    /// No fields affected.
    pub const NONE: AffectedFields = AffectedFields(0);
    /// The `x` coordinate.
    pub const X: AffectedFields = AffectedFields(0b0001);
    /// The `y` coordinate.
    pub const Y: AffectedFields = AffectedFields(0b0010);
    /// The `z` coordinate.
    pub const Z: AffectedFields = AffectedFields(0b0100);
    /// Intensity.
    pub const INTENSITY: AffectedFields = AffectedFields(0b1000);

    /// The bitwise union of `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        AffectedFields(self.0 | other.0)
    }

    /// True if every field set in `other` is also set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for AffectedFields {
    type Output = AffectedFields;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A single per-point mutation.
pub trait Transform: std::fmt::Debug {
    /// A short, stable name for this transform.
    fn name(&self) -> &str;

    /// Mutates `point` in place.
    fn apply(&mut self, point: &mut Point);

    /// The number of times this transform has clamped an out-of-range value rather than
    /// applying it directly, since this transform was created or last reset.
    fn overflows(&self) -> u64 {
        0
    }

    /// Resets this transform's internal state (overflow counters) to its initial value.
    fn reset(&mut self) {}

    /// Which coordinate-adjacent fields this operation can mutate.
    fn affects(&self) -> AffectedFields {
        AffectedFields::NONE
    }
}

/// Translates x, y, and z by fixed offsets.
#[derive(Debug, Clone, Copy)]
pub struct TranslateXyz {
    dx: f64,
    dy: f64,
    dz: f64,
}

impl TranslateXyz {
    /// Creates a transform that adds `(dx, dy, dz)` to every point's coordinates.
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        TranslateXyz { dx, dy, dz }
    }
}

impl Transform for TranslateXyz {
    fn name(&self) -> &str {
        "translate_xyz"
    }

    fn apply(&mut self, point: &mut Point) {
        point.x += self.dx;
        point.y += self.dy;
        point.z += self.dz;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::X | AffectedFields::Y | AffectedFields::Z
    }
}

/// Scales x, y, and z by fixed factors.
#[derive(Debug, Clone, Copy)]
pub struct ScaleXyz {
    sx: f64,
    sy: f64,
    sz: f64,
}

impl ScaleXyz {
    /// Creates a transform that multiplies every point's coordinates by `(sx, sy, sz)`.
    pub fn new(sx: f64, sy: f64, sz: f64) -> Self {
        ScaleXyz { sx, sy, sz }
    }
}

impl Transform for ScaleXyz {
    fn name(&self) -> &str {
        "scale_xyz"
    }

    fn apply(&mut self, point: &mut Point) {
        point.x *= self.sx;
        point.y *= self.sy;
        point.z *= self.sz;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::X | AffectedFields::Y | AffectedFields::Z
    }
}

/// Translates then scales x, y, and z, in that order.
#[derive(Debug, Clone, Copy)]
pub struct TranslateThenScaleXyz {
    translate: TranslateXyz,
    scale: ScaleXyz,
}

impl TranslateThenScaleXyz {
    /// Creates a transform that adds `(dx, dy, dz)` then multiplies by `(sx, sy, sz)`.
    pub fn new(dx: f64, dy: f64, dz: f64, sx: f64, sy: f64, sz: f64) -> Self {
        TranslateThenScaleXyz {
            translate: TranslateXyz::new(dx, dy, dz),
            scale: ScaleXyz::new(sx, sy, sz),
        }
    }
}

impl Transform for TranslateThenScaleXyz {
    fn name(&self) -> &str {
        "translate_then_scale_xyz"
    }

    fn apply(&mut self, point: &mut Point) {
        self.translate.apply(point);
        self.scale.apply(point);
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::X | AffectedFields::Y | AffectedFields::Z
    }
}

/// Rotates x/y about an origin by an angle given in degrees.
#[derive(Debug, Clone, Copy)]
pub struct RotateXy {
    cos: f64,
    sin: f64,
    origin: (f64, f64),
}

impl RotateXy {
    /// Creates a transform that rotates every point's `(x, y)` by `angle_degrees` about
    /// `origin`, counter-clockwise for a positive angle.
    pub fn new(angle_degrees: f64, origin: (f64, f64)) -> Self {
        let radians = angle_degrees.to_radians();
        RotateXy {
            cos: radians.cos(),
            sin: radians.sin(),
            origin,
        }
    }
}

impl Transform for RotateXy {
    fn name(&self) -> &str {
        "rotate_xy"
    }

    fn apply(&mut self, point: &mut Point) {
        let x = point.x - self.origin.0;
        let y = point.y - self.origin.1;
        point.x = self.origin.0 + x * self.cos - y * self.sin;
        point.y = self.origin.1 + x * self.sin + y * self.cos;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::X | AffectedFields::Y
    }
}

/// Rotates x/z about an origin by an angle given in degrees.
#[derive(Debug, Clone, Copy)]
pub struct RotateXz {
    cos: f64,
    sin: f64,
    origin: (f64, f64),
}

impl RotateXz {
    /// Creates a transform that rotates every point's `(x, z)` by `angle_degrees` about
    /// `origin`.
    pub fn new(angle_degrees: f64, origin: (f64, f64)) -> Self {
        let radians = angle_degrees.to_radians();
        RotateXz {
            cos: radians.cos(),
            sin: radians.sin(),
            origin,
        }
    }
}

impl Transform for RotateXz {
    fn name(&self) -> &str {
        "rotate_xz"
    }

    fn apply(&mut self, point: &mut Point) {
        let x = point.x - self.origin.0;
        let z = point.z - self.origin.1;
        point.x = self.origin.0 + x * self.cos - z * self.sin;
        point.z = self.origin.1 + x * self.sin + z * self.cos;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::X | AffectedFields::Z
    }
}

/// Which axis a generic coordinate clamp applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The `x` coordinate.
    X,
    /// The `y` coordinate.
    Y,
    /// The `z` coordinate.
    Z,
}

/// Clamps one real coordinate (`x`, `y`, or `z`) to a window.
#[derive(Debug, Clone, Copy)]
pub struct ClampCoordinate {
    axis: Axis,
    threshold: Threshold<f64>,
    overflows: u64,
}

impl ClampCoordinate {
    /// Clamps `axis` to `[min, max]`.
    pub fn between(axis: Axis, min: f64, max: f64) -> Self {
        ClampCoordinate {
            axis,
            threshold: Threshold::Between(min, max),
            overflows: 0,
        }
    }

    /// Clamps `axis` to a floor of `min`.
    pub fn above(axis: Axis, min: f64) -> Self {
        ClampCoordinate {
            axis,
            threshold: Threshold::Above(min),
            overflows: 0,
        }
    }

    /// Clamps `axis` to a ceiling of `max`.
    pub fn below(axis: Axis, max: f64) -> Self {
        ClampCoordinate {
            axis,
            threshold: Threshold::Below(max),
            overflows: 0,
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        match self.threshold {
            Threshold::Above(min) => value.max(min),
            Threshold::Below(max) => value.min(max),
            Threshold::Between(min, max) => value.clamp(min, max),
        }
    }
}

impl Transform for ClampCoordinate {
    fn name(&self) -> &str {
        "clamp_coordinate"
    }

    fn apply(&mut self, point: &mut Point) {
        let field = match self.axis {
            Axis::X => &mut point.x,
            Axis::Y => &mut point.y,
            Axis::Z => &mut point.z,
        };
        let clamped = self.clamp(*field);
        if clamped != *field {
            self.overflows += 1;
        }
        *field = clamped;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }

    fn affects(&self) -> AffectedFields {
        match self.axis {
            Axis::X => AffectedFields::X,
            Axis::Y => AffectedFields::Y,
            Axis::Z => AffectedFields::Z,
        }
    }
}

/// Clamps z to an inclusive range. Kept as a thin, commonly-used specialization of
/// [`ClampCoordinate`] for the `-clamp_z` flag.
#[derive(Debug, Clone, Copy)]
pub struct ClampZ {
    inner: ClampCoordinate,
}

impl ClampZ {
    /// Creates a transform that clamps every point's z to `[min, max]`.
    pub fn new(min: f64, max: f64) -> Self {
        ClampZ {
            inner: ClampCoordinate::between(Axis::Z, min, max),
        }
    }
}

impl Transform for ClampZ {
    fn name(&self) -> &str {
        "clamp_z"
    }

    fn apply(&mut self, point: &mut Point) {
        self.inner.apply(point);
    }

    fn overflows(&self) -> u64 {
        self.inner.overflows()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::Z
    }
}

/// Clamps one raw (unscaled integer) coordinate to a window.
///
/// As with [`crate::filter::KeepRawXyz`], there's no header scale/offset available at
/// transform time, so this clamps `x/y/z` truncated to `i64` and writes the clamped value back
/// as `f64`; it is exact for already-integral coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ClampRawCoordinate {
    axis: Axis,
    threshold: Threshold<i64>,
    overflows: u64,
}

impl ClampRawCoordinate {
    /// Clamps `axis` to `[min, max]` in raw integer units.
    pub fn between(axis: Axis, min: i64, max: i64) -> Self {
        ClampRawCoordinate {
            axis,
            threshold: Threshold::Between(min, max),
            overflows: 0,
        }
    }
}

impl Transform for ClampRawCoordinate {
    fn name(&self) -> &str {
        "clamp_raw_coordinate"
    }

    fn apply(&mut self, point: &mut Point) {
        let field = match self.axis {
            Axis::X => &mut point.x,
            Axis::Y => &mut point.y,
            Axis::Z => &mut point.z,
        };
        let raw = *field as i64;
        let clamped = match self.threshold {
            Threshold::Above(min) => raw.max(min),
            Threshold::Below(max) => raw.min(max),
            Threshold::Between(min, max) => raw.clamp(min, max),
        };
        if clamped != raw {
            self.overflows += 1;
            *field = clamped as f64;
        }
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }

    fn affects(&self) -> AffectedFields {
        match self.axis {
            Axis::X => AffectedFields::X,
            Axis::Y => AffectedFields::Y,
            Axis::Z => AffectedFields::Z,
        }
    }
}

/// Translates one raw (unscaled integer) coordinate by a fixed amount, per
/// [`ClampRawCoordinate`]'s raw-domain caveat.
#[derive(Debug, Clone, Copy)]
pub struct TranslateRawXyz {
    dx: i64,
    dy: i64,
    dz: i64,
}

impl TranslateRawXyz {
    /// Creates a transform that adds `(dx, dy, dz)` raw integer units to every point.
    pub fn new(dx: i64, dy: i64, dz: i64) -> Self {
        TranslateRawXyz { dx, dy, dz }
    }
}

impl Transform for TranslateRawXyz {
    fn name(&self) -> &str {
        "translate_raw_xyz"
    }

    fn apply(&mut self, point: &mut Point) {
        point.x = (point.x as i64 + self.dx) as f64;
        point.y = (point.y as i64 + self.dy) as f64;
        point.z = (point.z as i64 + self.dz) as f64;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::X | AffectedFields::Y | AffectedFields::Z
    }
}

/// Scales intensity by a fixed factor, clamping to `u16::MAX` on overflow.
#[derive(Debug, Clone, Copy)]
pub struct ScaleIntensity {
    factor: f64,
    overflows: u64,
}

impl ScaleIntensity {
    /// Creates a transform that multiplies every point's intensity by `factor`.
    pub fn new(factor: f64) -> Self {
        ScaleIntensity {
            factor,
            overflows: 0,
        }
    }
}

impl Transform for ScaleIntensity {
    fn name(&self) -> &str {
        "scale_intensity"
    }

    fn apply(&mut self, point: &mut Point) {
        let scaled = f64::from(point.intensity) * self.factor;
        if scaled > f64::from(u16::MAX) || scaled < 0. {
            self.overflows += 1;
        }
        point.intensity = scaled.clamp(0., f64::from(u16::MAX)).round() as u16;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::INTENSITY
    }
}

/// Translates intensity by a fixed offset, clamping to `u16`'s range on overflow.
#[derive(Debug, Clone, Copy)]
pub struct TranslateIntensity {
    offset: f64,
    overflows: u64,
}

impl TranslateIntensity {
    /// Creates a transform that adds `offset` to every point's intensity.
    pub fn new(offset: f64) -> Self {
        TranslateIntensity {
            offset,
            overflows: 0,
        }
    }
}

impl Transform for TranslateIntensity {
    fn name(&self) -> &str {
        "translate_intensity"
    }

    fn apply(&mut self, point: &mut Point) {
        let translated = f64::from(point.intensity) + self.offset;
        if translated > f64::from(u16::MAX) || translated < 0. {
            self.overflows += 1;
        }
        point.intensity = translated.clamp(0., f64::from(u16::MAX)).round() as u16;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::INTENSITY
    }
}

/// Translates then scales intensity, in that order, clamping to `u16`'s range on overflow.
#[derive(Debug, Clone, Copy)]
pub struct TranslateThenScaleIntensity {
    offset: f64,
    factor: f64,
    overflows: u64,
}

impl TranslateThenScaleIntensity {
    /// Creates a transform that adds `offset` then multiplies by `factor`.
    pub fn new(offset: f64, factor: f64) -> Self {
        TranslateThenScaleIntensity {
            offset,
            factor,
            overflows: 0,
        }
    }
}

impl Transform for TranslateThenScaleIntensity {
    fn name(&self) -> &str {
        "translate_then_scale_intensity"
    }

    fn apply(&mut self, point: &mut Point) {
        let value = (f64::from(point.intensity) + self.offset) * self.factor;
        if value > f64::from(u16::MAX) || value < 0. {
            self.overflows += 1;
        }
        point.intensity = value.clamp(0., f64::from(u16::MAX)).round() as u16;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::INTENSITY
    }
}

/// Clamps intensity to a window, saturating to `u16`'s range.
#[derive(Debug, Clone, Copy)]
pub struct ClampIntensity {
    threshold: Threshold<u16>,
    overflows: u64,
}

impl ClampIntensity {
    /// Clamps intensity to `[min, max]`.
    pub fn between(min: u16, max: u16) -> Self {
        ClampIntensity {
            threshold: Threshold::Between(min, max),
            overflows: 0,
        }
    }

    /// Clamps intensity to a floor of `min`.
    pub fn above(min: u16) -> Self {
        ClampIntensity {
            threshold: Threshold::Above(min),
            overflows: 0,
        }
    }

    /// Clamps intensity to a ceiling of `max`.
    pub fn below(max: u16) -> Self {
        ClampIntensity {
            threshold: Threshold::Below(max),
            overflows: 0,
        }
    }
}

impl Transform for ClampIntensity {
    fn name(&self) -> &str {
        "clamp_intensity"
    }

    fn apply(&mut self, point: &mut Point) {
        let clamped = match self.threshold {
            Threshold::Above(min) => point.intensity.max(min),
            Threshold::Below(max) => point.intensity.min(max),
            Threshold::Between(min, max) => point.intensity.clamp(min, max),
        };
        if clamped != point.intensity {
            self.overflows += 1;
        }
        point.intensity = clamped;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }

    fn affects(&self) -> AffectedFields {
        AffectedFields::INTENSITY
    }
}

/// Scales the scan angle (degrees) by a fixed factor.
///
/// `lastransform.cpp` clamps legacy (`i8`) scan angle and quantizes extended (`i16`, 0.006°
/// units) separately; this crate's [`Point`] carries a single `f32` degree value with the
/// legacy/extended encoding choice made downstream in `raw::Point`, so this operates directly
/// on that degree value rather than re-deriving which on-disk slot it will land in.
#[derive(Debug, Clone, Copy)]
pub struct ScaleScanAngle {
    factor: f32,
}

impl ScaleScanAngle {
    /// Creates a transform that multiplies every point's scan angle by `factor`.
    pub fn new(factor: f32) -> Self {
        ScaleScanAngle { factor }
    }
}

impl Transform for ScaleScanAngle {
    fn name(&self) -> &str {
        "scale_scan_angle"
    }

    fn apply(&mut self, point: &mut Point) {
        point.scan_angle *= self.factor;
    }
}

/// Translates the scan angle (degrees) by a fixed offset. See [`ScaleScanAngle`] for the
/// legacy/extended scoping note.
#[derive(Debug, Clone, Copy)]
pub struct TranslateScanAngle {
    offset: f32,
}

impl TranslateScanAngle {
    /// Creates a transform that adds `offset` to every point's scan angle.
    pub fn new(offset: f32) -> Self {
        TranslateScanAngle { offset }
    }
}

impl Transform for TranslateScanAngle {
    fn name(&self) -> &str {
        "translate_scan_angle"
    }

    fn apply(&mut self, point: &mut Point) {
        point.scan_angle += self.offset;
    }
}

/// Translates then scales the scan angle, in that order. See [`ScaleScanAngle`] for the
/// legacy/extended scoping note.
#[derive(Debug, Clone, Copy)]
pub struct TranslateThenScaleScanAngle {
    offset: f32,
    factor: f32,
}

impl TranslateThenScaleScanAngle {
    /// Creates a transform that adds `offset` then multiplies by `factor`.
    pub fn new(offset: f32, factor: f32) -> Self {
        TranslateThenScaleScanAngle { offset, factor }
    }
}

impl Transform for TranslateThenScaleScanAngle {
    fn name(&self) -> &str {
        "translate_then_scale_scan_angle"
    }

    fn apply(&mut self, point: &mut Point) {
        point.scan_angle = (point.scan_angle + self.offset) * self.factor;
    }
}

/// Clamps the scan angle (degrees) to a window. See [`ScaleScanAngle`] for the legacy/extended
/// scoping note.
#[derive(Debug, Clone, Copy)]
pub struct ClampScanAngle {
    min: f32,
    max: f32,
    overflows: u64,
}

impl ClampScanAngle {
    /// Creates a transform that clamps every point's scan angle to `[min, max]`.
    pub fn new(min: f32, max: f32) -> Self {
        ClampScanAngle {
            min,
            max,
            overflows: 0,
        }
    }
}

impl Transform for ClampScanAngle {
    fn name(&self) -> &str {
        "clamp_scan_angle"
    }

    fn apply(&mut self, point: &mut Point) {
        let clamped = point.scan_angle.clamp(self.min, self.max);
        if clamped != point.scan_angle {
            self.overflows += 1;
        }
        point.scan_angle = clamped;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }
}

/// Unconditionally sets every point's classification.
#[derive(Debug, Clone, Copy)]
pub struct SetClassification {
    classification: Classification,
}

impl SetClassification {
    /// Creates a transform that sets every point's classification to `classification`.
    pub fn new(classification: Classification) -> Self {
        SetClassification { classification }
    }
}

impl Transform for SetClassification {
    fn name(&self) -> &str {
        "set_classification"
    }

    fn apply(&mut self, point: &mut Point) {
        point.classification = self.classification;
    }
}

/// Changes one specific classification value to another, leaving every other classification
/// untouched.
#[derive(Debug, Clone, Copy)]
pub struct ChangeClassification {
    from: Classification,
    to: Classification,
}

impl ChangeClassification {
    /// Creates a transform that rewrites `from` to `to`.
    pub fn new(from: Classification, to: Classification) -> Self {
        ChangeClassification { from, to }
    }
}

impl Transform for ChangeClassification {
    fn name(&self) -> &str {
        "change_classification"
    }

    fn apply(&mut self, point: &mut Point) {
        if point.classification == self.from {
            point.classification = self.to;
        }
    }
}

/// Classifies points by z. Grounded on `lastransform.cpp`'s `classify_z_below_as` /
/// `classify_z_above_as` / `classify_z_between_as` family.
///
/// `lastransform.cpp` picks a legacy or extended classification slot depending on whether the
/// target value is `>= 32`; this crate's [`Classification`] already represents any byte
/// uniformly (format-appropriate encoding happens downstream when the point is written), so
/// that slot choice doesn't need to be re-derived here — setting `point.classification` is
/// sufficient per the existing "extended wins when present" decision.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyZ {
    threshold: Threshold<f64>,
    classification: Classification,
}

impl ClassifyZ {
    /// Classifies points with `z <= max` as `classification`.
    pub fn below(max: f64, classification: Classification) -> Self {
        ClassifyZ {
            threshold: Threshold::Below(max),
            classification,
        }
    }

    /// Classifies points with `z >= min` as `classification`.
    pub fn above(min: f64, classification: Classification) -> Self {
        ClassifyZ {
            threshold: Threshold::Above(min),
            classification,
        }
    }

    /// Classifies points with `z` in `[min, max]` as `classification`.
    pub fn between(min: f64, max: f64, classification: Classification) -> Self {
        ClassifyZ {
            threshold: Threshold::Between(min, max),
            classification,
        }
    }
}

impl Transform for ClassifyZ {
    fn name(&self) -> &str {
        "classify_z"
    }

    fn apply(&mut self, point: &mut Point) {
        if self.threshold.keeps(point.z) {
            point.classification = self.classification;
        }
    }
}

/// Classifies points by intensity. Grounded on `lastransform.cpp`'s
/// `classify_intensity_below_as` / `classify_intensity_above_as`. See [`ClassifyZ`] for the
/// legacy/extended slot note.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyIntensity {
    threshold: Threshold<u16>,
    classification: Classification,
}

impl ClassifyIntensity {
    /// Classifies points with `intensity <= max` as `classification`.
    pub fn below(max: u16, classification: Classification) -> Self {
        ClassifyIntensity {
            threshold: Threshold::Below(max),
            classification,
        }
    }

    /// Classifies points with `intensity >= min` as `classification`.
    pub fn above(min: u16, classification: Classification) -> Self {
        ClassifyIntensity {
            threshold: Threshold::Above(min),
            classification,
        }
    }
}

impl Transform for ClassifyIntensity {
    fn name(&self) -> &str {
        "classify_intensity"
    }

    fn apply(&mut self, point: &mut Point) {
        if self.threshold.keeps(point.intensity) {
            point.classification = self.classification;
        }
    }
}

/// Sets one of a point's boolean flags (withheld, synthetic, key-point, or overlap) to a fixed
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// The withheld flag.
    Withheld,
    /// The synthetic flag.
    Synthetic,
    /// The key-point flag.
    KeyPoint,
    /// The (extended) overlap flag.
    Overlap,
}

/// Sets a single flag to a fixed value on every point.
#[derive(Debug, Clone, Copy)]
pub struct SetFlag {
    flag: Flag,
    value: bool,
}

impl SetFlag {
    /// Creates a transform that sets `flag` to `value`.
    pub fn new(flag: Flag, value: bool) -> Self {
        SetFlag { flag, value }
    }
}

impl Transform for SetFlag {
    fn name(&self) -> &str {
        "set_flag"
    }

    fn apply(&mut self, point: &mut Point) {
        let field = match self.flag {
            Flag::Withheld => &mut point.is_withheld,
            Flag::Synthetic => &mut point.is_synthetic,
            Flag::KeyPoint => &mut point.is_key_point,
            Flag::Overlap => &mut point.is_overlap,
        };
        *field = self.value;
    }
}

/// Sets every point's scanner channel (0-3 on multi-channel systems).
#[derive(Debug, Clone, Copy)]
pub struct SetScannerChannel {
    channel: u8,
}

impl SetScannerChannel {
    /// Creates a transform that sets every point's scanner channel to `channel`.
    pub fn new(channel: u8) -> Self {
        SetScannerChannel { channel }
    }
}

impl Transform for SetScannerChannel {
    fn name(&self) -> &str {
        "set_scanner_channel"
    }

    fn apply(&mut self, point: &mut Point) {
        point.scanner_channel = self.channel;
    }
}

/// Unconditionally sets every point's user-data byte.
#[derive(Debug, Clone, Copy)]
pub struct SetUserData {
    value: u8,
}

impl SetUserData {
    /// Creates a transform that sets every point's user data to `value`.
    pub fn new(value: u8) -> Self {
        SetUserData { value }
    }
}

impl Transform for SetUserData {
    fn name(&self) -> &str {
        "set_user_data"
    }

    fn apply(&mut self, point: &mut Point) {
        point.user_data = self.value;
    }
}

/// Changes one specific user-data value to another, leaving every other value untouched.
#[derive(Debug, Clone, Copy)]
pub struct ChangeUserData {
    from: u8,
    to: u8,
}

impl ChangeUserData {
    /// Creates a transform that rewrites `from` to `to`.
    pub fn new(from: u8, to: u8) -> Self {
        ChangeUserData { from, to }
    }
}

impl Transform for ChangeUserData {
    fn name(&self) -> &str {
        "change_user_data"
    }

    fn apply(&mut self, point: &mut Point) {
        if point.user_data == self.from {
            point.user_data = self.to;
        }
    }
}

/// Unconditionally sets every point's point-source ID.
#[derive(Debug, Clone, Copy)]
pub struct SetPointSource {
    value: u16,
}

impl SetPointSource {
    /// Creates a transform that sets every point's point-source ID to `value`.
    pub fn new(value: u16) -> Self {
        SetPointSource { value }
    }
}

impl Transform for SetPointSource {
    fn name(&self) -> &str {
        "set_point_source"
    }

    fn apply(&mut self, point: &mut Point) {
        point.point_source_id = self.value;
    }
}

/// Changes one specific point-source ID to another, leaving every other ID untouched.
#[derive(Debug, Clone, Copy)]
pub struct ChangePointSource {
    from: u16,
    to: u16,
}

impl ChangePointSource {
    /// Creates a transform that rewrites `from` to `to`.
    pub fn new(from: u16, to: u16) -> Self {
        ChangePointSource { from, to }
    }
}

impl Transform for ChangePointSource {
    fn name(&self) -> &str {
        "change_point_source"
    }

    fn apply(&mut self, point: &mut Point) {
        if point.point_source_id == self.from {
            point.point_source_id = self.to;
        }
    }
}

/// Copies `user_data` into `point_source_id`. Grounded on `lastransform.cpp`'s
/// `LASoperationCopyUserDataIntoPointSource`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyUserDataIntoPointSource;

impl CopyUserDataIntoPointSource {
    /// Creates a new copy transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for CopyUserDataIntoPointSource {
    fn name(&self) -> &str {
        "copy_user_data_into_point_source"
    }

    fn apply(&mut self, point: &mut Point) {
        point.point_source_id = u16::from(point.user_data);
    }
}

/// Bins `z / bin_size` into `point_source_id`, saturating to `u16`. Grounded on
/// `lastransform.cpp`'s `LASoperationBinZintoPointSource`.
#[derive(Debug, Clone, Copy)]
pub struct BinZIntoPointSource {
    bin_size: f64,
    overflows: u64,
}

impl BinZIntoPointSource {
    /// Creates a transform that bins `z / bin_size` into `point_source_id`.
    pub fn new(bin_size: f64) -> Self {
        BinZIntoPointSource {
            bin_size,
            overflows: 0,
        }
    }
}

impl Transform for BinZIntoPointSource {
    fn name(&self) -> &str {
        "bin_z_into_point_source"
    }

    fn apply(&mut self, point: &mut Point) {
        let bin = point.z / self.bin_size;
        if !(0. ..=f64::from(u16::MAX)).contains(&bin) {
            self.overflows += 1;
        }
        point.point_source_id = bin.clamp(0., f64::from(u16::MAX)).round() as u16;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }
}

/// Bins `|scan_angle| / bin_size` into `point_source_id`, saturating to `u16`. Grounded on
/// `lastransform.cpp`'s `LASoperationBinAbsScanAngleIntoPointSource`.
#[derive(Debug, Clone, Copy)]
pub struct BinAbsScanAngleIntoPointSource {
    bin_size: f32,
    overflows: u64,
}

impl BinAbsScanAngleIntoPointSource {
    /// Creates a transform that bins `|scan_angle| / bin_size` into `point_source_id`.
    pub fn new(bin_size: f32) -> Self {
        BinAbsScanAngleIntoPointSource {
            bin_size,
            overflows: 0,
        }
    }
}

impl Transform for BinAbsScanAngleIntoPointSource {
    fn name(&self) -> &str {
        "bin_abs_scan_angle_into_point_source"
    }

    fn apply(&mut self, point: &mut Point) {
        let bin = (point.scan_angle.abs() / self.bin_size) as f64;
        if !(0. ..=f64::from(u16::MAX)).contains(&bin) {
            self.overflows += 1;
        }
        point.point_source_id = bin.clamp(0., f64::from(u16::MAX)).round() as u16;
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }
}

/// Unconditionally sets every point's return number.
#[derive(Debug, Clone, Copy)]
pub struct SetReturnNumber {
    value: u8,
}

impl SetReturnNumber {
    /// Creates a transform that sets every point's return number to `value`.
    pub fn new(value: u8) -> Self {
        SetReturnNumber { value }
    }
}

impl Transform for SetReturnNumber {
    fn name(&self) -> &str {
        "set_return_number"
    }

    fn apply(&mut self, point: &mut Point) {
        point.return_number = self.value;
    }
}

/// Unconditionally sets every point's number of returns.
#[derive(Debug, Clone, Copy)]
pub struct SetNumberOfReturns {
    value: u8,
}

impl SetNumberOfReturns {
    /// Creates a transform that sets every point's number of returns to `value`.
    pub fn new(value: u8) -> Self {
        SetNumberOfReturns { value }
    }
}

impl Transform for SetNumberOfReturns {
    fn name(&self) -> &str {
        "set_number_of_returns"
    }

    fn apply(&mut self, point: &mut Point) {
        point.number_of_returns = self.value;
    }
}

/// Changes a specific `number_of_returns` value to another. Grounded on `lastransform.cpp`'s
/// `LASoperationChangeNumberOfReturnsFromTo`.
#[derive(Debug, Clone, Copy)]
pub struct ChangeNumberOfReturnsFromTo {
    from: u8,
    to: u8,
}

impl ChangeNumberOfReturnsFromTo {
    /// Creates a transform that rewrites `from` to `to`.
    pub fn new(from: u8, to: u8) -> Self {
        ChangeNumberOfReturnsFromTo { from, to }
    }
}

impl Transform for ChangeNumberOfReturnsFromTo {
    fn name(&self) -> &str {
        "change_number_of_returns_from_to"
    }

    fn apply(&mut self, point: &mut Point) {
        if point.number_of_returns == self.from {
            point.number_of_returns = self.to;
        }
    }
}

/// Changes a specific `return_number` value to another, the return-number analogue of
/// [`ChangeNumberOfReturnsFromTo`].
#[derive(Debug, Clone, Copy)]
pub struct ChangeReturnNumberFromTo {
    from: u8,
    to: u8,
}

impl ChangeReturnNumberFromTo {
    /// Creates a transform that rewrites `from` to `to`.
    pub fn new(from: u8, to: u8) -> Self {
        ChangeReturnNumberFromTo { from, to }
    }
}

impl Transform for ChangeReturnNumberFromTo {
    fn name(&self) -> &str {
        "change_return_number_from_to"
    }

    fn apply(&mut self, point: &mut Point) {
        if point.return_number == self.from {
            point.return_number = self.to;
        }
    }
}

/// Repairs a point whose return number exceeds its number of returns, which some sensors
/// emit for noise returns. Grounded on `lastransform.cpp`'s `LASoperationRepairZeroReturns`
/// family: rather than dropping the point, the return arithmetic is made internally
/// consistent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairReturnNumbers {
    overflows: u64,
}

impl RepairReturnNumbers {
    /// Creates a new repair transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for RepairReturnNumbers {
    fn name(&self) -> &str {
        "repair_return_numbers"
    }

    fn apply(&mut self, point: &mut Point) {
        if point.number_of_returns == 0 {
            point.number_of_returns = 1;
            self.overflows += 1;
        }
        if point.return_number == 0 {
            point.return_number = 1;
            self.overflows += 1;
        }
        if point.return_number > point.number_of_returns {
            point.return_number = point.number_of_returns;
            self.overflows += 1;
        }
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }
}

/// Translates GPS time by a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct TranslateGpsTime {
    dt: f64,
}

impl TranslateGpsTime {
    /// Creates a transform that adds `dt` to every point's gps time, leaving points without a
    /// gps time untouched.
    pub fn new(dt: f64) -> Self {
        TranslateGpsTime { dt }
    }
}

impl Transform for TranslateGpsTime {
    fn name(&self) -> &str {
        "translate_gps_time"
    }

    fn apply(&mut self, point: &mut Point) {
        if let Some(gps_time) = point.gps_time.as_mut() {
            *gps_time += self.dt;
        }
    }
}

/// The number of seconds in a GPS week, used by the adjusted-standard-GPS-time convention.
const SECONDS_PER_WEEK: f64 = 604_800.0;
/// The 1e9 second offset LAS applies to standard GPS time to get "adjusted standard GPS time".
const ADJUSTED_GPS_OFFSET: f64 = 1_000_000_000.0;

/// Converts adjusted standard GPS time to GPS week time. Grounded on `lastransform.cpp`'s
/// `LASoperationConvertAdjustedGpsToWeek`, including its exact week-number constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjustedGpsToWeek;

impl AdjustedGpsToWeek {
    /// Creates a new adjusted-to-week transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for AdjustedGpsToWeek {
    fn name(&self) -> &str {
        "adjusted_to_week"
    }

    fn apply(&mut self, point: &mut Point) {
        if let Some(gps_time) = point.gps_time.as_mut() {
            let week = (*gps_time / SECONDS_PER_WEEK + 1653.4391534391534391534391534392) as i64;
            let secs = week as f64 * SECONDS_PER_WEEK - ADJUSTED_GPS_OFFSET;
            *gps_time -= secs;
        }
    }
}

/// Converts GPS week time back to adjusted standard GPS time for a given week number.
/// Grounded on `lastransform.cpp`'s `LASoperationConvertWeekToAdjustedGps`.
#[derive(Debug, Clone, Copy)]
pub struct WeekToAdjustedGps {
    delta_secs: f64,
}

impl WeekToAdjustedGps {
    /// Creates a transform that treats every point's gps time as week time for `week`.
    pub fn new(week: i64) -> Self {
        WeekToAdjustedGps {
            delta_secs: week as f64 * SECONDS_PER_WEEK - ADJUSTED_GPS_OFFSET,
        }
    }
}

impl Transform for WeekToAdjustedGps {
    fn name(&self) -> &str {
        "week_to_adjusted"
    }

    fn apply(&mut self, point: &mut Point) {
        if let Some(gps_time) = point.gps_time.as_mut() {
            *gps_time += self.delta_secs;
        }
    }
}

/// Scales RGB down from `u16` range to `u8` range (divides each channel by 256). Grounded on
/// `lastransform.cpp`'s `LASoperationScaleRGBdown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleRgbDown;

impl ScaleRgbDown {
    /// Creates a new scale-down transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for ScaleRgbDown {
    fn name(&self) -> &str {
        "scale_rgb_down"
    }

    fn apply(&mut self, point: &mut Point) {
        if let Some(color) = point.color.as_mut() {
            *color = crate::Color::new(color.red / 256, color.green / 256, color.blue / 256);
        }
    }
}

/// Scales RGB up from `u8` range to `u16` range (multiplies each channel by 256, saturating).
/// Grounded on `lastransform.cpp`'s `LASoperationScaleRGBup`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleRgbUp {
    overflows: u64,
}

impl ScaleRgbUp {
    /// Creates a new scale-up transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for ScaleRgbUp {
    fn name(&self) -> &str {
        "scale_rgb_up"
    }

    fn apply(&mut self, point: &mut Point) {
        if let Some(color) = point.color.as_mut() {
            let scale = |c: u16| -> u16 {
                let scaled = u32::from(c) * 256;
                u16::try_from(scaled).unwrap_or(u16::MAX)
            };
            let scaled = (scale(color.red), scale(color.green), scale(color.blue));
            if u32::from(color.red) * 256 > u32::from(u16::MAX)
                || u32::from(color.green) * 256 > u32::from(u16::MAX)
                || u32::from(color.blue) * 256 > u32::from(u16::MAX)
            {
                self.overflows += 1;
            }
            *color = crate::Color::new(scaled.0, scaled.1, scaled.2);
        }
    }

    fn overflows(&self) -> u64 {
        self.overflows
    }

    fn reset(&mut self) {
        self.overflows = 0;
    }
}

/// Which pair of coordinates a switch transform swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAxes {
    /// Swaps `x` and `y`.
    XY,
    /// Swaps `x` and `z`.
    XZ,
    /// Swaps `y` and `z`.
    YZ,
}

/// Swaps two of a point's coordinates. Grounded on `lastransform.cpp`'s
/// `LASoperationSwitchXY`/`SwitchXZ`/`SwitchYZ`, which operate on the raw integer coordinates
/// (not RGB, despite the similarly-named RGB scale operations living in the same source file).
#[derive(Debug, Clone, Copy)]
pub struct SwitchCoordinates {
    axes: SwitchAxes,
}

impl SwitchCoordinates {
    /// Creates a transform that swaps the coordinates named by `axes`.
    pub fn new(axes: SwitchAxes) -> Self {
        SwitchCoordinates { axes }
    }
}

impl Transform for SwitchCoordinates {
    fn name(&self) -> &str {
        match self.axes {
            SwitchAxes::XY => "switch_x_y",
            SwitchAxes::XZ => "switch_x_z",
            SwitchAxes::YZ => "switch_y_z",
        }
    }

    fn apply(&mut self, point: &mut Point) {
        match self.axes {
            SwitchAxes::XY => std::mem::swap(&mut point.x, &mut point.y),
            SwitchAxes::XZ => std::mem::swap(&mut point.x, &mut point.z),
            SwitchAxes::YZ => std::mem::swap(&mut point.y, &mut point.z),
        }
    }

    fn affects(&self) -> AffectedFields {
        match self.axes {
            SwitchAxes::XY => AffectedFields::X | AffectedFields::Y,
            SwitchAxes::XZ => AffectedFields::X | AffectedFields::Z,
            SwitchAxes::YZ => AffectedFields::Y | AffectedFields::Z,
        }
    }
}

/// Negates a waveform's `Xt/Yt/Zt` direction floats. Grounded on `lastransform.cpp`'s
/// `LASoperationFlipWaveformDirection`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipWaveformDirection;

impl FlipWaveformDirection {
    /// Creates a new flip-waveform-direction transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for FlipWaveformDirection {
    fn name(&self) -> &str {
        "flip_waveform_direction"
    }

    fn apply(&mut self, point: &mut Point) {
        if let Some(waveform) = point.waveform.as_mut() {
            waveform.x_t = -waveform.x_t;
            waveform.y_t = -waveform.y_t;
            waveform.z_t = -waveform.z_t;
        }
    }
}

/// One transform's name and overflow count, as reported by [`TransformChain::summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    /// The transform's name.
    pub name: String,
    /// The number of values this transform clamped rather than applying directly.
    pub overflows: u64,
}

/// An ordered chain of [Transform]s, applied in insertion order to every point that reaches
/// it.
#[derive(Debug, Default)]
pub struct TransformChain {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    /// Creates an empty chain. An empty chain leaves every point unchanged.
    pub fn new() -> Self {
        TransformChain {
            transforms: Vec::new(),
        }
    }

    /// Appends a transform to the end of the chain.
    pub fn push(&mut self, transform: Box<dyn Transform>) -> &mut Self {
        self.transforms.push(transform);
        self
    }

    /// Applies every transform in the chain to `point`, in order.
    pub fn apply(&mut self, point: &mut Point) {
        for transform in &mut self.transforms {
            transform.apply(point);
        }
    }

    /// Resets every transform's internal state.
    pub fn reset(&mut self) {
        for transform in &mut self.transforms {
            transform.reset();
        }
    }

    /// Returns true if this chain has no transforms.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// The total number of overflows (clamped values) across every transform in the chain.
    pub fn overflows(&self) -> u64 {
        self.transforms.iter().map(|t| t.overflows()).sum()
    }

    /// The union of every transform's [`AffectedFields`], published so a reader can skip
    /// decompressing sub-streams that no operation in this chain touches.
    pub fn affects(&self) -> AffectedFields {
        self.transforms
            .iter()
            .fold(AffectedFields::NONE, |acc, t| acc | t.affects())
    }

    /// Returns the per-transform overflow counts, in chain order.
    pub fn summary(&self) -> Vec<TransformSummary> {
        self.transforms
            .iter()
            .map(|transform| TransformSummary {
                name: transform.name().to_string(),
                overflows: transform.overflows(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_xyz_moves_point() {
        let mut transform = TranslateXyz::new(1., 2., 3.);
        let mut point = Point::default();
        transform.apply(&mut point);
        assert_eq!((1., 2., 3.), (point.x, point.y, point.z));
        assert_eq!(
            AffectedFields::X | AffectedFields::Y | AffectedFields::Z,
            transform.affects()
        );
    }

    #[test]
    fn translate_then_scale_xyz_applies_in_order() {
        let mut transform = TranslateThenScaleXyz::new(1., 0., 0., 2., 1., 1.);
        let mut point = Point::default();
        transform.apply(&mut point);
        assert_eq!(2., point.x);
    }

    #[test]
    fn rotate_xy_quarter_turn_about_origin() {
        let mut transform = RotateXy::new(90., (0., 0.));
        let mut point = Point {
            x: 1.,
            y: 0.,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert!((point.x - 0.).abs() < 1e-9);
        assert!((point.y - 1.).abs() < 1e-9);
    }

    #[test]
    fn clamp_coordinate_counts_overflow() {
        let mut transform = ClampCoordinate::between(Axis::X, 0., 10.);
        let mut point = Point {
            x: 15.,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert_eq!(10., point.x);
        assert_eq!(1, transform.overflows());
    }

    #[test]
    fn scale_intensity_clamps_and_counts_overflow() {
        let mut transform = ScaleIntensity::new(10.);
        let mut point = Point {
            intensity: u16::MAX,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert_eq!(u16::MAX, point.intensity);
        assert_eq!(1, transform.overflows());
    }

    #[test]
    fn classify_z_above_sets_classification() {
        let mut transform = ClassifyZ::above(70.0, Classification::Reserved(7));
        let mut point = Point {
            z: 80.,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert_eq!(Classification::Reserved(7), point.classification);
    }

    #[test]
    fn adjusted_gps_to_week_wraps_into_one_week() {
        let mut to_week = AdjustedGpsToWeek::new();
        let mut point = Point {
            gps_time: Some(1_000_100_000.0),
            ..Default::default()
        };
        to_week.apply(&mut point);
        assert!(point.gps_time.unwrap() < 604_800.0);
    }

    #[test]
    fn scale_rgb_down_divides_each_channel() {
        let mut transform = ScaleRgbDown::new();
        let mut point = Point {
            color: Some(crate::Color::new(512, 1024, 256)),
            ..Default::default()
        };
        transform.apply(&mut point);
        let color = point.color.unwrap();
        assert_eq!((2, 4, 1), (color.red, color.green, color.blue));
    }

    #[test]
    fn switch_coordinates_swaps_x_and_y() {
        let mut transform = SwitchCoordinates::new(SwitchAxes::XY);
        let mut point = Point {
            x: 1.,
            y: 2.,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert_eq!((2., 1.), (point.x, point.y));
    }

    #[test]
    fn bin_z_into_point_source_saturates() {
        let mut transform = BinZIntoPointSource::new(1.0);
        let mut point = Point {
            z: 1_000_000.0,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert_eq!(u16::MAX, point.point_source_id);
        assert_eq!(1, transform.overflows());
    }

    #[test]
    fn repair_return_numbers_fixes_zeroes_and_excess() {
        let mut transform = RepairReturnNumbers::new();
        let mut point = Point {
            return_number: 5,
            number_of_returns: 2,
            ..Default::default()
        };
        transform.apply(&mut point);
        assert_eq!(2, point.return_number);
        assert_eq!(1, transform.overflows());
    }

    #[test]
    fn chain_applies_in_order_and_sums_overflows() {
        let mut chain = TransformChain::new();
        chain.push(Box::new(TranslateXyz::new(1., 0., 0.)));
        chain.push(Box::new(ScaleXyz::new(2., 1., 1.)));
        let mut point = Point::default();
        chain.apply(&mut point);
        assert_eq!(2., point.x);
        assert_eq!(0, chain.overflows());
    }

    #[test]
    fn chain_publishes_union_of_affected_fields() {
        let mut chain = TransformChain::new();
        chain.push(Box::new(TranslateScanAngle::new(1.0)));
        chain.push(Box::new(ScaleIntensity::new(2.0)));
        assert_eq!(AffectedFields::INTENSITY, chain.affects());
    }
}
