//! Composes a concrete reader with optional rescale, buffered-neighborhood, merge, filter, and
//! transform layers behind one point-iteration contract, following the "tagged variant of
//! layers composed by explicit ownership" pattern: each layer owns the one below it through a
//! `Box<dyn PointSource>`.
//!
//! [`open_path`] is the format-sniffing layer: it dispatches on a path's extension among LAS/LAZ
//! (via [`Reader::from_path`]), the text dialects `.txt`/`.pts`/`.ptx` (via
//! [`text_reader`](crate::text_reader)), the Esri grid rasters `.asc`/`.bil`/`.dtm` (via
//! [`grid_reader`](crate::grid_reader)), the shapefile point types (via
//! [`shp_reader`](crate::shp_reader)), and the fixed-record binary formats `.bin`/`.qi` (via
//! [`binary_point_reader`](crate::binary_point_reader)), wrapping whichever one matches in a
//! [`PointSource`] so the rest of the pipeline never needs to know which format it's reading.

use crate::binary_point_reader::{QfitReader, TerrasolidBinReader};
use crate::filter::{FilterChain, FilterSummary};
use crate::grid_reader::{GridHeader, GridReader};
use crate::shp_reader::ShpReader;
use crate::text_reader::{ParseString, TextDialect, TextReader};
use crate::transform_chain::{TransformChain, TransformSummary};
use crate::{Bounds, Error, Header, Point, Reader, Result, Transform, Vector, Writer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn in_window(point: &Point, window: &Bounds) -> bool {
    point.x >= window.min.x
        && point.x <= window.max.x
        && point.y >= window.min.y
        && point.y <= window.max.y
}

/// A streamable, seekable, window-clippable source of points.
///
/// Implemented by [`LasSource`] (the base layer, wrapping one concrete [`Reader`]) and by each
/// of [`Rescale`], [`Buffered`], and [`Merged`] (the wrapper layers), each owning its inner
/// layer.
pub trait PointSource {
    /// Returns the header of the underlying concrete reader.
    fn header(&self) -> &Header;

    /// Returns the next point surviving this layer and everything below it, or `None` at EOF.
    fn next(&mut self) -> Result<Option<Point>>;

    /// Seeks the underlying reader to point index `index`.
    fn seek(&mut self, index: u64) -> Result<()>;

    /// Restricts `next` to points inside `window` (in xy), or removes any restriction when
    /// `None`.
    fn set_window(&mut self, window: Option<Bounds>);

    /// Releases any resources held by this layer and everything below it.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The base layer: one concrete LAS/LAZ [`Reader`].
#[allow(missing_debug_implementations)]
pub struct LasSource {
    reader: Reader,
    window: Option<Bounds>,
}

impl LasSource {
    /// Wraps an already-open reader.
    pub fn new(reader: Reader) -> Self {
        LasSource {
            reader,
            window: None,
        }
    }

    /// Opens `path` as a new reader and wraps it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Reader::from_path(path).map(Self::new)
    }
}

impl PointSource for LasSource {
    fn header(&self) -> &Header {
        self.reader.header()
    }

    fn next(&mut self) -> Result<Option<Point>> {
        loop {
            match self.reader.read_point()? {
                None => return Ok(None),
                Some(point) => {
                    if self.window.as_ref().map_or(true, |w| in_window(&point, w)) {
                        return Ok(Some(point));
                    }
                }
            }
        }
    }

    fn seek(&mut self, index: u64) -> Result<()> {
        self.reader.seek(index)
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.window = window;
    }
}

/// Wraps a [`TextReader`], adapting its line-oriented, seek-less decoding to [`PointSource`].
/// Matches §4.2's "text pipes: no" seek support note: [`seek`](PointSource::seek) always fails.
#[allow(missing_debug_implementations)]
pub struct TextSource<R> {
    reader: TextReader<R>,
    window: Option<Bounds>,
}

impl<R: std::io::BufRead> TextSource<R> {
    /// Wraps an already-positioned [`TextReader`].
    pub fn new(reader: TextReader<R>) -> Self {
        TextSource {
            reader,
            window: None,
        }
    }
}

impl<R: std::io::BufRead> PointSource for TextSource<R> {
    fn header(&self) -> &Header {
        self.reader.header()
    }

    fn next(&mut self) -> Result<Option<Point>> {
        loop {
            match self.reader.next_point()? {
                None => return Ok(None),
                Some(point) => {
                    if self.window.as_ref().map_or(true, |w| in_window(&point, w)) {
                        return Ok(Some(point));
                    }
                }
            }
        }
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Err(Error::UnsupportedFeature {
            message: "text sources cannot seek".to_string(),
        })
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.window = window;
    }
}

/// Wraps a regular-grid elevation raster ([`GridReader`]), producing one point per non-nodata
/// cell (bare x/y/z; rasters carry no intensity, classification, or return attributes).
#[allow(missing_debug_implementations)]
pub struct GridSource {
    reader: GridReader,
    header: Header,
    window: Option<Bounds>,
}

impl GridSource {
    /// Wraps an already-parsed grid reader.
    pub fn new(reader: GridReader) -> Self {
        GridSource {
            reader,
            header: Header::default(),
            window: None,
        }
    }
}

impl PointSource for GridSource {
    fn header(&self) -> &Header {
        &self.header
    }

    fn next(&mut self) -> Result<Option<Point>> {
        while let Some((x, y, z)) = self.reader.next_cell() {
            let point = Point {
                x,
                y,
                z,
                ..Default::default()
            };
            self.header.add_point(&point);
            if self.window.as_ref().map_or(true, |w| in_window(&point, w)) {
                return Ok(Some(point));
            }
        }
        Ok(None)
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Err(Error::UnsupportedFeature {
            message: "grid sources cannot seek".to_string(),
        })
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.window = window;
    }
}

/// Wraps an ESRI shapefile point reader ([`ShpReader`]).
#[allow(missing_debug_implementations)]
pub struct ShpSource<R> {
    reader: ShpReader<R>,
    header: Header,
    window: Option<Bounds>,
}

impl<R: std::io::Read> ShpSource<R> {
    /// Wraps an already-opened shapefile reader.
    pub fn new(reader: ShpReader<R>) -> Self {
        ShpSource {
            reader,
            header: Header::default(),
            window: None,
        }
    }
}

impl<R: std::io::Read> PointSource for ShpSource<R> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn next(&mut self) -> Result<Option<Point>> {
        while let Some(point) = self.reader.next_point()? {
            self.header.add_point(&point);
            if self.window.as_ref().map_or(true, |w| in_window(&point, w)) {
                return Ok(Some(point));
            }
        }
        Ok(None)
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Err(Error::UnsupportedFeature {
            message: "shapefile sources cannot seek".to_string(),
        })
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.window = window;
    }
}

/// Wraps a Terrasolid `.bin` reader ([`TerrasolidBinReader`]).
#[allow(missing_debug_implementations)]
pub struct BinSource<R> {
    reader: TerrasolidBinReader<R>,
    header: Header,
    window: Option<Bounds>,
}

impl<R: std::io::Read> BinSource<R> {
    /// Wraps an already-opened Terrasolid bin reader.
    pub fn new(reader: TerrasolidBinReader<R>) -> Self {
        BinSource {
            reader,
            header: Header::default(),
            window: None,
        }
    }
}

impl<R: std::io::Read> PointSource for BinSource<R> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn next(&mut self) -> Result<Option<Point>> {
        while let Some(point) = self.reader.next_point()? {
            self.header.add_point(&point);
            if self.window.as_ref().map_or(true, |w| in_window(&point, w)) {
                return Ok(Some(point));
            }
        }
        Ok(None)
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Err(Error::UnsupportedFeature {
            message: "bin sources cannot seek".to_string(),
        })
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.window = window;
    }
}

/// Wraps a NASA ATM QFIT reader ([`QfitReader`]).
#[allow(missing_debug_implementations)]
pub struct QfitSource<R> {
    reader: QfitReader<R>,
    header: Header,
    window: Option<Bounds>,
}

impl<R: std::io::Read> QfitSource<R> {
    /// Wraps an already-opened QFIT reader.
    pub fn new(reader: QfitReader<R>) -> Self {
        QfitSource {
            reader,
            header: Header::default(),
            window: None,
        }
    }
}

impl<R: std::io::Read> PointSource for QfitSource<R> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn next(&mut self) -> Result<Option<Point>> {
        while let Some(record) = self.reader.next_record()? {
            let point = Point::from(record);
            self.header.add_point(&point);
            if self.window.as_ref().map_or(true, |w| in_window(&point, w)) {
                return Ok(Some(point));
            }
        }
        Ok(None)
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Err(Error::UnsupportedFeature {
            message: "qfit sources cannot seek".to_string(),
        })
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.window = window;
    }
}

/// Opens `path` as a [`PointSource`], dispatching on its extension per the deterministic
/// dispatch-selection rule: `.las`/`.laz` open a concrete LAS/LAZ [`Reader`]; `.txt`/`.pts`/
/// `.ptx` open a [`TextSource`] driven by `parse_string` (required for `.txt`, defaulted to
/// `"xyz"` for `.pts`/`.ptx` when absent); `.asc`/`.bil`/`.dtm` open a [`GridSource`]; `.shp`
/// opens a [`ShpSource`]; `.bin` opens a [`BinSource`]; `.qi`/`.qfit` open a [`QfitSource`].
///
/// `.bil`/`.dtm` additionally read a sibling `.hdr` file (same stem, `.hdr` extension) for the
/// grid's dimensions and sample encoding, following the Esri BIL convention.
pub fn open_path<P: AsRef<Path>>(path: P, parse_string: Option<&str>) -> Result<Box<dyn PointSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "las" | "laz" => Ok(Box::new(LasSource::from_path(path)?)),
        "txt" | "pts" | "ptx" => {
            let dialect = match extension.as_str() {
                "pts" => TextDialect::Pts,
                "ptx" => TextDialect::Ptx,
                _ => TextDialect::Txt,
            };
            let spec = parse_string.unwrap_or("xyz");
            let file = File::open(path)?;
            let lines = std::io::BufRead::lines(BufReader::new(file));
            let reader = TextReader::new(lines, dialect, ParseString::parse(spec)?)?;
            Ok(Box::new(TextSource::new(reader)))
        }
        "asc" => {
            let text = std::fs::read_to_string(path)?;
            let mut lines = text.lines();
            let header_lines: Vec<&str> = (&mut lines).take(6).collect();
            let header = GridHeader::parse(&header_lines.join("\n"))?;
            let body = lines.collect::<Vec<_>>().join("\n");
            let grid = GridReader::from_ascii(header, &body)?;
            Ok(Box::new(GridSource::new(grid)))
        }
        "bil" | "dtm" => {
            let hdr_path = path.with_extension("hdr");
            let header_text = std::fs::read_to_string(&hdr_path)?;
            let header = GridHeader::parse(&header_text)?;
            let file = File::open(path)?;
            let grid = GridReader::from_binary(header, BufReader::new(file))?;
            Ok(Box::new(GridSource::new(grid)))
        }
        "shp" => {
            let file = File::open(path)?;
            let reader = ShpReader::new(BufReader::new(file))?;
            Ok(Box::new(ShpSource::new(reader)))
        }
        "bin" => {
            let file = File::open(path)?;
            let reader = TerrasolidBinReader::new(BufReader::new(file))?;
            Ok(Box::new(BinSource::new(reader)))
        }
        "qi" | "qfit" => {
            let file = File::open(path)?;
            let reader = QfitReader::new(BufReader::new(file))?;
            Ok(Box::new(QfitSource::new(reader)))
        }
        other => Err(Error::UnsupportedFeature {
            message: format!("no reader for extension '{other}'"),
        }),
    }
}

/// Re-quantizes each point's x, y, and z onto a new scale/offset grid, as `-rescale`/
/// `-reoffset` do in LAStools.
#[allow(missing_debug_implementations)]
pub struct Rescale {
    inner: Box<dyn PointSource>,
    transforms: Vector<Transform>,
}

impl Rescale {
    /// Wraps `inner`, snapping every point it yields onto `transforms`'s grid.
    pub fn new(inner: Box<dyn PointSource>, transforms: Vector<Transform>) -> Self {
        Rescale { inner, transforms }
    }

    fn snap(&self, mut point: Point) -> Point {
        point.x = self.transforms.x.direct(self.transforms.x.inverse(point.x));
        point.y = self.transforms.y.direct(self.transforms.y.inverse(point.y));
        point.z = self.transforms.z.direct(self.transforms.z.inverse(point.z));
        point
    }
}

impl PointSource for Rescale {
    fn header(&self) -> &Header {
        self.inner.header()
    }

    fn next(&mut self) -> Result<Option<Point>> {
        Ok(self.inner.next()?.map(|point| self.snap(point)))
    }

    fn seek(&mut self, index: u64) -> Result<()> {
        self.inner.seek(index)
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.inner.set_window(window);
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

/// Expands any window set on this layer by a fixed margin, so points just outside a caller's
/// tile still reach `next` (for edge-aware neighborhood algorithms). Callers tell core points
/// from halo-only points with [`Buffered::is_core`].
#[allow(missing_debug_implementations)]
pub struct Buffered {
    inner: Box<dyn PointSource>,
    margin: f64,
    core_window: Option<Bounds>,
}

impl Buffered {
    /// Wraps `inner`, expanding any window set on this layer by `margin` in x and y.
    pub fn new(inner: Box<dyn PointSource>, margin: f64) -> Self {
        Buffered {
            inner,
            margin,
            core_window: None,
        }
    }

    /// Returns true if `point` lies inside the original (unexpanded) window, rather than just
    /// inside the buffer halo. Always true if no window is set.
    pub fn is_core(&self, point: &Point) -> bool {
        self.core_window.as_ref().map_or(true, |w| in_window(point, w))
    }
}

impl PointSource for Buffered {
    fn header(&self) -> &Header {
        self.inner.header()
    }

    fn next(&mut self) -> Result<Option<Point>> {
        self.inner.next()
    }

    fn seek(&mut self, index: u64) -> Result<()> {
        self.inner.seek(index)
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        self.core_window = window;
        let expanded = window.map(|w| Bounds {
            min: Vector {
                x: w.min.x - self.margin,
                y: w.min.y - self.margin,
                z: w.min.z,
            },
            max: Vector {
                x: w.max.x + self.margin,
                y: w.max.y + self.margin,
                z: w.max.z,
            },
        });
        self.inner.set_window(expanded);
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

/// One constituent of a [`Merged`] source, tagged the way `lasreader.cpp`'s buffered/merged
/// readers keep a `file_name`/`file_source_ID` per source file for provenance.
#[allow(missing_debug_implementations)]
pub struct TaggedSource {
    /// A caller-supplied label for this source, often its file name.
    pub tag: String,
    /// The wrapped source.
    pub source: Box<dyn PointSource>,
}

/// Concatenates several point sources (N -> 1) into a single stream, read in order.
///
/// # Panics
///
/// [`Merged::header`] panics if constructed with no sources.
#[allow(missing_debug_implementations)]
pub struct Merged {
    sources: Vec<TaggedSource>,
    current: usize,
}

impl Merged {
    /// Creates a merged source over `sources`, read in order.
    pub fn new(sources: Vec<TaggedSource>) -> Self {
        Merged {
            sources,
            current: 0,
        }
    }

    /// Returns the tag of the source that will produce (or most recently produced) a point.
    pub fn current_tag(&self) -> Option<&str> {
        self.sources.get(self.current).map(|s| s.tag.as_str())
    }
}

impl PointSource for Merged {
    fn header(&self) -> &Header {
        self.sources[0].source.header()
    }

    fn next(&mut self) -> Result<Option<Point>> {
        while self.current < self.sources.len() {
            if let Some(point) = self.sources[self.current].source.next()? {
                return Ok(Some(point));
            }
            self.current += 1;
        }
        Ok(None)
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Err(Error::FunctionArgumentRequirementsNotMet {
            message: "seek is not supported on a merged source".to_string(),
        })
    }

    fn set_window(&mut self, window: Option<Bounds>) {
        for tagged in &mut self.sources {
            tagged.source.set_window(window);
        }
    }

    fn close(&mut self) -> Result<()> {
        for tagged in &mut self.sources {
            tagged.source.close()?;
        }
        Ok(())
    }
}

/// The top of a pipeline: applies a [`FilterChain`] then a [`TransformChain`] to everything
/// yielded by the wrapped source, then either materializes the result (the `Stored` layer, via
/// [`ReaderPipeline::stored`]) or streams it into another writer (the `PipeOn` layer, via
/// [`ReaderPipeline::pipe_on`]).
#[allow(missing_debug_implementations)]
pub struct ReaderPipeline {
    source: Box<dyn PointSource>,
    filters: FilterChain,
    transforms: TransformChain,
}

impl ReaderPipeline {
    /// Wraps `source`, applying `filters` then `transforms` to every point it yields.
    pub fn new(source: Box<dyn PointSource>, filters: FilterChain, transforms: TransformChain) -> Self {
        ReaderPipeline {
            source,
            filters,
            transforms,
        }
    }

    /// Returns the header of the underlying source.
    pub fn header(&self) -> &Header {
        self.source.header()
    }

    /// Restricts this pipeline to points inside `window`.
    pub fn set_window(&mut self, window: Option<Bounds>) {
        self.source.set_window(window);
    }

    /// Reads the next point surviving the filter chain, with the transform chain applied.
    pub fn next(&mut self) -> Result<Option<Point>> {
        loop {
            match self.source.next()? {
                None => return Ok(None),
                Some(mut point) => {
                    if self.filters.matches(&point) {
                        continue;
                    }
                    self.transforms.apply(&mut point);
                    return Ok(Some(point));
                }
            }
        }
    }

    /// Drains every remaining point into a `Vec` (the `Stored` terminal layer).
    pub fn stored(&mut self) -> Result<Vec<Point>> {
        let mut points = Vec::new();
        while let Some(point) = self.next()? {
            points.push(point);
        }
        Ok(points)
    }

    /// Streams every remaining point directly into `writer` (the `PipeOn` terminal layer).
    pub fn pipe_on<W>(&mut self, writer: &mut Writer<W>) -> Result<u64>
    where
        W: 'static + std::io::Write + std::io::Seek + Send + Sync,
    {
        let mut n = 0;
        while let Some(point) = self.next()? {
            writer.write_point(point)?;
            n += 1;
        }
        Ok(n)
    }

    /// Releases resources held by the underlying source.
    pub fn close(&mut self) -> Result<()> {
        self.source.close()
    }

    /// Returns the filter chain's per-criterion drop summary.
    pub fn filter_summary(&self) -> Vec<FilterSummary> {
        self.filters.summary()
    }

    /// Returns the transform chain's per-operation overflow summary.
    pub fn transform_summary(&self) -> Vec<TransformSummary> {
        self.transforms.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::KeepXyz;
    use crate::transform_chain::TranslateXyz;

    #[test]
    fn pipeline_applies_filter_then_transform() {
        let source = LasSource::from_path("tests/data/autzen.las").unwrap();
        let mut filters = FilterChain::new();
        filters.push(Box::new(KeepXyz::new(source.reader.header().bounds())));
        let mut transforms = TransformChain::new();
        transforms.push(Box::new(TranslateXyz::new(1., 0., 0.)));

        let mut pipeline = ReaderPipeline::new(Box::new(source), filters, transforms);
        let points = pipeline.stored().unwrap();
        assert!(!points.is_empty());
    }

    #[test]
    fn buffered_expands_window_but_tracks_core() {
        let source = LasSource::from_path("tests/data/autzen.las").unwrap();
        let bounds = source.reader.header().bounds();
        let mut buffered = Buffered::new(Box::new(source), 10.);
        let core = Bounds {
            min: Vector {
                x: bounds.min.x,
                y: bounds.min.y,
                z: bounds.min.z,
            },
            max: Vector {
                x: bounds.min.x + (bounds.max.x - bounds.min.x) / 2.,
                y: bounds.max.y,
                z: bounds.max.z,
            },
        };
        buffered.set_window(Some(core));
        let mut saw_halo = false;
        while let Some(point) = buffered.next().unwrap() {
            if !buffered.is_core(&point) {
                saw_halo = true;
            }
        }
        assert!(saw_halo, "expected at least one buffer-only point");
    }
}
