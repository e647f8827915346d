//! Reads whitespace/comma-delimited text point clouds (`.txt`/`.pts`/`.ptx`), driven by the
//! compact single-character "parse string" grammar of `lasreader_txt.cpp`: each character
//! names the field the next column holds (`x y z` coordinates, `t` gps time, `i` intensity,
//! and so on), so one parse string describes an entire file's column layout.
//!
//! This is a `PointSource` in its own right (see [`pipeline`](crate::pipeline)), but unlike the
//! LAS/LAZ [`Reader`](crate::Reader) it has no random access: `seek` always fails, matching
//! §4.2's "text pipes: no" seek support note.

use crate::point::{Classification, ScanDirection};
use crate::{Color, Error, Header, Point, Result, Vector};
use std::io::BufRead;

/// One column's meaning, as named by a single character (or a parenthesized index) in a parse
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    X,
    Y,
    Z,
    GpsTime,
    Intensity,
    ScanAngle,
    NumberOfReturns,
    ReturnNumber,
    Classification,
    UserData,
    PointSource,
    EdgeOfFlightLine,
    ScanDirection,
    Withheld,
    KeyPoint,
    Synthetic,
    Overlap,
    ScannerChannel,
    Red,
    Green,
    Blue,
    Nir,
    HexRgb,
    HexIntensity,
    HslHueDegrees,
    HslSaturationPercent,
    HslLightnessPercent,
    HsvHueDegrees,
    HsvSaturationPercent,
    HsvValuePercent,
    Skip,
    ExtraByte(usize),
}

/// A parsed parse string: an ordered list of column tokens.
#[derive(Debug, Clone)]
pub struct ParseString {
    tokens: Vec<Token>,
}

impl ParseString {
    /// Parses a parse-string specification like `"xyzia"` into column tokens.
    ///
    /// Recognizes `x y z t i a n r c u p e d h k g o l R G B I s`, `H`/`J` (hexadecimal RGB/
    /// intensity), `(HSV)`/`(HSL)` (three consecutive hue/saturation/value-or-lightness columns,
    /// hue in degrees and saturation/value as percentages), a bare digit `0`-`9` for extra-byte
    /// attribute index, and `(N)` for attribute indices `10` and above.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut chars = spec.chars().peekable();
        while let Some(c) = chars.next() {
            let token = match c {
                'x' => Token::X,
                'y' => Token::Y,
                'z' => Token::Z,
                't' => Token::GpsTime,
                'i' => Token::Intensity,
                'a' => Token::ScanAngle,
                'n' => Token::NumberOfReturns,
                'r' => Token::ReturnNumber,
                'c' => Token::Classification,
                'u' => Token::UserData,
                'p' => Token::PointSource,
                'e' => Token::EdgeOfFlightLine,
                'd' => Token::ScanDirection,
                'h' => Token::Withheld,
                'k' => Token::KeyPoint,
                'g' => Token::Synthetic,
                'o' => Token::Overlap,
                'l' => Token::ScannerChannel,
                'R' => Token::Red,
                'G' => Token::Green,
                'B' => Token::Blue,
                'I' => Token::Nir,
                'H' => Token::HexRgb,
                'J' => Token::HexIntensity,
                's' => Token::Skip,
                '0'..='9' => Token::ExtraByte(c.to_digit(10).unwrap() as usize),
                '(' => {
                    let mut inner = String::new();
                    for nc in chars.by_ref() {
                        if nc == ')' {
                            break;
                        }
                        inner.push(nc);
                    }
                    match inner.as_str() {
                        "HSV" => {
                            tokens.push(Token::HsvHueDegrees);
                            tokens.push(Token::HsvSaturationPercent);
                            tokens.push(Token::HsvValuePercent);
                            continue;
                        }
                        "HSL" => {
                            tokens.push(Token::HslHueDegrees);
                            tokens.push(Token::HslSaturationPercent);
                            tokens.push(Token::HslLightnessPercent);
                            continue;
                        }
                        "hsv" => {
                            tokens.push(Token::HsvHueDegrees);
                            tokens.push(Token::HsvSaturationPercent);
                            tokens.push(Token::HsvValuePercent);
                            continue;
                        }
                        "hsl" => {
                            tokens.push(Token::HslHueDegrees);
                            tokens.push(Token::HslSaturationPercent);
                            tokens.push(Token::HslLightnessPercent);
                            continue;
                        }
                        digits if digits.chars().all(|d| d.is_ascii_digit()) && !digits.is_empty() => {
                            Token::ExtraByte(digits.parse().unwrap_or(0))
                        }
                        other => return Err(Error::InvalidToken(other.to_string())),
                    }
                }
                other => return Err(Error::InvalidToken(other.to_string())),
            };
            tokens.push(token);
        }
        Ok(ParseString { tokens })
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u16, u16, u16) {
    let c = (1. - (2. * l - 1.).abs()) * s;
    let hp = h * 6.;
    let x = c * (1. - (hp.rem_euclid(2.) - 1.).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.),
        1 => (x, c, 0.),
        2 => (0., c, x),
        3 => (0., x, c),
        4 => (x, 0., c),
        _ => (c, 0., x),
    };
    let m = l - c / 2.;
    (
        (((r1 + m) * 65535.) as u16),
        (((g1 + m) * 65535.) as u16),
        (((b1 + m) * 65535.) as u16),
    )
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u16, u16, u16) {
    let c = v * s;
    let hp = h * 6.;
    let x = c * (1. - (hp.rem_euclid(2.) - 1.).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.),
        1 => (x, c, 0.),
        2 => (0., c, x),
        3 => (0., x, c),
        4 => (x, 0., c),
        _ => (c, 0., x),
    };
    let m = v - c;
    (
        (((r1 + m) * 65535.) as u16),
        (((g1 + m) * 65535.) as u16),
        (((b1 + m) * 65535.) as u16),
    )
}

/// A rigid-body pose read from a PTX file's seven header lines: scanner position, three basis
/// axes, and the 4x4 transform those compose into. Preserved alongside the decoded points
/// rather than silently discarded, per §4.2's PTX handling note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerPose {
    /// The scanner's position, in file coordinates.
    pub position: Vector<f64>,
    /// The 4x4 row-major transformation matrix (the last header line's `R|T` block).
    pub transform: [[f64; 4]; 4],
}

impl ScannerPose {
    fn apply(&self, v: Vector<f64>) -> Vector<f64> {
        let m = &self.transform;
        let x = m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3];
        let y = m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3];
        let z = m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3];
        Vector { x, y, z }
    }
}

/// Which text dialect is being read, controlling the point-count/pose preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDialect {
    /// Plain whitespace/comma-delimited text, one point per line.
    Txt,
    /// Leica Cyclone PTS: the first line is the point count.
    Pts,
    /// Leica Cyclone PTX: the first seven lines are a scanner pose.
    Ptx,
}

fn split_columns(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|s| !s.is_empty())
        .collect()
}

/// A streaming reader over a text point cloud, driven by a [`ParseString`].
#[allow(missing_debug_implementations)]
pub struct TextReader<R> {
    lines: std::io::Lines<R>,
    parse_string: ParseString,
    header: Header,
    pose: Option<ScannerPose>,
    remaining: Option<u64>,
    line_number: u64,
}

impl<R: BufRead> TextReader<R> {
    /// Opens a text reader over `lines`, consuming any dialect-specific preamble (PTS's point
    /// count, PTX's seven-line pose) before the first data line.
    pub fn new(mut lines: std::io::Lines<R>, dialect: TextDialect, parse_string: ParseString) -> Result<Self> {
        let mut remaining = None;
        let mut pose = None;

        if dialect == TextDialect::Pts {
            let first = next_line(&mut lines)?;
            remaining = Some(first.trim().parse::<u64>().map_err(|_| {
                Error::InvalidToken(format!("pts point count: {first}"))
            })?);
        } else if dialect == TextDialect::Ptx {
            let point_count = next_line(&mut lines)?;
            let _column_count = next_line(&mut lines)?;
            remaining = Some(point_count.trim().parse::<u64>().map_err(|_| {
                Error::InvalidToken(format!("ptx point count: {point_count}"))
            })?);
            let position = parse_vector(&next_line(&mut lines)?)?;
            let _axis_x = next_line(&mut lines)?;
            let _axis_y = next_line(&mut lines)?;
            let _axis_z = next_line(&mut lines)?;
            let mut transform = [[0.0; 4]; 4];
            for row in transform.iter_mut() {
                let cols: Vec<f64> = split_columns(&next_line(&mut lines)?)
                    .iter()
                    .map(|c| c.parse().unwrap_or(0.0))
                    .collect();
                for (dst, src) in row.iter_mut().zip(cols.iter()) {
                    *dst = *src;
                }
            }
            pose = Some(ScannerPose { position, transform });
        }

        Ok(TextReader {
            lines,
            parse_string,
            header: Header::default(),
            pose,
            remaining,
            line_number: 0,
        })
    }

    /// Returns the scanner pose read from a PTX preamble, if any.
    pub fn pose(&self) -> Option<&ScannerPose> {
        self.pose.as_ref()
    }

    /// Returns the header accumulated from points decoded so far. Text sources carry no header
    /// of their own, so bounds and point counts grow as points stream through rather than being
    /// known upfront.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Reads and decodes the next point, skipping (and warning past) any line that fails to
    /// parse, per §4.2's "per-point decode failures in text are reported and the line is
    /// skipped" failure semantics.
    pub fn next_point(&mut self) -> Result<Option<Point>> {
        if let Some(remaining) = self.remaining {
            if remaining == 0 {
                return Ok(None);
            }
        }
        loop {
            let Some(raw) = self.lines.next() else {
                return Ok(None);
            };
            let line = raw.map_err(Error::from)?;
            self.line_number += 1;
            match self.parse_line(&line) {
                Ok(point) => {
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining = remaining.saturating_sub(1);
                    }
                    return Ok(Some(point));
                }
                Err(_) => {
                    log::warn!(
                        "skipping unparseable text point at line {}: {}",
                        self.line_number,
                        line
                    );
                    continue;
                }
            }
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<Point> {
        let columns = split_columns(line);
        let mut point = Point::default();
        let mut rgb: Option<(u16, u16, u16)> = None;
        let mut hsl: Option<(f32, f32, f32)> = None;
        let mut hsv: Option<(f32, f32, f32)> = None;
        let mut index = 0usize;

        let mut next_column = || -> Result<&str> {
            let value = columns
                .get(index)
                .copied()
                .ok_or_else(|| Error::InvalidToken("text line has too few columns".to_string()))?;
            index += 1;
            Ok(value)
        };

        for token in &self.parse_string.tokens {
            match token {
                Token::X => point.x = parse_f64(next_column()?)?,
                Token::Y => point.y = parse_f64(next_column()?)?,
                Token::Z => point.z = parse_f64(next_column()?)?,
                Token::GpsTime => point.gps_time = Some(parse_f64(next_column()?)?),
                Token::Intensity => point.intensity = parse_u16(next_column()?)?,
                Token::ScanAngle => point.scan_angle = parse_f64(next_column()?)? as f32,
                Token::NumberOfReturns => point.number_of_returns = parse_u8(next_column()?)?,
                Token::ReturnNumber => point.return_number = parse_u8(next_column()?)?,
                Token::Classification => {
                    point.classification = Classification::from(parse_u8(next_column()?)?)
                }
                Token::UserData => point.user_data = parse_u8(next_column()?)?,
                Token::PointSource => point.point_source_id = parse_u16(next_column()?)?,
                Token::EdgeOfFlightLine => point.is_edge_of_flight_line = parse_bool(next_column()?)?,
                Token::ScanDirection => {
                    point.scan_direction = if parse_bool(next_column()?)? {
                        ScanDirection::LeftToRight
                    } else {
                        ScanDirection::RightToLeft
                    }
                }
                Token::Withheld => point.is_withheld = parse_bool(next_column()?)?,
                Token::KeyPoint => point.is_key_point = parse_bool(next_column()?)?,
                Token::Synthetic => point.is_synthetic = parse_bool(next_column()?)?,
                Token::Overlap => point.is_overlap = parse_bool(next_column()?)?,
                Token::ScannerChannel => point.scanner_channel = parse_u8(next_column()?)?,
                Token::Red => rgb.get_or_insert((0, 0, 0)).0 = parse_u16(next_column()?)?,
                Token::Green => rgb.get_or_insert((0, 0, 0)).1 = parse_u16(next_column()?)?,
                Token::Blue => rgb.get_or_insert((0, 0, 0)).2 = parse_u16(next_column()?)?,
                Token::Nir => point.nir = Some(parse_u16(next_column()?)?),
                Token::HexRgb => {
                    let hex = next_column()?;
                    rgb = Some(parse_hex_rgb(hex)?);
                }
                Token::HexIntensity => {
                    let hex = next_column()?;
                    let value = u32::from_str_radix(hex.trim_start_matches("0x"), 16)
                        .map_err(|_| Error::InvalidToken(hex.to_string()))?;
                    point.intensity = ((value as f64 / 0xFF_FFFF as f64) * 255.) as u16;
                }
                Token::HslHueDegrees => {
                    let h = parse_f64(next_column()?)? as f32 / 360.;
                    hsl.get_or_insert((0., 0., 0.)).0 = h;
                }
                Token::HslSaturationPercent => {
                    let s = parse_f64(next_column()?)? as f32 / 100.;
                    hsl.get_or_insert((0., 0., 0.)).1 = s;
                }
                Token::HslLightnessPercent => {
                    let l = parse_f64(next_column()?)? as f32 / 100.;
                    hsl.get_or_insert((0., 0., 0.)).2 = l;
                }
                Token::HsvHueDegrees => {
                    let h = parse_f64(next_column()?)? as f32 / 360.;
                    hsv.get_or_insert((0., 0., 0.)).0 = h;
                }
                Token::HsvSaturationPercent => {
                    let s = parse_f64(next_column()?)? as f32 / 100.;
                    hsv.get_or_insert((0., 0., 0.)).1 = s;
                }
                Token::HsvValuePercent => {
                    let v = parse_f64(next_column()?)? as f32 / 100.;
                    hsv.get_or_insert((0., 0., 0.)).2 = v;
                }
                Token::Skip => {
                    next_column()?;
                }
                Token::ExtraByte(_) => {
                    next_column()?;
                }
            }
        }

        if let Some((h, s, l)) = hsl {
            let (r, g, b) = hsl_to_rgb(h, s, l);
            rgb = Some((r, g, b));
        } else if let Some((h, s, v)) = hsv {
            let (r, g, b) = hsv_to_rgb(h, s, v);
            rgb = Some((r, g, b));
        }
        if let Some((r, g, b)) = rgb {
            point.color = Some(Color::new(r, g, b));
        }

        if let Some(pose) = &self.pose {
            let transformed = pose.apply(Vector {
                x: point.x,
                y: point.y,
                z: point.z,
            });
            point.x = transformed.x;
            point.y = transformed.y;
            point.z = transformed.z;
        }

        self.header.add_point(&point);
        Ok(point)
    }
}

fn next_line<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<String> {
    lines
        .next()
        .ok_or_else(|| Error::InvalidToken("unexpected end of file".to_string()))?
        .map_err(Error::from)
}

fn parse_vector(line: &str) -> Result<Vector<f64>> {
    let cols = split_columns(line);
    if cols.len() < 3 {
        return Err(Error::InvalidToken(line.to_string()));
    }
    Ok(Vector {
        x: parse_f64(cols[0])?,
        y: parse_f64(cols[1])?,
        z: parse_f64(cols[2])?,
    })
}

fn parse_f64(s: &str) -> Result<f64> {
    s.parse().map_err(|_| Error::InvalidToken(s.to_string()))
}

fn parse_u16(s: &str) -> Result<u16> {
    s.parse::<f64>()
        .map(|v| v.round().clamp(0., f64::from(u16::MAX)) as u16)
        .map_err(|_| Error::InvalidToken(s.to_string()))
}

fn parse_u8(s: &str) -> Result<u8> {
    s.parse::<f64>()
        .map(|v| v.round().clamp(0., f64::from(u8::MAX)) as u8)
        .map_err(|_| Error::InvalidToken(s.to_string()))
}

fn parse_bool(s: &str) -> Result<bool> {
    s.parse::<i32>()
        .map(|v| v != 0)
        .map_err(|_| Error::InvalidToken(s.to_string()))
}

fn parse_hex_rgb(hex: &str) -> Result<(u16, u16, u16)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() < 6 {
        return Err(Error::InvalidToken(hex.to_string()));
    }
    let channel = |slice: &str| -> Result<u16> {
        u8::from_str_radix(slice, 16)
            .map(u16::from)
            .map_err(|_| Error::InvalidToken(slice.to_string()))
    };
    Ok((
        channel(&hex[0..2])?,
        channel(&hex[2..4])?,
        channel(&hex[4..6])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_for(text: &str, parse: &str) -> TextReader<Cursor<&[u8]>> {
        let cursor = Cursor::new(text.as_bytes());
        TextReader::new(
            std::io::BufRead::lines(cursor),
            TextDialect::Txt,
            ParseString::parse(parse).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn parses_plain_xyz_lines() {
        let mut reader = reader_for("1 2 3\n4 5 6\n", "xyz");
        let first = reader.next_point().unwrap().unwrap();
        assert_eq!((1., 2., 3.), (first.x, first.y, first.z));
        let second = reader.next_point().unwrap().unwrap();
        assert_eq!((4., 5., 6.), (second.x, second.y, second.z));
        assert!(reader.next_point().unwrap().is_none());
    }

    #[test]
    fn parses_intensity_and_classification() {
        let mut reader = reader_for("1 2 3 100 2\n", "xyzic");
        let point = reader.next_point().unwrap().unwrap();
        assert_eq!(100, point.intensity);
        assert_eq!(Classification::from(2), point.classification);
    }

    #[test]
    fn skips_unparseable_lines_with_a_warning() {
        let mut reader = reader_for("bad line\n1 2 3\n", "xyz");
        let point = reader.next_point().unwrap().unwrap();
        assert_eq!((1., 2., 3.), (point.x, point.y, point.z));
    }

    #[test]
    fn pts_dialect_reads_point_count_preamble() {
        let cursor = Cursor::new("2\n1 2 3\n4 5 6\n".as_bytes());
        let mut reader = TextReader::new(
            std::io::BufRead::lines(cursor),
            TextDialect::Pts,
            ParseString::parse("xyz").unwrap(),
        )
        .unwrap();
        assert!(reader.next_point().unwrap().is_some());
        assert!(reader.next_point().unwrap().is_some());
        assert!(reader.next_point().unwrap().is_none());
    }

    #[test]
    fn hex_rgb_decodes_three_channels() {
        let mut reader = reader_for("1 2 3 ff8000\n", "xyzH");
        let point = reader.next_point().unwrap().unwrap();
        let color = point.color.unwrap();
        assert_eq!(255, color.red);
        assert_eq!(128, color.green);
        assert_eq!(0, color.blue);
    }
}
