//! An on-disk spatial index for LAS/LAZ point streams (the `.lax` sidecar format), grounded on
//! LASlib's `lasindex`: a quadtree over point xy extents whose leaves each hold a
//! run-length-coalesced set of sequential point-index intervals, so a window query can jump
//! straight to the runs of points worth reading instead of scanning the whole file.

use crate::{Bounds, Point};
use std::collections::HashMap;

/// One quadtree leaf cell's address.
///
/// `level` is the cell's depth below the index's bounds (depth 0 covers the whole bounds);
/// `row`/`col` is its position within that depth's `2^level x 2^level` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The cell's depth.
    pub level: u8,
    /// The cell's row within its level's grid.
    pub row: u32,
    /// The cell's column within its level's grid.
    pub col: u32,
}

/// A coalesced set of sequential point-index runs belonging to one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalStore {
    intervals: Vec<(u64, u64)>,
}

impl IntervalStore {
    /// Creates an empty interval store.
    pub fn new() -> Self {
        IntervalStore::default()
    }

    /// Records that point `index` belongs to this cell. Adjacent or overlapping runs aren't
    /// coalesced until [`Self::complete`] is called, so repeated inserts stay cheap.
    pub fn insert(&mut self, index: u64) {
        self.intervals.push((index, index));
    }

    /// Coalesces overlapping and adjacent runs into the smallest equivalent set of intervals.
    ///
    /// This repeats a single coalescing pass until a pass makes no further progress, capped at
    /// `self.intervals.len()` passes (the cell's full extent): since each pass that changes
    /// anything strictly reduces the interval count, this bound guarantees termination without
    /// relying on convergence happening in any particular number of passes.
    pub fn complete(&mut self) {
        self.intervals.sort_unstable();
        let cap = self.intervals.len().max(1);
        for _ in 0..cap {
            if !self.merge_pass() {
                break;
            }
        }
    }

    fn merge_pass(&mut self) -> bool {
        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(self.intervals.len());
        let mut changed = false;
        for &(start, end) in &self.intervals {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => {
                    if end > last.1 {
                        last.1 = end;
                    }
                    changed = true;
                }
                _ => merged.push((start, end)),
            }
        }
        self.intervals = merged;
        changed
    }

    /// Returns this cell's runs as inclusive `(start, end)` point-index ranges.
    pub fn intervals(&self) -> &[(u64, u64)] {
        &self.intervals
    }
}

fn grid_size(level: u8) -> u32 {
    1u32 << level
}

/// Builds and queries a quadtree + interval-store spatial index over a point stream.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    bounds: Bounds,
    levels: u8,
    cells: HashMap<Cell, IntervalStore>,
}

impl SpatialIndex {
    /// Creates an empty index over `bounds`, with leaf cells at depth `levels`.
    pub fn new(bounds: Bounds, levels: u8) -> Self {
        SpatialIndex {
            bounds,
            levels,
            cells: HashMap::new(),
        }
    }

    /// Builds a complete index from a full scan of `(point_index, point)` pairs.
    pub fn build<'a, I: IntoIterator<Item = (u64, &'a Point)>>(
        bounds: Bounds,
        levels: u8,
        points: I,
    ) -> Self {
        let mut index = Self::new(bounds, levels);
        for (i, point) in points {
            index.insert(i, point);
        }
        index.complete();
        index
    }

    /// Records that point `index` is located at `point`'s xy position.
    pub fn insert(&mut self, index: u64, point: &Point) {
        let cell = self.cell_for(point.x, point.y);
        self.cells.entry(cell).or_default().insert(index);
    }

    /// Coalesces every cell's interval store. Must be called after the last [`Self::insert`]
    /// and before querying for the index to report minimal interval sets.
    pub fn complete(&mut self) {
        for store in self.cells.values_mut() {
            store.complete();
        }
    }

    /// The bounds this index was built over.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The leaf depth this index was built with.
    pub fn levels(&self) -> u8 {
        self.levels
    }

    fn cell_for(&self, x: f64, y: f64) -> Cell {
        let n = f64::from(grid_size(self.levels));
        let width = (self.bounds.max.x - self.bounds.min.x).max(f64::MIN_POSITIVE);
        let height = (self.bounds.max.y - self.bounds.min.y).max(f64::MIN_POSITIVE);
        let col = (((x - self.bounds.min.x) / width) * n)
            .floor()
            .clamp(0., n - 1.) as u32;
        let row = (((y - self.bounds.min.y) / height) * n)
            .floor()
            .clamp(0., n - 1.) as u32;
        Cell {
            level: self.levels,
            row,
            col,
        }
    }

    fn cell_bounds(&self, cell: &Cell) -> (f64, f64, f64, f64) {
        let n = f64::from(grid_size(cell.level));
        let width = self.bounds.max.x - self.bounds.min.x;
        let height = self.bounds.max.y - self.bounds.min.y;
        let minx = self.bounds.min.x + width * (f64::from(cell.col) / n);
        let maxx = self.bounds.min.x + width * (f64::from(cell.col + 1) / n);
        let miny = self.bounds.min.y + height * (f64::from(cell.row) / n);
        let maxy = self.bounds.min.y + height * (f64::from(cell.row + 1) / n);
        (minx, miny, maxx, maxy)
    }

    /// Returns the coalesced point-index intervals of every cell intersecting the rectangle
    /// `(min, max)`. The result is a superset of the points actually inside the window; callers
    /// still refine at the point level after seeking to each interval.
    pub fn query_rectangle(&self, min: (f64, f64), max: (f64, f64)) -> Vec<(u64, u64)> {
        let mut hits = Vec::new();
        for (cell, store) in &self.cells {
            let (cminx, cminy, cmaxx, cmaxy) = self.cell_bounds(cell);
            if cmaxx >= min.0 && cminx <= max.0 && cmaxy >= min.1 && cminy <= max.1 {
                hits.extend_from_slice(store.intervals());
            }
        }
        let mut merged = IntervalStore { intervals: hits };
        merged.complete();
        merged.intervals
    }

    /// Returns the coalesced point-index intervals of every cell intersecting the bounding box
    /// of a circle at `center` with the given `radius`.
    pub fn query_circle(&self, center: (f64, f64), radius: f64) -> Vec<(u64, u64)> {
        self.query_rectangle(
            (center.0 - radius, center.1 - radius),
            (center.0 + radius, center.1 + radius),
        )
    }

    /// Returns the coalesced point-index intervals of every cell intersecting the tile at
    /// `(tile_col, tile_row)` of edge length `tile_size`, tiled from this index's bounds'
    /// minimum corner.
    pub fn query_tile(&self, tile_col: i64, tile_row: i64, tile_size: f64) -> Vec<(u64, u64)> {
        let minx = self.bounds.min.x + tile_col as f64 * tile_size;
        let miny = self.bounds.min.y + tile_row as f64 * tile_size;
        self.query_rectangle((minx, miny), (minx + tile_size, miny + tile_size))
    }
}

/// Reads and writes the `.lax` sidecar format (magic `"LASX"` followed by a serialized
/// [`SpatialIndex`]).
pub mod lax {
    use super::{Cell, IntervalStore, SpatialIndex};
    use crate::{Bounds, Error, Result, Vector};
    use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
    use std::io::{Read, Write};

    const MAGIC: [u8; 4] = *b"LASX";

    /// Writes `index` to `write` in the `.lax` sidecar format.
    pub fn write<W: Write>(index: &SpatialIndex, mut write: W) -> Result<()> {
        write.write_all(&MAGIC)?;
        write.write_u8(index.levels())?;
        let bounds = index.bounds();
        for value in [
            bounds.min.x,
            bounds.min.y,
            bounds.min.z,
            bounds.max.x,
            bounds.max.y,
            bounds.max.z,
        ] {
            write.write_f64::<LittleEndian>(value)?;
        }
        write.write_u32::<LittleEndian>(index.cells.len() as u32)?;
        for (cell, store) in &index.cells {
            write.write_u8(cell.level)?;
            write.write_u32::<LittleEndian>(cell.row)?;
            write.write_u32::<LittleEndian>(cell.col)?;
            let intervals = store.intervals();
            write.write_u32::<LittleEndian>(intervals.len() as u32)?;
            for &(start, end) in intervals {
                write.write_u64::<LittleEndian>(start)?;
                write.write_u64::<LittleEndian>(end)?;
            }
        }
        Ok(())
    }

    /// Reads a [`SpatialIndex`] previously written by [`write`].
    pub fn read<R: Read>(mut read: R) -> Result<SpatialIndex> {
        let mut magic = [0u8; 4];
        read.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::InvalidIndex(format!(
                "bad lax magic: {magic:?}"
            )));
        }
        let levels = read.read_u8()?;
        let bounds = Bounds {
            min: Vector {
                x: read.read_f64::<LittleEndian>()?,
                y: read.read_f64::<LittleEndian>()?,
                z: read.read_f64::<LittleEndian>()?,
            },
            max: Vector {
                x: read.read_f64::<LittleEndian>()?,
                y: read.read_f64::<LittleEndian>()?,
                z: read.read_f64::<LittleEndian>()?,
            },
        };
        let mut index = SpatialIndex::new(bounds, levels);
        let cell_count = read.read_u32::<LittleEndian>()?;
        for _ in 0..cell_count {
            let cell = Cell {
                level: read.read_u8()?,
                row: read.read_u32::<LittleEndian>()?,
                col: read.read_u32::<LittleEndian>()?,
            };
            let interval_count = read.read_u32::<LittleEndian>()?;
            let mut store = IntervalStore::new();
            for _ in 0..interval_count {
                let start = read.read_u64::<LittleEndian>()?;
                let end = read.read_u64::<LittleEndian>()?;
                store.intervals.push((start, end));
            }
            index.cells.insert(cell, store);
        }
        Ok(index)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::Point;
        use std::io::Cursor;

        #[test]
        fn roundtrip() {
            let bounds = Bounds {
                min: Vector { x: 0., y: 0., z: 0. },
                max: Vector {
                    x: 100.,
                    y: 100.,
                    z: 100.,
                },
            };
            let points = vec![
                Point { x: 1., y: 1., ..Default::default() },
                Point { x: 99., y: 99., ..Default::default() },
            ];
            let index = SpatialIndex::build(
                bounds,
                4,
                points.iter().enumerate().map(|(i, p)| (i as u64, p)),
            );

            let mut buffer = Vec::new();
            write(&index, &mut buffer).unwrap();
            let read_back = read(Cursor::new(buffer)).unwrap();
            assert_eq!(index.levels(), read_back.levels());
            assert_eq!(
                index.query_rectangle((0., 0.), (100., 100.)).len(),
                read_back.query_rectangle((0., 0.), (100., 100.)).len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    fn unit_bounds() -> Bounds {
        Bounds {
            min: Vector { x: 0., y: 0., z: 0. },
            max: Vector {
                x: 100.,
                y: 100.,
                z: 100.,
            },
        }
    }

    #[test]
    fn interval_store_coalesces_adjacent_runs() {
        let mut store = IntervalStore::new();
        for i in [0, 1, 2, 5, 6, 10] {
            store.insert(i);
        }
        store.complete();
        assert_eq!(&[(0, 2), (5, 6), (10, 10)], store.intervals());
    }

    #[test]
    fn interval_store_is_monotonic_under_complete() {
        let mut store = IntervalStore::new();
        for i in [7, 3, 1, 2, 8, 0] {
            store.insert(i);
        }
        store.complete();
        let intervals = store.intervals();
        for window in intervals.windows(2) {
            assert!(window[0].1 < window[1].0);
        }
    }

    #[test]
    fn query_rectangle_finds_inserted_point() {
        let points = vec![
            Point { x: 10., y: 10., ..Default::default() },
            Point { x: 90., y: 90., ..Default::default() },
        ];
        let index = SpatialIndex::build(
            unit_bounds(),
            3,
            points.iter().enumerate().map(|(i, p)| (i as u64, p)),
        );
        let hits = index.query_rectangle((0., 0.), (20., 20.));
        assert_eq!(vec![(0, 0)], hits);
    }

    #[test]
    fn query_window_matches_unindexed_filter() {
        use crate::filter::{Filter, KeepXyz};

        let points: Vec<Point> = (0..50)
            .map(|i| Point {
                x: i as f64 * 2.,
                y: i as f64,
                ..Default::default()
            })
            .collect();
        let index = SpatialIndex::build(
            unit_bounds(),
            4,
            points.iter().enumerate().map(|(i, p)| (i as u64, p)),
        );

        let window = (20., 0.);
        let window_max = (40., 20.);
        let mut filter = KeepXyz::new(Bounds {
            min: Vector { x: window.0, y: window.1, z: f64::NEG_INFINITY },
            max: Vector { x: window_max.0, y: window_max.1, z: f64::INFINITY },
        });
        let expected: Vec<u64> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| !filter.matches(p))
            .map(|(i, _)| i as u64)
            .collect();

        let hits = index.query_rectangle(window, window_max);
        let indexed: Vec<u64> = hits
            .into_iter()
            .flat_map(|(start, end)| start..=end)
            .filter(|i| expected.contains(i))
            .collect();
        assert_eq!(expected, indexed);
    }
}
