use crate::error::{Error, Result};
use crate::geometry::{PointD, PointI, SizeD, SizeI};
use crate::polygon::{PolygonOrientation, RegularPolygon};
use crate::subdivision::{FaceKey, Subdivision};
use bimap::BiHashMap;
use serde::{Deserialize, Serialize};

/// How alternate columns or rows of a grid are offset against each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridShift {
    None,
    ColumnUp,
    ColumnDown,
    RowLeft,
    RowRight,
}

impl GridShift {
    #[inline]
    #[must_use]
    pub const fn shifts_columns(self) -> bool {
        matches!(self, Self::ColumnUp | Self::ColumnDown)
    }

    #[inline]
    #[must_use]
    pub const fn shifts_rows(self) -> bool {
        matches!(self, Self::RowLeft | Self::RowRight)
    }
}

// The five tessellation layouts spanned by the compatibility matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Layout {
    SquareOnEdge,
    SquareColumns,
    SquareRows,
    HexagonColumns,
    HexagonRows,
}

/// A rectangular grid of regular polygons: squares (upright or diagonal) or
/// hexagons (flat-topped or pointy-topped), with alternate columns or rows
/// shifted by half a cell where the tessellation demands it.
///
/// Cells are addressed as `(col, row)` pairs with `0 <= col < width` and
/// `0 <= row < height`; the world coordinates of the grid span
/// `[0, world_size]` with cell `(0, 0)` in the minimum corner and rows
/// growing along the y axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolygonGrid {
    element: RegularPolygon,
    shift: GridShift,
    size: SizeI,
    // derived parameter block, recomputed on every parameter change
    layout: Layout,
    cell: SizeD,
    col_spacing: f64,
    row_spacing: f64,
    world: SizeD,
    neighbors: [Vec<PointI>; 2],
}

/// The sentinel returned by `world_to_grid` for points outside the grid.
pub const INVALID_CELL: PointI = PointI::new(-1, -1);

impl PolygonGrid {
    pub fn new(element: RegularPolygon, shift: GridShift, size: SizeI) -> Result<Self> {
        let layout = Self::layout_for(&element, shift)?;
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::InvalidArgument("grid dimensions must be positive"));
        }
        let mut grid = Self {
            element,
            shift,
            size,
            layout,
            cell: SizeD::default(),
            col_spacing: 0.0,
            row_spacing: 0.0,
            world: SizeD::default(),
            neighbors: [Vec::new(), Vec::new()],
        };
        grid.recompute();
        Ok(grid)
    }

    // The compatibility matrix of element against shift mode.
    fn layout_for(element: &RegularPolygon, shift: GridShift) -> Result<Layout> {
        match (element.sides(), element.orientation(), shift) {
            (4, PolygonOrientation::OnEdge, GridShift::None) => Ok(Layout::SquareOnEdge),
            (4, PolygonOrientation::OnVertex, s) if s.shifts_columns() => Ok(Layout::SquareColumns),
            (4, PolygonOrientation::OnVertex, s) if s.shifts_rows() => Ok(Layout::SquareRows),
            (6, PolygonOrientation::OnEdge, s) if s.shifts_columns() => Ok(Layout::HexagonColumns),
            (6, PolygonOrientation::OnVertex, s) if s.shifts_rows() => Ok(Layout::HexagonRows),
            (4 | 6, _, _) => Err(Error::IncompatibleShift(
                "this orientation and shift mode do not tile",
            )),
            _ => Err(Error::IncompatibleShift("only squares and hexagons tile a grid")),
        }
    }

    #[inline]
    #[must_use]
    pub const fn element(&self) -> &RegularPolygon {
        &self.element
    }

    #[inline]
    #[must_use]
    pub const fn shift(&self) -> GridShift {
        self.shift
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> SizeI {
        self.size
    }

    /// Extent of the grid in world coordinates, from the origin.
    #[inline]
    #[must_use]
    pub const fn world_size(&self) -> SizeD {
        self.world
    }

    /// The maximum number of neighbors of any cell.
    #[must_use]
    pub fn connectivity(&self) -> usize {
        self.neighbors[0].len()
    }

    /// A read-only view sharing this grid's parameter block.
    #[must_use]
    pub const fn as_view(&self) -> GridView<'_> {
        GridView { grid: self }
    }

    pub fn set_size(&mut self, size: SizeI) -> Result<()> {
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::InvalidArgument("grid dimensions must be positive"));
        }
        self.size = size;
        self.recompute();
        Ok(())
    }

    pub fn set_shift(&mut self, shift: GridShift) -> Result<()> {
        self.layout = Self::layout_for(&self.element, shift)?;
        self.shift = shift;
        self.recompute();
        Ok(())
    }

    pub fn set_element(&mut self, element: RegularPolygon) -> Result<()> {
        self.layout = Self::layout_for(&element, self.shift)?;
        self.element = element;
        self.recompute();
        Ok(())
    }

    // Rebuild the derived parameter block: spacings, world extent, and the
    // per-parity neighbor offset tables in clockwise order starting at the
    // top edge (or the edge right of the top vertex).
    fn recompute(&mut self) {
        let bounds = self.element.bounds();
        let (w, h) = (bounds.width(), bounds.height());
        self.cell = SizeD::new(w, h);
        let r = self.element.circumradius();
        let (cols, rows) = (f64::from(self.size.width), f64::from(self.size.height));
        let vn = self.element.vertex_neighbors();

        let p = |x: i32, y: i32| PointI::new(x, y);
        match self.layout {
            Layout::SquareOnEdge => {
                self.col_spacing = w;
                self.row_spacing = h;
                self.world = SizeD::new(cols * w, rows * h);
                let table = if vn {
                    vec![
                        p(0, 1), p(1, 1), p(1, 0), p(1, -1),
                        p(0, -1), p(-1, -1), p(-1, 0), p(-1, 1),
                    ]
                } else {
                    vec![p(0, 1), p(1, 0), p(0, -1), p(-1, 0)]
                };
                self.neighbors = [table.clone(), table];
            }
            Layout::SquareColumns => {
                self.col_spacing = w / 2.0;
                self.row_spacing = h;
                self.world = SizeD::new((cols + 1.0) * w / 2.0, rows * h + h / 2.0);
                // raised columns see their side neighbors at the same row and
                // one row up; sunken columns one row down and the same row
                let raised = if vn {
                    vec![
                        p(1, 1), p(2, 0), p(1, 0), p(0, -1),
                        p(-1, 0), p(-2, 0), p(-1, 1), p(0, 1),
                    ]
                } else {
                    vec![p(1, 1), p(1, 0), p(-1, 0), p(-1, 1)]
                };
                let sunken = if vn {
                    vec![
                        p(1, 0), p(2, 0), p(1, -1), p(0, -1),
                        p(-1, -1), p(-2, 0), p(-1, 0), p(0, 1),
                    ]
                } else {
                    vec![p(1, 0), p(1, -1), p(-1, -1), p(-1, 0)]
                };
                self.neighbors = if self.shift == GridShift::ColumnDown {
                    [raised, sunken]
                } else {
                    [sunken, raised]
                };
            }
            Layout::SquareRows => {
                self.col_spacing = w;
                self.row_spacing = h / 2.0;
                self.world = SizeD::new(cols * w + w / 2.0, (rows + 1.0) * h / 2.0);
                // unshifted rows against rows pushed half a cell rightward
                let plain = if vn {
                    vec![
                        p(0, 1), p(1, 0), p(0, -1), p(0, -2),
                        p(-1, -1), p(-1, 0), p(-1, 1), p(0, 2),
                    ]
                } else {
                    vec![p(0, 1), p(0, -1), p(-1, -1), p(-1, 1)]
                };
                let pushed = if vn {
                    vec![
                        p(1, 1), p(1, 0), p(1, -1), p(0, -2),
                        p(0, -1), p(-1, 0), p(0, 1), p(0, 2),
                    ]
                } else {
                    vec![p(1, 1), p(1, -1), p(0, -1), p(0, 1)]
                };
                self.neighbors = if self.shift == GridShift::RowRight {
                    [plain, pushed]
                } else {
                    [pushed, plain]
                };
            }
            Layout::HexagonColumns => {
                self.col_spacing = 1.5 * r;
                self.row_spacing = h;
                self.world = SizeD::new(cols * 1.5 * r + 0.5 * r, rows * h + h / 2.0);
                let raised = vec![
                    p(0, 1), p(1, 1), p(1, 0), p(0, -1), p(-1, 0), p(-1, 1),
                ];
                let sunken = vec![
                    p(0, 1), p(1, 0), p(1, -1), p(0, -1), p(-1, -1), p(-1, 0),
                ];
                self.neighbors = if self.shift == GridShift::ColumnDown {
                    [raised, sunken]
                } else {
                    [sunken, raised]
                };
            }
            Layout::HexagonRows => {
                self.col_spacing = w;
                self.row_spacing = 1.5 * r;
                self.world = SizeD::new(cols * w + w / 2.0, rows * 1.5 * r + 0.5 * r);
                let plain = vec![
                    p(0, 1), p(1, 0), p(0, -1), p(-1, -1), p(-1, 0), p(-1, 1),
                ];
                let pushed = vec![
                    p(1, 1), p(1, 0), p(1, -1), p(0, -1), p(-1, 0), p(0, 1),
                ];
                self.neighbors = if self.shift == GridShift::RowRight {
                    [plain, pushed]
                } else {
                    [pushed, plain]
                };
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn contains_cell(&self, cell: PointI) -> bool {
        cell.x >= 0 && cell.x < self.size.width && cell.y >= 0 && cell.y < self.size.height
    }

    fn check_cell(&self, cell: PointI) -> Result<()> {
        if self.contains_cell(cell) {
            Ok(())
        } else {
            Err(Error::CellOutOfBounds(cell))
        }
    }

    // Whether a column (or row, for row shifts) sits half a cell further
    // along the y (or x) axis than its unshifted siblings.
    fn is_offset(&self, cell: PointI) -> bool {
        match self.shift {
            GridShift::None => false,
            GridShift::ColumnDown => cell.x % 2 == 0,
            GridShift::ColumnUp => cell.x % 2 != 0,
            GridShift::RowRight => cell.y % 2 != 0,
            GridShift::RowLeft => cell.y % 2 == 0,
        }
    }

    // Parity index into the neighbor tables.
    fn parity(&self, cell: PointI) -> usize {
        let axis = if self.shift.shifts_rows() { cell.y } else { cell.x };
        (axis % 2) as usize
    }

    /// Neighbor offsets of a cell, clockwise from the top.
    pub fn neighbor_offsets(&self, cell: PointI) -> Result<&[PointI]> {
        self.check_cell(cell)?;
        Ok(&self.neighbors[self.parity(cell)])
    }

    /// The neighbor of `cell` at the given clockwise index; the result may
    /// lie outside the grid.
    pub fn neighbor(&self, cell: PointI, index: usize) -> Result<PointI> {
        let offsets = self.neighbor_offsets(cell)?;
        let offset = offsets
            .get(index)
            .copied()
            .ok_or(Error::InvalidArgument("neighbor index out of range"))?;
        Ok(cell + offset)
    }

    /// The clockwise index under which `cell` sees `neighbor`, inverse of
    /// [`Self::neighbor`].
    pub fn neighbor_index(&self, cell: PointI, neighbor: PointI) -> Result<usize> {
        let offsets = self.neighbor_offsets(cell)?;
        offsets
            .iter()
            .position(|&o| cell + o == neighbor)
            .ok_or(Error::InvalidArgument("cells are not neighbors"))
    }

    /// All in-grid direct neighbors of a cell, clockwise from the top.
    pub fn neighbors(&self, cell: PointI) -> Result<Vec<PointI>> {
        Ok(self
            .neighbor_offsets(cell)?
            .iter()
            .map(|&o| cell + o)
            .filter(|&q| self.contains_cell(q))
            .collect())
    }

    /// All cells within `distance` steps of a cell, the cell itself excluded.
    pub fn neighbors_within(&self, cell: PointI, distance: i32) -> Result<Vec<PointI>> {
        self.check_cell(cell)?;
        if distance < 1 {
            return Err(Error::InvalidArgument("distance must be positive"));
        }
        let margin = 2 * distance;
        let mut result = Vec::new();
        for dy in -margin..=margin {
            for dx in -margin..=margin {
                let q = cell + PointI::new(dx, dy);
                if q == cell || !self.contains_cell(q) {
                    continue;
                }
                if self.step_distance(cell, q)? <= distance {
                    result.push(q);
                }
            }
        }
        Ok(result)
    }

    /// The number of moves between two cells on the neighbor graph, in
    /// constant time.
    pub fn step_distance(&self, a: PointI, b: PointI) -> Result<i32> {
        self.check_cell(a)?;
        self.check_cell(b)?;
        let d = b - a;
        Ok(match self.layout {
            Layout::SquareOnEdge => {
                if self.element.vertex_neighbors() {
                    d.x.abs().max(d.y.abs())
                } else {
                    d.x.abs() + d.y.abs()
                }
            }
            Layout::SquareColumns => {
                let v = |c: PointI| 2 * c.y + i32::from(self.is_offset(c));
                let (du, dv) = (d.x, v(b) - v(a));
                if self.element.vertex_neighbors() {
                    ((du + dv).abs()).max((du - dv).abs()) / 2
                } else {
                    du.abs().max(dv.abs())
                }
            }
            Layout::SquareRows => {
                let v = |c: PointI| 2 * c.x + i32::from(self.is_offset(c));
                let (du, dv) = (d.y, v(b) - v(a));
                if self.element.vertex_neighbors() {
                    ((du + dv).abs()).max((du - dv).abs()) / 2
                } else {
                    du.abs().max(dv.abs())
                }
            }
            Layout::HexagonColumns => {
                // offset to axial coordinates, then the cube distance
                let rax = |c: PointI| {
                    if self.shift == GridShift::ColumnDown {
                        c.y - (c.x + 1) / 2
                    } else {
                        c.y - c.x / 2
                    }
                };
                let (dq, dr) = (d.x, rax(b) - rax(a));
                (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
            }
            Layout::HexagonRows => {
                let qax = |c: PointI| {
                    if self.shift == GridShift::RowRight {
                        c.x - c.y / 2
                    } else {
                        c.x - (c.y + 1) / 2
                    }
                };
                let (dq, dr) = (qax(b) - qax(a), d.y);
                (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
            }
        })
    }

    // Center of a cell, without bounds checking.
    fn center(&self, cell: PointI) -> PointD {
        let (c, r) = (f64::from(cell.x), f64::from(cell.y));
        let offset = if self.is_offset(cell) {
            if self.shift.shifts_rows() {
                PointD::new(self.cell.width / 2.0, 0.0)
            } else {
                PointD::new(0.0, self.cell.height / 2.0)
            }
        } else {
            PointD::ZERO
        };
        PointD::new(
            c * self.col_spacing + self.cell.width / 2.0 + offset.x,
            r * self.row_spacing + self.cell.height / 2.0 + offset.y,
        )
    }

    /// World coordinates of a cell's center.
    pub fn grid_to_world(&self, cell: PointI) -> Result<PointD> {
        self.check_cell(cell)?;
        Ok(self.center(cell))
    }

    /// The polygon covering a cell, in world coordinates.
    pub fn cell_polygon(&self, cell: PointI) -> Result<Vec<PointD>> {
        Ok(self.element.vertices_at(self.grid_to_world(cell)?))
    }

    /// The cell containing a world point, or [`INVALID_CELL`] if the point
    /// lies outside the grid.
    #[must_use]
    pub fn world_to_grid(&self, p: PointD) -> PointI {
        let c0 = ((p.x - self.cell.width / 2.0) / self.col_spacing).round() as i32;
        let r0 = ((p.y - self.cell.height / 2.0) / self.row_spacing).round() as i32;
        for dy in -2..=2_i32 {
            for dx in -2..=2_i32 {
                let cell = PointI::new(c0 + dx, r0 + dy);
                if !self.contains_cell(cell) {
                    continue;
                }
                if self.element.contains_offset(p - self.center(cell)) {
                    return cell;
                }
            }
        }
        INVALID_CELL
    }

    /// Like [`Self::world_to_grid`], but out-of-bounds coordinates are first
    /// moved inward by half a polygon diameter, so the visually nearest cell
    /// is returned for any point.
    #[must_use]
    pub fn world_to_grid_clipped(&self, p: PointD) -> PointI {
        let clamped = PointD::new(
            p.x.clamp(self.cell.width / 2.0, self.world.width - self.cell.width / 2.0),
            p.y.clamp(self.cell.height / 2.0, self.world.height - self.cell.height / 2.0),
        );
        let cell = self.world_to_grid(clamped);
        if cell != INVALID_CELL {
            return cell;
        }
        // the clamped point fell into a border gap of the tessellation: take
        // the nearest cell center
        let c0 = ((clamped.x - self.cell.width / 2.0) / self.col_spacing).round() as i32;
        let r0 = ((clamped.y - self.cell.height / 2.0) / self.row_spacing).round() as i32;
        let mut best = PointI::new(
            c0.clamp(0, self.size.width - 1),
            r0.clamp(0, self.size.height - 1),
        );
        let mut best_d = self.center(best).distance_squared(clamped);
        for dy in -2..=2_i32 {
            for dx in -2..=2_i32 {
                let cell = PointI::new(c0 + dx, r0 + dy);
                if !self.contains_cell(cell) {
                    continue;
                }
                let d = self.center(cell).distance_squared(clamped);
                if d < best_d {
                    best = cell;
                    best_d = d;
                }
            }
        }
        best
    }

    /// Materialize the tessellation as a planar subdivision, every cell
    /// becoming one bounded face, shifted by `offset`. Returns the
    /// subdivision and the bidirectional cell-to-face map. The comparison
    /// epsilon defaults to (and is never smaller than) a millionth of the
    /// polygon side length, the rounding floor for shared cell corners.
    pub fn to_subdivision(
        &self,
        offset: PointD,
        epsilon: Option<f64>,
    ) -> Result<(Subdivision, BiHashMap<PointI, FaceKey>)> {
        let floor = self.element.side_length() * 1e-6;
        let epsilon = epsilon.unwrap_or(floor).max(floor);
        let mut cells = Vec::with_capacity((self.size.width * self.size.height) as usize);
        let mut polygons = Vec::with_capacity(cells.capacity());
        for row in 0..self.size.height {
            for col in 0..self.size.width {
                let cell = PointI::new(col, row);
                cells.push(cell);
                polygons.push(
                    self.element
                        .vertices_at(self.center(cell) + offset),
                );
            }
        }
        let sub = Subdivision::from_polygons(&polygons, epsilon)?;
        let mut map = BiHashMap::new();
        for (i, cell) in cells.into_iter().enumerate() {
            let face = sub
                .face_with_number(i as u32 + 1)
                .expect("one bounded face per input polygon");
            map.insert(cell, face);
        }
        Ok((sub, map))
    }
}

/// A read-only view of a grid. All accessors of [`PolygonGrid`] are
/// available through deref; mutators require `&mut PolygonGrid` and cannot
/// be reached through a view.
#[derive(Copy, Clone, Debug)]
pub struct GridView<'a> {
    grid: &'a PolygonGrid,
}

impl std::ops::Deref for GridView<'_> {
    type Target = PolygonGrid;

    fn deref(&self) -> &PolygonGrid {
        self.grid
    }
}
