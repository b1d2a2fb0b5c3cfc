//! Three-dimensional adaptive cross subdivision.
//!
//! Space is divided into triangular prisms. Every subdivision splits the
//! prism's triangle in two; on odd levels the z-range is halved as well, so
//! two levels shrink a prism to half its size in every direction. A
//! horizontal slice through the leaf prisms, walked in tree order, follows a
//! closed Sierpinski curve whose spacing varies with the local density.

use crate::density::DensityProvider;
use crate::layer_index::LayerStartIndex;
use crate::triangle::Triangle;
use crate::{BBox3, Polygon};
use nalgebra::Vector2;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::f32::consts::SQRT_2;

/// Index of a cell in a [`Cross3D`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u32);

impl CellId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A triangular prism in the subdivision tree.
#[derive(Debug, Clone)]
pub struct Cell {
    triangle: Triangle,
    z_min: f32,
    z_max: f32,
    depth: u32,
    /// Density requested for this prism when it was created
    requested: f32,
    parent: Option<CellId>,
    children: SmallVec<[CellId; 4]>,
}

impl Cell {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn z_range(&self) -> (f32, f32) {
        (self.z_min, self.z_max)
    }

    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn requested_density(&self) -> f32 {
        self.requested
    }

    pub fn centroid(&self) -> Vector2<f32> {
        self.triangle.centroid()
    }

    pub fn region(&self) -> BBox3 {
        BBox3::from_bbox2(&self.triangle.bbox(), self.z_min, self.z_max)
    }

    fn volume(&self) -> f32 {
        self.triangle.area() * (self.z_max - self.z_min)
    }
}

/// Leaf cells crossed by one horizontal slice, in curve order.
#[derive(Debug, Clone)]
pub struct SliceWalker {
    z: f32,
    cells: Vec<CellId>,
}

impl SliceWalker {
    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Adaptive prism subdivision of a bounding cube.
///
/// Construction follows `initialize`, then one of
/// [`create_dithered_pattern`](Self::create_dithered_pattern) or
/// [`create_minimal_density_pattern`](Self::create_minimal_density_pattern),
/// then optionally [`sanitize`](Self::sanitize). Pattern steps on a structure
/// that was never initialized do nothing.
#[derive(Debug, Clone)]
pub struct Cross3D {
    bounds: BBox3,
    max_depth: u32,
    line_width: f32,
    cells: Vec<Cell>,
    roots: Option<[CellId; 2]>,
}

impl Cross3D {
    pub fn new(bounds: BBox3, max_depth: u32, line_width: f32) -> Self {
        Self {
            bounds,
            max_depth,
            line_width,
            cells: Vec::new(),
            roots: None,
        }
    }

    pub fn bounds(&self) -> BBox3 {
        self.bounds
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn is_initialized(&self) -> bool {
        self.roots.is_some()
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn leaves(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_leaf())
            .map(|(index, _)| CellId::new(index))
    }

    /// Create the two root prisms spanning the whole cube.
    pub fn initialize(&mut self, density: &dyn DensityProvider) {
        self.cells.clear();
        let (z_min, z_max) = (self.bounds.min.z, self.bounds.max.z);
        let [first, second] = Triangle::square_halves(&self.bounds.flatten())
            .map(|triangle| self.push_cell(triangle, z_min, z_max, 0, None, Some(density), 0.0));
        self.roots = Some([first, second]);
    }

    /// Refine level by level, diffusing the rounding error of every final
    /// decision onto the next cell of the same level.
    pub fn create_dithered_pattern(&mut self, density: &dyn DensityProvider) {
        let Some(roots) = self.roots else {
            return;
        };
        let mut frontier: Vec<CellId> = roots.to_vec();
        while !frontier.is_empty() {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            let mut error = 0.0f32;
            for id in frontier {
                let cell = self.cell(id);
                if cell.depth >= self.max_depth || !cell.is_leaf() {
                    continue;
                }
                let volume = cell.volume();
                let requested = cell.requested * volume;
                let realized = self.realized_density(cell) * volume;
                let realized_split = realized * SQRT_2;

                let value = requested + error;
                let subdivide = value - realized >= realized_split - value;
                let is_final = !subdivide || cell.depth + 1 == self.max_depth;
                let chosen = if subdivide { realized_split } else { realized };
                error = if is_final { value - chosen } else { 0.0 };

                if subdivide {
                    next.extend(self.split(id, Some(density)));
                }
            }
            frontier = next;
        }
        log::debug!(
            "cross3d dithered pattern: {} cells, {} leaves",
            self.cells.len(),
            self.leaves().count()
        );
    }

    /// Refine every prism whose realized density is below its requested
    /// density, without error diffusion.
    pub fn create_minimal_density_pattern(&mut self, density: &dyn DensityProvider) {
        let Some(roots) = self.roots else {
            return;
        };
        let mut stack: Vec<CellId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            let cell = self.cell(id);
            if cell.depth >= self.max_depth || !cell.is_leaf() {
                continue;
            }
            if self.realized_density(cell) < cell.requested {
                stack.extend(self.split(id, Some(density)));
            }
        }
        log::debug!(
            "cross3d minimal density pattern: {} cells, {} leaves",
            self.cells.len(),
            self.leaves().count()
        );
    }

    /// Split prisms until no two prisms that follow each other in a layer
    /// differ by more than two levels. New prisms inherit the requested
    /// density of their parent.
    pub fn sanitize(&mut self) {
        let mut rounds = 0;
        loop {
            let mut to_split = BTreeSet::new();
            for z in self.band_heights() {
                for (first, second) in self.layer_pairs(z) {
                    let (a, b) = (self.cell(first), self.cell(second));
                    if a.depth + 2 < b.depth {
                        to_split.insert(first);
                    } else if b.depth + 2 < a.depth {
                        to_split.insert(second);
                    }
                }
            }
            if to_split.is_empty() {
                break;
            }
            for id in to_split {
                if self.cell(id).is_leaf() {
                    self.split(id, None);
                }
            }
            rounds += 1;
        }
        log::debug!(
            "cross3d sanitized in {} rounds: {} leaves",
            rounds,
            self.leaves().count()
        );
    }

    /// Largest level difference between prisms that follow each other in
    /// some layer.
    pub fn max_layer_depth_jump(&self) -> u32 {
        self.band_heights()
            .into_iter()
            .flat_map(|z| self.layer_pairs(z))
            .map(|(a, b)| self.cell(a).depth.abs_diff(self.cell(b).depth))
            .max()
            .unwrap_or(0)
    }

    /// For every height at which the first prism of the slice changes, that
    /// prism, keyed by the bottom of its z-range.
    pub fn sequence_starts(&self) -> LayerStartIndex {
        let mut index = LayerStartIndex::new();
        if let Some([first, _]) = self.roots {
            self.collect_starts(first, &mut index);
        }
        index
    }

    /// Walk the slice at height `z` starting from `start`.
    ///
    /// Heights outside the cube are clamped into it. When `start` is not a
    /// leaf crossing `z`, the walk starts from the first prism of the slice.
    pub fn sequence(&self, start: CellId, z: f32) -> SliceWalker {
        let z = z.clamp(self.bounds.min.z, self.bounds.max.z);
        let mut cells = Vec::new();
        let Some([first_root, _]) = self.roots else {
            return SliceWalker { z, cells };
        };

        let start_is_valid = start.index() < self.cells.len()
            && self.cell(start).is_leaf()
            && self.contains_z(start, z);
        let mut current = if start_is_valid {
            Some(start)
        } else {
            Some(self.first_leaf_at(first_root, z))
        };
        while let Some(id) = current {
            cells.push(id);
            current = self.successor(id, z);
        }
        SliceWalker { z, cells }
    }

    /// The closed fill polygon through the centroids of a slice.
    pub fn generate_cross(&self, walker: &SliceWalker, z: f32) -> Polygon {
        let mut polygon = Polygon::with_capacity(walker.len());
        for &id in walker.cells() {
            polygon.push(self.cell(id).centroid());
        }
        log::trace!("cross3d layer at z {}: {} vertices", z, polygon.len());
        polygon
    }

    fn realized_density(&self, cell: &Cell) -> f32 {
        self.line_width / cell.triangle.leg()
    }

    fn push_cell(
        &mut self,
        triangle: Triangle,
        z_min: f32,
        z_max: f32,
        depth: u32,
        parent: Option<CellId>,
        density: Option<&dyn DensityProvider>,
        inherited: f32,
    ) -> CellId {
        let id = CellId::new(self.cells.len());
        let region = BBox3::from_bbox2(&triangle.bbox(), z_min, z_max);
        let requested = density.map_or(inherited, |d| d.density(&region));
        self.cells.push(Cell {
            triangle,
            z_min,
            z_max,
            depth,
            requested,
            parent,
            children: SmallVec::new(),
        });
        id
    }

    /// Create the children of a leaf, ordered first triangle half before the
    /// second and low before high.
    fn split(&mut self, id: CellId, density: Option<&dyn DensityProvider>) -> SmallVec<[CellId; 4]> {
        let cell = self.cell(id).clone();
        let depth = cell.depth + 1;
        let mut children = SmallVec::new();
        for triangle in cell.triangle.subdivide() {
            if cell.depth % 2 == 1 {
                let z_mid = (cell.z_min + cell.z_max) * 0.5;
                for (z_min, z_max) in [(cell.z_min, z_mid), (z_mid, cell.z_max)] {
                    children.push(self.push_cell(
                        triangle,
                        z_min,
                        z_max,
                        depth,
                        Some(id),
                        density,
                        cell.requested,
                    ));
                }
            } else {
                children.push(self.push_cell(
                    triangle,
                    cell.z_min,
                    cell.z_max,
                    depth,
                    Some(id),
                    density,
                    cell.requested,
                ));
            }
        }
        self.cells[id.index()].children = children.clone();
        children
    }

    fn contains_z(&self, id: CellId, z: f32) -> bool {
        let cell = self.cell(id);
        cell.z_min <= z && (z < cell.z_max || (z == cell.z_max && cell.z_max >= self.bounds.max.z))
    }

    fn first_leaf_at(&self, mut id: CellId, z: f32) -> CellId {
        loop {
            let cell = self.cell(id);
            match cell.children.iter().find(|&&child| self.contains_z(child, z)) {
                Some(&child) => id = child,
                None => return id,
            }
        }
    }

    fn successor(&self, id: CellId, z: f32) -> Option<CellId> {
        let mut current = id;
        loop {
            match self.cell(current).parent {
                Some(parent) => {
                    let siblings = &self.cell(parent).children;
                    let position = siblings.iter().position(|&c| c == current)?;
                    if let Some(&next) = siblings[position + 1..]
                        .iter()
                        .find(|&&c| self.contains_z(c, z))
                    {
                        return Some(self.first_leaf_at(next, z));
                    }
                    current = parent;
                }
                None => {
                    let [first, second] = self.roots?;
                    return (current == first).then(|| self.first_leaf_at(second, z));
                }
            }
        }
    }

    fn collect_starts(&self, id: CellId, index: &mut LayerStartIndex) {
        let cell = self.cell(id);
        if cell.is_leaf() {
            index.insert(cell.z_min, id);
            return;
        }
        // children of the first triangle half
        let half = cell.children.len() / 2;
        for &child in &cell.children[..half] {
            self.collect_starts(child, index);
        }
    }

    /// Bottom heights of all leaf prisms; every slice between two of them
    /// crosses the same prisms.
    fn band_heights(&self) -> Vec<f32> {
        let mut heights: Vec<f32> = self.leaves().map(|id| self.cell(id).z_min).collect();
        heights.sort_by(f32::total_cmp);
        heights.dedup();
        heights
    }

    /// Consecutive prisms of the slice at `z`, including the closing pair.
    fn layer_pairs(&self, z: f32) -> Vec<(CellId, CellId)> {
        let Some([first_root, _]) = self.roots else {
            return Vec::new();
        };
        let walker = self.sequence(self.first_leaf_at(first_root, z), z);
        let cells = walker.cells();
        if cells.len() < 2 {
            return Vec::new();
        }
        (0..cells.len())
            .map(|i| (cells[i], cells[(i + 1) % cells.len()]))
            .collect()
    }
}
