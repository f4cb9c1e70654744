use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::models::Blob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    /// Outer border of a foreground component
    Outer,
    /// Border of a background hole inside a component
    Hole,
}

#[derive(Debug, Clone)]
pub struct ContourNode {
    /// Index in discovery (raster) order
    pub id: usize,
    pub kind: BorderKind,
    /// Immediately enclosing border, if any
    pub parent: Option<usize>,
    pub blob: Blob,
}

/// All borders of a binary mask with their containment hierarchy
#[derive(Debug, Clone, Default)]
pub struct ContourTree {
    pub nodes: Vec<ContourNode>,
    /// Position in `nodes` for each traced contour id
    index: Vec<Option<usize>>,
}

impl ContourTree {
    /// Trace every border of the non-zero pixels in `mask`
    pub fn from_mask(mask: &GrayImage) -> Self {
        let contours = find_contours::<i32>(mask);
        let traced = contours.len();
        let nodes: Vec<ContourNode> = contours
            .into_iter()
            .enumerate()
            .filter_map(|(id, contour)| {
                let blob = bounding_blob(&contour.points)?;
                let kind = match contour.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                };
                Some(ContourNode {
                    id,
                    kind,
                    parent: contour.parent,
                    blob,
                })
            })
            .collect();

        let mut index = vec![None; traced];
        for (pos, node) in nodes.iter().enumerate() {
            index[node.id] = Some(pos);
        }

        Self { nodes, index }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&ContourNode> {
        let pos = (*self.index.get(id)?)?;
        self.nodes.get(pos)
    }

    /// Nearest outer border strictly enclosing contour `id`.
    ///
    /// For a hole this is the component it perforates; for an outer border it
    /// is the component whose hole contains it.
    pub fn enclosing_outer(&self, id: usize) -> Option<usize> {
        let mut current = self.get(id)?.parent;
        while let Some(pid) = current {
            let node = self.get(pid)?;
            if node.kind == BorderKind::Outer {
                return Some(pid);
            }
            current = node.parent;
        }
        None
    }

    /// Largest top-level outer border by bounding-box area; first wins ties
    pub fn largest_external(&self) -> Option<&ContourNode> {
        largest_by_box(
            self.nodes
                .iter()
                .filter(|n| n.kind == BorderKind::Outer && n.parent.is_none()),
        )
    }

    /// Largest outer border whose nearest enclosing outer border is `id`
    pub fn largest_enclosed_by(&self, id: usize) -> Option<&ContourNode> {
        largest_by_box(self.nodes.iter().filter(|n| {
            n.kind == BorderKind::Outer && self.enclosing_outer(n.id) == Some(id)
        }))
    }
}

fn largest_by_box<'a>(nodes: impl Iterator<Item = &'a ContourNode>) -> Option<&'a ContourNode> {
    nodes.fold(None, |best: Option<&ContourNode>, n| match best {
        Some(b) if b.blob.box_area() >= n.blob.box_area() => Some(b),
        _ => Some(n),
    })
}

fn bounding_blob(points: &[Point<i32>]) -> Option<Blob> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    if min_x < 0 || min_y < 0 {
        return None;
    }

    Some(Blob {
        min_x: min_x as u32,
        min_y: min_y as u32,
        max_x: max_x as u32,
        max_y: max_y as u32,
        area: polygon_area(points),
    })
}

/// Shoelace area of a closed polygon
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}
