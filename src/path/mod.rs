//! Path assembly: turning a pathfinder result into an animatable curve

use crate::errors::{NavGridError, NavResult};
use crate::grid::{NavGrid, TileId};
use crate::pathfinding::PathField;
use crate::pawn::ModeSet;
use bevy::prelude::*;

/// A labeled stretch of the assembled curve.
///
/// `start` and `end` are cumulative arc lengths along the curve. Segments are
/// produced in traversal order and are contiguous: each segment's `start`
/// equals the previous segment's `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    /// Movement modes legal while traversing this stretch
    pub movement_modes: ModeSet,
    /// Orientation for the pawn while on this stretch
    pub rotation_hint: Quat,
    pub start: f32,
    pub end: f32,
}

/// One continuous piecewise-linear curve plus its labeled segments,
/// consumed downstream by an animation or movement driver
#[derive(Debug, Clone, Default)]
pub struct NavPath {
    points: Vec<Vec3>,
    /// Arc length from the first point to each point, same length as `points`
    cumulative: Vec<f32>,
    segments: Vec<PathSegment>,
}

impl NavPath {
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total arc length of the curve so far
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn last_point(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    pub fn add_point(&mut self, point: Vec3) {
        let length = match self.points.last() {
            Some(previous) => self.length() + previous.distance(point),
            None => 0.0,
        };
        self.points.push(point);
        self.cumulative.push(length);
    }

    /// Swap the most recent point for another, recomputing the arc length
    pub fn replace_last_point(&mut self, point: Vec3) {
        self.points.pop();
        self.cumulative.pop();
        self.add_point(point);
    }

    pub fn push_segment(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Retroactively extend the most recent segment's end, used by tiles that
    /// defer the mode switch until their entry point
    pub fn extend_last_segment_to(&mut self, end: f32) {
        if let Some(last) = self.segments.last_mut() {
            last.end = end;
        }
    }

    /// Point on the curve at the given arc length, clamped to the ends
    pub fn location_at(&self, distance: f32) -> Option<Vec3> {
        if self.points.is_empty() {
            return None;
        }
        if distance <= 0.0 {
            return self.points.first().copied();
        }
        if distance >= self.length() {
            return self.last_point();
        }
        let index = self
            .cumulative
            .partition_point(|&length| length <= distance);
        // 0 < index < len here since distance is strictly inside the curve
        let before = self.cumulative[index - 1];
        let span = self.cumulative[index] - before;
        if span <= f32::EPSILON {
            return Some(self.points[index]);
        }
        let t = (distance - before) / span;
        Some(self.points[index - 1].lerp(self.points[index], t))
    }

    /// Segment covering the given arc length, if any
    pub fn segment_at(&self, distance: f32) -> Option<&PathSegment> {
        self.segments
            .iter()
            .find(|segment| distance >= segment.start && distance < segment.end)
            .or_else(|| self.segments.last())
    }
}

/// Assemble the curve for the cheapest path from `field`'s start tile to
/// `destination`.
///
/// Callers must check reachability first; an unreachable destination is an
/// error here, not a panic.
pub fn build_path(grid: &NavGrid, field: &PathField, destination: TileId) -> NavResult<NavPath> {
    let order = field
        .path_to(destination)
        .ok_or(NavGridError::Unreachable(destination))?;

    let mut path = NavPath::default();
    let last = order.len() - 1;
    for (index, &id) in order.iter().enumerate() {
        let tile = grid.tile(id).ok_or(NavGridError::UnknownTile(id))?;
        tile.add_path_segments(&mut path, index == last);
    }

    debug!(
        "assembled path to {destination}: {points} points, {segments} segments, length {length:.2}",
        points = path.points().len(),
        segments = path.segments().len(),
        length = path.length()
    );
    Ok(path)
}
