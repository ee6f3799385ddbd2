//! Maps scroll progress and item count onto the horizontal timeline strip.
//!
//! Every output is a pure function of its inputs. Callers recompute the projection from the same
//! item count they render with, so marker count and strip content cannot disagree.

use serde::{Deserialize, Serialize};

use reverie_config::Layout;

/// Normalized scroll progress through the timeline region, always within `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ScrollProgress(f64);
impl ScrollProgress {
	pub const START: Self = Self(0.0);
	pub const END: Self = Self(1.0);

	/// Clamps into `[0, 1]`. NaN maps to the start.
	pub fn new(value: f64) -> Self {
		if value.is_nan() {
			return Self::START;
		}

		Self(value.clamp(0.0, 1.0))
	}

	/// Progress of a sticky container whose scroll range runs from its top meeting the viewport
	/// top to its bottom meeting the viewport bottom.
	///
	/// A container no taller than the viewport has no scroll range and reports the start.
	pub fn from_viewport(
		scroll_top: f64,
		container_top: f64,
		container_height: f64,
		viewport_height: f64,
	) -> Self {
		let range = container_height - viewport_height;

		if !range.is_finite() || range <= 0.0 {
			return Self::START;
		}

		Self::new((scroll_top - container_top) / range)
	}

	pub fn value(self) -> f64 {
		self.0
	}
}
impl<'de> Deserialize<'de> for ScrollProgress {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = f64::deserialize(deserializer)?;

		Ok(Self::new(raw))
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutProjection {
	pub item_count: usize,
	/// Strip translation in percent of its own width.
	pub translate_x_pct: f64,
	/// Height of the enclosing scroll region in viewport-height units.
	pub container_height_vh: f64,
	/// Marker centers in pixels from the strip's leading edge, one per item.
	pub markers_px: Vec<f64>,
}

pub fn project(progress: ScrollProgress, item_count: usize, layout: &Layout) -> LayoutProjection {
	LayoutProjection {
		item_count,
		translate_x_pct: translate_x_pct(progress, layout),
		container_height_vh: container_height_vh(item_count, layout),
		markers_px: marker_positions(item_count, layout),
	}
}

/// Linear between `start_offset_pct` at progress 0 and `end_offset_pct` at progress 1.
pub fn translate_x_pct(progress: ScrollProgress, layout: &Layout) -> f64 {
	let t = progress.value();

	layout.start_offset_pct + (layout.end_offset_pct - layout.start_offset_pct) * t
}

pub fn container_height_vh(item_count: usize, layout: &Layout) -> f64 {
	if item_count <= layout.height_threshold {
		return layout.min_height_vh;
	}

	item_count as f64 * layout.per_item_height_vh
}

pub fn marker_offset_px(index: usize, layout: &Layout) -> f64 {
	index as f64 * (layout.item_width_px + layout.gutter_px) + layout.item_width_px / 2.0
}

pub fn marker_positions(item_count: usize, layout: &Layout) -> Vec<f64> {
	(0..item_count).map(|index| marker_offset_px(index, layout)).collect()
}
