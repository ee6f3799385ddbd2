use reverie_config::Layout;
use reverie_domain::projection::{
	self, ScrollProgress, container_height_vh, marker_offset_px, translate_x_pct,
};

#[test]
fn translation_interpolates_between_anchors() {
	let layout = Layout::default();

	assert_eq!(translate_x_pct(ScrollProgress::START, &layout), 1.0);
	assert_eq!(translate_x_pct(ScrollProgress::END, &layout), -90.0);
	assert!((translate_x_pct(ScrollProgress::new(0.5), &layout) - (-44.5)).abs() < 1e-9);
}

#[test]
fn translation_is_monotonic_in_progress() {
	let layout = Layout::default();
	let mut previous = f64::INFINITY;

	for step in 0..=100 {
		let value = translate_x_pct(ScrollProgress::new(step as f64 / 100.0), &layout);

		assert!(value <= previous, "Translation increased at step {step}.");

		previous = value;
	}
}

#[test]
fn height_uses_minimum_up_to_threshold() {
	let layout = Layout::default();

	for count in 0..=layout.height_threshold {
		assert_eq!(container_height_vh(count, &layout), 300.0);
	}

	assert_eq!(container_height_vh(6, &layout), 300.0);
	assert_eq!(container_height_vh(7, &layout), 350.0);
	assert_eq!(container_height_vh(40, &layout), 2_000.0);
}

#[test]
fn height_never_decreases_with_item_count() {
	let layout = Layout::default();
	let mut previous = 0.0;

	for count in 0..=200 {
		let height = container_height_vh(count, &layout);

		assert!(height >= previous, "Height dropped at count {count}.");

		previous = height;
	}
}

#[test]
fn markers_track_every_item_count() {
	let layout = Layout::default();

	for count in 0..=32 {
		let projected = projection::project(ScrollProgress::new(0.3), count, &layout);

		assert_eq!(projected.item_count, count);
		assert_eq!(projected.markers_px.len(), count);

		for (index, marker) in projected.markers_px.iter().enumerate() {
			let expected = index as f64 * (380.0 + 16.0) + 190.0;

			assert_eq!(*marker, expected);
			assert_eq!(marker_offset_px(index, &layout), expected);
		}
	}
}

#[test]
fn markers_do_not_depend_on_scroll_progress() {
	let layout = Layout::default();
	let start = projection::project(ScrollProgress::START, 4, &layout);
	let end = projection::project(ScrollProgress::END, 4, &layout);

	assert_eq!(start.markers_px, end.markers_px);
	assert_ne!(start.translate_x_pct, end.translate_x_pct);
}

#[test]
fn custom_layout_changes_pitch() {
	let layout = Layout { item_width_px: 300.0, gutter_px: 8.0, ..Layout::default() };

	assert_eq!(marker_offset_px(0, &layout), 150.0);
	assert_eq!(marker_offset_px(2, &layout), 766.0);
}

#[test]
fn progress_deserializes_clamped() {
	let progress: ScrollProgress = serde_json::from_str("1.7").expect("Failed to parse progress.");

	assert_eq!(progress, ScrollProgress::END);
}
