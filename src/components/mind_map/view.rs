use super::geometry::Point;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 3.0;

/// Pan offset plus uniform scale: `screen = model * scale + pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub pan: Point,
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			pan: Point::default(),
			scale: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn to_model(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.pan.x) / self.scale,
			(screen.y - self.pan.y) / self.scale,
		)
	}

	pub fn to_screen(&self, model: Point) -> Point {
		Point::new(
			model.x * self.scale + self.pan.x,
			model.y * self.scale + self.pan.y,
		)
	}

	/// Scales by `factor` (clamped to [`MIN_SCALE`, `MAX_SCALE`]) keeping the
	/// model point under `anchor` fixed on screen.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
		if !factor.is_finite() || factor <= 0.0 {
			return;
		}
		let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
		let ratio = new_scale / self.scale;
		self.pan.x = anchor.x - (anchor.x - self.pan.x) * ratio;
		self.pan.y = anchor.y - (anchor.y - self.pan.y) * ratio;
		self.scale = new_scale;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.pan.x += dx;
		self.pan.y += dy;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn zoom_towards_anchor() {
		let mut view = ViewTransform::default();
		view.zoom_at(Point::new(50.0, 50.0), 1.1);
		assert!(close(view.scale, 1.1));
		assert!(close(view.pan.x, -5.0));
		assert!(close(view.pan.y, -5.0));
		let model = view.to_model(Point::new(50.0, 50.0));
		assert!(close(model.x, 50.0) && close(model.y, 50.0));
	}

	#[test]
	fn unit_factor_is_identity() {
		let mut view = ViewTransform {
			pan: Point::new(13.0, -7.5),
			scale: 2.25,
		};
		let before = view;
		view.zoom_at(Point::new(120.0, 80.0), 1.0);
		assert_eq!(view, before);
	}

	#[test]
	fn scale_is_clamped() {
		let mut view = ViewTransform::default();
		view.zoom_at(Point::new(0.0, 0.0), 100.0);
		assert_eq!(view.scale, MAX_SCALE);
		view.zoom_at(Point::new(0.0, 0.0), 1e-6);
		assert_eq!(view.scale, MIN_SCALE);
	}

	#[test]
	fn clamped_zoom_keeps_anchor_fixed() {
		let mut view = ViewTransform {
			pan: Point::new(10.0, 20.0),
			scale: 2.9,
		};
		let anchor = Point::new(200.0, 150.0);
		let before = view.to_model(anchor);
		view.zoom_at(anchor, 2.0);
		let after = view.to_model(anchor);
		assert!(close(before.x, after.x) && close(before.y, after.y));
	}

	#[test]
	fn screen_model_round_trip() {
		let view = ViewTransform {
			pan: Point::new(-33.3, 71.0),
			scale: 0.37,
		};
		for p in [Point::new(0.0, 0.0), Point::new(512.5, -90.25), Point::new(1e4, 3.0)] {
			let back = view.to_screen(view.to_model(p));
			assert!((back.x - p.x).abs() < 1e-6 && (back.y - p.y).abs() < 1e-6);
		}
	}

	#[test]
	fn pan_is_unclamped() {
		let mut view = ViewTransform::default();
		view.pan_by(1e6, -1e6);
		assert_eq!(view.pan, Point::new(1e6, -1e6));
	}
}
