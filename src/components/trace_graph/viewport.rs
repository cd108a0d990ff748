use log::error;

use super::transform::ViewTransform;

pub const SCALE_INCREMENT: f64 = 0.1;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Owns pan, zoom and the current slice of the image stack.
///
/// `position` is where the centre of the image sits on the canvas, so data-space
/// `(0, 0)` (the volume midpoint) maps to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub position: (f64, f64),
	pub scale: f64,
	pub current_z: u32,
	pub slice_count: u32,
	pub width: f64,
	pub height: f64,
	pub image_width: f64,
	pub image_height: f64,
}

impl Viewport {
	/// Centred, unscaled, on the middle slice.
	pub fn new(width: f64, height: f64, image: (f64, f64), slice_count: u32) -> Self {
		Self {
			position: (width / 2.0, height / 2.0),
			scale: 1.0,
			current_z: slice_count / 2,
			slice_count,
			width,
			height,
			image_width: image.0,
			image_height: image.1,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		ViewTransform {
			x: self.position.0,
			y: self.position.1,
			k: self.scale,
		}
	}

	/// Data-space position under a screen point.
	pub fn cursor_data(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform().to_data(sx, sy)
	}

	fn pan_increment(&self) -> f64 {
		self.width.min(self.height) * 0.01
	}

	pub fn pan_up(&mut self) {
		self.position.1 = (self.position.1 - self.pan_increment()).max(0.0);
	}

	pub fn pan_down(&mut self) {
		self.position.1 = (self.position.1 + self.pan_increment()).min(self.height);
	}

	pub fn pan_left(&mut self) {
		self.position.0 = (self.position.0 - self.pan_increment()).max(0.0);
	}

	pub fn pan_right(&mut self) {
		self.position.0 = (self.position.0 + self.pan_increment()).min(self.width);
	}

	/// Move the image with the mouse (right-drag).
	pub fn drag_by(&mut self, dx: f64, dy: f64) {
		self.position.0 += dx;
		self.position.1 += dy;
	}

	pub fn set_position(&mut self, x: f64, y: f64) -> bool {
		if (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y) {
			self.position = (x, y);
			true
		} else {
			error!("Invalid position requested: ({x}, {y})");
			false
		}
	}

	pub fn scale_up(&mut self) {
		self.scale += SCALE_INCREMENT;
	}

	pub fn scale_down(&mut self) {
		self.scale = (self.scale - SCALE_INCREMENT).max(SCALE_INCREMENT);
	}

	/// Non-positive scales are ignored.
	pub fn set_scale(&mut self, scale: f64) {
		if scale > 0.0 {
			self.scale = scale;
		}
	}

	/// Zoom by `factor` keeping the point under the cursor fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.scale * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.scale;
		self.position.0 = sx - (sx - self.position.0) * ratio;
		self.position.1 = sy - (sy - self.position.1) * ratio;
		self.scale = new_k;
	}

	pub fn max_z(&self) -> u32 {
		self.slice_count.saturating_sub(1)
	}

	pub fn increment_z(&mut self) {
		if self.current_z < self.max_z() {
			self.current_z += 1;
		}
	}

	pub fn decrement_z(&mut self) {
		self.current_z = self.current_z.saturating_sub(1);
	}

	pub fn set_z(&mut self, z: u32) -> bool {
		if z < self.slice_count {
			self.current_z = z;
			true
		} else {
			error!("Invalid index requested: {z} of {}", self.slice_count);
			false
		}
	}

	/// Back to scale 1 and centred, optionally jumping to slice `z`.
	pub fn reset(&mut self, z: Option<u32>) {
		self.scale = 1.0;
		self.position = (self.width / 2.0, self.height / 2.0);
		if let Some(z) = z {
			self.set_z(z);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Whether a screen point falls on the drawn image.
	pub fn image_collision(&self, sx: f64, sy: f64) -> bool {
		let (half_w, half_h) = (
			self.image_width / 2.0 * self.scale,
			self.image_height / 2.0 * self.scale,
		);
		(self.position.0 - half_w..=self.position.0 + half_w).contains(&sx)
			&& (self.position.1 - half_h..=self.position.1 + half_h).contains(&sy)
	}
}
