/// Pan offset (`x`, `y`) and zoom (`k`) mapping data-space onto the canvas.
///
/// `k` is kept strictly positive by the [`Viewport`](super::viewport::Viewport).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		(x * self.k + self.x, y * self.k + self.y)
	}

	pub fn to_data(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		let eps = 1e-9 * (1.0 + a.0.abs().max(a.1.abs()));
		(a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
	}

	#[test]
	fn to_screen_scales_then_pans() {
		let t = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 2.0,
		};
		assert_eq!(t.to_screen(10.0, -5.0), (120.0, 40.0));
		assert_eq!(t.to_data(120.0, 40.0), (10.0, -5.0));
	}

	#[test]
	fn round_trip_over_a_grid_of_views() {
		for &k in &[0.1, 0.5, 1.0, 1.7, 10.0] {
			for &(px, py) in &[(0.0, 0.0), (400.0, 300.0), (-12.5, 999.0)] {
				let t = ViewTransform { x: px, y: py, k };
				for &p in &[(0.0, 0.0), (12.5, -7.25), (-1e4, 3.3e3)] {
					let (sx, sy) = t.to_screen(p.0, p.1);
					assert!(close(t.to_data(sx, sy), p), "k={k} pan=({px},{py}) p={p:?}");
				}
			}
		}
	}
}
