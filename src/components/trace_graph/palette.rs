use super::types::NodeType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub fn css(&self, alpha: f64) -> String {
		format!(
			"rgba({}, {}, {}, {})",
			self.r,
			self.g,
			self.b,
			alpha.clamp(0.0, 1.0)
		)
	}

	pub fn hex(&self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

pub const ACTIVE_NODE: Rgb = Rgb::new(255, 255, 0);
pub const BOOKMARK: Rgb = Rgb::new(255, 0, 255);
pub const DEFAULT_NODE: Rgb = Rgb::new(90, 200, 90);
pub const DEFAULT_EDGE: Rgb = Rgb::new(60, 170, 60);
pub const CENTROID: Rgb = Rgb::new(0, 0, 0);

const CATEGORICAL: &[Rgb] = &[
	Rgb::new(0x1f, 0x77, 0xb4),
	Rgb::new(0xff, 0x7f, 0x0e),
	Rgb::new(0x2c, 0xa0, 0x2c),
	Rgb::new(0x94, 0x67, 0xbd),
	Rgb::new(0x8c, 0x56, 0x4b),
	Rgb::new(0xe3, 0x77, 0xc2),
	Rgb::new(0x7f, 0x7f, 0x7f),
	Rgb::new(0xbc, 0xbd, 0x22),
	Rgb::new(0x17, 0xbe, 0xcf),
];

/// FNV-1a, used only to bucket type names into the palette.
fn fnv1a(bytes: &[u8]) -> u64 {
	let mut hash: u64 = 1469598103934665603;
	for b in bytes {
		hash ^= *b as u64;
		hash = hash.wrapping_mul(1099511628211);
	}
	hash
}

/// Colour for a node type: fixed colours for the well-known types, a stable hashed
/// palette entry for anything else.
pub fn type_color(node_type: &NodeType) -> Rgb {
	match node_type.as_str() {
		"presynaptic" | "axon" | "Axon" => Rgb::new(255, 0, 0),
		"postsynaptic" | "dendrite" | "Dendrite" => Rgb::new(0, 255, 255),
		"initial" => Rgb::new(0, 255, 0),
		"boundary" => Rgb::new(255, 128, 0),
		other => CATEGORICAL[(fnv1a(other.as_bytes()) % CATEGORICAL.len() as u64) as usize],
	}
}
