//! Crate-wide constants and default values
//!
//! Centralized location for the hard-coded values used by the scene, the
//! default port layout and the snapshot files.

/// Node defaults
pub mod node {
    /// Size hint handed to the renderer for freshly created nodes
    pub const DEFAULT_SIZE: [f32; 2] = [150.0, 30.0];
}

/// Default port layout (vertical flow: inputs on top, outputs on bottom)
pub mod port {
    /// Horizontal distance between neighbouring ports
    pub const SPACING: f32 = 30.0;

    /// Hit radius of a port connection point
    pub const HIT_RADIUS: f32 = 8.0;

    /// Hit radius while the owning node reacts to a dragged connection
    pub const REACTING_HIT_RADIUS: f32 = 16.0;
}

/// Snapshot files
pub mod file {
    /// Extension appended to saved scene files
    pub const EXTENSION: &str = "flow";

    /// Format version written into save files
    pub const FORMAT_VERSION: &str = "1.0";

    /// Creator string written into save files
    pub const CREATOR: &str = concat!("nodle-flow ", env!("CARGO_PKG_VERSION"));
}
