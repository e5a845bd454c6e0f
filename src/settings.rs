use bytemuck::{Pod, Zeroable};

/// Encoding settings for BC6H.
///
/// Start from one of the presets and toggle individual stages with the
/// `with_*` methods:
///
/// ```
/// use fast_bc6h::BC6HSettings;
///
/// let settings = BC6HSettings::quality().with_dual_partition_inset(true);
/// assert!(settings.dual_partition());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BC6HSettings {
    dual_partition: u32,
    inset_1p: u32,
    inset_2p: u32,
    optimize_endpoints: u32,
    luminance_weights: u32,
}

impl BC6HSettings {
    /// Fast settings. Only the single region mode is tried.
    pub const fn fast() -> Self {
        Self {
            dual_partition: false as _,
            inset_1p: true as _,
            inset_2p: false as _,
            optimize_endpoints: true as _,
            luminance_weights: true as _,
        }
    }

    /// Quality settings. Also searches the best two region pattern and keeps
    /// whichever encoding has the lower error.
    pub const fn quality() -> Self {
        Self {
            dual_partition: true as _,
            ..Self::fast()
        }
    }

    /// Enables the two region pattern search.
    pub const fn with_dual_partition(mut self, enabled: bool) -> Self {
        self.dual_partition = enabled as _;
        self
    }

    /// Insets the single region bounding box in log space before fitting.
    pub const fn with_single_partition_inset(mut self, enabled: bool) -> Self {
        self.inset_1p = enabled as _;
        self
    }

    /// Insets every region's bounding box in log space before fitting. Off in both presets.
    pub const fn with_dual_partition_inset(mut self, enabled: bool) -> Self {
        self.inset_2p = enabled as _;
        self
    }

    /// Refines endpoints with a least squares fit over the initial indices.
    pub const fn with_optimize_endpoints(mut self, enabled: bool) -> Self {
        self.optimize_endpoints = enabled as _;
        self
    }

    /// Weights the error per channel by its luminance contribution.
    pub const fn with_luminance_weights(mut self, enabled: bool) -> Self {
        self.luminance_weights = enabled as _;
        self
    }

    pub const fn dual_partition(&self) -> bool {
        self.dual_partition != 0
    }

    pub const fn single_partition_inset(&self) -> bool {
        self.inset_1p != 0
    }

    pub const fn dual_partition_inset(&self) -> bool {
        self.inset_2p != 0
    }

    pub const fn optimize_endpoints(&self) -> bool {
        self.optimize_endpoints != 0
    }

    pub const fn luminance_weights(&self) -> bool {
        self.luminance_weights != 0
    }
}

impl Default for BC6HSettings {
    fn default() -> Self {
        Self::quality()
    }
}
