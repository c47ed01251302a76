//! Readout link address

use serde::{Deserialize, Serialize};

/// Identifies one readout link: APA number plus link number within the APA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GeoId {
    /// APA (anode plane assembly) number
    pub apa_number: u32,
    /// Link number within the APA
    pub link_number: u32,
}

impl GeoId {
    /// Create a link address.
    pub fn new(apa_number: u32, link_number: u32) -> Self {
        Self {
            apa_number,
            link_number,
        }
    }
}
