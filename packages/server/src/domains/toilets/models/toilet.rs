use serde::{Deserialize, Serialize};

/// A public toilet in the canonical shape served to clients.
///
/// Coordinates stay as the upstream text so no precision is lost or invented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toilet {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub open_type: String,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub gender_policy: String,
    #[serde(default)]
    pub safety_info: String,
    #[serde(default)]
    pub place_type: String,
    #[serde(default)]
    pub manager: String,
}

impl Toilet {
    /// Only records with an id, a name, an address and both coordinates are
    /// worth showing on a map.
    pub fn is_acceptable(&self) -> bool {
        !self.id.is_empty()
            && !self.name.is_empty()
            && !self.address.is_empty()
            && !self.latitude.is_empty()
            && !self.longitude.is_empty()
    }
}
