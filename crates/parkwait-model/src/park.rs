use serde::{Deserialize, Serialize};
use std::fmt;

const BASE_URL: &str = "https://www.tokyodisneyresort.jp";

/// One of the two park sites whose attraction page is polled.
///
/// The identity fixes both the source URL and the output file name, and does
/// not change for the life of a scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParkIdentity {
    Land,
    Sea,
}

impl ParkIdentity {
    pub fn from_is_land(is_land: bool) -> Self {
        if is_land {
            ParkIdentity::Land
        } else {
            ParkIdentity::Sea
        }
    }

    /// Short site code used in URLs and file names (e.g., "tdl").
    pub fn code(&self) -> &'static str {
        match self {
            ParkIdentity::Land => "tdl",
            ParkIdentity::Sea => "tds",
        }
    }

    /// URL of the park's attraction listing page.
    pub fn attraction_url(&self) -> String {
        format!("{BASE_URL}/{}/attraction.html", self.code())
    }
}

impl fmt::Display for ParkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
