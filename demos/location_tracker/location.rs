use std::fmt::{Display, Formatter};

/// A GPS position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Published every time the tracked location changes. `None` means the location is unknown.
#[derive(Debug)]
pub struct LocationChanged {
    pub new_location: Option<Location>,
}
