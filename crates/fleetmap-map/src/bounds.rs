//! Geographic bounding boxes

use serde::Serialize;

use fleetmap_types::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box holding every valid point; `None` if there is none
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut bounds: Option<Bounds> = None;
        for p in points.into_iter().filter(|p| p.is_valid()) {
            bounds = Some(match bounds {
                None => Bounds {
                    south: p.latitude,
                    west: p.longitude,
                    north: p.latitude,
                    east: p.longitude,
                },
                Some(b) => b.extend(p),
            });
        }
        bounds
    }

    pub fn extend(self, p: &GeoPoint) -> Self {
        Bounds {
            south: self.south.min(p.latitude),
            west: self.west.min(p.longitude),
            north: self.north.max(p.latitude),
            east: self.east.max(p.longitude),
        }
    }

    /// Grow each side by `ratio` of the box's own size
    pub fn pad(self, ratio: f64) -> Self {
        let lat = (self.north - self.south).abs() * ratio;
        let lon = (self.east - self.west).abs() * ratio;
        Bounds {
            south: self.south - lat,
            west: self.west - lon,
            north: self.north + lat,
            east: self.east + lon,
        }
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&p.latitude)
            && (self.west..=self.east).contains(&p.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_skips_invalid() {
        let points = [
            GeoPoint::new(32.0, -117.0),
            GeoPoint::new(f64::NAN, 0.0),
            GeoPoint::new(33.0, -116.0),
            GeoPoint::new(95.0, 0.0),
        ];
        let b = Bounds::from_points(&points).unwrap();
        assert_eq!(b.south, 32.0);
        assert_eq!(b.north, 33.0);
        assert_eq!(b.west, -117.0);
        assert_eq!(b.east, -116.0);
        assert!(Bounds::from_points(&[GeoPoint::new(100.0, 0.0)]).is_none());
    }

    #[test]
    fn test_pad() {
        let b = Bounds {
            south: 32.0,
            west: -117.0,
            north: 33.0,
            east: -116.0,
        }
        .pad(0.1);
        assert!((b.south - 31.9).abs() < 1e-9);
        assert!((b.north - 33.1).abs() < 1e-9);
        assert!((b.west + 117.1).abs() < 1e-9);
        assert!((b.east + 115.9).abs() < 1e-9);
        assert!(b.contains(&GeoPoint::new(32.5, -116.5)));
    }
}
