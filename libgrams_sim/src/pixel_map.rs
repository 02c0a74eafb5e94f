// The anode is tiled with rectangular pixels of equal size. The tiling covers the x-y
// bounding box of the readout volume, centred on (readout_centerx, readout_centery):
// [x, y] -> ReadoutID(floor((x - x0) / dx), floor((y - y0) / dy))
// Pixels are half-open intervals, so a coordinate exactly on a pixel edge belongs to the
// higher-index pixel. Coordinates outside the readout volume still get an index; they
// just land on pixels that don't physically exist.
use serde::Serialize;

use super::config::ReadoutParams;
use super::error::PixelMapError;
use super::geometry::Geometry;
use super::constants::READOUT_INDEX_STRIDE;
use super::readout_id::ReadoutID;

/// PixelMap assigns a position on the anode to a readout channel.
///
/// The pixel pitch is derived once, at construction, from the geometry and the number of
/// channels along each axis. After that the mapping is a pure function of the position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelMap {
    pixel_size_x: f64,
    pixel_size_y: f64,
    offset_x: f64,
    offset_y: f64,
    max_drift_length: f64,
}

impl PixelMap {
    /// Create a new PixelMap from the readout configuration and the geometry.
    ///
    /// Fails if the readout volume does not exist or if the derived extents or the channel
    /// counts are not positive.
    pub fn new(params: &ReadoutParams, geometry: &impl Geometry) -> Result<Self, PixelMapError> {
        let [half_x, half_y, half_z] = geometry.half_extents(&params.readout_volume)?;

        let extent_x = 2.0 * half_x;
        let extent_y = 2.0 * half_y;
        if !(extent_x > 0.0) {
            return Err(PixelMapError::NonPositiveExtent('x', extent_x));
        }
        if !(extent_y > 0.0) {
            return Err(PixelMapError::NonPositiveExtent('y', extent_y));
        }
        if params.x_resolution <= 0 {
            return Err(PixelMapError::NonPositiveResolution(
                'x',
                params.x_resolution,
            ));
        }
        if params.y_resolution <= 0 {
            return Err(PixelMapError::NonPositiveResolution(
                'y',
                params.y_resolution,
            ));
        }
        // The flattened output index needs room for x indices on both sides of the readout
        if params.x_resolution as i64 >= READOUT_INDEX_STRIDE / 2 {
            return Err(PixelMapError::ResolutionTooLarge(
                params.x_resolution,
                READOUT_INDEX_STRIDE / 2,
            ));
        }

        let pm = PixelMap {
            pixel_size_x: extent_x / params.x_resolution as f64,
            pixel_size_y: extent_y / params.y_resolution as f64,
            offset_x: params.readout_centerx - half_x,
            offset_y: params.readout_centery - half_y,
            max_drift_length: 2.0 * half_z,
        };
        spdlog::info!(
            "PixelMap for volume {}: pixel size = ({:.4}, {:.4}) mm, lower edge = ({:.3}, {:.3}) mm",
            params.readout_volume,
            pm.pixel_size_x,
            pm.pixel_size_y,
            pm.offset_x,
            pm.offset_y
        );
        Ok(pm)
    }

    /// Get the ReadoutID of the pixel containing the anode position (x, y)
    pub fn assign(&self, x: f64, y: f64) -> ReadoutID {
        ReadoutID::new(
            ((x - self.offset_x) / self.pixel_size_x).floor() as i32,
            ((y - self.offset_y) / self.pixel_size_y).floor() as i32,
        )
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (self.pixel_size_x, self.pixel_size_y)
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Full z extent of the readout volume, the longest distance charge can drift
    pub fn max_drift_length(&self) -> f64 {
        self.max_drift_length
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::geometry::VolumeTable;

    fn make_map(x_res: i32, y_res: i32) -> Result<PixelMap, PixelMapError> {
        let mut geo = VolumeTable::default();
        geo.insert("Active", [50.0, 25.0, 10.0]);
        let params = ReadoutParams {
            readout_volume: String::from("Active"),
            x_resolution: x_res,
            y_resolution: y_res,
            readout_centerx: 0.0,
            readout_centery: 0.0,
        };
        PixelMap::new(&params, &geo)
    }

    #[test]
    fn test_pixel_pitch() {
        let map = make_map(10, 5).unwrap();
        assert_eq!(map.pixel_size(), (10.0, 10.0));
        assert_eq!(map.offset(), (-50.0, -25.0));
        assert_eq!(map.max_drift_length(), 20.0);
    }

    #[test]
    fn test_assign_edges() {
        let map = make_map(10, 5).unwrap();
        // Lower edge of the readout
        assert_eq!(map.assign(-50.0, -25.0), ReadoutID::new(0, 0));
        // Exactly on an edge goes to the higher index
        assert_eq!(map.assign(-40.0, -15.0), ReadoutID::new(1, 1));
        assert_eq!(map.assign(-40.000001, -15.000001), ReadoutID::new(0, 0));
        assert_eq!(map.assign(0.0, 0.0), ReadoutID::new(5, 2));
        // Outside of the readout
        assert_eq!(map.assign(-51.0, 30.0), ReadoutID::new(-1, 5));
    }

    #[test]
    fn test_assign_is_pure() {
        let map = make_map(7, 3).unwrap();
        let first = map.assign(12.345, -6.789);
        for _ in 0..10 {
            assert_eq!(map.assign(12.345, -6.789), first);
        }
    }

    #[test]
    fn test_bad_configuration() {
        assert!(matches!(
            make_map(0, 5),
            Err(PixelMapError::NonPositiveResolution('x', 0))
        ));
        assert!(matches!(
            make_map(5, -1),
            Err(PixelMapError::NonPositiveResolution('y', -1))
        ));
        assert!(matches!(
            make_map(2_000_000, 5),
            Err(PixelMapError::ResolutionTooLarge(2_000_000, 500_000))
        ));
        assert!(make_map(499_999, 5).is_ok());

        let mut geo = VolumeTable::default();
        geo.insert("Flat", [0.0, 25.0, 10.0]);
        let mut params = ReadoutParams {
            readout_volume: String::from("Flat"),
            ..Default::default()
        };
        assert!(matches!(
            PixelMap::new(&params, &geo),
            Err(PixelMapError::NonPositiveExtent('x', _))
        ));
        params.readout_volume = String::from("Missing");
        assert!(matches!(
            PixelMap::new(&params, &geo),
            Err(PixelMapError::GeometryError(GeometryError::VolumeNotFound(_)))
        ));
    }
}
