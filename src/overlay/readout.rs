//! Values shown by the info readout and the speed legend.

use std::fmt;

use serde::Serialize;

use crate::core::{LatLon, Rgba};
use crate::field::{ColorStop, WindSample, ms_to_knots};

/// Wind at one location, with the derived quantities a readout shows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WindReadout {
    pub location: LatLon,
    pub sample: WindSample,
    /// m/s
    pub speed: f32,
    pub speed_knots: f32,
    /// Compass bearing the wind blows from
    pub direction: f32,
}

impl WindReadout {
    pub fn new(location: LatLon, sample: WindSample) -> Self {
        let speed = sample.speed();
        Self {
            location,
            sample,
            speed,
            speed_knots: ms_to_knots(speed),
            direction: sample.direction_degrees(),
        }
    }
}

impl fmt::Display for WindReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}°, {:.3}°: {:.1} kt from {:.0}°",
            self.location.lat, self.location.lon, self.speed_knots, self.direction
        )
    }
}

/// One label of the speed legend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
    pub stop: f32,
    pub color: Rgba,
    /// Speed at this stop in m/s
    pub speed: f32,
    pub speed_knots: f32,
}

impl LegendEntry {
    pub fn label(&self) -> String {
        format!("{:.1} kt", self.speed_knots)
    }
}

/// Legend labels for `stops` scaled by `max_speed`, highest stop first
/// (the legend bar runs bottom to top).
pub fn legend_entries(stops: &[ColorStop], max_speed: f32) -> Vec<LegendEntry> {
    stops
        .iter()
        .rev()
        .map(|s| {
            let speed = max_speed * s.stop;
            LegendEntry {
                stop: s.stop,
                color: s.color,
                speed,
                speed_knots: ms_to_knots(speed),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ColorRamp;

    #[test]
    fn test_readout_values() {
        let r = WindReadout::new(LatLon::new(10.0, 20.0), WindSample::new(0.0, 10.0));
        assert_eq!(r.speed, 10.0);
        assert!((r.speed_knots - 19.4384).abs() < 1e-3);
        assert!((r.direction - 180.0).abs() < 1e-4);
        assert_eq!(r.to_string(), "10.000°, 20.000°: 19.4 kt from 180°");
    }

    #[test]
    fn test_legend_top_down() {
        let ramp = ColorRamp::default();
        let entries = legend_entries(ramp.stops(), 20.0);
        assert_eq!(entries.len(), ramp.stops().len());
        assert_eq!(entries[0].stop, 1.0);
        assert_eq!(entries[0].speed, 20.0);
        assert_eq!(entries[0].label(), "38.9 kt");
        let last = entries[entries.len() - 1];
        assert_eq!(last.speed, 0.0);
        assert_eq!(last.color, ramp.stops()[0].color);
    }
}
