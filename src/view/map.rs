// src/view/map.rs

use crate::error::PipelineError;
use crate::table::{columns, typed_column};
use crate::view::STAGE;
use arrow::{
    array::{Float64Array, StringArray},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};

/// Inclusive lat/lon box. Defaults to metropolitan France and its
/// surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            min_lat: 40.0,
            max_lat: 52.0,
            min_lon: -5.0,
            max_lon: 10.0,
        }
    }
}

impl MapBounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub nom_station: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub points: Vec<MapPoint>,
    /// Mean position of `points`, `None` when there are none.
    pub centre: Option<(f64, f64)>,
}

/// One point per station, restricted to `bounds` when given.
pub fn map_points(
    batch: &RecordBatch,
    bounds: Option<&MapBounds>,
) -> Result<Vec<MapPoint>, PipelineError> {
    let lat = typed_column::<Float64Array>(batch, STAGE, columns::LAT)?;
    let lon = typed_column::<Float64Array>(batch, STAGE, columns::LON)?;
    let names = typed_column::<StringArray>(batch, STAGE, columns::STATION_NAME)?;

    Ok(lat
        .iter()
        .zip(lon.iter())
        .zip(names.iter())
        .filter_map(|((lat, lon), name)| {
            let (lat, lon) = (lat?, lon?);
            bounds
                .map_or(true, |b| b.contains(lat, lon))
                .then(|| MapPoint {
                    lat,
                    lon,
                    nom_station: name.map(str::to_string),
                })
        })
        .collect())
}

pub fn map_view(batch: &RecordBatch, bounds: Option<&MapBounds>) -> Result<MapView, PipelineError> {
    let points = map_points(batch, bounds)?;
    let centre = (!points.is_empty()).then(|| {
        let n = points.len() as f64;
        let (sum_lat, sum_lon) = points
            .iter()
            .fold((0.0, 0.0), |(a, b), p| (a + p.lat, b + p.lon));
        (sum_lat / n, sum_lon / n)
    });
    Ok(MapView { points, centre })
}
