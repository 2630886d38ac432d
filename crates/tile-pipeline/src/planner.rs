//! Tile grid planning.
//!
//! The plane is cut into `tile_size` squares indexed
//! `tx in [0, ceil(width / T))`, `ty in [0, ceil(height / T))`; edge tiles
//! are clipped to the plane.

use seismic_common::{ArrayRegion, PlaneExtent, TileCoord, TileWindow};
use serde::{Deserialize, Serialize};

/// Which tiles a generation fetches. Fixed per viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPolicy {
    /// Fetch the entire plane once per generation; pan and zoom never
    /// re-fetch.
    WholePlane,
    /// Fetch only tiles intersecting the viewport; every pan or zoom
    /// re-plans.
    #[default]
    ViewportCulled,
}

impl PlanPolicy {
    /// Parse a policy name (case-insensitive), defaulting to viewport culling.
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "whole" | "whole_plane" | "full" => Self::WholePlane,
            _ => Self::ViewportCulled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WholePlane => "whole_plane",
            Self::ViewportCulled => "viewport_culled",
        }
    }
}

impl std::fmt::Display for PlanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tile to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedTile {
    pub coord: TileCoord,
    pub window: TileWindow,
}

/// Tiles of one generation, row-major (`ty` outer, `tx` inner).
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlan {
    pub extent: PlaneExtent,
    pub tile_size: usize,
    pub tiles: Vec<PlannedTile>,
}

impl TilePlan {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.iter().map(|t| t.coord)
    }
}

/// Enumerates tile sets for a fixed tile size.
#[derive(Debug, Clone, Copy)]
pub struct TilePlanner {
    tile_size: usize,
}

impl TilePlanner {
    /// `tile_size` must be non-zero.
    pub fn new(tile_size: usize) -> Self {
        Self { tile_size }
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of tile columns and rows covering the plane.
    pub fn grid_size(&self, extent: &PlaneExtent) -> (u32, u32) {
        (
            extent.width.div_ceil(self.tile_size) as u32,
            extent.height.div_ceil(self.tile_size) as u32,
        )
    }

    /// Plan according to `policy`. `visible` is only consulted for
    /// viewport culling.
    pub fn plan(&self, policy: PlanPolicy, extent: &PlaneExtent, visible: &ArrayRegion) -> TilePlan {
        match policy {
            PlanPolicy::WholePlane => self.plan_whole(extent),
            PlanPolicy::ViewportCulled => self.plan_region(extent, visible),
        }
    }

    /// Every tile of the plane.
    pub fn plan_whole(&self, extent: &PlaneExtent) -> TilePlan {
        let (cols, rows) = self.grid_size(extent);
        self.collect(extent, 0..cols, 0..rows)
    }

    /// Tiles intersecting `region` (array space).
    pub fn plan_region(&self, extent: &PlaneExtent, region: &ArrayRegion) -> TilePlan {
        let region = region.clamp_to(extent);
        if region.is_empty() {
            return TilePlan {
                extent: *extent,
                tile_size: self.tile_size,
                tiles: Vec::new(),
            };
        }

        let (cols, rows) = self.grid_size(extent);
        let t = self.tile_size as f64;
        let tx_min = (region.x0 / t).floor() as u32;
        let ty_min = (region.y0 / t).floor() as u32;
        let tx_max = ((region.x1 / t).ceil() as u32).min(cols);
        let ty_max = ((region.y1 / t).ceil() as u32).min(rows);

        self.collect(extent, tx_min..tx_max, ty_min..ty_max)
    }

    fn collect(
        &self,
        extent: &PlaneExtent,
        txs: std::ops::Range<u32>,
        tys: std::ops::Range<u32>,
    ) -> TilePlan {
        let tiles = tys
            .flat_map(|ty| txs.clone().map(move |tx| TileCoord::new(tx, ty)))
            .filter_map(|coord| {
                coord
                    .window(extent, self.tile_size)
                    .map(|window| PlannedTile { coord, window })
            })
            .collect();

        TilePlan {
            extent: *extent,
            tile_size: self.tile_size,
            tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_plane_1000_by_256() {
        let extent = PlaneExtent::new(1000, 1000);
        let plan = TilePlanner::new(256).plan_whole(&extent);

        assert_eq!(plan.len(), 16);
        let coords: Vec<_> = plan.coords().collect();
        assert_eq!(coords[0], TileCoord::new(0, 0));
        assert_eq!(coords[3], TileCoord::new(3, 0));
        assert_eq!(coords[15], TileCoord::new(3, 3));

        let last_col = plan.tiles.iter().find(|t| t.coord == TileCoord::new(3, 1)).unwrap();
        assert_eq!(last_col.window.x0, 768);
        assert_eq!(last_col.window.x1, 1000);
        assert_eq!(last_col.window.width(), 232);
    }

    #[test]
    fn test_region_culls_tiles() {
        let extent = PlaneExtent::new(1000, 1000);
        let planner = TilePlanner::new(256);
        let plan = planner.plan_region(&extent, &ArrayRegion::new(300.0, 0.0, 520.0, 250.0));
        let coords: Vec<_> = plan.coords().collect();
        assert_eq!(coords, vec![TileCoord::new(1, 0), TileCoord::new(2, 0)]);
    }

    #[test]
    fn test_region_on_tile_boundary() {
        let extent = PlaneExtent::new(1000, 1000);
        let planner = TilePlanner::new(256);
        // Exactly one tile: [256, 512) x [0, 256)
        let plan = planner.plan_region(&extent, &ArrayRegion::new(256.0, 0.0, 512.0, 256.0));
        assert_eq!(plan.coords().collect::<Vec<_>>(), vec![TileCoord::new(1, 0)]);
    }

    #[test]
    fn test_empty_region_plans_nothing() {
        let extent = PlaneExtent::new(1000, 1000);
        let planner = TilePlanner::new(256);
        assert!(planner
            .plan_region(&extent, &ArrayRegion::new(1000.0, 0.0, 1400.0, 300.0))
            .is_empty());
        assert!(planner
            .plan_region(&extent, &ArrayRegion::new(-500.0, -500.0, -1.0, -1.0))
            .is_empty());
    }

    #[test]
    fn test_policy_dispatch() {
        let extent = PlaneExtent::new(600, 300);
        let planner = TilePlanner::new(256);
        let visible = ArrayRegion::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(planner.plan(PlanPolicy::WholePlane, &extent, &visible).len(), 6);
        assert_eq!(planner.plan(PlanPolicy::ViewportCulled, &extent, &visible).len(), 1);
    }

    #[test]
    fn test_policy_from_name() {
        assert_eq!(PlanPolicy::from_name("WHOLE"), PlanPolicy::WholePlane);
        assert_eq!(PlanPolicy::from_name("viewport"), PlanPolicy::ViewportCulled);
        assert_eq!(PlanPolicy::from_name("bogus"), PlanPolicy::ViewportCulled);
    }

    /// Per-sample hit counts of every window in the plan.
    fn coverage(plan: &TilePlan) -> Vec<u32> {
        let extent = plan.extent;
        let mut hits = vec![0u32; extent.sample_count()];
        for tile in &plan.tiles {
            for y in tile.window.y0..tile.window.y1 {
                for x in tile.window.x0..tile.window.x1 {
                    hits[y * extent.width + x] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_whole_plane_covers_every_sample_once() {
        for tile_size in [1, 3, 16, 64, 128] {
            let planner = TilePlanner::new(tile_size);
            for width in 1..=70 {
                for height in 1..=70 {
                    let extent = PlaneExtent::new(width, height);
                    let plan = planner.plan_whole(&extent);

                    let (cols, rows) = planner.grid_size(&extent);
                    assert_eq!(plan.len(), (cols * rows) as usize);

                    let hits = coverage(&plan);
                    assert!(
                        hits.iter().all(|&h| h == 1),
                        "{}x{} with T={} is not an exact partition",
                        width,
                        height,
                        tile_size
                    );
                }
            }
        }
    }

    #[test]
    fn test_region_matches_intersecting_whole_plane_tiles() {
        let regions = [
            ArrayRegion::new(0.0, 0.0, 1.0, 1.0),
            ArrayRegion::new(2.5, 7.25, 19.75, 33.0),
            ArrayRegion::new(16.0, 16.0, 32.0, 32.0),
            ArrayRegion::new(-10.0, 40.0, 500.0, 41.5),
            ArrayRegion::new(60.0, -3.0, 90.0, 90.0),
            ArrayRegion::new(0.0, 0.0, 70.0, 45.0),
        ];

        for tile_size in [1, 3, 16, 64, 128] {
            let planner = TilePlanner::new(tile_size);
            for extent in [PlaneExtent::new(70, 45), PlaneExtent::new(33, 61)] {
                let whole = planner.plan_whole(&extent);
                for region in &regions {
                    let clamped = region.clamp_to(&extent);
                    let expected: Vec<_> = whole
                        .tiles
                        .iter()
                        .filter(|t| {
                            (t.window.x0 as f64) < clamped.x1
                                && (t.window.x1 as f64) > clamped.x0
                                && (t.window.y0 as f64) < clamped.y1
                                && (t.window.y1 as f64) > clamped.y0
                        })
                        .copied()
                        .collect();

                    let culled = planner.plan_region(&extent, region);
                    assert_eq!(
                        culled.tiles, expected,
                        "{:?} on {:?} with T={}",
                        region, extent, tile_size
                    );
                    assert!(coverage(&culled).iter().all(|&h| h <= 1));
                }
            }
        }
    }
}
