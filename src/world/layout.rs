//! Fixed physical layout of the static cells
//!
//! A layout file lists every plot of the city with its placement and,
//! for imported building models, the model-local mesh bounds. Files may be
//! JSON or TOML; [`Layout::grid`] builds a regular layout for demos.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::city::cell::{Cell, MeshBounds, Transform};
use crate::core::error::{Result, SegregationError};
use crate::core::types::BuildingKind;

/// Root structure for layout files
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Layout {
    /// Schema version (currently 1)
    #[serde(default = "default_version")]
    pub version: u32,
    /// Optional human-readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Every static plot
    #[serde(default)]
    pub plots: Vec<Plot>,
}

fn default_version() -> u32 {
    1
}

/// A single plot
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Plot {
    /// World position `[x, y, z]` of the model origin
    pub position: [f32; 3],
    /// Rotation about the vertical axis in degrees (defaults to 0)
    #[serde(default)]
    pub rotation_deg: Option<f32>,
    /// Per-axis scale (defaults to 1)
    #[serde(default)]
    pub scale: Option<[f32; 3]>,
    /// Model-local mesh bounds; plots without one are treated as markers
    #[serde(default)]
    pub mesh_bounds: Option<PlotBounds>,
    /// Declared kind (defaults to residency)
    #[serde(default)]
    pub kind: Option<BuildingKind>,
}

/// Mesh bounds as written in layout files
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PlotBounds {
    pub center: [f32; 3],
    pub extents: [f32; 3],
}

impl Plot {
    fn transform(&self) -> Transform {
        Transform {
            translation: Vec3::from_array(self.position),
            rotation: Quat::from_rotation_y(self.rotation_deg.unwrap_or(0.0).to_radians()),
            scale: self.scale.map(Vec3::from_array).unwrap_or(Vec3::ONE),
        }
    }

    /// Build the static cell for this plot
    pub fn to_cell(&self) -> Cell {
        let mesh = self.mesh_bounds.map(|b| MeshBounds {
            center: Vec3::from_array(b.center),
            extents: Vec3::from_array(b.extents),
        });
        Cell::new(self.transform(), mesh, self.kind.unwrap_or_default())
    }

    fn is_finite(&self) -> bool {
        let mut values = self.position.to_vec();
        values.extend(self.rotation_deg);
        values.extend(self.scale.into_iter().flatten());
        if let Some(b) = &self.mesh_bounds {
            values.extend(b.center);
            values.extend(b.extents);
        }
        values.iter().all(|v| v.is_finite())
    }
}

impl Layout {
    /// Regular grid of unit-box plots centred on the origin
    ///
    /// Box models have their origin on the ground at the box centre, so the
    /// mesh bounds sit half a unit above it.
    pub fn grid(cols: u32, rows: u32, spacing: f32) -> Self {
        let x0 = -(cols.saturating_sub(1) as f32) * spacing / 2.0;
        let z0 = -(rows.saturating_sub(1) as f32) * spacing / 2.0;

        let plots = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (col, row)))
            .map(|(col, row)| Plot {
                position: [x0 + col as f32 * spacing, 0.0, z0 + row as f32 * spacing],
                rotation_deg: None,
                scale: None,
                mesh_bounds: Some(PlotBounds {
                    center: [0.0, 0.5, 0.0],
                    extents: [0.5, 0.5, 0.5],
                }),
                kind: None,
            })
            .collect();

        Self {
            version: 1,
            name: Some(format!("grid {}x{}", cols, rows)),
            plots,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let layout: Layout = serde_json::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let layout: Layout = toml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load a `.json` or `.toml` layout file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            other => Err(SegregationError::InvalidLayout(format!(
                "unsupported layout extension: {:?}",
                other
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SegregationError::InvalidLayout(format!(
                "unsupported layout version {}",
                self.version
            )));
        }
        if let Some(index) = self.plots.iter().position(|p| !p.is_finite()) {
            return Err(SegregationError::InvalidLayout(format!(
                "plot {} has non-finite values",
                index
            )));
        }
        Ok(())
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.plots.iter().map(Plot::to_cell)
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }
}
