//! Speeds and feeds calculator
//!
//! Derives spindle speed, feed rates, and depths of cut for a tool on a given
//! machine in a given material. Every function here is total: degenerate input
//! (zero flutes, zero diameter) produces a degenerate but finite result that
//! the library validator rejects later, never a panic.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;
use toolvault_core::{
    CuttingPolicy, Machine, MachineMaterialPreset, Material, ToolGeometry, ToolType,
};

/// XY feed cap used when the machine does not declare one, in mm/min
pub const DEFAULT_MAX_FEED_MM_MIN: f64 = 10_000.0;

/// Axial depth of cut as a multiple of diameter when no preset applies
pub const DEFAULT_AXIAL_DEPTH_FACTOR: f64 = 1.0;

/// Radial depth of cut as a multiple of diameter when no preset applies
pub const DEFAULT_RADIAL_DEPTH_FACTOR: f64 = 0.5;

/// Plunge feed as a fraction of XY feed when no preset applies
pub const DEFAULT_PLUNGE_RATE_FACTOR: f64 = 0.5;

/// Upper bound on the chip-thinning feed multiplier
pub const MAX_CHIP_THINNING_FACTOR: f64 = 2.0;

/// Recommended cutting parameters for one tool/machine/material combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingParameters {
    /// Spindle speed, within the machine envelope
    pub rpm: u32,
    /// XY feed in mm/min
    pub feed_mm_min: f64,
    /// Plunge feed in mm/min
    pub plunge_feed_mm_min: f64,
    /// Axial depth of cut in mm
    pub axial_depth_mm: f64,
    /// Radial depth of cut in mm
    pub radial_depth_mm: f64,
    /// Surface speed the machine actually achieves at `rpm`, in m/min
    pub surface_speed_m_min: f64,
    /// Chip load in mm/tooth
    pub chip_load_mm: f64,
}

/// The five working values the calculation starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetFactors {
    pub surface_speed_m_min: f64,
    pub chip_load_mm: f64,
    pub axial_depth_factor: f64,
    pub radial_depth_factor: f64,
    pub plunge_rate_factor: f64,
}

/// Where the working values come from.
///
/// A preset replaces all of them together; there is no per-field fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// Built-in tables scaled by the material's chip-load factor
    Defaulted,
    /// A machine/material preset
    Overridden {
        factors: PresetFactors,
        max_rpm: Option<u32>,
    },
}

impl ParameterSource {
    /// Select the source for an optional preset
    pub fn from_preset(preset: Option<&MachineMaterialPreset>) -> Self {
        match preset {
            Some(p) => Self::Overridden {
                factors: PresetFactors {
                    surface_speed_m_min: p.surface_speed_m_min,
                    chip_load_mm: p.chip_load_mm,
                    axial_depth_factor: p.axial_depth_factor,
                    radial_depth_factor: p.radial_depth_factor,
                    plunge_rate_factor: p.plunge_rate_factor,
                },
                max_rpm: p.max_rpm_override,
            },
            None => Self::Defaulted,
        }
    }

    /// Resolve the working values for a tool diameter and material
    pub fn resolve(&self, diameter_mm: f64, material: &Material) -> PresetFactors {
        match self {
            Self::Overridden { factors, .. } => *factors,
            Self::Defaulted => {
                let base_speed = material
                    .surface_speed_max_m_min
                    .unwrap_or_else(|| material.category.default_surface_speed_m_min());
                PresetFactors {
                    surface_speed_m_min: base_speed * material.chip_load_factor,
                    chip_load_mm: default_chip_load_mm(diameter_mm) * material.chip_load_factor,
                    axial_depth_factor: DEFAULT_AXIAL_DEPTH_FACTOR,
                    radial_depth_factor: DEFAULT_RADIAL_DEPTH_FACTOR,
                    plunge_rate_factor: DEFAULT_PLUNGE_RATE_FACTOR,
                }
            }
        }
    }

    /// Spindle cap to apply before the machine envelope
    pub fn max_rpm(&self) -> Option<u32> {
        match self {
            Self::Overridden { max_rpm, .. } => *max_rpm,
            Self::Defaulted => None,
        }
    }
}

/// Baseline chip load for aluminum by diameter bucket, in mm/tooth
pub fn default_chip_load_mm(diameter_mm: f64) -> f64 {
    match diameter_mm {
        d if d < 3.0 => 0.025,
        d if d < 6.0 => 0.05,
        d if d < 10.0 => 0.075,
        d if d < 16.0 => 0.1,
        d if d < 25.0 => 0.125,
        _ => 0.15,
    }
}

/// Spindle speed for a surface speed (m/min) and diameter (mm), rounded to whole RPM
pub fn calculate_rpm(surface_speed_m_min: f64, diameter_mm: f64) -> f64 {
    (surface_speed_m_min * 1000.0 / (PI * diameter_mm)).round()
}

/// Surface speed in m/min at a spindle speed and diameter
pub fn calculate_surface_speed(rpm: f64, diameter_mm: f64) -> f64 {
    PI * diameter_mm * rpm / 1000.0
}

/// Feed rate in mm/min, rounded to whole mm/min
pub fn calculate_feed_rate(rpm: f64, chip_load_mm: f64, flute_count: u32) -> f64 {
    (rpm * chip_load_mm * flute_count as f64).round()
}

/// Feed compensated for radial chip thinning.
///
/// At or above 50% radial engagement the feed is returned unchanged. Below it
/// the feed is scaled by `1 / sqrt(1 - (1 - 2ae/D)^2)`, capped at
/// [`MAX_CHIP_THINNING_FACTOR`].
pub fn calculate_chip_thinning_feed(base_feed: f64, tool_diameter: f64, radial_depth: f64) -> f64 {
    if radial_depth >= tool_diameter / 2.0 {
        return base_feed;
    }
    let engagement = 1.0 - 2.0 * radial_depth / tool_diameter;
    let multiplier = 1.0 / (1.0 - engagement * engagement).sqrt();
    let multiplier = if multiplier.is_nan() {
        MAX_CHIP_THINNING_FACTOR
    } else {
        multiplier.min(MAX_CHIP_THINNING_FACTOR)
    };
    (base_feed * multiplier).round()
}

/// Material removal rate in cm³/min
pub fn calculate_mrr(feed_rate: f64, axial_depth: f64, radial_depth: f64) -> f64 {
    axial_depth * radial_depth * feed_rate / 1000.0
}

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn clamp_rpm(rpm: f64, machine: &Machine) -> u32 {
    if machine.min_rpm > machine.max_rpm {
        warn!(
            machine = %machine.id,
            min_rpm = machine.min_rpm,
            max_rpm = machine.max_rpm,
            "Inverted spindle range, clamping to max_rpm"
        );
        return machine.max_rpm;
    }
    let rpm = if rpm.is_nan() { 0.0 } else { rpm };
    rpm.clamp(machine.min_rpm as f64, machine.max_rpm as f64) as u32
}

/// Compute recommended cutting parameters.
///
/// The result always respects the machine's spindle and feed limits.
/// Drilling tools get `feed == plunge`, axial depth equal to the flute length,
/// and radial depth of half the diameter. Ball end mills get half the generic
/// radial depth.
pub fn calculate_cutting_parameters(
    geometry: &ToolGeometry,
    tool_type: ToolType,
    machine: &Machine,
    material: &Material,
    preset: Option<&MachineMaterialPreset>,
) -> CuttingParameters {
    let source = ParameterSource::from_preset(preset);
    let factors = source.resolve(geometry.diameter_mm, material);
    let diameter = geometry.diameter_mm;

    let mut requested_rpm = calculate_rpm(factors.surface_speed_m_min, diameter);
    if let Some(cap) = source.max_rpm() {
        requested_rpm = requested_rpm.min(cap as f64);
    }
    let rpm = clamp_rpm(requested_rpm, machine);
    let surface_speed = calculate_surface_speed(rpm as f64, diameter);

    let max_feed_xy = machine.max_feed_xy_mm_min.unwrap_or(DEFAULT_MAX_FEED_MM_MIN);
    let max_feed_z = machine.max_feed_z_mm_min.unwrap_or(max_feed_xy);

    let feed = calculate_feed_rate(rpm as f64, factors.chip_load_mm, geometry.flute_count)
        .min(max_feed_xy);
    let plunge = (feed * factors.plunge_rate_factor).round().min(max_feed_z);

    let axial = round_to(diameter * factors.axial_depth_factor, 2);
    let radial = round_to(diameter * factors.radial_depth_factor, 2);

    let (feed, axial, radial) = match tool_type.policy() {
        CuttingPolicy::Drilling => (plunge, geometry.flute_length_mm, round_to(diameter / 2.0, 2)),
        CuttingPolicy::BallNose => (feed, axial, round_to(radial / 2.0, 2)),
        CuttingPolicy::Milling => (feed, axial, radial),
    };

    CuttingParameters {
        rpm,
        feed_mm_min: feed,
        plunge_feed_mm_min: plunge,
        axial_depth_mm: axial,
        radial_depth_mm: radial,
        surface_speed_m_min: round_to(surface_speed, 1),
        chip_load_mm: round_to(factors.chip_load_mm, 4),
    }
}
