//! Unit types for physical quantities.
//!
//! Every length and rate carries the unit it is expressed in. Internally the
//! magnitude is held as an integer count of the canonical base unit
//! (nano-inches, or nano-inches per second for rates), so re-tagging a value
//! with another unit never loses precision and equality is unit-independent.

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

use serde::Deserialize;

/// Canonical base units per inch.
pub const CANONICAL_PER_INCH: f64 = 1_000_000_000.0;

/// Unit of travel along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LengthUnit {
    /// Inches.
    Inches,
    /// Feet.
    Feet,
    /// Millimeters.
    Millimeters,
    /// Centimeters.
    Centimeters,
    /// Meters.
    Meters,
    /// Native sensor or controller counts.
    Ticks {
        /// Counts per inch of travel.
        per_inch: f64,
    },
}

impl LengthUnit {
    /// Inches represented by one of this unit.
    #[inline]
    pub fn inches_per_unit(self) -> f64 {
        match self {
            LengthUnit::Inches => 1.0,
            LengthUnit::Feet => 12.0,
            LengthUnit::Millimeters => 1.0 / 25.4,
            LengthUnit::Centimeters => 1.0 / 2.54,
            LengthUnit::Meters => 1.0 / 0.0254,
            LengthUnit::Ticks { per_inch } => 1.0 / per_inch,
        }
    }

    /// Short symbol for diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
            LengthUnit::Ticks { .. } => "ticks",
        }
    }
}

impl Default for LengthUnit {
    fn default() -> Self {
        LengthUnit::Inches
    }
}

/// Time base of a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeUnit {
    /// Per second.
    #[default]
    Seconds,
    /// Per millisecond.
    Milliseconds,
    /// Per 100 ms, the native velocity period of many smart controllers.
    HundredMilliseconds,
    /// Per minute.
    Minutes,
}

impl TimeUnit {
    /// Seconds in one of this unit.
    #[inline]
    pub fn seconds_per_unit(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 0.001,
            TimeUnit::HundredMilliseconds => 0.1,
            TimeUnit::Minutes => 60.0,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::HundredMilliseconds => "100ms",
            TimeUnit::Minutes => "min",
        }
    }
}

/// Unit of a rate: a length per time base.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateUnit {
    /// Length part.
    pub length: LengthUnit,
    /// Time part.
    #[serde(default)]
    pub time: TimeUnit,
}

impl RateUnit {
    /// Inches per second.
    pub const INCHES_PER_SECOND: Self = Self::new(LengthUnit::Inches, TimeUnit::Seconds);

    /// Create a rate unit.
    #[inline]
    pub const fn new(length: LengthUnit, time: TimeUnit) -> Self {
        Self { length, time }
    }

    /// Inches per second represented by one of this unit.
    #[inline]
    pub fn inches_per_second_per_unit(self) -> f64 {
        self.length.inches_per_unit() / self.time.seconds_per_unit()
    }
}

#[inline]
fn to_canonical(value: f64, inches_per_unit: f64) -> i64 {
    libm::round(value * inches_per_unit * CANONICAL_PER_INCH) as i64
}

#[inline]
fn from_canonical(canonical: i64, inches_per_unit: f64) -> f64 {
    canonical as f64 / CANONICAL_PER_INCH / inches_per_unit
}

/// A distance or position, tagged with its unit.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Length {
    canonical: i64,
    unit: LengthUnit,
}

impl Length {
    /// Create a length of `value` in `unit`.
    #[inline]
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self {
            canonical: to_canonical(value, unit.inches_per_unit()),
            unit,
        }
    }

    /// Create a length in inches.
    #[inline]
    pub fn inches(value: f64) -> Self {
        Self::new(value, LengthUnit::Inches)
    }

    /// Zero length in `unit`.
    #[inline]
    pub const fn zero(unit: LengthUnit) -> Self {
        Self { canonical: 0, unit }
    }

    /// Create from a canonical count.
    #[inline]
    pub const fn from_canonical(canonical: i64, unit: LengthUnit) -> Self {
        Self { canonical, unit }
    }

    /// Canonical count (nano-inches).
    #[inline]
    pub const fn canonical(self) -> i64 {
        self.canonical
    }

    /// Unit this value is expressed in.
    #[inline]
    pub const fn unit(self) -> LengthUnit {
        self.unit
    }

    /// Magnitude in this value's own unit.
    #[inline]
    pub fn value(self) -> f64 {
        from_canonical(self.canonical, self.unit.inches_per_unit())
    }

    /// Magnitude in another unit, without re-tagging.
    #[inline]
    pub fn value_in(self, unit: LengthUnit) -> f64 {
        from_canonical(self.canonical, unit.inches_per_unit())
    }

    /// Same quantity expressed in `unit`.
    #[inline]
    pub const fn convert_to(self, unit: LengthUnit) -> Self {
        Self {
            canonical: self.canonical,
            unit,
        }
    }

    /// Multiply by a dimensionless factor, rounding to the canonical scale.
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        Self {
            canonical: libm::round(self.canonical as f64 * factor) as i64,
            unit: self.unit,
        }
    }

    /// Absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            canonical: self.canonical.saturating_abs(),
            unit: self.unit,
        }
    }

    /// True if the value is below zero.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.canonical < 0
    }

    /// True if `|self - other| <= tolerance`.
    #[inline]
    pub fn approx_eq(self, other: Self, tolerance: Self) -> bool {
        self.canonical.abs_diff(other.canonical) <= tolerance.canonical.unsigned_abs()
    }

    /// `self + rhs` in this value's unit, or `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let canonical = self.canonical.checked_add(rhs.canonical)?;
        Some(Self::from_canonical(canonical, self.unit))
    }

    /// `self - rhs` in this value's unit, or `None` on overflow.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let canonical = self.canonical.checked_sub(rhs.canonical)?;
        Some(Self::from_canonical(canonical, self.unit))
    }
}

impl PartialEq for Length {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Length {}

impl PartialOrd for Length {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Length {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

// Operators saturate; use the checked_* methods where overflow must be seen.
impl Add for Length {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_canonical(self.canonical.saturating_add(rhs.canonical), self.unit)
    }
}

impl Sub for Length {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_canonical(self.canonical.saturating_sub(rhs.canonical), self.unit)
    }
}

impl Neg for Length {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_canonical(self.canonical.saturating_neg(), self.unit)
    }
}

impl Mul<f64> for Length {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {}", self.value(), self.unit.symbol())
    }
}

/// A speed along an axis, tagged with its unit.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rate {
    canonical: i64,
    unit: RateUnit,
}

impl Rate {
    /// Create a rate of `value` in `unit`.
    #[inline]
    pub fn new(value: f64, unit: RateUnit) -> Self {
        Self {
            canonical: to_canonical(value, unit.inches_per_second_per_unit()),
            unit,
        }
    }

    /// Create a rate in inches per second.
    #[inline]
    pub fn inches_per_second(value: f64) -> Self {
        Self::new(value, RateUnit::INCHES_PER_SECOND)
    }

    /// Zero rate in `unit`.
    #[inline]
    pub const fn zero(unit: RateUnit) -> Self {
        Self { canonical: 0, unit }
    }

    /// Create from a canonical count.
    #[inline]
    pub const fn from_canonical(canonical: i64, unit: RateUnit) -> Self {
        Self { canonical, unit }
    }

    /// Canonical count (nano-inches per second).
    #[inline]
    pub const fn canonical(self) -> i64 {
        self.canonical
    }

    /// Unit this value is expressed in.
    #[inline]
    pub const fn unit(self) -> RateUnit {
        self.unit
    }

    /// Magnitude in this value's own unit.
    #[inline]
    pub fn value(self) -> f64 {
        from_canonical(self.canonical, self.unit.inches_per_second_per_unit())
    }

    /// Magnitude in another unit, without re-tagging.
    #[inline]
    pub fn value_in(self, unit: RateUnit) -> f64 {
        from_canonical(self.canonical, unit.inches_per_second_per_unit())
    }

    /// Same quantity expressed in `unit`.
    #[inline]
    pub const fn convert_to(self, unit: RateUnit) -> Self {
        Self {
            canonical: self.canonical,
            unit,
        }
    }

    /// Multiply by a dimensionless factor, rounding to the canonical scale.
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        Self {
            canonical: libm::round(self.canonical as f64 * factor) as i64,
            unit: self.unit,
        }
    }

    /// Absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            canonical: self.canonical.saturating_abs(),
            unit: self.unit,
        }
    }

    /// True if the value is below zero.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.canonical < 0
    }

    /// True if the value is exactly zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.canonical == 0
    }

    /// Ratio `self / full_scale`, or 0.0 when `full_scale` is zero.
    #[inline]
    pub fn fraction_of(self, full_scale: Self) -> f64 {
        if full_scale.canonical == 0 {
            0.0
        } else {
            self.canonical as f64 / full_scale.canonical as f64
        }
    }

    /// True if `|self - other| <= tolerance`.
    #[inline]
    pub fn approx_eq(self, other: Self, tolerance: Self) -> bool {
        self.canonical.abs_diff(other.canonical) <= tolerance.canonical.unsigned_abs()
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Rate {}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.canonical.cmp(&other.canonical))
    }
}

// Operators saturate; use the checked_* methods where overflow must be seen.
impl Add for Rate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_canonical(self.canonical.saturating_add(rhs.canonical), self.unit)
    }
}

impl Sub for Rate {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_canonical(self.canonical.saturating_sub(rhs.canonical), self.unit)
    }
}

impl Neg for Rate {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_canonical(self.canonical.saturating_neg(), self.unit)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} {}/{}",
            self.value(),
            self.unit.length.symbol(),
            self.unit.time.symbol()
        )
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to a Length in inches.
    fn inches(self) -> Length;
    /// Convert to a Length in native ticks.
    fn ticks(self, per_inch: f64) -> Length;
    /// Convert to a Rate in inches per second.
    fn inches_per_second(self) -> Rate;
}

impl UnitExt for f64 {
    #[inline]
    fn inches(self) -> Length {
        Length::inches(self)
    }

    #[inline]
    fn ticks(self, per_inch: f64) -> Length {
        Length::new(self, LengthUnit::Ticks { per_inch })
    }

    #[inline]
    fn inches_per_second(self) -> Rate {
        Rate::inches_per_second(self)
    }
}
