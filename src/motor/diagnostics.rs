//! Transition records and human-readable motor diagnostics.

use core::fmt::{self, Write};

use heapless::String;

use super::state::TargetState;
use crate::backend::ControllerState;
use crate::config::units::{Length, Rate};

/// Capacity of a diagnostics line.
pub const DIAGNOSTICS_CAPACITY: usize = 256;

/// A diagnostics line.
pub type DiagnosticsString = String<DIAGNOSTICS_CAPACITY>;

/// Record of one accepted (or forced) transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// State before the transition.
    pub previous: TargetState,
    /// State after the transition.
    pub current: TargetState,
}

/// Snapshot of everything a diagnostics line reports.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// Axis name.
    pub axis: &'a str,
    /// Current target state.
    pub current: TargetState,
    /// Previous target state.
    pub previous: TargetState,
    /// What the hardware is doing.
    pub controller: ControllerState,
    /// Live position, when readable.
    pub position: Option<Length>,
    /// Live rate, when readable.
    pub rate: Option<Rate>,
    /// Forward hard limit switch, when declared and readable.
    pub forward_limit: Option<bool>,
    /// Reverse hard limit switch, when declared and readable.
    pub reverse_limit: Option<bool>,
}

/// Appended in place of fields that no longer fit.
pub const TRUNCATION_MARKER: &str = " ...";

fn switch(status: Option<bool>) -> &'static str {
    match status {
        Some(true) => "active",
        Some(false) => "clear",
        None => "n/a",
    }
}

/// Line builder that only ever appends whole fields.
struct Line<const N: usize> {
    out: String<N>,
    truncated: bool,
}

impl<const N: usize> Line<N> {
    fn field(&mut self, args: fmt::Arguments<'_>) {
        if self.truncated {
            return;
        }
        let mut part: String<N> = String::new();
        let room = N.saturating_sub(self.out.len() + TRUNCATION_MARKER.len());
        if part.write_fmt(args).is_err() || part.len() > room {
            self.truncated = true;
            // Room for the marker is always kept free.
            let _ = self.out.push_str(TRUNCATION_MARKER);
            return;
        }
        let _ = self.out.push_str(&part);
    }
}

impl Snapshot<'_> {
    /// Render as a single line.
    ///
    /// Fields that do not fit are dropped from the end and replaced by
    /// [`TRUNCATION_MARKER`].
    pub fn render(&self) -> DiagnosticsString {
        self.render_into()
    }

    /// Render into a line of capacity `N`.
    pub fn render_into<const N: usize>(&self) -> String<N> {
        let mut line = Line {
            out: String::new(),
            truncated: false,
        };
        line.field(format_args!("{}:", self.axis));
        line.field(format_args!(" target={}", self.current));
        line.field(format_args!(" previous={}", self.previous));
        line.field(format_args!(" controller={:?}", self.controller));
        match self.position {
            Some(position) => line.field(format_args!(" position={}", position)),
            None => line.field(format_args!(" position=n/a")),
        }
        if let Some(rate) = self.rate {
            line.field(format_args!(" rate={}", rate));
        }
        line.field(format_args!(" fwd_limit={}", switch(self.forward_limit)));
        line.field(format_args!(" rev_limit={}", switch(self.reverse_limit)));
        line.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let line = Snapshot {
            axis: "elevator",
            current: TargetState::HoldingCurrentPosition,
            previous: TargetState::Disabled,
            controller: ControllerState::HoldingPosition,
            position: Some(Length::inches(12.0)),
            rate: None,
            forward_limit: Some(false),
            reverse_limit: None,
        }
        .render();
        assert!(line.starts_with("elevator: target=HoldingCurrentPosition previous=Disabled"));
        assert!(line.contains("position=12.000 in"));
        assert!(line.ends_with("fwd_limit=clear rev_limit=n/a"));
    }

    #[test]
    fn test_overlong_line_drops_whole_fields() {
        let snapshot = Snapshot {
            axis: "left_drivetrain_side_master",
            current: TargetState::MovingToRelativePosition {
                direction: crate::motion::Direction::Forward,
                distance: Length::inches(123_456.0),
            },
            previous: TargetState::CalibratingSensorInDirection {
                direction: crate::motion::Direction::Reverse,
            },
            controller: ControllerState::SetPosition,
            position: Some(Length::inches(-98_765.5)),
            rate: Some(Rate::inches_per_second(42.0)),
            forward_limit: Some(true),
            reverse_limit: Some(false),
        };
        let full: String<512> = snapshot.render_into();
        assert!(full.ends_with("rev_limit=clear"));

        let short: String<96> = snapshot.render_into();
        assert!(short.len() <= 96);
        assert!(short.ends_with(TRUNCATION_MARKER));
        let kept = &short[..short.len() - TRUNCATION_MARKER.len()];
        assert!(full.starts_with(kept));
        // The cut falls between fields.
        assert_eq!(full[kept.len()..].chars().next(), Some(' '));
    }
}
