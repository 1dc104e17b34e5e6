//! Hardware boundary traits.
//!
//! These are the only places the crate touches devices. Values crossing them
//! are raw numbers in the device's own units; the backends wrap them into
//! unit-tagged quantities.

use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::NeutralBehavior;
use crate::error::HardwareFault;
use crate::motion::Direction;

/// Output mode of a closed-loop smart controller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Output off; the neutral behavior applies.
    Disabled,
    /// Open-loop output in [-1.0, 1.0].
    PercentOutput(f64),
    /// Closed-loop velocity in native rate units.
    Velocity(f64),
    /// Closed-loop position in native length units.
    Position(f64),
}

/// A closed-loop motor controller on a bus.
pub trait SmartController {
    /// Change the output mode.
    fn set_control(&mut self, mode: ControlMode) -> Result<(), HardwareFault>;

    /// Integrated sensor position in native units.
    fn position(&mut self) -> Result<f64, HardwareFault>;

    /// Integrated sensor velocity in native rate units.
    fn velocity(&mut self) -> Result<f64, HardwareFault>;

    /// Overwrite the integrated sensor position.
    fn set_position(&mut self, position: f64) -> Result<(), HardwareFault>;

    /// Raw state of the limit switch input wired to this controller.
    ///
    /// `true` means the circuit is closed; polarity is applied by the caller.
    fn limit_switch_closed(&mut self, direction: Direction) -> Result<bool, HardwareFault>;

    /// Apply native output and sensor inversion.
    fn set_inverted(&mut self, motor: bool, sensor: bool) -> Result<(), HardwareFault>;

    /// Apply the neutral output behavior.
    fn set_neutral_behavior(&mut self, behavior: NeutralBehavior) -> Result<(), HardwareFault>;
}

/// An open-loop speed controller.
pub trait PercentOutput {
    /// Drive at `fraction` of full output, in [-1.0, 1.0].
    fn set_percent(&mut self, fraction: f64) -> Result<(), HardwareFault>;

    /// Stop driving.
    fn set_neutral(&mut self) -> Result<(), HardwareFault>;

    /// Apply the neutral output behavior, if the device supports it.
    fn set_neutral_behavior(&mut self, _behavior: NeutralBehavior) -> Result<(), HardwareFault> {
        Ok(())
    }
}

/// A quadrature encoder counting in native units.
pub trait QuadratureEncoder {
    /// Current count.
    fn count(&mut self) -> Result<i64, HardwareFault>;

    /// Counts per native time base.
    fn rate(&mut self) -> Result<f64, HardwareFault>;

    /// Overwrite the current count.
    fn set_count(&mut self, count: i64) -> Result<(), HardwareFault>;
}

/// A single limit switch input.
pub trait SwitchInput {
    /// `true` if the switch circuit is closed.
    fn is_closed(&mut self) -> Result<bool, HardwareFault>;
}

/// Limit switch on a GPIO pin, wired to ground with a pull-up.
///
/// A closed circuit reads low.
pub struct LimitSwitch<P: InputPin> {
    pin: P,
}

impl<P: InputPin> LimitSwitch<P> {
    /// Wrap an input pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> SwitchInput for LimitSwitch<P> {
    fn is_closed(&mut self) -> Result<bool, HardwareFault> {
        self.pin.is_low().map_err(|_| HardwareFault::Pin)
    }
}

/// Placeholder for a switch that is not connected; always reads open.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unwired;

impl SwitchInput for Unwired {
    fn is_closed(&mut self) -> Result<bool, HardwareFault> {
        Ok(false)
    }
}

/// RC-style PWM speed controller on one PWM channel.
///
/// Full reverse, neutral and full forward map to three duty cycles; the
/// default is 1.0 ms / 1.5 ms / 2.0 ms pulses in a 20 ms period.
pub struct PwmMotor<P: SetDutyCycle> {
    pwm: P,
    reverse_duty: u16,
    neutral_duty: u16,
    forward_duty: u16,
}

impl<P: SetDutyCycle> PwmMotor<P> {
    /// Standard servo-style pulse widths (5%, 7.5%, 10% of the period).
    pub fn new(pwm: P) -> Self {
        let max = u32::from(pwm.max_duty_cycle());
        let at = |per_mille: u32| (max * per_mille / 1000) as u16;
        Self {
            reverse_duty: at(50),
            neutral_duty: at(75),
            forward_duty: at(100),
            pwm,
        }
    }

    /// Custom duty cycles for full reverse, neutral and full forward.
    pub fn with_duty_cycles(pwm: P, reverse: u16, neutral: u16, forward: u16) -> Self {
        Self {
            pwm,
            reverse_duty: reverse,
            neutral_duty: neutral,
            forward_duty: forward,
        }
    }

    /// Duty cycle that represents `fraction` of full output.
    pub fn duty_for(&self, fraction: f64) -> u16 {
        let fraction = fraction.clamp(-1.0, 1.0);
        let neutral = f64::from(self.neutral_duty);
        let span = if fraction >= 0.0 {
            f64::from(self.forward_duty) - neutral
        } else {
            neutral - f64::from(self.reverse_duty)
        };
        libm::round(neutral + fraction * span) as u16
    }

    /// Release the PWM channel.
    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> PercentOutput for PwmMotor<P> {
    fn set_percent(&mut self, fraction: f64) -> Result<(), HardwareFault> {
        let duty = self.duty_for(fraction);
        self.pwm.set_duty_cycle(duty).map_err(|_| HardwareFault::Pwm)
    }

    fn set_neutral(&mut self) -> Result<(), HardwareFault> {
        self.pwm
            .set_duty_cycle(self.neutral_duty)
            .map_err(|_| HardwareFault::Pwm)
    }
}
