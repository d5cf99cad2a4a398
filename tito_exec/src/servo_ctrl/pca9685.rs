//! [`ServoDriver`] implementation for the PCA9685 driver
//!
//! The board must be set to a 50 Hz output with [`configure`] before use.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use pwm_pca9685::{Channel, Pca9685};
use embedded_hal::blocking::i2c::{Write, WriteRead};

use super::{ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of counts in a single PWM period.
const PWM_COUNTS: u16 = 4096;

/// Prescale value giving a 50 Hz output from the 25 MHz internal oscillator.
pub const SERVO_PRESCALE: u8 = 121;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Set the board's output frequency for servos and enable its oscillator.
pub fn configure<I2C, E>(pwm: &mut Pca9685<I2C>) -> Result<(), ServoError>
where 
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    pwm.set_prescale(SERVO_PRESCALE).map_err(|_| ServoError::I2c)?;
    pwm.enable().map_err(|_| ServoError::I2c)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where 
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    type Channel = Channel;

    fn set_duty_cycle(
        &mut self, 
        channel: Self::Channel, 
        duty_cycle: f64
    ) -> Result<(), ServoError> {

        // If the duty cycle is out of range return an error
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ServoError::InvalidDutyCycle)
        }

        // The last representable off count is one less than the period
        let off = ((duty_cycle * PWM_COUNTS as f64) as u16).min(PWM_COUNTS - 1);

        match self.set_channel_on_off(channel, 0, off) {
            Ok(_) => Ok(()),
            Err(pwm_pca9685::Error::I2C(_)) => Err(ServoError::I2c),
            Err(pwm_pca9685::Error::InvalidInputData) => Err(ServoError::InvalidDutyCycle)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pwm_pca9685::Address;

    /// Bus which records every write and reads back zeros.
    #[derive(Default)]
    struct MockBus {
        writes: Vec<Vec<u8>>
    }

    impl Write for MockBus {
        type Error = ();

        fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), ()> {
            self.writes.push(bytes.to_vec());
            Ok(())
        }
    }

    impl WriteRead for MockBus {
        type Error = ();

        fn write_read(&mut self, _address: u8, _bytes: &[u8], buffer: &mut [u8]) -> Result<(), ()> {
            buffer.iter_mut().for_each(|b| *b = 0);
            Ok(())
        }
    }

    fn board() -> Pca9685<MockBus> {
        Pca9685::new(MockBus::default(), Address::default()).unwrap()
    }

    #[test]
    fn test_configure_and_set() {
        let mut pwm = board();

        configure(&mut pwm).unwrap();

        // 1.5 ms of a 20 ms period
        pwm.set_duty_cycle(Channel::C0, 0.075).unwrap();

        let bus = pwm.destroy();
        assert_eq!(bus.writes, vec![
            vec![0xFE, SERVO_PRESCALE],
            vec![0x00, 0x01],
            vec![0x00, 0x21],
            vec![0x06, 0x00, 0x00, 0x33, 0x01],
        ]);
    }

    #[test]
    fn test_full_duty_cycle_capped() {
        let mut pwm = board();
        configure(&mut pwm).unwrap();

        pwm.set_duty_cycle(Channel::C1, 1.0).unwrap();

        let bus = pwm.destroy();
        assert_eq!(bus.writes.last(), Some(&vec![0x0A, 0x00, 0x00, 0xFF, 0x0F]));
    }

    #[test]
    fn test_invalid_duty_cycle() {
        let mut pwm = board();
        configure(&mut pwm).unwrap();

        assert!(matches!(
            pwm.set_duty_cycle(Channel::C0, 1.5),
            Err(ServoError::InvalidDutyCycle)
        ));
        assert!(matches!(
            pwm.set_duty_cycle(Channel::C0, -0.1),
            Err(ServoError::InvalidDutyCycle)
        ));

        // Nothing past the configuration reached the bus
        assert_eq!(pwm.destroy().writes.len(), 2);
    }
}
