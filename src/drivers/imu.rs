// MotionWatch: LSM6DS3 IMU Driver
//
// Register-level driver over an owned ESP-IDF I2C driver.

use esp_idf_hal::i2c::I2cDriver;

use crate::config::*;
use crate::sample::Axes;
use crate::sensor::MotionBus;

// LSM6DS3 register addresses
const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL1_XL: u8 = 0x10;
const REG_CTRL2_G: u8 = 0x11;
const REG_CTRL3_C: u8 = 0x12;
const REG_OUTX_L_G: u8 = 0x22; // Start of 12-byte gyro + accel burst
const WHO_AM_I_LSM6DS3: u8 = 0x69;
const WHO_AM_I_LSM6DS3TR_C: u8 = 0x6A;

// CTRL3_C: block data update + register auto-increment
const CTRL3_C_BDU_IF_INC: u8 = 0x44;

pub struct Lsm6ds3<'d> {
    i2c: I2cDriver<'d>,
}

impl<'d> Lsm6ds3<'d> {
    pub fn new(i2c: I2cDriver<'d>) -> Self {
        Self { i2c }
    }

    /// Verify the device answers with a known WHO_AM_I.
    pub fn is_connected(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self
            .i2c
            .write_read(I2C_ADDR_LSM6DS3, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS)
        {
            Ok(()) => matches!(buf[0], WHO_AM_I_LSM6DS3 | WHO_AM_I_LSM6DS3TR_C),
            Err(_) => false,
        }
    }

    fn write_register(&mut self, reg: u8, value: u8) -> anyhow::Result<()> {
        self.i2c
            .write(I2C_ADDR_LSM6DS3, &[reg, value], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}

impl MotionBus for Lsm6ds3<'_> {
    /// 104 Hz normal mode: accel +-4 g, gyro +-500 dps.
    fn configure(&mut self) -> anyhow::Result<()> {
        if !self.is_connected() {
            anyhow::bail!("LSM6DS3 not found at {:#04x}", I2C_ADDR_LSM6DS3);
        }

        self.write_register(REG_CTRL3_C, CTRL3_C_BDU_IF_INC)?;
        self.write_register(REG_CTRL1_XL, LSM6DS3_CTRL1_XL_104HZ_4G)?;
        self.write_register(REG_CTRL2_G, LSM6DS3_CTRL2_G_104HZ_500DPS)?;

        log::info!("LSM6DS3 initialised (104Hz, ±4g, ±500°/s)");
        Ok(())
    }

    /// Burst-read gyro then accel and convert to m/s^2 and deg/s.
    fn read_axes(&mut self) -> anyhow::Result<Axes> {
        let mut raw = [0u8; 12];
        self.i2c
            .write_read(I2C_ADDR_LSM6DS3, &[REG_OUTX_L_G], &mut raw, I2C_TIMEOUT_TICKS)?;

        let word = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]) as f32;
        Ok(Axes {
            gx: word(0) * GYRO_SCALE_500,
            gy: word(2) * GYRO_SCALE_500,
            gz: word(4) * GYRO_SCALE_500,
            ax: word(6) * ACCEL_SCALE_4G,
            ay: word(8) * ACCEL_SCALE_4G,
            az: word(10) * ACCEL_SCALE_4G,
        })
    }
}
