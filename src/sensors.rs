// Sensor suite: DS18B20 on a one-wire bus (primary temperature) and
// DHT22 (secondary temperature + humidity).
//
// Reads never propagate errors: a failed conversion is logged and
// answered with `None`, and the DS18B20 address is re-scanned lazily
// so a flaky bus recovers on its own.

use anyhow::{anyhow, Result};
use ds18b20::{Ds18b20, Resolution};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
use log::{info, warn};
use one_wire_bus::{Address, OneWire};

/// One DHT22 conversion from the secondary sensor.
pub struct Reading {
    pub temperature: f32,
    pub humidity: f32,
}

pub struct SensorSuite {
    one_wire: OneWire<PinDriver<'static, AnyIOPin, InputOutput>>,
    ds_address: Option<Address>,
    dht_pin: PinDriver<'static, AnyIOPin, InputOutput>,
    delay: Ets,
}

impl SensorSuite {
    pub fn new(primary_pin: AnyIOPin, secondary_pin: AnyIOPin) -> Result<Self> {
        let mut one_wire_pin = PinDriver::input_output_od(primary_pin)?;
        one_wire_pin.set_pull(Pull::Up)?;
        one_wire_pin.set_high()?;

        let mut dht_pin = PinDriver::input_output_od(secondary_pin)?;
        dht_pin.set_pull(Pull::Up)?;
        dht_pin.set_high()?;

        let one_wire = OneWire::new(one_wire_pin)
            .map_err(|err| anyhow!("failed to initialize one-wire bus: {err:?}"))?;

        let mut suite = Self {
            one_wire,
            ds_address: None,
            dht_pin,
            delay: Ets,
        };
        suite.refresh_ds_address();
        Ok(suite)
    }

    fn refresh_ds_address(&mut self) {
        let mut first_ds: Option<Address> = None;
        for addr in self.one_wire.devices(false, &mut self.delay) {
            match addr {
                Ok(address) => {
                    if address.family_code() == ds18b20::FAMILY_CODE {
                        first_ds = Some(address);
                        break;
                    }
                }
                Err(err) => {
                    warn!("one-wire device scan failed: {err:?}");
                    break;
                }
            }
        }

        self.ds_address = first_ds;
        match self.ds_address {
            Some(address) => info!("DS18B20 ready, using {:?}", address),
            None => warn!("no DS18B20 found on the one-wire bus"),
        }
    }

    /// Primary temperature in Celsius; `None` on any bus failure.
    pub fn read_primary(&mut self) -> Option<f32> {
        if self.ds_address.is_none() {
            self.refresh_ds_address();
        }
        let address = self.ds_address?;

        let sensor = match Ds18b20::new::<core::convert::Infallible>(address) {
            Ok(sensor) => sensor,
            Err(err) => {
                warn!("invalid DS18B20 address {:?}: {err:?}", address);
                self.ds_address = None;
                return None;
            }
        };

        if let Err(err) =
            ds18b20::start_simultaneous_temp_measurement(&mut self.one_wire, &mut self.delay)
        {
            warn!("failed to start DS18B20 conversion: {err:?}");
            self.ds_address = None;
            return None;
        }

        Resolution::Bits12.delay_for_measurement_time(&mut self.delay);

        match sensor.read_data(&mut self.one_wire, &mut self.delay) {
            Ok(data) => Some(data.temperature),
            Err(err) => {
                warn!("failed to read DS18B20 data: {err:?}");
                self.ds_address = None;
                None
            }
        }
    }

    /// Secondary temperature + humidity; `None` on a failed or
    /// checksum-broken conversion.
    pub fn read_secondary(&mut self) -> Option<Reading> {
        if let Err(err) = self.dht_pin.set_high() {
            warn!("failed to raise DHT22 line before read: {err:?}");
            return None;
        }

        match dht_sensor::dht22::blocking::read(&mut self.delay, &mut self.dht_pin) {
            Ok(r) => Some(Reading {
                temperature: r.temperature,
                humidity: r.relative_humidity,
            }),
            Err(err) => {
                warn!("DHT22 read failed: {err:?}");
                None
            }
        }
    }
}
