use crate::error::Result;
use crate::snapshot::Snapshot;
use prometheus::{Encoder, Gauge, IntGauge, Opts, Registry, TextEncoder};

/// Prometheus sink for valid snapshots.
///
/// `observe` is called synchronously by the hub for every valid snapshot;
/// gauge updates are cheap and never fail, so the call cannot stall the
/// distribution loop. The exporter owns its own registry so that tests can
/// create as many instances as they like.
#[derive(Clone)]
pub struct MetricsExporter {
    registry: Registry,

    in_voltage: Gauge,
    in_current: Gauge,
    in_frequency: Gauge,
    out_voltage: Gauge,
    out_current: Gauge,
    out_frequency: Gauge,
    bat_voltage: Gauge,
    bat_current: Gauge,
    charge_state: Gauge,
    device_errors: IntGauge,
}

impl MetricsExporter {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let gauge = |name: &str, help: &str| -> Result<Gauge> {
            let g = Gauge::with_opts(Opts::new(name, help))?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };

        let in_voltage = gauge("inverter_in_voltage_volts", "Mains input voltage")?;
        let in_current = gauge("inverter_in_current_amps", "Mains input current")?;
        let in_frequency = gauge("inverter_in_frequency_hertz", "Mains input frequency")?;
        let out_voltage = gauge("inverter_out_voltage_volts", "Inverter output voltage")?;
        let out_current = gauge("inverter_out_current_amps", "Inverter output current")?;
        let out_frequency = gauge("inverter_out_frequency_hertz", "Inverter output frequency")?;
        let bat_voltage = gauge("inverter_bat_voltage_volts", "Battery voltage")?;
        let bat_current = gauge("inverter_bat_current_amps", "Battery current")?;
        let charge_state = gauge(
            "inverter_bat_charge_ratio",
            "Battery state of charge as a fraction in 0..1",
        )?;

        let device_errors = IntGauge::with_opts(Opts::new(
            "inverter_device_errors",
            "Number of error conditions reported in the last valid snapshot",
        ))?;
        registry.register(Box::new(device_errors.clone()))?;

        Ok(Self {
            registry,
            in_voltage,
            in_current,
            in_frequency,
            out_voltage,
            out_current,
            out_frequency,
            bat_voltage,
            bat_current,
            charge_state,
            device_errors,
        })
    }

    /// Push one valid snapshot into the gauges.
    pub fn observe(&self, status: &Snapshot) {
        self.in_voltage.set(status.in_voltage);
        self.in_current.set(status.in_current);
        self.in_frequency.set(status.in_frequency);
        self.out_voltage.set(status.out_voltage);
        self.out_current.set(status.out_current);
        self.out_frequency.set(status.out_frequency);
        self.bat_voltage.set(status.bat_voltage);
        self.bat_current.set(status.bat_current);
        self.charge_state.set(status.charge_state);
        self.device_errors.set(status.errors.len() as i64);
    }

    /// Render the text exposition format for the /metrics endpoint.
    pub fn gather(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
