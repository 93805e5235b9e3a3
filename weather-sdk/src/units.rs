//! Temperature units and the provider's `units` query vocabulary.

use std::fmt;

/// Temperature unit requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit]
    }

    /// Lower-case name, accepted back by [`ProviderUnits::from_unit_name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values accepted by the provider's `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderUnits {
    Metric,
    Imperial,
    /// Kelvin; what the provider falls back to when no unit is given.
    #[default]
    Standard,
}

impl ProviderUnits {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderUnits::Metric => "metric",
            ProviderUnits::Imperial => "imperial",
            ProviderUnits::Standard => "standard",
        }
    }

    /// Map a free-form unit name onto the provider vocabulary.
    ///
    /// Never fails: anything that is not recognisably Celsius or Fahrenheit
    /// degrades to [`ProviderUnits::Standard`].
    pub fn from_unit_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "celsius" | "c" | "metric" => ProviderUnits::Metric,
            "fahrenheit" | "f" | "imperial" => ProviderUnits::Imperial,
            _ => ProviderUnits::Standard,
        }
    }
}

impl From<TemperatureUnit> for ProviderUnits {
    fn from(unit: TemperatureUnit) -> Self {
        match unit {
            TemperatureUnit::Celsius => ProviderUnits::Metric,
            TemperatureUnit::Fahrenheit => ProviderUnits::Imperial,
        }
    }
}

impl fmt::Display for ProviderUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes `(value - 32) * 5 / 9`.
///
/// NOTE: the name does not match the arithmetic, which is the
/// Fahrenheit-to-Celsius formula. Existing callers depend on the observed
/// input/output pairs (10.1 -> -12.1666..), so the arithmetic is kept as is
/// until the intended semantics are confirmed.
pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    (value - 32.0) * 5.0 / 9.0
}

/// Computes `9 * value / 5 + 32`.
///
/// NOTE: swapped like [`celsius_to_fahrenheit`]; this is the
/// Celsius-to-Fahrenheit formula (11.2 -> 52.16).
pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    9.0 * value / 5.0 + 32.0
}
