//! Serial line settings

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopBits {
    One,
    Two,
}

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl DataBits {
    pub fn count(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            _ => Err(Error::Validation(format!("Unsupported data bits: {}", value))),
        }
    }
}

impl StopBits {
    pub fn count(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for StopBits {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            _ => Err(Error::Validation(format!("Unsupported stop bits: {}", value))),
        }
    }
}

impl Parity {
    /// Single-letter form used in `9600-8-N-1` notation
    pub fn letter(self) -> char {
        match self {
            Self::None => 'N',
            Self::Odd => 'O',
            Self::Even => 'E',
        }
    }
}

impl FromStr for Parity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "none" => Ok(Self::None),
            "o" | "odd" => Ok(Self::Odd),
            "e" | "even" => Ok(Self::Even),
            other => Err(Error::Parse(format!("Unknown parity: {:?}", other))),
        }
    }
}

/// Serial line configuration
///
/// CCNET bill acceptors talk 9600 baud, 8 data bits, no parity, 1 stop bit,
/// which is what [`SerialConfig::default`] returns.
///
/// # Examples
///
/// ```
/// use ccnet_types::{Parity, SerialConfig};
///
/// let config: SerialConfig = "19200-8-E-1".parse().unwrap();
/// assert_eq!(config.baud_rate, 19200);
/// assert_eq!(config.parity, Parity::Even);
/// assert_eq!(config.to_string(), "19200-8-E-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl SerialConfig {
    /// Baud rate used by CCNET devices out of the box
    pub const DEFAULT_BAUD_RATE: u32 = 9600;

    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }

    pub fn with_data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Reject settings no serial driver can apply
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::Validation("Baud rate must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: Self::DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

impl fmt::Display for SerialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.baud_rate,
            self.data_bits.count(),
            self.parity.letter(),
            self.stop_bits.count()
        )
    }
}

/// Accepts `baud-data-parity-stop`, separated by `-`, `,` or `:`.
/// Trailing fields may be omitted and fall back to 8-N-1.
impl FromStr for SerialConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s
            .split(|c: char| c == '-' || c == ',' || c == ':')
            .map(str::trim);

        let baud = fields
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| Error::Parse("Missing baud rate".into()))?;
        let baud_rate = baud
            .parse::<u32>()
            .map_err(|e| Error::Parse(format!("Invalid baud rate {:?}: {}", baud, e)))?;

        let mut config = Self::new(baud_rate);

        if let Some(bits) = fields.next() {
            let bits = bits
                .parse::<u8>()
                .map_err(|e| Error::Parse(format!("Invalid data bits {:?}: {}", bits, e)))?;
            config.data_bits = DataBits::try_from(bits)?;
        }
        if let Some(parity) = fields.next() {
            config.parity = parity.parse()?;
        }
        if let Some(stop) = fields.next() {
            let stop = stop
                .parse::<u8>()
                .map_err(|e| Error::Parse(format!("Invalid stop bits {:?}: {}", stop, e)))?;
            config.stop_bits = StopBits::try_from(stop)?;
        }
        if let Some(extra) = fields.next() {
            return Err(Error::Parse(format!("Unexpected trailing field {:?}", extra)));
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_ccnet_line() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.to_string(), "9600-8-N-1");
    }

    #[test]
    fn test_parse_full() {
        let config: SerialConfig = "9600,7,o,2".parse().unwrap();
        assert_eq!(
            config,
            SerialConfig::new(9600)
                .with_data_bits(DataBits::Seven)
                .with_parity(Parity::Odd)
                .with_stop_bits(StopBits::Two)
        );
    }

    #[test]
    fn test_parse_baud_only() {
        let config: SerialConfig = "115200".parse().unwrap();
        assert_eq!(config, SerialConfig::new(115200));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("".parse::<SerialConfig>(), Err(Error::Parse(_))));
        assert!(matches!("fast".parse::<SerialConfig>(), Err(Error::Parse(_))));
        assert!(matches!("9600-9".parse::<SerialConfig>(), Err(Error::Validation(_))));
        assert!(matches!("9600-8-X".parse::<SerialConfig>(), Err(Error::Parse(_))));
        assert!(matches!("9600-8-N-1-1".parse::<SerialConfig>(), Err(Error::Parse(_))));
        assert!(matches!("0".parse::<SerialConfig>(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_display_round_trip() {
        let config = SerialConfig::new(19200).with_parity(Parity::Even);
        assert_eq!(config.to_string().parse::<SerialConfig>().unwrap(), config);
    }
}
