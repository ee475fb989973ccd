use std::fmt;
use std::str::FromStr;

use crate::domain::validation::ValidationError;

#[derive(Clone, PartialEq, Eq, Hash)]
/// SiteHost API key (`apikey`).
///
/// Invariant: non-empty after trimming. `Debug` never prints the key.
pub struct ApiKey(String);

impl ApiKey {
    /// Wire parameter name used by SiteHost (`apikey`).
    pub const FIELD: &'static str = "apikey";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Numeric account identifier (`client_id`) every request is made on behalf of.
pub struct ClientId(u32);

impl ClientId {
    /// Wire parameter name used by SiteHost (`client_id`).
    pub const FIELD: &'static str = "client_id";

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for ClientId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidClientId {
                input: s.to_owned(),
            })
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Server name as assigned by SiteHost (e.g. `ch-example1`).
///
/// Invariant: non-empty after trimming.
pub struct ServerName(String);

impl ServerName {
    pub const FIELD: &'static str = "name";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identifier of a server-side asynchronous job.
pub struct JobId(u64);

impl JobId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Queue a job runs on. Mutating server calls create `daemon` jobs.
pub enum JobType {
    #[default]
    Daemon,
    Scheduler,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daemon => "daemon",
            Self::Scheduler => "scheduler",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "daemon" => Some(Self::Daemon),
            "scheduler" => Some(Self::Scheduler),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
/// Lifecycle state reported for a job.
///
/// Unknown states are preserved and treated as still running.
pub enum JobState {
    #[default]
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl JobState {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "Pending" => Self::Pending,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Other(value) => value,
        }
    }

    /// `Completed` and `Failed` end the job; everything else keeps it pending.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A wire scalar could not be decoded into its semantic type.
pub struct ScalarError {
    codec: &'static str,
    raw: String,
}

impl ScalarError {
    pub(crate) fn new(codec: &'static str, raw: impl Into<String>) -> Self {
        Self {
            codec,
            raw: raw.into(),
        }
    }

    /// Name of the codec that rejected the input (`api date`, `mac address`, ...).
    pub fn codec(&self) -> &'static str {
        self.codec
    }

    /// The wire text exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.codec, self.raw)
    }
}

impl std::error::Error for ScalarError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Hardware address of 6 (EUI-48), 8 (EUI-64) or 20 (IPoIB) bytes.
pub struct MacAddress(Vec<u8>);

impl MacAddress {
    const CODEC: &'static str = "mac address";

    /// Parse colon (`00:00:5e:00:53:01`), hyphen (`00-00-5e-00-53-01`) or dot
    /// (`0000.5e00.5301`) notation.
    pub fn parse(input: &str) -> Result<Self, ScalarError> {
        let err = || ScalarError::new(Self::CODEC, input);
        let bytes = input.as_bytes();
        if bytes.len() < 14 {
            return Err(err());
        }

        let (group, separator) = match (bytes[2], bytes[4]) {
            (b':' | b'-', _) => (2, bytes[2]),
            (_, b'.') => (4, b'.'),
            _ => return Err(err()),
        };

        let stride = group + 1;
        if (bytes.len() + 1) % stride != 0 {
            return Err(err());
        }
        let len = (bytes.len() + 1) / stride * (group / 2);
        if !matches!(len, 6 | 8 | 20) {
            return Err(err());
        }

        let mut out = Vec::with_capacity(len);
        for chunk in bytes.split(|b| *b == separator) {
            if chunk.len() != group {
                return Err(err());
            }
            for pair in chunk.chunks(2) {
                out.push(hex_pair(pair[0], pair[1]).ok_or_else(err)?);
            }
        }
        if out.len() != len {
            return Err(err());
        }
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, byte) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let digit = |b: u8| (b as char).to_digit(16).map(|d| d as u8);
    Some(digit(hi)? << 4 | digit(lo)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// A `WxH` pair such as the VNC screen size `800x600`.
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    const CODEC: &'static str = "dimensions";

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse `<uint>x<uint>`; exactly one `x` is allowed.
    pub fn parse(input: &str) -> Result<Self, ScalarError> {
        let err = || ScalarError::new(Self::CODEC, input);
        let mut parts = input.split('x');
        let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(err());
        };
        Ok(Self {
            width: parse_unsigned(width).ok_or_else(err)?,
            height: parse_unsigned(height).ok_or_else(err)?,
        })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Decimal digits only; `u32::from_str` alone would also accept a leading `+`.
pub(crate) fn parse_unsigned<T: FromStr>(value: &str) -> Option<T> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EUI48: [u8; 6] = [0x00, 0x00, 0x5e, 0x00, 0x53, 0x01];
    const EUI64: [u8; 8] = [0x02, 0x00, 0x5e, 0x10, 0x00, 0x00, 0x00, 0x01];
    const IPOIB: [u8; 20] = [
        0x00, 0x00, 0x00, 0x00, 0xfe, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x5e,
        0x10, 0x00, 0x00, 0x00, 0x01,
    ];

    #[test]
    fn string_newtypes_trim_or_validate() {
        let key = ApiKey::new("  key ").unwrap();
        assert_eq!(key.as_str(), "key");
        assert!(ApiKey::new("  ").is_err());
        assert_eq!(format!("{key:?}"), "ApiKey(..)");

        let name = ServerName::new(" ch-example ").unwrap();
        assert_eq!(name.as_str(), "ch-example");
        assert!(ServerName::new("").is_err());
    }

    #[test]
    fn client_id_parses_decimal() {
        assert_eq!("970180".parse::<ClientId>().unwrap(), ClientId::new(970180));
        assert!(matches!(
            "abc".parse::<ClientId>(),
            Err(ValidationError::InvalidClientId { .. })
        ));
    }

    #[test]
    fn job_state_maps_wire_strings() {
        assert_eq!(JobState::from_wire("Pending"), JobState::Pending);
        assert_eq!(JobState::from_wire("Completed"), JobState::Completed);
        assert_eq!(JobState::from_wire("Failed"), JobState::Failed);
        let other = JobState::from_wire("Running");
        assert_eq!(other.as_str(), "Running");
        assert!(!other.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn mac_accepts_every_notation_and_length() {
        let cases: [(&str, &[u8]); 9] = [
            ("00:00:5e:00:53:01", &EUI48),
            ("00-00-5e-00-53-01", &EUI48),
            ("0000.5e00.5301", &EUI48),
            ("02:00:5e:10:00:00:00:01", &EUI64),
            ("02-00-5e-10-00-00-00-01", &EUI64),
            ("0200.5e10.0000.0001", &EUI64),
            (
                "00:00:00:00:fe:80:00:00:00:00:00:00:02:00:5e:10:00:00:00:01",
                &IPOIB,
            ),
            (
                "00-00-00-00-fe-80-00-00-00-00-00-00-02-00-5e-10-00-00-00-01",
                &IPOIB,
            ),
            ("0000.0000.fe80.0000.0000.0000.0200.5e10.0000.0001", &IPOIB),
        ];
        for (input, want) in cases {
            let mac = MacAddress::parse(input).unwrap_or_else(|err| panic!("{input}: {err}"));
            assert_eq!(mac.as_bytes(), want, "{input}");
        }
    }

    #[test]
    fn mac_rejects_malformed_input() {
        for input in [
            "",
            "00:00:5e:00:53",
            "00:00:5e:00:53:01:02",
            "00:00-5e:00:53:01",
            "0000.5e00.530",
            "00:00:5e:00:53:zz",
            "0000:5e00:5301",
            "00:00:5e:00:53:01:",
        ] {
            let err = MacAddress::parse(input).unwrap_err();
            assert_eq!(err.codec(), "mac address");
            assert_eq!(err.raw(), input);
        }
    }

    #[test]
    fn mac_displays_in_colon_notation() {
        let mac = MacAddress::parse("0000.5e00.5301").unwrap();
        assert_eq!(mac.to_string(), "00:00:5e:00:53:01");
    }

    #[test]
    fn dimensions_round_trip_through_text() {
        for (w, h) in [(800, 600), (0, 0), (1, u32::MAX), (1920, 1080)] {
            let dims = Dimensions::new(w, h);
            assert_eq!(Dimensions::parse(&dims.to_string()).unwrap(), dims);
        }
        assert_eq!(Dimensions::new(800, 600).to_string(), "800x600");
    }

    #[test]
    fn dimensions_require_exactly_one_separator() {
        for input in ["800", "800x600x1", "x600", "800x", "+800x600", "800X600", "-1x2", ""] {
            assert!(Dimensions::parse(input).is_err(), "{input}");
        }
    }
}
