//! PIN database and matching
//!
//! Every four-digit PIN is reduced to the three direction classes of its key
//! transitions. Recognised directions are matched against that table, and the
//! matches are reported most common PIN first.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::direction::{DirectionClass, distance_label, keypad_delta};
use crate::error::{Error, Result};

/// Number of digits in a PIN
pub const PIN_LENGTH: usize = 4;

/// Relative popularity of PINs
///
/// Any `Fn(&str) -> u64` is a frequency source.
pub trait FrequencySource {
    fn frequency(&self, pin: &str) -> u64;
}

impl<F> FrequencySource for F
where
    F: Fn(&str) -> u64,
{
    fn frequency(&self, pin: &str) -> u64 {
        self(pin)
    }
}

/// PIN frequencies read from a `pin,frequency` CSV; unknown PINs count zero
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    frequencies: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pin: &str, frequency: u64) -> Result<()> {
        validate_pin(pin)?;
        self.frequencies.insert(pin.to_string(), frequency);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Parse a two-column table; a leading header row is skipped
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::new();
        for (row, record) in csv.records().enumerate() {
            let record = record?;
            match record.deserialize::<FrequencyRow>(None) {
                Ok(FrequencyRow { pin, frequency }) => table.insert(&pin, frequency)?,
                Err(_) if row == 0 => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(table)
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(std::fs::File::open(path)?)?;
        info!("loaded {} PIN frequencies from {}", table.len(), path.display());
        Ok(table)
    }
}

impl FrequencySource for FrequencyTable {
    fn frequency(&self, pin: &str) -> u64 {
        self.frequencies.get(pin).copied().unwrap_or(0)
    }
}

/// One `pin,frequency` row of a frequency table
#[derive(Debug, Deserialize)]
struct FrequencyRow {
    pin: String,
    frequency: u64,
}

/// One PIN with its popularity and transition labels
///
/// Serialized as the flat row `pin,frequency,d1,d2,d3,m1,m2,m3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PinRow", try_from = "PinRow")]
pub struct PinRecord {
    pub pin: String,
    pub frequency: u64,
    pub directions: [DirectionClass; 3],
    /// Labeled magnitudes such as `R1D2`
    pub distances: [String; 3],
}

impl PinRecord {
    pub fn new(pin: &str, frequency: u64) -> Result<Self> {
        let (directions, distances) = generate_pin_directions(pin)?;
        Ok(Self {
            pin: pin.to_string(),
            frequency,
            directions,
            distances,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PinRow {
    pin: String,
    frequency: u64,
    d1: DirectionClass,
    d2: DirectionClass,
    d3: DirectionClass,
    m1: String,
    m2: String,
    m3: String,
}

impl From<PinRecord> for PinRow {
    fn from(record: PinRecord) -> Self {
        let [d1, d2, d3] = record.directions;
        let [m1, m2, m3] = record.distances;
        Self {
            pin: record.pin,
            frequency: record.frequency,
            d1,
            d2,
            d3,
            m1,
            m2,
            m3,
        }
    }
}

impl TryFrom<PinRow> for PinRecord {
    type Error = Error;

    fn try_from(row: PinRow) -> Result<Self> {
        validate_pin(&row.pin)?;
        Ok(Self {
            pin: row.pin,
            frequency: row.frequency,
            directions: [row.d1, row.d2, row.d3],
            distances: [row.m1, row.m2, row.m3],
        })
    }
}

/// Checks that `pin` is exactly four ASCII digits
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidPin(pin.to_string()))
    }
}

/// Direction class and labeled distance of each of the three transitions
///
/// # Example
/// ```
/// use imu_pin::{DirectionClass, generate_pin_directions};
///
/// let (directions, distances) = generate_pin_directions("1254").unwrap();
/// assert_eq!(directions, [DirectionClass::Right, DirectionClass::Down, DirectionClass::Left]);
/// assert_eq!(distances, ["R1".to_string(), "D1".to_string(), "L1".to_string()]);
/// ```
pub fn generate_pin_directions(pin: &str) -> Result<([DirectionClass; 3], [String; 3])> {
    validate_pin(pin)?;
    let digits: Vec<char> = pin.chars().collect();

    let mut directions = [DirectionClass::Same; 3];
    let mut distances: [String; 3] = Default::default();
    for (i, pair) in digits.windows(2).enumerate() {
        let (dx, dy) = keypad_delta(pair[0], pair[1]).ok_or_else(|| Error::InvalidPin(pin.to_string()))?;
        directions[i] = DirectionClass::from_delta(dx, dy);
        distances[i] = distance_label(dx, dy);
    }
    Ok((directions, distances))
}

/// Every PIN ranked by frequency, most frequent first
///
/// The order is fixed at construction and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinDatabase {
    records: Vec<PinRecord>,
    total_frequency: u64,
}

impl PinDatabase {
    /// Build the table of all 10,000 PINs
    ///
    /// The sort is stable, so PINs of equal frequency stay in ascending order.
    pub fn build(source: &impl FrequencySource) -> Result<Self> {
        let mut records = (0..10_000)
            .map(|n| {
                let pin = format!("{n:04}");
                let frequency = source.frequency(&pin);
                PinRecord::new(&pin, frequency)
            })
            .collect::<Result<Vec<_>>>()?;

        records.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        let database = Self::from_records(records)?;
        info!(
            "built PIN database of {} records, total frequency {}",
            database.len(),
            database.total_frequency
        );
        Ok(database)
    }

    /// Wrap records exactly in the given order
    ///
    /// Fails with [`Error::MalformedDatabase`] when the frequencies do not sum
    /// within `u64`.
    pub fn from_records(records: Vec<PinRecord>) -> Result<Self> {
        let total_frequency = records
            .iter()
            .try_fold(0u64, |total, record| total.checked_add(record.frequency))
            .ok_or_else(|| Error::MalformedDatabase("total frequency overflows u64".to_string()))?;
        Ok(Self {
            records,
            total_frequency,
        })
    }

    pub fn records(&self) -> &[PinRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    /// Records whose transitions equal `directions`, in database order
    pub fn matching_records(&self, directions: &[DirectionClass; 3]) -> Vec<&PinRecord> {
        self.records.iter().filter(|r| &r.directions == directions).collect()
    }

    /// PINs whose transitions equal `directions`, most frequent first
    pub fn get_matching_pins(&self, directions: &[DirectionClass; 3]) -> Vec<String> {
        self.matching_records(directions)
            .into_iter()
            .map(|r| r.pin.clone())
            .collect()
    }

    /// Draw a PIN with probability proportional to its frequency
    ///
    /// A uniform integer `r` in `[0, total]` selects the first record whose
    /// cumulative frequency reaches it.
    pub fn generate_frequency_pin<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.records.is_empty() {
            return None;
        }
        let target = rng.random_range(0..=self.total_frequency);

        // Bounded by the total, which was checked on construction
        let mut cumulative = 0u64;
        self.records
            .iter()
            .find(|record| {
                cumulative += record.frequency;
                cumulative >= target
            })
            .or(self.records.last())
            .map(|record| record.pin.as_str())
    }

    /// Write `pin,frequency,d1,d2,d3,m1,m2,m3` rows followed by a total row
    pub fn to_writer(&self, writer: impl Write) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);

        for record in &self.records {
            csv.serialize(record)?;
        }
        csv.write_record([self.total_frequency.to_string()])?;
        csv.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_writer(std::fs::File::create(path)?)?;
        info!("wrote PIN database of {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a table written by [`to_writer`](Self::to_writer)
    ///
    /// Row order is kept verbatim. The trailing total must equal the sum of
    /// the frequencies.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut total = None;
        for (row, record) in csv.records().enumerate() {
            let record = record?;
            let malformed = |message: &str| Error::MalformedDatabase(format!("row {}: {}", row + 1, message));

            if total.is_some() {
                return Err(malformed("rows after the total"));
            }
            if record.len() == 1 {
                let (value,): (u64,) = record
                    .deserialize(None)
                    .map_err(|_| malformed("total is not an integer"))?;
                total = Some(value);
            } else {
                let pin: PinRecord = record.deserialize(None).map_err(|err| malformed(&err.to_string()))?;
                records.push(pin);
            }
        }

        let database = Self::from_records(records)?;
        match total {
            None => Err(Error::MalformedDatabase("missing total row".to_string())),
            Some(total) if total != database.total_frequency => Err(Error::MalformedDatabase(format!(
                "total {} does not match frequency sum {}",
                total, database.total_frequency
            ))),
            Some(_) => Ok(database),
        }
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let database = Self::from_reader(std::fs::File::open(path)?)?;
        info!("loaded PIN database of {} records from {}", database.len(), path.display());
        Ok(database)
    }
}
