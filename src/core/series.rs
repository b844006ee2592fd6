//! Normalized series and the dataset layout published to disk

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Top-level key holding the metadata record.
pub const META_KEY: &str = "meta";

/// One dated value. Serialized as `["YYYY-MM-DD", value]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(NaiveDate, f64)", into = "(NaiveDate, f64)")]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

impl From<(NaiveDate, f64)> for Observation {
    fn from((date, value): (NaiveDate, f64)) -> Self {
        Self { date, value }
    }
}

impl From<Observation> for (NaiveDate, f64) {
    fn from(obs: Observation) -> Self {
        (obs.date, obs.value)
    }
}

/// Observations of one ticker, ascending by date with no duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<Observation>);

impl Series {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.0.iter()
    }
}

impl FromIterator<Observation> for Series {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    pub last_updated_utc: String,
}

impl Metadata {
    pub fn new(source: &str, now: DateTime<Utc>) -> Self {
        Self {
            source: source.to_string(),
            last_updated_utc: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Ticker series plus a metadata header, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub meta: Metadata,
    series: Vec<(String, Series)>,
}

impl Dataset {
    pub fn new(meta: Metadata) -> Self {
        Self {
            meta,
            series: Vec::new(),
        }
    }

    /// Adds or replaces the series for `ticker`. A replaced ticker keeps its position.
    pub fn insert(&mut self, ticker: &str, series: Series) {
        match self.series.iter_mut().find(|(name, _)| name == ticker) {
            Some(entry) => entry.1 = series,
            None => self.series.push((ticker.to_string(), series)),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&Series> {
        self.series
            .iter()
            .find(|(name, _)| name == ticker)
            .map(|(_, series)| series)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.series.iter().map(|(name, series)| (name.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// Metadata goes first. A ticker named like the metadata key takes its slot.
impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shadowed_meta = self.get(META_KEY);
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        match shadowed_meta {
            Some(series) => map.serialize_entry(META_KEY, series)?,
            None => map.serialize_entry(META_KEY, &self.meta)?,
        }
        for (ticker, series) in self.iter().filter(|(name, _)| *name != META_KEY) {
            map.serialize_entry(ticker, series)?;
        }
        map.end()
    }
}

/// Value found under the metadata key: the header, or a ticker that took its slot.
#[derive(Deserialize)]
#[serde(untagged)]
enum MetaSlot {
    Meta(Metadata),
    Ticker(Series),
}

// Key order is kept. A file whose metadata slot holds a ticker reads back with
// empty metadata.
impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatasetVisitor;

        impl<'de> Visitor<'de> for DatasetVisitor {
            type Value = Dataset;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of ticker series with a metadata entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dataset, A::Error> {
                let mut meta = None;
                let mut series = Vec::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == META_KEY {
                        match access.next_value::<MetaSlot>()? {
                            MetaSlot::Meta(value) => meta = Some(value),
                            MetaSlot::Ticker(value) => {
                                meta.get_or_insert_with(Metadata::default);
                                series.push((key, value));
                            }
                        }
                    } else {
                        let value = access.next_value::<Series>()?;
                        series.push((key, value));
                    }
                }
                let meta = meta.ok_or_else(|| de::Error::missing_field(META_KEY))?;
                Ok(Dataset { meta, series })
            }
        }

        deserializer.deserialize_map(DatasetVisitor)
    }
}
