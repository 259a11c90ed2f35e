use serde::{Deserialize, Serialize};

/// Datadog intake metric type. Only gauges are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricIntakeType {
    Unspecified,
    Count,
    Rate,
    Gauge,
}

impl MetricIntakeType {
    pub const fn code(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::Count => 1,
            Self::Rate => 2,
            Self::Gauge => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Count),
            2 => Some(Self::Rate),
            3 => Some(Self::Gauge),
            _ => None,
        }
    }
}

impl Serialize for MetricIntakeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for MetricIntakeType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown metric intake type {code}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: String,
    #[serde(rename = "type")]
    pub kind: MetricIntakeType,
    pub points: Vec<MetricPoint>,
    pub tags: Vec<String>,
}

/// Body of `POST /api/v2/series`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPayload {
    pub series: Vec<MetricSeries>,
}

impl MetricPayload {
    /// One gauge series holding a single point.
    pub fn single_gauge(metric: String, value: f64, timestamp: i64, tags: Vec<String>) -> Self {
        Self {
            series: vec![MetricSeries {
                metric,
                kind: MetricIntakeType::Gauge,
                points: vec![MetricPoint { timestamp, value }],
                tags,
            }],
        }
    }
}
