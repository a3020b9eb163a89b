//! Descriptive statistics over measurement sets
//!
//! Pure reducer used for the tables and reports shown next to every
//! check result. An empty input yields `count == 0` with all figures at
//! zero; callers treat that as "no data".

use serde::{Deserialize, Serialize};

use crate::models::Measurement;

/// Average, minimum and maximum of one metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary of download, upload and latency over a measurement set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub download: MetricSummary,
    pub upload: MetricSummary,
    pub latency: MetricSummary,
}

impl Statistics {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    #[inline]
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(self, count: usize) -> MetricSummary {
        MetricSummary {
            avg: self.sum / count as f64,
            min: self.min,
            max: self.max,
        }
    }
}

/// Compute count/avg/min/max for download, upload and latency.
pub fn aggregate<'a, I>(measurements: I) -> Statistics
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut count = 0usize;
    let mut download = Accumulator::new();
    let mut upload = Accumulator::new();
    let mut latency = Accumulator::new();

    for m in measurements {
        count += 1;
        download.push(m.download);
        upload.push(m.upload);
        latency.push(m.latency);
    }

    if count == 0 {
        return Statistics::default();
    }

    Statistics {
        count,
        download: download.finish(count),
        upload: upload.finish(count),
        latency: latency.finish(count),
    }
}
