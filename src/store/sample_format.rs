//! Serde format for [`MetricMap`] that keeps non-finite samples.
//!
//! JSON has no literal for NaN or infinity, so those samples are written as
//! the strings `"NaN"`, `"inf"` and `"-inf"`. Finite samples stay plain numbers.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::{MetricMap, TrialMap};

const NAN: &str = "NaN";
const INF: &str = "inf";
const NEG_INF: &str = "-inf";

pub(super) fn serialize<S: Serializer>(
    metrics: &MetricMap,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(metrics.iter().map(|(metric, trials)| (metric, Trials(trials))))
}

pub(super) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<MetricMap, D::Error> {
    let raw = indexmap::IndexMap::<String, indexmap::IndexMap<String, Vec<Sample>>>::deserialize(
        deserializer,
    )?;
    Ok(raw
        .into_iter()
        .map(|(metric, trials)| {
            let trials: TrialMap = trials
                .into_iter()
                .map(|(trial, samples)| (trial, samples.into_iter().map(|s| s.0).collect()))
                .collect();
            (metric, trials)
        })
        .collect())
}

struct Trials<'a>(&'a TrialMap);

impl Serialize for Trials<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(trial, samples)| (trial, Samples(samples))))
    }
}

struct Samples<'a>(&'a [f64]);

impl Serialize for Samples<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().copied().map(Sample))
    }
}

struct Sample(f64);

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            v if v.is_nan() => serializer.serialize_str(NAN),
            v if v == f64::INFINITY => serializer.serialize_str(INF),
            v if v == f64::NEG_INFINITY => serializer.serialize_str(NEG_INF),
            v => serializer.serialize_f64(v),
        }
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SampleVisitor)
    }
}

struct SampleVisitor;

impl Visitor<'_> for SampleVisitor {
    type Value = Sample;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"NaN\", \"inf\", \"-inf\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Sample, E> {
        Ok(Sample(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Sample, E> {
        Ok(Sample(v as f64))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Sample, E> {
        Ok(Sample(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Sample, E> {
        match v {
            NAN => Ok(Sample(f64::NAN)),
            INF => Ok(Sample(f64::INFINITY)),
            NEG_INF => Ok(Sample(f64::NEG_INFINITY)),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "super")] MetricMap);

    fn map(samples: Vec<f64>) -> MetricMap {
        let mut trials = TrialMap::new();
        trials.insert("trial-0".into(), samples);
        let mut metrics = MetricMap::new();
        metrics.insert("loss".into(), trials);
        metrics
    }

    #[test]
    fn test_non_finite_samples_as_strings() {
        let json = serde_json::to_string(&Wrapper(map(vec![
            1.5,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ])))
        .unwrap();
        assert_eq!(json, r#"{"loss":{"trial-0":[1.5,"NaN","inf","-inf"]}}"#);

        let Wrapper(restored) = serde_json::from_str(&json).unwrap();
        let samples = &restored["loss"]["trial-0"];
        assert_eq!(samples[0], 1.5);
        assert!(samples[1].is_nan());
        assert_eq!(samples[2], f64::INFINITY);
        assert_eq!(samples[3], f64::NEG_INFINITY);
    }

    #[test]
    fn test_integer_literals_accepted() {
        let Wrapper(restored) = serde_json::from_str(r#"{"m":{"trial-0":[80, -3]}}"#).unwrap();
        assert_eq!(restored["m"]["trial-0"], vec![80.0, -3.0]);
    }

    #[test]
    fn test_unknown_string_rejected() {
        let result = serde_json::from_str::<Wrapper>(r#"{"m":{"trial-0":["oops"]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_order_preserved() {
        let json = r#"{"zeta":{"trial-3":[1.0],"trial-1":[2.0]},"alpha":{"trial-0":[3.0]}}"#;
        let Wrapper(restored) = serde_json::from_str(json).unwrap();
        let metrics: Vec<&String> = restored.keys().collect();
        assert_eq!(metrics, ["zeta", "alpha"]);
        let trials: Vec<&String> = restored["zeta"].keys().collect();
        assert_eq!(trials, ["trial-3", "trial-1"]);
    }
}
