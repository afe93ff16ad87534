//! Statistics Calculator Module
//! Descriptive summaries, correlation, histogram binning and kernel density
//! estimates over dataset columns.

use crate::data::{DataProcessor, DatasetTable};
use crate::error::Result;
use rayon::prelude::*;
use statrs::distribution::{Continuous, Normal};

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Row labels of the summary table, in display order.
    pub const ROW_LABELS: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Values in `ROW_LABELS` order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` × `columns.len()`. NaN marks pairs without
    /// enough complete observations or with zero variance.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Smallest and largest finite coefficient.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        if self.edges.len() < 2 {
            return 0.0;
        }
        self.edges[1] - self.edges[0]
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Summary statistics for every numeric column of a table, computed per
    /// column in parallel. Missing values are skipped.
    pub fn describe(table: &DatasetTable) -> Result<Vec<ColumnSummary>> {
        let columns = DataProcessor::numeric_projection(table)?;

        let summaries = columns
            .par_iter()
            .map(|(name, values)| {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                let mut summary = Self::summarize(&present);
                summary.column = name.clone();
                summary
            })
            .collect();
        Ok(summaries)
    }

    /// Compute descriptive statistics for an array of values.
    pub fn summarize(values: &[f64]) -> ColumnSummary {
        let n = values.len();
        let mut summary = ColumnSummary {
            column: String::new(),
            count: n,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        };
        if n == 0 {
            return summary;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        summary.mean = mean;
        summary.std = Self::sample_std(values, mean);
        summary.min = sorted[0];
        summary.q25 = Self::percentile(&sorted, 25.0);
        summary.median = Self::percentile(&sorted, 50.0);
        summary.q75 = Self::percentile(&sorted, 75.0);
        summary.max = sorted[n - 1];
        summary
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Sample standard deviation (n - 1 denominator); NaN below two values.
    fn sample_std(values: &[f64], mean: f64) -> f64 {
        let n = values.len();
        if n < 2 {
            return f64::NAN;
        }
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    }

    /// Pearson correlation over rows where both values are present.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y.iter())
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();

        let n = pairs.len();
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let denom = (var_x * var_y).sqrt();
        if denom == 0.0 {
            return f64::NAN;
        }
        (cov / denom).clamp(-1.0, 1.0)
    }

    /// Correlation matrix over all numeric columns, or `None` when the table
    /// has none.
    pub fn correlation(table: &DatasetTable) -> Result<Option<CorrelationMatrix>> {
        let columns = DataProcessor::numeric_projection(table)?;
        if columns.is_empty() {
            return Ok(None);
        }

        let values = columns
            .par_iter()
            .map(|(_, x)| {
                columns
                    .iter()
                    .map(|(_, y)| Self::pearson(x, y))
                    .collect::<Vec<f64>>()
            })
            .collect();

        Ok(Some(CorrelationMatrix {
            columns: columns.into_iter().map(|(name, _)| name).collect(),
            values,
        }))
    }

    /// Histogram with NumPy's "auto" bin count: the smaller bin width of the
    /// Sturges and Freedman-Diaconis rules.
    pub fn histogram(values: &[f64]) -> Histogram {
        let n = values.len();
        if n == 0 {
            return Histogram {
                edges: vec![0.0, 1.0],
                counts: vec![0],
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let (mut lo, mut hi) = (sorted[0], sorted[n - 1]);
        let data_range = hi - lo;

        let bins = if data_range > 0.0 {
            let sturges = data_range / ((n as f64).log2() + 1.0);
            let iqr = Self::percentile(&sorted, 75.0) - Self::percentile(&sorted, 25.0);
            let fd = 2.0 * iqr * (n as f64).powf(-1.0 / 3.0);
            let width = if fd > 0.0 { sturges.min(fd) } else { sturges };
            ((data_range / width).ceil() as usize).max(1)
        } else {
            lo -= 0.5;
            hi += 0.5;
            1
        };
        let range = hi - lo;

        let edges: Vec<f64> = (0..=bins)
            .map(|i| lo + range * i as f64 / bins as f64)
            .collect();

        let mut counts = vec![0usize; bins];
        for v in &sorted {
            let idx = (((v - lo) / range) * bins as f64).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        Histogram { edges, counts }
    }

    /// Gaussian kernel density estimate with Scott's bandwidth, evaluated on
    /// `points` evenly spaced over the data range widened by `cut`
    /// bandwidths on each side. Returns `(x, density)` pairs; empty when the
    /// data has fewer than two distinct values.
    pub fn kde(values: &[f64], points: usize, cut: f64) -> Vec<(f64, f64)> {
        let n = values.len();
        if n < 2 || points < 2 {
            return Vec::new();
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let std = Self::sample_std(values, mean);
        let bandwidth = std * (n as f64).powf(-0.2);
        if !(bandwidth > 0.0) {
            return Vec::new();
        }

        let Ok(kernel) = Normal::new(0.0, bandwidth) else {
            return Vec::new();
        };

        let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - cut * bandwidth;
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bandwidth;
        let step = (hi - lo) / (points - 1) as f64;

        (0..points)
            .into_par_iter()
            .map(|i| {
                let x = lo + step * i as f64;
                let density = values.iter().map(|v| kernel.pdf(x - v)).sum::<f64>() / n as f64;
                (x, density)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetKind, DatasetProvider};
    use approx::assert_relative_eq;
    use polars::prelude::*;

    #[test]
    fn summary_matches_descriptive_statistics() {
        let s = StatsCalculator::summarize(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert_relative_eq!(s.mean, 2.5);
        assert_relative_eq!(s.std, 1.2909944487358056, epsilon = 1e-12);
        assert_relative_eq!(s.min, 1.0);
        assert_relative_eq!(s.q25, 1.75);
        assert_relative_eq!(s.median, 2.5);
        assert_relative_eq!(s.q75, 3.25);
        assert_relative_eq!(s.max, 4.0);
    }

    #[test]
    fn describe_skips_missing_values() {
        let df = df!(
            "a" => [Some(1.0), None, Some(3.0)],
            "label" => ["x", "y", "z"]
        )
        .unwrap();
        let table = DatasetTable::new(DatasetKind::Titanic, df);
        let summaries = StatsCalculator::describe(&table).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].column, "a");
        assert_eq!(summaries[0].count, 2);
        assert_relative_eq!(summaries[0].mean, 2.0);
    }

    #[test]
    fn iris_sepal_length_summary() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let summaries = StatsCalculator::describe(&table).unwrap();
        let sepal = &summaries[0];
        assert_eq!(sepal.column, "sepal_length");
        assert_eq!(sepal.count, 150);
        assert_relative_eq!(sepal.mean, 5.843333333333334, epsilon = 1e-9);
        assert_relative_eq!(sepal.min, 4.3);
        assert_relative_eq!(sepal.median, 5.8);
        assert_relative_eq!(sepal.max, 7.9);
    }

    #[test]
    fn pearson_of_linear_data_is_one() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert_relative_eq!(StatsCalculator::pearson(&x, &y), 1.0, epsilon = 1e-12);
        let neg = [Some(-1.0), Some(-2.0), Some(-3.0), None];
        assert_relative_eq!(StatsCalculator::pearson(&x, &neg), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_column_has_no_correlation() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(5.0), Some(5.0), Some(5.0)];
        assert!(StatsCalculator::pearson(&x, &y).is_nan());
    }

    #[test]
    fn correlation_without_numeric_columns_is_none() {
        let df = df!("sex" => ["male", "female"]).unwrap();
        let table = DatasetTable::new(DatasetKind::Titanic, df);
        assert!(StatsCalculator::correlation(&table).unwrap().is_none());
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let corr = StatsCalculator::correlation(&table).unwrap().unwrap();
        assert_eq!(corr.columns.len(), 4);
        for i in 0..4 {
            assert_relative_eq!(corr.get(i, i), 1.0, epsilon = 1e-12);
            for j in 0..4 {
                assert_relative_eq!(corr.get(i, j), corr.get(j, i), epsilon = 1e-12);
            }
        }
        let (lo, hi) = corr.finite_range().unwrap();
        assert!(lo < 0.0 && hi <= 1.0);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let hist = StatsCalculator::histogram(&values);
        assert_eq!(hist.counts.iter().sum::<usize>(), 100);
        assert_eq!(hist.edges.len(), hist.counts.len() + 1);
        assert_relative_eq!(hist.edges[0], 0.0);
        assert_relative_eq!(*hist.edges.last().unwrap(), 9.9, epsilon = 1e-12);
    }

    #[test]
    fn histogram_of_constant_values_has_one_bin() {
        let hist = StatsCalculator::histogram(&[2.0, 2.0, 2.0]);
        assert_eq!(hist.counts, vec![3]);
        assert_relative_eq!(hist.bin_width(), 1.0);
        assert_relative_eq!(hist.edges[0], 1.5);
        assert_relative_eq!(hist.edges[1], 2.5);
    }

    #[test]
    fn histogram_of_a_single_value_has_one_unit_bin() {
        let hist = StatsCalculator::histogram(&[7.0]);
        assert_eq!(hist.counts, vec![1]);
        assert_relative_eq!(hist.bin_width(), 1.0);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 4.2, 5.0];
        let curve = StatsCalculator::kde(&values, 400, 3.0);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, d)| d * step).sum();
        assert_relative_eq!(area, 1.0, epsilon = 0.02);
    }

    #[test]
    fn kde_of_constant_values_is_empty() {
        assert!(StatsCalculator::kde(&[1.0, 1.0], 50, 3.0).is_empty());
    }
}
