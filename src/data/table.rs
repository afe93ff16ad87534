//! Dataset table with schema reflection.
//! Wraps a Polars DataFrame and exposes column introspection used to build
//! selector choices and to feed the chart routines.

use crate::data::DatasetKind;
use crate::error::{ExplorerError, Result};
use polars::prelude::*;

/// An in-memory dataset: rows × named, typed columns.
#[derive(Debug, Clone)]
pub struct DatasetTable {
    kind: DatasetKind,
    df: DataFrame,
}

impl DatasetTable {
    pub fn new(kind: DatasetKind, df: DataFrame) -> Self {
        Self { kind, df }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// All column names, in table order.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.df.column(column).is_ok()
    }

    /// Numeric column names. Booleans are not numeric.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Non-numeric column names.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| !is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    pub fn is_numeric(&self, column: &str) -> Result<bool> {
        Ok(is_numeric_dtype(self.column(column)?.dtype()))
    }

    /// Values of a numeric column as f64; nulls and NaN become `None`.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let col = self.column(column)?;
        if !is_numeric_dtype(col.dtype()) {
            return Err(ExplorerError::NonNumericColumn(column.to_string()));
        }

        let as_f64 = col.cast(&DataType::Float64)?;
        let values = as_f64
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }

    /// Values of any column rendered as text; nulls become `None`.
    pub fn labels(&self, column: &str) -> Result<Vec<Option<String>>> {
        let col = self.column(column)?;
        let as_str = col.cast(&DataType::String)?;
        let labels = as_str
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        Ok(labels)
    }

    /// Distinct non-null values of a column in display order.
    ///
    /// Declared categorical orders come first, numeric columns sort by value,
    /// anything else keeps first-appearance order.
    pub fn levels(&self, column: &str) -> Result<Vec<String>> {
        let labels = self.labels(column)?;
        let mut seen: Vec<String> = Vec::new();
        for label in labels.into_iter().flatten() {
            if !seen.contains(&label) {
                seen.push(label);
            }
        }

        if let Some(order) = self.kind.category_order(column) {
            let mut ordered: Vec<String> = order
                .iter()
                .filter(|level| seen.iter().any(|s| s.as_str() == **level))
                .map(|level| level.to_string())
                .collect();
            for label in seen {
                if !ordered.contains(&label) {
                    ordered.push(label);
                }
            }
            return Ok(ordered);
        }

        if self.is_numeric(column)? {
            seen.sort_by(|a, b| {
                let a = a.parse::<f64>().unwrap_or(f64::NAN);
                let b = b.parse::<f64>().unwrap_or(f64::NAN);
                a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        Ok(seen)
    }

    /// Insert or replace a float column.
    pub fn set_numeric_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.df.with_column(Series::new(name.into(), values))?;
        Ok(())
    }

    fn column(&self, column: &str) -> Result<&Column> {
        self.df
            .column(column)
            .map_err(|_| ExplorerError::UnknownColumn(column.to_string()))
    }
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetProvider;

    fn titanic() -> DatasetTable {
        DatasetProvider::new().load(DatasetKind::Titanic).unwrap()
    }

    #[test]
    fn booleans_are_not_numeric() {
        let table = titanic();
        let numeric = table.numeric_columns();
        assert_eq!(
            numeric,
            vec!["survived", "pclass", "age", "sibsp", "parch", "fare"]
        );
        assert!(table.categorical_columns().contains(&"adult_male".to_string()));
    }

    #[test]
    fn missing_ages_are_none() {
        let table = titanic();
        let ages = table.numeric_values("age").unwrap();
        assert_eq!(ages.len(), table.row_count());
        assert!(ages.iter().any(|a| a.is_none()));
        assert_eq!(ages[0], Some(22.0));
    }

    #[test]
    fn non_numeric_column_is_rejected() {
        let err = titanic().numeric_values("sex").unwrap_err();
        assert!(matches!(err, ExplorerError::NonNumericColumn(_)));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = titanic().labels("cabin").unwrap_err();
        assert!(matches!(err, ExplorerError::UnknownColumn(_)));
    }

    #[test]
    fn declared_category_order_wins() {
        let table = titanic();
        assert_eq!(table.levels("class").unwrap(), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn numeric_levels_sort_by_value() {
        let df = df!("size" => [3i64, 10, 2, 3]).unwrap();
        let table = DatasetTable::new(DatasetKind::Tips, df);
        assert_eq!(table.levels("size").unwrap(), vec!["2", "3", "10"]);
    }

    #[test]
    fn string_levels_keep_first_appearance() {
        let df = df!("species" => ["versicolor", "setosa", "versicolor"]).unwrap();
        let table = DatasetTable::new(DatasetKind::Iris, df);
        assert_eq!(table.levels("species").unwrap(), vec!["versicolor", "setosa"]);
    }
}
