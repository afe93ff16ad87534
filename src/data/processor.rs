//! Data Processor Module
//! Derived columns and numeric projections of a dataset table.

use crate::data::DatasetTable;
use crate::error::Result;
use tracing::debug;

pub const BILL_PER_PERSON: &str = "bill_per_person";

/// Handles derived-column and projection operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Add `bill_per_person = total_bill / size` to a Tips table.
    ///
    /// Recomputed from the source columns on every call, so repeated calls
    /// leave the values unchanged. A zero or missing party size yields a
    /// missing value.
    pub fn add_bill_per_person(table: &mut DatasetTable) -> Result<()> {
        let bills = table.numeric_values("total_bill")?;
        let sizes = table.numeric_values("size")?;

        let per_person: Vec<Option<f64>> = bills
            .iter()
            .zip(sizes.iter())
            .map(|(bill, size)| match (bill, size) {
                (Some(b), Some(s)) if *s != 0.0 => Some(b / s),
                _ => None,
            })
            .collect();

        table.set_numeric_column(BILL_PER_PERSON, per_person)?;
        debug!(rows = table.row_count(), "derived {}", BILL_PER_PERSON);
        Ok(())
    }

    /// Every numeric column with its values, in table order.
    pub fn numeric_projection(table: &DatasetTable) -> Result<Vec<(String, Vec<Option<f64>>)>> {
        table
            .numeric_columns()
            .into_iter()
            .map(|name| {
                let values = table.numeric_values(&name)?;
                Ok((name, values))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetKind;
    use polars::prelude::*;

    fn tips_frame() -> DatasetTable {
        let df = df!(
            "total_bill" => [20.0, 16.99, 9.0],
            "tip" => [3.0, 1.01, 1.0],
            "sex" => ["Male", "Female", "Male"],
            "size" => [4i64, 2, 0]
        )
        .unwrap();
        DatasetTable::new(DatasetKind::Tips, df)
    }

    #[test]
    fn bill_per_person_divides_by_party_size() {
        let mut table = tips_frame();
        DataProcessor::add_bill_per_person(&mut table).unwrap();
        let values = table.numeric_values(BILL_PER_PERSON).unwrap();
        assert_eq!(values[0], Some(5.0));
        assert_eq!(values[1], Some(16.99 / 2.0));
        assert_eq!(values[2], None);
    }

    #[test]
    fn bill_per_person_is_idempotent() {
        let mut table = tips_frame();
        DataProcessor::add_bill_per_person(&mut table).unwrap();
        let first = table.numeric_values(BILL_PER_PERSON).unwrap();
        let width = table.columns().len();

        DataProcessor::add_bill_per_person(&mut table).unwrap();
        assert_eq!(table.numeric_values(BILL_PER_PERSON).unwrap(), first);
        assert_eq!(table.columns().len(), width);
    }

    #[test]
    fn projection_skips_text_columns() {
        let table = tips_frame();
        let names: Vec<String> = DataProcessor::numeric_projection(&table)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["total_bill", "tip", "size"]);
    }
}
