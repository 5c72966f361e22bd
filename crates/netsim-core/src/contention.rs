//! Recording a time series of link utilization as the simulation runs.

pub mod fluid;

use std::path::Path;

/// Errors writing a contention log row.
#[derive(Debug, thiserror::Error)]
pub enum ContentionError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A sink for contention log rows, one row per event that changes some link's active-message
/// count. The contract is a trait rather than a concrete writer so tests can substitute an
/// in-memory sink for the canonical CSV file.
pub trait ContentionSink {
    /// Writes the header row: `time`, then one column per link index `0..link_count`.
    fn write_header(&mut self, link_count: usize) -> Result<(), ContentionError>;

    /// Appends a row: the current simulated time, then the active-message count of every link in
    /// index order.
    fn write_row(&mut self, time: crate::units::Seconds, active_counts: &[usize]) -> Result<(), ContentionError>;
}

/// Writes contention rows to a CSV file, flushing after every row so the file is readable by an
/// external tail/watch process while the simulation is still running.
#[derive(Debug)]
pub struct CsvContentionSink {
    writer: csv::Writer<std::fs::File>,
}

impl CsvContentionSink {
    /// Creates (or truncates) the CSV file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ContentionError> {
        let writer = csv::WriterBuilder::new().from_path(path)?;
        Ok(Self { writer })
    }
}

impl ContentionSink for CsvContentionSink {
    fn write_header(&mut self, link_count: usize) -> Result<(), ContentionError> {
        let mut header = vec!["time".to_string()];
        header.extend((0..link_count).map(|i| i.to_string()));
        self.writer.write_record(&header)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_row(&mut self, time: crate::units::Seconds, active_counts: &[usize]) -> Result<(), ContentionError> {
        let mut row = vec![time.into_f64().to_string()];
        row.extend(active_counts.iter().map(|c| c.to_string()));
        self.writer.write_record(&row)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// An in-memory sink, used by tests that want to inspect the logged rows directly instead of
/// reading back a file.
#[derive(Debug, Default)]
pub struct VecContentionSink {
    pub header_len: usize,
    pub rows: Vec<(crate::units::Seconds, Vec<usize>)>,
}

impl ContentionSink for VecContentionSink {
    fn write_header(&mut self, link_count: usize) -> Result<(), ContentionError> {
        self.header_len = link_count;
        Ok(())
    }

    fn write_row(&mut self, time: crate::units::Seconds, active_counts: &[usize]) -> Result<(), ContentionError> {
        self.rows.push((time, active_counts.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Seconds;

    #[test]
    fn vec_sink_records_rows_in_order() {
        let mut sink = VecContentionSink::default();
        sink.write_header(2).unwrap();
        sink.write_row(Seconds::new(0.0), &[0, 0]).unwrap();
        sink.write_row(Seconds::new(1.0), &[1, 0]).unwrap();
        assert_eq!(sink.header_len, 2);
        assert_eq!(sink.rows.len(), 2);
        assert_eq!(sink.rows[1].0, Seconds::new(1.0));
    }
}
