use serde::{Deserialize, Serialize};
use shared_types::{Record, RecordKind, RecordStatus};

/// Number of records in each status, plus the split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub draft: u64,
    pub under_investigation: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub red_flags: u64,
    pub interventions: u64,
}

impl StatusDistribution {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut dist = Self::default();
        for record in records {
            *dist.slot(record.status) += 1;
            match record.kind {
                RecordKind::RedFlag => dist.red_flags += 1,
                RecordKind::Intervention => dist.interventions += 1,
            }
        }
        dist
    }

    pub fn get(&self, status: RecordStatus) -> u64 {
        match status {
            RecordStatus::Draft => self.draft,
            RecordStatus::UnderInvestigation => self.under_investigation,
            RecordStatus::Resolved => self.resolved,
            RecordStatus::Rejected => self.rejected,
        }
    }

    pub fn total(&self) -> u64 {
        self.draft + self.under_investigation + self.resolved + self.rejected
    }

    fn slot(&mut self, status: RecordStatus) -> &mut u64 {
        match status {
            RecordStatus::Draft => &mut self.draft,
            RecordStatus::UnderInvestigation => &mut self.under_investigation,
            RecordStatus::Resolved => &mut self.resolved,
            RecordStatus::Rejected => &mut self.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_status() {
        let mut records: Vec<Record> = (0..3)
            .map(|_| Record::draft(RecordKind::Intervention, "t", "d", None, 0))
            .collect();
        records[1].status = RecordStatus::Resolved;

        let dist = StatusDistribution::from_records(&records);
        assert_eq!(dist.get(RecordStatus::Draft), 2);
        assert_eq!(dist.get(RecordStatus::Resolved), 1);
        assert_eq!(dist.get(RecordStatus::Rejected), 0);
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.interventions, 3);
        assert_eq!(dist.red_flags, 0);
    }
}
