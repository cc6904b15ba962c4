use std::collections::{BTreeSet, HashMap, HashSet};

use crate::data::record::Record;

/// Records belonging to one device, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceGroup<'a> {
    pub device_id: &'a str,
    pub records: Vec<&'a Record>,
}

impl DeviceGroup<'_> {
    /// Numeric results of the group, `NaN` where a result is not numeric.
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.value()).collect()
    }
}

/// Records partitioned by device id. Groups iterate in the order their
/// device was first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSet<'a> {
    groups: Vec<DeviceGroup<'a>>,
}

impl<'a> GroupedSet<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceGroup<'a>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceGroup<'a>> {
        self.groups.iter().find(|g| g.device_id == device_id)
    }

    pub fn device_ids(&self) -> Vec<&'a str> {
        self.groups.iter().map(|g| g.device_id).collect()
    }
}

impl<'a, 'g> IntoIterator for &'g GroupedSet<'a> {
    type Item = &'g DeviceGroup<'a>;
    type IntoIter = std::slice::Iter<'g, DeviceGroup<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Keep the records of one test. `None` or an empty name selects everything.
pub fn filter_by_test<'a>(records: &'a [Record], test_name: Option<&str>) -> Vec<&'a Record> {
    match test_name.filter(|t| !t.is_empty()) {
        Some(test) => records.iter().filter(|r| r.test_name == test).collect(),
        None => records.iter().collect(),
    }
}

/// Partition records by device, preserving first-seen device order and the
/// input order inside each group.
pub fn group_by_device<'a>(records: impl IntoIterator<Item = &'a Record>) -> GroupedSet<'a> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<DeviceGroup<'a>> = Vec::new();

    for record in records {
        let device_id = record.device_id.as_str();
        let slot = *index.entry(device_id).or_insert_with(|| {
            groups.push(DeviceGroup { device_id, records: Vec::new() });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    GroupedSet { groups }
}

/// Test names in first-seen order, without duplicates.
pub fn distinct_test_names(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.test_name.as_str()))
        .map(|r| r.test_name.clone())
        .collect()
}

/// Distinct dates sorted lexically ascending. This is chronological only for
/// zero-padded ISO-like dates (see [`crate::data::datetime::is_iso_date`]).
pub fn distinct_sorted_dates<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    records
        .into_iter()
        .map(|r| r.date.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
