//! Per-channel index over `schedule.json` groups

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Channel, Program};

/// Decoded guide indexed by channel id
#[derive(Debug, Clone, Default)]
pub struct GuideSchedule {
    /// Channel order as returned by the server
    order: Vec<String>,
    channels: HashMap<String, Channel>,
    /// Programs per channel, sorted by start time
    programs: HashMap<String, Vec<Program>>,
}

impl GuideSchedule {
    pub fn from_groups(groups: Vec<Vec<Program>>) -> Self {
        let mut schedule = Self::default();
        for program in groups.into_iter().flatten() {
            let channel_id = program.channel.id.clone();
            if !schedule.channels.contains_key(&channel_id) {
                schedule.order.push(channel_id.clone());
                schedule.channels.insert(channel_id.clone(), program.channel.clone());
            }
            schedule.programs.entry(channel_id).or_default().push(program);
        }
        for programs in schedule.programs.values_mut() {
            programs.sort_by_key(|p| p.start);
        }
        schedule
    }

    pub fn channels(&self) -> Vec<&Channel> {
        self.order.iter().filter_map(|id| self.channels.get(id)).collect()
    }

    pub fn programs(&self, channel_id: &str) -> &[Program] {
        self.programs.get(channel_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Program airing on a channel at `at`
    pub fn current_program(&self, channel_id: &str, at: DateTime<Utc>) -> Option<&Program> {
        self.programs(channel_id).iter().find(|p| p.is_airing_at(at))
    }

    /// First program starting after `at`
    pub fn next_program(&self, channel_id: &str, at: DateTime<Utc>) -> Option<&Program> {
        self.programs(channel_id).iter().find(|p| p.start > at)
    }

    /// Programs overlapping `[start, end)`
    pub fn programs_in_range(&self, channel_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Program> {
        self.programs(channel_id)
            .iter()
            .filter(|p| p.end_time() > start && p.start < end)
            .collect()
    }

    pub fn program_count(&self) -> usize {
        self.programs.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn program(id: &str, channel: &str, start_hour: u32, minutes: f64) -> Program {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": id,
            "start": Utc.with_ymd_and_hms(2024, 1, 15, start_hour, 0, 0).unwrap().timestamp_millis(),
            "seconds": minutes * 60.0,
            "channel": { "id": channel, "type": "GR", "channel": "27", "name": channel }
        }))
        .unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    fn sample() -> GuideSchedule {
        GuideSchedule::from_groups(vec![
            vec![program("nhk2", "nhk", 13, 60.0), program("nhk1", "nhk", 12, 60.0)],
            vec![program("etv1", "etv", 12, 30.0)],
        ])
    }

    #[test]
    fn test_channels_keep_server_order() {
        let schedule = sample();
        let ids: Vec<&str> = schedule.channels().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["nhk", "etv"]);
        assert_eq!(schedule.program_count(), 3);
    }

    #[test]
    fn test_current_and_next_program() {
        let schedule = sample();
        assert_eq!(schedule.current_program("nhk", at(12, 30)).unwrap().id, "nhk1");
        assert_eq!(schedule.next_program("nhk", at(12, 30)).unwrap().id, "nhk2");
        assert!(schedule.current_program("etv", at(12, 45)).is_none());
        assert!(schedule.current_program("missing", at(12, 0)).is_none());
    }

    #[test]
    fn test_programs_in_range() {
        let schedule = sample();
        let found = schedule.programs_in_range("nhk", at(12, 50), at(13, 10));
        assert_eq!(found.len(), 2);
        assert!(schedule.programs_in_range("nhk", at(14, 0), at(15, 0)).is_empty());
    }

    #[test]
    fn test_huge_duration_is_never_airing() {
        let schedule = GuideSchedule::from_groups(vec![vec![
            program("long", "nhk", 12, 1e300),
            program("next", "nhk", 13, 30.0),
        ]]);
        assert!(schedule.current_program("nhk", at(12, 30)).is_none());
        assert_eq!(schedule.current_program("nhk", at(13, 10)).unwrap().id, "next");
        assert_eq!(schedule.programs_in_range("nhk", at(12, 10), at(14, 0)).len(), 1);
    }
}
