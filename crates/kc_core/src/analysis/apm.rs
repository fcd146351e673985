//! Raw per-minute action histogram.

use crate::models::record::ActionRecord;
use crate::models::report::ApmBin;

/// Count a player's actions per minute of match time.
///
/// Timestampless actions are skipped; timestamps past the end of the match
/// clamp into the final bin.
pub fn actions_per_minute(actions: &[&ActionRecord], duration: u64) -> Vec<ApmBin> {
    let bin_count = (duration / 60 + 1) as usize;
    let mut bins = vec![0u32; bin_count];
    for action in actions {
        let Some(time) = action.time() else { continue };
        let index = ((time / 60) as usize).min(bin_count - 1);
        bins[index] += 1;
    }
    bins.into_iter()
        .enumerate()
        .map(|(minute, actions)| ApmBin { minute: minute as u32, actions })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{ActionKind, ActionPayload};

    fn action(timestamp: Option<f64>) -> ActionRecord {
        ActionRecord {
            player: Some(0),
            kind: ActionKind::Other,
            timestamp,
            payload: ActionPayload::default(),
            object_ids: vec![],
        }
    }

    #[test]
    fn test_binning_and_clamping() {
        let actions = vec![
            action(Some(5.0)),
            action(Some(59.0)),
            action(Some(60.0)),
            action(Some(10_000.0)), // past the end: clamps into the last bin
            action(None),           // skipped
        ];
        let refs: Vec<&ActionRecord> = actions.iter().collect();
        let bins = actions_per_minute(&refs, 150);

        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].actions, 2);
        assert_eq!(bins[1].actions, 1);
        assert_eq!(bins[2].actions, 1);
        assert_eq!(bins[2].minute, 2);
    }

    #[test]
    fn test_zero_duration_single_bin() {
        let actions = vec![action(Some(0.0))];
        let refs: Vec<&ActionRecord> = actions.iter().collect();
        let bins = actions_per_minute(&refs, 0);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].actions, 1);
    }
}
