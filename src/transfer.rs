//! Simulated transfers: a delay broken into progress ticks.

use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::constants::{
    FOLDER_DELAY_MAX_MS, FOLDER_DELAY_MIN_MS, PROGRESS_STEPS, UPLOAD_DELAY_MAX_MS,
    UPLOAD_DELAY_MIN_MS,
};
use crate::events::{EventBus, PortalEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    File,
    Folder,
}

/// Decides how long a simulated transfer takes
pub trait TransferTimer: Send + Sync {
    fn duration(&self, kind: TransferKind) -> Duration;
}

/// Uniformly random delay per kind, in milliseconds
#[derive(Debug, Clone)]
pub struct RandomDelay {
    pub file_ms: RangeInclusive<u64>,
    pub folder_ms: RangeInclusive<u64>,
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self {
            file_ms: UPLOAD_DELAY_MIN_MS..=UPLOAD_DELAY_MAX_MS,
            folder_ms: FOLDER_DELAY_MIN_MS..=FOLDER_DELAY_MAX_MS,
        }
    }
}

impl TransferTimer for RandomDelay {
    fn duration(&self, kind: TransferKind) -> Duration {
        let range = match kind {
            TransferKind::File => &self.file_ms,
            TransferKind::Folder => &self.folder_ms,
        };

        if range.is_empty() {
            return Duration::from_millis(*range.start());
        }

        Duration::from_millis(rand::thread_rng().gen_range(range.clone()))
    }
}

/// Completes transfers at once. Used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl TransferTimer for Immediate {
    fn duration(&self, _kind: TransferKind) -> Duration {
        Duration::ZERO
    }
}

/// Random, strictly increasing progress percentages for `steps` ticks.
///
/// The last milestone is always 100.
pub fn progress_milestones(steps: u32) -> Vec<u8> {
    let steps = steps.clamp(1, 100) as usize;
    let mut milestones: Vec<u8> = rand::seq::index::sample(&mut rand::thread_rng(), 99, steps - 1)
        .into_iter()
        .map(|i| (i + 1) as u8)
        .collect();
    milestones.sort_unstable();
    milestones.push(100);
    milestones
}

/// Sleep through a transfer of `file`, reporting progress on `events`.
pub async fn run_transfer(timer: &dyn TransferTimer, kind: TransferKind, file: &str, events: &EventBus) {
    let total = timer.duration(kind);
    let tick = total / PROGRESS_STEPS;

    for percent in progress_milestones(PROGRESS_STEPS) {
        if !tick.is_zero() {
            tokio::time::sleep(tick).await;
        }

        events.emit(PortalEvent::UploadProgress {
            file: file.to_string(),
            percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_delay_within_range() {
        let timer = RandomDelay::default();
        for _ in 0..100 {
            let file = timer.duration(TransferKind::File).as_millis() as u64;
            assert!((UPLOAD_DELAY_MIN_MS..=UPLOAD_DELAY_MAX_MS).contains(&file));

            let folder = timer.duration(TransferKind::Folder).as_millis() as u64;
            assert!((FOLDER_DELAY_MIN_MS..=FOLDER_DELAY_MAX_MS).contains(&folder));
        }
    }

    #[test]
    fn test_inverted_range_uses_start() {
        let timer = RandomDelay {
            file_ms: 300..=100,
            folder_ms: 0..=0,
        };
        assert_eq!(timer.duration(TransferKind::File), Duration::from_millis(300));
        assert_eq!(timer.duration(TransferKind::Folder), Duration::ZERO);
    }

    #[test]
    fn test_progress_milestones_increase_to_hundred() {
        for _ in 0..50 {
            let milestones = progress_milestones(PROGRESS_STEPS);
            assert_eq!(milestones.len(), PROGRESS_STEPS as usize);
            assert!(milestones.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(milestones.last(), Some(&100));
        }
        assert_eq!(progress_milestones(1), vec![100]);
        assert_eq!(progress_milestones(500).len(), 100);
    }

    #[tokio::test]
    async fn test_progress_ends_at_hundred() {
        let events = EventBus::default();
        let mut rx = events.subscribe();

        run_transfer(&Immediate, TransferKind::File, "game.apk", &events).await;

        let mut last = 0;
        for _ in 0..PROGRESS_STEPS {
            match rx.recv().await.unwrap() {
                PortalEvent::UploadProgress { file, percent } => {
                    assert_eq!(file, "game.apk");
                    assert!(percent > last);
                    last = percent;
                }
                other => panic!("Unexpected event {:?}", other),
            }
        }
        assert_eq!(last, 100);
    }

    #[tokio::test]
    async fn test_transfer_takes_timer_duration() {
        struct Fixed;
        impl TransferTimer for Fixed {
            fn duration(&self, _kind: TransferKind) -> Duration {
                Duration::from_millis(50)
            }
        }

        let start = std::time::Instant::now();
        run_transfer(&Fixed, TransferKind::Folder, "pack", &EventBus::default()).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
