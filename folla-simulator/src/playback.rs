use glam::Vec2;

/// Append-only per-pedestrian position histories, one sample per recorded
/// frame plus the initial placement. Seeking replays these; it never
/// re-simulates.
#[derive(Debug, Default, Clone)]
pub struct PlaybackRecorder {
    histories: Vec<Vec<Vec2>>,
}

impl PlaybackRecorder {
    /// Drop all recorded frames and make room for `pedestrian_count` tracks.
    pub fn reset(&mut self, pedestrian_count: usize) {
        self.histories = vec![Vec::new(); pedestrian_count];
    }

    pub fn record(&mut self, id: u32, position: Vec2) {
        self.histories[id as usize].push(position);
    }

    /// Recorded position of a pedestrian at `frame`, clamped to the last
    /// available sample.
    pub fn position_at(&self, id: u32, frame: usize) -> Option<Vec2> {
        let history = self.histories.get(id as usize)?;
        let last = history.len().checked_sub(1)?;
        Some(history[frame.min(last)])
    }

    pub fn history(&self, id: u32) -> &[Vec2] {
        self.histories
            .get(id as usize)
            .map(|h| h.as_slice())
            .unwrap_or(&[])
    }

    pub fn histories(&self) -> &[Vec<Vec2>] {
        &self.histories
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;

    #[test]
    fn test_position_at_clamps() {
        let mut recorder = PlaybackRecorder::default();
        recorder.reset(1);
        recorder.record(0, vec2(0.0, 0.0));
        recorder.record(0, vec2(0.1, 0.0));
        recorder.record(0, vec2(0.2, 0.0));

        assert_eq!(recorder.position_at(0, 1), Some(vec2(0.1, 0.0)));
        assert_eq!(recorder.position_at(0, 100), Some(vec2(0.2, 0.0)));
        assert_eq!(recorder.position_at(1, 0), None);
    }

    #[test]
    fn test_reset_clears_tracks() {
        let mut recorder = PlaybackRecorder::default();
        recorder.reset(2);
        recorder.record(0, vec2(1.0, 1.0));
        recorder.reset(2);
        assert_eq!(recorder.position_at(0, 0), None);
        assert_eq!(recorder.history(0), &[]);
    }
}
