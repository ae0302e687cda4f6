use super::{NegotiationStatus, SensorFeed, SurfaceSensor};
use crate::engine::pose::{CameraPose, Pose};

/// Sensor whose negotiation result and hits are pushed in by the page.
///
/// The page owns the WebXR session; this side only mirrors what it reports.
#[derive(Debug, Clone, Default)]
pub struct RemoteSensor {
    requested: bool,
    outcome: Option<Result<(), String>>,
    latest_hit: Option<Pose>,
}

impl SurfaceSensor for RemoteSensor {
    fn begin_negotiation(&mut self) {
        self.requested = true;
        self.outcome = None;
        self.latest_hit = None;
    }

    fn negotiation_status(&mut self) -> NegotiationStatus {
        match &self.outcome {
            Some(Ok(())) => NegotiationStatus::Ready,
            Some(Err(reason)) => NegotiationStatus::Failed(reason.clone()),
            None => NegotiationStatus::Pending,
        }
    }

    fn poll_hit(&mut self, _viewer: Option<&CameraPose>) -> Option<Pose> {
        self.latest_hit
    }

    fn ingest(&mut self, feed: &SensorFeed) {
        match feed {
            SensorFeed::Negotiated(outcome) => {
                if self.requested {
                    self.outcome = Some(outcome.clone());
                }
            }
            SensorFeed::Hit(hit) => {
                if matches!(self.outcome, Some(Ok(()))) {
                    self.latest_hit = *hit;
                }
            }
        }
    }

    fn shutdown(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    #[test]
    fn hits_before_negotiation_are_dropped() {
        let mut sensor = RemoteSensor::default();
        sensor.ingest(&SensorFeed::Hit(Some(Pose::from_translation(Vec3::X))));
        assert!(sensor.poll_hit(None).is_none());
    }

    #[test]
    fn negotiation_outcome_only_counts_after_request() {
        let mut sensor = RemoteSensor::default();
        sensor.ingest(&SensorFeed::Negotiated(Ok(())));
        assert_eq!(sensor.negotiation_status(), NegotiationStatus::Pending);

        sensor.begin_negotiation();
        sensor.ingest(&SensorFeed::Negotiated(Err("hit-test unsupported".into())));
        assert_eq!(
            sensor.negotiation_status(),
            NegotiationStatus::Failed("hit-test unsupported".into())
        );
    }

    #[test]
    fn shutdown_forgets_last_hit() {
        let mut sensor = RemoteSensor::default();
        sensor.begin_negotiation();
        sensor.ingest(&SensorFeed::Negotiated(Ok(())));
        sensor.ingest(&SensorFeed::Hit(Some(Pose::from_translation(Vec3::X))));
        assert!(sensor.poll_hit(None).is_some());

        sensor.shutdown();
        assert!(sensor.poll_hit(None).is_none());
    }
}
