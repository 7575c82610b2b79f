//! Partition clip requests by source video

use crate::domain::model::{ClipRequest, VideoGroup};

/// Groups requests by source identifier.
///
/// Group order is the order in which each source first appears; request
/// order inside a group is CSV order, which is the order sequence numbers
/// get handed out in.
pub struct VideoGrouper;

impl VideoGrouper {
    pub fn group(requests: Vec<ClipRequest>) -> Vec<VideoGroup> {
        let mut groups: Vec<VideoGroup> = Vec::new();

        for request in requests {
            match groups.iter_mut().find(|g| g.source.id == request.source.id) {
                Some(group) => group.requests.push(request),
                None => groups.push(VideoGroup {
                    source: request.source.clone(),
                    requests: vec![request],
                }),
            }
        }

        groups
    }
}
