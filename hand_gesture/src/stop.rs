//! Stop gesture: index finger extended and pointing back at the palm.

use crate::geometry::{cos_angle, Point3};
use crate::landmark::{joint, HandObservation};

/// Mean of the wrist and the four MCP knuckles.
pub fn palm_centroid(hand: &HandObservation) -> Point3 {
    let pts = std::iter::once(joint::WRIST)
        .chain(joint::MCPS)
        .map(|i| hand.at(i));
    let n = 1.0 + joint::MCPS.len() as f32;
    let sum = pts.fold(Point3::default(), |acc, p| Point3::new(acc.x + p.x, acc.y + p.y, acc.z + p.z));
    Point3::new(sum.x / n, sum.y / n, sum.z / n)
}

/// True when the index finger points at the palm centroid to within the
/// angle whose cosine is `cos_threshold`, with the other fingers curled.
///
/// The check runs in the image plane.  Zero-length direction vectors yield
/// `false`.
pub fn is_stop_gesture(hand: &HandObservation, cos_threshold: f32) -> bool {
    let tip = hand.at(joint::INDEX_TIP);
    let pip = hand.at(joint::INDEX_PIP);
    let mcp = hand.at(joint::INDEX_MCP);

    // Smaller y is higher on screen.
    let index_extended = tip.y < pip.y && pip.y < mcp.y;
    let others_curled = [joint::MIDDLE_TIP, joint::RING_TIP, joint::PINKY_TIP]
        .iter()
        .all(|&t| hand.at(t).y > mcp.y);
    if !index_extended || !others_curled {
        return false;
    }

    let pointing = tip.sub(pip).xy();
    let to_palm = palm_centroid(hand).sub(tip).xy();
    match cos_angle(pointing, to_palm) {
        Some(c) => c > cos_threshold,
        None    => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STOP_COS_THRESHOLD;
    use crate::geometry::Point2;
    use crate::pose::{hand_at, Pose};

    const CENTER: Point2 = Point2::new(0.5, 0.5);

    #[test]
    fn centroid_of_stop_pose_is_above_tip() {
        let hand = hand_at(Pose::Stop, CENTER);
        let c = palm_centroid(&hand);
        assert!((c.x - hand.index_tip().x).abs() < 1e-6);
        assert!(c.y < hand.index_tip().y);
    }

    #[test]
    fn finger_pointing_at_palm_is_stop() {
        assert!(is_stop_gesture(&hand_at(Pose::Stop, CENTER), STOP_COS_THRESHOLD));
    }

    #[test]
    fn open_hand_is_not_stop() {
        assert!(!is_stop_gesture(&hand_at(Pose::Open, CENTER), STOP_COS_THRESHOLD));
        assert!(!is_stop_gesture(&hand_at(Pose::Pinch, CENTER), STOP_COS_THRESHOLD));
    }

    #[test]
    fn orthogonal_finger_is_not_stop() {
        let mut hand = hand_at(Pose::Stop, CENTER);
        // Keep the posture checks satisfied but move the palm sideways so the
        // tip→palm vector is horizontal while the finger points straight up.
        let tip = hand.index_tip();
        let shift_x = 0.3;
        let shift_y = tip.y - palm_centroid(&hand).y;
        for i in std::iter::once(joint::WRIST).chain(joint::MCPS) {
            if i == joint::INDEX_MCP { continue; }
            hand.landmarks[i].x += shift_x * 5.0 / 4.0;
            hand.landmarks[i].y += shift_y * 5.0 / 4.0;
        }
        let to_palm = palm_centroid(&hand).sub(tip).xy();
        assert!(to_palm.y.abs() < 1e-5);
        assert!(!is_stop_gesture(&hand, STOP_COS_THRESHOLD));
    }

    #[test]
    fn collapsed_finger_is_not_stop() {
        let mut hand = hand_at(Pose::Stop, CENTER);
        hand.landmarks[joint::INDEX_PIP] = hand.index_tip();
        assert!(!is_stop_gesture(&hand, STOP_COS_THRESHOLD));
    }

    #[test]
    fn collinear_finger_and_palm_is_stop_at_any_distance() {
        let mut hand = hand_at(Pose::Stop, CENTER);
        // Push the palm further along the same line; direction is unchanged.
        for i in std::iter::once(joint::WRIST).chain(joint::MCPS) {
            if i == joint::INDEX_MCP { continue; }
            hand.landmarks[i].y -= 0.2;
        }
        assert!(is_stop_gesture(&hand, STOP_COS_THRESHOLD));
    }
}
