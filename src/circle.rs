use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CircleId = Uuid;

/// A point in percent space: 0–100 fractions of the displayed image size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PctPoint {
    pub x: f32,
    pub y: f32,
}

impl PctPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: PctPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: PctPoint) -> PctPoint {
        PctPoint::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Offset between a pointer position and a circle center, in percent units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PctOffset {
    pub dx: f32,
    pub dy: f32,
}

/// One annotated circle. `x`/`y` are the center, `r` the radius, all in
/// percent space; `index` is the explicit display order within the image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub id: CircleId,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub index: u32,
}

impl Circle {
    pub fn center(&self) -> PctPoint {
        PctPoint::new(self.x, self.y)
    }

    pub fn contains(&self, point: PctPoint) -> bool {
        self.center().distance(point) <= self.r
    }
}

/// The ordered circle collection for one image. Owns identity assignment and
/// display order; keeps `circles` sorted by `index`. Every mutation bumps a
/// revision counter that the debounced persistence observer watches, and
/// deletions are remembered until the next save drains them.
#[derive(Clone, Debug, Default)]
pub struct CircleSet {
    circles: Vec<Circle>,
    deleted: Vec<CircleId>,
    revision: u64,
}

impl CircleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from loaded records, restoring index order.
    pub fn from_circles(mut circles: Vec<Circle>) -> Self {
        circles.sort_by_key(|c| c.index);
        Self {
            circles,
            deleted: Vec::new(),
            revision: 0,
        }
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn get(&self, id: CircleId) -> Option<&Circle> {
        self.circles.iter().find(|c| c.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Deep copy of the collection, used for undo snapshots.
    pub fn snapshot(&self) -> Vec<Circle> {
        self.circles.clone()
    }

    pub fn create(&mut self, center: PctPoint, radius: f32) -> CircleId {
        let index = self.circles.last().map_or(0, |c| c.index + 1);
        let id = Uuid::new_v4();
        self.circles.push(Circle {
            id,
            x: center.x,
            y: center.y,
            r: radius,
            comment: None,
            index,
        });
        self.bump();
        id
    }

    pub fn move_center(&mut self, id: CircleId, center: PctPoint) {
        if let Some(circle) = self.find_mut(id) {
            circle.x = center.x;
            circle.y = center.y;
            self.bump();
        }
    }

    pub fn set_radius(&mut self, id: CircleId, radius: f32) {
        if let Some(circle) = self.find_mut(id) {
            circle.r = radius;
            self.bump();
        }
    }

    pub fn set_comment(&mut self, id: CircleId, comment: &str) {
        if let Some(circle) = self.find_mut(id) {
            circle.comment = Some(comment.to_string());
            self.bump();
        }
    }

    /// Removes the circle and renormalizes the remaining indices to a
    /// contiguous 0..N-1 run. The removed id is queued for the next save.
    pub fn delete(&mut self, id: CircleId) -> bool {
        let before = self.circles.len();
        self.circles.retain(|c| c.id != id);
        if self.circles.len() == before {
            return false;
        }
        self.circles.sort_by_key(|c| c.index);
        for (i, circle) in self.circles.iter_mut().enumerate() {
            circle.index = i as u32;
        }
        self.deleted.push(id);
        self.bump();
        true
    }

    /// Wholesale substitution for undo-restore. Indices are assumed already
    /// consistent and are not renormalized.
    pub fn replace(&mut self, circles: Vec<Circle>) {
        self.circles = circles;
        self.bump();
    }

    /// Topmost hit wins: circles later in display order cover earlier ones.
    pub fn hit_test(&self, point: PctPoint) -> Option<CircleId> {
        self.circles
            .iter()
            .rev()
            .find(|c| c.contains(point))
            .map(|c| c.id)
    }

    /// Drains the ids deleted since the last save.
    pub fn take_deleted(&mut self) -> Vec<CircleId> {
        std::mem::take(&mut self.deleted)
    }

    /// Re-queues deleted ids after a failed save so a later successful save
    /// still removes their rows.
    pub fn restore_deleted(&mut self, ids: Vec<CircleId>) {
        self.deleted.extend(ids);
    }

    fn find_mut(&mut self, id: CircleId) -> Option<&mut Circle> {
        self.circles.iter_mut().find(|c| c.id == id)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Circle, CircleSet, PctPoint};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn set_with(n: usize) -> CircleSet {
        let mut set = CircleSet::new();
        for i in 0..n {
            set.create(PctPoint::new(10.0 * i as f32, 10.0), 5.0);
        }
        set
    }

    #[test]
    fn create_assigns_next_index() {
        let mut set = CircleSet::new();
        let a = set.create(PctPoint::new(10.0, 10.0), 5.0);
        let b = set.create(PctPoint::new(20.0, 20.0), 5.0);
        assert_eq!(set.get(a).unwrap().index, 0);
        assert_eq!(set.get(b).unwrap().index, 1);
    }

    #[test]
    fn delete_renormalizes_indices() {
        let mut set = set_with(2);
        let first = set.circles()[0].id;
        let second = set.circles()[1].id;
        assert!(set.delete(first));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(second).unwrap().index, 0);
    }

    #[test]
    fn delete_missing_id_is_a_noop() {
        let mut set = set_with(2);
        let revision = set.revision();
        assert!(!set.delete(Uuid::new_v4()));
        assert_eq!(set.revision(), revision);
        assert!(set.take_deleted().is_empty());
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut set = CircleSet::new();
        let below = set.create(PctPoint::new(50.0, 50.0), 10.0);
        let above = set.create(PctPoint::new(52.0, 50.0), 10.0);
        assert_eq!(set.hit_test(PctPoint::new(51.0, 50.0)), Some(above));
        assert_eq!(set.hit_test(PctPoint::new(41.0, 50.0)), Some(below));
        assert_eq!(set.hit_test(PctPoint::new(90.0, 90.0)), None);
    }

    #[test]
    fn mutations_bump_revision() {
        let mut set = set_with(1);
        let id = set.circles()[0].id;
        let r0 = set.revision();
        set.move_center(id, PctPoint::new(30.0, 30.0));
        set.set_radius(id, 7.0);
        set.set_comment(id, "note");
        assert_eq!(set.revision(), r0 + 3);
    }

    #[test]
    fn circle_round_trips_through_json() {
        let circle = Circle {
            id: Uuid::new_v4(),
            x: 30.0,
            y: 40.0,
            r: 12.5,
            comment: Some("hello".to_string()),
            index: 3,
        };
        let raw = serde_json::to_string(&circle).unwrap();
        let back: Circle = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, circle);

        let bare = Circle {
            comment: None,
            ..circle.clone()
        };
        let raw = serde_json::to_string(&bare).unwrap();
        assert!(!raw.contains("comment"));
        let back: Circle = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, bare);
    }

    proptest! {
        #[test]
        fn indices_stay_contiguous(ops in proptest::collection::vec(0u8..4, 1..40)) {
            let mut set = CircleSet::new();
            for op in ops {
                match op {
                    0 | 1 => {
                        set.create(PctPoint::new(50.0, 50.0), 5.0);
                    }
                    2 => {
                        if let Some(first) = set.circles().first() {
                            let id = first.id;
                            set.delete(id);
                        }
                    }
                    _ => {
                        if let Some(last) = set.circles().last() {
                            let id = last.id;
                            set.delete(id);
                        }
                    }
                }
                for (i, circle) in set.circles().iter().enumerate() {
                    prop_assert_eq!(circle.index, i as u32);
                }
            }
        }
    }
}
