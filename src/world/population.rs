use crate::organisms::{Creature, CreatureId};
use glam::Vec3;
use slotmap::SlotMap;
use tracing::trace;

/// Ordered arena of every creature in the world.
///
/// Handles stay valid until the creature is removed; iteration follows
/// insertion order.
#[derive(Debug, Default)]
pub struct Population {
    creatures: SlotMap<CreatureId, Creature>,
    order: Vec<CreatureId>,
}

/// Counts from the last proximity rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProximityStats {
    pub sensed: usize,
    pub contacts: usize,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn insert(&mut self, creature: Creature) -> CreatureId {
        let id = self.creatures.insert(creature);
        self.order.push(id);
        id
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.creatures.contains_key(id)
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(id)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.get_mut(id)
    }

    /// Two distinct creatures borrowed mutably at once.
    pub fn pair_mut(&mut self, a: CreatureId, b: CreatureId) -> Option<(&mut Creature, &mut Creature)> {
        let [first, second] = self.creatures.get_disjoint_mut([a, b])?;
        Some((first, second))
    }

    /// Handles in insertion order
    pub fn ids(&self) -> &[CreatureId] {
        &self.order
    }

    pub fn id_at(&self, index: usize) -> Option<CreatureId> {
        self.order.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CreatureId, &Creature)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.creatures.get(id).map(|creature| (id, creature)))
    }

    /// Every creature, in arena order rather than insertion order.
    pub fn creatures_mut(&mut self) -> impl Iterator<Item = &mut Creature> + '_ {
        self.creatures.values_mut()
    }

    /// Remove the creature at `index`; later creatures shift down by one.
    pub fn remove_at(&mut self, index: usize) -> Option<(CreatureId, Creature)> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        self.creatures.remove(id).map(|creature| (id, creature))
    }

    pub fn remove(&mut self, id: CreatureId) -> Option<Creature> {
        let index = self.order.iter().position(|&other| other == id)?;
        self.remove_at(index).map(|(_, creature)| creature)
    }

    /// Take out every creature whose body is already gone, keeping order.
    pub fn sweep_destroyed(&mut self) -> Vec<(CreatureId, Creature)> {
        let creatures = &mut self.creatures;
        let mut swept = Vec::new();
        self.order.retain(|&id| {
            let destroyed = creatures.get(id).map_or(true, Creature::is_destroyed);
            if destroyed {
                if let Some(creature) = creatures.remove(id) {
                    swept.push((id, creature));
                }
            }
            !destroyed
        });
        swept
    }

    /// Destroy every creature, releasing its body. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.order.len();
        for creature in self.creatures.values_mut() {
            creature.destroy();
        }
        self.creatures.clear();
        self.order.clear();
        removed
    }

    /// Recompute every `nearby` and `touching` list from current positions.
    ///
    /// Each unordered pair is measured once. `nearby` is directional and uses the
    /// observer's own sensor radius; `touching` is added to both sides.
    pub fn rebuild_proximity(&mut self) -> ProximityStats {
        for creature in self.creatures.values_mut() {
            creature.clear_relations();
        }

        let snapshot: Vec<(CreatureId, Vec3, f32)> = self
            .iter()
            .filter_map(|(id, creature)| {
                creature
                    .position()
                    .map(|position| (id, position, creature.sensor_size))
            })
            .collect();

        let mut sensed: Vec<(CreatureId, CreatureId)> = Vec::new();
        let mut contacts: Vec<(CreatureId, CreatureId)> = Vec::new();

        for (i, &(a, position_a, sensor_a)) in snapshot.iter().enumerate() {
            for &(b, position_b, sensor_b) in &snapshot[i + 1..] {
                let distance = position_a.distance(position_b);
                if distance < sensor_a {
                    sensed.push((a, b));
                }
                if distance < sensor_b {
                    sensed.push((b, a));
                }

                let touching = match (
                    self.creatures.get(a).and_then(Creature::body),
                    self.creatures.get(b).and_then(Creature::body),
                ) {
                    (Some(body_a), Some(body_b)) => body_a.intersects(body_b),
                    _ => false,
                };
                if touching {
                    contacts.push((a, b));
                }
            }
        }

        for &(observer, seen) in &sensed {
            if let Some(creature) = self.creatures.get_mut(observer) {
                creature.nearby.push(seen);
            }
        }
        for &(a, b) in &contacts {
            if let Some(creature) = self.creatures.get_mut(a) {
                creature.touching.push(b);
            }
            if let Some(creature) = self.creatures.get_mut(b) {
                creature.touching.push(a);
            }
        }

        trace!(
            "[POPULATION] proximity rebuilt: {} creatures, {} sensed, {} contacts",
            snapshot.len(),
            sensed.len(),
            contacts.len()
        );

        ProximityStats {
            sensed: sensed.len(),
            contacts: contacts.len(),
        }
    }
}
